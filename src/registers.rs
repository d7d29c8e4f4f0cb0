//! Register map and bitfield types for the clock chip.
//!
//! The chip exposes 19 byte-wide registers (0x00-0x12). Time, date and alarm
//! registers are BCD encoded with the tens digit in the high nibble; mask and
//! mode bits share the upper bits of the same bytes. Each register gets a
//! `bitfield` newtype so callers never shift or mask by hand.

use bitfield::bitfield;

/// Register addresses, in map order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegAddr {
    Seconds = 0x00,
    Minutes = 0x01,
    /// 0-23, or 1-12 with the PM bit
    Hours = 0x02,
    /// 1-7, Monday first
    Day = 0x03,
    Date = 0x04,
    /// Carries the century bit
    Month = 0x05,
    Year = 0x06,
    Alarm1Seconds = 0x07,
    Alarm1Minutes = 0x08,
    Alarm1Hours = 0x09,
    Alarm1DayDate = 0x0A,
    Alarm2Minutes = 0x0B,
    Alarm2Hours = 0x0C,
    Alarm2DayDate = 0x0D,
    Control = 0x0E,
    ControlStatus = 0x0F,
    AgingOffset = 0x10,
    /// Whole degrees, two's complement
    MSBTemp = 0x11,
    /// Quarter degrees in bits 7:6
    LSBTemp = 0x12,
}

impl RegAddr {
    /// Index of this register inside the register image.
    pub const fn index(self) -> usize {
        self as usize
    }
}

// Declares the enum for a multi-valued bit group. Variants must cover every
// value of `mask` in ascending order; both are checked at compile time, which
// makes the conversion from a raw field value total.
macro_rules! field_enum {
    (
        $(#[$meta:meta])*
        $name:ident, mask $mask:literal {
            $($(#[$vmeta:meta])* $variant:ident = $value:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq)]
        #[cfg_attr(feature = "defmt", derive(defmt::Format))]
        pub enum $name {
            $($(#[$vmeta])* $variant = $value,)+
        }

        impl $name {
            const VARIANTS: &'static [$name] = &[$($name::$variant),+];
        }

        const _: () = {
            assert!($name::VARIANTS.len() == $mask as usize + 1);
            let mut i = 0;
            while i < $name::VARIANTS.len() {
                assert!($name::VARIANTS[i] as usize == i);
                i += 1;
            }
        };

        impl From<u8> for $name {
            fn from(raw: u8) -> Self {
                Self::VARIANTS[usize::from(raw & $mask)]
            }
        }

        impl From<$name> for u8 {
            fn from(field: $name) -> Self {
                field as u8
            }
        }
    };
}

field_enum! {
    /// 12/24 hour selection bit of an hours register.
    TimeRepresentation, mask 0b1 {
        TwentyFourHour = 0,
        /// 1-12 with the PM bit
        TwelveHour = 1,
    }
}

field_enum! {
    /// EOSC bit, active low.
    Oscillator, mask 0b1 {
        /// Keeps running on battery power
        Enabled = 0,
        /// Stops when on battery power
        Disabled = 1,
    }
}

field_enum! {
    /// Function of the INT/SQW pin.
    InterruptControl, mask 0b1 {
        SquareWave = 0,
        /// Pulled low on an enabled alarm match
        Interrupt = 1,
    }
}

field_enum! {
    /// Square wave rate.
    SquareWaveFrequency, mask 0b11 {
        /// Falling edge right after the seconds register increments
        Hz1 = 0b00,
        Hz1024 = 0b01,
        Hz4096 = 0b10,
        Hz8192 = 0b11,
    }
}

field_enum! {
    /// DY/DT bit of an alarm day/date register.
    DayDateSelect, mask 0b1 {
        /// Day of month
        Date = 0,
        /// Day of week
        Day = 1,
    }
}

// Raw byte conversions for the bitfield newtypes.
macro_rules! raw_register {
    ($($typ:ident),+ $(,)?) => {
        $(
            impl From<u8> for $typ {
                fn from(raw: u8) -> Self {
                    Self(raw)
                }
            }

            impl From<$typ> for u8 {
                fn from(register: $typ) -> Self {
                    register.0
                }
            }
        )+
    };
}

bitfield! {
    /// Seconds register (BCD 00-59).
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    pub struct Seconds(u8);
    impl Debug;
    pub ten_seconds, set_ten_seconds: 6, 4;
    pub seconds, set_seconds: 3, 0;
}

bitfield! {
    /// Minutes register (BCD 00-59).
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    pub struct Minutes(u8);
    impl Debug;
    pub ten_minutes, set_ten_minutes: 6, 4;
    pub minutes, set_minutes: 3, 0;
}

bitfield! {
    /// Hours register.
    ///
    /// In 24-hour mode bits 5:4 hold the tens digit (0-2); in 12-hour mode
    /// bit 5 is the PM flag and only bit 4 belongs to the tens digit. The two
    /// views overlap on purpose and must be read together with
    /// `time_representation`.
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    pub struct Hours(u8);
    impl Debug;
    pub from into TimeRepresentation, time_representation, set_time_representation: 6, 6;
    pub pm_or_twenty_hours, set_pm_or_twenty_hours: 5, 5;
    pub ten_hours_24, set_ten_hours_24: 5, 4;
    pub ten_hours, set_ten_hours: 4, 4;
    pub hours, set_hours: 3, 0;
}

bitfield! {
    /// Day of week register (1-7, not BCD).
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    pub struct Day(u8);
    impl Debug;
    pub day, set_day: 2, 0;
}

bitfield! {
    /// Date of month register (BCD 01-31).
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    pub struct Date(u8);
    impl Debug;
    pub ten_date, set_ten_date: 5, 4;
    pub date, set_date: 3, 0;
}

bitfield! {
    /// Month register (BCD 01-12) with the century flag in bit 7.
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    pub struct Month(u8);
    impl Debug;
    pub century, set_century: 7;
    pub ten_month, set_ten_month: 4, 4;
    pub month, set_month: 3, 0;
}

bitfield! {
    /// Year register (BCD 00-99).
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    pub struct Year(u8);
    impl Debug;
    pub ten_year, set_ten_year: 7, 4;
    pub year, set_year: 3, 0;
}

bitfield! {
    /// Alarm 1 seconds register; bit 7 is mask bit A1M1.
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    pub struct AlarmSeconds(u8);
    impl Debug;
    pub alarm_mask1, set_alarm_mask1: 7;
    pub ten_seconds, set_ten_seconds: 6, 4;
    pub seconds, set_seconds: 3, 0;
}

bitfield! {
    /// Alarm minutes register; bit 7 is mask bit A1M2/A2M2.
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    pub struct AlarmMinutes(u8);
    impl Debug;
    pub alarm_mask2, set_alarm_mask2: 7;
    pub ten_minutes, set_ten_minutes: 6, 4;
    pub minutes, set_minutes: 3, 0;
}

bitfield! {
    /// Alarm hours register; bit 7 is mask bit A1M3/A2M3.
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    pub struct AlarmHours(u8);
    impl Debug;
    pub alarm_mask3, set_alarm_mask3: 7;
    pub from into TimeRepresentation, time_representation, set_time_representation: 6, 6;
    pub pm_or_twenty_hours, set_pm_or_twenty_hours: 5, 5;
    pub ten_hours_24, set_ten_hours_24: 5, 4;
    pub ten_hours, set_ten_hours: 4, 4;
    pub hours, set_hours: 3, 0;
}

bitfield! {
    /// Alarm day/date register; bit 7 is mask bit A1M4/A2M4.
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    pub struct AlarmDayDate(u8);
    impl Debug;
    pub alarm_mask4, set_alarm_mask4: 7;
    pub from into DayDateSelect, day_date_select, set_day_date_select: 6, 6;
    pub ten_date, set_ten_date: 5, 4;
    pub day_or_date, set_day_or_date: 3, 0;
}

bitfield! {
    /// Control register (0x0E).
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    pub struct Control(u8);
    impl Debug;
    pub from into Oscillator, oscillator_enable, set_oscillator_enable: 7, 7;
    pub battery_backed_square_wave, set_battery_backed_square_wave: 6;
    pub convert_temperature, set_convert_temperature: 5;
    pub from into SquareWaveFrequency, square_wave_frequency, set_square_wave_frequency: 4, 3;
    pub from into InterruptControl, interrupt_control, set_interrupt_control: 2, 2;
    pub alarm2_interrupt_enable, set_alarm2_interrupt_enable: 1;
    pub alarm1_interrupt_enable, set_alarm1_interrupt_enable: 0;
}

bitfield! {
    /// Control/status register (0x0F).
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    pub struct Status(u8);
    impl Debug;
    pub oscillator_stop_flag, set_oscillator_stop_flag: 7;
    pub enable_32khz_output, set_enable_32khz_output: 3;
    pub busy, set_busy: 2;
    pub alarm2_flag, set_alarm2_flag: 1;
    pub alarm1_flag, set_alarm1_flag: 0;
}

bitfield! {
    /// Aging offset register (two's complement).
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    pub struct AgingOffset(u8);
    impl Debug;
    pub i8, aging_offset, set_aging_offset: 7, 0;
}

bitfield! {
    /// Temperature integer part in degrees Celsius (two's complement).
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    pub struct Temperature(u8);
    impl Debug;
    pub i8, temperature, set_temperature: 7, 0;
}

bitfield! {
    /// Temperature fraction, in quarter degrees.
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    pub struct TemperatureFraction(u8);
    impl Debug;
    pub quarters, set_quarters: 7, 6;
}

raw_register!(
    Seconds,
    Minutes,
    Hours,
    Day,
    Date,
    Month,
    Year,
    AlarmSeconds,
    AlarmMinutes,
    AlarmHours,
    AlarmDayDate,
    Control,
    Status,
    AgingOffset,
    Temperature,
    TemperatureFraction,
);
