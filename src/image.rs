//! In-memory mirror of the clock chip's register file.
//!
//! The image is only as fresh as the last [`RegisterRange`] refreshed into
//! it. Accessors never touch the bus; they decode and encode the bytes that
//! happen to be in the mirror.

use crate::registers::{
    AgingOffset, AlarmDayDate, AlarmHours, AlarmMinutes, AlarmSeconds, Control, Date, Day, Hours,
    Minutes, Month, RegAddr, Seconds, Status, Temperature, TemperatureFraction, Year,
};

/// Number of registers on the chip (0x00-0x12).
pub const REGISTER_COUNT: usize = 19;

/// A contiguous span of registers moved in one bus transaction.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegisterRange {
    /// First register address
    pub start: u8,
    /// Number of registers
    pub count: u8,
}

impl RegisterRange {
    /// Every register.
    pub const ALL: Self = Self::new(0x00, 19);
    /// Seconds, minutes and hours.
    pub const TIME: Self = Self::new(0x00, 3);
    /// Day of week.
    pub const DAY: Self = Self::new(0x03, 1);
    /// Date, month (with century) and year.
    pub const DATE: Self = Self::new(0x04, 3);
    /// Alarm 1 seconds through day/date.
    pub const ALARM1: Self = Self::new(0x07, 4);
    /// Alarm 2 minutes through day/date.
    pub const ALARM2: Self = Self::new(0x0B, 3);
    /// Both alarm groups.
    pub const ALARMS: Self = Self::new(0x07, 7);
    /// Control register.
    pub const CONTROL: Self = Self::new(0x0E, 1);
    /// Control/status register.
    pub const CONTROL_STATUS: Self = Self::new(0x0F, 1);
    /// Aging offset.
    pub const AGING: Self = Self::new(0x10, 1);
    /// Temperature integer part.
    pub const TEMPERATURE_MSB: Self = Self::new(0x11, 1);
    /// Temperature fraction.
    pub const TEMPERATURE_LSB: Self = Self::new(0x12, 1);
    /// Both temperature bytes.
    pub const TEMPERATURE: Self = Self::new(0x11, 2);
    /// Seconds through year.
    pub const TIME_AND_DATE: Self = Self::new(0x00, 7);
    /// Day of week through year.
    pub const DATE_AND_DAY: Self = Self::new(0x03, 4);
    /// Control and control/status.
    pub const CONTROL_AND_STATUS: Self = Self::new(0x0E, 2);

    pub const fn new(start: u8, count: u8) -> Self {
        Self { start, count }
    }

    /// One past the last register of the range.
    pub const fn end(&self) -> usize {
        self.start as usize + self.count as usize
    }

    /// A range is valid when it is non-empty and stays inside the chip.
    pub const fn is_valid(&self) -> bool {
        self.count > 0 && self.end() <= REGISTER_COUNT
    }

    pub const fn contains(&self, addr: RegAddr) -> bool {
        let index = addr.index();
        index >= self.start as usize && index < self.end()
    }
}

/// Raw register bytes, indexed by register address.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RegisterImage([u8; REGISTER_COUNT]);

// Generates a getter, a setter and a read-modify-write helper for each
// register, all operating on the mirror only.
macro_rules! image_register {
    ($(($name:ident, $regaddr:expr, $typ:ty)),+ $(,)?) => {
        $(
            pub fn $name(&self) -> $typ {
                <$typ>::from(self.0[$regaddr.index()])
            }

            paste::paste! {
                pub fn [< set_ $name >](&mut self, value: $typ) {
                    self.0[$regaddr.index()] = value.into();
                }

                pub fn [< update_ $name >]<F>(&mut self, f: F)
                where
                    F: FnOnce(&mut $typ),
                {
                    let mut value = self.$name();
                    f(&mut value);
                    self.[< set_ $name >](value);
                }
            }
        )+
    };
}

impl RegisterImage {
    pub const fn new() -> Self {
        Self([0; REGISTER_COUNT])
    }

    pub const fn from_bytes(bytes: [u8; REGISTER_COUNT]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; REGISTER_COUNT] {
        &self.0
    }

    /// Bytes covered by `range`, or `None` if the range is invalid.
    pub fn range(&self, range: RegisterRange) -> Option<&[u8]> {
        if !range.is_valid() {
            return None;
        }
        self.0.get(range.start as usize..range.end())
    }

    pub fn range_mut(&mut self, range: RegisterRange) -> Option<&mut [u8]> {
        if !range.is_valid() {
            return None;
        }
        self.0.get_mut(range.start as usize..range.end())
    }

    pub fn raw(&self, addr: RegAddr) -> u8 {
        self.0[addr.index()]
    }

    pub fn set_raw(&mut self, addr: RegAddr, value: u8) {
        self.0[addr.index()] = value;
    }

    image_register!(
        (seconds, RegAddr::Seconds, Seconds),
        (minutes, RegAddr::Minutes, Minutes),
        (hours, RegAddr::Hours, Hours),
        (day, RegAddr::Day, Day),
        (date, RegAddr::Date, Date),
        (month, RegAddr::Month, Month),
        (year, RegAddr::Year, Year),
        (alarm1_seconds, RegAddr::Alarm1Seconds, AlarmSeconds),
        (alarm1_minutes, RegAddr::Alarm1Minutes, AlarmMinutes),
        (alarm1_hours, RegAddr::Alarm1Hours, AlarmHours),
        (alarm1_day_date, RegAddr::Alarm1DayDate, AlarmDayDate),
        (alarm2_minutes, RegAddr::Alarm2Minutes, AlarmMinutes),
        (alarm2_hours, RegAddr::Alarm2Hours, AlarmHours),
        (alarm2_day_date, RegAddr::Alarm2DayDate, AlarmDayDate),
        (control, RegAddr::Control, Control),
        (status, RegAddr::ControlStatus, Status),
        (aging_offset, RegAddr::AgingOffset, AgingOffset),
        (temperature, RegAddr::MSBTemp, Temperature),
        (temperature_fraction, RegAddr::LSBTemp, TemperatureFraction),
    );

    /// Temperature in quarter degrees Celsius.
    pub fn temperature_quarters(&self) -> i16 {
        i16::from(self.temperature().temperature()) * 4
            + i16::from(self.temperature_fraction().quarters())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_ranges_are_valid() {
        let ranges = [
            RegisterRange::ALL,
            RegisterRange::TIME,
            RegisterRange::DAY,
            RegisterRange::DATE,
            RegisterRange::ALARM1,
            RegisterRange::ALARM2,
            RegisterRange::ALARMS,
            RegisterRange::CONTROL,
            RegisterRange::CONTROL_STATUS,
            RegisterRange::AGING,
            RegisterRange::TEMPERATURE_MSB,
            RegisterRange::TEMPERATURE_LSB,
            RegisterRange::TEMPERATURE,
            RegisterRange::TIME_AND_DATE,
            RegisterRange::DATE_AND_DAY,
            RegisterRange::CONTROL_AND_STATUS,
        ];
        for range in ranges {
            assert!(range.is_valid(), "{:?}", range);
        }
        assert!(RegisterRange::ALARM2.contains(RegAddr::Alarm2Hours));
        assert!(!RegisterRange::ALARM2.contains(RegAddr::Control));
    }

    #[test]
    fn test_invalid_ranges() {
        assert!(!RegisterRange::new(0x12, 2).is_valid());
        assert!(!RegisterRange::new(0x00, 0).is_valid());
        let image = RegisterImage::new();
        assert!(image.range(RegisterRange::new(0x10, 4)).is_none());
        assert_eq!(image.range(RegisterRange::TIME).map(<[u8]>::len), Some(3));
    }

    #[test]
    fn test_accessors_touch_only_their_byte() {
        let mut image = RegisterImage::new();
        image.update_alarm2_hours(|hours| {
            hours.set_ten_hours_24(2);
            hours.set_hours(3);
        });
        image.update_status(|status| status.set_alarm2_flag(true));

        let mut expected = [0u8; REGISTER_COUNT];
        expected[0x0C] = 0x23;
        expected[0x0F] = 0x02;
        assert_eq!(image.as_bytes(), &expected);
        assert_eq!(image.alarm2_hours().hours(), 3);
    }

    #[test]
    fn test_temperature_quarters() {
        let mut image = RegisterImage::new();
        image.set_raw(RegAddr::MSBTemp, 0x19);
        image.set_raw(RegAddr::LSBTemp, 0x40);
        assert_eq!(image.temperature_quarters(), 101);

        image.set_raw(RegAddr::MSBTemp, 0xFE);
        image.set_raw(RegAddr::LSBTemp, 0x00);
        assert_eq!(image.temperature_quarters(), -8);
    }
}
