//! Clock chip driver.
//!
//! [`Clock`] owns the bus handle and the [`RegisterImage`]. Reads and writes
//! move whole [`RegisterRange`]s: refresh before reading a field, commit
//! after changing one. Nothing is synchronized implicitly.

use chrono::{NaiveDate, NaiveDateTime};
use embedded_hal::i2c::I2c;

use crate::datetime::DateTimeError;
use crate::error::ClockError;
use crate::image::{RegisterImage, RegisterRange, REGISTER_COUNT};
use crate::registers::{Control, InterruptControl, SquareWaveFrequency};

/// 7-bit bus address of the clock chip.
pub const RTC_ADDRESS: u8 = 0x68;
/// 7-bit bus address of the display backpack.
pub const DISPLAY_ADDRESS: u8 = 0x27;
/// 7-bit bus address of the external EEPROM (reserved, unused).
pub const EEPROM_ADDRESS: u8 = 0x57;

/// What drives the chip's INT/SQW pin.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickSource {
    /// 1 Hz square wave; its falling edge follows each seconds increment.
    Fast,
    /// Pin asserted only on an alarm 2 match.
    AlarmOnly,
}

impl TickSource {
    /// Control register value selecting this source, with alarm 2 enabled.
    pub fn control(self) -> Control {
        let mut control = Control::default();
        control.set_alarm2_interrupt_enable(true);
        control.set_square_wave_frequency(SquareWaveFrequency::Hz1);
        control.set_interrupt_control(match self {
            TickSource::Fast => InterruptControl::SquareWave,
            TickSource::AlarmOnly => InterruptControl::Interrupt,
        });
        control
    }
}

pub struct Clock<I2C> {
    i2c: I2C,
    address: u8,
    image: RegisterImage,
}

impl<I2C: I2c> Clock<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            image: RegisterImage::new(),
        }
    }

    pub fn image(&self) -> &RegisterImage {
        &self.image
    }

    pub fn image_mut(&mut self) -> &mut RegisterImage {
        &mut self.image
    }

    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Pulls `count` registers starting at `start` into the image.
    pub fn refresh_range(&mut self, start: u8, count: u8) -> Result<(), ClockError<I2C::Error>> {
        self.refresh(RegisterRange::new(start, count))
    }

    /// Pushes `count` registers starting at `start` from the image.
    pub fn commit_range(&mut self, start: u8, count: u8) -> Result<(), ClockError<I2C::Error>> {
        self.commit(RegisterRange::new(start, count))
    }

    /// One composite transaction: pointer write, repeated start, burst read.
    pub fn refresh(&mut self, range: RegisterRange) -> Result<(), ClockError<I2C::Error>> {
        let bytes = self
            .image
            .range_mut(range)
            .ok_or(ClockError::<I2C::Error>::InvalidRange {
                start: range.start,
                count: range.count,
            })?;
        self.i2c.write_read(self.address, &[range.start], bytes)?;
        trace!("refreshed {} registers from {:#x}", range.count, range.start);
        Ok(())
    }

    pub fn commit(&mut self, range: RegisterRange) -> Result<(), ClockError<I2C::Error>> {
        let bytes = self.image.range(range).ok_or(ClockError::<I2C::Error>::InvalidRange {
            start: range.start,
            count: range.count,
        })?;
        let mut buffer = [0u8; REGISTER_COUNT + 1];
        buffer[0] = range.start;
        buffer[1..=bytes.len()].copy_from_slice(bytes);
        self.i2c.write(self.address, &buffer[..=bytes.len()])?;
        trace!("committed {} registers from {:#x}", range.count, range.start);
        Ok(())
    }

    /// Masks alarm 2 so it matches on hours and minutes only.
    pub fn init(&mut self) -> Result<(), ClockError<I2C::Error>> {
        self.refresh(RegisterRange::ALARM2)?;
        self.image
            .update_alarm2_minutes(|minutes| minutes.set_alarm_mask2(false));
        self.image
            .update_alarm2_hours(|hours| hours.set_alarm_mask3(false));
        self.image
            .update_alarm2_day_date(|day_date| day_date.set_alarm_mask4(true));
        self.commit(RegisterRange::ALARM2)
    }

    pub fn configure_tick(&mut self, source: TickSource) -> Result<(), ClockError<I2C::Error>> {
        debug!("tick source {:?}", source);
        self.image.set_control(source.control());
        self.commit(RegisterRange::CONTROL)
    }

    /// Reads the alarm 2 match flag.
    pub fn alarm_matched(&mut self) -> Result<bool, ClockError<I2C::Error>> {
        self.refresh(RegisterRange::CONTROL_STATUS)?;
        Ok(self.image.status().alarm2_flag())
    }

    /// Clears the alarm 2 match flag, leaving the other status bits alone.
    pub fn clear_alarm_match(&mut self) -> Result<(), ClockError<I2C::Error>> {
        self.refresh(RegisterRange::CONTROL_STATUS)?;
        self.image
            .update_status(|status| status.set_alarm2_flag(false));
        self.commit(RegisterRange::CONTROL_STATUS)
    }

    pub fn datetime(&mut self) -> Result<NaiveDateTime, ClockError<I2C::Error>> {
        self.refresh(RegisterRange::TIME_AND_DATE)?;
        self.image.datetime().map_err(ClockError::DateTime)
    }

    pub fn set_datetime(
        &mut self,
        datetime: &NaiveDateTime,
    ) -> Result<(), ClockError<I2C::Error>> {
        self.image
            .set_datetime(datetime)
            .map_err(ClockError::<I2C::Error>::DateTime)?;
        self.commit(RegisterRange::TIME_AND_DATE)
    }

    /// Temperature in quarter degrees Celsius.
    pub fn temperature(&mut self) -> Result<i16, ClockError<I2C::Error>> {
        self.refresh(RegisterRange::TEMPERATURE)?;
        Ok(self.image.temperature_quarters())
    }

    /// If the oscillator stopped since the flag was last cleared, resets the
    /// clock to 2000-01-01 00:00:00 and clears the flag. Returns whether a
    /// reset happened.
    pub fn recover_oscillator_stop(&mut self) -> Result<bool, ClockError<I2C::Error>> {
        self.refresh(RegisterRange::CONTROL_STATUS)?;
        if !self.image.status().oscillator_stop_flag() {
            return Ok(false);
        }
        warn!("oscillator stopped, time reset to 2000-01-01");
        let epoch = NaiveDate::from_ymd_opt(2000, 1, 1)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .ok_or(ClockError::<I2C::Error>::DateTime(
                DateTimeError::InvalidDateTime,
            ))?;
        self.set_datetime(&epoch)?;
        self.image
            .update_status(|status| status.set_oscillator_stop_flag(false));
        self.commit(RegisterRange::CONTROL_STATUS)?;
        Ok(true)
    }
}
