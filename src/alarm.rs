//! Alarming mode: banner on the display and a tone toggled once per tick.

use embedded_hal::i2c::I2c;

use crate::clock::Clock;
use crate::error::{ClockError, Error};
use crate::face::alarm_digits;
use crate::image::RegisterRange;
use crate::peripherals::{glyph, CharacterDisplay, Tone, LINE_1, LINE_2};

/// Second display line while ringing.
pub const BANNER: &[u8; 16] = b"Wakey wakey, \x08\x01\x08";

/// Tone frequency used when none is configured.
pub const DEFAULT_TONE_HZ: u16 = 1000;

pub struct AlarmRinger {
    frequency_hz: u16,
    sounding: bool,
}

impl AlarmRinger {
    pub const fn new(frequency_hz: u16) -> Self {
        Self {
            frequency_hz,
            sounding: false,
        }
    }

    pub fn is_sounding(&self) -> bool {
        self.sounding
    }

    /// Draws the alarm screen and arms the tone generator silent.
    pub fn setup<I2C, D, T>(
        &mut self,
        clock: &mut Clock<I2C>,
        display: &mut D,
        tone: &mut T,
    ) -> Result<(), Error<I2C::Error, D::Error>>
    where
        I2C: I2c,
        D: CharacterDisplay,
        T: Tone,
    {
        clock.refresh(RegisterRange::ALARM2)?;
        let time = alarm_digits(clock.image());

        display.power_on().map_err(Error::Display)?;
        display.clear().map_err(Error::Display)?;
        display.write_at(LINE_1, &[glyph::BELL]).map_err(Error::Display)?;
        display.write_bytes(&time).map_err(Error::Display)?;
        display.write_at(LINE_1 + 0x0A, b"Alarm!").map_err(Error::Display)?;
        display.write_at(LINE_2, BANNER).map_err(Error::Display)?;

        tone.set_frequency(self.frequency_hz);
        self.sounding = false;
        Ok(())
    }

    /// Flips the tone on or off.
    pub fn update<T: Tone>(&mut self, tone: &mut T) {
        critical_section::with(|_| {
            if self.sounding {
                tone.disable();
            } else {
                tone.enable();
            }
            self.sounding = !self.sounding;
        });
    }

    /// Silences the tone and clears the chip's match flag so the alarm does
    /// not fire again on the next tick.
    pub fn stop<I2C, T>(
        &mut self,
        clock: &mut Clock<I2C>,
        tone: &mut T,
    ) -> Result<(), ClockError<I2C::Error>>
    where
        I2C: I2c,
        T: Tone,
    {
        critical_section::with(|_| {
            tone.disable();
            self.sounding = false;
        });
        clock.clear_alarm_match()
    }
}

impl Default for AlarmRinger {
    fn default() -> Self {
        Self::new(DEFAULT_TONE_HZ)
    }
}
