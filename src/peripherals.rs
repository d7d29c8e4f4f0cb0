//! Collaborator interfaces: character display, tone generator and
//! persistent byte storage, plus the layout constants they share.

use core::fmt::Debug;

/// DDRAM address of the first character of each display line.
pub const LINE_1: u8 = 0x00;
pub const LINE_2: u8 = 0x40;

/// Display width in characters.
pub const LINE_WIDTH: usize = 16;

/// Custom glyphs loaded into the display's character generator.
pub mod glyph {
    pub const SMILE: u8 = 0x01;
    pub const ARROW: u8 = 0x02;
    pub const DEGREE: u8 = 0x04;
    pub const CALENDAR: u8 = 0x05;
    pub const BELL: u8 = 0x06;
    pub const CLOCK: u8 = 0x07;
    pub const NOTE: u8 = 0x08;
}

/// Persistent storage byte map.
pub mod storage_map {
    /// Nonzero when the alarm is armed.
    pub const ALARM_ENABLED: u16 = 0;
    /// Ticks of inactivity in Display mode before Sleep.
    pub const TIMEOUT: u16 = 1;
}

/// A character display addressed by DDRAM position.
pub trait CharacterDisplay {
    type Error: Debug;

    /// Turns on the panel and backlight.
    fn power_on(&mut self) -> Result<(), Self::Error>;
    fn power_off(&mut self) -> Result<(), Self::Error>;
    fn clear(&mut self) -> Result<(), Self::Error>;
    fn set_cursor(&mut self, address: u8) -> Result<(), Self::Error>;
    /// Writes at the cursor and advances it.
    fn write_char(&mut self, c: u8) -> Result<(), Self::Error>;

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        for &c in bytes {
            self.write_char(c)?;
        }
        Ok(())
    }

    fn write_str(&mut self, s: &str) -> Result<(), Self::Error> {
        self.write_bytes(s.as_bytes())
    }

    /// Moves the cursor, then writes `bytes`.
    fn write_at(&mut self, address: u8, bytes: &[u8]) -> Result<(), Self::Error> {
        self.set_cursor(address)?;
        self.write_bytes(bytes)
    }
}

/// Square wave tone output (piezo buzzer).
pub trait Tone {
    fn set_frequency(&mut self, hz: u16);
    fn enable(&mut self);
    fn disable(&mut self);
}

/// Byte-addressed persistent storage with wear-avoiding writes.
pub trait Storage {
    fn read(&mut self, address: u16) -> u8;
    /// Writes only if the stored byte differs. Returns the previous value.
    fn write_if_changed(&mut self, address: u16, value: u8) -> u8;
}

/// ASCII digit for a BCD nibble.
pub(crate) fn digit(value: u8) -> u8 {
    b'0' + (value % 10)
}
