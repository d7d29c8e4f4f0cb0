//! Crate error types.

use crate::datetime::DateTimeError;

/// Errors from the clock driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockError<I2CE> {
    /// The bus transaction failed.
    I2c(I2CE),
    /// A register range that is empty or runs past register 0x12.
    InvalidRange { start: u8, count: u8 },
    DateTime(DateTimeError),
}

impl<I2CE> From<I2CE> for ClockError<I2CE> {
    fn from(e: I2CE) -> Self {
        ClockError::I2c(e)
    }
}

/// Errors surfaced by a scheduler cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<I2CE, DE> {
    Clock(ClockError<I2CE>),
    Display(DE),
}

impl<I2CE, DE> From<ClockError<I2CE>> for Error<I2CE, DE> {
    fn from(e: ClockError<I2CE>) -> Self {
        Error::Clock(e)
    }
}

/// Coarse classification of an [`Error`], loggable on every backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaultKind {
    Bus,
    Range,
    DateTime,
    Display,
}

impl<I2CE> ClockError<I2CE> {
    pub fn kind(&self) -> FaultKind {
        match self {
            ClockError::I2c(_) => FaultKind::Bus,
            ClockError::InvalidRange { .. } => FaultKind::Range,
            ClockError::DateTime(_) => FaultKind::DateTime,
        }
    }
}

impl<I2CE, DE> Error<I2CE, DE> {
    pub fn kind(&self) -> FaultKind {
        match self {
            Error::Clock(e) => e.kind(),
            Error::Display(_) => FaultKind::Display,
        }
    }
}
