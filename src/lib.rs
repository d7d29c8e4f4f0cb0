#![no_std]
//! Alarm clock firmware core: a two-wire bus master, a register image codec
//! for a DS3231 clock chip, a settings editor and the mode scheduler that
//! ties them together around a low-power halt.
//!
//! Hardware is reached only through traits: [`bus::TwiRegisters`] for the
//! bus peripheral, [`peripherals::CharacterDisplay`], [`peripherals::Tone`]
//! and [`peripherals::Storage`] for the collaborators, and
//! [`wake::PowerControl`] for the halt itself.

#[macro_use]
mod fmt;

pub mod alarm;
pub mod bus;
pub mod clock;
pub mod datetime;
pub mod editor;
pub mod error;
pub mod face;
pub mod image;
pub mod peripherals;
pub mod registers;
pub mod scheduler;
pub mod wake;

pub use alarm::AlarmRinger;
pub use bus::{BusConfig, BusError, TwiMaster, TwiRegisters};
pub use clock::{Clock, TickSource, DISPLAY_ADDRESS, EEPROM_ADDRESS, RTC_ADDRESS};
pub use datetime::DateTimeError;
pub use editor::{Editor, Screen};
pub use error::{ClockError, Error, FaultKind};
pub use image::{RegisterImage, RegisterRange};
pub use peripherals::{CharacterDisplay, Storage, Tone};
pub use registers::RegAddr;
pub use scheduler::{Config, Mode, ModeMachine, Scheduler};
pub use wake::{Button, ButtonSnapshot, InterruptWake, Wake, WakeCell, WakeSource, WakeupReason};
