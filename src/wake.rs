//! Wake-up bookkeeping shared between interrupt handlers and the main loop.
//!
//! Interrupt handlers only record *why* the device woke (and, for a button
//! edge, the pin levels at that instant) into a [`WakeCell`]. The main loop
//! consumes the record after each halt through a [`WakeSource`].

use core::cell::Cell;

use critical_section::{CriticalSection, Mutex};

/// Why the processor left its last halt.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WakeupReason {
    /// Power-on; no interrupt has fired yet.
    Startup,
    /// A button pin changed level (press or release).
    ButtonEdge,
    /// The clock chip's INT/SQW pin fell: a 1 Hz tick or an alarm match.
    PeriodicTick,
}

/// A button and the port bit it is wired to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    Left = 1 << 0,
    Right = 1 << 1,
    Up = 1 << 4,
    Down = 1 << 5,
    Enter = 1 << 6,
    Exit = 1 << 7,
}

impl Button {
    fn from_bit(bit: u8) -> Option<Self> {
        match bit {
            0x01 => Some(Button::Left),
            0x02 => Some(Button::Right),
            0x10 => Some(Button::Up),
            0x20 => Some(Button::Down),
            0x40 => Some(Button::Enter),
            0x80 => Some(Button::Exit),
            _ => None,
        }
    }
}

/// Button port levels captured by the edge interrupt. Active low.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonSnapshot(u8);

impl ButtonSnapshot {
    /// No button held.
    pub const IDLE: Self = Self(0xFF);

    /// Port bits wired to buttons; bits 2 and 3 are not.
    const BUTTON_MASK: u8 = 0b1111_0011;

    pub const fn from_pins(pins: u8) -> Self {
        Self(pins)
    }

    pub const fn pins(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn with_pressed(self, button: Button) -> Self {
        Self(self.0 & !(button as u8))
    }

    pub const fn is_pressed(self, button: Button) -> bool {
        self.0 & button as u8 == 0
    }

    fn pressed_bits(self) -> u8 {
        !self.0 & Self::BUTTON_MASK
    }

    /// True when at least one button is held, i.e. the edge was a press and
    /// not only a release.
    pub fn any_pressed(self) -> bool {
        self.pressed_bits() != 0
    }

    /// The held button with the lowest port bit.
    pub fn action(self) -> Option<Button> {
        let pressed = self.pressed_bits();
        Button::from_bit(pressed & pressed.wrapping_neg())
    }
}

impl Default for ButtonSnapshot {
    fn default() -> Self {
        Self::IDLE
    }
}

/// A consumed wake-up record.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Wake {
    pub reason: WakeupReason,
    /// Pins captured by the most recent button edge, even if this wake was a tick.
    pub buttons: ButtonSnapshot,
}

impl Wake {
    pub const fn tick() -> Self {
        Self {
            reason: WakeupReason::PeriodicTick,
            buttons: ButtonSnapshot::IDLE,
        }
    }

    pub const fn button(buttons: ButtonSnapshot) -> Self {
        Self {
            reason: WakeupReason::ButtonEdge,
            buttons,
        }
    }
}

/// Single-producer, single-consumer wake record. Intended to live in a
/// `static` written by interrupt handlers.
pub struct WakeCell {
    reason: Mutex<Cell<Option<WakeupReason>>>,
    buttons: Mutex<Cell<ButtonSnapshot>>,
}

impl WakeCell {
    pub const fn new() -> Self {
        Self {
            reason: Mutex::new(Cell::new(Some(WakeupReason::Startup))),
            buttons: Mutex::new(Cell::new(ButtonSnapshot::IDLE)),
        }
    }

    /// Called from the tick interrupt.
    pub fn record_tick(&self) {
        critical_section::with(|cs| {
            self.reason.borrow(cs).set(Some(WakeupReason::PeriodicTick));
        });
    }

    /// Called from the pin-change interrupt with the port levels read on entry.
    pub fn record_button_edge(&self, pins: u8) {
        critical_section::with(|cs| {
            self.buttons.borrow(cs).set(ButtonSnapshot::from_pins(pins));
            self.reason.borrow(cs).set(Some(WakeupReason::ButtonEdge));
        });
    }

    /// Takes the pending record, leaving nothing pending.
    pub fn take(&self) -> Option<Wake> {
        critical_section::with(|cs| self.take_in(cs))
    }

    /// [`take`](Self::take) inside a critical section the caller already holds.
    pub fn take_in(&self, cs: CriticalSection<'_>) -> Option<Wake> {
        let reason = self.reason.borrow(cs).take()?;
        Some(Wake {
            reason,
            buttons: self.buttons.borrow(cs).get(),
        })
    }
}

impl Default for WakeCell {
    fn default() -> Self {
        Self::new()
    }
}

/// The scheduler's blocking wait.
pub trait WakeSource {
    fn wait_for_wake(&mut self) -> Wake;
}

/// Board hooks used around the low-power halt.
pub trait PowerControl {
    /// Gates the clock of the bus peripheral.
    fn set_bus_powered(&mut self, powered: bool);

    /// Halts until an interrupt fires.
    ///
    /// Called inside a critical section, with interrupts masked, right after
    /// the wake record was found empty. The implementation must unmask
    /// interrupts and halt as a single step (`sei` immediately followed by
    /// `sleep` on AVR), so an interrupt that arrives after the check still
    /// ends the halt. Returns once the handler has run.
    fn halt_until_interrupt(&mut self);
}

/// [`WakeSource`] that halts the processor with the bus powered down.
pub struct InterruptWake<'a, P> {
    cell: &'a WakeCell,
    power: P,
}

impl<'a, P: PowerControl> InterruptWake<'a, P> {
    pub fn new(cell: &'a WakeCell, power: P) -> Self {
        Self { cell, power }
    }

    pub fn release(self) -> P {
        self.power
    }
}

impl<P: PowerControl> WakeSource for InterruptWake<'_, P> {
    /// Returns a record that is already pending without halting. Otherwise
    /// halts with the bus powered down until a handler leaves one.
    fn wait_for_wake(&mut self) -> Wake {
        let cell = self.cell;
        loop {
            let pending = critical_section::with(|cs| {
                let wake = cell.take_in(cs);
                if wake.is_none() {
                    self.power.set_bus_powered(false);
                    self.power.halt_until_interrupt();
                }
                wake
            });
            match pending {
                Some(wake) => {
                    trace!("woke: {:?}", wake.reason);
                    return wake;
                }
                None => self.power.set_bus_powered(true),
            }
        }
    }
}
