//! Top-level mode scheduler.
//!
//! [`ModeMachine`] is the pure transition table, driven once per wake.
//! [`Scheduler`] owns the collaborators and runs the endless cycle: enter the
//! mode if it just changed, do the mode's per-cycle work, halt until an
//! interrupt, then let the machine pick the next mode.

use embedded_hal::i2c::I2c;

use crate::alarm::{AlarmRinger, DEFAULT_TONE_HZ};
use crate::clock::{Clock, TickSource};
use crate::editor::Editor;
use crate::error::{ClockError, Error};
use crate::face;
use crate::peripherals::{storage_map, CharacterDisplay, Storage, Tone};
use crate::wake::{ButtonSnapshot, Wake, WakeSource, WakeupReason};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    Display,
    Sleep,
    SettingsEdit,
    Alarming,
}

impl Mode {
    /// Display and alarm modes follow the chip's 1 Hz edge; the others only
    /// wake for an alarm match or a button.
    pub fn tick_source(self) -> TickSource {
        match self {
            Mode::Display | Mode::Alarming => TickSource::Fast,
            Mode::Sleep | Mode::SettingsEdit => TickSource::AlarmOnly,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Transition {
    pub from: Mode,
    pub to: Mode,
}

/// What the transition table needs to know beyond the wake record.
pub trait ModeInputs {
    type Error;

    /// Display-mode ticks before Sleep. At least 1.
    fn timeout_threshold(&mut self) -> u8;
    fn alarm_armed(&mut self) -> bool;
    fn alarm_matched(&mut self) -> Result<bool, Self::Error>;
    fn editor_ready_to_exit(&self) -> bool;
}

pub struct ModeMachine {
    mode: Mode,
    pending_entry: bool,
    timeout_counter: u8,
}

impl ModeMachine {
    /// Starts in Display with its entry pending.
    pub const fn new() -> Self {
        Self {
            mode: Mode::Display,
            pending_entry: true,
            timeout_counter: 0,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn pending_entry(&self) -> bool {
        self.pending_entry
    }

    pub fn timeout_counter(&self) -> u8 {
        self.timeout_counter
    }

    /// Returns whether the current mode still needs its entry action, and
    /// marks it done.
    pub fn take_pending_entry(&mut self) -> bool {
        core::mem::replace(&mut self.pending_entry, false)
    }

    /// Runs the current mode's entry action again on the next cycle.
    pub fn request_entry(&mut self) {
        self.pending_entry = true;
    }

    /// Applies one wake to the table. Nothing changes if reading an input
    /// fails.
    pub fn on_wake<I: ModeInputs>(
        &mut self,
        wake: &Wake,
        inputs: &mut I,
    ) -> Result<Option<Transition>, I::Error> {
        let mut next = self.mode;
        let mut counter = self.timeout_counter;

        match (wake.reason, self.mode) {
            (WakeupReason::ButtonEdge, Mode::Alarming | Mode::Sleep) => {
                next = Mode::Display;
                counter = 0;
            }
            (WakeupReason::ButtonEdge, Mode::Display) => {
                // A release right after waking from Sleep must not open the editor.
                if wake.buttons.any_pressed() {
                    next = Mode::SettingsEdit;
                }
            }
            (WakeupReason::ButtonEdge, Mode::SettingsEdit) => {
                if inputs.editor_ready_to_exit() {
                    next = Mode::Display;
                    counter = 0;
                }
            }
            (WakeupReason::PeriodicTick, Mode::Display | Mode::Sleep) => {
                if self.mode == Mode::Display {
                    if counter >= inputs.timeout_threshold() {
                        next = Mode::Sleep;
                    } else {
                        counter += 1;
                    }
                }
                if inputs.alarm_armed() && inputs.alarm_matched()? {
                    next = Mode::Alarming;
                }
            }
            (WakeupReason::PeriodicTick, _) | (WakeupReason::Startup, _) => {}
        }

        self.timeout_counter = counter;
        if next == self.mode {
            return Ok(None);
        }
        let transition = Transition {
            from: self.mode,
            to: next,
        };
        self.mode = next;
        self.pending_entry = true;
        Ok(Some(transition))
    }
}

impl Default for ModeMachine {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Config {
    pub alarm_tone_hz: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            alarm_tone_hz: DEFAULT_TONE_HZ,
        }
    }
}

struct Inputs<'a, I2C, S> {
    clock: &'a mut Clock<I2C>,
    storage: &'a mut S,
    editor: &'a Editor,
    stale_match: bool,
}

impl<I2C: I2c, S: Storage> ModeInputs for Inputs<'_, I2C, S> {
    type Error = ClockError<I2C::Error>;

    fn timeout_threshold(&mut self) -> u8 {
        self.storage.read(storage_map::TIMEOUT).max(1)
    }

    fn alarm_armed(&mut self) -> bool {
        self.storage.read(storage_map::ALARM_ENABLED) != 0
    }

    fn alarm_matched(&mut self) -> Result<bool, Self::Error> {
        // A flag left over from a stopped alarm is not a new match.
        if self.stale_match {
            return Ok(false);
        }
        self.clock.alarm_matched()
    }

    fn editor_ready_to_exit(&self) -> bool {
        self.editor.ready_to_exit()
    }
}

pub struct Scheduler<I2C, D, T, S, W> {
    clock: Clock<I2C>,
    display: D,
    tone: T,
    storage: S,
    wake: W,
    machine: ModeMachine,
    editor: Editor,
    ringer: AlarmRinger,
    last_wake: Wake,
    /// The match flag survived a stopped alarm and must be cleared before
    /// the next alarm check.
    alarm_clear_pending: bool,
}

impl<I2C, D, T, S, W> Scheduler<I2C, D, T, S, W>
where
    I2C: I2c,
    D: CharacterDisplay,
    T: Tone,
    S: Storage,
    W: WakeSource,
{
    pub fn new(clock: Clock<I2C>, display: D, tone: T, storage: S, wake: W, config: Config) -> Self {
        Self {
            clock,
            display,
            tone,
            storage,
            wake,
            machine: ModeMachine::new(),
            editor: Editor::new(),
            ringer: AlarmRinger::new(config.alarm_tone_hz),
            last_wake: Wake {
                reason: WakeupReason::Startup,
                buttons: ButtonSnapshot::IDLE,
            },
            alarm_clear_pending: false,
        }
    }

    /// Configures alarm 2 masking and recovers from a stopped oscillator.
    pub fn init(&mut self) -> Result<(), ClockError<I2C::Error>> {
        self.clock.init()?;
        if self.clock.recover_oscillator_stop()? {
            info!("clock was reset after an oscillator stop");
        }
        Ok(())
    }

    /// Runs cycles forever.
    pub fn run(mut self) -> ! {
        loop {
            self.cycle();
        }
    }

    /// One full cycle: entry and per-cycle work, the wait, then the
    /// transition. Returns the mode for the next cycle.
    ///
    /// A failed step is logged and the current mode is entered again next
    /// cycle. The wait always happens.
    pub fn cycle(&mut self) -> Mode {
        if let Err(e) = self.service() {
            error!("{:?} fault in {:?}", e.kind(), self.machine.mode());
            self.machine.request_entry();
        }

        let wake = self.wake.wait_for_wake();
        self.last_wake = wake;

        if let Err(e) = self.transition(&wake) {
            error!("{:?} fault deciding next mode", e.kind());
        }
        self.machine.mode()
    }

    fn alarm_armed(&mut self) -> bool {
        self.storage.read(storage_map::ALARM_ENABLED) != 0
    }

    fn service(&mut self) -> Result<(), Error<I2C::Error, D::Error>> {
        let mode = self.machine.mode();
        let entering = self.machine.take_pending_entry();

        if self.alarm_clear_pending {
            self.clock.clear_alarm_match()?;
            self.alarm_clear_pending = false;
            info!("cleared a leftover alarm match");
        }

        if entering {
            self.clock.configure_tick(mode.tick_source())?;
            match mode {
                Mode::Display => {
                    let armed = self.alarm_armed();
                    face::setup(&mut self.clock, &mut self.display, armed)?;
                }
                Mode::Sleep => self.display.power_off().map_err(Error::Display)?,
                Mode::SettingsEdit => {
                    self.editor
                        .begin(&mut self.clock, &mut self.display, &mut self.storage)?
                }
                Mode::Alarming => {
                    self.ringer
                        .setup(&mut self.clock, &mut self.display, &mut self.tone)?
                }
            }
            info!("entered {:?}", mode);
        }

        match mode {
            Mode::Display if !entering => face::update(&mut self.clock, &mut self.display)?,
            Mode::Display | Mode::Sleep => {}
            Mode::SettingsEdit => {
                // The press that opened the editor is not an edit.
                let buttons = if !entering && self.last_wake.reason == WakeupReason::ButtonEdge {
                    self.last_wake.buttons
                } else {
                    ButtonSnapshot::IDLE
                };
                self.editor.update(
                    buttons,
                    &mut self.clock,
                    &mut self.display,
                    &mut self.storage,
                )?;
            }
            Mode::Alarming => self.ringer.update(&mut self.tone),
        }
        Ok(())
    }

    fn transition(&mut self, wake: &Wake) -> Result<(), ClockError<I2C::Error>> {
        let mut inputs = Inputs {
            clock: &mut self.clock,
            storage: &mut self.storage,
            editor: &self.editor,
            stale_match: self.alarm_clear_pending,
        };
        let Some(transition) = self.machine.on_wake(wake, &mut inputs)? else {
            return Ok(());
        };
        debug!("{:?} -> {:?}", transition.from, transition.to);

        match transition.from {
            Mode::Alarming => {
                if let Err(e) = self.ringer.stop(&mut self.clock, &mut self.tone) {
                    self.alarm_clear_pending = true;
                    return Err(e);
                }
            }
            Mode::SettingsEdit => self.editor.clear_exit_flag(),
            Mode::Display | Mode::Sleep => {}
        }
        Ok(())
    }

    pub fn mode(&self) -> Mode {
        self.machine.mode()
    }

    pub fn timeout_counter(&self) -> u8 {
        self.machine.timeout_counter()
    }

    pub fn clock(&self) -> &Clock<I2C> {
        &self.clock
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn tone(&self) -> &T {
        &self.tone
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn ringer(&self) -> &AlarmRinger {
        &self.ringer
    }

    pub fn release(self) -> (Clock<I2C>, D, T, S, W) {
        (self.clock, self.display, self.tone, self.storage, self.wake)
    }
}
