#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;

use alarm_clock::{
    CharacterDisplay, Clock, Config, Scheduler, Storage, Tone, Wake, WakeSource, RTC_ADDRESS,
};
use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};

/// Register file of a simulated clock chip, shared with the test body.
#[derive(Clone, Default)]
pub struct Chip(Rc<RefCell<ChipState>>);

#[derive(Default)]
pub struct ChipState {
    pub registers: [u8; 19],
    pointer: usize,
    pub transactions: usize,
    /// Register whose writes fail, and how many more times they fail.
    failing_writes: Option<(u8, usize)>,
}

impl Chip {
    pub fn with_registers(registers: &[(u8, u8)]) -> Self {
        let chip = Self::default();
        for &(address, value) in registers {
            chip.set(address, value);
        }
        chip
    }

    pub fn get(&self, address: u8) -> u8 {
        self.0.borrow().registers[usize::from(address)]
    }

    pub fn set(&self, address: u8, value: u8) {
        self.0.borrow_mut().registers[usize::from(address)] = value;
    }

    pub fn registers(&self) -> [u8; 19] {
        self.0.borrow().registers
    }

    pub fn transactions(&self) -> usize {
        self.0.borrow().transactions
    }

    /// The next `times` data writes starting at `address` fail untouched.
    pub fn fail_writes_to(&self, address: u8, times: usize) {
        self.0.borrow_mut().failing_writes = Some((address, times));
    }
}

impl ErrorType for Chip {
    type Error = ErrorKind;
}

impl I2c for Chip {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if address != RTC_ADDRESS {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }
        let mut state = self.0.borrow_mut();
        state.transactions += 1;
        if let Some((register, remaining)) = state.failing_writes {
            let hits = operations.iter().any(|op| {
                matches!(op, Operation::Write(bytes) if bytes.len() > 1 && bytes[0] == register)
            });
            if hits && remaining > 0 {
                state.failing_writes = Some((register, remaining - 1));
                return Err(ErrorKind::Other);
            }
        }
        for operation in operations {
            match operation {
                Operation::Write(bytes) => {
                    let Some((&pointer, data)) = bytes.split_first() else {
                        continue;
                    };
                    state.pointer = usize::from(pointer) % 19;
                    for &byte in data {
                        let pointer = state.pointer;
                        state.registers[pointer] = byte;
                        state.pointer = (pointer + 1) % 19;
                    }
                }
                Operation::Read(buffer) => {
                    for byte in buffer.iter_mut() {
                        let pointer = state.pointer;
                        *byte = state.registers[pointer];
                        state.pointer = (pointer + 1) % 19;
                    }
                }
            }
        }
        Ok(())
    }
}

/// 2x16 character display backed by a DDRAM array.
pub struct FakeDisplay {
    ddram: [u8; 0x80],
    cursor: u8,
    pub powered: bool,
}

impl Default for FakeDisplay {
    fn default() -> Self {
        Self {
            ddram: [b' '; 0x80],
            cursor: 0,
            powered: false,
        }
    }
}

impl FakeDisplay {
    pub fn line(&self, line: usize) -> [u8; 16] {
        let start = if line == 0 { 0x00 } else { 0x40 };
        let mut out = [0u8; 16];
        out.copy_from_slice(&self.ddram[start..start + 16]);
        out
    }
}

impl CharacterDisplay for FakeDisplay {
    type Error = Infallible;

    fn power_on(&mut self) -> Result<(), Infallible> {
        self.powered = true;
        Ok(())
    }

    fn power_off(&mut self) -> Result<(), Infallible> {
        self.powered = false;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), Infallible> {
        self.ddram = [b' '; 0x80];
        self.cursor = 0;
        Ok(())
    }

    fn set_cursor(&mut self, address: u8) -> Result<(), Infallible> {
        self.cursor = address & 0x7F;
        Ok(())
    }

    fn write_char(&mut self, c: u8) -> Result<(), Infallible> {
        self.ddram[usize::from(self.cursor)] = c;
        self.cursor = (self.cursor + 1) & 0x7F;
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeTone {
    pub frequency: Option<u16>,
    pub enabled: bool,
    pub toggles: usize,
}

impl Tone for FakeTone {
    fn set_frequency(&mut self, hz: u16) {
        self.frequency = Some(hz);
    }

    fn enable(&mut self) {
        self.enabled = true;
        self.toggles += 1;
    }

    fn disable(&mut self) {
        self.enabled = false;
        self.toggles += 1;
    }
}

#[derive(Default)]
pub struct FakeStorage {
    pub bytes: [u8; 16],
    pub writes: usize,
}

impl FakeStorage {
    pub fn new(alarm_enabled: u8, timeout: u8) -> Self {
        let mut bytes = [0u8; 16];
        bytes[0] = alarm_enabled;
        bytes[1] = timeout;
        Self { bytes, writes: 0 }
    }
}

impl Storage for FakeStorage {
    fn read(&mut self, address: u16) -> u8 {
        self.bytes[usize::from(address)]
    }

    fn write_if_changed(&mut self, address: u16, value: u8) -> u8 {
        let old = self.bytes[usize::from(address)];
        if old != value {
            self.bytes[usize::from(address)] = value;
            self.writes += 1;
        }
        old
    }
}

/// Wakes handed out in order; the test pushes one before each cycle.
#[derive(Clone, Default)]
pub struct WakeQueue(Rc<RefCell<VecDeque<Wake>>>);

impl WakeQueue {
    pub fn push(&self, wake: Wake) {
        self.0.borrow_mut().push_back(wake);
    }
}

impl WakeSource for WakeQueue {
    fn wait_for_wake(&mut self) -> Wake {
        self.0
            .borrow_mut()
            .pop_front()
            .expect("cycle waited without a scripted wake")
    }
}

pub type TestScheduler = Scheduler<Chip, FakeDisplay, FakeTone, FakeStorage, WakeQueue>;

/// Chip set to 23:59:05 on Friday 31/12/2099, 25 degrees, alarm 2 at 06:30.
pub fn default_chip() -> Chip {
    Chip::with_registers(&[
        (0x00, 0x05),
        (0x01, 0x59),
        (0x02, 0x23),
        (0x03, 0x05),
        (0x04, 0x31),
        (0x05, 0x12),
        (0x06, 0x99),
        (0x0B, 0x30),
        (0x0C, 0x06),
        (0x0D, 0x80),
        (0x11, 0x19),
    ])
}

pub fn scheduler(chip: &Chip, storage: FakeStorage) -> (TestScheduler, WakeQueue) {
    let wakes = WakeQueue::default();
    let mut scheduler = Scheduler::new(
        Clock::new(chip.clone(), RTC_ADDRESS),
        FakeDisplay::default(),
        FakeTone::default(),
        storage,
        wakes.clone(),
        Config::default(),
    );
    scheduler.init().unwrap();
    (scheduler, wakes)
}

/// Pushes `wake` and runs one cycle.
pub fn step(scheduler: &mut TestScheduler, wakes: &WakeQueue, wake: Wake) {
    wakes.push(wake);
    scheduler.cycle();
}
