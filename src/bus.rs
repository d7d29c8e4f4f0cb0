//! Two-wire serial master engine.
//!
//! The engine drives a TWI style peripheral through its raw control, status,
//! data and bit-rate registers (see [`TwiRegisters`]). Every phase of a
//! transfer is a command written to the control register followed by a
//! bounded busy-wait on the interrupt flag; the status code is then checked
//! against the outcome the phase expects.
//!
//! The low level phases are public so callers can overlap work with a
//! transfer in flight. [`TwiMaster`] also implements
//! [`embedded_hal::i2c::I2c`], which is what the clock driver uses: each
//! transaction is retried after a bus reset when a phase times out or the
//! slave does not acknowledge.

use bitfield::bitfield;
use embedded_hal::i2c::{self, ErrorKind, NoAcknowledgeSource, Operation};

/// SCL frequency of the bus.
pub const SCL_HZ: u32 = 100_000;

/// Slowest CPU clock the bit-rate divider can produce `SCL_HZ` from.
pub const MIN_CPU_HZ: u32 = 2_000_000;

/// Fastest CPU clock whose divider still fits the 8-bit bit-rate register.
pub const MAX_CPU_HZ: u32 = (255 * 2 + 16) * SCL_HZ;

bitfield! {
    /// TWI control register.
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    pub struct TwiControl(u8);
    impl Debug;
    /// Set by hardware when the current phase is done; writing 1 starts the next one.
    pub interrupt_flag, set_interrupt_flag: 7;
    pub enable_ack, set_enable_ack: 6;
    pub start, set_start: 5;
    /// Stays set until the stop condition has been sent.
    pub stop, set_stop: 4;
    pub write_collision, _: 3;
    pub enable, set_enable: 2;
    pub interrupt_enable, set_interrupt_enable: 0;
}

impl TwiControl {
    /// Send a (repeated) start condition.
    pub const START: Self = Self(0b1010_0100);
    /// Send a stop condition.
    pub const STOP: Self = Self(0b1001_0100);
    /// Clock a byte and answer it with ACK.
    pub const TRANSFER_ACK: Self = Self(0b1100_0100);
    /// Clock a byte without ACK (writes, addresses, last read byte).
    pub const TRANSFER_NACK: Self = Self(0b1000_0100);
    /// Peripheral enabled and idle.
    pub const IDLE: Self = Self(0b0000_0100);
    /// Peripheral disabled; releases both bus lines.
    pub const DISABLED: Self = Self(0b0000_0000);
}

impl From<u8> for TwiControl {
    fn from(v: u8) -> Self {
        Self(v)
    }
}

impl From<TwiControl> for u8 {
    fn from(v: TwiControl) -> Self {
        v.0
    }
}

bitfield! {
    /// TWI status register.
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    pub struct TwiStatus(u8);
    impl Debug;
    pub code, _: 7, 3;
    pub prescaler, set_prescaler: 1, 0;
}

impl TwiStatus {
    pub fn condition(&self) -> BusCondition {
        BusCondition::from(self.0 & 0xF8)
    }
}

impl From<u8> for TwiStatus {
    fn from(v: u8) -> Self {
        Self(v)
    }
}

/// Master-mode status codes reported after each phase.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusCondition {
    StartSent,
    RepeatedStartSent,
    AddressWriteAck,
    AddressWriteNack,
    DataSentAck,
    DataSentNack,
    ArbitrationLost,
    AddressReadAck,
    AddressReadNack,
    DataReceivedAck,
    DataReceivedNack,
    /// Any other status, masked to its upper five bits.
    Other(u8),
}

impl From<u8> for BusCondition {
    fn from(v: u8) -> Self {
        match v & 0xF8 {
            0x08 => BusCondition::StartSent,
            0x10 => BusCondition::RepeatedStartSent,
            0x18 => BusCondition::AddressWriteAck,
            0x20 => BusCondition::AddressWriteNack,
            0x28 => BusCondition::DataSentAck,
            0x30 => BusCondition::DataSentNack,
            0x38 => BusCondition::ArbitrationLost,
            0x40 => BusCondition::AddressReadAck,
            0x48 => BusCondition::AddressReadNack,
            0x50 => BusCondition::DataReceivedAck,
            0x58 => BusCondition::DataReceivedNack,
            other => BusCondition::Other(other),
        }
    }
}

impl From<BusCondition> for u8 {
    fn from(v: BusCondition) -> Self {
        match v {
            BusCondition::StartSent => 0x08,
            BusCondition::RepeatedStartSent => 0x10,
            BusCondition::AddressWriteAck => 0x18,
            BusCondition::AddressWriteNack => 0x20,
            BusCondition::DataSentAck => 0x28,
            BusCondition::DataSentNack => 0x30,
            BusCondition::ArbitrationLost => 0x38,
            BusCondition::AddressReadAck => 0x40,
            BusCondition::AddressReadNack => 0x48,
            BusCondition::DataReceivedAck => 0x50,
            BusCondition::DataReceivedNack => 0x58,
            BusCondition::Other(code) => code,
        }
    }
}

/// Read/write bit appended to the slave address.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Write = 0,
    Read = 1,
}

/// Raw access to the TWI peripheral registers.
///
/// Reads take `&mut self` because hardware register reads are volatile.
pub trait TwiRegisters {
    fn control(&mut self) -> TwiControl;
    fn set_control(&mut self, control: TwiControl);
    fn status(&mut self) -> TwiStatus;
    fn data(&mut self) -> u8;
    fn set_data(&mut self, data: u8);
    fn set_bit_rate(&mut self, divisor: u8);
}

/// Bus timing and recovery settings.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusConfig {
    /// Bit-rate register value (prescaler 1).
    pub bit_rate: u8,
    /// Polls of the control register before a phase is declared timed out.
    pub poll_limit: u32,
    /// Times a failed transaction is run before the error is returned.
    pub attempts: u8,
}

impl BusConfig {
    pub const DEFAULT_POLL_LIMIT: u32 = 10_000;
    pub const DEFAULT_ATTEMPTS: u8 = 3;

    /// Settings for a 100 kHz bus on a CPU clocked at `CPU_HZ`.
    ///
    /// Fails to build if `CPU_HZ` is outside what the divider supports.
    pub const fn for_cpu_clock<const CPU_HZ: u32>() -> Self {
        const {
            assert!(
                CPU_HZ >= MIN_CPU_HZ,
                "minimum supported CPU clock for the bus is 2 MHz"
            );
            assert!(
                CPU_HZ <= MAX_CPU_HZ,
                "CPU clock too fast for the 8-bit bit-rate divider"
            );
        }
        Self {
            bit_rate: ((CPU_HZ / SCL_HZ - 16) / 2) as u8,
            poll_limit: Self::DEFAULT_POLL_LIMIT,
            attempts: Self::DEFAULT_ATTEMPTS,
        }
    }

    pub const fn with_poll_limit(mut self, poll_limit: u32) -> Self {
        self.poll_limit = poll_limit;
        self
    }

    pub const fn with_attempts(mut self, attempts: u8) -> Self {
        self.attempts = attempts;
        self
    }
}

impl Default for BusConfig {
    fn default() -> Self {
        Self::for_cpu_clock::<16_000_000>()
    }
}

/// Bus failures.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BusError {
    /// A phase did not complete within the poll budget.
    Timeout,
    /// The slave did not acknowledge.
    Nack(NoAcknowledgeSource),
    ArbitrationLost,
    /// The peripheral reported a status the phase does not expect.
    Unexpected(u8),
}

impl i2c::Error for BusError {
    fn kind(&self) -> ErrorKind {
        match *self {
            BusError::Timeout => ErrorKind::Other,
            BusError::Nack(source) => ErrorKind::NoAcknowledge(source),
            BusError::ArbitrationLost => ErrorKind::ArbitrationLoss,
            BusError::Unexpected(_) => ErrorKind::Bus,
        }
    }
}

/// Single-master TWI engine.
pub struct TwiMaster<R> {
    regs: R,
    config: BusConfig,
}

impl<R: TwiRegisters> TwiMaster<R> {
    /// Programs the bit rate and enables the peripheral.
    pub fn new(mut regs: R, config: BusConfig) -> Self {
        regs.set_bit_rate(config.bit_rate);
        regs.set_control(TwiControl::IDLE);
        Self { regs, config }
    }

    pub fn config(&self) -> &BusConfig {
        &self.config
    }

    pub fn registers_mut(&mut self) -> &mut R {
        &mut self.regs
    }

    /// Disables the peripheral and hands back its registers.
    pub fn release(mut self) -> R {
        self.regs.set_control(TwiControl::DISABLED);
        self.regs
    }

    pub fn send_start(&mut self) {
        self.regs.set_control(TwiControl::START);
    }

    /// Must be followed by [`busy_wait_stop`](Self::busy_wait_stop), not `busy_wait`.
    pub fn send_stop(&mut self) {
        self.regs.set_control(TwiControl::STOP);
    }

    pub fn transfer_complete(&mut self) -> bool {
        self.regs.control().interrupt_flag()
    }

    /// Polls until the current phase has finished.
    pub fn busy_wait(&mut self) -> Result<(), BusError> {
        for _ in 0..self.config.poll_limit {
            if self.transfer_complete() {
                return Ok(());
            }
        }
        Err(BusError::Timeout)
    }

    /// Polls until the stop condition has left the bus.
    pub fn busy_wait_stop(&mut self) -> Result<(), BusError> {
        for _ in 0..self.config.poll_limit {
            if !self.regs.control().stop() {
                return Ok(());
            }
        }
        Err(BusError::Timeout)
    }

    pub fn status(&mut self) -> BusCondition {
        self.regs.status().condition()
    }

    pub fn set_address_and_direction(&mut self, address: u8, direction: Direction) {
        self.regs.set_data((address << 1) | direction as u8);
    }

    pub fn set_byte(&mut self, byte: u8) {
        self.regs.set_data(byte);
    }

    pub fn transfer_then_ack(&mut self) {
        self.regs.set_control(TwiControl::TRANSFER_ACK);
    }

    pub fn transfer_then_nack(&mut self) {
        self.regs.set_control(TwiControl::TRANSFER_NACK);
    }

    /// Clocks out the address loaded by
    /// [`set_address_and_direction`](Self::set_address_and_direction).
    pub fn transfer_address(&mut self) {
        self.transfer_then_nack();
    }

    pub fn received_byte(&mut self) -> u8 {
        self.regs.data()
    }

    /// Start condition followed by the address phase.
    pub fn begin_transfer(&mut self, address: u8, direction: Direction) -> Result<(), BusError> {
        self.send_start();
        self.busy_wait()?;
        self.check(&[BusCondition::StartSent, BusCondition::RepeatedStartSent])?;

        self.set_address_and_direction(address, direction);
        self.transfer_address();
        self.busy_wait()?;
        match direction {
            Direction::Write => self.check(&[BusCondition::AddressWriteAck]),
            Direction::Read => self.check(&[BusCondition::AddressReadAck]),
        }
    }

    pub fn end_transfer(&mut self) -> Result<(), BusError> {
        self.send_stop();
        self.busy_wait_stop()
    }

    /// Writes one byte. Every written byte uses the NACK command; the
    /// slave's own acknowledge is still checked.
    pub fn send_byte(&mut self, byte: u8) -> Result<(), BusError> {
        self.set_byte(byte);
        self.transfer_then_nack();
        self.busy_wait()?;
        self.check(&[BusCondition::DataSentAck])
    }

    /// Reads a byte that is not the last of the burst.
    pub fn receive_byte(&mut self) -> Result<u8, BusError> {
        self.transfer_then_ack();
        self.busy_wait()?;
        self.check(&[BusCondition::DataReceivedAck])?;
        Ok(self.received_byte())
    }

    /// Reads the final byte of a burst, NACKing it so the slave lets go of SDA.
    pub fn receive_last_byte(&mut self) -> Result<u8, BusError> {
        self.transfer_then_nack();
        self.busy_wait()?;
        self.check(&[BusCondition::DataReceivedNack])?;
        Ok(self.received_byte())
    }

    /// Sends a stop and power cycles the peripheral enable bit, which drops
    /// any half finished transfer.
    pub fn recover(&mut self) {
        self.send_stop();
        if self.busy_wait_stop().is_err() {
            warn!("stop condition did not complete during bus recovery");
        }
        self.regs.set_control(TwiControl::DISABLED);
        self.regs.set_control(TwiControl::IDLE);
    }

    fn check(&mut self, accepted: &[BusCondition]) -> Result<(), BusError> {
        let status = self.status();
        if accepted.contains(&status) {
            return Ok(());
        }
        Err(match status {
            BusCondition::AddressWriteNack | BusCondition::AddressReadNack => {
                BusError::Nack(NoAcknowledgeSource::Address)
            }
            BusCondition::DataSentNack => BusError::Nack(NoAcknowledgeSource::Data),
            BusCondition::ArbitrationLost => BusError::ArbitrationLost,
            other => BusError::Unexpected(other.into()),
        })
    }

    fn run_operations(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), BusError> {
        let mut current: Option<Direction> = None;
        for index in 0..operations.len() {
            // The final byte of a run of adjacent reads is NACKed, even when
            // empty read buffers trail it.
            let more_to_read = operations[index + 1..]
                .iter()
                .take_while(|op| matches!(op, Operation::Read(_)))
                .any(|op| matches!(op, Operation::Read(buffer) if !buffer.is_empty()));
            match &mut operations[index] {
                Operation::Write(bytes) => {
                    if current != Some(Direction::Write) {
                        self.begin_transfer(address, Direction::Write)?;
                        current = Some(Direction::Write);
                    }
                    for &byte in bytes.iter() {
                        self.send_byte(byte)?;
                    }
                }
                Operation::Read(buffer) => {
                    if current != Some(Direction::Read) {
                        self.begin_transfer(address, Direction::Read)?;
                        current = Some(Direction::Read);
                    }
                    let last = buffer.len().saturating_sub(1);
                    for (i, slot) in buffer.iter_mut().enumerate() {
                        *slot = if i == last && !more_to_read {
                            self.receive_last_byte()?
                        } else {
                            self.receive_byte()?
                        };
                    }
                }
            }
        }
        self.end_transfer()
    }
}

impl<R: TwiRegisters> i2c::ErrorType for TwiMaster<R> {
    type Error = BusError;
}

impl<R: TwiRegisters> i2c::I2c for TwiMaster<R> {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if operations.is_empty() {
            return Ok(());
        }
        let attempts = self.config.attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.run_operations(address, operations) {
                Ok(()) => return Ok(()),
                Err(e) => {
                    self.recover();
                    if attempt >= attempts {
                        error!(
                            "transaction to {:#x} failed after {} attempts",
                            address, attempts
                        );
                        return Err(e);
                    }
                    warn!("transaction to {:#x} failed, retrying", address);
                    attempt += 1;
                }
            }
        }
    }
}
