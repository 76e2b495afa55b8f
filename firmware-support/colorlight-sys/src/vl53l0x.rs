// SPDX-FileCopyrightText: 2025 Google LLC
//
// SPDX-License-Identifier: Apache-2.0
/*! Driver for the VL53L0X time-of-flight distance sensor.

Single-shot ranging only: every measurement is triggered explicitly with
[`Vl53l0x::start_measurement`] and collected with [`Vl53l0x::read_distance`],
which polls the interrupt status register until the sensor reports a result
or the poll budget runs out. The driver assumes it is the only user of the
bus and that at most one measurement is outstanding.
*/

use ufmt::derive::uDebug;
use ufmt::uDebug;

use crate::i2c::{Bus, I2CError};
use crate::time::{Delay, Duration};

/// 7-bit bus address of the VL53L0X.
pub const DEVICE_ADDRESS: u8 = 0x29;

pub const REG_SYSRANGE_START: u8 = 0x00;
pub const REG_SYSTEM_INTERRUPT_CLEAR: u8 = 0x0B;
pub const REG_RESULT_INTERRUPT_STATUS: u8 = 0x13;
pub const REG_RESULT_RANGE_STATUS: u8 = 0x14;
pub const REG_IDENTIFICATION_MODEL_ID: u8 = 0xC0;

/// Value the identification register reports for this sensor type.
pub const MODEL_ID: u8 = 0xEE;

/// Value the sensor reports when a target is out of measuring range.
pub const OUT_OF_RANGE: u16 = 0xFFFF;

/// Readings at or above this are unreliable with the configured timing
/// budget and must be rejected by the caller.
pub const MAX_RELIABLE_DISTANCE_MM: u16 = 2000;

#[derive(Debug, uDebug, Copy, Clone, PartialEq, Eq)]
pub enum Error {
    /// The identification register did not report [`MODEL_ID`].
    UnknownModel(u8),
    /// The sensor did not report a result within the poll budget.
    Timeout,
    /// The bus transaction itself failed.
    Bus(I2CError),
}

impl From<I2CError> for Error {
    fn from(e: I2CError) -> Self {
        Error::Bus(e)
    }
}

impl ufmt::uDisplay for Error {
    fn fmt<W>(&self, f: &mut ufmt::Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: ufmt::uWrite + ?Sized,
    {
        <Error as uDebug>::fmt(self, f)
    }
}

/// How long [`Vl53l0x::read_distance`] keeps polling before giving up:
/// `attempts` retries spaced `interval` apart.
#[derive(Copy, Clone)]
pub struct PollPolicy {
    pub attempts: u32,
    pub interval: Duration,
}

/// Roughly one second of polling at the sensor's 20 ms timing budget.
pub const DEFAULT_POLL: PollPolicy = PollPolicy {
    attempts: 1000,
    interval: Duration::from_millis(1),
};

pub struct Vl53l0x<B> {
    bus: B,
    poll: PollPolicy,
}

impl<B: Bus> Vl53l0x<B> {
    pub fn new(bus: B) -> Vl53l0x<B> {
        Vl53l0x::with_poll_policy(bus, DEFAULT_POLL)
    }

    pub fn with_poll_policy(bus: B, poll: PollPolicy) -> Vl53l0x<B> {
        Vl53l0x { bus, poll }
    }

    fn read_reg(&mut self, reg: u8) -> Result<u8, I2CError> {
        let mut value = [0];
        self.bus.read_regs(DEVICE_ADDRESS, reg, &mut value)?;
        Ok(value[0])
    }

    fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), I2CError> {
        self.bus.write_regs(DEVICE_ADDRESS, reg, &[value])
    }

    /// Check that the sensor is present and put it in single-shot ranging
    /// mode.
    ///
    /// An unrecognized identification register aborts before any
    /// configuration write is issued.
    pub fn init(&mut self) -> Result<(), Error> {
        let model_id = self.read_reg(REG_IDENTIFICATION_MODEL_ID)?;
        if model_id != MODEL_ID {
            return Err(Error::UnknownModel(model_id));
        }

        // Vendor-supplied power-on defaults.
        self.write_reg(0x88, 0x00)?;
        self.write_reg(0x80, 0x01)?;
        self.write_reg(0xFF, 0x01)?;
        self.write_reg(0x00, 0x00)?;

        // Stop any ranging left over from before a reset.
        self.write_reg(REG_SYSRANGE_START, 0x01)?;
        self.write_reg(REG_SYSTEM_INTERRUPT_CLEAR, 0x01)?;

        // Single-shot mode, 20 ms timing budget.
        self.write_reg(0x01, 0x01)?;
        self.write_reg(0x0D, 0x14)?;

        Ok(())
    }

    /// Trigger a single-shot measurement. Does not block; poll with
    /// [`Vl53l0x::is_ready`] or collect with [`Vl53l0x::read_distance`].
    pub fn start_measurement(&mut self) -> Result<(), I2CError> {
        self.write_reg(REG_SYSRANGE_START, 0x01)
    }

    /// Whether a triggered measurement has completed.
    pub fn is_ready(&mut self) -> Result<bool, I2CError> {
        let status = self.read_reg(REG_RESULT_INTERRUPT_STATUS)?;
        Ok(status & 0x07 != 0)
    }

    /// Wait for the running measurement and return its distance in
    /// millimeters.
    ///
    /// Polls within the configured [`PollPolicy`]; [`Error::Timeout`] if the
    /// sensor never reports a result. On success the interrupt status is
    /// cleared, which the hardware requires before the next measurement can
    /// be triggered.
    pub fn read_distance(&mut self, delay: &impl Delay) -> Result<u16, Error> {
        let mut remaining = self.poll.attempts;
        loop {
            if self.is_ready()? {
                break;
            }
            if remaining == 0 {
                return Err(Error::Timeout);
            }
            remaining -= 1;
            delay.delay(self.poll.interval);
        }

        let mut raw = [0; 2];
        self.bus
            .read_regs(DEVICE_ADDRESS, REG_RESULT_RANGE_STATUS, &mut raw)?;
        self.write_reg(REG_SYSTEM_INTERRUPT_CLEAR, 0x01)?;

        Ok(u16::from_be_bytes(raw))
    }

    /// Trigger a measurement and block until its result is in.
    pub fn measure(&mut self, delay: &impl Delay) -> Result<u16, Error> {
        self.start_measurement()?;
        self.read_distance(delay)
    }
}

/// Whether a reading is within the range the sensor measures reliably.
pub fn is_valid_distance(distance_mm: u16) -> bool {
    distance_mm < MAX_RELIABLE_DISTANCE_MM
}
