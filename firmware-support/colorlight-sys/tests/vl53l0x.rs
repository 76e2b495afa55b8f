// SPDX-FileCopyrightText: 2025 Google LLC
//
// SPDX-License-Identifier: Apache-2.0

use std::cell::Cell;

use colorlight_sys::display::format_distance;
use colorlight_sys::i2c::{Bus, I2CError};
use colorlight_sys::time::{Delay, Duration};
use colorlight_sys::vl53l0x::{
    is_valid_distance, Error, PollPolicy, Vl53l0x, DEVICE_ADDRESS, MAX_RELIABLE_DISTANCE_MM,
    MODEL_ID, OUT_OF_RANGE, REG_IDENTIFICATION_MODEL_ID, REG_RESULT_INTERRUPT_STATUS,
    REG_RESULT_RANGE_STATUS, REG_SYSRANGE_START, REG_SYSTEM_INTERRUPT_CLEAR,
};
use heapless::String;

#[derive(Debug, Clone, PartialEq, Eq)]
enum BusOp {
    Read(u8),
    Write(u8, Vec<u8>),
}

/// Fake transport that answers the driver's register accesses and records
/// every transaction in order.
struct FakeBus {
    model_id: u8,
    /// Number of interrupt status polls that report "still measuring"
    /// before the fake flips to ready.
    busy_polls: u32,
    distance: u16,
    status_polls: u32,
    log: Vec<BusOp>,
}

impl FakeBus {
    fn with_model(model_id: u8) -> FakeBus {
        FakeBus {
            model_id,
            busy_polls: 0,
            distance: 0,
            status_polls: 0,
            log: Vec::new(),
        }
    }

    fn ranging(distance: u16, busy_polls: u32) -> FakeBus {
        FakeBus {
            distance,
            busy_polls,
            ..FakeBus::with_model(MODEL_ID)
        }
    }

    fn writes(&self) -> Vec<(u8, Vec<u8>)> {
        self.log
            .iter()
            .filter_map(|op| match op {
                BusOp::Write(reg, data) => Some((*reg, data.clone())),
                BusOp::Read(_) => None,
            })
            .collect()
    }

    fn position(&self, op: &BusOp) -> Option<usize> {
        self.log.iter().position(|logged| logged == op)
    }
}

impl Bus for FakeBus {
    fn read_regs(&mut self, device_addr: u8, reg: u8, buf: &mut [u8]) -> Result<(), I2CError> {
        assert_eq!(device_addr, DEVICE_ADDRESS);
        self.log.push(BusOp::Read(reg));
        match reg {
            REG_IDENTIFICATION_MODEL_ID => buf[0] = self.model_id,
            REG_RESULT_INTERRUPT_STATUS => {
                let ready = self.status_polls >= self.busy_polls;
                self.status_polls += 1;
                buf[0] = if ready { 0x04 } else { 0x00 };
            }
            REG_RESULT_RANGE_STATUS => buf.copy_from_slice(&self.distance.to_be_bytes()),
            _ => buf.fill(0),
        }
        Ok(())
    }

    fn write_regs(&mut self, device_addr: u8, reg: u8, data: &[u8]) -> Result<(), I2CError> {
        assert_eq!(device_addr, DEVICE_ADDRESS);
        self.log.push(BusOp::Write(reg, data.to_vec()));
        Ok(())
    }
}

#[derive(Default)]
struct CountingDelay {
    calls: Cell<u32>,
}

impl Delay for CountingDelay {
    fn delay(&self, _duration: Duration) {
        self.calls.set(self.calls.get() + 1);
    }
}

const SHORT_POLL: PollPolicy = PollPolicy {
    attempts: 5,
    interval: Duration::from_millis(1),
};

#[test]
fn init_rejects_unknown_model() {
    let mut bus = FakeBus::with_model(0xAA);
    {
        let mut sensor = Vl53l0x::new(&mut bus);
        assert_eq!(sensor.init(), Err(Error::UnknownModel(0xAA)));
    }
    assert_eq!(bus.log, vec![BusOp::Read(REG_IDENTIFICATION_MODEL_ID)]);
}

#[test]
fn init_writes_configuration_in_order() {
    let mut bus = FakeBus::with_model(MODEL_ID);
    {
        let mut sensor = Vl53l0x::new(&mut bus);
        assert_eq!(sensor.init(), Ok(()));
    }
    let expected = [
        (0x88, 0x00),
        (0x80, 0x01),
        (0xFF, 0x01),
        (0x00, 0x00),
        (REG_SYSRANGE_START, 0x01),
        (REG_SYSTEM_INTERRUPT_CLEAR, 0x01),
        (0x01, 0x01),
        (0x0D, 0x14),
    ];
    let writes = bus.writes();
    assert_eq!(writes.len(), expected.len());
    for ((reg, data), (expected_reg, expected_value)) in writes.iter().zip(expected) {
        assert_eq!(*reg, expected_reg);
        assert_eq!(data.as_slice(), &[expected_value]);
    }
}

#[test]
fn start_measurement_writes_sysrange_start() {
    let mut bus = FakeBus::with_model(MODEL_ID);
    {
        let mut sensor = Vl53l0x::new(&mut bus);
        assert_eq!(sensor.start_measurement(), Ok(()));
    }
    assert_eq!(bus.log, vec![BusOp::Write(REG_SYSRANGE_START, vec![0x01])]);
}

#[test]
fn is_ready_checks_low_status_bits() {
    let mut bus = FakeBus::ranging(0, 1);
    let mut sensor = Vl53l0x::new(&mut bus);
    assert_eq!(sensor.is_ready(), Ok(false));
    assert_eq!(sensor.is_ready(), Ok(true));
}

#[test]
fn read_distance_times_out_without_touching_results() {
    let mut bus = FakeBus::ranging(1234, u32::MAX);
    let delay = CountingDelay::default();
    {
        let mut sensor = Vl53l0x::with_poll_policy(&mut bus, SHORT_POLL);
        assert_eq!(sensor.read_distance(&delay), Err(Error::Timeout));
    }
    // One status poll per attempt plus the initial check, one delay per
    // attempt, and nothing else on the bus: no result read, no interrupt
    // clear.
    assert_eq!(delay.calls.get(), SHORT_POLL.attempts);
    assert_eq!(bus.log.len(), SHORT_POLL.attempts as usize + 1);
    assert!(bus
        .log
        .iter()
        .all(|op| *op == BusOp::Read(REG_RESULT_INTERRUPT_STATUS)));
}

#[test]
fn read_distance_decodes_big_endian_and_clears_interrupt() {
    let mut bus = FakeBus::ranging(0x04D2, 3);
    let delay = CountingDelay::default();
    {
        let mut sensor = Vl53l0x::with_poll_policy(&mut bus, SHORT_POLL);
        assert_eq!(sensor.read_distance(&delay), Ok(1234));
    }
    assert_eq!(delay.calls.get(), 3);
    let result_read = bus.position(&BusOp::Read(REG_RESULT_RANGE_STATUS));
    let interrupt_clear = bus.position(&BusOp::Write(REG_SYSTEM_INTERRUPT_CLEAR, vec![0x01]));
    assert!(result_read.is_some());
    assert!(interrupt_clear > result_read);
}

#[test]
fn measure_triggers_then_reads() {
    let mut bus = FakeBus::ranging(567, 0);
    let delay = CountingDelay::default();
    {
        let mut sensor = Vl53l0x::new(&mut bus);
        assert_eq!(sensor.measure(&delay), Ok(567));
    }
    assert_eq!(bus.log[0], BusOp::Write(REG_SYSRANGE_START, vec![0x01]));
    assert_eq!(delay.calls.get(), 0);
}

#[test]
fn valid_distance_is_strictly_below_the_reliable_maximum() {
    assert!(is_valid_distance(0));
    assert!(is_valid_distance(MAX_RELIABLE_DISTANCE_MM - 1));
    assert!(!is_valid_distance(MAX_RELIABLE_DISTANCE_MM));
    assert!(!is_valid_distance(OUT_OF_RANGE));
}

#[test]
fn measurements_render_like_the_display_shows_them() {
    let cases = [
        (45, "45 mm", true),
        (567, "56 cm", true),
        (1234, "1.23 m", true),
        (2500, ">2m", false),
    ];
    for (distance, rendered, valid) in cases {
        let mut bus = FakeBus::ranging(distance, 1);
        let delay = CountingDelay::default();
        let mut sensor = Vl53l0x::new(&mut bus);
        let measured = sensor.measure(&delay).unwrap();
        assert_eq!(measured, distance);
        assert_eq!(is_valid_distance(measured), valid);

        let mut line: String<8> = String::new();
        format_distance(measured, &mut line).unwrap();
        assert_eq!(line.as_str(), rendered);
    }
}
