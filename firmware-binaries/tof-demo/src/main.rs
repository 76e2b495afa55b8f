#![no_std]
#![cfg_attr(not(test), no_main)]

// SPDX-FileCopyrightText: 2025 Google LLC
//
// SPDX-License-Identifier: Apache-2.0

use colorlight_sys::display::format_distance;
use colorlight_sys::i2c::I2C;
use colorlight_sys::time::{Clock, Duration};
use colorlight_sys::uart::log::LOGGER;
use colorlight_sys::uart::Uart;
use colorlight_sys::vl53l0x::{self, Vl53l0x};
use heapless::String;
use log::{error, info, LevelFilter};
use ufmt::uwriteln;

#[cfg(not(test))]
use riscv_rt::entry;

const TIMER_ADDR: *const u32 = (0b0010 << 28) as *const u32;
const I2C_ADDR: *mut u8 = (0b0100 << 28) as *mut u8;
const UART_ADDR: *const () = (0b0110 << 28) as *const ();

const I2C_CLK_DIV: u16 = 300;

/// Pause between measurement cycles.
const CYCLE_DELAY: Duration = Duration::from_millis(500);

#[allow(static_mut_refs)]
#[cfg_attr(not(test), entry)]
fn main() -> ! {
    let mut uart = unsafe { Uart::new(UART_ADDR) };
    let clock = unsafe { Clock::new(TIMER_ADDR) };
    let mut i2c = unsafe { I2C::new(I2C_ADDR) };

    unsafe {
        LOGGER.set_logger(uart.clone());
        LOGGER.display_source = LevelFilter::Off;
        log::set_logger_racy(&*core::ptr::addr_of!(LOGGER)).ok();
        log::set_max_level_racy(LevelFilter::Info);
    }

    uwriteln!(uart, "VL53L0X ranging demo").unwrap();

    i2c.init();
    i2c.set_clock_divider(I2C_CLK_DIV);

    let mut sensor = Vl53l0x::new(i2c);
    if let Err(e) = sensor.init() {
        error!("sensor init failed: {:?}", e);
        halt();
    }
    info!("sensor ready, polling every {} ms", CYCLE_DELAY.to_millis());

    let mut line: String<8> = String::new();
    loop {
        match sensor.start_measurement() {
            Ok(()) => match sensor.read_distance(&clock) {
                Ok(distance) if vl53l0x::is_valid_distance(distance) => {
                    line.clear();
                    format_distance(distance, &mut line).unwrap();
                    uwriteln!(uart, "Distance: {}", line.as_str()).unwrap();
                }
                Ok(_) => error!("reading out of range"),
                Err(e) => error!("measurement failed: {:?}", e),
            },
            Err(e) => error!("could not start measurement: {:?}", e),
        }

        clock.wait(CYCLE_DELAY);
    }
}

fn halt() -> ! {
    loop {
        continue;
    }
}

#[panic_handler]
fn panic_handler(_info: &core::panic::PanicInfo) -> ! {
    halt()
}
