#![no_std]
#![cfg_attr(not(test), no_main)]

// SPDX-FileCopyrightText: 2025 Google LLC
//
// SPDX-License-Identifier: Apache-2.0

use colorlight_sys::i2c::I2C;
use colorlight_sys::uart::Uart;
use ufmt::uwriteln;

#[cfg(not(test))]
use riscv_rt::entry;

const I2C_ADDR: *mut u8 = (0b0100 << 28) as *mut u8;
const UART_ADDR: *const () = (0b0110 << 28) as *const ();

const I2C_CLK_DIV: u16 = 300;

// 7-bit address range outside the blocks reserved by the standard.
const FIRST_ADDRESS: u8 = 0x08;
const LAST_ADDRESS: u8 = 0x77;

#[cfg_attr(not(test), entry)]
fn main() -> ! {
    let mut uart = unsafe { Uart::new(UART_ADDR) };
    let mut i2c = unsafe { I2C::new(I2C_ADDR) };

    uwriteln!(uart, "I2C bus scan").unwrap();

    i2c.init();
    i2c.set_clock_divider(I2C_CLK_DIV);

    let mut found: u32 = 0;
    for address in FIRST_ADDRESS..=LAST_ADDRESS {
        match i2c.probe(address) {
            Ok(true) => {
                uwriteln!(uart, "device at 0x{:02X}", address).unwrap();
                found += 1;
            }
            Ok(false) => {}
            Err(e) => {
                uwriteln!(uart, "scan failed at 0x{:02X}: {:?}", address, e).unwrap();
            }
        }
    }
    uwriteln!(uart, "found {} device(s)", found).unwrap();

    loop {
        continue;
    }
}

#[panic_handler]
fn panic_handler(_info: &core::panic::PanicInfo) -> ! {
    loop {
        continue;
    }
}
