//! Build-time configuration of the bridge.
//!
//! The baud rate can be overridden when building:
//!
//! ```text
//! WIIBB_BAUD_RATE=230400 cargo build
//! ```
//!
//! A value that is not a decimal number fails the build.

use wiibb_core::{SerialConfig, DEFAULT_BAUD_RATE};

/// Hardware UART carrying the reading stream.
pub const OUTPUT_UART: u8 = 1;

/// GPIO used for UART1 TX. Must match the pin passed to `UartTx::new`.
pub const TX_GPIO: u8 = 8;

/// UART used by the console, if any. Logging goes over RTT.
pub const CONSOLE_UART: Option<u8> = None;

/// Size of the transmit queue between the poller and the UART.
pub const TX_BUFFER_SIZE: usize = 1024;

/// Pending device events before the HID host has to wait.
pub const DEVICE_EVENT_CAPACITY: usize = 8;

/// Line speed, `WIIBB_BAUD_RATE` or 115200.
pub const BAUD_RATE: u32 = match option_env!("WIIBB_BAUD_RATE") {
    Some(value) => parse_baud_rate(value),
    None => DEFAULT_BAUD_RATE,
};

/// Settings for the output channel: transmit-only 8-N-1, no flow control.
pub const SERIAL_CONFIG: SerialConfig =
    SerialConfig::new(OUTPUT_UART, TX_GPIO).with_baud_rate(BAUD_RATE);

const fn parse_baud_rate(value: &str) -> u32 {
    let bytes = value.as_bytes();
    if bytes.is_empty() {
        panic!("WIIBB_BAUD_RATE is empty");
    }

    let mut baud: u32 = 0;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if !b.is_ascii_digit() {
            panic!("WIIBB_BAUD_RATE must be a decimal number");
        }
        baud = match baud.checked_mul(10) {
            Some(v) => match v.checked_add((b - b'0') as u32) {
                Some(v) => v,
                None => panic!("WIIBB_BAUD_RATE is too large"),
            },
            None => panic!("WIIBB_BAUD_RATE is too large"),
        };
        i += 1;
    }
    baud
}
