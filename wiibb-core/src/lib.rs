//! Platform-agnostic core of the Wii Balance Board to UART bridge.
//!
//! This crate holds everything that does not touch hardware, so it can be
//! built for the firmware target and tested on the host.
//!
//! # Overview
//!
//! - [`types`]: Device state ([`Controller`], [`BalanceReading`], [`Device`])
//! - [`registry`]: Slot lookup ([`DeviceRegistry`]) and the event-driven [`DeviceTable`]
//! - [`line`]: Text line format ([`format_reading`], [`parse_line`])
//! - [`output`]: Serial channel ([`SerialChannel`], [`SerialConfig`], [`OutputSink`])
//! - [`queue`]: Whole-line transmit queue over an embassy pipe ([`PipeQueue`])
//! - [`poller`]: Fixed-interval lookup/format/emit loop ([`SensorPoller`])
//!
//! # Wire Format
//!
//! One line per poll cycle while a balance board is connected:
//!
//! ```text
//! WiiBB: tl=<int>, tr=<int>, bl=<int>, br=<int>, temp=<int>\r\n
//! ```
//!
//! # Features
//!
//! - **`log`** (default): Log through the `log` facade (host)
//! - **`defmt`**: Log through defmt (embedded); wins over `log`
//! - **`std`**: Enable standard library support
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

// Must come first so the logging macros are visible to the other modules
mod fmt;

pub mod line;
pub mod output;
pub mod poller;
pub mod queue;
pub mod registry;
pub mod types;

// Re-export main types at crate root
pub use line::{
    format_reading, parse_line, FormatError, LineBuffer, ParseError, LINE_BUFFER_SIZE,
    MAX_LINE_LENGTH,
};
pub use output::{
    ConfigurationError, DataBits, FrameFormat, OutputError, OutputSink, Parity, SerialChannel,
    SerialConfig, StopBits, TxQueue, DEFAULT_BAUD_RATE, MAX_BAUD_RATE, MIN_BAUD_RATE,
};
pub use poller::{PollError, PollTimer, SensorPoller, BALANCE_BOARD_SLOT, POLL_INTERVAL_MS};
pub use queue::PipeQueue;
pub use registry::{DeviceEvent, DeviceRegistry, DeviceTable, RegistryError, MAX_DEVICES};
pub use types::{BalanceReading, Controller, ControllerClass, Device};
