//! Wii Balance Board to UART bridge for RP2040.
//!
//! This crate provides the embedded side of the bridge: the device table the
//! Bluetooth HID host reports into, the UART transmit path, and the poll
//! timer. Everything platform-agnostic lives in [`wiibb_core`].
//!
//! # Overview
//!
//! Every 100 ms the poller looks up registry slot 0. If it holds a balance
//! board, the reading goes out over UART (115200 baud, 8N1) as
//!
//! ```text
//! WiiBB: tl=<int>, tr=<int>, bl=<int>, br=<int>, temp=<int>\r\n
//! ```
//!
//! # Hardware Configuration
//!
//! | Function | GPIO | Description |
//! |----------|------|-------------|
//! | UART1 TX | 8    | Reading stream |
//!
//! # Architecture
//!
//! The firmware uses the Embassy async runtime with three tasks:
//!
//! - **Device Task**: Applies HID host events to [`DEVICES`]
//! - **UART TX Task**: Drains the transmit pipe into UART1
//! - **Poll Task**: Runs the [`SensorPoller`] on a [`PollTicker`]
//!
//! If the UART cannot be configured the poll task still runs and logs
//! readings over RTT only.
//!
//! # Features
//!
//! - **`dev-panic`** (default): Use `panic-probe` for development (prints panic info via RTT)
//! - **`prod-panic`**: Use `panic-reset` for production (silent watchdog reset)
//!
//! # Re-exports
//!
//! This crate re-exports the [`wiibb_core`] items the firmware needs, so
//! consumers only need to depend on this crate.

#![no_std]

// Re-export core types for convenience
pub use wiibb_core::{
    format_reading, BalanceReading, ConfigurationError, Controller, ControllerClass, DeviceEvent,
    DeviceRegistry, OutputSink, PipeQueue, PollError, SensorPoller, SerialChannel, SerialConfig,
    POLL_INTERVAL_MS,
};

pub mod config;
pub mod devices;
pub mod serial;
pub mod timer;

pub use devices::{apply_device_events, device_events, Devices, DEVICES, DEVICE_EVENTS};
pub use serial::{drain, uart_config, TxPipe, TxPipeQueue};
pub use timer::PollTicker;

/// The poller as wired up by the firmware.
pub type BridgePoller = SensorPoller<&'static Devices, SerialChannel<TxPipeQueue>>;
