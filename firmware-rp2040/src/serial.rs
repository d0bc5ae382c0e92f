//! UART transmit path for the reading stream.
//!
//! The poller never waits on the UART. Lines go into a [`TxPipe`] through
//! [`TxPipeQueue`]; a separate task drains the pipe into the UART with DMA.
//!
//! # Pins
//!
//! Uses UART1 by default:
//! - GPIO 8: TX
//! - RX unused

use defmt::error;
use embassy_rp::uart::{
    Async, Config as UartConfig, DataBits as UartDataBits, Parity as UartParity,
    StopBits as UartStopBits, UartTx,
};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::pipe::Pipe;
use wiibb_core::{DataBits, Parity, PipeQueue, SerialConfig, StopBits};

use crate::config::TX_BUFFER_SIZE;

/// Byte queue between the poller and the UART drain task.
pub type TxPipe = Pipe<CriticalSectionRawMutex, TX_BUFFER_SIZE>;

/// Whole-line [`wiibb_core::TxQueue`] over the static [`TxPipe`].
pub type TxPipeQueue = PipeQueue<'static, CriticalSectionRawMutex, TX_BUFFER_SIZE>;

/// Translate the channel settings into the HAL's UART config.
#[must_use]
pub fn uart_config(config: &SerialConfig) -> UartConfig {
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = config.baud_rate;
    uart_config.data_bits = match config.frame.data_bits {
        DataBits::Seven => UartDataBits::DataBits7,
        DataBits::Eight => UartDataBits::DataBits8,
    };
    uart_config.parity = match config.frame.parity {
        Parity::None => UartParity::ParityNone,
        Parity::Even => UartParity::ParityEven,
        Parity::Odd => UartParity::ParityOdd,
    };
    uart_config.stop_bits = match config.frame.stop_bits {
        StopBits::One => UartStopBits::STOP1,
        StopBits::Two => UartStopBits::STOP2,
    };
    uart_config
}

/// Move queued bytes to the UART forever.
///
/// Transmit errors are logged and the affected bytes are lost.
pub async fn drain(tx: &mut UartTx<'static, Async>, pipe: &'static TxPipe) -> ! {
    let mut buf = [0u8; 64];
    loop {
        let n = pipe.read(&mut buf).await;
        if let Err(e) = tx.write(&buf[..n]).await {
            error!("UART write failed: {:?}", e);
        }
    }
}
