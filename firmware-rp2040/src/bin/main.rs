#![no_std]
#![no_main]

use defmt::{info, warn};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_rp::uart::{Async, UartTx};
use embassy_sync::pipe::Pipe;
use embassy_time::Duration;
use static_cell::StaticCell;
use wiibb_bridge_rp2040::config::{CONSOLE_UART, SERIAL_CONFIG};
use wiibb_bridge_rp2040::devices::DeviceEventReceiver;
use wiibb_bridge_rp2040::{
    apply_device_events, drain, uart_config, BridgePoller, ConfigurationError, Devices,
    PollTicker, SensorPoller, SerialChannel, TxPipe, TxPipeQueue, DEVICES, DEVICE_EVENTS,
    POLL_INTERVAL_MS,
};

#[cfg(feature = "dev-panic")]
use panic_probe as _;
#[cfg(feature = "prod-panic")]
use panic_reset as _;

/// Transmit queue between the poller and the UART.
static TX_PIPE: StaticCell<TxPipe> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Wii Balance Board bridge starting...");

    let p = embassy_rp::init(embassy_rp::config::Config::default());

    // Device state must be tracked before the HID host can report anything
    spawner.spawn(device_task(&DEVICES, DEVICE_EVENTS.receiver())).unwrap();

    // --- UART Setup ---
    let pipe: &'static TxPipe = TX_PIPE.init(Pipe::new());
    let mut output = SerialChannel::unconfigured();
    let configured = output.configure(&SERIAL_CONFIG, CONSOLE_UART, |config| {
        let tx = UartTx::new(p.UART1, p.PIN_8, p.DMA_CH0, uart_config(config));
        spawner
            .spawn(uart_tx_task(tx, pipe))
            .map_err(|_| ConfigurationError::DriverInstall)?;
        Ok(TxPipeQueue::new(pipe))
    });
    if configured.is_err() {
        warn!("Continuing without UART output, readings are logged only");
    }

    // --- Poller ---
    let poller = SensorPoller::new(&DEVICES, output);
    spawner.spawn(poll_task(poller)).unwrap();

    info!("Bridge initialized, waiting for a balance board...");
}

/// Device task - applies HID host events to the device table.
#[embassy_executor::task]
async fn device_task(table: &'static Devices, events: DeviceEventReceiver) {
    apply_device_events(table, events).await
}

/// UART TX task - drains the transmit pipe into UART1.
#[embassy_executor::task]
async fn uart_tx_task(mut tx: UartTx<'static, Async>, pipe: &'static TxPipe) {
    drain(&mut tx, pipe).await
}

/// Poll task - samples slot 0 every poll interval and forwards readings.
#[embassy_executor::task]
async fn poll_task(mut poller: BridgePoller) {
    let mut ticker = PollTicker::every(Duration::from_millis(POLL_INTERVAL_MS));
    poller.run(&mut ticker).await
}
