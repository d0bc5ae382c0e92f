//! Shared device table and the event queue that feeds it.
//!
//! The Bluetooth HID host is not part of this firmware. Its integration
//! must post [`DeviceEvent`]s through the [`device_events`] sender; nothing
//! in this crate produces them, so until a host is linked in, slot 0 stays
//! empty and the poller reports no balance board.
//!
//! [`apply_device_events`] is the only writer of [`DEVICES`]; the poller
//! only reads it.

use defmt::{debug, info, warn};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};
use wiibb_core::{DeviceEvent, DeviceTable, MAX_DEVICES};

use crate::config::DEVICE_EVENT_CAPACITY;

/// Device table type used by the firmware.
pub type Devices = DeviceTable<CriticalSectionRawMutex, MAX_DEVICES>;

pub type DeviceEventSender =
    Sender<'static, CriticalSectionRawMutex, DeviceEvent, DEVICE_EVENT_CAPACITY>;
pub type DeviceEventReceiver =
    Receiver<'static, CriticalSectionRawMutex, DeviceEvent, DEVICE_EVENT_CAPACITY>;

/// Connected devices, indexed by HID host slot.
pub static DEVICES: Devices = DeviceTable::new();

/// Events from the HID host waiting to be applied.
pub static DEVICE_EVENTS: Channel<CriticalSectionRawMutex, DeviceEvent, DEVICE_EVENT_CAPACITY> =
    Channel::new();

/// Sender half for the HID host integration.
///
/// Post `Connected` when a controller is assigned a slot, `Report` for each
/// parsed report and `Disconnected` when the link drops.
#[must_use]
pub fn device_events() -> DeviceEventSender {
    DEVICE_EVENTS.sender()
}

/// Apply events to `table` as they arrive.
///
/// Events for unknown or empty slots are logged and dropped.
pub async fn apply_device_events(table: &'static Devices, events: DeviceEventReceiver) -> ! {
    loop {
        let event = events.receive().await;
        match table.apply(event) {
            Ok(()) => match event {
                DeviceEvent::Connected { slot, class } => {
                    info!("Device connected in slot {}: {:?}", slot, class);
                }
                DeviceEvent::Disconnected { slot } => {
                    info!("Device in slot {} disconnected", slot);
                }
                DeviceEvent::Report { .. } => debug!("Applied {:?}", event),
            },
            Err(e) => warn!("Ignoring {:?}: {:?}", event, e),
        }
    }
}
