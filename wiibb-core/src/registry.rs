//! Device registry trait and the slot table that backs it.
//!
//! The HID host stack owns device state. It reports connects, input and
//! disconnects as [`DeviceEvent`]s, which are applied to a [`DeviceTable`].
//! Readers only ever see copies taken under the table's mutex.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::types::{Controller, ControllerClass, Device};

/// Number of device slots, matching the HID stack's default.
pub const MAX_DEVICES: usize = 4;

/// Error type for registry updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegistryError {
    /// Slot index is not below the table size.
    SlotOutOfRange,
    /// Input report or disconnect for an empty slot.
    NotConnected,
}

/// State change reported by the HID host stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceEvent {
    /// A device was connected and identified.
    Connected { slot: usize, class: ControllerClass },
    /// New input arrived for a connected device.
    Report { slot: usize, controller: Controller },
    /// The device in this slot went away.
    Disconnected { slot: usize },
}

/// Read-only lookup of connected devices by slot.
///
/// Implementations return a snapshot; callers never hold on to state
/// owned by the HID stack.
pub trait DeviceRegistry {
    /// Device in `slot`, or `None` if the slot is empty.
    fn device(&self, slot: usize) -> Option<Device>;
}

impl<R: DeviceRegistry + ?Sized> DeviceRegistry for &R {
    fn device(&self, slot: usize) -> Option<Device> {
        (**self).device(slot)
    }
}

/// Fixed-size table of device slots guarded by a blocking mutex.
///
/// With a `CriticalSectionRawMutex` the table can live in a `static` and be
/// shared between the task applying events and the poller.
pub struct DeviceTable<M: RawMutex, const N: usize> {
    slots: Mutex<M, RefCell<[Option<Controller>; N]>>,
}

impl<M: RawMutex, const N: usize> DeviceTable<M, N> {
    /// Create an empty table.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: Mutex::new(RefCell::new([None; N])),
        }
    }

    /// Apply one event from the HID stack.
    ///
    /// A report replaces the slot's controller state wholesale, including its
    /// class, so a device that is re-identified mid-session is tracked too.
    pub fn apply(&self, event: DeviceEvent) -> Result<(), RegistryError> {
        self.slots.lock(|slots| {
            let mut slots = slots.borrow_mut();
            match event {
                DeviceEvent::Connected { slot, class } => {
                    let entry = slots.get_mut(slot).ok_or(RegistryError::SlotOutOfRange)?;
                    *entry = Some(Controller::empty(class));
                }
                DeviceEvent::Report { slot, controller } => {
                    let entry = slots.get_mut(slot).ok_or(RegistryError::SlotOutOfRange)?;
                    let current = entry.as_mut().ok_or(RegistryError::NotConnected)?;
                    *current = controller;
                }
                DeviceEvent::Disconnected { slot } => {
                    let entry = slots.get_mut(slot).ok_or(RegistryError::SlotOutOfRange)?;
                    entry.take().ok_or(RegistryError::NotConnected)?;
                }
            }
            Ok(())
        })
    }

    /// Number of occupied slots.
    #[must_use]
    pub fn connected(&self) -> usize {
        self.slots
            .lock(|slots| slots.borrow().iter().filter(|s| s.is_some()).count())
    }
}

impl<M: RawMutex, const N: usize> Default for DeviceTable<M, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex, const N: usize> DeviceRegistry for DeviceTable<M, N> {
    fn device(&self, slot: usize) -> Option<Device> {
        self.slots.lock(|slots| {
            slots
                .borrow()
                .get(slot)
                .copied()
                .flatten()
                .map(|controller| Device { slot, controller })
        })
    }
}
