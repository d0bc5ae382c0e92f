//! Core device types: ControllerClass, Controller, BalanceReading, Device.

/// Discriminator for the kind of peripheral a device slot currently holds.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControllerClass {
    /// Connected but not yet identified by the HID stack.
    #[default]
    None,
    Gamepad,
    Mouse,
    Keyboard,
    BalanceBoard,
}

/// Point-in-time reading from a Wii Balance Board.
///
/// Four load cells, one per corner, plus the board's temperature sensor.
/// Units are whatever the HID stack reports; they are forwarded untouched.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BalanceReading {
    pub top_left: i32,
    pub top_right: i32,
    pub bottom_left: i32,
    pub bottom_right: i32,
    pub temperature: i32,
}

impl BalanceReading {
    /// Create a reading from the four corner loads and temperature.
    #[inline]
    #[must_use]
    pub const fn new(
        top_left: i32,
        top_right: i32,
        bottom_left: i32,
        bottom_right: i32,
        temperature: i32,
    ) -> Self {
        Self {
            top_left,
            top_right,
            bottom_left,
            bottom_right,
            temperature,
        }
    }

    /// Sum of the four load cells, saturating at the `i32` bounds.
    #[inline]
    #[must_use]
    pub const fn total_load(&self) -> i32 {
        self.top_left
            .saturating_add(self.top_right)
            .saturating_add(self.bottom_left)
            .saturating_add(self.bottom_right)
    }
}

/// Controller state of a connected device, tagged by class.
///
/// Only the balance board carries a payload this bridge interprets. Other
/// classes are tracked so that a connected gamepad is never mistaken for a
/// board; their input is not forwarded.
///
/// # Example
///
/// ```
/// use wiibb_core::{BalanceReading, Controller, ControllerClass};
///
/// let controller = Controller::BalanceBoard(BalanceReading::new(1, 2, 3, 4, 20));
/// assert_eq!(controller.class(), ControllerClass::BalanceBoard);
/// assert_eq!(controller.balance_board().map(|r| r.temperature), Some(20));
///
/// assert!(Controller::Gamepad.balance_board().is_none());
/// ```
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Controller {
    #[default]
    None,
    Gamepad,
    Mouse,
    Keyboard,
    BalanceBoard(BalanceReading),
}

impl Controller {
    /// Initial controller state for a freshly identified device.
    #[must_use]
    pub const fn empty(class: ControllerClass) -> Self {
        match class {
            ControllerClass::None => Controller::None,
            ControllerClass::Gamepad => Controller::Gamepad,
            ControllerClass::Mouse => Controller::Mouse,
            ControllerClass::Keyboard => Controller::Keyboard,
            ControllerClass::BalanceBoard => {
                Controller::BalanceBoard(BalanceReading::new(0, 0, 0, 0, 0))
            }
        }
    }

    /// The class discriminator of this state.
    #[inline]
    #[must_use]
    pub const fn class(&self) -> ControllerClass {
        match self {
            Controller::None => ControllerClass::None,
            Controller::Gamepad => ControllerClass::Gamepad,
            Controller::Mouse => ControllerClass::Mouse,
            Controller::Keyboard => ControllerClass::Keyboard,
            Controller::BalanceBoard(_) => ControllerClass::BalanceBoard,
        }
    }

    /// Narrow to the balance board payload, if this is a balance board.
    #[inline]
    #[must_use]
    pub const fn balance_board(&self) -> Option<&BalanceReading> {
        match self {
            Controller::BalanceBoard(reading) => Some(reading),
            _ => None,
        }
    }
}

/// Snapshot of one connected device, copied out of the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Device {
    /// Registry slot the device occupies.
    pub slot: usize,
    pub controller: Controller,
}

impl Device {
    #[inline]
    #[must_use]
    pub const fn class(&self) -> ControllerClass {
        self.controller.class()
    }

    /// Balance board reading, or `None` for any other class.
    #[inline]
    #[must_use]
    pub const fn balance_board(&self) -> Option<&BalanceReading> {
        self.controller.balance_board()
    }
}
