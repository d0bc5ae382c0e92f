//! Serial output channel: configuration, sink trait and error types.

/// Lowest baud rate accepted by [`SerialConfig::validate`].
pub const MIN_BAUD_RATE: u32 = 300;

/// Highest baud rate accepted by [`SerialConfig::validate`].
pub const MAX_BAUD_RATE: u32 = 921_600;

/// Default line speed for the reading stream.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Error type for output operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputError {
    /// Channel was never configured (or configuration failed).
    NotReady,
    /// Transmit queue cannot take the whole line right now.
    BufferFull,
    /// UART/communication I/O error.
    Io,
}

/// Error type for serial channel setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigurationError {
    /// Baud rate outside [`MIN_BAUD_RATE`]..=[`MAX_BAUD_RATE`].
    InvalidBaudRate,
    /// The line is the one the system console uses.
    ConsoleConflict,
    /// RX and TX were assigned the same pin.
    PinConflict,
    /// Peripheral already claimed (including a second configure).
    PeripheralBusy,
    /// The platform driver could not be brought up.
    DriverInstall,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    Seven,
    Eight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    One,
    Two,
}

/// Data bits, parity and stop bits of a serial frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameFormat {
    pub data_bits: DataBits,
    pub parity: Parity,
    pub stop_bits: StopBits,
}

impl FrameFormat {
    /// 8 data bits, no parity, 1 stop bit.
    pub const EIGHT_N_ONE: Self = Self {
        data_bits: DataBits::Eight,
        parity: Parity::None,
        stop_bits: StopBits::One,
    };
}

impl Default for FrameFormat {
    fn default() -> Self {
        Self::EIGHT_N_ONE
    }
}

/// Serial line settings for the output channel.
///
/// # Example
///
/// ```
/// use wiibb_core::{FrameFormat, SerialConfig};
///
/// let config = SerialConfig::new(1, 8);
/// assert_eq!(config.baud_rate, 115_200);
/// assert_eq!(config.frame, FrameFormat::EIGHT_N_ONE);
/// assert!(config.rx_pin.is_none());
/// assert!(config.validate(None).is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SerialConfig {
    /// Hardware UART index.
    pub line: u8,
    pub baud_rate: u32,
    pub frame: FrameFormat,
    /// Hardware RTS/CTS flow control.
    pub flow_control: bool,
    /// GPIO number for TX.
    pub tx_pin: u8,
    /// GPIO number for RX; `None` when the line is transmit-only.
    pub rx_pin: Option<u8>,
}

impl SerialConfig {
    /// Transmit-only 115200 8-N-1 configuration without flow control.
    #[must_use]
    pub const fn new(line: u8, tx_pin: u8) -> Self {
        Self {
            line,
            baud_rate: DEFAULT_BAUD_RATE,
            frame: FrameFormat::EIGHT_N_ONE,
            flow_control: false,
            tx_pin,
            rx_pin: None,
        }
    }

    /// Same configuration with a different baud rate.
    #[must_use]
    pub const fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    /// Check the settings before any hardware is touched.
    ///
    /// `console_line` is the UART used by the system console, if any; the
    /// output channel must not share it.
    pub fn validate(&self, console_line: Option<u8>) -> Result<(), ConfigurationError> {
        if !(MIN_BAUD_RATE..=MAX_BAUD_RATE).contains(&self.baud_rate) {
            return Err(ConfigurationError::InvalidBaudRate);
        }
        if console_line == Some(self.line) {
            return Err(ConfigurationError::ConsoleConflict);
        }
        if self.rx_pin == Some(self.tx_pin) {
            return Err(ConfigurationError::PinConflict);
        }
        Ok(())
    }
}

/// Non-blocking transmit queue provided by the platform.
///
/// The hardware drains the queue asynchronously; there is no delivery
/// acknowledgment.
pub trait TxQueue {
    /// Enqueue all of `bytes` or nothing.
    ///
    /// Returns [`OutputError::BufferFull`] when the queue cannot take the
    /// whole slice.
    fn try_enqueue(&mut self, bytes: &[u8]) -> Result<(), OutputError>;
}

/// Byte sink the poller writes rendered lines to.
pub trait OutputSink {
    /// Enqueue `bytes` for transmission without blocking.
    fn write(&mut self, bytes: &[u8]) -> Result<(), OutputError>;

    /// Check if the output is ready to accept data.
    fn is_ready(&self) -> bool;
}

/// Serial output channel, not ready until configured.
///
/// Configuration happens once. If it fails the channel stays not-ready and
/// every write reports [`OutputError::NotReady`], so the rest of the system
/// keeps running without serial output.
pub struct SerialChannel<Q> {
    queue: Option<Q>,
}

impl<Q: TxQueue> SerialChannel<Q> {
    /// A channel with no queue behind it.
    #[must_use]
    pub const fn unconfigured() -> Self {
        Self { queue: None }
    }

    /// Validate `config` and bring up the platform queue through `open`.
    ///
    /// Failures are logged and returned; the channel is left not-ready.
    pub fn configure<F>(
        &mut self,
        config: &SerialConfig,
        console_line: Option<u8>,
        open: F,
    ) -> Result<(), ConfigurationError>
    where
        F: FnOnce(&SerialConfig) -> Result<Q, ConfigurationError>,
    {
        info!("Setting up UART{}...", config.line);

        let result = if self.queue.is_some() {
            Err(ConfigurationError::PeripheralBusy)
        } else {
            config.validate(console_line).and_then(|()| open(config))
        };

        match result {
            Ok(queue) => {
                self.queue = Some(queue);
                info!(
                    "UART{} setup complete on GPIO{} (TX) at {} baud",
                    config.line,
                    config.tx_pin,
                    config.baud_rate
                );
                Ok(())
            }
            Err(e) => {
                error!("UART{} setup failed: {:?}", config.line, e);
                Err(e)
            }
        }
    }

    /// Get a reference to the underlying queue, if configured.
    pub fn queue(&self) -> Option<&Q> {
        self.queue.as_ref()
    }
}

impl<Q: TxQueue> Default for SerialChannel<Q> {
    fn default() -> Self {
        Self::unconfigured()
    }
}

impl<Q: TxQueue> OutputSink for SerialChannel<Q> {
    fn write(&mut self, bytes: &[u8]) -> Result<(), OutputError> {
        match self.queue.as_mut() {
            Some(queue) => queue.try_enqueue(bytes),
            None => Err(OutputError::NotReady),
        }
    }

    fn is_ready(&self) -> bool {
        self.queue.is_some()
    }
}
