//! SensorPoller: samples the balance board and forwards readings as text.

use core::future::Future;

use crate::line::{format_reading, FormatError};
use crate::output::{OutputError, OutputSink};
use crate::registry::DeviceRegistry;
use crate::types::BalanceReading;

/// Registry slot the balance board is expected in.
///
/// Only one device is bridged; other slots are ignored.
pub const BALANCE_BOARD_SLOT: usize = 0;

/// Interval between poll cycles.
pub const POLL_INTERVAL_MS: u64 = 100;

/// Periodic wake-up source for the poller.
///
/// Implementations should schedule deadlines at fixed multiples of the
/// period from the start, so late wake-ups do not shift later ones.
pub trait PollTimer {
    /// Wait until the next period boundary.
    fn next(&mut self) -> impl Future<Output = ()>;
}

/// Why a poll cycle produced no output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PollError {
    /// No device in the slot, or the device is not a balance board.
    DeviceAbsent,
    /// Rendered line did not fit the line buffer.
    FormatOverflow,
    /// Serial channel refused the line.
    Output(OutputError),
}

impl From<FormatError> for PollError {
    fn from(err: FormatError) -> Self {
        match err {
            FormatError::Overflow => PollError::FormatOverflow,
        }
    }
}

/// Polls one registry slot and writes each balance board reading to a sink.
///
/// Every cycle logs exactly one event at info level or above:
///
/// | Outcome                   | Level |
/// |---------------------------|-------|
/// | line written              | info  |
/// | channel not configured    | info (reading is logged instead) |
/// | no balance board          | warn  |
/// | queue full / I/O error    | warn  |
/// | line overflow             | error |
///
/// Errors never leave the cycle they happen in.
pub struct SensorPoller<R, O> {
    registry: R,
    output: O,
    slot: usize,
}

impl<R: DeviceRegistry, O: OutputSink> SensorPoller<R, O> {
    /// Create a poller for [`BALANCE_BOARD_SLOT`].
    pub fn new(registry: R, output: O) -> Self {
        Self::with_slot(registry, output, BALANCE_BOARD_SLOT)
    }

    /// Create a poller for a specific registry slot.
    pub fn with_slot(registry: R, output: O, slot: usize) -> Self {
        Self {
            registry,
            output,
            slot,
        }
    }

    /// Poll forever, one cycle per timer period.
    ///
    /// The first lookup happens immediately; each later one waits for the
    /// timer.
    pub async fn run<T: PollTimer>(&mut self, timer: &mut T) -> ! {
        info!("Starting balance board polling task (slot {})...", self.slot);
        loop {
            let _ = self.poll_once();
            timer.next().await;
        }
    }

    /// Run a single lookup, format and emit cycle.
    ///
    /// Returns the forwarded reading, or why nothing was written.
    pub fn poll_once(&mut self) -> Result<BalanceReading, PollError> {
        let reading = match self.registry.device(self.slot) {
            Some(device) => match device.balance_board() {
                Some(reading) => *reading,
                None => {
                    trace!("Slot {} holds a {:?}", self.slot, device.class());
                    warn!("No balance board connected");
                    return Err(PollError::DeviceAbsent);
                }
            },
            None => {
                warn!("No balance board connected");
                return Err(PollError::DeviceAbsent);
            }
        };

        debug!(
            "Balance board data - TL: {}, TR: {}, BL: {}, BR: {}, Temp: {}, Total: {}",
            reading.top_left,
            reading.top_right,
            reading.bottom_left,
            reading.bottom_right,
            reading.temperature,
            reading.total_load()
        );

        let line = match format_reading(&reading) {
            Ok(line) => line,
            Err(e) => {
                error!("Failed to format balance board data");
                return Err(e.into());
            }
        };
        let text = line.trim_end();

        match self.output.write(line.as_bytes()) {
            Ok(()) => {
                info!("Sent data over UART: {}", text);
                Ok(reading)
            }
            Err(OutputError::NotReady) => {
                info!("UART offline, reading: {}", text);
                Err(PollError::Output(OutputError::NotReady))
            }
            Err(e) => {
                warn!("Dropped reading ({:?}): {}", e, text);
                Err(PollError::Output(e))
            }
        }
    }

    /// Get a reference to the device registry.
    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Get a reference to the output sink.
    pub fn output(&self) -> &O {
        &self.output
    }

    /// Get a mutable reference to the output sink.
    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    /// Decompose the poller into its registry and output.
    pub fn into_parts(self) -> (R, O) {
        (self.registry, self.output)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::registry::{DeviceEvent, DeviceTable};
    use crate::types::{Controller, ControllerClass, Device};
    use core::cell::Cell;
    use core::pin::Pin;
    use core::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use std::cell::RefCell;
    use std::string::{String, ToString};
    use std::vec::Vec;

    // Captures log records per test thread so tests can run in parallel
    mod capture {
        extern crate std;

        use log::{Level, LevelFilter, Log, Metadata, Record};
        use std::cell::RefCell;
        use std::string::{String, ToString};
        use std::sync::Once;
        use std::vec::Vec;

        std::thread_local! {
            static RECORDS: RefCell<Vec<(Level, String)>> = const { RefCell::new(Vec::new()) };
        }

        struct CaptureLogger;

        impl Log for CaptureLogger {
            fn enabled(&self, _: &Metadata) -> bool {
                true
            }

            fn log(&self, record: &Record) {
                RECORDS.with(|r| {
                    r.borrow_mut()
                        .push((record.level(), record.args().to_string()))
                });
            }

            fn flush(&self) {}
        }

        static LOGGER: CaptureLogger = CaptureLogger;
        static INIT: Once = Once::new();

        pub fn start() {
            INIT.call_once(|| {
                log::set_logger(&LOGGER).unwrap();
                log::set_max_level(LevelFilter::Trace);
            });
            RECORDS.with(|r| r.borrow_mut().clear());
        }

        /// Records at info level or more severe.
        pub fn events() -> Vec<(Level, String)> {
            RECORDS.with(|r| {
                r.borrow()
                    .iter()
                    .filter(|(level, _)| *level <= Level::Info)
                    .cloned()
                    .collect()
            })
        }
    }

    use log::Level;

    // Registry whose single answer is set per test, counting lookups
    struct MockRegistry {
        device: Option<Device>,
        lookups: Cell<usize>,
    }

    impl MockRegistry {
        fn new(device: Option<Device>) -> Self {
            Self {
                device,
                lookups: Cell::new(0),
            }
        }
    }

    impl DeviceRegistry for MockRegistry {
        fn device(&self, slot: usize) -> Option<Device> {
            self.lookups.set(self.lookups.get() + 1);
            self.device.filter(|d| d.slot == slot)
        }
    }

    // Output sink recording each write, optionally failing
    struct MockOutput {
        writes: Vec<Vec<u8>>,
        fail_with: Option<OutputError>,
    }

    impl MockOutput {
        fn new() -> Self {
            Self {
                writes: Vec::new(),
                fail_with: None,
            }
        }

        fn failing(err: OutputError) -> Self {
            Self {
                writes: Vec::new(),
                fail_with: Some(err),
            }
        }
    }

    impl OutputSink for MockOutput {
        fn write(&mut self, bytes: &[u8]) -> Result<(), OutputError> {
            if let Some(err) = self.fail_with {
                return Err(err);
            }
            self.writes.push(bytes.to_vec());
            Ok(())
        }

        fn is_ready(&self) -> bool {
            self.fail_with.is_none()
        }
    }

    fn board(slot: usize, reading: BalanceReading) -> Option<Device> {
        Some(Device {
            slot,
            controller: Controller::BalanceBoard(reading),
        })
    }

    #[test]
    fn test_reference_reading_is_forwarded() {
        capture::start();
        let reading = BalanceReading::new(120, 118, 95, 99, 24);
        let mut poller = SensorPoller::new(MockRegistry::new(board(0, reading)), MockOutput::new());

        assert_eq!(poller.poll_once(), Ok(reading));

        let writes = &poller.output().writes;
        assert_eq!(writes.len(), 1);
        assert_eq!(
            writes[0].as_slice(),
            b"WiiBB: tl=120, tr=118, bl=95, br=99, temp=24\r\n"
        );

        let events = capture::events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, Level::Info);
        assert!(events[0]
            .1
            .ends_with("WiiBB: tl=120, tr=118, bl=95, br=99, temp=24"));
    }

    #[test]
    fn test_absent_device_writes_nothing() {
        capture::start();
        let mut poller = SensorPoller::new(MockRegistry::new(None), MockOutput::new());

        assert_eq!(poller.poll_once(), Err(PollError::DeviceAbsent));
        assert!(poller.output().writes.is_empty());

        let events = capture::events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, Level::Warn);
        assert_eq!(events[0].1, "No balance board connected");
    }

    #[test]
    fn test_wrong_class_behaves_like_absent() {
        for controller in [
            Controller::None,
            Controller::Gamepad,
            Controller::Mouse,
            Controller::Keyboard,
        ] {
            capture::start();
            let device = Some(Device { slot: 0, controller });
            let mut poller = SensorPoller::new(MockRegistry::new(device), MockOutput::new());

            assert_eq!(poller.poll_once(), Err(PollError::DeviceAbsent));
            assert!(poller.output().writes.is_empty());

            let events = capture::events();
            assert_eq!(events.len(), 1);
            assert_eq!(events[0].0, Level::Warn);
        }
    }

    #[test]
    fn test_board_in_other_slot_is_ignored() {
        capture::start();
        let reading = BalanceReading::new(1, 2, 3, 4, 5);
        let mut poller = SensorPoller::new(MockRegistry::new(board(1, reading)), MockOutput::new());

        assert_eq!(poller.poll_once(), Err(PollError::DeviceAbsent));
        assert!(poller.output().writes.is_empty());
    }

    #[test]
    fn test_unconfigured_output_degrades_to_logging() {
        capture::start();
        let reading = BalanceReading::new(10, 20, 30, 40, 21);
        let mut poller = SensorPoller::new(
            MockRegistry::new(board(0, reading)),
            MockOutput::failing(OutputError::NotReady),
        );

        assert_eq!(
            poller.poll_once(),
            Err(PollError::Output(OutputError::NotReady))
        );

        let events = capture::events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, Level::Info);
        assert!(events[0].1.contains("tl=10, tr=20, bl=30, br=40, temp=21"));
    }

    #[test]
    fn test_full_buffer_drops_cycle_only() {
        capture::start();
        let reading = BalanceReading::new(1, 1, 1, 1, 1);
        let mut poller = SensorPoller::new(
            MockRegistry::new(board(0, reading)),
            MockOutput::failing(OutputError::BufferFull),
        );

        assert_eq!(
            poller.poll_once(),
            Err(PollError::Output(OutputError::BufferFull))
        );
        assert_eq!(capture::events()[0].0, Level::Warn);

        // Next cycle succeeds once the queue drains
        poller.output_mut().fail_with = None;
        assert_eq!(poller.poll_once(), Ok(reading));
        assert_eq!(poller.output().writes.len(), 1);
    }

    #[test]
    fn test_extreme_reading_is_forwarded() {
        let reading = BalanceReading::new(i32::MIN, i32::MAX, i32::MIN, i32::MAX, i32::MIN);
        let mut poller = SensorPoller::new(MockRegistry::new(board(0, reading)), MockOutput::new());

        assert_eq!(poller.poll_once(), Ok(reading));
        let line = &poller.output().writes[0];
        assert_eq!(crate::line::parse_line(line), Ok(reading));
    }

    #[test]
    fn test_polls_shared_device_table() {
        let table: DeviceTable<NoopRawMutex, 4> = DeviceTable::new();
        let mut poller = SensorPoller::new(&table, MockOutput::new());

        assert_eq!(poller.poll_once(), Err(PollError::DeviceAbsent));

        table
            .apply(DeviceEvent::Connected {
                slot: 0,
                class: ControllerClass::BalanceBoard,
            })
            .unwrap();
        let reading = BalanceReading::new(300, 310, 290, 305, 23);
        table
            .apply(DeviceEvent::Report {
                slot: 0,
                controller: Controller::BalanceBoard(reading),
            })
            .unwrap();
        assert_eq!(poller.poll_once(), Ok(reading));

        table.apply(DeviceEvent::Disconnected { slot: 0 }).unwrap();
        assert_eq!(poller.poll_once(), Err(PollError::DeviceAbsent));
        assert_eq!(poller.output().writes.len(), 1);
    }

    // Timer that completes a fixed number of periods, then stays pending
    struct CountingTimer<'a> {
        remaining: usize,
        trace: &'a RefCell<Vec<String>>,
    }

    impl PollTimer for CountingTimer<'_> {
        fn next(&mut self) -> impl Future<Output = ()> {
            self.trace.borrow_mut().push("tick".to_string());
            let ready = self.remaining > 0;
            self.remaining = self.remaining.saturating_sub(1);
            core::future::poll_fn(move |_| {
                if ready {
                    Poll::Ready(())
                } else {
                    Poll::Pending
                }
            })
        }
    }

    // Registry that appends to the shared trace on every lookup
    struct TracingRegistry<'a> {
        trace: &'a RefCell<Vec<String>>,
    }

    impl DeviceRegistry for TracingRegistry<'_> {
        fn device(&self, _slot: usize) -> Option<Device> {
            self.trace.borrow_mut().push("lookup".to_string());
            None
        }
    }

    // Poll a future once; the run loop is expected to park on the timer
    fn poll_until_parked<F: Future>(mut f: F) {
        fn noop_raw_waker() -> RawWaker {
            fn noop(_: *const ()) {}
            fn clone(_: *const ()) -> RawWaker {
                noop_raw_waker()
            }
            static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, noop, noop, noop);
            RawWaker::new(core::ptr::null(), &VTABLE)
        }

        let waker = unsafe { Waker::from_raw(noop_raw_waker()) };
        let mut cx = Context::from_waker(&waker);

        // SAFETY: We don't move f after pinning
        let f = unsafe { Pin::new_unchecked(&mut f) };
        assert!(f.poll(&mut cx).is_pending());
    }

    #[test]
    fn test_run_alternates_lookup_and_sleep() {
        let trace = RefCell::new(Vec::new());
        let mut timer = CountingTimer {
            remaining: 3,
            trace: &trace,
        };
        let mut poller = SensorPoller::new(TracingRegistry { trace: &trace }, MockOutput::new());

        poll_until_parked(poller.run(&mut timer));

        let trace = trace.borrow();
        assert_eq!(
            *trace,
            ["lookup", "tick", "lookup", "tick", "lookup", "tick", "lookup", "tick"]
        );
    }
}
