//! Byte queue between the poller and a UART drain task.
//!
//! [`PipeQueue`] puts whole lines into an [`embassy_sync::pipe::Pipe`]. The
//! pipe is a ring buffer and a single `try_write` only fills the contiguous
//! space up to its end, so one line may take two writes.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::pipe::Pipe;

use crate::output::{OutputError, TxQueue};

/// [`TxQueue`] backed by a borrowed [`Pipe`].
///
/// Must be the only writer of the pipe. Readers may drain it concurrently.
pub struct PipeQueue<'a, M: RawMutex, const N: usize> {
    pipe: &'a Pipe<M, N>,
}

impl<'a, M: RawMutex, const N: usize> PipeQueue<'a, M, N> {
    #[must_use]
    pub const fn new(pipe: &'a Pipe<M, N>) -> Self {
        Self { pipe }
    }
}

impl<M: RawMutex, const N: usize> TxQueue for PipeQueue<'_, M, N> {
    fn try_enqueue(&mut self, bytes: &[u8]) -> Result<(), OutputError> {
        // Single writer: free space can only grow after this check, so the
        // loop below always queues the whole line.
        if self.pipe.free_capacity() < bytes.len() {
            return Err(OutputError::BufferFull);
        }
        let mut rest = bytes;
        while !rest.is_empty() {
            match self.pipe.try_write(rest) {
                Ok(n) if n > 0 => rest = &rest[n..],
                _ => return Err(OutputError::Io),
            }
        }
        Ok(())
    }
}
