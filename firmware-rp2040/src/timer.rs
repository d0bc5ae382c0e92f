//! Poll period source backed by an embassy [`Ticker`].

use core::future::Future;

use embassy_time::{Duration, Ticker};
use wiibb_core::PollTimer;

/// Fixed-period timer for the sensor poller.
///
/// [`Ticker`] advances its deadline by exactly one period per tick, so a
/// late wake-up does not push later cycles back.
pub struct PollTicker(Ticker);

impl PollTicker {
    #[must_use]
    pub fn every(period: Duration) -> Self {
        Self(Ticker::every(period))
    }
}

impl PollTimer for PollTicker {
    fn next(&mut self) -> impl Future<Output = ()> {
        self.0.next()
    }
}
