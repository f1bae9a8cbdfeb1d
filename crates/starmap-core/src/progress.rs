//! Leading-edge debouncing for progress reports.
//!
//! The first value after a quiet period is emitted at once; values arriving inside the interval
//! replace each other and the latest one is emitted when the host polls after the interval, or
//! on [`Debouncer::flush`]. The clock is passed in so hosts and tests control time.

use std::time::{Duration, Instant};

use serde::Serialize;

/// A snapshot of ingestion progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Progress {
    pub nodes: usize,
    pub borders: usize,
    pub clusters: usize,
    pub done: bool,
}

#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    interval: Duration,
    last_emit: Option<Instant>,
    pending: Option<T>,
}

impl<T> Debouncer<T> {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_emit: None,
            pending: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    fn due(&self, now: Instant) -> bool {
        match self.last_emit {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.interval,
        }
    }

    /// Offers a value; returns it back when it should be emitted now.
    pub fn offer(&mut self, now: Instant, value: T) -> Option<T> {
        if self.due(now) {
            self.last_emit = Some(now);
            self.pending = None;
            return Some(value);
        }
        self.pending = Some(value);
        None
    }

    /// Emits the pending value once the interval has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        if self.pending.is_some() && self.due(now) {
            self.last_emit = Some(now);
            return self.pending.take();
        }
        None
    }

    /// Emits the pending value regardless of timing.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take()
    }

    /// Drops any pending value and forgets the last emission.
    pub fn cancel(&mut self) {
        self.pending = None;
        self.last_emit = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn first_value_is_emitted_immediately() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(ms(100));
        assert_eq!(d.offer(t0, 1), Some(1));
        assert!(!d.has_pending());
    }

    #[test]
    fn values_inside_interval_collapse_to_latest() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(ms(100));
        d.offer(t0, 1);
        assert_eq!(d.offer(t0 + ms(10), 2), None);
        assert_eq!(d.offer(t0 + ms(20), 3), None);
        assert_eq!(d.poll(t0 + ms(50)), None);
        assert_eq!(d.poll(t0 + ms(100)), Some(3));
        assert_eq!(d.poll(t0 + ms(300)), None);
    }

    #[test]
    fn offer_after_interval_emits_and_clears_pending() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(ms(100));
        d.offer(t0, 1);
        d.offer(t0 + ms(10), 2);
        assert_eq!(d.offer(t0 + ms(150), 3), Some(3));
        assert_eq!(d.flush(), None);
    }

    #[test]
    fn cancel_drops_pending() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(ms(100));
        d.offer(t0, 1);
        d.offer(t0 + ms(10), 2);
        d.cancel();
        assert_eq!(d.flush(), None);
        assert_eq!(d.offer(t0 + ms(20), 4), Some(4));
    }
}
