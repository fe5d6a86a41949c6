//! Per-cell edit debouncing.
//!
//! A `Debouncer` holds at most one pending value. Every `schedule` replaces it
//! and restarts the delay; the value only comes out of `poll` once the delay
//! elapsed without another edit. Dropping or cancelling discards it.

use std::time::{Duration, Instant};

pub const DEBOUNCE_INTERVAL: Duration = Duration::from_millis(300);

#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Debouncer::new(DEBOUNCE_INTERVAL)
    }
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Debouncer {
            delay,
            pending: None,
        }
    }

    pub fn schedule(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.delay));
    }

    /// Returns the pending value if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, deadline)) if *deadline <= now => self.pending.take().map(|(value, _)| value),
            _ => None,
        }
    }

    /// Takes the pending value regardless of its deadline.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn rapid_edits_commit_only_the_last_value() {
        let start = Instant::now();
        let mut debouncer = Debouncer::default();
        let mut committed = Vec::new();

        for (offset, text) in [(0, "b"), (100, "bu"), (200, "buy"), (250, "buy m")].iter() {
            let now = start + ms(*offset);
            debouncer.schedule(text.to_string(), now);
            committed.extend(debouncer.poll(now));
        }
        committed.extend(debouncer.poll(start + ms(500)));
        assert!(committed.is_empty());

        committed.extend(debouncer.poll(start + ms(550)));
        assert_eq!(committed, vec!["buy m".to_owned()]);
        assert_eq!(debouncer.flush(), None);
        assert_eq!(debouncer.poll(start + ms(2000)), None);
    }

    #[test]
    fn teardown_commits_nothing() {
        let start = Instant::now();
        let mut debouncer = Debouncer::default();
        debouncer.schedule("milk", start);
        debouncer.cancel();
        assert_eq!(debouncer.poll(start + ms(1000)), None);
    }

    #[test]
    fn flush_ignores_deadline() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(ms(300));
        debouncer.schedule(1, start);
        assert_eq!(debouncer.flush(), Some(1));
        assert_eq!(debouncer.flush(), None);
    }
}
