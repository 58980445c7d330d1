//! Injectable date and timestamp provider.
//!
//! The date key drives the daily quota rollover, so it goes through a trait
//! instead of scattered wall-clock reads; tests pin a `FixedClock` rather
//! than manipulating the system clock.

use chrono::Local;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Source of "today" and of creation timestamps.
pub trait Clock {
    /// Today's date key in the local time zone, `YYYY-MM-DD`.
    fn date_key(&self) -> String;

    /// Current time as milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;
}

/// The real clock.
#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn date_key(&self) -> String {
        Local::now().format("%Y-%m-%d").to_string()
    }

    fn now_millis(&self) -> i64 {
        Local::now().timestamp_millis()
    }
}

/// A pinned clock for tests.
///
/// The date never moves; `now_millis` still increases on every read so that
/// creation timestamps stay strictly ordered.
#[derive(Debug, Clone)]
pub struct FixedClock {
    date: String,
    counter: Arc<AtomicI64>,
}

impl FixedClock {
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            counter: Arc::new(AtomicI64::new(1_700_000_000_000)),
        }
    }
}

impl Clock for FixedClock {
    fn date_key(&self) -> String {
        self.date.clone()
    }

    fn now_millis(&self) -> i64 {
        self.counter.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_date_key_shape() {
        let key = SystemClock.date_key();
        assert_eq!(key.len(), 10);
        assert_eq!(&key[4..5], "-");
        assert_eq!(&key[7..8], "-");
    }

    #[test]
    fn test_fixed_clock_is_pinned_but_monotonic() {
        let clock = FixedClock::new("2026-01-15");
        assert_eq!(clock.date_key(), "2026-01-15");

        let a = clock.now_millis();
        let b = clock.now_millis();
        assert!(b > a);
    }

    #[test]
    fn test_fixed_clock_clones_share_counter() {
        let clock = FixedClock::new("2026-01-15");
        let other = clock.clone();
        let a = clock.now_millis();
        let b = other.now_millis();
        assert!(b > a);
    }
}
