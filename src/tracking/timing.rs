//! Time sources and the two timed gates used by the widget.
//!
//! Nothing here sleeps or spawns. Callers ask a [`Clock`] for "now" and poll
//! the gates from the event loop tick, so tests can drive time by hand with
//! [`ManualClock`] or with `tokio::time::pause`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// The runtime clock. Honors `tokio::time::pause` in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    offset_nanos: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset_nanos: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let nanos = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        self.offset_nanos.fetch_add(nanos, Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + Duration::from_nanos(self.offset_nanos.load(Ordering::SeqCst))
    }
}

// ============================================================================
// Debounce
// ============================================================================

/// Fires once after input has been quiet for `delay`.
#[derive(Debug, Clone)]
pub struct Debounce {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debounce {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Restart the quiet period.
    pub fn touch(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns true exactly once when the quiet period has elapsed.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

// ============================================================================
// Throttle
// ============================================================================

/// Lets a call through at most once per `interval`.
///
/// Leading edge: the first call in a window runs immediately. Trailing edge:
/// if calls were suppressed during the window, one more runs once the window
/// closes (see [`Throttle::trailing_due`]).
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    last_run: Option<Instant>,
    trailing: bool,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_run: None,
            trailing: false,
        }
    }

    fn window_open(&self, now: Instant) -> bool {
        self.last_run
            .map_or(true, |last| now.saturating_duration_since(last) >= self.interval)
    }

    /// Record a call. Returns true when it may run now.
    pub fn hit(&mut self, now: Instant) -> bool {
        if self.window_open(now) {
            self.last_run = Some(now);
            self.trailing = false;
            true
        } else {
            self.trailing = true;
            false
        }
    }

    /// Returns true once when a suppressed call is owed and the window closed.
    pub fn trailing_due(&mut self, now: Instant) -> bool {
        if self.trailing && self.window_open(now) {
            self.trailing = false;
            self.last_run = Some(now);
            true
        } else {
            false
        }
    }

    pub fn cancel(&mut self) {
        self.trailing = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn test_manual_clock_clones_share_time() {
        let clock = ManualClock::new();
        let other = clock.clone();
        let start = clock.now();
        other.advance(MS * 250);
        assert_eq!(clock.now() - start, MS * 250);
    }

    #[test]
    fn test_debounce_restarts_on_touch() {
        let clock = ManualClock::new();
        let mut debounce = Debounce::new(MS * 1000);
        debounce.touch(clock.now());
        clock.advance(MS * 900);
        assert!(!debounce.fire(clock.now()));
        debounce.touch(clock.now());
        clock.advance(MS * 900);
        assert!(!debounce.fire(clock.now()));
        clock.advance(MS * 100);
        assert!(debounce.fire(clock.now()));
        // Fires once
        assert!(!debounce.fire(clock.now()));
    }

    #[test]
    fn test_debounce_cancel() {
        let clock = ManualClock::new();
        let mut debounce = Debounce::new(MS * 10);
        debounce.touch(clock.now());
        debounce.cancel();
        clock.advance(MS * 20);
        assert!(!debounce.fire(clock.now()));
        assert!(!debounce.is_armed());
    }

    #[test]
    fn test_throttle_leading_and_trailing() {
        let clock = ManualClock::new();
        let mut throttle = Throttle::new(MS * 500);
        assert!(throttle.hit(clock.now()));
        clock.advance(MS * 100);
        assert!(!throttle.hit(clock.now()));
        assert!(!throttle.trailing_due(clock.now()));
        clock.advance(MS * 400);
        assert!(throttle.trailing_due(clock.now()));
        assert!(!throttle.trailing_due(clock.now()));
    }

    #[test]
    fn test_throttle_no_trailing_without_suppressed_call() {
        let clock = ManualClock::new();
        let mut throttle = Throttle::new(MS * 500);
        assert!(throttle.hit(clock.now()));
        clock.advance(MS * 600);
        assert!(!throttle.trailing_due(clock.now()));
        assert!(throttle.hit(clock.now()));
    }
}
