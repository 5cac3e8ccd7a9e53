//! Visibility-driven "seen" tracking.
//!
//! Every rendered card row is observed against the list viewport. The first
//! time an unseen row is fully visible its id joins the pending set and the
//! row stops being observed. Pending ids are flushed to the feed client as
//! one bulk mark-seen call once the set has been quiet for the debounce
//! delay.
//!
//! The tracker does no I/O. The event loop calls [`SeenTracker::poll_flush`]
//! on each tick, sends the returned [`SeenBatch`] to the client, and reports
//! back with [`SeenTracker::complete`] whatever the outcome.

use super::timing::{Clock, Debounce, TokioClock};
use crate::feed::NotificationId;
use std::collections::HashSet;
use std::time::Duration;

/// Quiet period before pending ids are flushed.
pub const SEEN_DEBOUNCE: Duration = Duration::from_millis(1000);

/// A row counts as seen only when entirely inside the viewport.
pub const FULL_VISIBILITY: f64 = 1.0;

/// A snapshot of pending ids handed to the client's bulk mark-seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeenBatch {
    ids: Vec<NotificationId>,
}

impl SeenBatch {
    pub fn ids(&self) -> &[NotificationId] {
        &self.ids
    }

    pub fn into_ids(self) -> Vec<NotificationId> {
        self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

pub struct SeenTracker<C: Clock = TokioClock> {
    clock: C,
    debounce: Debounce,
    /// Rows currently mounted and still being watched.
    observed: HashSet<NotificationId>,
    /// Ordered, duplicate-free.
    pending: Vec<NotificationId>,
    /// Pending ids already sent in an outstanding batch.
    in_flight: HashSet<NotificationId>,
    /// Ids that already triggered once this session.
    reported: HashSet<NotificationId>,
}

impl SeenTracker<TokioClock> {
    pub fn new() -> Self {
        Self::with_clock(TokioClock, SEEN_DEBOUNCE)
    }
}

impl Default for SeenTracker<TokioClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> SeenTracker<C> {
    pub fn with_clock(clock: C, delay: Duration) -> Self {
        Self {
            clock,
            debounce: Debounce::new(delay),
            observed: HashSet::new(),
            pending: Vec::new(),
            in_flight: HashSet::new(),
            reported: HashSet::new(),
        }
    }

    /// Start observing a mounted row.
    ///
    /// Rows whose notification is already seen or read, and rows that
    /// already triggered, are not observed. Returns whether the row is now
    /// observed.
    pub fn mount(&mut self, id: &NotificationId, already_seen: bool) -> bool {
        if already_seen || self.reported.contains(id) {
            return false;
        }
        self.observed.insert(id.clone());
        true
    }

    /// Release the observation of a row that left the rendered window.
    pub fn unmount(&mut self, id: &NotificationId) {
        self.observed.remove(id);
    }

    /// Reconcile observations with the rows rendered this frame.
    ///
    /// Rows no longer rendered are released; newly rendered rows are mounted.
    pub fn sync_mounted<'a, I>(&mut self, rows: I)
    where
        I: IntoIterator<Item = (&'a NotificationId, bool)>,
    {
        let mut rendered = HashSet::new();
        for (id, already_seen) in rows {
            rendered.insert(id.clone());
            if !self.observed.contains(id) {
                self.mount(id, already_seen);
            }
        }
        self.observed.retain(|id| rendered.contains(id));
    }

    pub fn is_observing(&self, id: &NotificationId) -> bool {
        self.observed.contains(id)
    }

    /// Feed one visibility measurement for an observed row.
    ///
    /// Returns true when the id was queued. A notification that became read
    /// or seen while observed is dropped without queuing.
    pub fn on_visibility(&mut self, id: &NotificationId, ratio: f64, already_seen: bool) -> bool {
        if !self.observed.contains(id) {
            return false;
        }
        if already_seen {
            self.observed.remove(id);
            return false;
        }
        if ratio < FULL_VISIBILITY {
            return false;
        }

        // One-shot per row
        self.observed.remove(id);
        self.reported.insert(id.clone());
        if self.pending.contains(id) {
            return false;
        }
        self.pending.push(id.clone());
        self.debounce.touch(self.clock.now());
        tracing::trace!(id = %id, pending = self.pending.len(), "Queued notification as seen");
        true
    }

    pub fn pending(&self) -> &[NotificationId] {
        &self.pending
    }

    /// Take the next batch once the pending set has been quiet long enough.
    ///
    /// The batch holds every pending id not already in flight.
    pub fn poll_flush(&mut self) -> Option<SeenBatch> {
        if !self.debounce.fire(self.clock.now()) {
            return None;
        }
        let ids: Vec<NotificationId> = self
            .pending
            .iter()
            .filter(|id| !self.in_flight.contains(*id))
            .cloned()
            .collect();
        if ids.is_empty() {
            return None;
        }
        self.in_flight.extend(ids.iter().cloned());
        tracing::debug!(count = ids.len(), "Flushing seen batch");
        Some(SeenBatch { ids })
    }

    /// The client call for `batch` finished. Success or failure, its ids leave
    /// the pending set; failures are not retried.
    pub fn complete(&mut self, batch: &SeenBatch) {
        let done: HashSet<&NotificationId> = batch.ids.iter().collect();
        self.pending.retain(|id| !done.contains(id));
        for id in &batch.ids {
            self.in_flight.remove(id);
        }
    }

    /// Drop all observations and cancel the pending flush.
    pub fn teardown(&mut self) {
        self.debounce.cancel();
        self.observed.clear();
        self.pending.clear();
        self.in_flight.clear();
        self.reported.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::timing::ManualClock;
    use pretty_assertions::assert_eq;

    fn id(s: &str) -> NotificationId {
        NotificationId::from(s)
    }

    fn tracker() -> (ManualClock, SeenTracker<ManualClock>) {
        let clock = ManualClock::new();
        (clock.clone(), SeenTracker::with_clock(clock, SEEN_DEBOUNCE))
    }

    #[test]
    fn test_three_rows_flush_as_one_batch() {
        let (clock, mut seen) = tracker();
        for (i, name) in ["a", "b", "c"].iter().enumerate() {
            seen.mount(&id(name), false);
            assert!(seen.on_visibility(&id(name), 1.0, false));
            if i < 2 {
                clock.advance(Duration::from_millis(300));
            }
        }
        clock.advance(Duration::from_millis(999));
        assert!(seen.poll_flush().is_none());
        clock.advance(Duration::from_millis(1));
        let batch = seen.poll_flush().expect("batch after quiet period");
        assert_eq!(batch.ids(), &[id("a"), id("b"), id("c")]);
    }

    #[test]
    fn test_partial_visibility_does_not_queue() {
        let (_clock, mut seen) = tracker();
        seen.mount(&id("a"), false);
        assert!(!seen.on_visibility(&id("a"), 0.75, false));
        assert!(seen.is_observing(&id("a")));
        assert!(seen.pending().is_empty());
    }

    #[test]
    fn test_read_rows_never_enter_pending() {
        let (_clock, mut seen) = tracker();
        assert!(!seen.mount(&id("read"), true));
        assert!(!seen.on_visibility(&id("read"), 1.0, true));

        // Marked read after mounting
        seen.mount(&id("later"), false);
        assert!(!seen.on_visibility(&id("later"), 1.0, true));
        assert!(seen.pending().is_empty());
    }

    #[test]
    fn test_one_shot_per_row() {
        let (_clock, mut seen) = tracker();
        seen.mount(&id("a"), false);
        assert!(seen.on_visibility(&id("a"), 1.0, false));
        assert!(!seen.is_observing(&id("a")));

        // Scrolled out and back in
        seen.unmount(&id("a"));
        assert!(!seen.mount(&id("a"), false));
        assert!(!seen.on_visibility(&id("a"), 1.0, false));
        assert_eq!(seen.pending().len(), 1);
    }

    #[test]
    fn test_in_flight_ids_not_resent() {
        let (clock, mut seen) = tracker();
        seen.mount(&id("a"), false);
        seen.on_visibility(&id("a"), 1.0, false);
        clock.advance(SEEN_DEBOUNCE);
        let first = seen.poll_flush().expect("first batch");

        // Arrives while the first call is outstanding
        seen.mount(&id("b"), false);
        seen.on_visibility(&id("b"), 1.0, false);
        clock.advance(SEEN_DEBOUNCE);
        let second = seen.poll_flush().expect("second batch");
        assert_eq!(second.ids(), &[id("b")]);

        seen.complete(&first);
        assert_eq!(seen.pending(), &[id("b")]);
        seen.complete(&second);
        assert!(seen.pending().is_empty());
    }

    #[test]
    fn test_unmounted_row_releases_observation() {
        let (_clock, mut seen) = tracker();
        seen.sync_mounted([(&id("a"), false), (&id("b"), false)]);
        assert!(seen.is_observing(&id("a")));
        seen.sync_mounted([(&id("b"), false)]);
        assert!(!seen.is_observing(&id("a")));
        assert!(!seen.on_visibility(&id("a"), 1.0, false));
    }

    #[test]
    fn test_teardown_cancels_flush() {
        let (clock, mut seen) = tracker();
        seen.mount(&id("a"), false);
        seen.on_visibility(&id("a"), 1.0, false);
        seen.teardown();
        clock.advance(SEEN_DEBOUNCE * 2);
        assert!(seen.poll_flush().is_none());
    }

    #[test]
    fn test_teardown_forgets_reported_rows() {
        let (_clock, mut seen) = tracker();
        seen.mount(&id("a"), false);
        seen.on_visibility(&id("a"), 1.0, false);
        assert!(!seen.mount(&id("a"), false));

        seen.teardown();
        // A remounted widget observes the row again
        assert!(seen.mount(&id("a"), false));
        assert!(seen.on_visibility(&id("a"), 1.0, false));
        assert_eq!(seen.pending(), &[id("a")]);
    }
}
