//! Infinite-scroll trigger for the notification list.
//!
//! Two triggers share one `loading` flag:
//! - scroll: throttled (leading and trailing edge), fires when the viewport
//!   bottom reaches [`SCROLL_THRESHOLD`] of the content height;
//! - initial fill: whenever the list changes, fires if the content does not
//!   overflow the viewport.
//!
//! A trigger hands out a [`FetchTicket`]. The caller runs the fetch and
//! returns the ticket through [`ScrollPager::finish`] on success or failure.

use super::timing::{Clock, Throttle, TokioClock};
use super::viewport::ScrollMetrics;
use std::time::Duration;

pub const SCROLL_THROTTLE: Duration = Duration::from_millis(500);

/// Fraction of the content height the viewport bottom must reach.
pub const SCROLL_THRESHOLD: f64 = 0.8;

/// Proof that a next-page fetch was started.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a started fetch must be finished with ScrollPager::finish"]
pub struct FetchTicket {
    generation: u64,
}

/// What started a fetch. Only used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Scroll,
    InitialFill,
}

pub struct ScrollPager<C: Clock = TokioClock> {
    clock: C,
    throttle: Throttle,
    threshold: f64,
    /// Generation of the outstanding fetch.
    loading: Option<u64>,
    generation: u64,
}

impl ScrollPager<TokioClock> {
    pub fn new() -> Self {
        Self::with_clock(TokioClock, SCROLL_THROTTLE)
    }
}

impl Default for ScrollPager<TokioClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> ScrollPager<C> {
    pub fn with_clock(clock: C, throttle: Duration) -> Self {
        Self {
            clock,
            throttle: Throttle::new(throttle),
            threshold: SCROLL_THRESHOLD,
            loading: None,
            generation: 0,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_some()
    }

    /// The list container scrolled.
    pub fn on_scroll(&mut self, metrics: ScrollMetrics, has_more: bool) -> Option<FetchTicket> {
        if self.throttle.hit(self.clock.now()) {
            self.check_scroll(metrics, has_more)
        } else {
            None
        }
    }

    /// Periodic tick: runs the trailing edge of a throttled scroll.
    ///
    /// `metrics` is the list as laid out now, not as it was when the scroll
    /// was suppressed; a page may have landed in between.
    pub fn on_tick(
        &mut self,
        metrics: Option<ScrollMetrics>,
        has_more: bool,
    ) -> Option<FetchTicket> {
        if !self.throttle.trailing_due(self.clock.now()) {
            return None;
        }
        self.check_scroll(metrics?, has_more)
    }

    /// The notification list changed. Fills a viewport that does not overflow.
    pub fn on_list_changed(
        &mut self,
        metrics: ScrollMetrics,
        has_more: bool,
    ) -> Option<FetchTicket> {
        if metrics.fits_viewport() {
            self.begin(has_more, Trigger::InitialFill)
        } else {
            None
        }
    }

    fn check_scroll(&mut self, metrics: ScrollMetrics, has_more: bool) -> Option<FetchTicket> {
        if metrics.reached(self.threshold) {
            self.begin(has_more, Trigger::Scroll)
        } else {
            None
        }
    }

    fn begin(&mut self, has_more: bool, trigger: Trigger) -> Option<FetchTicket> {
        if !has_more || self.loading.is_some() {
            return None;
        }
        self.generation = self.generation.wrapping_add(1);
        self.loading = Some(self.generation);
        tracing::debug!(?trigger, generation = self.generation, "Fetching next page");
        Some(FetchTicket {
            generation: self.generation,
        })
    }

    /// The fetch behind `ticket` completed, successfully or not.
    ///
    /// Tickets from before a teardown are ignored.
    pub fn finish(&mut self, ticket: FetchTicket) {
        if self.loading == Some(ticket.generation) {
            self.loading = None;
        }
    }

    /// Cancel the trailing scroll check and forget the outstanding fetch.
    pub fn teardown(&mut self) {
        self.throttle.cancel();
        self.loading = None;
    }
}

/// Whether the feed has another page to fetch.
pub fn has_more(pagination: bool, current_page: u32, total_pages: u32) -> bool {
    pagination && current_page < total_pages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::timing::ManualClock;

    fn metrics(scroll_top: u32, client_height: u32, scroll_height: u32) -> ScrollMetrics {
        ScrollMetrics {
            scroll_top,
            client_height,
            scroll_height,
        }
    }

    fn pager() -> (ManualClock, ScrollPager<ManualClock>) {
        let clock = ManualClock::new();
        (clock.clone(), ScrollPager::with_clock(clock, SCROLL_THROTTLE))
    }

    #[test]
    fn test_scroll_past_threshold_fetches() {
        let (_clock, mut pager) = pager();
        let ticket = pager.on_scroll(metrics(30, 10, 50), true);
        assert!(ticket.is_some());
        assert!(pager.is_loading());
    }

    #[test]
    fn test_scroll_below_threshold_does_not_fetch() {
        let (_clock, mut pager) = pager();
        assert!(pager.on_scroll(metrics(10, 10, 50), true).is_none());
        assert!(!pager.is_loading());
    }

    #[test]
    fn test_no_fetch_while_loading() {
        let (clock, mut pager) = pager();
        let ticket = pager.on_scroll(metrics(40, 10, 50), true).expect("first fetch");
        clock.advance(SCROLL_THROTTLE);
        assert!(pager.on_scroll(metrics(40, 10, 50), true).is_none());
        assert!(pager.on_list_changed(metrics(0, 10, 5), true).is_none());
        pager.finish(ticket);
        clock.advance(SCROLL_THROTTLE);
        assert!(pager.on_scroll(metrics(40, 10, 50), true).is_some());
    }

    #[test]
    fn test_no_fetch_without_more_pages() {
        let (_clock, mut pager) = pager();
        assert!(pager.on_scroll(metrics(40, 10, 50), false).is_none());
        assert!(pager.on_list_changed(metrics(0, 10, 5), false).is_none());
    }

    #[test]
    fn test_trailing_edge_fires_after_window() {
        let (clock, mut pager) = pager();
        assert!(pager.on_scroll(metrics(0, 10, 50), true).is_none());
        clock.advance(Duration::from_millis(100));
        // Suppressed by the throttle, owed on the trailing edge
        assert!(pager.on_scroll(metrics(35, 10, 50), true).is_none());
        assert!(pager.on_tick(Some(metrics(35, 10, 50)), true).is_none());
        clock.advance(Duration::from_millis(400));
        assert!(pager.on_tick(Some(metrics(35, 10, 50)), true).is_some());
    }

    #[test]
    fn test_trailing_edge_checks_current_layout() {
        let (clock, mut pager) = pager();
        let ticket = pager.on_scroll(metrics(40, 10, 50), true).expect("leading fetch");
        clock.advance(Duration::from_millis(100));
        assert!(pager.on_scroll(metrics(40, 10, 50), true).is_none());
        pager.finish(ticket);

        // The page landed: same position, twice the content
        clock.advance(Duration::from_millis(400));
        assert!(pager.on_tick(Some(metrics(40, 10, 100)), true).is_none());
        assert!(!pager.is_loading());
    }

    #[test]
    fn test_trailing_edge_without_layout_is_dropped() {
        let (clock, mut pager) = pager();
        assert!(pager.on_scroll(metrics(0, 10, 50), true).is_none());
        clock.advance(Duration::from_millis(100));
        assert!(pager.on_scroll(metrics(45, 10, 50), true).is_none());
        clock.advance(Duration::from_millis(400));
        assert!(pager.on_tick(None, true).is_none());
        assert!(pager.on_tick(Some(metrics(45, 10, 50)), true).is_none());
    }

    #[test]
    fn test_initial_fill_only_when_not_overflowing() {
        let (_clock, mut pager) = pager();
        assert!(pager.on_list_changed(metrics(0, 20, 30), true).is_none());
        assert!(pager.on_list_changed(metrics(0, 20, 12), true).is_some());
    }

    #[test]
    fn test_stale_ticket_after_teardown_is_ignored() {
        let (_clock, mut pager) = pager();
        let stale = pager.on_list_changed(metrics(0, 20, 10), true).expect("fetch");
        pager.teardown();
        let fresh = pager.on_list_changed(metrics(0, 20, 10), true).expect("fetch");
        pager.finish(stale);
        assert!(pager.is_loading());
        pager.finish(fresh);
        assert!(!pager.is_loading());
    }

    #[test]
    fn test_has_more() {
        assert!(has_more(true, 1, 3));
        assert!(!has_more(true, 3, 3));
        assert!(!has_more(false, 1, 3));
    }
}
