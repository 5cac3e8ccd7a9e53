//! Scroll and visibility instrumentation for the notification list.

pub mod pager;
pub mod seen;
pub mod timing;
pub mod viewport;

pub use pager::{has_more, FetchTicket, ScrollPager, SCROLL_THRESHOLD, SCROLL_THROTTLE};
pub use seen::{SeenBatch, SeenTracker, FULL_VISIBILITY, SEEN_DEBOUNCE};
pub use timing::{Clock, Debounce, ManualClock, Throttle, TokioClock};
pub use viewport::{intersects, stack, visible_ratio, RowExtent, ScrollMetrics};
