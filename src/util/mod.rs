//! Small helpers shared by the renderers.
//!
//! - **Text**: width-aware truncation and wrapping, control-character stripping
//! - **Links**: `https://` normalization and scheme checks for notification links
//! - **Time**: relative age and expiry labels

mod link;
mod text;
mod time;

pub use link::{format_action_link, resolve_link, web_url, LinkError, LinkTarget};
pub use text::{display_width, single_line, strip_control_chars, truncate_to_width, wrap_to_width};
pub use time::{expiry_label, long_interval, short_age, ExpiryLabel, EXPIRING_WINDOW_SECS};
