//! Terminal User Interface module.
//!
//! This module provides the inbox TUI, including:
//! - Main event loop (`run`)
//! - Keyboard and mouse input handling
//! - Rendering for the bell, feed panel, cards, toasts and overlays
//! - Background task event processing
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard and mouse input handling
//! - `events` - Background task events and per-frame instrumentation
//! - `render` - Frame layout and hit recording
//! - `helpers` - Task spawning and link opening
//! - `bell`, `header`, `feed`, `card`, `toast` - Widget parts
//! - `markdown` - Card body rendering
//! - `slots` - Replaceable sub-renderers
//! - `status` - Status bar widget
//! - `help` - Keybinding overlay

mod bell;
mod card;
mod events;
mod feed;
mod header;
mod help;
mod helpers;
mod input;
mod loop_runner;
pub mod markdown;
mod render;
pub mod slots;
mod status;
mod toast;

// Re-export the public API
pub use bell::{DefaultBadge, DefaultBell};
pub use card::DefaultCard;
pub use feed::{DefaultEmptyState, DefaultLoader};
pub use header::{DefaultHeaderRight, DefaultTabBadge};
pub use loop_runner::{run, Action};
