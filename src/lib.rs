//! Themeable notification inbox for the terminal.
//!
//! A bell with an unseen badge toggles a popover feed of notification cards.
//! All notification state lives in a [`feed::FeedClient`]; the widget reads
//! its snapshots and sends it commands. [`feed::MemoryFeed`] is a
//! fixture-backed client for demos and tests.
//!
//! # Modules
//!
//! - [`app`] - widget state and the operations input handlers drive
//! - [`feed`] - notification data and the client boundary
//! - [`tracking`] - seen tracking and scroll pagination
//! - [`popover`] - open/close state and panel placement
//! - [`theme`] - typed theme trees, deep merge and light/dark resolution
//! - [`ui`] - rendering, input and the event loop

pub mod app;
pub mod avatar;
pub mod config;
pub mod feed;
pub mod keybindings;
pub mod popover;
pub mod theme;
pub mod tracking;
pub mod ui;
pub mod util;
