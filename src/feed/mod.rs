//! Notification feed data and the client boundary.
//!
//! - [`types`] - notifications, stores and the published [`FeedData`] snapshot
//! - [`client`] - the [`FeedClient`] trait the widget drives
//! - [`memory`] - [`MemoryFeed`], a fixture-backed client for demos and tests

mod client;
mod memory;
mod types;

pub use client::{FeedClient, FeedError, FeedResult};
pub use memory::{Fixture, MemoryFeed, DEFAULT_PAGE_SIZE};
pub use types::{
    ActionButton, ApiStatus, Avatar, FeedData, FeedMeta, Message, Notification, NotificationId,
    PageInfo, Store, StoreQuery, Subtext,
};
