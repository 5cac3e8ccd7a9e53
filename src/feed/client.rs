//! The boundary to the feed client that owns notification state.

use super::types::{FeedData, Notification, NotificationId};
use futures::future::BoxFuture;
use thiserror::Error;
use tokio::sync::{broadcast, watch};

/// Errors reported by feed client commands.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("notification not found: {0}")]
    NotFound(NotificationId),
    #[error("unknown store: {0}")]
    UnknownStore(String),
    #[error("request failed: {0}")]
    Request(String),
    #[error("failed to read fixture: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid fixture: {0}")]
    Fixture(#[from] serde_json::Error),
}

pub type FeedResult = Result<(), FeedError>;

/// State and commands of a notification feed.
///
/// The widget only reads [`FeedData`] snapshots and sends commands; it never
/// mutates notifications itself. Commands return `'static` futures so the
/// event loop can spawn them.
pub trait FeedClient: Send + Sync {
    /// Latest snapshot, updated whenever the feed changes.
    fn subscribe(&self) -> watch::Receiver<FeedData>;

    /// Newly delivered notifications, for toasts.
    fn deliveries(&self) -> broadcast::Receiver<Notification>;

    fn fetch_next_page(&self) -> BoxFuture<'static, FeedResult>;

    fn mark_read(&self, id: NotificationId) -> BoxFuture<'static, FeedResult>;

    fn mark_unread(&self, id: NotificationId) -> BoxFuture<'static, FeedResult>;

    fn mark_archived(&self, id: NotificationId) -> BoxFuture<'static, FeedResult>;

    fn mark_interacted(&self, id: NotificationId) -> BoxFuture<'static, FeedResult>;

    fn mark_bulk_seen(&self, ids: Vec<NotificationId>) -> BoxFuture<'static, FeedResult>;

    fn mark_all_read(&self) -> BoxFuture<'static, FeedResult>;

    fn change_active_store(&self, store_id: String) -> BoxFuture<'static, FeedResult>;

    fn reset_badge_count(&self) -> BoxFuture<'static, FeedResult>;
}
