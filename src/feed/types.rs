//! Feed data as delivered by a feed client.
//!
//! Field names and timestamp encoding (milliseconds since the Unix epoch)
//! follow the remote notification payload so fixtures can be captured from a
//! live feed and replayed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Opaque notification identifier, unique within a feed session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(String);

impl NotificationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NotificationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NotificationId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// ============================================================================
// Notification
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Avatar {
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub action_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtext {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub action_url: Option<String>,
}

/// A button under the card body. The first is primary, the second secondary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionButton {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub open_in_new_tab: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub header: Option<String>,
    /// Markdown body.
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub open_in_new_tab: bool,
    #[serde(default)]
    pub avatar: Option<Avatar>,
    #[serde(default)]
    pub subtext: Option<Subtext>,
    #[serde(default)]
    pub actions: Vec<ActionButton>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub n_id: NotificationId,
    #[serde(default)]
    pub message: Message,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_on: DateTime<Utc>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub seen_on: Option<DateTime<Utc>>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub read_on: Option<DateTime<Utc>>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub interacted_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub expiry: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_expiry_visible: bool,
}

impl Notification {
    pub fn is_read(&self) -> bool {
        self.read_on.is_some()
    }

    /// Seen or read. Such rows are never queued for mark-seen.
    pub fn is_seen(&self) -> bool {
        self.seen_on.is_some() || self.read_on.is_some()
    }

    /// Expiry to display, if any.
    pub fn visible_expiry(&self) -> Option<DateTime<Utc>> {
        if self.is_expiry_visible {
            self.expiry
        } else {
            None
        }
    }
}

// ============================================================================
// Feed snapshot
// ============================================================================

/// Which notifications a store tab shows. Unset fields do not filter, except
/// that archived notifications are hidden unless `archived` is set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreQuery {
    #[serde(default)]
    pub read: Option<bool>,
    #[serde(default)]
    pub archived: Option<bool>,
}

impl StoreQuery {
    pub fn matches(&self, n: &Notification) -> bool {
        let read_ok = self.read.map_or(true, |read| n.is_read() == read);
        let archived_ok = n.archived == self.archived.unwrap_or(false);
        read_ok && archived_ok
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
    pub store_id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub query: StoreQuery,
}

impl Store {
    /// Tab label, falling back to the store id.
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.store_id)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub current_page: u32,
    pub total_pages: u32,
}

impl PageInfo {
    /// Another page can be fetched. Re-evaluate on every check.
    pub fn has_more(&self, pagination: bool) -> bool {
        crate::tracking::has_more(pagination, self.current_page, self.total_pages)
    }
}

/// Badge and per-store unread counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedMeta {
    pub badge: u32,
    #[serde(default)]
    pub stores: BTreeMap<String, u32>,
}

impl FeedMeta {
    pub fn store_count(&self, store_id: &str) -> u32 {
        self.stores.get(store_id).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

/// A point-in-time view of the feed, published by the client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedData {
    pub notifications: Vec<Notification>,
    pub page_info: PageInfo,
    pub meta: FeedMeta,
    pub active_store: Option<String>,
    pub stores: Vec<Store>,
    pub api_status: ApiStatus,
}

impl FeedData {
    pub fn find(&self, id: &NotificationId) -> Option<&Notification> {
        self.notifications.iter().find(|n| &n.n_id == id)
    }

    pub fn position(&self, id: &NotificationId) -> Option<usize> {
        self.notifications.iter().position(|n| &n.n_id == id)
    }

    /// Index of the active store tab.
    pub fn active_store_index(&self) -> Option<usize> {
        let active = self.active_store.as_deref()?;
        self.stores.iter().position(|s| s.store_id == active)
    }
}
