//! In-process feed client backed by a JSON fixture.
//!
//! `MemoryFeed` stands in for a remote feed: it filters notifications by the
//! active store, pages them, keeps badge and per-store unread counts, delays
//! every request by a configurable latency and can deliver queued
//! notifications on a timer. Used by the binary and the integration tests.

use super::client::{FeedClient, FeedError, FeedResult};
use super::types::{
    ApiStatus, FeedData, FeedMeta, Notification, NotificationId, PageInfo, Store,
};
use chrono::Utc;
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::Deserialize;
use std::collections::{BTreeMap, VecDeque};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Maximum fixture file size (4MB)
const MAX_FIXTURE_SIZE: u64 = 4 * 1024 * 1024;

const DELIVERY_CAPACITY: usize = 32;

/// On-disk fixture layout.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub stores: Vec<Store>,
    #[serde(default)]
    pub notifications: Vec<Notification>,
    /// Delivered one at a time by [`MemoryFeed::spawn_delivery`].
    #[serde(default)]
    pub incoming: Vec<Notification>,
}

impl Fixture {
    pub fn load(path: &Path) -> Result<Self, FeedError> {
        let size = std::fs::metadata(path)?.len();
        if size > MAX_FIXTURE_SIZE {
            return Err(FeedError::Request(format!(
                "fixture too large: {} bytes (max {})",
                size, MAX_FIXTURE_SIZE
            )));
        }
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

#[derive(Debug)]
struct State {
    /// Newest first.
    all: Vec<Notification>,
    incoming: VecDeque<Notification>,
    stores: Vec<Store>,
    active_store: Option<String>,
    pages_loaded: u32,
    badge: u32,
    api_status: ApiStatus,
}

impl State {
    fn active(&self) -> Option<&Store> {
        let id = self.active_store.as_deref()?;
        self.stores.iter().find(|s| s.store_id == id)
    }

    fn in_active_store(&self) -> impl Iterator<Item = &Notification> {
        let query = self.active().map(|s| s.query).unwrap_or_default();
        self.all.iter().filter(move |n| query.matches(n))
    }

    fn total_pages(&self, page_size: u32) -> u32 {
        let count = u32::try_from(self.in_active_store().count()).unwrap_or(u32::MAX);
        count.div_ceil(page_size.max(1))
    }

    fn find_mut(&mut self, id: &NotificationId) -> Result<&mut Notification, FeedError> {
        self.all
            .iter_mut()
            .find(|n| &n.n_id == id)
            .ok_or_else(|| FeedError::NotFound(id.clone()))
    }

    fn snapshot(&self, page_size: u32) -> FeedData {
        let total_pages = self.total_pages(page_size);
        let current_page = self.pages_loaded.min(total_pages);
        let limit = usize::try_from(current_page.saturating_mul(page_size)).unwrap_or(usize::MAX);
        let notifications = self.in_active_store().take(limit).cloned().collect();

        let stores: BTreeMap<String, u32> = self
            .stores
            .iter()
            .map(|store| {
                let unread = self
                    .all
                    .iter()
                    .filter(|n| store.query.matches(n) && !n.is_read())
                    .count();
                (
                    store.store_id.clone(),
                    u32::try_from(unread).unwrap_or(u32::MAX),
                )
            })
            .collect();

        FeedData {
            notifications,
            page_info: PageInfo {
                current_page,
                total_pages,
            },
            meta: FeedMeta {
                badge: self.badge,
                stores,
            },
            active_store: self.active_store.clone(),
            stores: self.stores.clone(),
            api_status: self.api_status,
        }
    }
}

struct Inner {
    state: Mutex<State>,
    snapshot: watch::Sender<FeedData>,
    deliveries: broadcast::Sender<Notification>,
    page_size: u32,
    latency: Duration,
    failing: AtomicBool,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &State) {
        self.snapshot.send_replace(state.snapshot(self.page_size));
    }

    /// Apply `f` to the state and publish the result.
    fn update<T>(&self, f: impl FnOnce(&mut State) -> T) -> T {
        let mut state = self.lock();
        let out = f(&mut state);
        self.publish(&state);
        out
    }

    fn check_failing(&self) -> FeedResult {
        if self.failing.load(Ordering::SeqCst) {
            Err(FeedError::Request("simulated failure".to_string()))
        } else {
            Ok(())
        }
    }

    async fn delay(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    /// Load the first page of the active store.
    async fn reload(&self) -> FeedResult {
        self.update(|s| s.api_status = ApiStatus::Loading);
        self.delay().await;
        let result = self.check_failing();
        self.update(|s| {
            s.pages_loaded = 1;
            s.api_status = if result.is_ok() {
                ApiStatus::Success
            } else {
                ApiStatus::Error
            };
        });
        result
    }
}

/// Fixture-backed [`FeedClient`]. Clones share state.
#[derive(Clone)]
pub struct MemoryFeed {
    inner: Arc<Inner>,
}

impl MemoryFeed {
    pub fn new(fixture: Fixture) -> Self {
        Self::with_options(fixture, DEFAULT_PAGE_SIZE, Duration::ZERO)
    }

    pub fn with_options(fixture: Fixture, page_size: u32, latency: Duration) -> Self {
        let mut all = fixture.notifications;
        all.sort_by(|a, b| b.created_on.cmp(&a.created_on));
        let badge = u32::try_from(all.iter().filter(|n| !n.is_seen()).count()).unwrap_or(0);
        let state = State {
            all,
            incoming: fixture.incoming.into(),
            active_store: fixture.stores.first().map(|s| s.store_id.clone()),
            stores: fixture.stores,
            pages_loaded: 0,
            badge,
            api_status: ApiStatus::Idle,
        };
        let page_size = page_size.max(1);
        let (snapshot, _) = watch::channel(state.snapshot(page_size));
        let (deliveries, _) = broadcast::channel(DELIVERY_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(state),
                snapshot,
                deliveries,
                page_size,
                latency,
                failing: AtomicBool::new(false),
            }),
        }
    }

    /// Load the first page.
    pub async fn connect(&self) -> FeedResult {
        self.inner.reload().await
    }

    /// Make every following request fail until cleared.
    pub fn set_failing(&self, failing: bool) {
        self.inner.failing.store(failing, Ordering::SeqCst);
    }

    /// Deliver a notification now: newest first, badge incremented.
    pub fn deliver(&self, mut notification: Notification) {
        notification.created_on = Utc::now();
        self.inner.update(|s| {
            s.all.insert(0, notification.clone());
            s.badge = s.badge.saturating_add(1);
            // Keep the already loaded rows on screen
            if s.pages_loaded == 0 {
                s.pages_loaded = 1;
            }
        });
        tracing::debug!(id = %notification.n_id, "Delivered notification");
        // No receivers is fine
        let _ = self.inner.deliveries.send(notification);
    }

    /// Deliver the next queued fixture notification. Returns false when empty.
    pub fn deliver_next(&self) -> bool {
        let next = self.inner.lock().incoming.pop_front();
        match next {
            Some(n) => {
                self.deliver(n);
                true
            }
            None => false,
        }
    }

    /// Deliver queued notifications one per `every` until the queue drains.
    pub fn spawn_delivery(&self, every: Duration) -> JoinHandle<()> {
        let feed = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            // First tick completes immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                if !feed.deliver_next() {
                    tracing::debug!("Delivery queue drained");
                    break;
                }
            }
        })
    }

    fn command(
        &self,
        name: &'static str,
        f: impl FnOnce(&mut State) -> FeedResult + Send + 'static,
    ) -> BoxFuture<'static, FeedResult> {
        let inner = Arc::clone(&self.inner);
        async move {
            inner.delay().await;
            inner.check_failing()?;
            let result = inner.update(f);
            tracing::trace!(command = name, ok = result.is_ok(), "Feed command");
            result
        }
        .boxed()
    }

    fn mark(
        &self,
        name: &'static str,
        id: NotificationId,
        f: impl FnOnce(&mut Notification) + Send + 'static,
    ) -> BoxFuture<'static, FeedResult> {
        self.command(name, move |s| {
            f(s.find_mut(&id)?);
            Ok(())
        })
    }
}

impl FeedClient for MemoryFeed {
    fn subscribe(&self) -> watch::Receiver<FeedData> {
        self.inner.snapshot.subscribe()
    }

    fn deliveries(&self) -> broadcast::Receiver<Notification> {
        self.inner.deliveries.subscribe()
    }

    fn fetch_next_page(&self) -> BoxFuture<'static, FeedResult> {
        let inner = Arc::clone(&self.inner);
        async move {
            {
                let state = inner.lock();
                if state.pages_loaded >= state.total_pages(inner.page_size) {
                    return Ok(());
                }
            }
            inner.delay().await;
            inner.check_failing()?;
            inner.update(|s| {
                s.pages_loaded = s.pages_loaded.saturating_add(1);
                if s.api_status != ApiStatus::Success {
                    s.api_status = ApiStatus::Success;
                }
            });
            Ok(())
        }
        .boxed()
    }

    fn mark_read(&self, id: NotificationId) -> BoxFuture<'static, FeedResult> {
        self.mark("mark_read", id, |n| {
            let now = Utc::now();
            n.read_on = Some(now);
            n.seen_on.get_or_insert(now);
        })
    }

    fn mark_unread(&self, id: NotificationId) -> BoxFuture<'static, FeedResult> {
        self.mark("mark_unread", id, |n| n.read_on = None)
    }

    fn mark_archived(&self, id: NotificationId) -> BoxFuture<'static, FeedResult> {
        self.mark("mark_archived", id, |n| n.archived = true)
    }

    fn mark_interacted(&self, id: NotificationId) -> BoxFuture<'static, FeedResult> {
        self.mark("mark_interacted", id, |n| {
            let now = Utc::now();
            n.interacted_on = Some(now);
            n.read_on.get_or_insert(now);
            n.seen_on.get_or_insert(now);
        })
    }

    fn mark_bulk_seen(&self, ids: Vec<NotificationId>) -> BoxFuture<'static, FeedResult> {
        self.command("mark_bulk_seen", move |s| {
            let now = Utc::now();
            for n in s.all.iter_mut().filter(|n| ids.contains(&n.n_id)) {
                n.seen_on.get_or_insert(now);
            }
            Ok(())
        })
    }

    fn mark_all_read(&self) -> BoxFuture<'static, FeedResult> {
        self.command("mark_all_read", |s| {
            let now = Utc::now();
            for n in s.all.iter_mut().filter(|n| n.read_on.is_none()) {
                n.read_on = Some(now);
                n.seen_on.get_or_insert(now);
            }
            Ok(())
        })
    }

    fn change_active_store(&self, store_id: String) -> BoxFuture<'static, FeedResult> {
        let inner = Arc::clone(&self.inner);
        async move {
            inner.update(|s| {
                if s.stores.iter().any(|store| store.store_id == store_id) {
                    s.active_store = Some(store_id.clone());
                    Ok(())
                } else {
                    Err(FeedError::UnknownStore(store_id.clone()))
                }
            })?;
            inner.reload().await
        }
        .boxed()
    }

    fn reset_badge_count(&self) -> BoxFuture<'static, FeedResult> {
        self.command("reset_badge_count", |s| {
            s.badge = 0;
            Ok(())
        })
    }
}
