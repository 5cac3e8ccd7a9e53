use crate::avatar::{AvatarCache, AvatarError};
use crate::config::Config;
use crate::feed::{FeedClient, FeedData, FeedResult, Notification, NotificationId};
use crate::keybindings::{Context, KeybindingRegistry};
use crate::popover::{PopoverController, PopoverState};
use crate::theme::{FeedTheme, InboxTheme, NotificationCardTheme, ThemeResolver, ThemeType};
use crate::tracking::{FetchTicket, RowExtent, ScrollMetrics, ScrollPager, SeenBatch, SeenTracker, TokioClock};
use crate::ui::slots::{CardRegion, HeaderIntent, Slots};
use anyhow::Result;
use ratatui::layout::Rect;
use std::borrow::Cow;
use std::collections::hash_map::DefaultHasher;
use std::collections::VecDeque;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Status messages disappear after this long.
const STATUS_TTL: Duration = Duration::from_secs(3);

/// Toasts on screen at once. The oldest is dropped first.
pub const MAX_TOASTS: usize = 3;

// ============================================================================
// Card Actions Menu
// ============================================================================

/// Entries of the per-card actions menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    MarkRead,
    MarkUnread,
    Archive,
}

impl MenuItem {
    pub fn label(self) -> &'static str {
        match self {
            Self::MarkRead => "Mark as read",
            Self::MarkUnread => "Mark as unread",
            Self::Archive => "Archive",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::MarkRead => "✓",
            Self::MarkUnread => "○",
            Self::Archive => "▤",
        }
    }

    /// Entries offered for `n`: the read toggle, then archive unless archived.
    pub fn for_notification(n: &Notification) -> Vec<MenuItem> {
        let mut items = vec![if n.is_read() {
            Self::MarkUnread
        } else {
            Self::MarkRead
        }];
        if !n.archived {
            items.push(Self::Archive);
        }
        items
    }
}

/// The open actions menu of one card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardMenu {
    pub id: NotificationId,
    pub selected: usize,
}

// ============================================================================
// Layout Results
// ============================================================================

/// One notification row as laid out in the last frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRow {
    pub id: NotificationId,
    pub extent: RowExtent,
    pub seen: bool,
    pub avatar_url: Option<String>,
}

/// Geometry of the notification list in the last frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ListView {
    pub area: Rect,
    pub rows: Vec<ListRow>,
    pub metrics: ScrollMetrics,
}

/// Something clickable drawn in the last frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hit {
    Card {
        id: NotificationId,
        region: CardRegion,
    },
    Toast {
        id: NotificationId,
        region: CardRegion,
    },
    Tab(String),
    Header(HeaderIntent),
    MenuItem(MenuItem),
}

// ============================================================================
// Themes
// ============================================================================

/// Effective themes for each boundary, re-derived on every theme change.
#[derive(Debug, Clone, Default)]
pub struct ResolvedThemes {
    pub inbox: InboxTheme,
    pub feed: FeedTheme,
    pub card: NotificationCardTheme,
    pub toast: NotificationCardTheme,
}

impl ResolvedThemes {
    pub fn resolve(theme_type: ThemeType, over: Option<&InboxTheme>) -> Self {
        let resolver = ThemeResolver::new(theme_type);
        let inbox: InboxTheme = resolver.resolve(over);
        let feed: FeedTheme = resolver.resolve(Some(&inbox.feed()));
        let card = resolver.resolve(feed.notification.as_ref());
        let toast = resolver.toast(inbox.toast.as_ref());
        Self {
            inbox,
            feed,
            card,
            toast,
        }
    }
}

// ============================================================================
// Hooks and Navigation
// ============================================================================

pub type NotificationHook = Arc<dyn Fn(&Notification) + Send + Sync>;

/// Caller callbacks. A supplied hook replaces the default navigation.
#[derive(Clone, Default)]
pub struct Hooks {
    pub on_notification_click: Option<NotificationHook>,
    pub on_primary_action_click: Option<NotificationHook>,
    pub on_secondary_action_click: Option<NotificationHook>,
}

impl Hooks {
    pub fn get(&self, kind: HookKind) -> Option<&NotificationHook> {
        match kind {
            HookKind::NotificationClick => self.on_notification_click.as_ref(),
            HookKind::PrimaryAction => self.on_primary_action_click.as_ref(),
            HookKind::SecondaryAction => self.on_secondary_action_click.as_ref(),
        }
    }
}

impl std::fmt::Debug for Hooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hooks")
            .field("on_notification_click", &self.on_notification_click.is_some())
            .field("on_primary_action_click", &self.on_primary_action_click.is_some())
            .field(
                "on_secondary_action_click",
                &self.on_secondary_action_click.is_some(),
            )
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookKind {
    NotificationClick,
    PrimaryAction,
    SecondaryAction,
}

/// What a click does once the notification is marked interacted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Hook(HookKind),
    Open { url: String, new_tab: bool },
    Nothing,
}

fn non_empty(url: Option<&str>) -> Option<&str> {
    url.filter(|u| !u.trim().is_empty())
}

// ============================================================================
// Toasts
// ============================================================================

/// A delivered notification shown outside the panel for a while.
#[derive(Debug, Clone)]
pub struct Toast {
    pub notification: Notification,
    pub shown_at: Instant,
}

// ============================================================================
// Events
// ============================================================================

/// Events from background tasks.
pub enum AppEvent {
    /// A next-page fetch finished.
    PageFetched {
        ticket: FetchTicket,
        result: FeedResult,
    },
    /// A bulk mark-seen call finished.
    SeenFlushed { batch: SeenBatch, result: FeedResult },
    /// A fire-and-forget client command finished.
    CommandDone {
        command: &'static str,
        result: FeedResult,
    },
    /// A click was recorded as an interaction; navigate next.
    Interacted {
        notification: Box<Notification>,
        navigation: Navigation,
        result: FeedResult,
    },
    /// An avatar probe finished.
    AvatarProbed {
        url: String,
        result: Result<(), AvatarError>,
    },
    /// A background task panicked.
    ///
    /// Fields:
    /// - `task`: Name of the task that panicked (e.g., "fetch_next_page")
    /// - `error`: The panic message extracted from the panic payload
    TaskPanicked { task: &'static str, error: String },
}

// ============================================================================
// Application State
// ============================================================================

pub struct App {
    pub config: Config,
    pub client: Arc<dyn FeedClient>,
    pub http_client: reqwest::Client,

    /// Latest snapshot from the feed client.
    pub feed: FeedData,
    /// Index into `feed.notifications`.
    pub selected: usize,
    /// Requested list scroll offset in rows. Clamped when drawn.
    pub feed_scroll: u32,

    pub popover: PopoverController,
    pub seen: SeenTracker<TokioClock>,
    pub pager: ScrollPager<TokioClock>,
    pub avatars: AvatarCache,
    /// Oldest first.
    pub toasts: VecDeque<Toast>,
    pub card_menu: Option<CardMenu>,

    pub status_message: Option<(Cow<'static, str>, Instant)>,
    pub show_help: bool,
    pub help_scroll_offset: usize,

    pub keybindings: KeybindingRegistry,
    pub theme_type: ThemeType,
    pub themes: ResolvedThemes,
    pub hooks: Hooks,
    pub slots: Slots,

    pub needs_redraw: bool,
    /// Clickable regions of the last frame, topmost last.
    pub hits: Vec<(Rect, Hit)>,
    /// Notification list geometry of the last frame, if the panel showed it.
    pub list_view: Option<ListView>,
    /// Hit under the last left-button press.
    pub pressed: Option<Hit>,
    pub spinner_frame: usize,

    /// Hash of the row ids last reported to the pager.
    list_signature: Option<u64>,
}

impl App {
    pub fn new(config: Config, client: Arc<dyn FeedClient>) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(30))
            .user_agent(concat!("belltower/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let mut keybindings = KeybindingRegistry::new();
        for warning in keybindings.apply_overrides(&config.keybindings) {
            tracing::warn!(warning = %warning, "Ignoring keybinding override");
        }

        let feed = client.subscribe().borrow().clone();
        let theme_type = config.theme_type;
        let themes = ResolvedThemes::resolve(theme_type, config.theme.as_ref());

        Ok(Self {
            popover: PopoverController::new(config.popover_position),
            seen: SeenTracker::with_clock(TokioClock, config.seen_debounce()),
            pager: ScrollPager::with_clock(TokioClock, config.scroll_throttle()),
            avatars: AvatarCache::new(),
            toasts: VecDeque::new(),
            card_menu: None,
            status_message: None,
            show_help: false,
            help_scroll_offset: 0,
            keybindings,
            theme_type,
            themes,
            hooks: Hooks::default(),
            slots: Slots::default(),
            needs_redraw: true,
            hits: Vec::new(),
            list_view: None,
            pressed: None,
            spinner_frame: 0,
            list_signature: None,
            selected: 0,
            feed_scroll: 0,
            feed,
            http_client,
            client,
            config,
        })
    }

    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_slots(mut self, slots: Slots) -> Self {
        self.slots = slots;
        self
    }

    // ========================================================================
    // Status
    // ========================================================================

    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
        self.needs_redraw = true;
    }

    /// Drop the status message once it has been shown long enough.
    pub fn clear_expired_status(&mut self) {
        if let Some((_, shown)) = &self.status_message {
            if shown.elapsed() >= STATUS_TTL {
                self.status_message = None;
                self.needs_redraw = true;
            }
        }
    }

    /// Keybinding context for the current overlay state.
    pub fn input_context(&self) -> Context {
        if self.card_menu.is_some() {
            Context::CardMenu
        } else if self.popover.is_open() {
            Context::Feed
        } else {
            Context::Global
        }
    }

    // ========================================================================
    // Feed Snapshots
    // ========================================================================

    /// Take a new snapshot from the client.
    ///
    /// The selection follows its notification by id. Switching stores
    /// resets selection and scroll.
    pub fn apply_snapshot(&mut self, data: FeedData) {
        if data.active_store != self.feed.active_store {
            self.selected = 0;
            self.feed_scroll = 0;
        } else if let Some(index) = self
            .selected_notification()
            .and_then(|n| data.position(&n.n_id))
        {
            self.selected = index;
        }
        self.selected = self
            .selected
            .min(data.notifications.len().saturating_sub(1));

        if let Some(menu) = &self.card_menu {
            if data.find(&menu.id).is_none() {
                tracing::debug!(id = %menu.id, "Menu target left the feed, closing menu");
                self.card_menu = None;
            }
        }
        self.feed = data;
        self.needs_redraw = true;
    }

    pub fn has_more(&self) -> bool {
        self.feed.page_info.has_more(self.config.pagination)
    }

    pub fn selected_notification(&self) -> Option<&Notification> {
        self.feed.notifications.get(self.selected)
    }

    /// A notification from the feed or from a toast.
    pub fn find_notification(&self, id: &NotificationId) -> Option<&Notification> {
        self.feed.find(id).or_else(|| {
            self.toasts
                .iter()
                .map(|t| &t.notification)
                .find(|n| &n.n_id == id)
        })
    }

    // ========================================================================
    // Popover
    // ========================================================================

    /// React to the popover changing state.
    pub fn inbox_toggled(&mut self, state: PopoverState) {
        if state == PopoverState::Closed {
            self.card_menu = None;
        }
        self.needs_redraw = true;
    }

    pub fn close_inbox(&mut self) {
        if self.popover.is_open() {
            self.popover.close();
            self.inbox_toggled(PopoverState::Closed);
        }
    }

    // ========================================================================
    // Selection and Scrolling
    // ========================================================================

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.feed.notifications.len() {
            self.selected += 1;
            self.needs_redraw = true;
        }
    }

    pub fn select_prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            self.needs_redraw = true;
        }
    }

    /// Select by id. Returns false when the id is not in the feed.
    pub fn select_id(&mut self, id: &NotificationId) -> bool {
        match self.feed.position(id) {
            Some(index) => {
                self.selected = index;
                self.needs_redraw = true;
                true
            }
            None => false,
        }
    }

    /// Scroll so the selected card is fully in view when it fits.
    ///
    /// Returns the new metrics when the offset changed.
    pub fn ensure_selected_visible(&mut self) -> Option<ScrollMetrics> {
        let view = self.list_view.as_ref()?;
        let row = view.rows.get(self.selected)?;
        let metrics = view.metrics;
        let view_bottom = metrics.scroll_top.saturating_add(metrics.client_height);
        let target = if row.extent.top < metrics.scroll_top {
            row.extent.top
        } else if row.extent.bottom() > view_bottom {
            // Tall cards keep their top in view
            row.extent
                .bottom()
                .saturating_sub(metrics.client_height)
                .min(row.extent.top)
        } else {
            return None;
        };
        self.scroll_to(target)
    }

    /// Scroll the list to `top`, clamped to the content.
    ///
    /// Returns the new metrics when the offset changed.
    pub fn scroll_to(&mut self, top: u32) -> Option<ScrollMetrics> {
        let view = self.list_view.as_mut()?;
        let top = top.min(view.metrics.max_scroll_top());
        if top == view.metrics.scroll_top {
            return None;
        }
        view.metrics.scroll_top = top;
        self.feed_scroll = top;
        self.needs_redraw = true;
        Some(view.metrics)
    }

    pub fn scroll_by(&mut self, delta: i64) -> Option<ScrollMetrics> {
        let current = self.list_view.as_ref()?.metrics.scroll_top;
        let top = (i64::from(current) + delta).clamp(0, i64::from(u32::MAX));
        self.scroll_to(u32::try_from(top).unwrap_or(u32::MAX))
    }

    /// Scroll by one viewport and select the first card starting in view.
    pub fn page(&mut self, down: bool) -> Option<ScrollMetrics> {
        let page = i64::from(self.list_view.as_ref()?.metrics.client_height.saturating_sub(1).max(1));
        let metrics = self.scroll_by(if down { page } else { -page });
        if let Some(view) = &self.list_view {
            let top = view.metrics.scroll_top;
            if let Some(index) = view.rows.iter().position(|r| r.extent.top >= top) {
                self.selected = index;
                self.needs_redraw = true;
            }
        }
        metrics
    }

    /// Metrics to report to the pager when the rendered list changed since
    /// the last call.
    pub fn take_list_change(&mut self) -> Option<ScrollMetrics> {
        let Some(view) = &self.list_view else {
            self.list_signature = None;
            return None;
        };
        let mut hasher = DefaultHasher::new();
        for row in &view.rows {
            row.id.hash(&mut hasher);
        }
        let signature = hasher.finish();
        if self.list_signature == Some(signature) {
            return None;
        }
        self.list_signature = Some(signature);
        Some(view.metrics)
    }

    /// Report the current list to the pager again on the next frame.
    pub fn invalidate_list_change(&mut self) {
        self.list_signature = None;
    }

    // ========================================================================
    // Card Menu
    // ========================================================================

    pub fn open_card_menu(&mut self, id: NotificationId) {
        if self.feed.find(&id).is_some() {
            self.card_menu = Some(CardMenu { id, selected: 0 });
            self.needs_redraw = true;
        }
    }

    pub fn close_card_menu(&mut self) {
        if self.card_menu.take().is_some() {
            self.needs_redraw = true;
        }
    }

    /// Entries of the open menu.
    pub fn menu_items(&self) -> Vec<MenuItem> {
        self.card_menu
            .as_ref()
            .and_then(|m| self.feed.find(&m.id))
            .map(MenuItem::for_notification)
            .unwrap_or_default()
    }

    pub fn menu_move(&mut self, down: bool) {
        let count = self.menu_items().len();
        if let Some(menu) = self.card_menu.as_mut() {
            if count == 0 {
                return;
            }
            menu.selected = if down {
                (menu.selected + 1) % count
            } else {
                (menu.selected + count - 1) % count
            };
            self.needs_redraw = true;
        }
    }

    // ========================================================================
    // Toasts
    // ========================================================================

    pub fn push_toast(&mut self, notification: Notification) {
        self.toasts.retain(|t| t.notification.n_id != notification.n_id);
        self.toasts.push_back(Toast {
            notification,
            shown_at: Instant::now(),
        });
        while self.toasts.len() > MAX_TOASTS {
            self.toasts.pop_front();
        }
        self.needs_redraw = true;
    }

    pub fn dismiss_toast(&mut self, id: &NotificationId) {
        let before = self.toasts.len();
        self.toasts.retain(|t| &t.notification.n_id != id);
        if self.toasts.len() != before {
            self.needs_redraw = true;
        }
    }

    /// Drop toasts shown longer than the configured duration.
    pub fn expire_toasts(&mut self) {
        let ttl = self.config.toast_duration();
        let before = self.toasts.len();
        self.toasts.retain(|t| t.shown_at.elapsed() < ttl);
        if self.toasts.len() != before {
            self.needs_redraw = true;
        }
    }

    // ========================================================================
    // Themes
    // ========================================================================

    pub fn set_theme_type(&mut self, theme_type: ThemeType) {
        self.theme_type = theme_type;
        self.themes = ResolvedThemes::resolve(theme_type, self.config.theme.as_ref());
        self.needs_redraw = true;
    }

    pub fn cycle_theme(&mut self) {
        let next = self.theme_type.next();
        self.set_theme_type(next);
        self.set_status(format!("Theme: {}", next.name()));
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    fn card_navigation(&self, n: &Notification) -> Navigation {
        if self.hooks.on_notification_click.is_some() {
            return Navigation::Hook(HookKind::NotificationClick);
        }
        match non_empty(n.message.url.as_deref()) {
            Some(url) => Navigation::Open {
                url: url.to_string(),
                new_tab: n.message.open_in_new_tab,
            },
            None => Navigation::Nothing,
        }
    }

    /// What clicking `region` of `n` does after marking it interacted.
    pub fn navigation_for(&self, n: &Notification, region: &CardRegion) -> Navigation {
        match region {
            CardRegion::Body | CardRegion::Menu => self.card_navigation(n),
            CardRegion::Action(index) => {
                let kind = match index {
                    0 => Some(HookKind::PrimaryAction),
                    1 => Some(HookKind::SecondaryAction),
                    _ => None,
                };
                if let Some(kind) = kind.filter(|k| self.hooks.get(*k).is_some()) {
                    return Navigation::Hook(kind);
                }
                let action = n.message.actions.get(*index);
                match action.and_then(|a| non_empty(a.url.as_deref()).map(|url| (url, a))) {
                    Some((url, a)) => Navigation::Open {
                        url: url.to_string(),
                        new_tab: a.open_in_new_tab,
                    },
                    None => self.card_navigation(n),
                }
            }
            CardRegion::Avatar => {
                let url = n.message.avatar.as_ref().and_then(|a| a.action_url.as_deref());
                match non_empty(url) {
                    Some(url) => Navigation::Open {
                        url: url.to_string(),
                        new_tab: false,
                    },
                    None => self.card_navigation(n),
                }
            }
            CardRegion::Subtext => {
                let url = n.message.subtext.as_ref().and_then(|s| s.action_url.as_deref());
                match non_empty(url) {
                    Some(url) => Navigation::Open {
                        url: url.to_string(),
                        new_tab: false,
                    },
                    None => self.card_navigation(n),
                }
            }
            CardRegion::Link(url) => Navigation::Open {
                url: url.clone(),
                new_tab: true,
            },
        }
    }

    /// Topmost clickable region under a cell of the last frame.
    pub fn hit_at(&self, column: u16, row: u16) -> Option<Hit> {
        self.hits
            .iter()
            .rev()
            .find(|(rect, _)| {
                column >= rect.x && column < rect.right() && row >= rect.y && row < rect.bottom()
            })
            .map(|(_, hit)| hit.clone())
    }

    pub fn advance_spinner(&mut self) {
        self.spinner_frame = self.spinner_frame.wrapping_add(1);
        self.needs_redraw = true;
    }

    /// Release observers and timers before the widget goes away.
    pub fn teardown(&mut self) {
        self.seen.teardown();
        self.pager.teardown();
        self.popover.unmount();
        self.list_view = None;
        self.list_signature = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{ActionButton, Avatar, Fixture, MemoryFeed, Message, PageInfo, Store};
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use ratatui::style::Color;
    use tokio::time;

    fn notification(id: &str) -> Notification {
        Notification {
            n_id: NotificationId::from(id),
            message: Message {
                header: Some(format!("Header {}", id)),
                text: "body".to_string(),
                url: Some("https://example.com/n".to_string()),
                ..Default::default()
            },
            created_on: Utc.timestamp_millis_opt(1_700_000_000_000).unwrap(),
            seen_on: None,
            read_on: None,
            interacted_on: None,
            archived: false,
            is_pinned: false,
            expiry: None,
            is_expiry_visible: false,
        }
    }

    fn test_app() -> App {
        let feed = MemoryFeed::new(Fixture::default());
        App::new(Config::default(), Arc::new(feed)).unwrap()
    }

    fn snapshot(ids: &[&str]) -> FeedData {
        FeedData {
            notifications: ids.iter().map(|id| notification(id)).collect(),
            ..Default::default()
        }
    }

    fn list_view(heights: &[u32], client_height: u32) -> ListView {
        let extents = crate::tracking::stack(heights.iter().copied());
        let scroll_height = extents.last().map_or(0, |e| e.bottom());
        ListView {
            area: Rect::new(0, 0, 40, u16::try_from(client_height).unwrap()),
            rows: extents
                .into_iter()
                .enumerate()
                .map(|(i, extent)| ListRow {
                    id: NotificationId::from(format!("n{}", i).as_str()),
                    extent,
                    seen: false,
                    avatar_url: None,
                })
                .collect(),
            metrics: ScrollMetrics {
                scroll_top: 0,
                client_height,
                scroll_height,
            },
        }
    }

    // ========================================================================
    // Status Message Tests
    // ========================================================================

    #[tokio::test]
    async fn test_status_message_not_expired_before_3_seconds() {
        time::pause();
        let mut app = test_app();
        app.set_status("Test message");

        time::advance(Duration::from_secs(2)).await;
        app.clear_expired_status();
        assert!(app.status_message.is_some());
    }

    #[tokio::test]
    async fn test_status_message_expires_after_3_seconds() {
        time::pause();
        let mut app = test_app();
        app.set_status("Test message");

        time::advance(Duration::from_secs(3)).await;
        app.clear_expired_status();
        assert!(app.status_message.is_none());
    }

    // ========================================================================
    // Snapshot Tests
    // ========================================================================

    #[tokio::test]
    async fn test_snapshot_keeps_selection_by_id() {
        let mut app = test_app();
        app.apply_snapshot(snapshot(&["a", "b", "c"]));
        app.selected = 1;

        // A new notification arrives on top
        app.apply_snapshot(snapshot(&["z", "a", "b", "c"]));
        assert_eq!(app.selected_notification().unwrap().n_id.as_str(), "b");
    }

    #[tokio::test]
    async fn test_snapshot_clamps_selection_when_list_shrinks() {
        let mut app = test_app();
        app.apply_snapshot(snapshot(&["a", "b", "c"]));
        app.selected = 2;
        app.apply_snapshot(snapshot(&["x"]));
        assert_eq!(app.selected, 0);
    }

    #[tokio::test]
    async fn test_store_change_resets_selection_and_scroll() {
        let mut app = test_app();
        let mut data = snapshot(&["a", "b"]);
        data.active_store = Some("all".to_string());
        app.apply_snapshot(data.clone());
        app.selected = 1;
        app.feed_scroll = 4;

        data.active_store = Some("unread".to_string());
        app.apply_snapshot(data);
        assert_eq!(app.selected, 0);
        assert_eq!(app.feed_scroll, 0);
    }

    #[tokio::test]
    async fn test_menu_closes_when_target_disappears() {
        let mut app = test_app();
        app.apply_snapshot(snapshot(&["a", "b"]));
        app.open_card_menu(NotificationId::from("b"));
        assert!(app.card_menu.is_some());

        app.apply_snapshot(snapshot(&["a"]));
        assert!(app.card_menu.is_none());
    }

    #[tokio::test]
    async fn test_has_more_respects_pagination_flag() {
        let mut app = test_app();
        let mut data = snapshot(&["a"]);
        data.page_info = PageInfo {
            current_page: 1,
            total_pages: 3,
        };
        app.apply_snapshot(data);
        assert!(app.has_more());
        app.config.pagination = false;
        assert!(!app.has_more());
    }

    // ========================================================================
    // Menu Tests
    // ========================================================================

    #[test]
    fn test_menu_items_for_unread_and_archived() {
        let unread = notification("a");
        assert_eq!(
            MenuItem::for_notification(&unread),
            vec![MenuItem::MarkRead, MenuItem::Archive]
        );

        let mut archived = notification("b");
        archived.read_on = Some(archived.created_on);
        archived.archived = true;
        assert_eq!(MenuItem::for_notification(&archived), vec![MenuItem::MarkUnread]);
    }

    #[tokio::test]
    async fn test_menu_selection_wraps() {
        let mut app = test_app();
        app.apply_snapshot(snapshot(&["a"]));
        app.open_card_menu(NotificationId::from("a"));
        app.menu_move(false);
        assert_eq!(app.card_menu.as_ref().unwrap().selected, 1);
        app.menu_move(true);
        assert_eq!(app.card_menu.as_ref().unwrap().selected, 0);
    }

    #[tokio::test]
    async fn test_input_context_follows_overlays() {
        let mut app = test_app();
        app.apply_snapshot(snapshot(&["a"]));
        assert_eq!(app.input_context(), Context::Global);
        app.popover.toggle();
        assert_eq!(app.input_context(), Context::Feed);
        app.open_card_menu(NotificationId::from("a"));
        assert_eq!(app.input_context(), Context::CardMenu);
        app.close_inbox();
        assert_eq!(app.input_context(), Context::Global);
        assert!(app.card_menu.is_none());
    }

    // ========================================================================
    // Navigation Tests
    // ========================================================================

    #[tokio::test]
    async fn test_body_click_opens_message_url() {
        let app = test_app();
        let n = notification("a");
        assert_eq!(
            app.navigation_for(&n, &CardRegion::Body),
            Navigation::Open {
                url: "https://example.com/n".to_string(),
                new_tab: false
            }
        );
    }

    #[tokio::test]
    async fn test_hook_replaces_default_navigation() {
        let hook: NotificationHook = Arc::new(|_| {});
        let app = test_app().with_hooks(Hooks {
            on_notification_click: Some(hook),
            ..Default::default()
        });
        let n = notification("a");
        assert_eq!(
            app.navigation_for(&n, &CardRegion::Body),
            Navigation::Hook(HookKind::NotificationClick)
        );
    }

    #[tokio::test]
    async fn test_action_navigation_and_fallback() {
        let hook: NotificationHook = Arc::new(|_| {});
        let app = test_app().with_hooks(Hooks {
            on_secondary_action_click: Some(hook),
            ..Default::default()
        });
        let mut n = notification("a");
        n.message.actions = vec![
            ActionButton {
                name: "View".to_string(),
                url: Some("/orders/1".to_string()),
                open_in_new_tab: true,
            },
            ActionButton {
                name: "Later".to_string(),
                url: None,
                open_in_new_tab: false,
            },
            ActionButton {
                name: "Extra".to_string(),
                url: None,
                open_in_new_tab: false,
            },
        ];
        assert_eq!(
            app.navigation_for(&n, &CardRegion::Action(0)),
            Navigation::Open {
                url: "/orders/1".to_string(),
                new_tab: true
            }
        );
        assert_eq!(
            app.navigation_for(&n, &CardRegion::Action(1)),
            Navigation::Hook(HookKind::SecondaryAction)
        );
        // No url and no hook: falls back to the card url
        assert_eq!(
            app.navigation_for(&n, &CardRegion::Action(2)),
            Navigation::Open {
                url: "https://example.com/n".to_string(),
                new_tab: false
            }
        );
    }

    #[tokio::test]
    async fn test_avatar_and_link_navigation() {
        let app = test_app();
        let mut n = notification("a");
        n.message.url = None;
        n.message.avatar = Some(Avatar {
            avatar_url: None,
            action_url: Some("https://example.com/profile".to_string()),
        });
        assert_eq!(
            app.navigation_for(&n, &CardRegion::Avatar),
            Navigation::Open {
                url: "https://example.com/profile".to_string(),
                new_tab: false
            }
        );
        assert_eq!(app.navigation_for(&n, &CardRegion::Subtext), Navigation::Nothing);
        assert_eq!(
            app.navigation_for(&n, &CardRegion::Link("docs.rs".to_string())),
            Navigation::Open {
                url: "docs.rs".to_string(),
                new_tab: true
            }
        );
    }

    // ========================================================================
    // Scrolling Tests
    // ========================================================================

    #[tokio::test]
    async fn test_scroll_to_clamps_to_content() {
        let mut app = test_app();
        app.list_view = Some(list_view(&[4, 4, 4], 6));
        let metrics = app.scroll_to(100).unwrap();
        assert_eq!(metrics.scroll_top, 6);
        assert_eq!(app.feed_scroll, 6);
        // Already there
        assert!(app.scroll_to(50).is_none());
    }

    #[tokio::test]
    async fn test_ensure_selected_visible_scrolls_down_and_up() {
        let mut app = test_app();
        app.apply_snapshot(snapshot(&["n0", "n1", "n2"]));
        app.list_view = Some(list_view(&[4, 4, 4], 6));

        app.selected = 2;
        let metrics = app.ensure_selected_visible().unwrap();
        assert_eq!(metrics.scroll_top, 6);

        app.selected = 0;
        let metrics = app.ensure_selected_visible().unwrap();
        assert_eq!(metrics.scroll_top, 0);
        assert!(app.ensure_selected_visible().is_none());
    }

    #[tokio::test]
    async fn test_page_down_selects_first_card_in_view() {
        let mut app = test_app();
        app.apply_snapshot(snapshot(&["n0", "n1", "n2", "n3"]));
        app.list_view = Some(list_view(&[3, 3, 3, 3], 4));
        app.page(true);
        assert_eq!(app.feed_scroll, 3);
        assert_eq!(app.selected, 1);
    }

    #[tokio::test]
    async fn test_list_change_reported_once() {
        let mut app = test_app();
        assert!(app.take_list_change().is_none());
        app.list_view = Some(list_view(&[3, 3], 10));
        assert!(app.take_list_change().is_some());
        assert!(app.take_list_change().is_none());

        app.list_view = Some(list_view(&[3, 3, 3], 10));
        assert!(app.take_list_change().is_some());
    }

    // ========================================================================
    // Toast Tests
    // ========================================================================

    #[tokio::test]
    async fn test_toasts_capped_and_expire() {
        time::pause();
        let mut app = test_app();
        for id in ["a", "b", "c", "d"] {
            app.push_toast(notification(id));
        }
        assert_eq!(app.toasts.len(), MAX_TOASTS);
        assert_eq!(app.toasts[0].notification.n_id.as_str(), "b");

        time::advance(Duration::from_secs(4)).await;
        app.expire_toasts();
        assert_eq!(app.toasts.len(), MAX_TOASTS);

        time::advance(Duration::from_secs(1)).await;
        app.expire_toasts();
        assert!(app.toasts.is_empty());
    }

    #[tokio::test]
    async fn test_toast_notification_is_findable() {
        let mut app = test_app();
        app.push_toast(notification("t"));
        assert!(app.find_notification(&NotificationId::from("t")).is_some());
        app.dismiss_toast(&NotificationId::from("t"));
        assert!(app.find_notification(&NotificationId::from("t")).is_none());
    }

    // ========================================================================
    // Theme Tests
    // ========================================================================

    #[tokio::test]
    async fn test_cycle_theme_resolves_dark_tree() {
        let mut app = test_app();
        assert_eq!(app.theme_type, ThemeType::Light);
        assert!(app.themes.card.container.is_none());

        app.cycle_theme();
        assert_eq!(app.theme_type, ThemeType::Dark);
        assert!(app.themes.card.container.is_some());
        assert!(app.status_message.is_some());
    }

    #[tokio::test]
    async fn test_dark_override_reaches_card_theme() {
        let config = Config::parse(
            r#"
            theme_type = "dark"
            [theme.notification.header_text]
            color = "red"
            "#,
        )
        .unwrap();
        let feed = MemoryFeed::new(Fixture {
            stores: vec![Store {
                store_id: "all".to_string(),
                label: None,
                query: Default::default(),
            }],
            ..Default::default()
        });
        let app = App::new(config, Arc::new(feed)).unwrap();
        let header = app.themes.card.header_text.as_ref().unwrap();
        assert_eq!(header.color.map(|c| c.0), Some(Color::Red));
        let dark = ResolvedThemes::resolve(ThemeType::Dark, None);
        assert_eq!(app.themes.card.body_text, dark.card.body_text);
    }
}
