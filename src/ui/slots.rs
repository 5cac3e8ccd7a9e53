//! Replaceable sub-renderers.
//!
//! Each slot is either the built-in renderer or one supplied by the embedder.
//! [`Slots`] holds the custom ones; the accessors resolve a slot to a trait
//! object once per frame, falling back to the default.
//!
//! Interactive slots return the clickable regions they drew so the input
//! handler can hit-test them.

use crate::avatar::AvatarStatus;
use crate::feed::Notification;
use crate::theme::{
    HeaderTheme, IconTheme, LoaderTheme, NotificationCardTheme, NotificationsContainerTheme,
    TabsTheme, TextStyle,
};
use chrono::{DateTime, Utc};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;

use super::bell::{DefaultBadge, DefaultBell};
use super::card::DefaultCard;
use super::feed::{DefaultEmptyState, DefaultLoader};
use super::header::{DefaultHeaderRight, DefaultTabBadge};

// ============================================================================
// Props
// ============================================================================

pub struct BellProps<'a> {
    pub theme: &'a IconTheme,
    pub open: bool,
}

pub struct BadgeProps<'a> {
    pub count: u32,
    pub theme: Option<&'a TextStyle>,
}

pub struct LoaderProps<'a> {
    pub theme: Option<&'a LoaderTheme>,
    /// Animation frame, advanced on every tick.
    pub frame: usize,
}

pub struct EmptyStateProps<'a> {
    pub theme: Option<&'a NotificationsContainerTheme>,
}

pub struct TabBadgeProps<'a> {
    pub count: u32,
    pub theme: Option<&'a TabsTheme>,
}

pub struct HeaderRightProps<'a> {
    pub theme: Option<&'a HeaderTheme>,
}

/// Full card in the feed, or the compact toast card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardVariant {
    Feed,
    Toast,
}

pub struct CardProps<'a> {
    pub notification: &'a Notification,
    pub theme: &'a NotificationCardTheme,
    pub variant: CardVariant,
    pub selected: bool,
    pub hide_avatar: bool,
    pub disable_markdown: bool,
    pub avatar: AvatarStatus,
    pub now: DateTime<Utc>,
}

// ============================================================================
// Regions
// ============================================================================

/// Clickable part of a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardRegion {
    Body,
    Avatar,
    Subtext,
    /// Action button by position (0 = primary).
    Action(usize),
    /// Link inside the markdown body.
    Link(String),
    /// The actions menu toggle.
    Menu,
}

/// Clickable part of the header right area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderIntent {
    MarkAllRead,
    CloseInbox,
}

// ============================================================================
// Slot traits
// ============================================================================

pub trait BellSlot: Send + Sync {
    /// Columns the bell needs, badge excluded.
    fn width(&self, props: &BellProps<'_>) -> u16;
    fn render(&self, props: &BellProps<'_>, area: Rect, buf: &mut Buffer);
}

pub trait BadgeSlot: Send + Sync {
    /// Columns the badge needs. Zero hides it.
    fn width(&self, props: &BadgeProps<'_>) -> u16;
    fn render(&self, props: &BadgeProps<'_>, area: Rect, buf: &mut Buffer);
}

pub trait LoaderSlot: Send + Sync {
    fn render(&self, props: &LoaderProps<'_>, area: Rect, buf: &mut Buffer);
}

pub trait EmptyStateSlot: Send + Sync {
    fn render(&self, props: &EmptyStateProps<'_>, area: Rect, buf: &mut Buffer);
}

pub trait TabBadgeSlot: Send + Sync {
    fn width(&self, props: &TabBadgeProps<'_>) -> u16;
    fn render(&self, props: &TabBadgeProps<'_>, area: Rect, buf: &mut Buffer);
}

pub trait HeaderRightSlot: Send + Sync {
    fn width(&self, props: &HeaderRightProps<'_>) -> u16;
    fn render(
        &self,
        props: &HeaderRightProps<'_>,
        area: Rect,
        buf: &mut Buffer,
    ) -> Vec<(Rect, HeaderIntent)>;
}

/// Renders one notification card into its own buffer.
///
/// The feed lays cards out with `height` and draws each into an off-screen
/// buffer of exactly that size, so `area` always starts at the card's top
/// left corner even when the card is scrolled partly out of view.
pub trait CardSlot: Send + Sync {
    fn height(&self, props: &CardProps<'_>, width: u16) -> u16;
    fn render(&self, props: &CardProps<'_>, area: Rect, buf: &mut Buffer)
        -> Vec<(Rect, CardRegion)>;
}

/// Custom renderers supplied by the embedder. Unset slots use the defaults.
#[derive(Default)]
pub struct Slots {
    pub bell: Option<Box<dyn BellSlot>>,
    pub badge: Option<Box<dyn BadgeSlot>>,
    pub loader: Option<Box<dyn LoaderSlot>>,
    pub empty_state: Option<Box<dyn EmptyStateSlot>>,
    pub tab_badge: Option<Box<dyn TabBadgeSlot>>,
    pub header_right: Option<Box<dyn HeaderRightSlot>>,
    pub card: Option<Box<dyn CardSlot>>,
}

impl Slots {
    pub fn bell(&self) -> &dyn BellSlot {
        self.bell.as_deref().unwrap_or(&DefaultBell)
    }

    pub fn badge(&self) -> &dyn BadgeSlot {
        self.badge.as_deref().unwrap_or(&DefaultBadge)
    }

    pub fn loader(&self) -> &dyn LoaderSlot {
        self.loader.as_deref().unwrap_or(&DefaultLoader)
    }

    pub fn empty_state(&self) -> &dyn EmptyStateSlot {
        self.empty_state.as_deref().unwrap_or(&DefaultEmptyState)
    }

    pub fn tab_badge(&self) -> &dyn TabBadgeSlot {
        self.tab_badge.as_deref().unwrap_or(&DefaultTabBadge)
    }

    pub fn header_right(&self) -> &dyn HeaderRightSlot {
        self.header_right.as_deref().unwrap_or(&DefaultHeaderRight)
    }

    pub fn card(&self) -> &dyn CardSlot {
        self.card.as_deref().unwrap_or(&DefaultCard)
    }
}
