//! Effective-theme resolution at each component boundary.
//!
//! Components do not receive one pre-resolved tree. Each boundary (inbox,
//! feed panel, card, toast card) takes its own override slice and resolves
//! it again, so a caller can hand the same override to any level. Resolving
//! twice is idempotent because the dark tree is fully populated.

use super::dark::dark_theme;
use super::merge::{deep_merge, Merge};
use super::schema::{FeedTheme, InboxTheme, NotificationCardTheme};
use super::ThemeType;

/// A theme slice that has a built-in dark counterpart.
pub trait DarkDefault: Merge + Default {
    fn dark() -> Self;
}

impl DarkDefault for InboxTheme {
    fn dark() -> Self {
        dark_theme()
    }
}

impl DarkDefault for FeedTheme {
    fn dark() -> Self {
        dark_theme().feed()
    }
}

impl DarkDefault for NotificationCardTheme {
    fn dark() -> Self {
        dark_theme().notification.unwrap_or_default()
    }
}

/// Picks the base tree for a theme type and layers caller overrides on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeResolver {
    pub theme_type: ThemeType,
}

impl ThemeResolver {
    pub fn new(theme_type: ThemeType) -> Self {
        Self { theme_type }
    }

    /// Resolve any slice with a dark counterpart.
    ///
    /// Light mode uses the override verbatim (empty when absent). Dark mode
    /// deep-merges the override onto the built-in dark slice.
    pub fn resolve<T: DarkDefault>(&self, over: Option<&T>) -> T {
        match self.theme_type {
            ThemeType::Light => over.cloned().unwrap_or_default(),
            ThemeType::Dark => deep_merge(Some(&T::dark()), over),
        }
    }

    /// Resolve a toast card theme. Toasts have their own dark base.
    pub fn toast(&self, over: Option<&NotificationCardTheme>) -> NotificationCardTheme {
        match self.theme_type {
            ThemeType::Light => over.cloned().unwrap_or_default(),
            ThemeType::Dark => deep_merge(dark_theme().toast.as_ref(), over),
        }
    }
}
