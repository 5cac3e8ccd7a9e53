//! Theme system for the inbox widget.
//!
//! Themes are typed, all-optional records (see [`schema`]). A caller supplies
//! an override tree; [`ThemeResolver`] layers it onto the built-in dark tree
//! or, in light mode, uses it as is. Renderers fall back to the light palette
//! in [`colors`] for any field that is still unset.

pub mod colors;
mod dark;
pub(crate) mod merge;
mod resolve;
pub mod schema;

pub use dark::dark_theme;
pub use merge::{deep_merge, Merge};
pub use resolve::{DarkDefault, ThemeResolver};
pub use schema::{
    color_or, text_style, ActionButtonContainerTheme, ActionButtonTheme, BodyTextTheme,
    CardContainerTheme, ExpiresTextTheme, FeedTheme, HeaderTheme, IconTheme, InboxTheme,
    LoaderTheme, MenuItemTheme, NotificationCardTheme, NotificationsContainerTheme, TabsTheme,
    TextStyle, ThemeColor,
};

use serde::{Deserialize, Serialize};

/// Which base tree the resolver starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeType {
    #[default]
    Light,
    Dark,
}

impl ThemeType {
    /// Parse a theme type name (case-insensitive).
    pub fn from_str_name(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    /// Cycle to the next type: Light → Dark → Light.
    pub fn next(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Human-readable name for status display.
    pub fn name(self) -> &'static str {
        match self {
            Self::Light => "Light",
            Self::Dark => "Dark",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_type_from_str_name() {
        assert_eq!(ThemeType::from_str_name("dark"), Some(ThemeType::Dark));
        assert_eq!(ThemeType::from_str_name("Light"), Some(ThemeType::Light));
        assert_eq!(ThemeType::from_str_name("DARK"), Some(ThemeType::Dark));
        assert_eq!(ThemeType::from_str_name("neon"), None);
    }

    #[test]
    fn theme_type_cycles() {
        assert_eq!(ThemeType::Light.next(), ThemeType::Dark);
        assert_eq!(ThemeType::Dark.next().next(), ThemeType::Dark);
    }

    #[test]
    fn dark_tree_populates_every_surface() {
        let dark = dark_theme();
        assert!(dark.bell.is_some());
        assert!(dark.badge.is_some());
        assert!(dark.header.is_some());
        assert!(dark.tabs.is_some());
        assert!(dark.notifications_container.is_some());
        assert!(dark.toast.is_some());
        let card = dark.notification.expect("dark card theme");
        assert_eq!(card.actions.map(|a| a.len()), Some(2));
    }
}
