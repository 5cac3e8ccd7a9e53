//! The theme schema: one record per widget surface.
//!
//! Field names follow the surfaces of the inbox (bell, badge, header, tabs,
//! notifications container, notification card, toast). Every field is
//! optional; the renderer falls back to the light defaults in
//! [`crate::theme::colors`] for anything left unset.

use super::merge::theme_section;
use ratatui::style::{Color, Modifier, Style};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

// ============================================================================
// Leaf values
// ============================================================================

/// A terminal color parsed from a config string.
///
/// Accepts ratatui color names (`"red"`, `"lightblue"`), hex (`"#2e70e8"`)
/// and 256-color indices (`"42"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeColor(pub Color);

impl ThemeColor {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self(Color::Rgb(r, g, b))
    }
}

impl From<Color> for ThemeColor {
    fn from(color: Color) -> Self {
        Self(color)
    }
}

impl FromStr for ThemeColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::from_str(s.trim())
            .map(Self)
            .map_err(|_| format!("unknown color '{}'", s))
    }
}

impl Serialize for ThemeColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for ThemeColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Shared sections
// ============================================================================

theme_section! {
    /// Appearance of a run of text.
    pub struct TextStyle {
        leaf color: ThemeColor,
        leaf background_color: ThemeColor,
        leaf bold: bool,
        leaf italic: bool,
        leaf underline: bool,
        leaf dim: bool,
    }
}

impl TextStyle {
    /// Layer the set fields of this section onto `base`.
    pub fn patch(&self, base: Style) -> Style {
        let mut style = base;
        if let Some(color) = self.color {
            style = style.fg(color.0);
        }
        if let Some(bg) = self.background_color {
            style = style.bg(bg.0);
        }
        for (flag, modifier) in [
            (self.bold, Modifier::BOLD),
            (self.italic, Modifier::ITALIC),
            (self.underline, Modifier::UNDERLINED),
            (self.dim, Modifier::DIM),
        ] {
            match flag {
                Some(true) => style = style.add_modifier(modifier),
                Some(false) => style = style.remove_modifier(modifier),
                None => {}
            }
        }
        style
    }
}

/// Layer an optional text section onto a default style.
pub fn text_style(section: Option<&TextStyle>, base: Style) -> Style {
    section.map_or(base, |s| s.patch(base))
}

/// Unwrap a theme color, falling back to a default.
pub fn color_or(color: Option<ThemeColor>, fallback: Color) -> Color {
    color.map_or(fallback, |c| c.0)
}

theme_section! {
    /// A single-glyph icon.
    pub struct IconTheme {
        leaf color: ThemeColor,
        leaf background_color: ThemeColor,
        leaf hover_background_color: ThemeColor,
        /// Glyph drawn in place of the default icon.
        leaf symbol: String,
    }
}

impl IconTheme {
    pub fn symbol_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.symbol.as_deref().unwrap_or(fallback)
    }
}

theme_section! {
    pub struct LoaderTheme {
        leaf color: ThemeColor,
    }
}

// ============================================================================
// Header and tabs
// ============================================================================

theme_section! {
    pub struct HeaderTheme {
        section container: TextStyle,
        section header_text: TextStyle,
        section mark_all_read_text: TextStyle,
    }
}

theme_section! {
    /// Store tabs under the header.
    pub struct TabsTheme {
        leaf color: ThemeColor,
        leaf unselected_color: ThemeColor,
        leaf bottom_color: ThemeColor,
        leaf badge_color: ThemeColor,
        leaf badge_text: ThemeColor,
    }
}

theme_section! {
    /// The scrolling list area, including its empty and loading states.
    pub struct NotificationsContainerTheme {
        section container: TextStyle,
        section no_notifications_text: TextStyle,
        section no_notifications_subtext: TextStyle,
        section loader: LoaderTheme,
    }
}

// ============================================================================
// Notification card
// ============================================================================

theme_section! {
    pub struct CardContainerTheme {
        leaf border_color: ThemeColor,
        leaf read_background_color: ThemeColor,
        leaf unread_background_color: ThemeColor,
        /// Background of the selected card.
        leaf hover_background_color: ThemeColor,
    }
}

theme_section! {
    /// Markdown body of a card.
    pub struct BodyTextTheme {
        leaf color: ThemeColor,
        leaf background_color: ThemeColor,
        leaf blockquote_color: ThemeColor,
        leaf table_border_color: ThemeColor,
        leaf link_color: ThemeColor,
        leaf code_color: ThemeColor,
    }
}

theme_section! {
    pub struct ExpiresTextTheme {
        leaf color: ThemeColor,
        leaf background_color: ThemeColor,
        leaf expiring_color: ThemeColor,
        leaf expiring_background_color: ThemeColor,
    }
}

theme_section! {
    pub struct ActionButtonContainerTheme {
        leaf background_color: ThemeColor,
        leaf border_color: ThemeColor,
        leaf hover_background_color: ThemeColor,
    }
}

theme_section! {
    /// One action button. Cards carry these as a positional list
    /// (primary first), which an override replaces as a whole.
    pub struct ActionButtonTheme {
        section container: ActionButtonContainerTheme,
        section text: TextStyle,
    }
}

theme_section! {
    pub struct MenuItemTheme {
        leaf background_color: ThemeColor,
        leaf hover_background_color: ThemeColor,
    }
}

theme_section! {
    pub struct NotificationCardTheme {
        section container: CardContainerTheme,
        section pinned_icon: IconTheme,
        section pinned_text: TextStyle,
        section header_text: TextStyle,
        section body_text: BodyTextTheme,
        section unseen_dot: IconTheme,
        section avatar: IconTheme,
        section created_on_text: TextStyle,
        section subtext: TextStyle,
        section expires_text: ExpiresTextTheme,
        leaf actions: Vec<ActionButtonTheme>,
        section actions_menu_icon: IconTheme,
        section actions_menu: TextStyle,
        section actions_menu_item: MenuItemTheme,
        section actions_menu_item_icon: IconTheme,
        section actions_menu_item_text: TextStyle,
    }
}

impl NotificationCardTheme {
    /// Theme for the action button at `index` (0 = primary).
    pub fn action(&self, index: usize) -> Option<&ActionButtonTheme> {
        self.actions.as_ref().and_then(|a| a.get(index))
    }
}

// ============================================================================
// Top-level trees
// ============================================================================

theme_section! {
    /// Theme for the feed panel on its own.
    pub struct FeedTheme {
        section header: HeaderTheme,
        section tabs: TabsTheme,
        section notifications_container: NotificationsContainerTheme,
        section notification: NotificationCardTheme,
    }
}

theme_section! {
    /// Theme for the whole inbox: bell, badge, feed panel and toasts.
    pub struct InboxTheme {
        section bell: IconTheme,
        section badge: TextStyle,
        section header: HeaderTheme,
        section tabs: TabsTheme,
        section notifications_container: NotificationsContainerTheme,
        section notification: NotificationCardTheme,
        section toast: NotificationCardTheme,
    }
}

impl InboxTheme {
    /// The slice handed down to the feed panel.
    pub fn feed(&self) -> FeedTheme {
        FeedTheme {
            header: self.header.clone(),
            tabs: self.tabs.clone(),
            notifications_container: self.notifications_container.clone(),
            notification: self.notification.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_color_parses_names_and_hex() {
        assert_eq!("red".parse::<ThemeColor>().unwrap().0, Color::Red);
        assert_eq!(
            "#2e70e8".parse::<ThemeColor>().unwrap().0,
            Color::Rgb(0x2e, 0x70, 0xe8)
        );
        assert!("not-a-color".parse::<ThemeColor>().is_err());
    }

    #[test]
    fn test_text_style_patch_sets_and_clears_modifiers() {
        let section = TextStyle {
            color: Some(ThemeColor(Color::Red)),
            bold: Some(false),
            italic: Some(true),
            ..Default::default()
        };
        let base = Style::default().add_modifier(Modifier::BOLD);
        let style = section.patch(base);
        assert_eq!(style.fg, Some(Color::Red));
        assert!(!style.add_modifier.contains(Modifier::BOLD));
        assert!(style.add_modifier.contains(Modifier::ITALIC));
    }

    #[test]
    fn test_text_style_absent_keeps_base() {
        let base = Style::default().fg(Color::Blue);
        assert_eq!(text_style(None, base), base);
    }

    #[test]
    fn test_card_theme_from_toml() {
        let card: NotificationCardTheme = toml::from_str(
            r##"
[header_text]
color = "#ff0000"
bold = true

[[actions]]
text = { color = "white" }

[[actions]]
container = { border_color = "gray" }
"##,
        )
        .unwrap();
        assert_eq!(
            card.header_text.as_ref().and_then(|h| h.color),
            Some(ThemeColor::rgb(255, 0, 0))
        );
        assert_eq!(card.actions.as_ref().map(Vec::len), Some(2));
        assert!(card.action(1).and_then(|a| a.container.as_ref()).is_some());
        assert!(card.action(2).is_none());
    }

    #[test]
    fn test_bad_color_in_one_field_keeps_the_rest() {
        let header: HeaderTheme = toml::from_str(
            r#"
header_text = { color = "chartreuse-ish" }
mark_all_read_text = { color = "blue" }
"#,
        )
        .unwrap();
        // The bad leaf is dropped; its section survives empty
        assert_eq!(header.header_text, Some(TextStyle::default()));
        assert_eq!(
            header.mark_all_read_text.and_then(|t| t.color),
            Some(ThemeColor(Color::Blue))
        );
    }

    #[test]
    fn test_inbox_feed_slice() {
        let inbox = InboxTheme {
            tabs: Some(TabsTheme {
                color: Some(ThemeColor(Color::Green)),
                ..Default::default()
            }),
            bell: Some(IconTheme::default()),
            ..Default::default()
        };
        let feed = inbox.feed();
        assert_eq!(feed.tabs, inbox.tabs);
        assert!(feed.header.is_none());
    }
}
