//! The built-in dark theme tree.

use super::colors::dark as c;
use super::schema::*;
use ratatui::style::Color;

fn color(value: Color) -> Option<ThemeColor> {
    Some(ThemeColor(value))
}

fn text(fg: Color) -> Option<TextStyle> {
    Some(TextStyle {
        color: color(fg),
        ..Default::default()
    })
}

fn icon(fg: Color) -> Option<IconTheme> {
    Some(IconTheme {
        color: color(fg),
        ..Default::default()
    })
}

fn card(background: Color) -> NotificationCardTheme {
    NotificationCardTheme {
        container: Some(CardContainerTheme {
            border_color: color(c::BORDER),
            read_background_color: color(background),
            unread_background_color: color(c::UNREAD_BACKGROUND),
            hover_background_color: color(c::HOVER_BACKGROUND),
        }),
        pinned_icon: icon(c::SECONDARY_TEXT),
        pinned_text: text(c::SECONDARY_TEXT),
        header_text: text(c::PRIMARY_TEXT),
        body_text: Some(BodyTextTheme {
            color: color(c::SECONDARY_TEXT),
            blockquote_color: color(c::QUOTE_BORDER),
            table_border_color: color(c::QUOTE_BORDER),
            link_color: color(c::PRIMARY),
            ..Default::default()
        }),
        unseen_dot: icon(c::PRIMARY),
        avatar: icon(c::SECONDARY_TEXT),
        created_on_text: text(c::SUBTEXT),
        subtext: text(c::SUBTEXT),
        expires_text: Some(ExpiresTextTheme {
            color: color(c::SECONDARY_TEXT),
            background_color: color(c::MUTED_BACKGROUND),
            expiring_color: color(c::ERROR),
            expiring_background_color: color(c::EXPIRING_BACKGROUND),
        }),
        actions: Some(vec![
            ActionButtonTheme {
                container: Some(ActionButtonContainerTheme {
                    background_color: color(c::PRIMARY),
                    ..Default::default()
                }),
                text: text(c::PRIMARY_TEXT),
            },
            ActionButtonTheme {
                container: Some(ActionButtonContainerTheme {
                    background_color: color(background),
                    border_color: color(c::BORDER),
                    hover_background_color: color(c::OUTLINE_BUTTON_HOVER),
                }),
                text: text(c::SECONDARY_TEXT),
            },
        ]),
        actions_menu_icon: Some(IconTheme {
            color: color(c::SECONDARY_TEXT),
            hover_background_color: color(c::HOVER_BACKGROUND),
            ..Default::default()
        }),
        actions_menu: Some(TextStyle {
            color: color(c::PRIMARY_TEXT),
            background_color: color(c::MAIN),
            ..Default::default()
        }),
        actions_menu_item: Some(MenuItemTheme {
            background_color: color(c::MAIN),
            hover_background_color: color(c::HOVER_BACKGROUND),
        }),
        actions_menu_item_icon: icon(c::SECONDARY_TEXT),
        actions_menu_item_text: text(c::PRIMARY_TEXT),
    }
}

/// The complete dark tree. Every surface is populated.
pub fn dark_theme() -> InboxTheme {
    InboxTheme {
        bell: icon(c::PRIMARY_TEXT),
        badge: Some(TextStyle {
            color: color(c::PRIMARY_TEXT),
            background_color: color(c::PRIMARY),
            ..Default::default()
        }),
        header: Some(HeaderTheme {
            container: Some(TextStyle {
                background_color: color(c::MAIN),
                ..Default::default()
            }),
            header_text: text(c::PRIMARY_TEXT),
            mark_all_read_text: text(c::PRIMARY),
        }),
        tabs: Some(TabsTheme {
            color: color(c::PRIMARY_TEXT),
            unselected_color: color(c::SECONDARY_TEXT),
            bottom_color: color(c::PRIMARY),
            badge_color: color(c::MUTED_BACKGROUND),
            badge_text: color(c::PRIMARY_TEXT),
        }),
        notifications_container: Some(NotificationsContainerTheme {
            container: Some(TextStyle {
                background_color: color(c::MAIN),
                color: color(c::BORDER),
                ..Default::default()
            }),
            no_notifications_text: text(c::PRIMARY_TEXT),
            no_notifications_subtext: text(c::SECONDARY_TEXT),
            loader: Some(LoaderTheme {
                color: color(c::PRIMARY),
            }),
        }),
        notification: Some(card(c::MAIN)),
        toast: Some(card(c::MAIN)),
    }
}
