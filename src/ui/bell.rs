//! Bell icon with its unread badge.

use crate::theme::colors::light;
use crate::theme::{color_or, text_style, IconTheme, InboxTheme};
use crate::util::display_width;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};

use super::slots::{BadgeProps, BadgeSlot, BellProps, BellSlot, Slots};

const BELL_GLYPH: &str = "🔔";

fn width_of(s: &str) -> u16 {
    u16::try_from(display_width(s)).unwrap_or(u16::MAX)
}

pub struct DefaultBell;

impl BellSlot for DefaultBell {
    fn width(&self, props: &BellProps<'_>) -> u16 {
        // One cell of padding each side
        width_of(props.theme.symbol_or(BELL_GLYPH)).saturating_add(2)
    }

    fn render(&self, props: &BellProps<'_>, area: Rect, buf: &mut Buffer) {
        let mut style = Style::default().fg(color_or(props.theme.color, light::PRIMARY_TEXT));
        let background = if props.open {
            Some(color_or(
                props.theme.hover_background_color,
                light::HOVER_BACKGROUND,
            ))
        } else {
            props.theme.background_color.map(|c| c.0)
        };
        if let Some(bg) = background {
            style = style.bg(bg);
            buf.set_style(area, Style::default().bg(bg));
        }
        buf.set_stringn(
            area.x.saturating_add(1),
            area.y,
            props.theme.symbol_or(BELL_GLYPH),
            usize::from(area.width.saturating_sub(1)),
            style,
        );
    }
}

/// Unread count on the bell. Hidden at zero.
pub struct DefaultBadge;

impl BadgeSlot for DefaultBadge {
    fn width(&self, props: &BadgeProps<'_>) -> u16 {
        if props.count == 0 {
            return 0;
        }
        width_of(&props.count.to_string()).saturating_add(2)
    }

    fn render(&self, props: &BadgeProps<'_>, area: Rect, buf: &mut Buffer) {
        if props.count == 0 {
            return;
        }
        let base = Style::default()
            .fg(light::MAIN)
            .bg(light::ERROR)
            .add_modifier(Modifier::BOLD);
        buf.set_stringn(
            area.x,
            area.y,
            format!(" {} ", props.count),
            usize::from(area.width),
            text_style(props.theme, base),
        );
    }
}

/// Draw bell and badge at the right end of `row`. Returns the bell and
/// badge cells, which anchor the feed panel.
pub(super) fn render(
    slots: &Slots,
    theme: &InboxTheme,
    open: bool,
    count: u32,
    row: Rect,
    buf: &mut Buffer,
) -> Rect {
    let fallback = IconTheme::default();
    let bell_props = BellProps {
        theme: theme.bell.as_ref().unwrap_or(&fallback),
        open,
    };
    let badge_props = BadgeProps {
        count,
        theme: theme.badge.as_ref(),
    };
    let bell = slots.bell();
    let badge = slots.badge();

    let bell_width = bell.width(&bell_props).min(row.width);
    let badge_width = badge
        .width(&badge_props)
        .min(row.width.saturating_sub(bell_width));
    let total = bell_width.saturating_add(badge_width);
    let anchor = Rect::new(
        row.right().saturating_sub(total.saturating_add(1)),
        row.y,
        total,
        1.min(row.height),
    );

    bell.render(
        &bell_props,
        Rect::new(anchor.x, anchor.y, bell_width, anchor.height),
        buf,
    );
    if badge_width > 0 {
        badge.render(
            &badge_props,
            Rect::new(
                anchor.x.saturating_add(bell_width),
                anchor.y,
                badge_width,
                anchor.height,
            ),
            buf,
        );
    }
    anchor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_text(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf[(x, y)].symbol())
            .collect::<String>()
    }

    #[test]
    fn test_badge_shows_count() {
        let props = BadgeProps {
            count: 12,
            theme: None,
        };
        assert_eq!(DefaultBadge.width(&props), 4);
        let mut buf = Buffer::empty(Rect::new(0, 0, 4, 1));
        DefaultBadge.render(&props, Rect::new(0, 0, 4, 1), &mut buf);
        assert_eq!(row_text(&buf, 0), " 12 ");
    }

    #[test]
    fn test_bell_anchored_right() {
        let slots = Slots::default();
        let theme = InboxTheme::default();
        let row = Rect::new(0, 0, 30, 1);
        let mut buf = Buffer::empty(row);
        let anchor = render(&slots, &theme, false, 3, row, &mut buf);
        // bell (2 + 2 padding) + badge " 3 "
        assert_eq!(anchor.width, 7);
        assert_eq!(anchor.right(), 29);
        assert!(row_text(&buf, 0).contains(" 3 "));
    }

    #[test]
    fn test_zero_count_draws_no_badge() {
        let slots = Slots::default();
        let row = Rect::new(0, 0, 20, 1);
        let mut buf = Buffer::empty(row);
        let anchor = render(&slots, &InboxTheme::default(), false, 0, row, &mut buf);
        assert_eq!(anchor.width, 4);
    }

    #[test]
    fn test_custom_symbol() {
        let theme = IconTheme {
            symbol: Some("B".to_string()),
            ..Default::default()
        };
        let props = BellProps {
            theme: &theme,
            open: true,
        };
        assert_eq!(DefaultBell.width(&props), 3);
    }
}
