//! The scrolling notification list with its loading and empty states.
//!
//! Every card is measured each frame so the list knows its full content
//! height. Cards that intersect the viewport are drawn into an off-screen
//! buffer of their own size and the visible rows copied into the frame, so a
//! card scrolled half out of view is clipped rather than squashed.

use crate::app::{ListRow, ListView};
use crate::avatar::{AvatarCache, AvatarStatus};
use crate::feed::{Notification, NotificationId};
use crate::theme::colors::light;
use crate::theme::{color_or, text_style, NotificationCardTheme};
use crate::tracking::{intersects, stack, ScrollMetrics};
use chrono::{DateTime, Utc};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};

use super::slots::{
    CardProps, CardRegion, CardVariant, EmptyStateProps, EmptyStateSlot, LoaderProps,
    LoaderSlot, Slots,
};

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub(super) const EMPTY_TITLE: &str = "No notifications yet";
pub(super) const EMPTY_SUBTITLE: &str = "We'll let you know when we've got something new for you.";

fn centered_x(area: Rect, width: usize) -> u16 {
    let width = u16::try_from(width).unwrap_or(u16::MAX);
    area.x.saturating_add(area.width.saturating_sub(width) / 2)
}

pub struct DefaultLoader;

impl LoaderSlot for DefaultLoader {
    fn render(&self, props: &LoaderProps<'_>, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let style = Style::default().fg(color_or(
            props.theme.and_then(|l| l.color),
            light::PRIMARY,
        ));
        let glyph = SPINNER[props.frame % SPINNER.len()];
        buf.set_string(
            centered_x(area, 1),
            area.y.saturating_add(area.height / 2),
            glyph,
            style,
        );
    }
}

pub struct DefaultEmptyState;

impl EmptyStateSlot for DefaultEmptyState {
    fn render(&self, props: &EmptyStateProps<'_>, area: Rect, buf: &mut Buffer) {
        if area.height < 2 || area.width == 0 {
            return;
        }
        let title = text_style(
            props.theme.and_then(|t| t.no_notifications_text.as_ref()),
            Style::default()
                .fg(light::PRIMARY_TEXT)
                .add_modifier(Modifier::BOLD),
        );
        let subtitle = text_style(
            props.theme.and_then(|t| t.no_notifications_subtext.as_ref()),
            Style::default().fg(light::SECONDARY_TEXT),
        );
        let y = area.y.saturating_add(area.height.saturating_sub(2) / 2);
        let width = usize::from(area.width);
        for (offset, text, style) in [(0, EMPTY_TITLE, title), (1, EMPTY_SUBTITLE, subtitle)] {
            let lines = crate::util::wrap_to_width(text, width);
            if let Some(line) = lines.first() {
                buf.set_stringn(
                    centered_x(area, crate::util::display_width(line)),
                    y.saturating_add(offset),
                    line,
                    width,
                    style,
                );
            }
        }
    }
}

/// Everything the list needs for one frame.
pub(super) struct ListInput<'a> {
    pub notifications: &'a [Notification],
    pub theme: &'a NotificationCardTheme,
    pub slots: &'a Slots,
    pub avatars: &'a AvatarCache,
    pub selected: usize,
    pub scroll_top: u32,
    pub hide_avatar: bool,
    pub disable_markdown: bool,
    pub now: DateTime<Utc>,
}

/// A card region on screen.
pub(super) struct ListHit {
    pub rect: Rect,
    pub id: NotificationId,
    pub region: CardRegion,
}

pub(super) fn avatar_url(n: &Notification) -> Option<&str> {
    n.message
        .avatar
        .as_ref()
        .and_then(|a| a.avatar_url.as_deref())
        .filter(|url| !url.trim().is_empty())
}

pub(super) fn avatar_status(avatars: &AvatarCache, n: &Notification) -> AvatarStatus {
    avatar_url(n).map_or(AvatarStatus::Fallback, |url| avatars.status(url))
}

/// Map a rectangle in card coordinates to the screen, clipped to `area`.
fn to_screen(rect: Rect, card_top: u32, scroll_top: u32, area: Rect) -> Option<Rect> {
    let y = i64::from(area.y) + i64::from(card_top) - i64::from(scroll_top) + i64::from(rect.y);
    let top = y.max(i64::from(area.y));
    let bottom = (y + i64::from(rect.height)).min(i64::from(area.bottom()));
    if bottom <= top {
        return None;
    }
    let screen = Rect::new(
        rect.x.saturating_add(area.x),
        u16::try_from(top).ok()?,
        rect.width,
        u16::try_from(bottom - top).ok()?,
    );
    let clipped = screen.intersection(area);
    (!clipped.is_empty()).then_some(clipped)
}

/// Draw the visible cards. Returns the list geometry and clickable regions.
pub(super) fn render_list(
    input: &ListInput<'_>,
    area: Rect,
    buf: &mut Buffer,
) -> (ListView, Vec<ListHit>) {
    let card = input.slots.card();
    let width = area.width;
    let props: Vec<CardProps<'_>> = input
        .notifications
        .iter()
        .enumerate()
        .map(|(i, n)| CardProps {
            notification: n,
            theme: input.theme,
            variant: CardVariant::Feed,
            selected: i == input.selected,
            hide_avatar: input.hide_avatar,
            disable_markdown: input.disable_markdown,
            avatar: avatar_status(input.avatars, n),
            now: input.now,
        })
        .collect();

    let extents = stack(props.iter().map(|p| u32::from(card.height(p, width))));
    let scroll_height = extents.last().map_or(0, |e| e.bottom());
    let mut metrics = ScrollMetrics {
        scroll_top: 0,
        client_height: u32::from(area.height),
        scroll_height,
    };
    metrics.scroll_top = input.scroll_top.min(metrics.max_scroll_top());

    let mut hits = Vec::new();
    for (p, extent) in props.iter().zip(&extents) {
        if !intersects(*extent, &metrics) {
            continue;
        }
        let height = u16::try_from(extent.height).unwrap_or(u16::MAX);
        let card_area = Rect::new(0, 0, width, height);
        let mut card_buf = Buffer::empty(card_area);
        let regions = card.render(p, card_area, &mut card_buf);

        let view_bottom = metrics.scroll_top.saturating_add(metrics.client_height);
        for content_y in extent.top.max(metrics.scroll_top)..extent.bottom().min(view_bottom) {
            let (Ok(src_y), Ok(offset)) = (
                u16::try_from(content_y - extent.top),
                u16::try_from(content_y - metrics.scroll_top),
            ) else {
                continue;
            };
            let dst_y = area.y.saturating_add(offset);
            for x in 0..width {
                buf[(area.x.saturating_add(x), dst_y)] = card_buf[(x, src_y)].clone();
            }
        }

        for (rect, region) in regions {
            if let Some(rect) = to_screen(rect, extent.top, metrics.scroll_top, area) {
                hits.push(ListHit {
                    rect,
                    id: p.notification.n_id.clone(),
                    region,
                });
            }
        }
    }

    let rows = props
        .iter()
        .zip(extents)
        .map(|(p, extent)| ListRow {
            id: p.notification.n_id.clone(),
            extent,
            seen: p.notification.is_seen(),
            avatar_url: avatar_url(p.notification).map(str::to_string),
        })
        .collect();
    (
        ListView {
            area,
            rows,
            metrics,
        },
        hits,
    )
}

pub(super) fn render_loader(slots: &Slots, props: &LoaderProps<'_>, area: Rect, buf: &mut Buffer) {
    slots.loader().render(props, area, buf);
}

pub(super) fn render_empty(slots: &Slots, props: &EmptyStateProps<'_>, area: Rect, buf: &mut Buffer) {
    slots.empty_state().render(props, area, buf);
}
