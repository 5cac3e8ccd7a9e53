//! Feed panel header: title, header right area and store tabs.

use crate::feed::FeedData;
use crate::theme::colors::light;
use crate::theme::{color_or, text_style, FeedTheme, TabsTheme};
use crate::util::{display_width, truncate_to_width};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};

use super::slots::{
    HeaderIntent, HeaderRightProps, HeaderRightSlot, Slots, TabBadgeProps, TabBadgeSlot,
};

const TITLE: &str = "Notifications";
const MARK_ALL_READ: &str = "Mark all as read";

/// Tab counts above this render as "99+".
const TAB_COUNT_MAX: u32 = 99;

fn width_of(s: &str) -> u16 {
    u16::try_from(display_width(s)).unwrap_or(u16::MAX)
}

pub struct DefaultHeaderRight;

impl HeaderRightSlot for DefaultHeaderRight {
    fn width(&self, _props: &HeaderRightProps<'_>) -> u16 {
        width_of(MARK_ALL_READ)
    }

    fn render(
        &self,
        props: &HeaderRightProps<'_>,
        area: Rect,
        buf: &mut Buffer,
    ) -> Vec<(Rect, HeaderIntent)> {
        let style = text_style(
            props.theme.and_then(|h| h.mark_all_read_text.as_ref()),
            Style::default().fg(light::PRIMARY),
        );
        let (end, _) = buf.set_stringn(
            area.x,
            area.y,
            MARK_ALL_READ,
            usize::from(area.width),
            style,
        );
        vec![(
            Rect::new(area.x, area.y, end.saturating_sub(area.x), 1),
            HeaderIntent::MarkAllRead,
        )]
    }
}

fn tab_count_label(count: u32) -> String {
    if count > TAB_COUNT_MAX {
        format!("{}+", TAB_COUNT_MAX)
    } else {
        count.to_string()
    }
}

/// Unread count next to a tab label.
pub struct DefaultTabBadge;

impl TabBadgeSlot for DefaultTabBadge {
    fn width(&self, props: &TabBadgeProps<'_>) -> u16 {
        if props.count == 0 {
            return 0;
        }
        width_of(&tab_count_label(props.count)).saturating_add(2)
    }

    fn render(&self, props: &TabBadgeProps<'_>, area: Rect, buf: &mut Buffer) {
        let tabs = props.theme;
        let mut style = Style::default()
            .fg(color_or(tabs.and_then(|t| t.badge_text), light::MAIN))
            .bg(color_or(tabs.and_then(|t| t.badge_color), light::PRIMARY));
        if props.count > TAB_COUNT_MAX {
            style = style.add_modifier(Modifier::DIM);
        }
        buf.set_stringn(
            area.x,
            area.y,
            format!(" {} ", tab_count_label(props.count)),
            usize::from(area.width),
            style,
        );
    }
}

/// A clickable part of the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderHit {
    Intent(HeaderIntent),
    Tab(String),
}

/// Rows the header needs: title, tabs with underline when there are stores,
/// and a separator.
pub(super) fn height(data: &FeedData) -> u16 {
    if data.stores.is_empty() {
        2
    } else {
        4
    }
}

pub(super) fn render(
    slots: &Slots,
    theme: &FeedTheme,
    data: &FeedData,
    show_unread_count_on_tabs: bool,
    area: Rect,
    buf: &mut Buffer,
) -> Vec<(Rect, HeaderHit)> {
    let mut hits = Vec::new();
    if area.height == 0 || area.width < 4 {
        return hits;
    }
    let header = theme.header.as_ref();
    if let Some(bg) = header
        .and_then(|h| h.container.as_ref())
        .and_then(|c| c.background_color)
    {
        buf.set_style(area, Style::default().bg(bg.0));
    }

    // Title row
    let right = slots.header_right();
    let right_props = HeaderRightProps { theme: header };
    let right_width = right.width(&right_props).min(area.width.saturating_sub(2));
    let title_style = text_style(
        header.and_then(|h| h.header_text.as_ref()),
        Style::default()
            .fg(light::PRIMARY_TEXT)
            .add_modifier(Modifier::BOLD),
    );
    let title_room = area.width.saturating_sub(right_width).saturating_sub(3);
    buf.set_stringn(
        area.x.saturating_add(1),
        area.y,
        truncate_to_width(TITLE, usize::from(title_room)),
        usize::from(title_room),
        title_style,
    );
    let right_area = Rect::new(
        area.right().saturating_sub(right_width.saturating_add(1)),
        area.y,
        right_width,
        1,
    );
    hits.extend(
        right
            .render(&right_props, right_area, buf)
            .into_iter()
            .map(|(rect, intent)| (rect.intersection(right_area), HeaderHit::Intent(intent))),
    );

    let mut y = area.y.saturating_add(1);
    if !data.stores.is_empty() && area.height >= 4 {
        hits.extend(render_tabs(
            slots,
            theme.tabs.as_ref(),
            data,
            show_unread_count_on_tabs,
            Rect::new(area.x, y, area.width, 2),
            buf,
        ));
        y = y.saturating_add(2);
    }

    if y < area.bottom() {
        let border = Style::default().fg(light::BORDER);
        buf.set_stringn(
            area.x,
            y,
            "─".repeat(usize::from(area.width)),
            usize::from(area.width),
            border,
        );
    }
    hits
}

fn render_tabs(
    slots: &Slots,
    tabs: Option<&TabsTheme>,
    data: &FeedData,
    show_counts: bool,
    area: Rect,
    buf: &mut Buffer,
) -> Vec<(Rect, HeaderHit)> {
    let active = data.active_store_index();
    let selected_color = color_or(tabs.and_then(|t| t.color), light::PRIMARY_TEXT);
    let unselected_color = tabs
        .and_then(|t| t.unselected_color.or(t.color))
        .map_or(light::SECONDARY_TEXT, |c| c.0);
    let underline = Style::default().fg(color_or(tabs.and_then(|t| t.bottom_color), light::PRIMARY));
    let badge = slots.tab_badge();

    let mut hits = Vec::new();
    let mut x = area.x.saturating_add(1);
    for (i, store) in data.stores.iter().enumerate() {
        if x >= area.right() {
            break;
        }
        let is_active = active == Some(i);
        let style = if is_active {
            Style::default()
                .fg(selected_color)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(unselected_color)
        };
        let room = area.right().saturating_sub(x);
        let (label_end, _) = buf.set_stringn(x, area.y, store.label(), usize::from(room), style);

        let count = data.meta.store_count(&store.store_id);
        let props = TabBadgeProps { count, theme: tabs };
        let mut end = label_end;
        if show_counts && count > 0 {
            let width = badge
                .width(&props)
                .min(area.right().saturating_sub(end.saturating_add(1)));
            if width > 0 {
                badge.render(
                    &props,
                    Rect::new(end.saturating_add(1), area.y, width, 1),
                    buf,
                );
                end = end.saturating_add(1).saturating_add(width);
            }
        }

        let tab_width = end.saturating_sub(x);
        if is_active && area.height > 1 {
            buf.set_stringn(
                x,
                area.y.saturating_add(1),
                "━".repeat(usize::from(tab_width)),
                usize::from(tab_width),
                underline,
            );
        }
        hits.push((
            Rect::new(x, area.y, tab_width, area.height),
            HeaderHit::Tab(store.store_id.clone()),
        ));
        x = end.saturating_add(3);
    }
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{FeedMeta, Store, StoreQuery};
    use std::collections::BTreeMap;

    fn row_text(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf[(x, y)].symbol())
            .collect::<String>()
    }

    fn store(id: &str, label: &str) -> Store {
        Store {
            store_id: id.to_string(),
            label: Some(label.to_string()),
            query: StoreQuery::default(),
        }
    }

    fn data_with_stores() -> FeedData {
        let mut counts = BTreeMap::new();
        counts.insert("all".to_string(), 3);
        counts.insert("unread".to_string(), 0);
        FeedData {
            stores: vec![store("all", "All"), store("unread", "Unread")],
            active_store: Some("all".to_string()),
            meta: FeedMeta {
                badge: 0,
                stores: counts,
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_tab_count_label_caps() {
        assert_eq!(tab_count_label(7), "7");
        assert_eq!(tab_count_label(99), "99");
        assert_eq!(tab_count_label(100), "99+");
    }

    #[test]
    fn test_header_without_stores() {
        let data = FeedData::default();
        assert_eq!(height(&data), 2);
        let area = Rect::new(0, 0, 40, 2);
        let mut buf = Buffer::empty(area);
        let hits = render(&Slots::default(), &FeedTheme::default(), &data, true, area, &mut buf);
        assert!(row_text(&buf, 0).contains("Notifications"));
        assert!(row_text(&buf, 0).contains("Mark all as read"));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].1, HeaderHit::Intent(HeaderIntent::MarkAllRead));
    }

    #[test]
    fn test_tabs_with_counts() {
        let data = data_with_stores();
        assert_eq!(height(&data), 4);
        let area = Rect::new(0, 0, 40, 4);
        let mut buf = Buffer::empty(area);
        let hits = render(&Slots::default(), &FeedTheme::default(), &data, true, area, &mut buf);
        let tabs = row_text(&buf, 1);
        assert!(tabs.contains("All  3 "));
        // Zero count shows no badge
        assert!(tabs.trim_end().ends_with("Unread"));
        // Underline only under the active tab
        assert!(row_text(&buf, 2).starts_with(" ━━━━━━━"));
        let tab_hits: Vec<_> = hits
            .iter()
            .filter_map(|(_, h)| match h {
                HeaderHit::Tab(id) => Some(id.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(tab_hits, vec!["all", "unread"]);
    }

    #[test]
    fn test_tab_counts_disabled() {
        let data = data_with_stores();
        let area = Rect::new(0, 0, 40, 4);
        let mut buf = Buffer::empty(area);
        render(&Slots::default(), &FeedTheme::default(), &data, false, area, &mut buf);
        assert!(!row_text(&buf, 1).contains('3'));
    }
}
