//! Render functions for the TUI.
//!
//! Draws the bell row, the feed panel when the popover is open, the card
//! actions menu, toasts, the status bar and the help overlay, in that order.
//! Every clickable region drawn is recorded in `app.hits` for the next
//! pointer event.

use crate::app::{App, Hit, ListView};
use crate::feed::ApiStatus;
use crate::theme::colors::light;
use crate::theme::{color_or, text_style};
use chrono::Utc;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::Style,
    widgets::{Block, Borders, Clear, Paragraph, Widget},
    Frame,
};

use super::card::{menu_size, render_menu};
use super::feed::{render_empty, render_list, render_loader, ListInput};
use super::header::HeaderHit;
use super::slots::{CardRegion, EmptyStateProps, LoaderProps};
use super::{bell, header, help, status, toast};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 30;
pub(super) const MIN_HEIGHT: u16 = 8;

/// Feed panel width cap.
const PANEL_WIDTH: u16 = 56;
/// Feed panel height cap.
const PANEL_HEIGHT: u16 = 30;

/// Main render dispatch function.
pub(super) fn render(f: &mut Frame, app: &mut App) {
    let area = f.area();

    // EDGE-001: Guard against zero-width/height to prevent panics
    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        app.hits.clear();
        app.list_view = None;
        return;
    }

    draw(app, area, f.buffer_mut());
}

/// Draw the whole widget into `buf`.
pub(super) fn draw(app: &mut App, area: Rect, buf: &mut Buffer) {
    let top_row = Rect::new(area.x, area.y, area.width, 1);
    let status_row = Rect::new(area.x, area.bottom().saturating_sub(1), area.width, 1);
    let body = Rect::new(
        area.x,
        area.y.saturating_add(1),
        area.width,
        area.height.saturating_sub(2),
    );

    let anchor = bell::render(
        &app.slots,
        &app.themes.inbox,
        app.popover.is_open(),
        app.feed.meta.badge,
        top_row,
        buf,
    );

    let size = (
        PANEL_WIDTH.min(area.width.saturating_sub(2)),
        PANEL_HEIGHT.min(body.height),
    );
    app.popover.set_layout(anchor, size, body);

    let mut hits = Vec::new();
    let mut list_view = None;
    if let Some(panel) = app.popover.position().filter(|_| app.popover.is_open()) {
        list_view = draw_panel(app, panel, buf, &mut hits);
    }

    if let Some(menu) = &app.card_menu {
        let items = app.menu_items();
        let (w, h) = menu_size(&items);
        let menu_anchor = hits.iter().find_map(|(rect, hit)| match hit {
            Hit::Card {
                id,
                region: CardRegion::Menu,
            } if *id == menu.id => Some(*rect),
            _ => None,
        });
        let rect = menu_rect(menu_anchor, (w, h), app.popover.position(), area);
        let menu_hits = render_menu(&app.themes.card, &items, menu.selected, rect, buf);
        hits.extend(
            menu_hits
                .into_iter()
                .map(|(rect, item)| (rect, Hit::MenuItem(item))),
        );
    }

    hits.extend(toast::render(app, body, buf));
    status::render(app, status_row, buf);
    if app.show_help {
        help::render(app, area, buf);
    }

    app.hits = hits;
    app.list_view = list_view;
}

/// Draw the feed panel. Returns the list layout when a list was drawn.
fn draw_panel(
    app: &App,
    panel: Rect,
    buf: &mut Buffer,
    hits: &mut Vec<(Rect, Hit)>,
) -> Option<ListView> {
    let feed_theme = &app.themes.feed;
    let container = feed_theme.notifications_container.as_ref();
    let background = text_style(
        container.and_then(|c| c.container.as_ref()),
        Style::default().fg(light::PRIMARY_TEXT).bg(light::MAIN),
    );
    let border = Style::default().fg(color_or(
        app.themes
            .card
            .container
            .as_ref()
            .and_then(|c| c.border_color),
        light::BORDER,
    ));

    Clear.render(panel, buf);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .style(background);
    let inner = block.inner(panel);
    block.render(panel, buf);

    let header_height = header::height(&app.feed).min(inner.height);
    let header_area = Rect::new(inner.x, inner.y, inner.width, header_height);
    for (rect, hit) in header::render(
        &app.slots,
        feed_theme,
        &app.feed,
        app.config.show_unread_count_on_tabs,
        header_area,
        buf,
    ) {
        let hit = match hit {
            HeaderHit::Intent(intent) => Hit::Header(intent),
            HeaderHit::Tab(store_id) => Hit::Tab(store_id),
        };
        hits.push((rect, hit));
    }

    let mut list_area = Rect::new(
        inner.x,
        inner.y.saturating_add(header_height),
        inner.width,
        inner.height.saturating_sub(header_height),
    );
    if list_area.is_empty() {
        return None;
    }

    let loader_props = LoaderProps {
        theme: container.and_then(|c| c.loader.as_ref()),
        frame: app.spinner_frame,
    };
    let empty = app.feed.notifications.is_empty();
    match app.feed.api_status {
        ApiStatus::Loading | ApiStatus::Idle if empty => {
            render_loader(&app.slots, &loader_props, list_area, buf);
            return None;
        }
        ApiStatus::Error | ApiStatus::Success if empty => {
            render_empty(
                &app.slots,
                &EmptyStateProps { theme: container },
                list_area,
                buf,
            );
            return None;
        }
        _ => {}
    }

    // Next page spinner under the list
    if app.pager.is_loading() && list_area.height > 1 {
        list_area.height -= 1;
        let loader_row = Rect::new(list_area.x, list_area.bottom(), list_area.width, 1);
        render_loader(&app.slots, &loader_props, loader_row, buf);
    }

    let input = ListInput {
        notifications: &app.feed.notifications,
        theme: &app.themes.card,
        slots: &app.slots,
        avatars: &app.avatars,
        selected: app.selected,
        scroll_top: app.feed_scroll,
        hide_avatar: app.config.hide_avatar,
        disable_markdown: app.config.disable_markdown,
        now: Utc::now(),
    };
    let (view, list_hits) = render_list(&input, list_area, buf);
    hits.extend(list_hits.into_iter().map(|hit| {
        (
            hit.rect,
            Hit::Card {
                id: hit.id,
                region: hit.region,
            },
        )
    }));
    Some(view)
}

/// Place the actions menu under its toggle, right-aligned to it. Falls back
/// to the middle of the panel when the toggle is scrolled out of view.
fn menu_rect(anchor: Option<Rect>, size: (u16, u16), panel: Option<Rect>, screen: Rect) -> Rect {
    let (w, h) = (size.0.min(screen.width), size.1.min(screen.height));
    let (x, y) = match (anchor, panel) {
        (Some(anchor), _) => (
            anchor.right().saturating_sub(w),
            anchor.bottom(),
        ),
        (None, Some(panel)) => (
            panel.x.saturating_add(panel.width.saturating_sub(w) / 2),
            panel.y.saturating_add(panel.height.saturating_sub(h) / 2),
        ),
        (None, None) => (
            screen.x.saturating_add(screen.width.saturating_sub(w) / 2),
            screen.y.saturating_add(screen.height.saturating_sub(h) / 2),
        ),
    };
    let x = x.max(screen.x).min(screen.right().saturating_sub(w));
    let y = y.max(screen.y).min(screen.bottom().saturating_sub(h));
    Rect::new(x, y, w, h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::CardMenu;
    use crate::config::Config;
    use crate::feed::{FeedClient, Fixture, MemoryFeed, Message, Notification, NotificationId};
    use chrono::TimeZone;
    use std::sync::Arc;

    fn notification(id: &str, minutes: i64) -> Notification {
        Notification {
            n_id: NotificationId::from(id),
            message: Message {
                header: Some(format!("Header {}", id)),
                text: "body".to_string(),
                ..Default::default()
            },
            created_on: Utc.timestamp_millis_opt(1_700_000_000_000).unwrap()
                + chrono::Duration::minutes(minutes),
            seen_on: None,
            read_on: None,
            interacted_on: None,
            archived: false,
            is_pinned: false,
            expiry: None,
            is_expiry_visible: false,
        }
    }

    async fn connected_app(notifications: Vec<Notification>) -> App {
        let feed = MemoryFeed::new(Fixture {
            notifications,
            ..Default::default()
        });
        feed.connect().await.unwrap();
        let mut app = App::new(
            Config {
                hide_avatar: true,
                ..Config::default()
            },
            Arc::new(feed.clone()),
        )
        .unwrap();
        app.apply_snapshot(feed.subscribe().borrow().clone());
        app
    }

    fn screen_text(buf: &Buffer) -> String {
        let mut out = String::new();
        for y in 0..buf.area.height {
            for x in 0..buf.area.width {
                out.push_str(buf[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[tokio::test]
    async fn test_closed_inbox_draws_only_bell() {
        let mut app = connected_app(vec![notification("a", 0)]).await;
        let area = Rect::new(0, 0, 80, 24);
        let mut buf = Buffer::empty(area);
        draw(&mut app, area, &mut buf);

        assert!(app.list_view.is_none());
        assert!(!screen_text(&buf).contains("Header a"));
        assert!(app.hits.is_empty());
    }

    #[tokio::test]
    async fn test_open_inbox_draws_cards_and_records_hits() {
        let mut app = connected_app(vec![notification("a", 1), notification("b", 0)]).await;
        let area = Rect::new(0, 0, 80, 24);
        // First frame lays out the popover, then open it
        let mut buf = Buffer::empty(area);
        draw(&mut app, area, &mut buf);
        app.popover.toggle();

        let mut buf = Buffer::empty(area);
        draw(&mut app, area, &mut buf);
        let text = screen_text(&buf);
        assert!(text.contains("Notifications"));
        assert!(text.contains("Header a"));
        assert!(text.contains("Header b"));

        let view = app.list_view.as_ref().unwrap();
        assert_eq!(view.rows.len(), 2);
        assert!(app.hits.iter().any(|(_, hit)| matches!(
            hit,
            Hit::Card { id, region: CardRegion::Body } if id.as_str() == "b"
        )));
        assert!(app
            .hits
            .iter()
            .any(|(_, hit)| matches!(hit, Hit::Header(_))));
    }

    #[tokio::test]
    async fn test_empty_feed_shows_empty_state() {
        let mut app = connected_app(Vec::new()).await;
        let area = Rect::new(0, 0, 80, 24);
        let mut buf = Buffer::empty(area);
        draw(&mut app, area, &mut buf);
        app.popover.toggle();
        let mut buf = Buffer::empty(area);
        draw(&mut app, area, &mut buf);

        assert!(screen_text(&buf).contains(super::super::feed::EMPTY_TITLE));
        assert!(app.list_view.is_none());
    }

    #[tokio::test]
    async fn test_card_menu_hits_on_top() {
        let mut app = connected_app(vec![notification("a", 0)]).await;
        let area = Rect::new(0, 0, 80, 24);
        let mut buf = Buffer::empty(area);
        draw(&mut app, area, &mut buf);
        app.popover.toggle();
        app.card_menu = Some(CardMenu {
            id: NotificationId::from("a"),
            selected: 0,
        });

        let mut buf = Buffer::empty(area);
        draw(&mut app, area, &mut buf);
        let (rect, hit) = app
            .hits
            .iter()
            .rev()
            .find(|(_, h)| matches!(h, Hit::MenuItem(_)))
            .unwrap();
        assert_eq!(app.hit_at(rect.x, rect.y), Some(hit.clone()));
        assert!(screen_text(&buf).contains("Mark as read"));
    }

    #[test]
    fn test_menu_rect_stays_on_screen() {
        let screen = Rect::new(0, 0, 40, 10);
        let rect = menu_rect(Some(Rect::new(38, 9, 1, 1)), (20, 4), None, screen);
        assert_eq!(rect, Rect::new(20, 6, 20, 4));
    }
}
