//! Toasts for newly delivered notifications, stacked in the bottom right
//! corner with the newest at the bottom.

use crate::app::{App, Hit};
use crate::theme::colors::light;
use crate::theme::color_or;
use chrono::Utc;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Clear, Widget};

use super::feed::avatar_status;
use super::slots::{CardProps, CardVariant};

const TOAST_WIDTH: u16 = 40;

/// Draw the toast stack above `area`'s bottom edge. Returns the clickable
/// regions of every toast drawn.
pub(super) fn render(app: &App, area: Rect, buf: &mut Buffer) -> Vec<(Rect, Hit)> {
    let mut hits = Vec::new();
    let width = TOAST_WIDTH.min(area.width.saturating_sub(2));
    if width < 10 || area.height < 3 {
        return hits;
    }
    let card = app.slots.card();
    let theme = &app.themes.toast;
    let border = Style::default().fg(color_or(
        theme.container.as_ref().and_then(|c| c.border_color),
        light::BORDER,
    ));
    let now = Utc::now();
    let x = area.right().saturating_sub(width.saturating_add(1));
    let mut bottom = area.bottom();

    for toast in app.toasts.iter().rev() {
        let props = CardProps {
            notification: &toast.notification,
            theme,
            variant: CardVariant::Toast,
            selected: false,
            hide_avatar: app.config.hide_avatar,
            disable_markdown: app.config.disable_markdown,
            avatar: avatar_status(&app.avatars, &toast.notification),
            now,
        };
        let inner_width = width.saturating_sub(2);
        let height = card.height(&props, inner_width).saturating_add(2);
        if bottom < area.y.saturating_add(height) {
            break;
        }
        let rect = Rect::new(x, bottom.saturating_sub(height), width, height);
        bottom = rect.y;

        Clear.render(rect, buf);
        let block = Block::default().borders(Borders::ALL).border_style(border);
        let inner = block.inner(rect);
        block.render(rect, buf);
        for (region_rect, region) in card.render(&props, inner, buf) {
            if region_rect.is_empty() {
                continue;
            }
            hits.push((
                region_rect,
                Hit::Toast {
                    id: toast.notification.n_id.clone(),
                    region,
                },
            ));
        }
    }
    hits
}
