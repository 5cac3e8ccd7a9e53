//! Help overlay: scrollable keybinding table.
//!
//! Renders a centered overlay showing all keybindings grouped by context,
//! including any user overrides from config.

use crate::app::App;
use crate::keybindings::Context;
use crate::theme::colors::light;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Row, Table, Widget},
};

/// Context display order for the help screen.
const CONTEXT_ORDER: [Context; 3] = [Context::Global, Context::Feed, Context::CardMenu];

/// Render the help overlay on top of everything else.
pub(super) fn render(app: &App, area: Rect, buf: &mut Buffer) {
    // Leave a margin around the overlay
    let overlay = centered_rect(80, 80, area);
    if overlay.width < 20 || overlay.height < 6 {
        return;
    }

    Clear.render(overlay, buf);

    let bindings = app.keybindings.all_bindings();
    let heading = Style::default()
        .fg(light::PRIMARY)
        .add_modifier(Modifier::BOLD);

    // Build rows grouped by context
    let mut rows: Vec<Row> = Vec::new();
    for ctx in CONTEXT_ORDER {
        let ctx_bindings: Vec<_> = bindings.iter().filter(|(c, _, _)| *c == ctx).collect();
        if ctx_bindings.is_empty() {
            continue;
        }

        rows.push(Row::new(vec![
            Line::from(Span::styled(format!("-- {} --", ctx.label()), heading)),
            Line::from(""),
        ]));
        for (_, key_str, action) in ctx_bindings {
            rows.push(Row::new(vec![
                format!("  {}", key_str),
                action.describe().to_string(),
            ]));
        }
        rows.push(Row::new(vec![String::new(), String::new()]));
    }
    // Drop the trailing separator
    rows.pop();

    let total_rows = rows.len();
    let visible_height = usize::from(overlay.height.saturating_sub(3)); // -2 border -1 header
    let max_scroll = total_rows.saturating_sub(visible_height);
    let scroll = app.help_scroll_offset.min(max_scroll);
    let visible_rows: Vec<Row> = rows.into_iter().skip(scroll).take(visible_height).collect();

    let title = if max_scroll > 0 {
        format!(
            " Help ({}/{}) ",
            scroll.saturating_add(1),
            max_scroll.saturating_add(1)
        )
    } else {
        " Help (? to close) ".to_string()
    };

    let widths = [Constraint::Length(16), Constraint::Min(20)];
    Table::new(visible_rows, widths)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(light::BORDER))
                .title(title),
        )
        .header(
            Row::new(vec!["Key", "Action"])
                .style(
                    Style::default()
                        .add_modifier(Modifier::BOLD)
                        .add_modifier(Modifier::UNDERLINED),
                )
                .bottom_margin(1),
        )
        .style(Style::default().fg(light::PRIMARY_TEXT).bg(light::MAIN))
        .render(overlay, buf);

    if max_scroll > 0 && scroll < max_scroll {
        let hint = Line::from(Span::styled(
            " j/k to scroll, ? or Esc to close ",
            Style::default().fg(light::SECONDARY_TEXT),
        ));
        let hint_area = Rect {
            x: overlay.x.saturating_add(1),
            y: overlay.bottom().saturating_sub(1),
            width: overlay.width.saturating_sub(2),
            height: 1,
        };
        Paragraph::new(hint).render(hint_area, buf);
    }
}

/// Create a centered rectangle with the given percentage of the parent area.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let width = u16::try_from(u32::from(area.width) * u32::from(percent_x) / 100).unwrap_or(area.width);
    let height =
        u16::try_from(u32::from(area.height) * u32::from(percent_y) / 100).unwrap_or(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}
