//! Notification card: the default card renderer and the actions menu.

use crate::app::MenuItem;
use crate::avatar::AvatarStatus;
use crate::theme::colors::light;
use crate::theme::{color_or, text_style, NotificationCardTheme};
use crate::util::{
    display_width, expiry_label, short_age, single_line, strip_control_chars, truncate_to_width,
};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Widget};

use super::markdown::{render_body, BodyStyles};
use super::slots::{CardProps, CardRegion, CardSlot, CardVariant};

const UNSEEN_DOT: &str = "●";
const AVATAR_IMAGE: &str = "▣";
const AVATAR_FALLBACK: &str = "◉";
const PINNED_ICON: &str = "📌";
const MENU_ICON: &str = "⋮";

/// Only the primary and secondary actions are drawn.
pub(super) const MAX_ACTIONS: usize = 2;

/// Toasts keep the body short.
const TOAST_BODY_LINES: usize = 3;

fn width_of(s: &str) -> u16 {
    u16::try_from(display_width(s)).unwrap_or(u16::MAX)
}

/// Card content laid out relative to the card's top left corner.
#[derive(Default)]
struct Composed {
    /// Lines by row, each starting at a column.
    lines: Vec<(u16, u16, Line<'static>)>,
    regions: Vec<(Rect, CardRegion)>,
    rows: u16,
}

impl Composed {
    fn push_line(&mut self, x: u16, line: Line<'static>) -> u16 {
        let row = self.rows;
        self.lines.push((x, row, line));
        self.rows = self.rows.saturating_add(1);
        row
    }

    fn put(&mut self, x: u16, row: u16, span: Span<'static>) {
        self.lines.push((x, row, Line::from(span)));
    }
}

fn container_background(props: &CardProps<'_>) -> ratatui::style::Color {
    let container = props.theme.container.as_ref();
    if props.selected {
        color_or(
            container.and_then(|c| c.hover_background_color),
            light::HOVER_BACKGROUND,
        )
    } else if props.notification.is_read() || props.variant == CardVariant::Toast {
        color_or(
            container.and_then(|c| c.read_background_color),
            light::MAIN,
        )
    } else {
        color_or(
            container.and_then(|c| c.unread_background_color),
            light::UNREAD_BACKGROUND,
        )
    }
}

fn compose(props: &CardProps<'_>, width: u16) -> Composed {
    let theme = props.theme;
    let n = props.notification;
    let message = &n.message;
    let feed = props.variant == CardVariant::Feed;
    let mut out = Composed::default();

    let gutter: u16 = if feed { 2 } else { 1 };
    let content_x = if props.hide_avatar {
        gutter
    } else {
        gutter.saturating_add(2)
    };
    let content_width = width.saturating_sub(content_x).saturating_sub(1).max(1);

    if feed && n.is_pinned {
        let icon = theme
            .pinned_icon
            .as_ref()
            .map_or(PINNED_ICON, |i| i.symbol_or(PINNED_ICON))
            .to_string();
        let icon_style = Style::default().fg(color_or(
            theme.pinned_icon.as_ref().and_then(|i| i.color),
            light::SECONDARY_TEXT,
        ));
        let label_style = text_style(
            theme.pinned_text.as_ref(),
            Style::default().fg(light::SECONDARY_TEXT),
        );
        out.push_line(
            content_x,
            Line::from(vec![
                Span::styled(icon, icon_style),
                Span::styled(" Pinned", label_style),
            ]),
        );
    }

    // Header row, with age and menu on the right for feed cards
    let header = message.header.as_deref().map(single_line);
    let header_row = if feed || header.is_some() {
        let mut room = content_width;
        let mut right = Vec::new();
        if feed {
            let age = short_age(n.created_on, props.now);
            let menu_x = width.saturating_sub(2);
            let age_x = menu_x.saturating_sub(width_of(&age).saturating_add(1));
            room = age_x.saturating_sub(content_x).saturating_sub(1);
            let age_style = text_style(
                theme.created_on_text.as_ref(),
                Style::default().fg(light::SUBTEXT),
            );
            let menu_style = Style::default().fg(color_or(
                theme.actions_menu_icon.as_ref().and_then(|i| i.color),
                light::SECONDARY_TEXT,
            ));
            let menu_icon = theme
                .actions_menu_icon
                .as_ref()
                .map_or(MENU_ICON, |i| i.symbol_or(MENU_ICON))
                .to_string();
            right.push((age_x, Span::styled(age, age_style)));
            right.push((menu_x, Span::styled(menu_icon, menu_style)));
        }
        let header_style = text_style(
            theme.header_text.as_ref(),
            Style::default()
                .fg(light::PRIMARY_TEXT)
                .add_modifier(Modifier::BOLD),
        );
        let text = header
            .as_deref()
            .map(|h| truncate_to_width(h, usize::from(room)).into_owned())
            .unwrap_or_default();
        let row = out.push_line(content_x, Line::from(Span::styled(text, header_style)));
        for (x, span) in right {
            out.put(x, row, span);
        }
        if feed {
            out.regions.push((
                Rect::new(width.saturating_sub(2), row, 1, 1),
                CardRegion::Menu,
            ));
        }
        Some(row)
    } else {
        None
    };
    let first_row = header_row.unwrap_or(out.rows);

    if feed && !n.is_seen() {
        let dot_style = Style::default().fg(color_or(
            theme.unseen_dot.as_ref().and_then(|d| d.color),
            light::PRIMARY,
        ));
        let dot = theme
            .unseen_dot
            .as_ref()
            .map_or(UNSEEN_DOT, |d| d.symbol_or(UNSEEN_DOT))
            .to_string();
        out.put(0, first_row, Span::styled(dot, dot_style));
    }

    if !props.hide_avatar {
        let avatar_theme = theme.avatar.as_ref();
        let (glyph, color) = match props.avatar {
            AvatarStatus::Image => (AVATAR_IMAGE, light::PRIMARY),
            AvatarStatus::Pending | AvatarStatus::Fallback => {
                (AVATAR_FALLBACK, light::SECONDARY_TEXT)
            }
        };
        let glyph = avatar_theme.map_or(glyph, |a| a.symbol_or(glyph)).to_string();
        let style = Style::default().fg(color_or(avatar_theme.and_then(|a| a.color), color));
        out.put(gutter, first_row, Span::styled(glyph, style));
        out.regions
            .push((Rect::new(gutter, first_row, 1, 1), CardRegion::Avatar));
    }

    // Body
    let styles = BodyStyles::from_theme(theme.body_text.as_ref(), Style::default());
    let body = render_body(
        &strip_control_chars(&message.text),
        content_width,
        &styles,
        props.disable_markdown,
    );
    let limit = if feed {
        body.lines.len()
    } else {
        TOAST_BODY_LINES
    };
    let body_top = out.rows;
    for line in body.lines.into_iter().take(limit) {
        out.push_line(content_x, line);
    }
    for link in body.links {
        if usize::from(link.row) >= limit {
            continue;
        }
        out.regions.push((
            Rect::new(
                content_x.saturating_add(link.col),
                body_top.saturating_add(link.row),
                link.width,
                1,
            ),
            CardRegion::Link(link.url),
        ));
    }

    if !feed {
        return out;
    }

    if let Some(text) = message.subtext.as_ref().and_then(|s| s.text.as_deref()) {
        let text = truncate_to_width(&single_line(text), usize::from(content_width)).into_owned();
        let w = width_of(&text);
        let style = text_style(theme.subtext.as_ref(), Style::default().fg(light::SUBTEXT));
        let row = out.push_line(content_x, Line::from(Span::styled(text, style)));
        out.regions
            .push((Rect::new(content_x, row, w, 1), CardRegion::Subtext));
    }

    if let Some(expiry) = n.visible_expiry() {
        let label = expiry_label(expiry, props.now);
        let t = theme.expires_text.as_ref();
        let style = if label.expiring {
            Style::default()
                .fg(color_or(t.and_then(|t| t.expiring_color), light::ERROR))
                .bg(color_or(
                    t.and_then(|t| t.expiring_background_color),
                    light::EXPIRING_BACKGROUND,
                ))
        } else {
            Style::default()
                .fg(color_or(t.and_then(|t| t.color), light::SECONDARY_TEXT))
                .bg(color_or(
                    t.and_then(|t| t.background_color),
                    light::MUTED_BACKGROUND,
                ))
        };
        out.push_line(
            content_x,
            Line::from(Span::styled(format!(" {} ", label.text), style)),
        );
    }

    if !message.actions.is_empty() {
        let row = out.rows;
        let mut spans = Vec::new();
        let mut x = content_x;
        for (i, action) in message.actions.iter().take(MAX_ACTIONS).enumerate() {
            let button = theme.action(i);
            let container = button.and_then(|b| b.container.as_ref());
            let name = single_line(&action.name);
            let start = x;
            if i == 0 {
                let style = text_style(
                    button.and_then(|b| b.text.as_ref()),
                    Style::default()
                        .fg(light::MAIN)
                        .bg(color_or(
                            container.and_then(|c| c.background_color),
                            light::PRIMARY,
                        ))
                        .add_modifier(Modifier::BOLD),
                );
                let label = format!(" {} ", name);
                x = x.saturating_add(width_of(&label));
                spans.push(Span::styled(label, style));
            } else {
                let mut base = Style::default().fg(light::PRIMARY_TEXT);
                if let Some(bg) = container.and_then(|c| c.background_color) {
                    base = base.bg(bg.0);
                }
                let text = text_style(button.and_then(|b| b.text.as_ref()), base);
                let edge = Style::default().fg(color_or(
                    container.and_then(|c| c.border_color),
                    light::BORDER,
                ));
                let label = format!(" {} ", name);
                x = x.saturating_add(width_of(&label)).saturating_add(2);
                spans.push(Span::styled("[", edge));
                spans.push(Span::styled(label, text));
                spans.push(Span::styled("]", edge));
            }
            out.regions.push((
                Rect::new(start, row, x.saturating_sub(start), 1),
                CardRegion::Action(i),
            ));
            spans.push(Span::raw(" "));
            x = x.saturating_add(1);
        }
        out.push_line(content_x, Line::from(spans));
    }

    out
}

/// Built-in card renderer.
pub struct DefaultCard;

impl CardSlot for DefaultCard {
    fn height(&self, props: &CardProps<'_>, width: u16) -> u16 {
        let rows = compose(props, width).rows.max(1);
        match props.variant {
            // Separator under feed cards
            CardVariant::Feed => rows.saturating_add(1),
            CardVariant::Toast => rows,
        }
    }

    fn render(
        &self,
        props: &CardProps<'_>,
        area: Rect,
        buf: &mut Buffer,
    ) -> Vec<(Rect, CardRegion)> {
        let composed = compose(props, area.width);
        buf.set_style(area, Style::default().bg(container_background(props)));

        for (x, row, line) in &composed.lines {
            if *row >= area.height || *x >= area.width {
                continue;
            }
            buf.set_line(
                area.x.saturating_add(*x),
                area.y.saturating_add(*row),
                line,
                area.width.saturating_sub(*x),
            );
        }

        let mut content = area;
        if props.variant == CardVariant::Feed && area.height > 0 {
            let y = area.bottom().saturating_sub(1);
            let border = Style::default().fg(color_or(
                props.theme.container.as_ref().and_then(|c| c.border_color),
                light::BORDER,
            ));
            buf.set_stringn(
                area.x,
                y,
                "─".repeat(usize::from(area.width)),
                usize::from(area.width),
                border,
            );
            content.height = content.height.saturating_sub(1);
        }

        let mut regions = vec![(content, CardRegion::Body)];
        regions.extend(composed.regions.into_iter().map(|(rect, region)| {
            let rect = Rect::new(
                rect.x.saturating_add(area.x),
                rect.y.saturating_add(area.y),
                rect.width,
                rect.height,
            );
            (rect.intersection(content), region)
        }));
        regions
    }
}

// ============================================================================
// Actions menu
// ============================================================================

const MENU_WIDTH: u16 = 20;

/// Size of the actions menu box.
pub(super) fn menu_size(items: &[MenuItem]) -> (u16, u16) {
    let rows = u16::try_from(items.len()).unwrap_or(u16::MAX);
    (MENU_WIDTH, rows.saturating_add(2))
}

/// Draw the actions menu in `area`. Returns the item rows.
pub(super) fn render_menu(
    theme: &NotificationCardTheme,
    items: &[MenuItem],
    selected: usize,
    area: Rect,
    buf: &mut Buffer,
) -> Vec<(Rect, MenuItem)> {
    let base = text_style(
        theme.actions_menu.as_ref(),
        Style::default().fg(light::PRIMARY_TEXT).bg(light::MAIN),
    );
    let item_theme = theme.actions_menu_item.as_ref();
    let hover = color_or(
        item_theme.and_then(|t| t.hover_background_color),
        light::HOVER_BACKGROUND,
    );
    let item_bg = item_theme.and_then(|t| t.background_color);
    let icon_theme = theme.actions_menu_item_icon.as_ref();
    let icon_style = Style::default().fg(color_or(
        icon_theme.and_then(|i| i.color),
        light::SECONDARY_TEXT,
    ));
    let text = text_style(theme.actions_menu_item_text.as_ref(), Style::default());

    Clear.render(area, buf);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(light::BORDER))
        .style(base);
    let inner = block.inner(area);
    block.render(area, buf);

    let mut hits = Vec::new();
    for (i, item) in items.iter().enumerate() {
        let y = inner.y.saturating_add(u16::try_from(i).unwrap_or(u16::MAX));
        if y >= inner.bottom() {
            break;
        }
        let row = Rect::new(inner.x, y, inner.width, 1);
        let bg = if i == selected { Some(hover) } else { item_bg.map(|c| c.0) };
        if let Some(bg) = bg {
            buf.set_style(row, Style::default().bg(bg));
        }
        let icon = icon_theme.map_or(item.icon(), |t| t.symbol_or(item.icon()));
        let line = Line::from(vec![
            Span::styled(format!(" {} ", icon), icon_style),
            Span::styled(item.label(), text),
        ]);
        buf.set_line(row.x, row.y, &line, row.width);
        hits.push((row, *item));
    }
    hits
}
