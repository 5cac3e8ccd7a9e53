use crate::app::App;
use crate::keybindings::Context;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::{Paragraph, Widget},
};
use std::borrow::Cow;

/// Render the status bar
pub(super) fn render(app: &App, area: Rect, buf: &mut Buffer) {
    // EDGE-001: Guard against zero-width/height areas
    if area.width < 1 || area.height < 1 {
        return;
    }

    // Borrow the status message when there is one, static hints otherwise
    let text: Cow<'_, str> = if let Some((msg, _)) = &app.status_message {
        Cow::Borrowed(msg.as_ref())
    } else {
        match app.input_context() {
            Context::Global => Cow::Borrowed("[b]ell [T]heme [?]help [q]uit"),
            Context::Feed => Cow::Borrowed(
                "[j/k]move [Enter]open [r]ead [x]archive [A]ll read [Tab]store [m]enu [Esc]close",
            ),
            Context::CardMenu => Cow::Borrowed("[j/k]move [Enter]select [Esc]back"),
        }
    };

    let style = Style::default().bg(Color::DarkGray).fg(Color::White);
    Paragraph::new(text).style(style).render(area, buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::feed::{Fixture, MemoryFeed};
    use std::sync::Arc;

    fn line(buf: &Buffer) -> String {
        (0..buf.area.width).map(|x| buf[(x, 0)].symbol()).collect()
    }

    #[tokio::test]
    async fn test_status_message_replaces_hints() {
        let feed = MemoryFeed::new(Fixture::default());
        let mut app = App::new(Config::default(), Arc::new(feed)).unwrap();
        let area = Rect::new(0, 0, 60, 1);

        let mut buf = Buffer::empty(area);
        render(&app, area, &mut buf);
        assert!(line(&buf).contains("[b]ell"));

        app.set_status("Theme: Dark");
        let mut buf = Buffer::empty(area);
        render(&app, area, &mut buf);
        assert!(line(&buf).starts_with("Theme: Dark"));
    }
}
