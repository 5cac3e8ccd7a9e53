//! Markdown rendering for notification bodies.
//!
//! Bodies are parsed with pulldown-cmark (GFM tables and strikethrough on),
//! laid out into logical lines, then wrapped to the card width. Links keep
//! their on-screen cells so a click can be resolved to the link URL.
//! Raw `<script>` and `<link>` html is dropped; other tags are stripped and
//! their text kept.

use crate::theme::colors::light;
use crate::theme::{color_or, BodyTextTheme};
use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Styles for the parts of a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyStyles {
    pub text: Style,
    pub link: Style,
    pub code: Style,
    pub quote: Style,
    pub table_border: Style,
}

impl BodyStyles {
    /// Resolve body styles on top of the card background style.
    pub fn from_theme(theme: Option<&BodyTextTheme>, base: Style) -> Self {
        let mut text = base.fg(color_or(theme.and_then(|t| t.color), light::SECONDARY_TEXT));
        if let Some(bg) = theme.and_then(|t| t.background_color) {
            text = text.bg(bg.0);
        }
        let link = text.fg(color_or(theme.and_then(|t| t.link_color), light::PRIMARY));
        let code = text.fg(color_or(theme.and_then(|t| t.code_color), light::PRIMARY_TEXT));
        let quote = text.fg(color_or(
            theme.and_then(|t| t.blockquote_color),
            light::QUOTE_BORDER,
        ));
        let table_border = text.fg(color_or(
            theme.and_then(|t| t.table_border_color),
            light::QUOTE_BORDER,
        ));
        Self {
            text,
            link,
            code,
            quote,
            table_border,
        }
    }
}

/// Cells covered by one wrapped fragment of a link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkHit {
    pub row: u16,
    pub col: u16,
    pub width: u16,
    pub url: String,
}

#[derive(Debug, Default)]
pub struct RenderedBody {
    pub lines: Vec<Line<'static>>,
    pub links: Vec<LinkHit>,
}

impl RenderedBody {
    pub fn height(&self) -> u16 {
        u16::try_from(self.lines.len()).unwrap_or(u16::MAX)
    }
}

/// `\` + newline becomes a hard break carrying a non-breaking space; every
/// other newline becomes a hard break.
pub fn normalize_line_breaks(body: &str) -> String {
    body.split("\\\n")
        .map(|part| part.replace('\n', "  \n"))
        .collect::<Vec<_>>()
        .join("\u{a0}  \n")
}

/// Render a body at `width` columns.
pub fn render_body(
    body: &str,
    width: u16,
    styles: &BodyStyles,
    disable_markdown: bool,
) -> RenderedBody {
    let (blocks, urls) = if disable_markdown {
        (plain_blocks(body, styles), Vec::new())
    } else {
        let mut builder = Builder::new(styles);
        builder.run(&normalize_line_breaks(body));
        (builder.blocks, builder.urls)
    };
    layout(&blocks, &urls, usize::from(width.max(1)))
}

// ============================================================================
// Logical lines
// ============================================================================

#[derive(Debug, Clone)]
struct Piece {
    text: String,
    style: Style,
    link: Option<usize>,
}

impl Piece {
    fn new(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
            link: None,
        }
    }
}

/// One logical line before wrapping.
#[derive(Debug, Clone, Default)]
struct Block {
    /// Drawn before the first wrapped row.
    prefix: Vec<Piece>,
    /// Drawn before every following row.
    hanging: Vec<Piece>,
    pieces: Vec<Piece>,
    /// Break anywhere instead of at word boundaries.
    hard_wrap: bool,
}

fn plain_blocks(body: &str, styles: &BodyStyles) -> Vec<Block> {
    body.lines()
        .map(|line| Block {
            pieces: vec![Piece::new(line, styles.text)],
            ..Default::default()
        })
        .collect()
}

struct ListLevel {
    next_number: Option<u64>,
    marker_width: usize,
}

struct Builder<'s> {
    styles: &'s BodyStyles,
    blocks: Vec<Block>,
    urls: Vec<String>,
    current: Vec<Piece>,
    strong: usize,
    emphasis: usize,
    strike: usize,
    heading: bool,
    code_block: bool,
    link: Option<usize>,
    /// Inside an image; its alt text is not repeated after the placeholder.
    image: bool,
    quote_depth: usize,
    lists: Vec<ListLevel>,
    /// Marker for the first line of the current list item.
    item_marker: Option<String>,
    table: Option<Vec<Vec<Vec<Piece>>>>,
    skipping_html: bool,
}

impl<'s> Builder<'s> {
    fn new(styles: &'s BodyStyles) -> Self {
        Self {
            styles,
            blocks: Vec::new(),
            urls: Vec::new(),
            current: Vec::new(),
            strong: 0,
            emphasis: 0,
            strike: 0,
            heading: false,
            code_block: false,
            link: None,
            image: false,
            quote_depth: 0,
            lists: Vec::new(),
            item_marker: None,
            table: None,
            skipping_html: false,
        }
    }

    fn run(&mut self, md: &str) {
        let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
        for event in Parser::new_ext(md, options) {
            self.event(event);
        }
        self.flush();
    }

    fn inline_style(&self) -> Style {
        let mut style = if self.link.is_some() {
            self.styles.link
        } else {
            self.styles.text
        };
        if self.strong > 0 || self.heading {
            style = style.add_modifier(Modifier::BOLD);
        }
        if self.emphasis > 0 {
            style = style.add_modifier(Modifier::ITALIC);
        }
        if self.strike > 0 {
            style = style.add_modifier(Modifier::CROSSED_OUT);
        }
        style
    }

    fn push_text(&mut self, text: &str, style: Style) {
        if text.is_empty() {
            return;
        }
        let target = match self.table.as_mut() {
            Some(rows) => rows
                .last_mut()
                .and_then(|row| row.last_mut())
                .unwrap_or(&mut self.current),
            None => &mut self.current,
        };
        target.push(Piece {
            text: text.to_string(),
            style,
            link: self.link,
        });
    }

    fn indent_width(&self) -> usize {
        let outer = self.lists.len().saturating_sub(1);
        self.lists.iter().take(outer).map(|l| l.marker_width).sum()
    }

    /// Close the current logical line.
    fn flush(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let mut quote = Vec::new();
        for _ in 0..self.quote_depth {
            quote.push(Piece::new("▎ ", self.styles.quote));
        }
        let indent = " ".repeat(self.indent_width());
        let marker = self.item_marker.take();
        let marker_width = self.lists.last().map_or(0, |l| l.marker_width);

        let mut prefix = quote.clone();
        let mut hanging = quote;
        if !indent.is_empty() {
            prefix.push(Piece::new(indent.clone(), self.styles.text));
            hanging.push(Piece::new(indent, self.styles.text));
        }
        if !self.lists.is_empty() {
            let first = marker.unwrap_or_else(|| " ".repeat(marker_width));
            prefix.push(Piece::new(first, self.styles.text));
            hanging.push(Piece::new(" ".repeat(marker_width), self.styles.text));
        }

        self.blocks.push(Block {
            prefix,
            hanging,
            pieces: std::mem::take(&mut self.current),
            hard_wrap: self.code_block,
        });
    }

    fn event(&mut self, event: Event<'_>) {
        if self.skipping_html {
            if let Event::Html(html) | Event::InlineHtml(html) = &event {
                self.html(html);
            }
            return;
        }
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(_) if self.image => {}
            Event::Text(text) => {
                if self.code_block {
                    let mut lines = text.split('\n').peekable();
                    while let Some(line) = lines.next() {
                        self.push_text(line, self.styles.code);
                        if lines.peek().is_some() {
                            self.flush();
                        }
                    }
                } else {
                    let style = self.inline_style();
                    self.push_text(&text, style);
                }
            }
            Event::Code(code) => {
                let style = self.styles.code.add_modifier(Modifier::BOLD);
                self.push_text(&code, style);
            }
            Event::Html(html) | Event::InlineHtml(html) => self.html(&html),
            Event::SoftBreak => {
                let style = self.inline_style();
                self.push_text(" ", style);
            }
            Event::HardBreak => {
                if self.table.is_none() {
                    self.flush();
                }
            }
            Event::Rule => {
                self.flush();
                self.current.push(Piece::new("─".repeat(8), self.styles.quote));
                self.flush();
            }
            Event::TaskListMarker(done) => {
                let style = self.inline_style();
                self.push_text(if done { "[x] " } else { "[ ] " }, style);
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { .. } => {
                self.flush();
                self.heading = true;
            }
            Tag::BlockQuote { .. } => {
                self.flush();
                self.quote_depth += 1;
            }
            Tag::CodeBlock(_) => {
                self.flush();
                self.code_block = true;
            }
            Tag::List(start) => {
                self.flush();
                self.lists.push(ListLevel {
                    next_number: start,
                    marker_width: 2,
                });
            }
            Tag::Item => {
                self.flush();
                if let Some(level) = self.lists.last_mut() {
                    let marker = match level.next_number {
                        Some(n) => {
                            level.next_number = Some(n + 1);
                            format!("{}. ", n)
                        }
                        None => "• ".to_string(),
                    };
                    level.marker_width = marker.width();
                    self.item_marker = Some(marker);
                }
            }
            Tag::Emphasis => self.emphasis += 1,
            Tag::Strong => self.strong += 1,
            Tag::Strikethrough => self.strike += 1,
            Tag::Link { dest_url, .. } => {
                self.urls.push(dest_url.into_string());
                self.link = Some(self.urls.len() - 1);
            }
            Tag::Image { dest_url, .. } => {
                let style = self.styles.link;
                self.push_text(&format!("[image: {}]", dest_url), style);
                self.image = true;
            }
            Tag::Table(_) => {
                self.flush();
                self.table = Some(Vec::new());
            }
            Tag::TableHead | Tag::TableRow => {
                if let Some(rows) = self.table.as_mut() {
                    rows.push(Vec::new());
                }
            }
            Tag::TableCell => {
                if let Some(row) = self.table.as_mut().and_then(|rows| rows.last_mut()) {
                    row.push(Vec::new());
                }
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.flush(),
            TagEnd::Heading { .. } => {
                self.flush();
                self.heading = false;
            }
            TagEnd::BlockQuote { .. } => {
                self.flush();
                self.quote_depth = self.quote_depth.saturating_sub(1);
            }
            TagEnd::CodeBlock => {
                self.flush();
                self.code_block = false;
            }
            TagEnd::List(_) => {
                self.flush();
                self.lists.pop();
            }
            TagEnd::Item => self.flush(),
            TagEnd::Emphasis => self.emphasis = self.emphasis.saturating_sub(1),
            TagEnd::Strong => self.strong = self.strong.saturating_sub(1),
            TagEnd::Strikethrough => self.strike = self.strike.saturating_sub(1),
            TagEnd::Link => self.link = None,
            TagEnd::Image => self.image = false,
            TagEnd::Table => {
                if let Some(rows) = self.table.take() {
                    self.emit_table(rows);
                }
            }
            _ => {}
        }
    }

    /// Strip tags from raw html, dropping `script` and `link` elements.
    fn html(&mut self, html: &str) {
        let mut rest = html;
        let mut text = String::new();
        while !rest.is_empty() {
            if self.skipping_html {
                match find_ci(rest, "</script") {
                    Some(end) => {
                        self.skipping_html = false;
                        rest = rest[end..].split_once('>').map_or("", |(_, r)| r);
                    }
                    None => return,
                }
                continue;
            }
            match rest.find('<') {
                Some(open) => {
                    text.push_str(&rest[..open]);
                    let tag = &rest[open..];
                    let lower = tag.get(..8).unwrap_or(tag).to_ascii_lowercase();
                    if lower.starts_with("<script") {
                        self.skipping_html = true;
                    }
                    rest = tag.split_once('>').map_or("", |(_, r)| r);
                }
                None => {
                    text.push_str(rest);
                    rest = "";
                }
            }
        }
        let text = text.trim_end_matches('\n');
        if !text.trim().is_empty() {
            let style = self.inline_style();
            self.push_text(text, style);
        }
    }

    fn emit_table(&mut self, rows: Vec<Vec<Vec<Piece>>>) {
        let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut widths = vec![0usize; columns];
        for row in &rows {
            for (i, cell) in row.iter().enumerate() {
                let w: usize = cell.iter().map(|p| p.text.width()).sum();
                widths[i] = widths[i].max(w);
            }
        }
        let border = self.styles.table_border;
        let text = self.styles.text;

        for (r, row) in rows.into_iter().enumerate() {
            let mut pieces = vec![Piece::new("│", border)];
            for (i, width) in widths.iter().enumerate() {
                let cell = row.get(i).cloned().unwrap_or_default();
                let used: usize = cell.iter().map(|p| p.text.width()).sum();
                pieces.push(Piece::new(" ", text));
                pieces.extend(cell);
                pieces.push(Piece::new(" ".repeat(width - used + 1), text));
                pieces.push(Piece::new("│", border));
            }
            self.push_table_line(pieces);
            if r == 0 {
                let rule: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
                self.push_table_line(vec![Piece::new(format!("├{}┤", rule.join("┼")), border)]);
            }
        }
    }

    fn push_table_line(&mut self, pieces: Vec<Piece>) {
        self.current = pieces;
        self.flush();
        if let Some(last) = self.blocks.last_mut() {
            last.hard_wrap = true;
        }
    }
}

fn find_ci(haystack: &str, needle: &str) -> Option<usize> {
    haystack.to_ascii_lowercase().find(needle)
}

// ============================================================================
// Wrapping
// ============================================================================

struct Row {
    spans: Vec<Span<'static>>,
    width: usize,
    links: Vec<(usize, usize, usize)>,
}

impl Row {
    fn start(prefix: &[Piece]) -> Self {
        let mut row = Self {
            spans: Vec::new(),
            width: 0,
            links: Vec::new(),
        };
        for piece in prefix {
            row.push(&piece.text, piece.style, None);
        }
        row
    }

    fn push(&mut self, text: &str, style: Style, link: Option<usize>) {
        let width = text.width();
        if let Some(link) = link {
            match self.links.last_mut() {
                Some((l, start, w)) if *l == link && *start + *w == self.width => *w += width,
                _ => self.links.push((link, self.width, width)),
            }
        }
        self.spans.push(Span::styled(text.to_string(), style));
        self.width += width;
    }
}

/// Split pieces into words and runs of spaces, keeping style and link.
fn tokens(pieces: &[Piece], hard: bool) -> Vec<(String, Style, Option<usize>, bool)> {
    let mut out = Vec::new();
    for piece in pieces {
        let mut word = String::new();
        for ch in piece.text.chars() {
            let space = ch == ' ' && !hard;
            if hard {
                out.push((ch.to_string(), piece.style, piece.link, false));
                continue;
            }
            let word_is_space = word.starts_with(' ');
            if !word.is_empty() && space != word_is_space {
                out.push((std::mem::take(&mut word), piece.style, piece.link, word_is_space));
            }
            word.push(ch);
        }
        if !word.is_empty() {
            let is_space = word.starts_with(' ');
            out.push((word, piece.style, piece.link, is_space));
        }
    }
    out
}

fn layout(blocks: &[Block], urls: &[String], width: usize) -> RenderedBody {
    let mut rendered = RenderedBody::default();
    let finish = |row: Row, rendered: &mut RenderedBody| {
        let line_no = u16::try_from(rendered.lines.len()).unwrap_or(u16::MAX);
        for (link, col, w) in row.links {
            if let Some(url) = urls.get(link) {
                rendered.links.push(LinkHit {
                    row: line_no,
                    col: u16::try_from(col).unwrap_or(u16::MAX),
                    width: u16::try_from(w).unwrap_or(u16::MAX),
                    url: url.clone(),
                });
            }
        }
        rendered.lines.push(Line::from(row.spans));
    };

    for block in blocks {
        let mut row = Row::start(&block.prefix);
        let mut has_content = false;
        // Spaces are held back so rows never end in one
        let mut gap: Option<(String, Style, Option<usize>)> = None;

        for (text, style, link, is_space) in tokens(&block.pieces, block.hard_wrap) {
            if is_space {
                if has_content {
                    gap = Some((text, style, link));
                }
                continue;
            }
            let w = text.width();
            let gap_width = gap.as_ref().map_or(0, |(g, _, _)| g.width());
            if has_content && row.width + gap_width + w > width {
                finish(std::mem::replace(&mut row, Row::start(&block.hanging)), &mut rendered);
                has_content = false;
                gap = None;
            } else if let Some((g, s, l)) = gap.take() {
                row.push(&g, s, l);
            }

            if row.width + w > width {
                // Longer than a whole row: break inside the word
                for ch in text.chars() {
                    let cw = ch.width().unwrap_or(0);
                    if has_content && row.width + cw > width {
                        finish(
                            std::mem::replace(&mut row, Row::start(&block.hanging)),
                            &mut rendered,
                        );
                    }
                    row.push(&ch.to_string(), style, link);
                    has_content = true;
                }
            } else {
                row.push(&text, style, link);
                has_content = true;
            }
        }
        finish(row, &mut rendered);
    }
    rendered
}
