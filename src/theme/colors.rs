//! Base palettes.
//!
//! `light` holds the colors every surface falls back to when its theme leaves
//! a field unset. `dark` feeds the built-in dark tree in [`super::dark`].

pub mod light {
    use ratatui::style::Color;

    pub const MAIN: Color = Color::Rgb(0xff, 0xff, 0xff);
    pub const PRIMARY: Color = Color::Rgb(0x2e, 0x70, 0xe8);
    pub const PRIMARY_TEXT: Color = Color::Rgb(0x06, 0x0b, 0x19);
    pub const SECONDARY_TEXT: Color = Color::Rgb(0x47, 0x55, 0x69);
    pub const BORDER: Color = Color::Rgb(0xdd, 0xe2, 0xe6);
    pub const ERROR: Color = Color::Rgb(0xb4, 0x23, 0x18);
    pub const SUBTEXT: Color = Color::Rgb(0x64, 0x74, 0x8b);

    pub const UNREAD_BACKGROUND: Color = Color::Rgb(0xed, 0xf3, 0xff);
    pub const HOVER_BACKGROUND: Color = Color::Rgb(0xdb, 0xe7, 0xff);
    pub const MUTED_BACKGROUND: Color = Color::Rgb(0xf1, 0xf3, 0xf6);
    pub const EXPIRING_BACKGROUND: Color = Color::Rgb(0xfb, 0xe8, 0xe7);
    pub const PRIMARY_BUTTON_HOVER: Color = Color::Rgb(0x26, 0x5c, 0xbf);
    pub const OUTLINE_BUTTON_HOVER: Color = Color::Rgb(0xf7, 0xf7, 0xf9);
    pub const QUOTE_BORDER: Color = Color::Rgb(0xc1, 0xc8, 0xd1);
}

pub mod dark {
    use ratatui::style::Color;

    pub const MAIN: Color = Color::Rgb(0x1d, 0x26, 0x35);
    pub const PRIMARY: Color = Color::Rgb(0x2e, 0x70, 0xe8);
    pub const PRIMARY_TEXT: Color = Color::Rgb(0xef, 0xef, 0xef);
    pub const SECONDARY_TEXT: Color = Color::Rgb(0xcb, 0xd5, 0xe1);
    pub const BORDER: Color = Color::Rgb(0x3a, 0x4a, 0x61);
    pub const ERROR: Color = Color::Rgb(0xf9, 0x70, 0x66);
    pub const SUBTEXT: Color = Color::Rgb(0x94, 0xa3, 0xb8);

    pub const UNREAD_BACKGROUND: Color = Color::Rgb(0x23, 0x31, 0x49);
    pub const HOVER_BACKGROUND: Color = Color::Rgb(0x2d, 0x3b, 0x55);
    pub const MUTED_BACKGROUND: Color = Color::Rgb(0x2a, 0x35, 0x47);
    pub const EXPIRING_BACKGROUND: Color = Color::Rgb(0x4a, 0x26, 0x2a);
    pub const OUTLINE_BUTTON_HOVER: Color = Color::Rgb(0x32, 0x3f, 0x55);
    pub const QUOTE_BORDER: Color = Color::Rgb(0x55, 0x65, 0x7d);
}
