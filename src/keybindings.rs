//! Keybinding registry: maps keys to widget actions, with config overrides.
//!
//! Bindings are looked up per context (bell closed, feed open, card menu
//! open) and fall back to the global context.
use crossterm::event::{KeyCode, KeyModifiers};
use std::collections::HashMap;

// ============================================================================
// Actions and contexts
// ============================================================================

/// All user-facing actions that can be triggered by keybindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    ToggleInbox,
    Back,
    NavDown,
    NavUp,
    PageDown,
    PageUp,
    OpenNotification,
    PrimaryAction,
    SecondaryAction,
    OpenAvatar,
    OpenSubtext,
    ToggleRead,
    Archive,
    MarkAllRead,
    NextStore,
    PrevStore,
    OpenMenu,
    CycleTheme,
    ShowHelp,
}

impl Action {
    /// Description for the help overlay.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Quit => "Quit",
            Self::ToggleInbox => "Open / close the inbox",
            Self::Back => "Close menu or inbox",
            Self::NavDown => "Next notification",
            Self::NavUp => "Previous notification",
            Self::PageDown => "Scroll down a page",
            Self::PageUp => "Scroll up a page",
            Self::OpenNotification => "Open notification",
            Self::PrimaryAction => "Primary action button",
            Self::SecondaryAction => "Secondary action button",
            Self::OpenAvatar => "Open avatar link",
            Self::OpenSubtext => "Open subtext link",
            Self::ToggleRead => "Mark read / unread",
            Self::Archive => "Archive notification",
            Self::MarkAllRead => "Mark all as read",
            Self::NextStore => "Next tab",
            Self::PrevStore => "Previous tab",
            Self::OpenMenu => "Notification actions menu",
            Self::CycleTheme => "Switch light / dark theme",
            Self::ShowHelp => "Show help",
        }
    }

    /// Config name (`[keybindings]` key).
    pub fn name(self) -> &'static str {
        match self {
            Self::Quit => "quit",
            Self::ToggleInbox => "toggle_inbox",
            Self::Back => "back",
            Self::NavDown => "nav_down",
            Self::NavUp => "nav_up",
            Self::PageDown => "page_down",
            Self::PageUp => "page_up",
            Self::OpenNotification => "open_notification",
            Self::PrimaryAction => "primary_action",
            Self::SecondaryAction => "secondary_action",
            Self::OpenAvatar => "open_avatar",
            Self::OpenSubtext => "open_subtext",
            Self::ToggleRead => "toggle_read",
            Self::Archive => "archive",
            Self::MarkAllRead => "mark_all_read",
            Self::NextStore => "next_store",
            Self::PrevStore => "prev_store",
            Self::OpenMenu => "open_menu",
            Self::CycleTheme => "cycle_theme",
            Self::ShowHelp => "show_help",
        }
    }

    const ALL: [Action; 20] = [
        Self::Quit,
        Self::ToggleInbox,
        Self::Back,
        Self::NavDown,
        Self::NavUp,
        Self::PageDown,
        Self::PageUp,
        Self::OpenNotification,
        Self::PrimaryAction,
        Self::SecondaryAction,
        Self::OpenAvatar,
        Self::OpenSubtext,
        Self::ToggleRead,
        Self::Archive,
        Self::MarkAllRead,
        Self::NextStore,
        Self::PrevStore,
        Self::OpenMenu,
        Self::CycleTheme,
        Self::ShowHelp,
    ];

    /// Parse a config name. Accepts `snake_case` or the name without underscores.
    pub fn from_name(name: &str) -> Option<Self> {
        let wanted = name.trim().to_ascii_lowercase().replace('-', "_");
        let squashed = wanted.replace('_', "");
        Self::ALL
            .into_iter()
            .find(|a| a.name() == wanted || a.name().replace('_', "") == squashed)
    }
}

/// Dispatch context: determines which bindings are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    Global,
    Feed,
    CardMenu,
}

impl Context {
    pub fn label(self) -> &'static str {
        match self {
            Self::Global => "Global",
            Self::Feed => "Inbox",
            Self::CardMenu => "Actions menu",
        }
    }
}

// ============================================================================
// Key specification
// ============================================================================

/// A key event: code + modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySpec {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeySpec {
    /// Shift is folded into the character for `Char` keys, so `A` matches
    /// whether or not the terminal reports the modifier.
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        let modifiers = match code {
            KeyCode::Char(_) | KeyCode::BackTab => modifiers - KeyModifiers::SHIFT,
            _ => modifiers,
        };
        Self { code, modifiers }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    pub const fn ch(c: char) -> Self {
        Self::plain(KeyCode::Char(c))
    }

    pub const fn ctrl(c: char) -> Self {
        Self {
            code: KeyCode::Char(c),
            modifiers: KeyModifiers::CONTROL,
        }
    }
}

/// Parse a key string from config.
///
/// Formats: single char (`q`, `?`), named keys (`Enter`, `Esc`, `Tab`,
/// `BackTab`, `Up`, `Down`, `Left`, `Right`, `PageUp`, `PageDown`, `Space`),
/// `Ctrl+<char>`, and `F1`..`F12`.
pub fn parse_key_string(s: &str) -> Option<KeySpec> {
    let s = s.trim();

    if let Some(rest) = s.strip_prefix("Ctrl+").or_else(|| s.strip_prefix("ctrl+")) {
        let mut chars = rest.trim().chars();
        return match (chars.next(), chars.next()) {
            (Some(c), None) => Some(KeySpec::ctrl(c)),
            _ => None,
        };
    }

    let named = match s.to_ascii_lowercase().as_str() {
        "enter" | "return" => Some(KeyCode::Enter),
        "esc" | "escape" => Some(KeyCode::Esc),
        "tab" => Some(KeyCode::Tab),
        "backtab" | "shift+tab" => Some(KeyCode::BackTab),
        "up" => Some(KeyCode::Up),
        "down" => Some(KeyCode::Down),
        "left" => Some(KeyCode::Left),
        "right" => Some(KeyCode::Right),
        "pageup" => Some(KeyCode::PageUp),
        "pagedown" => Some(KeyCode::PageDown),
        "backspace" => Some(KeyCode::Backspace),
        "space" => Some(KeyCode::Char(' ')),
        _ => None,
    };
    if let Some(code) = named {
        return Some(KeySpec::plain(code));
    }

    if let Some(n) = s
        .strip_prefix(['F', 'f'])
        .and_then(|n| n.parse::<u8>().ok())
    {
        return (1..=12).contains(&n).then(|| KeySpec::plain(KeyCode::F(n)));
    }

    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(KeySpec::ch(c)),
        _ => None,
    }
}

/// Format a key for the help overlay.
pub fn format_key(key: &KeySpec) -> String {
    let name = match key.code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::BackTab => "Shift+Tab".to_string(),
        KeyCode::Up => "Up".to_string(),
        KeyCode::Down => "Down".to_string(),
        KeyCode::Left => "Left".to_string(),
        KeyCode::Right => "Right".to_string(),
        KeyCode::PageUp => "PageUp".to_string(),
        KeyCode::PageDown => "PageDown".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        _ => "?".to_string(),
    };
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        format!("Ctrl+{}", name)
    } else {
        name
    }
}

// ============================================================================
// Registry
// ============================================================================

const DEFAULT_BINDINGS: &[(Context, KeySpec, Action)] = &[
    (Context::Global, KeySpec::ch('q'), Action::Quit),
    (Context::Global, KeySpec::ctrl('c'), Action::Quit),
    (Context::Global, KeySpec::ch('b'), Action::ToggleInbox),
    (Context::Global, KeySpec::ch(' '), Action::ToggleInbox),
    (Context::Global, KeySpec::ch('T'), Action::CycleTheme),
    (Context::Global, KeySpec::ch('?'), Action::ShowHelp),
    (Context::Feed, KeySpec::plain(KeyCode::Esc), Action::Back),
    (Context::Feed, KeySpec::ch('j'), Action::NavDown),
    (Context::Feed, KeySpec::plain(KeyCode::Down), Action::NavDown),
    (Context::Feed, KeySpec::ch('k'), Action::NavUp),
    (Context::Feed, KeySpec::plain(KeyCode::Up), Action::NavUp),
    (Context::Feed, KeySpec::ctrl('d'), Action::PageDown),
    (Context::Feed, KeySpec::plain(KeyCode::PageDown), Action::PageDown),
    (Context::Feed, KeySpec::ctrl('u'), Action::PageUp),
    (Context::Feed, KeySpec::plain(KeyCode::PageUp), Action::PageUp),
    (Context::Feed, KeySpec::plain(KeyCode::Enter), Action::OpenNotification),
    (Context::Feed, KeySpec::ch('o'), Action::OpenNotification),
    (Context::Feed, KeySpec::ch('1'), Action::PrimaryAction),
    (Context::Feed, KeySpec::ch('2'), Action::SecondaryAction),
    (Context::Feed, KeySpec::ch('a'), Action::OpenAvatar),
    (Context::Feed, KeySpec::ch('s'), Action::OpenSubtext),
    (Context::Feed, KeySpec::ch('r'), Action::ToggleRead),
    (Context::Feed, KeySpec::ch('x'), Action::Archive),
    (Context::Feed, KeySpec::ch('A'), Action::MarkAllRead),
    (Context::Feed, KeySpec::plain(KeyCode::Tab), Action::NextStore),
    (Context::Feed, KeySpec::ch('l'), Action::NextStore),
    (Context::Feed, KeySpec::plain(KeyCode::BackTab), Action::PrevStore),
    (Context::Feed, KeySpec::ch('h'), Action::PrevStore),
    (Context::Feed, KeySpec::ch('m'), Action::OpenMenu),
    (Context::CardMenu, KeySpec::plain(KeyCode::Esc), Action::Back),
    (Context::CardMenu, KeySpec::ch('m'), Action::Back),
    (Context::CardMenu, KeySpec::ch('j'), Action::NavDown),
    (Context::CardMenu, KeySpec::plain(KeyCode::Down), Action::NavDown),
    (Context::CardMenu, KeySpec::ch('k'), Action::NavUp),
    (Context::CardMenu, KeySpec::plain(KeyCode::Up), Action::NavUp),
    (Context::CardMenu, KeySpec::plain(KeyCode::Enter), Action::OpenNotification),
];

/// Registry of keybindings: defaults plus config overrides.
pub struct KeybindingRegistry {
    lookup: HashMap<(Context, KeySpec), Action>,
    /// Registration order, for the help overlay.
    bindings: Vec<(Context, KeySpec, Action)>,
}

impl KeybindingRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            lookup: HashMap::new(),
            bindings: Vec::new(),
        };
        for &(context, key, action) in DEFAULT_BINDINGS {
            registry.bind(context, key, action);
        }
        registry
    }

    fn bind(&mut self, context: Context, key: KeySpec, action: Action) {
        let key = KeySpec::new(key.code, key.modifiers);
        if let Some(previous) = self.lookup.insert((context, key), action) {
            self.bindings
                .retain(|(c, k, a)| !(*c == context && *k == key && *a == previous));
        }
        self.bindings.push((context, key, action));
    }

    /// Apply `[keybindings]` overrides.
    ///
    /// The new key replaces every default key of the action, in every context
    /// the action was bound in. Returns warnings for unknown actions and
    /// unparseable keys.
    pub fn apply_overrides(&mut self, overrides: &HashMap<String, String>) -> Vec<String> {
        let mut warnings = Vec::new();
        // Deterministic order for repeated keys
        let mut entries: Vec<_> = overrides.iter().collect();
        entries.sort();

        for (action_name, key_str) in entries {
            let Some(action) = Action::from_name(action_name) else {
                warnings.push(format!("Unknown action '{}', ignoring", action_name));
                continue;
            };
            let Some(key) = parse_key_string(key_str) else {
                warnings.push(format!(
                    "Cannot parse key '{}' for action '{}', ignoring",
                    key_str, action_name
                ));
                continue;
            };

            let mut contexts: Vec<Context> = self
                .bindings
                .iter()
                .filter(|(_, _, a)| *a == action)
                .map(|(c, _, _)| *c)
                .collect();
            contexts.dedup();

            self.lookup.retain(|_, a| *a != action);
            self.bindings.retain(|(_, _, a)| *a != action);
            for context in contexts {
                self.bind(context, key, action);
            }

            tracing::info!(action = %action_name, key = %key_str, "Applied keybinding override");
        }

        warnings
    }

    /// Action for a key in `context`, falling back to the global context.
    pub fn action_for_key(
        &self,
        code: KeyCode,
        modifiers: KeyModifiers,
        context: Context,
    ) -> Option<Action> {
        let key = KeySpec::new(code, modifiers);
        self.lookup
            .get(&(context, key))
            .or_else(|| self.lookup.get(&(Context::Global, key)))
            .copied()
    }

    /// `(context, key, action)` rows for the help overlay, grouped by context.
    pub fn all_bindings(&self) -> Vec<(Context, String, Action)> {
        let mut rows: Vec<_> = self
            .bindings
            .iter()
            .map(|(c, k, a)| (*c, format_key(k), *a))
            .collect();
        rows.sort_by_key(|(c, _, _)| match c {
            Context::Global => 0,
            Context::Feed => 1,
            Context::CardMenu => 2,
        });
        rows
    }
}

impl Default for KeybindingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
