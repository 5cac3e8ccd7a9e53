//! Configuration file parser for ~/.config/belltower/config.toml.
//!
//! The config file is optional: a missing or empty file yields
//! `Config::default()`. Unknown top-level keys are accepted and logged as
//! warnings. The `[theme]` table is decoded leniently, so a malformed theme
//! field is dropped with a warning instead of failing the whole file.
use crate::popover::Placement;
use crate::theme::{InboxTheme, ThemeType};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// SEC: Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration
// ============================================================================

/// Widget configuration. Every key is optional.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base theme tree: "light" or "dark".
    pub theme_type: ThemeType,

    /// Fetch further pages on scroll.
    pub pagination: bool,

    pub hide_avatar: bool,

    pub show_unread_count_on_tabs: bool,

    /// Render card bodies as plain text.
    pub disable_markdown: bool,

    /// Side of the bell the panel opens on.
    pub popover_position: Placement,

    /// Page size of the fixture feed.
    pub page_size: u32,

    pub seen_debounce_ms: u64,

    pub scroll_throttle_ms: u64,

    pub toast_duration_secs: u64,

    /// Keybinding overrides. Keys are action names, values are key strings.
    pub keybindings: HashMap<String, String>,

    /// Theme overrides layered onto the base tree.
    #[serde(deserialize_with = "crate::theme::merge::lenient")]
    pub theme: Option<InboxTheme>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme_type: ThemeType::Light,
            pagination: true,
            hide_avatar: false,
            show_unread_count_on_tabs: true,
            disable_markdown: false,
            popover_position: Placement::Bottom,
            page_size: crate::feed::DEFAULT_PAGE_SIZE,
            seen_debounce_ms: 1000,
            scroll_throttle_ms: 500,
            toast_duration_secs: 5,
            keybindings: HashMap::new(),
            theme: None,
        }
    }
}

impl Config {
    /// SEC: Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 12] = [
        "theme_type",
        "pagination",
        "hide_avatar",
        "show_unread_count_on_tabs",
        "disable_markdown",
        "popover_position",
        "page_size",
        "seen_debounce_ms",
        "scroll_throttle_ms",
        "toast_duration_secs",
        "keybindings",
        "theme",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing or empty file → `Ok(Config::default())`
    /// - Invalid TOML or wrong-typed scalar → `Err(ConfigError::Parse)`
    /// - Oversized file → `Err(ConfigError::TooLarge)`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(content)?;
        tracing::info!(
            theme_type = config.theme_type.name(),
            themed = config.theme.is_some(),
            "Loaded configuration"
        );
        Ok(config)
    }

    pub fn seen_debounce(&self) -> Duration {
        Duration::from_millis(self.seen_debounce_ms)
    }

    pub fn scroll_throttle(&self) -> Duration {
        Duration::from_millis(self.scroll_throttle_ms)
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_secs(self.toast_duration_secs)
    }
}

// ============================================================================
// Tests
// ============================================================================
