//! Normalization and validation of notification links.
//!
//! Links come from notification payloads (card url, action buttons, avatar
//! and subtext action urls, markdown bodies). Scheme-less links get an
//! `https://` prefix; site-relative links are left for the embedder's hook.

use thiserror::Error;
use url::Url;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum LinkError {
    #[error("empty link")]
    Empty,
    #[error("invalid link: {0}")]
    Invalid(#[from] url::ParseError),
    /// SEC: only web links are handed to the system opener.
    #[error("unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
}

/// Where a link points once normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    /// Absolute web URL, safe to open in a browser.
    Web(Url),
    /// Path relative to the embedding application (leading `/`).
    Relative(String),
}

/// Prefix `https://` unless the link starts with `http` or `/`.
pub fn format_action_link(link: &str) -> Option<String> {
    let link = link.trim();
    if link.is_empty() {
        return None;
    }
    if link.starts_with("http") || link.starts_with('/') {
        Some(link.to_string())
    } else {
        Some(format!("https://{}", link))
    }
}

/// Normalize and classify a link.
pub fn resolve_link(link: &str) -> Result<LinkTarget, LinkError> {
    let formatted = format_action_link(link).ok_or(LinkError::Empty)?;
    if formatted.starts_with('/') {
        return Ok(LinkTarget::Relative(formatted));
    }
    let url = Url::parse(&formatted)?;
    match url.scheme() {
        "http" | "https" => Ok(LinkTarget::Web(url)),
        scheme => Err(LinkError::UnsupportedScheme(scheme.to_owned())),
    }
}

/// Validate a URL before probing it over the network.
pub fn web_url(link: &str) -> Result<Url, LinkError> {
    match resolve_link(link)? {
        LinkTarget::Web(url) => Ok(url),
        LinkTarget::Relative(path) => Err(LinkError::UnsupportedScheme(path)),
    }
}
