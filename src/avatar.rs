//! Avatar URL probing.
//!
//! A card shows its sender avatar only when the avatar URL actually serves
//! an image; otherwise the default avatar glyph is drawn. Probes run as
//! background tasks and their verdicts are cached per URL.

use crate::util::{web_url, LinkError};
use lru::LruCache;
use reqwest::header::{CONTENT_TYPE, RANGE};
use reqwest::StatusCode;
use std::num::NonZeroUsize;
use std::time::Duration;
use thiserror::Error;

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Distinct avatar URLs remembered.
const CACHE_CAPACITY: usize = 256;

#[derive(Debug, Error)]
pub enum AvatarError {
    #[error("invalid avatar url: {0}")]
    InvalidUrl(#[from] LinkError),
    #[error("probe timed out after 5s")]
    Timeout,
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    #[error("not an image: {0}")]
    NotAnImage(String),
}

/// Check that `url` answers with an `image/*` content type.
///
/// Tries HEAD first. Hosts that refuse HEAD (405/501) or describe the
/// resource differently on HEAD get a one-byte ranged GET instead.
pub async fn probe_image(client: &reqwest::Client, url: &str) -> Result<(), AvatarError> {
    let url = web_url(url)?;
    let head = send(client.head(url.clone())).await?;
    let status = head.status();
    if status == StatusCode::METHOD_NOT_ALLOWED || status == StatusCode::NOT_IMPLEMENTED {
        tracing::debug!(%url, status = status.as_u16(), "HEAD refused, probing with GET");
    } else {
        match image_content_type(&head) {
            Err(AvatarError::NotAnImage(_)) => {
                tracing::debug!(%url, "HEAD reported no image type, probing with GET");
            }
            verdict => return verdict,
        }
    }

    let get = send(client.get(url).header(RANGE, "bytes=0-0")).await?;
    image_content_type(&get)
}

async fn send(request: reqwest::RequestBuilder) -> Result<reqwest::Response, AvatarError> {
    tokio::time::timeout(PROBE_TIMEOUT, request.send())
        .await
        .map_err(|_| AvatarError::Timeout)?
        .map_err(AvatarError::from)
}

fn image_content_type(response: &reqwest::Response) -> Result<(), AvatarError> {
    if !response.status().is_success() {
        return Err(AvatarError::HttpStatus(response.status().as_u16()));
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();
    if content_type.starts_with("image/") {
        Ok(())
    } else {
        Err(AvatarError::NotAnImage(content_type))
    }
}

/// What the renderer should draw for an avatar URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvatarStatus {
    /// Probe not finished; draw the default glyph for now.
    Pending,
    Image,
    Fallback,
}

/// LRU of probe verdicts keyed by URL.
pub struct AvatarCache {
    entries: LruCache<String, AvatarStatus>,
}

impl AvatarCache {
    pub fn new() -> Self {
        Self::with_capacity(CACHE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
        }
    }

    /// Status for `url` without touching recency.
    pub fn status(&self, url: &str) -> AvatarStatus {
        self.entries.peek(url).copied().unwrap_or(AvatarStatus::Pending)
    }

    /// Claim a probe for `url`. Returns false when one already ran or is
    /// running.
    pub fn begin_probe(&mut self, url: &str) -> bool {
        if self.entries.get(url).is_some() {
            return false;
        }
        self.entries.put(url.to_string(), AvatarStatus::Pending);
        true
    }

    pub fn record(&mut self, url: &str, result: &Result<(), AvatarError>) {
        let status = match result {
            Ok(()) => AvatarStatus::Image,
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "Avatar probe failed, using default");
                AvatarStatus::Fallback
            }
        };
        self.entries.put(url.to_string(), status);
    }
}

impl Default for AvatarCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{any, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_probe_accepts_image() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/avatar.png"))
            .respond_with(ResponseTemplate::new(200).insert_header("content-type", "image/png"))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/avatar.png", server.uri());
        assert!(probe_image(&client, &url).await.is_ok());
    }

    #[tokio::test]
    async fn test_probe_rejects_html() {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200).insert_header("content-type", "text/html"))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let result = probe_image(&client, &server.uri()).await;
        assert!(matches!(result, Err(AvatarError::NotAnImage(_))));
    }

    #[tokio::test]
    async fn test_probe_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let result = probe_image(&client, &server.uri()).await;
        assert!(matches!(result, Err(AvatarError::HttpStatus(404))));
    }

    #[tokio::test]
    async fn test_probe_falls_back_to_get_when_head_refused() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(405))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/avatar.png"))
            .and(header("range", "bytes=0-0"))
            .respond_with(ResponseTemplate::new(206).insert_header("content-type", "image/png"))
            .expect(1)
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/avatar.png", server.uri());
        assert!(probe_image(&client, &url).await.is_ok());
    }

    #[tokio::test]
    async fn test_probe_falls_back_to_get_when_head_lacks_image_type() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).insert_header("content-type", "image/jpeg"))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        assert!(probe_image(&client, &server.uri()).await.is_ok());
    }

    #[tokio::test]
    async fn test_probe_rejects_relative_url() {
        let client = reqwest::Client::new();
        let result = probe_image(&client, "/img/a.png").await;
        assert!(matches!(result, Err(AvatarError::InvalidUrl(_))));
    }

    #[test]
    fn test_cache_probe_once() {
        let mut cache = AvatarCache::with_capacity(2);
        assert_eq!(cache.status("a"), AvatarStatus::Pending);
        assert!(cache.begin_probe("a"));
        assert!(!cache.begin_probe("a"));
        cache.record("a", &Ok(()));
        assert_eq!(cache.status("a"), AvatarStatus::Image);
        cache.record("b", &Err(AvatarError::Timeout));
        assert_eq!(cache.status("b"), AvatarStatus::Fallback);
    }

    #[test]
    fn test_cache_evicts_least_recent() {
        let mut cache = AvatarCache::with_capacity(1);
        cache.record("a", &Ok(()));
        cache.record("b", &Ok(()));
        assert_eq!(cache.status("a"), AvatarStatus::Pending);
    }
}
