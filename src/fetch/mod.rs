//! Content Fetcher
//!
//! Downloads lyrics and cover images named by the request. URLs come straight
//! from the query string and are not restricted to any host list.

pub mod lyrics;


use std::path::Path;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{header::CONTENT_TYPE, redirect::Policy, Client};
use tracing::{debug, error, warn};

use crate::config::Config;
use crate::error::{RenderError, Result};

pub use lyrics::{normalize, PLACEHOLDER_LYRICS, TRUNCATION_MARKER};

/// MIME type assumed for covers that do not announce one
const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

// == Inline Asset ==
/// Binary asset embedded into markup as a base64 `data:` URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineAsset {
    pub mime: String,
    pub data: Vec<u8>,
}

impl InlineAsset {
    pub fn new(mime: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime: mime.into(),
            data,
        }
    }

    /// `data:<mime>;base64,<payload>`
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.data))
    }
}

// == Content Fetcher ==
/// Outbound HTTP client for lyrics and cover downloads.
#[derive(Debug, Clone)]
pub struct ContentFetcher {
    client: Client,
    max_lyrics_lines: usize,
}

impl ContentFetcher {
    /// Builds a fetcher that follows redirects and gives up after `timeout`.
    pub fn new(timeout: Duration, max_lyrics_lines: usize) -> Result<Self> {
        let client = Client::builder()
            .redirect(Policy::limited(10))
            .timeout(timeout)
            .user_agent(concat!("songshot/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RenderError::Internal(format!("building HTTP client: {}", e)))?;

        Ok(Self {
            client,
            max_lyrics_lines,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            Duration::from_secs(config.fetch_timeout),
            config.max_lyrics_lines,
        )
    }

    // == Lyrics ==
    /// Fetches and normalizes the lyrics document at `url`.
    ///
    /// Never fails: when the download fails the returned fragment is an
    /// error message, which then appears in the rendered image.
    pub async fn fetch_lyrics(&self, url: &str) -> String {
        match self.get(url).await {
            Ok((_, body)) => {
                let text = String::from_utf8_lossy(&body);
                lyrics::normalize(&text, self.max_lyrics_lines)
            }
            Err(e) => {
                error!("Error fetching lyrics: {}", e);
                format!("Error fetching lyrics: {}", e)
            }
        }
    }

    // == Cover ==
    /// Loads the cover and returns it as an inline asset.
    ///
    /// `http://` and `https://` covers are downloaded; anything else is read
    /// as a local file path. Returns `None` on any failure.
    pub async fn fetch_cover_inline(&self, cover: &str) -> Option<InlineAsset> {
        if is_remote(cover) {
            match self.get(cover).await {
                Ok((mime, body)) => Some(InlineAsset::new(
                    mime.unwrap_or_else(|| DEFAULT_IMAGE_MIME.to_string()),
                    body,
                )),
                Err(e) => {
                    warn!("Error fetching cover {}: {}", cover, e);
                    None
                }
            }
        } else {
            match tokio::fs::read(cover).await {
                Ok(body) => Some(InlineAsset::new(mime_from_extension(Path::new(cover)), body)),
                Err(e) => {
                    warn!("Error reading cover file {}: {}", cover, e);
                    None
                }
            }
        }
    }

    /// GET with redirects; non-success statuses are errors.
    async fn get(&self, url: &str) -> Result<(Option<String>, Vec<u8>)> {
        debug!("Fetching {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| RenderError::UpstreamFetch(e.to_string()))?;

        let mime = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let body = response
            .bytes()
            .await
            .map_err(|e| RenderError::UpstreamFetch(e.to_string()))?;

        Ok((mime, body.to_vec()))
    }
}

fn is_remote(location: &str) -> bool {
    let lower = location.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Guesses an image MIME type from a file extension.
fn mime_from_extension(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("bmp") => "image/bmp",
        _ => DEFAULT_IMAGE_MIME,
    }
}
