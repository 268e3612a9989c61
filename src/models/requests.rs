//! Request DTOs for the render service
//!
//! Defines the query string accepted by `GET /` and the immutable parameter
//! tuple it resolves to.

use serde::Deserialize;

/// Cover used when the request names none
pub const DEFAULT_COVER: &str = "cover.jpg";
/// Title used when the request names none
pub const DEFAULT_TITLE: &str = "Sample Song";
/// Artist used when the request names none
pub const DEFAULT_ARTIST: &str = "Sample Artist";

/// Query string for `GET /`
///
/// # Fields
/// - `cover`: Cover image URL or local path
/// - `title`: Song title
/// - `artist`: Song artist
/// - `lyrics_url` / `lyrics`: URL of a raw lyrics document (`lyrics_url` wins)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RenderQuery {
    pub cover: Option<String>,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub lyrics: Option<String>,
    pub lyrics_url: Option<String>,
}

impl RenderQuery {
    /// Applies defaults and resolves the lyrics source.
    ///
    /// An empty lyrics value counts as absent.
    pub fn into_params(self) -> RenderParams {
        let lyrics_source = self
            .lyrics_url
            .filter(|url| !url.is_empty())
            .or(self.lyrics.filter(|url| !url.is_empty()));

        RenderParams {
            cover: self.cover.unwrap_or_else(|| DEFAULT_COVER.to_string()),
            title: self.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            artist: self.artist.unwrap_or_else(|| DEFAULT_ARTIST.to_string()),
            lyrics_source,
        }
    }
}

/// Parameters that fully determine a rendered image.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RenderParams {
    pub cover: String,
    pub title: String,
    pub artist: String,
    pub lyrics_source: Option<String>,
}

impl RenderParams {
    pub fn new(
        cover: impl Into<String>,
        title: impl Into<String>,
        artist: impl Into<String>,
        lyrics_source: Option<String>,
    ) -> Self {
        Self {
            cover: cover.into(),
            title: title.into(),
            artist: artist.into(),
            lyrics_source,
        }
    }
}

impl Default for RenderParams {
    fn default() -> Self {
        RenderQuery::default().into_params()
    }
}
