//! Cache Key Module
//!
//! Derives the content-addressed identifier of a rendered image.

use std::fmt;

use crate::models::RenderParams;

// == Cache Key ==
/// 128-bit MD5 fingerprint of a parameter tuple, kept as lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    // == Derive ==
    /// Derives the key for a parameter tuple.
    ///
    /// Hashes `cover_title_artist_lyricsSource`, with an absent lyrics
    /// source serialized as the empty string. Pure: no time or process
    /// dependent input.
    pub fn derive(params: &RenderParams) -> Self {
        let canonical = format!(
            "{}_{}_{}_{}",
            params.cover,
            params.title,
            params.artist,
            params.lyrics_source.as_deref().unwrap_or("")
        );
        Self(format!("{:x}", md5::compute(canonical.as_bytes())))
    }

    /// Hex form of the key.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name of the cache entry for this key.
    pub fn file_name(&self) -> String {
        format!("screenshot_{}.png", self.0)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
