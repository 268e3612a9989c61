//! Template Substitution
//!
//! Literal `[Music::*]` placeholder replacement. Only the lyrics value arrives
//! pre-escaped; title and artist are inserted as given.

use crate::fetch::InlineAsset;

pub const FONT_FACE_TOKEN: &str = "[Music::FONT_FACE]";
pub const IMAGE_TOKEN: &str = "[Music::IMAGE]";
pub const TITLE_TOKEN: &str = "[Music::TITLE]";
pub const ARTIST_TOKEN: &str = "[Music::ARTIST]";
pub const LYRICS_TOKEN: &str = "[Music::LYRICS]";

/// Font family name the template's stylesheet refers to
pub const FONT_FAMILY: &str = "HanYiWenHei";

/// Values for the five template placeholders.
#[derive(Debug, Clone, Copy)]
pub struct Placeholders<'a> {
    pub font_face: &'a str,
    pub image: &'a str,
    pub title: &'a str,
    pub artist: &'a str,
    pub lyrics: &'a str,
}

/// `<style>` block declaring the embedded font.
pub fn font_face_block(font: &InlineAsset) -> String {
    format!(
        "\n    <style>\n    @font-face {{\n        font-family: '{}';\n        src: url({}) format('truetype');\n    }}\n    </style>",
        FONT_FAMILY,
        font.data_uri()
    )
}

/// Replaces every occurrence of each token, one token at a time in the
/// order font face, image, title, artist, lyrics.
pub fn substitute(template: &str, values: &Placeholders<'_>) -> String {
    [
        (FONT_FACE_TOKEN, values.font_face),
        (IMAGE_TOKEN, values.image),
        (TITLE_TOKEN, values.title),
        (ARTIST_TOKEN, values.artist),
        (LYRICS_TOKEN, values.lyrics),
    ]
    .into_iter()
    .fold(template.to_string(), |doc, (token, value)| {
        doc.replace(token, value)
    })
}
