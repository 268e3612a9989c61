//! Lyrics Normalization
//!
//! Turns a raw lyrics document into an HTML-safe fragment for the template.

use once_cell::sync::Lazy;
use regex::Regex;

/// Line appended when lyrics are cut short
pub const TRUNCATION_MARKER: &str = "歌词太长了，剩下的省略了...";

/// Separator placed between lyrics lines in the markup
pub const LINE_BREAK: &str = "<br>";

/// Lyrics shown when the request carries no lyrics source
pub const PLACEHOLDER_LYRICS: &str =
    "Line 1 of the lyrics<br>Line 2 of the lyrics<br>Line 3 of the lyrics";

/// LRC timestamp tags such as `[00:12.34]` or `[00:12.345]`
static TIMESTAMP_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\d{2}:\d{2}\.\d{2,3}\]").expect("timestamp pattern is valid"));

/// Every line boundary: CRLF, LF, lone CR, and the vertical tab, form feed,
/// separator and Unicode line/paragraph break characters.
static LINE_BOUNDARY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\r\n|[\n\r\x0b\x0c\x1c-\x1e\x{85}\x{2028}\x{2029}]")
        .expect("line boundary pattern is valid")
});

/// Escapes `&`, `<` and `>`, ampersand first so the entities introduced for
/// the other two are not escaped again.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Removes every LRC timestamp tag.
pub fn strip_timestamps(text: &str) -> String {
    TIMESTAMP_TAG.replace_all(text, "").into_owned()
}

/// Splits on [`LINE_BOUNDARY`]. A terminator at the very end does not open
/// an extra empty line.
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = LINE_BOUNDARY.split(text).collect();
    if lines.last() == Some(&"") {
        lines.pop();
    }
    lines
}

/// Full normalization: escape, strip timestamps, keep at most `max_lines`
/// lines (plus [`TRUNCATION_MARKER`] when cut), join with [`LINE_BREAK`].
pub fn normalize(raw: &str, max_lines: usize) -> String {
    let cleaned = strip_timestamps(&escape_html(raw));

    let mut lines = split_lines(&cleaned);
    if lines.len() > max_lines {
        lines.truncate(max_lines);
        lines.push(TRUNCATION_MARKER);
    }

    lines.join(LINE_BREAK)
}
