//! Slug and escape helpers shared by the renderer and the site builder.

use std::sync::LazyLock;

use regex::Regex;

/// Maximum length of a slug produced by [`slugify`].
pub const MAX_SLUG_LEN: usize = 80;

/// Convert text to a URL-safe slug.
///
/// Lower-cases, drops quote characters, collapses every run of characters
/// outside `[a-z0-9]` into a single hyphen and trims hyphens from both ends.
/// The result is capped at [`MAX_SLUG_LEN`] characters and is never empty:
/// text with nothing sluggable in it becomes `"untitled"`.
pub fn slugify(text: &str) -> String {
    static NON_ALNUM: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("Invalid slug regex"));

    let lowered = text.to_lowercase();
    let unquoted: String = lowered
        .trim()
        .chars()
        .filter(|c| !matches!(c, '\'' | '"' | '\u{2018}' | '\u{2019}' | '\u{201C}' | '\u{201D}'))
        .collect();

    let hyphenated = NON_ALNUM.replace_all(&unquoted, "-");
    let trimmed = hyphenated.trim_matches('-');

    // Only ASCII survives the regex, so byte truncation is char-safe.
    let truncated = &trimmed[..trimmed.len().min(MAX_SLUG_LEN)];

    if truncated.is_empty() {
        "untitled".to_string()
    } else {
        truncated.to_string()
    }
}

/// Escape the five HTML-significant characters.
///
/// Not idempotent: escaping already-escaped text encodes the ampersands again.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#039;")
}

/// [`escape_html`] for optional input; `None` becomes an empty string.
pub fn escape_html_opt(text: Option<&str>) -> String {
    text.map(escape_html).unwrap_or_default()
}

/// Reverse HTML entity encoding, for computing slugs from already-escaped text.
pub fn unescape_html(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}

/// Remove every HTML tag, keeping the text between them.
pub fn strip_tags(html: &str) -> String {
    static TAG: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"<[^>]+>").expect("Invalid tag regex"));

    TAG.replace_all(html, "").into_owned()
}

/// Capitalize the first letter of a string.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
