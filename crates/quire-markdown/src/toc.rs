//! Table of contents extraction and reading time.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::text::{strip_tags, unescape_html};

/// Words per minute used by [`reading_time`].
pub const WORDS_PER_MINUTE: usize = 200;

/// A heading found in rendered HTML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heading {
    /// Heading level (2-4)
    pub level: u8,
    /// Anchor ID
    pub id: String,
    /// Plain heading text, without markup or the hash marker
    pub text: String,
}

/// Collect the `<h2>`-`<h4>` headings produced by the renderer, in document order.
pub fn extract_headings(html: &str) -> Vec<Heading> {
    static HEADING: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(
            r#"<h([234]) id="([^"]*)">(?:<span class="hash">[^<]*</span>)?\s*(.*?)</h([234])>"#,
        )
        .expect("Invalid heading regex")
    });

    HEADING
        .captures_iter(html)
        .filter(|caps| caps[1] == caps[4])
        .filter_map(|caps| {
            let level = caps[1].parse().ok()?;
            Some(Heading {
                level,
                id: caps[2].to_string(),
                text: unescape_html(strip_tags(&caps[3]).trim()),
            })
        })
        .collect()
}

/// Estimated minutes to read a Markdown body, at least one.
pub fn reading_time(markdown: &str) -> usize {
    let words = markdown.split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE).max(1)
}
