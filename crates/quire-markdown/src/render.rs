//! Markdown to HTML rendering pipeline.
//!
//! Rendering is a fixed sequence of whole-document string passes:
//!
//! 1. fenced code blocks are swapped for placeholder tokens
//! 2. remaining text is HTML-escaped
//! 3. tables, headings, callouts, blockquotes, rules and lists
//! 4. inline formatting, then wikilinks
//! 5. paragraph wrapping
//! 6. code blocks are swapped back in
//! 7. paragraph tags around block elements are removed
//!
//! The pipeline never fails. Malformed input renders as literal text.

use std::sync::LazyLock;

use regex::Regex;

use crate::blocks;
use crate::codeblock::{CodeBlocks, PLACEHOLDER_PREFIX};
use crate::inline;

/// Default URL prefix for wikilink targets.
pub const DEFAULT_WIKILINK_BASE: &str = "/posts/";

/// Opening tags that start a paragraph rather than replace one.
const INLINE_TAGS: [&str; 6] = ["<a ", "<strong>", "<em>", "<code>", "<del>", "<mark>"];

/// Markdown renderer.
///
/// Holds no per-document state, so one renderer can be shared across threads.
#[derive(Debug, Clone)]
pub struct Renderer {
    wikilink_base: String,
}

impl Default for Renderer {
    fn default() -> Self {
        Self {
            wikilink_base: DEFAULT_WIKILINK_BASE.to_string(),
        }
    }
}

impl Renderer {
    /// Create a renderer with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the URL prefix that wikilinks resolve under.
    pub fn with_wikilink_base(mut self, base: impl Into<String>) -> Self {
        self.wikilink_base = base.into();
        self
    }

    pub fn wikilink_base(&self) -> &str {
        &self.wikilink_base
    }

    /// Render a Markdown body (without frontmatter) to an HTML fragment.
    pub fn render(&self, markdown: &str) -> String {
        let markdown = markdown.replace("\r\n", "\n");

        let (code_blocks, text) = CodeBlocks::extract(&markdown);

        let text = blocks::escape_text(&text);
        let text = blocks::tables(&text);
        let text = blocks::headings(&text);
        let text = blocks::callouts(&text);
        let text = blocks::blockquotes(&text);
        let text = blocks::rules(&text);
        let text = blocks::lists(&text);

        let text = inline::format(&text);
        let text = inline::wikilinks(&text, &self.wikilink_base);

        let html = wrap_paragraphs(&text);
        let html = code_blocks.restore(&html);

        cleanup(&html)
    }
}

/// Render with the default [`Renderer`].
pub fn render(markdown: &str) -> String {
    Renderer::default().render(markdown)
}

/// Wrap every text line in `<p>`; blank lines are dropped.
///
/// Lines already starting with a block element or a code placeholder are
/// left alone.
pub fn wrap_paragraphs(html: &str) -> String {
    html.split('\n')
        .filter_map(|line| {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                None
            } else if trimmed.starts_with(PLACEHOLDER_PREFIX) || starts_with_block_tag(trimmed) {
                Some(line.to_string())
            } else {
                Some(format!("<p>{line}</p>"))
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn starts_with_block_tag(line: &str) -> bool {
    line.starts_with('<') && !INLINE_TAGS.iter().any(|tag| line.starts_with(tag))
}

/// Remove empty paragraphs and paragraphs that wrap exactly one line of
/// block elements.
///
/// The `<p>` and `</p>` are only removed together, so a paragraph with text
/// beside an inline figure stays balanced.
pub fn cleanup(html: &str) -> String {
    static EMPTY: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"<p>\s*</p>").expect("Invalid cleanup regex"));
    static WRAPPED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(concat!(
            r"(?m)^<p>(",
            r"<(?:h[234]|table|ul|ol|li|blockquote|figure|pre|div)\b.*",
            r"</(?:h[234]|table|ul|ol|li|blockquote|figure|pre|div)>",
            r"|<hr />",
            r")</p>$"
        ))
        .expect("Invalid cleanup regex")
    });

    let html = EMPTY.replace_all(html, "");
    let html = WRAPPED_BLOCK.replace_all(&html, "${1}");

    html.trim().to_string()
}
