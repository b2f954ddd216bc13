//! Fenced code block extraction and restoration.
//!
//! Fences are pulled out of the document before any other pass runs and
//! replaced by numbered placeholder tokens. The rendered `<pre><code>` HTML is
//! kept in an ordered arena and swapped back in once every other pass is done,
//! so nothing inside a fence is ever read as Markdown.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::text::escape_html;

/// Leading half of a placeholder token.
pub const PLACEHOLDER_PREFIX: &str = "CODEBLOCKPLACEHOLDER";

/// Trailing half of a placeholder token.
pub const PLACEHOLDER_SUFFIX: &str = "ENDCODEBLOCK";

/// Inserted into literal occurrences of [`PLACEHOLDER_PREFIX`] in the source
/// so they can never be mistaken for a real token.
const WORD_JOINER: char = '\u{2060}';

static FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```([^\s`]*)[^\n`]*\r?\n(.*?)```").expect("Invalid fence regex")
});

static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        "<p>{p}(\\d+){s}</p>|{p}(\\d+){s}",
        p = PLACEHOLDER_PREFIX,
        s = PLACEHOLDER_SUFFIX
    ))
    .expect("Invalid placeholder regex")
});

/// A fenced code block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    /// Language tag from the opening fence, possibly empty
    pub language: String,

    /// Raw source between the fences, without surrounding blank lines
    pub source: String,
}

impl CodeBlock {
    /// Render as an escaped `<pre><code>` element.
    pub fn to_html(&self) -> String {
        format!(
            r#"<pre><code data-lang="{}">{}</code></pre>"#,
            escape_html(&self.language),
            escape_html(&self.source)
        )
    }
}

/// Ordered arena of extracted code blocks, indexed by placeholder number.
#[derive(Debug, Clone, Default)]
pub struct CodeBlocks {
    blocks: Vec<CodeBlock>,
}

impl CodeBlocks {
    /// Replace every fenced block in `markdown` with a placeholder token.
    ///
    /// Returns the arena and the rewritten document.
    pub fn extract(markdown: &str) -> (Self, String) {
        let mut blocks = Vec::new();
        let mut out = String::with_capacity(markdown.len());
        let mut last = 0;

        for caps in FENCE.captures_iter(markdown) {
            let Some(whole) = caps.get(0) else {
                continue;
            };

            out.push_str(&neutralize(&markdown[last..whole.start()]));

            let language = caps.get(1).map_or("", |m| m.as_str()).to_string();
            let source = caps
                .get(2)
                .map_or("", |m| m.as_str())
                .trim_start_matches(['\r', '\n'])
                .trim_end()
                .to_string();

            out.push_str(&placeholder(blocks.len()));
            blocks.push(CodeBlock { language, source });
            last = whole.end();
        }

        out.push_str(&neutralize(&markdown[last..]));

        (Self { blocks }, out)
    }

    /// Swap placeholder tokens back for their rendered blocks.
    ///
    /// A token wrapped in `<p>` loses the wrapper. Tokens whose number is not
    /// in the arena are left untouched.
    pub fn restore(&self, html: &str) -> String {
        if self.blocks.is_empty() {
            return html.to_string();
        }

        TOKEN
            .replace_all(html, |caps: &Captures| {
                caps.get(1)
                    .or_else(|| caps.get(2))
                    .and_then(|m| m.as_str().parse::<usize>().ok())
                    .and_then(|index| self.blocks.get(index))
                    .map(CodeBlock::to_html)
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }

    pub fn get(&self, index: usize) -> Option<&CodeBlock> {
        self.blocks.get(index)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CodeBlock> {
        self.blocks.iter()
    }
}

/// The placeholder token for block `index`.
pub fn placeholder(index: usize) -> String {
    format!("{PLACEHOLDER_PREFIX}{index}{PLACEHOLDER_SUFFIX}")
}

/// Break up literal placeholder prefixes in document text.
fn neutralize(text: &str) -> String {
    if !text.contains(PLACEHOLDER_PREFIX) {
        return text.to_string();
    }

    let (head, tail) = PLACEHOLDER_PREFIX.split_at(9);
    text.replace(PLACEHOLDER_PREFIX, &format!("{head}{WORD_JOINER}{tail}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_fences_in_order() {
        let source = "Intro\n\n```rust\nfn main() {}\n```\n\nMiddle\n\n```\nplain\n```\n";

        let (blocks, text) = CodeBlocks::extract(source);

        assert_eq!(blocks.len(), 2);
        assert_eq!(
            text,
            "Intro\n\nCODEBLOCKPLACEHOLDER0ENDCODEBLOCK\n\nMiddle\n\nCODEBLOCKPLACEHOLDER1ENDCODEBLOCK\n"
        );
        assert_eq!(blocks.get(0).unwrap().language, "rust");
        assert_eq!(blocks.get(0).unwrap().source, "fn main() {}");
        assert_eq!(blocks.get(1).unwrap().language, "");
    }

    #[test]
    fn ignores_info_after_language() {
        let (blocks, _) = CodeBlocks::extract("```tsx title=\"App.tsx\"\n<App />\n```");

        assert_eq!(blocks.get(0).unwrap().language, "tsx");
        assert_eq!(blocks.get(0).unwrap().source, "<App />");
    }

    #[test]
    fn renders_escaped_html() {
        let block = CodeBlock {
            language: "html".to_string(),
            source: "<b>**not bold**</b>".to_string(),
        };

        assert_eq!(
            block.to_html(),
            r#"<pre><code data-lang="html">&lt;b&gt;**not bold**&lt;/b&gt;</code></pre>"#
        );
    }

    #[test]
    fn restores_plain_and_wrapped_tokens() {
        let (blocks, _) = CodeBlocks::extract("```\na\n```\n```\nb\n```");

        let html = blocks.restore(
            "<p>CODEBLOCKPLACEHOLDER0ENDCODEBLOCK</p>\nCODEBLOCKPLACEHOLDER1ENDCODEBLOCK",
        );

        assert_eq!(
            html,
            "<pre><code data-lang=\"\">a</code></pre>\n<pre><code data-lang=\"\">b</code></pre>"
        );
    }

    #[test]
    fn leaves_unknown_tokens_alone() {
        let (blocks, _) = CodeBlocks::extract("```\na\n```");

        let html = blocks.restore("CODEBLOCKPLACEHOLDER7ENDCODEBLOCK");

        assert_eq!(html, "CODEBLOCKPLACEHOLDER7ENDCODEBLOCK");
    }

    #[test]
    fn literal_tokens_in_text_do_not_collide() {
        let source = "See CODEBLOCKPLACEHOLDER0ENDCODEBLOCK here\n```\ncode\n```";

        let (blocks, text) = CodeBlocks::extract(source);
        let restored = blocks.restore(&text);

        assert!(restored.starts_with("See CODEBLOCK\u{2060}PLACEHOLDER0ENDCODEBLOCK here"));
        assert_eq!(restored.matches("<pre>").count(), 1);
    }

    #[test]
    fn unterminated_fence_is_left_in_place() {
        let (blocks, text) = CodeBlocks::extract("```rust\nfn broken() {\n");

        assert!(blocks.is_empty());
        assert_eq!(text, "```rust\nfn broken() {\n");
    }
}
