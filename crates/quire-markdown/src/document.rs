//! Markdown documents: frontmatter plus body.

use serde::Serialize;

use crate::frontmatter::{extract_frontmatter, Frontmatter};
use crate::render::Renderer;
use crate::toc::{extract_headings, reading_time, Heading};

/// A parsed Markdown document.
#[derive(Debug, Clone, Default)]
pub struct Document {
    /// Parsed frontmatter, empty when the header is missing
    pub frontmatter: Frontmatter,

    /// Markdown body (without frontmatter)
    pub body: String,
}

/// The result of rendering a [`Document`] body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedDoc {
    pub html: String,
    pub headings: Vec<Heading>,
    pub reading_time: usize,
}

impl Document {
    /// Split a source file into frontmatter and body.
    ///
    /// A file without a well-formed header is all body.
    pub fn parse(source: &str) -> Self {
        let (frontmatter, body) = extract_frontmatter(source);
        Self {
            frontmatter,
            body: body.to_string(),
        }
    }

    /// Render the body and collect its table of contents.
    pub fn render(&self, renderer: &Renderer) -> RenderedDoc {
        let html = renderer.render(&self.body);
        let headings = extract_headings(&html);

        RenderedDoc {
            headings,
            reading_time: reading_time(&self.body),
            html,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::frontmatter::FieldValue;

    #[test]
    fn parses_complete_document() {
        let source = r#"---
title: Getting Started
kind: Article
tags: [rust, notes]
---

# Getting Started

Some intro text.

```rust
fn main() {}
```

## Next Steps

See [[Another Post]].
"#;

        let doc = Document::parse(source);

        assert_eq!(doc.frontmatter.title(), Some("Getting Started"));
        assert_eq!(doc.frontmatter.kind(), "article");
        assert_eq!(doc.frontmatter.tags(), vec!["rust", "notes"]);
        assert!(doc.body.starts_with("\n# Getting Started"));

        let rendered = doc.render(&Renderer::default());

        assert_eq!(rendered.headings.len(), 2);
        assert_eq!(rendered.headings[0].id, "getting-started");
        assert_eq!(rendered.headings[0].level, 2);
        assert_eq!(rendered.headings[1].text, "Next Steps");
        assert_eq!(rendered.headings[1].level, 3);
        assert!(rendered
            .html
            .contains(r#"<pre><code data-lang="rust">fn main() {}</code></pre>"#));
        assert!(rendered
            .html
            .contains(r#"<a href="/posts/another-post/" class="wikilink">Another Post</a>"#));
        assert_eq!(rendered.reading_time, 1);
    }

    #[test]
    fn parses_without_frontmatter() {
        let doc = Document::parse("# Just Markdown\n\nNo frontmatter.");

        assert!(doc.frontmatter.is_empty());
        assert_eq!(doc.body, "# Just Markdown\n\nNo frontmatter.");
    }

    #[test]
    fn unclosed_header_is_body() {
        let doc = Document::parse("---\ntitle: Oops\n\nText");

        assert!(doc.frontmatter.is_empty());
        assert!(doc.body.starts_with("---\ntitle"));
    }

    #[test]
    fn renders_with_custom_wikilink_base() {
        let doc = Document::parse("[[Home]]");

        let rendered = doc.render(&Renderer::new().with_wikilink_base("/blog/posts/"));

        assert_eq!(
            rendered.html,
            r#"<p><a href="/blog/posts/home/" class="wikilink">Home</a></p>"#
        );
    }

    #[test]
    fn serializes_camel_case() {
        let mut doc = Document::parse("## A");
        doc.frontmatter.insert("publish", FieldValue::Bool(true));

        let json = serde_json::to_value(doc.render(&Renderer::default())).unwrap();

        assert_eq!(json["readingTime"], 1);
        assert_eq!(json["headings"][0]["id"], "a");
    }
}
