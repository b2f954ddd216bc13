//! Block-level passes: escaping, tables, headings, callouts, blockquotes,
//! horizontal rules and lists.
//!
//! Every pass takes the whole document and returns a new one. They run in the
//! order they appear in this file.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::text::{capitalize, escape_html, slugify, unescape_html};

/// Callout keywords, matched case-insensitively.
pub const CALLOUT_KINDS: [&str; 4] = ["note", "tip", "warning", "important"];

/// Escape user text line by line.
///
/// A leading `> ` (or a lone `>`) is kept so the quote passes can still see
/// it. Placeholder tokens contain nothing escapable and pass through as-is.
pub fn escape_text(markdown: &str) -> String {
    markdown
        .split('\n')
        .map(|line| {
            if let Some(rest) = line.strip_prefix("> ") {
                format!("> {}", escape_html(rest))
            } else if line.trim_end() == ">" {
                ">".to_string()
            } else {
                escape_html(line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Convert pipe tables with a separator row into `<table>` elements.
pub fn tables(markdown: &str) -> String {
    static TABLE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?m)^\|(.+)\|\n\|[-:| ]+\|\n((?:\|.+\|\n?)+)").expect("Invalid table regex")
    });

    TABLE
        .replace_all(markdown, |caps: &Captures| {
            let headers: Vec<&str> = caps[1].split('|').map(str::trim).collect();
            let rows: Vec<Vec<&str>> = caps[2].lines().map(row_cells).collect();

            let mut table = String::from("<table>\n<thead>\n<tr>");
            for header in headers {
                table.push_str(&format!("<th>{header}</th>"));
            }
            table.push_str("</tr>\n</thead>\n<tbody>\n");
            for row in rows {
                table.push_str("<tr>");
                for cell in row {
                    table.push_str(&format!("<td>{cell}</td>"));
                }
                table.push_str("</tr>\n");
            }
            table.push_str("</tbody>\n</table>");

            if caps[0].ends_with('\n') {
                table.push('\n');
            }
            table
        })
        .into_owned()
}

/// Split a `| a | b |` row into trimmed cells, dropping the empty cells
/// produced by the outer pipes.
fn row_cells(row: &str) -> Vec<&str> {
    let mut cells: Vec<&str> = row.trim().split('|').map(str::trim).collect();
    if cells.last().is_some_and(|c| c.is_empty()) {
        cells.pop();
    }
    if cells.first().is_some_and(|c| c.is_empty()) {
        cells.remove(0);
    }
    cells
}

/// Turn `#`, `##` and `###` lines into `<h2>`, `<h3>` and `<h4>`.
///
/// `<h1>` is left to the page title. The id is the slug of the heading text,
/// the visible content keeps the hashes in a marker span.
pub fn headings(markdown: &str) -> String {
    static HEADING: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?m)^(#{1,3}) (.+)$").expect("Invalid heading regex"));

    HEADING
        .replace_all(markdown, |caps: &Captures| {
            let hashes = &caps[1];
            let text = caps[2].trim_end();
            let level = hashes.len() + 1;
            let id = slugify(&unescape_html(text));
            format!(r#"<h{level} id="{id}"><span class="hash">{hashes}</span> {text}</h{level}>"#)
        })
        .into_owned()
}

/// Render `> [!KIND] title` blocks as callout containers.
///
/// Consumes the marker line and every directly following `>` line. Unknown
/// kinds are left for the blockquote pass.
pub fn callouts(markdown: &str) -> String {
    static MARKER: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^> \[!([A-Za-z]+)\][ \t]*(.*)$").expect("Invalid callout regex")
    });

    let mut out: Vec<String> = Vec::new();
    let mut lines = markdown.split('\n').peekable();

    while let Some(line) = lines.next() {
        let Some((kind, title)) = MARKER.captures(line).and_then(|caps| {
            let kind = caps[1].to_lowercase();
            CALLOUT_KINDS
                .contains(&kind.as_str())
                .then(|| (kind, caps[2].trim().to_string()))
        }) else {
            out.push(line.to_string());
            continue;
        };

        let title = if title.is_empty() {
            capitalize(&kind)
        } else {
            title
        };

        out.push(format!(r#"<div class="callout callout-{kind}">"#));
        out.push(format!(r#"<div class="callout-title">{title}</div>"#));
        out.push(r#"<div class="callout-content">"#.to_string());

        while let Some(member) = lines.next_if(|l| l.starts_with('>')) {
            let content = member
                .strip_prefix("> ")
                .unwrap_or_else(|| member.trim_start_matches('>'));
            out.push(content.to_string());
        }

        out.push("</div>".to_string());
        out.push("</div>".to_string());
    }

    out.join("\n")
}

/// Wrap each remaining `> ` line in its own `<blockquote>`.
///
/// Empty quote lines become blank lines.
pub fn blockquotes(markdown: &str) -> String {
    static QUOTE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?m)^> (.+)$").expect("Invalid blockquote regex"));
    static EMPTY_QUOTE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?m)^>[ \t]*$").expect("Invalid empty quote regex"));

    let quoted = QUOTE.replace_all(markdown, "<blockquote>${1}</blockquote>");
    EMPTY_QUOTE.replace_all(&quoted, "").into_owned()
}

/// Lines that are exactly `---` or `***` become `<hr />`.
pub fn rules(markdown: &str) -> String {
    static RULE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?m)^(?:---|\*\*\*)$").expect("Invalid rule regex"));

    RULE.replace_all(markdown, "<hr />").into_owned()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Unordered,
    Ordered,
}

impl ListKind {
    fn open(self) -> &'static str {
        match self {
            Self::Unordered => "<ul>",
            Self::Ordered => "<ol>",
        }
    }

    fn close(self) -> &'static str {
        match self {
            Self::Unordered => "</ul>",
            Self::Ordered => "</ol>",
        }
    }
}

/// Group consecutive `- `/`* ` and `1. ` lines into flat lists.
pub fn lists(markdown: &str) -> String {
    static UNORDERED: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^[-*] (.+)$").expect("Invalid list regex"));
    static ORDERED: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^\d+\. (.+)$").expect("Invalid list regex"));

    let mut out: Vec<String> = Vec::new();
    let mut open: Option<ListKind> = None;

    for line in markdown.split('\n') {
        let trimmed = line.trim();
        let item = UNORDERED
            .captures(trimmed)
            .map(|caps| (ListKind::Unordered, caps))
            .or_else(|| ORDERED.captures(trimmed).map(|caps| (ListKind::Ordered, caps)));

        match item {
            Some((kind, caps)) => {
                if open != Some(kind) {
                    if let Some(previous) = open.take() {
                        out.push(previous.close().to_string());
                    }
                    out.push(kind.open().to_string());
                    open = Some(kind);
                }
                out.push(format!("<li>{}</li>", &caps[1]));
            }
            None => {
                if let Some(previous) = open.take() {
                    out.push(previous.close().to_string());
                }
                out.push(line.to_string());
            }
        }
    }

    if let Some(previous) = open {
        out.push(previous.close().to_string());
    }

    out.join("\n")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn escapes_text_but_keeps_quote_markers() {
        assert_eq!(
            escape_text("a < b\n> quoted <i>\n>\n>x"),
            "a &lt; b\n> quoted &lt;i&gt;\n>\n&gt;x"
        );
    }

    #[test]
    fn converts_table() {
        let md = "| Name | Age |\n|------|:---:|\n| Ann | 31 |\n| Bob | 42 |\n";

        assert_eq!(
            tables(md),
            "<table>\n<thead>\n<tr><th>Name</th><th>Age</th></tr>\n</thead>\n<tbody>\n\
             <tr><td>Ann</td><td>31</td></tr>\n<tr><td>Bob</td><td>42</td></tr>\n\
             </tbody>\n</table>\n"
        );
    }

    #[test]
    fn keeps_empty_interior_cells() {
        assert_eq!(row_cells("| a |  | c |"), vec!["a", "", "c"]);
    }

    #[test]
    fn table_without_separator_is_untouched() {
        let md = "| Name | Age |\n| Ann | 31 |\n";

        assert_eq!(tables(md), md);
    }

    #[test]
    fn table_is_kept_apart_from_following_text() {
        let html = tables("| a |\n|---|\n| 1 |\nafter");

        assert!(html.ends_with("</table>\nafter"));
    }

    #[test]
    fn converts_headings_with_offset() {
        assert_eq!(
            headings("# Top\n## Getting Started\n### Deep dive\n#### Too deep"),
            "<h2 id=\"top\"><span class=\"hash\">#</span> Top</h2>\n\
             <h3 id=\"getting-started\"><span class=\"hash\">##</span> Getting Started</h3>\n\
             <h4 id=\"deep-dive\"><span class=\"hash\">###</span> Deep dive</h4>\n\
             #### Too deep"
        );
    }

    #[test]
    fn heading_id_uses_unescaped_text() {
        let html = headings(&escape_text("## Tom's <Guide>"));

        assert_eq!(
            html,
            "<h3 id=\"toms-guide\"><span class=\"hash\">##</span> Tom&#039;s &lt;Guide&gt;</h3>"
        );
    }

    #[test]
    fn hash_without_space_is_not_heading() {
        assert_eq!(headings("#hashtag"), "#hashtag");
    }

    #[test]
    fn duplicate_headings_share_an_id() {
        let html = headings("## Notes\n## Notes");

        assert_eq!(html.matches(r#"id="notes""#).count(), 2);
    }

    #[test]
    fn renders_callout_with_title() {
        assert_eq!(
            callouts("> [!TIP] Pro tip\n> use this\nafter"),
            "<div class=\"callout callout-tip\">\n\
             <div class=\"callout-title\">Pro tip</div>\n\
             <div class=\"callout-content\">\n\
             use this\n\
             </div>\n\
             </div>\nafter"
        );
    }

    #[test]
    fn callout_title_defaults_to_kind() {
        let html = callouts("> [!warning]\n> careful\n>\n> really");

        assert!(html.contains(r#"<div class="callout callout-warning">"#));
        assert!(html.contains(r#"<div class="callout-title">Warning</div>"#));
        assert!(html.contains("careful\n\nreally"));
    }

    #[test]
    fn unknown_callout_kind_falls_through() {
        let md = "> [!DANGER] Nope\n> text";

        assert_eq!(callouts(md), md);
        assert_eq!(
            blockquotes(&callouts(md)),
            "<blockquote>[!DANGER] Nope</blockquote>\n<blockquote>text</blockquote>"
        );
    }

    #[test]
    fn blockquotes_are_per_line() {
        assert_eq!(
            blockquotes("> one\n> two\n>\nplain"),
            "<blockquote>one</blockquote>\n<blockquote>two</blockquote>\n\nplain"
        );
    }

    #[test]
    fn converts_rules() {
        assert_eq!(rules("a\n---\n***\n----\n- - -"), "a\n<hr />\n<hr />\n----\n- - -");
    }

    #[test]
    fn groups_lists_and_switches_kind() {
        assert_eq!(
            lists("- one\n* two\n1. first\n2. second\ntext\n- again"),
            "<ul>\n<li>one</li>\n<li>two</li>\n</ul>\n<ol>\n<li>first</li>\n<li>second</li>\n</ol>\n\
             text\n<ul>\n<li>again</li>\n</ul>"
        );
    }

    #[test]
    fn indented_items_are_flat() {
        assert_eq!(
            lists("- parent\n  - child"),
            "<ul>\n<li>parent</li>\n<li>child</li>\n</ul>"
        );
    }
}
