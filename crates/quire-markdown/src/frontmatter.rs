//! Frontmatter extraction and parsing.
//!
//! Only a small YAML subset is understood: one `key: value` per line, where a
//! value is a flat `[a, b]` list, a `true`/`false` boolean, a quoted string or
//! a bare string. Anything else on a line is kept as a bare string.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// A single frontmatter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    String(String),
    Bool(bool),
    List(Vec<String>),
}

impl FieldValue {
    /// Coerce the right-hand side of a `key: value` line.
    pub fn parse(raw: &str) -> Self {
        let value = raw.trim();

        if let Some(inner) = value.strip_prefix('[').and_then(|v| v.strip_suffix(']')) {
            let items = inner
                .split(',')
                .map(|item| strip_quotes(item.trim()).to_string())
                .collect();
            return Self::List(items);
        }

        match value {
            "true" => Self::Bool(true),
            "false" => Self::Bool(false),
            _ => Self::String(unwrap_quoted(value).to_string()),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

/// Strip at most one leading and one trailing quote, independently.
fn strip_quotes(s: &str) -> &str {
    let s = s.strip_prefix(['"', '\'']).unwrap_or(s);
    s.strip_suffix(['"', '\'']).unwrap_or(s)
}

/// Remove one layer of matching single or double quotes.
fn unwrap_quoted(s: &str) -> &str {
    for quote in ['"', '\''] {
        if s.len() >= 2 && s.starts_with(quote) && s.ends_with(quote) {
            return &s[1..s.len() - 1];
        }
    }
    s
}

/// Parsed frontmatter of a content file.
///
/// Every key is kept, including ones quire itself never reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Frontmatter {
    fields: BTreeMap<String, FieldValue>,
}

impl Frontmatter {
    /// Parse the lines between the `---` delimiters.
    pub fn parse(header: &str) -> Self {
        let mut fields = BTreeMap::new();

        for line in header.lines() {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            fields.insert(key.trim().to_string(), FieldValue::parse(value));
        }

        Self { fields }
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: FieldValue) {
        self.fields.insert(key.into(), value);
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// String value of `key`, ignoring empty strings.
    pub fn str(&self, key: &str) -> Option<&str> {
        self.get(key)
            .and_then(FieldValue::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn title(&self) -> Option<&str> {
        self.str("title")
    }

    /// Content kind, lower-cased; `article` when absent.
    pub fn kind(&self) -> String {
        self.str("kind")
            .map(str::to_lowercase)
            .unwrap_or_else(|| "article".to_string())
    }

    pub fn date(&self) -> Option<&str> {
        self.str("date")
    }

    pub fn summary(&self) -> &str {
        self.str("summary").unwrap_or_default()
    }

    /// Non-empty tags, only when written as a list.
    pub fn tags(&self) -> Vec<String> {
        self.get("tags")
            .and_then(FieldValue::as_list)
            .unwrap_or_default()
            .iter()
            .filter(|tag| !tag.is_empty())
            .cloned()
            .collect()
    }

    /// Whether the document should be published. Only an explicit `false` hides it.
    pub fn publish(&self) -> bool {
        self.get("publish")
            .and_then(FieldValue::as_bool)
            .unwrap_or(true)
    }

    pub fn image(&self) -> Option<&str> {
        self.str("image")
    }

    pub fn url(&self) -> Option<&str> {
        self.str("url")
    }
}

/// Split a document into frontmatter and body.
///
/// A document without a complete `---` header yields empty frontmatter and
/// the whole input as body.
pub fn extract_frontmatter(source: &str) -> (Frontmatter, &str) {
    static HEADER: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?s)\A---\r?\n(.*?)\r?\n---\r?\n(.*)\z").expect("Invalid frontmatter regex")
    });

    let Some(caps) = HEADER.captures(source) else {
        return (Frontmatter::default(), source);
    };

    let header = caps.get(1).map_or("", |m| m.as_str());
    let body = caps.get(2).map_or("", |m| m.as_str());

    (Frontmatter::parse(header), body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_valid_frontmatter() {
        let source = r#"---
title: Welcome to the Blog
kind: article
date: 2026-01-01
tags: [welcome, "intro", 'news']
summary: "First post: hello"
publish: true
---

# Welcome
"#;

        let (fm, body) = extract_frontmatter(source);

        assert_eq!(fm.title(), Some("Welcome to the Blog"));
        assert_eq!(fm.kind(), "article");
        assert_eq!(fm.date(), Some("2026-01-01"));
        assert_eq!(fm.tags(), vec!["welcome", "intro", "news"]);
        assert_eq!(fm.summary(), "First post: hello");
        assert!(fm.publish());
        assert_eq!(body, "\n# Welcome\n");
    }

    #[test]
    fn handles_no_frontmatter() {
        let source = "# Just Markdown\n\nNo frontmatter here.";

        let (fm, body) = extract_frontmatter(source);

        assert!(fm.is_empty());
        assert_eq!(body, source);
    }

    #[test]
    fn unclosed_frontmatter_is_body() {
        let source = "---\ntitle: Test\n# No closing";

        let (fm, body) = extract_frontmatter(source);

        assert!(fm.is_empty());
        assert_eq!(body, source);
    }

    #[test]
    fn accepts_crlf_delimiters() {
        let source = "---\r\ntitle: Windows\r\n---\r\nBody\r\n";

        let (fm, body) = extract_frontmatter(source);

        assert_eq!(fm.title(), Some("Windows"));
        assert_eq!(body, "Body\r\n");
    }

    #[test]
    fn coerces_values() {
        assert_eq!(FieldValue::parse(" true "), FieldValue::Bool(true));
        assert_eq!(FieldValue::parse("false"), FieldValue::Bool(false));
        assert_eq!(
            FieldValue::parse("True"),
            FieldValue::String("True".to_string())
        );
        assert_eq!(
            FieldValue::parse("'single'"),
            FieldValue::String("single".to_string())
        );
        assert_eq!(
            FieldValue::parse(r#""double""#),
            FieldValue::String("double".to_string())
        );
        assert_eq!(
            FieldValue::parse(r#""mismatched'"#),
            FieldValue::String(r#""mismatched'"#.to_string())
        );
        assert_eq!(
            FieldValue::parse("[a, 'b' , \"c\"]"),
            FieldValue::List(vec!["a".into(), "b".into(), "c".into()])
        );
        assert_eq!(FieldValue::parse("[]"), FieldValue::List(vec![String::new()]));
    }

    #[test]
    fn keeps_unknown_keys_and_skips_lines_without_colon() {
        let (fm, _) = extract_frontmatter("---\nmood: sunny\njust a line\n---\nbody\n");

        assert_eq!(fm.len(), 1);
        assert_eq!(fm.str("mood"), Some("sunny"));
    }

    #[test]
    fn last_duplicate_wins() {
        let (fm, _) = extract_frontmatter("---\ntitle: One\ntitle: Two\n---\n");

        assert_eq!(fm.title(), Some("Two"));
    }

    #[test]
    fn value_keeps_text_after_first_colon() {
        let (fm, _) = extract_frontmatter("---\nurl: https://example.com/a\n---\n");

        assert_eq!(fm.url(), Some("https://example.com/a"));
    }

    #[test]
    fn defaults() {
        let fm = Frontmatter::default();

        assert_eq!(fm.kind(), "article");
        assert!(fm.publish());
        assert!(fm.tags().is_empty());
        assert_eq!(fm.summary(), "");
    }

    #[test]
    fn publish_false_and_scalar_tags() {
        let (fm, _) = extract_frontmatter("---\npublish: false\ntags: solo\nkind: Video\n---\n");

        assert!(!fm.publish());
        assert!(fm.tags().is_empty());
        assert_eq!(fm.kind(), "video");
    }

    #[test]
    fn serializes_as_plain_map() {
        let (fm, _) = extract_frontmatter("---\ndraft: true\ntags: [a]\n---\n");

        let json = serde_json::to_string(&fm).unwrap();

        assert_eq!(json, r#"{"draft":true,"tags":["a"]}"#);
    }
}
