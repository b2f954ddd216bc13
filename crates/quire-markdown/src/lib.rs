//! Markdown rendering for quire.
//!
//! A small, line-oriented Markdown dialect rendered by ordered string passes:
//! fenced code, tables, headings, callouts, blockquotes, rules, lists, inline
//! emphasis and Obsidian-style wikilinks. Documents carry a restricted
//! `key: value` frontmatter header.

pub mod blocks;
pub mod codeblock;
pub mod document;
pub mod frontmatter;
pub mod inline;
pub mod render;
pub mod text;
pub mod toc;

pub use codeblock::{CodeBlock, CodeBlocks};
pub use document::{Document, RenderedDoc};
pub use frontmatter::{extract_frontmatter, FieldValue, Frontmatter};
pub use inline::wiki_slug;
pub use render::{render, Renderer, DEFAULT_WIKILINK_BASE};
pub use text::{escape_html, escape_html_opt, slugify, strip_tags, unescape_html};
pub use toc::{extract_headings, reading_time, Heading};
