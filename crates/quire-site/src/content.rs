//! Content discovery and content items.

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use quire_markdown::{Document, Heading, Renderer};
use serde::Serialize;
use walkdir::WalkDir;

use crate::builder::BuildError;
use crate::dates;

/// Kind given to documents without a `kind` field.
pub const ARTICLE: &str = "article";

/// Files with this name are workspace notes, never content.
const IGNORED_FILE: &str = "claude.md";

/// Written into a missing content directory so a first build has something to show.
pub const SAMPLE_POST: &str = r#"---
title: Welcome to Quire
kind: article
date: 2026-01-01
tags: [welcome, intro]
summary: A first post to show what a quire site looks like.
publish: true
---

# Welcome

Hello and welcome to your new site!

## What to Expect

Posts are plain Markdown files with a small header:

- **Articles** get their own page, a contents sidebar and tags
- **Images**, **videos** and **music** appear in galleries
- Link between posts with [[Welcome to Quire|wikilinks]]

> [!TIP] Getting started
> Edit this file or add new ones next to it, then run `quire build`.

## Stay Tuned

More content coming soon.

---

*Thanks for visiting!*
"#;

/// A published source file.
#[derive(Debug, Clone)]
pub struct Source {
    pub path: PathBuf,
    pub document: Document,
}

impl Source {
    /// Title from frontmatter, else the file stem.
    pub fn title(&self) -> String {
        self.document
            .frontmatter
            .title()
            .map(str::to_string)
            .unwrap_or_else(|| {
                self.path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "Untitled".to_string())
            })
    }
}

/// Sources found under a content directory.
#[derive(Debug, Default)]
pub struct Discovered {
    pub sources: Vec<Source>,
    /// Unpublished or unreadable files
    pub skipped: usize,
}

/// Find every published `.md` file under `dir`, in path order.
///
/// A missing directory is created and seeded with [`SAMPLE_POST`].
pub fn discover(dir: &Path) -> Result<Discovered, BuildError> {
    if !dir.exists() {
        seed(dir)?;
    }

    let mut found = Discovered::default();

    for entry in WalkDir::new(dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if !path.is_file() || !is_content_file(path) {
            continue;
        }

        let source = match fs::read_to_string(path) {
            Ok(source) => source,
            Err(e) => {
                tracing::warn!("Skipping {}: {}", path.display(), e);
                found.skipped += 1;
                continue;
            }
        };

        let document = Document::parse(&source);

        if !document.frontmatter.publish() {
            tracing::debug!("Skipping unpublished {}", path.display());
            found.skipped += 1;
            continue;
        }

        found.sources.push(Source {
            path: path.to_path_buf(),
            document,
        });
    }

    Ok(found)
}

fn is_content_file(path: &Path) -> bool {
    let is_markdown = path.extension().is_some_and(|ext| ext == "md");
    let is_ignored = path
        .file_name()
        .is_some_and(|name| name.to_string_lossy().to_lowercase() == IGNORED_FILE);

    is_markdown && !is_ignored
}

/// Create `dir` with a sample post.
pub fn seed(dir: &Path) -> Result<(), BuildError> {
    tracing::info!(
        "Content directory {} not found, creating sample content",
        dir.display()
    );

    fs::create_dir_all(dir).map_err(|e| BuildError::WriteError(e.to_string()))?;
    fs::write(dir.join("welcome.md"), SAMPLE_POST)
        .map_err(|e| BuildError::WriteError(e.to_string()))?;

    Ok(())
}

/// One published piece of content, as written to `data/content.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub title: String,
    pub slug: String,
    pub kind: String,
    pub summary: String,
    pub tags: Vec<String>,
    pub thumbnail_url: String,
    /// The media file itself, falling back to the thumbnail
    pub drive_url: String,
    pub content_html: String,
    pub headings: Vec<Heading>,
    pub reading_time: usize,
    pub date: String,
    pub updated_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_path: Option<String>,
}

impl ContentItem {
    /// Build an item from a source, rendering the body of articles.
    ///
    /// Media URLs are left empty.
    pub fn from_source(source: &Source, renderer: &Renderer) -> Self {
        let fm = &source.document.frontmatter;
        let title = source.title();
        let slug = quire_markdown::slugify(&title);
        let kind = fm.kind();

        let (content_html, headings, reading_time, local_path) = if kind == ARTICLE {
            let rendered = source.document.render(renderer);
            (
                rendered.html,
                rendered.headings,
                rendered.reading_time,
                Some(format!("/posts/{slug}/")),
            )
        } else {
            (String::new(), Vec::new(), 1, None)
        };

        Self {
            slug,
            kind,
            summary: fm.summary().to_string(),
            tags: fm.tags(),
            thumbnail_url: String::new(),
            drive_url: String::new(),
            content_html,
            headings,
            reading_time,
            date: fm.date().map(str::to_string).unwrap_or_else(dates::today),
            updated_time: fm.date().map(str::to_string).unwrap_or_else(dates::now),
            local_path,
            title,
        }
    }

    /// Re-root the article page path under `base_url`, e.g. `/blog/`.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        if self.local_path.is_some() {
            self.local_path = Some(format!("{base_url}posts/{}/", self.slug));
        }
        self
    }

    pub fn is_article(&self) -> bool {
        self.kind == ARTICLE
    }

    /// Whether the thumbnail is a still image that can go in an `<img>`.
    pub fn has_image_thumbnail(&self) -> bool {
        is_image_url(&self.thumbnail_url)
    }
}

/// Whether `url` points at a still image.
pub fn is_image_url(url: &str) -> bool {
    const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

    Path::new(url)
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// Sort newest first by `updated_time`. Unparseable times sort last.
pub fn sort_by_updated(items: &mut [&ContentItem]) {
    items.sort_by_key(|item| Reverse(dates::parse(&item.updated_time)));
}

/// Sort newest first by `date`. Unparseable dates sort last.
pub fn sort_by_date(items: &mut [&ContentItem]) {
    items.sort_by_key(|item| Reverse(dates::parse(&item.date)));
}

/// Articles sharing a tag.
#[derive(Debug, Clone, Serialize)]
pub struct TagGroup<'a> {
    pub name: String,
    /// Anchor ID on the tags page
    pub id: String,
    pub count: usize,
    pub items: Vec<&'a ContentItem>,
}

/// Group articles by tag, most used first and then by name.
pub fn tag_groups(items: &[ContentItem]) -> Vec<TagGroup<'_>> {
    let mut by_tag: BTreeMap<&str, Vec<&ContentItem>> = BTreeMap::new();

    for item in items.iter().filter(|i| i.is_article()) {
        for tag in &item.tags {
            by_tag.entry(tag.as_str()).or_default().push(item);
        }
    }

    let mut groups: Vec<TagGroup<'_>> = by_tag
        .into_iter()
        .map(|(name, items)| TagGroup {
            name: name.to_string(),
            id: quire_markdown::slugify(name),
            count: items.len(),
            items,
        })
        .collect();

    groups.sort_by_key(|group| Reverse(group.count));
    groups
}
