//! Static site builder.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use quire_markdown::Renderer;
use rayon::prelude::*;
use serde::Serialize;

use crate::assets::AssetPipeline;
use crate::content::{self, ContentItem};
use crate::feed::{build_feed, FeedError};
use crate::media::MediaProcessor;
use crate::templates::{TemplateEngine, GALLERIES};

/// Site-wide metadata shown in pages and the feed.
#[derive(Debug, Clone, Serialize)]
pub struct SiteInfo {
    pub title: String,
    pub description: String,

    /// Absolute site URL used for feed links
    pub url: String,

    /// Path prefix the site is served under, with leading and trailing `/`
    pub base_url: String,

    pub language: String,
    pub author: String,
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            title: "Quire".to_string(),
            description: String::new(),
            url: "http://localhost:4000".to_string(),
            base_url: "/".to_string(),
            language: "en-gb".to_string(),
            author: String::new(),
        }
    }
}

/// Configuration for building a site.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Source content directory
    pub content_dir: PathBuf,

    /// Output directory
    pub output_dir: PathBuf,

    /// Minify CSS output
    pub minify: bool,

    pub site: SiteInfo,

    /// Number of articles in `feed.xml`
    pub feed_limit: usize,

    /// Path to the ffmpeg binary
    pub ffmpeg: PathBuf,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from("content"),
            output_dir: PathBuf::from("site"),
            minify: true,
            site: SiteInfo::default(),
            feed_limit: 20,
            ffmpeg: PathBuf::from("ffmpeg"),
        }
    }
}

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildResult {
    /// Number of published content items
    pub items: usize,

    /// Number of article pages generated
    pub articles: usize,

    /// Unpublished or unreadable source files
    pub skipped: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

/// Errors that can occur during build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Failed to read content: {0}")]
    ReadError(String),

    #[error("Failed to render template: {0}")]
    TemplateError(String),

    #[error("Failed to write output: {0}")]
    WriteError(String),

    #[error(transparent)]
    Feed(#[from] FeedError),
}

/// Ensure a base URL starts and ends with `/`.
pub fn normalize_base_url(base_url: &str) -> String {
    let trimmed = base_url.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}/")
    }
}

/// Static site builder.
pub struct SiteBuilder {
    config: BuildConfig,
    renderer: Renderer,
    templates: TemplateEngine,
    media: MediaProcessor,
}

impl SiteBuilder {
    /// Create a new site builder.
    pub fn new(mut config: BuildConfig) -> Self {
        config.site.base_url = normalize_base_url(&config.site.base_url);

        let renderer =
            Renderer::new().with_wikilink_base(format!("{}posts/", config.site.base_url));
        let templates = TemplateEngine::new(config.site.clone());
        let media = MediaProcessor::new(
            &config.content_dir,
            &config.output_dir,
            &config.site.base_url,
            &config.ffmpeg,
        );

        Self {
            config,
            renderer,
            templates,
            media,
        }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Build the site.
    pub async fn build(&self) -> Result<BuildResult, BuildError> {
        let start = Instant::now();

        fs::create_dir_all(&self.config.output_dir)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        let discovered = content::discover(&self.config.content_dir)?;
        tracing::info!(
            "Found {} documents in {}",
            discovered.sources.len(),
            self.config.content_dir.display()
        );

        // Rendering is pure, so documents are processed in parallel
        let mut items: Vec<ContentItem> = discovered
            .sources
            .par_iter()
            .map(|source| {
                let item = ContentItem::from_source(source, &self.renderer)
                    .with_base_url(&self.config.site.base_url);
                tracing::debug!("Processed {} ({})", item.title, item.kind);
                item
            })
            .collect();

        // Media touches the output dir and runs external tools, one at a time
        for (item, source) in items.iter_mut().zip(&discovered.sources) {
            self.media.attach(item, &source.document.frontmatter);
        }

        let articles = self.write_articles(&items)?;
        self.write_listings(&items)?;
        self.generate_assets()?;
        self.generate_feed(&items)?;
        self.generate_data(&items)?;

        let duration = start.elapsed();

        Ok(BuildResult {
            items: items.len(),
            articles,
            skipped: discovered.skipped,
            duration_ms: duration.as_millis() as u64,
            output_dir: self.config.output_dir.clone(),
        })
    }

    /// Write one page per article.
    fn write_articles(&self, items: &[ContentItem]) -> Result<usize, BuildError> {
        let results: Vec<Result<(), BuildError>> = items
            .par_iter()
            .filter(|item| item.is_article())
            .map(|item| {
                let html = self
                    .templates
                    .render_article(item)
                    .map_err(|e| BuildError::TemplateError(e.to_string()))?;
                self.write_page(&Path::new("posts").join(&item.slug), html)
            })
            .collect();

        let mut written = 0;
        for result in results {
            result?;
            written += 1;
        }

        Ok(written)
    }

    /// Home, posts, tags and gallery pages.
    fn write_listings(&self, items: &[ContentItem]) -> Result<(), BuildError> {
        let template_error = |e: minijinja::Error| BuildError::TemplateError(e.to_string());

        let mut newest: Vec<&ContentItem> = items.iter().collect();
        content::sort_by_updated(&mut newest);
        self.write_page(
            Path::new(""),
            self.templates.render_home(&newest).map_err(template_error)?,
        )?;

        let mut articles: Vec<&ContentItem> = items.iter().filter(|i| i.is_article()).collect();
        content::sort_by_date(&mut articles);
        self.write_page(
            Path::new("posts"),
            self.templates
                .render_posts(&articles)
                .map_err(template_error)?,
        )?;

        let groups = content::tag_groups(items);
        self.write_page(
            Path::new("tags"),
            self.templates.render_tags(&groups).map_err(template_error)?,
        )?;

        for gallery in &GALLERIES {
            let entries: Vec<&ContentItem> = newest
                .iter()
                .copied()
                .filter(|i| i.kind == gallery.kind)
                .collect();
            self.write_page(
                Path::new(gallery.dir),
                self.templates
                    .render_gallery(gallery, &entries)
                    .map_err(template_error)?,
            )?;
        }

        Ok(())
    }

    /// Write `index.html` under `dir`, relative to the output directory.
    fn write_page(&self, dir: &Path, html: String) -> Result<(), BuildError> {
        let dir = self.config.output_dir.join(dir);
        fs::create_dir_all(&dir).map_err(|e| BuildError::WriteError(e.to_string()))?;
        fs::write(dir.join("index.html"), html).map_err(|e| BuildError::WriteError(e.to_string()))
    }

    /// Generate static assets.
    fn generate_assets(&self) -> Result<(), BuildError> {
        let css = AssetPipeline::generate_css();
        let css = if self.config.minify {
            AssetPipeline::minify_css(&css).unwrap_or_else(|e| {
                tracing::warn!("Serving unminified CSS: {}", e);
                css
            })
        } else {
            css
        };

        fs::write(self.config.output_dir.join("styles.css"), css)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;
        fs::write(
            self.config.output_dir.join("app.js"),
            AssetPipeline::generate_js(),
        )
        .map_err(|e| BuildError::WriteError(e.to_string()))?;

        Ok(())
    }

    /// Generate `feed.xml`.
    fn generate_feed(&self, items: &[ContentItem]) -> Result<(), BuildError> {
        let xml = build_feed(&self.config.site, items, self.config.feed_limit)?;

        fs::write(self.config.output_dir.join("feed.xml"), xml)
            .map_err(|e| BuildError::WriteError(e.to_string()))
    }

    /// Generate `data/content.json`.
    fn generate_data(&self, items: &[ContentItem]) -> Result<(), BuildError> {
        let json = serde_json::to_string_pretty(&serde_json::json!({ "items": items }))
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        let data_dir = self.config.output_dir.join("data");
        fs::create_dir_all(&data_dir).map_err(|e| BuildError::WriteError(e.to_string()))?;
        fs::write(data_dir.join("content.json"), json)
            .map_err(|e| BuildError::WriteError(e.to_string()))
    }
}
