//! Static site build command.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use quire_site::{BuildConfig, SiteBuilder, SiteInfo};
use serde::Deserialize;

/// Configuration file structure (quire.toml).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub build: BuildSettings,
    #[serde(default)]
    pub media: MediaConfig,
}

#[derive(Debug, Deserialize)]
pub struct SiteConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Absolute URL the site is published at
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub author: String,
}

#[derive(Debug, Deserialize)]
pub struct ContentConfig {
    #[serde(default = "default_content_dir")]
    pub dir: String,
}

#[derive(Debug, Deserialize)]
pub struct BuildSettings {
    #[serde(default = "default_output")]
    pub output: String,
    #[serde(default = "default_minify")]
    pub minify: bool,
    #[serde(default = "default_feed_limit")]
    pub feed_limit: usize,
}

#[derive(Debug, Deserialize)]
pub struct MediaConfig {
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            description: String::new(),
            url: default_url(),
            base_url: default_base_url(),
            language: default_language(),
            author: String::new(),
        }
    }
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            dir: default_content_dir(),
        }
    }
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            output: default_output(),
            minify: default_minify(),
            feed_limit: default_feed_limit(),
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            ffmpeg: default_ffmpeg(),
        }
    }
}

fn default_title() -> String {
    "Quire".to_string()
}
fn default_url() -> String {
    "http://localhost:4000".to_string()
}
fn default_base_url() -> String {
    "/".to_string()
}
fn default_language() -> String {
    "en-gb".to_string()
}
fn default_content_dir() -> String {
    "content".to_string()
}
fn default_output() -> String {
    "site".to_string()
}
fn default_minify() -> bool {
    true
}
fn default_feed_limit() -> usize {
    20
}
fn default_ffmpeg() -> String {
    "ffmpeg".to_string()
}

/// Load configuration from `path` if it exists.
/// Returns an error if the config file exists but is malformed.
pub fn load_config(path: &Path) -> Result<ConfigFile> {
    if !path.exists() {
        tracing::debug!("No {} found, using defaults", path.display());
        return Ok(ConfigFile::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    tracing::info!("Loaded config from {}", path.display());

    Ok(config)
}

/// Apply `CONTENT_DIR` and `FFMPEG_PATH` overrides.
pub fn apply_env(config: &mut ConfigFile, var: impl Fn(&str) -> Option<String>) {
    if let Some(dir) = var("CONTENT_DIR").filter(|v| !v.is_empty()) {
        config.content.dir = dir;
    }
    if let Some(ffmpeg) = var("FFMPEG_PATH").filter(|v| !v.is_empty()) {
        config.media.ffmpeg = ffmpeg;
    }
}

/// Merge the file config with command line overrides.
pub fn build_config(file: ConfigFile, output: Option<PathBuf>, minify: Option<bool>) -> BuildConfig {
    BuildConfig {
        content_dir: PathBuf::from(file.content.dir),
        output_dir: output.unwrap_or_else(|| PathBuf::from(file.build.output)),
        minify: minify.unwrap_or(file.build.minify),
        site: SiteInfo {
            title: file.site.title,
            description: file.site.description,
            url: file.site.url,
            base_url: file.site.base_url,
            language: file.site.language,
            author: file.site.author,
        },
        feed_limit: file.build.feed_limit,
        ffmpeg: PathBuf::from(file.media.ffmpeg),
    }
}

/// Run the build command.
pub async fn run(config_path: &Path, output: Option<PathBuf>, minify: Option<bool>) -> Result<()> {
    tracing::info!("Building site...");

    let mut file_config = load_config(config_path)?;
    apply_env(&mut file_config, |key| std::env::var(key).ok());

    let config = build_config(file_config, output, minify);
    let result = SiteBuilder::new(config)
        .build()
        .await
        .context("Build failed")?;

    tracing::info!(
        "Built {} items ({} articles, {} skipped) in {}ms",
        result.items,
        result.articles,
        result.skipped,
        result.duration_ms
    );

    tracing::info!("Output: {}", result.output_dir.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_uses_defaults() {
        let temp = tempdir().unwrap();

        let config = load_config(&temp.path().join("quire.toml")).unwrap();

        assert_eq!(config.content.dir, "content");
        assert_eq!(config.build.output, "site");
        assert!(config.build.minify);
        assert_eq!(config.build.feed_limit, 20);
        assert_eq!(config.site.language, "en-gb");
        assert_eq!(config.media.ffmpeg, "ffmpeg");
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("quire.toml");
        fs::write(&path, "[site]\ntitle = \"Notebook\"\n\n[build]\nminify = false\n").unwrap();

        let config = load_config(&path).unwrap();

        assert_eq!(config.site.title, "Notebook");
        assert_eq!(config.site.base_url, "/");
        assert!(!config.build.minify);
        assert_eq!(config.build.output, "site");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("quire.toml");
        fs::write(&path, "[site\ntitle = ").unwrap();

        assert!(load_config(&path).is_err());
    }

    #[test]
    fn env_overrides_file() {
        let mut config = ConfigFile::default();

        apply_env(&mut config, |key| match key {
            "CONTENT_DIR" => Some("notes".to_string()),
            "FFMPEG_PATH" => Some("/opt/bin/ffmpeg".to_string()),
            _ => None,
        });

        assert_eq!(config.content.dir, "notes");
        assert_eq!(config.media.ffmpeg, "/opt/bin/ffmpeg");
    }

    #[test]
    fn empty_env_is_ignored() {
        let mut config = ConfigFile::default();

        apply_env(&mut config, |_| Some(String::new()));

        assert_eq!(config.content.dir, "content");
    }

    #[test]
    fn flags_override_file() {
        let config = build_config(ConfigFile::default(), Some(PathBuf::from("public")), Some(false));

        assert_eq!(config.output_dir, PathBuf::from("public"));
        assert!(!config.minify);
        assert_eq!(config.content_dir, PathBuf::from("content"));
    }
}
