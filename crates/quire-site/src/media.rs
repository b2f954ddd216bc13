//! Media copying, video thumbnails and audio waveforms.
//!
//! Thumbnails and waveforms are made by an external `ffmpeg` binary. Every
//! failure here is absorbed: the item simply ends up without media URLs.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use quire_markdown::Frontmatter;

use crate::content::ContentItem;

/// Directory under the output root that media is copied into.
pub const MEDIA_DIR: &str = "media";

const VIDEO_EXTENSIONS: [&str; 3] = ["mp4", "webm", "mov"];
const AUDIO_EXTENSIONS: [&str; 4] = ["mp3", "wav", "ogg", "m4a"];

/// Errors from media handling.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("Media file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to copy {path}: {source}")]
    Copy {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to run {tool}: {source}")]
    Spawn {
        tool: String,
        source: std::io::Error,
    },

    #[error("{tool} exited with {status}")]
    ToolFailed { tool: String, status: String },
}

/// Public URLs for an item's media.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaUrls {
    pub media_url: String,
    pub thumbnail_url: String,
}

/// Copies media next to the generated site and derives preview images.
#[derive(Debug, Clone)]
pub struct MediaProcessor {
    content_dir: PathBuf,
    output_dir: PathBuf,
    base_url: String,
    ffmpeg: PathBuf,
}

impl MediaProcessor {
    pub fn new(
        content_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        base_url: impl Into<String>,
        ffmpeg: impl Into<PathBuf>,
    ) -> Self {
        Self {
            content_dir: content_dir.into(),
            output_dir: output_dir.into(),
            base_url: base_url.into(),
            ffmpeg: ffmpeg.into(),
        }
    }

    /// Resolve `image` and `url` frontmatter into URLs on `item`.
    pub fn attach(&self, item: &mut ContentItem, frontmatter: &Frontmatter) {
        let mut urls = MediaUrls::default();

        if let Some(image) = frontmatter.image() {
            urls = self
                .copy(&self.content_dir.join(image), &item.slug, "image")
                .unwrap_or_else(|e| {
                    tracing::warn!("{}: {}", item.title, e);
                    MediaUrls::default()
                });
        }

        if let Some(url) = frontmatter.url() {
            if item.kind == "video" || item.kind == "music" {
                match self.resolve_url(url, &item.slug, &item.kind) {
                    Ok(resolved) => {
                        urls.media_url = resolved.media_url;
                        if !resolved.thumbnail_url.is_empty() {
                            urls.thumbnail_url = resolved.thumbnail_url;
                        }
                    }
                    Err(e) => tracing::warn!("{}: {}", item.title, e),
                }
            }
        }

        item.drive_url = if urls.media_url.is_empty() {
            urls.thumbnail_url.clone()
        } else {
            urls.media_url
        };
        item.thumbnail_url = urls.thumbnail_url;
    }

    fn resolve_url(&self, url: &str, slug: &str, kind: &str) -> Result<MediaUrls, MediaError> {
        if url.starts_with("http://") || url.starts_with("https://") {
            return Ok(MediaUrls {
                media_url: url.to_string(),
                thumbnail_url: String::new(),
            });
        }

        if url.starts_with('/') {
            let deployed = self.deployed_path(url);
            if !deployed.exists() {
                return Err(MediaError::NotFound(deployed));
            }
            return Ok(MediaUrls {
                media_url: url.to_string(),
                thumbnail_url: self.preview(&deployed, slug, kind).unwrap_or_default(),
            });
        }

        self.copy(&self.content_dir.join(url), slug, kind)
    }

    /// Where an already-deployed `/...` URL lives under the output directory.
    fn deployed_path(&self, url: &str) -> PathBuf {
        let relative = url
            .strip_prefix(self.base_url.as_str())
            .unwrap_or(url)
            .trim_start_matches('/');
        self.output_dir.join(relative)
    }

    /// Copy `src` into the media directory as `<slug><ext>`.
    pub fn copy(&self, src: &Path, slug: &str, kind: &str) -> Result<MediaUrls, MediaError> {
        if !src.is_file() {
            return Err(MediaError::NotFound(src.to_path_buf()));
        }

        let ext = extension(src);
        let filename = if ext.is_empty() {
            slug.to_string()
        } else {
            format!("{slug}.{ext}")
        };

        let media_dir = self.output_dir.join(MEDIA_DIR);
        let dest = media_dir.join(&filename);

        fs::create_dir_all(&media_dir)
            .and_then(|_| fs::copy(src, &dest))
            .map_err(|source| MediaError::Copy {
                path: src.to_path_buf(),
                source,
            })?;
        tracing::debug!("Copied {}", filename);

        let media_url = self.url_for(&filename);
        let thumbnail_url = if kind == "image" {
            media_url.clone()
        } else {
            self.preview(&dest, slug, kind).unwrap_or_default()
        };

        Ok(MediaUrls {
            media_url,
            thumbnail_url,
        })
    }

    /// Make a thumbnail or waveform for `src`, returning its URL.
    fn preview(&self, src: &Path, slug: &str, kind: &str) -> Option<String> {
        let ext = extension(src);
        fs::create_dir_all(self.output_dir.join(MEDIA_DIR)).ok()?;

        let filename = match kind {
            "video" if VIDEO_EXTENSIONS.contains(&ext.as_str()) => {
                let filename = format!("{slug}-thumb.jpg");
                self.video_thumbnail(src, &self.media_path(&filename)).ok()?;
                filename
            }
            "music" if AUDIO_EXTENSIONS.contains(&ext.as_str()) => {
                let filename = format!("{slug}-waveform.png");
                self.waveform(src, &self.media_path(&filename)).ok()?;
                filename
            }
            _ => return None,
        };

        Some(self.url_for(&filename))
    }

    /// Grab a frame at one second, falling back to the first frame.
    pub fn video_thumbnail(&self, src: &Path, dest: &Path) -> Result<(), MediaError> {
        let at_one_second = self.ffmpeg(|cmd| {
            cmd.arg("-y")
                .arg("-i")
                .arg(src)
                .args(["-ss", "00:00:01", "-vframes", "1", "-vf", "scale=640:-1"])
                .arg(dest)
        });

        if at_one_second.is_ok() {
            tracing::debug!("Generated thumbnail {}", dest.display());
            return Ok(());
        }

        self.ffmpeg(|cmd| {
            cmd.arg("-y")
                .arg("-i")
                .arg(src)
                .args(["-vframes", "1", "-vf", "scale=640:-1"])
                .arg(dest)
        })
        .inspect(|_| tracing::debug!("Generated thumbnail (first frame) {}", dest.display()))
        .inspect_err(|e| tracing::warn!("Could not generate thumbnail: {}", e))
    }

    /// Render the audio waveform as a PNG.
    pub fn waveform(&self, src: &Path, dest: &Path) -> Result<(), MediaError> {
        self.ffmpeg(|cmd| {
            cmd.arg("-y")
                .arg("-i")
                .arg(src)
                .args([
                    "-filter_complex",
                    "showwavespic=s=640x200:colors=#4f46e5|#818cf8",
                    "-frames:v",
                    "1",
                ])
                .arg(dest)
        })
        .inspect(|_| tracing::debug!("Generated waveform {}", dest.display()))
        .inspect_err(|e| tracing::warn!("Could not generate waveform: {}", e))
    }

    fn ffmpeg(
        &self,
        configure: impl FnOnce(&mut Command) -> &mut Command,
    ) -> Result<(), MediaError> {
        let tool = self.ffmpeg.display().to_string();

        let mut cmd = Command::new(&self.ffmpeg);
        configure(&mut cmd);

        let status = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|source| MediaError::Spawn {
                tool: tool.clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(MediaError::ToolFailed {
                tool,
                status: status.to_string(),
            })
        }
    }

    fn media_path(&self, filename: &str) -> PathBuf {
        self.output_dir.join(MEDIA_DIR).join(filename)
    }

    fn url_for(&self, filename: &str) -> String {
        format!("{}{}/{}", self.base_url, MEDIA_DIR, filename)
    }
}

fn extension(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}
