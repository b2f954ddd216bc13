//! Initialize a quire blog in the current directory.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use quire_site::SAMPLE_POST;

use super::build::load_config;

/// Run the init command.
pub async fn run(config_path: &Path, yes: bool) -> Result<()> {
    tracing::info!("Initializing quire...");

    if config_path.exists() && !yes {
        anyhow::bail!(
            "{} already exists. Use --yes to overwrite.",
            config_path.display()
        );
    }

    fs::write(config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    tracing::info!("Created {}", config_path.display());

    let content_dir = Path::new(&load_config(config_path)?.content.dir).to_path_buf();
    write_sample(&content_dir, yes)?;

    tracing::info!("Initialization complete!");
    tracing::info!("Run 'quire build' then 'quire serve' to preview your blog.");

    Ok(())
}

/// Write the sample post into `content_dir`, keeping an existing one unless `overwrite`.
fn write_sample(content_dir: &Path, overwrite: bool) -> Result<()> {
    fs::create_dir_all(content_dir).context("Failed to create content directory")?;

    let sample = content_dir.join("welcome.md");
    if sample.exists() && !overwrite {
        tracing::warn!("{} already exists, leaving it alone", sample.display());
        return Ok(());
    }

    fs::write(&sample, SAMPLE_POST).context("Failed to write welcome.md")?;
    tracing::info!("Created {}", sample.display());

    Ok(())
}

const DEFAULT_CONFIG: &str = r#"# Quire configuration

[site]
title = "My Blog"
description = "Notes and things"
# Absolute URL used for feed links
url = "http://localhost:4000"
# Path prefix when the site is not served from the domain root
base_url = "/"
language = "en-gb"
author = ""

[content]
dir = "content"

[build]
output = "site"
minify = true
feed_limit = 20

[media]
ffmpeg = "ffmpeg"
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_config_parses() {
        let config: crate::commands::build::ConfigFile = toml::from_str(DEFAULT_CONFIG).unwrap();

        assert_eq!(config.site.title, "My Blog");
        assert_eq!(config.content.dir, "content");
        assert_eq!(config.build.feed_limit, 20);
    }

    #[test]
    fn writes_sample_post() {
        let temp = tempdir().unwrap();
        let dir = temp.path().join("content");

        write_sample(&dir, false).unwrap();

        assert_eq!(fs::read_to_string(dir.join("welcome.md")).unwrap(), SAMPLE_POST);
    }

    #[test]
    fn keeps_existing_sample_without_overwrite() {
        let temp = tempdir().unwrap();
        let dir = temp.path();
        fs::write(dir.join("welcome.md"), "mine").unwrap();

        write_sample(dir, false).unwrap();
        assert_eq!(fs::read_to_string(dir.join("welcome.md")).unwrap(), "mine");

        write_sample(dir, true).unwrap();
        assert_eq!(fs::read_to_string(dir.join("welcome.md")).unwrap(), SAMPLE_POST);
    }

    #[tokio::test]
    async fn refuses_to_overwrite_config() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("quire.toml");
        fs::write(&path, "# existing").unwrap();

        assert!(run(&path, false).await.is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "# existing");
    }
}
