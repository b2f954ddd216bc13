//! Static blog builder for quire content folders.
//!
//! Turns a directory of Markdown files into a browsable site: article pages,
//! listing and gallery pages, an RSS feed and a JSON content index.

pub mod assets;
pub mod builder;
pub mod content;
pub mod dates;
pub mod feed;
pub mod media;
pub mod templates;

pub use builder::{normalize_base_url, BuildConfig, BuildError, BuildResult, SiteBuilder, SiteInfo};
pub use content::{ContentItem, Source, TagGroup, SAMPLE_POST};
pub use feed::{build_feed, FeedError};
pub use media::{MediaError, MediaProcessor, MediaUrls};
pub use templates::TemplateEngine;
