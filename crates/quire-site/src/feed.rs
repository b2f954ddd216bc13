//! RSS 2.0 feed of recent articles.

use rss::validation::Validate;
use rss::{CategoryBuilder, ChannelBuilder, GuidBuilder, ItemBuilder};

use crate::builder::SiteInfo;
use crate::content::{sort_by_date, ContentItem};
use crate::dates;

/// Errors from feed generation.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("RSS validation failed: {0}")]
    Validation(String),
}

/// Build `feed.xml` from the newest `limit` articles.
pub fn build_feed(site: &SiteInfo, items: &[ContentItem], limit: usize) -> Result<String, FeedError> {
    let site_url = site.url.trim_end_matches('/');

    let mut articles: Vec<&ContentItem> = items.iter().filter(|i| i.is_article()).collect();
    sort_by_date(&mut articles);

    let items: Vec<rss::Item> = articles
        .into_iter()
        .take(limit)
        .map(|item| feed_item(item, site_url))
        .collect();

    let channel = ChannelBuilder::default()
        .title(site.title.clone())
        .link(site_url.to_string())
        .description(site.description.clone())
        .language(Some(site.language.clone()))
        .last_build_date(Some(chrono::Utc::now().to_rfc2822()))
        .generator(Some("quire".to_string()))
        .items(items)
        .build();

    channel
        .validate()
        .map_err(|e| FeedError::Validation(e.to_string()))?;

    Ok(channel.to_string())
}

fn feed_item(item: &ContentItem, site_url: &str) -> rss::Item {
    let link = format!("{site_url}/posts/{}/", item.slug);

    let categories = item
        .tags
        .iter()
        .map(|tag| CategoryBuilder::default().name(tag.clone()).build())
        .collect::<Vec<_>>();

    ItemBuilder::default()
        .title(Some(item.title.clone()))
        .link(Some(link.clone()))
        .guid(Some(GuidBuilder::default().permalink(true).value(link).build()))
        .pub_date(dates::rfc2822(&item.date))
        .description(Some(item.summary.clone()))
        .categories(categories)
        .build()
}
