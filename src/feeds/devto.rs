//! DEV.to articles from the public API.

use serde::Deserialize;
use tracing::debug;

use super::{parse_date, Article, FeedError, Platform};

#[derive(Debug, Deserialize)]
struct Item {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    published_at: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    cover_image: Option<String>,
}

pub fn parse(body: &str) -> Result<Vec<Article>, FeedError> {
    let items: Vec<Item> =
        serde_json::from_str(body).map_err(|e| FeedError::Decode(format!("dev.to: {e}")))?;
    Ok(items
        .into_iter()
        .filter_map(|item| {
            let Some(pub_date) = parse_date(&item.published_at) else {
                debug!(title = %item.title, "dev.to: unusable date, skipped");
                return None;
            };
            Some(Article {
                title: item.title,
                link: item.url,
                pub_date,
                description: item.description.unwrap_or_default(),
                platform: Platform::DevTo,
                thumbnail: item.cover_image.unwrap_or_default(),
            })
        })
        .collect())
}
