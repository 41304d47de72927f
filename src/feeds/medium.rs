//! Medium posts via the rss2json proxy.

use serde::Deserialize;
use tracing::debug;

use super::{html, parse_date, Article, FeedError, Platform};

const SNIPPET_CHARS: usize = 120;

#[derive(Debug, Deserialize)]
struct Rss2Json {
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    items: Option<Vec<Item>>,
}

#[derive(Debug, Deserialize)]
struct Item {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(rename = "pubDate", default)]
    pub_date: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    thumbnail: String,
}

/// Decode an rss2json response body into articles.
pub fn parse(body: &str) -> Result<Vec<Article>, FeedError> {
    let feed: Rss2Json =
        serde_json::from_str(body).map_err(|e| FeedError::Decode(format!("medium: {e}")))?;
    if feed.status != "ok" {
        return Err(FeedError::Upstream(format!(
            "medium: status {:?}{}",
            feed.status,
            feed.message.map(|m| format!(": {m}")).unwrap_or_default()
        )));
    }
    let items = feed
        .items
        .ok_or_else(|| FeedError::Upstream("medium: response has no items".into()))?;

    Ok(items
        .into_iter()
        .filter_map(|item| {
            let Some(pub_date) = parse_date(&item.pub_date) else {
                debug!(title = %item.title, date = %item.pub_date, "medium: unusable date, skipped");
                return None;
            };
            let thumbnail = if item.thumbnail.trim().is_empty() {
                html::first_image(&item.content)
                    .or_else(|| html::first_image(&item.description))
                    .unwrap_or_default()
            } else {
                item.thumbnail
            };
            Some(Article {
                title: item.title,
                link: item.link,
                pub_date,
                description: html::snippet(&item.content, SNIPPET_CHARS),
                platform: Platform::Medium,
                thumbnail,
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
        "status": "ok",
        "items": [
            {
                "title": "Scaling Go",
                "link": "https://medium.com/@jdoe/scaling-go",
                "pubDate": "2025-02-03 10:00:00",
                "content": "<figure><img src=\"https://cdn/go.png\"></figure><p>Goroutines &amp; channels.</p>",
                "description": "",
                "thumbnail": ""
            },
            {
                "title": "Broken date",
                "link": "https://medium.com/@jdoe/broken",
                "pubDate": "yesterday",
                "content": "<p>x</p>",
                "thumbnail": "https://cdn/t.png"
            }
        ]
    }"#;

    #[test]
    fn parses_items_with_thumbnail_fallback() {
        let articles = parse(BODY).unwrap();
        assert_eq!(articles.len(), 1);
        let a = &articles[0];
        assert_eq!(a.title, "Scaling Go");
        assert_eq!(a.platform, Platform::Medium);
        assert_eq!(a.thumbnail, "https://cdn/go.png");
        assert_eq!(a.description, "Goroutines & channels.");
        assert_eq!(a.pub_date.to_rfc3339(), "2025-02-03T10:00:00+00:00");
    }

    #[test]
    fn description_fallback_for_thumbnail() {
        let body = r#"{"status":"ok","items":[{"title":"t","link":"l","pubDate":"2025-01-01 00:00:00",
            "content":"<p>no image</p>","description":"<img src='https://cdn/d.png'>","thumbnail":" "}]}"#;
        assert_eq!(parse(body).unwrap()[0].thumbnail, "https://cdn/d.png");
    }

    #[test]
    fn non_ok_status_is_upstream_error() {
        let err = parse(r#"{"status":"error","message":"Cannot load feed"}"#).unwrap_err();
        assert!(matches!(err, FeedError::Upstream(_)));
        assert!(err.to_string().contains("Cannot load feed"));
    }

    #[test]
    fn missing_items_is_upstream_error() {
        assert!(matches!(parse(r#"{"status":"ok"}"#), Err(FeedError::Upstream(_))));
    }

    #[test]
    fn garbage_is_decode_error() {
        assert!(matches!(parse("<html>"), Err(FeedError::Decode(_))));
    }
}
