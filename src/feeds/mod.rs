//! Publication feeds: Medium (via rss2json) and DEV.to.
//!
//! Both sources are fetched concurrently and fail independently. The merged
//! list is newest-first; the section only fails when no source produced a
//! single usable article.

pub mod devto;
pub mod html;
pub mod medium;
pub mod refresher;

use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::FeedsConfig;

/// Articles shown per step of the "Show more" button.
pub const PAGE_SIZE: usize = 4;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("upstream error: {0}")]
    Upstream(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    Medium,
    #[serde(rename = "DEV.to")]
    DevTo,
}

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::Medium, Platform::DevTo];

    pub fn label(self) -> &'static str {
        match self {
            Platform::Medium => "Medium",
            Platform::DevTo => "DEV.to",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.label().eq_ignore_ascii_case(label.trim()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub link: String,
    pub pub_date: DateTime<Utc>,
    pub description: String,
    pub platform: Platform,
    /// Empty when the source had no image.
    pub thumbnail: String,
}

/// RFC 3339, or the `YYYY-MM-DD HH:MM:SS` form rss2json emits (taken as UTC).
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

// ── State ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "status", content = "articles", rename_all = "lowercase")]
pub enum FeedState {
    #[default]
    Loading,
    Succeeded(Vec<Article>),
    Failed,
}

/// One platform tab of the publications section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedPage {
    pub platform: Platform,
    pub articles: Vec<Article>,
    /// Articles on this platform in total.
    pub total: usize,
    pub has_more: bool,
    /// `visible` value for the next "Show more" step.
    pub next_visible: usize,
}

impl FeedState {
    pub fn status(&self) -> &'static str {
        match self {
            FeedState::Loading => "loading",
            FeedState::Succeeded(_) => "succeeded",
            FeedState::Failed => "failed",
        }
    }

    /// The first `visible` articles from `platform`. Empty unless succeeded.
    pub fn page(&self, platform: Platform, visible: usize) -> FeedPage {
        let on_platform: Vec<&Article> = match self {
            FeedState::Succeeded(all) => all.iter().filter(|a| a.platform == platform).collect(),
            _ => Vec::new(),
        };
        let total = on_platform.len();
        // `visible` comes straight from the query string.
        let visible = visible.clamp(1, total.max(1));
        FeedPage {
            platform,
            articles: on_platform.into_iter().take(visible).cloned().collect(),
            total,
            has_more: visible < total,
            next_visible: visible.saturating_add(PAGE_SIZE),
        }
    }
}

/// Merge both source results into the section state.
pub fn aggregate(
    medium: Result<Vec<Article>, FeedError>,
    devto: Result<Vec<Article>, FeedError>,
) -> FeedState {
    let mut articles = Vec::new();
    for (platform, result) in [(Platform::Medium, medium), (Platform::DevTo, devto)] {
        match result {
            Ok(mut items) => {
                debug!(platform = platform.label(), count = items.len(), "feed fetched");
                articles.append(&mut items);
            }
            Err(e) => warn!(platform = platform.label(), error = %e, "feed unavailable"),
        }
    }
    if articles.is_empty() {
        return FeedState::Failed;
    }
    articles.sort_by(|a, b| b.pub_date.cmp(&a.pub_date));
    FeedState::Succeeded(articles)
}

// ── Fetching ──────────────────────────────────────────────────────────────────

pub(crate) fn http_client(timeout_seconds: u64) -> Result<Client, FeedError> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .user_agent(concat!("folio/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

/// GET `url` and return the body of a 2xx response.
pub(crate) async fn get_text(client: &Client, url: &str) -> Result<String, FeedError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(FeedError::Status(status.as_u16()));
    }
    Ok(response.text().await?)
}

/// Fetches both publication sources.
#[derive(Debug, Clone)]
pub struct FeedAggregator {
    client: Client,
    medium_url: String,
    devto_url: String,
}

impl FeedAggregator {
    pub fn new(config: &FeedsConfig) -> Result<Self, FeedError> {
        Ok(Self {
            client: http_client(config.timeout_seconds)?,
            medium_url: config.medium_endpoint(),
            devto_url: config.devto_endpoint(),
        })
    }

    pub async fn fetch_medium(&self) -> Result<Vec<Article>, FeedError> {
        medium::parse(&get_text(&self.client, &self.medium_url).await?)
    }

    pub async fn fetch_devto(&self) -> Result<Vec<Article>, FeedError> {
        devto::parse(&get_text(&self.client, &self.devto_url).await?)
    }

    /// Fetch both sources concurrently and merge them.
    pub async fn fetch_all(&self) -> FeedState {
        let (medium, devto) = tokio::join!(self.fetch_medium(), self.fetch_devto());
        let state = aggregate(medium, devto);
        match &state {
            FeedState::Succeeded(a) => info!(articles = a.len(), "publications refreshed"),
            _ => warn!("no publications could be loaded"),
        }
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn article(title: &str, platform: Platform, day: u32) -> Article {
        Article {
            title: title.into(),
            link: format!("https://x/{title}"),
            pub_date: Utc.with_ymd_and_hms(2025, 1, day, 0, 0, 0).unwrap(),
            description: String::new(),
            platform,
            thumbnail: String::new(),
        }
    }

    #[test]
    fn parse_date_forms() {
        assert!(parse_date("2025-03-01T08:30:00Z").is_some());
        assert!(parse_date("2025-03-01T08:30:00+02:00").is_some());
        assert_eq!(
            parse_date("2025-03-01 08:30:00"),
            Some(Utc.with_ymd_and_hms(2025, 3, 1, 8, 30, 0).unwrap())
        );
        assert!(parse_date("").is_none());
        assert!(parse_date("March 1st").is_none());
    }

    #[test]
    fn merge_sorts_newest_first() {
        let state = aggregate(
            Ok(vec![article("m1", Platform::Medium, 3), article("m2", Platform::Medium, 1)]),
            Ok(vec![article("d1", Platform::DevTo, 2)]),
        );
        let FeedState::Succeeded(all) = state else { panic!("expected success") };
        let titles: Vec<&str> = all.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["m1", "d1", "m2"]);
    }

    #[test]
    fn one_source_failing_still_succeeds() {
        let state = aggregate(Err(FeedError::Status(500)), Ok(vec![article("d1", Platform::DevTo, 2)]));
        assert_eq!(state.status(), "succeeded");
    }

    #[test]
    fn nothing_usable_is_failed() {
        assert_eq!(aggregate(Err(FeedError::Status(500)), Ok(vec![])), FeedState::Failed);
        assert_eq!(aggregate(Ok(vec![]), Ok(vec![])), FeedState::Failed);
    }

    #[test]
    fn page_shows_four_then_more() {
        let items: Vec<Article> = (1..=6).map(|d| article(&format!("m{d}"), Platform::Medium, d)).collect();
        let state = aggregate(Ok(items), Ok(vec![]));

        let first = state.page(Platform::Medium, PAGE_SIZE);
        assert_eq!(first.articles.len(), 4);
        assert_eq!(first.total, 6);
        assert!(first.has_more);
        assert_eq!(first.next_visible, 8);

        let second = state.page(Platform::Medium, first.next_visible);
        assert_eq!(second.articles.len(), 6);
        assert!(!second.has_more);

        let other = state.page(Platform::DevTo, PAGE_SIZE);
        assert!(other.articles.is_empty());
        assert!(!other.has_more);
    }

    #[test]
    fn oversized_visible_is_clamped_to_total() {
        let items: Vec<Article> = (1..=6).map(|d| article(&format!("m{d}"), Platform::Medium, d)).collect();
        let state = aggregate(Ok(items), Ok(vec![]));
        let page = state.page(Platform::Medium, usize::MAX);
        assert_eq!(page.articles.len(), 6);
        assert!(!page.has_more);
        assert_eq!(page.next_visible, 6 + PAGE_SIZE);

        let empty = FeedState::Succeeded(vec![]).page(Platform::Medium, usize::MAX);
        assert!(empty.articles.is_empty());
        assert_eq!(empty.next_visible, 1 + PAGE_SIZE);
    }

    #[test]
    fn loading_page_is_empty() {
        let page = FeedState::Loading.page(Platform::Medium, 4);
        assert_eq!(page.total, 0);
    }

    #[test]
    fn platform_labels() {
        assert_eq!(Platform::from_label("dev.to"), Some(Platform::DevTo));
        assert_eq!(serde_json::to_string(&Platform::DevTo).unwrap(), "\"DEV.to\"");
    }

    #[test]
    fn state_serializes_with_status_tag() {
        let json = serde_json::to_value(FeedState::Failed).unwrap();
        assert_eq!(json["status"], "failed");
    }
}
