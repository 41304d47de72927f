//! Commit-activity calendar from a public contributions API.
//!
//! Expected body: `{ "total": { "<year>|lastYear": n, ... },
//! "contributions": [{ "date", "count", "level" }] }`.

use std::collections::BTreeMap;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::ActivityConfig;
use crate::feeds::{get_text, http_client, FeedError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Day {
    /// `YYYY-MM-DD`
    pub date: String,
    pub count: u32,
    /// Intensity bucket, 0 (none) to 4.
    pub level: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calendar {
    #[serde(default)]
    pub total: BTreeMap<String, u32>,
    #[serde(default)]
    pub contributions: Vec<Day>,
}

impl Calendar {
    /// Sum over the returned days.
    pub fn total_count(&self) -> u32 {
        self.contributions.iter().map(|d| d.count).sum()
    }

    pub fn days(&self) -> &[Day] {
        &self.contributions
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "status", content = "calendar", rename_all = "lowercase")]
pub enum ActivityState {
    #[default]
    Loading,
    Succeeded(Calendar),
    Failed,
}

pub fn parse(body: &str) -> Result<Calendar, FeedError> {
    let mut calendar: Calendar =
        serde_json::from_str(body).map_err(|e| FeedError::Decode(format!("activity: {e}")))?;
    for day in &mut calendar.contributions {
        day.level = day.level.min(4);
    }
    Ok(calendar)
}

#[derive(Debug, Clone)]
pub struct ActivityClient {
    client: Client,
    url: String,
}

impl ActivityClient {
    pub fn new(config: &ActivityConfig, timeout_seconds: u64) -> Result<Self, FeedError> {
        Ok(Self { client: http_client(timeout_seconds)?, url: config.endpoint() })
    }

    pub async fn fetch(&self) -> ActivityState {
        let result = match get_text(&self.client, &self.url).await {
            Ok(body) => parse(&body),
            Err(e) => Err(e),
        };
        match result {
            Ok(calendar) => {
                info!(days = calendar.contributions.len(), total = calendar.total_count(), "activity refreshed");
                ActivityState::Succeeded(calendar)
            }
            Err(e) => {
                warn!(error = %e, "activity calendar unavailable");
                ActivityState::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_calendar() {
        let body = r#"{"total":{"lastYear":5},"contributions":[
            {"date":"2025-01-01","count":2,"level":1},
            {"date":"2025-01-02","count":3,"level":9}
        ]}"#;
        let cal = parse(body).unwrap();
        assert_eq!(cal.total_count(), 5);
        assert_eq!(cal.total.get("lastYear"), Some(&5));
        assert_eq!(cal.days()[1].level, 4);
    }

    #[test]
    fn bad_body_is_decode_error() {
        assert!(matches!(parse("nope"), Err(FeedError::Decode(_))));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_failed_state() {
        let cfg = ActivityConfig {
            enabled: true,
            username: "x".into(),
            calendar_url: "http://127.0.0.1:1/{username}".into(),
        };
        let client = ActivityClient::new(&cfg, 2).unwrap();
        assert_eq!(client.fetch().await, ActivityState::Failed);
    }
}
