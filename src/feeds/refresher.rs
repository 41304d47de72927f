//! Background refresh of the publication and activity sections.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::{FeedAggregator, FeedState};
use crate::activity::{ActivityClient, ActivityState};
use crate::runtime::{Component, ComponentFuture};

/// Latest fetched state of the external sections, read by the web layer.
#[derive(Debug, Default)]
pub struct LiveData {
    pub publications: RwLock<FeedState>,
    pub activity: RwLock<ActivityState>,
}

impl LiveData {
    /// Fetch everything once and publish the results.
    pub async fn refresh(&self, feeds: &FeedAggregator, activity: Option<&ActivityClient>) {
        let (publications, calendar) = tokio::join!(feeds.fetch_all(), async {
            match activity {
                Some(client) => Some(client.fetch().await),
                None => None,
            }
        });
        *self.publications.write().await = publications;
        if let Some(calendar) = calendar {
            *self.activity.write().await = calendar;
        }
    }
}

pub struct FeedRefresher {
    feeds: FeedAggregator,
    activity: Option<ActivityClient>,
    live: Arc<LiveData>,
    /// Zero means fetch once at startup only.
    interval: Duration,
}

impl FeedRefresher {
    pub fn new(
        feeds: FeedAggregator,
        activity: Option<ActivityClient>,
        live: Arc<LiveData>,
        interval_secs: u64,
    ) -> Self {
        Self { feeds, activity, live, interval: Duration::from_secs(interval_secs) }
    }
}

impl Component for FeedRefresher {
    fn id(&self) -> &str {
        "feeds"
    }

    fn run(self: Box<Self>, shutdown: CancellationToken) -> ComponentFuture {
        Box::pin(async move {
            tokio::select! {
                _ = shutdown.cancelled() => return Ok(()),
                _ = self.live.refresh(&self.feeds, self.activity.as_ref()) => {}
            }
            if self.interval.is_zero() {
                debug!("feed refresh interval is zero; initial fetch only");
                return Ok(());
            }
            info!(every_secs = self.interval.as_secs(), "feed refresher running");
            let mut ticker = tokio::time::interval(self.interval);
            // First tick fires immediately; the initial fetch already ran.
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => return Ok(()),
                    _ = ticker.tick() => {
                        self.live.refresh(&self.feeds, self.activity.as_ref()).await;
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use tempfile::TempDir;

    #[tokio::test]
    async fn unreachable_sources_mark_failed_and_exit() {
        let dir = TempDir::new().unwrap();
        let mut cfg = Config::test_default(dir.path());
        cfg.feeds.medium_url = "http://127.0.0.1:1/medium".into();
        cfg.feeds.devto_url = "http://127.0.0.1:1/devto".into();
        cfg.activity.calendar_url = "http://127.0.0.1:1/activity".into();

        let live = Arc::new(LiveData::default());
        assert_eq!(*live.publications.read().await, FeedState::Loading);

        let refresher = FeedRefresher::new(
            FeedAggregator::new(&cfg.feeds).unwrap(),
            Some(ActivityClient::new(&cfg.activity, 1).unwrap()),
            Arc::clone(&live),
            0,
        );
        Box::new(refresher).run(CancellationToken::new()).await.unwrap();

        assert_eq!(*live.publications.read().await, FeedState::Failed);
        assert_eq!(*live.activity.read().await, ActivityState::Failed);
    }

    #[tokio::test]
    async fn cancelled_refresher_stops() {
        let dir = TempDir::new().unwrap();
        let cfg = Config::test_default(dir.path());
        let live = Arc::new(LiveData::default());
        let refresher = FeedRefresher::new(FeedAggregator::new(&cfg.feeds).unwrap(), None, live, 3600);
        let token = CancellationToken::new();
        token.cancel();
        Box::new(refresher).run(token).await.unwrap();
    }
}
