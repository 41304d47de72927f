//! Periodic eviction of idle per-visitor state (chat sessions, scroll spies).

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::AppState;
use crate::runtime::{Component, ComponentFuture};

pub struct SessionSweeper {
    state: AppState,
    every: Duration,
}

impl SessionSweeper {
    /// Sweeps four times per idle window, at most every five minutes.
    pub fn new(state: AppState) -> Self {
        let every = Duration::from_secs((state.session_idle.as_secs() / 4).clamp(1, 300));
        Self { state, every }
    }

    /// One pass over both maps. Returns (chat sessions, spies) dropped.
    pub async fn sweep_once(&self) -> (usize, usize) {
        let idle = self.state.session_idle;
        let chats = self.state.chat.sweep(idle).await;
        let spies = self.state.spies.lock().await.sweep(idle);
        if chats + spies > 0 {
            debug!(chats, spies, "idle visitor state dropped");
        }
        (chats, spies)
    }
}

impl Component for SessionSweeper {
    fn id(&self) -> &str {
        "sweeper"
    }

    fn run(self: Box<Self>, shutdown: CancellationToken) -> ComponentFuture {
        Box::pin(async move {
            info!(
                idle_secs = self.state.session_idle.as_secs(),
                every_secs = self.every.as_secs(),
                "session sweeper running"
            );
            let mut ticker = tokio::time::interval(self.every);
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => return Ok(()),
                    _ = ticker.tick() => {
                        self.sweep_once().await;
                    }
                }
            }
        })
    }
}
