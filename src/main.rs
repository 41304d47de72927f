//! Folio server entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Load config
//!   3. Init logger (RUST_LOG wins, configured level is the fallback), load
//!      the content store
//!   4. Build shared web state, feed and activity clients
//!   5. Spawn Ctrl-C → shutdown signal watcher
//!   6. Run the web server, feed refresher and session sweeper until shutdown

use std::sync::Arc;

use folio::activity::ActivityClient;
use folio::config;
use folio::content::ContentStore;
use folio::error::AppError;
use folio::feeds::refresher::FeedRefresher;
use folio::feeds::FeedAggregator;
use folio::logger;
use folio::runtime::{spawn_components, Component};
use folio::web::sweeper::SessionSweeper;
use folio::web::{AppState, WebServer};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    // Load .env if present; the file is optional.
    let _ = dotenvy::dotenv();

    let config = config::load()?;
    logger::parse_level(&config.log_level)?;
    logger::init(&config.log_level, false)?;

    info!(
        site_name = %config.site_name,
        work_dir = %config.work_dir.display(),
        log_level = %config.log_level,
        llm_provider = %config.llm.provider,
        "config loaded"
    );

    let content = ContentStore::load_from(&config.content_path)?;
    info!(
        path = %config.content_path.display(),
        projects = content.projects.len(),
        experience = content.experience.len(),
        "content loaded"
    );

    let state = AppState::from_config(&config, content);

    let feeds = FeedAggregator::new(&config.feeds)
        .map_err(|e| AppError::Server(format!("feed client: {e}")))?;
    let activity = if config.activity.enabled {
        let client = ActivityClient::new(&config.activity, config.feeds.timeout_seconds)
            .map_err(|e| AppError::Server(format!("activity client: {e}")))?;
        Some(client)
    } else {
        info!("activity calendar disabled");
        None
    };
    if config.feeds.username.is_empty() {
        warn!("feeds.username is empty; publication feeds will likely fail");
    }

    // Shared shutdown token: Ctrl-C cancels it, all components watch it.
    let shutdown = CancellationToken::new();
    let ctrlc_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received, initiating shutdown");
            ctrlc_token.cancel();
        }
    });

    let components: Vec<Box<dyn Component>> = vec![
        Box::new(FeedRefresher::new(
            feeds,
            activity,
            Arc::clone(&state.live),
            config.feeds.refresh_interval_secs,
        )),
        Box::new(SessionSweeper::new(state.clone())),
        Box::new(WebServer::new(config.bind.clone(), state)),
    ];

    spawn_components(components, shutdown).join().await?;

    info!("shutdown complete");
    Ok(())
}
