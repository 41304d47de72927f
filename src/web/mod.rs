//! HTTP surface: the rendered page at `/`, JSON endpoints under `/api/`,
//! and static assets for everything else.
//!
//! [`WebServer`] implements [`Component`]: `run()` drives the axum event
//! loop and the shared [`CancellationToken`] is wired to axum's graceful
//! shutdown.
//!
//! ## URL layout
//!
//! ```text
//! GET  /                                 rendered page
//! GET  /api/health
//! GET  /api/profile
//! GET  /api/projects?category=&q=
//! GET  /api/skills?q=
//! GET  /api/publications?platform=&visible=
//! GET  /api/activity
//! POST /api/theme
//! POST /api/chat/session
//! GET  /api/chat/{id}
//! POST /api/chat/{id}/message
//! POST /api/chat/{id}/widget
//! POST /api/chat/{id}/clear
//! GET  /api/chat/{id}/export
//! POST /api/sections/{id}/visibility
//! POST /api/contact
//! GET  /favicon.ico                      → 204
//! GET  /{*path}                          → static assets or 404
//! ```

mod api;
pub mod assets;
pub mod page;
pub mod sweeper;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Router,
};
use chrono::Local;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::chat::{prompt, ChatHub, TranscriptStore};
use crate::config::Config;
use crate::content::{context_doc::context_document, ContentStore};
use crate::error::AppError;
use crate::feeds::refresher::LiveData;
use crate::llm::providers;
use crate::presentation::SpyRegistry;
use crate::runtime::{Component, ComponentFuture};

use self::assets::StaticAssets;

/// Cookie carrying the visitor's chat session id.
pub const SESSION_COOKIE: &str = "folio_session";

/// Router state injected into every handler via [`axum::extract::State`].
///
/// Cheap to clone: all fields are reference-counted.
#[derive(Clone)]
pub struct AppState {
    pub site_name: Arc<str>,
    pub content: Arc<ContentStore>,
    pub chat: Arc<ChatHub>,
    pub live: Arc<LiveData>,
    pub assets: Arc<StaticAssets>,
    /// Scroll-spy state per visitor session id.
    pub spies: Arc<Mutex<SpyRegistry>>,
    /// Per-visitor state untouched this long is dropped from memory.
    pub session_idle: Duration,
    pub contact_delay: Duration,
    pub activity_enabled: bool,
    /// Upper bound on one assistant round trip as seen by the HTTP caller.
    pub reply_timeout: Duration,
}

impl AppState {
    /// Wire the shared state from config and the loaded content store.
    ///
    /// A provider that fails to build does not fail startup: every chat
    /// session reports the init error instead.
    pub fn from_config(config: &Config, content: ContentStore) -> Self {
        let provider = providers::build(&config.llm, config.llm_api_key.clone());
        let system = prompt::system_instruction(
            &config.chat.prompts_dir,
            &config.chat.owner,
            Local::now().date_naive(),
            &context_document(&content),
        );
        let store = TranscriptStore::new(config.sessions_dir(), config.chat.transcript_cap);
        let hub = ChatHub::new(store, provider, system, config.chat.owner.clone())
            .with_max_sessions(config.chat.max_sessions);

        Self {
            site_name: Arc::from(config.site_name.as_str()),
            content: Arc::new(content),
            chat: Arc::new(hub),
            live: Arc::new(LiveData::default()),
            assets: Arc::new(StaticAssets::new(config.static_dir.clone())),
            spies: Arc::new(Mutex::new(SpyRegistry::new(config.chat.max_sessions))),
            session_idle: Duration::from_secs(config.chat.idle_timeout_secs),
            contact_delay: Duration::from_millis(config.contact.delay_ms),
            activity_enabled: config.activity.enabled,
            reply_timeout: Duration::from_secs(config.llm.openai.timeout_seconds.saturating_add(5)),
        }
    }
}

// ── WebServer ─────────────────────────────────────────────────────────────────

pub struct WebServer {
    bind_addr: String,
    state: AppState,
}

impl WebServer {
    pub fn new(bind_addr: impl Into<String>, state: AppState) -> Self {
        Self { bind_addr: bind_addr.into(), state }
    }
}

impl Component for WebServer {
    fn id(&self) -> &str {
        "web"
    }

    fn run(self: Box<Self>, shutdown: CancellationToken) -> ComponentFuture {
        Box::pin(serve(self.bind_addr, self.state, shutdown))
    }
}

async fn serve(bind_addr: String, state: AppState, shutdown: CancellationToken) -> Result<(), AppError> {
    let router = build_router(state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| AppError::Server(format!("bind failed on {bind_addr}: {e}")))?;

    info!(%bind_addr, "web server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| AppError::Server(format!("axum server error: {e}")))?;

    info!("web server shut down");
    Ok(())
}

// ── Router ────────────────────────────────────────────────────────────────────

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health",                       get(api::health))
        .route("/api/profile",                      get(api::profile))
        .route("/api/projects",                     get(api::projects))
        .route("/api/skills",                       get(api::skills))
        .route("/api/publications",                 get(api::publications))
        .route("/api/activity",                     get(api::activity))
        .route("/api/theme",                        post(api::theme))
        .route("/api/chat/session",                 post(api::chat_open))
        .route("/api/chat/{id}",                    get(api::chat_view))
        .route("/api/chat/{id}/message",            post(api::chat_message))
        .route("/api/chat/{id}/widget",             post(api::chat_widget))
        .route("/api/chat/{id}/clear",              post(api::chat_clear))
        .route("/api/chat/{id}/export",             get(api::chat_export))
        .route("/api/sections/{id}/visibility",     post(api::section_visibility))
        .route("/api/contact",                      post(api::contact))
        .route("/favicon.ico", get(|| async { StatusCode::NO_CONTENT }))
        .route("/",            get(api::index))
        .route("/{*path}",     get(api::static_asset))
        .with_state(state)
}
