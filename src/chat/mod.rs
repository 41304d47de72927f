//! Conversational assistant.
//!
//! [`ChatHub`] owns every live [`ChatSession`] keyed by visitor session id,
//! plus the shared provider and system instruction built once at startup.
//! Transcripts are persisted through [`TranscriptStore`] after each change.
//! Live sessions are bounded: the least recently touched one is evicted
//! when the hub is full, and [`ChatHub::sweep`] drops idle ones. An evicted
//! session comes back from its stored transcript on the next open.

pub mod export;
pub mod markdown;
pub mod prompt;
pub mod session;
pub mod store;
pub mod widget;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::error::AppError;
use crate::llm::{LlmProvider, ProviderError};
pub use session::{ChatSession, PendingTurn};
pub use store::TranscriptStore;
pub use widget::{WidgetEvent, WidgetState};

pub const GREETING: &str =
    "Hello! You can ask me anything about my experience, projects, or skills. What would you like to know?";

pub const QUICK_SUGGESTIONS: [&str; 6] = [
    "Summarize your experience",
    "What are your top projects?",
    "Explain your backend skills",
    "How do you handle high-load?",
    "Tell me about the Gamification Engine",
    "Do you know System Design?",
];

pub const INIT_ERROR: &str = "Failed to initialize AI Chat. Please reload the page.";
pub const CONNECT_ERROR: &str = "Sorry, I'm having trouble connecting. Please try again later.";
pub const EXPORT_ERROR: &str = "Sorry, could not generate the PDF. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sender {
    #[serde(rename = "user")]
    Visitor,
    #[serde(rename = "ai")]
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
}

impl ChatMessage {
    pub fn visitor(text: impl Into<String>) -> Self {
        Self { sender: Sender::Visitor, text: text.into() }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self { sender: Sender::Assistant, text: text.into() }
    }
}

/// The synthetic first assistant message.
pub fn greeting() -> ChatMessage {
    ChatMessage::assistant(GREETING)
}

// ── Views ─────────────────────────────────────────────────────────────────────

/// One transcript entry as the page sees it.
#[derive(Debug, Clone, Serialize)]
pub struct MessageView {
    pub sender: Sender,
    pub text: String,
    /// Rendered markdown, assistant messages only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
}

/// Serializable snapshot of one session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub id: String,
    pub widget: WidgetState,
    pub launcher_visible: bool,
    pub transcript: Vec<MessageView>,
    pub loading: bool,
    pub exporting: bool,
    pub error: Option<String>,
    pub can_export: bool,
    pub suggestions: Vec<&'static str>,
}

impl SessionView {
    pub fn of(session: &ChatSession) -> Self {
        let transcript = session
            .transcript()
            .iter()
            .map(|m| MessageView {
                sender: m.sender,
                text: m.text.clone(),
                html: (m.sender == Sender::Assistant).then(|| markdown::render(&m.text)),
            })
            .collect();
        Self {
            id: session.id().to_string(),
            widget: session.widget(),
            launcher_visible: session.widget().launcher_visible(),
            transcript,
            loading: session.is_loading(),
            exporting: session.is_exporting(),
            error: session.error().map(str::to_string),
            can_export: session.can_export(),
            suggestions: QUICK_SUGGESTIONS.to_vec(),
        }
    }
}

/// A finished transcript download.
#[derive(Debug, Clone)]
pub struct PdfExport {
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("unknown session: {0}")]
    UnknownSession(String),
    /// Nothing to export yet, or an export is already running.
    #[error("export not available")]
    Refused,
    #[error("{0}")]
    Failed(String),
}

// ── Hub ───────────────────────────────────────────────────────────────────────

type SessionHandle = Arc<Mutex<ChatSession>>;

/// Default bound on live sessions.
pub const DEFAULT_MAX_SESSIONS: usize = 1000;

struct Slot {
    handle: SessionHandle,
    touched: Instant,
}

impl Slot {
    /// A session with a reply or export in flight, or currently locked.
    fn is_busy(&self) -> bool {
        self.handle
            .try_lock()
            .map(|s| s.is_loading() || s.is_exporting())
            .unwrap_or(true)
    }
}

pub struct ChatHub {
    sessions: Mutex<HashMap<String, Slot>>,
    store: TranscriptStore,
    provider: Result<LlmProvider, ProviderError>,
    system: Arc<str>,
    owner: String,
    max_sessions: usize,
}

impl ChatHub {
    pub fn new(
        store: TranscriptStore,
        provider: Result<LlmProvider, ProviderError>,
        system: String,
        owner: impl Into<String>,
    ) -> Self {
        match &provider {
            Ok(p) => info!(provider = p.name(), "assistant ready"),
            Err(e) => error!(error = %e, "assistant provider unavailable; sessions will report an init error"),
        }
        Self {
            sessions: Mutex::new(HashMap::new()),
            store,
            provider,
            system: Arc::from(system),
            owner: owner.into(),
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }

    pub fn with_max_sessions(mut self, max: usize) -> Self {
        self.max_sessions = max.max(1);
        self
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Return the session for `id`, creating it (and restoring any persisted
    /// transcript) when needed. Missing or unusable ids get a fresh UUID.
    pub async fn open(&self, id: Option<&str>) -> SessionView {
        let id = match id.filter(|i| TranscriptStore::is_valid_id(i)) {
            Some(i) => i.to_string(),
            None => uuid::Uuid::new_v4().to_string(),
        };
        let handle = match self.handle(&id).await {
            Some(handle) => handle,
            None => {
                let key = id.clone();
                let restored = self
                    .on_store(move |store| Ok(store.load(&key)))
                    .await
                    .unwrap_or_else(|e| {
                        warn!(session_id = %id, error = %e, "transcript restore failed");
                        Vec::new()
                    });
                let mut sessions = self.sessions.lock().await;
                match sessions.get(&id) {
                    // Opened concurrently while the transcript was loading.
                    Some(slot) => Arc::clone(&slot.handle),
                    None => {
                        info!(session_id = %id, restored = restored.len(), "chat session opened");
                        let provider = self.provider.as_ref().cloned();
                        let session =
                            ChatSession::initialize(id.clone(), provider, Arc::clone(&self.system), restored);
                        let handle = Arc::new(Mutex::new(session));
                        let slot = Slot { handle: Arc::clone(&handle), touched: Instant::now() };
                        sessions.insert(id.clone(), slot);
                        self.evict_over_capacity(&mut sessions, &id);
                        handle
                    }
                }
            }
        };
        let session = handle.lock().await;
        SessionView::of(&session)
    }

    /// Look up a live session and mark it as recently used.
    async fn handle(&self, id: &str) -> Option<SessionHandle> {
        let mut sessions = self.sessions.lock().await;
        let slot = sessions.get_mut(id)?;
        slot.touched = Instant::now();
        Some(Arc::clone(&slot.handle))
    }

    /// Drop least recently touched idle sessions until within the bound.
    /// `keep` is never evicted.
    fn evict_over_capacity(&self, sessions: &mut HashMap<String, Slot>, keep: &str) {
        while sessions.len() > self.max_sessions {
            let oldest = sessions
                .iter()
                .filter(|(id, slot)| id.as_str() != keep && !slot.is_busy())
                .min_by_key(|(_, slot)| slot.touched)
                .map(|(id, _)| id.clone());
            let Some(oldest) = oldest else { break };
            sessions.remove(&oldest);
            debug!(session_id = %oldest, "chat session evicted");
        }
    }

    /// Drop sessions untouched for `idle` or longer. Sessions with a reply
    /// or export in flight are kept. Returns how many were dropped.
    pub async fn sweep(&self, idle: Duration) -> usize {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, slot| slot.touched.elapsed() < idle || slot.is_busy());
        let dropped = before - sessions.len();
        if dropped > 0 {
            debug!(dropped, live = sessions.len(), "idle chat sessions swept");
        }
        dropped
    }

    pub async fn view(&self, id: &str) -> Option<SessionView> {
        let handle = self.handle(id).await?;
        let session = handle.lock().await;
        Some(SessionView::of(&session))
    }

    /// Send one visitor message and wait for the reply.
    pub async fn send(&self, id: &str, text: &str) -> Option<SessionView> {
        let handle = self.handle(id).await?;

        let pending = {
            let mut session = handle.lock().await;
            let pending = session.begin_send(text);
            if pending.is_some() {
                self.persist(&session).await;
            }
            pending
        };

        if let Some(pending) = pending {
            let result = pending
                .provider
                .complete(&pending.system, &pending.history, &pending.text)
                .await;
            let mut session = handle.lock().await;
            session.complete_send(pending, result);
            self.persist(&session).await;
        }

        let session = handle.lock().await;
        Some(SessionView::of(&session))
    }

    pub async fn widget(&self, id: &str, event: WidgetEvent) -> Option<SessionView> {
        let handle = self.handle(id).await?;
        let mut session = handle.lock().await;
        session.apply_widget(event);
        Some(SessionView::of(&session))
    }

    /// Reset the transcript to the greeting and drop the persisted slot.
    pub async fn clear(&self, id: &str) -> Option<SessionView> {
        let handle = self.handle(id).await?;
        let mut session = handle.lock().await;
        session.clear();
        let key = id.to_string();
        if let Err(e) = self.on_store(move |store| store.remove(&key)).await {
            warn!(session_id = %id, error = %e, "failed to remove stored transcript");
        }
        Some(SessionView::of(&session))
    }

    /// Render the transcript as a PDF named after the owner and `today`.
    pub async fn export(&self, id: &str, today: NaiveDate) -> Result<PdfExport, ExportError> {
        let handle = self
            .handle(id)
            .await
            .ok_or_else(|| ExportError::UnknownSession(id.to_string()))?;

        let snapshot = handle.lock().await.begin_export().ok_or(ExportError::Refused)?;

        let owner = self.owner.clone();
        let rendered = tokio::task::spawn_blocking(move || {
            let title = format!("Chat with {owner}'s assistant");
            export::render_pdf(&snapshot, &title, &owner)
        })
        .await;

        let result = match rendered {
            Ok(Ok(bytes)) => Ok(PdfExport { filename: export::export_filename(&self.owner, today), bytes }),
            Ok(Err(e)) => Err(e.to_string()),
            Err(e) => Err(format!("export task failed: {e}")),
        };

        let mut session = handle.lock().await;
        session.finish_export(result.is_ok());
        result.map_err(|e| {
            error!(session_id = %id, error = %e, "error generating PDF");
            ExportError::Failed(EXPORT_ERROR.to_string())
        })
    }

    /// Write the transcript. Called with the session locked so writes for
    /// one session land in order.
    async fn persist(&self, session: &ChatSession) {
        let id = session.id().to_string();
        let transcript = session.transcript().to_vec();
        if let Err(e) = self.on_store(move |store| store.save(&id, &transcript)).await {
            warn!(session_id = %session.id(), error = %e, "failed to persist transcript");
        }
    }

    /// Run blocking transcript file I/O off the async workers.
    async fn on_store<T, F>(&self, f: F) -> Result<T, AppError>
    where
        T: Send + 'static,
        F: FnOnce(&TranscriptStore) -> Result<T, AppError> + Send + 'static,
    {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || f(&store))
            .await
            .map_err(|e| AppError::Storage(format!("transcript task failed: {e}")))?
    }
}
