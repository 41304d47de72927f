//! Per-visitor assistant session state.
//!
//! The model call runs outside any lock: [`ChatSession::begin_send`] hands
//! out a [`PendingTurn`] carrying everything the call needs, and
//! [`ChatSession::complete_send`] folds the result back in.

use std::sync::Arc;

use tracing::{debug, warn};

use super::widget::{WidgetEvent, WidgetState};
use super::{greeting, ChatMessage, Sender, CONNECT_ERROR, EXPORT_ERROR, INIT_ERROR};
use crate::llm::{LlmProvider, ProviderError, Turn};

/// A visitor message accepted for sending.
#[derive(Debug, Clone)]
pub struct PendingTurn {
    pub text: String,
    /// Model history as it stood before this message.
    pub history: Vec<Turn>,
    pub provider: LlmProvider,
    pub system: Arc<str>,
    generation: u64,
}

#[derive(Debug)]
pub struct ChatSession {
    id: String,
    transcript: Vec<ChatMessage>,
    history: Vec<Turn>,
    provider: Option<LlmProvider>,
    system: Arc<str>,
    loading: bool,
    exporting: bool,
    error: Option<String>,
    widget: WidgetState,
    /// Bumped by `clear` so a reply that lands afterwards is discarded.
    generation: u64,
}

impl ChatSession {
    /// Start a session from a restored transcript (possibly empty).
    ///
    /// A failed provider leaves a usable session that shows the init error
    /// and never sends.
    pub fn initialize(
        id: impl Into<String>,
        provider: Result<LlmProvider, &ProviderError>,
        system: Arc<str>,
        restored: Vec<ChatMessage>,
    ) -> Self {
        let transcript = if restored.is_empty() { vec![greeting()] } else { restored };
        let (provider, error) = match provider {
            Ok(p) => (Some(p), None),
            Err(e) => {
                warn!(error = %e, "failed to initialize AI chat");
                (None, Some(INIT_ERROR.to_string()))
            }
        };
        let mut session = Self {
            id: id.into(),
            transcript,
            history: Vec::new(),
            provider,
            system,
            loading: false,
            exporting: false,
            error,
            widget: WidgetState::default(),
            generation: 0,
        };
        session.resync();
        session
    }

    /// Rebuild the model history from the transcript, leaving out the
    /// leading greeting. A capped transcript may open with a real reply,
    /// which stays in the history.
    pub fn resync(&mut self) {
        let greeting = greeting();
        let skip = usize::from(self.transcript.first() == Some(&greeting));
        self.history = self.transcript[skip..]
            .iter()
            .map(|m| match m.sender {
                Sender::Visitor => Turn::user(m.text.clone()),
                Sender::Assistant => Turn::model(m.text.clone()),
            })
            .collect();
    }

    /// Accept a visitor message. `None` means nothing happened: blank input,
    /// a reply already pending, or no model session.
    pub fn begin_send(&mut self, input: &str) -> Option<PendingTurn> {
        let text = input.trim();
        if text.is_empty() || self.loading {
            return None;
        }
        let provider = self.provider.clone()?;

        self.transcript.push(ChatMessage::visitor(text));
        self.loading = true;
        self.error = None;
        debug!(session_id = %self.id, len = text.len(), "visitor message accepted");

        Some(PendingTurn {
            text: text.to_string(),
            history: self.history.clone(),
            provider,
            system: Arc::clone(&self.system),
            generation: self.generation,
        })
    }

    /// Fold the model's answer (or failure) back into the session.
    pub fn complete_send(&mut self, pending: PendingTurn, result: Result<String, ProviderError>) {
        self.loading = false;
        if pending.generation != self.generation {
            debug!(session_id = %self.id, "reply arrived after reset, dropped");
            return;
        }
        match result {
            Ok(reply) => {
                self.transcript.push(ChatMessage::assistant(reply.clone()));
                self.history.push(Turn::user(pending.text));
                self.history.push(Turn::model(reply));
            }
            Err(e) => {
                warn!(session_id = %self.id, error = %e, "assistant request failed");
                self.error = Some(CONNECT_ERROR.to_string());
            }
        }
    }

    /// Start over from the greeting.
    pub fn clear(&mut self) {
        self.transcript = vec![greeting()];
        self.history.clear();
        self.loading = false;
        self.generation += 1;
        if self.provider.is_some() {
            self.error = None;
        }
    }

    pub fn apply_widget(&mut self, event: WidgetEvent) -> WidgetState {
        self.widget = self.widget.apply(event);
        self.widget
    }

    pub fn can_export(&self) -> bool {
        self.transcript.len() > 1 && !self.exporting
    }

    /// Claim the export slot and snapshot the transcript.
    pub fn begin_export(&mut self) -> Option<Vec<ChatMessage>> {
        if !self.can_export() {
            return None;
        }
        self.exporting = true;
        Some(self.transcript.clone())
    }

    pub fn finish_export(&mut self, ok: bool) {
        self.exporting = false;
        if !ok {
            self.error = Some(EXPORT_ERROR.to_string());
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_exporting(&self) -> bool {
        self.exporting
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn widget(&self) -> WidgetState {
        self.widget
    }

    pub fn has_model(&self) -> bool {
        self.provider.is_some()
    }
}
