//! LLM provider abstraction.
//!
//! `LlmProvider` is an enum over concrete provider implementations.
//! Add a new variant + module in `providers/` for each additional backend.
//!
//! Providers are stateless and cheap to clone; the conversation history
//! belongs to the chat session and is passed in on every call.

pub mod providers;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
    #[error("provider '{0}' requires LLM_API_KEY")]
    MissingApiKey(String),
    #[error("provider request failed: {0}")]
    Request(String),
}

// ── Turns ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Model,
}

/// One prior exchange half sent back to the model as history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: TurnRole::User, text: text.into() }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self { role: TurnRole::Model, text: text.into() }
    }
}

// ── Provider enum ─────────────────────────────────────────────────────────────

/// All available provider backends.
///
/// Enum dispatch avoids `dyn` trait objects and the `async-trait` dependency.
#[derive(Debug, Clone)]
pub enum LlmProvider {
    Dummy(providers::dummy::DummyProvider),
    OpenAiCompatible(providers::openai_compatible::OpenAiCompatibleProvider),
}

impl LlmProvider {
    /// Send `content` after `history`, under the `system` instruction, and
    /// return the model's text reply.
    pub async fn complete(
        &self,
        system: &str,
        history: &[Turn],
        content: &str,
    ) -> Result<String, ProviderError> {
        match self {
            LlmProvider::Dummy(p) => p.complete(system, history, content).await,
            LlmProvider::OpenAiCompatible(p) => p.complete(system, history, content).await,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LlmProvider::Dummy(_) => "dummy",
            LlmProvider::OpenAiCompatible(_) => "openai",
        }
    }
}
