//! LLM provider implementations.
//!
//! `build(config, api_key)` is the factory, called once at startup.

pub mod dummy;
pub mod openai_compatible;

use crate::config::LlmConfig;
use crate::llm::{LlmProvider, ProviderError};

/// Construct a `LlmProvider` from config and an optional API key.
///
/// `api_key` is sourced from `LLM_API_KEY` env (never TOML). The hosted
/// provider refuses to build without it.
pub fn build(config: &LlmConfig, api_key: Option<String>) -> Result<LlmProvider, ProviderError> {
    match config.provider.as_str() {
        "dummy" => Ok(LlmProvider::Dummy(dummy::DummyProvider)),
        "openai" | "openai-compatible" => {
            let api_key = api_key
                .filter(|k| !k.trim().is_empty())
                .ok_or_else(|| ProviderError::MissingApiKey(config.provider.clone()))?;
            let oai = &config.openai;
            let p = openai_compatible::OpenAiCompatibleProvider::new(
                oai.api_base_url.clone(),
                oai.model.clone(),
                oai.temperature,
                oai.timeout_seconds,
                api_key,
            )?;
            Ok(LlmProvider::OpenAiCompatible(p))
        }
        _ => Err(ProviderError::UnknownProvider(config.provider.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OpenAiConfig;

    fn llm_config(provider: &str) -> LlmConfig {
        LlmConfig {
            provider: provider.into(),
            openai: OpenAiConfig {
                api_base_url: "http://localhost:0/v1/chat/completions".into(),
                model: "test-model".into(),
                temperature: 0.0,
                timeout_seconds: 1,
            },
        }
    }

    #[test]
    fn builds_dummy_without_key() {
        let p = build(&llm_config("dummy"), None).unwrap();
        assert_eq!(p.name(), "dummy");
    }

    #[test]
    fn hosted_provider_requires_key() {
        let err = build(&llm_config("openai"), None).unwrap_err();
        assert!(matches!(err, ProviderError::MissingApiKey(_)));
        let err = build(&llm_config("openai"), Some("  ".into())).unwrap_err();
        assert!(matches!(err, ProviderError::MissingApiKey(_)));
    }

    #[test]
    fn hosted_provider_builds_with_key() {
        let p = build(&llm_config("openai"), Some("sk-test".into())).unwrap();
        assert_eq!(p.name(), "openai");
    }

    #[test]
    fn unknown_provider_errors() {
        let err = build(&llm_config("carrier-pigeon"), None).unwrap_err();
        assert!(err.to_string().contains("carrier-pigeon"));
    }
}
