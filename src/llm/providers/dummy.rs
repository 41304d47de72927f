//! Dummy LLM provider: echoes input back prefixed with `[echo]`.
//! Lets the whole assistant run without an API key.

use crate::llm::{ProviderError, Turn};

#[derive(Debug, Clone)]
pub struct DummyProvider;

impl DummyProvider {
    pub async fn complete(
        &self,
        _system: &str,
        _history: &[Turn],
        content: &str,
    ) -> Result<String, ProviderError> {
        Ok(format!("[echo] {content}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn complete_prefixes_echo() {
        let p = DummyProvider;
        assert_eq!(p.complete("sys", &[], "hello").await.unwrap(), "[echo] hello");
    }

    #[tokio::test]
    async fn history_is_ignored() {
        let p = DummyProvider;
        let history = [Turn::user("a"), Turn::model("b")];
        assert_eq!(p.complete("", &history, "c").await.unwrap(), "[echo] c");
    }
}
