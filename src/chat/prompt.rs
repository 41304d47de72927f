//! Layered prompt builder for the assistant's system instruction.
//!
//! The instruction is assembled from plain-text fragments stored under
//! `[chat] prompts_dir`. Each layer is appended in order; missing files are
//! silently skipped so layers can be optional.
//!
//! ## Layer ordering
//!
//! ```text
//! 0. persona.md    : who the assistant speaks for; {{owner}}, {{today}}
//! 1. guidelines.md : response rules; ends with the {{context}} placeholder
//! ```
//!
//! Variable substitution uses `{{key}}` syntax and is applied once at
//! [`build()`](PromptBuilder::build) time, after all layers are joined.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

const SEPARATOR: &str = "\n\n";

/// Used when neither prompt file exists.
const FALLBACK_PERSONA: &str = "You are a helpful and friendly AI assistant representing {{owner}}. \
The current date is {{today}}. Your answers must be based *only* on the information provided \
in the context document below. Always respond in the first person (\"I\"). For questions not \
related to my professional background, politely decline. Use only plain text, except for links, \
which must use markdown format like [Descriptive Text](URL).";

const CONTEXT_TRAILER: &str = "Here is the document about my professional background:\n{{context}}";

/// Fluent builder that assembles a layered prompt from template files.
pub struct PromptBuilder {
    prompts_dir: PathBuf,
    parts: Vec<String>,
    vars: HashMap<String, String>,
}

impl PromptBuilder {
    /// Create a builder rooted at `prompts_dir` (e.g. `"config/prompts"`).
    pub fn new(prompts_dir: impl Into<PathBuf>) -> Self {
        Self {
            prompts_dir: prompts_dir.into(),
            parts: Vec::new(),
            vars: HashMap::new(),
        }
    }

    /// Append a layer by loading `filename` from the prompts directory.
    /// Silently skips the layer when the file does not exist.
    pub fn layer(mut self, filename: &str) -> Self {
        let path = self.prompts_dir.join(filename);
        match fs::read_to_string(&path) {
            Ok(text) => {
                let trimmed = text.trim().to_string();
                if !trimmed.is_empty() {
                    self.parts.push(trimmed);
                }
            }
            Err(_) => {
                tracing::debug!("prompt: layer '{}' not found, skipped", path.display());
            }
        }
        self
    }

    /// Directly append a text fragment.
    pub fn append(mut self, text: impl Into<String>) -> Self {
        let s = text.into();
        let trimmed = s.trim().to_string();
        if !trimmed.is_empty() {
            self.parts.push(trimmed);
        }
        self
    }

    /// `true` while no non-empty layer has been collected.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Register a single `{{key}}` → `value` substitution.
    pub fn var(mut self, key: &str, value: impl Into<String>) -> Self {
        self.vars.insert(key.to_string(), value.into());
        self
    }

    /// Assemble all layers, join with blank lines, and apply variable substitution.
    pub fn build(self) -> String {
        let mut prompt = self.parts.join(SEPARATOR);
        for (k, v) in &self.vars {
            let placeholder = format!("{{{{{}}}}}", k);
            prompt = prompt.replace(&placeholder, v);
        }
        prompt
    }
}

/// Long US date, e.g. `October 19, 2026`.
pub fn long_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// The assistant's full system instruction: persona, guidelines and the
/// grounding document.
///
/// `{{context}}` is substituted after the other variables so text inside the
/// document is never treated as a placeholder. When no layer carries the
/// placeholder the document is appended under a fixed heading.
pub fn system_instruction(
    prompts_dir: impl AsRef<Path>,
    owner: &str,
    today: NaiveDate,
    context: &str,
) -> String {
    let mut builder = PromptBuilder::new(prompts_dir.as_ref())
        .layer("persona.md")
        .layer("guidelines.md");
    if builder.is_empty() {
        tracing::warn!(
            dir = %prompts_dir.as_ref().display(),
            "prompt: no prompt layers found, using built-in persona"
        );
        builder = builder.append(FALLBACK_PERSONA);
    }

    let prompt = builder
        .var("owner", owner)
        .var("today", long_date(today))
        .build();

    if prompt.contains("{{context}}") {
        prompt.replace("{{context}}", context)
    } else {
        format!("{prompt}{SEPARATOR}{}", CONTEXT_TRAILER.replace("{{context}}", context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 9).unwrap()
    }

    fn prompts(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (name, body) in files {
            fs::write(dir.path().join(name), body).unwrap();
        }
        dir
    }

    #[test]
    fn builder_assembles_layers_in_order() {
        let dir = prompts(&[("a.md", "first"), ("b.md", "second")]);
        let result = PromptBuilder::new(dir.path()).layer("a.md").layer("b.md").build();
        assert_eq!(result, "first\n\nsecond");
    }

    #[test]
    fn builder_skips_missing_file() {
        let dir = prompts(&[]);
        let result = PromptBuilder::new(dir.path())
            .layer("nonexistent_file_xyz.md")
            .append("hello")
            .build();
        assert_eq!(result.trim(), "hello");
    }

    #[test]
    fn builder_substitutes_variable() {
        let result = PromptBuilder::new("unused")
            .append("Items: {{items}}")
            .var("items", "item1\nitem2")
            .build();
        assert!(result.contains("item1\nitem2"));
        assert!(!result.contains("{{items}}"));
    }

    #[test]
    fn long_date_has_no_zero_padding() {
        assert_eq!(long_date(date()), "October 9, 2026");
    }

    #[test]
    fn instruction_from_files() {
        let dir = prompts(&[
            ("persona.md", "You speak for {{owner}}. Today is {{today}}."),
            ("guidelines.md", "Be brief.\n\nDocument:\n{{context}}"),
        ]);
        let out = system_instruction(dir.path(), "Jane Doe", date(), "<portfolio_context/>");
        assert!(out.starts_with("You speak for Jane Doe. Today is October 9, 2026."));
        assert!(out.contains("Be brief."));
        assert!(out.ends_with("Document:\n<portfolio_context/>"));
    }

    #[test]
    fn context_placeholders_are_not_expanded() {
        let dir = prompts(&[("persona.md", "For {{owner}}.\n{{context}}")]);
        let out = system_instruction(dir.path(), "Jane", date(), "literal {{owner}}");
        assert_eq!(out, "For Jane.\nliteral {{owner}}");
    }

    #[test]
    fn fallback_when_no_layers() {
        let dir = prompts(&[]);
        let out = system_instruction(dir.path(), "Jane Doe", date(), "CTX");
        assert!(out.contains("representing Jane Doe"));
        assert!(out.contains("October 9, 2026"));
        assert!(out.ends_with("Here is the document about my professional background:\nCTX"));
    }
}
