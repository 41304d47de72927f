//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` relative to the current working directory,
//! then applies `FOLIO_WORK_DIR`, `FOLIO_LOG_LEVEL` and `FOLIO_BIND` env
//! overrides. The model credential comes from `LLM_API_KEY` only.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::error::AppError;

/// OpenAI / OpenAI-compatible provider configuration (`[llm.openai]`).
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Full chat completions endpoint URL.
    pub api_base_url: String,
    /// Model name passed in the request body.
    pub model: String,
    pub temperature: f32,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
}

/// LLM configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Which provider is active (`"dummy"`, `"openai"`). Maps to `default`
    /// in `[llm]`.
    pub provider: String,
    pub openai: OpenAiConfig,
}

/// Assistant configuration (`[chat]`).
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Directory holding the prompt layers (`persona.md`, `guidelines.md`).
    pub prompts_dir: PathBuf,
    /// Display name used in the system prompt and export filenames.
    pub owner: String,
    /// Keep only the newest N messages on disk. `None` = unbounded.
    pub transcript_cap: Option<usize>,
    /// In-memory sessions untouched this long are evicted. Their stored
    /// transcripts are restored on the next open.
    pub idle_timeout_secs: u64,
    /// Upper bound on live in-memory sessions.
    pub max_sessions: usize,
}

/// Publication feed configuration (`[feeds]`).
#[derive(Debug, Clone)]
pub struct FeedsConfig {
    /// Account name substituted for `{username}` in the URLs below.
    pub username: String,
    pub medium_url: String,
    pub devto_url: String,
    /// `0` fetches once at startup only.
    pub refresh_interval_secs: u64,
    pub timeout_seconds: u64,
}

impl FeedsConfig {
    pub fn medium_endpoint(&self) -> String {
        self.medium_url.replace("{username}", &self.username)
    }

    pub fn devto_endpoint(&self) -> String {
        self.devto_url.replace("{username}", &self.username)
    }
}

/// Commit-activity calendar configuration (`[activity]`).
#[derive(Debug, Clone)]
pub struct ActivityConfig {
    pub enabled: bool,
    pub username: String,
    pub calendar_url: String,
}

impl ActivityConfig {
    pub fn endpoint(&self) -> String {
        self.calendar_url.replace("{username}", &self.username)
    }
}

/// Contact form configuration (`[contact]`).
#[derive(Debug, Clone)]
pub struct ContactConfig {
    /// Simulated delivery delay in milliseconds.
    pub delay_ms: u64,
}

/// Fully-resolved server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub site_name: String,
    /// Socket address the HTTP server binds to.
    pub bind: String,
    /// Working directory for persisted visitor data (already expanded, no `~`).
    pub work_dir: PathBuf,
    pub log_level: String,
    /// Optional directory of static assets served under `/`.
    pub static_dir: Option<PathBuf>,
    /// Path of the content store TOML.
    pub content_path: PathBuf,
    pub llm: LlmConfig,
    /// API key from `LLM_API_KEY` env var. Never sourced from TOML.
    pub llm_api_key: Option<String>,
    pub chat: ChatConfig,
    pub feeds: FeedsConfig,
    pub activity: ActivityConfig,
    pub contact: ContactConfig,
}

impl Config {
    /// Directory holding one sub-directory per visitor session.
    pub fn sessions_dir(&self) -> PathBuf {
        self.work_dir.join("sessions")
    }
}

/// Env-var overrides applied on top of the TOML values.
#[derive(Debug, Default, Clone, Copy)]
pub struct Overrides<'a> {
    pub work_dir: Option<&'a str>,
    pub log_level: Option<&'a str>,
    pub bind: Option<&'a str>,
}

// ── Raw TOML shape ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct RawConfig {
    server: RawServer,
    #[serde(default)]
    content: RawContent,
    #[serde(default)]
    llm: RawLlm,
    #[serde(default)]
    chat: RawChat,
    #[serde(default)]
    feeds: RawFeeds,
    #[serde(default)]
    activity: RawActivity,
    #[serde(default)]
    contact: RawContact,
}

#[derive(Deserialize)]
struct RawServer {
    site_name: String,
    work_dir: String,
    log_level: String,
    #[serde(default = "default_bind")]
    bind: String,
    #[serde(default)]
    static_dir: Option<String>,
}

#[derive(Deserialize)]
struct RawContent {
    #[serde(default = "default_content_path")]
    path: String,
}

impl Default for RawContent {
    fn default() -> Self {
        Self { path: default_content_path() }
    }
}

#[derive(Deserialize)]
struct RawLlm {
    #[serde(rename = "default", default = "default_llm_provider")]
    provider: String,
    #[serde(default)]
    openai: RawOpenAiConfig,
}

impl Default for RawLlm {
    fn default() -> Self {
        Self { provider: default_llm_provider(), openai: RawOpenAiConfig::default() }
    }
}

#[derive(Deserialize)]
struct RawOpenAiConfig {
    #[serde(default = "default_openai_api_base_url")]
    api_base_url: String,
    #[serde(default = "default_openai_model")]
    model: String,
    #[serde(default = "default_openai_temperature")]
    temperature: f32,
    #[serde(default = "default_openai_timeout_seconds")]
    timeout_seconds: u64,
}

impl Default for RawOpenAiConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_openai_api_base_url(),
            model: default_openai_model(),
            temperature: default_openai_temperature(),
            timeout_seconds: default_openai_timeout_seconds(),
        }
    }
}

#[derive(Deserialize)]
struct RawChat {
    #[serde(default = "default_prompts_dir")]
    prompts_dir: String,
    #[serde(default)]
    owner: Option<String>,
    #[serde(default)]
    transcript_cap: Option<usize>,
    #[serde(default = "default_idle_timeout_secs")]
    idle_timeout_secs: u64,
    #[serde(default = "default_max_sessions")]
    max_sessions: usize,
}

impl Default for RawChat {
    fn default() -> Self {
        Self {
            prompts_dir: default_prompts_dir(),
            owner: None,
            transcript_cap: None,
            idle_timeout_secs: default_idle_timeout_secs(),
            max_sessions: default_max_sessions(),
        }
    }
}

#[derive(Deserialize)]
struct RawFeeds {
    #[serde(default)]
    username: String,
    #[serde(default = "default_medium_url")]
    medium_url: String,
    #[serde(default = "default_devto_url")]
    devto_url: String,
    #[serde(default)]
    refresh_interval_secs: u64,
    #[serde(default = "default_feed_timeout_seconds")]
    timeout_seconds: u64,
}

impl Default for RawFeeds {
    fn default() -> Self {
        Self {
            username: String::new(),
            medium_url: default_medium_url(),
            devto_url: default_devto_url(),
            refresh_interval_secs: 0,
            timeout_seconds: default_feed_timeout_seconds(),
        }
    }
}

#[derive(Deserialize)]
struct RawActivity {
    /// Defaults to `true`; the calendar is hidden when disabled.
    #[serde(default = "default_true")]
    enabled: bool,
    /// Falls back to `[feeds] username`.
    #[serde(default)]
    username: Option<String>,
    #[serde(default = "default_calendar_url")]
    calendar_url: String,
}

impl Default for RawActivity {
    fn default() -> Self {
        Self { enabled: true, username: None, calendar_url: default_calendar_url() }
    }
}

#[derive(Deserialize)]
struct RawContact {
    #[serde(default = "default_contact_delay_ms")]
    delay_ms: u64,
}

impl Default for RawContact {
    fn default() -> Self {
        Self { delay_ms: default_contact_delay_ms() }
    }
}

fn default_bind() -> String { "127.0.0.1:8080".to_string() }
fn default_content_path() -> String { "content/portfolio.toml".to_string() }
fn default_llm_provider() -> String { "dummy".to_string() }
fn default_openai_api_base_url() -> String { "https://api.openai.com/v1/chat/completions".to_string() }
fn default_openai_model() -> String { "gpt-4o-mini".to_string() }
fn default_openai_temperature() -> f32 { 0.2 }
fn default_openai_timeout_seconds() -> u64 { 60 }
fn default_prompts_dir() -> String { "config/prompts".to_string() }
fn default_idle_timeout_secs() -> u64 { 1800 }
fn default_max_sessions() -> usize { 1000 }
fn default_medium_url() -> String {
    "https://api.rss2json.com/v1/api.json?rss_url=https://medium.com/feed/@{username}".to_string()
}
fn default_devto_url() -> String { "https://dev.to/api/articles?username={username}".to_string() }
fn default_feed_timeout_seconds() -> u64 { 15 }
fn default_calendar_url() -> String {
    "https://github-contributions-api.jogruber.de/v4/{username}?y=last".to_string()
}
fn default_contact_delay_ms() -> u64 { 1500 }
fn default_true() -> bool { true }

/// Load config from `config/default.toml`, then apply env-var overrides.
pub fn load() -> Result<Config, AppError> {
    let work_dir = env::var("FOLIO_WORK_DIR").ok();
    let log_level = env::var("FOLIO_LOG_LEVEL").ok();
    let bind = env::var("FOLIO_BIND").ok();
    let mut config = load_from(
        Path::new("config/default.toml"),
        Overrides {
            work_dir: work_dir.as_deref(),
            log_level: log_level.as_deref(),
            bind: bind.as_deref(),
        },
    )?;
    config.llm_api_key = env::var("LLM_API_KEY").ok().filter(|k| !k.trim().is_empty());
    Ok(config)
}

/// Internal loader. Tests pass overrides directly instead of mutating env
/// vars; the API key is left unset.
pub fn load_from(path: &Path, overrides: Overrides<'_>) -> Result<Config, AppError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;

    let parsed: RawConfig = toml::from_str(&raw)
        .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?;

    let s = parsed.server;
    let work_dir = expand_home(overrides.work_dir.unwrap_or(&s.work_dir));
    let log_level = overrides.log_level.unwrap_or(&s.log_level).to_string();
    let bind = overrides.bind.unwrap_or(&s.bind).to_string();

    let owner = parsed
        .chat
        .owner
        .filter(|o| !o.trim().is_empty())
        .unwrap_or_else(|| s.site_name.clone());

    let activity_username = parsed
        .activity
        .username
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| parsed.feeds.username.clone());

    Ok(Config {
        site_name: s.site_name,
        bind,
        work_dir,
        log_level,
        static_dir: s.static_dir.map(|d| expand_home(&d)),
        content_path: PathBuf::from(parsed.content.path),
        llm: LlmConfig {
            provider: parsed.llm.provider,
            openai: OpenAiConfig {
                api_base_url: parsed.llm.openai.api_base_url,
                model: parsed.llm.openai.model,
                temperature: parsed.llm.openai.temperature,
                timeout_seconds: parsed.llm.openai.timeout_seconds,
            },
        },
        llm_api_key: None,
        chat: ChatConfig {
            prompts_dir: PathBuf::from(parsed.chat.prompts_dir),
            owner,
            transcript_cap: parsed.chat.transcript_cap.filter(|c| *c > 0),
            idle_timeout_secs: parsed.chat.idle_timeout_secs.max(1),
            max_sessions: parsed.chat.max_sessions.max(1),
        },
        feeds: FeedsConfig {
            username: parsed.feeds.username,
            medium_url: parsed.feeds.medium_url,
            devto_url: parsed.feeds.devto_url,
            refresh_interval_secs: parsed.feeds.refresh_interval_secs,
            timeout_seconds: parsed.feeds.timeout_seconds,
        },
        activity: ActivityConfig {
            enabled: parsed.activity.enabled,
            username: activity_username,
            calendar_url: parsed.activity.calendar_url,
        },
        contact: ContactConfig { delay_ms: parsed.contact.delay_ms },
    })
}

/// Expand a leading `~` to the user's home directory.
/// Absolute or relative paths without `~` are returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

// ── test helpers ──────────────────────────────────────────────────────────────

impl Config {
    /// Safe `Config` for tests: dummy LLM, no API key, unreachable feeds.
    pub fn test_default(work_dir: &Path) -> Self {
        Self {
            site_name: "test".into(),
            bind: "127.0.0.1:0".into(),
            work_dir: work_dir.to_path_buf(),
            log_level: "info".into(),
            static_dir: None,
            content_path: PathBuf::from("content/portfolio.toml"),
            llm: LlmConfig {
                provider: "dummy".into(),
                openai: OpenAiConfig {
                    api_base_url: "http://localhost:0/v1/chat/completions".into(),
                    model: "test-model".into(),
                    temperature: 0.0,
                    timeout_seconds: 1,
                },
            },
            llm_api_key: None,
            chat: ChatConfig {
                prompts_dir: work_dir.join("prompts"),
                owner: "Test Owner".into(),
                transcript_cap: None,
                idle_timeout_secs: 1800,
                max_sessions: 1000,
            },
            feeds: FeedsConfig {
                username: "tester".into(),
                medium_url: "http://localhost:0/medium/{username}".into(),
                devto_url: "http://localhost:0/devto/{username}".into(),
                refresh_interval_secs: 0,
                timeout_seconds: 1,
            },
            activity: ActivityConfig {
                enabled: false,
                username: "tester".into(),
                calendar_url: "http://localhost:0/activity/{username}".into(),
            },
            contact: ContactConfig { delay_ms: 0 },
        }
    }
}
