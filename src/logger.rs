//! Logging initialisation via tracing-subscriber.
//!
//! Call [`init`] once at startup. The subscriber cannot be swapped later, so
//! the configured level is validated with [`parse_level`] and reported rather
//! than re-installed.
//!
//! A bare level from config (`"debug"`) applies to folio and the web stack,
//! while the HTTP client internals stay at `warn`. A full directive
//! (`"folio=trace,axum=debug"`) is used as written.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// Targets that log every connection and TLS handshake at `debug`.
const CHATTY_TARGETS: [&str; 4] = ["hyper", "hyper_util", "reqwest", "rustls"];

/// Filter directive for a configured level.
pub fn directive(level: &str) -> String {
    match parse_level(level) {
        Ok(filter) if filter > LevelFilter::WARN => {
            let mut d = level.to_string();
            for target in CHATTY_TARGETS {
                d.push_str(&format!(",{target}=warn"));
            }
            d
        }
        _ => level.to_string(),
    }
}

/// Initialise the global tracing subscriber on stderr.
///
/// With `prefer_level`, the configured `level` wins and `RUST_LOG` is the
/// fallback when `level` does not parse. Otherwise `RUST_LOG` wins.
pub fn init(level: &str, prefer_level: bool) -> Result<(), AppError> {
    let configured = directive(level);
    let filter = if prefer_level {
        match EnvFilter::try_new(&configured) {
            Ok(filter) => filter,
            Err(level_err) => EnvFilter::try_from_default_env().map_err(|env_err| {
                AppError::Logger(format!(
                    "invalid log level '{level}': {level_err}; RUST_LOG parse failed: {env_err}"
                ))
            })?,
        }
    } else {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&configured))
            .map_err(|e| AppError::Logger(format!("invalid log level '{level}': {e}")))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| AppError::Logger(format!("failed to set subscriber: {e}")))?;

    Ok(())
}

/// Check a configured log setting: a bare level, or a directive list whose
/// entries each parse.
pub fn parse_level(level: &str) -> Result<LevelFilter, AppError> {
    if level.is_empty() {
        return Err(AppError::Logger("log level must not be empty".into()));
    }
    if let Ok(filter) = level.parse::<LevelFilter>() {
        return Ok(filter);
    }
    if level.contains('=') {
        return EnvFilter::try_new(level)
            .map(|f| f.max_level_hint().unwrap_or(LevelFilter::TRACE))
            .map_err(|e| AppError::Logger(format!("invalid log directive '{level}': {e}")));
    }
    Err(AppError::Logger(format!("unrecognised log level: '{level}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_levels_parse() {
        for l in &["error", "warn", "info", "debug", "trace"] {
            assert!(parse_level(l).is_ok(), "expected '{l}' to be valid");
        }
    }

    #[test]
    fn invalid_level_errors() {
        assert!(parse_level("verbose").is_err());
        assert!(parse_level("").is_err());
        assert!(parse_level("INFO_LEVEL").is_err());
    }

    #[test]
    fn directives_accepted() {
        assert_eq!(parse_level("folio=debug,axum=info").unwrap(), LevelFilter::DEBUG);
        assert!(parse_level("folio=loud").is_err());
    }

    #[test]
    fn verbose_levels_quiet_http_client() {
        assert_eq!(directive("debug"), "debug,hyper=warn,hyper_util=warn,reqwest=warn,rustls=warn");
        assert_eq!(directive("warn"), "warn");
        assert_eq!(directive("error"), "error");
        assert_eq!(directive("folio=trace"), "folio=trace");
    }

    #[test]
    fn init_info_succeeds_or_already_init() {
        // Another test in the same process may have installed it first.
        match init("info", false) {
            Ok(()) => {}
            Err(AppError::Logger(msg)) if msg.contains("set subscriber") => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
}
