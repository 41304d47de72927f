//! Light/dark theme preference.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Cookie holding the visitor's explicit choice.
pub const THEME_COOKIE: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The active theme for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeContext {
    theme: Theme,
}

impl ThemeContext {
    /// A valid persisted preference wins over the system default.
    pub fn resolve(persisted: Option<&str>, system_default: Option<&str>) -> Self {
        let theme = persisted
            .and_then(Theme::parse)
            .or_else(|| system_default.and_then(Theme::parse))
            .unwrap_or_default();
        Self { theme }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn toggle(&mut self) -> Theme {
        self.theme = self.theme.flipped();
        self.theme
    }

    pub fn set(&mut self, theme: Theme) {
        self.theme = theme;
    }

    /// `Set-Cookie` value persisting the current theme for a year.
    pub fn cookie(&self) -> String {
        format!("{THEME_COOKIE}={}; Path=/; Max-Age=31536000; SameSite=Lax", self.theme)
    }
}

/// Value of cookie `name` in a `Cookie` request header.
pub fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|pair| {
        let (k, v) = pair.trim().split_once('=')?;
        (k == name).then_some(v.trim())
    })
}
