//! Internationalization (i18n) support
//!
//! The kiosk ships Korean and English UI text in `locales/`. The `i18n!`
//! macro is initialized at the crate root (lib.rs); this module only picks
//! the active locale.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// UI language, stored in the config by locale code (`language = "ko"`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "en")]
    English,
    #[default]
    #[serde(rename = "ko")]
    Korean,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::Korean, Language::English];

    /// Locale code used by the translation files
    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Korean => "ko",
        }
    }

    /// Name in its own script, for pickers and logs
    pub fn native_name(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Korean => "한국어",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.native_name())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        Language::ALL
            .into_iter()
            .find(|lang| lang.code().eq_ignore_ascii_case(code.trim()))
            .ok_or_else(|| format!("unsupported language {:?}", code))
    }
}

/// Switch the locale used by `t!`
pub fn set_language(lang: Language) {
    tracing::debug!("UI language: {}", lang);
    rust_i18n::set_locale(lang.code());
}

/// The locale `t!` currently resolves against
pub fn current_language() -> Language {
    rust_i18n::locale().parse().unwrap_or_default()
}
