//! Language type: validated language representation and the request-side
//! normalizer.
//!
//! `Language::normalize` is the total function used at every serving entry
//! point (path segment, query parameter, cookie, header). `Language::from_code`
//! is the strict form used by batch tooling, where an unknown code is an
//! operator error.

use crate::i18n::{LanguageConfig, LanguageRegistry};
use anyhow::{bail, Result};
use serde::{Serialize, Serializer};
use std::fmt;

/// A validated, enabled language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Language {
    /// ISO 639-1 language code (e.g., "en", "ja")
    code: &'static str,
}

impl Language {
    pub const ENGLISH: Language = Language { code: "en" };
    pub const JAPANESE: Language = Language { code: "ja" };
    pub const CHINESE: Language = Language { code: "zh" };

    /// Create a Language from an exact language code.
    ///
    /// # Returns
    /// * `Ok(Language)` if the code is valid and the language is enabled
    /// * `Err` if the code is not found or the language is disabled
    pub fn from_code(code: &str) -> Result<Language> {
        let registry = LanguageRegistry::get();

        match registry.get_by_code(code) {
            Some(config) if config.enabled => Ok(Language { code: config.code }),
            Some(_) => bail!("Language '{}' is not enabled", code),
            None => bail!("Unknown language code: '{}'", code),
        }
    }

    /// Map any user-supplied string onto a supported language.
    ///
    /// Accepts codes, registered aliases and BCP 47-ish tags with region or
    /// script suffixes (`ja-JP`, `zh_Hans`). Anything else, including `None`
    /// and the empty string, yields the canonical language. Never fails.
    pub fn normalize(input: Option<&str>) -> Language {
        input
            .and_then(Self::from_tag)
            .unwrap_or_else(Self::canonical)
    }

    /// Pick the first supported language from an `Accept-Language` header.
    ///
    /// Entries are taken in header order; quality values are ignored, which
    /// matches how browsers order the list.
    pub fn from_accept_language(header: &str) -> Option<Language> {
        header
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .filter_map(|part| part.split(';').next())
            .find_map(|tag| Self::from_tag(tag.trim()))
    }

    /// Strict counterpart of [`normalize`](Self::normalize): `None` when the
    /// tag names no supported language.
    pub fn from_tag(tag: &str) -> Option<Language> {
        let tag = tag.trim();
        if tag.is_empty() {
            return None;
        }
        let primary = tag.split(['-', '_']).next().unwrap_or(tag);

        let registry = LanguageRegistry::get();
        registry
            .lookup(tag)
            .or_else(|| registry.lookup(primary))
            .filter(|config| config.enabled)
            .map(|config| Language { code: config.code })
    }

    /// Get the canonical (source) language.
    ///
    /// Articles are generated in this language first and every translation is
    /// validated against it.
    pub fn canonical() -> Language {
        let config = LanguageRegistry::get().canonical();
        Language { code: config.code }
    }

    /// All enabled languages, canonical first.
    pub fn all_enabled() -> Vec<Language> {
        LanguageRegistry::get()
            .list_enabled()
            .into_iter()
            .map(|config| Language { code: config.code })
            .collect()
    }

    /// Get the ISO 639-1 language code.
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Get the full language configuration from the registry.
    ///
    /// # Panics
    /// Panics if the language code is not found in the registry. This cannot
    /// happen for values built through `from_code`, `normalize` or the constants.
    pub fn config(&self) -> &'static LanguageConfig {
        LanguageRegistry::get()
            .get_by_code(self.code)
            .expect("Language code should always be valid")
    }

    /// English name of the language (e.g., "Japanese").
    pub fn name(&self) -> &'static str {
        self.config().name
    }

    /// Native name of the language (e.g., "日本語").
    pub fn native_name(&self) -> &'static str {
        self.config().native_name
    }

    pub fn is_canonical(&self) -> bool {
        self.config().is_canonical
    }
}

impl Default for Language {
    fn default() -> Self {
        Self::canonical()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code)
    }
}

impl Serialize for Language {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code)
    }
}
