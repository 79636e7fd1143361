//! Language registry: Single source of truth for all supported languages.
//!
//! Every site language, its aliases and its UI strings live here. The registry
//! is initialized once on first access via `OnceLock` and never mutated.

use crate::i18n::LanguageStrings;
use std::sync::OnceLock;

/// Configuration for a supported site language.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// ISO 639-1 language code used in content file names (e.g., "en", "ja")
    pub code: &'static str,

    /// English name of the language (e.g., "Japanese")
    pub name: &'static str,

    /// Native name of the language (e.g., "日本語")
    pub native_name: &'static str,

    /// Extra spellings accepted from URLs, cookies and headers (e.g., "jp")
    pub aliases: &'static [&'static str],

    /// Whether articles are generated in this language first (only one should be true)
    pub is_canonical: bool,

    /// Whether this language is served and translated into
    pub enabled: bool,

    /// Localized strings for API projections
    pub strings: LanguageStrings,
}

/// Global language registry singleton.
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

/// Global registry instance (initialized lazily)
static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the global language registry instance.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: default_languages(),
        })
    }

    /// Get a language configuration by its exact code.
    ///
    /// # Returns
    /// * `Some(&LanguageConfig)` if the language exists
    /// * `None` if the language is not found
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// Find a language by code or alias. Matching is ASCII case-insensitive.
    pub fn lookup(&self, tag: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| {
            lang.code.eq_ignore_ascii_case(tag)
                || lang.aliases.iter().any(|alias| alias.eq_ignore_ascii_case(tag))
        })
    }

    /// Get all enabled languages, canonical first.
    pub fn list_enabled(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().filter(|lang| lang.enabled).collect()
    }

    /// Get all languages (including disabled ones).
    pub fn list_all(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().collect()
    }

    /// Get the canonical language configuration.
    ///
    /// # Panics
    /// Panics if no canonical language is found or if multiple canonical
    /// languages are defined (this indicates a configuration error).
    pub fn canonical(&self) -> &LanguageConfig {
        let canonical_langs: Vec<_> = self
            .languages
            .iter()
            .filter(|lang| lang.is_canonical)
            .collect();

        match canonical_langs.len() {
            0 => panic!("No canonical language found in registry"),
            1 => canonical_langs[0],
            _ => panic!("Multiple canonical languages found in registry"),
        }
    }

    /// Check if a language code is supported and enabled.
    pub fn is_enabled(&self, code: &str) -> bool {
        self.get_by_code(code)
            .map(|lang| lang.enabled)
            .unwrap_or(false)
    }
}

/// Default language configurations: English (canonical), Japanese, Chinese.
fn default_languages() -> Vec<LanguageConfig> {
    vec![
        LanguageConfig {
            code: "en",
            name: "English",
            native_name: "English",
            aliases: &["eng"],
            is_canonical: true,
            enabled: true,
            strings: LanguageStrings::english(),
        },
        LanguageConfig {
            code: "ja",
            name: "Japanese",
            native_name: "日本語",
            aliases: &["jp", "jpn"],
            is_canonical: false,
            enabled: true,
            strings: LanguageStrings::japanese(),
        },
        LanguageConfig {
            code: "zh",
            name: "Chinese",
            native_name: "中文",
            aliases: &["cn", "zho", "chi"],
            is_canonical: false,
            enabled: true,
            strings: LanguageStrings::chinese(),
        },
    ]
}
