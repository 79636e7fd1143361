//! Internationalization (i18n) module.
//!
//! All language-related logic lives here: the registry of site languages,
//! the request-side normalizer, localized API strings, fallback metrics and
//! the translation parity validator used by the batch pipeline.
//!
//! # Architecture
//!
//! - `registry`: Single source of truth for supported languages and aliases
//! - `language`: `Language` type, strict parsing and total normalization
//! - `strings`: Localized strings for API projections
//! - `validator`: Translation parity checks (facts, evidence, locked fields)
//! - `metrics`: Counters for how content lookups were satisfied
//!
//! # Example
//!
//! ```rust,ignore
//! use goalgazer::i18n::Language;
//!
//! let lang = Language::normalize(Some("ja-JP"));
//! assert_eq!(lang.code(), "ja");
//! assert_eq!(Language::normalize(Some("klingon")), Language::canonical());
//! ```

mod language;
mod metrics;
mod registry;
mod strings;
mod validator;

pub use language::Language;
pub use metrics::{MetricsReport, ResolutionOutcome, ResolverMetrics};
pub use registry::{LanguageConfig, LanguageRegistry};
pub use strings::LanguageStrings;
pub use validator::{ParityFailure, TranslationValidator, ValidationReport};
