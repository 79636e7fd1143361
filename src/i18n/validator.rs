//! Translation parity validation.
//!
//! A machine translation is only accepted when every factual part of the
//! article is byte-for-byte what the canonical article says. Prose may change;
//! match data, evidence strings, locked frontmatter and figure geometry may not.

use crate::content::MatchArticle;
use crate::i18n::Language;
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Subtrees that hold facts and are never translated.
pub const FACT_SUBTREES: [&str; 5] = ["match", "timeline", "team_stats", "players", "data_provenance"];

/// Frontmatter fields that must match the canonical article exactly.
pub const LOCKED_FRONTMATTER: [&str; 6] = ["date", "matchId", "league", "teams", "tags", "heroImage"];

/// Figure fields that must match the canonical figure at the same index.
pub const LOCKED_FIGURE_FIELDS: [&str; 5] = ["id", "src", "width", "height", "kind"];

/// Why a candidate translation was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParityFailure {
    #[error("schema validation failed: {0}")]
    Schema(String),

    #[error("top-level keys differ (missing: {missing:?}, unexpected: {unexpected:?})")]
    KeySet {
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    #[error("fact subtree mismatch: {0}")]
    FactSubtree(&'static str),

    #[error("evidence arrays changed")]
    EvidenceChanged,

    #[error("locked frontmatter field changed: {0}")]
    LockedFrontmatter(&'static str),

    #[error("figure count changed: expected {expected}, got {actual}")]
    FigureCount { expected: usize, actual: usize },

    #[error("locked figure field changed: figures[{index}].{field}")]
    LockedFigure { index: usize, field: &'static str },

    #[error("article invariant violated: {0}")]
    Invariant(String),
}

/// Non-blocking findings for an accepted translation. Rejections are
/// reported as [`ParityFailure`] instead.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Check if the report is clean (no warnings)
    pub fn is_clean(&self) -> bool {
        !self.has_warnings()
    }
}

/// Validator for translation quality.
pub struct TranslationValidator;

static NUMBER_REGEX: OnceLock<Regex> = OnceLock::new();

impl TranslationValidator {
    /// Check a candidate translation against its canonical article.
    ///
    /// Checks run in a fixed order and the first failure is returned:
    /// schema, top-level keys, fact subtrees, evidence, locked frontmatter,
    /// figures, then the article invariants (every claim cites evidence).
    /// A passing candidate may still carry warnings.
    pub fn validate_article(
        canonical: &Value,
        candidate: &Value,
        target: Language,
    ) -> Result<ValidationReport, ParityFailure> {
        let article: MatchArticle = serde_json::from_value(candidate.clone())
            .map_err(|e| ParityFailure::Schema(e.to_string()))?;
        if let Some(problem) = article.check_structure().into_iter().next() {
            return Err(ParityFailure::Schema(problem));
        }

        Self::check_key_set(canonical, candidate)?;

        for name in FACT_SUBTREES {
            if canonical.get(name) != candidate.get(name) {
                return Err(ParityFailure::FactSubtree(name));
            }
        }

        if flatten_evidence(canonical) != flatten_evidence(candidate) {
            return Err(ParityFailure::EvidenceChanged);
        }

        for field in LOCKED_FRONTMATTER {
            if frontmatter_field(canonical, field) != frontmatter_field(candidate, field) {
                return Err(ParityFailure::LockedFrontmatter(field));
            }
        }

        Self::check_figures(canonical, candidate)?;

        if let Some(problem) = article.check_invariants().into_iter().next() {
            return Err(ParityFailure::Invariant(problem));
        }

        Ok(Self::prose_warnings(canonical, candidate, target))
    }

    fn check_key_set(canonical: &Value, candidate: &Value) -> Result<(), ParityFailure> {
        let expected = top_level_keys(canonical);
        let actual = top_level_keys(candidate);
        if expected == actual {
            return Ok(());
        }

        Err(ParityFailure::KeySet {
            missing: expected.difference(&actual).map(|k| k.to_string()).collect(),
            unexpected: actual.difference(&expected).map(|k| k.to_string()).collect(),
        })
    }

    fn check_figures(canonical: &Value, candidate: &Value) -> Result<(), ParityFailure> {
        let expected = array_at(canonical, "figures");
        let actual = array_at(candidate, "figures");
        if expected.len() != actual.len() {
            return Err(ParityFailure::FigureCount {
                expected: expected.len(),
                actual: actual.len(),
            });
        }

        for (index, (a, b)) in expected.iter().zip(actual).enumerate() {
            for field in LOCKED_FIGURE_FIELDS {
                if a.get(field) != b.get(field) {
                    return Err(ParityFailure::LockedFigure { index, field });
                }
            }
        }
        Ok(())
    }

    fn prose_warnings(canonical: &Value, candidate: &Value, target: Language) -> ValidationReport {
        let mut report = ValidationReport::new();

        if !target.is_canonical()
            && frontmatter_field(canonical, "title") == frontmatter_field(candidate, "title")
        {
            report
                .warnings
                .push(format!("title left untranslated for '{}'", target.code()));
        }

        let expected_sections = array_at(canonical, "sections");
        let actual_sections = array_at(candidate, "sections");
        if expected_sections.len() != actual_sections.len() {
            report.warnings.push(format!(
                "section count changed: canonical has {}, translation has {}",
                expected_sections.len(),
                actual_sections.len()
            ));
        }

        for (i, (a, b)) in expected_sections.iter().zip(actual_sections).enumerate() {
            let expected = Self::extract_numbers(&paragraph_text(a));
            let actual = Self::extract_numbers(&paragraph_text(b));
            if expected != actual {
                report.warnings.push(format!(
                    "numeric tokens differ in sections[{}]: canonical has {:?}, translation has {:?}",
                    i, expected, actual
                ));
            }
        }

        report
    }

    /// Numeric tokens in order of appearance.
    fn extract_numbers(text: &str) -> Vec<String> {
        let regex = NUMBER_REGEX.get_or_init(|| Regex::new(r"\d+(?:\.\d+)?").unwrap());
        regex.find_iter(text).map(|m| m.as_str().to_string()).collect()
    }
}

fn top_level_keys(value: &Value) -> BTreeSet<&str> {
    value
        .as_object()
        .map(|map| map.keys().map(String::as_str).collect())
        .unwrap_or_default()
}

fn array_at<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn frontmatter_field<'a>(value: &'a Value, field: &str) -> Option<&'a Value> {
    value.get("frontmatter").and_then(|fm| fm.get(field))
}

/// All claim evidence in section order, followed by all player-note evidence.
fn flatten_evidence(value: &Value) -> Vec<&Value> {
    let claim_evidence = array_at(value, "sections")
        .iter()
        .flat_map(|section| array_at(section, "claims"))
        .flat_map(|claim| array_at(claim, "evidence"));
    let note_evidence = array_at(value, "player_notes")
        .iter()
        .flat_map(|note| array_at(note, "evidence"));

    claim_evidence.chain(note_evidence).collect()
}

fn paragraph_text(section: &Value) -> String {
    array_at(section, "paragraphs")
        .iter()
        .filter_map(Value::as_str)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::model::fixtures::{canonical_article_json, japanese_translation_json};
    use proptest::prelude::*;
    use serde_json::json;

    fn validate(candidate: &Value) -> Result<ValidationReport, ParityFailure> {
        TranslationValidator::validate_article(
            &canonical_article_json(),
            candidate,
            Language::JAPANESE,
        )
    }

    // ==================== Article Parity Tests ====================

    #[test]
    fn test_prose_only_translation_passes() {
        let report = validate(&japanese_translation_json()).unwrap();
        assert!(report.is_clean(), "unexpected warnings: {:?}", report.warnings);
    }

    #[test]
    fn test_dropped_evidence_is_rejected() {
        let mut candidate = japanese_translation_json();
        for section in candidate["sections"].as_array_mut().unwrap() {
            for claim in section["claims"].as_array_mut().unwrap() {
                claim.as_object_mut().unwrap().remove("evidence");
            }
        }

        let err = validate(&candidate).unwrap_err();
        assert_eq!(err, ParityFailure::EvidenceChanged);
        assert_eq!(err.to_string(), "evidence arrays changed");
    }

    #[test]
    fn test_translated_evidence_is_rejected() {
        let mut candidate = japanese_translation_json();
        candidate["player_notes"][0]["evidence"] = json!(["キーパス2本"]);
        assert_eq!(validate(&candidate).unwrap_err(), ParityFailure::EvidenceChanged);
    }

    #[test]
    fn test_changed_team_stats_is_rejected() {
        let mut candidate = japanese_translation_json();
        candidate["team_stats"]["xg"]["home"] = json!(2.8);

        let err = validate(&candidate).unwrap_err();
        assert_eq!(err.to_string(), "fact subtree mismatch: team_stats");
    }

    #[test]
    fn test_changed_match_is_rejected() {
        let mut candidate = japanese_translation_json();
        candidate["match"]["venue"] = json!("エミレーツ・スタジアム");
        assert_eq!(
            validate(&candidate).unwrap_err(),
            ParityFailure::FactSubtree("match")
        );
    }

    #[test]
    fn test_key_set_mismatch_is_reported() {
        let mut candidate = japanese_translation_json();
        let object = candidate.as_object_mut().unwrap();
        object.remove("data_citations");
        object.insert("notes".to_string(), json!("extra"));

        match validate(&candidate).unwrap_err() {
            ParityFailure::KeySet {
                missing,
                unexpected,
            } => {
                assert_eq!(missing, vec!["data_citations"]);
                assert_eq!(unexpected, vec!["notes"]);
            }
            other => panic!("unexpected failure: {other}"),
        }
    }

    #[test]
    fn test_schema_failure_comes_first() {
        let mut candidate = japanese_translation_json();
        candidate["sections"][0]["claims"][0]["confidence"] = json!(1.5);
        candidate["team_stats"] = json!({});

        assert!(matches!(
            validate(&candidate).unwrap_err(),
            ParityFailure::Schema(_)
        ));
    }

    #[test]
    fn test_unparseable_candidate_is_schema_failure() {
        assert!(matches!(
            validate(&json!({"frontmatter": "nope"})).unwrap_err(),
            ParityFailure::Schema(_)
        ));
    }

    #[test]
    fn test_locked_frontmatter_is_enforced() {
        let mut candidate = japanese_translation_json();
        candidate["frontmatter"]["teams"] = json!(["アーセナル", "チェルシー"]);
        assert_eq!(
            validate(&candidate).unwrap_err(),
            ParityFailure::LockedFrontmatter("teams")
        );
    }

    #[test]
    fn test_locked_figure_fields_are_enforced() {
        let mut candidate = japanese_translation_json();
        candidate["figures"][0]["src"] = json!("/images/100/xg-ja.png");
        assert_eq!(
            validate(&candidate).unwrap_err(),
            ParityFailure::LockedFigure {
                index: 0,
                field: "src"
            }
        );
    }

    #[test]
    fn test_figure_count_is_enforced() {
        let mut candidate = japanese_translation_json();
        candidate["figures"] = json!([]);
        candidate["sections"][0]["figures"] = json!([]);
        assert_eq!(
            validate(&candidate).unwrap_err(),
            ParityFailure::FigureCount {
                expected: 1,
                actual: 0
            }
        );
    }

    #[test]
    fn test_warnings_do_not_reject() {
        let mut candidate = japanese_translation_json();
        candidate["frontmatter"]["title"] = canonical_article_json()["frontmatter"]["title"].clone();
        candidate["sections"][1]["paragraphs"] = json!(["ホームチームは高い位置で12回ボールを奪った。"]);

        let report = validate(&candidate).unwrap();
        assert_eq!(report.warnings.len(), 2);
        assert!(report.warnings[0].contains("untranslated"));
        assert!(report.warnings[1].contains("sections[1]"));
    }

    #[test]
    fn test_claim_without_evidence_is_rejected_even_when_unchanged() {
        let mut canonical = canonical_article_json();
        canonical["sections"][0]["claims"][0]["evidence"] = json!([]);
        let mut candidate = japanese_translation_json();
        candidate["sections"][0]["claims"][0]["evidence"] = json!([]);

        let err = TranslationValidator::validate_article(&canonical, &candidate, Language::JAPANESE)
            .unwrap_err();
        assert_eq!(
            err,
            ParityFailure::Invariant("sections[0].claims[0] has no evidence".to_string())
        );
    }

    #[test]
    fn test_untranslated_title_is_fine_for_canonical_target() {
        let canonical = canonical_article_json();
        let report =
            TranslationValidator::validate_article(&canonical, &canonical, Language::ENGLISH)
                .unwrap();
        assert!(report.is_clean());
    }

    proptest! {
        #[test]
        fn prop_any_score_change_is_rejected(home in 0u32..20, away in 0u32..20) {
            prop_assume!((home, away) != (2, 1));
            let mut candidate = japanese_translation_json();
            candidate["match"]["score"] = json!({"home": home, "away": away});
            prop_assert_eq!(validate(&candidate).unwrap_err(), ParityFailure::FactSubtree("match"));
        }

        #[test]
        fn prop_any_evidence_edit_is_rejected(text in "[a-z0-9 ]{1,20}") {
            prop_assume!(text != "xG 1.8 vs 0.6");
            let mut candidate = japanese_translation_json();
            candidate["sections"][1]["claims"][0]["evidence"] = json!([text]);
            prop_assert_eq!(validate(&candidate).unwrap_err(), ParityFailure::EvidenceChanged);
        }

        #[test]
        fn prop_extra_figures_are_rejected(extra in 1usize..4) {
            let mut candidate = japanese_translation_json();
            let figure = candidate["figures"][0].clone();
            let figures = candidate["figures"].as_array_mut().unwrap();
            for i in 0..extra {
                let mut copy = figure.clone();
                copy["id"] = json!(format!("fig-extra-{}", i));
                figures.push(copy);
            }
            let rejected = matches!(
                validate(&candidate).unwrap_err(),
                ParityFailure::FigureCount { .. }
            );
            prop_assert!(rejected);
        }
    }

    // ==================== Helper Tests ====================

    #[test]
    fn test_extract_numbers() {
        assert_eq!(
            TranslationValidator::extract_numbers("xG 1.8対0.6、11回"),
            vec!["1.8", "0.6", "11"]
        );
    }

    #[test]
    fn test_validation_report_states() {
        let mut report = ValidationReport::new();
        assert!(report.is_clean());
        report.warnings.push("w".to_string());
        assert!(!report.is_clean());
    }
}
