//! Re-validate every translation on disk against its canonical article.
//!
//! Usage:
//!   cargo run --bin audit
//!
//! Optional:
//! - CONTENT_DIR (defaults to content)
//!
//! Exits non-zero when any translation is rejected or cannot be read, or when
//! a canonical article breaks the article invariants. Translations of an
//! invalid canonical article are not checked.

use anyhow::{bail, Result};
use goalgazer::config::content_dir_from_env;
use goalgazer::content::{ContentStore, MatchArticle};
use goalgazer::i18n::{Language, TranslationValidator};
use serde_json::Value;
use tracing::{error, info, warn};

#[derive(Debug, Default)]
struct AuditSummary {
    checked: usize,
    rejected: Vec<String>,
    /// Matches with translations but no canonical article
    orphaned: Vec<String>,
}

/// Problems that make a canonical article unusable as a reference.
fn canonical_problems(canonical: &Value) -> Vec<String> {
    match serde_json::from_value::<MatchArticle>(canonical.clone()) {
        Ok(article) => article.check_invariants(),
        Err(e) => vec![format!("schema validation failed: {}", e)],
    }
}

async fn audit(store: &ContentStore) -> Result<AuditSummary> {
    let mut summary = AuditSummary::default();
    let canonical_lang = Language::canonical();

    for id in store.list_match_ids().await? {
        let canonical = match store.locate_match_raw(&id, canonical_lang).await {
            Ok(canonical) => canonical,
            Err(e) => {
                error!("{}: {}", id, e);
                summary.rejected.push(format!("{}/{}", id, canonical_lang));
                continue;
            }
        };

        if let Some(canonical) = &canonical {
            let problems = canonical_problems(canonical);
            if !problems.is_empty() {
                error!("{}/{}: {}", id, canonical_lang, problems.join("; "));
                summary.rejected.push(format!("{}/{}", id, canonical_lang));
                continue;
            }
        }

        for lang in Language::all_enabled()
            .into_iter()
            .filter(|lang| !lang.is_canonical())
        {
            let candidate = match store.locate_match_raw(&id, lang).await {
                Ok(Some(candidate)) => candidate,
                Ok(None) => continue,
                Err(e) => {
                    error!("{}/{}: {}", id, lang, e);
                    summary.rejected.push(format!("{}/{}", id, lang));
                    continue;
                }
            };

            let Some(canonical) = &canonical else {
                warn!("{}/{}: no canonical article to compare against", id, lang);
                summary.orphaned.push(format!("{}/{}", id, lang));
                continue;
            };

            summary.checked += 1;
            match TranslationValidator::validate_article(canonical, &candidate, lang) {
                Ok(report) => {
                    for warning in &report.warnings {
                        warn!("{}/{}: {}", id, lang, warning);
                    }
                }
                Err(failure) => {
                    error!("{}/{}: {}", id, lang, failure);
                    summary.rejected.push(format!("{}/{}", id, lang));
                }
            }
        }
    }

    Ok(summary)
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("goalgazer=info".parse()?)
                .add_directive("audit=info".parse()?),
        )
        .init();

    let store = ContentStore::new(content_dir_from_env());
    info!("Auditing translations under {}", store.root().display());

    let summary = audit(&store).await?;
    info!(
        "Checked {} translation(s), {} rejected, {} without canonical",
        summary.checked,
        summary.rejected.len(),
        summary.orphaned.len()
    );

    if !summary.rejected.is_empty() {
        bail!("Rejected translations: {}", summary.rejected.join(", "));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    fn canonical() -> Value {
        json!({
            "frontmatter": {
                "title": "Arsenal 2-1 Chelsea",
                "description": "Derby recap",
                "date": "2024-10-20",
                "matchId": "100",
                "league": "Premier League",
                "teams": ["Arsenal", "Chelsea"],
                "tags": ["derby"]
            },
            "match": {"matchId": "100", "home_team": "Arsenal", "away_team": "Chelsea",
                      "score": {"home": 2, "away": 1}},
            "sections": [{
                "heading": "Summary",
                "paragraphs": ["Arsenal won 2-1."],
                "claims": [{"claim": "Arsenal dominated.", "evidence": ["xG 2.1 vs 0.8"], "confidence": 0.8}]
            }]
        })
    }

    async fn store_with(dir: &TempDir, translations: &[(Language, Value)]) -> ContentStore {
        let store = ContentStore::new(dir.path());
        store
            .write_match("100", Language::ENGLISH, &canonical())
            .await
            .unwrap();
        for (lang, article) in translations {
            store.write_match("100", *lang, article).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_clean_translation_passes() {
        let dir = TempDir::new().unwrap();
        let mut ja = canonical();
        ja["frontmatter"]["title"] = json!("アーセナル 2-1 チェルシー");
        let store = store_with(&dir, &[(Language::JAPANESE, ja)]).await;

        let summary = audit(&store).await.unwrap();
        assert_eq!(summary.checked, 1);
        assert!(summary.rejected.is_empty());
    }

    #[tokio::test]
    async fn test_changed_score_is_rejected() {
        let dir = TempDir::new().unwrap();
        let mut zh = canonical();
        zh["match"]["score"]["home"] = json!(3);
        let store = store_with(&dir, &[(Language::CHINESE, zh)]).await;

        let summary = audit(&store).await.unwrap();
        assert_eq!(summary.rejected, vec!["100/zh".to_string()]);
    }

    #[tokio::test]
    async fn test_canonical_only_checks_nothing() {
        let dir = TempDir::new().unwrap();
        let store = store_with(&dir, &[]).await;

        let summary = audit(&store).await.unwrap();
        assert_eq!(summary.checked, 0);
        assert!(summary.rejected.is_empty());
    }

    #[tokio::test]
    async fn test_canonical_without_evidence_is_rejected() {
        let dir = TempDir::new().unwrap();
        let store = ContentStore::new(dir.path());
        let mut en = canonical();
        en["sections"][0]["claims"][0]["evidence"] = json!([]);
        store.write_match("100", Language::ENGLISH, &en).await.unwrap();
        store.write_match("100", Language::JAPANESE, &en).await.unwrap();

        let summary = audit(&store).await.unwrap();
        assert_eq!(summary.rejected, vec!["100/en".to_string()]);
        assert_eq!(summary.checked, 0);
    }
}
