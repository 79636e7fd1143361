//! Translate one match into the site languages and publish the results.
//!
//! Usage:
//!   cargo run --bin translate -- <match_id>                 # all non-canonical languages
//!   cargo run --bin translate -- <match_id> --lang ja       # only Japanese
//!   cargo run --bin translate -- <match_id> --skip-db       # files only
//!
//! Required environment variables:
//! - OPENAI_API_KEY
//! - DATABASE_URL
//!
//! Optional:
//! - CONTENT_DIR (defaults to content)
//! - OPENAI_MODEL, OPENAI_API_URL
//! - FALLBACK_LLM_API_URL, FALLBACK_LLM_API_KEY, FALLBACK_LLM_MODEL
//! - TRANSLATION_MAX_ATTEMPTS (defaults to 2)
//! - RETRY_DELAY_MS (defaults to 2000)

use anyhow::{bail, Context, Result};
use goalgazer::config::PipelineConfig;
use goalgazer::content::{ContentStore, MatchArticle};
use goalgazer::db::{Database, MatchContentRecord, MatchRecord};
use goalgazer::i18n::Language;
use goalgazer::llm::LlmClient;
use goalgazer::translation::translate_article;
use serde_json::Value;
use tracing::info;

#[derive(Debug, PartialEq)]
struct Args {
    match_id: String,
    languages: Vec<Language>,
    skip_db: bool,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args> {
    let mut match_id = None;
    let mut languages = Vec::new();
    let mut skip_db = false;

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--skip-db" => skip_db = true,
            "--lang" => {
                let code = args.next().context("--lang needs a language code")?;
                let lang = Language::from_code(&code)?;
                if !languages.contains(&lang) {
                    languages.push(lang);
                }
            }
            flag if flag.starts_with("--") => bail!("Unknown option: {}", flag),
            id => {
                if match_id.replace(id.to_string()).is_some() {
                    bail!("Only one match id may be given");
                }
            }
        }
    }

    let match_id = match_id.context("Usage: translate <match_id> [--lang <code>]... [--skip-db]")?;
    if languages.is_empty() {
        languages = Language::all_enabled()
            .into_iter()
            .filter(|lang| !lang.is_canonical())
            .collect();
    }

    Ok(Args {
        match_id,
        languages,
        skip_db,
    })
}

/// The canonical article every translation is checked against. It has to
/// satisfy the article invariants itself, or no translation could.
fn parse_canonical(canonical: &Value) -> Result<MatchArticle> {
    let article: MatchArticle = serde_json::from_value(canonical.clone())
        .context("Canonical article does not match the article schema")?;
    let problems = article.check_invariants();
    if !problems.is_empty() {
        bail!("Canonical article is invalid: {}", problems.join("; "));
    }
    Ok(article)
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("goalgazer=info".parse()?)
                .add_directive("translate=info".parse()?),
        )
        .init();

    let args = parse_args(std::env::args().skip(1))?;
    let config = PipelineConfig::from_env()?;
    let store = ContentStore::new(config.content_dir.clone());

    let canonical_lang = Language::canonical();
    let canonical: Value = store
        .locate_match_raw(&args.match_id, canonical_lang)
        .await?
        .with_context(|| {
            format!(
                "No {} article for match {} under {}",
                canonical_lang.code(),
                args.match_id,
                store.root().display()
            )
        })?;
    let article = parse_canonical(&canonical)?;

    let http = reqwest::Client::new();
    let client = LlmClient::from_config(http, &config);

    let mut accepted = vec![(canonical_lang, canonical.clone(), article.clone())];
    for lang in &args.languages {
        info!("Translating match {} to {}", args.match_id, lang.name());
        let translated = translate_article(&client, &config, &canonical, *lang).await?;
        let parsed: MatchArticle = serde_json::from_value(translated.clone())
            .context("Accepted translation does not match the article schema")?;

        let path = store.write_match(&args.match_id, *lang, &translated).await?;
        info!("Wrote {}", path.display());
        accepted.push((*lang, translated, parsed));
    }

    if args.skip_db {
        info!("Skipping database upsert");
        return Ok(());
    }

    let db = Database::connect(&config.database_url, config.database_max_connections).await?;
    db.init_schema().await?;

    db.upsert_match(&MatchRecord::from_article(&article)).await?;
    for (lang, raw, parsed) in &accepted {
        db.upsert_match_content(&MatchContentRecord::from_article(parsed, raw, *lang))
            .await?;
    }
    db.close().await;

    info!(
        "Published match {} in {} language(s)",
        args.match_id,
        accepted.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn canonical(evidence: Value) -> Value {
        json!({
            "frontmatter": {
                "title": "Arsenal 2-1 Chelsea",
                "description": "Derby recap",
                "date": "2024-10-20",
                "matchId": "100",
                "league": "Premier League",
                "teams": ["Arsenal", "Chelsea"],
                "tags": []
            },
            "match": {"matchId": "100", "home_team": "Arsenal", "away_team": "Chelsea"},
            "sections": [{
                "heading": "Summary",
                "paragraphs": ["Arsenal won 2-1."],
                "claims": [{"claim": "Arsenal dominated.", "evidence": evidence, "confidence": 0.8}]
            }]
        })
    }

    fn args(list: &[&str]) -> Result<Args> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_defaults_to_all_non_canonical_languages() {
        let parsed = args(&["100"]).unwrap();
        assert_eq!(parsed.match_id, "100");
        assert!(!parsed.skip_db);
        assert!(parsed.languages.contains(&Language::JAPANESE));
        assert!(parsed.languages.contains(&Language::CHINESE));
        assert!(!parsed.languages.contains(&Language::ENGLISH));
    }

    #[test]
    fn test_explicit_languages_are_deduplicated() {
        let parsed = args(&["--lang", "ja", "100", "--lang", "ja", "--skip-db"]).unwrap();
        assert_eq!(parsed.languages, vec![Language::JAPANESE]);
        assert!(parsed.skip_db);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(args(&[]).is_err());
        assert!(args(&["100", "200"]).is_err());
        assert!(args(&["100", "--lang"]).is_err());
        assert!(args(&["100", "--lang", "fr"]).is_err());
        assert!(args(&["100", "--force"]).is_err());
    }

    #[test]
    fn test_canonical_with_evidence_is_accepted() {
        let article = parse_canonical(&canonical(json!(["xG 2.1 vs 0.8"]))).unwrap();
        assert_eq!(article.frontmatter.match_id, "100");
    }

    #[test]
    fn test_canonical_claim_without_evidence_is_refused() {
        let err = parse_canonical(&canonical(json!([]))).unwrap_err();
        assert!(err.to_string().contains("sections[0].claims[0] has no evidence"));
    }

    #[test]
    fn test_canonical_outside_schema_is_refused() {
        assert!(parse_canonical(&json!({"frontmatter": {}})).is_err());
    }
}
