use crate::config::PipelineConfig;
use crate::i18n::{Language, TranslationValidator};
use crate::llm::{LlmClient, Prompt};
use crate::retry::with_retry;
use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use tracing::{info, warn};

/// Build the system prompt for translation
fn build_translation_system_prompt(target: Language) -> String {
    format!(
        r#"You are a professional football journalist and translator. Translate the match analysis JSON document you are given from English to {} ({}).

## Translation Rules

### DO translate (prose only):
- frontmatter.title, frontmatter.description and any call-to-action text
- Section headings, paragraphs and bullets
- The text of each claim (the "claim" field)
- Player note summaries
- Figure alt text and captions
- Data limitations

### NEVER change:
- Any JSON key, or the set of top-level keys
- The "match", "timeline", "team_stats", "players" and "data_provenance" objects
- Evidence strings: every "evidence" array is copied verbatim, character for character
- frontmatter date, matchId, league, teams, tags and heroImage
- Figure id, src, width, height and kind, and the number of figures
- Confidence values and ratings

### Style:
- Keep player, club and competition names in their usual form for readers of {}
- Keep every number exactly as written

Respond with the complete translated JSON document and nothing else."#,
        target.name(),
        target.code(),
        target.native_name()
    )
}

/// Build the user prompt for translation
fn build_translation_user_prompt(canonical: &Value, target: Language) -> Result<String> {
    let document =
        serde_json::to_string_pretty(canonical).context("Failed to serialize canonical article")?;
    Ok(format!(
        "Translate the following match analysis to {}:\n\n{}",
        target.name(),
        document
    ))
}

/// Models sometimes wrap JSON in a markdown code fence even in JSON mode.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Translate a canonical article into `target`.
///
/// The canonical language is returned unchanged. Otherwise each attempt asks
/// the model for a full translation and runs it through parity validation;
/// a rejected candidate is regenerated up to `translation_max_attempts`
/// times before giving up with the last failure.
pub async fn translate_article(
    client: &LlmClient,
    config: &PipelineConfig,
    canonical: &Value,
    target: Language,
) -> Result<Value> {
    if target.is_canonical() {
        return Ok(canonical.clone());
    }

    let system = build_translation_system_prompt(target);
    let user = build_translation_user_prompt(canonical, target)?;
    let retry = config.translation_retry();

    let candidate = with_retry(
        &retry,
        &format!("Translation to {}", target.name()),
        || async {
            let raw = client
                .complete(Prompt {
                    system: &system,
                    user: &user,
                    json_output: true,
                })
                .await?;

            let candidate: Value = serde_json::from_str(strip_code_fence(&raw))
                .context("translation response was not valid JSON")?;

            let report = TranslationValidator::validate_article(canonical, &candidate, target)
                .map_err(|failure| anyhow!("translation rejected: {}", failure))?;

            if report.has_warnings() {
                warn!(
                    "Translation validation warnings for {} ({}): {:?}",
                    target.name(),
                    target.code(),
                    report.warnings
                );
            }

            Ok::<_, anyhow::Error>(candidate)
        },
    )
    .await
    .with_context(|| {
        format!(
            "Translation to {} failed after {} attempt(s)",
            target.code(),
            retry.max_attempts.max(1)
        )
    })?;

    info!(lang = target.code(), "translation accepted");
    Ok(candidate)
}
