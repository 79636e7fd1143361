use crate::content::layout::LEAGUE_LAYOUTS;
use crate::content::{ContentError, ContentStore, Resolved};
use crate::i18n::{Language, ResolutionOutcome};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// Per-league landing page content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueOverview {
    #[serde(default)]
    pub league: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ContentStore {
    /// Resolve a league overview: requested language, then canonical.
    pub async fn resolve_league(
        &self,
        league: &str,
        requested: Language,
    ) -> Result<Resolved<LeagueOverview>, ContentError> {
        if let Some(overview) = self.locate(league, requested, &LEAGUE_LAYOUTS).await? {
            self.metrics().record(ResolutionOutcome::Direct);
            return Ok(Resolved {
                article: Some(overview),
                resolved_lang: requested,
                fallback: false,
            });
        }

        let canonical = Language::canonical();
        let article = if requested != canonical {
            self.locate(league, canonical, &LEAGUE_LAYOUTS).await?
        } else {
            None
        };

        if article.is_some() {
            debug!(league, requested = requested.code(), "serving canonical league overview");
            self.metrics().record(ResolutionOutcome::CanonicalFallback);
        } else {
            debug!(league, requested = requested.code(), "league overview not found");
            self.metrics().record(ResolutionOutcome::Miss);
        }

        Ok(Resolved {
            article,
            resolved_lang: canonical,
            fallback: requested != canonical,
        })
    }
}
