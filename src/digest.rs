//! Daily digests and the read seam the web tier uses to fetch them.

use crate::content::Resolved;
use crate::i18n::Language;
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One day's roundup for a league in one language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyDigest {
    pub date_str: String,
    pub lang: String,
    pub league: String,
    pub title: String,
    pub headline: String,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comic_image_url: Option<String>,
    #[serde(default)]
    pub financial_movements: Vec<FinancialMovement>,
    #[serde(default)]
    pub match_ids: Vec<String>,
}

/// A transfer, fee or other money story mentioned in a digest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialMovement {
    pub team: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

/// Read access to stored digests.
///
/// `league: None` means any league; when several match, the
/// alphabetically first league wins.
#[async_trait]
pub trait DigestSource: Send + Sync {
    async fn get_daily_digest(
        &self,
        date: &str,
        lang: Language,
        league: Option<&str>,
    ) -> Result<Option<DailyDigest>>;

    /// Most recent digest by date.
    async fn latest_daily_digest(
        &self,
        lang: Language,
        league: Option<&str>,
    ) -> Result<Option<DailyDigest>>;

    /// Newest first.
    async fn list_daily_digests(&self, lang: Language, limit: i64) -> Result<Vec<DailyDigest>>;
}

/// Check a `YYYY-MM-DD` date string.
pub fn parse_digest_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Fetch a digest in the requested language, falling back to the canonical
/// language. `date: None` asks for the latest digest.
pub async fn resolve_daily_digest(
    source: &dyn DigestSource,
    date: Option<&str>,
    requested: Language,
    league: Option<&str>,
) -> Result<Resolved<DailyDigest>> {
    let fetch = |lang: Language| async move {
        match date {
            Some(date) => source.get_daily_digest(date, lang, league).await,
            None => source.latest_daily_digest(lang, league).await,
        }
    };

    if let Some(digest) = fetch(requested).await? {
        return Ok(Resolved {
            article: Some(digest),
            resolved_lang: requested,
            fallback: false,
        });
    }

    let canonical = Language::canonical();
    let article = if requested != canonical {
        fetch(canonical).await?
    } else {
        None
    };

    Ok(Resolved {
        article,
        resolved_lang: canonical,
        fallback: requested != canonical,
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::sync::Mutex;

    /// In-memory digest store.
    #[derive(Default)]
    pub struct MemoryDigests {
        digests: Mutex<Vec<DailyDigest>>,
    }

    impl MemoryDigests {
        pub fn with(digests: Vec<DailyDigest>) -> Self {
            Self {
                digests: Mutex::new(digests),
            }
        }

        fn matching(&self, lang: Language, league: Option<&str>) -> Vec<DailyDigest> {
            let mut found: Vec<DailyDigest> = self
                .digests
                .lock()
                .unwrap()
                .iter()
                .filter(|d| d.lang == lang.code())
                .filter(|d| league.map_or(true, |l| d.league == l))
                .cloned()
                .collect();
            found.sort_by(|a, b| b.date_str.cmp(&a.date_str).then(a.league.cmp(&b.league)));
            found
        }
    }

    #[async_trait]
    impl DigestSource for MemoryDigests {
        async fn get_daily_digest(
            &self,
            date: &str,
            lang: Language,
            league: Option<&str>,
        ) -> Result<Option<DailyDigest>> {
            Ok(self
                .matching(lang, league)
                .into_iter()
                .find(|d| d.date_str == date))
        }

        async fn latest_daily_digest(
            &self,
            lang: Language,
            league: Option<&str>,
        ) -> Result<Option<DailyDigest>> {
            Ok(self.matching(lang, league).into_iter().next())
        }

        async fn list_daily_digests(&self, lang: Language, limit: i64) -> Result<Vec<DailyDigest>> {
            let mut found = self.matching(lang, None);
            found.truncate(limit.max(0) as usize);
            Ok(found)
        }
    }

    pub fn digest(date: &str, lang: &str, league: &str) -> DailyDigest {
        DailyDigest {
            date_str: date.to_string(),
            lang: lang.to_string(),
            league: league.to_string(),
            title: format!("{} roundup {}", league, date),
            headline: "Arsenal edge the derby".to_string(),
            summary: "Arsenal beat Chelsea 2-1.".to_string(),
            comic_image_url: Some(format!("https://cdn.example.com/comics/{}.png", date)),
            financial_movements: vec![FinancialMovement {
                team: "Chelsea".to_string(),
                description: "Loan fee agreed".to_string(),
                amount: Some(5_000_000.0),
                currency: Some("EUR".to_string()),
            }],
            match_ids: vec!["100".to_string()],
        }
    }
}
