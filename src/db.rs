use crate::content::MatchArticle;
use crate::digest::{DailyDigest, DigestSource, FinancialMovement};
use crate::i18n::Language;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::Value;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;
use tracing::info;

/// One fixture, language independent.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRecord {
    pub match_id: String,
    pub league: String,
    pub season: Option<String>,
    pub home_team: Option<String>,
    pub away_team: Option<String>,
    pub date_utc: Option<DateTime<Utc>>,
    pub score: Option<String>,
    pub image: Option<String>,
}

impl MatchRecord {
    pub fn from_article(article: &MatchArticle) -> Self {
        let fixture = &article.fixture;
        let date = fixture
            .date
            .as_deref()
            .unwrap_or(article.frontmatter.date.as_str());

        Self {
            match_id: article.frontmatter.match_id.clone(),
            league: fixture
                .league
                .clone()
                .unwrap_or_else(|| article.frontmatter.league.clone()),
            season: fixture.season.as_ref().map(|season| match season {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            }),
            home_team: fixture.home_team.as_ref().map(|t| t.name().to_string()),
            away_team: fixture.away_team.as_ref().map(|t| t.name().to_string()),
            date_utc: kickoff_utc(date, fixture.time.as_deref()),
            score: fixture.score.as_ref().and_then(|s| s.display()),
            image: article.frontmatter.hero_image.clone(),
        }
    }
}

/// Kickoff as UTC; a missing or unreadable time means midnight.
fn kickoff_utc(date: &str, time: Option<&str>) -> Option<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(date.get(..10)?, "%Y-%m-%d").ok()?;
    let time = time
        .and_then(|t| NaiveTime::parse_from_str(t, "%H:%M").ok())
        .unwrap_or(NaiveTime::MIN);
    Some(NaiveDateTime::new(date, time).and_utc())
}

/// One language's rendering of a fixture.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MatchContentRecord {
    pub match_id: String,
    pub lang: String,
    pub title: String,
    pub description: String,
    pub slug: String,
    pub content: Json<Value>,
}

impl MatchContentRecord {
    pub fn from_article(article: &MatchArticle, raw: &Value, lang: Language) -> Self {
        let fm = &article.frontmatter;
        Self {
            match_id: fm.match_id.clone(),
            lang: lang.code().to_string(),
            title: fm.title.clone(),
            description: fm.description.clone(),
            slug: fm.slug.clone().unwrap_or_else(|| fm.match_id.clone()),
            content: Json(raw.clone()),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct DigestRow {
    date_str: String,
    lang: String,
    league: String,
    title: String,
    headline: String,
    summary: String,
    comic_image_url: Option<String>,
    financial_movements: Json<Vec<FinancialMovement>>,
    match_ids: Json<Vec<Value>>,
}

impl From<DigestRow> for DailyDigest {
    fn from(row: DigestRow) -> Self {
        Self {
            date_str: row.date_str,
            lang: row.lang,
            league: row.league,
            title: row.title,
            headline: row.headline,
            summary: row.summary,
            comic_image_url: row.comic_image_url,
            financial_movements: row.financial_movements.0,
            match_ids: row.match_ids.0.into_iter().filter_map(id_string).collect(),
        }
    }
}

/// Match ids were written both as strings and numbers.
fn id_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

const DIGEST_COLUMNS: &str = "date_str, lang, league, title, headline, summary, \
     comic_image_url, financial_movements, match_ids";

/// Postgres access. Create once at startup and share; clones share the pool.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Open a bounded connection pool.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("Failed to connect to database")?;

        info!(max_connections, "Database pool ready");
        Ok(Self { pool })
    }

    /// Close every pooled connection. Call once at shutdown.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Create tables if they do not exist yet
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS matches (
                match_id TEXT PRIMARY KEY,
                league TEXT NOT NULL,
                season TEXT,
                home_team TEXT,
                away_team TEXT,
                date_utc TIMESTAMPTZ,
                score TEXT,
                image TEXT
            )",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create matches table")?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS match_content (
                id BIGSERIAL PRIMARY KEY,
                match_id TEXT NOT NULL,
                lang TEXT NOT NULL,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                slug TEXT NOT NULL,
                content JSONB NOT NULL,
                UNIQUE (match_id, lang)
            )",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create match_content table")?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS daily_digests (
                id BIGSERIAL PRIMARY KEY,
                date_str TEXT NOT NULL,
                lang TEXT NOT NULL,
                league TEXT NOT NULL,
                title TEXT NOT NULL,
                headline TEXT NOT NULL,
                summary TEXT NOT NULL,
                comic_image_url TEXT,
                financial_movements JSONB NOT NULL DEFAULT '[]'::jsonb,
                match_ids JSONB NOT NULL DEFAULT '[]'::jsonb,
                UNIQUE (date_str, lang, league)
            )",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create daily_digests table")?;

        Ok(())
    }

    pub async fn upsert_match(&self, record: &MatchRecord) -> Result<()> {
        sqlx::query(
            "INSERT INTO matches (match_id, league, season, home_team, away_team, date_utc, score, image)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             ON CONFLICT (match_id) DO UPDATE SET
                league = EXCLUDED.league,
                season = EXCLUDED.season,
                home_team = EXCLUDED.home_team,
                away_team = EXCLUDED.away_team,
                date_utc = EXCLUDED.date_utc,
                score = EXCLUDED.score,
                image = EXCLUDED.image",
        )
        .bind(&record.match_id)
        .bind(&record.league)
        .bind(&record.season)
        .bind(&record.home_team)
        .bind(&record.away_team)
        .bind(record.date_utc)
        .bind(&record.score)
        .bind(&record.image)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to upsert match {}", record.match_id))?;

        Ok(())
    }

    pub async fn upsert_match_content(&self, record: &MatchContentRecord) -> Result<()> {
        sqlx::query(
            "INSERT INTO match_content (match_id, lang, title, description, slug, content)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (match_id, lang) DO UPDATE SET
                title = EXCLUDED.title,
                description = EXCLUDED.description,
                slug = EXCLUDED.slug,
                content = EXCLUDED.content",
        )
        .bind(&record.match_id)
        .bind(&record.lang)
        .bind(&record.title)
        .bind(&record.description)
        .bind(&record.slug)
        .bind(&record.content)
        .execute(&self.pool)
        .await
        .with_context(|| {
            format!(
                "Failed to upsert content for match {} ({})",
                record.match_id, record.lang
            )
        })?;

        Ok(())
    }

    pub async fn get_match_content(
        &self,
        match_id: &str,
        lang: Language,
    ) -> Result<Option<MatchContentRecord>> {
        sqlx::query_as::<_, MatchContentRecord>(
            "SELECT match_id, lang, title, description, slug, content
             FROM match_content WHERE match_id = $1 AND lang = $2",
        )
        .bind(match_id)
        .bind(lang.code())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to load match content")
    }

    pub async fn upsert_daily_digest(&self, digest: &DailyDigest) -> Result<()> {
        sqlx::query(
            "INSERT INTO daily_digests (date_str, lang, league, title, headline, summary,
                                        comic_image_url, financial_movements, match_ids)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             ON CONFLICT (date_str, lang, league) DO UPDATE SET
                title = EXCLUDED.title,
                headline = EXCLUDED.headline,
                summary = EXCLUDED.summary,
                comic_image_url = EXCLUDED.comic_image_url,
                financial_movements = EXCLUDED.financial_movements,
                match_ids = EXCLUDED.match_ids",
        )
        .bind(&digest.date_str)
        .bind(&digest.lang)
        .bind(&digest.league)
        .bind(&digest.title)
        .bind(&digest.headline)
        .bind(&digest.summary)
        .bind(&digest.comic_image_url)
        .bind(Json(&digest.financial_movements))
        .bind(Json(&digest.match_ids))
        .execute(&self.pool)
        .await
        .with_context(|| {
            format!(
                "Failed to upsert digest {} {} ({})",
                digest.date_str, digest.league, digest.lang
            )
        })?;

        Ok(())
    }

    /// Comic already generated for this league and day in any language.
    ///
    /// Lets a generator reuse one image across languages instead of paying
    /// for a new one; whether to reuse is the caller's call.
    pub async fn shared_comic_url(&self, date: &str, league: &str) -> Result<Option<String>> {
        sqlx::query_scalar::<_, String>(
            "SELECT comic_image_url FROM daily_digests
             WHERE date_str = $1 AND league = $2 AND comic_image_url IS NOT NULL
             ORDER BY lang LIMIT 1",
        )
        .bind(date)
        .bind(league)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to look up shared comic")
    }
}

#[async_trait]
impl DigestSource for Database {
    async fn get_daily_digest(
        &self,
        date: &str,
        lang: Language,
        league: Option<&str>,
    ) -> Result<Option<DailyDigest>> {
        let row = sqlx::query_as::<_, DigestRow>(&format!(
            "SELECT {} FROM daily_digests
             WHERE date_str = $1 AND lang = $2 AND ($3::text IS NULL OR league = $3)
             ORDER BY league LIMIT 1",
            DIGEST_COLUMNS
        ))
        .bind(date)
        .bind(lang.code())
        .bind(league)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to load daily digest")?;

        Ok(row.map(DailyDigest::from))
    }

    async fn latest_daily_digest(
        &self,
        lang: Language,
        league: Option<&str>,
    ) -> Result<Option<DailyDigest>> {
        let row = sqlx::query_as::<_, DigestRow>(&format!(
            "SELECT {} FROM daily_digests
             WHERE lang = $1 AND ($2::text IS NULL OR league = $2)
             ORDER BY date_str DESC, league LIMIT 1",
            DIGEST_COLUMNS
        ))
        .bind(lang.code())
        .bind(league)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to load latest daily digest")?;

        Ok(row.map(DailyDigest::from))
    }

    async fn list_daily_digests(&self, lang: Language, limit: i64) -> Result<Vec<DailyDigest>> {
        let rows = sqlx::query_as::<_, DigestRow>(&format!(
            "SELECT {} FROM daily_digests
             WHERE lang = $1
             ORDER BY date_str DESC, league LIMIT $2",
            DIGEST_COLUMNS
        ))
        .bind(lang.code())
        .bind(limit.max(0))
        .fetch_all(&self.pool)
        .await
        .context("Failed to list daily digests")?;

        Ok(rows.into_iter().map(DailyDigest::from).collect())
    }
}
