//! REST handlers and the read operations they share with the MCP endpoint.

use super::{ApiError, AppState};
use crate::content::{ContentError, ContentStore, LeagueOverview, MatchArticle, MatchIndexEntry};
use crate::digest::{parse_digest_date, resolve_daily_digest, DailyDigest};
use crate::i18n::{Language, MetricsReport};
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap},
    response::IntoResponse,
    Json,
};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

pub const DEFAULT_SEARCH_LIMIT: usize = 20;
pub const MAX_SEARCH_LIMIT: usize = 100;

/// Cookie names that may carry a language preference
const LANGUAGE_COOKIES: [&str; 2] = ["lang", "NEXT_LOCALE"];

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct LangQuery {
    pub lang: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub lang: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DigestQuery {
    pub date: Option<String>,
    pub lang: Option<String>,
    pub league: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub resolver: MetricsReport,
}

#[derive(Debug, Serialize)]
pub struct MatchListResponse {
    pub lang: Language,
    pub count: usize,
    pub matches: Vec<MatchIndexEntry>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchDetailResponse {
    pub match_id: String,
    pub requested_lang: Language,
    pub resolved_lang: Language,
    pub fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    pub available_languages: Vec<Language>,
    pub article: MatchArticle,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub lang: Language,
    pub count: usize,
    pub results: Vec<MatchIndexEntry>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueResponse {
    pub requested_lang: Language,
    pub resolved_lang: Language,
    pub fallback: bool,
    pub overview: LeagueOverview,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DigestResponse {
    pub requested_lang: Language,
    pub resolved_lang: Language,
    pub fallback: bool,
    pub digest: DailyDigest,
}

// ============================================================================
// Language Selection
// ============================================================================

/// Pick the response language: explicit `lang` parameter, then a language
/// cookie, then `Accept-Language`, then the canonical language.
pub fn request_language(query_lang: Option<&str>, headers: &HeaderMap) -> Language {
    if let Some(lang) = query_lang.filter(|l| !l.trim().is_empty()) {
        return Language::normalize(Some(lang));
    }

    let from_cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .filter(|(name, _)| LANGUAGE_COOKIES.contains(name))
        .find_map(|(_, value)| Language::from_tag(value));
    if let Some(lang) = from_cookie {
        return lang;
    }

    headers
        .get(header::ACCEPT_LANGUAGE)
        .and_then(|value| value.to_str().ok())
        .and_then(Language::from_accept_language)
        .unwrap_or_else(Language::canonical)
}

// ============================================================================
// Shared Operations
// ============================================================================

/// Localized listing, newest first.
pub(super) async fn latest_matches(
    content: &ContentStore,
    lang: Language,
) -> Result<Vec<MatchIndexEntry>, ContentError> {
    let mut entries: Vec<MatchIndexEntry> =
        content.read_match_index_localized(lang).await?.collect().await;
    entries.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| b.match_id.cmp(&a.match_id))
    });
    Ok(entries)
}

/// Keyword search over the localized listing. An empty query lists the
/// latest matches.
pub(super) async fn search_matches(
    content: &ContentStore,
    query: &str,
    lang: Language,
    limit: Option<usize>,
) -> Result<Vec<MatchIndexEntry>, ContentError> {
    let limit = limit
        .unwrap_or(DEFAULT_SEARCH_LIMIT)
        .clamp(1, MAX_SEARCH_LIMIT);

    Ok(latest_matches(content, lang)
        .await?
        .into_iter()
        .filter(|entry| entry.matches_keyword(query))
        .take(limit)
        .collect())
}

pub(super) async fn match_detail(
    content: &ContentStore,
    match_id: &str,
    requested: Language,
) -> Result<MatchDetailResponse, ApiError> {
    let resolved = content.resolve_match(match_id, requested).await?;
    let Some(article) = resolved.article else {
        return Err(ApiError::MatchNotFound {
            match_id: match_id.to_string(),
            lang: requested,
        });
    };

    let notice = resolved.fallback.then(|| {
        requested
            .config()
            .strings
            .fallback_notice_for(resolved.resolved_lang.native_name())
    });

    Ok(MatchDetailResponse {
        match_id: match_id.to_string(),
        requested_lang: requested,
        resolved_lang: resolved.resolved_lang,
        fallback: resolved.fallback,
        notice,
        available_languages: content.available_languages(match_id).await?,
        article,
    })
}

pub(super) async fn digest_detail(
    state: &AppState,
    date: Option<&str>,
    requested: Language,
    league: Option<&str>,
) -> Result<DigestResponse, ApiError> {
    let date = date.map(str::trim).filter(|d| !d.is_empty());
    if let Some(date) = date {
        if parse_digest_date(date).is_none() {
            return Err(ApiError::BadRequest(format!(
                "invalid date '{}', expected YYYY-MM-DD",
                date
            )));
        }
    }
    let league = league.map(str::trim).filter(|l| !l.is_empty());

    let resolved = resolve_daily_digest(state.digests.as_ref(), date, requested, league).await?;
    match resolved.article {
        Some(digest) => Ok(DigestResponse {
            requested_lang: requested,
            resolved_lang: resolved.resolved_lang,
            fallback: resolved.fallback,
            digest,
        }),
        None => Err(ApiError::DigestNotFound { lang: requested }),
    }
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.started_at.elapsed().as_secs(),
        resolver: state.content.metrics().report(),
    })
}

pub async fn list_matches(
    State(state): State<AppState>,
    Query(query): Query<LangQuery>,
    headers: HeaderMap,
) -> Result<Json<MatchListResponse>, ApiError> {
    let lang = request_language(query.lang.as_deref(), &headers);
    let matches = latest_matches(&state.content, lang).await?;

    Ok(Json(MatchListResponse {
        lang,
        count: matches.len(),
        matches,
    }))
}

pub async fn get_match(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
    Query(query): Query<LangQuery>,
    headers: HeaderMap,
) -> Result<Json<MatchDetailResponse>, ApiError> {
    let lang = request_language(query.lang.as_deref(), &headers);
    Ok(Json(match_detail(&state.content, &match_id, lang).await?))
}

pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
    headers: HeaderMap,
) -> Result<Json<SearchResponse>, ApiError> {
    let lang = request_language(query.lang.as_deref(), &headers);
    let q = query.q.unwrap_or_default();
    let results = search_matches(&state.content, &q, lang, query.limit).await?;

    Ok(Json(SearchResponse {
        query: q,
        lang,
        count: results.len(),
        results,
    }))
}

pub async fn get_league(
    State(state): State<AppState>,
    Path(league): Path<String>,
    Query(query): Query<LangQuery>,
    headers: HeaderMap,
) -> Result<Json<LeagueResponse>, ApiError> {
    let lang = request_language(query.lang.as_deref(), &headers);
    let resolved = state.content.resolve_league(&league, lang).await?;

    match resolved.article {
        Some(overview) => Ok(Json(LeagueResponse {
            requested_lang: lang,
            resolved_lang: resolved.resolved_lang,
            fallback: resolved.fallback,
            overview,
        })),
        None => Err(ApiError::LeagueNotFound { league }),
    }
}

pub async fn get_digest(
    State(state): State<AppState>,
    Query(query): Query<DigestQuery>,
    headers: HeaderMap,
) -> Result<Json<DigestResponse>, ApiError> {
    let lang = request_language(query.lang.as_deref(), &headers);
    let response = digest_detail(
        &state,
        query.date.as_deref(),
        lang,
        query.league.as_deref(),
    )
    .await?;
    Ok(Json(response))
}

/// Plain-text site manifest for language models.
pub async fn llms_txt(
    State(state): State<AppState>,
    Query(query): Query<LangQuery>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let lang = request_language(query.lang.as_deref(), &headers);
    let matches = latest_matches(&state.content, lang).await?;
    let body = render_llms_txt(&state.config.site_name, &state.config.site_url, lang, &matches);

    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body))
}

const LLMS_TXT_MATCH_LIMIT: usize = 30;

fn render_llms_txt(
    site_name: &str,
    site_url: &str,
    lang: Language,
    matches: &[MatchIndexEntry],
) -> String {
    let strings = &lang.config().strings;
    let mut out = String::new();

    // Writing to a String cannot fail
    let _ = writeln!(out, "# {}\n", site_name);
    let _ = writeln!(out, "> {}\n", strings.site_description);

    let _ = writeln!(out, "## API\n");
    let _ = writeln!(out, "- {}/api/matches?lang={}: localized match list", site_url, lang);
    let _ = writeln!(out, "- {}/api/matches/{{id}}?lang={}: match analysis", site_url, lang);
    let _ = writeln!(out, "- {}/api/search?q={{query}}&lang={}: keyword search", site_url, lang);
    let _ = writeln!(out, "- {}/api/digest?date={{YYYY-MM-DD}}&lang={}: {}", site_url, lang, strings.daily_digest_heading);
    let _ = writeln!(out, "- {}/api/mcp: JSON-RPC 2.0 tools (search_matches, get_match, get_daily_digest)\n", site_url);

    let _ = writeln!(out, "## {}\n", strings.latest_matches_heading);
    for entry in matches.iter().take(LLMS_TXT_MATCH_LIMIT) {
        let _ = writeln!(
            out,
            "- [{}]({}/{}/matches/{}): {} {}",
            entry.title, site_url, lang, entry.match_id, entry.date, entry.league
        );
    }

    out
}
