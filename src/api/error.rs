use crate::content::ContentError;
use crate::i18n::Language;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

/// Everything a handler can fail with. Bodies are always `{error, ...}` JSON.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("match {match_id} not found")]
    MatchNotFound { match_id: String, lang: Language },

    #[error("league {league} not found")]
    LeagueNotFound { league: String },

    #[error("daily digest not found")]
    DigestNotFound { lang: Language },

    #[error("{0}")]
    BadRequest(String),

    /// Logged in full, reported to the client without detail
    #[error("internal error: {0:#}")]
    Internal(#[from] anyhow::Error),
}

impl From<ContentError> for ApiError {
    fn from(e: ContentError) -> Self {
        ApiError::Internal(e.into())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MatchNotFound { .. }
            | ApiError::LeagueNotFound { .. }
            | ApiError::DigestNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::MatchNotFound { match_id, lang } => json!({
                "error": lang.config().strings.match_not_found,
                "matchId": match_id,
            }),
            ApiError::LeagueNotFound { league } => json!({
                "error": "League not found",
                "league": league,
            }),
            ApiError::DigestNotFound { lang } => json!({
                "error": lang.config().strings.digest_not_found,
            }),
            ApiError::BadRequest(message) => json!({ "error": message }),
            ApiError::Internal(e) => {
                error!("request failed: {:#}", e);
                json!({ "error": "Internal server error" })
            }
        };

        (status, Json(body)).into_response()
    }
}
