//! HTTP surface: REST endpoints, the MCP tool endpoint and `llms.txt`.

mod error;
mod handlers;
mod mcp;

pub use error::ApiError;
pub use handlers::{request_language, DEFAULT_SEARCH_LIMIT, MAX_SEARCH_LIMIT};
pub use mcp::PROTOCOL_VERSION;

use crate::config::Config;
use crate::content::ContentStore;
use crate::digest::DigestSource;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;

// ============================================================================
// App State
// ============================================================================

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,

    /// Article files; also owns the resolver metrics
    pub content: ContentStore,

    pub digests: Arc<dyn DigestSource>,

    /// Server start time
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: Config, content: ContentStore, digests: Arc<dyn DigestSource>) -> Self {
        Self {
            config: Arc::new(config),
            content,
            digests,
            started_at: Instant::now(),
        }
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health_check))
        // Articles
        .route("/api/matches", get(handlers::list_matches))
        .route("/api/matches/:id", get(handlers::get_match))
        .route("/api/search", get(handlers::search))
        .route("/api/leagues/:league", get(handlers::get_league))
        .route("/api/digest", get(handlers::get_digest))
        // Agents
        .route("/api/mcp", post(mcp::handle))
        .route("/llms.txt", get(handlers::llms_txt))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
