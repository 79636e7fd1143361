//! JSON-RPC 2.0 endpoint exposing read-only tools to agents.
//!
//! Tools run the same operations as the REST handlers and return their JSON
//! as a single text content block.

use super::handlers::{digest_detail, match_detail, search_matches};
use super::{ApiError, AppState};
use crate::i18n::Language;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

pub const PROTOCOL_VERSION: &str = "2024-11-05";

const PARSE_ERROR: i64 = -32700;
const INVALID_REQUEST: i64 = -32600;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;
const INTERNAL_ERROR: i64 = -32603;

#[derive(Debug, Serialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

impl RpcError {
    fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RpcRequest {
    jsonrpc: String,
    method: String,
    #[serde(default)]
    params: Value,
}

#[derive(Debug, Deserialize)]
struct ToolCall {
    name: String,
    #[serde(default)]
    arguments: Value,
}

#[derive(Debug, Deserialize)]
struct SearchArgs {
    query: String,
    lang: Option<String>,
    limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct MatchArgs {
    match_id: String,
    lang: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct DigestArgs {
    date: Option<String>,
    lang: Option<String>,
    league: Option<String>,
}

fn response(id: Value, outcome: Result<Value, RpcError>) -> Response {
    let body = match outcome {
        Ok(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
        Err(error) => json!({ "jsonrpc": "2.0", "id": id, "error": error }),
    };
    Json(body).into_response()
}

pub async fn handle(State(state): State<AppState>, body: Bytes) -> Response {
    let raw: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(e) => {
            return response(
                Value::Null,
                Err(RpcError::new(PARSE_ERROR, format!("Parse error: {}", e))),
            )
        }
    };

    if raw.is_array() {
        return response(
            Value::Null,
            Err(RpcError::new(INVALID_REQUEST, "Batch requests are not supported")),
        );
    }
    // A notification has no `id` member at all; `"id": null` still gets a reply
    let is_notification = raw.get("id").is_none();
    let id = raw.get("id").cloned().unwrap_or(Value::Null);

    let request: RpcRequest = match serde_json::from_value(raw) {
        Ok(request) => request,
        Err(e) => {
            return response(
                id,
                Err(RpcError::new(INVALID_REQUEST, format!("Invalid request: {}", e))),
            )
        }
    };
    if request.jsonrpc != "2.0" {
        return response(
            id,
            Err(RpcError::new(INVALID_REQUEST, "jsonrpc must be \"2.0\"")),
        );
    }

    if is_notification {
        debug!(method = %request.method, "mcp notification");
        return StatusCode::ACCEPTED.into_response();
    }

    let outcome = dispatch(&state, &request.method, request.params).await;
    response(id, outcome)
}

async fn dispatch(state: &AppState, method: &str, params: Value) -> Result<Value, RpcError> {
    match method {
        "initialize" => Ok(json!({
            "protocolVersion": PROTOCOL_VERSION,
            "serverInfo": {
                "name": state.config.site_name,
                "version": env!("CARGO_PKG_VERSION"),
            },
            "capabilities": { "tools": {} },
        })),
        "ping" => Ok(json!({})),
        "tools/list" => Ok(json!({ "tools": tool_definitions() })),
        "tools/call" => {
            let call: ToolCall = parse_params(params)?;
            call_tool(state, call).await
        }
        other => Err(RpcError::new(
            METHOD_NOT_FOUND,
            format!("Method not found: {}", other),
        )),
    }
}

fn parse_params<T: serde::de::DeserializeOwned>(params: Value) -> Result<T, RpcError> {
    serde_json::from_value(params)
        .map_err(|e| RpcError::new(INVALID_PARAMS, format!("Invalid params: {}", e)))
}

fn lang_arg(lang: Option<&str>) -> Language {
    Language::normalize(lang)
}

fn text_result(payload: &impl Serialize, is_error: bool) -> Result<Value, RpcError> {
    let text = serde_json::to_string_pretty(payload)
        .map_err(|e| RpcError::new(INTERNAL_ERROR, e.to_string()))?;
    Ok(json!({
        "content": [{ "type": "text", "text": text }],
        "isError": is_error,
    }))
}

/// Not-found becomes a tool result with `isError`; bad input and
/// internal failures are protocol errors.
fn tool_failure(e: ApiError) -> Result<Value, RpcError> {
    match e {
        ApiError::BadRequest(message) => Err(RpcError::new(INVALID_PARAMS, message)),
        ApiError::Internal(e) => {
            warn!("mcp tool failed: {:#}", e);
            Err(RpcError::new(INTERNAL_ERROR, "Internal error"))
        }
        not_found => text_result(&json!({ "error": not_found.to_string() }), true),
    }
}

async fn call_tool(state: &AppState, call: ToolCall) -> Result<Value, RpcError> {
    match call.name.as_str() {
        "search_matches" => {
            let args: SearchArgs = parse_params(call.arguments)?;
            let lang = lang_arg(args.lang.as_deref());
            match search_matches(&state.content, &args.query, lang, args.limit).await {
                Ok(results) => text_result(&results, false),
                Err(e) => tool_failure(e.into()),
            }
        }
        "get_match" => {
            let args: MatchArgs = parse_params(call.arguments)?;
            let lang = lang_arg(args.lang.as_deref());
            match match_detail(&state.content, &args.match_id, lang).await {
                Ok(detail) => text_result(&detail, false),
                Err(e) => tool_failure(e),
            }
        }
        "get_daily_digest" => {
            let args: DigestArgs = if call.arguments.is_null() {
                DigestArgs::default()
            } else {
                parse_params(call.arguments)?
            };
            let lang = lang_arg(args.lang.as_deref());
            match digest_detail(state, args.date.as_deref(), lang, args.league.as_deref()).await {
                Ok(digest) => text_result(&digest, false),
                Err(e) => tool_failure(e),
            }
        }
        other => Err(RpcError::new(
            INVALID_PARAMS,
            format!("Unknown tool: {}", other),
        )),
    }
}

fn tool_definitions() -> Value {
    let lang = json!({
        "type": "string",
        "description": "Language code (en, ja, zh). Unknown codes fall back to English."
    });

    json!([
        {
            "name": "search_matches",
            "description": "Search match recaps by keyword over titles, teams and leagues.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "query": { "type": "string" },
                    "lang": lang,
                    "limit": { "type": "integer", "minimum": 1, "maximum": 100 }
                },
                "required": ["query"]
            }
        },
        {
            "name": "get_match",
            "description": "Fetch the full analysis for one match, falling back to English.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "match_id": { "type": "string" },
                    "lang": lang
                },
                "required": ["match_id"]
            }
        },
        {
            "name": "get_daily_digest",
            "description": "Fetch a daily digest by date (YYYY-MM-DD), or the latest one.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "date": { "type": "string", "pattern": "^\\d{4}-\\d{2}-\\d{2}$" },
                    "lang": lang,
                    "league": { "type": "string" }
                }
            }
        }
    ])
}
