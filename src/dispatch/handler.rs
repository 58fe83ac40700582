//! Request dispatcher — per-call state machine, terminal at first response.
//!
//! Order of checks, first match wins:
//! 1. `OPTIONS` → preflight 204
//! 2. rate limit per caller identity → 429
//! 3. `GET /health` → status report
//! 4. non-POST → 405; unparseable body → 400
//! 5. text field (`text` | `prompt`, first non-blank) → 400 on missing/oversize
//! 6. registry resolve → 404 with the list of known paths
//! 7. credential presence (fails closed, no upstream call) → 500
//! 8. compose prompt, single provider call
//! 9. envelope success/failure
//!
//! Every branch carries the CORS headers computed at step 0.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::to_bytes;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::{header, HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use chrono::Utc;
use serde_json::{json, Value};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::cors::CorsPolicy;
use crate::dispatch::rate_limiter::RateLimiter;
use crate::gateway::Provider;
use crate::registry::EndpointRegistry;
use crate::types::{Config, Error, Result};

/// Maximum accepted input text length, in characters.
pub const MAX_INPUT_CHARS: usize = 50_000;

/// Body size cap for the JSON payload (chars * UTF-8 worst case, rounded up).
const MAX_BODY_BYTES: usize = 1024 * 1024;

const SERVICE_NAME: &str = "textedge-ai-proxy";

/// Shared dispatcher state. Immutable configuration plus the advisory rate
/// limiter (the only mutable cross-request state, behind a lock).
#[derive(Debug)]
pub struct AppState {
    pub registry: EndpointRegistry,
    pub provider: Arc<dyn Provider>,
    pub cors: CorsPolicy,
    pub limiter: Mutex<RateLimiter>,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config, registry: EndpointRegistry, provider: Arc<dyn Provider>) -> Self {
        Self {
            cors: CorsPolicy::new(&config.cors),
            limiter: Mutex::new(RateLimiter::new(config.rate_limit.clone())),
            registry,
            provider,
            config,
        }
    }
}

/// Single entry point for every inbound call (installed as the router
/// fallback so route resolution stays in the endpoint registry).
pub async fn dispatch(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Request,
) -> Response {
    let request_id = Uuid::new_v4();
    let origin = request
        .headers()
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let cors = state.cors.headers_for(origin.as_deref());

    if request.method() == Method::OPTIONS {
        return state.cors.preflight_response(origin.as_deref());
    }

    let caller = caller_identity(request.headers(), peer);
    if let Err(e) = state.limiter.lock().await.check_rate_limit(&caller) {
        tracing::warn!(%request_id, caller = %caller, "rate limit exceeded");
        return error_response(&state, &e, cors);
    }

    let method = request.method().clone();
    let path = request.uri().path().to_string();

    if path == "/health" && method == Method::GET {
        return json_response(StatusCode::OK, cors, health_body(&state));
    }

    let started = std::time::Instant::now();
    match handle_tool_call(&state, &method, &path, request).await {
        Ok(body) => {
            tracing::info!(
                %request_id,
                path = %path,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "tool call succeeded"
            );
            json_response(StatusCode::OK, cors, body)
        }
        Err(e) => {
            tracing::warn!(
                %request_id,
                path = %path,
                kind = e.kind(),
                error = %e,
                "tool call failed"
            );
            error_response(&state, &e, cors)
        }
    }
}

/// Steps 4-9 of the state machine. Any error short-circuits to the caller.
async fn handle_tool_call(
    state: &AppState,
    method: &Method,
    path: &str,
    request: Request,
) -> Result<Value> {
    if method != Method::POST {
        return Err(Error::method_not_allowed(format!(
            "{method} is not accepted for tool invocation"
        )));
    }

    let bytes = to_bytes(request.into_body(), MAX_BODY_BYTES)
        .await
        .map_err(|e| Error::invalid_payload(format!("failed to read request body: {e}")))?;
    let payload: Value = serde_json::from_slice(&bytes)
        .map_err(|e| Error::invalid_payload(format!("body is not valid JSON: {e}")))?;

    let input = extract_input_text(&payload)?;

    let tool = state
        .registry
        .resolve(path)
        .ok_or_else(|| Error::unknown_route(path))?;

    // Fail closed before any upstream network call is attempted.
    if state.config.upstream.api_key.trim().is_empty() {
        return Err(Error::configuration(
            "upstream API key is not configured",
        ));
    }

    let prompt = format!("{}\n\n{}", tool.prompt_template, input);
    let content = state.provider.generate(&prompt, &tool.params).await?;

    Ok(json!({
        "success": true,
        "content": content,
        "tool": tool.display_name,
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// Extract the text field: `text` or `prompt`, first non-blank wins.
fn extract_input_text(payload: &Value) -> Result<String> {
    let input = ["text", "prompt"]
        .iter()
        .find_map(|key| {
            payload
                .get(*key)
                .and_then(Value::as_str)
                .filter(|s| !s.trim().is_empty())
        })
        .ok_or_else(|| {
            Error::missing_input("field 'text' or 'prompt' must be a non-empty string")
        })?;

    let chars = input.chars().count();
    if chars > MAX_INPUT_CHARS {
        return Err(Error::input_too_large(format!(
            "{chars} characters exceeds the {MAX_INPUT_CHARS} character maximum"
        )));
    }
    Ok(input.to_string())
}

/// Caller identity for rate limiting: first `X-Forwarded-For` hop when
/// present, else the peer address.
fn caller_identity(headers: &HeaderMap, peer: SocketAddr) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| peer.ip().to_string())
}

fn health_body(state: &AppState) -> Value {
    json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "service": SERVICE_NAME,
        "provider": state.provider.name(),
        "hasApiKey": !state.config.upstream.api_key.trim().is_empty(),
        "version": env!("CARGO_PKG_VERSION"),
    })
}

fn json_response(status: StatusCode, cors: HeaderMap, body: Value) -> Response {
    (status, cors, Json(body)).into_response()
}

fn error_response(state: &AppState, error: &Error, cors: HeaderMap) -> Response {
    let mut body = json!({
        "success": false,
        "error": error.to_string(),
        "timestamp": Utc::now().to_rfc3339(),
    });
    // Unknown routes additionally list the valid paths.
    if let Error::UnknownRoute(path) = error {
        body["path"] = json!(path);
        body["availableEndpoints"] = json!(state.registry.route_paths());
    }
    json_response(error.http_status(), cors, body)
}
