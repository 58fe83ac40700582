//! Dispatcher integration tests — full HTTP round-trips against a live
//! listener, with a spy provider (call counting) and a mock upstream API.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::post;
use axum::Router;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use textedge::dispatch::{build_app, AppState};
use textedge::gateway::{GeminiProvider, GenerationParams, Provider};
use textedge::registry::EndpointRegistry;
use textedge::types::{RateLimitConfig, Result};
use textedge::Config;

/// Provider double that counts calls and returns fixed content.
struct SpyProvider {
    calls: Arc<AtomicUsize>,
    content: String,
}

#[async_trait]
impl Provider for SpyProvider {
    fn name(&self) -> &'static str {
        "spy"
    }

    async fn generate(&self, _prompt: &str, _params: &GenerationParams) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.content.clone())
    }
}

fn spy_provider(content: &str) -> (Arc<SpyProvider>, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let provider = Arc::new(SpyProvider {
        calls: Arc::clone(&calls),
        content: content.to_string(),
    });
    (provider, calls)
}

fn test_config(api_key: &str) -> Config {
    let mut config = Config::default();
    config.upstream.api_key = api_key.to_string();
    config
}

/// Spin up the dispatcher on a random port, return its address.
async fn start_app(state: Arc<AppState>) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = build_app(state);
    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });
    addr
}

async fn start_spy_app(api_key: &str) -> (SocketAddr, Arc<AtomicUsize>) {
    let (provider, calls) = spy_provider("generated text");
    let state = Arc::new(AppState::new(
        test_config(api_key),
        EndpointRegistry::builtin(),
        provider,
    ));
    (start_app(state).await, calls)
}

/// Mock upstream API that always answers with the given status and body.
async fn mock_upstream(status: u16, body: Value) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().route(
        "/generate",
        post(move || {
            let body = body.clone();
            async move { (StatusCode::from_u16(status).unwrap(), Json(body)) }
        }),
    );
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Dispatcher wired to a real Gemini provider pointed at a mock upstream.
async fn start_gemini_app(upstream_status: u16, upstream_body: Value) -> SocketAddr {
    let upstream = mock_upstream(upstream_status, upstream_body).await;
    let mut config = test_config("test-key");
    config.upstream.base_url = Some(format!("http://{upstream}/generate"));
    let provider = Arc::new(GeminiProvider::new(&config.upstream).unwrap());
    let state = Arc::new(AppState::new(config, EndpointRegistry::builtin(), provider));
    start_app(state).await
}

async fn post_text(addr: SocketAddr, path: &str, text: &str) -> (u16, Value) {
    let response = reqwest::Client::new()
        .post(format!("http://{addr}{path}"))
        .json(&json!({ "text": text }))
        .send()
        .await
        .unwrap();
    let status = response.status().as_u16();
    let body: Value = response.json().await.unwrap();
    (status, body)
}

// =============================================================================
// Preflight and CORS
// =============================================================================

#[tokio::test]
async fn preflight_echoes_allowlisted_origin() {
    let (addr, _) = start_spy_app("key").await;
    let response = reqwest::Client::new()
        .request(
            reqwest::Method::OPTIONS,
            format!("http://{addr}/ai/paraphrase"),
        )
        .header("Origin", "http://localhost:5000")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 204);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .unwrap(),
        "http://localhost:5000"
    );
}

#[tokio::test]
async fn preflight_unknown_origin_gets_canonical_default() {
    let (addr, _) = start_spy_app("key").await;
    let response = reqwest::Client::new()
        .request(reqwest::Method::OPTIONS, format!("http://{addr}/anything"))
        .header("Origin", "https://evil.example")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 204);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .unwrap(),
        "https://textedge.pages.dev"
    );
}

#[tokio::test]
async fn error_branches_carry_cors_headers() {
    let (addr, _) = start_spy_app("key").await;
    let response = reqwest::Client::new()
        .post(format!("http://{addr}/ai/nope"))
        .json(&json!({"text": "hi"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 404);
    assert!(response
        .headers()
        .contains_key("access-control-allow-origin"));
}

// =============================================================================
// Validation short-circuits (provider must never be called)
// =============================================================================

#[tokio::test]
async fn unknown_route_is_404_and_never_reaches_provider() {
    let (addr, calls) = start_spy_app("key").await;
    let (status, body) = post_text(addr, "/ai/translate", "bonjour").await;

    assert_eq!(status, 404);
    assert_eq!(body["success"], false);
    assert_eq!(
        body["availableEndpoints"].as_array().unwrap().len(),
        6,
        "404 lists the valid paths"
    );
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn oversize_input_is_400_without_provider_call() {
    let (addr, calls) = start_spy_app("key").await;
    let (status, body) = post_text(addr, "/ai/paraphrase", &"x".repeat(50_001)).await;

    assert_eq!(status, 400);
    assert!(body["error"].as_str().unwrap().contains("input too large"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn whitespace_text_is_missing_input() {
    let (addr, calls) = start_spy_app("key").await;
    let (status, body) = post_text(addr, "/ai/grammar", "   \n ").await;

    assert_eq!(status, 400);
    assert!(body["error"].as_str().unwrap().contains("missing input"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn malformed_body_is_invalid_payload() {
    let (addr, calls) = start_spy_app("key").await;
    let response = reqwest::Client::new()
        .post(format!("http://{addr}/ai/improve"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("invalid request payload"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn get_on_tool_path_is_405() {
    let (addr, _) = start_spy_app("key").await;
    let response = reqwest::Client::new()
        .get(format!("http://{addr}/ai/paraphrase"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 405);
}

#[tokio::test]
async fn missing_credential_fails_closed_before_upstream() {
    let (provider, calls) = spy_provider("never seen");
    let state = Arc::new(AppState::new(
        test_config(""),
        EndpointRegistry::builtin(),
        provider,
    ));
    let addr = start_app(state).await;

    let (status, body) = post_text(addr, "/ai/paraphrase", "hello").await;
    assert_eq!(status, 500);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("configuration error"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

// =============================================================================
// Success path and health
// =============================================================================

#[tokio::test]
async fn successful_generation_returns_envelope() {
    let (addr, calls) = start_spy_app("key").await;
    let (status, body) = post_text(addr, "/ai/paraphrase", "rewrite me").await;

    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert_eq!(body["content"], "generated text");
    assert_eq!(body["tool"], "Paraphrasing Tool");
    assert!(body["timestamp"].as_str().is_some());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn health_reports_service_and_key_presence() {
    let (addr, _) = start_spy_app("key").await;
    let response = reqwest::Client::new()
        .get(format!("http://{addr}/health"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "textedge-ai-proxy");
    assert_eq!(body["hasApiKey"], true);
    assert!(body["version"].as_str().is_some());
}

// =============================================================================
// Upstream failure classification (real provider, mock upstream)
// =============================================================================

#[tokio::test]
async fn upstream_429_surfaces_as_rate_limited() {
    let addr = start_gemini_app(429, json!({"error": "quota"})).await;
    let (status, body) = post_text(addr, "/ai/paraphrase", "hello").await;

    assert_eq!(status, 429);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("rate limit"));
}

#[tokio::test]
async fn upstream_500_surfaces_as_unavailable() {
    let addr = start_gemini_app(500, json!({"error": "boom"})).await;
    let (status, body) = post_text(addr, "/ai/grammar", "hello").await;

    assert_eq!(status, 503);
    assert!(body["error"].as_str().unwrap().contains("unavailable"));
}

#[tokio::test]
async fn upstream_403_surfaces_as_auth_failure() {
    let addr = start_gemini_app(403, json!({"error": "forbidden"})).await;
    let (status, body) = post_text(addr, "/ai/detect", "hello").await;

    assert_eq!(status, 500);
    assert!(body["error"].as_str().unwrap().contains("authentication"));
}

#[tokio::test]
async fn empty_generated_fragment_is_failure_not_success() {
    let envelope = json!({
        "candidates": [{ "content": { "parts": [{ "text": "   " }] } }]
    });
    let addr = start_gemini_app(200, envelope).await;
    let (status, body) = post_text(addr, "/ai/humanize", "hello").await;

    assert_eq!(status, 500);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("empty"));
}

#[tokio::test]
async fn well_formed_upstream_envelope_succeeds() {
    let envelope = json!({
        "candidates": [{ "content": { "parts": [{ "text": "polished output" }] } }]
    });
    let addr = start_gemini_app(200, envelope).await;
    let (status, body) = post_text(addr, "/ai/improve", "raw input").await;

    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert_eq!(body["content"], "polished output");
    assert_eq!(body["tool"], "Text Improver");
}

// =============================================================================
// Rate limiting
// =============================================================================

#[tokio::test]
async fn quota_exhaustion_returns_429_envelope() {
    let (provider, _) = spy_provider("ok");
    let mut config = test_config("key");
    config.rate_limit = RateLimitConfig {
        max_requests: 2,
        window: std::time::Duration::from_secs(60),
    };
    let state = Arc::new(AppState::new(config, EndpointRegistry::builtin(), provider));
    let addr = start_app(state).await;

    let client = reqwest::Client::new();
    for _ in 0..2 {
        let response = client
            .get(format!("http://{addr}/health"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 200);
    }

    let response = client
        .get(format!("http://{addr}/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 429);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("rate limit"));
}
