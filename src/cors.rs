//! Origin allowlist check.
//!
//! Computes the CORS header set for every response branch from one place so
//! the declared policy and the enforced policy never diverge. An origin is
//! echoed back only when it is an exact allowlist member or contains the
//! trusted production domain; everything else gets the canonical default
//! origin instead of a reflection.

use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::types::CorsConfig;

const ALLOW_METHODS: &str = "GET, POST, OPTIONS";
const ALLOW_HEADERS: &str = "Content-Type, Authorization, Origin";
const MAX_AGE_SECS: &str = "86400";

/// Immutable CORS policy, constructed once at startup.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    allowed_origins: Vec<String>,
    trusted_suffix: String,
    default_origin: String,
}

impl CorsPolicy {
    pub fn new(config: &CorsConfig) -> Self {
        Self {
            allowed_origins: config.allowed_origins.clone(),
            trusted_suffix: config.trusted_suffix.clone(),
            default_origin: config.default_origin.clone(),
        }
    }

    /// The origin value to grant for a caller's declared origin.
    fn grant_origin(&self, origin: Option<&str>) -> String {
        match origin {
            Some(o)
                if self.allowed_origins.iter().any(|a| a == o)
                    || (!self.trusted_suffix.is_empty() && o.contains(&self.trusted_suffix)) =>
            {
                o.to_string()
            }
            _ => self.default_origin.clone(),
        }
    }

    /// Full CORS header set for a request's declared origin.
    pub fn headers_for(&self, origin: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let grant = self.grant_origin(origin);
        // Origins are validated config/request strings; fall back to the
        // static default if one is somehow not a legal header value.
        let value = HeaderValue::from_str(&grant)
            .unwrap_or_else(|_| HeaderValue::from_static("https://textedge.pages.dev"));
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOW_METHODS),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        );
        headers.insert(
            header::ACCESS_CONTROL_MAX_AGE,
            HeaderValue::from_static(MAX_AGE_SECS),
        );
        headers
    }

    /// Dedicated preflight response: 204, CORS headers, no body. Reuses the
    /// same header computation as every other branch.
    pub fn preflight_response(&self, origin: Option<&str>) -> Response {
        (StatusCode::NO_CONTENT, self.headers_for(origin)).into_response()
    }
}
