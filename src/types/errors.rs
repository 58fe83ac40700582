//! Application error types.
//!
//! All errors use `thiserror` for automatic Error trait derivation and provide
//! clear error messages with context. Every error is terminal for the current
//! request: nothing is retried internally, and every failure is surfaced to
//! the caller as a JSON envelope with an HTTP status from `http_status`.

use axum::http::StatusCode;
use thiserror::Error;

/// Application result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error enum for the textedge service.
#[derive(Error, Debug)]
pub enum Error {
    /// Request body was not valid structured data (maps to 400).
    #[error("invalid request payload: {0}")]
    InvalidPayload(String),

    /// Text field missing or blank (maps to 400).
    #[error("missing input: {0}")]
    MissingInput(String),

    /// Input text exceeds the maximum length (maps to 400).
    #[error("input too large: {0}")]
    InputTooLarge(String),

    /// Route path not present in the endpoint registry (maps to 404).
    #[error("unknown route: {0}")]
    UnknownRoute(String),

    /// HTTP method not accepted for the path (maps to 405).
    #[error("method not allowed: {0}")]
    MethodNotAllowed(String),

    /// Caller exceeded the advisory rate limit (maps to 429).
    #[error("rate limit exceeded: {0}")]
    RateLimited(String),

    /// Required configuration absent; fails closed before any upstream call
    /// (maps to 500).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Upstream rejected the request as malformed (upstream 400, maps to 400).
    #[error("upstream rejected request: {0}")]
    BadRequest(String),

    /// Upstream credential rejected (upstream 401/403, maps to 500 — the
    /// caller cannot fix our credential).
    #[error("upstream authentication failed: {0}")]
    AuthFailure(String),

    /// Upstream returned 5xx (maps to 503).
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Network-level failure reaching the upstream: DNS, TLS, timeout
    /// (maps to 503).
    #[error("connection failure: {0}")]
    ConnectionFailure(String),

    /// Upstream answered 2xx but the generated fragment was missing or blank
    /// (maps to 500 — never surfaced as success).
    #[error("empty upstream response: {0}")]
    EmptyResponse(String),

    /// Upstream failure that fits no other classification (maps to 500).
    #[error("upstream request failed: {0}")]
    UnknownUpstream(String),

    /// Internal errors (maps to 500).
    #[error("internal error: {0}")]
    Internal(String),

    /// I/O errors (maps to 500).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// HTTP status for the caller-facing response envelope.
    pub fn http_status(&self) -> StatusCode {
        match self {
            Error::InvalidPayload(_)
            | Error::MissingInput(_)
            | Error::InputTooLarge(_)
            | Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::UnknownRoute(_) => StatusCode::NOT_FOUND,
            Error::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Error::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            Error::UpstreamUnavailable(_) | Error::ConnectionFailure(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Error::Configuration(_)
            | Error::AuthFailure(_)
            | Error::EmptyResponse(_)
            | Error::UnknownUpstream(_)
            | Error::Internal(_)
            | Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable error-kind label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidPayload(_) => "INVALID_PAYLOAD",
            Error::MissingInput(_) => "MISSING_INPUT",
            Error::InputTooLarge(_) => "INPUT_TOO_LARGE",
            Error::UnknownRoute(_) => "UNKNOWN_ROUTE",
            Error::MethodNotAllowed(_) => "METHOD_NOT_ALLOWED",
            Error::RateLimited(_) => "RATE_LIMITED",
            Error::Configuration(_) => "CONFIGURATION_ERROR",
            Error::BadRequest(_) => "BAD_REQUEST",
            Error::AuthFailure(_) => "AUTH_FAILURE",
            Error::UpstreamUnavailable(_) => "UPSTREAM_UNAVAILABLE",
            Error::ConnectionFailure(_) => "CONNECTION_FAILURE",
            Error::EmptyResponse(_) => "EMPTY_RESPONSE",
            Error::UnknownUpstream(_) => "UNKNOWN_UPSTREAM_ERROR",
            Error::Internal(_) => "INTERNAL",
            Error::Io(_) => "IO",
        }
    }
}

// Convenience constructors
impl Error {
    pub fn invalid_payload(msg: impl Into<String>) -> Self {
        Self::InvalidPayload(msg.into())
    }

    pub fn missing_input(msg: impl Into<String>) -> Self {
        Self::MissingInput(msg.into())
    }

    pub fn input_too_large(msg: impl Into<String>) -> Self {
        Self::InputTooLarge(msg.into())
    }

    pub fn unknown_route(msg: impl Into<String>) -> Self {
        Self::UnknownRoute(msg.into())
    }

    pub fn method_not_allowed(msg: impl Into<String>) -> Self {
        Self::MethodNotAllowed(msg.into())
    }

    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn connection_failure(msg: impl Into<String>) -> Self {
        Self::ConnectionFailure(msg.into())
    }

    pub fn empty_response(msg: impl Into<String>) -> Self {
        Self::EmptyResponse(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
