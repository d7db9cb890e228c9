//! Error types for the GitHub API client.
//!
//! # Design
//! Two families of errors never mix. `ArgumentError` is returned
//! synchronously when a call is malformed and no request has been sent.
//! `ApiError` is only ever delivered to an error continuation, after the
//! classifier has looked at a completed transport response. It keeps that
//! response so callers can fall back to the raw status and body when the
//! `ErrorKind` taxonomy is not precise enough.

use std::fmt;

use thiserror::Error;

use crate::response::RawResponse;

/// Closed set of classified API failures.
///
/// New status codes fall into `Unknown` until they are explicitly classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The transport could not complete the exchange (DNS, connect, timeout).
    NoNetwork,
    /// HTTP 502.
    ServerError,
    /// HTTP 403, which GitHub uses for rate limiting.
    ApiLimitExceeded,
    /// HTTP 404.
    ResourceNotFound,
    /// HTTP 401.
    Unauthorized,
    /// Any other non-success status.
    Unknown,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ErrorKind::NoNetwork => "no network",
            ErrorKind::ServerError => "server error",
            ErrorKind::ApiLimitExceeded => "API rate limit exceeded",
            ErrorKind::ResourceNotFound => "resource not found",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::Unknown => "unknown error",
        };
        f.write_str(text)
    }
}

/// A classified failure of a dispatched API call.
#[derive(Debug, Clone)]
pub struct ApiError {
    kind: ErrorKind,
    response: RawResponse,
}

impl ApiError {
    pub fn new(response: RawResponse, kind: ErrorKind) -> Self {
        Self { kind, response }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The transport response the error was derived from.
    pub fn response(&self) -> &RawResponse {
        &self.response
    }

    pub fn status_code(&self) -> u16 {
        self.response.status_code
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (HTTP {})", self.kind, self.response.status_code)
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.response
            .error
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Programmer errors detected before any request is dispatched.
#[derive(Debug, Error)]
pub enum ArgumentError {
    /// A required string argument was empty.
    #[error("argument `{0}` must not be empty")]
    Empty(&'static str),

    /// A numeric argument was outside its accepted range.
    #[error("argument `{name}` is out of range: {reason}")]
    OutOfRange { name: &'static str, reason: String },

    /// A value spliced into the resource path contains a path or query delimiter.
    #[error("argument `{name}` is not a valid path segment: {value:?}")]
    InvalidSegment { name: &'static str, value: String },

    /// The request body could not be serialized to JSON.
    #[error("request body could not be serialized: {0}")]
    Body(#[from] serde_json::Error),
}

/// Fails with `ArgumentError::Empty` when `value` is empty.
pub(crate) fn require_non_empty(name: &'static str, value: &str) -> Result<(), ArgumentError> {
    if value.is_empty() {
        return Err(ArgumentError::Empty(name));
    }
    Ok(())
}

/// Like `require_non_empty`, and also rejects `/`, `?` and `#`, which would
/// change the route once the value is formatted into a resource path.
pub(crate) fn require_segment(name: &'static str, value: &str) -> Result<(), ArgumentError> {
    require_non_empty(name, value)?;
    if value.contains(['/', '?', '#']) {
        return Err(ArgumentError::InvalidSegment {
            name,
            value: value.to_string(),
        });
    }
    Ok(())
}
