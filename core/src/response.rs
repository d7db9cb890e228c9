//! Transport responses and their typed wrapper.
//!
//! # Design
//! `RawResponse` is what a transport hands back: plain owned data, including
//! a transport-level completion status that is independent of the HTTP
//! status code. `Response<T>` is the read-only view the client passes to
//! success continuations. It decodes the JSON payload once, at wrap time, and
//! falls back to `T::default()` when there is no payload or it does not
//! decode, so services can always unwrap `data()`.

use serde::de::DeserializeOwned;
use tracing::warn;

use crate::transport::TransportError;

/// How far the transport got with a request, independent of HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseStatus {
    /// The transport has not reported a status.
    #[default]
    None,
    /// A full HTTP exchange happened; `status_code` is meaningful.
    Completed,
    /// The exchange failed at the transport level (DNS, connect, I/O).
    Error,
    /// The transport gave up waiting.
    TimedOut,
    /// The request was cancelled before it completed.
    Aborted,
}

/// A transport response described as plain data.
#[derive(Debug, Clone, Default)]
pub struct RawResponse {
    /// HTTP status code; `0` when no HTTP exchange took place.
    pub status_code: u16,
    pub response_status: ResponseStatus,
    pub content_type: String,
    /// Raw body text.
    pub content: String,
    pub headers: Vec<(String, String)>,
    pub error_message: Option<String>,
    /// Transport failure behind `ResponseStatus::Error`, if any.
    pub error: Option<TransportError>,
}

impl RawResponse {
    /// A completed exchange with the given status and body.
    pub fn completed(status_code: u16, content: impl Into<String>) -> Self {
        Self {
            status_code,
            response_status: ResponseStatus::Completed,
            content_type: "application/json".to_string(),
            content: content.into(),
            ..Self::default()
        }
    }

    /// A transport-level failure; no HTTP status is available.
    pub fn failed(error: TransportError) -> Self {
        Self {
            response_status: ResponseStatus::Error,
            error_message: Some(error.to_string()),
            error: Some(error),
            ..Self::default()
        }
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Typed, read-only view over a transport response.
#[derive(Debug, Clone)]
pub struct Response<T> {
    raw: RawResponse,
    data: T,
}

impl<T> Response<T>
where
    T: DeserializeOwned + Default,
{
    /// Wraps `raw`, decoding its body as JSON into `T`.
    pub fn from_raw(raw: RawResponse) -> Self {
        let data = decode_payload(&raw);
        Self { raw, data }
    }
}

impl<T> Response<T> {
    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn into_data(self) -> T {
        self.data
    }

    pub fn content_type(&self) -> &str {
        &self.raw.content_type
    }

    pub fn content(&self) -> &str {
        &self.raw.content
    }

    pub fn status_code(&self) -> u16 {
        self.raw.status_code
    }

    pub fn response_status(&self) -> ResponseStatus {
        self.raw.response_status
    }

    pub fn error(&self) -> Option<&TransportError> {
        self.raw.error.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.raw.error_message.as_deref()
    }

    pub fn raw(&self) -> &RawResponse {
        &self.raw
    }

    pub fn into_raw(self) -> RawResponse {
        self.raw
    }
}

fn decode_payload<T>(raw: &RawResponse) -> T
where
    T: DeserializeOwned + Default,
{
    if raw.content.trim().is_empty() {
        return T::default();
    }
    match serde_json::from_str(&raw.content) {
        Ok(data) => data,
        Err(e) => {
            warn!(
                status = raw.status_code,
                error = %e,
                "response payload did not decode, using default"
            );
            T::default()
        }
    }
}
