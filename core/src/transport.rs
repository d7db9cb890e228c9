//! The pluggable HTTP transport the client dispatches through.
//!
//! # Design
//! The client never performs I/O itself. A `TransportFactory` hands out a
//! `TransportClient` bound to one base URL; the client assigns its current
//! authenticator to it and calls `execute`, which must return immediately.
//! The transport later invokes the completion callback exactly once, on a
//! thread of its choosing, unless the request was aborted first. Every
//! outcome, including connection failures, is reported as a `RawResponse`
//! so that classification stays in one place.

use std::sync::Arc;

use thiserror::Error;

use crate::auth::Authenticator;
use crate::http::HttpRequest;
use crate::response::RawResponse;

/// Invoked once with the outcome of an executed request.
pub type CompletionCallback = Box<dyn FnOnce(RawResponse) + Send + 'static>;

/// Failures inside the transport, carried by `RawResponse::error`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The transport could not be constructed.
    #[error("transport setup failed: {0}")]
    Setup(String),

    /// The base URL and resource did not form a valid URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Connecting to the remote host failed.
    #[error("connection failed: {0}")]
    Connect(String),

    /// No response arrived in time.
    #[error("request timed out")]
    Timeout,

    /// The response body could not be read.
    #[error("failed to read response body: {0}")]
    Body(String),

    #[error("transport error: {0}")]
    Other(String),
}

/// Cancels an in-flight request.
///
/// `abort` may be called from any thread, any number of times, before or
/// after completion; once the request has completed it does nothing.
pub trait Cancellable: Send + Sync {
    fn abort(&self);
}

/// A transport client bound to one base URL.
pub trait TransportClient: Send {
    fn base_url(&self) -> &str;

    /// Sets the authenticator applied to every request this client executes.
    fn set_authenticator(&mut self, authenticator: Arc<dyn Authenticator>);

    /// Starts `request` and returns without waiting for it to finish.
    fn execute(&self, request: HttpRequest, on_complete: CompletionCallback) -> Box<dyn Cancellable>;
}

/// Creates transport clients; swapped out in tests.
pub trait TransportFactory: Send + Sync {
    fn create_client(&self, base_url: &str) -> Box<dyn TransportClient>;
}
