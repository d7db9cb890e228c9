//! Asynchronous client core for the GitHub v2/v3 APIs.
//!
//! # Overview
//! Callers describe an API call as a `Request` and hand it to
//! `GitHubClient::call_api` together with a success and an error
//! continuation. The client picks the base URL for the request's API
//! version, attaches the current `Authenticator`, executes the call through
//! a pluggable `TransportFactory` and classifies the response before
//! invoking exactly one continuation. Every call returns a `RequestHandle`
//! that can abort it.
//!
//! # Design
//! - The HTTP layer sits behind `TransportFactory` / `TransportClient`.
//!   `ReqwestTransportFactory` is the default; tests swap in recording mocks.
//! - Classification lives behind `ErrorClassifier` and is shared with the
//!   OAuth flow.
//! - Malformed calls fail synchronously with `ArgumentError`; failures of
//!   dispatched calls reach the error continuation as `ApiError`.
//! - Resource services (`users()`, `repositories()`, ...) are thin typed
//!   wrappers over `call_api`.

pub mod auth;
pub mod classify;
pub mod client;
pub mod config;
pub mod error;
pub mod handle;
pub mod http;
pub mod oauth;
pub mod parameter;
pub mod reqwest_transport;
pub mod request;
pub mod response;
pub mod services;
pub mod transport;
pub mod types;

#[cfg(test)]
mod testing;

pub use auth::{Authenticator, BasicAuthenticator, NullAuthenticator, TokenAuthenticator};
pub use classify::{ErrorClassifier, StatusClassifier};
pub use client::GitHubClient;
pub use config::ClientConfig;
pub use error::{ApiError, ArgumentError, ErrorKind};
pub use handle::RequestHandle;
pub use http::{HttpMethod, HttpRequest};
pub use oauth::{OAuthAuthorizer, Scope};
pub use parameter::{Filter, OrderBy, Parameter, SortBy, State};
pub use reqwest_transport::ReqwestTransportFactory;
pub use request::{ApiVersion, Request};
pub use response::{RawResponse, Response, ResponseStatus};
pub use transport::{Cancellable, CompletionCallback, TransportClient, TransportError, TransportFactory};
