//! Default transport built on `reqwest` and tokio.
//!
//! # Design
//! One `reqwest::Client` (one connection pool) is shared by every transport
//! client the factory creates. `execute` spawns a task on the captured
//! runtime and hands back the task's `AbortHandle`; aborting a running task
//! drops it before the completion callback can run, and aborting a finished
//! task does nothing. Failures to connect, timeouts and unreadable bodies
//! are reported as `ResponseStatus::Error` responses rather than returned.

use std::sync::Arc;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, Url};
use tokio::runtime::Handle;
use tokio::task::AbortHandle;

use crate::auth::{Authenticator, NullAuthenticator};
use crate::config::ClientConfig;
use crate::http::{HttpMethod, HttpRequest};
use crate::response::{RawResponse, ResponseStatus};
use crate::transport::{
    Cancellable, CompletionCallback, TransportClient, TransportError, TransportFactory,
};

/// Creates `ReqwestTransport` clients sharing one connection pool.
#[derive(Debug, Clone)]
pub struct ReqwestTransportFactory {
    http: Client,
    runtime: Handle,
}

impl ReqwestTransportFactory {
    /// Builds a factory that spawns onto the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Setup` outside a tokio runtime or if the
    /// HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let runtime = Handle::try_current().map_err(|e| TransportError::Setup(e.to_string()))?;
        Self::with_runtime(config, runtime)
    }

    pub fn with_runtime(config: &ClientConfig, runtime: Handle) -> Result<Self, TransportError> {
        let http = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .build()
            .map_err(|e| TransportError::Setup(e.to_string()))?;
        Ok(Self { http, runtime })
    }
}

impl TransportFactory for ReqwestTransportFactory {
    fn create_client(&self, base_url: &str) -> Box<dyn TransportClient> {
        Box::new(ReqwestTransport {
            http: self.http.clone(),
            runtime: self.runtime.clone(),
            base_url: base_url.to_string(),
            authenticator: Arc::new(NullAuthenticator),
        })
    }
}

/// Transport client bound to one base URL.
pub struct ReqwestTransport {
    http: Client,
    runtime: Handle,
    base_url: String,
    authenticator: Arc<dyn Authenticator>,
}

impl TransportClient for ReqwestTransport {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn set_authenticator(&mut self, authenticator: Arc<dyn Authenticator>) {
        self.authenticator = authenticator;
    }

    fn execute(&self, mut request: HttpRequest, on_complete: CompletionCallback) -> Box<dyn Cancellable> {
        self.authenticator.authenticate(&mut request);
        let http = self.http.clone();
        let url = request.url(&self.base_url);
        let task = self.runtime.spawn(async move {
            let raw = send(&http, &url, request).await;
            on_complete(raw);
        });
        Box::new(TaskHandle(task.abort_handle()))
    }
}

struct TaskHandle(AbortHandle);

impl Cancellable for TaskHandle {
    fn abort(&self) {
        self.0.abort();
    }
}

const fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Options => Method::OPTIONS,
        HttpMethod::Head => Method::HEAD,
    }
}

fn map_error(error: &reqwest::Error) -> TransportError {
    if error.is_timeout() {
        return TransportError::Timeout;
    }
    if error.is_connect() {
        return TransportError::Connect(error.to_string());
    }
    TransportError::Other(error.to_string())
}

async fn send(http: &Client, url: &str, request: HttpRequest) -> RawResponse {
    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(e) => return RawResponse::failed(TransportError::InvalidUrl(format!("{e}: {url}"))),
    };

    let in_query = request.parameters_in_query();
    let mut builder = http.request(to_reqwest_method(request.method), parsed);
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    if !request.parameters.is_empty() {
        builder = if in_query {
            builder.query(&request.parameters)
        } else {
            builder.form(&request.parameters)
        };
    }
    if let Some(body) = request.body {
        builder = builder.body(body);
    }

    let response = match builder.send().await {
        Ok(response) => response,
        Err(e) => return RawResponse::failed(map_error(&e)),
    };

    let status_code = response.status().as_u16();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let headers = response
        .headers()
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("<binary>").to_string()))
        .collect();

    match response.text().await {
        Ok(content) => RawResponse {
            status_code,
            response_status: ResponseStatus::Completed,
            content_type,
            content,
            headers,
            error_message: None,
            error: None,
        },
        Err(e) => RawResponse {
            status_code,
            content_type,
            headers,
            ..RawResponse::failed(TransportError::Body(e.to_string()))
        },
    }
}
