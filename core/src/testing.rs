//! Recording transport used by unit tests.
//!
//! `MockTransport` is its own factory. Every client it creates records the
//! base URL, the authenticator assigned to it and each request it executes
//! (after authentication). Replies are either immediate, delivered inside
//! `execute` the way a synchronous mock would, or deferred until the test
//! calls `complete_next`.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::auth::{Authenticator, NullAuthenticator};
use crate::classify::StatusClassifier;
use crate::client::GitHubClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::HttpRequest;
use crate::response::RawResponse;
use crate::transport::{Cancellable, CompletionCallback, TransportClient, TransportFactory};

#[derive(Default)]
struct MockState {
    reply: Option<RawResponse>,
    base_urls: Vec<String>,
    authenticators: Vec<Arc<dyn Authenticator>>,
    requests: Vec<HttpRequest>,
    pending: VecDeque<(CompletionCallback, Arc<AtomicBool>)>,
}

#[derive(Clone, Default)]
pub(crate) struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    /// Completes every request immediately with `reply`.
    pub(crate) fn replying(reply: RawResponse) -> Self {
        let transport = Self::default();
        transport.state.lock().reply = Some(reply);
        transport
    }

    /// Holds every request until `complete_next` is called.
    pub(crate) fn deferred() -> Self {
        Self::default()
    }

    pub(crate) fn factory(&self) -> Arc<dyn TransportFactory> {
        Arc::new(self.clone())
    }

    pub(crate) fn base_urls(&self) -> Vec<String> {
        self.state.lock().base_urls.clone()
    }

    pub(crate) fn authenticators(&self) -> Vec<Arc<dyn Authenticator>> {
        self.state.lock().authenticators.clone()
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.state.lock().requests.clone()
    }

    pub(crate) fn last_request(&self) -> HttpRequest {
        self.requests().pop().expect("no request was executed")
    }

    /// Delivers `raw` to the oldest pending request unless it was aborted.
    /// Returns whether a callback ran.
    pub(crate) fn complete_next(&self, raw: RawResponse) -> bool {
        let next = self.state.lock().pending.pop_front();
        match next {
            Some((callback, aborted)) if !aborted.load(Ordering::SeqCst) => {
                callback(raw);
                true
            }
            _ => false,
        }
    }
}

impl TransportFactory for MockTransport {
    fn create_client(&self, base_url: &str) -> Box<dyn TransportClient> {
        self.state.lock().base_urls.push(base_url.to_string());
        Box::new(MockClient {
            base_url: base_url.to_string(),
            authenticator: Arc::new(NullAuthenticator),
            state: Arc::clone(&self.state),
        })
    }
}

struct MockClient {
    base_url: String,
    authenticator: Arc<dyn Authenticator>,
    state: Arc<Mutex<MockState>>,
}

impl TransportClient for MockClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn set_authenticator(&mut self, authenticator: Arc<dyn Authenticator>) {
        self.state.lock().authenticators.push(Arc::clone(&authenticator));
        self.authenticator = authenticator;
    }

    fn execute(&self, mut request: HttpRequest, on_complete: CompletionCallback) -> Box<dyn Cancellable> {
        self.authenticator.authenticate(&mut request);
        let aborted = Arc::new(AtomicBool::new(false));
        let reply = {
            let mut state = self.state.lock();
            state.requests.push(request);
            state.reply.clone()
        };
        match reply {
            Some(raw) => on_complete(raw),
            None => self
                .state
                .lock()
                .pending
                .push_back((on_complete, Arc::clone(&aborted))),
        }
        Box::new(MockHandle(aborted))
    }
}

struct MockHandle(Arc<AtomicBool>);

impl Cancellable for MockHandle {
    fn abort(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// A client with default config over `transport` and the default classifier.
pub(crate) fn client(transport: &MockTransport) -> GitHubClient {
    GitHubClient::with_parts(ClientConfig::default(), transport.factory(), Arc::new(StatusClassifier))
}

/// Error continuation for calls expected to succeed.
pub(crate) fn unexpected(err: ApiError) {
    panic!("unexpected API error: {err}");
}

/// Slot a continuation writes into and the test reads back.
pub(crate) struct Captured<T>(Arc<Mutex<Option<T>>>);

impl<T: Send + 'static> Captured<T> {
    pub(crate) fn new() -> Self {
        Self(Arc::new(Mutex::new(None)))
    }

    pub(crate) fn sink(&self) -> impl FnOnce(T) + Send + 'static {
        let slot = Arc::clone(&self.0);
        move |value| *slot.lock() = Some(value)
    }

    pub(crate) fn take(&self) -> Option<T> {
        self.0.lock().take()
    }
}
