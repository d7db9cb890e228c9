//! The GitHub API client and its dispatch pipeline.
//!
//! # Design
//! Every service call funnels through `Dispatcher::call_api`:
//!
//! 1. pick the base URL for the request's API version,
//! 2. ask the transport factory for a client bound to it,
//! 3. hand it the authenticator current at dispatch time,
//! 4. translate the `Request` into an `HttpRequest`,
//! 5. execute it with a completion callback that classifies the response and
//!    invokes exactly one of the two continuations,
//! 6. return a `RequestHandle` before the call completes.
//!
//! The dispatcher keeps no per-call state. The current authenticator is the
//! only mutable shared value; swapping it affects calls dispatched afterwards
//! and never calls already in flight.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::auth::{Authenticator, NullAuthenticator};
use crate::classify::{ErrorClassifier, StatusClassifier};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::handle::RequestHandle;
use crate::http::HttpRequest;
use crate::oauth::OAuthAuthorizer;
use crate::request::Request;
use crate::reqwest_transport::ReqwestTransportFactory;
use crate::response::{RawResponse, Response};
use crate::services::{
    IssueService, OrganizationService, PullRequestService, RepositoryService, UserService,
};
use crate::transport::{TransportError, TransportFactory};

/// Shared dispatch core behind `GitHubClient` and its services.
pub(crate) struct Dispatcher {
    config: ClientConfig,
    factory: Arc<dyn TransportFactory>,
    classifier: Arc<dyn ErrorClassifier>,
    authenticator: RwLock<Arc<dyn Authenticator>>,
}

impl Dispatcher {
    pub(crate) fn new(
        config: ClientConfig,
        factory: Arc<dyn TransportFactory>,
        classifier: Arc<dyn ErrorClassifier>,
    ) -> Self {
        Self {
            config,
            factory,
            classifier,
            authenticator: RwLock::new(Arc::new(NullAuthenticator)),
        }
    }

    pub(crate) fn authenticator(&self) -> Arc<dyn Authenticator> {
        Arc::clone(&self.authenticator.read())
    }

    pub(crate) fn set_authenticator(&self, authenticator: Option<Arc<dyn Authenticator>>) {
        let authenticator = authenticator.unwrap_or_else(|| Arc::new(NullAuthenticator));
        debug!(authenticator = ?authenticator, "authenticator replaced");
        *self.authenticator.write() = authenticator;
    }

    pub(crate) fn call_api<T, S, E>(&self, request: Request, on_success: S, on_error: E) -> RequestHandle
    where
        T: DeserializeOwned + Default + Send + 'static,
        S: FnOnce(Response<T>) + Send + 'static,
        E: FnOnce(ApiError) + Send + 'static,
    {
        let base_url = self.config.base_url(request.version());
        let mut transport = self.factory.create_client(base_url);
        transport.set_authenticator(self.authenticator());

        let http_request = to_http_request(&request);
        debug!(
            resource = request.resource(),
            method = %request.method(),
            version = %request.version(),
            base_url,
            "dispatching API call"
        );

        let classifier = Arc::clone(&self.classifier);
        let inner = transport.execute(
            http_request,
            Box::new(move |raw| complete(classifier.as_ref(), raw, on_success, on_error)),
        );
        RequestHandle::new(request, inner)
    }
}

/// Translates a `Request` into the transport's request shape.
pub(crate) fn to_http_request(request: &Request) -> HttpRequest {
    let mut http_request = HttpRequest::new(request.method(), request.resource());
    for parameter in request.parameters() {
        http_request.add_parameter(parameter.name(), parameter.value());
    }
    if let Some(body) = request.body() {
        http_request.set_json_body(body.to_string());
    }
    http_request
}

/// Classifies `raw` and invokes exactly one continuation.
pub(crate) fn complete<T, S, E>(classifier: &dyn ErrorClassifier, raw: RawResponse, on_success: S, on_error: E)
where
    T: DeserializeOwned + Default,
    S: FnOnce(Response<T>),
    E: FnOnce(ApiError),
{
    debug!(
        status = raw.status_code,
        response_status = ?raw.response_status,
        "API call completed"
    );
    if let Err(err) = classifier.classify(&raw) {
        debug!(kind = ?err.kind(), "API call failed");
        on_error(err);
        return;
    }
    on_success(Response::from_raw(raw));
}

/// Client for the GitHub v2/v3 APIs.
///
/// Holds the transport factory, the error classifier and the current
/// authenticator, and exposes the resource services built on top of
/// `call_api`.
pub struct GitHubClient {
    dispatcher: Arc<Dispatcher>,
    users: UserService,
    repositories: RepositoryService,
    issues: IssueService,
    pull_requests: PullRequestService,
    organizations: OrganizationService,
}

impl GitHubClient {
    /// A client for the public GitHub endpoints over the default transport.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new() -> Result<Self, TransportError> {
        Self::with_config(ClientConfig::default())
    }

    /// Like `new`, with custom endpoints and transport settings.
    pub fn with_config(config: ClientConfig) -> Result<Self, TransportError> {
        let factory = ReqwestTransportFactory::new(&config)?;
        Ok(Self::with_parts(config, Arc::new(factory), Arc::new(StatusClassifier)))
    }

    /// A client over an explicitly supplied transport and classifier.
    pub fn with_parts(
        config: ClientConfig,
        factory: Arc<dyn TransportFactory>,
        classifier: Arc<dyn ErrorClassifier>,
    ) -> Self {
        let dispatcher = Arc::new(Dispatcher::new(config, factory, classifier));
        Self {
            users: UserService::new(Arc::clone(&dispatcher)),
            repositories: RepositoryService::new(Arc::clone(&dispatcher)),
            issues: IssueService::new(Arc::clone(&dispatcher)),
            pull_requests: PullRequestService::new(Arc::clone(&dispatcher)),
            organizations: OrganizationService::new(Arc::clone(&dispatcher)),
            dispatcher,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.dispatcher.config
    }

    /// The authenticator attached to calls dispatched from now on.
    pub fn authenticator(&self) -> Arc<dyn Authenticator> {
        self.dispatcher.authenticator()
    }

    /// Replaces the authenticator; `None` restores `NullAuthenticator`.
    pub fn set_authenticator(&self, authenticator: Option<Arc<dyn Authenticator>>) {
        self.dispatcher.set_authenticator(authenticator);
    }

    /// Dispatches `request` and returns immediately.
    ///
    /// Once the transport completes, exactly one continuation runs, on a
    /// thread chosen by the transport: `on_error` if the classifier reports
    /// an error, `on_success` otherwise. An aborted call may run neither.
    pub fn call_api<T, S, E>(&self, request: Request, on_success: S, on_error: E) -> RequestHandle
    where
        T: DeserializeOwned + Default + Send + 'static,
        S: FnOnce(Response<T>) + Send + 'static,
        E: FnOnce(ApiError) + Send + 'static,
    {
        self.dispatcher.call_api(request, on_success, on_error)
    }

    /// An OAuth authorizer sharing this client's transport and classifier.
    pub fn oauth(&self) -> OAuthAuthorizer {
        OAuthAuthorizer::with_parts(
            self.dispatcher.config.oauth_base_url(),
            Arc::clone(&self.dispatcher.factory),
            Arc::clone(&self.dispatcher.classifier),
        )
    }

    pub fn users(&self) -> &UserService {
        &self.users
    }

    pub fn repositories(&self) -> &RepositoryService {
        &self.repositories
    }

    pub fn issues(&self) -> &IssueService {
        &self.issues
    }

    pub fn pull_requests(&self) -> &PullRequestService {
        &self.pull_requests
    }

    pub fn organizations(&self) -> &OrganizationService {
        &self.organizations
    }
}

impl fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubClient")
            .field("config", &self.dispatcher.config)
            .field("authenticator", &self.authenticator())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;

    use super::*;
    use crate::auth::{BasicAuthenticator, TokenAuthenticator};
    use crate::error::ErrorKind;
    use crate::http::HttpMethod;
    use crate::parameter::{Parameter, State};
    use crate::request::ApiVersion;
    use crate::response::ResponseStatus;
    use crate::testing::MockTransport;
    use crate::transport::TransportError;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct Login {
        login: String,
    }

    fn client(transport: &MockTransport) -> GitHubClient {
        GitHubClient::with_parts(
            ClientConfig::default(),
            transport.factory(),
            Arc::new(StatusClassifier),
        )
    }

    fn get(resource: &str) -> Request {
        Request::new(resource, ApiVersion::V3, HttpMethod::Get).unwrap()
    }

    /// Records which continuation ran and how often.
    #[derive(Clone, Default)]
    struct Outcome {
        successes: Arc<AtomicUsize>,
        errors: Arc<Mutex<Vec<ApiError>>>,
    }

    impl Outcome {
        fn dispatch(&self, client: &GitHubClient, request: Request) -> RequestHandle {
            let successes = Arc::clone(&self.successes);
            let errors = Arc::clone(&self.errors);
            client.call_api::<serde_json::Value, _, _>(
                request,
                move |_| {
                    successes.fetch_add(1, Ordering::SeqCst);
                },
                move |e| errors.lock().push(e),
            )
        }

        fn successes(&self) -> usize {
            self.successes.load(Ordering::SeqCst)
        }

        fn errors(&self) -> Vec<ApiError> {
            self.errors.lock().clone()
        }
    }

    // -----------------------------------------------------------------------
    // Authenticator
    // -----------------------------------------------------------------------

    #[test]
    fn authenticator_defaults_to_null() {
        let client = client(&MockTransport::deferred());
        assert_eq!(format!("{:?}", client.authenticator()), "NullAuthenticator");
    }

    #[test]
    fn assigning_none_restores_null_authenticator() {
        let client = client(&MockTransport::deferred());
        client.set_authenticator(Some(Arc::new(TokenAuthenticator::new("t"))));
        client.set_authenticator(None);
        assert_eq!(format!("{:?}", client.authenticator()), "NullAuthenticator");
    }

    #[test]
    fn assigned_authenticator_is_returned() {
        let client = client(&MockTransport::deferred());
        let auth: Arc<dyn Authenticator> = Arc::new(BasicAuthenticator::new("u", "p"));
        client.set_authenticator(Some(Arc::clone(&auth)));
        assert!(Arc::ptr_eq(&client.authenticator(), &auth));
    }

    #[test]
    fn dispatch_attaches_current_authenticator() {
        let transport = MockTransport::deferred();
        let client = client(&transport);
        let auth: Arc<dyn Authenticator> = Arc::new(TokenAuthenticator::new("abc"));
        client.set_authenticator(Some(Arc::clone(&auth)));

        Outcome::default().dispatch(&client, get("/user"));

        let assigned = transport.authenticators();
        assert_eq!(assigned.len(), 1);
        assert!(Arc::ptr_eq(&assigned[0], &auth));
        assert_eq!(transport.last_request().header("authorization"), Some("token abc"));
    }

    #[test]
    fn swapping_authenticator_only_affects_later_calls() {
        let transport = MockTransport::deferred();
        let client = client(&transport);
        let first: Arc<dyn Authenticator> = Arc::new(TokenAuthenticator::new("first"));
        let second: Arc<dyn Authenticator> = Arc::new(TokenAuthenticator::new("second"));

        client.set_authenticator(Some(Arc::clone(&first)));
        Outcome::default().dispatch(&client, get("/user"));
        client.set_authenticator(Some(Arc::clone(&second)));
        Outcome::default().dispatch(&client, get("/user"));

        let assigned = transport.authenticators();
        assert!(Arc::ptr_eq(&assigned[0], &first));
        assert!(Arc::ptr_eq(&assigned[1], &second));
        let requests = transport.requests();
        assert_eq!(requests[0].header("authorization"), Some("token first"));
        assert_eq!(requests[1].header("authorization"), Some("token second"));
    }

    // -----------------------------------------------------------------------
    // Request translation
    // -----------------------------------------------------------------------

    #[test]
    fn v3_requests_use_v3_base_url() {
        let transport = MockTransport::deferred();
        Outcome::default().dispatch(&client(&transport), get("/user"));
        assert_eq!(transport.base_urls(), vec!["https://api.github.com".to_string()]);
    }

    #[test]
    fn v2_requests_use_v2_base_url() {
        let transport = MockTransport::deferred();
        let request = Request::new("/user/show/octocat", ApiVersion::V2, HttpMethod::Get).unwrap();
        Outcome::default().dispatch(&client(&transport), request);
        assert_eq!(
            transport.base_urls(),
            vec!["https://github.com/api/v2/json".to_string()]
        );
    }

    #[test]
    fn request_resource_and_method_are_passed_through() {
        let transport = MockTransport::deferred();
        let request = Request::new("foo/bar", ApiVersion::V3, HttpMethod::Options).unwrap();
        Outcome::default().dispatch(&client(&transport), request);

        let sent = transport.last_request();
        assert_eq!(sent.resource, "foo/bar");
        assert_eq!(sent.method, HttpMethod::Options);
        assert_eq!(sent.header("accept"), Some("application/json"));
    }

    #[test]
    fn parameters_are_passed_in_order() {
        let transport = MockTransport::deferred();
        let request = get("/repos/a/b/issues")
            .with_parameters([Parameter::state(State::Closed), Parameter::page(4)]);
        Outcome::default().dispatch(&client(&transport), request);

        assert_eq!(
            transport.last_request().parameters,
            vec![
                ("state".to_string(), "closed".to_string()),
                ("page".to_string(), "4".to_string()),
            ]
        );
    }

    #[test]
    fn body_is_serialized_as_json() {
        let transport = MockTransport::deferred();
        let request = Request::new("/repos/a/b/issues", ApiVersion::V3, HttpMethod::Post)
            .unwrap()
            .with_body(&serde_json::json!({"title": "bug"}))
            .unwrap();
        Outcome::default().dispatch(&client(&transport), request);

        let sent = transport.last_request();
        assert_eq!(sent.body.as_deref(), Some(r#"{"title":"bug"}"#));
        assert_eq!(sent.header("content-type"), Some("application/json"));
    }

    // -----------------------------------------------------------------------
    // Completion
    // -----------------------------------------------------------------------

    #[test]
    fn created_status_invokes_success() {
        let transport = MockTransport::replying(RawResponse::completed(201, "{}"));
        let outcome = Outcome::default();
        outcome.dispatch(&client(&transport), get("/x"));
        assert_eq!(outcome.successes(), 1);
        assert!(outcome.errors().is_empty());
    }

    #[test]
    fn response_data_reaches_success_continuation() {
        let transport = MockTransport::replying(RawResponse::completed(200, r#"{"login":"octocat"}"#));
        let received = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&received);
        client(&transport).call_api::<Login, _, _>(
            get("/users/octocat"),
            move |r| *slot.lock() = Some(r.into_data()),
            |e| panic!("unexpected error: {e}"),
        );
        assert_eq!(
            received.lock().take(),
            Some(Login {
                login: "octocat".to_string()
            })
        );
    }

    #[test]
    fn transport_failure_invokes_error_with_no_network() {
        let raw = RawResponse::failed(TransportError::Connect("refused".to_string()));
        let transport = MockTransport::replying(raw);
        let outcome = Outcome::default();
        outcome.dispatch(&client(&transport), get("/x"));

        assert_eq!(outcome.successes(), 0);
        let errors = outcome.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind(), ErrorKind::NoNetwork);
        assert_eq!(errors[0].response().response_status, ResponseStatus::Error);
    }

    #[test]
    fn custom_classifier_is_consulted() {
        struct RejectEverything;
        impl ErrorClassifier for RejectEverything {
            fn classify(&self, response: &RawResponse) -> Result<(), ApiError> {
                Err(ApiError::new(response.clone(), ErrorKind::Unknown))
            }
        }

        let transport = MockTransport::replying(RawResponse::completed(200, "{}"));
        let client = GitHubClient::with_parts(
            ClientConfig::default(),
            transport.factory(),
            Arc::new(RejectEverything),
        );
        let outcome = Outcome::default();
        outcome.dispatch(&client, get("/x"));
        assert_eq!(outcome.successes(), 0);
        assert_eq!(outcome.errors().len(), 1);
    }

    #[test]
    fn exactly_one_continuation_per_completed_call() {
        for status in [200, 201, 204, 401, 403, 404, 500, 502] {
            let transport = MockTransport::deferred();
            let outcome = Outcome::default();
            outcome.dispatch(&client(&transport), get("/x"));
            assert!(transport.complete_next(RawResponse::completed(status, "")));
            assert_eq!(
                outcome.successes() + outcome.errors().len(),
                1,
                "status {status}"
            );
        }
    }

    #[test]
    fn handle_is_returned_before_completion() {
        let transport = MockTransport::deferred();
        let outcome = Outcome::default();
        let handle = outcome.dispatch(&client(&transport), get("/user"));

        assert_eq!(handle.request().resource(), "/user");
        assert_eq!(outcome.successes(), 0);
        assert!(outcome.errors().is_empty());

        transport.complete_next(RawResponse::completed(200, "{}"));
        assert_eq!(outcome.successes(), 1);
    }

    #[test]
    fn abort_before_completion_suppresses_continuations() {
        let transport = MockTransport::deferred();
        let outcome = Outcome::default();
        let handle = outcome.dispatch(&client(&transport), get("/user"));

        handle.abort();

        assert!(!transport.complete_next(RawResponse::completed(200, "{}")));
        assert_eq!(outcome.successes(), 0);
        assert!(outcome.errors().is_empty());
    }

    #[test]
    fn abort_after_completion_is_a_no_op() {
        let transport = MockTransport::replying(RawResponse::completed(200, "{}"));
        let outcome = Outcome::default();
        let handle = outcome.dispatch(&client(&transport), get("/user"));

        handle.abort();
        handle.abort();

        assert_eq!(outcome.successes(), 1);
        assert!(outcome.errors().is_empty());
    }
}
