//! OAuth web-flow helpers: the authorization URL and the code exchange.
//!
//! # Design
//! The code exchange runs through the same pipeline as API calls: a
//! transport client bound to the OAuth base URL, the no-op authenticator,
//! and the shared error classifier. Only the payload differs, since the
//! token endpoint answers with URL-encoded form data instead of JSON.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};
use url::form_urlencoded;

use crate::auth::NullAuthenticator;
use crate::classify::{ErrorClassifier, StatusClassifier};
use crate::client::to_http_request;
use crate::config::ClientConfig;
use crate::error::{require_non_empty, ApiError, ArgumentError, ErrorKind};
use crate::handle::RequestHandle;
use crate::http::HttpMethod;
use crate::parameter::Parameter;
use crate::reqwest_transport::ReqwestTransportFactory;
use crate::request::{ApiVersion, Request};
use crate::transport::{TransportError, TransportFactory};

const ACCESS_TOKEN_RESOURCE: &str = "/access_token";

/// Permission scopes an application can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    User,
    PublicRepo,
    Repo,
    Gists,
}

impl Scope {
    pub fn as_str(self) -> &'static str {
        match self {
            Scope::User => "user",
            Scope::PublicRepo => "public_repo",
            Scope::Repo => "repo",
            Scope::Gists => "gists",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    access_token: Option<String>,
}

/// Runs the OAuth web flow against the configured OAuth base URL.
pub struct OAuthAuthorizer {
    base_url: String,
    factory: Arc<dyn TransportFactory>,
    classifier: Arc<dyn ErrorClassifier>,
}

impl OAuthAuthorizer {
    /// An authorizer over the default transport; needs a tokio runtime.
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let factory = ReqwestTransportFactory::new(config)?;
        Ok(Self::with_parts(
            config.oauth_base_url(),
            Arc::new(factory),
            Arc::new(StatusClassifier),
        ))
    }

    pub fn with_parts(
        base_url: &str,
        factory: Arc<dyn TransportFactory>,
        classifier: Arc<dyn ErrorClassifier>,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            factory,
            classifier,
        }
    }

    /// The URL to send the user to for authorization.
    ///
    /// Scopes are joined with commas, duplicates dropped, first occurrence
    /// kept; with no scopes the `scope` parameter is left out.
    pub fn build_authorization_url(&self, client_id: &str, redirect_uri: &str, scopes: &[Scope]) -> String {
        let mut url = format!(
            "{}/authorize?client_id={}&redirect_uri={}",
            self.base_url,
            encode(client_id),
            encode(redirect_uri)
        );
        let mut unique: Vec<Scope> = Vec::with_capacity(scopes.len());
        for scope in scopes {
            if !unique.contains(scope) {
                unique.push(*scope);
            }
        }
        if !unique.is_empty() {
            let joined: Vec<&str> = unique.iter().map(|s| s.as_str()).collect();
            url.push_str("&scope=");
            url.push_str(&joined.join(","));
        }
        url
    }

    /// Exchanges an authorization `code` for an access token.
    ///
    /// `on_success` receives the `access_token` field of the form-encoded
    /// reply. Classified failures, and successful replies without a token,
    /// go to `on_error`.
    pub fn get_access_token<S, E>(
        &self,
        client_id: &str,
        client_secret: &str,
        code: &str,
        on_success: S,
        on_error: E,
    ) -> Result<RequestHandle, ArgumentError>
    where
        S: FnOnce(String) + Send + 'static,
        E: FnOnce(ApiError) + Send + 'static,
    {
        require_non_empty("client_id", client_id)?;
        require_non_empty("client_secret", client_secret)?;
        require_non_empty("code", code)?;

        let request = Request::new(ACCESS_TOKEN_RESOURCE, ApiVersion::V3, HttpMethod::Post)?
            .with_parameters([
                Parameter::new("client_id", client_id)?,
                Parameter::new("client_secret", client_secret)?,
                Parameter::new("code", code)?,
            ]);

        let mut transport = self.factory.create_client(&self.base_url);
        transport.set_authenticator(Arc::new(NullAuthenticator));

        let http_request = to_http_request(&request);
        debug!(base_url = %self.base_url, "exchanging OAuth code for access token");

        let classifier = Arc::clone(&self.classifier);
        let inner = transport.execute(
            http_request,
            Box::new(move |raw| {
                if let Err(err) = classifier.classify(&raw) {
                    on_error(err);
                    return;
                }
                match parse_access_token(&raw.content) {
                    Some(token) => on_success(token),
                    None => {
                        warn!(status = raw.status_code, "token reply carried no access_token");
                        on_error(ApiError::new(raw, ErrorKind::Unknown));
                    }
                }
            }),
        );
        Ok(RequestHandle::new(request, inner))
    }
}

impl fmt::Debug for OAuthAuthorizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthAuthorizer")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

fn encode(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// Extracts `access_token` from a form-encoded body.
pub fn parse_access_token(content: &str) -> Option<String> {
    serde_urlencoded::from_str::<AccessTokenResponse>(content)
        .ok()
        .and_then(|r| r.access_token)
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use super::*;
    use crate::response::{RawResponse, ResponseStatus};
    use crate::testing::MockTransport;

    const OAUTH: &str = "https://github.com/login/oauth";

    fn authorizer(transport: &MockTransport) -> OAuthAuthorizer {
        OAuthAuthorizer::with_parts(OAUTH, transport.factory(), Arc::new(StatusClassifier))
    }

    fn offline() -> OAuthAuthorizer {
        authorizer(&MockTransport::deferred())
    }

    // -----------------------------------------------------------------------
    // Authorization URL
    // -----------------------------------------------------------------------

    #[test]
    fn url_with_single_scope() {
        let url = offline().build_authorization_url("foo", "bar", &[Scope::PublicRepo]);
        assert_eq!(url, format!("{OAUTH}/authorize?client_id=foo&redirect_uri=bar&scope=public_repo"));
    }

    #[test]
    fn url_with_duplicate_scopes() {
        let url = offline().build_authorization_url("foo", "bar", &[Scope::PublicRepo, Scope::PublicRepo]);
        assert_eq!(url, format!("{OAUTH}/authorize?client_id=foo&redirect_uri=bar&scope=public_repo"));
    }

    #[test]
    fn url_with_multiple_scopes_keeps_order() {
        let scopes = [Scope::PublicRepo, Scope::Repo, Scope::Gists, Scope::User];
        let url = offline().build_authorization_url("foo", "bar", &scopes);
        assert_eq!(
            url,
            format!("{OAUTH}/authorize?client_id=foo&redirect_uri=bar&scope=public_repo,repo,gists,user")
        );
    }

    #[test]
    fn url_without_scopes_omits_scope() {
        let url = offline().build_authorization_url("foo", "bar", &[]);
        assert_eq!(url, format!("{OAUTH}/authorize?client_id=foo&redirect_uri=bar"));
    }

    #[test]
    fn url_encodes_redirect_uri() {
        let url = offline().build_authorization_url("foo", "http://localhost/cb?x=1", &[]);
        assert!(url.ends_with("redirect_uri=http%3A%2F%2Flocalhost%2Fcb%3Fx%3D1"));
    }

    // -----------------------------------------------------------------------
    // Code exchange
    // -----------------------------------------------------------------------

    #[test]
    fn exchange_posts_credentials_to_token_endpoint() {
        let transport = MockTransport::deferred();
        authorizer(&transport)
            .get_access_token("id", "secret", "code", |_| {}, |_| {})
            .unwrap();

        assert_eq!(transport.base_urls(), vec![OAUTH.to_string()]);
        let sent = transport.last_request();
        assert_eq!(sent.method, HttpMethod::Post);
        assert_eq!(sent.resource, "/access_token");
        assert_eq!(sent.parameter("client_id"), Some("id"));
        assert_eq!(sent.parameter("client_secret"), Some("secret"));
        assert_eq!(sent.parameter("code"), Some("code"));
        assert!(sent.body.is_none());
    }

    #[test]
    fn exchange_passes_token_to_success() {
        let body = "access_token=abc123&other_stuff=ignored";
        let transport = MockTransport::replying(RawResponse::completed(200, body));
        let token = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&token);
        authorizer(&transport)
            .get_access_token("id", "secret", "code", move |t| *slot.lock() = Some(t), |e| {
                panic!("unexpected error: {e}")
            })
            .unwrap();
        assert_eq!(token.lock().as_deref(), Some("abc123"));
    }

    #[test]
    fn exchange_failure_goes_to_error() {
        let transport = MockTransport::replying(RawResponse::completed(401, ""));
        let error = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&error);
        authorizer(&transport)
            .get_access_token("id", "secret", "code", |_| panic!("unexpected token"), move |e| {
                *slot.lock() = Some(e.kind())
            })
            .unwrap();
        assert_eq!(*error.lock(), Some(ErrorKind::Unauthorized));
    }

    #[test]
    fn reply_without_token_goes_to_error() {
        let transport =
            MockTransport::replying(RawResponse::completed(200, "error=bad_verification_code"));
        let error = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&error);
        authorizer(&transport)
            .get_access_token("id", "secret", "code", |_| panic!("unexpected token"), move |e| {
                *slot.lock() = Some(e)
            })
            .unwrap();
        let err = error.lock().take().unwrap();
        assert_eq!(err.kind(), ErrorKind::Unknown);
        assert_eq!(err.response().response_status, ResponseStatus::Completed);
        assert_eq!(err.response().content, "error=bad_verification_code");
    }

    #[test]
    fn empty_arguments_are_rejected_before_dispatch() {
        let transport = MockTransport::deferred();
        let err = authorizer(&transport)
            .get_access_token("", "secret", "code", |_| {}, |_| {})
            .unwrap_err();
        assert!(matches!(err, ArgumentError::Empty("client_id")));
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn parse_access_token_ignores_other_fields() {
        assert_eq!(
            parse_access_token("access_token=token&other_stuff=some%20crap").as_deref(),
            Some("token")
        );
        assert_eq!(parse_access_token("scope=repo"), None);
        assert_eq!(parse_access_token("access_token="), None);
    }
}
