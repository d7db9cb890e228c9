//! Credential strategies applied to outgoing requests.
//!
//! # Design
//! An `Authenticator` decorates an `HttpRequest` right before a transport
//! client sends it. The client stores one as an `Arc<dyn Authenticator>` and
//! hands that `Arc` to every transport client it creates; it never looks at
//! the credentials itself. `NullAuthenticator` is the default and the
//! fallback whenever "no authenticator" is assigned.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::http::HttpRequest;

/// Adds credentials to an outgoing request.
pub trait Authenticator: Send + Sync + fmt::Debug {
    fn authenticate(&self, request: &mut HttpRequest);
}

/// Sends requests unauthenticated.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAuthenticator;

impl Authenticator for NullAuthenticator {
    fn authenticate(&self, _request: &mut HttpRequest) {}
}

/// HTTP basic authentication with a user name and password.
#[derive(Clone)]
pub struct BasicAuthenticator {
    username: String,
    password: String,
}

impl BasicAuthenticator {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

impl fmt::Debug for BasicAuthenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuthenticator")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Authenticator for BasicAuthenticator {
    fn authenticate(&self, request: &mut HttpRequest) {
        let credentials = STANDARD.encode(format!("{}:{}", self.username, self.password));
        request.add_header("authorization", format!("Basic {credentials}"));
    }
}

/// OAuth access token sent as `Authorization: token <access token>`.
#[derive(Clone)]
pub struct TokenAuthenticator {
    access_token: String,
}

impl TokenAuthenticator {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
        }
    }
}

impl fmt::Debug for TokenAuthenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenAuthenticator")
            .field("access_token", &"<redacted>")
            .finish()
    }
}

impl Authenticator for TokenAuthenticator {
    fn authenticate(&self, request: &mut HttpRequest) {
        request.add_header("authorization", format!("token {}", self.access_token));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;

    fn request() -> HttpRequest {
        HttpRequest::new(HttpMethod::Get, "/user")
    }

    #[test]
    fn null_authenticator_leaves_request_untouched() {
        let mut req = request();
        let before = req.clone();
        NullAuthenticator.authenticate(&mut req);
        assert_eq!(req, before);
    }

    #[test]
    fn basic_authenticator_adds_encoded_credentials() {
        let mut req = request();
        BasicAuthenticator::new("octocat", "hunter2").authenticate(&mut req);
        // base64("octocat:hunter2")
        assert_eq!(req.header("Authorization"), Some("Basic b2N0b2NhdDpodW50ZXIy"));
    }

    #[test]
    fn token_authenticator_adds_token_header() {
        let mut req = request();
        TokenAuthenticator::new("abc123").authenticate(&mut req);
        assert_eq!(req.header("authorization"), Some("token abc123"));
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let basic = format!("{:?}", BasicAuthenticator::new("octocat", "hunter2"));
        assert!(basic.contains("octocat"));
        assert!(!basic.contains("hunter2"));
        let token = format!("{:?}", TokenAuthenticator::new("abc123"));
        assert!(!token.contains("abc123"));
    }
}
