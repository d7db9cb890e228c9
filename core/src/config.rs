//! Client configuration.
//!
//! Defaults point at the public GitHub endpoints. Tests and embedding
//! applications override the URLs, typically to reach a local server.

use std::time::Duration;

use serde::Deserialize;

use crate::request::ApiVersion;

pub const API_V2_URL: &str = "https://github.com/api/v2/json";
pub const API_V3_URL: &str = "https://api.github.com";
pub const OAUTH_URL: &str = "https://github.com/login/oauth";
pub const DEFAULT_USER_AGENT: &str = concat!("octo-core/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub api_v2_url: String,
    pub api_v3_url: String,
    pub oauth_url: String,
    pub user_agent: String,
    /// Per-request timeout applied by the default transport, in seconds.
    pub timeout: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_v2_url: API_V2_URL.to_string(),
            api_v3_url: API_V3_URL.to_string(),
            oauth_url: OAUTH_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    /// Serves every endpoint from one root, as the mock server does:
    /// v3 at the root, v2 under `/api/v2/json`, OAuth under `/login/oauth`.
    pub fn with_root(root: &str) -> Self {
        let root = root.trim_end_matches('/');
        Self {
            api_v2_url: format!("{root}/api/v2/json"),
            api_v3_url: root.to_string(),
            oauth_url: format!("{root}/login/oauth"),
            ..Self::default()
        }
    }

    pub fn base_url(&self, version: ApiVersion) -> &str {
        let url = match version {
            ApiVersion::V2 => &self.api_v2_url,
            ApiVersion::V3 => &self.api_v3_url,
        };
        url.trim_end_matches('/')
    }

    pub fn oauth_base_url(&self) -> &str {
        self.oauth_url.trim_end_matches('/')
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}
