//! Transport-native request types.
//!
//! # Design
//! `HttpRequest` is the plain-data request a transport client executes. The
//! client builds it from a `Request`: the resource path stays relative to
//! the transport client's base URL, parameters keep their insertion order,
//! and the JSON body is already serialized. Authenticators decorate it in
//! place through `add_header` / `add_parameter` just before it is sent.

use std::fmt;

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data, relative to a base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    /// Resource path appended to the transport client's base URL.
    pub resource: String,
    pub headers: Vec<(String, String)>,
    pub parameters: Vec<(String, String)>,
    /// Serialized JSON body.
    pub body: Option<String>,
}

impl HttpRequest {
    /// An empty request that negotiates JSON.
    pub fn new(method: HttpMethod, resource: impl Into<String>) -> Self {
        Self {
            method,
            resource: resource.into(),
            headers: vec![("accept".to_string(), JSON_CONTENT_TYPE.to_string())],
            parameters: Vec::new(),
            body: None,
        }
    }

    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.push((name.into(), value.into()));
    }

    pub fn add_parameter(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.parameters.push((name.into(), value.into()));
    }

    /// Attaches a serialized JSON body and its content type.
    pub fn set_json_body(&mut self, body: String) {
        self.headers
            .push(("content-type".to_string(), JSON_CONTENT_TYPE.to_string()));
        self.body = Some(body);
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Whether parameters travel in the query string rather than a form body.
    ///
    /// Requests without a body on methods that carry one send their
    /// parameters form-encoded; everything else uses the query string.
    pub fn parameters_in_query(&self) -> bool {
        match self.method {
            HttpMethod::Get | HttpMethod::Head | HttpMethod::Delete | HttpMethod::Options => true,
            HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch => self.body.is_some(),
        }
    }

    /// Joins `base_url` and the resource path with exactly one `/`.
    pub fn url(&self, base_url: &str) -> String {
        let base = base_url.trim_end_matches('/');
        let resource = self.resource.trim_start_matches('/');
        if resource.is_empty() {
            return base.to_string();
        }
        format!("{base}/{resource}")
    }
}
