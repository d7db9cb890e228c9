//! The immutable description of one API call.

use std::fmt;

use serde::Serialize;

use crate::error::{require_non_empty, ArgumentError};
use crate::http::HttpMethod;
use crate::parameter::Parameter;

/// API generation a request targets; selects the base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiVersion {
    V2,
    V3,
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiVersion::V2 => f.write_str("v2"),
            ApiVersion::V3 => f.write_str("v3"),
        }
    }
}

/// One API call: resource, version, method, optional JSON body and ordered
/// parameters.
///
/// Built with `Request::new` and the consuming `with_*` methods; there are
/// no setters, and the client only ever reads it.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    resource: String,
    version: ApiVersion,
    method: HttpMethod,
    body: Option<serde_json::Value>,
    parameters: Vec<Parameter>,
}

impl Request {
    pub fn new(
        resource: impl Into<String>,
        version: ApiVersion,
        method: HttpMethod,
    ) -> Result<Self, ArgumentError> {
        let resource = resource.into();
        require_non_empty("resource", &resource)?;
        Ok(Self {
            resource,
            version,
            method,
            body: None,
            parameters: Vec::new(),
        })
    }

    /// Appends one parameter after any already present.
    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_parameters(mut self, parameters: impl IntoIterator<Item = Parameter>) -> Self {
        self.parameters.extend(parameters);
        self
    }

    /// Attaches `body`, serialized to a JSON value up front.
    pub fn with_body<B: Serialize>(mut self, body: &B) -> Result<Self, ArgumentError> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn version(&self) -> ApiVersion {
        self.version
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn body(&self) -> Option<&serde_json::Value> {
        self.body.as_ref()
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }
}
