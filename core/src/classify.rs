//! Maps completed transport responses onto `ErrorKind`.
//!
//! # Design
//! Classification looks only at the HTTP status code and the transport
//! completion status, never at the payload. Rules are checked in a fixed
//! order and the first match wins:
//!
//! 1. 200 or 201: success, whatever the transport status says.
//! 2. Transport status `Error`: `NoNetwork`. A failed exchange can carry a
//!    stale or zero status code, so this precedes every status rule.
//! 3. 502 `ServerError`, 403 `ApiLimitExceeded`, 404 `ResourceNotFound`,
//!    401 `Unauthorized`.
//! 4. Anything else: `Unknown`. 204 lands here.

use crate::error::{ApiError, ErrorKind};
use crate::response::{RawResponse, ResponseStatus};

/// Decides whether a response is an error, and which one.
pub trait ErrorClassifier: Send + Sync {
    fn classify(&self, response: &RawResponse) -> Result<(), ApiError>;
}

/// The standard decision table.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusClassifier;

impl ErrorClassifier for StatusClassifier {
    fn classify(&self, response: &RawResponse) -> Result<(), ApiError> {
        match error_kind(response.status_code, response.response_status) {
            None => Ok(()),
            Some(kind) => Err(ApiError::new(response.clone(), kind)),
        }
    }
}

/// Returns `None` for success, otherwise the matching `ErrorKind`.
pub fn error_kind(status_code: u16, response_status: ResponseStatus) -> Option<ErrorKind> {
    if status_code == 200 || status_code == 201 {
        return None;
    }
    if response_status == ResponseStatus::Error {
        return Some(ErrorKind::NoNetwork);
    }
    let kind = match status_code {
        502 => ErrorKind::ServerError,
        403 => ErrorKind::ApiLimitExceeded,
        404 => ErrorKind::ResourceNotFound,
        401 => ErrorKind::Unauthorized,
        _ => ErrorKind::Unknown,
    };
    Some(kind)
}
