//! Cancellable handle for one dispatched API call.

use std::fmt;

use tracing::debug;

use crate::request::Request;
use crate::transport::Cancellable;

/// Pairs the dispatched `Request` with the transport's in-flight handle.
///
/// Dropping the handle does not cancel the call.
pub struct RequestHandle {
    request: Request,
    inner: Box<dyn Cancellable>,
}

impl RequestHandle {
    pub fn new(request: Request, inner: Box<dyn Cancellable>) -> Self {
        Self { request, inner }
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Asks the transport to cancel the call. A no-op once it has completed.
    pub fn abort(&self) {
        debug!(resource = self.request.resource(), "aborting API call");
        self.inner.abort();
    }
}

impl fmt::Debug for RequestHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestHandle")
            .field("request", &self.request)
            .finish_non_exhaustive()
    }
}
