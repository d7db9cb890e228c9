//! Resource services layered on `GitHubClient::call_api`.
//!
//! # Design
//! Each service builds a v3 `Request`, validates its arguments up front and
//! unwraps the typed payload before handing it to the caller.
//!
//! The presence checks (`is_following`, `is_watching`, `is_merged`) answer
//! with a bare status code, so `check_presence` reads a 204 as `true` and a
//! 404 as `false`. That is the only place above the classifier where a status
//! code is looked at again. Every other call, payload-less ones included,
//! takes the classifier's verdict as is.

mod issues;
mod organizations;
mod pull_requests;
mod repositories;
mod users;

use std::sync::Arc;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;

pub use issues::IssueService;
pub use organizations::OrganizationService;
pub use pull_requests::PullRequestService;
pub use repositories::RepositoryService;
pub use users::UserService;

use crate::client::Dispatcher;
use crate::error::{ApiError, ArgumentError};
use crate::handle::RequestHandle;
use crate::http::HttpMethod;
use crate::request::{ApiVersion, Request};
use crate::response::Response;

const NO_CONTENT: u16 = 204;
const NOT_FOUND: u16 = 404;

pub(crate) fn v3(resource: String, method: HttpMethod) -> Result<Request, ArgumentError> {
    Request::new(resource, ApiVersion::V3, method)
}

/// Dispatches `request` and passes the decoded payload to `on_success`.
pub(crate) fn fetch<T, S, E>(dispatcher: &Dispatcher, request: Request, on_success: S, on_error: E) -> RequestHandle
where
    T: DeserializeOwned + Default + Send + 'static,
    S: FnOnce(T) + Send + 'static,
    E: FnOnce(ApiError) + Send + 'static,
{
    dispatcher.call_api(request, move |response: Response<T>| on_success(response.into_data()), on_error)
}

/// Interprets a classified error from a presence-check endpoint.
///
/// `Some(true)` for 204, `Some(false)` for 404, `None` to forward the error.
pub(crate) fn presence(err: &ApiError) -> Option<bool> {
    if err.status_code() == NO_CONTENT {
        return Some(true);
    }
    if err.status_code() == NOT_FOUND {
        return Some(false);
    }
    None
}

/// Dispatches a GET whose answer is carried by its status code.
pub(crate) fn check_presence<R, E>(dispatcher: &Dispatcher, request: Request, on_result: R, on_error: E) -> RequestHandle
where
    R: FnOnce(bool) + Send + 'static,
    E: FnOnce(ApiError) + Send + 'static,
{
    let slot = Arc::new(Mutex::new(Some(on_result)));
    let success_slot = Arc::clone(&slot);
    dispatcher.call_api::<serde_json::Value, _, _>(
        request,
        move |_| {
            debug_assert!(false, "presence checks must not classify as success");
            if let Some(on_result) = success_slot.lock().take() {
                on_result(true);
            }
        },
        move |err| {
            let on_result = slot.lock().take();
            match (presence(&err), on_result) {
                (Some(found), Some(on_result)) => on_result(found),
                _ => on_error(err),
            }
        },
    )
}

/// Dispatches a call whose success carries no payload.
pub(crate) fn acknowledge<S, E>(dispatcher: &Dispatcher, request: Request, on_success: S, on_error: E) -> RequestHandle
where
    S: FnOnce() + Send + 'static,
    E: FnOnce(ApiError) + Send + 'static,
{
    dispatcher.call_api::<serde_json::Value, _, _>(request, move |_| on_success(), on_error)
}

/// Fails with `ArgumentError::OutOfRange` unless `page` is at least 1.
pub(crate) fn require_page(page: u32) -> Result<(), ArgumentError> {
    if page == 0 {
        return Err(ArgumentError::OutOfRange {
            name: "page",
            reason: "pages are numbered from 1".to_string(),
        });
    }
    Ok(())
}
