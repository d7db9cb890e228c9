use std::sync::Arc;

use crate::client::Dispatcher;
use crate::error::{require_segment, ApiError, ArgumentError};
use crate::handle::RequestHandle;
use crate::http::HttpMethod;
use crate::parameter::{Parameter, State};
use crate::services::{check_presence, fetch, v3};
use crate::types::PullRequest;

pub struct PullRequestService {
    dispatcher: Arc<Dispatcher>,
}

impl PullRequestService {
    pub(crate) fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    pub fn get_pull_request<S, E>(
        &self,
        user: &str,
        repo: &str,
        number: u64,
        on_success: S,
        on_error: E,
    ) -> Result<RequestHandle, ArgumentError>
    where
        S: FnOnce(PullRequest) + Send + 'static,
        E: FnOnce(ApiError) + Send + 'static,
    {
        require_segment("user", user)?;
        require_segment("repo", repo)?;
        let request = v3(format!("/repos/{user}/{repo}/pulls/{number}"), HttpMethod::Get)?;
        Ok(fetch(&self.dispatcher, request, on_success, on_error))
    }

    pub fn get_pull_requests<S, E>(
        &self,
        user: &str,
        repo: &str,
        state: State,
        page: u32,
        on_success: S,
        on_error: E,
    ) -> Result<RequestHandle, ArgumentError>
    where
        S: FnOnce(Vec<PullRequest>) + Send + 'static,
        E: FnOnce(ApiError) + Send + 'static,
    {
        require_segment("user", user)?;
        require_segment("repo", repo)?;
        let request = v3(format!("/repos/{user}/{repo}/pulls"), HttpMethod::Get)?
            .with_parameters([Parameter::state(state), Parameter::page(page)]);
        Ok(fetch(&self.dispatcher, request, on_success, on_error))
    }

    /// Whether pull request `number` has been merged.
    pub fn is_merged<R, E>(
        &self,
        user: &str,
        repo: &str,
        number: u64,
        on_result: R,
        on_error: E,
    ) -> Result<RequestHandle, ArgumentError>
    where
        R: FnOnce(bool) + Send + 'static,
        E: FnOnce(ApiError) + Send + 'static,
    {
        require_segment("user", user)?;
        require_segment("repo", repo)?;
        let request = v3(format!("/repos/{user}/{repo}/pulls/{number}/merge"), HttpMethod::Get)?;
        Ok(check_presence(&self.dispatcher, request, on_result, on_error))
    }
}
