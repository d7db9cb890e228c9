use std::sync::Arc;

use crate::client::Dispatcher;
use crate::error::{require_non_empty, require_segment, ApiError, ArgumentError};
use crate::handle::RequestHandle;
use crate::http::HttpMethod;
use crate::parameter::{Parameter, State};
use crate::services::{fetch, v3};
use crate::types::{Comment, Issue, NewComment, NewIssue};

/// Issues and issue comments.
pub struct IssueService {
    dispatcher: Arc<Dispatcher>,
}

impl IssueService {
    pub(crate) fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Opens an issue on `user/repo`; `issue.title` must not be empty.
    pub fn create_issue<S, E>(
        &self,
        user: &str,
        repo: &str,
        issue: &NewIssue,
        on_success: S,
        on_error: E,
    ) -> Result<RequestHandle, ArgumentError>
    where
        S: FnOnce(Issue) + Send + 'static,
        E: FnOnce(ApiError) + Send + 'static,
    {
        require_segment("user", user)?;
        require_segment("repo", repo)?;
        require_non_empty("title", &issue.title)?;
        let request = v3(format!("/repos/{user}/{repo}/issues"), HttpMethod::Post)?.with_body(issue)?;
        Ok(fetch(&self.dispatcher, request, on_success, on_error))
    }

    pub fn get_issue<S, E>(
        &self,
        user: &str,
        repo: &str,
        number: u64,
        on_success: S,
        on_error: E,
    ) -> Result<RequestHandle, ArgumentError>
    where
        S: FnOnce(Issue) + Send + 'static,
        E: FnOnce(ApiError) + Send + 'static,
    {
        require_segment("user", user)?;
        require_segment("repo", repo)?;
        let request = v3(format!("/repos/{user}/{repo}/issues/{number}"), HttpMethod::Get)?;
        Ok(fetch(&self.dispatcher, request, on_success, on_error))
    }

    pub fn get_issues<S, E>(
        &self,
        user: &str,
        repo: &str,
        state: State,
        page: u32,
        on_success: S,
        on_error: E,
    ) -> Result<RequestHandle, ArgumentError>
    where
        S: FnOnce(Vec<Issue>) + Send + 'static,
        E: FnOnce(ApiError) + Send + 'static,
    {
        require_segment("user", user)?;
        require_segment("repo", repo)?;
        let request = v3(format!("/repos/{user}/{repo}/issues"), HttpMethod::Get)?
            .with_parameters([Parameter::state(state), Parameter::page(page)]);
        Ok(fetch(&self.dispatcher, request, on_success, on_error))
    }

    pub fn create_comment<S, E>(
        &self,
        user: &str,
        repo: &str,
        number: u64,
        text: &str,
        on_success: S,
        on_error: E,
    ) -> Result<RequestHandle, ArgumentError>
    where
        S: FnOnce(Comment) + Send + 'static,
        E: FnOnce(ApiError) + Send + 'static,
    {
        require_segment("user", user)?;
        require_segment("repo", repo)?;
        require_non_empty("text", text)?;
        let body = NewComment { body: text.to_string() };
        let request =
            v3(format!("/repos/{user}/{repo}/issues/{number}/comments"), HttpMethod::Post)?.with_body(&body)?;
        Ok(fetch(&self.dispatcher, request, on_success, on_error))
    }

    pub fn get_comments<S, E>(
        &self,
        user: &str,
        repo: &str,
        number: u64,
        page: u32,
        on_success: S,
        on_error: E,
    ) -> Result<RequestHandle, ArgumentError>
    where
        S: FnOnce(Vec<Comment>) + Send + 'static,
        E: FnOnce(ApiError) + Send + 'static,
    {
        require_segment("user", user)?;
        require_segment("repo", repo)?;
        let request = v3(format!("/repos/{user}/{repo}/issues/{number}/comments"), HttpMethod::Get)?
            .with_parameter(Parameter::page(page));
        Ok(fetch(&self.dispatcher, request, on_success, on_error))
    }
}
