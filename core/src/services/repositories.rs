use std::sync::Arc;

use crate::client::Dispatcher;
use crate::error::{require_non_empty, require_segment, ApiError, ArgumentError};
use crate::handle::RequestHandle;
use crate::http::HttpMethod;
use crate::parameter::Parameter;
use crate::services::{acknowledge, check_presence, fetch, require_page, v3};
use crate::types::{Branch, Commit, Repository};

/// Repositories, their forks, branches and commits, and watching.
pub struct RepositoryService {
    dispatcher: Arc<Dispatcher>,
}

impl RepositoryService {
    pub(crate) fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    pub fn get_repository<S, E>(
        &self,
        user: &str,
        repo: &str,
        on_success: S,
        on_error: E,
    ) -> Result<RequestHandle, ArgumentError>
    where
        S: FnOnce(Repository) + Send + 'static,
        E: FnOnce(ApiError) + Send + 'static,
    {
        require_segment("user", user)?;
        require_segment("repo", repo)?;
        let request = v3(format!("/repos/{user}/{repo}"), HttpMethod::Get)?;
        Ok(fetch(&self.dispatcher, request, on_success, on_error))
    }

    pub fn get_repositories<S, E>(
        &self,
        user: &str,
        page: u32,
        on_success: S,
        on_error: E,
    ) -> Result<RequestHandle, ArgumentError>
    where
        S: FnOnce(Vec<Repository>) + Send + 'static,
        E: FnOnce(ApiError) + Send + 'static,
    {
        require_segment("user", user)?;
        let request = v3(format!("/users/{user}/repos"), HttpMethod::Get)?.with_parameter(Parameter::page(page));
        Ok(fetch(&self.dispatcher, request, on_success, on_error))
    }

    pub fn get_watched_repositories<S, E>(
        &self,
        user: &str,
        page: u32,
        on_success: S,
        on_error: E,
    ) -> Result<RequestHandle, ArgumentError>
    where
        S: FnOnce(Vec<Repository>) + Send + 'static,
        E: FnOnce(ApiError) + Send + 'static,
    {
        require_segment("user", user)?;
        let request = v3(format!("/users/{user}/watched"), HttpMethod::Get)?.with_parameter(Parameter::page(page));
        Ok(fetch(&self.dispatcher, request, on_success, on_error))
    }

    /// Forks `user/repo` into the authenticated user's account.
    pub fn fork<S, E>(&self, user: &str, repo: &str, on_success: S, on_error: E) -> Result<RequestHandle, ArgumentError>
    where
        S: FnOnce(Repository) + Send + 'static,
        E: FnOnce(ApiError) + Send + 'static,
    {
        require_segment("user", user)?;
        require_segment("repo", repo)?;
        let request = v3(format!("/repos/{user}/{repo}/forks"), HttpMethod::Post)?;
        Ok(fetch(&self.dispatcher, request, on_success, on_error))
    }

    pub fn get_forks<S, E>(
        &self,
        user: &str,
        repo: &str,
        page: u32,
        on_success: S,
        on_error: E,
    ) -> Result<RequestHandle, ArgumentError>
    where
        S: FnOnce(Vec<Repository>) + Send + 'static,
        E: FnOnce(ApiError) + Send + 'static,
    {
        require_segment("user", user)?;
        require_segment("repo", repo)?;
        let request =
            v3(format!("/repos/{user}/{repo}/forks"), HttpMethod::Get)?.with_parameter(Parameter::page(page));
        Ok(fetch(&self.dispatcher, request, on_success, on_error))
    }

    pub fn watch<S, E>(&self, user: &str, repo: &str, on_success: S, on_error: E) -> Result<RequestHandle, ArgumentError>
    where
        S: FnOnce() + Send + 'static,
        E: FnOnce(ApiError) + Send + 'static,
    {
        require_segment("user", user)?;
        require_segment("repo", repo)?;
        let request = v3(format!("/user/watched/{user}/{repo}"), HttpMethod::Put)?;
        Ok(acknowledge(&self.dispatcher, request, on_success, on_error))
    }

    pub fn unwatch<S, E>(&self, user: &str, repo: &str, on_success: S, on_error: E) -> Result<RequestHandle, ArgumentError>
    where
        S: FnOnce() + Send + 'static,
        E: FnOnce(ApiError) + Send + 'static,
    {
        require_segment("user", user)?;
        require_segment("repo", repo)?;
        let request = v3(format!("/user/watched/{user}/{repo}"), HttpMethod::Delete)?;
        Ok(acknowledge(&self.dispatcher, request, on_success, on_error))
    }

    /// Whether the authenticated user watches `user/repo`.
    pub fn is_watching<R, E>(
        &self,
        user: &str,
        repo: &str,
        on_result: R,
        on_error: E,
    ) -> Result<RequestHandle, ArgumentError>
    where
        R: FnOnce(bool) + Send + 'static,
        E: FnOnce(ApiError) + Send + 'static,
    {
        require_segment("user", user)?;
        require_segment("repo", repo)?;
        let request = v3(format!("/user/watched/{user}/{repo}"), HttpMethod::Get)?;
        Ok(check_presence(&self.dispatcher, request, on_result, on_error))
    }

    pub fn get_branches<S, E>(
        &self,
        user: &str,
        repo: &str,
        page: u32,
        on_success: S,
        on_error: E,
    ) -> Result<RequestHandle, ArgumentError>
    where
        S: FnOnce(Vec<Branch>) + Send + 'static,
        E: FnOnce(ApiError) + Send + 'static,
    {
        require_segment("user", user)?;
        require_segment("repo", repo)?;
        let request =
            v3(format!("/repos/{user}/{repo}/branches"), HttpMethod::Get)?.with_parameter(Parameter::page(page));
        Ok(fetch(&self.dispatcher, request, on_success, on_error))
    }

    pub fn get_commit<S, E>(
        &self,
        user: &str,
        repo: &str,
        sha: &str,
        on_success: S,
        on_error: E,
    ) -> Result<RequestHandle, ArgumentError>
    where
        S: FnOnce(Commit) + Send + 'static,
        E: FnOnce(ApiError) + Send + 'static,
    {
        require_segment("user", user)?;
        require_segment("repo", repo)?;
        require_segment("sha", sha)?;
        let request = v3(format!("/repos/{user}/{repo}/commits/{sha}"), HttpMethod::Get)?;
        Ok(fetch(&self.dispatcher, request, on_success, on_error))
    }

    /// One page of the commits reachable from `branch` (a name or a SHA).
    pub fn get_commits<S, E>(
        &self,
        user: &str,
        repo: &str,
        branch: &str,
        page: u32,
        on_success: S,
        on_error: E,
    ) -> Result<RequestHandle, ArgumentError>
    where
        S: FnOnce(Vec<Commit>) + Send + 'static,
        E: FnOnce(ApiError) + Send + 'static,
    {
        require_segment("user", user)?;
        require_segment("repo", repo)?;
        require_non_empty("branch", branch)?;
        require_page(page)?;
        let request = v3(format!("/repos/{user}/{repo}/commits"), HttpMethod::Get)?
            .with_parameters([Parameter::page(page), Parameter::sha(branch)]);
        Ok(fetch(&self.dispatcher, request, on_success, on_error))
    }
}
