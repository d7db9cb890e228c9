use std::sync::Arc;

use crate::client::Dispatcher;
use crate::error::{require_segment, ApiError, ArgumentError};
use crate::handle::RequestHandle;
use crate::http::HttpMethod;
use crate::parameter::Parameter;
use crate::services::{acknowledge, check_presence, fetch, v3};
use crate::types::User;

/// User accounts and the follow graph.
pub struct UserService {
    dispatcher: Arc<Dispatcher>,
}

impl UserService {
    pub(crate) fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    pub fn get_user<S, E>(&self, user: &str, on_success: S, on_error: E) -> Result<RequestHandle, ArgumentError>
    where
        S: FnOnce(User) + Send + 'static,
        E: FnOnce(ApiError) + Send + 'static,
    {
        require_segment("user", user)?;
        let request = v3(format!("/users/{user}"), HttpMethod::Get)?;
        Ok(fetch(&self.dispatcher, request, on_success, on_error))
    }

    /// The user the current authenticator identifies.
    pub fn get_authenticated_user<S, E>(&self, on_success: S, on_error: E) -> Result<RequestHandle, ArgumentError>
    where
        S: FnOnce(User) + Send + 'static,
        E: FnOnce(ApiError) + Send + 'static,
    {
        let request = v3("/user".to_string(), HttpMethod::Get)?;
        Ok(fetch(&self.dispatcher, request, on_success, on_error))
    }

    /// Whether the authenticated user follows `user`.
    pub fn is_following<R, E>(&self, user: &str, on_result: R, on_error: E) -> Result<RequestHandle, ArgumentError>
    where
        R: FnOnce(bool) + Send + 'static,
        E: FnOnce(ApiError) + Send + 'static,
    {
        require_segment("user", user)?;
        let request = v3(format!("/user/following/{user}"), HttpMethod::Get)?;
        Ok(check_presence(&self.dispatcher, request, on_result, on_error))
    }

    pub fn follow<S, E>(&self, user: &str, on_success: S, on_error: E) -> Result<RequestHandle, ArgumentError>
    where
        S: FnOnce() + Send + 'static,
        E: FnOnce(ApiError) + Send + 'static,
    {
        require_segment("user", user)?;
        let request = v3(format!("/user/following/{user}"), HttpMethod::Put)?;
        Ok(acknowledge(&self.dispatcher, request, on_success, on_error))
    }

    pub fn unfollow<S, E>(&self, user: &str, on_success: S, on_error: E) -> Result<RequestHandle, ArgumentError>
    where
        S: FnOnce() + Send + 'static,
        E: FnOnce(ApiError) + Send + 'static,
    {
        require_segment("user", user)?;
        let request = v3(format!("/user/following/{user}"), HttpMethod::Delete)?;
        Ok(acknowledge(&self.dispatcher, request, on_success, on_error))
    }

    pub fn get_followers<S, E>(
        &self,
        user: &str,
        page: u32,
        on_success: S,
        on_error: E,
    ) -> Result<RequestHandle, ArgumentError>
    where
        S: FnOnce(Vec<User>) + Send + 'static,
        E: FnOnce(ApiError) + Send + 'static,
    {
        require_segment("user", user)?;
        let request = v3(format!("/users/{user}/followers"), HttpMethod::Get)?.with_parameter(Parameter::page(page));
        Ok(fetch(&self.dispatcher, request, on_success, on_error))
    }

    pub fn get_following<S, E>(
        &self,
        user: &str,
        page: u32,
        on_success: S,
        on_error: E,
    ) -> Result<RequestHandle, ArgumentError>
    where
        S: FnOnce(Vec<User>) + Send + 'static,
        E: FnOnce(ApiError) + Send + 'static,
    {
        require_segment("user", user)?;
        let request = v3(format!("/users/{user}/following"), HttpMethod::Get)?.with_parameter(Parameter::page(page));
        Ok(fetch(&self.dispatcher, request, on_success, on_error))
    }

    /// Users watching `user/repo`.
    pub fn get_watchers<S, E>(
        &self,
        user: &str,
        repo: &str,
        page: u32,
        on_success: S,
        on_error: E,
    ) -> Result<RequestHandle, ArgumentError>
    where
        S: FnOnce(Vec<User>) + Send + 'static,
        E: FnOnce(ApiError) + Send + 'static,
    {
        require_segment("user", user)?;
        require_segment("repo", repo)?;
        let request =
            v3(format!("/repos/{user}/{repo}/watchers"), HttpMethod::Get)?.with_parameter(Parameter::page(page));
        Ok(fetch(&self.dispatcher, request, on_success, on_error))
    }
}
