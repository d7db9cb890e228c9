use std::sync::Arc;

use crate::client::Dispatcher;
use crate::error::{require_segment, ApiError, ArgumentError};
use crate::handle::RequestHandle;
use crate::http::HttpMethod;
use crate::parameter::Parameter;
use crate::services::{fetch, v3};
use crate::types::User;

pub struct OrganizationService {
    dispatcher: Arc<Dispatcher>,
}

impl OrganizationService {
    pub(crate) fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Public members of `organization`.
    pub fn get_members<S, E>(
        &self,
        organization: &str,
        page: u32,
        on_success: S,
        on_error: E,
    ) -> Result<RequestHandle, ArgumentError>
    where
        S: FnOnce(Vec<User>) + Send + 'static,
        E: FnOnce(ApiError) + Send + 'static,
    {
        require_segment("organization", organization)?;
        let request =
            v3(format!("/orgs/{organization}/members"), HttpMethod::Get)?.with_parameter(Parameter::page(page));
        Ok(fetch(&self.dispatcher, request, on_success, on_error))
    }

    /// Organizations `user` belongs to.
    pub fn get_organizations<S, E>(
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
        let request = v3(format!("/users/{user}/orgs"), HttpMethod::Get)?.with_parameter(Parameter::page(page));
        Ok(fetch(&self.dispatcher, request, on_success, on_error))
    }
}
