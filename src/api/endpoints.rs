/// Typed wrappers for the organization API endpoints.
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ApiClient, ApiResult, Method, RawResponse, TransportError};
use crate::pipeline::employees::EmployeePayload;
use crate::pipeline::engagement::EngagementPayload;
use crate::pipeline::overview::OverviewPayload;
use crate::pipeline::population_health::PopulationHealthPayload;
use crate::pipeline::reports::{PagePayload, ReportPayload};
use crate::session::model::{Organization, User};

pub const LOGIN_PATH: &str = "/auth/login";
pub const LOGOUT_PATH: &str = "/auth/logout";
pub const PROFILE_PATH: &str = "/profile";
pub const OVERVIEW_PATH: &str = "/dashboard/overview";
pub const POPULATION_HEALTH_PATH: &str = "/analytics/population-health";
pub const ENGAGEMENT_PATH: &str = "/analytics/engagement";
pub const EMPLOYEES_PATH: &str = "/employees";
pub const REPORTS_PATH: &str = "/reports";

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// `data` of a successful login envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginData {
    #[serde(alias = "access_token")]
    pub token: String,
    pub user: User,
    pub organization: Organization,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub permissions: Option<Vec<String>>,
}

/// Append `?page=N` to a list endpoint.
pub fn paged(path: &str, page: u32) -> String {
    format!("{path}?page={}", page.max(1))
}

impl ApiClient {
    /// Exchange credentials for a token. Sent without `Authorization`.
    pub fn login(&self, email: &str, password: &str) -> Result<ApiResult<LoginData>, TransportError> {
        let body = serde_json::to_value(LoginRequest { email, password }).map_err(|e| {
            TransportError::Decode {
                status: 0,
                message: format!("failed to encode login request: {e}"),
            }
        })?;
        self.request(Method::Post, LOGIN_PATH, Some(&body), false)
    }

    /// Invalidate the current token server-side.
    pub fn logout(&self) -> Result<RawResponse, TransportError> {
        self.send(Method::Post, LOGOUT_PATH, None, true)
    }

    /// Organization profile, returned as untyped JSON.
    pub fn profile(&self) -> Result<ApiResult<Value>, TransportError> {
        self.request(Method::Get, PROFILE_PATH, None, true)
    }

    pub fn dashboard_overview(&self) -> Result<ApiResult<OverviewPayload>, TransportError> {
        self.request(Method::Get, OVERVIEW_PATH, None, true)
    }

    pub fn population_health(
        &self,
    ) -> Result<ApiResult<PopulationHealthPayload>, TransportError> {
        self.request(Method::Get, POPULATION_HEALTH_PATH, None, true)
    }

    pub fn engagement(&self) -> Result<ApiResult<EngagementPayload>, TransportError> {
        self.request(Method::Get, ENGAGEMENT_PATH, None, true)
    }

    pub fn employees(
        &self,
        page: u32,
    ) -> Result<ApiResult<PagePayload<EmployeePayload>>, TransportError> {
        self.request(Method::Get, &paged(EMPLOYEES_PATH, page), None, true)
    }

    pub fn reports(
        &self,
        page: u32,
    ) -> Result<ApiResult<PagePayload<ReportPayload>>, TransportError> {
        self.request(Method::Get, &paged(REPORTS_PATH, page), None, true)
    }
}
