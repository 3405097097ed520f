//! Connectivity probe: a fixed battery of endpoint checks.
//!
//! Each check reports the raw HTTP status and timing. A check passes when
//! the backend answered with anything below 500, so a 401 from a protected
//! endpoint or a 422 from an empty login still proves the route exists.

use std::time::Instant;

use serde::Serialize;
use serde_json::Value;

use crate::api::endpoints::{
    EMPLOYEES_PATH, ENGAGEMENT_PATH, LOGIN_PATH, OVERVIEW_PATH, POPULATION_HEALTH_PATH,
    PROFILE_PATH,
};
use crate::api::{ApiClient, Method, RawResponse, ResponseBody, TransportError};

/// Path segment stripped from the API base to reach the server root.
const API_PREFIX: &str = "/api/org";

/// Where a check sends its request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// The server root: the API base with its `/api/org` prefix removed.
    ServerRoot,
    /// A path under the API base.
    Endpoint(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub struct Check {
    pub name: &'static str,
    pub description: &'static str,
    pub method: Method,
    pub target: Target,
    /// Send `{}` as a JSON body.
    pub empty_body: bool,
    pub requires_auth: bool,
}

pub const CHECKS: [Check; 8] = [
    Check {
        name: "Backend Reachability",
        description: "Server root responds",
        method: Method::Get,
        target: Target::ServerRoot,
        empty_body: false,
        requires_auth: false,
    },
    Check {
        name: "API Base Check",
        description: "API base path is routed",
        method: Method::Get,
        target: Target::Endpoint("/"),
        empty_body: false,
        requires_auth: false,
    },
    Check {
        name: "Login Endpoint",
        description: "Login exists (expects a validation error)",
        method: Method::Post,
        target: Target::Endpoint(LOGIN_PATH),
        empty_body: true,
        requires_auth: false,
    },
    Check {
        name: "Dashboard Overview",
        description: "Dashboard metrics endpoint",
        method: Method::Get,
        target: Target::Endpoint(OVERVIEW_PATH),
        empty_body: false,
        requires_auth: true,
    },
    Check {
        name: "Profile Endpoint",
        description: "Organization profile endpoint",
        method: Method::Get,
        target: Target::Endpoint(PROFILE_PATH),
        empty_body: false,
        requires_auth: true,
    },
    Check {
        name: "Population Health Analytics",
        description: "Population health endpoint",
        method: Method::Get,
        target: Target::Endpoint(POPULATION_HEALTH_PATH),
        empty_body: false,
        requires_auth: true,
    },
    Check {
        name: "Engagement Analytics",
        description: "Engagement metrics endpoint",
        method: Method::Get,
        target: Target::Endpoint(ENGAGEMENT_PATH),
        empty_body: false,
        requires_auth: true,
    },
    Check {
        name: "List Employees",
        description: "Employee list endpoint",
        method: Method::Get,
        target: Target::Endpoint(EMPLOYEES_PATH),
        empty_body: false,
        requires_auth: true,
    },
];

/// Outcome of one check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckResult {
    pub name: String,
    pub method: String,
    pub url: String,
    pub status: Option<u16>,
    pub duration_ms: u64,
    pub success: bool,
    /// Short body excerpt or envelope message.
    pub summary: Option<String>,
    /// Transport failure text when no response arrived.
    pub error: Option<String>,
}

/// Server root for an API base URL. Only a trailing `/api/org` is removed.
pub fn server_root(base_url: &str) -> String {
    base_url
        .strip_suffix(API_PREFIX)
        .unwrap_or(base_url)
        .to_string()
}

/// URL a check will hit for `base_url`.
pub fn url_for(check: &Check, base_url: &str) -> String {
    match check.target {
        Target::ServerRoot => server_root(base_url),
        Target::Endpoint(path) => format!("{base_url}{path}"),
    }
}

/// Run every check in order. Never stops early.
pub fn run(client: &ApiClient) -> Vec<CheckResult> {
    CHECKS.iter().map(|check| run_check(client, check)).collect()
}

pub fn run_check(client: &ApiClient, check: &Check) -> CheckResult {
    let url = url_for(check, client.base_url());
    let label = match check.target {
        Target::ServerRoot => "(root)",
        Target::Endpoint(path) => path,
    };
    let body = check.empty_body.then(|| Value::Object(Default::default()));

    let started = Instant::now();
    let outcome = client.send_url(check.method, &url, label, body.as_ref(), check.requires_auth);
    let duration_ms = started.elapsed().as_millis() as u64;

    let mut result = CheckResult {
        name: check.name.to_string(),
        method: check.method.to_string(),
        url,
        status: None,
        duration_ms,
        success: false,
        summary: None,
        error: None,
    };

    match outcome {
        Ok(raw) => {
            result.status = Some(raw.status);
            result.success = raw.status < 500;
            result.summary = summarize(&raw);
        }
        Err(err @ TransportError::Server { .. }) => {
            result.status = err.status();
            result.summary = Some(err.to_string());
        }
        Err(err) => {
            result.status = err.status();
            result.error = Some(err.to_string());
        }
    }
    result
}

fn summarize(raw: &RawResponse) -> Option<String> {
    match &raw.body {
        ResponseBody::Json(_) => raw.message(),
        ResponseBody::Text(text) if text.trim().is_empty() => None,
        ResponseBody::Text(_) => raw.message().map(|m| m.lines().next().unwrap_or("").to_string()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
