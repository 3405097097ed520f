/// HTTP gateway client for the organization API.
///
/// Talks to the backend at the configured base URL using the synchronous
/// `ureq` client. Every call is independent: no retries, no caching.
///
/// - `Accept: application/json` is always sent.
/// - `Content-Type: application/json` is sent only with a body.
/// - `Authorization: Bearer <token>` is attached when the caller asks for
///   auth and a token is stored. Without a token the request still goes
///   out, unauthenticated; the endpoint decides whether to reject it.
///
/// Responses below HTTP 500 are read as envelopes ([`ApiResult`]). Status
/// 500 and above, connection failures and unreadable JSON bodies are
/// [`TransportError`]s.
use std::path::PathBuf;
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde_json::Value;

pub mod endpoints;
pub mod envelope;
pub mod error;

pub use envelope::{ApiResult, RawResponse, ResponseBody};
pub use error::TransportError;

use crate::analytics::logger::{self, RequestEvent, RequestOutcome};
use crate::config::DashConfig;
use crate::storage::TokenStore;

/// HTTP method subset used by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Synchronous gateway client.
///
/// Holds a read-only handle on the token store; it never writes the token.
pub struct ApiClient {
    base_url: String,
    agent: ureq::Agent,
    tokens: TokenStore,
    request_log: Option<PathBuf>,
}

impl ApiClient {
    /// Build a client for `base_url`. `timeout` of `None` waits forever.
    pub fn new(base_url: &str, timeout: Option<Duration>, tokens: TokenStore) -> Self {
        let mut builder = ureq::AgentBuilder::new();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent: builder.build(),
            tokens,
            request_log: None,
        }
    }

    /// Build a client from the resolved config, with request logging as
    /// configured.
    pub fn from_config(config: &DashConfig, tokens: TokenStore) -> Self {
        let timeout = (config.api.timeout_ms > 0)
            .then(|| Duration::from_millis(config.api.timeout_ms));
        Self::new(&config.api.base_url, timeout, tokens)
            .with_request_log(config.logging.active_path())
    }

    /// Append every request to the JSONL log at `path` (or stop logging).
    pub fn with_request_log(mut self, path: Option<PathBuf>) -> Self {
        self.request_log = path;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for an endpoint path.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Issue a request and read the response as an envelope.
    pub fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        requires_auth: bool,
    ) -> Result<ApiResult<T>, TransportError> {
        let token = self.token_for(requires_auth);
        let started = Instant::now();

        let result = self
            .execute(method, &self.url_for(path), body, token.as_deref())
            .and_then(reject_server_errors)
            .and_then(envelope::interpret::<T>);

        let (status, outcome) = match &result {
            Ok(api) if api.success => (Some(api.status), RequestOutcome::Ok),
            Ok(api) => (Some(api.status), RequestOutcome::Failed),
            Err(err) => (err.status(), outcome_for(err)),
        };
        self.record(method, path, status, started, outcome, token.is_some());

        result
    }

    /// Issue a request and return status and body without interpreting the
    /// envelope. HTTP status >= 500 is still a [`TransportError::Server`].
    pub fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        requires_auth: bool,
    ) -> Result<RawResponse, TransportError> {
        self.send_url(method, &self.url_for(path), path, body, requires_auth)
    }

    /// Like [`send`](Self::send) against an absolute URL. `label` is what the
    /// request log records as the path.
    pub fn send_url(
        &self,
        method: Method,
        url: &str,
        label: &str,
        body: Option<&Value>,
        requires_auth: bool,
    ) -> Result<RawResponse, TransportError> {
        let token = self.token_for(requires_auth);
        let started = Instant::now();

        let result = self
            .execute(method, url, body, token.as_deref())
            .and_then(reject_server_errors);

        let (status, outcome) = match &result {
            Ok(raw) if raw.status < 400 => (Some(raw.status), RequestOutcome::Ok),
            Ok(raw) => (Some(raw.status), RequestOutcome::Failed),
            Err(err) => (err.status(), outcome_for(err)),
        };
        self.record(method, label, status, started, outcome, token.is_some());

        result
    }

    // -- Internal --

    fn token_for(&self, requires_auth: bool) -> Option<String> {
        if requires_auth {
            self.tokens.get_token()
        } else {
            None
        }
    }

    /// Perform the HTTP exchange. Every status comes back as a
    /// [`RawResponse`]; only transport and JSON parse failures are errors.
    fn execute(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> Result<RawResponse, TransportError> {
        let mut request = self
            .agent
            .request(method.as_str(), url)
            .set("Accept", "application/json");

        if let Some(token) = token {
            request = request.set("Authorization", &format!("Bearer {token}"));
        }

        let outcome = match body {
            Some(body) => request
                .set("Content-Type", "application/json")
                .send_string(&body.to_string()),
            None => request.call(),
        };

        let response = match outcome {
            Ok(response) => response,
            Err(ureq::Error::Status(_, response)) => response,
            Err(ureq::Error::Transport(transport)) => {
                return Err(TransportError::Connection {
                    url: url.to_string(),
                    message: describe_transport(&transport),
                });
            }
        };

        let status = response.status();
        let is_json = response
            .header("Content-Type")
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("application/json"));

        let text = response
            .into_string()
            .map_err(|e| TransportError::Decode {
                status,
                message: format!("failed to read response body: {e}"),
            })?;

        let body = if is_json {
            let value = serde_json::from_str(&text).map_err(|e| TransportError::Decode {
                status,
                message: format!("invalid JSON body: {e}"),
            })?;
            ResponseBody::Json(value)
        } else {
            ResponseBody::Text(text)
        };

        Ok(RawResponse { status, body })
    }

    fn record(
        &self,
        method: Method,
        path: &str,
        status: Option<u16>,
        started: Instant,
        outcome: RequestOutcome,
        authenticated: bool,
    ) {
        let Some(log_path) = &self.request_log else {
            return;
        };
        let duration_ms = started.elapsed().as_millis() as u64;
        let event = RequestEvent::new(
            method.as_str(),
            path,
            status,
            duration_ms,
            outcome,
            authenticated,
        );
        logger::log_request(log_path, &event);
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("request_log", &self.request_log)
            .finish()
    }
}

/// Turn HTTP >= 500 into a [`TransportError::Server`].
fn reject_server_errors(raw: RawResponse) -> Result<RawResponse, TransportError> {
    if raw.status < 500 {
        return Ok(raw);
    }
    let message = raw
        .message()
        .unwrap_or_else(|| format!("HTTP {}", raw.status));
    Err(TransportError::Server {
        status: raw.status,
        message,
    })
}

/// Failure kind, message and cause, without the URL `Display` leads with.
fn describe_transport(transport: &ureq::Transport) -> String {
    let mut text = transport.kind().to_string();
    if let Some(message) = transport.message() {
        text.push_str(": ");
        text.push_str(message);
    }
    if let Some(source) = std::error::Error::source(transport) {
        text.push_str(&format!(": {source}"));
    }
    text
}

fn outcome_for(err: &TransportError) -> RequestOutcome {
    if err.is_server() {
        RequestOutcome::Server
    } else {
        RequestOutcome::Network
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::storage::MemoryStore;

    fn tokens() -> TokenStore {
        TokenStore::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn client_strips_trailing_slash() {
        let client = ApiClient::new("http://127.0.0.1:8000/api/org/", None, tokens());
        assert_eq!(client.base_url(), "http://127.0.0.1:8000/api/org");
        assert_eq!(
            client.url_for("/dashboard/overview"),
            "http://127.0.0.1:8000/api/org/dashboard/overview"
        );
    }

    #[test]
    fn client_from_default_config() {
        let config = DashConfig::default();
        let client = ApiClient::from_config(&config, tokens());
        assert_eq!(client.base_url(), "http://127.0.0.1:8000/api/org");
    }

    #[test]
    fn server_errors_take_body_message() {
        let err = reject_server_errors(RawResponse {
            status: 500,
            body: ResponseBody::Json(json!({"message": "Call to undefined method"})),
        })
        .unwrap_err();
        assert_eq!(
            err,
            TransportError::Server {
                status: 500,
                message: "Call to undefined method".to_string()
            }
        );

        let err = reject_server_errors(RawResponse {
            status: 503,
            body: ResponseBody::Text(String::new()),
        })
        .unwrap_err();
        assert_eq!(err.to_string(), "server error (HTTP 503): HTTP 503");
    }

    #[test]
    fn sub_500_passes_through() {
        let raw = RawResponse {
            status: 404,
            body: ResponseBody::Text("missing".to_string()),
        };
        assert_eq!(reject_server_errors(raw.clone()), Ok(raw));
    }

    #[test]
    fn unreachable_host_is_connection_error() {
        // Port 9 (discard) is closed on loopback in test environments.
        let client = ApiClient::new(
            "http://127.0.0.1:9/api/org",
            Some(Duration::from_secs(2)),
            tokens(),
        );
        let err = client
            .request::<Value>(Method::Get, "/profile", None, true)
            .unwrap_err();
        assert!(matches!(err, TransportError::Connection { .. }));
        assert_eq!(outcome_for(&err), RequestOutcome::Network);
        assert_eq!(err.to_string().matches("127.0.0.1:9").count(), 1);
    }

    #[test]
    fn method_names() {
        assert_eq!(Method::Get.to_string(), "GET");
        assert_eq!(Method::Delete.as_str(), "DELETE");
    }
}
