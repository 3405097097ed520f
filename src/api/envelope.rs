/// The `{ success, data?, message? }` response envelope and the raw
/// response it is read from.
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::TransportError;

/// Longest raw-text excerpt carried into a failure message.
const TEXT_EXCERPT_CHARS: usize = 300;

/// Body of an HTTP response, before envelope interpretation.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// The response declared a JSON content type and parsed.
    Json(Value),
    /// Any other content type, kept verbatim.
    Text(String),
}

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub body: ResponseBody,
}

impl RawResponse {
    /// The envelope's `success` flag, `false` when there is no envelope.
    pub fn envelope_success(&self) -> bool {
        match &self.body {
            ResponseBody::Json(value) => value
                .get("success")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            ResponseBody::Text(_) => false,
        }
    }

    /// Best human-readable message in the body.
    pub fn message(&self) -> Option<String> {
        match &self.body {
            ResponseBody::Json(value) => value
                .get("message")
                .or_else(|| value.get("error"))
                .and_then(Value::as_str)
                .map(str::to_string),
            ResponseBody::Text(text) => {
                let text = text.trim();
                (!text.is_empty()).then(|| excerpt(text))
            }
        }
    }
}

/// Result of one gateway request whose response was structurally valid.
///
/// `success == true` guarantees `data` is present; `success == false`
/// guarantees `message` is present.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResult<T> {
    pub status: u16,
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> ApiResult<T> {
    pub fn ok(status: u16, data: T, message: Option<String>) -> Self {
        Self {
            status,
            success: true,
            data: Some(data),
            message,
        }
    }

    pub fn failed(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }

    /// Split into the payload or the failure message.
    pub fn into_result(self) -> Result<T, String> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            _ => Err(self
                .message
                .unwrap_or_else(|| fallback_message(self.status))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Interpret a sub-500 response as an [`ApiResult`].
///
/// A JSON body that is not an envelope, or whose `data` does not fit `T`,
/// is a [`TransportError::Decode`]. A non-JSON body becomes a failed
/// result carrying the raw text.
pub fn interpret<T: DeserializeOwned>(raw: RawResponse) -> Result<ApiResult<T>, TransportError> {
    let status = raw.status;
    let value = match raw.body {
        ResponseBody::Json(value) => value,
        ResponseBody::Text(text) => {
            let text = text.trim();
            let message = if text.is_empty() {
                format!("empty non-JSON response (HTTP {status})")
            } else {
                excerpt(text)
            };
            return Ok(ApiResult::failed(status, message));
        }
    };

    let envelope: Envelope =
        serde_json::from_value(value).map_err(|e| TransportError::Decode {
            status,
            message: format!("response is not an envelope: {e}"),
        })?;
    let message = envelope.message.or(envelope.error);

    if !envelope.success {
        return Ok(ApiResult::failed(
            status,
            message.unwrap_or_else(|| fallback_message(status)),
        ));
    }

    match envelope.data {
        Some(Value::Null) | None => Ok(ApiResult::failed(
            status,
            message.unwrap_or_else(|| "response envelope carried no data".to_string()),
        )),
        Some(data) => {
            let data = serde_json::from_value(data).map_err(|e| TransportError::Decode {
                status,
                message: format!("unexpected data shape: {e}"),
            })?;
            Ok(ApiResult::ok(status, data, message))
        }
    }
}

/// Failure message used when the envelope carried none.
pub fn fallback_message(status: u16) -> String {
    format!("request failed with HTTP {status}")
}

fn excerpt(text: &str) -> String {
    if text.chars().count() <= TEXT_EXCERPT_CHARS {
        return text.to_string();
    }
    let cut: String = text.chars().take(TEXT_EXCERPT_CHARS).collect();
    format!("{cut}…")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
