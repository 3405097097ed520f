/// Three-way failure classification: auth, server, network.
///
/// Classification is a pure function of the failure signal. Structured
/// signals come first (HTTP status, transport error variant); the text
/// matcher only handles error strings with no structure behind them.
use serde::Serialize;

use crate::api::envelope::fallback_message;
use crate::api::{ApiResult, TransportError};

/// Statuses that mean the credential is missing, invalid or expired.
/// 419 is the backend framework's "session expired".
const AUTH_STATUSES: [u16; 2] = [401, 419];

/// Category of a failed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// Missing, invalid or expired credential. Recovery: log in.
    Auth,
    /// Backend-reported failure. Recovery: retry.
    Server,
    /// Unreachable host, timeout or malformed response. Recovery: retry.
    Network,
}

impl ErrorKind {
    /// Classify an unstructured error message.
    pub fn from_message(message: &str) -> Self {
        if message.contains("Unauthenticated") || message.contains("401") {
            Self::Auth
        } else if message.contains("undefined method") || message.contains("500") {
            Self::Server
        } else {
            Self::Network
        }
    }

    /// Classify a transport failure.
    pub fn from_transport(err: &TransportError) -> Self {
        match err {
            TransportError::Server { .. } => Self::Server,
            TransportError::Decode { .. } | TransportError::Connection { .. } => Self::Network,
        }
    }

    /// Classify a structurally valid response that reported failure.
    pub fn from_status(status: u16) -> Self {
        if AUTH_STATUSES.contains(&status) {
            Self::Auth
        } else {
            Self::Server
        }
    }

    /// Whether the user should be sent to log in rather than offered a retry.
    pub fn needs_login(self) -> bool {
        self == Self::Auth
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Auth => "Authentication Required",
            Self::Server => "Backend Error",
            Self::Network => "Connection Error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auth => write!(f, "auth"),
            Self::Server => write!(f, "server"),
            Self::Network => write!(f, "network"),
        }
    }
}

/// A classified failure, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchError {
    pub kind: ErrorKind,
    /// User-facing message.
    pub message: String,
    /// Raw failure text for the details panel.
    pub detail: String,
}

impl FetchError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            detail: detail.into(),
        }
    }

    /// Build from a transport failure. `subject` names what was being
    /// fetched (e.g. "engagement metrics") for the default messages.
    pub fn from_transport(err: &TransportError, subject: &str) -> Self {
        let detail = err.to_string();
        let kind = ErrorKind::from_transport(err);
        let message = match kind {
            ErrorKind::Auth => auth_message(subject),
            ErrorKind::Server | ErrorKind::Network => detail.clone(),
        };
        Self::new(kind, message, detail)
    }

    /// Build from a failed envelope.
    pub fn from_failed<T>(result: &ApiResult<T>, subject: &str) -> Self {
        let detail = result
            .message
            .clone()
            .unwrap_or_else(|| fallback_message(result.status));
        let kind = ErrorKind::from_status(result.status);
        let message = match kind {
            ErrorKind::Auth => auth_message(subject),
            _ => result
                .message
                .clone()
                .unwrap_or_else(|| format!("Failed to load {subject}")),
        };
        Self::new(kind, message, detail)
    }

    /// Build from free-form error text, classified by content.
    pub fn from_text(text: &str, subject: &str) -> Self {
        let kind = ErrorKind::from_message(text);
        let message = match kind {
            ErrorKind::Auth => auth_message(subject),
            _ if text.is_empty() => format!("Failed to fetch {subject}"),
            _ => text.to_string(),
        };
        Self::new(kind, message, text)
    }
}

fn auth_message(subject: &str) -> String {
    format!("You need to login to view {subject}")
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} error: {}", self.kind, self.message)
    }
}

impl std::error::Error for FetchError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
