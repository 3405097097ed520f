//! Transport-level failures raised by the gateway client.
//!
//! Application-level failures (a 4xx with a structured envelope) are not
//! errors; they come back as a failed [`ApiResult`](super::ApiResult).

/// A request that produced no usable envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// DNS failure, refused connection, TLS failure or timeout.
    Connection { url: String, message: String },
    /// The backend answered with HTTP status >= 500.
    Server { status: u16, message: String },
    /// The body claimed to be JSON but could not be read as an envelope.
    Decode { status: u16, message: String },
}

impl TransportError {
    /// HTTP status, when a response arrived at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Connection { .. } => None,
            Self::Server { status, .. } | Self::Decode { status, .. } => Some(*status),
        }
    }

    pub fn is_server(&self) -> bool {
        matches!(self, Self::Server { .. })
    }
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connection { url, message } => {
                write!(f, "could not reach {url}: {message}")
            }
            Self::Server { status, message } => {
                write!(f, "server error (HTTP {status}): {message}")
            }
            Self::Decode { status, message } => {
                write!(f, "malformed response (HTTP {status}): {message}")
            }
        }
    }
}

impl std::error::Error for TransportError {}
