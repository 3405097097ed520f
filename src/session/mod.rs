//! Client-side session lifecycle.
//!
//! The manager starts `Unknown`, settles on `Anonymous` or
//! `Authenticated` once [`SessionManager::initialize`] has read the token
//! store, and moves between the two on login and logout. The token store is
//! written before the state changes, so a restart always rehydrates the
//! session the manager last reported.

pub mod model;

use std::collections::BTreeSet;

use crate::api::ApiClient;
use crate::api::envelope::fallback_message;
use crate::api::endpoints::LoginData;
use crate::pipeline::{ErrorKind, FetchError};
use crate::storage::TokenStore;

pub use model::{Organization, Session, User, UserRole};

const LOGIN_FAILED: &str = "Login failed";

/// Where the session lifecycle currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Storage not read yet.
    Unknown,
    Anonymous,
    Authenticated(Session),
}

/// Failures surfaced by the session manager.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionError {
    /// The backend rejected the credentials or could not be reached.
    Login(FetchError),
    /// The token store could not be written.
    Storage(String),
    /// The operation needs a signed-in user.
    NotAuthenticated,
    /// Signed in, but the role does not allow the operation.
    Forbidden { role: Option<String> },
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Login(err) => write!(f, "{}", err.message),
            Self::Storage(message) => write!(f, "could not persist session: {message}"),
            Self::NotAuthenticated => write!(f, "not logged in"),
            Self::Forbidden { role: Some(role) } => {
                write!(f, "role {role} is not allowed to do this")
            }
            Self::Forbidden { role: None } => write!(f, "no role assigned; admin access required"),
        }
    }
}

impl std::error::Error for SessionError {}

/// What happened to the server-side half of a logout. The local session is
/// cleared either way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoutOutcome {
    /// The backend accepted the logout request.
    pub server_acknowledged: bool,
    /// Why the backend did not, when it did not.
    pub warning: Option<String>,
}

/// Owns the API client and the session state built on top of it.
#[derive(Debug)]
pub struct SessionManager {
    client: ApiClient,
    tokens: TokenStore,
    state: SessionState,
}

impl SessionManager {
    /// `tokens` must be the same store the client reads its bearer token from.
    pub fn new(client: ApiClient, tokens: TokenStore) -> Self {
        Self {
            client,
            tokens,
            state: SessionState::Unknown,
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Rehydrate from the token store. No network call is made; a stale
    /// token is only discovered by the next authenticated request.
    pub fn initialize(&mut self) -> &SessionState {
        self.state = match self.tokens.load_session() {
            Some(session) => SessionState::Authenticated(session),
            None => SessionState::Anonymous,
        };
        &self.state
    }

    /// Exchange credentials for a session.
    ///
    /// On failure the manager stays in whatever state it was in.
    pub fn login(&mut self, email: &str, password: &str) -> Result<&Session, SessionError> {
        let result = self
            .client
            .login(email, password)
            .map_err(|err| SessionError::Login(FetchError::from_transport(&err, "your account")))?;

        let status = result.status;
        let message = result.message.clone();
        let data = match result.into_result() {
            Ok(data) => data,
            Err(_) => return Err(SessionError::Login(login_failure(status, message))),
        };

        let session = self.persist(data)?;
        self.state = SessionState::Authenticated(session);
        match &self.state {
            SessionState::Authenticated(session) => Ok(session),
            _ => Err(SessionError::NotAuthenticated),
        }
    }

    /// End the session.
    ///
    /// The backend call is best effort. Local credentials are cleared and
    /// the state becomes `Anonymous` even when it fails; only a failure to
    /// clear storage is an error.
    pub fn logout(&mut self) -> Result<LogoutOutcome, SessionError> {
        let outcome = if self.tokens.get_token().is_some() {
            match self.client.logout() {
                Ok(raw) if raw.status < 400 => LogoutOutcome {
                    server_acknowledged: true,
                    warning: None,
                },
                Ok(raw) => LogoutOutcome {
                    server_acknowledged: false,
                    warning: Some(
                        raw.message()
                            .unwrap_or_else(|| format!("logout returned HTTP {}", raw.status)),
                    ),
                },
                Err(err) => LogoutOutcome {
                    server_acknowledged: false,
                    warning: Some(err.to_string()),
                },
            }
        } else {
            LogoutOutcome {
                server_acknowledged: false,
                warning: None,
            }
        };

        self.state = SessionState::Anonymous;
        self.tokens
            .clear_session()
            .map_err(|e| SessionError::Storage(format!("{e:#}")))?;
        Ok(outcome)
    }

    pub fn snapshot(&self) -> Option<&Session> {
        match &self.state {
            SessionState::Authenticated(session) => Some(session),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.snapshot().is_some()
    }

    /// True until [`initialize`](Self::initialize) has run.
    pub fn is_loading(&self) -> bool {
        self.state == SessionState::Unknown
    }

    /// The session, if its role is organization admin.
    pub fn require_admin(&self) -> Result<&Session, SessionError> {
        let session = self.snapshot().ok_or(SessionError::NotAuthenticated)?;
        if session.is_admin() {
            Ok(session)
        } else {
            Err(SessionError::Forbidden {
                role: session.role.clone(),
            })
        }
    }

    fn persist(&self, data: LoginData) -> Result<Session, SessionError> {
        let permissions: BTreeSet<String> = data.permissions.unwrap_or_default().into_iter().collect();
        self.tokens
            .set_session(
                &data.token,
                &data.user,
                &data.organization,
                data.role.as_deref(),
                &permissions,
            )
            .map_err(|e| SessionError::Storage(format!("{e:#}")))?;

        Ok(Session {
            token: data.token,
            user: data.user,
            organization: data.organization,
            role: data.role,
            permissions,
        })
    }
}

/// Backend message when there is one, else "Login failed".
fn login_failure(status: u16, message: Option<String>) -> FetchError {
    let kind = ErrorKind::from_status(status);
    let detail = message.clone().unwrap_or_else(|| fallback_message(status));
    let message = message
        .filter(|m| *m != fallback_message(status))
        .unwrap_or_else(|| LOGIN_FAILED.to_string());
    FetchError::new(kind, message, detail)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
