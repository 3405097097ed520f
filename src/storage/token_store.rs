/// Bearer token and cached session fields on top of a [`KeyValueStore`].
///
/// The token store is the only writer of the session keys. The API client
/// holds a clone of the same handle and only ever calls [`TokenStore::get_token`].
use std::collections::BTreeSet;

use anyhow::{Context, Result};

use super::{Change, SharedStore};
use crate::session::model::{Organization, Session, User};

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";
pub const ORGANIZATION_KEY: &str = "organization";
pub const ROLE_KEY: &str = "role";
pub const PERMISSIONS_KEY: &str = "permissions";
/// Display preference; lives next to the session but is not part of it.
pub const THEME_KEY: &str = "theme";

const SESSION_KEYS: [&str; 5] = [TOKEN_KEY, USER_KEY, ORGANIZATION_KEY, ROLE_KEY, PERMISSIONS_KEY];

/// Cheap, cloneable handle over the shared key-value store.
#[derive(Clone)]
pub struct TokenStore {
    store: SharedStore,
}

impl TokenStore {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// The persisted bearer token, if any. Never fails.
    pub fn get_token(&self) -> Option<String> {
        self.store.get(TOKEN_KEY).filter(|t| !t.is_empty())
    }

    /// Persist a freshly exchanged session in a single batch write.
    pub fn set_session(
        &self,
        token: &str,
        user: &User,
        organization: &Organization,
        role: Option<&str>,
        permissions: &BTreeSet<String>,
    ) -> Result<()> {
        let user = serde_json::to_string(user).context("failed to serialize user")?;
        let organization =
            serde_json::to_string(organization).context("failed to serialize organization")?;
        let permissions =
            serde_json::to_string(permissions).context("failed to serialize permissions")?;

        let batch: Vec<Change> = vec![
            (TOKEN_KEY.to_string(), Some(token.to_string())),
            (USER_KEY.to_string(), Some(user)),
            (ORGANIZATION_KEY.to_string(), Some(organization)),
            (ROLE_KEY.to_string(), role.map(str::to_string)),
            (PERMISSIONS_KEY.to_string(), Some(permissions)),
        ];
        self.store.write_batch(batch)
    }

    /// Remove every session key. Idempotent; the theme key is left alone.
    pub fn clear_session(&self) -> Result<()> {
        let batch = SESSION_KEYS
            .iter()
            .map(|key| (key.to_string(), None))
            .collect();
        self.store.write_batch(batch)
    }

    /// Rebuild the cached session.
    ///
    /// Returns `None` unless the token, user and organization are all
    /// present and parseable. A missing or malformed permission list reads
    /// as empty.
    pub fn load_session(&self) -> Option<Session> {
        let token = self.get_token()?;
        let user: User = serde_json::from_str(&self.store.get(USER_KEY)?).ok()?;
        let organization: Organization =
            serde_json::from_str(&self.store.get(ORGANIZATION_KEY)?).ok()?;
        let role = self.store.get(ROLE_KEY);
        let permissions = self
            .store
            .get(PERMISSIONS_KEY)
            .and_then(|raw| serde_json::from_str::<BTreeSet<String>>(&raw).ok())
            .unwrap_or_default();

        Some(Session {
            token,
            user,
            organization,
            role,
            permissions,
        })
    }

    pub fn theme(&self) -> Option<String> {
        self.store.get(THEME_KEY)
    }

    pub fn set_theme(&self, theme: &str) -> Result<()> {
        self.store.set(THEME_KEY, theme)
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore")
            .field("has_token", &self.get_token().is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
