/// Configuration schema and defaults for orgdash.
///
/// Defines the TOML-serializable configuration structure with the sections
/// `[general]`, `[api]`, `[storage]` and `[logging]`. Every field has a
/// built-in default, so users only set what they want to override.
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default backend base URL (organization API namespace).
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api/org";

/// Default request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level orgdash configuration.
///
/// Maps directly to `~/.orgdash/config.toml` and `.orgdash.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashConfig {
    pub general: GeneralConfig,
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [general]
// ---------------------------------------------------------------------------

/// Deployment context. Controls whether raw error details are shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub environment: Environment,
    /// Default output format for view commands: `table` or `json`.
    pub format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            format: "table".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// [api]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL every endpoint path is appended to.
    pub base_url: String,
    /// Per-request timeout in milliseconds. `0` disables the timeout.
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

// ---------------------------------------------------------------------------
// [storage]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path of the key-value store file. `~` expands to the home directory.
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: "~/.orgdash/storage.json".to_string(),
        }
    }
}

impl StorageConfig {
    pub fn resolved_path(&self) -> Option<PathBuf> {
        expand_home(&self.path)
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Whether gateway requests are appended to the request log.
    pub enabled: bool,
    /// Path to the JSONL request log. `~` expands to the home directory.
    pub path: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "~/.orgdash/requests.jsonl".to_string(),
        }
    }
}

impl LoggingConfig {
    /// The log path when logging is enabled, `None` otherwise.
    pub fn active_path(&self) -> Option<PathBuf> {
        if !self.enabled {
            return None;
        }
        expand_home(&self.path)
    }
}

/// Expand a leading `~/` to the home directory.
pub fn expand_home(path: &str) -> Option<PathBuf> {
    if path.is_empty() {
        return None;
    }
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir().map(|home| home.join(rest)),
        None if path == "~" => dirs::home_dir(),
        None => Some(PathBuf::from(path)),
    }
}

impl DashConfig {
    /// Annotated default config written by `orgdash config init`.
    pub fn default_toml() -> String {
        format!(
            r#"# orgdash Configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (ORGDASH_*)
#   2. Project config (.orgdash.toml in current directory)
#   3. User global config (~/.orgdash/config.toml)
#   4. Built-in defaults

[general]
environment = "development"   # development | production (hides raw error details)
format = "table"              # table | json

[api]
base_url = "{DEFAULT_BASE_URL}"
timeout_ms = {DEFAULT_TIMEOUT_MS}            # 0 disables the timeout

[storage]
path = "~/.orgdash/storage.json"

[logging]
enabled = true
path = "~/.orgdash/requests.jsonl"
"#
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
