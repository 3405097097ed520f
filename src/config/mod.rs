/// Configuration system for orgdash.
///
/// Provides a layered configuration hierarchy:
///
/// 1. **Built-in defaults**: hardcoded in [`schema::DashConfig::default()`]
/// 2. **User global config**: `~/.orgdash/config.toml`
/// 3. **Project local config**: `.orgdash.toml` in the current working directory
/// 4. **Environment variables**: `ORGDASH_*` overrides (highest precedence)
///
/// Later layers override earlier ones. Missing sections in a TOML file fall
/// back to built-in defaults.
///
/// # Usage
///
/// ```rust,ignore
/// let cfg = orgdash::config::load();
/// let client = orgdash::api::ApiClient::from_config(&cfg, tokens);
/// ```
pub mod schema;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub use schema::DashConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved configuration.
///
/// Merges all layers in order: defaults, global TOML, project TOML, env
/// vars. File layers merge per key, so a project file only overrides what
/// it sets.
pub fn load() -> DashConfig {
    let layers = [global_config_path(), project_config_path()]
        .into_iter()
        .filter_map(load_toml_layer);
    let mut config = merge_layers(layers);

    apply_env_overrides(&mut config);

    config
}

/// Read one TOML layer from the given path (if it exists).
///
/// Malformed files, including ones that do not fit the schema, are ignored
/// as a whole.
fn load_toml_layer(path: Option<PathBuf>) -> Option<toml::Table> {
    let path = path?;
    let content = fs::read_to_string(&path).ok()?;
    let table: toml::Table = toml::from_str(&content).ok()?;
    toml::Value::Table(table.clone())
        .try_into::<DashConfig>()
        .ok()?;
    Some(table)
}

/// Resolve file layers over the built-in defaults, key by key. A later
/// layer only replaces the keys it sets.
fn merge_layers(layers: impl IntoIterator<Item = toml::Table>) -> DashConfig {
    let mut merged = toml::Table::new();
    for layer in layers {
        merge_table(&mut merged, layer);
    }
    toml::Value::Table(merged).try_into().unwrap_or_default()
}

fn merge_table(base: &mut toml::Table, layer: toml::Table) {
    for (key, value) in layer {
        match value {
            toml::Value::Table(incoming) => {
                if let Some(toml::Value::Table(existing)) = base.get_mut(&key) {
                    merge_table(existing, incoming);
                } else {
                    base.insert(key, toml::Value::Table(incoming));
                }
            }
            value => {
                base.insert(key, value);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Path to the user global config: `~/.orgdash/config.toml`.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Path to the project local config: `.orgdash.toml`.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".orgdash").join("config.toml"))
}

fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".orgdash.toml"))
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `ORGDASH_API_URL`: backend base URL
/// - `ORGDASH_TIMEOUT_MS`: request timeout
/// - `ORGDASH_ENV`: `development` or `production`
/// - `ORGDASH_STORAGE_PATH`: key-value store file
/// - `ORGDASH_LOGGING`: request log on/off
/// - `ORGDASH_LOG_PATH`: request log file
fn apply_env_overrides(config: &mut DashConfig) {
    if let Ok(val) = std::env::var("ORGDASH_API_URL")
        && !val.is_empty()
    {
        config.api.base_url = val;
    }
    if let Ok(val) = std::env::var("ORGDASH_TIMEOUT_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.api.timeout_ms = ms;
    }
    if let Ok(val) = std::env::var("ORGDASH_ENV")
        && let Some(env) = parse_environment(&val)
    {
        config.general.environment = env;
    }
    if let Ok(val) = std::env::var("ORGDASH_STORAGE_PATH")
        && !val.is_empty()
    {
        config.storage.path = val;
    }
    if let Ok(val) = std::env::var("ORGDASH_LOGGING") {
        config.logging.enabled = is_truthy(&val);
    }
    if let Ok(val) = std::env::var("ORGDASH_LOG_PATH")
        && !val.is_empty()
    {
        config.logging.path = val;
    }
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn parse_environment(val: &str) -> Option<schema::Environment> {
    match val.to_ascii_lowercase().as_str() {
        "development" | "dev" => Some(schema::Environment::Development),
        "production" | "prod" => Some(schema::Environment::Production),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.orgdash/config.toml`.
///
/// Refuses to overwrite an existing file unless `force` is set.
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.orgdash/ directory")?;
    }

    fs::write(&path, DashConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Set a single dotted key (e.g. `api.base_url`) in the global config file.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;

    let content = if path.exists() {
        fs::read_to_string(&path).context("failed to read config file")?
    } else {
        toml::to_string_pretty(&DashConfig::default())
            .context("failed to serialize default config")?
    };

    let mut root: toml::Value =
        toml::from_str(&content).context("failed to parse config as TOML value")?;
    set_toml_value(&mut root, key, value)?;

    // Reject values that would make the file unloadable.
    let rendered = toml::to_string_pretty(&root).context("failed to serialize config")?;
    toml::from_str::<DashConfig>(&rendered)
        .with_context(|| format!("invalid value '{value}' for '{key}'"))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(&path, rendered).context("failed to write config file")?;

    Ok(())
}

/// Set a value in a TOML tree using a dotted key path.
///
/// The existing value's type decides how `raw_value` is parsed; unknown
/// leaves are stored as strings.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let (section_path, leaf) = match key.rsplit_once('.') {
        Some((section, leaf)) => (Some(section), leaf),
        None => (None, key),
    };
    if leaf.is_empty() {
        anyhow::bail!("empty config key");
    }

    let mut current = root;
    if let Some(section_path) = section_path {
        for part in section_path.split('.') {
            current = current
                .get_mut(part)
                .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
        }
    }

    let table = current
        .as_table_mut()
        .with_context(|| format!("expected table at '{}'", section_path.unwrap_or("")))?;

    let new_value = match table.get(leaf) {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        _ => toml::Value::String(raw_value.to_string()),
    };

    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    let config = load();
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_truthy_accepts_variants() {
        for yes in ["1", "true", "TRUE", "yes", "on"] {
            assert!(is_truthy(yes), "{yes}");
        }
        for no in ["0", "false", "no", "off", ""] {
            assert!(!is_truthy(no), "{no}");
        }
    }

    #[test]
    fn parse_environment_handles_variants() {
        assert_eq!(
            parse_environment("prod"),
            Some(schema::Environment::Production)
        );
        assert_eq!(
            parse_environment("Development"),
            Some(schema::Environment::Development)
        );
        assert_eq!(parse_environment("staging"), None);
    }

    #[test]
    fn set_toml_value_updates_string() {
        let mut root: toml::Value = toml::from_str(
            r#"
[api]
base_url = "http://127.0.0.1:8000/api/org"
"#,
        )
        .unwrap();
        set_toml_value(&mut root, "api.base_url", "https://hr.example/api/org").unwrap();
        assert_eq!(
            root["api"]["base_url"].as_str(),
            Some("https://hr.example/api/org")
        );
    }

    #[test]
    fn set_toml_value_parses_by_existing_type() {
        let mut root: toml::Value = toml::from_str(
            r#"
[api]
timeout_ms = 30000

[logging]
enabled = true
"#,
        )
        .unwrap();
        set_toml_value(&mut root, "api.timeout_ms", "500").unwrap();
        set_toml_value(&mut root, "logging.enabled", "off").unwrap();
        assert_eq!(root["api"]["timeout_ms"].as_integer(), Some(500));
        assert_eq!(root["logging"]["enabled"].as_bool(), Some(false));

        assert!(set_toml_value(&mut root, "api.timeout_ms", "soon").is_err());
    }

    #[test]
    fn set_toml_value_rejects_unknown_section() {
        let mut root: toml::Value = toml::from_str("[api]\n").unwrap();
        assert!(set_toml_value(&mut root, "nonexistent.key", "value").is_err());
    }

    fn layer(text: &str) -> toml::Table {
        toml::from_str(text).unwrap()
    }

    #[test]
    fn project_layer_keeps_global_keys_it_does_not_set() {
        let global = layer(
            r#"
[api]
base_url = "https://hr.example/api/org"
timeout_ms = 5000
"#,
        );
        let project = layer(
            r#"
[general]
environment = "production"

[api]
timeout_ms = 1000
"#,
        );

        let config = merge_layers([global, project]);
        assert_eq!(config.api.base_url, "https://hr.example/api/org");
        assert_eq!(config.api.timeout_ms, 1000);
        assert_eq!(
            config.general.environment,
            schema::Environment::Production
        );
        assert_eq!(config.logging, DashConfig::default().logging);
    }

    #[test]
    fn no_layers_means_defaults() {
        let config = merge_layers(Vec::new());
        assert_eq!(config.api.base_url, schema::DEFAULT_BASE_URL);
    }

    #[test]
    fn show_effective_config_round_trips() {
        let toml_str = show_effective_config().unwrap();
        let _: DashConfig = toml::from_str(&toml_str).unwrap();
    }
}
