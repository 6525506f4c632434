//! Configuration file discovery and loading.
//!
//! The discovery order is:
//! 1. `MAILA_CONFIG` environment variable (absolute path).
//! 2. `~/.maila/config.json`
//! 3. If none found, an empty JSON object (`{}`), i.e. all defaults.
//!
//! JSON keys are normalized from camelCase to snake_case before the value
//! is deserialized into [`Config`].

use std::path::{Path, PathBuf};

use maila_types::config::Config;
use serde_json::Value;

use crate::env::Environment;
use crate::fs::FileSystem;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "MAILA_CONFIG";

/// Error type returned by the loader.
pub type LoadError = Box<dyn std::error::Error + Send + Sync>;

/// Discover the config file path.
///
/// Returns `None` if no candidate exists. An explicit `MAILA_CONFIG` is
/// returned as-is so a typo surfaces as a warning at load time instead of
/// being silently skipped.
pub fn discover_config_path(env: &dyn Environment, home_dir: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(env_path) = env.get_var(CONFIG_ENV_VAR) {
        return Some(PathBuf::from(env_path));
    }

    let path = home_dir?.join(".maila").join("config.json");
    path.exists().then_some(path)
}

/// Load raw JSON configuration using the discovery algorithm.
///
/// If no config file is found, returns an empty JSON object.
pub async fn load_config_raw(
    fs: &dyn FileSystem,
    env: &dyn Environment,
) -> Result<Value, LoadError> {
    let Some(path) = discover_config_path(env, fs.home_dir()) else {
        tracing::info!("no config file found, using defaults");
        return Ok(Value::Object(serde_json::Map::new()));
    };

    if !fs.exists(&path).await {
        tracing::warn!(
            path = %path.display(),
            "config path does not exist, using defaults"
        );
        return Ok(Value::Object(serde_json::Map::new()));
    }

    read_config_file(fs, &path).await
}

/// Read, parse and normalize one config file.
pub async fn read_config_file(fs: &dyn FileSystem, path: &Path) -> Result<Value, LoadError> {
    tracing::debug!(path = %path.display(), "loading config file");
    let contents = fs
        .read_to_string(path)
        .await
        .map_err(|e| format!("failed to read config file {}: {}", path.display(), e))?;

    let value: Value = serde_json::from_str(&contents)
        .map_err(|e| format!("failed to parse config file {}: {}", path.display(), e))?;

    Ok(normalize_keys(value))
}

/// Load and validate the typed configuration.
///
/// `override_path` (from `--config`) bypasses discovery and must exist.
pub async fn load_config(
    fs: &dyn FileSystem,
    env: &dyn Environment,
    override_path: Option<&Path>,
) -> Result<Config, LoadError> {
    let raw = match override_path {
        Some(path) => {
            if !fs.exists(path).await {
                return Err(format!("config file not found: {}", path.display()).into());
            }
            read_config_file(fs, path).await?
        }
        None => load_config_raw(fs, env).await?,
    };

    let config: Config = serde_json::from_value(raw)?;
    config.validate()?;
    Ok(config)
}

/// Convert camelCase JSON keys to snake_case recursively.
pub fn normalize_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, val)| (camel_to_snake(&key), normalize_keys(val)))
                .collect(),
        ),
        Value::Array(arr) => Value::Array(arr.into_iter().map(normalize_keys).collect()),
        other => other,
    }
}

/// Convert a single camelCase string to snake_case.
///
/// A run of uppercase letters (an acronym) is kept together.
///
/// ```
/// # use maila_platform::config_loader::camel_to_snake;
/// assert_eq!(camel_to_snake("timeoutSecs"), "timeout_secs");
/// assert_eq!(camel_to_snake("already_snake"), "already_snake");
/// assert_eq!(camel_to_snake("apiURL"), "api_url");
/// ```
pub fn camel_to_snake(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut result = String::with_capacity(name.len() + 4);

    for (i, &ch) in chars.iter().enumerate() {
        if ch.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next = chars.get(i + 1).copied();
            if prev.is_lowercase()
                || (prev.is_uppercase() && next.is_some_and(|c| c.is_lowercase()))
            {
                result.push('_');
            }
        }
        result.push(ch.to_ascii_lowercase());
    }
    result
}
