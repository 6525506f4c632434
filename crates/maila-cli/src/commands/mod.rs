//! CLI command implementations for `maila`.
//!
//! - [`chat`] -- Interactive conversation or single-message mode.
//! - [`config_cmd`] -- Resolved configuration display.

pub mod chat;
pub mod config_cmd;

use std::path::Path;

use maila_platform::Platform;
use maila_types::config::Config;

/// Load configuration from the given path override or via auto-discovery.
///
/// Without an override the platform discovery chain applies:
/// 1. `MAILA_CONFIG` env var
/// 2. `~/.maila/config.json`
///
/// Returns a default `Config` if no config file is found. An explicit
/// override that does not exist is an error.
pub async fn load_config<P: Platform>(
    platform: &P,
    config_override: Option<&str>,
) -> anyhow::Result<Config> {
    let override_path = config_override.map(Path::new);
    if let Some(path) = override_path
        && !platform.fs().exists(path).await
    {
        anyhow::bail!("config file not found: {}", path.display());
    }

    maila_platform::config_loader::load_config(platform.fs(), platform.env(), override_path)
        .await
        .map_err(|e| anyhow::anyhow!("failed to load config: {e}"))
}
