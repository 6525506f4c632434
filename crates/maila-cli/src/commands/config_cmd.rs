//! `maila config` -- display resolved configuration.
//!
//! # Examples
//!
//! ```text
//! maila config show
//! maila config show -c ./maila.json
//! ```

use maila_types::config::Config;

/// Resolved configuration as pretty-printed JSON.
pub fn config_json(config: &Config) -> anyhow::Result<String> {
    serde_json::to_string_pretty(config)
        .map_err(|e| anyhow::anyhow!("failed to serialize config: {e}"))
}

/// Print the resolved configuration.
pub fn config_show(config: &Config) -> anyhow::Result<()> {
    println!("{}", config_json(config)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes_both_sections() {
        let json = config_json(&Config::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value.get("mail").is_some());
        assert_eq!(value["dialogue"]["bot_name"], "Maila");
    }

    #[test]
    fn config_show_does_not_panic() {
        config_show(&Config::default()).unwrap();
    }
}
