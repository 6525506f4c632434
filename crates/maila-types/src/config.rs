//! Configuration schema types.
//!
//! All structs accept both `snake_case` and `camelCase` field names in JSON
//! via `#[serde(alias)]`, and every field has a default so an empty object
//! (or no config file at all) yields a working setup. Unknown fields are
//! silently ignored for forward compatibility.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{MailaError, Result};

// ── Root config ──────────────────────────────────────────────────────────

/// Root configuration for maila.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Remote mail provider settings.
    #[serde(default)]
    pub mail: MailConfig,

    /// Conversation behaviour.
    #[serde(default)]
    pub dialogue: DialogueConfig,
}

impl Config {
    /// Reject values that parse but cannot work.
    pub fn validate(&self) -> Result<()> {
        if self.mail.timeout_secs == 0 {
            return Err(MailaError::ConfigInvalid {
                reason: "mail.timeout_secs must be greater than zero".into(),
            });
        }
        if self.mail.api_url.trim().is_empty() {
            return Err(MailaError::ConfigInvalid {
                reason: "mail.api_url must not be empty".into(),
            });
        }
        if !(0.0..=1.0).contains(&self.dialogue.intent_threshold) {
            return Err(MailaError::ConfigInvalid {
                reason: format!(
                    "dialogue.intent_threshold must be within [0, 1], got {}",
                    self.dialogue.intent_threshold
                ),
            });
        }
        Ok(())
    }
}

// ── Mail ─────────────────────────────────────────────────────────────────

/// Disposable-mail provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// Single endpoint of the mail provider API.
    #[serde(default = "default_api_url", alias = "apiUrl")]
    pub api_url: String,

    /// Language parameter sent with session requests.
    #[serde(default = "default_lang")]
    pub lang: String,

    /// Connect + read timeout per remote call, in seconds.
    #[serde(default = "default_timeout_secs", alias = "timeoutSecs")]
    pub timeout_secs: u64,

    /// Root directory for downloaded messages. `~/` is expanded.
    #[serde(default = "default_downloads_dir", alias = "downloadsDir")]
    pub downloads_dir: String,
}

fn default_api_url() -> String {
    "https://api.guerrillamail.com/ajax.php".into()
}
fn default_lang() -> String {
    "en".into()
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_downloads_dir() -> String {
    "downloads".into()
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            lang: default_lang(),
            timeout_secs: default_timeout_secs(),
            downloads_dir: default_downloads_dir(),
        }
    }
}

impl MailConfig {
    /// Get the expanded downloads path.
    pub fn downloads_path(&self) -> PathBuf {
        let raw = &self.downloads_dir;
        #[cfg(feature = "native")]
        if let Some(rest) = raw.strip_prefix("~/")
            && let Some(home) = dirs::home_dir()
        {
            return home.join(rest);
        }
        PathBuf::from(raw)
    }
}

// ── Dialogue ─────────────────────────────────────────────────────────────

/// Conversation behaviour settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueConfig {
    /// Minimum classifier score for an intent to be accepted.
    #[serde(default = "default_intent_threshold", alias = "intentThreshold")]
    pub intent_threshold: f32,

    /// Pick a random phrasing per reply instead of always the first one.
    #[serde(default = "default_randomize", alias = "randomizePhrasing")]
    pub randomize_phrasing: bool,

    /// Name the assistant introduces itself with.
    #[serde(default = "default_bot_name", alias = "botName")]
    pub bot_name: String,
}

fn default_intent_threshold() -> f32 {
    0.2
}
fn default_randomize() -> bool {
    true
}
fn default_bot_name() -> String {
    "Maila".into()
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            intent_threshold: default_intent_threshold(),
            randomize_phrasing: default_randomize(),
            bot_name: default_bot_name(),
        }
    }
}
