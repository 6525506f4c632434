//! Guerrilla Mail wire format.
//!
//! The provider is loose with types: ids and timestamps arrive as strings
//! on some endpoints and numbers on others, and `mail_read` is `0`/`1` or
//! `"0"`/`"1"`. The `lenient_*` helpers accept every form seen in the wild.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use maila_types::inbox::InboxEntry;

/// Function names understood by the provider (`f` parameter).
pub mod function {
    pub const GET_EMAIL_ADDRESS: &str = "get_email_address";
    pub const GET_EMAIL_LIST: &str = "get_email_list";
    pub const FETCH_EMAIL: &str = "fetch_email";
    pub const DEL_EMAIL: &str = "del_email";
    pub const FORGET_ME: &str = "forget_me";
}

/// Error code the provider uses for an unknown or expired session.
pub const AUTH_SESSION_NOT_INITIALIZED: &str = "auth-session-not-initialized";

/// Response to `get_email_address`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressResponse {
    #[serde(default)]
    pub email_addr: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_i64")]
    pub email_timestamp: Option<i64>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub alias: Option<String>,
    #[serde(default)]
    pub sid_token: Option<String>,
}

/// Response to `get_email_list`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListResponse {
    #[serde(default)]
    pub list: Vec<WireMail>,
}

/// One message header in a list response.
#[derive(Debug, Clone, Deserialize)]
pub struct WireMail {
    #[serde(deserialize_with = "lenient_string")]
    pub mail_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub mail_from: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub mail_subject: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub mail_excerpt: String,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub mail_timestamp: i64,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub mail_read: bool,
}

impl From<WireMail> for InboxEntry {
    fn from(wire: WireMail) -> Self {
        Self {
            mail_id: wire.mail_id,
            from: wire.mail_from,
            subject: wire.mail_subject,
            excerpt: wire.mail_excerpt,
            timestamp: wire.mail_timestamp,
            read: wire.mail_read,
        }
    }
}

/// Response to `fetch_email`.
#[derive(Debug, Clone, Deserialize)]
pub struct FetchResponse {
    #[serde(default, deserialize_with = "lenient_string")]
    pub mail_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub mail_from: String,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub mail_subject: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub mail_body: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub mail_timestamp: i64,
}

/// Response to `del_email`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeleteResponse {
    #[serde(default, deserialize_with = "lenient_string_vec")]
    pub deleted_ids: Vec<String>,
}

/// Whether a payload carries the "session not initialized" auth marker.
pub fn has_auth_error(payload: &Value) -> bool {
    payload
        .get("auth")
        .and_then(|auth| auth.get("error_codes"))
        .and_then(Value::as_array)
        .is_some_and(|codes| {
            codes
                .iter()
                .any(|c| c.as_str() == Some(AUTH_SESSION_NOT_INITIALIZED))
        })
}

/// A token rotated by the provider, if the payload carries one.
///
/// Tokens end up in download paths, so anything other than lowercase
/// ASCII alphanumerics is ignored.
pub fn rotated_sid(payload: &Value) -> Option<&str> {
    payload
        .get("sid_token")
        .and_then(Value::as_str)
        .filter(|s| {
            !s.is_empty()
                && s.bytes()
                    .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
        })
}

// ── Lenient field decoders ───────────────────────────────────────────────

fn value_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn value_to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    Ok(value_to_string(Value::deserialize(de)?).unwrap_or_default())
}

fn lenient_opt_string<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
    Ok(value_to_string(Value::deserialize(de)?))
}

fn lenient_string_vec<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<String>, D::Error> {
    match Value::deserialize(de)? {
        Value::Array(items) => Ok(items.into_iter().filter_map(value_to_string).collect()),
        Value::Null => Ok(Vec::new()),
        other => Ok(value_to_string(other).into_iter().collect()),
    }
}

fn lenient_i64<'de, D: Deserializer<'de>>(de: D) -> Result<i64, D::Error> {
    Ok(value_to_i64(&Value::deserialize(de)?).unwrap_or(0))
}

fn lenient_opt_i64<'de, D: Deserializer<'de>>(de: D) -> Result<Option<i64>, D::Error> {
    Ok(value_to_i64(&Value::deserialize(de)?))
}

fn lenient_bool<'de, D: Deserializer<'de>>(de: D) -> Result<bool, D::Error> {
    Ok(match Value::deserialize(de)? {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_i64().unwrap_or(0) != 0,
        Value::String(s) => matches!(s.trim(), "1" | "true"),
        _ => false,
    })
}
