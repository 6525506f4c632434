//! Disposable mail session value.
//!
//! A [`MailSession`] is the only state that survives between email turns:
//! the credential, the address, and the inbox as the user last saw it.
//! It is owned by the conversation and replaced wholesale whenever a
//! session is created, restored, refreshed, or ended.

use serde::{Deserialize, Serialize};

use crate::inbox::Inbox;

/// Length of a remote session token.
pub const SID_TOKEN_LEN: usize = 26;

/// An active disposable mail session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MailSession {
    /// Opaque credential identifying the mailbox to the remote.
    pub sid_token: String,

    /// The disposable address.
    pub address: String,

    /// When the remote created (or last extended) the address.
    #[serde(default)]
    pub email_timestamp: Option<i64>,

    /// Scrambled alias of the address, if the remote provides one.
    #[serde(default)]
    pub alias: Option<String>,

    /// Inbox as last listed to the user.
    #[serde(default)]
    pub inbox: Inbox,
}

impl MailSession {
    pub fn new(sid_token: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            sid_token: sid_token.into(),
            address: address.into(),
            email_timestamp: None,
            alias: None,
            inbox: Inbox::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbox::InboxEntry;

    #[test]
    fn new_session_has_empty_inbox() {
        let s = MailSession::new("abcdefghijklmnopqrstuvwxyz", "x@sharklasers.com");
        assert_eq!(s.sid_token.len(), SID_TOKEN_LEN);
        assert!(s.inbox.is_empty());
        assert!(s.alias.is_none());
    }

    #[test]
    fn serde_roundtrip_keeps_inbox() {
        let mut s = MailSession::new("tok", "x@example.com");
        s.inbox.merge(vec![InboxEntry::new("1", "a@b.c", "hi", 10)]);
        let json = serde_json::to_string(&s).unwrap();
        let restored: MailSession = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, s);
    }

    #[test]
    fn deserialize_minimal() {
        let json = r#"{"sid_token": "tok", "address": "x@example.com"}"#;
        let s: MailSession = serde_json::from_str(json).unwrap();
        assert!(s.inbox.is_empty());
        assert!(s.email_timestamp.is_none());
    }
}
