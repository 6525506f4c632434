//! Mail client error types.
//!
//! Every operation returns [`Result<T>`] with [`MailError`]. Callers that
//! only need to decide how to talk to the user use [`MailError::class`],
//! which folds the variants into four [`FailureKind`]s.

use thiserror::Error;

/// Errors that can occur while talking to the disposable mail provider.
#[derive(Error, Debug)]
pub enum MailError {
    /// The provider could not be reached (DNS, connect, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// The provider answered, but not with something usable
    /// (non-2xx status, undecodable body, missing fields).
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The provider does not recognize the session token.
    #[error("session {sid_token} is invalid or has expired")]
    SessionNotInitialized {
        /// The rejected token.
        sid_token: String,
    },

    /// An operation needed a session token but none was available.
    #[error("no active session")]
    NoSession,

    /// The user asked for something that cannot exist (bad index etc).
    #[error("{0}")]
    Validation(String),

    /// Local filesystem failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON payload could not be decoded into the expected shape.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for MailError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            Self::Transport(err.to_string())
        } else {
            Self::Protocol(err.to_string())
        }
    }
}

/// How a failure should be reported to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Network unreachable or timed out.
    Transport,
    /// The remote answered badly.
    RemoteProtocol,
    /// The user's input did not name a valid message.
    Validation,
    /// Anything else.
    Unexpected,
}

impl MailError {
    /// Fold this error into the user-facing failure class.
    pub fn class(&self) -> FailureKind {
        match self {
            Self::Transport(_) => FailureKind::Transport,
            Self::Protocol(_) | Self::Json(_) => FailureKind::RemoteProtocol,
            Self::Validation(_) => FailureKind::Validation,
            Self::SessionNotInitialized { .. } | Self::NoSession | Self::Io(_) => {
                FailureKind::Unexpected
            }
        }
    }
}

/// A convenience type alias for mail operations.
pub type Result<T> = std::result::Result<T, MailError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_session_not_initialized() {
        let err = MailError::SessionNotInitialized {
            sid_token: "abc".into(),
        };
        assert_eq!(err.to_string(), "session abc is invalid or has expired");
    }

    #[test]
    fn display_validation_is_bare() {
        let err = MailError::Validation("No valid email indices provided.".into());
        assert_eq!(err.to_string(), "No valid email indices provided.");
    }

    #[test]
    fn classes() {
        assert_eq!(
            MailError::Transport("dns".into()).class(),
            FailureKind::Transport
        );
        assert_eq!(
            MailError::Protocol("HTTP 500".into()).class(),
            FailureKind::RemoteProtocol
        );
        assert_eq!(
            MailError::Validation("bad".into()).class(),
            FailureKind::Validation
        );
        assert_eq!(MailError::NoSession.class(), FailureKind::Unexpected);
        let io = std::io::Error::other("disk full");
        assert_eq!(MailError::from(io).class(), FailureKind::Unexpected);
    }

    #[test]
    fn json_error_is_protocol_class() {
        let json_err = serde_json::from_str::<serde_json::Value>("<html>").unwrap_err();
        let err: MailError = json_err.into();
        assert_eq!(err.class(), FailureKind::RemoteProtocol);
    }
}
