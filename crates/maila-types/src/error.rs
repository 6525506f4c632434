//! Error types for the maila workspace.
//!
//! Provides [`MailaError`] as the top-level error type. It is
//! non-exhaustive to allow future extension without breaking downstream.

use thiserror::Error;

/// Top-level error type for maila.
///
/// Mail-protocol failures have their own taxonomy in `maila-mail`; this
/// type covers configuration and state-tag parsing.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum MailaError {
    /// Configuration is malformed or semantically invalid.
    #[error("invalid config: {reason}")]
    ConfigInvalid {
        /// What is wrong with the configuration.
        reason: String,
    },

    /// A task state tag did not name a known state.
    #[error("unknown task state: {0}")]
    UnknownState(String),
}

/// A convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MailaError>;
