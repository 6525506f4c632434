//! Disposable mail client for maila.
//!
//! # Architecture
//!
//! - [`MailTransport`] performs single calls against the provider endpoint;
//!   [`GuerrillaTransport`] implements it over HTTP with reqwest.
//! - [`MailSessionClient`] owns the session policy: create, restore and
//!   resume sessions, merge inbox pages, resolve index expressions to mail
//!   ids, delete, download and forget.
//! - [`MailError`] carries every failure; [`MailError::class`] folds it into
//!   a [`FailureKind`] for user-facing replies.
//!
//! With the `test-util` feature, [`scripted::ScriptedTransport`] replays
//! queued payloads without a network.

pub mod client;
pub mod error;
pub mod protocol;
#[cfg(any(test, feature = "test-util"))]
pub mod scripted;
pub mod transport;

pub use client::{DownloadReport, EmailMessage, MailSessionClient, download_file_name};
pub use error::{FailureKind, MailError, Result};
pub use transport::{ApiRequest, GuerrillaTransport, HttpMethod, MailTransport};
