//! # maila-types
//!
//! Core type definitions for the maila disposable-inbox assistant.
//!
//! This crate is the foundation of the dependency graph -- all other
//! maila crates depend on it. It contains:
//!
//! - **[`error`]** -- [`MailaError`] top-level error type
//! - **[`config`]** -- Configuration schema
//! - **[`task`]** -- Dialogue task states and the groups they belong to
//! - **[`inbox`]** -- Cached inbox entries and the merge/sort policy
//! - **[`index`]** -- Resolution of user-typed index expressions to mail ids
//! - **[`session`]** -- The disposable mail session value

pub mod config;
pub mod error;
pub mod inbox;
pub mod index;
pub mod session;
pub mod task;

pub use error::{MailaError, Result};
pub use inbox::{Inbox, InboxEntry};
pub use session::MailSession;
pub use task::{EmailStateKind, TaskGroup, TaskState};
