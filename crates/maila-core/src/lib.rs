//! Dialogue engine for maila.
//!
//! The engine is a stack of task states driven one turn at a time:
//!
//! - [`stack::DialogueStack`] tracks where the conversation is, with
//!   per-state prompts for `repeat`.
//! - [`commands`] implements the universal navigation commands.
//! - [`classifier`] maps text to an intent and sub-intent.
//! - [`email::EmailTaskStateMachine`] runs the disposable-inbox task on top
//!   of [`maila_mail::MailSessionClient`].
//! - [`identity`] and [`discoverability`] handle names and help.
//! - [`orchestrator::Orchestrator`] owns one conversation and routes each
//!   turn.

pub mod classifier;
pub mod commands;
pub mod discoverability;
pub mod email;
pub mod identity;
pub mod orchestrator;
pub mod phrasebook;
pub mod replies;
pub mod stack;
pub mod text;

pub use classifier::{Classification, Intent, IntentClassifier, KeywordClassifier, SubIntent};
pub use email::{EmailReply, EmailTaskStateMachine, EmailTurn, SessionUpdate, SideEffect};
pub use orchestrator::{Orchestrator, TurnOutput};
pub use stack::DialogueStack;
