//! Dialogue task states.
//!
//! A [`TaskState`] identifies a point in the conversation. Every state
//! except [`TaskState::Normal`] belongs to exactly one [`TaskGroup`]; the
//! group decides which states are cancelled together as a unit.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MailaError;

/// A set of task states that are cancelled together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskGroup {
    /// Name set/change confirmation flow.
    Identity,
    /// Help and capabilities sub-dialogue.
    Discoverability,
    /// Disposable inbox management.
    Email,
}

impl TaskGroup {
    /// Short label used in user-facing cancellation messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Discoverability => "help",
            Self::Email => "email",
        }
    }
}

/// UI hint for email states. Not used for grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmailStateKind {
    /// The long-lived management loop.
    Loop,
    /// A state collecting one missing piece of input.
    Awaiting,
}

/// A point in the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    /// Stack floor; belongs to no group.
    Normal,
    AwaitingName,
    AwaitingNameConfirm,
    GeneralHelpLoop,
    CapabilitiesHelp,
    EmailManageLoop,
    AwaitingSessionStartConfirm,
    AwaitingSessionRestoreConfirm,
    AwaitingSessionRestore,
    AwaitingSessionEndConfirm,
    AwaitingViewIndex,
    AwaitingDeleteIndex,
    AwaitingDownloadIndex,
    AwaitingDeleteAllConfirm,
}

impl TaskState {
    /// Every state, in declaration order.
    pub const ALL: [TaskState; 14] = [
        Self::Normal,
        Self::AwaitingName,
        Self::AwaitingNameConfirm,
        Self::GeneralHelpLoop,
        Self::CapabilitiesHelp,
        Self::EmailManageLoop,
        Self::AwaitingSessionStartConfirm,
        Self::AwaitingSessionRestoreConfirm,
        Self::AwaitingSessionRestore,
        Self::AwaitingSessionEndConfirm,
        Self::AwaitingViewIndex,
        Self::AwaitingDeleteIndex,
        Self::AwaitingDownloadIndex,
        Self::AwaitingDeleteAllConfirm,
    ];

    /// The stable string tag for this state.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::AwaitingName => "awaiting_name",
            Self::AwaitingNameConfirm => "awaiting_name_confirm",
            Self::GeneralHelpLoop => "general_help_loop",
            Self::CapabilitiesHelp => "capabilities_help",
            Self::EmailManageLoop => "email_manage_loop",
            Self::AwaitingSessionStartConfirm => "awaiting_session_start_confirm",
            Self::AwaitingSessionRestoreConfirm => "awaiting_session_restore_confirm",
            Self::AwaitingSessionRestore => "awaiting_session_restore",
            Self::AwaitingSessionEndConfirm => "awaiting_session_end_confirm",
            Self::AwaitingViewIndex => "awaiting_view_index",
            Self::AwaitingDeleteIndex => "awaiting_delete_index",
            Self::AwaitingDownloadIndex => "awaiting_download_index",
            Self::AwaitingDeleteAllConfirm => "awaiting_delete_all_confirm",
        }
    }

    /// The group this state is cancelled with, or `None` for `normal`.
    pub fn group(&self) -> Option<TaskGroup> {
        match self {
            Self::Normal => None,
            Self::AwaitingName | Self::AwaitingNameConfirm => Some(TaskGroup::Identity),
            Self::GeneralHelpLoop | Self::CapabilitiesHelp => Some(TaskGroup::Discoverability),
            Self::EmailManageLoop
            | Self::AwaitingSessionStartConfirm
            | Self::AwaitingSessionRestoreConfirm
            | Self::AwaitingSessionRestore
            | Self::AwaitingSessionEndConfirm
            | Self::AwaitingViewIndex
            | Self::AwaitingDeleteIndex
            | Self::AwaitingDownloadIndex
            | Self::AwaitingDeleteAllConfirm => Some(TaskGroup::Email),
        }
    }

    /// Loop/awaiting split for email states.
    pub fn email_kind(&self) -> Option<EmailStateKind> {
        match self {
            Self::EmailManageLoop => Some(EmailStateKind::Loop),
            s if s.group() == Some(TaskGroup::Email) => Some(EmailStateKind::Awaiting),
            _ => None,
        }
    }

    /// Whether this state belongs to `group`.
    pub fn in_group(&self, group: TaskGroup) -> bool {
        self.group() == Some(group)
    }

    pub fn is_normal(&self) -> bool {
        matches!(self, Self::Normal)
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskState {
    type Err = MailaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| MailaError::UnknownState(s.to_string()))
    }
}
