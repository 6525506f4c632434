//! Universal navigation commands.
//!
//! Five commands work in every state and are checked before any intent
//! classification: `cancel`, `go back`, `where am i`, `repeat` and
//! `what now`. Matching is exact after trimming and lowercasing, so
//! "cancel my session" is *not* a command.

use maila_types::task::TaskState;

use crate::stack::DialogueStack;

/// A recognized universal command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniversalCommand {
    Cancel,
    GoBack,
    WhereAmI,
    Repeat,
    WhatNow,
}

impl UniversalCommand {
    /// Recognize a command, if the whole input is one.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "cancel" => Some(Self::Cancel),
            "go back" => Some(Self::GoBack),
            "where am i" | "where am i?" => Some(Self::WhereAmI),
            "repeat" => Some(Self::Repeat),
            "what now" | "what now?" => Some(Self::WhatNow),
            _ => None,
        }
    }

    /// Execute against the stack and produce the reply.
    pub fn execute(self, stack: &mut DialogueStack) -> String {
        match self {
            Self::Cancel => cancel(stack),
            Self::GoBack => {
                if stack.pop_one() {
                    format!(
                        "Okay, I've gone back one step. We are now in the '{}' state.",
                        stack.top()
                    )
                } else {
                    "There's nothing to go back to.".to_string()
                }
            }
            Self::WhereAmI => format!("The chatbot is currently in the '{}' state.", stack.top()),
            Self::Repeat => repeat(stack),
            Self::WhatNow => what_now(stack.top()),
        }
    }
}

/// Intercept a universal command. Returns the reply if `input` was one.
pub fn intercept(input: &str, stack: &mut DialogueStack) -> Option<String> {
    let command = UniversalCommand::parse(input)?;
    tracing::debug!(?command, state = %stack.top(), "universal command");
    Some(command.execute(stack))
}

fn cancel(stack: &mut DialogueStack) -> String {
    let outcome = stack.pop_to_normal();
    match (outcome.exited_group, outcome.popped) {
        (Some(group), _) => format!(
            "I've cancelled the {} task. We are now in the '{}' state.",
            group.label(),
            stack.top()
        ),
        (None, true) => format!(
            "I've cancelled the ongoing task. We are now in the '{}' state. What now?",
            stack.top()
        ),
        (None, false) => "There is no ongoing task to cancel.".to_string(),
    }
}

fn repeat(stack: &DialogueStack) -> String {
    let top = stack.top();
    if top.is_normal() {
        return "There's no active task to repeat. How can I help?".to_string();
    }
    match stack.prompt_for(top) {
        Some(prompt) => prompt.to_string(),
        None => format!(
            "I'm in the '{top}' state, but I don't have a specific prompt to repeat. What would you like to do?"
        ),
    }
}

const NAVIGATION_HINT: &str =
    " You can also say 'cancel' to exit this task or 'go back' to the previous step.";

/// Static hint describing what the user can do in `state`.
///
/// Hints for open tasks always mention how to leave them.
pub fn what_now(state: TaskState) -> String {
    let hint = match state {
        TaskState::Normal => {
            "You can chat with me, ask a question, ask for help, or manage your temporary email (e.g., 'start a new session')."
        }
        TaskState::AwaitingNameConfirm => {
            "You can say 'yes' to confirm setting your name, or 'no' to cancel."
        }
        TaskState::AwaitingName => {
            "You can type in the name you'd like me to call you, or say 'cancel'."
        }
        TaskState::GeneralHelpLoop => {
            "You can ask about 'commands', 'identification', or 'capabilities'. You can also say 'no' to exit help."
        }
        TaskState::CapabilitiesHelp => {
            "You can ask for more info on 'small talk', 'Q&A', 'identification', or 'email'. You can also say 'no' to exit."
        }
        TaskState::EmailManageLoop => {
            "You are in your email session. You can say 'list emails', 'view [number]', 'delete [number]', 'download [number]', or 'end session'."
        }
        TaskState::AwaitingSessionStartConfirm => {
            "You can say 'yes' to create a new temporary email session, or 'no' to decline."
        }
        TaskState::AwaitingSessionRestoreConfirm => {
            "You can say 'yes' to try again, 'no' to cancel, or just enter your session ID."
        }
        TaskState::AwaitingSessionRestore => {
            "You can type or paste your 26-character session ID, or say 'cancel'."
        }
        TaskState::AwaitingSessionEndConfirm => {
            "You can say 'yes' to permanently end your session, or 'no' to keep it active."
        }
        TaskState::AwaitingViewIndex => {
            "You can enter the number (index) of the email you want to read, or say 'cancel'."
        }
        TaskState::AwaitingDeleteIndex => {
            "You can enter the email number(s) to delete (e.g., '1', '1, 3', '2-5', or 'all'), or say 'cancel'."
        }
        TaskState::AwaitingDownloadIndex => {
            "You can enter the email number(s) to download (e.g., '1', '1, 3', '2-5', or 'all'), or say 'cancel'."
        }
        TaskState::AwaitingDeleteAllConfirm => {
            "You must say 'yes' to confirm deleting ALL emails, or 'no' to cancel. This cannot be undone."
        }
    };
    let mut hint = hint.to_string();
    if state.group().is_some() && !hint.contains("'cancel'") {
        hint.push_str(NAVIGATION_HINT);
    }
    hint
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack_of(states: &[TaskState]) -> DialogueStack {
        let mut stack = DialogueStack::new();
        for s in states {
            stack.push(*s, Some(format!("prompt for {s}")));
        }
        stack
    }

    #[test]
    fn parse_is_case_insensitive_and_trimmed() {
        assert_eq!(UniversalCommand::parse("  CANCEL "), Some(UniversalCommand::Cancel));
        assert_eq!(UniversalCommand::parse("Where am I?"), Some(UniversalCommand::WhereAmI));
        assert_eq!(UniversalCommand::parse("what now"), Some(UniversalCommand::WhatNow));
        assert_eq!(UniversalCommand::parse("cancel my session"), None);
        assert_eq!(UniversalCommand::parse("go back please"), None);
    }

    #[test]
    fn cancel_email_group() {
        let mut stack = stack_of(&[TaskState::EmailManageLoop, TaskState::AwaitingDeleteIndex]);
        let reply = intercept("cancel", &mut stack).unwrap();
        assert_eq!(
            reply,
            "I've cancelled the email task. We are now in the 'normal' state."
        );
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn cancel_identity_and_help_labels() {
        let mut stack = stack_of(&[TaskState::AwaitingNameConfirm]);
        assert!(intercept("cancel", &mut stack).unwrap().contains("identity task"));
        let mut stack = stack_of(&[TaskState::CapabilitiesHelp]);
        assert!(intercept("cancel", &mut stack).unwrap().contains("help task"));
    }

    #[test]
    fn cancel_at_normal() {
        let mut stack = DialogueStack::new();
        assert_eq!(
            intercept("cancel", &mut stack).unwrap(),
            "There is no ongoing task to cancel."
        );
    }

    #[test]
    fn go_back_one_step() {
        let mut stack = stack_of(&[TaskState::EmailManageLoop, TaskState::AwaitingViewIndex]);
        assert_eq!(
            intercept("go back", &mut stack).unwrap(),
            "Okay, I've gone back one step. We are now in the 'email_manage_loop' state."
        );
        let mut floor = DialogueStack::new();
        assert_eq!(
            intercept("go back", &mut floor).unwrap(),
            "There's nothing to go back to."
        );
    }

    #[test]
    fn where_am_i_reports_top() {
        let mut stack = stack_of(&[TaskState::GeneralHelpLoop]);
        assert_eq!(
            intercept("where am i", &mut stack).unwrap(),
            "The chatbot is currently in the 'general_help_loop' state."
        );
    }

    #[test]
    fn repeat_at_normal_ignores_prompts() {
        let mut stack = DialogueStack::new();
        assert_eq!(
            intercept("repeat", &mut stack).unwrap(),
            "There's no active task to repeat. How can I help?"
        );
    }

    #[test]
    fn repeat_returns_stored_prompt_or_fallback() {
        let mut stack = stack_of(&[TaskState::AwaitingName]);
        assert_eq!(intercept("repeat", &mut stack).unwrap(), "prompt for awaiting_name");

        let mut bare = DialogueStack::new();
        bare.push(TaskState::AwaitingName, None);
        assert!(
            intercept("repeat", &mut bare)
                .unwrap()
                .starts_with("I'm in the 'awaiting_name' state, but I don't have")
        );
    }

    #[test]
    fn what_now_covers_every_state() {
        for state in TaskState::ALL {
            assert!(!what_now(state).is_empty());
        }
        let mut stack = stack_of(&[TaskState::AwaitingDeleteAllConfirm]);
        assert!(intercept("what now?", &mut stack).unwrap().contains("ALL emails"));
    }

    #[test]
    fn what_now_in_a_task_mentions_cancel() {
        for state in TaskState::ALL {
            let hint = what_now(state);
            if state.is_normal() {
                assert!(!hint.contains("'go back'"));
            } else {
                assert!(hint.contains("'cancel'"), "{state}: {hint}");
            }
        }
        assert!(what_now(TaskState::AwaitingSessionStartConfirm).ends_with(NAVIGATION_HINT));
        assert!(!what_now(TaskState::AwaitingViewIndex).ends_with(NAVIGATION_HINT));
    }

    #[test]
    fn non_command_passes_through() {
        let mut stack = DialogueStack::new();
        assert!(intercept("hello", &mut stack).is_none());
    }
}
