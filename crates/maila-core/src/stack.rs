//! Dialogue stack manager.
//!
//! The [`DialogueStack`] records where the conversation is as a stack of
//! [`TaskState`]s with `normal` always at the bottom. Each pushed state
//! may carry the prompt that introduced it so `repeat` can say it again;
//! a prompt lives exactly as long as its state stays on the stack.

use std::collections::HashMap;

use tracing::debug;

use maila_types::task::{TaskGroup, TaskState};

/// Result of [`DialogueStack::pop_to_normal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopOutcome {
    /// The group that was exited as a unit, if the old top had one.
    pub exited_group: Option<TaskGroup>,
    /// Whether anything was removed at all.
    pub popped: bool,
}

/// Stack of task states plus per-state repeat prompts.
#[derive(Debug, Clone)]
pub struct DialogueStack {
    states: Vec<TaskState>,
    prompts: HashMap<TaskState, String>,
}

impl DialogueStack {
    pub fn new() -> Self {
        Self {
            states: vec![TaskState::Normal],
            prompts: HashMap::new(),
        }
    }

    /// The current state.
    pub fn top(&self) -> TaskState {
        self.states.last().copied().unwrap_or(TaskState::Normal)
    }

    pub fn depth(&self) -> usize {
        self.states.len()
    }

    /// States from bottom to top.
    pub fn states(&self) -> &[TaskState] {
        &self.states
    }

    /// The stored prompt for `state`, if it is on the stack and has one.
    pub fn prompt_for(&self, state: TaskState) -> Option<&str> {
        self.prompts.get(&state).map(String::as_str)
    }

    /// Enter `state`, remembering `prompt` for it.
    ///
    /// Pushing the current top is a no-op, as is pushing `normal`.
    pub fn push(&mut self, state: TaskState, prompt: Option<String>) {
        if state == self.top() || state.is_normal() {
            return;
        }
        debug!(from = %self.top(), to = %state, "push dialogue state");
        self.states.push(state);
        if let Some(prompt) = prompt {
            self.prompts.insert(state, prompt);
        }
    }

    /// Leave the current task.
    ///
    /// A grouped top is popped together with every state of the same group
    /// directly beneath it. A groupless top pops exactly one level. The
    /// floor is never removed.
    pub fn pop_to_normal(&mut self) -> PopOutcome {
        let top = self.top();
        let Some(group) = top.group() else {
            let popped = self.pop_raw().is_some();
            return PopOutcome {
                exited_group: None,
                popped,
            };
        };

        while self.top().in_group(group) {
            if self.pop_raw().is_none() {
                break;
            }
        }
        debug!(group = group.label(), now = %self.top(), "left task group");
        PopOutcome {
            exited_group: Some(group),
            popped: true,
        }
    }

    /// Go back exactly one level. Returns `false` at the floor.
    pub fn pop_one(&mut self) -> bool {
        self.pop_raw().is_some()
    }

    /// Apply a handler's requested transition.
    ///
    /// `None` (or `normal`) leaves the current task; anything else is
    /// pushed with `prompt` as its repeat text.
    pub fn apply(&mut self, next: Option<TaskState>, prompt: &str) {
        match next {
            None | Some(TaskState::Normal) => {
                self.pop_to_normal();
            }
            Some(state) => self.push(state, Some(prompt.to_string())),
        }
    }

    fn pop_raw(&mut self) -> Option<TaskState> {
        if self.states.len() <= 1 {
            return None;
        }
        let state = self.states.pop()?;
        self.prompts.remove(&state);
        Some(state)
    }
}

impl Default for DialogueStack {
    fn default() -> Self {
        Self::new()
    }
}
