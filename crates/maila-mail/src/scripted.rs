//! In-memory scripted transport for tests.
//!
//! Responses are queued per provider function and consumed in order. Every
//! call is recorded so tests can assert on what was sent. A call with no
//! queued response fails with [`MailError::Protocol`].

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{MailError, Result};
use crate::transport::{ApiRequest, MailTransport};

/// A queued outcome for one call.
#[derive(Debug, Clone)]
pub enum Scripted {
    /// Succeed with this payload.
    Ok(Value),
    /// Fail as if the network were down.
    Transport,
    /// Fail as if the provider answered badly.
    Protocol(String),
}

/// A [`MailTransport`] that replays queued responses.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    script: Mutex<HashMap<String, VecDeque<Scripted>>>,
    calls: Mutex<Vec<ApiRequest>>,
}

fn locked<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an outcome for `function`.
    pub fn push(&self, function: &str, outcome: Scripted) -> &Self {
        locked(&self.script)
            .entry(function.to_string())
            .or_default()
            .push_back(outcome);
        self
    }

    /// Queue a successful payload for `function`.
    pub fn push_ok(&self, function: &str, payload: Value) -> &Self {
        self.push(function, Scripted::Ok(payload))
    }

    /// Queue a transport failure for `function`.
    pub fn push_transport_error(&self, function: &str) -> &Self {
        self.push(function, Scripted::Transport)
    }

    /// Queue a protocol failure for `function`.
    pub fn push_protocol_error(&self, function: &str, message: &str) -> &Self {
        self.push(function, Scripted::Protocol(message.to_string()))
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<ApiRequest> {
        locked(&self.calls).clone()
    }

    /// How many calls were made to `function`.
    pub fn calls_to(&self, function: &str) -> usize {
        locked(&self.calls)
            .iter()
            .filter(|c| c.function == function)
            .count()
    }

    /// Number of queued outcomes not yet consumed.
    pub fn remaining(&self) -> usize {
        locked(&self.script).values().map(VecDeque::len).sum()
    }
}

#[async_trait]
impl MailTransport for ScriptedTransport {
    async fn call(&self, request: &ApiRequest) -> Result<Value> {
        locked(&self.calls).push(request.clone());

        let next = locked(&self.script)
            .get_mut(&request.function)
            .and_then(VecDeque::pop_front);

        match next {
            Some(Scripted::Ok(payload)) => Ok(payload),
            Some(Scripted::Transport) => Err(MailError::Transport(
                "connection refused (scripted)".into(),
            )),
            Some(Scripted::Protocol(msg)) => Err(MailError::Protocol(msg)),
            None => Err(MailError::Protocol(format!(
                "no scripted response for {}",
                request.function
            ))),
        }
    }
}
