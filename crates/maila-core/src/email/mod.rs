//! Email task state machine.
//!
//! [`EmailTaskStateMachine::handle`] takes the current dialogue state, the
//! classified sub-intent, the raw input and the stored session, and decides
//! one of three things:
//!
//! - [`EmailTurn::Handled`]: the turn was an email turn and produced a reply.
//! - [`EmailTurn::Failed`]: it was an email turn but a remote or input error
//!   stopped it. The reply still carries user-facing text.
//! - [`EmailTurn::Declined`]: not an email turn after all; the caller routes
//!   the input elsewhere.
//!
//! Rules are checked in a fixed order: the missing-session guard, the
//! lifecycle intents (start, restore, end), the awaiting states, then the
//! active-session operations. Awaiting states that collected what they
//! were waiting for continue as the corresponding operation; at most two
//! such continuations happen per turn.
//!
//! The machine never stores a session. It reads the caller's copy and
//! reports changes through [`SessionUpdate`].

pub mod extract;

use tracing::{debug, info, warn};

use maila_mail::{EmailMessage, FailureKind, MailError, MailSessionClient, Result};
use maila_types::inbox::Inbox;
use maila_types::session::MailSession;
use maila_types::task::TaskState;

use crate::classifier::SubIntent;
use crate::phrasebook::Phrasebook;

/// Maximum number of continuations within one turn.
const MAX_REDISPATCH: usize = 2;

const START_SESSION: &[&str] = &[
    "Great! Here is your info: \nTemporary Email: {email}\nSession ID: {sid}",
    "All set! Your new temporary email is {email} and the session ID is {sid}.",
    "Got it. I've created {email} for you. Your session ID is {sid}.",
];
const RESTORE_SESSION: &[&str] = &[
    "Welcome back! Your session [{sid}] for [{email}] has been restored.",
    "Okay, I've loaded your session for {email}. Good to see you again!",
    "Session [{sid}] restored. Your email address is {email}.",
];
const INBOX_EMPTY: &[&str] = &[
    "Your inbox is currently empty.",
    "Looks like there's nothing here. Your inbox is empty.",
    "No emails found in your inbox.",
];
const DELETED: &[&str] = &["{result}", "Done. {result}", "Okay. {result}"];
const DOWNLOADED: &[&str] = &["{result}", "Got it. {result}", "Task complete. {result}"];
const MANAGE_SESSION: &[&str] = &[
    "You have an active email session. You can 'list emails', 'view [index]', 'delete [index]', 'download [index]', or 'end session'.",
    "Okay, you're in your email session. What would you like to do? You can list, view, download, delete, or end the session.",
    "Session active. Your options are: list emails, view, download, delete, or end session.",
];
const CONFIRM_DELETE_ALL: &[&str] = &[
    "Are you absolutely sure you want to delete ALL emails in your inbox? This cannot be undone.",
    "Warning: This will permanently delete all messages. Are you sure you want to proceed?",
    "Just to confirm, you want to delete every single email? Please say 'yes' or 'no'.",
];

const OFFER_SESSION: &str =
    "You don't have an active temporary email session. Would you like to create one?";
const ALREADY_ACTIVE: &str =
    "You already have an active session. You must 'end session' before starting a new one.";
const ASK_SESSION_ID: &str = "Okay, I can help with that. What is your session ID?";
const RESTORE_FAILED: &str = "Error: Could not restore session.";
const CONFIRM_END: &str = "Are you sure you want to end your current session? This will permanently delete your temporary email address.";
const START_DECLINED: &str = "Okay, no problem. Let me know if you change your mind.";
const MISSING_SESSION_ID: &str = "I didn't catch a session ID in that message. Please provide your full session ID, or say 'cancel'.";
const RESTORE_CANCELLED: &str = "Okay, cancelling session restore.";
const RETRY_SESSION_ID: &str = "Okay, what is the session ID you'd like to try?";
const SESSION_ENDED: &str = "Your session has been ended and your email address deleted. Let me know if you need a new one.";
const END_FAILED: &str = "Sorry, I had trouble ending the session. Please try again.";
const END_DECLINED: &str = "Okay, I won't end your session. What's next?";
const MISSING_VIEW_INDEX: &str =
    "I didn't catch that. Please provide a number for the email you want to view, or say 'cancel'.";
const MISSING_INDICES: &str = "I didn't catch that. Please provide indices (e.g., '1', '1, 2', '1-3', 'all'), or say 'cancel'.";
const DELETE_ALL_CANCELLED: &str = "Okay, I've cancelled the deletion.";
const EXIT_LOOP: &str =
    "Okay, closing the email task. I'll remember your session if you need it again.";
const ASK_VIEW_INDEX: &str = "Which email index would you like to view? Please enter a number.";
const ASK_DOWNLOAD_INDICES: &str =
    "Which email(s) would you like to download? You can enter '1', '1, 2', '1-3', or 'all'.";
const ASK_DELETE_INDICES: &str =
    "Which email(s) would you like to delete? You can enter '1', '1, 2', '1-3', or 'all'.";

const TRANSPORT_FAILURE: &str = "I'm sorry, I'm having trouble connecting to the email service. Please check your internet connection and try again.";
const PROTOCOL_FAILURE: &str =
    "The email service seems to be down or experiencing issues. Please try again in a moment.";
const VALIDATION_FAILURE: &str = "I ran into a value error, did you put in a valid email number? Please double check your inbox and try again.";

/// What the caller should do with its stored session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionUpdate {
    Keep,
    Replace(MailSession),
    Clear,
}

/// Something the front end should do besides printing the reply.
#[derive(Debug, Clone, PartialEq)]
pub enum SideEffect {
    /// Show a fetched message in full.
    ViewEmail(EmailMessage),
}

/// Reply produced by an email turn.
#[derive(Debug, Clone, PartialEq)]
pub struct EmailReply {
    /// State to enter; `None` leaves the email task.
    pub next_state: Option<TaskState>,
    pub text: String,
    pub session: SessionUpdate,
    pub effect: Option<SideEffect>,
}

impl EmailReply {
    fn new(next_state: Option<TaskState>, text: impl Into<String>) -> Self {
        Self {
            next_state,
            text: text.into(),
            session: SessionUpdate::Keep,
            effect: None,
        }
    }

    fn with_session(mut self, session: MailSession) -> Self {
        self.session = SessionUpdate::Replace(session);
        self
    }
}

/// Outcome of [`EmailTaskStateMachine::handle`].
#[derive(Debug, Clone, PartialEq)]
pub enum EmailTurn {
    Handled(EmailReply),
    Failed(EmailReply, FailureKind),
    /// Not an email turn.
    Declined,
}

enum Step {
    Reply(EmailReply),
    /// Handle the same input again as `subintent` in `state`.
    Continue {
        state: TaskState,
        subintent: SubIntent,
        keep_session: bool,
    },
    Declined,
}

fn reply(next_state: Option<TaskState>, text: impl Into<String>) -> Result<Step> {
    Ok(Step::Reply(EmailReply::new(next_state, text)))
}

/// Drives the email task for one conversation.
#[derive(Debug)]
pub struct EmailTaskStateMachine {
    client: MailSessionClient,
    phrases: Phrasebook,
}

impl EmailTaskStateMachine {
    pub fn new(client: MailSessionClient, phrases: Phrasebook) -> Self {
        Self { client, phrases }
    }

    /// Handle one turn.
    pub async fn handle(
        &self,
        state: TaskState,
        subintent: SubIntent,
        input: &str,
        session: Option<&MailSession>,
    ) -> EmailTurn {
        let origin = state;
        let (mut state, mut subintent, mut session) = (state, subintent, session);

        for hop in 0..=MAX_REDISPATCH {
            debug!(%state, %subintent, hop, has_session = session.is_some(), "email step");
            match self.step(state, subintent, input, session).await {
                Ok(Step::Reply(reply)) => return EmailTurn::Handled(reply),
                Ok(Step::Declined) => return EmailTurn::Declined,
                Ok(Step::Continue {
                    state: next,
                    subintent: next_intent,
                    keep_session,
                }) => {
                    state = next;
                    subintent = next_intent;
                    if !keep_session {
                        session = None;
                    }
                }
                Err(err) => return self.failure(origin, &err),
            }
        }

        warn!(%origin, "email turn exceeded redispatch limit");
        EmailTurn::Failed(
            EmailReply::new(
                None,
                "An unexpected error occurred: too many steps for one request. Returning to the main menu.",
            ),
            FailureKind::Unexpected,
        )
    }

    async fn step(
        &self,
        state: TaskState,
        subintent: SubIntent,
        input: &str,
        session: Option<&MailSession>,
    ) -> Result<Step> {
        if session.is_none() && subintent.needs_mail_session() {
            return reply(Some(TaskState::AwaitingSessionStartConfirm), OFFER_SESSION);
        }

        match subintent {
            SubIntent::StartSession => return self.start(session).await,
            SubIntent::RestoreSession => return self.restore(input).await,
            SubIntent::EndSession if session.is_some() => {
                return reply(Some(TaskState::AwaitingSessionEndConfirm), CONFIRM_END);
            }
            _ => {}
        }

        if let Some(step) = self.awaiting(state, input, session).await? {
            return Ok(step);
        }

        match session {
            Some(session) if subintent.needs_mail_session() => {
                self.active(subintent, input, session).await
            }
            _ => Ok(Step::Declined),
        }
    }

    // ── lifecycle ────────────────────────────────────────────────────────

    async fn start(&self, session: Option<&MailSession>) -> Result<Step> {
        if session.is_some() {
            return reply(None, ALREADY_ACTIVE);
        }
        let fresh = self.client.start_new_session().await?;
        let text = self.phrases.render(
            START_SESSION,
            &[("email", &fresh.address), ("sid", &fresh.sid_token)],
        );
        Ok(Step::Reply(EmailReply::new(None, text).with_session(fresh)))
    }

    async fn restore(&self, input: &str) -> Result<Step> {
        let Some(sid) = extract::session_id(input) else {
            return reply(Some(TaskState::AwaitingSessionRestore), ASK_SESSION_ID);
        };
        match self.client.restore_session(&sid).await {
            Ok(restored) => {
                let text = self
                    .phrases
                    .render(RESTORE_SESSION, &[("email", &restored.address), ("sid", &sid)]);
                Ok(Step::Reply(EmailReply::new(None, text).with_session(restored)))
            }
            Err(MailError::SessionNotInitialized { .. }) => {
                warn!(sid_token = %sid, "session restore refused");
                reply(Some(TaskState::AwaitingSessionRestoreConfirm), RESTORE_FAILED)
            }
            Err(err) => Err(err),
        }
    }

    // ── awaiting states ──────────────────────────────────────────────────

    /// Handle an awaiting state. `None` when `state` is not one.
    async fn awaiting(
        &self,
        state: TaskState,
        input: &str,
        session: Option<&MailSession>,
    ) -> Result<Option<Step>> {
        let step = match state {
            TaskState::AwaitingSessionStartConfirm => {
                if said_yes(input) {
                    continue_as(TaskState::Normal, SubIntent::StartSession, false)
                } else {
                    reply(None, START_DECLINED)?
                }
            }
            TaskState::AwaitingSessionRestore => {
                if extract::session_id(input).is_some() {
                    continue_as(TaskState::Normal, SubIntent::RestoreSession, false)
                } else {
                    reply(Some(state), MISSING_SESSION_ID)?
                }
            }
            TaskState::AwaitingSessionRestoreConfirm => {
                if crate::text::mentions_any(input, &["no", "cancel"]) {
                    reply(None, RESTORE_CANCELLED)?
                } else if extract::session_id(input).is_some() {
                    continue_as(TaskState::Normal, SubIntent::RestoreSession, false)
                } else {
                    reply(Some(TaskState::AwaitingSessionRestore), RETRY_SESSION_ID)?
                }
            }
            TaskState::AwaitingSessionEndConfirm => {
                if said_yes(input) {
                    self.end(session).await
                } else {
                    reply(None, END_DECLINED)?
                }
            }
            TaskState::AwaitingViewIndex => {
                if extract::email_position(input).is_some() {
                    continue_as(TaskState::EmailManageLoop, SubIntent::ViewEmail, true)
                } else {
                    reply(Some(state), MISSING_VIEW_INDEX)?
                }
            }
            TaskState::AwaitingDownloadIndex => {
                if extract::index_expr(input, "download").is_some() {
                    continue_as(TaskState::EmailManageLoop, SubIntent::DownloadEmail, true)
                } else {
                    reply(Some(state), MISSING_INDICES)?
                }
            }
            TaskState::AwaitingDeleteIndex => match extract::index_expr(input, "delete") {
                Some(expr) if expr == "all" => self.confirm_delete_all(),
                Some(_) => continue_as(TaskState::EmailManageLoop, SubIntent::DeleteEmail, true),
                None => reply(Some(state), MISSING_INDICES)?,
            },
            TaskState::AwaitingDeleteAllConfirm => {
                if said_yes(input) {
                    self.delete_all(session).await?
                } else {
                    reply(Some(TaskState::EmailManageLoop), DELETE_ALL_CANCELLED)?
                }
            }
            _ => return Ok(None),
        };
        Ok(Some(step))
    }

    async fn end(&self, session: Option<&MailSession>) -> Step {
        let Some(session) = session else {
            warn!("end confirmed without a stored session");
            return Step::Reply(EmailReply::new(None, END_FAILED));
        };
        let mut ending = session.clone();
        match self.client.forget(&mut ending).await {
            Ok(()) => {
                info!("mail session ended by user");
                Step::Reply(EmailReply {
                    session: SessionUpdate::Clear,
                    ..EmailReply::new(None, SESSION_ENDED)
                })
            }
            Err(err) => {
                warn!(error = %err, kind = ?err.class(), "failed to end mail session");
                Step::Reply(EmailReply::new(None, END_FAILED))
            }
        }
    }

    fn confirm_delete_all(&self) -> Step {
        Step::Reply(EmailReply::new(
            Some(TaskState::AwaitingDeleteAllConfirm),
            self.phrases.pick(CONFIRM_DELETE_ALL),
        ))
    }

    async fn delete_all(&self, session: Option<&MailSession>) -> Result<Step> {
        let session = session.ok_or(MailError::NoSession)?;
        let mut current = self.client.resume(session).await?;
        self.client.refresh_inbox(&mut current, 0).await?;

        let deleted = if current.inbox.is_empty() {
            0
        } else {
            self.client.delete_emails(&mut current, "all").await?.len()
        };
        let text = self.deleted_text(deleted);
        Ok(Step::Reply(
            EmailReply::new(Some(TaskState::EmailManageLoop), text).with_session(current),
        ))
    }

    // ── active session ───────────────────────────────────────────────────

    async fn active(
        &self,
        subintent: SubIntent,
        input: &str,
        session: &MailSession,
    ) -> Result<Step> {
        let mut current = self.client.resume(session).await?;
        let manage = Some(TaskState::EmailManageLoop);

        let reply = match subintent {
            SubIntent::ExitLoop => EmailReply::new(None, EXIT_LOOP),
            SubIntent::ListEmails | SubIntent::UpdateInbox => {
                self.client.refresh_inbox(&mut current, 0).await?;
                EmailReply::new(manage, self.render_inbox(&current.inbox))
            }
            SubIntent::ViewEmail => match extract::email_position(input) {
                None => EmailReply::new(Some(TaskState::AwaitingViewIndex), ASK_VIEW_INDEX),
                Some(position) => {
                    self.ensure_inbox(&mut current).await?;
                    let message = self.client.fetch_email(&mut current, position).await?;
                    let subject = if message.subject.is_empty() {
                        "No Subject"
                    } else {
                        message.subject.as_str()
                    };
                    let text = format!("Opening email {position}: '{subject}'");
                    EmailReply {
                        effect: Some(SideEffect::ViewEmail(message)),
                        ..EmailReply::new(manage, text)
                    }
                }
            },
            SubIntent::DownloadEmail => match extract::index_expr(input, "download") {
                None => EmailReply::new(Some(TaskState::AwaitingDownloadIndex), ASK_DOWNLOAD_INDICES),
                Some(expr) => {
                    self.ensure_inbox(&mut current).await?;
                    let report = self.client.download_emails(&mut current, &expr).await?;
                    let mut result =
                        format!("Successfully downloaded {} email(s).", report.saved.len());
                    if report.failed > 0 {
                        result.push_str(&format!(" {} failed.", report.failed));
                    }
                    EmailReply::new(manage, self.phrases.render(DOWNLOADED, &[("result", &result)]))
                }
            },
            SubIntent::DeleteEmail => match extract::index_expr(input, "delete") {
                None => EmailReply::new(Some(TaskState::AwaitingDeleteIndex), ASK_DELETE_INDICES),
                Some(expr) if expr == "all" => return Ok(self.confirm_delete_all()),
                Some(expr) => {
                    self.ensure_inbox(&mut current).await?;
                    let deleted = self.client.delete_emails(&mut current, &expr).await?;
                    EmailReply::new(manage, self.deleted_text(deleted.len()))
                }
            },
            SubIntent::ManageSession => EmailReply::new(manage, self.phrases.pick(MANAGE_SESSION)),
            _ => return Ok(Step::Declined),
        };
        Ok(Step::Reply(reply.with_session(current)))
    }

    /// Positions refer to the last listing; only fetch one if there is none.
    async fn ensure_inbox(&self, session: &mut MailSession) -> Result<()> {
        if session.inbox.is_empty() {
            self.client.refresh_inbox(session, 0).await?;
        }
        Ok(())
    }

    fn render_inbox(&self, inbox: &Inbox) -> String {
        if inbox.is_empty() {
            return self.phrases.pick(INBOX_EMPTY).to_string();
        }
        let lines: Vec<String> = inbox
            .iter()
            .enumerate()
            .map(|(i, e)| format!("  {}. From: {}, Subject: {}", i + 1, e.from, e.subject))
            .collect();
        format!(
            "Here are your emails:\n{}\nIf you'd like, you can view, download, or delete (multiple) emails.",
            lines.join("\n")
        )
    }

    fn deleted_text(&self, count: usize) -> String {
        let result = format!("Successfully deleted {count} email(s).");
        self.phrases.render(DELETED, &[("result", &result)])
    }

    fn failure(&self, origin: TaskState, err: &MailError) -> EmailTurn {
        let kind = err.class();
        warn!(error = %err, ?kind, state = %origin, "email task failed");

        let (text, next_state) = match kind {
            FailureKind::Transport => (TRANSPORT_FAILURE.to_string(), None),
            FailureKind::RemoteProtocol => (PROTOCOL_FAILURE.to_string(), None),
            FailureKind::Validation => (VALIDATION_FAILURE.to_string(), Some(origin)),
            FailureKind::Unexpected => (
                format!("An unexpected error occurred: {err}. Returning to the main menu."),
                None,
            ),
        };
        let session = if matches!(err, MailError::SessionNotInitialized { .. }) {
            SessionUpdate::Clear
        } else {
            SessionUpdate::Keep
        };
        EmailTurn::Failed(
            EmailReply {
                session,
                ..EmailReply::new(next_state, text)
            },
            kind,
        )
    }
}

fn continue_as(state: TaskState, subintent: SubIntent, keep_session: bool) -> Step {
    Step::Continue {
        state,
        subintent,
        keep_session,
    }
}

fn said_yes(input: &str) -> bool {
    crate::text::mentions_any(input, &["yes"])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::Arc;

    use maila_mail::protocol::function;
    use maila_mail::scripted::ScriptedTransport;
    use maila_platform::fs::NativeFileSystem;
    use maila_types::config::MailConfig;
    use maila_types::inbox::InboxEntry;
    use serde_json::json;

    const SID: &str = "abcdefghijklmnopqrstuvwxyz";
    const ADDR: &str = "x@sharklasers.com";

    fn machine(transport: Arc<ScriptedTransport>, root: &Path) -> EmailTaskStateMachine {
        let config = MailConfig {
            downloads_dir: root.display().to_string(),
            ..MailConfig::default()
        };
        let client = MailSessionClient::new(transport, Arc::new(NativeFileSystem), &config);
        EmailTaskStateMachine::new(client, Phrasebook::deterministic())
    }

    fn session(ids: &[&str]) -> MailSession {
        let mut s = MailSession::new(SID, ADDR);
        let n = ids.len() as i64;
        s.inbox.merge(ids.iter().enumerate().map(|(i, id)| {
            InboxEntry::new(*id, "a@b.c", format!("subject {id}"), 100 * (n - i as i64))
        }));
        s
    }

    fn alive(transport: &ScriptedTransport) {
        transport.push_ok(
            function::GET_EMAIL_ADDRESS,
            json!({"email_addr": ADDR, "sid_token": SID}),
        );
    }

    fn handled(turn: EmailTurn) -> EmailReply {
        match turn {
            EmailTurn::Handled(reply) => reply,
            other => panic!("expected Handled, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn list_without_session_offers_one() {
        let transport = Arc::new(ScriptedTransport::new());
        let dir = tempfile::tempdir().unwrap();
        let turn = machine(transport.clone(), dir.path())
            .handle(TaskState::Normal, SubIntent::ListEmails, "list my emails", None)
            .await;
        let reply = handled(turn);
        assert_eq!(reply.next_state, Some(TaskState::AwaitingSessionStartConfirm));
        assert_eq!(reply.text, OFFER_SESSION);
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn delete_all_from_index_state_asks_first() {
        let transport = Arc::new(ScriptedTransport::new());
        let dir = tempfile::tempdir().unwrap();
        let s = session(&["3", "2", "1"]);
        let reply = handled(
            machine(transport.clone(), dir.path())
                .handle(TaskState::AwaitingDeleteIndex, SubIntent::None, "all", Some(&s))
                .await,
        );
        assert_eq!(reply.next_state, Some(TaskState::AwaitingDeleteAllConfirm));
        assert_eq!(transport.calls_to(function::DEL_EMAIL), 0);
    }

    #[tokio::test]
    async fn delete_range_reports_confirmed_count() {
        let transport = Arc::new(ScriptedTransport::new());
        alive(&transport);
        transport.push_ok(function::DEL_EMAIL, json!({"deleted_ids": ["3", "2"]}));
        let dir = tempfile::tempdir().unwrap();
        let s = session(&["3", "2", "1"]);

        let reply = handled(
            machine(transport.clone(), dir.path())
                .handle(TaskState::EmailManageLoop, SubIntent::DeleteEmail, "delete 1-2", Some(&s))
                .await,
        );
        assert_eq!(reply.text, "Successfully deleted 2 email(s).");
        assert_eq!(reply.next_state, Some(TaskState::EmailManageLoop));
        let SessionUpdate::Replace(updated) = reply.session else {
            panic!("session not replaced");
        };
        assert_eq!(updated.inbox.mail_ids(), vec!["1"]);
    }

    #[tokio::test]
    async fn transport_failure_on_start_collapses() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_transport_error(function::GET_EMAIL_ADDRESS);
        let dir = tempfile::tempdir().unwrap();
        let turn = machine(transport, dir.path())
            .handle(TaskState::Normal, SubIntent::StartSession, "start a new session", None)
            .await;
        let EmailTurn::Failed(reply, kind) = turn else {
            panic!("expected failure");
        };
        assert_eq!(kind, FailureKind::Transport);
        assert_eq!(reply.text, TRANSPORT_FAILURE);
        assert_eq!(reply.next_state, None);
    }

    #[tokio::test]
    async fn start_confirm_yes_creates_session() {
        let transport = Arc::new(ScriptedTransport::new());
        alive(&transport);
        let dir = tempfile::tempdir().unwrap();
        let reply = handled(
            machine(transport, dir.path())
                .handle(TaskState::AwaitingSessionStartConfirm, SubIntent::None, "yes please", None)
                .await,
        );
        assert_eq!(reply.next_state, None);
        assert!(reply.text.contains(ADDR));
        assert!(reply.text.contains(SID));
        assert!(matches!(reply.session, SessionUpdate::Replace(ref s) if s.sid_token == SID));
    }

    #[tokio::test]
    async fn start_confirm_other_declines() {
        let transport = Arc::new(ScriptedTransport::new());
        let dir = tempfile::tempdir().unwrap();
        let reply = handled(
            machine(transport.clone(), dir.path())
                .handle(TaskState::AwaitingSessionStartConfirm, SubIntent::None, "eyes", None)
                .await,
        );
        assert_eq!(reply.text, START_DECLINED);
        assert_eq!(reply.next_state, None);
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn start_with_existing_session_refuses() {
        let transport = Arc::new(ScriptedTransport::new());
        let dir = tempfile::tempdir().unwrap();
        let s = session(&[]);
        let reply = handled(
            machine(transport.clone(), dir.path())
                .handle(TaskState::Normal, SubIntent::StartSession, "new session", Some(&s))
                .await,
        );
        assert_eq!(reply.text, ALREADY_ACTIVE);
        assert_eq!(reply.session, SessionUpdate::Keep);
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn restore_without_id_asks_for_it() {
        let transport = Arc::new(ScriptedTransport::new());
        let dir = tempfile::tempdir().unwrap();
        let reply = handled(
            machine(transport, dir.path())
                .handle(TaskState::Normal, SubIntent::RestoreSession, "restore my session", None)
                .await,
        );
        assert_eq!(reply.next_state, Some(TaskState::AwaitingSessionRestore));
        assert_eq!(reply.text, ASK_SESSION_ID);
    }

    #[tokio::test]
    async fn restore_from_awaiting_state() {
        let transport = Arc::new(ScriptedTransport::new());
        alive(&transport);
        let dir = tempfile::tempdir().unwrap();
        let reply = handled(
            machine(transport.clone(), dir.path())
                .handle(TaskState::AwaitingSessionRestore, SubIntent::None, SID, None)
                .await,
        );
        assert_eq!(reply.next_state, None);
        assert!(reply.text.contains(SID));
        assert_eq!(transport.calls()[0].value("sid_token"), Some(SID));
    }

    #[tokio::test]
    async fn restore_refused_moves_to_confirm() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_ok(
            function::GET_EMAIL_ADDRESS,
            json!({"auth": {"success": false, "error_codes": ["auth-session-not-initialized"]}}),
        );
        let dir = tempfile::tempdir().unwrap();
        let input = format!("restore session {SID}");
        let reply = handled(
            machine(transport, dir.path())
                .handle(TaskState::Normal, SubIntent::RestoreSession, &input, None)
                .await,
        );
        assert_eq!(reply.text, RESTORE_FAILED);
        assert_eq!(reply.next_state, Some(TaskState::AwaitingSessionRestoreConfirm));
    }

    #[tokio::test]
    async fn restore_confirm_no_cancels() {
        let transport = Arc::new(ScriptedTransport::new());
        let dir = tempfile::tempdir().unwrap();
        let m = machine(transport, dir.path());
        let reply = handled(
            m.handle(TaskState::AwaitingSessionRestoreConfirm, SubIntent::None, "no", None)
                .await,
        );
        assert_eq!(reply.text, RESTORE_CANCELLED);
        assert_eq!(reply.next_state, None);

        let reply = handled(
            m.handle(TaskState::AwaitingSessionRestoreConfirm, SubIntent::None, "yes", None)
                .await,
        );
        assert_eq!(reply.next_state, Some(TaskState::AwaitingSessionRestore));
    }

    #[tokio::test]
    async fn end_session_asks_then_forgets() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_ok(function::FORGET_ME, json!(true));
        let dir = tempfile::tempdir().unwrap();
        let m = machine(transport.clone(), dir.path());
        let s = session(&["1"]);

        let ask = handled(
            m.handle(TaskState::EmailManageLoop, SubIntent::EndSession, "end session", Some(&s))
                .await,
        );
        assert_eq!(ask.next_state, Some(TaskState::AwaitingSessionEndConfirm));

        let done = handled(
            m.handle(TaskState::AwaitingSessionEndConfirm, SubIntent::None, "yes", Some(&s))
                .await,
        );
        assert_eq!(done.text, SESSION_ENDED);
        assert_eq!(done.session, SessionUpdate::Clear);
        assert_eq!(done.next_state, None);
    }

    #[tokio::test]
    async fn end_failure_keeps_session() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_transport_error(function::FORGET_ME);
        let dir = tempfile::tempdir().unwrap();
        let s = session(&[]);
        let reply = handled(
            machine(transport, dir.path())
                .handle(TaskState::AwaitingSessionEndConfirm, SubIntent::None, "yes", Some(&s))
                .await,
        );
        assert_eq!(reply.text, END_FAILED);
        assert_eq!(reply.session, SessionUpdate::Keep);
    }

    #[tokio::test]
    async fn view_emits_side_effect() {
        let transport = Arc::new(ScriptedTransport::new());
        alive(&transport);
        transport.push_ok(
            function::FETCH_EMAIL,
            json!({"mail_id": "2", "mail_from": "a@b.c", "mail_subject": "Welcome",
                   "mail_body": "<p>hi</p>", "mail_timestamp": "200"}),
        );
        let dir = tempfile::tempdir().unwrap();
        let s = session(&["2", "1"]);
        let reply = handled(
            machine(transport, dir.path())
                .handle(TaskState::AwaitingViewIndex, SubIntent::None, "1", Some(&s))
                .await,
        );
        assert_eq!(reply.text, "Opening email 1: 'Welcome'");
        assert_eq!(reply.next_state, Some(TaskState::EmailManageLoop));
        let Some(SideEffect::ViewEmail(message)) = reply.effect else {
            panic!("no view effect");
        };
        assert_eq!(message.body, "<p>hi</p>");
    }

    #[tokio::test]
    async fn view_out_of_range_keeps_state() {
        let transport = Arc::new(ScriptedTransport::new());
        alive(&transport);
        let dir = tempfile::tempdir().unwrap();
        let s = session(&["1"]);
        let turn = machine(transport, dir.path())
            .handle(TaskState::AwaitingViewIndex, SubIntent::None, "9", Some(&s))
            .await;
        let EmailTurn::Failed(reply, kind) = turn else {
            panic!("expected failure");
        };
        assert_eq!(kind, FailureKind::Validation);
        assert_eq!(reply.next_state, Some(TaskState::AwaitingViewIndex));
        assert_eq!(reply.text, VALIDATION_FAILURE);
    }

    #[tokio::test]
    async fn view_without_number_asks() {
        let transport = Arc::new(ScriptedTransport::new());
        alive(&transport);
        let dir = tempfile::tempdir().unwrap();
        let s = session(&["1"]);
        let reply = handled(
            machine(transport, dir.path())
                .handle(TaskState::Normal, SubIntent::ViewEmail, "view email", Some(&s))
                .await,
        );
        assert_eq!(reply.next_state, Some(TaskState::AwaitingViewIndex));
        assert_eq!(reply.text, ASK_VIEW_INDEX);
    }

    #[tokio::test]
    async fn list_renders_inbox() {
        let transport = Arc::new(ScriptedTransport::new());
        alive(&transport);
        transport.push_ok(
            function::GET_EMAIL_LIST,
            json!({"list": [
                {"mail_id": "7", "mail_from": "news@site.com", "mail_subject": "Digest", "mail_timestamp": "70"}
            ]}),
        );
        let dir = tempfile::tempdir().unwrap();
        let s = session(&[]);
        let reply = handled(
            machine(transport, dir.path())
                .handle(TaskState::Normal, SubIntent::ListEmails, "list emails", Some(&s))
                .await,
        );
        assert_eq!(
            reply.text,
            "Here are your emails:\n  1. From: news@site.com, Subject: Digest\nIf you'd like, you can view, download, or delete (multiple) emails."
        );
        assert_eq!(reply.next_state, Some(TaskState::EmailManageLoop));
    }

    #[tokio::test]
    async fn list_of_empty_inbox() {
        let transport = Arc::new(ScriptedTransport::new());
        alive(&transport);
        transport.push_ok(function::GET_EMAIL_LIST, json!({"list": []}));
        let dir = tempfile::tempdir().unwrap();
        let s = session(&[]);
        let reply = handled(
            machine(transport, dir.path())
                .handle(TaskState::Normal, SubIntent::UpdateInbox, "refresh", Some(&s))
                .await,
        );
        assert_eq!(reply.text, INBOX_EMPTY[0]);
    }

    #[tokio::test]
    async fn download_all_saves_files() {
        let transport = Arc::new(ScriptedTransport::new());
        alive(&transport);
        transport
            .push_ok(function::FETCH_EMAIL, json!({"mail_subject": "One", "mail_body": "1"}))
            .push_transport_error(function::FETCH_EMAIL);
        let dir = tempfile::tempdir().unwrap();
        let s = session(&["2", "1"]);
        let reply = handled(
            machine(transport, dir.path())
                .handle(TaskState::Normal, SubIntent::DownloadEmail, "download all", Some(&s))
                .await,
        );
        assert_eq!(reply.text, "Successfully downloaded 1 email(s). 1 failed.");
        assert!(dir.path().join(SID).join("2_One.html").exists());
    }

    #[tokio::test]
    async fn delete_all_confirmed_refreshes_then_deletes() {
        let transport = Arc::new(ScriptedTransport::new());
        alive(&transport);
        transport
            .push_ok(
                function::GET_EMAIL_LIST,
                json!({"list": [
                    {"mail_id": "2", "mail_timestamp": "20"},
                    {"mail_id": "1", "mail_timestamp": "10"}
                ]}),
            )
            .push_ok(function::DEL_EMAIL, json!({"deleted_ids": ["2", "1"]}));
        let dir = tempfile::tempdir().unwrap();
        let s = session(&[]);
        let reply = handled(
            machine(transport, dir.path())
                .handle(TaskState::AwaitingDeleteAllConfirm, SubIntent::None, "yes", Some(&s))
                .await,
        );
        assert_eq!(reply.text, "Successfully deleted 2 email(s).");
        assert_eq!(reply.next_state, Some(TaskState::EmailManageLoop));
        let SessionUpdate::Replace(updated) = reply.session else {
            panic!("session not replaced");
        };
        assert!(updated.inbox.is_empty());
    }

    #[tokio::test]
    async fn delete_all_declined() {
        let transport = Arc::new(ScriptedTransport::new());
        let dir = tempfile::tempdir().unwrap();
        let s = session(&["1"]);
        let reply = handled(
            machine(transport.clone(), dir.path())
                .handle(TaskState::AwaitingDeleteAllConfirm, SubIntent::None, "no", Some(&s))
                .await,
        );
        assert_eq!(reply.text, DELETE_ALL_CANCELLED);
        assert_eq!(reply.next_state, Some(TaskState::EmailManageLoop));
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn expired_session_is_cleared() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_ok(
            function::GET_EMAIL_ADDRESS,
            json!({"auth": {"success": false, "error_codes": ["auth-session-not-initialized"]}}),
        );
        let dir = tempfile::tempdir().unwrap();
        let s = session(&["1"]);
        let turn = machine(transport, dir.path())
            .handle(TaskState::EmailManageLoop, SubIntent::ListEmails, "list", Some(&s))
            .await;
        let EmailTurn::Failed(reply, kind) = turn else {
            panic!("expected failure");
        };
        assert_eq!(kind, FailureKind::Unexpected);
        assert_eq!(reply.session, SessionUpdate::Clear);
        assert_eq!(reply.next_state, None);
        assert!(reply.text.starts_with("An unexpected error occurred: "));
    }

    #[tokio::test]
    async fn unrelated_turn_in_loop_is_declined_without_network() {
        let transport = Arc::new(ScriptedTransport::new());
        let dir = tempfile::tempdir().unwrap();
        let s = session(&["1"]);
        let turn = machine(transport.clone(), dir.path())
            .handle(TaskState::EmailManageLoop, SubIntent::None, "hello there", Some(&s))
            .await;
        assert_eq!(turn, EmailTurn::Declined);
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn manage_and_exit() {
        let transport = Arc::new(ScriptedTransport::new());
        alive(&transport);
        alive(&transport);
        let dir = tempfile::tempdir().unwrap();
        let m = machine(transport, dir.path());
        let s = session(&[]);

        let menu = handled(
            m.handle(TaskState::Normal, SubIntent::ManageSession, "manage session", Some(&s))
                .await,
        );
        assert_eq!(menu.text, MANAGE_SESSION[0]);
        assert_eq!(menu.next_state, Some(TaskState::EmailManageLoop));

        let exit = handled(
            m.handle(TaskState::EmailManageLoop, SubIntent::ExitLoop, "exit", Some(&s))
                .await,
        );
        assert_eq!(exit.text, EXIT_LOOP);
        assert_eq!(exit.next_state, None);
    }
}
