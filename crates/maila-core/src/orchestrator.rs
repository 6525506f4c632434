//! Per-turn routing.
//!
//! The [`Orchestrator`] owns everything one conversation remembers: the
//! dialogue stack, the mail session and the user's name. Each call to
//! [`Orchestrator::respond`] runs one turn to completion:
//!
//! 1. universal commands (`cancel`, `go back`, ...) end the turn at once;
//! 2. the input is classified;
//! 3. an open identity or help task gets the input regardless of intent;
//! 4. email intents, or any input while an email state is open, go to the
//!    email state machine, which may decline the turn;
//! 5. everything else is routed by intent.

use std::sync::Arc;

use tracing::{debug, info};

use maila_mail::{MailSessionClient, MailTransport};
use maila_platform::fs::FileSystem;
use maila_types::config::Config;
use maila_types::session::MailSession;
use maila_types::task::{TaskGroup, TaskState};

use crate::classifier::{Intent, IntentClassifier, KeywordClassifier, SubIntent};
use crate::commands;
use crate::discoverability::DiscoverabilityHandler;
use crate::email::{EmailReply, EmailTaskStateMachine, EmailTurn, SessionUpdate, SideEffect};
use crate::identity::IdentityHandler;
use crate::phrasebook::{Phrasebook, fill};
use crate::replies::{CannedReplies, StaticReplies};
use crate::stack::DialogueStack;

const UNRECOGNIZED: &str = "Forgive me, but I'm unable to recognize what you are saying.";
const SYSTEM_ERROR: &str = "[SYSTEM ERROR]: An internal classification error occurred.";
const SMALL_TALK_FALLBACK: &str =
    "I'm not sure what to say to that, but I'm happy to keep chatting!";
const ANSWER_FALLBACK: &str = "I'm sorry, I don't know the answer to that one.";
const DEFAULT_USERNAME: &str = "friend";

/// What one turn produced.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutput {
    pub text: String,
    pub effect: Option<SideEffect>,
}

impl TurnOutput {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            effect: None,
        }
    }
}

/// One conversation.
pub struct Orchestrator {
    stack: DialogueStack,
    session: Option<MailSession>,
    username: Option<String>,
    bot_name: String,
    threshold: f32,
    classifier: Box<dyn IntentClassifier>,
    replies: Box<dyn CannedReplies>,
    identity: IdentityHandler,
    help: DiscoverabilityHandler,
    email: EmailTaskStateMachine,
}

impl Orchestrator {
    /// Build a conversation with the built-in classifier and replies.
    pub fn new(config: &Config, transport: Arc<dyn MailTransport>, fs: Arc<dyn FileSystem>) -> Self {
        let phrases = Phrasebook::new(config.dialogue.randomize_phrasing);
        let client = MailSessionClient::new(transport, fs, &config.mail);
        Self {
            stack: DialogueStack::new(),
            session: None,
            username: None,
            bot_name: config.dialogue.bot_name.clone(),
            threshold: config.dialogue.intent_threshold,
            classifier: Box::new(KeywordClassifier::new()),
            replies: Box::new(StaticReplies::new(phrases)),
            identity: IdentityHandler::new(phrases),
            help: DiscoverabilityHandler::new(phrases, config.dialogue.bot_name.clone()),
            email: EmailTaskStateMachine::new(client, phrases),
        }
    }

    /// Replace the intent classifier.
    pub fn with_classifier(mut self, classifier: impl IntentClassifier + 'static) -> Self {
        self.classifier = Box::new(classifier);
        self
    }

    /// Replace the small-talk and answer source.
    pub fn with_replies(mut self, replies: impl CannedReplies + 'static) -> Self {
        self.replies = Box::new(replies);
        self
    }

    /// Opening line shown before the first turn.
    pub fn greeting(&self) -> String {
        format!("Hello! I am {}, let's chat!", self.bot_name)
    }

    pub fn stack(&self) -> &DialogueStack {
        &self.stack
    }

    pub fn state(&self) -> TaskState {
        self.stack.top()
    }

    pub fn session(&self) -> Option<&MailSession> {
        self.session.as_ref()
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Handle one user message.
    pub async fn respond(&mut self, input: &str) -> TurnOutput {
        let input = input.trim();
        if let Some(text) = commands::intercept(input, &mut self.stack) {
            return TurnOutput::text(text);
        }

        let classification = self.classifier.classify(input, self.threshold);
        let top = self.stack.top();
        debug!(
            intent = ?classification.intent,
            subintent = %classification.subintent,
            score = classification.score,
            state = %top,
            "classified turn"
        );

        match top.group() {
            Some(TaskGroup::Identity) => return self.identity_turn(input, SubIntent::None, top),
            Some(TaskGroup::Discoverability) => return self.help_turn(input, SubIntent::None, top),
            _ => {}
        }

        if classification.intent == Intent::Email || top.group() == Some(TaskGroup::Email) {
            let turn = self
                .email
                .handle(top, classification.subintent, input, self.session.as_ref())
                .await;
            match turn {
                EmailTurn::Handled(reply) | EmailTurn::Failed(reply, _) => {
                    return self.apply_email(reply);
                }
                EmailTurn::Declined => debug!("email task declined the turn"),
            }
        }

        match classification.intent {
            Intent::IdentityManagement => self.identity_turn(input, classification.subintent, top),
            Intent::Discoverability => self.help_turn(input, classification.subintent, top),
            Intent::SmallTalk => {
                let raw = self
                    .replies
                    .small_talk(input)
                    .unwrap_or_else(|| SMALL_TALK_FALLBACK.to_string());
                let name = self.username.as_deref().unwrap_or(DEFAULT_USERNAME);
                TurnOutput::text(fill(&raw, &[("username", name)]))
            }
            Intent::QuestionAnswering => TurnOutput::text(
                self.replies
                    .answer(input)
                    .unwrap_or_else(|| ANSWER_FALLBACK.to_string()),
            ),
            Intent::Unrecognized => TurnOutput::text(UNRECOGNIZED),
            Intent::Email | Intent::SystemError => TurnOutput::text(SYSTEM_ERROR),
        }
    }

    fn identity_turn(&mut self, input: &str, subintent: SubIntent, top: TaskState) -> TurnOutput {
        let reply = self
            .identity
            .respond(input, self.username.as_deref(), subintent, top);
        if reply.username != self.username {
            debug!(known = reply.username.is_some(), "username changed");
        }
        self.username = reply.username;
        self.stack.apply(Some(reply.next_state), &reply.text);
        TurnOutput::text(reply.text)
    }

    fn help_turn(&mut self, input: &str, subintent: SubIntent, top: TaskState) -> TurnOutput {
        let (text, next) = self.help.respond(input, subintent, top);
        self.stack.apply(Some(next), &text);
        TurnOutput::text(text)
    }

    fn apply_email(&mut self, reply: EmailReply) -> TurnOutput {
        match reply.session {
            SessionUpdate::Keep => {}
            SessionUpdate::Replace(session) => {
                if self.session.as_ref().map(|s| &s.address) != Some(&session.address) {
                    info!(address = %session.address, "active mail session changed");
                }
                self.session = Some(session);
            }
            SessionUpdate::Clear => {
                info!("mail session cleared");
                self.session = None;
            }
        }
        self.stack.apply(reply.next_state, &reply.text);
        TurnOutput {
            text: reply.text,
            effect: reply.effect,
        }
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("stack", &self.stack)
            .field("session", &self.session.as_ref().map(|s| &s.address))
            .field("username", &self.username)
            .field("threshold", &self.threshold)
            .finish_non_exhaustive()
    }
}
