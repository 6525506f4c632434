//! Remembering the user's name.
//!
//! Two states belong to this task: `awaiting_name_confirm` (we offered to
//! learn the name and wait for yes/no) and `awaiting_name` (the next input
//! *is* the name). Outside those states the classified sub-intent decides.

use tracing::debug;

use maila_types::task::TaskState;

use crate::classifier::SubIntent;
use crate::phrasebook::Phrasebook;
use crate::text::{capitalize, mentions_any, tokens};

/// Words that show up around a name but never are one.
const NAME_IGNORE: &[&str] = &[
    "call", "name", "my", "to", "please", "yes", "is", "i", "am", "know", "who", "tell", "change",
    "want", "wish", "rename", "switch", "update", "remember", "called", "go", "by",
];

/// Common English function words.
const STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "all", "also", "an", "and", "any", "are", "as", "at",
    "be", "because", "been", "before", "being", "both", "but", "can", "could", "did", "do",
    "does", "doing", "for", "from", "had", "has", "have", "having", "he", "her", "here", "him",
    "his", "how", "if", "in", "into", "it", "its", "just", "me", "mine", "more", "myself", "no",
    "nor", "not", "now", "of", "off", "on", "once", "only", "or", "our", "ours", "out", "own",
    "really", "she", "should", "so", "some", "such", "than", "that", "the", "their", "them",
    "then", "there", "these", "they", "this", "those", "through", "too", "under", "until", "up",
    "very", "was", "we", "were", "what", "when", "where", "which", "while", "whom", "why",
    "will", "with", "would", "you", "your", "yours",
];

const CONFIRM_NAME_CHANGE: &[&str] = &[
    "Very well! Simply tell me your name please!",
    "Okay, I'm ready. What would you like me to call you?",
    "Sure thing. Just type your name.",
];
const CANCEL_FLOW: &[&str] = &["Alright then!", "Okay, no problem.", "Got it, cancelled."];
const CONFIRM_NAME_CHANGE_ERROR: &[&str] = &[
    "I'm sorry, did you want to set your name?",
    "I didn't quite catch that. Was that a 'yes' or 'no'?",
    "My apologies, I'm not sure if you want to proceed. Please say 'yes' or 'no'.",
];
const SET_NAME_SUCCESS: &[&str] = &[
    "Got it, you are {new_name}!",
    "Pleased to meet you, {new_name}!",
    "Okay, I'll call you {new_name} from now on.",
];
const SET_NAME_ERROR: &[&str] = &[
    "I didn't quite get that, please type in your name below!",
    "Sorry, I couldn't understand that. Please just type your name.",
    "I'm afraid I didn't get a name. Could you try again?",
];
const NAME_KNOWN: &[&str] = &[
    "You are {username}.",
    "I have you down as {username}.",
    "You told me your name is {username}.",
];
const NAME_UNKNOWN: &[&str] = &[
    "I don't think you've told me your name yet, would you like to set it?",
    "I don't have a name for you. Would you like to tell me what to call you?",
    "You haven't told me your name. Want to set it now?",
];
const DIRECT_CHANGE: &[&str] = &[
    "{username}, you want to be called {new_name} now? Very well!",
    "Okay, {username}. I've updated your name to {new_name}.",
    "Got it. I'll call you {new_name} instead of {username} from now on.",
];
const DIRECT_NEW: &[&str] = &[
    "Nice to meet you, {new_name}. I'll remember you.",
    "Got it. I'll remember that your name is {new_name}.",
    "{new_name}, is it? A pleasure to meet you!",
];
const DIRECT_ERROR: &[&str] = &[
    "I couldn't quite catch your name there.",
    "Sorry, I heard you, but I wasn't able to extract a name.",
    "I'm not sure what name you'd like me to use.",
];
const PROMPT_FOR_NAME: &[&str] = &[
    "Very well! Type in your name below!",
    "Okay, what is the new name you'd like me to use?",
    "Sure, just let me know what your new name is.",
];
const DELETE_SUCCESS: &[&str] = &[
    "I've forgotten your name, {username}.",
    "Okay {username}, I've cleared your name from my memory.",
    "Alright, I no longer have a name stored for you.",
];
const DELETE_ERROR: &[&str] = &[
    "Unfortunately, I can't forget a name that I don't know.",
    "I don't have a name for you, so there's nothing for me to forget.",
    "I'd be happy to, but I don't know your name in the first place.",
];
const UNRECOGNIZED: &str = "I'm not sure what you mean about your name.";

/// Result of one identity turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityReply {
    pub text: String,
    /// The name to remember after this turn (`None` = no name).
    pub username: Option<String>,
    pub next_state: TaskState,
}

/// Handles name set/get/change/forget.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityHandler {
    phrases: Phrasebook,
}

impl IdentityHandler {
    pub fn new(phrases: Phrasebook) -> Self {
        Self { phrases }
    }

    pub fn respond(
        &self,
        input: &str,
        username: Option<&str>,
        subintent: SubIntent,
        state: TaskState,
    ) -> IdentityReply {
        let input = input.trim();
        let keep = username.map(str::to_string);
        let reply = |text: String, username: Option<String>, next_state| IdentityReply {
            text,
            username,
            next_state,
        };

        match state {
            TaskState::AwaitingNameConfirm => {
                return if mentions_any(input, &["yes", "ok", "okay", "alright", "sure"]) {
                    reply(self.say(CONFIRM_NAME_CHANGE), keep, TaskState::AwaitingName)
                } else if mentions_any(input, &["no", "nevermind"]) {
                    reply(self.say(CANCEL_FLOW), keep, TaskState::Normal)
                } else {
                    reply(
                        self.say(CONFIRM_NAME_CHANGE_ERROR),
                        keep,
                        TaskState::AwaitingNameConfirm,
                    )
                };
            }
            TaskState::AwaitingName => {
                return if input.is_empty() {
                    reply(self.say(SET_NAME_ERROR), keep, TaskState::AwaitingName)
                } else {
                    let name = capitalize(input);
                    debug!("name set from prompt");
                    let text = self.phrases.render(SET_NAME_SUCCESS, &[("new_name", &name)]);
                    reply(text, Some(name), TaskState::Normal)
                };
            }
            _ => {}
        }

        match (subintent, username) {
            (SubIntent::Identification, Some(name)) => reply(
                self.phrases.render(NAME_KNOWN, &[("username", name)]),
                keep,
                TaskState::Normal,
            ),
            (SubIntent::Identification, None) => {
                reply(self.say(NAME_UNKNOWN), keep, TaskState::AwaitingNameConfirm)
            }
            (SubIntent::NameDirect, _) => match (extract_name(input), username) {
                (Some(new_name), Some(old)) => {
                    let text = self
                        .phrases
                        .render(DIRECT_CHANGE, &[("username", old), ("new_name", &new_name)]);
                    reply(text, Some(new_name), TaskState::Normal)
                }
                (Some(new_name), None) => {
                    let text = self.phrases.render(DIRECT_NEW, &[("new_name", &new_name)]);
                    reply(text, Some(new_name), TaskState::Normal)
                }
                (None, _) => reply(self.say(DIRECT_ERROR), keep, TaskState::Normal),
            },
            (SubIntent::NameChange, _) => {
                reply(self.say(PROMPT_FOR_NAME), keep, TaskState::AwaitingName)
            }
            (SubIntent::NameDelete, Some(name)) => reply(
                self.phrases.render(DELETE_SUCCESS, &[("username", name)]),
                None,
                TaskState::Normal,
            ),
            (SubIntent::NameDelete, None) => {
                reply(self.say(DELETE_ERROR), None, TaskState::Normal)
            }
            _ => reply(UNRECOGNIZED.to_string(), keep, TaskState::Normal),
        }
    }

    fn say(&self, options: &[&str]) -> String {
        self.phrases.pick(options).to_string()
    }
}

/// The last word that is neither filler nor a function word, capitalized.
pub fn extract_name(input: &str) -> Option<String> {
    tokens(input)
        .into_iter()
        .filter(|t| t.chars().all(char::is_alphabetic))
        .filter(|t| !NAME_IGNORE.contains(&t.as_str()) && !STOPWORDS.contains(&t.as_str()))
        .last()
        .map(|t| capitalize(&t))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handler() -> IdentityHandler {
        IdentityHandler::new(Phrasebook::deterministic())
    }

    #[test]
    fn extract_name_skips_filler() {
        assert_eq!(extract_name("my name is alice").as_deref(), Some("Alice"));
        assert_eq!(extract_name("please call me BOB").as_deref(), Some("Bob"));
        assert_eq!(extract_name("I go by sam").as_deref(), Some("Sam"));
        assert_eq!(extract_name("my name is").as_deref(), None);
        assert_eq!(extract_name("call me 42").as_deref(), None);
    }

    #[test]
    fn identification_known_and_unknown() {
        let h = handler();
        let known = h.respond("who am i", Some("Ada"), SubIntent::Identification, TaskState::Normal);
        assert_eq!(known.text, "You are Ada.");
        assert_eq!(known.next_state, TaskState::Normal);

        let unknown = h.respond("who am i", None, SubIntent::Identification, TaskState::Normal);
        assert_eq!(unknown.next_state, TaskState::AwaitingNameConfirm);
        assert!(unknown.username.is_none());
    }

    #[test]
    fn confirm_then_set_name() {
        let h = handler();
        let r = h.respond("yes", None, SubIntent::None, TaskState::AwaitingNameConfirm);
        assert_eq!(r.next_state, TaskState::AwaitingName);

        let r = h.respond("  grace  ", None, SubIntent::None, TaskState::AwaitingName);
        assert_eq!(r.username.as_deref(), Some("Grace"));
        assert_eq!(r.text, "Got it, you are Grace!");
        assert_eq!(r.next_state, TaskState::Normal);
    }

    #[test]
    fn confirm_declined_and_unclear() {
        let h = handler();
        let r = h.respond("no thanks", None, SubIntent::None, TaskState::AwaitingNameConfirm);
        assert_eq!(r.next_state, TaskState::Normal);
        assert_eq!(r.text, "Alright then!");

        let r = h.respond("I know", None, SubIntent::None, TaskState::AwaitingNameConfirm);
        assert_eq!(r.next_state, TaskState::AwaitingNameConfirm);
    }

    #[test]
    fn empty_name_reprompts() {
        let r = handler().respond("   ", None, SubIntent::None, TaskState::AwaitingName);
        assert_eq!(r.next_state, TaskState::AwaitingName);
        assert!(r.username.is_none());
    }

    #[test]
    fn name_direct_new_and_change() {
        let h = handler();
        let r = h.respond("my name is linus", None, SubIntent::NameDirect, TaskState::Normal);
        assert_eq!(r.username.as_deref(), Some("Linus"));
        assert_eq!(r.text, "Nice to meet you, Linus. I'll remember you.");

        let r = h.respond("call me tux", Some("Linus"), SubIntent::NameDirect, TaskState::Normal);
        assert_eq!(r.username.as_deref(), Some("Tux"));
        assert_eq!(r.text, "Linus, you want to be called Tux now? Very well!");
    }

    #[test]
    fn name_direct_without_name_keeps_old() {
        let r = handler().respond("my name is", Some("Ada"), SubIntent::NameDirect, TaskState::Normal);
        assert_eq!(r.username.as_deref(), Some("Ada"));
        assert_eq!(r.text, "I couldn't quite catch your name there.");
    }

    #[test]
    fn change_and_delete() {
        let h = handler();
        let r = h.respond("change my name", Some("Ada"), SubIntent::NameChange, TaskState::Normal);
        assert_eq!(r.next_state, TaskState::AwaitingName);

        let r = h.respond("forget my name", Some("Ada"), SubIntent::NameDelete, TaskState::Normal);
        assert!(r.username.is_none());
        assert_eq!(r.text, "I've forgotten your name, Ada.");

        let r = h.respond("forget my name", None, SubIntent::NameDelete, TaskState::Normal);
        assert_eq!(r.text, "Unfortunately, I can't forget a name that I don't know.");
    }

    #[test]
    fn other_subintent_is_unrecognized() {
        let r = handler().respond("hmm", Some("Ada"), SubIntent::None, TaskState::Normal);
        assert_eq!(r.text, UNRECOGNIZED);
        assert_eq!(r.username.as_deref(), Some("Ada"));
    }
}
