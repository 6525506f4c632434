//! Help and capability discovery.
//!
//! `general_help_loop` and `capabilities_help` are small menus: while one
//! is open, keywords in the reply pick a topic instead of the classifier.

use maila_types::task::TaskState;

use crate::classifier::SubIntent;
use crate::phrasebook::Phrasebook;
use crate::text::mentions_any;

const EXIT_FLOW: &[&str] = &[
    "Very well.",
    "Okay, sounds good.",
    "Alright, cancelling that.",
    "No problem. Let's drop it.",
    "Got it. Moving on.",
];
const GENERAL_LOOP_REPLY: &[&str] = &[
    "I can certainly tell you more, just specify what you would like me to elaborate on! Commands, identification, or my capabilities?",
    "Happy to help! What are you interested in: my commands, identification, or general capabilities?",
    "Sure thing. I can give details on my commands, how identification works, or what I'm capable of. What sounds good?",
];
const GENERAL_LOOP_ERROR: &[&str] = &[
    "I couldn't understand your reply, do you still need general help?",
    "Sorry, I didn't get that. Are you still looking for help?",
    "Hmm, I didn't follow. Do you still need assistance?",
];
const CAPABILITIES_LOOP_REPLY: &[&str] = &[
    "Alright, ask me about small talk, question and answering, identification, or email services for more information.",
    "Okay, I can give more info on: small talk, question answering, identification, or my email services. Which one?",
    "Sure. Feel free to ask for details on small talk, Q&A, identification, or the email services.",
];
const CAPABILITIES_LOOP_ERROR: &[&str] = &[
    "I couldn't understand your reply, do you still need info regarding my capabilities?",
    "Sorry, didn't catch that. Still want to know about my capabilities?",
    "I didn't follow. Are you still interested in my capabilities?",
];
const SMALL_TALK: &[&str] = &[
    "I'm happy to have small talk if that's what you would like, just talk to me!",
    "Yep, I can chat about all sorts of things. Feel free to start a conversation!",
    "Of course. I'm always ready for a friendly chat. What's on your mind?",
];
const QUESTION_ANSWERING: &[&str] = &[
    "I have a wide variety of knowledge! Ask me something and I'll do my best to answer it!",
    "I can answer all sorts of general knowledge questions. Try asking me something like 'what is the capital of France?'",
    "My question answering is pretty good. Ask me about facts, definitions, or people!",
];
const EMAIL: &[&str] = &[
    "I am capable of generating you a temporary email for use! As well as managing emails received at that address, if you wish to get started, ask me to generate you an email!",
    "My main function! I can create a temporary email for you. You can then use me to list, read, download, or delete emails. Just ask me to 'start a new session'!",
    "That's my specialty. I can create a disposable email address for you. From there, you can ask me to 'check my inbox', 'view email 1', and so on.",
];
const HELP_GENERAL: &[&str] = &[
    "What do you need help with? Would you like any further information on commands, identification, or my capabilities?",
    "I can help. Are you interested in my commands, identification, or my capabilities?",
    "How can I assist? I can provide info on commands, identification, or my general capabilities.",
];
const HELP_COMMANDS: &[&str] = &[
    "I have five universal commands:\nWHERE AM I: tells you what state the chatbot is currently in.\nGO BACK: rewinds to the last step.\nCANCEL: cancels any ongoing action in its entirety.\nREPEAT: repeats the prompt of the current task.\nWHAT NOW: gives you options on what to do next.",
    "My universal commands are:\n  - 'where am i?' (tells you the current state)\n  - 'go back' (goes back one step)\n  - 'cancel' (stops any task)\n  - 'repeat' (repeats the prompt of the current task)\n  - 'what now' (tells you what to do next based on the current state)",
];
const IDENTIFICATION: &[&str] = &[
    "If you tell me your name or tell me that you want to set your name, I am capable of remembering it. You can also change your name, or tell me to forget it entirely.",
    "I can remember your name! Just say 'my name is...' or 'call me...'. You can also ask me to 'change my name' or 'forget my name' later.",
    "Just tell me your name, and I'll remember it. You can also tell me to 'forget my name' to clear it.",
];
const CAPABILITIES: &[&str] = &[
    "I am capable of basic small talk, question and answering, identity management, and generating you a temporary email, would you like any further information on any of these?",
    "My main features include small talk, answering questions, managing your name, and providing temporary email services. Want to know more about any of them?",
    "I can do a few things: chat casually, answer general questions, remember who you are, and create temporary email addresses. Would you like details on any of those?",
];
const PURPOSE: &[&str] = &[
    "I am {bot}, a chatbot designed to help you set up a temporary email address in a conversational manner.",
    "My name is {bot}. I'm here to help you get and manage a temporary email address.",
    "I am {bot}. My purpose is to help you create and manage a temporary email inbox.",
];
const ERROR: &[&str] = &[
    "I unfortunately can't understand what you are asking for help with.",
    "Sorry, I'm not sure what you need help with.",
    "I don't have a help topic for that, my apologies.",
];

/// Answers help requests and runs the two help menus.
#[derive(Debug, Clone)]
pub struct DiscoverabilityHandler {
    phrases: Phrasebook,
    bot_name: String,
}

impl DiscoverabilityHandler {
    pub fn new(phrases: Phrasebook, bot_name: impl Into<String>) -> Self {
        Self {
            phrases,
            bot_name: bot_name.into(),
        }
    }

    /// Reply text and the state to be in afterwards.
    pub fn respond(&self, input: &str, subintent: SubIntent, state: TaskState) -> (String, TaskState) {
        let mut topic = subintent;

        match state {
            TaskState::GeneralHelpLoop => {
                if mentions_any(input, &["no", "nevermind"]) {
                    return self.say(EXIT_FLOW, TaskState::Normal);
                } else if mentions_any(input, &["commands", "command"]) {
                    topic = SubIntent::HelpCommands;
                } else if mentions_any(input, &["identification", "name", "identity"]) {
                    topic = SubIntent::Identification;
                } else if mentions_any(input, &["capable", "capabilities", "do", "features"]) {
                    topic = SubIntent::Capabilities;
                } else if mentions_any(input, &["yes", "affirmative"]) {
                    return self.say(GENERAL_LOOP_REPLY, TaskState::GeneralHelpLoop);
                } else {
                    return self.say(GENERAL_LOOP_ERROR, TaskState::GeneralHelpLoop);
                }
            }
            TaskState::CapabilitiesHelp => {
                if mentions_any(input, &["no", "nevermind"]) {
                    return self.say(EXIT_FLOW, TaskState::Normal);
                } else if mentions_any(input, &["yes", "ok", "alright"]) {
                    return self.say(CAPABILITIES_LOOP_REPLY, TaskState::CapabilitiesHelp);
                } else if mentions_any(
                    input,
                    &["small", "talk", "talking", "conversation", "chat", "chatting"],
                ) {
                    return self.say(SMALL_TALK, TaskState::Normal);
                } else if mentions_any(
                    input,
                    &["question", "questions", "answer", "answers", "answering", "q&a"],
                ) {
                    return self.say(QUESTION_ANSWERING, TaskState::Normal);
                } else if mentions_any(input, &["identification", "name", "identity"]) {
                    topic = SubIntent::Identification;
                } else if mentions_any(input, &["email", "emails"]) {
                    return self.say(EMAIL, TaskState::Normal);
                } else {
                    return self.say(CAPABILITIES_LOOP_ERROR, TaskState::CapabilitiesHelp);
                }
            }
            _ => {}
        }

        match topic {
            SubIntent::HelpGeneral => self.say(HELP_GENERAL, TaskState::GeneralHelpLoop),
            SubIntent::HelpCommands => self.say(HELP_COMMANDS, TaskState::Normal),
            SubIntent::Identification => self.say(IDENTIFICATION, TaskState::Normal),
            SubIntent::Capabilities => self.say(CAPABILITIES, TaskState::CapabilitiesHelp),
            SubIntent::Purpose => (
                self.phrases.render(PURPOSE, &[("bot", &self.bot_name)]),
                TaskState::Normal,
            ),
            SubIntent::HelpSmallTalk => self.say(SMALL_TALK, TaskState::Normal),
            SubIntent::HelpQa => self.say(QUESTION_ANSWERING, TaskState::Normal),
            SubIntent::HelpEmail => self.say(EMAIL, TaskState::Normal),
            _ => self.say(ERROR, TaskState::Normal),
        }
    }

    fn say(&self, options: &[&str], next: TaskState) -> (String, TaskState) {
        (self.phrases.pick(options).to_string(), next)
    }
}
