//! Canned small-talk and question-answering replies.
//!
//! Each table row pairs an example prompt with one or more answers
//! separated by `|`. A query is matched against the prompts with the same
//! term-overlap score the classifier uses; the best row wins if it clears
//! the table's threshold. Answers may contain `{username}`, which the
//! orchestrator fills in.

use crate::phrasebook::Phrasebook;
use crate::text::{content_terms, overlap_score};

/// Minimum score for a small-talk row to match.
pub const SMALL_TALK_THRESHOLD: f32 = 0.4;
/// Minimum score for a question row to match. Facts need a closer match.
pub const ANSWER_THRESHOLD: f32 = 0.65;

/// Source of canned replies.
pub trait CannedReplies: Send + Sync {
    /// A conversational reply, or `None` if nothing fits.
    fn small_talk(&self, query: &str) -> Option<String>;

    /// An answer to a factual question, or `None` if unknown.
    fn answer(&self, query: &str) -> Option<String>;
}

const SMALL_TALK: &[(&str, &str)] = &[
    ("hello", "Hello {username}!|Hi there, {username}!|Hey {username}, good to see you."),
    ("hi", "Hi {username}!|Hello there!|Hey!"),
    ("hey", "Hey {username}!|Hi!|Hello!"),
    ("good morning", "Good morning, {username}!|Morning! I hope you slept well."),
    ("good evening", "Good evening, {username}!|Evening! How was your day?"),
    ("how are you", "I'm doing great, thanks for asking!|All systems running smoothly. How about you?"),
    ("how is your day", "My day is going well, thank you!|Pretty good so far. How about yours?"),
    ("what's up", "Not much, just waiting to help you out!|Just sorting some emails. What's up with you?"),
    ("i am fine", "Glad to hear it, {username}!|That's great to hear."),
    ("thank you", "You're welcome, {username}!|Happy to help!|Any time."),
    ("thanks", "No problem!|You're welcome!|Glad I could help."),
    ("bye", "Goodbye, {username}!|See you later!|Take care!"),
    ("goodbye", "Goodbye, {username}! Come back any time.|Bye! Take care."),
    ("see you later", "See you later, {username}!|Catch you later!"),
    ("nice to meet you", "Nice to meet you too, {username}!|The pleasure is mine."),
    (
        "tell me a joke",
        "Why did the email go to therapy? It had too many attachments.|I'd tell you a UDP joke, but you might not get it.",
    ),
];

const ANSWERS: &[(&str, &str)] = &[
    ("what is the capital of france", "The capital of France is Paris."),
    ("what is the capital of england", "The capital of England is London."),
    ("what is the capital of japan", "The capital of Japan is Tokyo."),
    ("what is the largest planet", "Jupiter is the largest planet in our solar system."),
    ("how many continents are there", "There are seven continents."),
    ("how many days are in a year", "A year has 365 days, or 366 in a leap year."),
    ("who wrote romeo and juliet", "Romeo and Juliet was written by William Shakespeare."),
    ("who invented the telephone", "Alexander Graham Bell is credited with inventing the telephone."),
    ("who invented the world wide web", "Tim Berners-Lee invented the World Wide Web in 1989."),
    ("what is email", "Email is a method of exchanging digital messages between people over a network."),
    (
        "what is a disposable email",
        "A disposable email is a temporary address you can use once and throw away, keeping your real inbox free of spam.",
    ),
    ("what is the boiling point of water", "Water boils at 100 degrees Celsius at sea level."),
    ("when did world war two end", "World War II ended in 1945."),
    ("where is mount everest", "Mount Everest is on the border between Nepal and China."),
];

/// Built-in reply tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticReplies {
    phrases: Phrasebook,
}

impl StaticReplies {
    pub fn new(phrases: Phrasebook) -> Self {
        Self { phrases }
    }

    fn lookup(&self, table: &[(&str, &str)], query: &str, threshold: f32) -> Option<String> {
        let terms = content_terms(query);
        if terms.is_empty() {
            return None;
        }
        let (answers, score) = table
            .iter()
            .map(|(prompt, answers)| (*answers, overlap_score(&terms, &content_terms(prompt))))
            .fold(None, |best: Option<(&str, f32)>, (answers, score)| match best {
                Some((_, best_score)) if best_score >= score => best,
                _ => Some((answers, score)),
            })?;
        if score < threshold || score == 0.0 {
            return None;
        }
        let options: Vec<&str> = answers.split('|').map(str::trim).collect();
        Some(self.phrases.pick(&options).to_string())
    }
}

impl CannedReplies for StaticReplies {
    fn small_talk(&self, query: &str) -> Option<String> {
        self.lookup(SMALL_TALK, query, SMALL_TALK_THRESHOLD)
    }

    fn answer(&self, query: &str) -> Option<String> {
        self.lookup(ANSWERS, query, ANSWER_THRESHOLD)
    }
}
