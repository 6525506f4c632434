//! Intent classification.
//!
//! [`IntentClassifier`] is the seam; [`KeywordClassifier`] is the built-in
//! implementation. It scores the input against a static table of example
//! phrases, one group per (intent, sub-intent) pair, and takes the best
//! scoring group. Ties go to the group listed first, so more specific
//! groups sit higher in the table.
//!
//! Scores are the cosine overlap between the input's content terms and an
//! example phrase's terms. Digits and session ids are not content terms,
//! which lets "delete 1-3" classify exactly like "delete".

use std::fmt;

use crate::text::{content_terms, overlap_score, tokens};

/// Top-level intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    Email,
    IdentityManagement,
    Discoverability,
    SmallTalk,
    QuestionAnswering,
    /// Nothing scored above the threshold.
    Unrecognized,
    /// The classifier could not process the input at all.
    SystemError,
}

/// Fine-grained intent within a family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubIntent {
    None,
    // Email
    StartSession,
    RestoreSession,
    ListEmails,
    UpdateInbox,
    ViewEmail,
    DownloadEmail,
    DeleteEmail,
    EndSession,
    ManageSession,
    ExitLoop,
    // Identity (Identification is shared with help)
    Identification,
    NameDirect,
    NameChange,
    NameDelete,
    // Help
    HelpGeneral,
    HelpCommands,
    Capabilities,
    Purpose,
    HelpSmallTalk,
    HelpQa,
    HelpEmail,
}

impl SubIntent {
    /// Stable snake_case tag, used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::StartSession => "start_session",
            Self::RestoreSession => "restore_session",
            Self::ListEmails => "list_emails",
            Self::UpdateInbox => "update_inbox",
            Self::ViewEmail => "view_email",
            Self::DownloadEmail => "download_email",
            Self::DeleteEmail => "delete_email",
            Self::EndSession => "end_session",
            Self::ManageSession => "manage_session",
            Self::ExitLoop => "exit_loop",
            Self::Identification => "identification",
            Self::NameDirect => "name_direct",
            Self::NameChange => "name_change",
            Self::NameDelete => "name_delete",
            Self::HelpGeneral => "help_general",
            Self::HelpCommands => "help_commands",
            Self::Capabilities => "capabilities",
            Self::Purpose => "purpose",
            Self::HelpSmallTalk => "help_small_talk",
            Self::HelpQa => "help_qa",
            Self::HelpEmail => "help_email",
        }
    }

    /// Sub-intents that only make sense with a live mail session.
    pub fn needs_mail_session(&self) -> bool {
        matches!(
            self,
            Self::ListEmails
                | Self::UpdateInbox
                | Self::ViewEmail
                | Self::DownloadEmail
                | Self::DeleteEmail
                | Self::EndSession
                | Self::ManageSession
                | Self::ExitLoop
        )
    }
}

impl fmt::Display for SubIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of a classifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub intent: Intent,
    pub subintent: SubIntent,
    /// Match strength in `[0, 1]`.
    pub score: f32,
}

impl Classification {
    pub fn unrecognized(score: f32) -> Self {
        Self {
            intent: Intent::Unrecognized,
            subintent: SubIntent::None,
            score,
        }
    }

    pub fn system_error() -> Self {
        Self {
            intent: Intent::SystemError,
            subintent: SubIntent::None,
            score: 0.0,
        }
    }
}

/// Maps user text to an intent.
pub trait IntentClassifier: Send + Sync {
    /// Classify `text`. Results scoring below `threshold` are
    /// [`Intent::Unrecognized`].
    fn classify(&self, text: &str, threshold: f32) -> Classification;
}

/// A group of example phrases for one (intent, sub-intent) pair.
struct PhrasePattern {
    phrases: &'static [&'static str],
    intent: Intent,
    subintent: SubIntent,
}

/// Example phrases in priority order (earlier wins ties).
const PATTERNS: &[PhrasePattern] = &[
    // Email
    PhrasePattern {
        phrases: &[
            "start a new session",
            "start session",
            "new session",
            "create email",
            "create a temporary email",
            "generate email",
            "new email address",
            "give me an email",
            "make me an email",
            "temporary email",
        ],
        intent: Intent::Email,
        subintent: SubIntent::StartSession,
    },
    PhrasePattern {
        phrases: &[
            "restore session",
            "restore my session",
            "load session",
            "resume session",
            "my session id is",
            "use session id",
            "continue my old session",
        ],
        intent: Intent::Email,
        subintent: SubIntent::RestoreSession,
    },
    PhrasePattern {
        phrases: &[
            "end session",
            "end my session",
            "close session",
            "delete session",
            "destroy session",
            "stop session",
            "forget my email address",
        ],
        intent: Intent::Email,
        subintent: SubIntent::EndSession,
    },
    PhrasePattern {
        phrases: &[
            "list emails",
            "list my emails",
            "show my emails",
            "show inbox",
            "check my inbox",
            "check email",
            "what emails do i have",
            "open inbox",
            "my inbox",
        ],
        intent: Intent::Email,
        subintent: SubIntent::ListEmails,
    },
    PhrasePattern {
        phrases: &[
            "update inbox",
            "refresh inbox",
            "refresh",
            "reload inbox",
            "any new emails",
            "check for new mail",
        ],
        intent: Intent::Email,
        subintent: SubIntent::UpdateInbox,
    },
    PhrasePattern {
        phrases: &[
            "view email",
            "read email",
            "open email",
            "show email",
            "view",
            "read",
        ],
        intent: Intent::Email,
        subintent: SubIntent::ViewEmail,
    },
    PhrasePattern {
        phrases: &["download email", "download", "save email", "save"],
        intent: Intent::Email,
        subintent: SubIntent::DownloadEmail,
    },
    PhrasePattern {
        phrases: &[
            "delete email",
            "delete",
            "remove email",
            "trash email",
            "erase email",
        ],
        intent: Intent::Email,
        subintent: SubIntent::DeleteEmail,
    },
    PhrasePattern {
        phrases: &[
            "manage session",
            "manage my email",
            "email session",
            "session menu",
            "email options",
        ],
        intent: Intent::Email,
        subintent: SubIntent::ManageSession,
    },
    PhrasePattern {
        phrases: &[
            "exit email",
            "close email",
            "done with email",
            "leave email",
            "exit",
            "quit",
        ],
        intent: Intent::Email,
        subintent: SubIntent::ExitLoop,
    },
    // Identity
    PhrasePattern {
        phrases: &[
            "what is my name",
            "who am i",
            "do you know my name",
            "do you know who i am",
            "say my name",
            "tell me my name",
        ],
        intent: Intent::IdentityManagement,
        subintent: SubIntent::Identification,
    },
    PhrasePattern {
        phrases: &["my name is", "call me", "you can call me", "i am called", "i go by"],
        intent: Intent::IdentityManagement,
        subintent: SubIntent::NameDirect,
    },
    PhrasePattern {
        phrases: &[
            "change my name",
            "update my name",
            "i want to change my name",
            "rename me",
            "set my name",
            "set name",
        ],
        intent: Intent::IdentityManagement,
        subintent: SubIntent::NameChange,
    },
    PhrasePattern {
        phrases: &[
            "forget my name",
            "delete my name",
            "remove my name",
            "clear my name",
        ],
        intent: Intent::IdentityManagement,
        subintent: SubIntent::NameDelete,
    },
    // Help
    PhrasePattern {
        phrases: &["help", "i need help", "can you help me", "help me", "assist me"],
        intent: Intent::Discoverability,
        subintent: SubIntent::HelpGeneral,
    },
    PhrasePattern {
        phrases: &[
            "commands",
            "what commands",
            "list commands",
            "universal commands",
            "what can i say",
        ],
        intent: Intent::Discoverability,
        subintent: SubIntent::HelpCommands,
    },
    PhrasePattern {
        phrases: &[
            "what can you do",
            "capabilities",
            "what are your features",
            "features",
            "what are you capable of",
        ],
        intent: Intent::Discoverability,
        subintent: SubIntent::Capabilities,
    },
    PhrasePattern {
        phrases: &[
            "who are you",
            "what are you",
            "what is your purpose",
            "why do you exist",
            "what is your name",
        ],
        intent: Intent::Discoverability,
        subintent: SubIntent::Purpose,
    },
    PhrasePattern {
        phrases: &["help with small talk", "how does small talk work"],
        intent: Intent::Discoverability,
        subintent: SubIntent::HelpSmallTalk,
    },
    PhrasePattern {
        phrases: &["help with questions", "how does question answering work"],
        intent: Intent::Discoverability,
        subintent: SubIntent::HelpQa,
    },
    PhrasePattern {
        phrases: &[
            "help with email",
            "email help",
            "how does the email work",
            "what is a temporary email",
        ],
        intent: Intent::Discoverability,
        subintent: SubIntent::HelpEmail,
    },
    PhrasePattern {
        phrases: &[
            "how does identification work",
            "identification help",
            "help with my name",
        ],
        intent: Intent::Discoverability,
        subintent: SubIntent::Identification,
    },
    // Small talk
    PhrasePattern {
        phrases: &[
            "hello",
            "hi",
            "hey",
            "good morning",
            "good evening",
            "how are you",
            "how is your day",
            "what's up",
            "thank you",
            "thanks",
            "bye",
            "goodbye",
            "see you later",
            "nice to meet you",
            "tell me a joke",
            "i am fine",
        ],
        intent: Intent::SmallTalk,
        subintent: SubIntent::None,
    },
    // Question answering
    PhrasePattern {
        phrases: &[
            "what is",
            "what is the",
            "who is",
            "who was",
            "who invented",
            "who wrote",
            "where is",
            "when did",
            "how many",
            "what does",
            "why is",
        ],
        intent: Intent::QuestionAnswering,
        subintent: SubIntent::None,
    },
];

/// Phrase-table classifier.
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub fn new() -> Self {
        Self
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl IntentClassifier for KeywordClassifier {
    fn classify(&self, text: &str, threshold: f32) -> Classification {
        if tokens(text).is_empty() {
            return Classification::system_error();
        }
        let terms = content_terms(text);
        if terms.is_empty() {
            return Classification::unrecognized(0.0);
        }

        let mut best: Option<(&PhrasePattern, f32)> = None;
        for pattern in PATTERNS {
            let score = pattern
                .phrases
                .iter()
                .map(|p| overlap_score(&terms, &content_terms(p)))
                .fold(0.0_f32, f32::max);
            if best.is_none_or(|(_, s)| score > s) {
                best = Some((pattern, score));
            }
        }

        match best {
            Some((pattern, score)) if score >= threshold && score > 0.0 => Classification {
                intent: pattern.intent,
                subintent: pattern.subintent,
                score,
            },
            Some((_, score)) => Classification::unrecognized(score),
            None => Classification::unrecognized(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(text: &str) -> Classification {
        KeywordClassifier::new().classify(text, 0.2)
    }

    fn sub(text: &str) -> SubIntent {
        classify(text).subintent
    }

    #[test]
    fn email_subintents() {
        assert_eq!(sub("start a new session"), SubIntent::StartSession);
        assert_eq!(sub("Can you give me an email?"), SubIntent::StartSession);
        assert_eq!(sub("list my emails"), SubIntent::ListEmails);
        assert_eq!(sub("refresh inbox"), SubIntent::UpdateInbox);
        assert_eq!(sub("view email 2"), SubIntent::ViewEmail);
        assert_eq!(sub("show email 3"), SubIntent::ViewEmail);
        assert_eq!(sub("download 1, 3"), SubIntent::DownloadEmail);
        assert_eq!(sub("delete 1-2"), SubIntent::DeleteEmail);
        assert_eq!(sub("delete all"), SubIntent::DeleteEmail);
        assert_eq!(sub("end session"), SubIntent::EndSession);
        assert_eq!(sub("delete session"), SubIntent::EndSession);
        assert_eq!(sub("manage session"), SubIntent::ManageSession);
        assert_eq!(sub("exit"), SubIntent::ExitLoop);
    }

    #[test]
    fn restore_ignores_the_token_itself() {
        let c = classify("restore session abcdefghijklmnopqrstuvwxyz");
        assert_eq!(c.intent, Intent::Email);
        assert_eq!(c.subintent, SubIntent::RestoreSession);
    }

    #[test]
    fn identity_subintents() {
        assert_eq!(sub("what is my name"), SubIntent::Identification);
        assert_eq!(sub("my name is alice"), SubIntent::NameDirect);
        assert_eq!(sub("call me bob"), SubIntent::NameDirect);
        assert_eq!(sub("change my name"), SubIntent::NameChange);
        assert_eq!(sub("forget my name"), SubIntent::NameDelete);
        assert_eq!(classify("forget my name").intent, Intent::IdentityManagement);
    }

    #[test]
    fn help_subintents() {
        assert_eq!(sub("help"), SubIntent::HelpGeneral);
        assert_eq!(sub("what can you do"), SubIntent::Capabilities);
        assert_eq!(sub("who are you"), SubIntent::Purpose);
        assert_eq!(sub("help with email"), SubIntent::HelpEmail);
        assert_eq!(classify("help").intent, Intent::Discoverability);
    }

    #[test]
    fn small_talk_and_questions() {
        assert_eq!(classify("hello").intent, Intent::SmallTalk);
        assert_eq!(classify("thanks!").intent, Intent::SmallTalk);
        assert_eq!(
            classify("what is the capital of france").intent,
            Intent::QuestionAnswering
        );
    }

    #[test]
    fn bare_number_is_unrecognized() {
        let c = classify("2");
        assert_eq!(c.intent, Intent::Unrecognized);
        assert_eq!(c.subintent, SubIntent::None);
    }

    #[test]
    fn punctuation_only_is_system_error() {
        assert_eq!(classify("?!").intent, Intent::SystemError);
        assert_eq!(classify("   ").intent, Intent::SystemError);
    }

    #[test]
    fn gibberish_is_unrecognized() {
        assert_eq!(classify("zxqv blorf").intent, Intent::Unrecognized);
    }

    #[test]
    fn yes_and_no_carry_no_email_subintent() {
        assert!(!sub("yes").needs_mail_session());
        assert!(!sub("no").needs_mail_session());
        assert_ne!(sub("yes"), SubIntent::StartSession);
    }

    #[test]
    fn threshold_is_respected() {
        let c = KeywordClassifier::new().classify("delete the thing over there now", 0.9);
        assert_eq!(c.intent, Intent::Unrecognized);
        assert!(c.score > 0.0);
    }
}
