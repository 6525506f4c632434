//! Cached inbox for a disposable mail session.
//!
//! The [`Inbox`] keeps entries deduplicated by `mail_id` and ordered
//! strictly newest-first by timestamp, ties kept in arrival order. Pages
//! from the remote are merged in, never substituted: an entry that is
//! missing from a partial page stays cached until a delete confirms it gone.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One message header as listed by the remote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboxEntry {
    /// Remote-assigned identifier, stable for the life of the message.
    pub mail_id: String,
    pub from: String,
    pub subject: String,
    /// Short plain-text preview, when the remote provides one.
    #[serde(default)]
    pub excerpt: String,
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
    #[serde(default)]
    pub read: bool,
}

impl InboxEntry {
    /// Create an unread entry with an empty excerpt.
    pub fn new(
        mail_id: impl Into<String>,
        from: impl Into<String>,
        subject: impl Into<String>,
        timestamp: i64,
    ) -> Self {
        Self {
            mail_id: mail_id.into(),
            from: from.into(),
            subject: subject.into(),
            excerpt: String::new(),
            timestamp,
            read: false,
        }
    }

    /// The receive time, if the timestamp is representable.
    pub fn received_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }
}

/// Ordered, deduplicated list of cached inbox entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inbox {
    entries: Vec<InboxEntry>,
}

impl Inbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an inbox from an arbitrary page, applying the merge policy.
    pub fn from_entries(entries: impl IntoIterator<Item = InboxEntry>) -> Self {
        let mut inbox = Self::new();
        inbox.merge(entries);
        inbox
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in display order (newest first).
    pub fn iter(&self) -> std::slice::Iter<'_, InboxEntry> {
        self.entries.iter()
    }

    /// Look up an entry by its 1-based display position.
    pub fn at_position(&self, position: usize) -> Option<&InboxEntry> {
        position.checked_sub(1).and_then(|i| self.entries.get(i))
    }

    /// Look up an entry by mail id.
    pub fn get(&self, mail_id: &str) -> Option<&InboxEntry> {
        self.entries.iter().find(|e| e.mail_id == mail_id)
    }

    pub fn contains(&self, mail_id: &str) -> bool {
        self.get(mail_id).is_some()
    }

    /// Every cached mail id, in display order.
    pub fn mail_ids(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.mail_id.clone()).collect()
    }

    /// Merge a page of entries into the cache.
    ///
    /// Unknown ids are appended in page order, known ids keep their cached
    /// entry, and the result is stably re-sorted newest-first. Returns the
    /// number of entries added. Merging the same page twice is a no-op.
    pub fn merge(&mut self, page: impl IntoIterator<Item = InboxEntry>) -> usize {
        let mut known: HashSet<String> = self.entries.iter().map(|e| e.mail_id.clone()).collect();
        let before = self.entries.len();

        for entry in page {
            if known.insert(entry.mail_id.clone()) {
                self.entries.push(entry);
            }
        }

        self.entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        self.entries.len() - before
    }

    /// Remove every entry whose id is in `mail_ids`. Returns how many were removed.
    pub fn remove_ids<S: AsRef<str>>(&mut self, mail_ids: &[S]) -> usize {
        let doomed: HashSet<&str> = mail_ids.iter().map(|s| s.as_ref()).collect();
        let before = self.entries.len();
        self.entries.retain(|e| !doomed.contains(e.mail_id.as_str()));
        before - self.entries.len()
    }

    /// Flag an entry as read. Returns `false` if the id is not cached.
    pub fn mark_read(&mut self, mail_id: &str) -> bool {
        match self.entries.iter_mut().find(|e| e.mail_id == mail_id) {
            Some(entry) => {
                entry.read = true;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<'a> IntoIterator for &'a Inbox {
    type Item = &'a InboxEntry;
    type IntoIter = std::slice::Iter<'a, InboxEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
