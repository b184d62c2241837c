use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{MessageId, ThreadId, UNREAD_TAG};

/// Unique, unordered tags. Backed by a `BTreeSet` so display order is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet(BTreeSet<String>);

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains(tag)
    }

    /// Returns `true` if the tag was not present before.
    pub fn insert(&mut self, tag: impl Into<String>) -> bool {
        self.0.insert(tag.into())
    }

    /// Returns `true` if the tag was present.
    pub fn remove(&mut self, tag: &str) -> bool {
        self.0.remove(tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// One row of a thread search: what the backend reports about a thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadSummary {
    pub id: ThreadId,
    #[serde(default)]
    pub tags: TagSet,
    pub matched_messages: u32,
    pub total_messages: u32,
    /// Unix timestamp (seconds) of the newest message.
    pub newest_date: i64,
    pub authors: String,
    pub subject: String,
}

impl ThreadSummary {
    pub fn is_unread(&self) -> bool {
        self.tags.contains(UNREAD_TAG)
    }

    /// Every message in the thread matched the query.
    pub fn is_complete_match(&self) -> bool {
        self.matched_messages == self.total_messages
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub from: String,
    /// Unix timestamp (seconds).
    pub date: i64,
    pub subject: String,
    #[serde(default)]
    pub tags: TagSet,
    #[serde(default)]
    pub body: Vec<String>,
}

impl Message {
    pub fn is_unread(&self) -> bool {
        self.tags.contains(UNREAD_TAG)
    }
}

/// Order in which a search yields threads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    OldestFirst,
    #[default]
    NewestFirst,
    MessageId,
    Unsorted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_set_is_unique_and_sorted() {
        let mut tags: TagSet = ["inbox", "unread"].into_iter().collect();
        assert!(!tags.insert("inbox"));
        assert!(tags.insert("attachment"));
        assert_eq!(
            tags.iter().collect::<Vec<_>>(),
            vec!["attachment", "inbox", "unread"]
        );
        assert!(tags.remove("unread"));
        assert!(!tags.remove("unread"));
    }

    #[test]
    fn sort_mode_uses_snake_case_names() {
        let mode: SortMode = serde_json::from_str("\"oldest_first\"").unwrap();
        assert_eq!(mode, SortMode::OldestFirst);
    }
}
