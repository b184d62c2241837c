//! In-memory mail store.
//!
//! Backs the binary when pointed at a JSON mailbox and backs the tests, which
//! use the fault-injection knobs to simulate slow, failing or read-only
//! databases.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use ner_error::{Error, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::{
    Message, MessageId, SortMode, TagSet, TagStore, TagTarget, ThreadId, ThreadQuery, ThreadStream,
    ThreadSummary,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredThread {
    pub id: ThreadId,
    pub messages: Vec<Message>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Mailbox {
    threads: Vec<StoredThread>,
}

#[derive(Debug, Clone, Default)]
struct Faults {
    fail_after: Option<usize>,
    item_delay: Option<Duration>,
    reject_tags: Option<String>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    threads: RwLock<Vec<StoredThread>>,
    faults: RwLock<Faults>,
    fetched: Arc<AtomicUsize>,
}

impl MemoryStore {
    pub fn new(threads: Vec<StoredThread>) -> Self {
        Self {
            threads: RwLock::new(threads),
            ..Default::default()
        }
    }

    /// Load a mailbox of the form `{ "threads": [ { "id": .., "messages": [..] } ] }`.
    pub fn from_json_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mailbox: Mailbox = serde_json::from_str(&content).map_err(|e| Error::Config {
            message: format!("{}: {e}", path.display()),
        })?;
        tracing::debug!(threads = mailbox.threads.len(), path = %path.display(), "loaded mailbox");
        Ok(Self::new(mailbox.threads))
    }

    /// Streams yield an error instead of the `n`th item (0-based).
    pub fn fail_after(self, n: usize) -> Self {
        self.faults.write().fail_after = Some(n);
        self
    }

    /// Every item fetch sleeps this long first.
    pub fn with_item_delay(self, delay: Duration) -> Self {
        self.faults.write().item_delay = Some(delay);
        self
    }

    /// Every tag change fails with the given reason.
    pub fn reject_tags(self, reason: impl Into<String>) -> Self {
        self.faults.write().reject_tags = Some(reason.into());
        self
    }

    /// Total number of items handed out by all streams so far.
    pub fn fetched(&self) -> usize {
        self.fetched.load(Ordering::SeqCst)
    }

    pub fn thread(&self, id: &ThreadId) -> Option<StoredThread> {
        self.threads.read().iter().find(|t| &t.id == id).cloned()
    }

    pub fn push_thread(&self, thread: StoredThread) {
        self.threads.write().push(thread);
    }

    pub fn remove_thread(&self, id: &ThreadId) {
        self.threads.write().retain(|t| &t.id != id);
    }

    fn change_tag(&self, target: TagTarget<'_>, tag: &str, add: bool) -> Result<()> {
        if let Some(reason) = &self.faults.read().reject_tags {
            return Err(Error::tag_rejected(tag, reason.clone()));
        }
        let apply = |tags: &mut TagSet| {
            if add {
                tags.insert(tag);
            } else {
                tags.remove(tag);
            }
        };
        let mut threads = self.threads.write();
        match target {
            TagTarget::Thread(id) => {
                let thread = threads
                    .iter_mut()
                    .find(|t| &t.id == id)
                    .ok_or_else(|| Error::InvalidThread(id.to_string()))?;
                thread.messages.iter_mut().for_each(|m| apply(&mut m.tags));
            }
            TagTarget::Message(id) => {
                let message = threads
                    .iter_mut()
                    .flat_map(|t| t.messages.iter_mut())
                    .find(|m| &m.id == id)
                    .ok_or_else(|| Error::InvalidMessage(id.to_string()))?;
                apply(&mut message.tags);
            }
        }
        Ok(())
    }
}

/// A single search term. Terms are ANDed together.
enum Term {
    Any,
    Tag(String),
    Text(String),
}

impl Term {
    fn parse(terms: &str) -> Vec<Term> {
        terms
            .split_whitespace()
            .map(|t| match t.strip_prefix("tag:") {
                Some(tag) => Term::Tag(tag.to_string()),
                None if t == "*" => Term::Any,
                None => Term::Text(t.to_lowercase()),
            })
            .collect()
    }

    fn matches(&self, message: &Message) -> bool {
        match self {
            Term::Any => true,
            Term::Tag(tag) => message.tags.contains(tag),
            Term::Text(text) => {
                message.subject.to_lowercase().contains(text)
                    || message.from.to_lowercase().contains(text)
                    || message.body.iter().any(|l| l.to_lowercase().contains(text))
            }
        }
    }
}

fn summarize(thread: &StoredThread, terms: &[Term]) -> Option<ThreadSummary> {
    let matched = thread
        .messages
        .iter()
        .filter(|m| terms.iter().all(|t| t.matches(m)))
        .count();
    if matched == 0 {
        return None;
    }
    let mut authors: Vec<&str> = Vec::new();
    for m in &thread.messages {
        if !authors.contains(&m.from.as_str()) {
            authors.push(&m.from);
        }
    }
    Some(ThreadSummary {
        id: thread.id.clone(),
        tags: thread
            .messages
            .iter()
            .flat_map(|m| m.tags.iter())
            .collect(),
        matched_messages: matched as u32,
        total_messages: thread.messages.len() as u32,
        newest_date: thread.messages.iter().map(|m| m.date).max().unwrap_or(0),
        authors: authors.join(", "),
        subject: thread
            .messages
            .first()
            .map(|m| m.subject.clone())
            .unwrap_or_default(),
    })
}

impl ThreadQuery for MemoryStore {
    fn search_threads(&self, terms: &str, sort: SortMode) -> Result<ThreadStream> {
        let parsed = Term::parse(terms);
        let mut results: Vec<ThreadSummary> = self
            .threads
            .read()
            .iter()
            .filter_map(|t| summarize(t, &parsed))
            .collect();
        match sort {
            SortMode::NewestFirst => results.sort_by(|a, b| b.newest_date.cmp(&a.newest_date)),
            SortMode::OldestFirst => results.sort_by_key(|t| t.newest_date),
            SortMode::MessageId => results.sort_by(|a, b| a.id.cmp(&b.id)),
            SortMode::Unsorted => {}
        }

        let faults = self.faults.read().clone();
        let fetched = Arc::clone(&self.fetched);
        let stream = results.into_iter().enumerate().map(move |(i, thread)| {
            if let Some(delay) = faults.item_delay {
                std::thread::sleep(delay);
            }
            fetched.fetch_add(1, Ordering::SeqCst);
            match faults.fail_after {
                Some(n) if i >= n => Err(Error::query(format!("lost connection after {n} threads"))),
                _ => Ok(thread),
            }
        });
        Ok(Box::new(stream))
    }

    fn thread_messages(&self, id: &ThreadId) -> Result<Vec<Message>> {
        self.thread(id)
            .map(|t| t.messages)
            .ok_or_else(|| Error::InvalidThread(id.to_string()))
    }

    fn message(&self, id: &MessageId) -> Result<Message> {
        self.threads
            .read()
            .iter()
            .flat_map(|t| t.messages.iter())
            .find(|m| &m.id == id)
            .cloned()
            .ok_or_else(|| Error::InvalidMessage(id.to_string()))
    }
}

impl TagStore for MemoryStore {
    fn add_tag(&self, target: TagTarget<'_>, tag: &str) -> Result<()> {
        self.change_tag(target, tag, true)
    }

    fn remove_tag(&self, target: TagTarget<'_>, tag: &str) -> Result<()> {
        self.change_tag(target, tag, false)
    }
}
