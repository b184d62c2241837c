//! Narrow interfaces to the mail store.
//!
//! The interactive core only needs two things from a backend: a lazily pulled
//! sequence of threads for a query, and a way to persist tag changes. Query
//! language semantics and storage are entirely the backend's business.

use ner_error::Result;

use crate::{Message, MessageId, SortMode, ThreadId, ThreadSummary};

/// Lazy sequence of search results. Pulled one item at a time from the
/// collector's producer thread, so it has to be `Send`.
pub type ThreadStream = Box<dyn Iterator<Item = Result<ThreadSummary>> + Send>;

pub trait ThreadQuery: Send + Sync {
    /// Start a search. Errors returned here and errors yielded by the stream
    /// are both treated as a failed epoch by the collector.
    fn search_threads(&self, terms: &str, sort: SortMode) -> Result<ThreadStream>;

    /// All messages of a thread in display order. Unknown ids fail with
    /// [`ner_error::Error::InvalidThread`].
    fn thread_messages(&self, id: &ThreadId) -> Result<Vec<Message>>;

    /// One message by id. Unknown ids fail with
    /// [`ner_error::Error::InvalidMessage`].
    fn message(&self, id: &MessageId) -> Result<Message>;
}

/// What a tag change applies to. A thread target applies the change to every
/// message in the thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagTarget<'a> {
    Thread(&'a ThreadId),
    Message(&'a MessageId),
}

pub trait TagStore: Send + Sync {
    fn add_tag(&self, target: TagTarget<'_>, tag: &str) -> Result<()>;
    fn remove_tag(&self, target: TagTarget<'_>, tag: &str) -> Result<()>;
}
