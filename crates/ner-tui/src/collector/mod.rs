//! Background collection of search results.
//!
//! A [`Collector`] owns at most one producer thread at a time. The producer
//! pulls threads from the backend one by one and appends them to a
//! [`SharedList`] that the view reads while rendering. Starting a new search,
//! refreshing, stopping or dropping the collector cancels the producer and
//! joins it before anything else touches the list.

pub mod cancel_token;
pub mod shared_list;

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use ner_core::{SortMode, ThreadId, ThreadQuery, ThreadSummary};
use ner_error::Error;

pub use cancel_token::{CancellationHandle, CancellationToken};
pub use shared_list::SharedList;

use crate::cursor::Cursor;

#[derive(Debug)]
struct ProducerTask {
    handle: JoinHandle<()>,
    cancel: CancellationHandle,
}

pub struct Collector {
    list: Arc<SharedList<ThreadSummary>>,
    source: Arc<dyn ThreadQuery>,
    sort: SortMode,
    poll_interval: Duration,
    query: String,
    task: Option<ProducerTask>,
}

impl std::fmt::Debug for Collector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collector")
            .field("query", &self.query)
            .field("sort", &self.sort)
            .field("len", &self.list.len())
            .field("collecting", &self.list.is_collecting())
            .finish_non_exhaustive()
    }
}

impl Collector {
    pub fn new(source: Arc<dyn ThreadQuery>, sort: SortMode, poll_interval: Duration) -> Self {
        Self {
            list: Arc::new(SharedList::new()),
            source,
            sort,
            poll_interval,
            query: String::new(),
            task: None,
        }
    }

    /// Search terms of the current epoch.
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn list(&self) -> &SharedList<ThreadSummary> {
        &self.list
    }

    /// Begin a new epoch for `query`, stopping any running producer first.
    pub fn start(&mut self, query: &str) {
        self.stop();
        self.query = query.to_string();
        let epoch = self.list.begin_epoch();
        let (token, cancel) = CancellationToken::new();

        let list = Arc::clone(&self.list);
        let source = Arc::clone(&self.source);
        let terms = self.query.clone();
        let sort = self.sort;
        let spawned = thread::Builder::new()
            .name("ner-collect".into())
            .spawn(move || produce(&list, source.as_ref(), &terms, sort, &token, epoch));

        match spawned {
            Ok(handle) => {
                tracing::debug!(query, epoch, "collection started");
                self.task = Some(ProducerTask { handle, cancel });
            }
            Err(e) => {
                tracing::warn!(query, error = %e, "could not spawn collector thread");
                self.list.finish(epoch, Some(Error::from(e)));
            }
        }
    }

    /// Cancel the producer and wait for it. Returns after at most one backend
    /// fetch. Calling it with nothing running is a no-op.
    pub fn stop(&mut self) {
        let Some(task) = self.task.take() else {
            return;
        };
        task.cancel.cancel();
        if task.handle.join().is_err() {
            tracing::warn!(query = %self.query, "collector thread panicked");
        }
    }

    pub fn wait_until(&self, pred: impl FnMut(&[ThreadSummary]) -> bool) -> bool {
        self.list.wait_until(pred, self.poll_interval)
    }

    /// Wait until the rows from the cursor's offset fill the screen, or
    /// collection ends.
    pub fn wait_for_page(&self, cursor: &Cursor) -> bool {
        let (offset, visible) = (cursor.offset(), cursor.visible_lines());
        self.wait_until(|items| items.len().saturating_sub(offset) >= visible)
    }

    /// Re-run `query` while keeping the selected thread selected if it
    /// survives. A vanished selection is clamped into the new list.
    pub fn refresh(&mut self, query: &str, cursor: &mut Cursor) {
        self.stop();
        let selected = self
            .list
            .with_items(|items| items.get(cursor.selected()).map(|t| t.id.clone()));
        self.start(query);

        match selected {
            Some(id) => {
                self.wait_until(|items| items.iter().any(|t| t.id == id));
                let (position, len) = self
                    .list
                    .with_items(|items| (items.iter().position(|t| t.id == id), items.len()));
                match position {
                    Some(index) => cursor.select(index, len),
                    None => {
                        tracing::debug!(thread = %id, "selected thread gone after refresh");
                        cursor.clamp(len);
                    }
                }
            }
            None => cursor.clamp(self.list.len()),
        }

        self.wait_for_page(cursor);
        cursor.clamp(self.list.len());
    }

    /// Apply `f` to the thread at `index`, provided it is still `id`. Falls
    /// back to looking the thread up by id. Returns whether it was found.
    pub fn update_item(&self, index: usize, id: &ThreadId, f: impl FnOnce(&mut ThreadSummary)) -> bool {
        let at_index = self.list.with_items(|items| {
            match items.get(index) {
                Some(t) if &t.id == id => Some(index),
                _ => items.iter().position(|t| &t.id == id),
            }
        });
        // items are never removed within an epoch, so the index stays valid
        at_index
            .and_then(|i| self.list.modify(i, f))
            .is_some()
    }

    pub fn get(&self, index: usize) -> Option<ThreadSummary> {
        self.list.get(index)
    }

    pub fn take_error(&self) -> Option<Error> {
        self.list.take_failure()
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn is_collecting(&self) -> bool {
        self.list.is_collecting()
    }
}

impl Drop for Collector {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Marks the epoch finished however the producer exits, unwinding included.
struct FinishGuard<'a> {
    list: &'a SharedList<ThreadSummary>,
    epoch: u64,
    failure: Option<Error>,
}

impl Drop for FinishGuard<'_> {
    fn drop(&mut self) {
        if thread::panicking() && self.failure.is_none() {
            self.failure = Some(Error::query("collector thread panicked"));
        }
        self.list.finish(self.epoch, self.failure.take());
    }
}

fn produce(
    list: &SharedList<ThreadSummary>,
    source: &dyn ThreadQuery,
    query: &str,
    sort: SortMode,
    token: &CancellationToken,
    epoch: u64,
) {
    let span = tracing::debug_span!("collect", query, epoch);
    let _enter = span.enter();
    let mut guard = FinishGuard {
        list,
        epoch,
        failure: None,
    };

    let mut stream = match source.search_threads(query, sort) {
        Ok(stream) => stream,
        Err(e) => {
            tracing::warn!(error = %e, "search failed to start");
            guard.failure = Some(e);
            return;
        }
    };

    let mut collected = 0usize;
    loop {
        if token.is_cancelled() {
            tracing::debug!(collected, "collection cancelled");
            return;
        }
        match stream.next() {
            Some(Ok(thread)) => {
                if !list.push(epoch, thread) {
                    return;
                }
                collected += 1;
                thread::yield_now();
            }
            Some(Err(e)) => {
                tracing::warn!(collected, error = %e, "search failed mid-stream");
                guard.failure = Some(e);
                return;
            }
            None => {
                tracing::debug!(collected, "collection finished");
                return;
            }
        }
    }
}
