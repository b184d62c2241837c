use std::time::Duration;

use ner_error::Error;
use parking_lot::{Condvar, Mutex};

#[derive(Debug)]
struct ListState<T> {
    items: Vec<T>,
    collecting: bool,
    failure: Option<Error>,
    epoch: u64,
}

/// Append-only list filled by one producer per epoch.
///
/// Items, the `collecting` flag and the epoch's failure live under one mutex;
/// the condvar is notified after every append and once more when the
/// producer finishes. Writes tagged with an old epoch are dropped.
#[derive(Debug)]
pub struct SharedList<T> {
    state: Mutex<ListState<T>>,
    changed: Condvar,
}

impl<T> Default for SharedList<T> {
    fn default() -> Self {
        Self {
            state: Mutex::new(ListState {
                items: Vec::new(),
                collecting: false,
                failure: None,
                epoch: 0,
            }),
            changed: Condvar::new(),
        }
    }
}

impl<T> SharedList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the list and mark it as collecting. Returns the new epoch.
    pub fn begin_epoch(&self) -> u64 {
        let mut state = self.state.lock();
        state.epoch += 1;
        state.items.clear();
        state.collecting = true;
        state.failure = None;
        state.epoch
    }

    /// Append an item for `epoch`. Returns `false` if the epoch is stale.
    pub fn push(&self, epoch: u64, item: T) -> bool {
        let mut state = self.state.lock();
        if state.epoch != epoch {
            return false;
        }
        state.items.push(item);
        drop(state);
        self.changed.notify_all();
        true
    }

    /// End `epoch`, recording why it ended early if it failed.
    pub fn finish(&self, epoch: u64, failure: Option<Error>) {
        let mut state = self.state.lock();
        if state.epoch != epoch {
            return;
        }
        state.collecting = false;
        if failure.is_some() {
            state.failure = failure;
        }
        drop(state);
        self.changed.notify_all();
    }

    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_collecting(&self) -> bool {
        self.state.lock().collecting
    }

    /// Run `f` over the current items while holding the lock.
    pub fn with_items<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        f(&self.state.lock().items)
    }

    /// Mutate the item at `index` in place. Ordered with respect to appends.
    pub fn modify<R>(&self, index: usize, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        self.state.lock().items.get_mut(index).map(f)
    }

    /// The failure of the last epoch, handed out once.
    pub fn take_failure(&self) -> Option<Error> {
        self.state.lock().failure.take()
    }

    /// Block until `pred` holds over the items or collection ends.
    ///
    /// Each wake waits at most `poll_interval` on the notification before
    /// re-checking. Returns whether `pred` held.
    pub fn wait_until(&self, mut pred: impl FnMut(&[T]) -> bool, poll_interval: Duration) -> bool {
        let mut state = self.state.lock();
        loop {
            if pred(&state.items) {
                return true;
            }
            if !state.collecting {
                return false;
            }
            self.changed.wait_for(&mut state, poll_interval);
        }
    }
}

impl<T: Clone> SharedList<T> {
    pub fn get(&self, index: usize) -> Option<T> {
        self.state.lock().items.get(index).cloned()
    }

    pub fn snapshot(&self) -> Vec<T> {
        self.state.lock().items.clone()
    }
}
