#![allow(dead_code)]
//! Fixtures shared by unit tests and the integration tests under `tests/`.

pub mod mock;

use std::rc::Rc;
use std::sync::Arc;

use ner_core::memory::StoredThread;
use ner_core::{INBOX_TAG, MemoryStore, Message, MessageId, SortMode, ThreadId, UNREAD_TAG};

use crate::app::{App, AppCommand};
use crate::input::{BindingTrie, HandleResult, InputHandler, KeySequence, KeyToken, ScopeChain};
use crate::user_config::NerConfig;
use crate::views::{View, ViewContext};

pub use mock::ScriptedPrompt;

/// Base timestamp of the numbered fixtures; thread `i` is `i` minutes newer.
pub const BASE_DATE: i64 = 1_700_000_000;

/// Thread `t{i:03}`: one message for even `i` (unread), two for odd `i`.
/// Every thread is in the inbox.
pub fn numbered_thread(i: usize) -> StoredThread {
    let count = 1 + i % 2;
    let messages = (0..count)
        .map(|m| {
            let mut tags = vec![INBOX_TAG];
            if i % 2 == 0 {
                tags.push(UNREAD_TAG);
            }
            Message {
                id: MessageId::new(format!("m{i:03}.{m}")),
                from: format!("sender{}@example.org", (i + m) % 5),
                date: BASE_DATE + (i as i64) * 60 + m as i64,
                subject: format!("Subject {i}"),
                tags: tags.into_iter().collect(),
                body: (0..12).map(|l| format!("body line {l} of message {m}")).collect(),
            }
        })
        .collect();
    StoredThread {
        id: ThreadId::new(format!("t{i:03}")),
        messages,
    }
}

pub fn numbered_store(n: usize) -> MemoryStore {
    MemoryStore::new((0..n).map(numbered_thread).collect())
}

/// Wires views to an in-memory store, a scripted prompt and an inspectable
/// command channel. Results come back in thread id order.
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub prompt: Rc<ScriptedPrompt>,
    pub config: NerConfig,
    commands_tx: flume::Sender<AppCommand>,
    commands_rx: flume::Receiver<AppCommand>,
}

impl TestContext {
    pub fn new(store: MemoryStore) -> Self {
        Self::with_store(Arc::new(store))
    }

    pub fn with_store(store: Arc<MemoryStore>) -> Self {
        let (commands_tx, commands_rx) = flume::unbounded();
        let config = NerConfig {
            sort: SortMode::MessageId,
            poll_interval_ms: 5,
            ..Default::default()
        };
        Self {
            store,
            prompt: Rc::new(ScriptedPrompt::default()),
            config,
            commands_tx,
            commands_rx,
        }
    }

    pub fn view_context(&self) -> ViewContext {
        ViewContext {
            query: self.store.clone(),
            tags: self.store.clone(),
            prompt: self.prompt.clone(),
            config: Arc::new(self.config.clone()),
            commands: self.commands_tx.clone(),
        }
    }

    /// An app reading this context's command channel.
    pub fn app(&self, height: u16) -> App {
        App::new(self.view_context(), self.commands_rx.clone(), height)
    }

    /// Drain everything posted so far.
    pub fn commands(&self) -> Vec<AppCommand> {
        self.commands_rx.try_iter().collect()
    }
}

/// Offer `notation` to `view`'s scopes as one pending sequence, then run
/// whatever matched.
pub fn dispatch(view: &mut dyn View, notation: &str) -> HandleResult {
    let keys: KeySequence = notation.parse().expect("fixture notation");
    let result = ScopeChain::new(view.key_scopes()).feed(keys.as_slice());
    view.perform_fired();
    result
}

/// A scope that records which of its named bindings fired.
#[derive(Debug, Default)]
pub struct RecordingScope {
    bindings: BindingTrie<usize>,
    names: Vec<String>,
    pub fired: Vec<String>,
}

impl RecordingScope {
    /// Bind each `(notation, name)` pair.
    pub fn new(bindings: &[(&str, &str)]) -> Self {
        let mut scope = Self::default();
        for (notation, name) in bindings {
            let sequence: KeySequence = notation.parse().expect("fixture notation");
            let index = scope.names.len();
            scope.names.push(name.to_string());
            scope
                .bindings
                .bind(sequence.as_slice(), index)
                .expect("fixture binding");
        }
        scope
    }
}

impl InputHandler for RecordingScope {
    fn feed(&mut self, keys: &[KeyToken]) -> HandleResult {
        let (names, fired) = (&self.names, &mut self.fired);
        self.bindings
            .lookup(keys)
            .resolve(|index| fired.push(names[index].clone()))
    }
}
