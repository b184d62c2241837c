//! Key sequence dispatch.
//!
//! Keys accumulate in one buffer owned by [`KeyDispatcher`]. After every key
//! the whole buffer is offered to a fixed chain of scopes (application, view
//! manager, active view, the view's nested sub-views), gathered into a
//! [`ScopeChain`]. Each scope looks the buffer up in its own [`BindingTrie`].
//! Scopes that own other scopes hold their match in a [`KeyScope`] and run it
//! once the chain has returned.

pub mod dispatcher;
pub mod key;
pub mod trie;

pub use dispatcher::{HandleResult, InputHandler, KeyDispatcher, KeyScope, ScopeChain, feed_chain};
pub use key::{KeySequence, KeyToken, NamedKey, notation};
pub use trie::{BindingTrie, Lookup};
