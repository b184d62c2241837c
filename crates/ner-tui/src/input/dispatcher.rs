use std::fmt::Debug;

use super::key::{KeyToken, notation};
use super::trie::BindingTrie;

/// Outcome of offering the pending sequence to a scope or a chain of scopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleResult {
    /// An action ran. The sequence is consumed.
    Handled,
    /// Not bound yet, but more keys could complete a binding.
    PartialMatch,
    NoMatch,
}

impl HandleResult {
    /// Continue into `next` unless this scope already handled the sequence.
    ///
    /// Used by composite scopes (a view and its nested sub-views) so that the
    /// first `Handled` stops the walk and any `PartialMatch` survives a later
    /// `NoMatch`.
    pub fn then(self, next: impl FnOnce() -> HandleResult) -> HandleResult {
        match self {
            HandleResult::Handled => HandleResult::Handled,
            HandleResult::PartialMatch => match next() {
                HandleResult::Handled => HandleResult::Handled,
                _ => HandleResult::PartialMatch,
            },
            HandleResult::NoMatch => next(),
        }
    }
}

/// A scope in the dispatch chain.
pub trait InputHandler {
    /// Offer the whole pending sequence. On an exact match the scope performs
    /// or records the bound action before returning [`HandleResult::Handled`].
    fn feed(&mut self, keys: &[KeyToken]) -> HandleResult;
}

/// Offer `keys` to each scope in order; the first `Handled` wins.
pub fn feed_chain(keys: &[KeyToken], scopes: &mut [&mut dyn InputHandler]) -> HandleResult {
    scopes
        .iter_mut()
        .fold(HandleResult::NoMatch, |result, scope| {
            result.then(|| scope.feed(keys))
        })
}

/// The ordered scopes one key press is offered to, outermost first.
pub struct ScopeChain<'a> {
    scopes: Vec<&'a mut dyn InputHandler>,
}

impl<'a> ScopeChain<'a> {
    pub fn new(scopes: Vec<&'a mut dyn InputHandler>) -> Self {
        Self { scopes }
    }
}

impl InputHandler for ScopeChain<'_> {
    fn feed(&mut self, keys: &[KeyToken]) -> HandleResult {
        feed_chain(keys, &mut self.scopes)
    }
}

/// One scope's bindings. An exact match is held until the owner takes it, so
/// the owner can sit in the same chain as the sub-views it mutates.
#[derive(Debug)]
pub struct KeyScope<A> {
    bindings: BindingTrie<A>,
    fired: Option<A>,
}

impl<A: Copy + Debug> KeyScope<A> {
    pub fn new(bindings: BindingTrie<A>) -> Self {
        Self {
            bindings,
            fired: None,
        }
    }

    /// The action matched since the last call, if any.
    pub fn take_fired(&mut self) -> Option<A> {
        self.fired.take()
    }
}

impl<A: Copy + Debug> InputHandler for KeyScope<A> {
    fn feed(&mut self, keys: &[KeyToken]) -> HandleResult {
        let lookup = self.bindings.lookup(keys);
        lookup.resolve(|action| self.fired = Some(action))
    }
}

/// Owns the one shared key buffer and drives it through a handler.
#[derive(Debug, Default)]
pub struct KeyDispatcher {
    pending: Vec<KeyToken>,
}

impl KeyDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process one key press against `handler`, typically the application
    /// scope that chains into the rest.
    pub fn press(&mut self, key: KeyToken, handler: &mut dyn InputHandler) -> HandleResult {
        if key == KeyToken::INTERRUPT {
            if !self.pending.is_empty() {
                tracing::debug!(pending = %notation(&self.pending), "sequence interrupted");
            }
            self.pending.clear();
            return HandleResult::NoMatch;
        }
        if key == KeyToken::BACKSPACE && !self.pending.is_empty() {
            self.pending.pop();
            return if self.pending.is_empty() {
                HandleResult::NoMatch
            } else {
                HandleResult::PartialMatch
            };
        }

        self.pending.push(key);
        let result = handler.feed(&self.pending);
        match result {
            HandleResult::PartialMatch => {}
            HandleResult::Handled => self.pending.clear(),
            HandleResult::NoMatch => {
                tracing::trace!(sequence = %notation(&self.pending), "unbound sequence");
                self.pending.clear();
            }
        }
        result
    }

    pub fn pending(&self) -> &[KeyToken] {
        &self.pending
    }

    /// The pending keys in keymap notation, for the status bar.
    pub fn pending_notation(&self) -> String {
        notation(&self.pending)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;
    use crate::input::KeySequence;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Act {
        Top,
        Quit,
        Down,
    }

    struct Scope {
        trie: BindingTrie<Act>,
        fired: Vec<Act>,
    }

    impl Scope {
        fn new(bindings: &[(&str, Act)]) -> Self {
            let mut trie = BindingTrie::new();
            for (seq, act) in bindings {
                trie.bind(seq.parse::<KeySequence>().unwrap().as_slice(), *act)
                    .unwrap();
            }
            Self {
                trie,
                fired: Vec::new(),
            }
        }
    }

    impl InputHandler for Scope {
        fn feed(&mut self, keys: &[KeyToken]) -> HandleResult {
            let fired = &mut self.fired;
            self.trie.lookup(keys).resolve(|a| fired.push(a))
        }
    }

    fn g() -> KeyToken {
        KeyToken::Char('g')
    }

    #[test]
    fn multi_key_binding_fires_on_last_key() {
        let mut scope = Scope::new(&[("g g", Act::Top)]);
        let mut dispatcher = KeyDispatcher::new();

        assert_eq!(dispatcher.press(g(), &mut scope), HandleResult::PartialMatch);
        assert_eq!(dispatcher.pending(), &[g()]);
        assert!(scope.fired.is_empty());

        assert_eq!(dispatcher.press(g(), &mut scope), HandleResult::Handled);
        assert!(dispatcher.pending().is_empty());
        assert_eq!(scope.fired, vec![Act::Top]);
    }

    #[test]
    fn dead_end_clears_buffer() {
        let mut scope = Scope::new(&[("g g", Act::Top)]);
        let mut dispatcher = KeyDispatcher::new();

        assert_eq!(dispatcher.press(g(), &mut scope), HandleResult::PartialMatch);
        assert_eq!(
            dispatcher.press(KeyToken::Char('x'), &mut scope),
            HandleResult::NoMatch
        );
        assert!(dispatcher.pending().is_empty());
        assert!(scope.fired.is_empty());

        // a fresh sequence still works afterwards
        dispatcher.press(g(), &mut scope);
        dispatcher.press(g(), &mut scope);
        assert_eq!(scope.fired, vec![Act::Top]);
    }

    #[test]
    fn interrupt_clears_without_dispatch() {
        let mut scope = Scope::new(&[("g g", Act::Top), ("<C-c>", Act::Quit)]);
        let mut dispatcher = KeyDispatcher::new();

        dispatcher.press(g(), &mut scope);
        assert_eq!(
            dispatcher.press(KeyToken::INTERRUPT, &mut scope),
            HandleResult::NoMatch
        );
        assert!(dispatcher.pending().is_empty());
        assert!(scope.fired.is_empty());
    }

    #[test]
    fn backspace_edits_pending_sequence() {
        let mut scope = Scope::new(&[("g g", Act::Top), ("<BS>", Act::Quit)]);
        let mut dispatcher = KeyDispatcher::new();

        dispatcher.press(g(), &mut scope);
        assert_eq!(
            dispatcher.press(KeyToken::BACKSPACE, &mut scope),
            HandleResult::NoMatch
        );
        assert!(dispatcher.pending().is_empty());
        assert!(scope.fired.is_empty());

        // with nothing pending, backspace is an ordinary key
        assert_eq!(
            dispatcher.press(KeyToken::BACKSPACE, &mut scope),
            HandleResult::Handled
        );
        assert_eq!(scope.fired, vec![Act::Quit]);
    }

    #[test]
    fn backspace_keeps_remaining_prefix() {
        let mut scope = Scope::new(&[("abc", Act::Top)]);
        let mut dispatcher = KeyDispatcher::new();
        dispatcher.press(KeyToken::Char('a'), &mut scope);
        dispatcher.press(KeyToken::Char('b'), &mut scope);
        assert_eq!(
            dispatcher.press(KeyToken::BACKSPACE, &mut scope),
            HandleResult::PartialMatch
        );
        assert_eq!(dispatcher.pending_notation(), "a");
    }

    #[test]
    fn chain_stops_at_first_handled() {
        let mut first = Scope::new(&[("j", Act::Down)]);
        let mut second = Scope::new(&[("j", Act::Quit), ("g g", Act::Top)]);

        let result = feed_chain(&[KeyToken::Char('j')], &mut [&mut first, &mut second]);
        assert_eq!(result, HandleResult::Handled);
        assert_eq!(first.fired, vec![Act::Down]);
        assert!(second.fired.is_empty());
    }

    #[test]
    fn chain_reports_partial_from_any_scope() {
        let mut first = Scope::new(&[("gx", Act::Down)]);
        let mut second = Scope::new(&[("q", Act::Quit)]);
        let mut third = Scope::new(&[]);

        let result = feed_chain(&[g()], &mut [&mut first, &mut second, &mut third]);
        assert_eq!(result, HandleResult::PartialMatch);

        let result = feed_chain(&[KeyToken::Char('z')], &mut [&mut first, &mut second]);
        assert_eq!(result, HandleResult::NoMatch);
    }

    #[test]
    fn later_exact_beats_earlier_prefix() {
        let mut first = Scope::new(&[("g g", Act::Top)]);
        let mut second = Scope::new(&[("g", Act::Down)]);
        let result = feed_chain(&[g()], &mut [&mut first, &mut second]);
        assert_eq!(result, HandleResult::Handled);
        assert_eq!(second.fired, vec![Act::Down]);
    }

    #[test]
    fn key_scope_holds_match_until_taken() {
        let mut trie = BindingTrie::new();
        trie.bind(&[g(), g()], Act::Top).unwrap();
        let mut scope = KeyScope::new(trie);
        let mut other = Scope::new(&[("q", Act::Quit)]);

        let mut chain = ScopeChain::new(vec![&mut scope as &mut dyn InputHandler, &mut other]);
        assert_eq!(chain.feed(&[g()]), HandleResult::PartialMatch);
        assert_eq!(chain.feed(&[g(), g()]), HandleResult::Handled);
        drop(chain);

        assert_eq!(scope.take_fired(), Some(Act::Top));
        assert_eq!(scope.take_fired(), None);
        assert!(other.fired.is_empty());
    }

    fn bound_sequences() -> impl Strategy<Value = Vec<Vec<KeyToken>>> {
        let key = prop::sample::select(vec!['a', 'b', 'j', 'k', 'q']).prop_map(KeyToken::Char);
        proptest::collection::vec(proptest::collection::vec(key, 1..4), 1..16).prop_map(
            |candidates| {
                // keep a prefix-free set so every sequence is reachable
                let mut kept: Vec<Vec<KeyToken>> = Vec::new();
                for seq in candidates {
                    if !kept.iter().any(|k| k.starts_with(&seq) || seq.starts_with(k)) {
                        kept.push(seq);
                    }
                }
                kept
            },
        )
    }

    proptest! {
        #[test]
        fn bound_sequence_fires_only_on_its_last_key(sequences in bound_sequences()) {
            let mut trie = BindingTrie::new();
            for (index, seq) in sequences.iter().enumerate() {
                trie.bind(seq, index).unwrap();
            }
            let mut scope = KeyScope::new(trie);
            let mut dispatcher = KeyDispatcher::new();

            for (index, seq) in sequences.iter().enumerate() {
                let (last, init) = seq.split_last().unwrap();
                for key in init {
                    prop_assert_eq!(dispatcher.press(*key, &mut scope), HandleResult::PartialMatch);
                    prop_assert_eq!(scope.take_fired(), None);
                }
                prop_assert_eq!(dispatcher.press(*last, &mut scope), HandleResult::Handled);
                prop_assert_eq!(scope.take_fired(), Some(index));
                prop_assert!(dispatcher.pending().is_empty());
            }
        }
    }
}
