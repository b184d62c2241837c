use std::fmt::Debug;

use fxhash::FxHashMap;
use ner_error::{Error, Result};

use super::dispatcher::HandleResult;
use super::key::{KeySequence, KeyToken};
use crate::user_config::{Keymap, keymap_entry};

/// Result of looking a sequence up in one scope's bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<A> {
    /// The sequence is bound. Wins even if longer bindings extend it.
    Exact(A),
    /// Not bound itself, but a strict prefix of at least one binding.
    Prefix,
    None,
}

impl<A> Lookup<A> {
    /// Perform the action on an exact match and translate to a dispatch
    /// result.
    pub fn resolve(self, perform: impl FnOnce(A)) -> HandleResult {
        match self {
            Lookup::Exact(action) => {
                perform(action);
                HandleResult::Handled
            }
            Lookup::Prefix => HandleResult::PartialMatch,
            Lookup::None => HandleResult::NoMatch,
        }
    }
}

#[derive(Debug)]
struct Node<A> {
    action: Option<A>,
    children: FxHashMap<KeyToken, Node<A>>,
}

impl<A> Default for Node<A> {
    fn default() -> Self {
        Self {
            action: None,
            children: FxHashMap::default(),
        }
    }
}

/// The bindings of one handler scope, stored as a trie keyed by token.
///
/// Registering a sequence that is already bound replaces the earlier action
/// (last registration wins).
#[derive(Debug)]
pub struct BindingTrie<A> {
    root: Node<A>,
    len: usize,
}

impl<A> Default for BindingTrie<A> {
    fn default() -> Self {
        Self {
            root: Node::default(),
            len: 0,
        }
    }
}

impl<A: Copy + Debug> BindingTrie<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct bound sequences.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bind `sequence` to `action`, returning the action it replaced.
    pub fn bind(&mut self, sequence: &[KeyToken], action: A) -> Result<Option<A>> {
        if sequence.is_empty() {
            return Err(Error::key_notation("", "cannot bind an empty sequence"));
        }
        let node = sequence
            .iter()
            .fold(&mut self.root, |node, key| node.children.entry(*key).or_default());
        let replaced = node.action.replace(action);
        match replaced {
            Some(old) => tracing::debug!(
                sequence = %super::key::notation(sequence),
                ?old,
                new = ?action,
                "binding replaced"
            ),
            None => self.len += 1,
        }
        Ok(replaced)
    }

    /// Bind the keymap's override for `name` if there is a usable one,
    /// otherwise the built-in `default` notation.
    pub fn bind_or(&mut self, keymap: &Keymap, name: &str, default: &str, action: A) {
        let overridden = keymap_entry(keymap, name).and_then(|notation| {
            notation
                .parse::<KeySequence>()
                .inspect_err(|e| {
                    tracing::warn!(name, error = %e, "ignoring keymap override, using default")
                })
                .ok()
        });
        let sequence = match overridden {
            Some(seq) => seq,
            None => match default.parse::<KeySequence>() {
                Ok(seq) => seq,
                Err(e) => {
                    tracing::error!(name, error = %e, "built-in key sequence does not parse");
                    return;
                }
            },
        };
        if let Err(e) = self.bind(sequence.as_slice(), action) {
            tracing::error!(name, error = %e, "could not bind key sequence");
        }
    }

    pub fn lookup(&self, sequence: &[KeyToken]) -> Lookup<A> {
        if sequence.is_empty() {
            return Lookup::None;
        }
        let mut node = &self.root;
        for key in sequence {
            match node.children.get(key) {
                Some(next) => node = next,
                None => return Lookup::None,
            }
        }
        match node.action {
            Some(action) => Lookup::Exact(action),
            None if !node.children.is_empty() => Lookup::Prefix,
            None => Lookup::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(s: &str) -> Vec<KeyToken> {
        s.parse::<KeySequence>().unwrap().as_slice().to_vec()
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Act {
        Top,
        Go,
        Quit,
    }

    #[test]
    fn exact_prefix_and_miss() {
        let mut trie = BindingTrie::new();
        trie.bind(&keys("gg"), Act::Top).unwrap();
        assert_eq!(trie.lookup(&keys("g")), Lookup::Prefix);
        assert_eq!(trie.lookup(&keys("gg")), Lookup::Exact(Act::Top));
        assert_eq!(trie.lookup(&keys("gx")), Lookup::None);
        assert_eq!(trie.lookup(&keys("ggg")), Lookup::None);
        assert_eq!(trie.lookup(&[]), Lookup::None);
    }

    #[test]
    fn exact_match_beats_longer_binding() {
        let mut trie = BindingTrie::new();
        trie.bind(&keys("g"), Act::Go).unwrap();
        trie.bind(&keys("gg"), Act::Top).unwrap();
        assert_eq!(trie.lookup(&keys("g")), Lookup::Exact(Act::Go));
        assert_eq!(trie.lookup(&keys("gg")), Lookup::Exact(Act::Top));
    }

    #[test]
    fn last_registration_wins() {
        let mut trie = BindingTrie::new();
        assert_eq!(trie.bind(&keys("q"), Act::Quit).unwrap(), None);
        assert_eq!(trie.bind(&keys("q"), Act::Go).unwrap(), Some(Act::Quit));
        assert_eq!(trie.lookup(&keys("q")), Lookup::Exact(Act::Go));
        assert_eq!(trie.len(), 1);
    }

    #[test]
    fn empty_sequence_cannot_be_bound() {
        let mut trie = BindingTrie::<Act>::new();
        assert!(trie.bind(&[], Act::Quit).is_err());
        assert!(trie.is_empty());
    }

    #[test]
    fn keymap_override_falls_back_on_bad_notation() {
        let mut keymap = Keymap::new();
        keymap.insert("quit".into(), "<Nope>".into());
        keymap.insert("top".into(), "<Home>".into());

        let mut trie = BindingTrie::new();
        trie.bind_or(&keymap, "quit", "Q", Act::Quit);
        trie.bind_or(&keymap, "top", "gg", Act::Top);
        trie.bind_or(&keymap, "go", "g", Act::Go);

        assert_eq!(trie.lookup(&keys("Q")), Lookup::Exact(Act::Quit));
        assert_eq!(trie.lookup(&keys("<Home>")), Lookup::Exact(Act::Top));
        assert_eq!(trie.lookup(&keys("gg")), Lookup::None);
        assert_eq!(trie.lookup(&keys("g")), Lookup::Exact(Act::Go));
    }

    #[test]
    fn resolve_performs_only_on_exact() {
        let mut fired = Vec::new();
        assert_eq!(
            Lookup::Exact(Act::Top).resolve(|a| fired.push(a)),
            HandleResult::Handled
        );
        assert_eq!(
            Lookup::<Act>::Prefix.resolve(|a| fired.push(a)),
            HandleResult::PartialMatch
        );
        assert_eq!(
            Lookup::<Act>::None.resolve(|a| fired.push(a)),
            HandleResult::NoMatch
        );
        assert_eq!(fired, vec![Act::Top]);
    }
}
