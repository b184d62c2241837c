use std::fmt::Debug;

use ner_core::Message;
use ratatui::{Frame, layout::Rect};

use crate::cursor::{Cursor, NavAction};
use crate::input::{BindingTrie, HandleResult, InputHandler, KeyToken};
use crate::ui;
use crate::user_config::Keymap;

/// Logical names and default keys of the navigation bindings.
pub const NAVIGATION: [(&str, &str, NavAction); 6] = [
    ("next", "<Down>", NavAction::Next),
    ("previous", "<Up>", NavAction::Previous),
    ("nextPage", "<PageDown>", NavAction::NextPage),
    ("previousPage", "<PageUp>", NavAction::PreviousPage),
    ("top", "<Home>", NavAction::Top),
    ("bottom", "<End>", NavAction::Bottom),
];

/// Bind the navigation set into `trie`, wrapping each move in the scope's
/// own action type.
pub fn bind_navigation<A: Copy + Debug>(
    trie: &mut BindingTrie<A>,
    keymap: &Keymap,
    wrap: impl Fn(NavAction) -> A,
) {
    for (name, default, nav) in NAVIGATION {
        trie.bind_or(keymap, name, default, wrap(nav));
    }
}

/// Header block followed by the body.
pub fn message_lines(message: &Message) -> Vec<String> {
    let date = chrono::DateTime::from_timestamp(message.date, 0)
        .map(|d| d.format("%a, %d %b %Y %H:%M:%S %z").to_string())
        .unwrap_or_default();
    let tags = message.tags.iter().collect::<Vec<_>>().join(" ");
    let mut lines = vec![
        format!("From: {}", message.from),
        format!("Date: {date}"),
        format!("Subject: {}", message.subject),
        format!("Tags: {tags}"),
        String::new(),
    ];
    lines.extend(message.body.iter().cloned());
    lines
}

/// Scrolls through the body lines of one message. Sits behind the thread
/// view's own bindings, and alone in a message view.
#[derive(Debug)]
pub struct MessagePager {
    bindings: BindingTrie<NavAction>,
    cursor: Cursor,
    lines: Vec<String>,
}

impl MessagePager {
    pub fn new(general: &Keymap) -> Self {
        let mut bindings = BindingTrie::new();
        bind_navigation(&mut bindings, general, |nav| nav);
        Self {
            bindings,
            cursor: Cursor::default(),
            lines: Vec::new(),
        }
    }

    /// Show new content, scrolled to the top.
    pub fn set_lines(&mut self, lines: Vec<String>) {
        self.lines = lines;
        self.cursor.move_to_top();
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn apply(&mut self, nav: NavAction) {
        self.cursor.apply(nav, self.lines.len());
    }

    pub fn resize(&mut self, height: usize) {
        self.cursor.resize(height);
    }

    pub fn take_dirty(&mut self) -> bool {
        self.cursor.take_dirty()
    }

    pub fn status(&self) -> String {
        self.cursor.status(self.lines.len())
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let range = self.cursor.visible_range(self.lines.len());
        ui::draw_pager(frame, area, &self.lines[range], self.cursor.selected() - self.cursor.offset());
    }
}

impl InputHandler for MessagePager {
    fn feed(&mut self, keys: &[KeyToken]) -> HandleResult {
        let len = self.lines.len();
        let cursor = &mut self.cursor;
        self.bindings.lookup(keys).resolve(|nav| cursor.apply(nav, len))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::input::NamedKey;

    fn pager(lines: usize) -> MessagePager {
        let mut pager = MessagePager::new(&Keymap::new());
        pager.resize(4);
        pager.set_lines((0..lines).map(|i| format!("line {i}")).collect());
        pager
    }

    #[test]
    fn navigation_keys_move_the_pager() {
        let mut pager = pager(10);
        let end = [KeyToken::Named(NamedKey::End)];
        assert_eq!(pager.feed(&end), HandleResult::Handled);
        assert_eq!(pager.cursor().selected(), 9);
        assert_eq!(pager.status(), "line 10 of 10");

        pager.set_lines(vec!["only".into()]);
        assert_eq!(pager.cursor().selected(), 0);
        assert_eq!(pager.feed(&[KeyToken::Char('z')]), HandleResult::NoMatch);
    }

    #[test]
    fn keymap_renames_navigation() {
        let mut keymap = Keymap::new();
        keymap.insert("next".into(), "j".into());
        let mut pager = MessagePager::new(&keymap);
        pager.set_lines(vec!["a".into(), "b".into()]);

        assert_eq!(pager.feed(&[KeyToken::Char('j')]), HandleResult::Handled);
        assert_eq!(pager.cursor().selected(), 1);
        assert_eq!(
            pager.feed(&[KeyToken::Named(NamedKey::Down)]),
            HandleResult::NoMatch
        );
    }
}
