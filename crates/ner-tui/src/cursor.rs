//! Selection and scroll state for a list of `len` lines.
//!
//! The cursor never stores `len`. Lists grow while a collector runs, so every
//! operation that depends on the length takes the current one.

use std::ops::Range;

/// Navigation actions shared by every line-oriented view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavAction {
    Next,
    Previous,
    NextPage,
    PreviousPage,
    Top,
    Bottom,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    selected: usize,
    offset: usize,
    visible_lines: usize,
    dirty: bool,
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Cursor {
    pub fn new(visible_lines: usize) -> Self {
        Self {
            selected: 0,
            offset: 0,
            visible_lines: visible_lines.max(1),
            dirty: true,
        }
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Index of the first visible line.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn visible_lines(&self) -> usize {
        self.visible_lines
    }

    fn page_step(&self) -> usize {
        self.visible_lines.saturating_sub(1).max(1)
    }

    pub fn next(&mut self, len: usize) {
        if self.selected + 1 < len {
            self.selected += 1;
            self.touch();
        }
    }

    pub fn previous(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            self.touch();
        }
    }

    pub fn next_page(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        if self.selected + self.visible_lines >= len {
            self.selected = len - 1;
        } else {
            self.selected += self.page_step();
        }
        self.touch();
    }

    pub fn previous_page(&mut self) {
        if self.visible_lines > self.selected {
            self.selected = 0;
        } else {
            self.selected -= self.page_step();
        }
        self.touch();
    }

    pub fn move_to_top(&mut self) {
        self.selected = 0;
        self.touch();
    }

    pub fn move_to_bottom(&mut self, len: usize) {
        self.selected = len.saturating_sub(1);
        self.touch();
    }

    pub fn resize(&mut self, visible_lines: usize) {
        self.visible_lines = visible_lines.max(1);
        self.touch();
    }

    /// Select `index`, clamped into the list.
    pub fn select(&mut self, index: usize, len: usize) {
        self.selected = index.min(len.saturating_sub(1));
        self.touch();
    }

    /// Pull the selection back into a list that may have shrunk.
    pub fn clamp(&mut self, len: usize) {
        self.select(self.selected, len);
    }

    pub fn apply(&mut self, action: NavAction, len: usize) {
        match action {
            NavAction::Next => self.next(len),
            NavAction::Previous => self.previous(),
            NavAction::NextPage => self.next_page(len),
            NavAction::PreviousPage => self.previous_page(),
            NavAction::Top => self.move_to_top(),
            NavAction::Bottom => self.move_to_bottom(len),
        }
    }

    /// Indices currently on screen.
    pub fn visible_range(&self, len: usize) -> Range<usize> {
        let start = self.offset.min(len);
        start..(self.offset + self.visible_lines).min(len)
    }

    /// Whether anything changed since the last call.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn status(&self, len: usize) -> String {
        if len == 0 {
            "no lines".to_string()
        } else {
            format!("line {} of {}", self.selected + 1, len)
        }
    }

    fn touch(&mut self) {
        if self.selected < self.offset {
            self.offset = self.selected;
        } else if self.selected >= self.offset + self.visible_lines {
            self.offset = self.selected + 1 - self.visible_lines;
        }
        self.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn pages_forward_then_lands_on_end() {
        let mut cursor = Cursor::new(10);
        cursor.select(5, 25);
        cursor.next_page(25);
        assert_eq!(cursor.selected(), 14);
        cursor.next_page(25);
        assert_eq!(cursor.selected(), 23);
        cursor.next_page(25);
        assert_eq!(cursor.selected(), 24);
        assert_eq!(cursor.offset(), 15);
    }

    #[test]
    fn pages_backward_then_lands_on_start() {
        let mut cursor = Cursor::new(10);
        cursor.select(24, 25);
        cursor.previous_page();
        assert_eq!(cursor.selected(), 15);
        cursor.previous_page();
        assert_eq!(cursor.selected(), 6);
        cursor.previous_page();
        assert_eq!(cursor.selected(), 0);
        assert_eq!(cursor.offset(), 0);
    }

    #[test]
    fn single_steps_stop_at_the_ends() {
        let mut cursor = Cursor::new(3);
        cursor.previous();
        assert_eq!(cursor.selected(), 0);
        cursor.move_to_bottom(4);
        cursor.take_dirty();
        cursor.next(4);
        assert_eq!(cursor.selected(), 3);
        assert!(!cursor.take_dirty(), "no-op must not mark the cursor dirty");
    }

    #[test]
    fn empty_list_keeps_zero_selection() {
        let mut cursor = Cursor::new(5);
        for action in [
            NavAction::Next,
            NavAction::NextPage,
            NavAction::Bottom,
            NavAction::PreviousPage,
        ] {
            cursor.apply(action, 0);
            assert_eq!(cursor.selected(), 0);
        }
        assert_eq!(cursor.status(0), "no lines");
        assert_eq!(cursor.visible_range(0), 0..0);
    }

    #[test]
    fn clamp_follows_shrinking_list() {
        let mut cursor = Cursor::new(4);
        cursor.select(9, 10);
        assert_eq!(cursor.offset(), 6);
        cursor.clamp(3);
        assert_eq!(cursor.selected(), 2);
        assert_eq!(cursor.offset(), 2);
        assert_eq!(cursor.status(3), "line 3 of 3");
    }

    #[test]
    fn resize_refits_viewport() {
        let mut cursor = Cursor::new(10);
        cursor.select(8, 20);
        assert_eq!(cursor.offset(), 0);
        cursor.resize(4);
        assert_eq!(cursor.offset(), 5);
        assert_eq!(cursor.visible_range(20), 5..9);
        cursor.resize(0);
        assert_eq!(cursor.visible_lines(), 1);
        assert_eq!(cursor.offset(), 8);
    }

    fn nav_action() -> impl Strategy<Value = NavAction> {
        prop_oneof![
            Just(NavAction::Next),
            Just(NavAction::Previous),
            Just(NavAction::NextPage),
            Just(NavAction::PreviousPage),
            Just(NavAction::Top),
            Just(NavAction::Bottom),
        ]
    }

    proptest! {
        #[test]
        fn selection_stays_visible_and_in_bounds(
            len in 0usize..200,
            visible in 1usize..40,
            actions in proptest::collection::vec(nav_action(), 0..60),
        ) {
            let mut cursor = Cursor::new(visible);
            for action in actions {
                cursor.apply(action, len);
                prop_assert!(cursor.selected() < len.max(1));
                prop_assert!(cursor.offset() <= cursor.selected());
                prop_assert!(cursor.selected() < cursor.offset() + cursor.visible_lines());
            }
        }

        #[test]
        fn next_page_lands_on_end_when_less_than_a_page_remains(
            len in 1usize..200,
            visible in 1usize..40,
            start in 0usize..200,
        ) {
            let mut cursor = Cursor::new(visible);
            cursor.select(start, len);
            let before = cursor.selected();
            cursor.next_page(len);
            if before + visible >= len {
                prop_assert_eq!(cursor.selected(), len - 1);
            } else {
                prop_assert!(cursor.selected() > before);
            }
        }
    }
}
