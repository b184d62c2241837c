use ner_core::{INBOX_TAG, TagTarget};
use ner_error::{ErrorPolicy, Result, ResultExt};
use ratatui::{Frame, layout::Rect};

use super::{TagOp, View, ViewContext, bind_navigation};
use crate::app::AppCommand;
use crate::collector::Collector;
use crate::cursor::{Cursor, NavAction};
use crate::input::{BindingTrie, InputHandler, KeyScope};
use crate::ui::{self, SearchRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchAction {
    Navigate(NavAction),
    Refresh,
    Open,
    Archive,
    AddTags,
    RemoveTags,
}

/// Threads matching a search, filled in the background as the backend
/// produces them.
#[derive(Debug)]
pub struct SearchView {
    keys: KeyScope<SearchAction>,
    collector: Collector,
    cursor: Cursor,
    terms: String,
    ctx: ViewContext,
}

impl SearchView {
    /// Start collecting `terms` and wait until the first screen is full or
    /// the search is exhausted.
    pub fn new(ctx: ViewContext, terms: &str, height: u16) -> Self {
        let keymaps = &ctx.config.keymaps;
        let mut bindings = BindingTrie::new();
        bind_navigation(&mut bindings, &keymaps.general, SearchAction::Navigate);
        bindings.bind_or(&keymaps.search, "refreshThreads", "=", SearchAction::Refresh);
        bindings.bind_or(&keymaps.general, "open", "\n", SearchAction::Open);
        bindings.bind_or(&keymaps.general, "archiveThread", "a", SearchAction::Archive);
        bindings.bind_or(&keymaps.general, "addTags", "+", SearchAction::AddTags);
        bindings.bind_or(&keymaps.general, "removeTags", "-", SearchAction::RemoveTags);

        let mut collector = Collector::new(
            ctx.query.clone(),
            ctx.config.sort,
            ctx.config.poll_interval(),
        );
        let cursor = Cursor::new(height.into());
        collector.start(terms);
        collector.wait_for_page(&cursor);

        Self {
            keys: KeyScope::new(bindings),
            collector,
            cursor,
            terms: terms.to_string(),
            ctx,
        }
    }

    pub fn terms(&self) -> &str {
        &self.terms
    }

    pub fn collector(&self) -> &Collector {
        &self.collector
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn perform(&mut self, action: SearchAction) {
        match action {
            SearchAction::Navigate(nav) => self.cursor.apply(nav, self.collector.len()),
            SearchAction::Refresh => self.collector.refresh(&self.terms, &mut self.cursor),
            SearchAction::Open => {
                if let Some(thread) = self.collector.get(self.cursor.selected()) {
                    self.ctx.send(AppCommand::OpenThread(thread.id));
                }
            }
            SearchAction::Archive => self.edit_and_advance(TagOp::Remove, &[INBOX_TAG.to_string()]),
            SearchAction::AddTags => self.prompt_and_edit(TagOp::Add),
            SearchAction::RemoveTags => self.prompt_and_edit(TagOp::Remove),
        }
    }

    fn prompt_and_edit(&mut self, op: TagOp) {
        if self.cursor.selected() >= self.collector.len() {
            return;
        }
        if let Some(tags) = self.ctx.prompt_tags() {
            self.edit_and_advance(op, &tags);
        }
    }

    fn edit_and_advance(&mut self, op: TagOp, tags: &[String]) {
        let policy = self.ctx.policy();
        if self.edit_tags(op, tags).report(&policy) == Some(true) {
            self.cursor.next(self.collector.len());
        }
    }

    /// Persist each tag on the selected thread, then mirror it in the list.
    /// Stops at the first rejection; earlier tags stay applied. Returns
    /// `false` when nothing is selected.
    pub fn edit_tags(&mut self, op: TagOp, tags: &[String]) -> Result<bool> {
        let index = self.cursor.selected();
        let Some(thread) = self.collector.get(index) else {
            return Ok(false);
        };
        for tag in tags {
            op.persist(self.ctx.tags.as_ref(), TagTarget::Thread(&thread.id), tag)?;
            self.collector
                .update_item(index, &thread.id, |t| op.apply(&mut t.tags, tag));
        }
        tracing::debug!(thread = %thread.id, ?op, ?tags, "tags changed");
        Ok(true)
    }

    /// Rows currently on screen.
    pub fn rows(&self) -> Vec<SearchRow> {
        let now = chrono::Utc::now().timestamp();
        let selected = self.cursor.selected();
        self.collector.list().with_items(|items| {
            let range = self.cursor.visible_range(items.len());
            let start = range.start;
            items[range]
                .iter()
                .enumerate()
                .map(|(i, t)| SearchRow::new(t, start + i == selected, now))
                .collect()
        })
    }
}

impl View for SearchView {
    fn title(&self) -> String {
        format!("search: {}", self.terms)
    }

    fn key_scopes(&mut self) -> Vec<&mut dyn InputHandler> {
        let mut scopes: Vec<&mut dyn InputHandler> = Vec::new();
        scopes.push(&mut self.keys);
        scopes
    }

    fn perform_fired(&mut self) {
        if let Some(action) = self.keys.take_fired() {
            self.perform(action);
        }
    }

    fn update(&mut self) {
        if let Some(e) = self.collector.take_error() {
            self.ctx.policy().emit(&e);
        }
    }

    fn status(&self) -> Vec<String> {
        let len = self.collector.len();
        let mut status = vec![format!("search-terms: \"{}\"", self.terms)];
        status.push(if len == 0 {
            "no matching threads".to_string()
        } else {
            format!("thread {} of {}", self.cursor.selected() + 1, len)
        });
        if self.collector.is_collecting() {
            status.push("collecting…".to_string());
        }
        status
    }

    fn resize(&mut self, height: u16) {
        self.cursor.resize(height.into());
    }

    fn take_dirty(&mut self) -> bool {
        // a running producer keeps adding rows
        self.cursor.take_dirty() | self.collector.is_collecting()
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        ui::draw_search(frame, area, &self.rows());
    }
}
