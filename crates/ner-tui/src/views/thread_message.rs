use ner_core::{Message, TagTarget, ThreadId, UNREAD_TAG};
use ner_error::{Error, Result, ResultExt};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
};

use super::{MessagePager, TagOp, View, ViewContext, message_lines};
use crate::cursor::Cursor;
use crate::input::{BindingTrie, InputHandler, KeyScope};
use crate::ui::{self, MessageRow};

/// Rows given to the message list above the pager.
pub const THREAD_VIEW_HEIGHT: u16 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadAction {
    NextMessage,
    PreviousMessage,
    AddTags,
    RemoveTags,
}

/// A thread's message list on top and the selected message below.
#[derive(Debug)]
pub struct ThreadMessageView {
    keys: KeyScope<ThreadAction>,
    thread_id: ThreadId,
    messages: Vec<Message>,
    cursor: Cursor,
    pager: MessagePager,
    ctx: ViewContext,
}

impl ThreadMessageView {
    /// Load `thread_id` and show its first message. Unknown or empty threads
    /// fail with [`Error::InvalidThread`].
    pub fn new(ctx: ViewContext, thread_id: ThreadId, height: u16) -> Result<Self> {
        let messages = ctx.query.thread_messages(&thread_id)?;
        if messages.is_empty() {
            return Err(Error::InvalidThread(thread_id.to_string()));
        }

        let keymaps = &ctx.config.keymaps;
        let mut bindings = BindingTrie::new();
        let own = &keymaps.thread_view;
        bindings.bind_or(own, "nextMessage", "<C-n>", ThreadAction::NextMessage);
        bindings.bind_or(own, "previousMessage", "<C-p>", ThreadAction::PreviousMessage);
        bindings.bind_or(own, "addTags", "+", ThreadAction::AddTags);
        bindings.bind_or(own, "removeTags", "-", ThreadAction::RemoveTags);

        let mut view = Self {
            keys: KeyScope::new(bindings),
            thread_id,
            messages,
            cursor: Cursor::new(THREAD_VIEW_HEIGHT.into()),
            pager: MessagePager::new(&keymaps.general),
            ctx,
        };
        view.resize(height);
        view.load_selected_message();
        Ok(view)
    }

    pub fn thread_id(&self) -> &ThreadId {
        &self.thread_id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn selected_message(&self) -> Option<&Message> {
        self.messages.get(self.cursor.selected())
    }

    pub fn pager(&self) -> &MessagePager {
        &self.pager
    }

    pub fn perform(&mut self, action: ThreadAction) {
        match action {
            ThreadAction::NextMessage => {
                self.cursor.next(self.messages.len());
                self.load_selected_message();
            }
            ThreadAction::PreviousMessage => {
                self.cursor.previous();
                self.load_selected_message();
            }
            ThreadAction::AddTags => self.prompt_and_edit(TagOp::Add),
            ThreadAction::RemoveTags => self.prompt_and_edit(TagOp::Remove),
        }
    }

    fn prompt_and_edit(&mut self, op: TagOp) {
        let Some(tags) = self.ctx.prompt_tags() else {
            return;
        };
        let policy = self.ctx.policy();
        self.edit_tags(op, &tags).report(&policy);
    }

    /// Persist each tag on the selected message, then mirror it locally.
    /// Stops at the first rejection.
    pub fn edit_tags(&mut self, op: TagOp, tags: &[impl AsRef<str>]) -> Result<()> {
        let index = self.cursor.selected();
        let Some(message) = self.messages.get_mut(index) else {
            return Ok(());
        };
        for tag in tags {
            let tag = tag.as_ref();
            op.persist(self.ctx.tags.as_ref(), TagTarget::Message(&message.id), tag)?;
            op.apply(&mut message.tags, tag);
        }
        // the header block shows the tags
        let lines = message_lines(message);
        self.pager.set_lines(lines);
        Ok(())
    }

    /// Show the selected message from the top and mark it read.
    fn load_selected_message(&mut self) {
        let Some(message) = self.messages.get(self.cursor.selected()) else {
            return;
        };
        self.pager.set_lines(message_lines(message));
        if message.is_unread() {
            let policy = self.ctx.policy();
            self.edit_tags(TagOp::Remove, &[UNREAD_TAG]).report(&policy);
        }
    }
}

impl View for ThreadMessageView {
    fn title(&self) -> String {
        let subject = self
            .messages
            .first()
            .map(|m| m.subject.as_str())
            .unwrap_or_default();
        format!("thread: {subject}")
    }

    fn key_scopes(&mut self) -> Vec<&mut dyn InputHandler> {
        let mut scopes: Vec<&mut dyn InputHandler> = Vec::new();
        scopes.push(&mut self.keys);
        scopes.push(&mut self.pager);
        scopes
    }

    fn perform_fired(&mut self) {
        if let Some(action) = self.keys.take_fired() {
            self.perform(action);
        }
    }

    fn status(&self) -> Vec<String> {
        vec![
            format!(
                "message {} of {}",
                self.cursor.selected() + 1,
                self.messages.len()
            ),
            self.pager.status(),
        ]
    }

    fn resize(&mut self, height: u16) {
        // one row separates the two panes
        let pager_height = height.saturating_sub(THREAD_VIEW_HEIGHT + 1);
        self.pager.resize(pager_height.into());
    }

    fn take_dirty(&mut self) -> bool {
        self.cursor.take_dirty() | self.pager.take_dirty()
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let [top, separator, bottom] = Layout::vertical([
            Constraint::Length(THREAD_VIEW_HEIGHT),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .areas(area);

        let now = chrono::Utc::now().timestamp();
        let selected = self.cursor.selected();
        let range = self.cursor.visible_range(self.messages.len());
        let start = range.start;
        let rows: Vec<MessageRow> = self.messages[range]
            .iter()
            .enumerate()
            .map(|(i, m)| MessageRow::new(m, start + i == selected, now))
            .collect();
        ui::draw_messages(frame, top, &rows);
        ui::draw_separator(frame, separator);
        self.pager.render(frame, bottom);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::app::AppCommand;
    use crate::input::HandleResult;
    use crate::test_utils::{TestContext, dispatch, numbered_store};

    fn press(view: &mut ThreadMessageView, notation: &str) -> HandleResult {
        dispatch(view, notation)
    }

    fn open(ctx: &TestContext, id: &str) -> ThreadMessageView {
        ThreadMessageView::new(ctx.view_context(), ThreadId::new(id), 30).unwrap()
    }

    #[test]
    fn unknown_thread_is_an_error() {
        let ctx = TestContext::new(numbered_store(1));
        let err = ThreadMessageView::new(ctx.view_context(), ThreadId::new("nope"), 30).unwrap_err();
        assert_eq!(err, Error::InvalidThread("nope".into()));
    }

    #[test]
    fn loading_marks_message_read() {
        // even threads start unread
        let ctx = TestContext::new(numbered_store(2));
        let view = open(&ctx, "t000");
        assert!(!view.selected_message().unwrap().is_unread());
        let stored = ctx.store.thread(&ThreadId::new("t000")).unwrap();
        assert!(!stored.messages[0].is_unread());
        assert!(view.pager().lines()[0].starts_with("From: "));
    }

    #[test]
    fn message_keys_switch_and_reset_pager() {
        let ctx = TestContext::new(numbered_store(4));
        let mut view = open(&ctx, "t003");
        assert_eq!(view.messages().len(), 2);

        assert_eq!(press(&mut view, "<End>"), HandleResult::Handled);
        assert!(view.pager().cursor().selected() > 0);

        assert_eq!(press(&mut view, "<C-n>"), HandleResult::Handled);
        assert_eq!(view.status()[0], "message 2 of 2");
        assert_eq!(view.pager().cursor().selected(), 0);

        // already on the last message
        press(&mut view, "<C-n>");
        assert_eq!(view.status()[0], "message 2 of 2");

        press(&mut view, "<C-p>");
        assert_eq!(view.status()[0], "message 1 of 2");
    }

    #[test]
    fn tag_edits_target_the_selected_message() {
        let ctx = TestContext::new(numbered_store(4));
        ctx.prompt.push_text("flagged");
        let mut view = open(&ctx, "t003");
        press(&mut view, "+");

        let stored = ctx.store.thread(&ThreadId::new("t003")).unwrap();
        assert!(stored.messages[0].tags.contains("flagged"));
        assert!(!stored.messages[1].tags.contains("flagged"));
        assert!(view.pager().lines().iter().any(|l| l.contains("flagged")));
    }

    #[test]
    fn rejected_read_marker_is_reported_not_fatal() {
        let ctx = TestContext::new(numbered_store(1).reject_tags("read-only"));
        let view = open(&ctx, "t000");
        assert!(view.selected_message().unwrap().is_unread());
        assert_eq!(
            ctx.commands(),
            vec![AppCommand::Notify(
                "could not change tag `unread`: read-only".into()
            )]
        );
    }

    #[test]
    fn pager_handles_what_the_view_does_not() {
        let ctx = TestContext::new(numbered_store(1));
        let mut view = open(&ctx, "t000");
        assert_eq!(press(&mut view, "<Down>"), HandleResult::Handled);
        assert_eq!(view.pager().cursor().selected(), 1);
        assert_eq!(press(&mut view, "x"), HandleResult::NoMatch);
    }
}
