use ner_core::{Message, MessageId, TagTarget, UNREAD_TAG};
use ner_error::{ErrorPolicy, Result};
use ratatui::{Frame, layout::Rect};

use super::{MessagePager, TagOp, View, ViewContext, message_lines};
use crate::input::InputHandler;

/// A single message opened by id, shown in a full-height pager.
#[derive(Debug)]
pub struct MessageView {
    message: Message,
    pager: MessagePager,
}

impl MessageView {
    /// Load `id` and mark it read. Unknown ids fail with
    /// [`ner_error::Error::InvalidMessage`].
    pub fn new(ctx: &ViewContext, id: &MessageId, height: u16) -> Result<Self> {
        let mut message = ctx.query.message(id)?;
        if message.is_unread() {
            match TagOp::Remove.persist(ctx.tags.as_ref(), TagTarget::Message(id), UNREAD_TAG) {
                Ok(()) => TagOp::Remove.apply(&mut message.tags, UNREAD_TAG),
                Err(e) => ctx.policy().emit(&e),
            }
        }

        let mut pager = MessagePager::new(&ctx.config.keymaps.general);
        pager.resize(height.into());
        pager.set_lines(message_lines(&message));
        Ok(Self { message, pager })
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn pager(&self) -> &MessagePager {
        &self.pager
    }
}

impl View for MessageView {
    fn title(&self) -> String {
        format!("message: {}", self.message.subject)
    }

    fn key_scopes(&mut self) -> Vec<&mut dyn InputHandler> {
        let mut scopes: Vec<&mut dyn InputHandler> = Vec::new();
        scopes.push(&mut self.pager);
        scopes
    }

    fn perform_fired(&mut self) {}

    fn status(&self) -> Vec<String> {
        vec![format!("id: {}", self.message.id), self.pager.status()]
    }

    fn resize(&mut self, height: u16) {
        self.pager.resize(height.into());
    }

    fn take_dirty(&mut self) -> bool {
        self.pager.take_dirty()
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        self.pager.render(frame, area);
    }
}

#[cfg(test)]
mod tests {
    use ner_core::ThreadQuery;
    use ner_error::Error;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::app::AppCommand;
    use crate::input::HandleResult;
    use crate::test_utils::{TestContext, dispatch, numbered_store};

    #[test]
    fn opening_marks_read_and_scrolls() {
        let ctx = TestContext::new(numbered_store(2));
        let id = MessageId::new("m000.0");
        let mut view = MessageView::new(&ctx.view_context(), &id, 10).unwrap();

        assert!(!view.message().is_unread());
        assert!(!ctx.store.message(&id).unwrap().is_unread());
        assert_eq!(view.title(), "message: Subject 0");
        assert_eq!(view.pager().lines()[0], "From: sender0@example.org");

        assert_eq!(dispatch(&mut view, "<End>"), HandleResult::Handled);
        assert_eq!(view.status()[1], format!("line {n} of {n}", n = view.pager().lines().len()));
    }

    #[test]
    fn unknown_message_is_an_error() {
        let ctx = TestContext::new(numbered_store(1));
        let err = MessageView::new(&ctx.view_context(), &MessageId::new("nope"), 10).unwrap_err();
        assert_eq!(err, Error::InvalidMessage("nope".into()));
    }

    #[test]
    fn rejected_read_marker_keeps_message_unread() {
        let ctx = TestContext::new(numbered_store(1).reject_tags("read-only"));
        let view = MessageView::new(&ctx.view_context(), &MessageId::new("m000.0"), 10).unwrap();
        assert!(view.message().is_unread());
        assert_eq!(
            ctx.commands(),
            vec![AppCommand::Notify("could not change tag `unread`: read-only".into())]
        );
    }
}
