//! Views: the screens the view manager stacks.

pub mod line_browser;
pub mod message;
pub mod search;
pub mod thread_message;

use std::rc::Rc;
use std::sync::Arc;

use ner_core::{TagStore, TagTarget, ThreadQuery};
use ner_error::Result;
use ratatui::{Frame, layout::Rect};

pub use line_browser::{MessagePager, bind_navigation, message_lines};
pub use message::MessageView;
pub use search::{SearchAction, SearchView};
pub use thread_message::{ThreadAction, ThreadMessageView};

use crate::app::AppCommand;
use crate::error::StatusPolicy;
use crate::input::InputHandler;
use crate::prompt::Prompt;
use crate::user_config::NerConfig;

pub trait View {
    fn title(&self) -> String;

    /// This view's dispatch scopes, its own bindings first and then any
    /// nested sub-views.
    fn key_scopes(&mut self) -> Vec<&mut dyn InputHandler>;

    /// Run the action the last dispatch matched in the view's own scope.
    fn perform_fired(&mut self);

    /// Poll background work. Called once per loop iteration.
    fn update(&mut self) {}

    /// Segments for the status bar, left to right.
    fn status(&self) -> Vec<String>;

    fn resize(&mut self, height: u16);

    /// Whether the view changed since it was last asked.
    fn take_dirty(&mut self) -> bool;

    fn render(&self, frame: &mut Frame, area: Rect);
}

/// Everything a view needs from the outside world.
#[derive(Clone)]
pub struct ViewContext {
    pub query: Arc<dyn ThreadQuery>,
    pub tags: Arc<dyn TagStore>,
    pub prompt: Rc<dyn Prompt>,
    pub config: Arc<NerConfig>,
    pub commands: flume::Sender<AppCommand>,
}

impl std::fmt::Debug for ViewContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ViewContext {
    pub fn send(&self, command: AppCommand) {
        if let Err(e) = self.commands.try_send(command) {
            tracing::warn!(error = %e, "app command dropped");
        }
    }

    pub fn policy(&self) -> StatusPolicy {
        StatusPolicy::new(self.commands.clone())
    }

    /// Ask for a whitespace separated tag list. `None` if the user backed
    /// out or typed nothing.
    pub fn prompt_tags(&self) -> Option<Vec<String>> {
        self.prompt
            .request_line("Tags: ", "tags")
            .non_empty()
            .map(|line| line.split_whitespace().map(str::to_string).collect())
    }
}

/// Direction of a tag edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagOp {
    Add,
    Remove,
}

impl TagOp {
    /// Persist the change through the store.
    pub fn persist(self, store: &dyn TagStore, target: TagTarget<'_>, tag: &str) -> Result<()> {
        match self {
            TagOp::Add => store.add_tag(target, tag),
            TagOp::Remove => store.remove_tag(target, tag),
        }
    }

    /// Mirror an already persisted change in memory.
    pub fn apply(self, tags: &mut ner_core::TagSet, tag: &str) {
        match self {
            TagOp::Add => {
                tags.insert(tag);
            }
            TagOp::Remove => {
                tags.remove(tag);
            }
        }
    }
}
