use ratatui::{Frame, layout::Rect};

use crate::input::{BindingTrie, InputHandler, KeyScope};
use crate::user_config::Keymap;
use crate::views::View;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewManagerAction {
    CloseView,
    NextView,
    PreviousView,
}

/// The stack of open views. Keys it does not bind go to the active view.
pub struct ViewManager {
    keys: KeyScope<ViewManagerAction>,
    views: Vec<Box<dyn View>>,
    active: usize,
}

impl ViewManager {
    pub fn new(keymap: &Keymap) -> Self {
        let mut bindings = BindingTrie::new();
        bindings.bind_or(keymap, "closeView", "q", ViewManagerAction::CloseView);
        bindings.bind_or(keymap, "nextView", "<Tab>", ViewManagerAction::NextView);
        bindings.bind_or(keymap, "previousView", "<BackTab>", ViewManagerAction::PreviousView);
        Self {
            keys: KeyScope::new(bindings),
            views: Vec::new(),
            active: 0,
        }
    }

    /// Open `view` on top and make it active.
    pub fn add_view(&mut self, view: Box<dyn View>) {
        tracing::debug!(title = %view.title(), "view opened");
        self.views.push(view);
        self.active = self.views.len() - 1;
    }

    pub fn close_active(&mut self) {
        if self.views.is_empty() {
            return;
        }
        let closed = self.views.remove(self.active);
        tracing::debug!(title = %closed.title(), "view closed");
        self.active = self.active.saturating_sub(1).min(self.views.len().saturating_sub(1));
    }

    pub fn perform(&mut self, action: ViewManagerAction) {
        let count = self.views.len();
        match action {
            ViewManagerAction::CloseView => self.close_active(),
            ViewManagerAction::NextView if count > 0 => self.active = (self.active + 1) % count,
            ViewManagerAction::PreviousView if count > 0 => {
                self.active = (self.active + count - 1) % count;
            }
            ViewManagerAction::NextView | ViewManagerAction::PreviousView => {}
        }
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active(&self) -> Option<&dyn View> {
        self.views.get(self.active).map(Box::as_ref)
    }

    pub fn titles(&self) -> Vec<String> {
        self.views.iter().map(|v| v.title()).collect()
    }

    /// Let every view poll its background work, not only the visible one.
    pub fn update(&mut self) {
        self.views.iter_mut().for_each(|v| v.update());
    }

    pub fn resize(&mut self, height: u16) {
        self.views.iter_mut().for_each(|v| v.resize(height));
    }

    pub fn take_dirty(&mut self) -> bool {
        self.views
            .iter_mut()
            .fold(false, |dirty, v| v.take_dirty() | dirty)
    }

    /// The manager's own bindings followed by the active view's scopes.
    pub fn key_scopes(&mut self) -> Vec<&mut dyn InputHandler> {
        let mut scopes: Vec<&mut dyn InputHandler> = Vec::new();
        scopes.push(&mut self.keys);
        if let Some(view) = self.views.get_mut(self.active) {
            scopes.extend(view.key_scopes());
        }
        scopes
    }

    /// Run whatever the last dispatch matched, in the active view or here.
    pub fn perform_fired(&mut self) {
        if let Some(view) = self.views.get_mut(self.active) {
            view.perform_fired();
        }
        if let Some(action) = self.keys.take_fired() {
            self.perform(action);
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        if let Some(view) = self.active() {
            view.render(frame, area);
        }
    }
}
