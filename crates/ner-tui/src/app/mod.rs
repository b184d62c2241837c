//! The application scope and main loop.
//!
//! Dispatch order for every key: [`AppScope`] (quit, search, open thread,
//! redraw), then the [`ViewManager`], then the active view and whatever the
//! view nests. Views never open other views directly; they post an
//! [`AppCommand`] that the loop drains after the key is handled.

pub mod status_bar;
pub mod view_manager;

use std::time::Duration;

use crossterm::event::{self, Event};
use ner_core::{MessageId, ThreadId};
use ner_error::ResultExt;
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Constraint, Layout},
};

pub use status_bar::{STATUS_BAR_HEIGHT, StatusBar};
pub use view_manager::{ViewManager, ViewManagerAction};

use crate::input::{BindingTrie, HandleResult, InputHandler, KeyDispatcher, KeyScope, KeyToken, ScopeChain};
use crate::prompt::TerminalPrompt;
use crate::views::{MessageView, SearchView, ThreadMessageView, ViewContext};

/// Requests posted by views and scopes, handled by the loop after each key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    OpenSearch(String),
    OpenThread(ThreadId),
    OpenMessage(MessageId),
    /// Show a one-shot message in the status bar.
    Notify(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    Quit,
    Search,
    OpenThread,
    OpenMessage,
    Redraw,
}

/// Outermost dispatch scope. Owns the view manager, so it can lay out the
/// whole chain for a key press.
pub struct AppScope {
    keys: KeyScope<AppAction>,
    views: ViewManager,
    ctx: ViewContext,
    running: bool,
    redraw: bool,
}

impl AppScope {
    pub fn new(ctx: ViewContext) -> Self {
        let keymaps = &ctx.config.keymaps;
        let mut bindings = BindingTrie::new();
        bindings.bind_or(&keymaps.main, "quit", "Q", AppAction::Quit);
        bindings.bind_or(&keymaps.main, "search", "s", AppAction::Search);
        bindings.bind_or(&keymaps.main, "openMessage", "M", AppAction::OpenMessage);
        bindings.bind_or(&keymaps.main, "openThread", "T", AppAction::OpenThread);
        bindings.bind_or(&keymaps.main, "redraw", "<C-l>", AppAction::Redraw);
        let views = ViewManager::new(&keymaps.view_manager);
        Self {
            keys: KeyScope::new(bindings),
            views,
            ctx,
            running: true,
            redraw: false,
        }
    }

    pub fn perform(&mut self, action: AppAction) {
        match action {
            AppAction::Quit => self.running = false,
            AppAction::Search => {
                let terms = self.ctx.prompt.request_line("Search: ", "search");
                if let Some(terms) = terms.non_empty() {
                    self.ctx.send(AppCommand::OpenSearch(terms));
                }
            }
            AppAction::OpenThread => {
                let id = self.ctx.prompt.request_line("Thread ID: ", "thread-id");
                if let Some(id) = id.non_empty() {
                    let id = id.trim();
                    let id = id.strip_prefix("thread:").unwrap_or(id);
                    self.ctx.send(AppCommand::OpenThread(ThreadId::new(id)));
                }
            }
            AppAction::OpenMessage => {
                let id = self.ctx.prompt.request_line("Message ID: ", "message-id");
                if let Some(id) = id.non_empty() {
                    let id = id.trim();
                    let id = match id.strip_prefix("id:") {
                        Some(rest) if !rest.is_empty() => rest,
                        _ => id,
                    };
                    self.ctx.send(AppCommand::OpenMessage(MessageId::new(id)));
                }
            }
            AppAction::Redraw => self.redraw = true,
        }
    }

    pub fn views(&self) -> &ViewManager {
        &self.views
    }

    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.redraw)
    }

    /// Every scope a key press is offered to, in order: the application
    /// bindings, the view manager, the active view and its sub-views.
    pub fn key_scopes(&mut self) -> Vec<&mut dyn InputHandler> {
        let mut scopes: Vec<&mut dyn InputHandler> = Vec::new();
        scopes.push(&mut self.keys);
        scopes.extend(self.views.key_scopes());
        scopes
    }

    /// Run the action the last dispatch matched, wherever in the chain it
    /// was.
    pub fn perform_fired(&mut self) {
        self.views.perform_fired();
        if let Some(action) = self.keys.take_fired() {
            self.perform(action);
        }
    }
}

pub struct App {
    dispatcher: KeyDispatcher,
    scope: AppScope,
    status: StatusBar,
    commands: flume::Receiver<AppCommand>,
    ctx: ViewContext,
    height: u16,
}

impl App {
    /// `height` is the full terminal height; views get what the status bar
    /// leaves.
    pub fn new(ctx: ViewContext, commands: flume::Receiver<AppCommand>, height: u16) -> Self {
        Self {
            dispatcher: KeyDispatcher::new(),
            scope: AppScope::new(ctx.clone()),
            status: StatusBar::default(),
            commands,
            ctx,
            height,
        }
    }

    fn view_height(&self) -> u16 {
        self.height.saturating_sub(STATUS_BAR_HEIGHT).max(1)
    }

    pub fn is_running(&self) -> bool {
        self.scope.running && !self.scope.views.is_empty()
    }

    pub fn scope(&self) -> &AppScope {
        &self.scope
    }

    pub fn status(&self) -> &StatusBar {
        &self.status
    }

    pub fn pending_notation(&self) -> String {
        self.dispatcher.pending_notation()
    }

    pub fn open_search(&mut self, terms: &str) {
        let view = SearchView::new(self.ctx.clone(), terms, self.view_height());
        self.scope.views.add_view(Box::new(view));
    }

    pub fn open_thread(&mut self, id: ThreadId) {
        let view = ThreadMessageView::new(self.ctx.clone(), id, self.view_height());
        if let Some(view) = view.report(&self.ctx.policy()) {
            self.scope.views.add_view(Box::new(view));
        }
    }

    pub fn open_message(&mut self, id: &MessageId) {
        let view = MessageView::new(&self.ctx, id, self.view_height());
        if let Some(view) = view.report(&self.ctx.policy()) {
            self.scope.views.add_view(Box::new(view));
        }
    }

    /// Run one key through the dispatch chain, then act on what it posted.
    pub fn handle_key(&mut self, key: KeyToken) -> HandleResult {
        self.status.clear_message();
        let result = {
            let mut chain = ScopeChain::new(self.scope.key_scopes());
            self.dispatcher.press(key, &mut chain)
        };
        self.scope.perform_fired();
        self.process_commands();
        result
    }

    pub fn process_commands(&mut self) {
        // handlers may post more commands, e.g. a failed open posts a notice
        while let Ok(command) = self.commands.try_recv() {
            match command {
                AppCommand::OpenSearch(terms) => self.open_search(&terms),
                AppCommand::OpenThread(id) => self.open_thread(id),
                AppCommand::OpenMessage(id) => self.open_message(&id),
                AppCommand::Notify(message) => self.status.display_message(message),
            }
        }
    }

    pub fn update(&mut self) {
        self.scope.views.update();
        self.process_commands();
    }

    pub fn resize(&mut self, height: u16) {
        self.height = height;
        let view_height = self.view_height();
        self.scope.views.resize(view_height);
    }

    pub fn take_dirty(&mut self) -> bool {
        self.scope.views.take_dirty() | self.status.take_dirty()
    }

    pub fn draw(&self, frame: &mut Frame) {
        let [body, bar] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(STATUS_BAR_HEIGHT)])
                .areas(frame.area());
        self.scope.views.render(frame, body);

        let (title, segments) = match self.scope.views.active() {
            Some(view) => (view.title(), view.status()),
            None => (String::new(), Vec::new()),
        };
        self.status
            .render(frame, bar, &title, &segments, &self.dispatcher.pending_notation());
    }

    /// Draw, read keys and poll views until quit or the last view closes.
    pub fn run(&mut self, terminal: &mut DefaultTerminal, prompt: &TerminalPrompt) -> color_eyre::Result<()> {
        let tick = self.ctx.config.poll_interval().max(Duration::from_millis(10));
        let mut dirty = true;
        while self.is_running() {
            if dirty {
                terminal.draw(|frame| self.draw(frame))?;
            }
            dirty = false;

            if event::poll(tick)? {
                match event::read()? {
                    Event::Key(key) => {
                        if let Some(token) = KeyToken::from_event(key) {
                            self.handle_key(token);
                            dirty = true;
                        }
                    }
                    Event::Resize(_, rows) => {
                        self.resize(rows);
                        dirty = true;
                    }
                    _ => {}
                }
            }

            self.update();
            dirty |= self.take_dirty();
            if prompt.take_damage() | self.scope.take_redraw() {
                terminal.clear()?;
                dirty = true;
            }
        }
        tracing::info!("main loop finished");
        Ok(())
    }
}
