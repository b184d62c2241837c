//! One-line text prompts: search terms, tags, thread ids.

use std::cell::{Cell, RefCell};
use std::io::{self, Write};

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    queue,
    style::Print,
    terminal::{self, ClearType},
};
use fxhash::FxHashMap;

/// What the user typed, or that they backed out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptOutcome {
    Text(String),
    Cancelled,
}

impl PromptOutcome {
    /// The entered text if it holds anything but whitespace.
    pub fn non_empty(self) -> Option<String> {
        match self {
            PromptOutcome::Text(text) if !text.trim().is_empty() => Some(text),
            _ => None,
        }
    }
}

pub trait Prompt {
    /// Ask for one line of input. `history_key` selects the history list the
    /// entry is recalled from and appended to.
    fn request_line(&self, prompt: &str, history_key: &str) -> PromptOutcome;
}

/// Reads a line on the bottom row of the terminal, bypassing the ratatui
/// buffer. The caller must redraw everything afterwards; see
/// [`TerminalPrompt::take_damage`].
#[derive(Debug, Default)]
pub struct TerminalPrompt {
    history: RefCell<FxHashMap<String, Vec<String>>>,
    damaged: Cell<bool>,
}

impl TerminalPrompt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a prompt drew over the screen since the last call.
    pub fn take_damage(&self) -> bool {
        self.damaged.replace(false)
    }

    fn draw(out: &mut impl Write, row: u16, prompt: &str, line: &str) -> io::Result<()> {
        queue!(
            out,
            cursor::MoveTo(0, row),
            terminal::Clear(ClearType::CurrentLine),
            Print(prompt),
            Print(line),
            cursor::Show
        )?;
        out.flush()
    }

    fn read_line(&self, prompt: &str, history_key: &str) -> io::Result<PromptOutcome> {
        let (_, rows) = terminal::size()?;
        let row = rows.saturating_sub(1);
        let history = self
            .history
            .borrow()
            .get(history_key)
            .cloned()
            .unwrap_or_default();
        let mut recalled = history.len();
        let mut line = String::new();
        let mut out = io::stdout();

        Self::draw(&mut out, row, prompt, &line)?;
        let outcome = loop {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind == KeyEventKind::Release {
                continue;
            }
            match key.code {
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    break PromptOutcome::Cancelled;
                }
                KeyCode::Esc => break PromptOutcome::Cancelled,
                KeyCode::Enter => break PromptOutcome::Text(line),
                KeyCode::Backspace => {
                    line.pop();
                }
                KeyCode::Up if recalled > 0 => {
                    recalled -= 1;
                    line = history[recalled].clone();
                }
                KeyCode::Down if recalled < history.len() => {
                    recalled += 1;
                    line = history.get(recalled).cloned().unwrap_or_default();
                }
                KeyCode::Char(c) => line.push(c),
                _ => {}
            }
            Self::draw(&mut out, row, prompt, &line)?;
        };
        queue!(out, cursor::Hide)?;
        out.flush()?;

        if let PromptOutcome::Text(text) = &outcome {
            if !text.is_empty() {
                let mut history = self.history.borrow_mut();
                let entries = history.entry(history_key.to_string()).or_default();
                entries.retain(|e| e != text);
                entries.push(text.clone());
            }
        }
        Ok(outcome)
    }
}

impl Prompt for TerminalPrompt {
    fn request_line(&self, prompt: &str, history_key: &str) -> PromptOutcome {
        self.damaged.set(true);
        match self.read_line(prompt, history_key) {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(error = %e, prompt, "prompt failed, treating as cancelled");
                PromptOutcome::Cancelled
            }
        }
    }
}
