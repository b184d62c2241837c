//! Test doubles for the interactive seams.

use std::cell::RefCell;
use std::collections::VecDeque;

use crate::prompt::{Prompt, PromptOutcome};

/// Answers prompts from a fixed script and records what was asked. Runs out
/// into [`PromptOutcome::Cancelled`].
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: RefCell<VecDeque<PromptOutcome>>,
    asked: RefCell<Vec<(String, String)>>,
}

impl ScriptedPrompt {
    pub fn new(answers: impl IntoIterator<Item = PromptOutcome>) -> Self {
        Self {
            answers: RefCell::new(answers.into_iter().collect()),
            asked: RefCell::default(),
        }
    }

    pub fn push(&self, answer: PromptOutcome) {
        self.answers.borrow_mut().push_back(answer);
    }

    pub fn push_text(&self, text: &str) {
        self.push(PromptOutcome::Text(text.to_string()));
    }

    /// `(prompt, history_key)` pairs in the order they were requested.
    pub fn asked(&self) -> Vec<(String, String)> {
        self.asked.borrow().clone()
    }
}

impl Prompt for ScriptedPrompt {
    fn request_line(&self, prompt: &str, history_key: &str) -> PromptOutcome {
        self.asked
            .borrow_mut()
            .push((prompt.to_string(), history_key.to_string()));
        self.answers
            .borrow_mut()
            .pop_front()
            .unwrap_or(PromptOutcome::Cancelled)
    }
}
