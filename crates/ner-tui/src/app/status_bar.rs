use ratatui::{Frame, layout::Rect};

use crate::ui;

/// Rows taken by the status line plus the message line under it.
pub const STATUS_BAR_HEIGHT: u16 = 2;

/// Holds the one-shot message shown under the status line. The message stays
/// up until the next key press.
#[derive(Debug, Default)]
pub struct StatusBar {
    message: Option<String>,
    dirty: bool,
}

impl StatusBar {
    pub fn display_message(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
        self.dirty = true;
    }

    pub fn clear_message(&mut self) {
        if self.message.take().is_some() {
            self.dirty = true;
        }
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn render(
        &self,
        frame: &mut Frame,
        area: Rect,
        title: &str,
        segments: &[String],
        pending: &str,
    ) {
        ui::draw_status_bar(frame, area, title, segments, pending, self.message());
    }
}
