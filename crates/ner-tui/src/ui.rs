use chrono::{Datelike, Local, TimeZone};
use itertools::Itertools;
use ner_core::{Message, ThreadSummary};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::Paragraph,
};

pub const NEWEST_DATE_WIDTH: usize = 13;
pub const MESSAGE_COUNT_WIDTH: usize = 8;
pub const AUTHORS_WIDTH: usize = 20;

/// Human scale age of `timestamp` as seen at `now`, both unix seconds.
pub fn relative_time(timestamp: i64, now: i64) -> String {
    let age = now - timestamp;
    if age < 0 {
        return "in the future".to_string();
    }
    match age {
        0..60 => "just now".to_string(),
        60..3_600 => format!("{} mins. ago", age / 60),
        3_600..86_400 => format!("{} hours ago", age / 3_600),
        86_400..172_800 => "Yesterday".to_string(),
        _ => {
            let (Some(then), Some(today)) = (
                Local.timestamp_opt(timestamp, 0).single(),
                Local.timestamp_opt(now, 0).single(),
            ) else {
                return String::new();
            };
            if age < 7 * 86_400 {
                then.format("%A").to_string()
            } else if then.year() == today.year() {
                then.format("%B %d").to_string()
            } else {
                then.format("%F").to_string()
            }
        }
    }
}

fn fit(text: &str, width: usize) -> String {
    let clipped: String = text.chars().take(width.saturating_sub(1)).collect();
    format!("{clipped:<width$}")
}

fn row_style(unread: bool, selected: bool) -> Style {
    let mut style = Style::default();
    if unread {
        style = style.add_modifier(Modifier::BOLD);
    }
    if selected {
        style = style.add_modifier(Modifier::REVERSED);
    }
    style
}

/// Display-ready form of one search result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRow {
    pub date: String,
    pub matched: u32,
    pub total: u32,
    pub authors: String,
    pub subject: String,
    pub tags: String,
    pub unread: bool,
    pub selected: bool,
}

impl SearchRow {
    pub fn new(thread: &ThreadSummary, selected: bool, now: i64) -> Self {
        Self {
            date: relative_time(thread.newest_date, now),
            matched: thread.matched_messages,
            total: thread.total_messages,
            authors: thread.authors.clone(),
            subject: thread.subject.clone(),
            tags: thread.tags.iter().join(" "),
            unread: thread.is_unread(),
            selected,
        }
    }

    pub fn is_complete_match(&self) -> bool {
        self.matched == self.total
    }

    pub fn to_line(&self) -> Line<'static> {
        let style = row_style(self.unread, self.selected);
        let count_color = if self.is_complete_match() {
            Color::Yellow
        } else {
            Color::Gray
        };
        let count = fit(&format!("[{}/{}]", self.matched, self.total), MESSAGE_COUNT_WIDTH);
        Line::from(vec![
            Span::raw(fit(&self.date, NEWEST_DATE_WIDTH)).fg(Color::Green),
            Span::raw(count).fg(count_color),
            Span::raw(fit(&self.authors, AUTHORS_WIDTH)).fg(Color::Cyan),
            Span::raw(format!("{} ", self.subject)),
            Span::raw(self.tags.clone()).fg(Color::Red),
        ])
        .style(style)
    }
}

/// One entry of a thread's message list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRow {
    pub date: String,
    pub from: String,
    pub subject: String,
    pub unread: bool,
    pub selected: bool,
}

impl MessageRow {
    pub fn new(message: &Message, selected: bool, now: i64) -> Self {
        Self {
            date: relative_time(message.date, now),
            from: message.from.clone(),
            subject: message.subject.clone(),
            unread: message.is_unread(),
            selected,
        }
    }

    pub fn to_line(&self) -> Line<'static> {
        Line::from(vec![
            Span::raw(fit(&self.date, NEWEST_DATE_WIDTH)).fg(Color::Green),
            Span::raw(fit(&self.from, AUTHORS_WIDTH)).fg(Color::Cyan),
            Span::raw(self.subject.clone()),
        ])
        .style(row_style(self.unread, self.selected))
    }
}

pub fn draw_search(frame: &mut Frame, area: Rect, rows: &[SearchRow]) {
    let lines: Vec<Line> = rows.iter().map(SearchRow::to_line).collect();
    frame.render_widget(Paragraph::new(lines), area);
}

pub fn draw_messages(frame: &mut Frame, area: Rect, rows: &[MessageRow]) {
    let lines: Vec<Line> = rows.iter().map(MessageRow::to_line).collect();
    frame.render_widget(Paragraph::new(lines), area);
}

pub fn draw_separator(frame: &mut Frame, area: Rect) {
    let rule = "─".repeat(area.width.into());
    frame.render_widget(Paragraph::new(rule).dark_gray(), area);
}

/// Body lines with the pager's cursor line underlined.
pub fn draw_pager(frame: &mut Frame, area: Rect, lines: &[String], cursor_row: usize) {
    let lines: Vec<Line> = lines
        .iter()
        .enumerate()
        .map(|(i, l)| {
            let line = Line::raw(l.clone());
            if i == cursor_row {
                line.underlined()
            } else {
                line
            }
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), area);
}

/// Status segments joined with ` | `, pending keys right-aligned, and the
/// message line below.
pub fn draw_status_bar(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    segments: &[String],
    pending: &str,
    message: Option<&str>,
) {
    let [bar, message_line] =
        Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).areas(area);
    let [left, right] = Layout::horizontal([
        Constraint::Min(0),
        Constraint::Length(pending.chars().count() as u16 + 1),
    ])
    .areas(bar);

    let text = std::iter::once(format!("[{title}]"))
        .chain(segments.iter().cloned())
        .join(" | ");
    let bar_style = Style::default().fg(Color::White).bg(Color::Blue);
    frame.render_widget(Paragraph::new(text).style(bar_style), left);
    frame.render_widget(Paragraph::new(pending.to_string()).style(bar_style.bold()), right);
    if let Some(message) = message {
        frame.render_widget(Paragraph::new(message.to_string()), message_line);
    }
}

#[cfg(test)]
mod tests {
    use ner_core::{TagSet, ThreadId};
    use pretty_assertions::assert_eq;
    use ratatui::{Terminal, backend::TestBackend};

    use super::*;

    #[test]
    fn relative_time_buckets() {
        let now = 1_700_000_000;
        assert_eq!(relative_time(now - 5, now), "just now");
        assert_eq!(relative_time(now - 5 * 60, now), "5 mins. ago");
        assert_eq!(relative_time(now - 3 * 3_600, now), "3 hours ago");
        assert_eq!(relative_time(now - 90_000, now), "Yesterday");
        assert_eq!(relative_time(now + 10, now), "in the future");
        assert_eq!(relative_time(now - 400 * 86_400, now).len(), 10);
    }

    fn summary(matched: u32, total: u32, tags: &[&str]) -> ThreadSummary {
        ThreadSummary {
            id: ThreadId::new("t1"),
            tags: tags.iter().copied().collect::<TagSet>(),
            matched_messages: matched,
            total_messages: total,
            newest_date: 1_700_000_000,
            authors: "A Very Long Author Name, Another".into(),
            subject: "Quarterly report".into(),
        }
    }

    #[test]
    fn search_row_columns() {
        let row = SearchRow::new(&summary(1, 3, &["unread", "inbox"]), true, 1_700_000_030);
        assert!(row.unread && row.selected && !row.is_complete_match());
        assert_eq!(row.tags, "inbox unread");

        let backend = TestBackend::new(80, 1);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| draw_search(f, f.area(), &[row.clone()]))
            .unwrap();
        let buffer = terminal.backend().buffer();
        let text: String = (0..80).map(|x| buffer[(x, 0)].symbol()).collect();
        assert!(text.starts_with("just now     [1/3]   A Very Long Author  Quarterly report inbox unread"));
        assert!(buffer[(0, 0)].modifier.contains(Modifier::BOLD | Modifier::REVERSED));
    }

    #[test]
    fn status_bar_joins_segments() {
        let backend = TestBackend::new(60, 2);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                draw_status_bar(
                    f,
                    f.area(),
                    "search",
                    &["thread 1 of 2".into(), "collecting…".into()],
                    "g",
                    Some("query failed"),
                )
            })
            .unwrap();
        let buffer = terminal.backend().buffer();
        let bar: String = (0..60).map(|x| buffer[(x, 0)].symbol()).collect();
        let message: String = (0..12).map(|x| buffer[(x, 1)].symbol()).collect();
        assert!(bar.starts_with("[search] | thread 1 of 2 | collecting…"));
        assert!(bar.trim_end().ends_with('g'));
        assert_eq!(message, "query failed");
    }
}
