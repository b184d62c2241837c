//! Key tokens and the textual notation used by keymaps.
//!
//! Notation: literal characters stand for themselves, `<Name>` for named keys
//! (`<Down>`, `<PageUp>`, `<Enter>`, `<F5>`, ...), `<C-x>` and `<M-x>` for
//! control and alt chords, `<Space>` and `<lt>` for a space and a literal `<`.
//! Plain ASCII spaces separate keys and are otherwise ignored, so `"g g"` and
//! `"gg"` are the same sequence. A raw newline reads as `<Enter>`, a raw tab as
//! `<Tab>`.

use std::fmt;
use std::str::FromStr;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ner_error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedKey {
    Up,
    Down,
    Left,
    Right,
    PageUp,
    PageDown,
    Home,
    End,
    Enter,
    Tab,
    BackTab,
    Esc,
    Backspace,
    Delete,
    Insert,
    F(u8),
}

impl NamedKey {
    fn parse(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        let key = match lower.as_str() {
            "up" => Self::Up,
            "down" => Self::Down,
            "left" => Self::Left,
            "right" => Self::Right,
            "pageup" | "pgup" => Self::PageUp,
            "pagedown" | "pgdn" => Self::PageDown,
            "home" => Self::Home,
            "end" => Self::End,
            "enter" | "cr" | "return" => Self::Enter,
            "tab" => Self::Tab,
            "backtab" | "s-tab" => Self::BackTab,
            "esc" | "escape" => Self::Esc,
            "backspace" | "bs" => Self::Backspace,
            "delete" | "del" => Self::Delete,
            "insert" | "ins" => Self::Insert,
            f if f.starts_with('f') => {
                let n: u8 = f[1..].parse().ok()?;
                if !(1..=24).contains(&n) {
                    return None;
                }
                Self::F(n)
            }
            _ => return None,
        };
        Some(key)
    }
}

impl fmt::Display for NamedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamedKey::F(n) => write!(f, "F{n}"),
            other => write!(f, "{other:?}"),
        }
    }
}

/// One atomic unit of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyToken {
    Char(char),
    Ctrl(char),
    Alt(char),
    Named(NamedKey),
}

impl KeyToken {
    /// Clears the pending sequence without consulting any scope.
    pub const INTERRUPT: KeyToken = KeyToken::Ctrl('c');
    /// Removes the last pending key.
    pub const BACKSPACE: KeyToken = KeyToken::Named(NamedKey::Backspace);

    /// Translate a terminal key event. Releases and keys without a token
    /// (media keys, bare modifiers) yield `None`.
    pub fn from_event(event: KeyEvent) -> Option<Self> {
        if event.kind == KeyEventKind::Release {
            return None;
        }
        let token = match event.code {
            KeyCode::Char(c) if event.modifiers.contains(KeyModifiers::CONTROL) => {
                KeyToken::Ctrl(c.to_ascii_lowercase())
            }
            KeyCode::Char(c) if event.modifiers.contains(KeyModifiers::ALT) => KeyToken::Alt(c),
            KeyCode::Char(c) => KeyToken::Char(c),
            KeyCode::Up => KeyToken::Named(NamedKey::Up),
            KeyCode::Down => KeyToken::Named(NamedKey::Down),
            KeyCode::Left => KeyToken::Named(NamedKey::Left),
            KeyCode::Right => KeyToken::Named(NamedKey::Right),
            KeyCode::PageUp => KeyToken::Named(NamedKey::PageUp),
            KeyCode::PageDown => KeyToken::Named(NamedKey::PageDown),
            KeyCode::Home => KeyToken::Named(NamedKey::Home),
            KeyCode::End => KeyToken::Named(NamedKey::End),
            KeyCode::Enter => KeyToken::Named(NamedKey::Enter),
            KeyCode::Tab => KeyToken::Named(NamedKey::Tab),
            KeyCode::BackTab => KeyToken::Named(NamedKey::BackTab),
            KeyCode::Esc => KeyToken::Named(NamedKey::Esc),
            KeyCode::Backspace => KeyToken::Named(NamedKey::Backspace),
            KeyCode::Delete => KeyToken::Named(NamedKey::Delete),
            KeyCode::Insert => KeyToken::Named(NamedKey::Insert),
            KeyCode::F(n) => KeyToken::Named(NamedKey::F(n)),
            _ => return None,
        };
        Some(token)
    }

    fn parse_bracketed(inner: &str, input: &str) -> Result<Self, Error> {
        let chord = |rest: &str| {
            let mut chars = rest.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(c),
                _ => Err(Error::key_notation(
                    input,
                    format!("chord `<{inner}>` must name exactly one character"),
                )),
            }
        };
        if let Some(rest) = inner.strip_prefix("C-").or_else(|| inner.strip_prefix("c-")) {
            return Ok(KeyToken::Ctrl(chord(rest)?.to_ascii_lowercase()));
        }
        if let Some(rest) = ["M-", "m-", "A-", "a-"]
            .iter()
            .find_map(|p| inner.strip_prefix(p))
        {
            return Ok(KeyToken::Alt(chord(rest)?));
        }
        match inner.to_ascii_lowercase().as_str() {
            "space" => return Ok(KeyToken::Char(' ')),
            "lt" => return Ok(KeyToken::Char('<')),
            _ => {}
        }
        NamedKey::parse(inner)
            .map(KeyToken::Named)
            .ok_or_else(|| Error::key_notation(input, format!("unknown key name `<{inner}>`")))
    }
}

impl fmt::Display for KeyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyToken::Char(' ') => f.write_str("<Space>"),
            KeyToken::Char('<') => f.write_str("<lt>"),
            KeyToken::Char(c) => write!(f, "{c}"),
            KeyToken::Ctrl(c) => write!(f, "<C-{c}>"),
            KeyToken::Alt(c) => write!(f, "<M-{c}>"),
            KeyToken::Named(named) => write!(f, "<{named}>"),
        }
    }
}

/// An ordered run of key tokens, as written in a keymap.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeySequence(Vec<KeyToken>);

impl KeySequence {
    pub fn new(tokens: Vec<KeyToken>) -> Self {
        Self(tokens)
    }

    pub fn as_slice(&self) -> &[KeyToken] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromStr for KeySequence {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut tokens = Vec::new();
        let mut chars = input.chars();
        while let Some(c) = chars.next() {
            match c {
                ' ' => {}
                '\n' | '\r' => tokens.push(KeyToken::Named(NamedKey::Enter)),
                '\t' => tokens.push(KeyToken::Named(NamedKey::Tab)),
                '<' => {
                    let mut inner = String::new();
                    let mut closed = false;
                    for c in chars.by_ref() {
                        if c == '>' {
                            closed = true;
                            break;
                        }
                        inner.push(c);
                    }
                    if !closed || inner.is_empty() {
                        return Err(Error::key_notation(input, "unterminated or empty `<...>`"));
                    }
                    tokens.push(KeyToken::parse_bracketed(&inner, input)?);
                }
                c => tokens.push(KeyToken::Char(c)),
            }
        }
        if tokens.is_empty() {
            return Err(Error::key_notation(input, "empty key sequence"));
        }
        Ok(Self(tokens))
    }
}

impl fmt::Display for KeySequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.0 {
            write!(f, "{token}")?;
        }
        Ok(())
    }
}

impl From<Vec<KeyToken>> for KeySequence {
    fn from(tokens: Vec<KeyToken>) -> Self {
        Self(tokens)
    }
}

/// Render pending keys for the status bar.
pub fn notation(keys: &[KeyToken]) -> String {
    keys.iter().map(ToString::to_string).collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn seq(s: &str) -> Vec<KeyToken> {
        s.parse::<KeySequence>().unwrap().as_slice().to_vec()
    }

    #[test]
    fn parses_literals_and_named_keys() {
        assert_eq!(seq("gg"), vec![KeyToken::Char('g'), KeyToken::Char('g')]);
        assert_eq!(seq("g g"), seq("gg"));
        assert_eq!(seq("<Down>"), vec![KeyToken::Named(NamedKey::Down)]);
        assert_eq!(seq("<pagedown>"), vec![KeyToken::Named(NamedKey::PageDown)]);
        assert_eq!(seq("\n"), vec![KeyToken::Named(NamedKey::Enter)]);
        assert_eq!(seq("<C-L>"), vec![KeyToken::Ctrl('l')]);
        assert_eq!(seq("<M-x>"), vec![KeyToken::Alt('x')]);
        assert_eq!(seq("<F12>"), vec![KeyToken::Named(NamedKey::F(12))]);
        assert_eq!(
            seq("<Space><lt>="),
            vec![KeyToken::Char(' '), KeyToken::Char('<'), KeyToken::Char('=')]
        );
    }

    #[test]
    fn rejects_bad_notation() {
        for bad in ["", "   ", "<Down", "<>", "<Nope>", "<C-ab>", "<F99>"] {
            let err = bad.parse::<KeySequence>().unwrap_err();
            assert!(
                matches!(err, Error::KeyNotation { .. }),
                "`{bad}` gave {err:?}"
            );
        }
    }

    #[test]
    fn display_round_trips_through_notation() {
        let original = seq("<C-n>a<Space><PageDown><lt>");
        let shown = KeySequence::new(original.clone()).to_string();
        assert_eq!(shown, "<C-n>a<Space><PageDown><lt>");
        assert_eq!(seq(&shown), original);
    }

    #[test]
    fn translates_terminal_events() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(KeyToken::from_event(ctrl_c), Some(KeyToken::INTERRUPT));

        let shifted = KeyEvent::new(KeyCode::Char('Q'), KeyModifiers::SHIFT);
        assert_eq!(KeyToken::from_event(shifted), Some(KeyToken::Char('Q')));

        let mut release = KeyEvent::new(KeyCode::Down, KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        assert_eq!(KeyToken::from_event(release), None);

        let backspace = KeyEvent::new(KeyCode::Backspace, KeyModifiers::NONE);
        assert_eq!(KeyToken::from_event(backspace), Some(KeyToken::BACKSPACE));
    }
}
