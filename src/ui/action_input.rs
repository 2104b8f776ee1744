//! Action input: single-line free-text action with cursor.

use super::frame::Frame;
use super::layout::Rect;
use super::style::{Attrs, Line, Rgb, Style};
use super::widget::Widget;
use crate::actor::{InputEvent, KeyCode};
use unicode_width::UnicodeWidthStr;

const PROMPT: &str = "> ";

/// Free-text action entry.
#[derive(Debug)]
pub struct ActionInput {
    /// Current text content.
    content: String,
    /// Cursor position (byte offset on a char boundary).
    cursor: usize,
    /// Widget bounds.
    bounds: Rect,
    /// Whether typing is accepted.
    enabled: bool,
    /// Text shown when empty.
    placeholder: String,
    /// Needs redraw flag.
    dirty: bool,
}

impl ActionInput {
    /// Create an empty input.
    pub fn new(bounds: Rect) -> Self {
        Self {
            content: String::new(),
            cursor: 0,
            bounds,
            enabled: true,
            placeholder: "What do you do?".to_string(),
            dirty: true,
        }
    }

    /// Get the current text content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Check if the input is empty.
    pub const fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Set the content, moving cursor to end.
    pub fn set_content(&mut self, content: &str) {
        self.content = content.to_string();
        self.cursor = self.content.len();
        self.dirty = true;
    }

    /// Clear the content.
    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
        self.dirty = true;
    }

    /// Set the placeholder.
    pub fn set_placeholder(&mut self, placeholder: impl Into<String>) {
        self.placeholder = placeholder.into();
        self.dirty = true;
    }

    /// Enable or disable typing.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            self.enabled = enabled;
            self.dirty = true;
        }
    }

    /// Whether typing is accepted.
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Take the trimmed action, leaving the input empty.
    ///
    /// Returns `None` for blank input or while disabled; blank input is
    /// kept as typed.
    pub fn submit(&mut self) -> Option<String> {
        if !self.enabled {
            return None;
        }
        let action = self.content.trim();
        if action.is_empty() {
            return None;
        }
        let action = action.to_string();
        self.clear();
        Some(action)
    }

    /// Screen position of the cursor, when enabled.
    pub fn cursor_position(&self) -> Option<(u16, u16)> {
        if !self.enabled || self.bounds.is_empty() {
            return None;
        }
        let (offset, _) = self.window();
        let before = UnicodeWidthStr::width(&self.content[offset..self.cursor]);
        let x = usize::from(self.bounds.x) + PROMPT.len() + before;
        let x = u16::try_from(x).unwrap_or(u16::MAX);
        Some((x.min(self.bounds.x + self.bounds.width.saturating_sub(1)), self.bounds.y))
    }

    /// Byte range of `content` that fits, keeping the cursor in view.
    fn window(&self) -> (usize, usize) {
        let text_width = usize::from(self.bounds.width).saturating_sub(PROMPT.len() + 1);
        let mut start = 0;
        while UnicodeWidthStr::width(&self.content[start..self.cursor]) > text_width {
            start = next_boundary(&self.content, start);
        }
        let mut end = self.cursor;
        while end < self.content.len() {
            let next = next_boundary(&self.content, end);
            if UnicodeWidthStr::width(&self.content[start..next]) > text_width {
                break;
            }
            end = next;
        }
        (start, end)
    }

    /// Insert a character at the cursor position.
    fn insert_char(&mut self, c: char) {
        self.content.insert(self.cursor, c);
        self.cursor += c.len_utf8();
        self.dirty = true;
    }

    fn insert_str(&mut self, text: &str) {
        for c in text.chars().filter(|c| !c.is_control()) {
            self.insert_char(c);
        }
    }

    /// Delete the character before the cursor.
    fn backspace(&mut self) {
        if self.cursor > 0 {
            let prev = prev_boundary(&self.content, self.cursor);
            self.content.remove(prev);
            self.cursor = prev;
            self.dirty = true;
        }
    }

    /// Delete the character at the cursor.
    fn delete(&mut self) {
        if self.cursor < self.content.len() {
            self.content.remove(self.cursor);
            self.dirty = true;
        }
    }

    fn cursor_left(&mut self) {
        if self.cursor > 0 {
            self.cursor = prev_boundary(&self.content, self.cursor);
            self.dirty = true;
        }
    }

    fn cursor_right(&mut self) {
        if self.cursor < self.content.len() {
            self.cursor = next_boundary(&self.content, self.cursor);
            self.dirty = true;
        }
    }

    const fn cursor_home(&mut self) {
        if self.cursor != 0 {
            self.cursor = 0;
            self.dirty = true;
        }
    }

    const fn cursor_end(&mut self) {
        let end = self.content.len();
        if self.cursor != end {
            self.cursor = end;
            self.dirty = true;
        }
    }
}

fn prev_boundary(s: &str, at: usize) -> usize {
    s[..at].char_indices().last().map_or(0, |(i, _)| i)
}

fn next_boundary(s: &str, at: usize) -> usize {
    s[at..].chars().next().map_or(at, |c| at + c.len_utf8())
}

impl Widget for ActionInput {
    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
        self.dirty = true;
    }

    fn render(&self, frame: &mut Frame) {
        let bg = Rgb::new(30, 30, 30);
        let mut line = Line::blank().filled(bg);
        let prompt = if self.enabled { Rgb::ACCENT } else { Rgb::MUTED };
        line.push(PROMPT, Style::fg(prompt).on(bg).with(Attrs::BOLD));

        if self.content.is_empty() {
            line.push(
                self.placeholder.as_str(),
                Style::fg(Rgb::MUTED).on(bg).with(Attrs::ITALIC),
            );
        } else {
            let (start, end) = self.window();
            let fg = if self.enabled { Rgb::WHITE } else { Rgb::MUTED };
            line.push(&self.content[start..end], Style::fg(fg).on(bg));
        }
        frame.set_line(self.bounds.y, line);
    }

    fn handle_input(&mut self, event: &InputEvent) -> bool {
        if !self.enabled {
            return false;
        }

        match event {
            InputEvent::Key { code, modifiers } => {
                match code {
                    KeyCode::Char(c) if !modifiers.control && !modifiers.alt => {
                        self.insert_char(*c);
                    }
                    KeyCode::Backspace => self.backspace(),
                    KeyCode::Delete => self.delete(),
                    KeyCode::Left => self.cursor_left(),
                    KeyCode::Right => self.cursor_right(),
                    KeyCode::Home => self.cursor_home(),
                    KeyCode::End => self.cursor_end(),
                    _ => return false,
                }
                true
            }
            InputEvent::Paste(text) => {
                self.insert_str(text);
                true
            }
            _ => false,
        }
    }

    fn needs_redraw(&self) -> bool {
        self.dirty
    }

    fn clear_redraw(&mut self) {
        self.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(text: &str) -> ActionInput {
        let mut input = ActionInput::new(Rect::new(0, 0, 80, 1));
        for c in text.chars() {
            input.handle_input(&InputEvent::key(KeyCode::Char(c)));
        }
        input
    }

    #[test]
    fn test_typing_and_editing() {
        let mut input = typed("Hellö");
        input.handle_input(&InputEvent::key(KeyCode::Backspace));
        assert_eq!(input.content(), "Hell");

        input.handle_input(&InputEvent::key(KeyCode::Home));
        input.handle_input(&InputEvent::key(KeyCode::Delete));
        input.handle_input(&InputEvent::key(KeyCode::Right));
        input.handle_input(&InputEvent::key(KeyCode::Char('X')));
        assert_eq!(input.content(), "eXll");
    }

    #[test]
    fn test_submit_trims_and_clears() {
        let mut input = typed("  open the door ");
        assert_eq!(input.submit(), Some("open the door".to_string()));
        assert!(input.is_empty());
    }

    #[test]
    fn test_blank_submit_is_rejected() {
        let mut input = typed("   ");
        assert_eq!(input.submit(), None);
        assert_eq!(input.content(), "   ");
    }

    #[test]
    fn test_disabled_rejects_typing_and_submit() {
        let mut input = typed("run");
        input.set_enabled(false);
        assert!(!input.handle_input(&InputEvent::key(KeyCode::Char('x'))));
        assert_eq!(input.submit(), None);
        assert_eq!(input.cursor_position(), None);
    }

    #[test]
    fn test_ctrl_keys_are_not_typed() {
        let mut input = typed("a");
        assert!(!input.handle_input(&InputEvent::ctrl('n')));
        assert_eq!(input.content(), "a");
    }

    #[test]
    fn test_long_input_keeps_cursor_visible() {
        let mut input = ActionInput::new(Rect::new(0, 0, 10, 1));
        input.set_content("abcdefghijklmnop");
        let (x, _) = input.cursor_position().unwrap();
        assert!(x < 10);

        let mut frame = Frame::new(10, 1);
        input.render(&mut frame);
        let shown = frame.line(0).map(Line::text).unwrap();
        assert!(shown.ends_with('p'));
        assert!(shown.len() <= 10);
    }
}
