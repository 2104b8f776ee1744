//! Choice list: the numbered options under the story.

use super::frame::Frame;
use super::layout::Rect;
use super::style::{Attrs, Line, Rgb, Style};
use super::widget::Widget;
use crate::actor::{InputEvent, KeyCode};

/// Up to three selectable choices.
///
/// Digits pick a choice directly; Up/Down move a highlight that Enter
/// activates. While disabled (a story is generating) the list is dimmed
/// and ignores input.
#[derive(Debug)]
pub struct ChoiceList {
    choices: Vec<String>,
    selected: Option<usize>,
    enabled: bool,
    bounds: Rect,
    dirty: bool,
}

impl ChoiceList {
    /// Create an empty list.
    pub const fn new(bounds: Rect) -> Self {
        Self {
            choices: Vec::new(),
            selected: None,
            enabled: true,
            bounds,
            dirty: true,
        }
    }

    /// Replace the choices and drop the highlight.
    pub fn set_choices(&mut self, choices: Vec<String>) {
        self.choices = choices;
        self.selected = None;
        self.dirty = true;
    }

    /// Current choices.
    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    /// Enable or disable selection.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            self.enabled = enabled;
            self.dirty = true;
        }
    }

    /// Whether the list accepts input.
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Highlighted index.
    pub const fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Text of the highlighted choice.
    pub fn selected_choice(&self) -> Option<&str> {
        self.selected
            .and_then(|i| self.choices.get(i))
            .map(String::as_str)
    }

    /// Choice bound to digit key `digit`, if enabled and present.
    pub fn choice_for_digit(&self, digit: char) -> Option<&str> {
        if !self.enabled {
            return None;
        }
        let index = digit.to_digit(10)?.checked_sub(1)?;
        self.choices.get(index as usize).map(String::as_str)
    }

    fn move_selection(&mut self, down: bool) {
        if self.choices.is_empty() {
            return;
        }
        let last = self.choices.len() - 1;
        self.selected = Some(match (self.selected, down) {
            (None, true) => 0,
            (None, false) => last,
            (Some(i), true) => (i + 1).min(last),
            (Some(i), false) => i.saturating_sub(1),
        });
        self.dirty = true;
    }
}

impl Widget for ChoiceList {
    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
        self.dirty = true;
    }

    fn render(&self, frame: &mut Frame) {
        let rows = self.choices.iter().enumerate().map(|(i, choice)| {
            let highlighted = self.enabled && self.selected == Some(i);
            let (number, text) = if !self.enabled {
                let dim = Style::fg(Rgb::MUTED).with(Attrs::DIM);
                (dim, dim)
            } else if highlighted {
                let hl = Style::fg(Rgb::ACCENT).with(Attrs::REVERSED | Attrs::BOLD);
                (hl, hl)
            } else {
                (Style::fg(Rgb::ACCENT).with(Attrs::BOLD), Style::fg(Rgb::WHITE))
            };
            let mut line = Line::blank();
            line.push(" ", Style::PLAIN);
            line.push(format!("[{}]", i + 1), number);
            line.push(format!(" {choice}"), text);
            line
        });
        frame.set_lines(self.bounds, rows);
    }

    fn handle_input(&mut self, event: &InputEvent) -> bool {
        if !self.enabled {
            return false;
        }
        match event {
            InputEvent::Key {
                code: KeyCode::Up, ..
            } => self.move_selection(false),
            InputEvent::Key {
                code: KeyCode::Down,
                ..
            } => self.move_selection(true),
            _ => return false,
        }
        true
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

    fn list() -> ChoiceList {
        let mut list = ChoiceList::new(Rect::new(0, 0, 40, 3));
        list.set_choices(vec!["Go left".into(), "Go right".into(), "Wait".into()]);
        list
    }

    #[test]
    fn test_digits_map_to_choices() {
        let list = list();
        assert_eq!(list.choice_for_digit('1'), Some("Go left"));
        assert_eq!(list.choice_for_digit('3'), Some("Wait"));
        assert_eq!(list.choice_for_digit('4'), None);
        assert_eq!(list.choice_for_digit('0'), None);
    }

    #[test]
    fn test_arrow_selection_is_clamped() {
        let mut list = list();
        list.handle_input(&InputEvent::key(KeyCode::Down));
        assert_eq!(list.selected_choice(), Some("Go left"));
        for _ in 0..5 {
            list.handle_input(&InputEvent::key(KeyCode::Down));
        }
        assert_eq!(list.selected_choice(), Some("Wait"));
        list.handle_input(&InputEvent::key(KeyCode::Up));
        assert_eq!(list.selected(), Some(1));
    }

    #[test]
    fn test_disabled_ignores_input() {
        let mut list = list();
        list.set_enabled(false);
        assert!(!list.handle_input(&InputEvent::key(KeyCode::Down)));
        assert_eq!(list.choice_for_digit('1'), None);
    }

    #[test]
    fn test_render_rows() {
        let list = list();
        let mut frame = Frame::new(40, 3);
        list.render(&mut frame);
        assert_eq!(frame.line(0).map(Line::text), Some(" [1] Go left".to_string()));
        assert_eq!(frame.line(2).map(Line::text), Some(" [3] Wait".to_string()));
    }
}
