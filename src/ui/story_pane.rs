//! Story pane: the scrollable, word-wrapped story text.
//!
//! The pane holds the whole visible story and re-wraps it when the text or
//! the width changes. The scroll position is kept as an offset from the
//! bottom: at offset zero the pane follows the text as it is revealed,
//! and once the reader scrolls up the view stays put while text arrives.

use super::frame::Frame;
use super::layout::Rect;
use super::style::{Attrs, Line, Rgb, Style};
use super::widget::Widget;
use super::wrap::wrap;
use crate::actor::{InputEvent, KeyCode};
use crate::choices::ECHO_MARKER;

/// Rows moved per mouse wheel notch.
const WHEEL_STEP: usize = 3;

/// Scrollable story text.
#[derive(Debug)]
pub struct StoryPane {
    /// Widget bounds.
    bounds: Rect,
    /// Text as last set.
    text: String,
    /// `text` wrapped to the current width.
    rows: Vec<Line>,
    /// Current scroll offset from the bottom (0 = at bottom).
    scroll_offset: usize,
    /// Needs redraw flag.
    dirty: bool,
}

impl StoryPane {
    /// Create an empty pane.
    pub const fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            text: String::new(),
            rows: Vec::new(),
            scroll_offset: 0,
            dirty: true,
        }
    }

    /// Text currently shown.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the text.
    ///
    /// When scrolled up, the offset grows with the text so the rows in view
    /// do not move.
    pub fn set_text(&mut self, text: &str) {
        if text == self.text {
            return;
        }
        let before = self.rows.len();
        text.clone_into(&mut self.text);
        self.rewrap();
        if self.scroll_offset > 0 {
            let grown = self.rows.len().saturating_sub(before);
            self.scroll_offset += grown;
        }
        self.clamp_scroll();
        self.dirty = true;
    }

    /// Remove all text and return to the bottom.
    pub fn clear(&mut self) {
        self.text.clear();
        self.rows.clear();
        self.scroll_offset = 0;
        self.dirty = true;
    }

    /// Total wrapped rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Scroll up by the given number of rows.
    pub fn scroll_up(&mut self, rows: usize) {
        let old = self.scroll_offset;
        self.scroll_offset += rows;
        self.clamp_scroll();
        self.dirty |= old != self.scroll_offset;
    }

    /// Scroll down by the given number of rows.
    pub fn scroll_down(&mut self, rows: usize) {
        let old = self.scroll_offset;
        self.scroll_offset = self.scroll_offset.saturating_sub(rows);
        self.dirty |= old != self.scroll_offset;
    }

    /// Scroll up one page.
    pub fn page_up(&mut self) {
        self.scroll_up(self.page_rows());
    }

    /// Scroll down one page.
    pub fn page_down(&mut self) {
        self.scroll_down(self.page_rows());
    }

    /// Scroll to the bottom (latest content).
    pub fn scroll_to_bottom(&mut self) {
        if self.scroll_offset != 0 {
            self.scroll_offset = 0;
            self.dirty = true;
        }
    }

    /// Check if we're scrolled to the bottom.
    pub const fn at_bottom(&self) -> bool {
        self.scroll_offset == 0
    }

    /// Rows currently in view, top to bottom.
    pub fn visible_rows(&self) -> &[Line] {
        let height = usize::from(self.bounds.height);
        let end = self.rows.len().saturating_sub(self.scroll_offset);
        let start = end.saturating_sub(height);
        &self.rows[start..end]
    }

    fn page_rows(&self) -> usize {
        usize::from(self.bounds.height).saturating_sub(1).max(1)
    }

    fn clamp_scroll(&mut self) {
        let max = self.rows.len().saturating_sub(usize::from(self.bounds.height));
        self.scroll_offset = self.scroll_offset.min(max);
    }

    fn rewrap(&mut self) {
        let width = usize::from(self.bounds.width).saturating_sub(2);
        self.rows.clear();
        if self.text.is_empty() {
            return;
        }
        for paragraph in self.text.split('\n') {
            let style = if paragraph.starts_with(ECHO_MARKER) {
                Style::fg(Rgb::MUTED).with(Attrs::ITALIC)
            } else {
                Style::fg(Rgb::TEXT)
            };
            for row in wrap(paragraph, width) {
                let mut line = Line::blank();
                line.push(" ", Style::PLAIN);
                line.push(row, style);
                self.rows.push(line);
            }
        }
    }
}

impl Widget for StoryPane {
    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn set_bounds(&mut self, bounds: Rect) {
        if bounds == self.bounds {
            return;
        }
        let rewrap = bounds.width != self.bounds.width;
        self.bounds = bounds;
        if rewrap {
            self.rewrap();
            self.scroll_offset = 0;
        }
        self.clamp_scroll();
        self.dirty = true;
    }

    fn render(&self, frame: &mut Frame) {
        frame.set_lines(self.bounds, self.visible_rows().iter().cloned());

        if !self.at_bottom() && self.bounds.height > 0 && self.bounds.width > 12 {
            let marker = format!(" ↓ {} more ", self.scroll_offset);
            let mut last = frame
                .line(self.bounds.bottom() - 1)
                .cloned()
                .unwrap_or_default();
            let pad = usize::from(self.bounds.width).saturating_sub(last.width() + marker.chars().count());
            last.push(" ".repeat(pad), Style::PLAIN);
            last.push(marker, Style::fg(Rgb::ACCENT).with(Attrs::REVERSED));
            frame.set_line(self.bounds.bottom() - 1, last);
        }
    }

    fn handle_input(&mut self, event: &InputEvent) -> bool {
        match event {
            InputEvent::Key {
                code: KeyCode::PageUp,
                ..
            } => self.page_up(),
            InputEvent::Key {
                code: KeyCode::PageDown,
                ..
            } => self.page_down(),
            InputEvent::MouseScroll { delta } if *delta > 0 => self.scroll_up(WHEEL_STEP),
            InputEvent::MouseScroll { .. } => self.scroll_down(WHEEL_STEP),
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

    fn texts(pane: &StoryPane) -> Vec<String> {
        pane.visible_rows().iter().map(|l| l.text().trim().to_string()).collect()
    }

    fn numbered(n: usize) -> String {
        (0..n).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n")
    }

    #[test]
    fn test_follows_text_at_bottom() {
        let mut pane = StoryPane::new(Rect::new(0, 0, 40, 3));
        pane.set_text(&numbered(5));
        assert_eq!(texts(&pane), vec!["line 2", "line 3", "line 4"]);

        pane.set_text(&numbered(6));
        assert_eq!(texts(&pane), vec!["line 3", "line 4", "line 5"]);
    }

    #[test]
    fn test_scrolled_view_stays_put() {
        let mut pane = StoryPane::new(Rect::new(0, 0, 40, 3));
        pane.set_text(&numbered(10));
        pane.scroll_up(2);
        assert_eq!(texts(&pane), vec!["line 5", "line 6", "line 7"]);

        pane.set_text(&numbered(12));
        assert_eq!(texts(&pane), vec!["line 5", "line 6", "line 7"]);
        assert!(!pane.at_bottom());

        pane.scroll_to_bottom();
        assert_eq!(texts(&pane), vec!["line 9", "line 10", "line 11"]);
    }

    #[test]
    fn test_scroll_is_clamped() {
        let mut pane = StoryPane::new(Rect::new(0, 0, 40, 3));
        pane.set_text(&numbered(5));
        pane.scroll_up(100);
        assert_eq!(texts(&pane), vec!["line 0", "line 1", "line 2"]);
        pane.page_down();
        pane.page_down();
        assert!(pane.at_bottom());
    }

    #[test]
    fn test_echo_lines_are_muted() {
        let mut pane = StoryPane::new(Rect::new(0, 0, 40, 5));
        pane.set_text("You wake.\n\n> You: look around\n\nA cave.");
        let echo = &pane.visible_rows()[2];
        assert_eq!(echo.spans[1].style.fg, Some(Rgb::MUTED));
        assert_eq!(pane.visible_rows()[0].spans[1].style.fg, Some(Rgb::TEXT));
    }

    #[test]
    fn test_wheel_scrolls() {
        let mut pane = StoryPane::new(Rect::new(0, 0, 40, 3));
        pane.set_text(&numbered(20));
        assert!(pane.handle_input(&InputEvent::MouseScroll { delta: 1 }));
        assert!(!pane.at_bottom());
        assert!(pane.handle_input(&InputEvent::MouseScroll { delta: -1 }));
        assert!(pane.at_bottom());
        assert!(!pane.handle_input(&InputEvent::key(KeyCode::Enter)));
    }
}
