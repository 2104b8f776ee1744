//! Status Bar Widget: message on the left, key hints on the right.

use super::frame::Frame;
use super::layout::Rect;
use super::style::{Attrs, Line, Rgb, Style};
use super::widget::Widget;
use unicode_width::UnicodeWidthStr;

/// How the status message is colored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tone {
    /// Neutral information.
    #[default]
    Info,
    /// A request is in flight.
    Busy,
    /// Something failed.
    Error,
}

/// A two-section status bar.
#[derive(Debug)]
pub struct StatusBar {
    /// Left section content.
    message: String,
    /// Left section color.
    tone: Tone,
    /// Right section content.
    hints: String,
    /// Widget bounds.
    bounds: Rect,
    /// Needs redraw flag.
    dirty: bool,
}

impl StatusBar {
    /// Create a new status bar with the given bounds.
    pub const fn new(bounds: Rect) -> Self {
        Self {
            message: String::new(),
            tone: Tone::Info,
            hints: String::new(),
            bounds,
            dirty: true,
        }
    }

    /// Set the message and its tone.
    pub fn set_message(&mut self, message: impl Into<String>, tone: Tone) {
        self.message = message.into();
        self.tone = tone;
        self.dirty = true;
    }

    /// Set the right-aligned hints.
    pub fn set_hints(&mut self, hints: impl Into<String>) {
        self.hints = hints.into();
        self.dirty = true;
    }

    /// Get the message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the message tone.
    pub const fn tone(&self) -> Tone {
        self.tone
    }
}

impl Widget for StatusBar {
    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
        self.dirty = true;
    }

    fn render(&self, frame: &mut Frame) {
        let bg = Rgb::BAR_BG;
        let width = usize::from(self.bounds.width);
        let message_style = match self.tone {
            Tone::Info => Style::fg(Rgb::WHITE).on(bg),
            Tone::Busy => Style::fg(Rgb::ACCENT).on(bg).with(Attrs::ITALIC),
            Tone::Error => Style::fg(Rgb::ERROR).on(bg).with(Attrs::BOLD),
        };

        let mut line = Line::blank().filled(bg);
        let message = format!(" {}", self.message);
        let used = UnicodeWidthStr::width(message.as_str());
        line.push(message, message_style);

        // Hints only when they fit beside the message.
        let hints_width = UnicodeWidthStr::width(self.hints.as_str());
        if !self.hints.is_empty() && used + hints_width + 2 <= width {
            line.push(" ".repeat(width - used - hints_width - 1), Style::PLAIN.on(bg));
            line.push(self.hints.as_str(), Style::fg(Rgb::MUTED).on(bg));
        }
        frame.set_line(self.bounds.y, line);
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

    #[test]
    fn test_status_bar_layout() {
        let mut bar = StatusBar::new(Rect::new(0, 0, 30, 1));
        bar.set_message("Ready", Tone::Info);
        bar.set_hints("Esc quit");

        let mut frame = Frame::new(30, 1);
        bar.render(&mut frame);
        let text = frame.line(0).map(Line::text).unwrap();
        assert!(text.starts_with(" Ready"));
        assert!(text.ends_with("Esc quit"));
        assert_eq!(UnicodeWidthStr::width(text.as_str()), 29);
    }

    #[test]
    fn test_hints_dropped_when_crowded() {
        let mut bar = StatusBar::new(Rect::new(0, 0, 12, 1));
        bar.set_message("Request failed (500)", Tone::Error);
        bar.set_hints("Esc quit");

        let mut frame = Frame::new(12, 1);
        bar.render(&mut frame);
        let text = frame.line(0).map(Line::text).unwrap();
        assert!(!text.contains("Esc"));
        assert_eq!(bar.tone(), Tone::Error);
    }
}
