//! `OutputBuffer`: Single-syscall output buffer for ANSI sequences.

use crate::ui::{Attrs, Line, Rgb, Style};
use std::io::Write;

/// Pre-allocated buffer for building ANSI escape sequences.
///
/// All output is accumulated here, then flushed in a single `write()` syscall
/// to prevent terminal flickering.
#[derive(Debug)]
pub struct OutputBuffer {
    data: Vec<u8>,
}

impl OutputBuffer {
    /// Create a new output buffer with the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Create a buffer sized for a typical terminal (4KB).
    pub fn new() -> Self {
        Self::with_capacity(4096)
    }

    /// Clear the buffer for reuse.
    #[inline]
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Get the buffer contents.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Get the buffer length.
    #[inline]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if buffer is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Write a string.
    #[inline]
    pub fn write_str(&mut self, s: &str) {
        self.data.extend_from_slice(s.as_bytes());
    }

    /// Move cursor to (x, y) position (1-indexed for ANSI).
    #[inline]
    pub fn cursor_move(&mut self, x: u16, y: u16) {
        // CSI row ; col H
        let _ = write!(self.data, "\x1b[{};{}H", u32::from(y) + 1, u32::from(x) + 1);
    }

    /// Hide cursor.
    #[inline]
    pub fn cursor_hide(&mut self) {
        self.data.extend_from_slice(b"\x1b[?25l");
    }

    /// Show cursor.
    #[inline]
    pub fn cursor_show(&mut self) {
        self.data.extend_from_slice(b"\x1b[?25h");
    }

    /// Set foreground color (true color).
    #[inline]
    pub fn set_fg(&mut self, color: Rgb) {
        let _ = write!(self.data, "\x1b[38;2;{};{};{}m", color.r, color.g, color.b);
    }

    /// Set background color (true color).
    #[inline]
    pub fn set_bg(&mut self, color: Rgb) {
        let _ = write!(self.data, "\x1b[48;2;{};{};{}m", color.r, color.g, color.b);
    }

    /// Reset, then apply `style`.
    pub fn set_style(&mut self, style: Style) {
        self.reset_attrs();
        if let Some(fg) = style.fg {
            self.set_fg(fg);
        }
        if let Some(bg) = style.bg {
            self.set_bg(bg);
        }
        for (flag, code) in [
            (Attrs::BOLD, 1),
            (Attrs::DIM, 2),
            (Attrs::ITALIC, 3),
            (Attrs::UNDERLINE, 4),
            (Attrs::REVERSED, 7),
        ] {
            if style.attrs.contains(flag) {
                let _ = write!(self.data, "\x1b[{code}m");
            }
        }
    }

    /// Reset all attributes.
    #[inline]
    pub fn reset_attrs(&mut self) {
        self.data.extend_from_slice(b"\x1b[0m");
    }

    /// Clear from the cursor to the end of the row.
    #[inline]
    pub fn clear_to_eol(&mut self) {
        self.data.extend_from_slice(b"\x1b[K");
    }

    /// Clear the entire screen.
    #[inline]
    pub fn clear_screen(&mut self) {
        self.data.extend_from_slice(b"\x1b[2J");
    }

    /// Paint row `y` with `line`, clearing whatever was there before.
    pub fn write_line(&mut self, y: u16, line: &Line) {
        self.cursor_move(0, y);
        for span in &line.spans {
            self.set_style(span.style);
            self.write_str(&span.text);
        }
        self.reset_attrs();
        if let Some(fill) = line.fill {
            self.set_bg(fill);
        }
        self.clear_to_eol();
        self.reset_attrs();
    }

    /// Flush to a writer in a single syscall.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    pub fn flush_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_all(&self.data)?;
        writer.flush()
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_line_sequences() {
        let mut out = OutputBuffer::new();
        out.write_line(2, &Line::styled("hi", Style::fg(Rgb::WHITE).with(Attrs::BOLD)));
        let text = String::from_utf8_lossy(out.as_bytes()).into_owned();
        assert!(text.starts_with("\x1b[3;1H"));
        assert!(text.contains("\x1b[38;2;255;255;255m\x1b[1mhi"));
        assert!(text.contains("\x1b[K"));
    }

    #[test]
    fn test_clear_reuses_allocation() {
        let mut out = OutputBuffer::with_capacity(64);
        out.write_str("abc");
        assert_eq!(out.len(), 3);
        out.clear();
        assert!(out.is_empty());
    }
}
