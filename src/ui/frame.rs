//! Frame: one complete screen, row by row.

use super::layout::Rect;
use super::style::Line;

/// A full screen of styled rows plus the cursor position.
///
/// Widgets write whole rows; the renderer diffs rows against the previous
/// frame and repaints only the ones that changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u16,
    height: u16,
    lines: Vec<Line>,
    cursor: Option<(u16, u16)>,
}

impl Frame {
    /// Blank frame of the given size.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            lines: vec![Line::blank(); usize::from(height)],
            cursor: None,
        }
    }

    /// Width in columns.
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Height in rows.
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// The whole screen as a rectangle.
    pub const fn area(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    /// All rows.
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Row `y`, if on screen.
    pub fn line(&self, y: u16) -> Option<&Line> {
        self.lines.get(usize::from(y))
    }

    /// Replace row `y`. Rows outside the frame are ignored.
    pub fn set_line(&mut self, y: u16, line: Line) {
        if let Some(slot) = self.lines.get_mut(usize::from(y)) {
            *slot = line.clipped(usize::from(self.width));
        }
    }

    /// Fill the rows of `area` from `lines`, blanking rows left over.
    pub fn set_lines(&mut self, area: Rect, lines: impl IntoIterator<Item = Line>) {
        let mut lines = lines.into_iter();
        for y in area.y..area.bottom() {
            self.set_line(y, lines.next().unwrap_or_default());
        }
    }

    /// Show the cursor at (x, y).
    pub const fn set_cursor(&mut self, x: u16, y: u16) {
        self.cursor = Some((x, y));
    }

    /// Hide the cursor.
    pub const fn hide_cursor(&mut self) {
        self.cursor = None;
    }

    /// Cursor position, if visible.
    pub const fn cursor(&self) -> Option<(u16, u16)> {
        self.cursor
    }
}
