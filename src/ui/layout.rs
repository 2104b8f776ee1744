//! Layout: rectangles and the fixed screen arrangement.
//!
//! ```text
//! ┌──────────────────────────────┐
//! │ title                        │ 1 row
//! ├──────────────────────────────┤
//! │ story                        │ rest
//! │                              │
//! ├──────────────────────────────┤
//! │ choices                      │ 3 rows
//! │ action input                 │ 1 row
//! │ status                       │ 1 row
//! └──────────────────────────────┘
//! ```

/// A rectangle defined by position and size.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// X coordinate (column) of the top-left corner.
    pub x: u16,
    /// Y coordinate (row) of the top-left corner.
    pub y: u16,
    /// Width in columns.
    pub width: u16,
    /// Height in rows.
    pub height: u16,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self { x, y, width, height }
    }

    /// Create a rectangle from a terminal size (full screen).
    #[inline]
    pub const fn from_size(width: u16, height: u16) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Check if the rectangle is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Get the bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> u16 {
        self.y.saturating_add(self.height)
    }

    /// Split vertically at a given row offset.
    pub fn split_vertical(&self, at: u16) -> (Self, Self) {
        let at = at.min(self.height);
        (
            Self::new(self.x, self.y, self.width, at),
            Self::new(self.x, self.y + at, self.width, self.height - at),
        )
    }

    /// Take `rows` rows off the bottom.
    pub fn split_bottom(&self, rows: u16) -> (Self, Self) {
        self.split_vertical(self.height.saturating_sub(rows))
    }
}

impl std::fmt::Debug for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Rect({}, {} {}x{})", self.x, self.y, self.width, self.height)
    }
}

/// Regions of the story screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenLayout {
    /// Title bar.
    pub title: Rect,
    /// Scrollable story text.
    pub story: Rect,
    /// Numbered choices.
    pub choices: Rect,
    /// Free-text action line.
    pub input: Rect,
    /// Status bar.
    pub status: Rect,
}

impl ScreenLayout {
    /// Rows reserved for choices.
    pub const CHOICE_ROWS: u16 = crate::choices::MAX_CHOICES as u16;

    /// Compute the layout for a terminal of the given size.
    ///
    /// Small terminals shrink the story pane first; the bars keep their
    /// rows as long as there is room for them.
    pub fn compute(width: u16, height: u16) -> Self {
        let screen = Rect::from_size(width, height);
        let (title, rest) = screen.split_vertical(1);
        let (rest, status) = rest.split_bottom(1);
        let (rest, input) = rest.split_bottom(1);
        let (story, choices) = rest.split_bottom(Self::CHOICE_ROWS);
        Self {
            title,
            story,
            choices,
            input,
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_regular_terminal() {
        let layout = ScreenLayout::compute(80, 24);
        assert_eq!(layout.title, Rect::new(0, 0, 80, 1));
        assert_eq!(layout.story, Rect::new(0, 1, 80, 18));
        assert_eq!(layout.choices, Rect::new(0, 19, 80, 3));
        assert_eq!(layout.input, Rect::new(0, 22, 80, 1));
        assert_eq!(layout.status, Rect::new(0, 23, 80, 1));
    }

    #[test]
    fn test_layout_tiny_terminal_never_overflows() {
        for height in 0..8 {
            let layout = ScreenLayout::compute(20, height);
            let total = layout.title.height
                + layout.story.height
                + layout.choices.height
                + layout.input.height
                + layout.status.height;
            assert_eq!(total, height);
            assert!(layout.status.bottom() <= height.max(1));
        }
    }
}
