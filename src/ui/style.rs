//! Styled text: colors, attributes, spans and lines.

use bitflags::bitflags;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// True-color RGB representation.
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Rgb {
    /// Red channel (0-255)
    pub r: u8,
    /// Green channel (0-255)
    pub g: u8,
    /// Blue channel (0-255)
    pub b: u8,
}

impl Rgb {
    /// Create a new RGB color.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// White (255, 255, 255)
    pub const WHITE: Self = Self::new(255, 255, 255);
    /// Story text.
    pub const TEXT: Self = Self::new(220, 220, 220);
    /// Secondary text (echoes, placeholders).
    pub const MUTED: Self = Self::new(130, 130, 140);
    /// Accent for prompts and selection.
    pub const ACCENT: Self = Self::new(0, 200, 200);
    /// Errors.
    pub const ERROR: Self = Self::new(255, 110, 100);
    /// Bar backgrounds.
    pub const BAR_BG: Self = Self::new(40, 40, 40);
    /// Title background.
    pub const TITLE_BG: Self = Self::new(60, 40, 90);
}

impl std::fmt::Debug for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

bitflags! {
    /// Text style attributes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Attrs: u8 {
        /// Bold text
        const BOLD = 0b0000_0001;
        /// Dim/faint text
        const DIM = 0b0000_0010;
        /// Italic text
        const ITALIC = 0b0000_0100;
        /// Underlined text
        const UNDERLINE = 0b0000_1000;
        /// Reversed colors (fg/bg swapped)
        const REVERSED = 0b0001_0000;
    }
}

/// Colors and attributes for a run of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Style {
    /// Foreground, or the terminal default.
    pub fg: Option<Rgb>,
    /// Background, or the terminal default.
    pub bg: Option<Rgb>,
    /// Attributes.
    pub attrs: Attrs,
}

impl Style {
    /// Terminal defaults.
    pub const PLAIN: Self = Self {
        fg: None,
        bg: None,
        attrs: Attrs::empty(),
    };

    /// Style with a foreground color.
    pub const fn fg(color: Rgb) -> Self {
        Self {
            fg: Some(color),
            bg: None,
            attrs: Attrs::empty(),
        }
    }

    /// Set the background.
    #[must_use]
    pub const fn on(mut self, color: Rgb) -> Self {
        self.bg = Some(color);
        self
    }

    /// Add attributes.
    #[must_use]
    pub const fn with(mut self, attrs: Attrs) -> Self {
        self.attrs = self.attrs.union(attrs);
        self
    }
}

/// A run of text in one style.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Span {
    /// The text (no newlines).
    pub text: String,
    /// Its style.
    pub style: Style,
}

impl Span {
    /// Create a span.
    pub fn new(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    /// Display width in columns.
    pub fn width(&self) -> usize {
        UnicodeWidthStr::width(self.text.as_str())
    }
}

/// One screen row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Line {
    /// Spans, left to right.
    pub spans: Vec<Span>,
    /// Background for the rest of the row after the last span.
    pub fill: Option<Rgb>,
}

impl Line {
    /// Empty row.
    pub const fn blank() -> Self {
        Self {
            spans: Vec::new(),
            fill: None,
        }
    }

    /// Row holding a single span.
    pub fn styled(text: impl Into<String>, style: Style) -> Self {
        Self {
            spans: vec![Span::new(text, style)],
            fill: None,
        }
    }

    /// Set the row fill.
    #[must_use]
    pub const fn filled(mut self, color: Rgb) -> Self {
        self.fill = Some(color);
        self
    }

    /// Append a span.
    pub fn push(&mut self, text: impl Into<String>, style: Style) {
        self.spans.push(Span::new(text, style));
    }

    /// Display width in columns.
    pub fn width(&self) -> usize {
        self.spans.iter().map(Span::width).sum()
    }

    /// Plain text of the row.
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    /// Copy of the row cut to at most `width` columns, on grapheme
    /// boundaries.
    #[must_use]
    pub fn clipped(&self, width: usize) -> Self {
        let mut out = Self {
            spans: Vec::with_capacity(self.spans.len()),
            fill: self.fill,
        };
        let mut used = 0;
        for span in &self.spans {
            if used >= width {
                break;
            }
            let mut text = String::new();
            for grapheme in span.text.graphemes(true) {
                let w = UnicodeWidthStr::width(grapheme);
                if used + w > width {
                    used = width;
                    break;
                }
                used += w;
                text.push_str(grapheme);
            }
            if !text.is_empty() {
                out.spans.push(Span::new(text, span.style));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clipped_respects_wide_chars() {
        let mut line = Line::blank();
        line.push("ab", Style::PLAIN);
        line.push("漢字", Style::fg(Rgb::ACCENT));
        assert_eq!(line.width(), 6);

        let clipped = line.clipped(5);
        assert_eq!(clipped.text(), "ab漢");
        assert_eq!(clipped.width(), 4);
        assert_eq!(clipped.spans[1].style, Style::fg(Rgb::ACCENT));
    }

    #[test]
    fn test_style_builders() {
        let style = Style::fg(Rgb::TEXT).on(Rgb::BAR_BG).with(Attrs::BOLD | Attrs::ITALIC);
        assert_eq!(style.bg, Some(Rgb::BAR_BG));
        assert!(style.attrs.contains(Attrs::ITALIC));
    }
}
