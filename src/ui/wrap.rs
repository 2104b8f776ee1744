//! Word wrapping for the story pane.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Wrap `text` to `width` columns.
///
/// Hard newlines always break. Words move to the next row when they do not
/// fit; a single word wider than the row is broken between graphemes.
/// Whitespace at a soft break is dropped.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut rows = Vec::new();
    for logical in text.split('\n') {
        wrap_logical(logical.trim_end_matches('\r'), width, &mut rows);
    }
    rows
}

fn wrap_logical(line: &str, width: usize, rows: &mut Vec<String>) {
    let mut current = String::new();
    let mut used = 0;

    for word in line.split_word_bounds() {
        let is_space = word.chars().all(char::is_whitespace);
        let w = UnicodeWidthStr::width(word);

        if used + w <= width {
            if !(is_space && used == 0 && !current.is_empty()) {
                current.push_str(word);
                used += w;
            }
            continue;
        }

        if is_space {
            // Break here and swallow the whitespace.
            rows.push(std::mem::take(&mut current).trim_end().to_string());
            used = 0;
            continue;
        }

        if used > 0 {
            rows.push(std::mem::take(&mut current).trim_end().to_string());
            used = 0;
        }

        if w <= width {
            current.push_str(word);
            used = w;
            continue;
        }

        for grapheme in word.graphemes(true) {
            let gw = UnicodeWidthStr::width(grapheme);
            if used + gw > width && used > 0 {
                rows.push(std::mem::take(&mut current));
                used = 0;
            }
            current.push_str(grapheme);
            used += gw;
        }
    }

    rows.push(current);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_breaks_on_words() {
        assert_eq!(
            wrap("the quick brown fox", 10),
            vec!["the quick", "brown fox"]
        );
    }

    #[test]
    fn test_wrap_keeps_hard_newlines_and_blank_lines() {
        assert_eq!(wrap("a\n\nb", 10), vec!["a", "", "b"]);
        assert_eq!(wrap("", 10), vec![""]);
    }

    #[test]
    fn test_wrap_splits_long_words() {
        assert_eq!(wrap("abcdefgh", 3), vec!["abc", "def", "gh"]);
    }

    #[test]
    fn test_wrap_wide_characters() {
        let rows = wrap("漢字漢字", 5);
        assert!(rows.iter().all(|r| UnicodeWidthStr::width(r.as_str()) <= 5));
        assert_eq!(rows.concat(), "漢字漢字");
    }

    #[test]
    fn test_wrap_never_exceeds_width() {
        let text = "You stand at the edge of a   forest. A path leads north.";
        for width in 1..30 {
            for row in wrap(text, width) {
                assert!(UnicodeWidthStr::width(row.as_str()) <= width, "{row:?} > {width}");
            }
        }
    }
}
