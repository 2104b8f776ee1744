//! Choice extraction: split a finished story into transcript and choices.
//!
//! The game master ends every reply with a numbered list of three options.
//! Only the last list counts; a numbered list embedded earlier in the
//! narrative stays part of the transcript.

use regex::Regex;
use std::sync::LazyLock;

/// Maximum number of choices offered per turn.
pub const MAX_CHOICES: usize = 3;

/// Start of a transcript line that echoes the player's action.
pub const ECHO_MARKER: &str = "> You:";

static CHOICE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[1-3]\.\s+(.*)$").expect("choice pattern is valid")
});

/// A story split for display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoryPage {
    /// Narrative text, trimmed.
    pub transcript: String,
    /// Up to three selectable actions, in order.
    pub choices: Vec<String>,
}

impl StoryPage {
    /// Split `story` into transcript and choices.
    pub fn from_story(story: &str) -> Self {
        extract_choices(story)
    }

    /// Whether there is nothing to show.
    pub fn is_empty(&self) -> bool {
        self.transcript.is_empty() && self.choices.is_empty()
    }
}

/// Split `story` at the last line starting with `"1. "`.
pub fn extract_choices(story: &str) -> StoryPage {
    let Some(split) = last_choice_block(story) else {
        return StoryPage {
            transcript: story.trim().to_string(),
            choices: Vec::new(),
        };
    };

    let choices = story[split..]
        .lines()
        .filter_map(|line| {
            CHOICE_LINE
                .captures(line.trim_end())
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().trim().to_string())
        })
        .take(MAX_CHOICES)
        .collect();

    StoryPage {
        transcript: story[..split].trim().to_string(),
        choices,
    }
}

/// Byte offset of the start of the last line beginning with `"1. "`.
fn last_choice_block(story: &str) -> Option<usize> {
    let mut offset = 0;
    let mut found = None;
    for line in story.split_inclusive('\n') {
        if line.starts_with("1. ") {
            found = Some(offset);
        }
        offset += line.len();
    }
    found
}

/// Text shown while a turn is generating: transcript plus the echoed action.
///
/// Mirrors the server's transcript format, so the prefix lines up with the
/// final story once it arrives.
pub fn echo_prefix(transcript: &str, action: &str) -> String {
    let transcript = transcript.trim();
    let action = action.trim();
    if transcript.is_empty() {
        format!("{ECHO_MARKER} {action}\n\n")
    } else {
        format!("{transcript}\n\n{ECHO_MARKER} {action}\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_split() {
        let page = extract_choices("Intro line.\n1. Go left\n2. Go right");
        assert_eq!(page.transcript, "Intro line.");
        assert_eq!(page.choices, vec!["Go left", "Go right"]);
    }

    #[test]
    fn test_last_block_wins() {
        let story = "The map reads:\n1. Bridge\n2. Tower\nYou fold it away and walk on.\n\n\
                     What now?\n1. Cross the bridge\n2. Climb the tower\n3. Rest by the fire\n";
        let page = extract_choices(story);
        assert!(page.transcript.ends_with("What now?"));
        assert!(page.transcript.contains("1. Bridge"));
        assert_eq!(
            page.choices,
            vec!["Cross the bridge", "Climb the tower", "Rest by the fire"]
        );
    }

    #[test]
    fn test_no_choices() {
        let page = extract_choices("  Just narrative.\n\n");
        assert_eq!(page.transcript, "Just narrative.");
        assert!(page.choices.is_empty());
    }

    #[test]
    fn test_at_most_three_and_only_numbered_lines() {
        let story = "Go.\n1. One\n\n2. Two\n(or improvise)\n3.   Three  \n4. Four\n1. Again";
        // The last "1. " line starts the block
        let page = extract_choices(story);
        assert_eq!(page.choices, vec!["Again"]);

        let story = "Go.\n1. One\n\n2. Two\r\n(or improvise)\n3.   Three  \n4. Four";
        let page = extract_choices(story);
        assert_eq!(page.choices, vec!["One", "Two", "Three"]);
    }

    #[test]
    fn test_block_at_start_of_text() {
        let page = extract_choices("1. Wake up\n2. Sleep");
        assert_eq!(page.transcript, "");
        assert_eq!(page.choices, vec!["Wake up", "Sleep"]);
    }

    #[test]
    fn test_indented_marker_is_not_a_block() {
        let page = extract_choices("Story\n  1. not a choice");
        assert!(page.choices.is_empty());
    }

    #[test]
    fn test_echo_prefix() {
        assert_eq!(echo_prefix("Once.", "open door"), "Once.\n\n> You: open door\n\n");
        assert_eq!(echo_prefix("", " look "), "> You: look\n\n");
    }
}
