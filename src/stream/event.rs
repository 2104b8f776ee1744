//! Story stream events.

use serde::{Deserialize, Serialize};

/// One line of the story stream.
///
/// Lines are tagged by their `type` field; anything else fails to
/// deserialize and is skipped by the decoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StoryEvent {
    /// A fragment of newly generated text.
    Chunk {
        /// The fragment.
        text: String,
    },
    /// Terminal event carrying the complete, authoritative story.
    Final {
        /// Full transcript, not just the delta.
        story: String,
    },
    /// Terminal event: generation failed on the server.
    Error {
        /// Human readable reason.
        message: String,
    },
}

impl StoryEvent {
    /// Whether this event ends the stream.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Final { .. } | Self::Error { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_each_variant() {
        let chunk: StoryEvent = serde_json::from_str(r#"{"type":"chunk","text":"Hi"}"#).unwrap();
        assert_eq!(chunk, StoryEvent::Chunk { text: "Hi".into() });
        assert!(!chunk.is_terminal());

        let fin: StoryEvent = serde_json::from_str(r#"{"type":"final","story":"All"}"#).unwrap();
        assert!(fin.is_terminal());

        let err: StoryEvent =
            serde_json::from_str(r#"{"type":"error","message":"Ollama is down"}"#).unwrap();
        assert_eq!(
            err,
            StoryEvent::Error {
                message: "Ollama is down".into()
            }
        );
    }

    #[test]
    fn test_unknown_type_rejected() {
        assert!(serde_json::from_str::<StoryEvent>(r#"{"type":"ping"}"#).is_err());
        assert!(serde_json::from_str::<StoryEvent>(r#"{"text":"no tag"}"#).is_err());
    }
}
