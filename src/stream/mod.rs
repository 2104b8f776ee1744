//! The story event stream: NDJSON lines of `chunk`, `final` and `error`.
//!
//! ```text
//! {"type":"chunk","text":"You wake "}
//! {"type":"chunk","text":"in the dark."}
//! {"type":"final","story":"...full transcript..."}
//! ```

mod decoder;
mod event;

pub use decoder::{EventReader, NdjsonDecoder};
pub use event::StoryEvent;
