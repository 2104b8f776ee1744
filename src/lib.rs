//! # Storyteller
//!
//! A terminal client for an interactive story server.
//!
//! The server streams each reply as NDJSON events; the client reveals the
//! text with a typewriter animation at a fixed pace, then swaps in the
//! authoritative final story and offers its numbered choices.
//!
//! ## Core Concepts
//!
//! - **Reveal engine**: one owned session at a time, paced by its own
//!   ticker thread; the final text never overtakes the animation
//! - **Event stream**: NDJSON decoded into [`StoryEvent`]s, lines
//!   reassembled across reads before UTF-8 decoding
//! - **Actor model**: isolated threads for input, rendering, ticking and
//!   network reads, feeding one controller over channels
//! - **Row-diffed rendering**: only changed screen rows are rewritten
//!
//! ## Example
//!
//! ```rust
//! use storyteller::{RevealConfig, RevealEngine};
//!
//! let mut engine = RevealEngine::manual(RevealConfig::default());
//! let frames = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
//! let sink = frames.clone();
//! engine.start("> You: look\n\n", move |text: &str| sink.borrow_mut().push(text.to_string()));
//! engine.enqueue("A cave.");
//!
//! assert!(engine.finalize("A cave.").is_none());
//! while engine.tick().is_none() {}
//! assert_eq!(frames.borrow().last().unwrap(), "> You: look\n\nA cave.");
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod actor;
pub mod app;
pub mod choices;
pub mod cli;
pub mod client;
pub mod config;
pub mod identity;
pub mod logging;
pub mod reveal;
pub mod stream;
pub mod terminal;
pub mod ui;

// Re-exports for convenience
pub use app::{StoryController, StoryDisplay};
pub use choices::{extract_choices, StoryPage};
pub use client::{ClientError, StoryClient, StreamEnvelope, StreamMessage};
pub use config::Config;
pub use identity::ClientSessionId;
pub use reveal::{Completion, RevealConfig, RevealEngine, SessionId};
pub use stream::{EventReader, NdjsonDecoder, StoryEvent};
