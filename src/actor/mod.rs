//! Actor Model: Message-passing concurrency for the terminal front end.
//!
//! This module implements a simple actor system using crossbeam channels:
//! - **Input Actor**: Polls terminal events, forwards to main loop
//! - **Render Actor**: Receives frames, diffs rows and flushes
//! - **Main Loop**: Coordinates between actors, the reveal ticker and the
//!   story stream
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     InputEvent      ┌──────────────┐
//! │ Input Thread │ ─────────────────▶  │              │
//! └──────────────┘                     │  Main Loop   │ ◀── Tick
//!                                      │              │
//! ┌──────────────┐    RenderCommand    │              │
//! │Render Thread │ ◀───────────────── │              │
//! └──────────────┘                     └──────────────┘
//!                                            ▲
//!                                            │ StreamEnvelope
//!                                      ┌──────────────┐
//!                                      │ Stream Thread│
//!                                      └──────────────┘
//! ```

mod engine;
mod input;
mod messages;
mod renderer;

pub use engine::{Engine, EngineConfig};
pub use input::InputActor;
pub use messages::{InputEvent, KeyCode, KeyModifiers, RenderCommand};
pub use renderer::{RenderStats, RendererActor};
