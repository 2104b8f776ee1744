//! Typewriter reveal for streamed story text.
//!
//! Chunks arrive from the network in bursts; the reveal engine buffers them
//! and drains them to a display callback at a fixed pace. The authoritative
//! final text is held back until the animation has caught up, so it never
//! jumps ahead of, or cuts off, what the reader is watching.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   enqueue / finalize   ┌──────────────┐  on_update  ┌─────────┐
//! │ Stream Actor │ ─────────────────────▶ │ RevealEngine │ ──────────▶ │ Display │
//! └──────────────┘   (via controller)     │  └ Session   │             └─────────┘
//!                                         └──────────────┘
//!                                                ▲
//!                                           Tick │
//!                                         ┌──────────────┐
//!                                         │ TickerActor  │
//!                                         └──────────────┘
//! ```

mod engine;
mod session;
mod ticker;

pub use engine::{RevealConfig, RevealEngine, TickSource};
pub use session::{Completion, RevealSession, RevealSink, SessionId};
pub use ticker::{Tick, TickerActor};
