//! Application layer: the story controller and its two displays.
//!
//! ```text
//!   StreamActor ──StreamEnvelope──▶ ┌──────────────────┐ ──show_frame──▶ TuiDisplay
//!   TickerActor ──Tick────────────▶ │ StoryController  │ ──show_page───▶   or
//!   InputActor  ──InputEvent──────▶ └──────────────────┘ ──show_error──▶ PlainDisplay
//! ```

mod controller;
mod display;
pub mod plain;
pub mod tui;

pub use controller::{ActorDispatch, Dispatch, StoryController, STREAM_ENDED_EARLY};
pub use display::StoryDisplay;
pub use plain::{PlainDisplay, PlainTask};
pub use tui::{TuiDisplay, UserCommand};
