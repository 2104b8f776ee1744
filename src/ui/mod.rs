//! Story screen: styled text model, layout and widgets.
//!
//! Widgets render whole rows into a [`Frame`]; the render actor diffs the
//! frame against the one on screen and writes only the rows that changed.

mod action_input;
mod choice_list;
mod frame;
mod layout;
mod status_bar;
mod story_pane;
mod style;
mod widget;
pub mod wrap;

pub use action_input::ActionInput;
pub use choice_list::ChoiceList;
pub use frame::Frame;
pub use layout::{Rect, ScreenLayout};
pub use status_bar::{StatusBar, Tone};
pub use story_pane::StoryPane;
pub use style::{Attrs, Line, Rgb, Span, Style};
pub use widget::Widget;
