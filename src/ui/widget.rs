//! Widget trait shared by the story screen components.

use super::frame::Frame;
use super::layout::Rect;
use crate::actor::InputEvent;

/// A UI component that can be rendered to a frame and handle input.
pub trait Widget {
    /// Get the current bounds of this widget.
    fn bounds(&self) -> Rect;

    /// Set the bounds of this widget.
    ///
    /// Called when the layout changes (e.g., terminal resize).
    fn set_bounds(&mut self, bounds: Rect);

    /// Render this widget into its rows of `frame`.
    fn render(&self, frame: &mut Frame);

    /// Handle an input event.
    ///
    /// Returns `true` if the event was consumed by this widget,
    /// `false` if it should propagate to other widgets.
    fn handle_input(&mut self, _event: &InputEvent) -> bool {
        false
    }

    /// Check if this widget needs to be redrawn.
    fn needs_redraw(&self) -> bool;

    /// Clear the redraw flag after rendering.
    fn clear_redraw(&mut self);
}
