//! Display seam between the controller and a screen.

use crate::choices::StoryPage;

/// Where the controller sends what the player should see.
///
/// Calls arrive on the controller's thread, one at a time.
pub trait StoryDisplay {
    /// Show a frame of the typewriter animation: prefix plus revealed text.
    fn show_frame(&mut self, text: &str);

    /// Show a finished story with its choices.
    fn show_page(&mut self, page: &StoryPage);

    /// Show a failure in place of the animation.
    fn show_error(&mut self, message: &str);

    /// A request started (`true`) or ended (`false`).
    fn set_busy(&mut self, busy: bool);
}
