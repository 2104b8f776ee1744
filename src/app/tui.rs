//! Full-screen story client.

use super::controller::{ActorDispatch, StoryController};
use super::display::StoryDisplay;
use crate::actor::{Engine, InputEvent, KeyCode};
use crate::choices::StoryPage;
use crate::client::StoryClient;
use crate::reveal::{RevealConfig, RevealEngine};
use crate::ui::{
    ActionInput, Attrs, ChoiceList, Frame, Line, Rgb, ScreenLayout, StatusBar, StoryPane, Style,
    Tone, Widget,
};
use anyhow::{Context, Result};
use crossbeam_channel::{select, unbounded};
use unicode_width::UnicodeWidthStr;

const HINTS: &str = "1-3 choose · Enter act · Ctrl+N new · PgUp/PgDn scroll · Esc quit";

/// What a key press asks the application to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    /// Leave the application.
    Quit,
    /// Start a new story.
    NewStory,
    /// Take a turn with this action.
    Submit(String),
}

/// The story screen.
#[derive(Debug)]
pub struct TuiDisplay {
    title: String,
    subtitle: String,
    width: u16,
    height: u16,
    pane: StoryPane,
    choices: ChoiceList,
    input: ActionInput,
    status: StatusBar,
    /// Transcript of the last finished page.
    transcript: String,
    title_dirty: bool,
}

impl TuiDisplay {
    /// Create the screen for a terminal of the given size.
    pub fn new(width: u16, height: u16, subtitle: impl Into<String>) -> Self {
        let layout = ScreenLayout::compute(width, height);
        let mut status = StatusBar::new(layout.status);
        status.set_hints(HINTS);
        Self {
            title: "Storyteller".to_string(),
            subtitle: subtitle.into(),
            width,
            height,
            pane: StoryPane::new(layout.story),
            choices: ChoiceList::new(layout.choices),
            input: ActionInput::new(layout.input),
            status,
            transcript: String::new(),
            title_dirty: true,
        }
    }

    /// Re-layout for a new terminal size.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        let layout = ScreenLayout::compute(width, height);
        self.pane.set_bounds(layout.story);
        self.choices.set_bounds(layout.choices);
        self.input.set_bounds(layout.input);
        self.status.set_bounds(layout.status);
        self.title_dirty = true;
    }

    /// Whether anything changed since the last [`compose`](Self::compose).
    pub fn needs_redraw(&self) -> bool {
        self.title_dirty
            || self.pane.needs_redraw()
            || self.choices.needs_redraw()
            || self.input.needs_redraw()
            || self.status.needs_redraw()
    }

    /// Build the full frame and clear the redraw flags.
    pub fn compose(&mut self) -> Frame {
        let mut frame = Frame::new(self.width, self.height);
        frame.set_line(0, self.title_line());
        self.pane.render(&mut frame);
        self.choices.render(&mut frame);
        self.input.render(&mut frame);
        self.status.render(&mut frame);
        if let Some((x, y)) = self.input.cursor_position() {
            frame.set_cursor(x, y);
        }

        self.title_dirty = false;
        self.pane.clear_redraw();
        self.choices.clear_redraw();
        self.input.clear_redraw();
        self.status.clear_redraw();
        frame
    }

    /// Route a key or mouse event.
    pub fn handle_input(&mut self, event: &InputEvent) -> Option<UserCommand> {
        if let InputEvent::Key { code, modifiers } = event {
            match code {
                KeyCode::Esc => return Some(UserCommand::Quit),
                KeyCode::Char('c') if modifiers.control => return Some(UserCommand::Quit),
                KeyCode::Char('n') if modifiers.control => return Some(UserCommand::NewStory),
                KeyCode::Char(digit @ '1'..='3')
                    if !modifiers.control && !modifiers.alt && self.input.is_empty() =>
                {
                    if let Some(choice) = self.choices.choice_for_digit(*digit) {
                        return Some(UserCommand::Submit(choice.to_string()));
                    }
                }
                KeyCode::Enter => {
                    if let Some(action) = self.input.submit() {
                        return Some(UserCommand::Submit(action));
                    }
                    if self.choices.is_enabled() && self.input.is_empty() {
                        return self
                            .choices
                            .selected_choice()
                            .map(|c| UserCommand::Submit(c.to_string()));
                    }
                    return None;
                }
                _ => {}
            }
        }

        if self.pane.handle_input(event) || self.choices.handle_input(event) {
            return None;
        }
        self.input.handle_input(event);
        None
    }

    /// Text in the story pane.
    pub fn story_text(&self) -> &str {
        self.pane.text()
    }

    /// Status bar message and tone.
    pub fn status(&self) -> (&str, Tone) {
        (self.status.message(), self.status.tone())
    }

    fn title_line(&self) -> Line {
        let bg = Rgb::TITLE_BG;
        let mut line = Line::blank().filled(bg);
        let title = format!(" {}", self.title);
        let used = UnicodeWidthStr::width(title.as_str());
        line.push(title, Style::fg(Rgb::WHITE).on(bg).with(Attrs::BOLD));

        let width = usize::from(self.width);
        let sub = UnicodeWidthStr::width(self.subtitle.as_str());
        if used + sub + 2 <= width {
            line.push(" ".repeat(width - used - sub - 1), Style::PLAIN.on(bg));
            line.push(self.subtitle.as_str(), Style::fg(Rgb::MUTED).on(bg));
        }
        line
    }
}

impl StoryDisplay for TuiDisplay {
    fn show_frame(&mut self, text: &str) {
        self.pane.set_text(text);
    }

    fn show_page(&mut self, page: &StoryPage) {
        page.transcript.clone_into(&mut self.transcript);
        self.pane.set_text(&page.transcript);
        self.pane.scroll_to_bottom();
        self.choices.set_choices(page.choices.clone());

        let message = if page.is_empty() {
            "No story yet. Press Ctrl+N to begin."
        } else if page.choices.is_empty() {
            "What do you do next?"
        } else {
            "Pick a choice or type your own action."
        };
        self.status.set_message(message, Tone::Info);
    }

    fn show_error(&mut self, message: &str) {
        // Drop the half-revealed text; the last finished page stays.
        let transcript = std::mem::take(&mut self.transcript);
        self.pane.set_text(&transcript);
        self.transcript = transcript;
        self.status.set_message(message, Tone::Error);
    }

    fn set_busy(&mut self, busy: bool) {
        self.input.set_enabled(!busy);
        self.choices.set_enabled(!busy);
        if busy {
            self.pane.scroll_to_bottom();
            self.status.set_message("The story unfolds…", Tone::Busy);
        }
    }
}

/// Run the full-screen client until the player quits.
///
/// # Errors
///
/// Returns an error if the terminal cannot be set up.
pub fn run(client: StoryClient, reveal: RevealConfig, streaming: bool) -> Result<()> {
    let subtitle = format!("{} ", client.base_url());
    let (tx, rx) = unbounded();

    let mut engine = Engine::new().context("failed to set up the terminal")?;
    let display = TuiDisplay::new(engine.width(), engine.height(), subtitle);
    let dispatch = ActorDispatch::new(client, tx);
    let mut controller =
        StoryController::new(RevealEngine::new(reveal), dispatch, display, streaming);
    controller.load();

    let input = engine.input_receiver().clone();
    loop {
        if controller.display().needs_redraw() {
            engine.draw(controller.display_mut().compose());
        }

        let ticks = controller.ticks();
        select! {
            recv(input) -> event => {
                let Ok(event) = event else { break };
                match event {
                    InputEvent::Resize { width, height } => {
                        engine.handle_resize(width, height);
                        controller.display_mut().resize(width, height);
                    }
                    InputEvent::Shutdown => break,
                    InputEvent::Error(error) => tracing::warn!(%error, "terminal input error"),
                    event => match controller.display_mut().handle_input(&event) {
                        Some(UserCommand::Quit) => break,
                        Some(UserCommand::NewStory) => {
                            controller.new_story();
                        }
                        Some(UserCommand::Submit(action)) => {
                            if !controller.is_busy() {
                                controller.submit(&action);
                            }
                        }
                        None => {}
                    },
                }
            }
            recv(rx) -> envelope => {
                if let Ok(envelope) = envelope {
                    controller.handle_envelope(envelope);
                }
            }
            recv(ticks) -> _ => controller.handle_tick(),
        }
    }

    controller.cancel();
    tracing::debug!(in_flight = controller.dispatcher().in_flight(), "leaving story screen");
    Ok(())
}
