//! Engine: Owns the terminal and the input/render actors.
//!
//! Creating an engine switches the terminal into raw mode on the alternate
//! screen; dropping it stops both actors and restores the terminal, also
//! when the main loop unwinds with an error.

use super::messages::{InputEvent, RenderCommand};
use super::{InputActor, RendererActor};
use crate::ui::Frame;
use crossbeam_channel::{bounded, Receiver, Sender};
use crossterm::{
    cursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io;
use std::time::Duration;

/// Configuration for the Engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Input poll timeout.
    pub input_poll_timeout: Duration,
    /// Whether to enable mouse capture (wheel scrolling).
    pub enable_mouse: bool,
    /// Whether to use alternate screen buffer.
    pub alternate_screen: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            input_poll_timeout: Duration::from_millis(10),
            enable_mouse: true,
            alternate_screen: true,
        }
    }
}

/// Terminal session with input and render threads.
pub struct Engine {
    /// Configuration.
    config: EngineConfig,
    /// Input event receiver.
    input_rx: Receiver<InputEvent>,
    /// Render command sender.
    render_tx: Sender<RenderCommand>,
    /// Input actor handle.
    input_actor: Option<InputActor>,
    /// Renderer actor handle.
    renderer_actor: Option<RendererActor>,
    /// Terminal width.
    width: u16,
    /// Terminal height.
    height: u16,
}

impl Engine {
    /// Create a new engine with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal setup fails (raw mode, alternate screen, etc.).
    pub fn new() -> io::Result<Self> {
        Self::with_config(EngineConfig::default())
    }

    /// Create a new engine with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal setup fails.
    pub fn with_config(config: EngineConfig) -> io::Result<Self> {
        let (width, height) = terminal::size()?;

        terminal::enable_raw_mode()?;

        let mut stdout = io::stdout();
        if config.alternate_screen {
            execute!(stdout, EnterAlternateScreen)?;
        }
        if config.enable_mouse {
            execute!(stdout, EnableMouseCapture)?;
        }
        execute!(stdout, cursor::Hide)?;

        let (input_tx, input_rx) = bounded::<InputEvent>(64);
        let (render_tx, render_rx) = bounded::<RenderCommand>(16);

        let input_actor = InputActor::spawn(input_tx, config.input_poll_timeout);
        let renderer_actor = RendererActor::spawn(render_rx);
        tracing::debug!(width, height, "terminal engine started");

        Ok(Self {
            config,
            input_rx,
            render_tx,
            input_actor: Some(input_actor),
            renderer_actor: Some(renderer_actor),
            width,
            height,
        })
    }

    /// Get the terminal width.
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Get the terminal height.
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Get the input receiver for event-driven loops.
    pub const fn input_receiver(&self) -> &Receiver<InputEvent> {
        &self.input_rx
    }

    /// Send a frame to the render thread.
    pub fn draw(&self, frame: Frame) {
        let _ = self.render_tx.send(RenderCommand::Draw(Box::new(frame)));
    }

    /// Request a full repaint on the next frame.
    pub fn request_redraw(&self) {
        let _ = self.render_tx.send(RenderCommand::FullRedraw);
    }

    /// Handle a resize event.
    pub fn handle_resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        let _ = self.render_tx.send(RenderCommand::Resize { width, height });
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        if let Some(actor) = self.input_actor.take() {
            actor.join();
        }

        let _ = self.render_tx.send(RenderCommand::Shutdown);
        if let Some(actor) = self.renderer_actor.take() {
            actor.join();
        }

        // Restore terminal state
        let mut stdout = io::stdout();
        let _ = execute!(stdout, cursor::Show);
        if self.config.enable_mouse {
            let _ = execute!(stdout, DisableMouseCapture);
        }
        if self.config.alternate_screen {
            let _ = execute!(stdout, LeaveAlternateScreen);
        }
        let _ = terminal::disable_raw_mode();
        tracing::debug!("terminal restored");
    }
}
