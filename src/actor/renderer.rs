//! Renderer Actor: Dedicated thread for rendering to the terminal.
//!
//! This actor owns the terminal output. It receives whole frames from the
//! main loop, compares them row by row with the frame on screen, and
//! writes only the rows that changed in a single flush.

use super::messages::RenderCommand;
use crate::terminal::OutputBuffer;
use crate::ui::Frame;
use crossbeam_channel::Receiver;
use std::io::{self, Write};
use std::thread::{self, JoinHandle};
use std::time::Instant;

/// Renderer actor that handles terminal output.
#[derive(Debug)]
pub struct RendererActor {
    /// Handle to the render thread.
    handle: Option<JoinHandle<()>>,
}

/// Render statistics for debugging/profiling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Total frames rendered.
    pub frames: u64,
    /// Total rows repainted across all frames.
    pub rows_changed: u64,
    /// Total bytes written to terminal.
    pub bytes_written: u64,
    /// Average render time in microseconds.
    pub avg_render_us: u64,
    /// Last render time in microseconds.
    pub last_render_us: u64,
}

/// Row-diffing renderer over any writer.
pub(crate) struct Renderer<W: Write> {
    /// Frame currently on screen, if known.
    current: Option<Frame>,
    /// Pre-allocated output buffer.
    output: OutputBuffer,
    /// Terminal (or test sink).
    writer: W,
    /// Render statistics.
    stats: RenderStats,
}

impl<W: Write> Renderer<W> {
    pub(crate) fn new(writer: W) -> Self {
        Self {
            current: None,
            output: OutputBuffer::with_capacity(65536),
            writer,
            stats: RenderStats::default(),
        }
    }

    /// Forget what is on screen; the next draw repaints everything.
    pub(crate) fn invalidate(&mut self) {
        self.current = None;
    }

    /// Paint `frame`, returning the number of rows written.
    pub(crate) fn draw(&mut self, frame: Frame) -> io::Result<usize> {
        let start = Instant::now();
        self.output.clear();
        self.output.cursor_hide();

        let previous = self
            .current
            .take()
            .filter(|prev| prev.width() == frame.width() && prev.height() == frame.height());
        if previous.is_none() {
            self.output.reset_attrs();
            self.output.clear_screen();
        }

        let mut changed = 0;
        for (y, line) in (0..frame.height()).zip(frame.lines()) {
            let same = previous
                .as_ref()
                .and_then(|prev| prev.line(y))
                .is_some_and(|old| old == line);
            if !same {
                self.output.write_line(y, line);
                changed += 1;
            }
        }

        if let Some((x, y)) = frame.cursor() {
            self.output.cursor_move(x, y);
            self.output.cursor_show();
        }

        self.output.flush_to(&mut self.writer)?;
        self.current = Some(frame);

        let elapsed = start.elapsed();
        self.stats.frames += 1;
        self.stats.rows_changed += changed as u64;
        self.stats.bytes_written += self.output.len() as u64;
        self.stats.last_render_us = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);

        // Smoothed average
        if self.stats.avg_render_us == 0 {
            self.stats.avg_render_us = self.stats.last_render_us;
        } else {
            self.stats.avg_render_us =
                (self.stats.avg_render_us * 15 + self.stats.last_render_us) / 16;
        }

        Ok(changed)
    }

    pub(crate) const fn stats(&self) -> &RenderStats {
        &self.stats
    }

    #[cfg(test)]
    pub(crate) fn writer(&self) -> &W {
        &self.writer
    }
}

impl RendererActor {
    /// Spawn the renderer actor thread writing to stdout.
    ///
    /// # Panics
    ///
    /// Panics if the OS fails to spawn the thread.
    pub fn spawn(receiver: Receiver<RenderCommand>) -> Self {
        let handle = thread::Builder::new()
            .name("storyteller-render".to_string())
            .spawn(move || {
                if let Err(e) = Self::run_loop(&receiver, Renderer::new(io::stdout())) {
                    tracing::error!(error = %e, "render thread failed");
                }
            })
            .expect("Failed to spawn render thread");

        Self {
            handle: Some(handle),
        }
    }

    /// Wait for the render thread to finish.
    pub fn join(mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    fn run_loop<W: Write>(
        receiver: &Receiver<RenderCommand>,
        mut renderer: Renderer<W>,
    ) -> io::Result<()> {
        while let Ok(command) = receiver.recv() {
            match command {
                RenderCommand::Draw(frame) => {
                    // Only the newest pending frame matters.
                    let mut frame = frame;
                    let mut shutdown = false;
                    while let Ok(next) = receiver.try_recv() {
                        match next {
                            RenderCommand::Draw(newer) => frame = newer,
                            RenderCommand::FullRedraw | RenderCommand::Resize { .. } => {
                                renderer.invalidate();
                            }
                            RenderCommand::Shutdown => {
                                shutdown = true;
                                break;
                            }
                        }
                    }
                    renderer.draw(*frame)?;
                    if shutdown {
                        break;
                    }
                }
                RenderCommand::FullRedraw | RenderCommand::Resize { .. } => {
                    renderer.invalidate();
                }
                RenderCommand::Shutdown => break,
            }
        }

        let stats = renderer.stats();
        tracing::debug!(
            frames = stats.frames,
            rows = stats.rows_changed,
            bytes = stats.bytes_written,
            avg_us = stats.avg_render_us,
            "renderer stopped"
        );
        Ok(())
    }
}
