//! Input Actor: Dedicated thread for polling terminal events.
//!
//! This actor runs in its own thread and uses crossterm's event polling
//! to capture keyboard, mouse wheel, and resize events without blocking
//! the main loop while a story streams in.

use super::messages::{InputEvent, KeyCode, KeyModifiers};
use crossbeam_channel::Sender;
use crossterm::event::{self, Event, KeyEventKind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Input actor that polls terminal events.
#[derive(Debug)]
pub struct InputActor {
    /// Handle to the input thread.
    handle: Option<JoinHandle<()>>,
    /// Flag to signal shutdown.
    shutdown: Arc<AtomicBool>,
}

impl InputActor {
    /// Spawn the input actor thread.
    ///
    /// `poll_timeout` bounds how long a shutdown request can go unnoticed.
    ///
    /// # Panics
    ///
    /// Panics if the OS fails to spawn the thread.
    pub fn spawn(sender: Sender<InputEvent>, poll_timeout: Duration) -> Self {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();

        let handle = thread::Builder::new()
            .name("storyteller-input".to_string())
            .spawn(move || {
                Self::run_loop(&sender, &shutdown_clone, poll_timeout);
            })
            .expect("Failed to spawn input thread");

        Self {
            handle: Some(handle),
            shutdown,
        }
    }

    /// Signal the input thread to shutdown.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Wait for the input thread to finish.
    pub fn join(mut self) {
        self.shutdown();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    fn run_loop(sender: &Sender<InputEvent>, shutdown: &AtomicBool, poll_timeout: Duration) {
        loop {
            if shutdown.load(Ordering::Relaxed) {
                // Nobody may be draining the channel any more
                let _ = sender.try_send(InputEvent::Shutdown);
                break;
            }

            match event::poll(poll_timeout) {
                Ok(true) => match event::read() {
                    Ok(event) => {
                        if let Some(input_event) = convert_event(event) {
                            if sender.send(input_event).is_err() {
                                break;
                            }
                        }
                    }
                    Err(e) => {
                        let _ = sender.send(InputEvent::Error(e.to_string()));
                    }
                },
                Ok(false) => {}
                Err(e) => {
                    let _ = sender.send(InputEvent::Error(e.to_string()));
                }
            }
        }
    }
}

impl Drop for InputActor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Convert a crossterm event to our InputEvent.
pub(crate) fn convert_event(event: Event) -> Option<InputEvent> {
    match event {
        Event::Key(key_event) => {
            // Only process key press events (not release or repeat)
            if key_event.kind != KeyEventKind::Press {
                return None;
            }

            let code = convert_key_code(key_event.code)?;
            let modifiers = convert_modifiers(key_event.modifiers);

            Some(InputEvent::Key { code, modifiers })
        }

        Event::Mouse(mouse_event) => match mouse_event.kind {
            event::MouseEventKind::ScrollUp => Some(InputEvent::MouseScroll { delta: 1 }),
            event::MouseEventKind::ScrollDown => Some(InputEvent::MouseScroll { delta: -1 }),
            _ => None,
        },

        Event::Resize(width, height) => Some(InputEvent::Resize { width, height }),

        Event::Paste(text) => Some(InputEvent::Paste(text)),

        Event::FocusGained | Event::FocusLost => None,
    }
}

fn convert_key_code(code: event::KeyCode) -> Option<KeyCode> {
    Some(match code {
        event::KeyCode::Char(c) => KeyCode::Char(c),
        event::KeyCode::Backspace => KeyCode::Backspace,
        event::KeyCode::Enter => KeyCode::Enter,
        event::KeyCode::Left => KeyCode::Left,
        event::KeyCode::Right => KeyCode::Right,
        event::KeyCode::Up => KeyCode::Up,
        event::KeyCode::Down => KeyCode::Down,
        event::KeyCode::Home => KeyCode::Home,
        event::KeyCode::End => KeyCode::End,
        event::KeyCode::PageUp => KeyCode::PageUp,
        event::KeyCode::PageDown => KeyCode::PageDown,
        event::KeyCode::Tab => KeyCode::Tab,
        event::KeyCode::Delete => KeyCode::Delete,
        event::KeyCode::Esc => KeyCode::Esc,
        _ => return None,
    })
}

fn convert_modifiers(mods: event::KeyModifiers) -> KeyModifiers {
    KeyModifiers {
        shift: mods.contains(event::KeyModifiers::SHIFT),
        control: mods.contains(event::KeyModifiers::CONTROL),
        alt: mods.contains(event::KeyModifiers::ALT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEvent, MouseEvent, MouseEventKind};

    #[test]
    fn test_convert_ctrl_key() {
        let event = Event::Key(KeyEvent::new(
            event::KeyCode::Char('n'),
            event::KeyModifiers::CONTROL,
        ));
        assert_eq!(convert_event(event), Some(InputEvent::ctrl('n')));
    }

    #[test]
    fn test_convert_wheel_and_ignore_clicks() {
        let wheel = Event::Mouse(MouseEvent {
            kind: MouseEventKind::ScrollDown,
            column: 3,
            row: 4,
            modifiers: event::KeyModifiers::NONE,
        });
        assert_eq!(convert_event(wheel), Some(InputEvent::MouseScroll { delta: -1 }));

        let click = Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(event::MouseButton::Left),
            column: 0,
            row: 0,
            modifiers: event::KeyModifiers::NONE,
        });
        assert_eq!(convert_event(click), None);
    }

    #[test]
    fn test_ignores_key_release() {
        let mut key = KeyEvent::new(event::KeyCode::Enter, event::KeyModifiers::NONE);
        key.kind = KeyEventKind::Release;
        assert_eq!(convert_event(Event::Key(key)), None);
    }
}
