//! Stream Actor: Dedicated thread for one story request.
//!
//! The actor performs the request, reads the body line by line and forwards
//! every event to the controller, tagged with the reveal session it was
//! started for. It is never interrupted: once superseded, its late events
//! are recognised by their session id and ignored by the receiver.

use super::http::StoryClient;
use crate::reveal::SessionId;
use crate::stream::StoryEvent;
use crossbeam_channel::Sender;
use std::thread::{self, JoinHandle};

/// What the actor should ask the server for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoryRequest {
    /// Load the stored transcript.
    Load,
    /// Start a new story (streamed).
    NewStory,
    /// Submit an action (streamed).
    Turn {
        /// The player's action.
        action: String,
    },
    /// Start a new story without streaming.
    NewStoryBlocking,
    /// Submit an action without streaming.
    TurnBlocking {
        /// The player's action.
        action: String,
    },
}

/// Messages from a stream actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamMessage {
    /// One parsed line of the stream.
    Event(StoryEvent),
    /// A complete story from a non-streaming request.
    Loaded(String),
    /// The request failed before or while reading the body.
    Failed(String),
    /// The actor is done; nothing else will follow.
    Closed,
}

/// A message tagged with the reveal session it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEnvelope {
    /// Session the request was started for.
    pub session: SessionId,
    /// Payload.
    pub message: StreamMessage,
}

/// Handle to a running request thread.
#[derive(Debug)]
pub struct StreamActor {
    session: SessionId,
    handle: Option<JoinHandle<()>>,
}

impl StreamActor {
    /// Spawn a thread running `request` for `session`.
    ///
    /// # Panics
    ///
    /// Panics if the OS fails to spawn the thread.
    pub fn spawn(
        client: StoryClient,
        request: StoryRequest,
        session: SessionId,
        sender: Sender<StreamEnvelope>,
    ) -> Self {
        let handle = thread::Builder::new()
            .name(format!("storyteller-stream-{}", session.get()))
            .spawn(move || {
                let send = |message| {
                    sender
                        .send(StreamEnvelope { session, message })
                        .is_ok()
                };
                Self::run(&client, &request, send);
            })
            .expect("Failed to spawn stream thread");

        Self {
            session,
            handle: Some(handle),
        }
    }

    /// Session this actor serves.
    pub const fn session(&self) -> SessionId {
        self.session
    }

    /// Whether the thread has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Run one request, reporting through `send`.
    ///
    /// `send` returns `false` once the receiver is gone, which stops reading.
    pub fn run(client: &StoryClient, request: &StoryRequest, mut send: impl FnMut(StreamMessage) -> bool) {
        let stream = match request {
            StoryRequest::Load => {
                Self::report_blocking(client.get_story(), &mut send);
                return;
            }
            StoryRequest::NewStoryBlocking => {
                Self::report_blocking(client.new_story(), &mut send);
                return;
            }
            StoryRequest::TurnBlocking { action } => {
                Self::report_blocking(client.take_turn(action), &mut send);
                return;
            }
            StoryRequest::NewStory => client.new_story_stream(),
            StoryRequest::Turn { action } => client.turn_stream(action),
        };

        let mut stream = match stream {
            Ok(stream) => stream,
            Err(err) => {
                tracing::warn!(error = %err, "stream request failed");
                if send(StreamMessage::Failed(err.user_message())) {
                    send(StreamMessage::Closed);
                }
                return;
            }
        };

        for item in stream.by_ref() {
            match item {
                Ok(event) => {
                    let terminal = event.is_terminal();
                    if !send(StreamMessage::Event(event)) {
                        tracing::debug!("stream receiver gone, stopping read");
                        return;
                    }
                    if terminal {
                        break;
                    }
                }
                Err(err) => {
                    tracing::warn!(error = %err, "stream body unreadable");
                    if !send(StreamMessage::Failed(format!(
                        "Lost connection to the story server: {err}"
                    ))) {
                        return;
                    }
                    break;
                }
            }
        }
        if stream.skipped() > 0 {
            tracing::debug!(skipped = stream.skipped(), "ignored malformed stream lines");
        }
        send(StreamMessage::Closed);
    }

    fn report_blocking(
        result: super::ClientResult<String>,
        send: &mut impl FnMut(StreamMessage) -> bool,
    ) {
        let delivered = match result {
            Ok(story) => send(StreamMessage::Loaded(story)),
            Err(err) => send(StreamMessage::Failed(err.user_message())),
        };
        if delivered {
            send(StreamMessage::Closed);
        }
    }
}
