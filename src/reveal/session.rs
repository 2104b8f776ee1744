//! Reveal session: the state of one streaming render.
//!
//! A session owns the queue of characters that arrived from the network but
//! have not been shown yet, the text already shown, and an optional pending
//! completion. It has no notion of time; the engine drives it one tick at a
//! time.

use std::collections::VecDeque;
use std::fmt;

/// Identity of one reveal session.
///
/// Network events are tagged with the session they were requested for, so a
/// superseded stream can be recognised and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub(crate) u64);

impl SessionId {
    /// Raw numeric value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "reveal#{}", self.0)
    }
}

/// Receives every rendered frame of a session.
///
/// Called synchronously from `tick`. Implementations should be cheap and
/// must not panic.
pub trait RevealSink {
    /// Show `text` (prefix plus everything revealed so far).
    fn on_update(&mut self, text: &str);
}

impl<F> RevealSink for F
where
    F: FnMut(&str),
{
    fn on_update(&mut self, text: &str) {
        self(text);
    }
}

/// The authoritative final text, delivered once the animation caught up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// Session that completed.
    pub session: SessionId,
    /// Full story text from the terminal `final` event.
    pub story: String,
    /// Number of characters revealed when the completion fired.
    pub revealed_chars: usize,
}

/// Live state of one streaming render.
pub struct RevealSession {
    id: SessionId,
    prefix: String,
    pending: VecDeque<char>,
    revealed: String,
    revealed_chars: usize,
    enqueued_chars: usize,
    pending_completion: Option<String>,
    sink: Box<dyn RevealSink>,
}

impl RevealSession {
    /// Create an empty session.
    pub fn new(id: SessionId, prefix: impl Into<String>, sink: Box<dyn RevealSink>) -> Self {
        Self {
            id,
            prefix: prefix.into(),
            pending: VecDeque::new(),
            revealed: String::new(),
            revealed_chars: 0,
            enqueued_chars: 0,
            pending_completion: None,
            sink,
        }
    }

    /// Session identity.
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// Text prepended to every frame.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Text revealed so far (without the prefix).
    pub fn revealed(&self) -> &str {
        &self.revealed
    }

    /// Number of characters revealed so far.
    pub const fn revealed_chars(&self) -> usize {
        self.revealed_chars
    }

    /// Number of characters waiting to be revealed.
    pub fn pending_chars(&self) -> usize {
        self.pending.len()
    }

    /// Total number of characters ever enqueued.
    pub const fn enqueued_chars(&self) -> usize {
        self.enqueued_chars
    }

    /// Whether a completion is waiting for the queue to drain.
    pub const fn has_pending_completion(&self) -> bool {
        self.pending_completion.is_some()
    }

    /// Append a chunk to the back of the queue.
    pub fn enqueue(&mut self, text: &str) {
        let before = self.pending.len();
        self.pending.extend(text.chars());
        self.enqueued_chars += self.pending.len() - before;
    }

    /// Reveal up to `chars_per_tick` characters.
    ///
    /// Returns the completion if this tick drained the queue (or the queue
    /// was already empty) while one was pending.
    pub fn tick(&mut self, chars_per_tick: usize) -> Option<Completion> {
        if self.pending.is_empty() {
            return self.take_completion();
        }

        let take = chars_per_tick.max(1).min(self.pending.len());
        self.revealed.extend(self.pending.drain(..take));
        self.revealed_chars += take;

        let mut frame = String::with_capacity(self.prefix.len() + self.revealed.len());
        frame.push_str(&self.prefix);
        frame.push_str(&self.revealed);
        self.sink.on_update(&frame);

        if self.pending.is_empty() {
            self.take_completion()
        } else {
            None
        }
    }

    /// Register the final text.
    ///
    /// With an empty queue the completion is returned at once; otherwise it
    /// is held until a tick drains the queue. A second `final` for the same
    /// session is ignored.
    pub fn finalize(&mut self, story: String) -> Option<Completion> {
        if self.pending_completion.is_some() {
            tracing::warn!(session = %self.id, "duplicate final event ignored");
            return None;
        }
        self.pending_completion = Some(story);
        if self.pending.is_empty() {
            self.take_completion()
        } else {
            None
        }
    }

    fn take_completion(&mut self) -> Option<Completion> {
        self.pending_completion.take().map(|story| Completion {
            session: self.id,
            story,
            revealed_chars: self.revealed_chars,
        })
    }
}

impl fmt::Debug for RevealSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RevealSession")
            .field("id", &self.id)
            .field("prefix_len", &self.prefix.len())
            .field("pending", &self.pending.len())
            .field("revealed", &self.revealed_chars)
            .field("pending_completion", &self.pending_completion.is_some())
            .finish_non_exhaustive()
    }
}
