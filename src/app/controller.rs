//! Story controller: ties the reveal engine to requests and a display.
//!
//! The controller runs on the main thread and handles one message at a
//! time: a reveal tick, an envelope from a stream actor, or a player
//! command. Every request starts a reveal session first; the session id
//! travels with the request so late messages from a superseded request
//! are recognised and dropped.

use super::display::StoryDisplay;
use crate::choices::{echo_prefix, StoryPage};
use crate::client::{StoryClient, StoryRequest, StreamActor, StreamEnvelope, StreamMessage};
use crate::reveal::{Completion, RevealEngine, SessionId, Tick};
use crate::stream::StoryEvent;
use crossbeam_channel::{Receiver, Sender};
use std::cell::Cell;
use std::rc::Rc;

/// Shown when a stream ends without `final` or `error`.
pub const STREAM_ENDED_EARLY: &str = "The story stream ended unexpectedly.";

/// Starts requests on behalf of the controller.
pub trait Dispatch {
    /// Run `request`, reporting back tagged with `session`.
    fn dispatch(&mut self, request: StoryRequest, session: SessionId);
}

/// Dispatch that runs every request on its own [`StreamActor`].
#[derive(Debug)]
pub struct ActorDispatch {
    client: StoryClient,
    sender: Sender<StreamEnvelope>,
    actors: Vec<StreamActor>,
}

impl ActorDispatch {
    /// Dispatch through `client`, reporting on `sender`.
    pub const fn new(client: StoryClient, sender: Sender<StreamEnvelope>) -> Self {
        Self {
            client,
            sender,
            actors: Vec::new(),
        }
    }

    /// Requests still running, including superseded ones.
    pub fn in_flight(&self) -> usize {
        self.actors.iter().filter(|a| !a.is_finished()).count()
    }
}

impl Dispatch for ActorDispatch {
    fn dispatch(&mut self, request: StoryRequest, session: SessionId) {
        self.actors.retain(|actor| !actor.is_finished());
        for actor in &self.actors {
            tracing::debug!(session = %actor.session(), "request superseded, still draining");
        }
        tracing::debug!(session = %session, ?request, "dispatching request");
        self.actors.push(StreamActor::spawn(
            self.client.clone(),
            request,
            session,
            self.sender.clone(),
        ));
    }
}

/// Owns the reveal engine and drives the display.
pub struct StoryController<D, X> {
    engine: RevealEngine,
    dispatch: X,
    display: D,
    page: StoryPage,
    streaming: bool,
    busy: bool,
    last_error: Option<String>,
    /// Latest frame produced by the reveal session, not yet shown.
    frame: Rc<Cell<Option<String>>>,
}

impl<D: StoryDisplay, X: Dispatch> StoryController<D, X> {
    /// Create a controller.
    ///
    /// With `streaming` off, new stories and turns use the non-streaming
    /// endpoints; the reply is still shown through a reveal session.
    pub fn new(engine: RevealEngine, dispatch: X, display: D, streaming: bool) -> Self {
        Self {
            engine,
            dispatch,
            display,
            page: StoryPage::default(),
            streaming,
            busy: false,
            last_error: None,
            frame: Rc::new(Cell::new(None)),
        }
    }

    /// The display.
    pub const fn display(&self) -> &D {
        &self.display
    }

    /// The display, mutably.
    pub const fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    /// The dispatcher.
    pub const fn dispatcher(&self) -> &X {
        &self.dispatch
    }

    /// The page currently shown.
    pub const fn page(&self) -> &StoryPage {
        &self.page
    }

    /// Whether a request is in flight.
    pub const fn is_busy(&self) -> bool {
        self.busy
    }

    /// Message of the most recent failure, cleared when a request starts.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// The reveal engine.
    pub const fn engine(&self) -> &RevealEngine {
        &self.engine
    }

    /// Tick channel of the active reveal session.
    pub fn ticks(&self) -> Receiver<Tick> {
        self.engine.ticks()
    }

    /// Load the stored story for this client session.
    pub fn load(&mut self) -> SessionId {
        self.begin(String::new(), StoryRequest::Load, false)
    }

    /// Start a new story.
    pub fn new_story(&mut self) -> SessionId {
        let request = if self.streaming {
            StoryRequest::NewStory
        } else {
            StoryRequest::NewStoryBlocking
        };
        self.begin(String::new(), request, true)
    }

    /// Submit a player action. Blank actions are ignored.
    pub fn submit(&mut self, action: &str) -> Option<SessionId> {
        let action = action.trim();
        if action.is_empty() {
            return None;
        }
        let prefix = echo_prefix(&self.page.transcript, action);
        let action = action.to_string();
        let request = if self.streaming {
            StoryRequest::Turn { action }
        } else {
            StoryRequest::TurnBlocking { action }
        };
        Some(self.begin(prefix, request, true))
    }

    /// Submit choice `index` (zero-based) of the current page.
    pub fn choose(&mut self, index: usize) -> Option<SessionId> {
        let choice = self.page.choices.get(index)?.clone();
        self.submit(&choice)
    }

    fn begin(&mut self, prefix: String, request: StoryRequest, show_prefix: bool) -> SessionId {
        let slot = Rc::clone(&self.frame);
        let session = self
            .engine
            .start(prefix.clone(), move |text: &str| slot.set(Some(text.to_owned())));
        self.frame.set(None);

        self.busy = true;
        self.last_error = None;
        self.display.set_busy(true);
        if show_prefix {
            self.display.show_frame(&prefix);
        }

        self.dispatch.dispatch(request, session);
        session
    }

    /// Advance the reveal animation by one tick.
    pub fn handle_tick(&mut self) {
        let completion = self.engine.tick();
        self.flush_frame();
        if let Some(completion) = completion {
            self.complete(completion);
        }
    }

    /// Handle a message from a stream actor.
    pub fn handle_envelope(&mut self, envelope: StreamEnvelope) {
        let StreamEnvelope { session, message } = envelope;
        if !self.engine.is_active(session) {
            tracing::debug!(session = %session, payload = ?message, "stale envelope ignored");
            return;
        }

        match message {
            StreamMessage::Event(StoryEvent::Chunk { text }) => {
                self.engine.enqueue(&text);
            }
            StreamMessage::Event(StoryEvent::Final { story }) | StreamMessage::Loaded(story) => {
                if let Some(completion) = self.engine.finalize(story) {
                    self.flush_frame();
                    self.complete(completion);
                }
            }
            StreamMessage::Event(StoryEvent::Error { message }) | StreamMessage::Failed(message) => {
                self.fail(&message);
            }
            StreamMessage::Closed => {
                let finishing = self
                    .engine
                    .session()
                    .is_some_and(|s| s.has_pending_completion());
                if !finishing {
                    self.fail(STREAM_ENDED_EARLY);
                }
            }
        }
    }

    /// Stop any animation without showing anything further.
    pub fn cancel(&mut self) {
        self.engine.cancel();
        self.frame.set(None);
        if self.busy {
            self.busy = false;
            self.display.set_busy(false);
        }
    }

    fn flush_frame(&mut self) {
        if let Some(text) = self.frame.take() {
            self.display.show_frame(&text);
        }
    }

    fn complete(&mut self, completion: Completion) {
        tracing::info!(
            session = %completion.session,
            revealed = completion.revealed_chars,
            "story complete"
        );
        self.page = StoryPage::from_story(&completion.story);
        self.display.show_page(&self.page);
        self.busy = false;
        self.display.set_busy(false);
    }

    fn fail(&mut self, message: &str) {
        tracing::warn!(session = ?self.engine.active_id(), error = message, "story request failed");
        self.engine.cancel();
        self.frame.set(None);
        self.last_error = Some(message.to_string());
        self.display.show_error(message);
        self.busy = false;
        self.display.set_busy(false);
    }
}

impl<D, X> std::fmt::Debug for StoryController<D, X> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoryController")
            .field("engine", &self.engine)
            .field("page", &self.page)
            .field("streaming", &self.streaming)
            .field("busy", &self.busy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reveal::RevealConfig;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Frame(String),
        Page(StoryPage),
        Error(String),
        Busy(bool),
    }

    #[derive(Default)]
    struct Recorder(Vec<Call>);

    impl StoryDisplay for Recorder {
        fn show_frame(&mut self, text: &str) {
            self.0.push(Call::Frame(text.to_string()));
        }
        fn show_page(&mut self, page: &StoryPage) {
            self.0.push(Call::Page(page.clone()));
        }
        fn show_error(&mut self, message: &str) {
            self.0.push(Call::Error(message.to_string()));
        }
        fn set_busy(&mut self, busy: bool) {
            self.0.push(Call::Busy(busy));
        }
    }

    #[derive(Default)]
    struct Requests(Vec<(StoryRequest, SessionId)>);

    impl Dispatch for Requests {
        fn dispatch(&mut self, request: StoryRequest, session: SessionId) {
            self.0.push((request, session));
        }
    }

    type Controller = StoryController<Recorder, Requests>;

    fn controller(streaming: bool) -> Controller {
        // 14 ms period: two characters per tick
        let engine = RevealEngine::manual(RevealConfig::default());
        StoryController::new(engine, Requests::default(), Recorder::default(), streaming)
    }

    fn envelope(session: SessionId, message: StreamMessage) -> StreamEnvelope {
        StreamEnvelope { session, message }
    }

    fn chunk(text: &str) -> StreamMessage {
        StreamMessage::Event(StoryEvent::Chunk { text: text.into() })
    }

    fn last_frame(c: &Controller) -> Option<&str> {
        c.display().0.iter().rev().find_map(|call| match call {
            Call::Frame(text) => Some(text.as_str()),
            _ => None,
        })
    }

    fn pages(c: &Controller) -> Vec<&StoryPage> {
        c.display()
            .0
            .iter()
            .filter_map(|call| match call {
                Call::Page(page) => Some(page),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_load_renders_page() {
        let mut c = controller(true);
        let id = c.load();
        assert_eq!(c.dispatcher().0, vec![(StoryRequest::Load, id)]);
        assert!(c.is_busy());

        c.handle_envelope(envelope(id, StreamMessage::Loaded("Hi.\n1. A\n2. B".into())));
        c.handle_envelope(envelope(id, StreamMessage::Closed));

        assert!(!c.is_busy());
        assert_eq!(c.page().transcript, "Hi.");
        assert_eq!(c.page().choices, vec!["A", "B"]);
        assert_eq!(c.last_error(), None);
        assert_eq!(c.display().0.last(), Some(&Call::Busy(false)));
    }

    #[test]
    fn test_turn_reveals_then_renders_final() {
        let mut c = controller(true);
        let load = c.load();
        c.handle_envelope(envelope(load, StreamMessage::Loaded("Once.".into())));

        let id = c.submit("  look ").unwrap();
        assert_eq!(
            c.dispatcher().0.last(),
            Some(&(StoryRequest::Turn { action: "look".into() }, id))
        );
        let prefix = "Once.\n\n> You: look\n\n";
        assert_eq!(last_frame(&c), Some(prefix));

        c.handle_envelope(envelope(id, chunk("A ca")));
        c.handle_envelope(envelope(id, chunk("ve.")));
        let story = "Once.\n\n> You: look\n\nA cave.\n1. Enter\n2. Leave";
        c.handle_envelope(envelope(
            id,
            StreamMessage::Event(StoryEvent::Final { story: story.into() }),
        ));
        c.handle_envelope(envelope(id, StreamMessage::Closed));

        // Final waits for the queue: 7 chars at 2 per tick
        assert_eq!(pages(&c).len(), 1);
        for _ in 0..3 {
            c.handle_tick();
            assert!(c.is_busy());
        }
        c.handle_tick();
        assert!(!c.is_busy());
        assert_eq!(last_frame(&c), Some("Once.\n\n> You: look\n\nA cave."));

        let page = pages(&c)[1];
        assert_eq!(page.choices, vec!["Enter", "Leave"]);
        assert!(page.transcript.ends_with("A cave."));
    }

    #[test]
    fn test_superseded_session_is_ignored() {
        let mut c = controller(true);
        let first = c.new_story();
        c.handle_envelope(envelope(first, chunk("old")));
        let second = c.new_story();
        assert_ne!(first, second);

        c.handle_envelope(envelope(first, chunk("stale")));
        c.handle_envelope(envelope(first, StreamMessage::Failed("boom".into())));
        c.handle_envelope(envelope(second, chunk("new")));
        c.handle_tick();
        c.handle_tick();

        assert_eq!(last_frame(&c), Some("new"));
        assert_eq!(c.last_error(), None);
        assert!(c.is_busy());
    }

    #[test]
    fn test_error_event_cancels_and_shows_message() {
        let mut c = controller(true);
        let id = c.new_story();
        c.handle_envelope(envelope(id, chunk("abcdef")));
        c.handle_tick();
        c.handle_envelope(envelope(
            id,
            StreamMessage::Event(StoryEvent::Error { message: "model offline".into() }),
        ));

        assert!(!c.is_busy());
        assert_eq!(c.last_error(), Some("model offline"));
        let calls = c.display().0.len();
        c.handle_tick();
        c.handle_envelope(envelope(id, StreamMessage::Closed));
        assert_eq!(c.display().0.len(), calls);
        assert!(pages(&c).is_empty());
    }

    #[test]
    fn test_premature_close_is_an_error() {
        let mut c = controller(true);
        let id = c.new_story();
        c.handle_envelope(envelope(id, chunk("Half a sto")));
        c.handle_envelope(envelope(id, StreamMessage::Closed));
        assert_eq!(c.last_error(), Some(STREAM_ENDED_EARLY));
        assert!(c.display().0.contains(&Call::Error(STREAM_ENDED_EARLY.into())));
    }

    #[test]
    fn test_blocking_turn_uses_blocking_request() {
        let mut c = controller(false);
        assert_eq!(c.submit("   "), None);
        let id = c.submit("wait").unwrap();
        assert_eq!(
            c.dispatcher().0,
            vec![(StoryRequest::TurnBlocking { action: "wait".into() }, id)]
        );
        c.handle_envelope(envelope(id, StreamMessage::Loaded("> You: wait\n\nTime passes.".into())));
        assert_eq!(c.page().transcript, "> You: wait\n\nTime passes.");
    }

    #[test]
    fn test_choose_submits_choice_text() {
        let mut c = controller(true);
        let id = c.load();
        c.handle_envelope(envelope(id, StreamMessage::Loaded("Hm.\n1. Run\n2. Hide".into())));
        let turn = c.choose(1).unwrap();
        assert_eq!(
            c.dispatcher().0.last(),
            Some(&(StoryRequest::Turn { action: "Hide".into() }, turn))
        );
        assert_eq!(c.choose(5), None);
    }
}
