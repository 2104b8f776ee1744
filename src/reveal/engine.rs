//! Reveal Engine: owner of the active reveal session and its ticker.
//!
//! The engine decouples the arrival rate of chunks (network-bound, bursty)
//! from the display rate (fixed, human-readable). At most one session is
//! active; `start` always tears the previous one down first.

use super::session::{Completion, RevealSession, RevealSink, SessionId};
use super::ticker::{Tick, TickerActor};
use crossbeam_channel::Receiver;
use std::time::Duration;

/// Pacing configuration for the reveal animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealConfig {
    /// Period between ticks.
    pub period: Duration,
    /// Characters revealed per millisecond of period, scaled so the reveal
    /// speed stays constant when the period changes.
    pub reveal_ratio: u32,
}

impl RevealConfig {
    /// Default tick period.
    pub const DEFAULT_PERIOD: Duration = Duration::from_millis(14);
    /// Default reveal ratio.
    pub const DEFAULT_RATIO: u32 = 30;

    /// Config with the given period in milliseconds and the default ratio.
    pub const fn with_period_ms(ms: u64) -> Self {
        Self {
            period: Duration::from_millis(ms),
            reveal_ratio: Self::DEFAULT_RATIO,
        }
    }

    /// Characters revealed by each tick: `max(1, floor(ratio / period_ms))`.
    pub fn chars_per_tick(&self) -> usize {
        let period_ms = u64::try_from(self.period.as_millis()).unwrap_or(u64::MAX).max(1);
        let per_tick = u64::from(self.reveal_ratio) / period_ms;
        usize::try_from(per_tick).unwrap_or(usize::MAX).max(1)
    }
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            period: Self::DEFAULT_PERIOD,
            reveal_ratio: Self::DEFAULT_RATIO,
        }
    }
}

/// How ticks are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickSource {
    /// A ticker thread per session; the owner selects on [`RevealEngine::ticks`].
    Thread,
    /// No thread; the owner calls [`RevealEngine::tick`] itself.
    Manual,
}

/// The Stream Reveal Engine.
///
/// ```ignore
/// let mut engine = RevealEngine::new(RevealConfig::default());
/// let id = engine.start(transcript, |text: &str| pane.set_text(text));
/// engine.enqueue("Once upon");
/// // on every tick:
/// if let Some(done) = engine.tick() {
///     render_final(done.story);
/// }
/// ```
pub struct RevealEngine {
    config: RevealConfig,
    source: TickSource,
    session: Option<RevealSession>,
    ticker: Option<TickerActor>,
    next_id: u64,
}

impl RevealEngine {
    /// Create an engine whose ticks come from a ticker thread.
    pub const fn new(config: RevealConfig) -> Self {
        Self::with_source(config, TickSource::Thread)
    }

    /// Create an engine driven by explicit `tick` calls only.
    pub const fn manual(config: RevealConfig) -> Self {
        Self::with_source(config, TickSource::Manual)
    }

    /// Create an engine with an explicit tick source.
    pub const fn with_source(config: RevealConfig, source: TickSource) -> Self {
        Self {
            config,
            source,
            session: None,
            ticker: None,
            next_id: 0,
        }
    }

    /// Pacing configuration.
    pub const fn config(&self) -> RevealConfig {
        self.config
    }

    /// Begin a new session, cancelling any active one first.
    pub fn start<S>(&mut self, prefix: impl Into<String>, sink: S) -> SessionId
    where
        S: RevealSink + 'static,
    {
        self.cancel();

        self.next_id += 1;
        let id = SessionId(self.next_id);
        let session = RevealSession::new(id, prefix, Box::new(sink));
        tracing::debug!(
            session = %id,
            prefix_len = session.prefix().len(),
            chars_per_tick = self.config.chars_per_tick(),
            "reveal started"
        );
        self.session = Some(session);

        if self.source == TickSource::Thread {
            self.ticker = Some(TickerActor::spawn(self.config.period));
        }
        id
    }

    /// Append a chunk to the active session.
    ///
    /// Returns `false` (and drops the text) when no session is active.
    pub fn enqueue(&mut self, text: &str) -> bool {
        if let Some(session) = self.session.as_mut() {
            session.enqueue(text);
            true
        } else {
            tracing::debug!(len = text.len(), "chunk dropped: no active reveal session");
            false
        }
    }

    /// Advance the animation by one tick.
    ///
    /// When a completion fires the session ends and the ticker stops.
    pub fn tick(&mut self) -> Option<Completion> {
        let per_tick = self.config.chars_per_tick();
        let completion = self.session.as_mut()?.tick(per_tick);
        if completion.is_some() {
            self.finish();
        }
        completion
    }

    /// Register the authoritative final text.
    ///
    /// Returns the completion immediately if nothing is left to reveal.
    pub fn finalize(&mut self, story: impl Into<String>) -> Option<Completion> {
        let Some(session) = self.session.as_mut() else {
            tracing::debug!("final dropped: no active reveal session");
            return None;
        };
        let completion = session.finalize(story.into());
        if completion.is_some() {
            self.finish();
        }
        completion
    }

    /// Stop the ticker and drop the session without firing its completion.
    ///
    /// Synchronous: when this returns the ticker thread has exited and the
    /// session's display callback has been dropped.
    pub fn cancel(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.join();
        }
        if let Some(session) = self.session.take() {
            tracing::debug!(
                session = %session.id(),
                pending = session.pending_chars(),
                "reveal cancelled"
            );
        }
    }

    fn finish(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.join();
        }
        if let Some(session) = self.session.take() {
            tracing::debug!(session = %session.id(), revealed = session.revealed_chars(), "reveal finished");
        }
    }

    /// Receiver for the active session's ticks.
    ///
    /// Returns a receiver that never fires when there is no ticker, so it
    /// can sit in a `select!` unconditionally.
    pub fn ticks(&self) -> Receiver<Tick> {
        self.ticker
            .as_ref()
            .map_or_else(crossbeam_channel::never, |t| t.receiver().clone())
    }

    /// Identity of the active session.
    pub fn active_id(&self) -> Option<SessionId> {
        self.session.as_ref().map(RevealSession::id)
    }

    /// Whether `id` is the active session.
    pub fn is_active(&self, id: SessionId) -> bool {
        self.active_id() == Some(id)
    }

    /// The active session, if any.
    pub const fn session(&self) -> Option<&RevealSession> {
        self.session.as_ref()
    }

    /// Whether a ticker thread is currently armed.
    pub const fn is_ticking(&self) -> bool {
        self.ticker.is_some()
    }
}

impl Drop for RevealEngine {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for RevealEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RevealEngine")
            .field("config", &self.config)
            .field("source", &self.source)
            .field("session", &self.session)
            .field("ticking", &self.ticker.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Frames = Rc<RefCell<Vec<String>>>;

    fn recorder() -> (Frames, impl FnMut(&str) + 'static) {
        let frames: Frames = Rc::new(RefCell::new(Vec::new()));
        let sink_frames = Rc::clone(&frames);
        (frames, move |text: &str| {
            sink_frames.borrow_mut().push(text.to_string());
        })
    }

    fn manual_engine() -> RevealEngine {
        RevealEngine::manual(RevealConfig::default())
    }

    #[test]
    fn test_chars_per_tick_calibration() {
        assert_eq!(RevealConfig::with_period_ms(14).chars_per_tick(), 2);
        assert_eq!(RevealConfig::with_period_ms(10).chars_per_tick(), 3);
        assert_eq!(RevealConfig::with_period_ms(30).chars_per_tick(), 1);
        assert_eq!(RevealConfig::with_period_ms(100).chars_per_tick(), 1);
        assert_eq!(RevealConfig::with_period_ms(1).chars_per_tick(), 30);
        assert_eq!(RevealConfig::with_period_ms(0).chars_per_tick(), 30);
    }

    #[test]
    fn test_order_preserved_across_chunks() {
        let mut engine = manual_engine();
        let (frames, sink) = recorder();
        engine.start("Prefix: ", sink);

        let chunks = ["The ", "door ", "creaks", " open."];
        for chunk in chunks {
            engine.enqueue(chunk);
            engine.tick();
        }
        while engine.session().is_some_and(|s| s.pending_chars() > 0) {
            engine.tick();
        }

        let last = frames.borrow().last().cloned().unwrap();
        assert_eq!(last, format!("Prefix: {}", chunks.concat()));
        // Every frame extends the previous one
        let frames = frames.borrow();
        for pair in frames.windows(2) {
            assert!(pair[1].starts_with(&pair[0]));
        }
    }

    #[test]
    fn test_order_preserved_for_any_interleaving() {
        let chunks = ["Once ", "upon ", "a t\u{ed}me", ", ", "h\u{e9}roes", " wandered."];
        let expected = format!("Prefix: {}", chunks.concat());

        for per_batch in 1..=chunks.len() {
            for ticks_between in 0..=4 {
                let mut engine = manual_engine();
                let (frames, sink) = recorder();
                engine.start("Prefix: ", sink);
                assert_eq!(engine.session().map(RevealSession::prefix), Some("Prefix: "));

                for batch in chunks.chunks(per_batch) {
                    for chunk in batch {
                        engine.enqueue(chunk);
                    }
                    for _ in 0..ticks_between {
                        engine.tick();
                    }
                }
                while engine.session().is_some_and(|s| s.pending_chars() > 0) {
                    engine.tick();
                }

                let frames = frames.borrow();
                assert_eq!(
                    frames.last(),
                    Some(&expected),
                    "batch of {per_batch}, {ticks_between} ticks between"
                );
                for pair in frames.windows(2) {
                    assert!(pair[1].starts_with(&pair[0]));
                }
            }
        }
    }

    #[test]
    fn test_pacing_two_chars_per_tick() {
        let mut engine = manual_engine();
        let (_frames, sink) = recorder();
        engine.start("", sink);
        engine.enqueue("abcdefg");

        for n in 1..=5usize {
            engine.tick();
            let revealed = engine.session().map_or(7, RevealSession::revealed_chars);
            assert_eq!(revealed, (n * 2).min(7));
        }
    }

    #[test]
    fn test_no_premature_finalize() {
        let mut engine = manual_engine();
        let (_frames, sink) = recorder();
        let id = engine.start("", sink);
        engine.enqueue("twelve chars");

        assert!(engine.finalize("twelve chars!").is_none());
        let mut ticks = 0;
        let done = loop {
            ticks += 1;
            if let Some(done) = engine.tick() {
                break done;
            }
            assert!(ticks < 100, "completion never fired");
        };

        assert_eq!(done.session, id);
        assert_eq!(done.revealed_chars, 12);
        assert_eq!(ticks, 6);
        assert!(engine.active_id().is_none());
    }

    #[test]
    fn test_immediate_finalize() {
        let mut engine = manual_engine();
        let (_frames, sink) = recorder();
        engine.start("", sink);
        engine.enqueue("ab");
        engine.tick();

        let done = engine.finalize("ab").expect("queue already empty");
        assert_eq!(done.story, "ab");
        assert!(engine.session().is_none());
    }

    #[test]
    fn test_cancel_discards_completion_and_updates() {
        let mut engine = manual_engine();
        let (frames, sink) = recorder();
        engine.start("", sink);
        engine.enqueue("long pending text");
        engine.tick();
        assert!(engine.finalize("final").is_none());

        engine.cancel();
        let seen = frames.borrow().len();
        for _ in 0..20 {
            assert!(engine.tick().is_none());
        }
        assert_eq!(frames.borrow().len(), seen);
        assert!(engine.finalize("late").is_none());
    }

    #[test]
    fn test_chunks_before_start_are_dropped() {
        let mut engine = manual_engine();
        assert!(!engine.enqueue("early"));

        let (frames, sink) = recorder();
        engine.start("", sink);
        assert!(engine.enqueue("late"));
        engine.tick();
        engine.tick();
        assert_eq!(frames.borrow().last().map(String::as_str), Some("late"));
    }

    #[test]
    fn test_restart_resets_state() {
        let mut engine = manual_engine();
        let (old_frames, old_sink) = recorder();
        let first = engine.start("", old_sink);
        engine.enqueue("stale text");
        engine.finalize("stale final");

        let (frames, sink) = recorder();
        let second = engine.start("", sink);
        let second_again = {
            let (_f, s) = recorder();
            engine.start("", s)
        };
        assert_ne!(first, second);
        assert_ne!(second, second_again);

        let session = engine.session().unwrap();
        assert_eq!(session.pending_chars(), 0);
        assert_eq!(session.revealed_chars(), 0);
        assert!(!session.has_pending_completion());

        engine.enqueue("abcd");
        engine.tick();
        assert_eq!(engine.session().unwrap().revealed_chars(), 2);
        assert!(old_frames.borrow().is_empty());
        assert!(frames.borrow().is_empty());
    }

    #[test]
    fn test_threaded_engine_keeps_single_ticker() {
        let mut engine = RevealEngine::new(RevealConfig::default());
        let (_f1, s1) = recorder();
        engine.start("", s1);
        let first_ticks = engine.ticks();
        let (_f2, s2) = recorder();
        engine.start("", s2);
        assert!(engine.is_ticking());

        // The first ticker was joined: its channel is disconnected once drained
        while first_ticks.try_recv().is_ok() {}
        assert!(matches!(
            first_ticks.try_recv(),
            Err(crossbeam_channel::TryRecvError::Disconnected)
        ));

        let tick = engine.ticks().recv_timeout(Duration::from_millis(500));
        assert!(tick.is_ok());

        engine.cancel();
        assert!(!engine.is_ticking());
        assert!(engine
            .ticks()
            .recv_timeout(Duration::from_millis(30))
            .is_err());
    }
}
