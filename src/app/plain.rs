//! Line-oriented display for scripts and pipes.
//!
//! Frames of the typewriter animation only ever grow within a session, so
//! the plain display prints the difference from the previous frame.

use super::controller::{ActorDispatch, StoryController};
use super::display::StoryDisplay;
use crate::choices::{StoryPage, ECHO_MARKER};
use crate::client::StoryClient;
use crate::reveal::{RevealConfig, RevealEngine};
use crossbeam_channel::{select, unbounded, Receiver};
use std::io::{self, Write};

/// What the plain runner should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlainTask {
    /// Print the stored story.
    Show,
    /// Start a new story.
    NewStory,
    /// Take one turn.
    Turn(String),
}

/// Writes the story to a byte stream.
///
/// Trailing lines that look like the numbered choices are held back while
/// the story streams in: the final text decides whether they are choices
/// (printed once, as a `[n]` list) or part of the narrative.
#[derive(Debug)]
pub struct PlainDisplay<W: Write> {
    out: W,
    /// Latest frame of the current session.
    shown: String,
    /// Bytes of `shown` already written.
    printed: usize,
    /// Whether the last byte written was not a newline.
    line_open: bool,
}

impl<W: Write> PlainDisplay<W> {
    /// Display writing to `out`.
    pub const fn new(out: W) -> Self {
        Self {
            out,
            shown: String::new(),
            printed: 0,
            line_open: false,
        }
    }

    /// The underlying writer.
    pub const fn writer(&self) -> &W {
        &self.out
    }

    fn emit(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        // Nothing useful to do if stdout is gone.
        let _ = self.out.write_all(text.as_bytes());
        let _ = self.out.flush();
        self.line_open = !text.ends_with('\n');
    }

    fn end_line(&mut self) {
        if self.line_open {
            self.emit("\n");
        }
    }

    /// Write `shown` up to byte `upto`.
    fn release(&mut self, upto: usize) {
        if upto > self.printed {
            let text = self.shown[self.printed..upto].to_string();
            self.emit(&text);
            self.printed = upto;
        }
    }

    /// What the finished session should read, given the final transcript.
    ///
    /// A turn's frames start at the echo line; the final story repeats the
    /// whole transcript before it.
    fn final_text(&self, transcript: &str) -> String {
        match (echo_end(&self.shown), echo_end(transcript)) {
            (Some(head), Some(tail)) => format!("{}{}", &self.shown[..head], &transcript[tail..]),
            _ => transcript.to_string(),
        }
    }
}

impl<W: Write> StoryDisplay for PlainDisplay<W> {
    fn show_frame(&mut self, text: &str) {
        if !text.starts_with(&self.shown[..self.printed]) {
            self.end_line();
            self.printed = 0;
        }
        text.clone_into(&mut self.shown);
        self.release(held_from(&self.shown).max(self.printed));
    }

    fn show_page(&mut self, page: &StoryPage) {
        let target = self.final_text(&page.transcript);
        let printed = &self.shown[..self.printed];
        let settled = printed.trim_end();
        let rest = target.strip_prefix(settled).map(|rest| {
            let written = &printed[settled.len()..];
            rest.strip_prefix(written).unwrap_or(rest).to_string()
        });

        match rest {
            Some(rest) => self.emit(&rest),
            None => {
                tracing::debug!("final story differs from the streamed text");
                self.end_line();
                self.emit("\n");
                self.emit(after_last_echo(&page.transcript));
            }
        }
        self.shown = target;
        self.printed = self.shown.len();
        self.end_line();

        if !page.choices.is_empty() {
            let mut block = String::from("\n");
            for (i, choice) in page.choices.iter().enumerate() {
                block.push_str(&format!("  [{}] {choice}\n", i + 1));
            }
            self.emit(&block);
        }
    }

    fn show_error(&mut self, message: &str) {
        self.end_line();
        self.emit(&format!("error: {message}\n"));
    }

    fn set_busy(&mut self, busy: bool) {
        if busy {
            self.shown.clear();
            self.printed = 0;
        }
    }
}

/// Start of the trailing run of lines that may still turn out to be the
/// choice list: blank lines and `1.`-`3.` lines, including an unfinished
/// last line that could become one.
fn held_from(text: &str) -> usize {
    let mut held = text.len();
    let mut end = text.len();
    for line in text.split_inclusive('\n').rev() {
        let start = end - line.len();
        if !choice_like(line) {
            break;
        }
        held = start;
        end = start;
    }
    held
}

fn choice_like(line: &str) -> bool {
    let complete = line.ends_with('\n');
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return true;
    }
    let mut chars = line.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some('1'..='3'), None, _) | (Some('1'..='3'), Some('.'), None) => !complete,
        (Some('1'..='3'), Some('.'), Some(c)) => c.is_whitespace(),
        _ => false,
    }
}

/// Byte offset just past the last line echoing a player action.
fn echo_end(text: &str) -> Option<usize> {
    let mut offset = 0;
    let mut found = None;
    for line in text.split_inclusive('\n') {
        offset += line.len();
        if line.starts_with(ECHO_MARKER) {
            found = Some(offset);
        }
    }
    found
}

/// Text after the last line echoing a player action.
fn after_last_echo(transcript: &str) -> &str {
    echo_end(transcript).map_or(transcript, |at| transcript[at..].trim_start())
}

/// Drive `controller` until its request has finished.
pub fn wait<D, X>(
    controller: &mut StoryController<D, X>,
    envelopes: &Receiver<crate::client::StreamEnvelope>,
) where
    D: StoryDisplay,
    X: super::controller::Dispatch,
{
    while controller.is_busy() {
        let ticks = controller.ticks();
        select! {
            recv(envelopes) -> envelope => match envelope {
                Ok(envelope) => controller.handle_envelope(envelope),
                Err(_) => break,
            },
            recv(ticks) -> _ => controller.handle_tick(),
        }
    }
}

/// Run one task against stdout.
///
/// Returns `false` when the request failed; the message has been printed.
pub fn run(client: StoryClient, reveal: RevealConfig, streaming: bool, task: &PlainTask) -> bool {
    let (tx, rx) = unbounded();
    let dispatch = ActorDispatch::new(client, tx);
    let display = PlainDisplay::new(io::stdout());
    let mut controller =
        StoryController::new(RevealEngine::new(reveal), dispatch, display, streaming);

    match task {
        PlainTask::Show => {
            controller.load();
        }
        PlainTask::NewStory => {
            controller.new_story();
        }
        PlainTask::Turn(action) => {
            if controller.submit(action).is_none() {
                controller.display_mut().show_error("the action is empty");
                return false;
            }
        }
    }
    wait(&mut controller, &rx);
    controller.last_error().is_none()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Dispatch;
    use crate::client::{StoryRequest, StreamEnvelope, StreamMessage};
    use crate::reveal::SessionId;
    use crate::stream::StoryEvent;

    fn output(display: &PlainDisplay<Vec<u8>>) -> String {
        String::from_utf8_lossy(display.writer()).into_owned()
    }

    /// Requests are answered by hand in these tests.
    struct Silent;

    impl Dispatch for Silent {
        fn dispatch(&mut self, _request: StoryRequest, _session: SessionId) {}
    }

    type Controller = StoryController<PlainDisplay<Vec<u8>>, Silent>;

    fn controller() -> Controller {
        let engine = RevealEngine::manual(RevealConfig::default());
        StoryController::new(engine, Silent, PlainDisplay::new(Vec::new()), true)
    }

    /// Feed `chunks` then `story` as one streamed reply and reveal it fully.
    fn stream_reply(c: &mut Controller, session: SessionId, chunks: &[&str], story: &str) {
        let send = |c: &mut Controller, message| c.handle_envelope(StreamEnvelope { session, message });
        for chunk in chunks {
            send(c, StreamMessage::Event(StoryEvent::Chunk { text: (*chunk).into() }));
            c.handle_tick();
        }
        send(c, StreamMessage::Event(StoryEvent::Final { story: story.into() }));
        send(c, StreamMessage::Closed);
        while c.is_busy() {
            c.handle_tick();
        }
    }

    #[test]
    fn test_streamed_choices_printed_once() {
        let mut c = controller();
        let id = c.new_story();
        let story = "A cave.\n1. Enter\n2. Leave";
        stream_reply(&mut c, id, &[story], story);

        let out = output(c.display());
        assert_eq!(out, "A cave.\n\n  [1] Enter\n  [2] Leave\n");
        assert_eq!(out.matches("Enter").count(), 1);
    }

    #[test]
    fn test_streamed_turn_with_choices_in_chunks() {
        let mut c = controller();
        let id = c.submit("look").unwrap();
        stream_reply(
            &mut c,
            id,
            &["You see ", "a cave.\n\n1. En", "ter\n2. Leave\n3. Wait"],
            "Start.\n\n> You: look\n\nYou see a cave.\n\n1. Enter\n2. Leave\n3. Wait",
        );

        assert_eq!(
            output(c.display()),
            "> You: look\n\nYou see a cave.\n\n  [1] Enter\n  [2] Leave\n  [3] Wait\n"
        );
    }

    #[test]
    fn test_numbered_lines_inside_narrative_are_released() {
        let mut d = PlainDisplay::new(Vec::new());
        d.set_busy(true);
        d.show_frame("Runes:\n1. Fire\n");
        assert_eq!(output(&d), "Runes:\n");
        d.show_frame("Runes:\n1. Fire\nThe door glows.");
        assert_eq!(output(&d), "Runes:\n1. Fire\nThe door glows.");
    }

    #[test]
    fn test_final_text_completes_what_streamed() {
        let mut d = PlainDisplay::new(Vec::new());
        d.set_busy(true);
        d.show_frame("The tunnel narrows");
        d.show_page(&StoryPage {
            transcript: "The tunnel narrows to a crack.".into(),
            choices: Vec::new(),
        });
        assert_eq!(output(&d), "The tunnel narrows to a crack.\n");
    }

    #[test]
    fn test_streamed_turn_prints_deltas_then_choices() {
        let mut d = PlainDisplay::new(Vec::new());
        d.set_busy(true);
        d.show_frame("> You: look\n\n");
        d.show_frame("> You: look\n\nA c");
        d.show_frame("> You: look\n\nA cave.");
        d.show_page(&StoryPage {
            transcript: "Once.\n\n> You: look\n\nA cave.".into(),
            choices: vec!["Enter".into(), "Leave".into()],
        });
        d.set_busy(false);

        assert_eq!(
            output(&d),
            "> You: look\n\nA cave.\n\n  [1] Enter\n  [2] Leave\n"
        );
    }

    #[test]
    fn test_blocking_turn_prints_reply_once() {
        let mut d = PlainDisplay::new(Vec::new());
        d.set_busy(true);
        d.show_frame("> You: wait\n\n");
        d.show_page(&StoryPage {
            transcript: "Start.\n\n> You: wait\n\nTime passes.".into(),
            choices: Vec::new(),
        });
        assert_eq!(output(&d), "> You: wait\n\nTime passes.\n");
    }

    #[test]
    fn test_loaded_story_prints_transcript() {
        let mut d = PlainDisplay::new(Vec::new());
        d.set_busy(true);
        d.show_page(&StoryPage {
            transcript: "Stored tale.".into(),
            choices: vec!["Go".into()],
        });
        assert_eq!(output(&d), "Stored tale.\n\n  [1] Go\n");
    }

    #[test]
    fn test_error_finishes_partial_line() {
        let mut d = PlainDisplay::new(Vec::new());
        d.set_busy(true);
        d.show_frame("Half");
        d.show_error("Request failed (500)");
        assert_eq!(output(&d), "Half\nerror: Request failed (500)\n");
    }
}
