//! NDJSON decoding for the story stream.
//!
//! Network reads split the body at arbitrary byte offsets, including in the
//! middle of a multi-byte UTF-8 sequence. The decoder buffers raw bytes and
//! only decodes complete lines, so a split character is reassembled before
//! any text is produced.

use super::event::StoryEvent;
use std::collections::VecDeque;
use std::io::{self, Read};

/// Incremental line decoder.
#[derive(Debug, Default)]
pub struct NdjsonDecoder {
    buf: Vec<u8>,
    skipped: usize,
}

impl NdjsonDecoder {
    /// Create an empty decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed bytes, returning every event completed by them.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<StoryEvent> {
        let mut events = Vec::new();
        self.push_into(bytes, &mut events);
        events
    }

    /// Feed bytes, appending completed events to `out`.
    pub fn push_into(&mut self, bytes: &[u8], out: &mut impl Extend<StoryEvent>) {
        self.buf.extend_from_slice(bytes);

        let mut start = 0;
        while let Some(offset) = self.buf[start..].iter().position(|&b| b == b'\n') {
            let end = start + offset;
            if let Some(event) = self.parse_line(start, end) {
                out.extend(std::iter::once(event));
            }
            start = end + 1;
        }
        self.buf.drain(..start);
    }

    /// Decode a final line that had no trailing newline.
    pub fn finish(&mut self) -> Option<StoryEvent> {
        let end = self.buf.len();
        let event = self.parse_line(0, end);
        self.buf.clear();
        event
    }

    /// Number of non-empty lines discarded so far.
    pub const fn skipped(&self) -> usize {
        self.skipped
    }

    fn parse_line(&mut self, start: usize, end: usize) -> Option<StoryEvent> {
        let line = self.buf[start..end].trim_ascii();
        if line.is_empty() {
            return None;
        }
        match serde_json::from_slice::<StoryEvent>(line) {
            Ok(event) => Some(event),
            Err(err) => {
                self.skipped += 1;
                tracing::debug!(error = %err, len = line.len(), "skipping malformed stream line");
                None
            }
        }
    }
}

/// Iterator of story events read from a byte source.
///
/// Works over any `Read`, including a blocking HTTP response body.
pub struct EventReader<R> {
    inner: R,
    decoder: NdjsonDecoder,
    ready: VecDeque<StoryEvent>,
    read_buf: Box<[u8]>,
    eof: bool,
}

impl<R: Read> EventReader<R> {
    const READ_SIZE: usize = 8 * 1024;

    /// Wrap a reader.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            decoder: NdjsonDecoder::new(),
            ready: VecDeque::new(),
            read_buf: vec![0; Self::READ_SIZE].into_boxed_slice(),
            eof: false,
        }
    }

    /// Number of malformed lines skipped so far.
    pub const fn skipped(&self) -> usize {
        self.decoder.skipped()
    }

    fn fill(&mut self) -> io::Result<()> {
        while self.ready.is_empty() && !self.eof {
            let n = match self.inner.read(&mut self.read_buf) {
                Ok(n) => n,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            };
            if n == 0 {
                self.eof = true;
                self.ready.extend(self.decoder.finish());
            } else {
                self.decoder.push_into(&self.read_buf[..n], &mut self.ready);
            }
        }
        Ok(())
    }
}

impl<R: Read> Iterator for EventReader<R> {
    type Item = io::Result<StoryEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Err(err) = self.fill() {
            self.eof = true;
            return Some(Err(err));
        }
        self.ready.pop_front().map(Ok)
    }
}

impl<R> std::fmt::Debug for EventReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventReader")
            .field("ready", &self.ready.len())
            .field("eof", &self.eof)
            .finish_non_exhaustive()
    }
}
