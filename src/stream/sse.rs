//! Incremental `text/event-stream` parsing.
//!
//! Network chunks split lines arbitrarily, so [`SseLineParser`] buffers
//! partial lines and emits a [`SseFrame`] each time a blank line closes a
//! message. [`parse_sse_stream`] applies it to a whole response body.

use std::collections::VecDeque;

use futures_util::stream::{self, BoxStream};
use futures_util::StreamExt;

use super::error::StreamError;
use super::source::ByteStream;

/// One dispatched server-sent message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SseFrame {
    /// Value of the `event:` field, if any.
    pub event: Option<String>,
    /// `data:` lines joined with `\n`.
    pub data: String,
    /// Value of the `id:` field, if any.
    pub id: Option<String>,
}

/// Stateful line parser fed with raw response bytes.
#[derive(Debug, Default)]
pub struct SseLineParser {
    line: Vec<u8>,
    skip_lf: bool,
    event: Option<String>,
    data: Vec<String>,
    id: Option<String>,
}

impl SseLineParser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes a chunk and returns every frame it completes.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        let mut frames = Vec::new();
        for &byte in chunk {
            if self.skip_lf {
                self.skip_lf = false;
                if byte == b'\n' {
                    continue;
                }
            }
            match byte {
                b'\r' => {
                    self.skip_lf = true;
                    self.end_line(&mut frames);
                }
                b'\n' => self.end_line(&mut frames),
                other => self.line.push(other),
            }
        }
        frames
    }

    fn end_line(&mut self, frames: &mut Vec<SseFrame>) {
        let line = String::from_utf8_lossy(&self.line).into_owned();
        self.line.clear();

        if line.is_empty() {
            if let Some(frame) = self.take_frame() {
                frames.push(frame);
            }
            return;
        }
        if line.starts_with(':') {
            return;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line.as_str(), ""),
        };
        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            "id" => self.id = Some(value.to_string()),
            // `retry` only matters to auto-reconnecting clients.
            _ => {}
        }
    }

    fn take_frame(&mut self) -> Option<SseFrame> {
        let event = self.event.take();
        if self.data.is_empty() {
            return None;
        }
        let data = std::mem::take(&mut self.data).join("\n");
        Some(SseFrame {
            event,
            data,
            id: self.id.clone(),
        })
    }
}

/// Parses a response body into frames, in arrival order.
///
/// A transport error is yielded once and ends the stream. Bytes after the
/// last blank line are discarded at end of stream.
pub fn parse_sse_stream(body: ByteStream) -> BoxStream<'static, Result<SseFrame, StreamError>> {
    let state = Some((body, SseLineParser::new(), VecDeque::new()));
    stream::unfold(state, |state| async move {
        let (mut body, mut parser, mut pending) = state?;
        loop {
            if let Some(frame) = pending.pop_front() {
                return Some((Ok(frame), Some((body, parser, pending))));
            }
            match body.next().await {
                Some(Ok(bytes)) => pending.extend(parser.feed(&bytes)),
                Some(Err(error)) => return Some((Err(error), None)),
                None => return None,
            }
        }
    })
    .boxed()
}
