// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Incremental decoding of `text/event-stream` bodies.
//!
//! Only the `event` and `data` fields are kept. Comments and the `id` and `retry` fields
//! are ignored.

use std::{collections::VecDeque, pin::Pin};

use bytes::Bytes;
use futures::{stream, Stream, StreamExt as _};

/// A dispatched event.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SseFrame {
    /// The `event` field, if any.
    pub event: Option<String>,
    /// The `data` lines, joined with `\n`.
    pub data: String,
}

impl SseFrame {
    pub fn is_event(&self, name: &str) -> bool {
        self.event.as_deref() == Some(name)
    }
}

/// Splits a byte stream into frames. Chunks may end anywhere, including inside a UTF-8
/// sequence or between the `\r` and `\n` of a line ending.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: Vec<u8>,
    /// The length of `buffer` already searched for a line ending.
    scanned: usize,
    event: Option<String>,
    data: Option<String>,
}

impl FrameDecoder {
    /// Feeds a chunk, returning the frames it completes.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        let mut buffer = std::mem::take(&mut self.buffer);
        buffer.extend_from_slice(chunk);
        let mut frames = Vec::new();
        let mut line_start = 0;
        let mut scan_from = self.scanned;
        while let Some(offset) = buffer[scan_from..].iter().position(|byte| *byte == b'\n') {
            let line_end = scan_from + offset;
            let line = &buffer[line_start..line_end];
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            frames.extend(self.process_line(&String::from_utf8_lossy(line)));
            line_start = line_end + 1;
            scan_from = line_start;
        }
        buffer.drain(..line_start);
        self.scanned = buffer.len();
        self.buffer = buffer;
        frames
    }

    /// Ends the stream, returning the last frame if it was not terminated by a blank line.
    pub fn finish(&mut self) -> Option<SseFrame> {
        if !self.buffer.is_empty() {
            let line = std::mem::take(&mut self.buffer);
            self.scanned = 0;
            let line = String::from_utf8_lossy(&line);
            if let Some(frame) = self.process_line(line.trim_end_matches('\r')) {
                return Some(frame);
            }
        }
        self.dispatch()
    }

    fn process_line(&mut self, line: &str) -> Option<SseFrame> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => self.event = Some(value.to_owned()),
            "data" => match &mut self.data {
                Some(data) => {
                    data.push('\n');
                    data.push_str(value);
                }
                None => self.data = Some(value.to_owned()),
            },
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseFrame> {
        let event = self.event.take();
        let data = self.data.take();
        if event.is_none() && data.is_none() {
            return None;
        }
        Some(SseFrame {
            event,
            data: data.unwrap_or_default(),
        })
    }
}

type ByteStream<E> = Pin<Box<dyn Stream<Item = Result<Bytes, E>> + Send>>;

struct FrameStreamState<E> {
    bytes: ByteStream<E>,
    decoder: FrameDecoder,
    pending: VecDeque<SseFrame>,
    done: bool,
}

/// Decodes a byte stream into a stream of frames.
///
/// An error of the byte stream is passed through and ends the frame stream.
pub fn frames<S, E>(bytes: S) -> impl Stream<Item = Result<SseFrame, E>> + Send
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Send + 'static,
{
    let state = FrameStreamState {
        bytes: Box::pin(bytes) as ByteStream<E>,
        decoder: FrameDecoder::default(),
        pending: VecDeque::new(),
        done: false,
    };
    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(frame) = state.pending.pop_front() {
                return Some((Ok(frame), state));
            }
            if state.done {
                return None;
            }
            match state.bytes.next().await {
                Some(Ok(chunk)) => {
                    let frames = state.decoder.push(&chunk);
                    state.pending.extend(frames);
                }
                Some(Err(error)) => {
                    state.done = true;
                    return Some((Err(error), state));
                }
                None => {
                    state.done = true;
                    let last = state.decoder.finish();
                    state.pending.extend(last);
                }
            }
        }
    })
}

#[cfg(test)]
#[path = "unit_tests/sse_tests.rs"]
mod tests;
