// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Folding an event stream into the trailing reply of a [`Conversation`].

use std::pin::pin;

use bytes::Bytes;
use futures::{Stream, StreamExt as _};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use zkapp_assistant::{sse, ErrorEnvelope, StreamEvent, ERROR_EVENT};

use crate::{Conversation, Error};

/// What happened while consuming a stream.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StreamSummary {
    /// The fragments appended to the reply.
    pub fragments: usize,
    /// The frames that could not be decoded.
    pub skipped: usize,
    /// The error reported by the relay, if the stream ended with one.
    pub error: Option<String>,
    /// Whether consumption stopped because of the cancellation token.
    pub cancelled: bool,
}

impl StreamSummary {
    /// Whether the reply holds the whole answer.
    pub fn is_complete(&self) -> bool {
        self.error.is_none() && !self.cancelled
    }
}

/// Appends the fragments of `bytes` to the reply ending `conversation`, in arrival order.
///
/// Frames that are not a valid event are logged and skipped. An error frame ends the
/// consumption and is reported in the summary; the reply keeps what was received before it.
pub async fn consume<S, E>(
    bytes: S,
    conversation: &mut Conversation,
    cancellation: &CancellationToken,
) -> Result<StreamSummary, Error>
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Into<Error> + Send + 'static,
{
    if conversation.reply().is_none() {
        return Err(Error::NoPendingReply);
    }
    let mut frames = pin!(sse::frames(bytes));
    let mut summary = StreamSummary::default();
    loop {
        let frame = tokio::select! {
            biased;
            () = cancellation.cancelled() => {
                debug!("stopped reading the stream");
                summary.cancelled = true;
                break;
            }
            frame = frames.next() => frame,
        };
        let Some(frame) = frame else {
            break;
        };
        let frame = frame.map_err(Into::into)?;

        if frame.is_event(ERROR_EVENT) {
            let error = match serde_json::from_str::<ErrorEnvelope>(&frame.data) {
                Ok(envelope) => envelope.error,
                Err(_) => frame.data,
            };
            warn!("the assistant stopped with an error: {error}");
            summary.error = Some(error);
            break;
        }
        match serde_json::from_str::<StreamEvent>(&frame.data) {
            Ok(event) => {
                conversation.append_to_reply(&event.content)?;
                summary.fragments += 1;
            }
            Err(error) => {
                warn!(data = %frame.data, "skipping a malformed frame: {error}");
                summary.skipped += 1;
            }
        }
    }
    Ok(summary)
}
