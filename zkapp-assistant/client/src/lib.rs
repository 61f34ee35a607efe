// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The client side of the assistant relay.

mod consumer;
mod conversation;

use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};
use url::Url;
use zkapp_assistant::{ErrorEnvelope, GENERATE_PATH};

pub use crate::{
    consumer::{consume, StreamSummary},
    conversation::{Conversation, Message, Role},
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to reach the assistant: {0}")]
    Transport(String),
    #[error("The assistant rejected the request with status {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("The conversation does not end with a reply to append to")]
    NoPendingReply,
    #[error("Invalid assistant URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        Error::Transport(error.to_string())
    }
}

/// A relay that can be asked for contracts.
#[derive(Clone, Debug)]
pub struct AssistantClient {
    client: reqwest::Client,
    base_url: Url,
}

impl AssistantClient {
    pub fn new(base_url: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn generate_url(&self, prompt: &str) -> Result<Url, Error> {
        let mut url = self
            .base_url
            .join(GENERATE_PATH.trim_start_matches('/'))?;
        url.query_pairs_mut().append_pair("prompt", prompt);
        Ok(url)
    }

    /// Asks for an answer to `prompt`, streaming it into a new reply of `conversation`.
    ///
    /// The prompt and its reply are added before the request is sent, so a failed request
    /// leaves an empty reply behind.
    #[instrument(skip_all, fields(base_url = %self.base_url))]
    pub async fn generate(
        &self,
        prompt: &str,
        conversation: &mut Conversation,
        cancellation: &CancellationToken,
    ) -> Result<StreamSummary, Error> {
        conversation.begin_exchange(prompt);
        let url = self.generate_url(prompt)?;
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|envelope| envelope.error)
                .unwrap_or(body);
            return Err(Error::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let summary = consume(response.bytes_stream(), conversation, cancellation).await?;
        info!(
            fragments = summary.fragments,
            skipped = summary.skipped,
            complete = summary.is_complete(),
            "received an answer"
        );
        Ok(summary)
    }
}

#[cfg(test)]
#[path = "unit_tests/consumer_tests.rs"]
mod tests;
