// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The chat-completion capability the relay forwards to.

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

/// Errors of a [`ChatCompletion`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CompletionError {
    #[error("Failed to reach the completion service: {0}")]
    Transport(String),
    #[error("The completion service answered with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Invalid response from the completion service: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for CompletionError {
    fn from(error: reqwest::Error) -> Self {
        CompletionError::Transport(error.to_string())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// A message of the conversation sent to the model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// The fragments of an answer, in the order the model produced them.
pub type FragmentStream = BoxStream<'static, Result<String, CompletionError>>;

/// A model answering a conversation incrementally.
#[async_trait]
pub trait ChatCompletion: Send + Sync + 'static {
    /// Starts generating the answer to `messages`.
    ///
    /// Failing to start is reported by the returned `Result`; failures after the first
    /// fragment are items of the stream.
    async fn stream(&self, messages: Vec<ChatMessage>) -> Result<FragmentStream, CompletionError>;
}
