// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! A [`ChatCompletion`] backed by an OpenAI-compatible HTTP API.

use std::fmt;

use async_trait::async_trait;
use futures::{future, StreamExt as _, TryStreamExt as _};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};
use url::Url;
use zkapp_assistant::sse::{self, SseFrame};

use crate::completion::{ChatCompletion, ChatMessage, CompletionError, FragmentStream};

/// The data of the frame ending a streamed completion.
const DONE: &str = "[DONE]";

#[derive(Deserialize)]
struct Chunk {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    #[serde(default)]
    delta: Delta,
}

#[derive(Default, Deserialize)]
struct Delta {
    content: Option<String>,
}

/// A client of the `chat/completions` endpoint, in streaming mode.
#[derive(Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: Url,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(base_url: Url, api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key,
            model,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.base_url.as_str().trim_end_matches('/')
        )
    }
}

impl fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("base_url", &self.base_url.as_str())
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

/// Extracts the text of a streamed chunk, if there is any.
fn fragment(frame: &SseFrame) -> Result<Option<String>, CompletionError> {
    if frame.data.is_empty() {
        return Ok(None);
    }
    let chunk: Chunk = serde_json::from_str(&frame.data)
        .map_err(|error| CompletionError::InvalidResponse(error.to_string()))?;
    Ok(chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
        .filter(|content| !content.is_empty()))
}

#[async_trait]
impl ChatCompletion for OpenAiClient {
    #[instrument(skip_all, fields(model = %self.model))]
    async fn stream(&self, messages: Vec<ChatMessage>) -> Result<FragmentStream, CompletionError> {
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": self.model,
                "messages": messages,
                "stream": true,
            }))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|error| format!("Could not get response text: {error}"));
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body,
            });
        }
        debug!("completion stream opened");

        let fragments = sse::frames(response.bytes_stream())
            .map_err(CompletionError::from)
            .try_take_while(|frame| future::ready(Ok(frame.data != DONE)))
            .try_filter_map(|frame| future::ready(fragment(&frame)))
            .boxed();
        Ok(fragments)
    }
}

#[cfg(test)]
#[path = "unit_tests/openai_tests.rs"]
mod tests;
