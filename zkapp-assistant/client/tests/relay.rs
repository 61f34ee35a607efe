// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Runs the client against a relay served over TCP.

use std::{net::SocketAddr, sync::Arc};

use assert_matches::assert_matches;
use async_trait::async_trait;
use axum::http::HeaderValue;
use futures::{stream, StreamExt as _};
use tokio_util::sync::CancellationToken;
use url::Url;
use zkapp_assistant_client::{AssistantClient, Conversation, Error, Role};
use zkapp_assistant_server::{
    AssistantConfig, AssistantService, ChatCompletion, ChatMessage, CompletionError,
    FragmentStream,
};

/// Answers every request with the same fragments.
struct Echo {
    fragments: Vec<Result<String, CompletionError>>,
    open_error: Option<CompletionError>,
}

#[async_trait]
impl ChatCompletion for Echo {
    async fn stream(&self, _messages: Vec<ChatMessage>) -> Result<FragmentStream, CompletionError> {
        if let Some(error) = &self.open_error {
            return Err(error.clone());
        }
        Ok(stream::iter(self.fragments.clone()).boxed())
    }
}

async fn serve(completion: Echo) -> Url {
    let config = AssistantConfig::new(0, vec![HeaderValue::from_static("http://localhost:3000")]);
    let router = AssistantService::new(config, Arc::new(completion)).router();
    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await });
    Url::parse(&format!("http://{address}/")).unwrap()
}

fn fragments(fragments: &[&str]) -> Echo {
    Echo {
        fragments: fragments
            .iter()
            .map(|fragment| Ok(fragment.to_string()))
            .collect(),
        open_error: None,
    }
}

#[test_log::test(tokio::test)]
async fn answer_is_streamed_into_the_conversation() {
    let base_url = serve(fragments(&["import { SmartContract }", " from 'o1js';"])).await;
    let client = AssistantClient::new(base_url);
    let mut conversation = Conversation::new();

    let summary = client
        .generate("a counter", &mut conversation, &CancellationToken::new())
        .await
        .unwrap();

    assert!(summary.is_complete());
    assert_eq!(summary.fragments, 2);
    let messages = conversation.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[0].content, "a counter");
    assert_eq!(messages[1].role, Role::Assistant);
    assert_eq!(messages[1].content, "import { SmartContract } from 'o1js';");
}

#[test_log::test(tokio::test)]
async fn blank_prompt_is_rejected() {
    let client = AssistantClient::new(serve(fragments(&["unused"])).await);
    let mut conversation = Conversation::new();

    let result = client
        .generate("  ", &mut conversation, &CancellationToken::new())
        .await;

    assert_matches!(
        result,
        Err(Error::Rejected { status: 400, message }) if message == "Missing prompt parameter"
    );
    assert_eq!(conversation.reply().unwrap().content, "");
}

#[test_log::test(tokio::test)]
async fn unavailable_model_is_rejected() {
    let client = AssistantClient::new(
        serve(Echo {
            fragments: Vec::new(),
            open_error: Some(CompletionError::Transport("no route".to_owned())),
        })
        .await,
    );
    let mut conversation = Conversation::new();

    let result = client
        .generate("a counter", &mut conversation, &CancellationToken::new())
        .await;

    assert_matches!(
        result,
        Err(Error::Rejected { status: 500, message })
            if message == "Failed to reach the completion service: no route"
    );
}

#[test_log::test(tokio::test)]
async fn interrupted_answer_is_reported() {
    let client = AssistantClient::new(
        serve(Echo {
            fragments: vec![
                Ok("class Square".to_owned()),
                Err(CompletionError::InvalidResponse("truncated chunk".to_owned())),
            ],
            open_error: None,
        })
        .await,
    );
    let mut conversation = Conversation::new();

    let summary = client
        .generate("a square", &mut conversation, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.fragments, 1);
    assert_eq!(
        summary.error.as_deref(),
        Some("Invalid response from the completion service: truncated chunk")
    );
    assert_eq!(conversation.reply().unwrap().content, "class Square");
}
