// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

use assert_matches::assert_matches;
use bytes::Bytes;
use futures::{stream, StreamExt as _};

use super::*;

fn chunks(chunks: &[&'static str]) -> impl futures::Stream<Item = Result<Bytes, Error>> + Send {
    stream::iter(
        chunks
            .iter()
            .map(|chunk| Ok(Bytes::from_static(chunk.as_bytes())))
            .collect::<Vec<_>>(),
    )
}

fn answered_conversation() -> Conversation {
    let mut conversation = Conversation::new();
    conversation.begin_exchange("a contract adding numbers");
    conversation
        .append_to_reply("class AddV3 extends SmartContract {}")
        .unwrap();
    conversation
}

#[test_log::test(tokio::test)]
async fn fragments_split_across_chunks_are_joined_in_order() {
    let mut conversation = answered_conversation();
    let earlier = conversation.messages().to_vec();
    conversation.begin_exchange("a greeting");

    let bytes = chunks(&[
        "data: {\"content\":\"Hel",
        "lo\"}\r",
        "\n\r\ndata: {\"content\":\", world\"}\n",
        "\n",
    ]);
    let summary = consume(bytes, &mut conversation, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(
        summary,
        StreamSummary {
            fragments: 2,
            ..StreamSummary::default()
        }
    );
    assert!(summary.is_complete());
    assert_eq!(conversation.messages()[..2], earlier[..]);
    assert_eq!(conversation.messages()[2].content, "a greeting");
    assert_eq!(
        conversation.reply(),
        Some(&Message {
            role: Role::Assistant,
            content: "Hello, world".to_owned(),
        })
    );
}

#[test_log::test(tokio::test)]
async fn malformed_frames_are_skipped() {
    let mut conversation = Conversation::new();
    conversation.begin_exchange("a counter");

    let bytes = chunks(&[
        "data: {\"content\":\"one\"}\n\n",
        "data: {\"text\":\"wrong shape\"}\n\n",
        "data: not json\n\n",
        ": keep-alive comment\n\n",
        "data: {\"content\":\" two\"}\n\n",
    ]);
    let summary = consume(bytes, &mut conversation, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.fragments, 2);
    assert_eq!(summary.skipped, 2);
    assert_eq!(conversation.reply().unwrap().content, "one two");
}

#[test_log::test(tokio::test)]
async fn error_event_ends_the_stream() {
    let mut conversation = Conversation::new();
    conversation.begin_exchange("a counter");

    let bytes = chunks(&[
        "data: {\"content\":\"partial\"}\n\n",
        "event: error\ndata: {\"success\":false,\"error\":\"upstream went away\"}\n\n",
        "data: {\"content\":\"ignored\"}\n\n",
    ]);
    let summary = consume(bytes, &mut conversation, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.fragments, 1);
    assert_eq!(summary.error.as_deref(), Some("upstream went away"));
    assert!(!summary.is_complete());
    assert_eq!(conversation.reply().unwrap().content, "partial");
}

#[test_log::test(tokio::test)]
async fn transport_failure_is_returned() {
    let mut conversation = Conversation::new();
    conversation.begin_exchange("a counter");

    let bytes = chunks(&["data: {\"content\":\"partial\"}\n\n"])
        .chain(stream::iter([Err(Error::Transport("reset".to_owned()))]));
    let result = consume(bytes, &mut conversation, &CancellationToken::new()).await;

    assert_matches!(result, Err(Error::Transport(message)) if message == "reset");
    assert_eq!(conversation.reply().unwrap().content, "partial");
}

#[test_log::test(tokio::test)]
async fn conversation_without_reply_is_refused() {
    let mut conversation = Conversation::new();
    let result = consume(chunks(&[]), &mut conversation, &CancellationToken::new()).await;
    assert_matches!(result, Err(Error::NoPendingReply));
}

#[test_log::test(tokio::test(start_paused = true))]
async fn cancellation_stops_a_stalled_stream() {
    let mut conversation = Conversation::new();
    conversation.begin_exchange("a counter");
    let cancellation = CancellationToken::new();
    tokio::spawn({
        let cancellation = cancellation.clone();
        async move {
            tokio::time::sleep(Duration::from_secs(30)).await;
            cancellation.cancel();
        }
    });

    let bytes = chunks(&["data: {\"content\":\"first\"}\n\n"]).chain(stream::pending());
    let summary = consume(bytes, &mut conversation, &cancellation)
        .await
        .unwrap();

    assert!(summary.cancelled);
    assert_eq!(summary.fragments, 1);
    assert_eq!(conversation.reply().unwrap().content, "first");
}

#[test_log::test(tokio::test)]
async fn cancelled_token_reads_nothing() {
    let mut conversation = Conversation::new();
    conversation.begin_exchange("a counter");
    let cancellation = CancellationToken::new();
    cancellation.cancel();

    let bytes = chunks(&["data: {\"content\":\"unread\"}\n\n"]);
    let summary = consume(bytes, &mut conversation, &cancellation)
        .await
        .unwrap();

    assert!(summary.cancelled);
    assert_eq!(summary.fragments, 0);
    assert_eq!(conversation.reply().unwrap().content, "");
}

#[test]
fn generate_url_keeps_the_base_path() {
    let client = AssistantClient::new(Url::parse("http://localhost:5099/relay/").unwrap());
    assert_eq!(
        client.generate_url("a counter & more").unwrap().as_str(),
        "http://localhost:5099/relay/api/mina?prompt=a+counter+%26+more"
    );
}
