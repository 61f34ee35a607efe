// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

use crate::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

/// The exchanged messages, oldest first.
///
/// Messages are only ever appended. The trailing message, when it is an assistant reply, is
/// the only one whose content may still grow.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Appends `prompt` and the empty reply that will receive the answer.
    pub fn begin_exchange(&mut self, prompt: impl Into<String>) {
        self.messages.push(Message {
            role: Role::User,
            content: prompt.into(),
        });
        self.messages.push(Message {
            role: Role::Assistant,
            content: String::new(),
        });
    }

    /// Returns the reply being received, if the conversation ends with one.
    pub fn reply(&self) -> Option<&Message> {
        self.messages
            .last()
            .filter(|message| message.role == Role::Assistant)
    }

    pub fn append_to_reply(&mut self, fragment: &str) -> Result<(), Error> {
        match self.messages.last_mut() {
            Some(message) if message.role == Role::Assistant => {
                message.content.push_str(fragment);
                Ok(())
            }
            _ => Err(Error::NoPendingReply),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn exchange_adds_prompt_and_reply_together() {
        let mut conversation = Conversation::new();
        assert_matches!(conversation.append_to_reply("lost"), Err(Error::NoPendingReply));

        conversation.begin_exchange("a counter");
        conversation.append_to_reply("class ").unwrap();
        conversation.append_to_reply("Counter").unwrap();

        assert_eq!(
            conversation.messages(),
            [
                Message {
                    role: Role::User,
                    content: "a counter".to_owned(),
                },
                Message {
                    role: Role::Assistant,
                    content: "class Counter".to_owned(),
                },
            ]
        );
    }
}
