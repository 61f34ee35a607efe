// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The context sent to the model ahead of every request.

use crate::completion::ChatMessage;

const INSTRUCTIONS: &str = "\
You write smart contracts for the Mina Protocol with the o1js library. \
The contracts below are examples of such code. Use them, together with your \
knowledge of Mina and o1js, to fulfil the user's request.

If the user asks for anything other than Mina contract code, decline.
If the request is unclear, ask for the specific intent.
Once you have enough information, output the code directly without describing \
your understanding or the logic of the code.";

const EXAMPLES: [&str; 3] = [
    include_str!("../data/message.ts"),
    include_str!("../data/add.ts"),
    include_str!("../data/square.ts"),
];

/// Returns the conversation for a user request: the instructions and examples as a system
/// message, then the request itself.
pub fn prime(request: &str) -> Vec<ChatMessage> {
    let mut system = String::from(INSTRUCTIONS);
    for example in EXAMPLES {
        system.push_str("\n\n```typescript\n");
        system.push_str(example.trim_end());
        system.push_str("\n```");
    }
    vec![ChatMessage::system(system), ChatMessage::user(request)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::ChatRole;

    #[test]
    fn request_follows_the_system_context() {
        let messages = prime("A contract storing the sum of its inputs");

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, ChatRole::System);
        assert!(messages[0].content.starts_with(INSTRUCTIONS));
        for class in ["class Message", "class AddV3", "class Square"] {
            assert!(messages[0].content.contains(class));
        }
        assert_eq!(
            messages[1],
            ChatMessage::user("A contract storing the sum of its inputs")
        );
    }
}
