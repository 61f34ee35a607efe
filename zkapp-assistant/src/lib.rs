// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Definitions shared by the assistant relay and its clients.
//!
//! The relay answers `GET /api/mina?prompt=...` with an event stream of [`StreamEvent`]s, or
//! with an [`ErrorEnvelope`] when the request cannot be served.

pub mod sse;

use serde::{Deserialize, Serialize};

/// The path of the generation endpoint.
pub const GENERATE_PATH: &str = "/api/mina";

/// The error message returned when the request has no prompt.
pub const MISSING_PROMPT: &str = "Missing prompt parameter";

/// The event name of the frame ending a stream after an upstream failure.
pub const ERROR_EVENT: &str = "error";

/// The query parameters of the generation endpoint.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateParams {
    pub prompt: Option<String>,
}

/// A fragment of the generated answer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamEvent {
    pub content: String,
}

/// The body of every error response, and of the terminal error frame.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: String,
}

impl ErrorEnvelope {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn error_envelope_shape() {
        assert_eq!(
            serde_json::to_value(ErrorEnvelope::new(MISSING_PROMPT)).unwrap(),
            json!({ "success": false, "error": "Missing prompt parameter" })
        );
    }
}
