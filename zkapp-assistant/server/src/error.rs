// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use zkapp_assistant::ErrorEnvelope;

use crate::completion::CompletionError;

/// Failures answered before the event stream starts.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Missing prompt parameter")]
    MissingPrompt,
    #[error("{0}")]
    InvalidQuery(String),
    #[error(transparent)]
    Upstream(#[from] CompletionError),
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::MissingPrompt | RelayError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            RelayError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(ErrorEnvelope::new(self.to_string()))).into_response()
    }
}
