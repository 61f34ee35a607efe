// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use tokio::sync::oneshot;

/// Extension trait to help with sending responses with a [`oneshot::Sender`].
pub(crate) trait RespondExt {
    type Response;

    /// Responds to a request using the `callback` channel endpoint.
    fn respond(self, response: Self::Response);
}

impl<Response> RespondExt for oneshot::Sender<Response> {
    type Response = Response;

    fn respond(self, response: Self::Response) {
        if self.send(response).is_err() {
            tracing::debug!("Requester went away before its response was sent");
        }
    }
}
