// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The remote endpoint that chain operations are sent to.

use serde::{Deserialize, Serialize};
use url::Url;

/// The GraphQL endpoint of the public devnet.
pub const DEVNET_GRAPHQL_ENDPOINT: &str = "https://api.minascan.io/node/devnet/v1/graphql";

/// The currently active network.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkContext {
    endpoint: Url,
}

impl NetworkContext {
    pub fn new(endpoint: Url) -> Self {
        Self { endpoint }
    }

    /// The public devnet.
    pub fn devnet() -> Self {
        Self {
            endpoint: DEVNET_GRAPHQL_ENDPOINT
                .parse()
                .expect("the devnet endpoint is a valid URL"),
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl From<Url> for NetworkContext {
    fn from(endpoint: Url) -> Self {
        Self::new(endpoint)
    }
}
