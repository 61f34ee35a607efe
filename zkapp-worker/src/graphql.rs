// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Account lookups against the GraphQL endpoint of a network node.

use std::sync::LazyLock;

use serde::Deserialize;
use serde_json::json;
use zkapp_base::{crypto::PublicKey, network::NetworkContext};

use crate::{data_types::Account, sdk::SdkError};

const ACCOUNT_QUERY: &str = "query($publicKey: PublicKey!) { \
    account(publicKey: $publicKey) { publicKey nonce balance { total } } \
}";

static CLIENT: LazyLock<reqwest::Client> = LazyLock::new(reqwest::Client::new);

#[derive(Deserialize)]
struct Response {
    data: Option<Data>,
    #[serde(default)]
    errors: Vec<ResponseError>,
}

#[derive(Deserialize)]
struct ResponseError {
    message: String,
}

#[derive(Deserialize)]
struct Data {
    account: Option<RawAccount>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAccount {
    public_key: PublicKey,
    nonce: String,
    balance: Balance,
}

#[derive(Deserialize)]
struct Balance {
    total: String,
}

/// Looks up an account on `network`, returning `None` if it does not exist.
pub async fn fetch_account(
    network: &NetworkContext,
    address: &PublicKey,
) -> Result<Option<Account>, SdkError> {
    fetch_account_with(&CLIENT, network, address).await
}

/// Same as [`fetch_account`], with an explicit HTTP client.
#[tracing::instrument(skip(client, network), fields(endpoint = %network.endpoint()))]
pub async fn fetch_account_with(
    client: &reqwest::Client,
    network: &NetworkContext,
    address: &PublicKey,
) -> Result<Option<Account>, SdkError> {
    let response = client
        .post(network.endpoint().clone())
        .json(&json!({
            "query": ACCOUNT_QUERY,
            "variables": { "publicKey": address },
        }))
        .send()
        .await?;
    let status = response.status();
    if !status.is_success() {
        let text = response
            .text()
            .await
            .unwrap_or_else(|error| format!("Could not get response text: {error}"));
        return Err(SdkError::Transport(format!(
            "account query failed with status {status}: {text}"
        )));
    }
    let response: Response = response
        .json()
        .await
        .map_err(|error| SdkError::Transport(format!("invalid account query response: {error}")))?;
    match response.data {
        Some(Data {
            account: Some(account),
        }) => Ok(Some(Account {
            address: account.public_key,
            balance: account.balance.total,
            nonce: account.nonce,
        })),
        Some(Data { account: None }) => {
            tracing::debug!("account not found");
            Ok(None)
        }
        None if response.errors.is_empty() => Err(SdkError::Transport(
            "account query returned neither data nor errors".to_owned(),
        )),
        None => {
            let messages = response
                .errors
                .into_iter()
                .map(|error| error.message)
                .collect::<Vec<_>>();
            Err(SdkError::Transport(messages.join("; ")))
        }
    }
}

#[cfg(test)]
#[path = "unit_tests/graphql_tests.rs"]
mod tests;
