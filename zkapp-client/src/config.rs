// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

use url::Url;
use zkapp_base::{
    crypto::PublicKey,
    links::{DEFAULT_EXPLORER_BASE, DEFAULT_FAUCET_BASE},
    network::{NetworkContext, DEVNET_GRAPHQL_ENDPOINT},
};

/// The address of the counter zkApp deployed on devnet.
pub const DEFAULT_ZKAPP_ADDRESS: &str = "B62qrDdA1K8w3xNwk7snEEetAKKtZB5ywaesg89dQopVCqdX79n3Axy";

/// Settings of a [`ZkappApp`](crate::ZkappApp).
#[derive(Debug, Clone, clap::Args, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    /// The GraphQL endpoint of the network node.
    #[arg(
        long = "network-endpoint",
        default_value = DEVNET_GRAPHQL_ENDPOINT,
        env = "ZKAPP_NETWORK_ENDPOINT"
    )]
    pub network_endpoint: Url,

    /// The address of the zkApp to interact with.
    #[arg(
        long = "zkapp-address",
        default_value = DEFAULT_ZKAPP_ADDRESS,
        env = "ZKAPP_ADDRESS"
    )]
    pub zkapp_address: PublicKey,

    /// The fee paid for each transaction, in MINA.
    #[arg(long = "transaction-fee", default_value = "0.1", env = "ZKAPP_TRANSACTION_FEE")]
    pub transaction_fee: f64,

    /// The memo attached to each transaction.
    #[arg(long = "transaction-memo", default_value = "", env = "ZKAPP_TRANSACTION_MEMO")]
    pub memo: String,

    /// Wait this long between two checks of the fee payer account.
    #[arg(long = "poll-interval-ms", default_value = "5000", env = "ZKAPP_POLL_INTERVAL")]
    pub poll_interval_ms: u64,

    /// The block explorer prefix of transaction links.
    #[arg(long = "explorer-base", default_value = DEFAULT_EXPLORER_BASE)]
    pub explorer_base: String,

    /// The faucet prefix of funding links.
    #[arg(long = "faucet-base", default_value = DEFAULT_FAUCET_BASE)]
    pub faucet_base: String,
}

impl AppConfig {
    pub fn network(&self) -> NetworkContext {
        NetworkContext::new(self.network_endpoint.clone())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            network_endpoint: NetworkContext::devnet().endpoint().clone(),
            zkapp_address: DEFAULT_ZKAPP_ADDRESS
                .parse()
                .expect("the default zkApp address is valid base58"),
            transaction_fee: 0.1,
            memo: String::new(),
            poll_interval_ms: 5000,
            explorer_base: DEFAULT_EXPLORER_BASE.to_owned(),
            faucet_base: DEFAULT_FAUCET_BASE.to_owned(),
        }
    }
}
