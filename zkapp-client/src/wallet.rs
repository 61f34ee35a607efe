// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The browser wallet, seen from the application.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use zkapp_base::crypto::PublicKey;

/// Errors reported by a [`Wallet`].
#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    #[error("The user rejected the request: {0}")]
    Rejected(String),
    #[error("Failed to reach the wallet: {0}")]
    Transport(String),
}

/// How the fee payer pays for a transaction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeePayerParams {
    /// The fee, in MINA.
    pub fee: f64,
    pub memo: String,
}

/// The argument of [`Wallet::send_transaction`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendTransactionParams {
    /// The transaction in wire format, as exported by the worker.
    pub transaction: String,
    pub fee_payer: FeePayerParams,
}

/// The result of [`Wallet::send_transaction`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendTransactionOutcome {
    pub hash: String,
}

/// A wallet able to sign as the fee payer and submit transactions.
#[async_trait]
pub trait Wallet: Send + Sync {
    /// Returns the accounts the user allows the application to use.
    async fn request_accounts(&self) -> Result<Vec<PublicKey>, WalletError>;

    /// Signs the transaction as the fee payer and submits it.
    async fn send_transaction(
        &self,
        params: SendTransactionParams,
    ) -> Result<SendTransactionOutcome, WalletError>;
}

/// Whether a wallet is installed.
#[derive(Clone)]
pub enum WalletCapability {
    Available(Arc<dyn Wallet>),
    Unavailable,
}

impl WalletCapability {
    pub fn new(wallet: impl Wallet + 'static) -> Self {
        WalletCapability::Available(Arc::new(wallet))
    }

    pub fn is_available(&self) -> bool {
        matches!(self, WalletCapability::Available(_))
    }

    /// Returns the wallet, if there is one.
    pub fn get(&self) -> Option<Arc<dyn Wallet>> {
        match self {
            WalletCapability::Available(wallet) => Some(wallet.clone()),
            WalletCapability::Unavailable => None,
        }
    }
}

impl std::fmt::Debug for WalletCapability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WalletCapability::Available(_) => f.write_str("Available"),
            WalletCapability::Unavailable => f.write_str("Unavailable"),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn send_transaction_params_use_the_wallet_field_names() {
        let params = SendTransactionParams {
            transaction: "{}".to_owned(),
            fee_payer: FeePayerParams {
                fee: 0.1,
                memo: String::new(),
            },
        };
        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            json!({ "transaction": "{}", "feePayer": { "fee": 0.1, "memo": "" } })
        );
    }
}
