// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Values exchanged between the worker and its clients.

use serde::{Deserialize, Serialize};
use zkapp_base::crypto::PublicKey;

/// Where the contract definition is loaded from.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractSource {
    /// The definition bundled with the application.
    #[default]
    Bundled,
    /// A compiled module supplied at runtime, e.g. generated by the assistant.
    Module(String),
}

/// How far the worker session has progressed.
///
/// Stages are ordered: each one requires all the previous ones.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SessionStage {
    #[default]
    Unloaded,
    Loaded,
    Compiled,
    Initialized,
}

/// Whether the worker is able to serve requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Readiness {
    Starting,
    Ready,
    Failed,
}

/// An account as reported by the network.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub address: PublicKey,
    /// The total balance, in nanomina, as a decimal string.
    pub balance: String,
    pub nonce: String,
}

/// Why an account query did not find the account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum AccountQueryError {
    #[error("Account {0} does not exist")]
    NotFound(PublicKey),
    #[error("Failed to reach the network: {0}")]
    Transport(String),
}

/// The result of looking up an account. The account exists iff `error` is `None`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountQueryResult {
    pub address: PublicKey,
    pub account: Option<Account>,
    pub error: Option<AccountQueryError>,
}

impl AccountQueryResult {
    pub fn found(account: Account) -> Self {
        Self {
            address: account.address.clone(),
            account: Some(account),
            error: None,
        }
    }

    pub fn missing(address: PublicKey, error: AccountQueryError) -> Self {
        Self {
            address,
            account: None,
            error: Some(error),
        }
    }

    pub fn exists(&self) -> bool {
        self.error.is_none()
    }
}
