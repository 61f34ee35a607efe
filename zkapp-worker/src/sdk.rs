// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The contract SDK, consumed as an opaque capability.
//!
//! Key derivation, compilation, proving and transaction encoding belong to the SDK. The
//! worker only sequences these calls and keeps the resulting values.

use async_trait::async_trait;
use zkapp_base::{
    crypto::{PrivateKey, PublicKey},
    network::NetworkContext,
};

use crate::data_types::{Account, ContractSource};

/// Errors reported by a [`ContractSdk`].
#[derive(Debug, thiserror::Error)]
pub enum SdkError {
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Contract module not found: {0}")]
    ModuleNotFound(String),
    #[error("Invalid key: {0}")]
    InvalidKey(String),
    #[error("Compilation failed: {0}")]
    Compilation(String),
    #[error("Contract execution failed: {0}")]
    Execution(String),
    #[error("Proof generation failed: {0}")]
    Proof(String),
    #[error("Failed to serialize the transaction: {0}")]
    Serialization(String),
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for SdkError {
    fn from(error: reqwest::Error) -> Self {
        SdkError::Transport(error.to_string())
    }
}

/// The operations the worker needs from a contract SDK.
///
/// Implementations doing heavy computation (compiling, proving) should move it off the
/// async executor themselves, e.g. with `tokio::task::spawn_blocking`.
#[async_trait]
pub trait ContractSdk: Send + Sync + 'static {
    /// A loaded contract definition.
    type Definition: Send + Sync + 'static;
    /// A contract definition bound to an on-chain address.
    type Instance: Send + Sync + 'static;
    /// A transaction under construction.
    type Transaction: Send + Sync + 'static;

    /// Prepares the SDK before the worker accepts requests.
    async fn initialize(&self) -> Result<(), SdkError> {
        Ok(())
    }

    /// Resolves a contract definition.
    async fn load(&self, source: &ContractSource) -> Result<Self::Definition, SdkError>;

    /// Compiles a definition, producing its proving keys.
    async fn compile(&self, definition: &Self::Definition) -> Result<(), SdkError>;

    /// Looks up an account, returning `None` if it does not exist.
    ///
    /// The default implementation queries the GraphQL endpoint of the network.
    async fn fetch_account(
        &self,
        network: &NetworkContext,
        address: &PublicKey,
    ) -> Result<Option<Account>, SdkError> {
        crate::graphql::fetch_account(network, address).await
    }

    /// Binds a definition to an address.
    fn instantiate(&self, definition: &Self::Definition, address: PublicKey) -> Self::Instance;

    /// Derives the public key of a private key.
    fn public_key(&self, private_key: &PrivateKey) -> Result<PublicKey, SdkError>;

    /// Reads the on-chain state of an instance, serialized as JSON.
    async fn read_state(
        &self,
        network: &NetworkContext,
        instance: &Self::Instance,
    ) -> Result<String, SdkError>;

    /// Builds a transaction calling the state-transition method of an instance.
    async fn build_update(
        &self,
        network: &NetworkContext,
        instance: &Self::Instance,
    ) -> Result<Self::Transaction, SdkError>;

    /// Builds a transaction deploying `instance`, funding its new account from `fee_payer`.
    ///
    /// The transaction is signed with `contract_key` only; the fee payer signs later.
    async fn build_deploy(
        &self,
        network: &NetworkContext,
        instance: &Self::Instance,
        fee_payer: &PublicKey,
        contract_key: &PrivateKey,
    ) -> Result<Self::Transaction, SdkError>;

    /// Attaches proofs to a transaction.
    async fn prove(&self, transaction: &mut Self::Transaction) -> Result<(), SdkError>;

    /// Encodes a transaction in the wire format understood by wallets.
    fn to_wire(&self, transaction: &Self::Transaction) -> Result<String, SdkError>;
}
