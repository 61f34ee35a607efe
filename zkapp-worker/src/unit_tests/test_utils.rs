// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! An in-memory [`ContractSdk`] for tests.

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::Notify;
use zkapp_base::{
    crypto::{PrivateKey, PublicKey},
    network::NetworkContext,
};

use crate::{
    data_types::{Account, ContractSource},
    sdk::{ContractSdk, SdkError},
};

/// A fee payer address used throughout the tests.
pub const FEE_PAYER: &str = "B62qrDdA1K8w3xNwk7snEEetAKKtZB5ywaesg89dQopVCqdX79n3Axy";

/// A contract private key used throughout the tests.
pub const CONTRACT_KEY: &str = "EKFAdBGSSXrBbaCVqy4YjwWHoGEnsqYRQTqz227Eb5bzMx2bWu3F";

pub fn fee_payer() -> PublicKey {
    FEE_PAYER.parse().unwrap()
}

pub fn contract_key() -> PrivateKey {
    CONTRACT_KEY.parse().unwrap()
}

/// A contract definition produced by [`MockSdk::load`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MockDefinition {
    pub source: ContractSource,
}

/// A contract instance produced by [`MockSdk::instantiate`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MockInstance {
    pub address: PublicKey,
}

/// A transaction produced by [`MockSdk`]. Its wire format is its JSON serialization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MockTransaction {
    pub id: u64,
    pub kind: &'static str,
    pub contract: PublicKey,
    pub fee_payer: Option<PublicKey>,
    pub proved: bool,
}

#[derive(Default)]
struct MockState {
    accounts: BTreeMap<PublicKey, Account>,
    /// How many more queries report the account as missing before it appears.
    pending_accounts: BTreeMap<PublicKey, usize>,
    transport_failure: bool,
    modules: BTreeSet<String>,
    contract_states: BTreeMap<PublicKey, String>,
    fetch_counts: BTreeMap<PublicKey, usize>,
    compilations: usize,
    proofs: usize,
    next_transaction_id: u64,
    failing_initialization: bool,
    failing_serialization: bool,
}

/// A [`ContractSdk`] whose chain is a handful of maps.
#[derive(Clone, Default)]
pub struct MockSdk {
    state: Arc<Mutex<MockState>>,
    initialization_gate: Option<Arc<Notify>>,
}

impl MockSdk {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns an SDK whose initialization only completes once the returned gate is
    /// notified.
    pub fn gated() -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let sdk = Self {
            initialization_gate: Some(gate.clone()),
            ..Self::default()
        };
        (sdk, gate)
    }

    /// Makes initialization fail.
    pub fn with_failing_initialization(self) -> Self {
        self.state.lock().unwrap().failing_initialization = true;
        self
    }

    /// Adds an existing account holding `balance` nanomina.
    pub fn add_account(&self, address: PublicKey, balance: &str) {
        let account = Account {
            address: address.clone(),
            balance: balance.to_owned(),
            nonce: "0".to_owned(),
        };
        self.state.lock().unwrap().accounts.insert(address, account);
    }

    /// Adds an account that only appears after `missing_queries` queries reported it
    /// missing.
    pub fn add_account_after(&self, address: PublicKey, missing_queries: usize) {
        self.add_account(address.clone(), "1000000000");
        self.state
            .lock()
            .unwrap()
            .pending_accounts
            .insert(address, missing_queries);
    }

    pub fn set_transport_failure(&self, failing: bool) {
        self.state.lock().unwrap().transport_failure = failing;
    }

    pub fn set_failing_serialization(&self, failing: bool) {
        self.state.lock().unwrap().failing_serialization = failing;
    }

    /// Makes a compiled module available at `url`.
    pub fn register_module(&self, url: &str) {
        self.state.lock().unwrap().modules.insert(url.to_owned());
    }

    /// Sets the on-chain state of the contract at `address`.
    pub fn set_contract_state(&self, address: PublicKey, state: &str) {
        self.state
            .lock()
            .unwrap()
            .contract_states
            .insert(address, state.to_owned());
    }

    pub fn fetch_count(&self, address: &PublicKey) -> usize {
        self.state
            .lock()
            .unwrap()
            .fetch_counts
            .get(address)
            .copied()
            .unwrap_or_default()
    }

    pub fn compilation_count(&self) -> usize {
        self.state.lock().unwrap().compilations
    }

    pub fn proof_count(&self) -> usize {
        self.state.lock().unwrap().proofs
    }

    fn new_transaction(
        &self,
        kind: &'static str,
        contract: &PublicKey,
        fee_payer: Option<&PublicKey>,
    ) -> MockTransaction {
        let mut state = self.state.lock().unwrap();
        state.next_transaction_id += 1;
        MockTransaction {
            id: state.next_transaction_id,
            kind,
            contract: contract.clone(),
            fee_payer: fee_payer.cloned(),
            proved: false,
        }
    }
}

#[async_trait]
impl ContractSdk for MockSdk {
    type Definition = MockDefinition;
    type Instance = MockInstance;
    type Transaction = MockTransaction;

    async fn initialize(&self) -> Result<(), SdkError> {
        if let Some(gate) = &self.initialization_gate {
            gate.notified().await;
        }
        if self.state.lock().unwrap().failing_initialization {
            return Err(SdkError::Other("initialization failed".to_owned()));
        }
        Ok(())
    }

    async fn load(&self, source: &ContractSource) -> Result<MockDefinition, SdkError> {
        if let ContractSource::Module(url) = source {
            if !self.state.lock().unwrap().modules.contains(url) {
                return Err(SdkError::ModuleNotFound(url.clone()));
            }
        }
        Ok(MockDefinition {
            source: source.clone(),
        })
    }

    async fn compile(&self, _definition: &MockDefinition) -> Result<(), SdkError> {
        self.state.lock().unwrap().compilations += 1;
        Ok(())
    }

    async fn fetch_account(
        &self,
        _network: &NetworkContext,
        address: &PublicKey,
    ) -> Result<Option<Account>, SdkError> {
        let mut state = self.state.lock().unwrap();
        *state.fetch_counts.entry(address.clone()).or_default() += 1;
        if state.transport_failure {
            return Err(SdkError::Transport("connection refused".to_owned()));
        }
        if let Some(remaining) = state.pending_accounts.get_mut(address) {
            if *remaining > 0 {
                *remaining -= 1;
                return Ok(None);
            }
        }
        Ok(state.accounts.get(address).cloned())
    }

    fn instantiate(&self, _definition: &MockDefinition, address: PublicKey) -> MockInstance {
        MockInstance { address }
    }

    fn public_key(&self, private_key: &PrivateKey) -> Result<PublicKey, SdkError> {
        format!("B62q{}", private_key.as_base58())
            .parse()
            .map_err(|error: zkapp_base::crypto::Base58Error| {
                SdkError::InvalidKey(error.to_string())
            })
    }

    async fn read_state(
        &self,
        _network: &NetworkContext,
        instance: &MockInstance,
    ) -> Result<String, SdkError> {
        self.state
            .lock()
            .unwrap()
            .contract_states
            .get(&instance.address)
            .cloned()
            .ok_or_else(|| SdkError::Execution(format!("no state at {}", instance.address)))
    }

    async fn build_update(
        &self,
        _network: &NetworkContext,
        instance: &MockInstance,
    ) -> Result<MockTransaction, SdkError> {
        Ok(self.new_transaction("update", &instance.address, None))
    }

    async fn build_deploy(
        &self,
        _network: &NetworkContext,
        instance: &MockInstance,
        fee_payer: &PublicKey,
        _contract_key: &PrivateKey,
    ) -> Result<MockTransaction, SdkError> {
        Ok(self.new_transaction("deploy", &instance.address, Some(fee_payer)))
    }

    async fn prove(&self, transaction: &mut MockTransaction) -> Result<(), SdkError> {
        self.state.lock().unwrap().proofs += 1;
        transaction.proved = true;
        Ok(())
    }

    fn to_wire(&self, transaction: &MockTransaction) -> Result<String, SdkError> {
        if self.state.lock().unwrap().failing_serialization {
            return Err(SdkError::Serialization("encoder unavailable".to_owned()));
        }
        serde_json::to_string(transaction)
            .map_err(|error| SdkError::Serialization(error.to_string()))
    }
}
