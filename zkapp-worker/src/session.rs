// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The state owned by the execution worker, and the operations mutating it.
//!
//! Every operation checks all of its prerequisites, and finishes all of its SDK calls,
//! before assigning anything: a failed operation leaves the session unchanged.

use tracing::{debug, info, instrument};
use zkapp_base::{
    crypto::{PrivateKey, PublicKey},
    network::NetworkContext,
};

use crate::{
    data_types::{AccountQueryError, AccountQueryResult, ContractSource, SessionStage},
    sdk::{ContractSdk, SdkError},
    WorkerError,
};

/// The contract definition and instance held by the worker.
pub(crate) struct ContractHandle<S: ContractSdk> {
    definition: Option<S::Definition>,
    compiled: bool,
    instance: Option<S::Instance>,
}

impl<S: ContractSdk> Default for ContractHandle<S> {
    fn default() -> Self {
        Self {
            definition: None,
            compiled: false,
            instance: None,
        }
    }
}

impl<S: ContractSdk> ContractHandle<S> {
    fn stage(&self) -> SessionStage {
        match (&self.definition, self.compiled, &self.instance) {
            (None, _, _) => SessionStage::Unloaded,
            (Some(_), false, _) => SessionStage::Loaded,
            (Some(_), true, None) => SessionStage::Compiled,
            (Some(_), true, Some(_)) => SessionStage::Initialized,
        }
    }

    fn definition(&self) -> Result<&S::Definition, WorkerError> {
        self.definition.as_ref().ok_or(WorkerError::NotLoaded)
    }

    fn compiled_definition(&self) -> Result<&S::Definition, WorkerError> {
        let definition = self.definition()?;
        if !self.compiled {
            return Err(WorkerError::NotCompiled);
        }
        Ok(definition)
    }

    fn instance(&self) -> Result<&S::Instance, WorkerError> {
        self.compiled_definition()
            .map_err(|_| WorkerError::NotInitialized)?;
        self.instance.as_ref().ok_or(WorkerError::NotInitialized)
    }
}

/// The kind of a pending transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TransactionKind {
    Update,
    Deploy,
}

/// The single transaction slot of the worker.
pub(crate) struct PendingTransaction<T> {
    transaction: T,
    kind: TransactionKind,
    proved: bool,
}

/// Everything the execution worker owns.
pub(crate) struct WorkerSession<S: ContractSdk> {
    sdk: S,
    network: Option<NetworkContext>,
    contract: ContractHandle<S>,
    transaction: Option<PendingTransaction<S::Transaction>>,
}

impl<S: ContractSdk> WorkerSession<S> {
    pub(crate) fn new(sdk: S) -> Self {
        Self {
            sdk,
            network: None,
            contract: ContractHandle::default(),
            transaction: None,
        }
    }

    pub(crate) fn stage(&self) -> SessionStage {
        self.contract.stage()
    }

    #[cfg(test)]
    pub(crate) fn network(&self) -> Option<&NetworkContext> {
        self.network.as_ref()
    }

    #[cfg(test)]
    pub(crate) fn pending_transaction(&self) -> Option<(TransactionKind, bool)> {
        self.transaction
            .as_ref()
            .map(|pending| (pending.kind, pending.proved))
    }

    #[cfg(test)]
    pub(crate) fn sdk(&self) -> &S {
        &self.sdk
    }

    pub(crate) async fn initialize(&self) -> Result<(), SdkError> {
        self.sdk.initialize().await
    }

    fn network_context(&self) -> Result<&NetworkContext, WorkerError> {
        self.network.as_ref().ok_or(WorkerError::NetworkNotSelected)
    }

    fn replace_transaction(&mut self, transaction: S::Transaction, kind: TransactionKind) {
        let pending = PendingTransaction {
            transaction,
            kind,
            proved: false,
        };
        if let Some(previous) = self.transaction.replace(pending) {
            debug!(
                kind = ?previous.kind,
                proved = previous.proved,
                "discarding the previous pending transaction"
            );
        }
    }

    #[instrument(skip(self))]
    pub(crate) fn select_network(&mut self, network: NetworkContext) {
        info!("network selected");
        self.network = Some(network);
    }

    #[instrument(skip(self))]
    pub(crate) async fn load_contract(
        &mut self,
        source: ContractSource,
    ) -> Result<SessionStage, WorkerError> {
        let definition = self
            .sdk
            .load(&source)
            .await
            .map_err(|error| WorkerError::ContractLoad(error.to_string()))?;
        // A new definition invalidates the compilation and the instance of the old one.
        self.contract = ContractHandle {
            definition: Some(definition),
            compiled: false,
            instance: None,
        };
        info!("contract loaded");
        Ok(self.stage())
    }

    #[instrument(skip(self))]
    pub(crate) async fn compile_contract(&mut self) -> Result<SessionStage, WorkerError> {
        let definition = self.contract.definition()?;
        self.sdk.compile(definition).await?;
        self.contract.compiled = true;
        info!("contract compiled");
        Ok(self.stage())
    }

    #[instrument(skip(self))]
    pub(crate) async fn fetch_account(
        &self,
        address: PublicKey,
    ) -> Result<AccountQueryResult, WorkerError> {
        let network = self.network_context()?;
        match self.sdk.fetch_account(network, &address).await {
            Ok(Some(account)) => Ok(AccountQueryResult::found(account)),
            Ok(None) => Ok(AccountQueryResult::missing(
                address.clone(),
                AccountQueryError::NotFound(address),
            )),
            Err(SdkError::Transport(message)) => {
                debug!(%message, "account query failed");
                Ok(AccountQueryResult::missing(
                    address,
                    AccountQueryError::Transport(message),
                ))
            }
            Err(error) => Err(error.into()),
        }
    }

    #[instrument(skip(self))]
    pub(crate) fn init_instance(&mut self, address: PublicKey) -> Result<SessionStage, WorkerError> {
        let definition = self.contract.compiled_definition()?;
        let instance = self.sdk.instantiate(definition, address);
        self.contract.instance = Some(instance);
        Ok(self.stage())
    }

    #[instrument(skip(self))]
    pub(crate) async fn read_state(&self) -> Result<String, WorkerError> {
        let instance = self.contract.instance()?;
        let network = self.network_context()?;
        Ok(self.sdk.read_state(network, instance).await?)
    }

    #[instrument(skip(self))]
    pub(crate) async fn build_update_transaction(&mut self) -> Result<(), WorkerError> {
        let instance = self.contract.instance()?;
        let network = self.network_context()?;
        let transaction = self.sdk.build_update(network, instance).await?;
        self.replace_transaction(transaction, TransactionKind::Update);
        Ok(())
    }

    #[instrument(skip(self, contract_key))]
    pub(crate) async fn build_deploy_transaction(
        &mut self,
        contract_key: PrivateKey,
        fee_payer: PublicKey,
    ) -> Result<SessionStage, WorkerError> {
        let definition = self.contract.compiled_definition()?;
        let network = self.network_context()?;
        let contract_address = self.sdk.public_key(&contract_key)?;
        let instance = self.sdk.instantiate(definition, contract_address.clone());
        let transaction = self
            .sdk
            .build_deploy(network, &instance, &fee_payer, &contract_key)
            .await?;
        info!(%contract_address, "deploy transaction built");
        self.contract.instance = Some(instance);
        self.replace_transaction(transaction, TransactionKind::Deploy);
        Ok(self.stage())
    }

    #[instrument(skip(self))]
    pub(crate) async fn prove_transaction(&mut self) -> Result<(), WorkerError> {
        let pending = self
            .transaction
            .as_mut()
            .ok_or(WorkerError::NoPendingTransaction)?;
        self.sdk.prove(&mut pending.transaction).await?;
        pending.proved = true;
        info!(kind = ?pending.kind, "transaction proved");
        Ok(())
    }

    #[instrument(skip(self))]
    pub(crate) fn export_transaction(&mut self) -> Result<String, WorkerError> {
        let pending = self
            .transaction
            .take()
            .ok_or(WorkerError::NoPendingTransaction)?;
        match self.sdk.to_wire(&pending.transaction) {
            Ok(wire) => {
                debug!(kind = ?pending.kind, proved = pending.proved, "transaction exported");
                Ok(wire)
            }
            Err(error) => {
                self.transaction = Some(pending);
                Err(error.into())
            }
        }
    }
}

#[cfg(test)]
#[path = "unit_tests/session_tests.rs"]
mod tests;
