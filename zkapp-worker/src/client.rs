// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The control-side proxy of the execution worker.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{mpsc, oneshot, watch};
use zkapp_base::{
    crypto::{PrivateKey, PublicKey},
    network::NetworkContext,
};

use crate::{
    actor::WorkerRequest,
    data_types::{AccountQueryResult, ContractSource, Readiness, SessionStage},
    WorkerError,
};

/// A handle for sending requests to an [`ExecutionWorkerActor`](crate::ExecutionWorkerActor).
///
/// Each call waits for the worker's response. The worker handles requests in the order
/// they arrive, so a call depending on the result of another must only be issued after the
/// first one returned.
///
/// The client also tracks how far the session has progressed, and rejects calls whose
/// prerequisites are missing without sending them to the worker.
#[derive(Clone)]
pub struct WorkerClient {
    requests: mpsc::UnboundedSender<WorkerRequest>,
    readiness: watch::Receiver<Readiness>,
    stage: Arc<Mutex<SessionStage>>,
}

impl WorkerClient {
    pub(crate) fn new(
        requests: mpsc::UnboundedSender<WorkerRequest>,
        readiness: watch::Receiver<Readiness>,
    ) -> Self {
        Self {
            requests,
            readiness,
            stage: Arc::default(),
        }
    }

    /// Returns whether the worker has finished initializing and is still running.
    pub fn is_ready(&self) -> bool {
        *self.readiness.borrow() == Readiness::Ready && !self.requests.is_closed()
    }

    /// Waits until the worker has finished initializing.
    pub async fn wait_until_ready(&self) -> Result<(), WorkerError> {
        let mut readiness = self.readiness.clone();
        let readiness = readiness
            .wait_for(|readiness| *readiness != Readiness::Starting)
            .await
            .map(|readiness| *readiness)
            .unwrap_or(Readiness::Failed);
        match readiness {
            Readiness::Ready => Ok(()),
            Readiness::Starting | Readiness::Failed => Err(WorkerError::WorkerUnavailable),
        }
    }

    /// Returns the last known stage of the worker session.
    pub fn stage(&self) -> SessionStage {
        *self
            .stage
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn set_stage(&self, stage: SessionStage) {
        *self.stage.lock().unwrap_or_else(PoisonError::into_inner) = stage;
    }

    fn require_stage(&self, required: SessionStage) -> Result<(), WorkerError> {
        let current = self.stage();
        if current >= required {
            return Ok(());
        }
        Err(match current {
            SessionStage::Unloaded => WorkerError::NotLoaded,
            SessionStage::Loaded => WorkerError::NotCompiled,
            SessionStage::Compiled | SessionStage::Initialized => WorkerError::NotInitialized,
        })
    }

    async fn request<T>(
        &self,
        make_request: impl FnOnce(oneshot::Sender<Result<T, WorkerError>>) -> WorkerRequest,
    ) -> Result<T, WorkerError> {
        if !self.is_ready() {
            return Err(WorkerError::WorkerUnavailable);
        }
        let (callback, response) = oneshot::channel();
        self.requests
            .send(make_request(callback))
            .map_err(|_| WorkerError::WorkerUnavailable)?;
        response.await.map_err(|_| WorkerError::WorkerUnavailable)?
    }

    async fn staged_request(
        &self,
        make_request: impl FnOnce(oneshot::Sender<Result<SessionStage, WorkerError>>) -> WorkerRequest,
    ) -> Result<(), WorkerError> {
        let stage = self.request(make_request).await?;
        self.set_stage(stage);
        Ok(())
    }

    /// Sets the network used by all subsequent chain operations.
    pub async fn select_network(&self, network: NetworkContext) -> Result<(), WorkerError> {
        self.request(|callback| WorkerRequest::SelectNetwork { network, callback })
            .await
    }

    /// Loads the contract definition bundled with the application.
    pub async fn load_contract(&self) -> Result<(), WorkerError> {
        self.load_contract_from(ContractSource::Bundled).await
    }

    /// Loads a compiled contract module supplied at runtime.
    pub async fn load_compiled_contract(&self, module_url: String) -> Result<(), WorkerError> {
        self.load_contract_from(ContractSource::Module(module_url))
            .await
    }

    /// Loads a contract definition from the given source.
    pub async fn load_contract_from(&self, source: ContractSource) -> Result<(), WorkerError> {
        self.staged_request(|callback| WorkerRequest::LoadContract { source, callback })
            .await
    }

    /// Compiles the loaded contract.
    pub async fn compile_contract(&self) -> Result<(), WorkerError> {
        self.require_stage(SessionStage::Loaded)?;
        self.staged_request(|callback| WorkerRequest::CompileContract { callback })
            .await
    }

    /// Looks up an account on the selected network.
    ///
    /// A missing account, or a network failure, is reported in the result rather than as an
    /// error.
    pub async fn fetch_account(
        &self,
        address: PublicKey,
    ) -> Result<AccountQueryResult, WorkerError> {
        self.request(|callback| WorkerRequest::FetchAccount { address, callback })
            .await
    }

    /// Binds the compiled contract to the account at `address`.
    pub async fn init_instance(&self, address: PublicKey) -> Result<(), WorkerError> {
        self.require_stage(SessionStage::Compiled)?;
        self.staged_request(|callback| WorkerRequest::InitInstance { address, callback })
            .await
    }

    /// Reads the on-chain state of the contract instance, serialized as JSON.
    pub async fn read_state(&self) -> Result<String, WorkerError> {
        self.require_stage(SessionStage::Initialized)?;
        self.request(|callback| WorkerRequest::ReadState { callback })
            .await
    }

    /// Builds a transaction calling the state-transition method of the instance.
    pub async fn build_update_transaction(&self) -> Result<(), WorkerError> {
        self.require_stage(SessionStage::Initialized)?;
        self.request(|callback| WorkerRequest::BuildUpdateTransaction { callback })
            .await
    }

    /// Builds a transaction deploying a new instance at the account of `contract_key`,
    /// funded by `fee_payer`.
    pub async fn build_deploy_transaction(
        &self,
        contract_key: PrivateKey,
        fee_payer: PublicKey,
    ) -> Result<(), WorkerError> {
        self.require_stage(SessionStage::Compiled)?;
        self.staged_request(|callback| WorkerRequest::BuildDeployTransaction {
            contract_key,
            fee_payer,
            callback,
        })
        .await
    }

    /// Proves the pending transaction.
    pub async fn prove_transaction(&self) -> Result<(), WorkerError> {
        self.request(|callback| WorkerRequest::ProveTransaction { callback })
            .await
    }

    /// Serializes the pending transaction for the wallet, consuming it.
    pub async fn export_transaction(&self) -> Result<String, WorkerError> {
        self.request(|callback| WorkerRequest::ExportTransaction { callback })
            .await
    }
}

#[cfg(test)]
#[path = "unit_tests/client_tests.rs"]
mod tests;
