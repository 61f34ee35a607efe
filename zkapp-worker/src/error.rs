// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use crate::sdk::SdkError;

/// Errors returned by the execution worker and its client.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("The execution worker is not available")]
    WorkerUnavailable,
    #[error("Failed to load the contract: {0}")]
    ContractLoad(String),

    // Missing prerequisites
    #[error("No contract has been loaded: call `load_contract` first")]
    NotLoaded,
    #[error("The contract has not been compiled: call `compile_contract` first")]
    NotCompiled,
    #[error("No contract instance has been initialized: call `init_instance` first")]
    NotInitialized,
    #[error("No network has been selected: call `select_network` first")]
    NetworkNotSelected,
    #[error("There is no pending transaction")]
    NoPendingTransaction,

    #[error(transparent)]
    Sdk(#[from] SdkError),
}

impl WorkerError {
    /// Whether this error reports an operation invoked before its prerequisite.
    pub fn is_missing_prerequisite(&self) -> bool {
        matches!(
            self,
            WorkerError::NotLoaded
                | WorkerError::NotCompiled
                | WorkerError::NotInitialized
                | WorkerError::NetworkNotSelected
                | WorkerError::NoPendingTransaction
        )
    }
}
