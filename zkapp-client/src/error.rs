// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use zkapp_worker::WorkerError;

use crate::wallet::WalletError;

/// Errors returned by [`ZkappApp`](crate::ZkappApp).
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Worker(#[from] WorkerError),
    #[error(transparent)]
    Wallet(#[from] WalletError),
    #[error("No wallet was found")]
    WalletUnavailable,
    #[error("The wallet did not return any account")]
    NoAccount,
    #[error("The application has not been set up")]
    NotSetUp,
}
