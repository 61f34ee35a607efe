// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The control side of the zkApp builder.
//!
//! [`ZkappApp`] drives the execution worker through its setup sequence, waits for the fee
//! payer account to be funded, and hands proved transactions to the wallet.

pub mod app;
pub mod config;
mod error;
pub mod poller;
pub mod wallet;

pub use app::{SetupOutcome, ZkappApp};
pub use config::AppConfig;
pub use error::ClientError;
pub use poller::{AccountReadinessPoller, AccountSource, PollOutcome, PollerState};
pub use wallet::{Wallet, WalletCapability, WalletError};
