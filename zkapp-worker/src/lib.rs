// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The execution worker of the zkApp client.
//!
//! All contract work (loading, compiling, reading state, building, proving and exporting
//! transactions) happens inside a single [`ExecutionWorkerActor`] task which owns every piece
//! of mutable state. The rest of the application talks to it through a [`WorkerClient`],
//! one request at a time.

pub mod actor;
pub mod client;
pub mod data_types;
mod error;
pub mod graphql;
pub mod sdk;
mod session;
#[cfg(with_testing)]
#[path = "unit_tests/test_utils.rs"]
pub mod test_utils;
mod util;

pub use actor::ExecutionWorkerActor;
pub use client::WorkerClient;
pub use error::WorkerError;
pub use sdk::{ContractSdk, SdkError};
