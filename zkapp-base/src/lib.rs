// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Base definitions shared by the zkApp crates: keys, network endpoints, explorer links,
//! tracing and process utilities.

pub mod crypto;
pub mod links;
pub mod network;
#[cfg(feature = "metrics")]
pub mod prometheus_util;
pub mod tracing;
pub mod util;

#[cfg(test)]
#[path = "unit_tests/crypto_tests.rs"]
mod crypto_tests;

pub use util::listen_for_shutdown_signals;
