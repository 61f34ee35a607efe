// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! This module defines util functions for interacting with Prometheus (logging metrics, etc)

use prometheus::{register_int_counter_vec, IntCounterVec, Opts};

const ZKAPP_NAMESPACE: &str = "zkapp";

/// Wrapper around the Prometheus `register_int_counter_vec!` macro which also sets the
/// zkApp namespace.
///
/// Metrics are registered once, from a `LazyLock`; a name clash is a programming error.
pub fn register_int_counter_vec(
    name: &str,
    description: &str,
    label_names: &[&str],
) -> IntCounterVec {
    let counter_opts = Opts::new(name, description).namespace(ZKAPP_NAMESPACE);
    register_int_counter_vec!(counter_opts, label_names)
        .expect("Prometheus counters must be registered only once")
}
