// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::sync::LazyLock;

use prometheus::IntCounterVec;
use zkapp_base::prometheus_util::register_int_counter_vec;

pub(crate) static REQUESTS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec(
        "assistant_requests",
        "Generation requests, by outcome",
        &["outcome"],
    )
});

pub(crate) static FRAGMENTS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec("assistant_fragments", "Fragments forwarded to clients", &[])
});

pub(crate) static UPSTREAM_ERRORS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec(
        "assistant_upstream_errors",
        "Failures of the completion service, by phase",
        &["phase"],
    )
});
