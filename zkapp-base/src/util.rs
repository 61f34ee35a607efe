// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Process-level helpers shared by the zkApp binaries.

use tokio::signal::unix;
use tokio_util::sync::CancellationToken;

/// Listens for shutdown signals, and notifies the [`CancellationToken`] if one is
/// received.
pub async fn listen_for_shutdown_signals(shutdown_sender: CancellationToken) {
    let mut sigint =
        unix::signal(unix::SignalKind::interrupt()).expect("Failed to set up SIGINT handler");
    let mut sigterm =
        unix::signal(unix::SignalKind::terminate()).expect("Failed to set up SIGTERM handler");
    let mut sigpipe =
        unix::signal(unix::SignalKind::pipe()).expect("Failed to set up SIGPIPE handler");
    let mut sighup =
        unix::signal(unix::SignalKind::hangup()).expect("Failed to set up SIGHUP handler");

    let signal = tokio::select! {
        _ = sigint.recv() => "SIGINT",
        _ = sigterm.recv() => "SIGTERM",
        _ = sigpipe.recv() => "SIGPIPE",
        _ = sighup.recv() => "SIGHUP",
    };

    tracing::info!(%signal, "shutting down");
    shutdown_sender.cancel();
}
