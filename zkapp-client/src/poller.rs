// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Waiting for an account to exist on the network.

use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};
use zkapp_base::crypto::PublicKey;
use zkapp_worker::{data_types::AccountQueryResult, WorkerClient, WorkerError};

/// The default time between two account queries.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Something able to look up accounts.
#[async_trait]
pub trait AccountSource: Send + Sync {
    async fn fetch_account(&self, address: PublicKey) -> Result<AccountQueryResult, WorkerError>;
}

#[async_trait]
impl AccountSource for WorkerClient {
    async fn fetch_account(&self, address: PublicKey) -> Result<AccountQueryResult, WorkerError> {
        WorkerClient::fetch_account(self, address).await
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PollerState {
    Waiting,
    Ready,
}

/// How a call to [`AccountReadinessPoller::run`] ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PollOutcome {
    /// The account exists. `attempts` is the number of queries made by this run.
    Ready { attempts: usize },
    /// The cancellation token fired before the account appeared.
    Cancelled { attempts: usize },
}

/// Queries an account until it exists.
///
/// Missing accounts and network failures reported in the query result are retried
/// forever, one query per interval. Failures of the worker itself end the poll.
pub struct AccountReadinessPoller<A> {
    source: A,
    address: PublicKey,
    interval: Duration,
    state: PollerState,
}

impl<A: AccountSource> AccountReadinessPoller<A> {
    pub fn new(source: A, address: PublicKey) -> Self {
        Self {
            source,
            address,
            interval: DEFAULT_POLL_INTERVAL,
            state: PollerState::Waiting,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn state(&self) -> PollerState {
        self.state
    }

    /// Polls until the account exists or `cancellation` fires.
    ///
    /// Once the account has been seen, further calls return immediately without querying.
    #[instrument(skip_all, fields(address = %self.address))]
    pub async fn run(&mut self, cancellation: &CancellationToken) -> Result<PollOutcome, WorkerError> {
        if self.state == PollerState::Ready {
            return Ok(PollOutcome::Ready { attempts: 0 });
        }

        let mut attempts = 0;
        loop {
            attempts += 1;
            let result = self.source.fetch_account(self.address.clone()).await?;
            if result.exists() {
                info!(attempts, "account is ready");
                self.state = PollerState::Ready;
                return Ok(PollOutcome::Ready { attempts });
            }
            debug!(attempts, error = ?result.error, "account is not ready yet");

            if cancellation.is_cancelled() {
                return Ok(PollOutcome::Cancelled { attempts });
            }
            tokio::select! {
                biased;
                _ = cancellation.cancelled() => return Ok(PollOutcome::Cancelled { attempts }),
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
    }
}

#[cfg(test)]
#[path = "unit_tests/poller_tests.rs"]
mod tests;
