// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The zkApp workflow, as driven by the user interface.
//!
//! Every entry point publishes its progress as a status line, and turns a failure into a
//! status line as well before returning it.

use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument};
use zkapp_base::{
    crypto::{PrivateKey, PublicKey},
    links,
};
use zkapp_worker::WorkerClient;

use crate::{
    config::AppConfig,
    poller::{AccountReadinessPoller, PollOutcome},
    wallet::{FeePayerParams, SendTransactionParams, Wallet, WalletCapability},
    ClientError,
};

/// How [`ZkappApp::setup`] ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SetupOutcome {
    /// Setup completed. The fee payer may still need funding.
    Ready { fee_payer_exists: bool },
    /// There is no wallet: nothing was done after selecting the network.
    NoWallet,
    /// A previous call already completed the setup.
    AlreadySetUp,
}

/// The application state behind the zkApp page.
pub struct ZkappApp {
    worker: WorkerClient,
    wallet: WalletCapability,
    config: AppConfig,
    status: watch::Sender<String>,
    has_wallet: Option<bool>,
    set_up: bool,
    fee_payer: Option<PublicKey>,
    fee_payer_exists: bool,
    current_state: Option<String>,
    transaction_link: Option<String>,
}

impl ZkappApp {
    pub fn new(worker: WorkerClient, wallet: WalletCapability, config: AppConfig) -> Self {
        let (status, _) = watch::channel(String::new());
        Self {
            worker,
            wallet,
            config,
            status,
            has_wallet: None,
            set_up: false,
            fee_payer: None,
            fee_payer_exists: false,
            current_state: None,
            transaction_link: None,
        }
    }

    /// Subscribes to the status line.
    pub fn status(&self) -> watch::Receiver<String> {
        self.status.subscribe()
    }

    /// Whether a wallet was found, once setup has looked for one.
    pub fn has_wallet(&self) -> Option<bool> {
        self.has_wallet
    }

    pub fn is_set_up(&self) -> bool {
        self.set_up
    }

    pub fn fee_payer(&self) -> Option<&PublicKey> {
        self.fee_payer.as_ref()
    }

    pub fn fee_payer_exists(&self) -> bool {
        self.fee_payer_exists
    }

    /// The zkApp state read by the last setup or refresh.
    pub fn current_state(&self) -> Option<&str> {
        self.current_state.as_deref()
    }

    /// The explorer link of the last submitted transaction.
    pub fn transaction_link(&self) -> Option<&str> {
        self.transaction_link.as_deref()
    }

    /// The link for funding the fee payer account, once it is known.
    pub fn faucet_link(&self) -> Option<String> {
        let fee_payer = self.fee_payer.as_ref()?;
        Some(links::faucet_link(&self.config.faucet_base, fee_payer))
    }

    fn display_step(&self, step: impl Into<String>) {
        let step = step.into();
        info!("{step}");
        self.status.send_replace(step);
    }

    fn clear_status(&self) {
        self.status.send_replace(String::new());
    }

    fn report<T>(&self, context: &str, result: Result<T, ClientError>) -> Result<T, ClientError> {
        if let Err(error) = &result {
            error!("{context}: {error}");
            self.status.send_replace(format!("{context}: {error}"));
        }
        result
    }

    fn wallet(&mut self) -> Result<Arc<dyn Wallet>, ClientError> {
        match self.wallet.get() {
            Some(wallet) => Ok(wallet),
            None => {
                self.has_wallet = Some(false);
                Err(ClientError::WalletUnavailable)
            }
        }
    }

    fn ready_fee_payer(&self) -> Result<PublicKey, ClientError> {
        match &self.fee_payer {
            Some(fee_payer) if self.set_up => Ok(fee_payer.clone()),
            _ => Err(ClientError::NotSetUp),
        }
    }

    /// Prepares the worker and the contract instance, and looks up the fee payer.
    ///
    /// Calling it again after it succeeded does nothing.
    #[instrument(skip(self))]
    pub async fn setup(&mut self) -> Result<SetupOutcome, ClientError> {
        if self.set_up {
            return Ok(SetupOutcome::AlreadySetUp);
        }
        let result = self.try_setup().await;
        self.report("Error during setup", result)
    }

    async fn try_setup(&mut self) -> Result<SetupOutcome, ClientError> {
        self.display_step("Loading web worker...");
        self.worker.wait_until_ready().await?;
        self.display_step("Done loading web worker");

        self.worker.select_network(self.config.network()).await?;

        let Some(wallet) = self.wallet.get() else {
            self.has_wallet = Some(false);
            self.display_step("Wallet not found.");
            return Ok(SetupOutcome::NoWallet);
        };

        let fee_payer = wallet
            .request_accounts()
            .await?
            .into_iter()
            .next()
            .ok_or(ClientError::NoAccount)?;
        self.display_step(format!("Using key:{fee_payer}"));
        self.fee_payer = Some(fee_payer.clone());

        self.display_step("Checking if fee payer account exists...");
        let fee_payer_exists = self.worker.fetch_account(fee_payer).await?.exists();
        self.fee_payer_exists = fee_payer_exists;

        self.worker.load_contract().await?;

        self.display_step("Compiling zkApp...");
        self.worker.compile_contract().await?;
        self.display_step("zkApp compiled");

        self.worker
            .init_instance(self.config.zkapp_address.clone())
            .await?;

        self.display_step("Getting zkApp state...");
        self.load_current_state().await?;

        self.set_up = true;
        self.has_wallet = Some(true);
        self.clear_status();
        Ok(SetupOutcome::Ready { fee_payer_exists })
    }

    async fn load_current_state(&mut self) -> Result<(), ClientError> {
        self.worker
            .fetch_account(self.config.zkapp_address.clone())
            .await?;
        let state = self.worker.read_state().await?;
        info!("Current state in zkApp: {state}");
        self.current_state = Some(state);
        Ok(())
    }

    /// Waits until the fee payer account exists, unless it is already known to.
    #[instrument(skip_all)]
    pub async fn wait_for_fee_payer(
        &mut self,
        cancellation: &CancellationToken,
    ) -> Result<PollOutcome, ClientError> {
        let result = self.try_wait_for_fee_payer(cancellation).await;
        self.report("Error checking account", result)
    }

    async fn try_wait_for_fee_payer(
        &mut self,
        cancellation: &CancellationToken,
    ) -> Result<PollOutcome, ClientError> {
        let fee_payer = self.ready_fee_payer()?;
        if self.fee_payer_exists {
            return Ok(PollOutcome::Ready { attempts: 0 });
        }
        self.display_step("Checking if fee payer account exists...");
        let mut poller = AccountReadinessPoller::new(self.worker.clone(), fee_payer)
            .with_interval(self.config.poll_interval());
        let outcome = poller.run(cancellation).await?;
        if let PollOutcome::Ready { .. } = outcome {
            self.fee_payer_exists = true;
            self.clear_status();
        }
        Ok(outcome)
    }

    /// Builds, proves and submits a call of the zkApp's update method, returning the
    /// explorer link of the transaction.
    #[instrument(skip(self))]
    pub async fn send_update_transaction(&mut self) -> Result<String, ClientError> {
        let result = self.try_send_update_transaction().await;
        self.report("Error sending transaction", result)
    }

    async fn try_send_update_transaction(&mut self) -> Result<String, ClientError> {
        let wallet = self.wallet()?;
        let fee_payer = self.ready_fee_payer()?;

        self.display_step("Creating a transaction...");
        self.worker.fetch_account(fee_payer).await?;
        self.worker.build_update_transaction().await?;

        self.display_step("Creating proof...");
        self.worker.prove_transaction().await?;

        self.display_step("Getting transaction JSON...");
        let transaction = self.worker.export_transaction().await?;

        self.display_step("Requesting send transaction...");
        self.submit(wallet.as_ref(), transaction).await
    }

    /// Re-reads the zkApp state from the network.
    #[instrument(skip(self))]
    pub async fn refresh_state(&mut self) -> Result<String, ClientError> {
        let result = self.try_refresh_state().await;
        self.report("Error refreshing state", result)
    }

    async fn try_refresh_state(&mut self) -> Result<String, ClientError> {
        if !self.set_up {
            return Err(ClientError::NotSetUp);
        }
        self.display_step("Getting zkApp state...");
        self.load_current_state().await?;
        self.clear_status();
        Ok(self.current_state.clone().unwrap_or_default())
    }

    /// Deploys a new instance of the contract at the account of `contract_key`, returning
    /// the explorer link of the deploy transaction.
    ///
    /// The new instance replaces the current one in the worker.
    #[instrument(skip_all)]
    pub async fn deploy_new_contract(
        &mut self,
        contract_key: PrivateKey,
    ) -> Result<String, ClientError> {
        let result = self.try_deploy_new_contract(contract_key).await;
        self.report("Error deploying contract", result)
    }

    async fn try_deploy_new_contract(
        &mut self,
        contract_key: PrivateKey,
    ) -> Result<String, ClientError> {
        let wallet = self.wallet()?;
        let fee_payer = self.ready_fee_payer()?;

        self.display_step("Creating a deployment transaction...");
        self.worker.fetch_account(fee_payer.clone()).await?;
        self.worker
            .build_deploy_transaction(contract_key, fee_payer)
            .await?;

        self.display_step("Getting transaction JSON...");
        let transaction = self.worker.export_transaction().await?;

        self.display_step("Requesting send transaction...");
        self.submit(wallet.as_ref(), transaction).await
    }

    async fn submit(&mut self, wallet: &dyn Wallet, transaction: String) -> Result<String, ClientError> {
        let params = SendTransactionParams {
            transaction,
            fee_payer: FeePayerParams {
                fee: self.config.transaction_fee,
                memo: self.config.memo.clone(),
            },
        };
        let outcome = wallet.send_transaction(params).await?;
        let link = links::transaction_link(&self.config.explorer_base, &outcome.hash);
        info!("See transaction at {link}");
        self.display_step(link.clone());
        self.transaction_link = Some(link.clone());
        Ok(link)
    }
}

#[cfg(test)]
#[path = "unit_tests/app_tests.rs"]
mod tests;
