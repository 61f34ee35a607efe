// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::{sync::Mutex, time::Duration};

use assert_matches::assert_matches;
use async_trait::async_trait;
use zkapp_worker::{
    test_utils::{contract_key, MockSdk},
    ExecutionWorkerActor, WorkerError,
};

use super::*;
use crate::wallet::{SendTransactionOutcome, WalletError};

const WALLET_ACCOUNT: &str = "B62qkwohsqTBPsvhYE8cPZSpzJMgoKn4i1LQRuBAtVXWpaT4dgH6WoA";
const HASH: &str = "5JuJ9JNu4uYhvCZuBVrBmNgBYZ2xyvs4XxRSwfY8f5FQBg6M3uWd";

fn wallet_account() -> PublicKey {
    WALLET_ACCOUNT.parse().unwrap()
}

#[derive(Clone, Default)]
struct MockWallet {
    accounts: Vec<PublicKey>,
    sent: Arc<Mutex<Vec<SendTransactionParams>>>,
}

impl MockWallet {
    fn with_account(account: PublicKey) -> Self {
        Self {
            accounts: vec![account],
            ..Self::default()
        }
    }

    fn sent(&self) -> Vec<SendTransactionParams> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Wallet for MockWallet {
    async fn request_accounts(&self) -> Result<Vec<PublicKey>, WalletError> {
        Ok(self.accounts.clone())
    }

    async fn send_transaction(
        &self,
        params: SendTransactionParams,
    ) -> Result<SendTransactionOutcome, WalletError> {
        self.sent.lock().unwrap().push(params);
        Ok(SendTransactionOutcome {
            hash: HASH.to_owned(),
        })
    }
}

struct Fixture {
    app: ZkappApp,
    sdk: MockSdk,
    wallet: MockWallet,
}

fn fixture(wallet: Option<MockWallet>) -> Fixture {
    let sdk = MockSdk::new();
    let config = AppConfig::default();
    sdk.add_account(config.zkapp_address.clone(), "0");
    sdk.set_contract_state(config.zkapp_address.clone(), r#""3""#);
    let capability = match &wallet {
        Some(wallet) => WalletCapability::new(wallet.clone()),
        None => WalletCapability::Unavailable,
    };
    let worker = ExecutionWorkerActor::spawn(sdk.clone());
    Fixture {
        app: ZkappApp::new(worker, capability, config),
        sdk,
        wallet: wallet.unwrap_or_default(),
    }
}

#[test_log::test(tokio::test)]
async fn setup_without_wallet_short_circuits() {
    let Fixture { mut app, sdk, .. } = fixture(None);
    let status = app.status();

    assert_eq!(app.setup().await.unwrap(), SetupOutcome::NoWallet);

    assert_eq!(app.has_wallet(), Some(false));
    assert!(!app.is_set_up());
    assert_eq!(*status.borrow(), "Wallet not found.");
    assert_eq!(sdk.compilation_count(), 0);
    assert_matches!(
        app.send_update_transaction().await,
        Err(ClientError::WalletUnavailable)
    );
    assert_matches!(
        app.deploy_new_contract(contract_key()).await,
        Err(ClientError::WalletUnavailable)
    );
}

#[test_log::test(tokio::test)]
async fn setup_prepares_the_instance_and_is_idempotent() {
    let Fixture {
        mut app,
        sdk,
        wallet: _,
    } = fixture(Some(MockWallet::with_account(wallet_account())));
    sdk.add_account(wallet_account(), "1000000000");

    assert_eq!(
        app.setup().await.unwrap(),
        SetupOutcome::Ready {
            fee_payer_exists: true
        }
    );
    assert!(app.is_set_up());
    assert_eq!(app.has_wallet(), Some(true));
    assert_eq!(app.fee_payer(), Some(&wallet_account()));
    assert_eq!(app.current_state(), Some(r#""3""#));
    assert_eq!(*app.status().borrow(), "");

    assert_eq!(app.setup().await.unwrap(), SetupOutcome::AlreadySetUp);
    assert_eq!(sdk.compilation_count(), 1);
}

#[test_log::test(tokio::test)]
async fn setup_failures_become_a_status_line() {
    // The zkApp account has no state to read.
    let worker = ExecutionWorkerActor::spawn(MockSdk::new());
    let wallet = WalletCapability::new(MockWallet::with_account(wallet_account()));
    let mut app = ZkappApp::new(worker, wallet, AppConfig::default());

    assert_matches!(
        app.setup().await,
        Err(ClientError::Worker(WorkerError::Sdk(_)))
    );
    assert!(!app.is_set_up());
    assert!(app.status().borrow().starts_with("Error during setup: "));
}

#[test_log::test(tokio::test)]
async fn wallet_without_accounts_is_an_error() {
    let Fixture { mut app, .. } = fixture(Some(MockWallet::default()));

    assert_matches!(app.setup().await, Err(ClientError::NoAccount));
    assert_eq!(
        *app.status().borrow(),
        "Error during setup: The wallet did not return any account"
    );
}

#[test_log::test(tokio::test(start_paused = true))]
async fn waits_for_the_fee_payer_to_be_funded() {
    let Fixture { mut app, sdk, .. } =
        fixture(Some(MockWallet::with_account(wallet_account())));
    sdk.add_account_after(wallet_account(), 3);

    assert_eq!(
        app.setup().await.unwrap(),
        SetupOutcome::Ready {
            fee_payer_exists: false
        }
    );
    assert_eq!(
        app.faucet_link().unwrap(),
        format!("https://faucet.minaprotocol.com/?address={WALLET_ACCOUNT}")
    );

    let outcome = app
        .wait_for_fee_payer(&CancellationToken::new())
        .await
        .unwrap();
    // The query made during setup was the first of the three misses.
    assert_eq!(outcome, PollOutcome::Ready { attempts: 3 });
    assert!(app.fee_payer_exists());
    assert_eq!(
        app.wait_for_fee_payer(&CancellationToken::new())
            .await
            .unwrap(),
        PollOutcome::Ready { attempts: 0 }
    );
}

#[test_log::test(tokio::test(start_paused = true))]
async fn waiting_can_be_cancelled() {
    let Fixture { mut app, .. } = fixture(Some(MockWallet::with_account(wallet_account())));
    app.setup().await.unwrap();

    let cancellation = CancellationToken::new();
    let canceller = {
        let cancellation = cancellation.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(7)).await;
            cancellation.cancel();
        })
    };

    assert_eq!(
        app.wait_for_fee_payer(&cancellation).await.unwrap(),
        PollOutcome::Cancelled { attempts: 2 }
    );
    canceller.await.unwrap();
    assert!(!app.fee_payer_exists());
}

#[test_log::test(tokio::test)]
async fn waiting_before_setup_is_an_error() {
    let Fixture { mut app, .. } = fixture(Some(MockWallet::with_account(wallet_account())));

    assert_matches!(
        app.wait_for_fee_payer(&CancellationToken::new()).await,
        Err(ClientError::NotSetUp)
    );
}

#[test_log::test(tokio::test)]
async fn update_transaction_is_proved_and_sent_to_the_wallet() {
    let Fixture {
        mut app,
        sdk,
        wallet,
    } = fixture(Some(MockWallet::with_account(wallet_account())));
    sdk.add_account(wallet_account(), "1000000000");
    app.setup().await.unwrap();

    let link = app.send_update_transaction().await.unwrap();

    assert_eq!(link, format!("https://minascan.io/devnet/tx/{HASH}"));
    assert_eq!(app.transaction_link(), Some(link.as_str()));
    assert_eq!(*app.status().borrow(), link);

    let sent = wallet.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(
        sent[0].fee_payer,
        FeePayerParams {
            fee: 0.1,
            memo: String::new()
        }
    );
    let transaction: serde_json::Value = serde_json::from_str(&sent[0].transaction).unwrap();
    assert_eq!(transaction["kind"], "update");
    assert_eq!(transaction["proved"], true);
}

#[test_log::test(tokio::test)]
async fn deploy_is_signed_by_the_contract_key_and_sent() {
    let Fixture {
        mut app,
        sdk,
        wallet,
    } = fixture(Some(MockWallet::with_account(wallet_account())));
    sdk.add_account(wallet_account(), "1000000000");
    app.setup().await.unwrap();

    let link = app.deploy_new_contract(contract_key()).await.unwrap();

    assert_eq!(link, format!("https://minascan.io/devnet/tx/{HASH}"));
    let sent = wallet.sent();
    let transaction: serde_json::Value = serde_json::from_str(&sent[0].transaction).unwrap();
    assert_eq!(transaction["kind"], "deploy");
    assert_eq!(transaction["feePayer"], WALLET_ACCOUNT);
}

#[test_log::test(tokio::test)]
async fn refresh_reads_the_latest_state() {
    let Fixture { mut app, sdk, .. } =
        fixture(Some(MockWallet::with_account(wallet_account())));
    app.setup().await.unwrap();

    sdk.set_contract_state(AppConfig::default().zkapp_address, r#""5""#);
    assert_eq!(app.refresh_state().await.unwrap(), r#""5""#);
    assert_eq!(app.current_state(), Some(r#""5""#));
}
