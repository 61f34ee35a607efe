// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! An actor that runs the execution worker.

use tokio::sync::{mpsc, oneshot, watch};
use tracing::{error, instrument, trace};
use zkapp_base::{
    crypto::{PrivateKey, PublicKey},
    network::NetworkContext,
};

use crate::{
    client::WorkerClient,
    data_types::{AccountQueryResult, ContractSource, Readiness, SessionStage},
    sdk::ContractSdk,
    session::WorkerSession,
    util::RespondExt as _,
    WorkerError,
};

type Callback<T> = oneshot::Sender<Result<T, WorkerError>>;

/// A request for the [`ExecutionWorkerActor`].
pub enum WorkerRequest {
    SelectNetwork {
        network: NetworkContext,
        callback: Callback<()>,
    },

    LoadContract {
        source: ContractSource,
        callback: Callback<SessionStage>,
    },

    CompileContract {
        callback: Callback<SessionStage>,
    },

    FetchAccount {
        address: PublicKey,
        callback: Callback<AccountQueryResult>,
    },

    InitInstance {
        address: PublicKey,
        callback: Callback<SessionStage>,
    },

    ReadState {
        callback: Callback<String>,
    },

    BuildUpdateTransaction {
        callback: Callback<()>,
    },

    BuildDeployTransaction {
        contract_key: PrivateKey,
        fee_payer: PublicKey,
        callback: Callback<SessionStage>,
    },

    ProveTransaction {
        callback: Callback<()>,
    },

    ExportTransaction {
        callback: Callback<String>,
    },
}

/// The actor owning the [`WorkerSession`].
///
/// Requests are handled one at a time, to completion, in the order they were sent.
pub struct ExecutionWorkerActor<S: ContractSdk> {
    session: WorkerSession<S>,
    incoming_requests: mpsc::UnboundedReceiver<WorkerRequest>,
    readiness: watch::Sender<Readiness>,
}

impl<S: ContractSdk> ExecutionWorkerActor<S> {
    /// Spawns a new task to run the [`ExecutionWorkerActor`], returning a client for sending
    /// requests to the worker.
    ///
    /// The client reports [`WorkerError::WorkerUnavailable`] until the SDK has finished
    /// initializing.
    pub fn spawn(sdk: S) -> WorkerClient {
        let (sender, receiver) = mpsc::unbounded_channel();
        let (readiness_sender, readiness_receiver) = watch::channel(Readiness::Starting);

        let actor = ExecutionWorkerActor {
            session: WorkerSession::new(sdk),
            incoming_requests: receiver,
            readiness: readiness_sender,
        };

        tokio::spawn(actor.run());

        WorkerClient::new(sender, readiness_receiver)
    }

    /// Runs the worker until there are no more incoming requests.
    #[instrument(name = "ExecutionWorkerActor::run", skip_all)]
    async fn run(mut self) {
        trace!("Starting `ExecutionWorkerActor`");

        if let Err(error) = self.session.initialize().await {
            error!("Failed to initialize the contract SDK: {error}");
            self.readiness.send_replace(Readiness::Failed);
            return;
        }
        self.readiness.send_replace(Readiness::Ready);

        while let Some(request) = self.incoming_requests.recv().await {
            self.handle_request(request).await;
        }

        trace!("`ExecutionWorkerActor` finished");
    }

    async fn handle_request(&mut self, request: WorkerRequest) {
        use WorkerRequest::*;
        match request {
            SelectNetwork { network, callback } => {
                self.session.select_network(network);
                callback.respond(Ok(()));
            }

            LoadContract { source, callback } => {
                callback.respond(self.session.load_contract(source).await);
            }

            CompileContract { callback } => {
                callback.respond(self.session.compile_contract().await);
            }

            FetchAccount { address, callback } => {
                callback.respond(self.session.fetch_account(address).await);
            }

            InitInstance { address, callback } => {
                callback.respond(self.session.init_instance(address));
            }

            ReadState { callback } => {
                callback.respond(self.session.read_state().await);
            }

            BuildUpdateTransaction { callback } => {
                callback.respond(self.session.build_update_transaction().await);
            }

            BuildDeployTransaction {
                contract_key,
                fee_payer,
                callback,
            } => {
                callback.respond(
                    self.session
                        .build_deploy_transaction(contract_key, fee_payer)
                        .await,
                );
            }

            ProveTransaction { callback } => {
                callback.respond(self.session.prove_transaction().await);
            }

            ExportTransaction { callback } => {
                callback.respond(self.session.export_transaction());
            }
        }
    }
}
