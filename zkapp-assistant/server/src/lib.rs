// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The assistant relay: an HTTP service streaming the answer of a chat-completion model to
//! a contract request, fragment by fragment, as server-sent events.

pub mod completion;
mod error;
#[cfg(feature = "metrics")]
mod metrics;
pub mod openai;
pub mod priming;

use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{header, HeaderValue, Method},
    response::{
        sse::{Event, Sse},
        IntoResponse,
    },
    routing::get,
    Router,
};
use futures::{stream, Stream, StreamExt as _};
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, instrument, warn};
use zkapp_assistant::{ErrorEnvelope, GenerateParams, StreamEvent, ERROR_EVENT, GENERATE_PATH};
#[cfg(feature = "metrics")]
use zkapp_metrics::monitoring_server;

pub use crate::{
    completion::{ChatCompletion, ChatMessage, ChatRole, CompletionError, FragmentStream},
    error::RelayError,
    openai::OpenAiClient,
};

/// The settings of an [`AssistantService`].
#[derive(Clone, Debug)]
pub struct AssistantConfig {
    pub port: u16,
    #[cfg(feature = "metrics")]
    pub metrics_port: u16,
    /// The origins allowed to call the service from a browser.
    pub allowed_origins: Vec<HeaderValue>,
}

impl AssistantConfig {
    /// The port serving `/metrics` unless another one is set.
    #[cfg(feature = "metrics")]
    pub const DEFAULT_METRICS_PORT: u16 = 9091;

    pub fn new(port: u16, allowed_origins: Vec<HeaderValue>) -> Self {
        Self {
            port,
            #[cfg(feature = "metrics")]
            metrics_port: Self::DEFAULT_METRICS_PORT,
            allowed_origins,
        }
    }
}

/// The assistant relay.
#[derive(Clone)]
pub struct AssistantService {
    config: AssistantConfig,
    completion: Arc<dyn ChatCompletion>,
}

impl AssistantService {
    pub fn new(config: AssistantConfig, completion: Arc<dyn ChatCompletion>) -> Self {
        Self { config, completion }
    }

    #[cfg(feature = "metrics")]
    fn metrics_address(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.config.metrics_port))
    }

    fn cors_layer(&self) -> CorsLayer {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(self.config.allowed_origins.clone()))
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            .allow_credentials(true)
    }

    /// Returns the routes of the service.
    pub fn router(&self) -> Router {
        Router::new()
            .route(GENERATE_PATH, get(generate))
            .route("/ready", get(|| async { "ready!" }))
            .with_state(self.completion.clone())
            .layer(self.cors_layer())
    }

    /// Runs the service until `cancellation_token` is cancelled.
    #[instrument(name = "AssistantService::run", skip_all, fields(port = self.config.port))]
    pub async fn run(self, cancellation_token: CancellationToken) -> anyhow::Result<()> {
        let port = self.config.port;

        #[cfg(feature = "metrics")]
        monitoring_server::start_metrics(self.metrics_address(), cancellation_token.clone());

        let app = self.router();
        let tcp_listener =
            tokio::net::TcpListener::bind(SocketAddr::from(([0, 0, 0, 0], port))).await?;
        info!("Assistant relay listening on http://localhost:{port}");

        axum::serve(tcp_listener, app)
            .with_graceful_shutdown(cancellation_token.cancelled_owned())
            .await?;

        Ok(())
    }
}

#[cfg_attr(not(feature = "metrics"), allow(unused_variables))]
fn count_request(outcome: &str) {
    #[cfg(feature = "metrics")]
    metrics::REQUESTS.with_label_values(&[outcome]).inc();
}

/// Streams the answer to `prompt`.
#[instrument(skip_all)]
async fn generate(
    State(completion): State<Arc<dyn ChatCompletion>>,
    params: Result<Query<GenerateParams>, QueryRejection>,
) -> Result<impl IntoResponse, RelayError> {
    let Query(params) = params.map_err(|rejection| {
        info!("rejected the query: {rejection}");
        count_request("rejected");
        RelayError::InvalidQuery(rejection.body_text())
    })?;
    let Some(prompt) = params.prompt.filter(|prompt| !prompt.trim().is_empty()) else {
        info!("request without a prompt");
        count_request("rejected");
        return Err(RelayError::MissingPrompt);
    };
    info!(prompt_length = prompt.len(), "received a request");

    let fragments = match completion.stream(priming::prime(&prompt)).await {
        Ok(fragments) => fragments,
        Err(error) => {
            warn!("failed to start the completion: {error}");
            count_request("failed");
            #[cfg(feature = "metrics")]
            metrics::UPSTREAM_ERRORS.with_label_values(&["open"]).inc();
            return Err(error.into());
        }
    };
    count_request("streamed");

    Ok((
        [(header::CONNECTION, HeaderValue::from_static("keep-alive"))],
        Sse::new(events(fragments)),
    ))
}

/// Turns the fragments into events. An upstream failure ends the stream with an error event.
fn events(fragments: FragmentStream) -> impl Stream<Item = Result<Event, axum::Error>> + Send {
    stream::unfold(Some(fragments), |fragments| async move {
        let mut fragments = fragments?;
        match fragments.next().await? {
            Ok(content) => {
                #[cfg(feature = "metrics")]
                metrics::FRAGMENTS.with_label_values(&[]).inc();
                let event = Event::default().json_data(StreamEvent { content });
                Some((event, Some(fragments)))
            }
            Err(error) => {
                warn!("the completion failed while streaming: {error}");
                #[cfg(feature = "metrics")]
                metrics::UPSTREAM_ERRORS.with_label_values(&["stream"]).inc();
                let event = Event::default()
                    .event(ERROR_EVENT)
                    .json_data(ErrorEnvelope::new(error.to_string()));
                Some((event, None))
            }
        }
    })
}

#[cfg(test)]
#[path = "unit_tests/relay_tests.rs"]
mod tests;
