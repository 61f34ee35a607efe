// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::fmt::Debug;

use axum::{http::StatusCode, response::IntoResponse, routing::get, Router};
use tokio::net::ToSocketAddrs;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Spawns a task serving the registered Prometheus metrics on `/metrics` until
/// `shutdown_signal` is cancelled.
pub fn start_metrics(
    address: impl ToSocketAddrs + Debug + Send + 'static,
    shutdown_signal: CancellationToken,
) {
    let app = Router::new().route("/metrics", get(serve_metrics));

    let address_text = format!("{address:?}");

    tokio::spawn(async move {
        let listener = match tokio::net::TcpListener::bind(address).await {
            Ok(listener) => listener,
            Err(error) => {
                error!("Failed to bind the metrics server to {address_text}: {error}");
                return;
            }
        };
        match listener.local_addr() {
            Ok(local_address) => info!("Starting to serve metrics on {local_address:?}"),
            Err(error) => error!("Failed to get the metrics server address: {error}"),
        }
        if let Err(error) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal.cancelled_owned())
            .await
        {
            error!("Error serving metrics: {error}");
        }
    });
}

async fn serve_metrics() -> Result<String, AxumError> {
    let metric_families = prometheus::gather();
    Ok(prometheus::TextEncoder::new()
        .encode_to_string(&metric_families)
        .map_err(anyhow::Error::from)?)
}

struct AxumError(anyhow::Error);

impl IntoResponse for AxumError {
    fn into_response(self) -> axum::response::Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Something went wrong: {}", self.0),
        )
            .into_response()
    }
}

impl<E> From<E> for AxumError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use std::{net::SocketAddr, time::Duration};

    use prometheus::{register_int_counter, IntCounter};

    use super::*;

    fn free_address() -> SocketAddr {
        std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
    }

    async fn get_metrics(address: SocketAddr) -> String {
        let url = format!("http://{address}/metrics");
        for _ in 0..100 {
            if let Ok(response) = reqwest::get(&url).await {
                return response.text().await.unwrap();
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("the metrics server never answered on {address}");
    }

    #[test_log::test(tokio::test(flavor = "multi_thread"))]
    async fn registered_counters_are_served() {
        let counter: IntCounter =
            register_int_counter!("monitoring_server_test_total", "A test counter").unwrap();
        counter.inc_by(3);
        let address = free_address();
        let shutdown_signal = CancellationToken::new();

        start_metrics(address, shutdown_signal.clone());

        let body = get_metrics(address).await;
        assert!(body.contains("monitoring_server_test_total 3"));
        shutdown_signal.cancel();
    }
}
