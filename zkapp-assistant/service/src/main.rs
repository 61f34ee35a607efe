// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use anyhow::Context as _;
use axum::http::HeaderValue;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::info;
use url::Url;
use zkapp_assistant_server::{AssistantConfig, AssistantService, OpenAiClient};
use zkapp_base::util::listen_for_shutdown_signals;

#[derive(Parser)]
#[command(
    name = "zkapp-assistant",
    about = "Run an HTTP service streaming generated zkApp contracts as server-sent events"
)]
struct AssistantOptions {
    /// The port on which to run the server
    #[arg(long, default_value = "5099")]
    port: u16,

    /// The port for prometheus to scrape.
    #[cfg(with_metrics)]
    #[arg(long, default_value = "9091")]
    metrics_port: u16,

    /// The credential of the chat-completion service.
    #[arg(long, env = "DEEPSEEK_API_KEY", hide_env_values = true)]
    api_key: String,

    /// The base URL of the OpenAI-compatible chat-completion service.
    #[arg(long, default_value = "https://api.siliconflow.cn/v1")]
    base_url: Url,

    /// The model generating the contracts.
    #[arg(long, default_value = "deepseek-ai/DeepSeek-V2.5")]
    model: String,

    /// An origin allowed to call the service from a browser. May be repeated.
    #[arg(
        long = "allowed-origin",
        default_value = "http://localhost:3000",
        value_parser = parse_allowed_origin
    )]
    allowed_origins: Vec<HeaderValue>,
}

/// Parses an origin for the CORS allow-list, which cannot hold the `*` wildcard.
fn parse_allowed_origin(origin: &str) -> Result<HeaderValue, String> {
    if origin.trim() == "*" {
        return Err("the wildcard origin `*` is not allowed; list each origin instead".to_owned());
    }
    HeaderValue::from_str(origin).map_err(|error| format!("invalid origin {origin:?}: {error}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    zkapp_base::tracing::init("zkapp-assistant");

    let options = AssistantOptions::parse();
    info!(
        base_url = %options.base_url,
        model = %options.model,
        "Starting the assistant relay"
    );

    let completion = OpenAiClient::new(options.base_url, options.api_key, options.model);
    let config = AssistantConfig {
        port: options.port,
        #[cfg(with_metrics)]
        metrics_port: options.metrics_port,
        allowed_origins: options.allowed_origins,
    };
    let service = AssistantService::new(config, Arc::new(completion));

    let cancellation_token = CancellationToken::new();
    let child_token = cancellation_token.child_token();
    tokio::spawn(listen_for_shutdown_signals(cancellation_token));
    service
        .run(child_token)
        .await
        .context("the assistant relay stopped")?;

    Ok(())
}
