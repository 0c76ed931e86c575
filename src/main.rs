// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Parser;
use sentence_embed_node::{
    api::{self, AppState},
    config::{Args, ServiceConfig},
    embeddings::{EmbeddingModel, OnnxEmbeddingModel},
    version,
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // .env must be loaded before clap reads env fallbacks
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run(Args::parse()).await {
        error!("Fatal: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    info!("Starting {}", version::get_version_string());
    info!("Features: {}", version::get_features_string());

    let config = ServiceConfig::load(&args).context("Invalid configuration")?;
    let addr = config.server.socket_addr()?;

    match &config.model.model_dir {
        Some(dir) => info!("Loading {} from {}...", config.model.repo, dir.display()),
        None => info!("Loading {}...", config.model.repo),
    }

    let model = OnnxEmbeddingModel::load(&config.model)
        .await
        .context("Failed to load embedding model")?;
    info!(
        model = model.model_name(),
        dimension = model.dimension(),
        max_seq_length = model.max_length(),
        "Model loaded successfully"
    );

    let state = AppState::new(Arc::new(model));

    info!("  Embed:  POST http://{}/embed", addr);
    info!("  Health: GET  http://{}/health", addr);

    api::start_server(addr, state, api::shutdown_signal()).await?;

    info!("Embedding model released, goodbye");
    Ok(())
}
