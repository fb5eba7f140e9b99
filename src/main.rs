// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use kube::{Client, Config as KConfig};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use workspace_reaper::config::Config;
use workspace_reaper::deletion::WorkspaceDeleter;
use workspace_reaper::kubernetes::{
    wait_for_workspace_crd, ConfigClusterClients, KubeDiscovery, KubeResourceClient,
};
use workspace_reaper::reconcilers::WorkspaceReconciler;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting workspace reaper");

    let config = Config::from_env()?;
    info!(
        "Configuration loaded: sweep_concurrency={}, remaining_requeue={:?}",
        config.sweep_concurrency, config.remaining_requeue
    );

    let kube_config = KConfig::infer().await?;
    let client = Client::try_from(kube_config.clone())?;
    info!("Connected to {}", kube_config.cluster_url);

    info!("Waiting for Workspace CRD to become available...");
    wait_for_workspace_crd(&client).await?;

    let clients = Arc::new(ConfigClusterClients::new(kube_config));
    let deleter = WorkspaceDeleter::new(
        Arc::new(KubeDiscovery::new(clients.clone())),
        Arc::new(KubeResourceClient::new(clients)),
    )
    .with_concurrency(config.sweep_concurrency);

    let shutdown = CancellationToken::new();
    let reconciler = WorkspaceReconciler::new(client, deleter, config, shutdown.clone());

    info!("Starting workspace reconciler...");
    let run = reconciler.run();
    tokio::pin!(run);

    tokio::select! {
        res = &mut run => {
            res?;
            warn!("Workspace reconciler stopped unexpectedly");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down, cancelling in-flight sweeps");
            shutdown.cancel();
            run.await?;
            info!("Workspace reconciler stopped");
        }
    }

    Ok(())
}
