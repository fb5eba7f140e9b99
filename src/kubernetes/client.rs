// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Clients scoped to a single logical cluster

use crate::error::{ReaperError, Result};
use crate::types::LogicalCluster;
use http::Uri;
use kube::{Client, Config as KConfig};
use tracing::debug;

/// Hands out a client that only sees the objects of one logical cluster
pub trait ClusterClients: Send + Sync {
    fn client_for(&self, cluster: &LogicalCluster) -> Result<Client>;
}

/// Derives per-cluster clients from one base configuration by pointing the
/// cluster URL at `/clusters/<cluster>`.
pub struct ConfigClusterClients {
    config: KConfig,
}

impl ConfigClusterClients {
    pub fn new(config: KConfig) -> Self {
        Self { config }
    }
}

impl ClusterClients for ConfigClusterClients {
    fn client_for(&self, cluster: &LogicalCluster) -> Result<Client> {
        let mut c = self.config.clone();
        c.cluster_url = cluster_url(&self.config.cluster_url, cluster)?;
        debug!("Using {} for logical cluster {}", c.cluster_url, cluster);

        Client::try_from(c)
            .map_err(|e| ReaperError::ClientError(format!("Failed to create client: {}", e)))
    }
}

/// Rewrite `base` so it addresses `cluster`, replacing any cluster it already
/// points at.
pub fn cluster_url(base: &Uri, cluster: &LogicalCluster) -> Result<Uri> {
    let base = base.to_string();
    let base = base.trim_end_matches('/');
    let server = base
        .find("/clusters/")
        .map(|i| &base[..i])
        .unwrap_or(base);

    format!("{}{}", server, cluster.url_path())
        .parse()
        .map_err(|e| ReaperError::ClientError(format!("Invalid URL: {}", e)))
}
