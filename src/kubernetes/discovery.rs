// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Best-effort API discovery for a logical cluster

use crate::deletion::{Discovered, DiscoveryProvider, ResourceDescriptor};
use crate::error::ReaperError;
use crate::kubernetes::client::ClusterClients;
use crate::types::LogicalCluster;
use async_trait::async_trait;
use kube::core::GroupVersion;
use kube::discovery::{pinned_group, ApiCapabilities, ApiResource, Scope};
use kube::Client;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Discovers resource types group by group, so one unavailable API group
/// only hides its own resources.
pub struct KubeDiscovery {
    clients: Arc<dyn ClusterClients>,
}

impl KubeDiscovery {
    pub fn new(clients: Arc<dyn ClusterClients>) -> Self {
        Self { clients }
    }
}

#[async_trait]
impl DiscoveryProvider for KubeDiscovery {
    #[instrument(skip(self), fields(cluster = %cluster))]
    async fn discover(&self, cluster: &LogicalCluster) -> Discovered {
        let mut discovered = Discovered::default();
        let client = match self.clients.client_for(cluster) {
            Ok(client) => client,
            Err(e) => {
                discovered.error = Some(discovery_error(cluster, e));
                return discovered;
            }
        };

        let group_versions = group_versions(&client, cluster, &mut discovered).await;
        for gv in group_versions {
            match pinned_group(&client, &gv).await {
                Ok(group) => {
                    discovered.resources.extend(
                        group
                            .recommended_resources()
                            .into_iter()
                            .map(|(ar, caps)| descriptor(ar, caps)),
                    );
                }
                Err(e) => {
                    warn!("Failed to discover {}: {}", gv.api_version(), e);
                    discovered.error.get_or_insert_with(|| {
                        discovery_error(cluster, format!("{}: {}", gv.api_version(), e))
                    });
                }
            }
        }

        debug!("Discovered {} resource types", discovered.resources.len());
        discovered
    }
}

/// Core versions first, then every group at its preferred version
async fn group_versions(
    client: &Client,
    cluster: &LogicalCluster,
    discovered: &mut Discovered,
) -> Vec<GroupVersion> {
    let mut gvs = Vec::new();

    match client.list_core_api_versions().await {
        Ok(core) => gvs.extend(core.versions.iter().map(|v| GroupVersion::gv("", v))),
        Err(e) => {
            warn!("Failed to list core API versions: {}", e);
            discovered
                .error
                .get_or_insert_with(|| discovery_error(cluster, e));
        }
    }

    match client.list_api_groups().await {
        Ok(list) => {
            for group in list.groups {
                let version = group
                    .preferred_version
                    .as_ref()
                    .or_else(|| group.versions.first())
                    .map(|v| v.version.clone());
                if let Some(version) = version {
                    gvs.push(GroupVersion::gv(&group.name, &version));
                }
            }
        }
        Err(e) => {
            warn!("Failed to list API groups: {}", e);
            discovered
                .error
                .get_or_insert_with(|| discovery_error(cluster, e));
        }
    }

    gvs
}

fn descriptor(ar: ApiResource, caps: ApiCapabilities) -> ResourceDescriptor {
    ResourceDescriptor {
        group: ar.group,
        version: ar.version,
        kind: ar.kind,
        plural: ar.plural,
        namespaced: caps.scope == Scope::Namespaced,
        verbs: caps.operations.into_iter().collect(),
    }
}

fn discovery_error(cluster: &LogicalCluster, err: impl std::fmt::Display) -> ReaperError {
    ReaperError::Discovery {
        cluster: cluster.to_string(),
        message: err.to_string(),
    }
}
