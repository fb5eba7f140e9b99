// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! List, delete and verify the objects of a single resource type.

use crate::deletion::resource::{ObjectMetadataRef, ResourceClient, ResourceDescriptor};
use crate::error::{ReaperError, Result};
use crate::types::LogicalCluster;
use kube::discovery::verbs;
use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// What one resource type looked like after its sweep
#[derive(Debug, Default)]
pub struct TypeOutcome {
    /// Objects still listed after deletion was requested
    pub remaining: usize,
    pub error: Option<ReaperError>,
}

impl TypeOutcome {
    fn failed(remaining: usize, error: ReaperError) -> Self {
        Self {
            remaining,
            error: Some(error),
        }
    }
}

pub struct ResourceSweeper {
    client: Arc<dyn ResourceClient>,
}

impl ResourceSweeper {
    pub fn new(client: Arc<dyn ResourceClient>) -> Self {
        Self { client }
    }

    /// Run the list, delete, verify pass for one resource type.
    ///
    /// Failures are reported in the outcome instead of aborting, so a broken
    /// type never stops the caller from sweeping the others.
    #[instrument(skip(self, descriptor, cancel), fields(cluster = %cluster, resource = %descriptor))]
    pub async fn sweep(
        &self,
        cluster: &LogicalCluster,
        descriptor: &ResourceDescriptor,
        cancel: &CancellationToken,
    ) -> TypeOutcome {
        if !descriptor.is_deletable() {
            debug!("Skipping {}, it cannot be listed and deleted", descriptor);
            return TypeOutcome::default();
        }

        let listed = match cancellable(cancel, self.client.list(cluster, descriptor, None)).await {
            Ok(listed) => listed,
            Err(e) => {
                warn!("Failed to list {}: {}", descriptor, e);
                return TypeOutcome::failed(0, e);
            }
        };

        let mut error = None;
        if listed.is_empty() {
            debug!("No {} found", descriptor);
        } else {
            info!("Deleting {} {}", listed.len(), descriptor);
            error = self.delete_listed(cluster, descriptor, &listed, cancel).await;
            if error.as_ref().is_some_and(ReaperError::is_cancelled) {
                return TypeOutcome::failed(listed.len(), ReaperError::Cancelled);
            }
        }

        match cancellable(cancel, self.client.list(cluster, descriptor, None)).await {
            Ok(remaining) => {
                if !remaining.is_empty() {
                    debug!("{} {} still present", remaining.len(), descriptor);
                }
                TypeOutcome {
                    remaining: remaining.len(),
                    error,
                }
            }
            Err(e) => {
                warn!("Failed to verify deletion of {}: {}", descriptor, e);
                TypeOutcome::failed(listed.len(), error.unwrap_or(e))
            }
        }
    }

    /// Request deletion of everything in `listed`, returning the first failure.
    async fn delete_listed(
        &self,
        cluster: &LogicalCluster,
        descriptor: &ResourceDescriptor,
        listed: &[ObjectMetadataRef<'_>],
        cancel: &CancellationToken,
    ) -> Option<ReaperError> {
        let mut first_error = None;

        if descriptor.supports(verbs::DELETE_COLLECTION) {
            let scopes: Vec<Option<&str>> = if descriptor.namespaced {
                listed
                    .iter()
                    .filter_map(|o| o.namespace.as_deref())
                    .collect::<BTreeSet<_>>()
                    .into_iter()
                    .map(Some)
                    .collect()
            } else {
                vec![None]
            };

            for namespace in scopes {
                let deleted = cancellable(
                    cancel,
                    self.client.delete_collection(cluster, descriptor, namespace),
                )
                .await;
                if let Err(e) = deleted {
                    if e.is_cancelled() {
                        return Some(e);
                    }
                    warn!(
                        "Failed to delete {} in {}: {}",
                        descriptor,
                        namespace.unwrap_or("cluster scope"),
                        e
                    );
                    first_error.get_or_insert(e);
                }
            }
        } else {
            for object in listed {
                let deleted = cancellable(
                    cancel,
                    self.client.delete(
                        cluster,
                        descriptor,
                        object.namespace.as_deref(),
                        &object.name,
                    ),
                )
                .await;
                if let Err(e) = deleted {
                    if e.is_cancelled() {
                        return Some(e);
                    }
                    warn!("Failed to delete {} {}: {}", descriptor, object.name, e);
                    first_error.get_or_insert(e);
                }
            }
        }

        first_error
    }
}

/// Abort `fut` as soon as `cancel` fires
pub(crate) async fn cancellable<T>(
    cancel: &CancellationToken,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ReaperError::Cancelled),
        res = fut => res,
    }
}
