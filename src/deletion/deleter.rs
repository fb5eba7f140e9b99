// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Entry point for sweeping all content out of a deleted workspace.

use crate::conditions;
use crate::constants::conditions::{
    CONTENT_DELETED, DELETION_CONTENT_SUCCESS, REASON_DELETION_FAILED, REASON_RESOURCES_REMAIN,
};
use crate::constants::WORKSPACE_FINALIZER;
use crate::deletion::resource::{Discovered, DiscoveryProvider, ResourceClient};
use crate::deletion::sweeper::{ResourceSweeper, TypeOutcome};
use crate::error::{ReaperError, Result};
use crate::types::Workspace;
use futures::{stream, FutureExt, StreamExt};
use kube::ResourceExt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

pub struct WorkspaceDeleter {
    discovery: Arc<dyn DiscoveryProvider>,
    sweeper: ResourceSweeper,
    concurrency: usize,
}

impl WorkspaceDeleter {
    pub fn new(discovery: Arc<dyn DiscoveryProvider>, client: Arc<dyn ResourceClient>) -> Self {
        Self {
            discovery,
            sweeper: ResourceSweeper::new(client),
            concurrency: 1,
        }
    }

    /// Sweep this many resource types at the same time
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Delete every object in the workspace's logical cluster and record the
    /// outcome in its `DeletionContentSuccess` and `ContentDeleted` conditions.
    ///
    /// Only acts on workspaces that are being deleted and still carry the
    /// content finalizer. `Ok(())` means nothing is left and the finalizer may
    /// be removed; every error, including [`ReaperError::ResourcesRemaining`],
    /// means the workspace has to be swept again later. A cancelled sweep
    /// returns [`ReaperError::Cancelled`] and leaves the conditions as they were.
    #[instrument(skip(self, workspace, cancel), fields(workspace = %workspace.name_any()))]
    pub async fn delete(
        &self,
        workspace: &mut Workspace,
        cancel: &CancellationToken,
    ) -> Result<()> {
        if !workspace.is_deleting() || !workspace.has_finalizer(WORKSPACE_FINALIZER) {
            debug!("Workspace is not waiting for content deletion");
            return Ok(());
        }

        let cluster = workspace.content_cluster();
        info!("Deleting content of logical cluster {}", cluster);

        let Discovered {
            resources,
            error: discovery_err,
        } = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ReaperError::Cancelled),
            discovered = self.discovery.discover(&cluster) => discovered,
        };
        if let Some(e) = &discovery_err {
            warn!("Discovery was incomplete, sweeping what was found: {}", e);
        }

        // `buffered` yields in descriptor order, whatever order the sweeps finish in
        let outcomes: Vec<TypeOutcome> = stream::iter(0..resources.len())
            .map(|i| self.sweeper.sweep(&cluster, &resources[i], cancel).boxed())
            .buffered(self.concurrency)
            .collect()
            .await;

        if cancel.is_cancelled()
            || outcomes
                .iter()
                .any(|o| o.error.as_ref().is_some_and(ReaperError::is_cancelled))
        {
            info!("Content deletion cancelled");
            return Err(ReaperError::Cancelled);
        }

        let mut total_remaining = 0;
        let mut remaining_by_type = Vec::new();
        let mut sweep_err = None;
        for (descriptor, outcome) in resources.iter().zip(outcomes) {
            total_remaining += outcome.remaining;
            if outcome.remaining > 0 {
                remaining_by_type.push(format!("{} ({})", descriptor, outcome.remaining));
            }
            if let Some(e) = outcome.error {
                if sweep_err.is_none() {
                    sweep_err = Some(e);
                } else {
                    debug!("Additional failure sweeping {}: {}", descriptor, e);
                }
            }
        }

        let result = match (discovery_err, sweep_err) {
            (Some(e), _) | (None, Some(e)) => Err(e),
            (None, None) if total_remaining > 0 => Err(ReaperError::ResourcesRemaining {
                count: total_remaining,
            }),
            (None, None) => Ok(()),
        };

        let workspace_conditions = workspace.conditions_mut();
        match &result {
            Err(e) if !e.is_resources_remaining() => {
                conditions::mark_false(
                    workspace_conditions,
                    DELETION_CONTENT_SUCCESS,
                    REASON_DELETION_FAILED,
                    e.to_string(),
                );
            }
            _ => {
                conditions::mark_true(workspace_conditions, DELETION_CONTENT_SUCCESS);
            }
        }
        if total_remaining == 0 {
            conditions::mark_true(workspace_conditions, CONTENT_DELETED);
        } else {
            conditions::mark_false(
                workspace_conditions,
                CONTENT_DELETED,
                REASON_RESOURCES_REMAIN,
                format!(
                    "{} objects remaining: {}",
                    total_remaining,
                    remaining_by_type.join(", ")
                ),
            );
        }

        match &result {
            Ok(()) => info!("All content deleted from {}", cluster),
            Err(e) => info!("Content deletion of {} not finished: {}", cluster, e),
        }
        result
    }
}
