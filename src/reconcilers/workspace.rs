// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Workspace reconciler - owns the content finalizer and runs content deletion.

use crate::config::Config;
use crate::constants::{OPERATOR_NAME, WORKSPACE_FINALIZER};
use crate::deletion::WorkspaceDeleter;
use crate::error::{ReaperError, Result};
use crate::types::Workspace;
use futures::StreamExt;
use kube::{
    api::{Patch, PatchParams},
    runtime::{controller::Action, Controller},
    Api, Client, Resource, ResourceExt,
};
use kube_runtime::watcher::Config as WatcherConfig;
use serde_json::json;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

pub struct WorkspaceReconciler {
    client: Client,
    deleter: WorkspaceDeleter,
    config: Config,
    shutdown: CancellationToken,
}

impl WorkspaceReconciler {
    pub fn new(
        client: Client,
        deleter: WorkspaceDeleter,
        config: Config,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            client,
            deleter,
            config,
            shutdown,
        }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let workspaces: Api<Workspace> = Api::all(self.client.clone());
        let shutdown = self.shutdown.clone();
        let context = Arc::new(self);

        // stops taking new work on shutdown and waits for running sweeps to notice
        Controller::new(workspaces, WatcherConfig::default())
            .graceful_shutdown_on(shutdown.cancelled_owned())
            .run(reconcile, error_policy, context)
            .for_each(|res| async move {
                match res {
                    Ok(o) => debug!("Reconciled workspace: {:?}", o),
                    Err(e) => warn!("Reconciliation error: {:?}", e),
                }
            })
            .await;

        Ok(())
    }
}

async fn reconcile(workspace: Arc<Workspace>, ctx: Arc<WorkspaceReconciler>) -> Result<Action> {
    let name = workspace.name_any();
    let workspaces: Api<Workspace> = Api::all(ctx.client.clone());

    if !workspace.is_deleting() {
        if !workspace.has_finalizer(WORKSPACE_FINALIZER) {
            info!("Adding content finalizer to workspace {}", name);
            let mut finalizers = workspace.finalizers().to_vec();
            finalizers.push(WORKSPACE_FINALIZER.to_string());
            patch_finalizers(&workspaces, &workspace, finalizers).await?;
        }
        return Ok(Action::await_change());
    }

    if !workspace.has_finalizer(WORKSPACE_FINALIZER) {
        debug!("Workspace {} has no content left to guard", name);
        return Ok(Action::await_change());
    }

    let mut swept = (*workspace).clone();
    let result = ctx.deleter.delete(&mut swept, &ctx.shutdown).await;

    // a status write bumps the resourceVersion the finalizer patch must carry
    let updated = if swept.status != workspace.status {
        debug!("Updating conditions of workspace {}", name);
        let status = json!({
            "apiVersion": Workspace::api_version(&()),
            "kind": Workspace::kind(&()),
            "status": swept.status,
        });
        let updated = workspaces
            .patch_status(
                &name,
                &PatchParams::apply(OPERATOR_NAME).force(),
                &Patch::Apply(&status),
            )
            .await?;
        Some(updated)
    } else {
        None
    };

    match result {
        Ok(()) => {
            info!("Workspace {} is empty, removing content finalizer", name);
            let latest = updated.as_ref().unwrap_or(workspace.as_ref());
            let finalizers = latest
                .finalizers()
                .iter()
                .filter(|f| *f != WORKSPACE_FINALIZER)
                .cloned()
                .collect();
            patch_finalizers(&workspaces, latest, finalizers).await?;
            Ok(Action::await_change())
        }
        Err(e) if e.is_resources_remaining() => {
            info!("Workspace {}: {}, checking again later", name, e);
            Ok(Action::requeue(ctx.config.remaining_requeue))
        }
        Err(e) => Err(e),
    }
}

/// Replace the finalizer list, failing if the workspace changed meanwhile
async fn patch_finalizers(
    workspaces: &Api<Workspace>,
    workspace: &Workspace,
    finalizers: Vec<String>,
) -> Result<()> {
    let patch = json!({
        "metadata": {
            "resourceVersion": workspace.resource_version(),
            "finalizers": finalizers,
        }
    });
    workspaces
        .patch(
            &workspace.name_any(),
            &PatchParams::default(),
            &Patch::Merge(&patch),
        )
        .await?;
    Ok(())
}

fn error_policy(
    workspace: Arc<Workspace>,
    error: &ReaperError,
    ctx: Arc<WorkspaceReconciler>,
) -> Action {
    if error.is_cancelled() {
        debug!("Content deletion of {} interrupted", workspace.name_any());
    } else {
        error!("Reconciliation error for {}: {}", workspace.name_any(), error);
    }
    Action::requeue(ctx.config.error_requeue)
}
