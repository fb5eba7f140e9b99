// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! CRD availability checking utilities

use crate::constants::crd::{POLL_INTERVAL_SECS, POLL_MAX_INTERVAL_SECS};
use crate::error::Result;
use crate::types::Workspace;
use kube::core::GroupVersion;
use kube::discovery::pinned_group;
use kube::{Client, Resource};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// Wait for the Workspace CRD to be served.
/// This uses exponential backoff starting at POLL_INTERVAL_SECS seconds.
pub async fn wait_for_workspace_crd(client: &Client) -> Result<()> {
    let mut interval = POLL_INTERVAL_SECS;
    let api_version = Workspace::api_version(&());

    loop {
        match check_workspace_crd_exists(client).await {
            Ok(true) => {
                info!("Workspace CRD ({}) is available", api_version);
                return Ok(());
            }
            Ok(false) => {
                info!(
                    "Workspace CRD ({}) not yet available, waiting {} seconds...",
                    api_version, interval
                );
            }
            Err(e) => {
                warn!(
                    "Error checking for Workspace CRD: {}, retrying in {} seconds...",
                    e, interval
                );
            }
        }

        sleep(Duration::from_secs(interval)).await;

        // Exponential backoff with max cap
        interval = (interval * 2).min(POLL_MAX_INTERVAL_SECS);
    }
}

async fn check_workspace_crd_exists(client: &Client) -> Result<bool> {
    let gv = GroupVersion::gv(&Workspace::group(&()), &Workspace::version(&()));
    let group = match pinned_group(client, &gv).await {
        Ok(group) => group,
        Err(kube::Error::Api(err)) if err.code == 404 => return Ok(false),
        Err(e) => return Err(e.into()),
    };

    Ok(group
        .recommended_resources()
        .iter()
        .any(|(ar, _)| ar.kind == Workspace::kind(&())))
}
