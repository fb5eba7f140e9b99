// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Print the Workspace CRD manifest

use kube::CustomResourceExt;
use workspace_reaper::types::Workspace;

fn main() -> anyhow::Result<()> {
    print!("{}", serde_yaml::to_string(&Workspace::crd())?);
    Ok(())
}
