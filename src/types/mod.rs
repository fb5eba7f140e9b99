// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Workspace custom resource and logical cluster identity.

pub mod cluster;
pub mod workspace;

pub use cluster::LogicalCluster;
pub use workspace::{Condition, ConditionStatus, Workspace, WorkspaceSpec, WorkspaceStatus};
