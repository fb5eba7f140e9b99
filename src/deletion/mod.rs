// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Workspace content deletion: discover resource types, sweep each one, report.

pub mod deleter;
pub mod resource;
pub mod sweeper;

pub use deleter::WorkspaceDeleter;
pub use resource::{
    Discovered, DiscoveryProvider, ObjectMetadataRef, ResourceClient, ResourceDescriptor,
};
pub use sweeper::{ResourceSweeper, TypeOutcome};
