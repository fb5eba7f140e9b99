// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes-backed discovery, per-cluster clients and CRD availability.

pub mod client;
pub mod crd;
pub mod discovery;
pub mod metadata;

pub use client::{ClusterClients, ConfigClusterClients};
pub use crd::wait_for_workspace_crd;
pub use discovery::KubeDiscovery;
pub use metadata::KubeResourceClient;
