// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Resource descriptors and the two interfaces the sweep is built on.

use crate::error::{ReaperError, Result};
use crate::types::LogicalCluster;
use async_trait::async_trait;
use kube::discovery::verbs;
use std::collections::BTreeSet;
use std::fmt;

/// An API resource type served for a logical cluster
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceDescriptor {
    pub group: String,
    pub version: String,
    pub kind: String,
    pub plural: String,
    pub namespaced: bool,
    pub verbs: BTreeSet<String>,
}

impl ResourceDescriptor {
    pub fn supports(&self, verb: &str) -> bool {
        self.verbs.contains(verb)
    }

    /// Whether the sweep can do anything with this type at all
    pub fn is_deletable(&self) -> bool {
        self.supports(verbs::LIST)
            && (self.supports(verbs::DELETE_COLLECTION) || self.supports(verbs::DELETE))
    }

    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }
}

impl fmt::Display for ResourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group.is_empty() {
            f.write_str(&self.plural)
        } else {
            write!(f, "{}.{}", self.plural, self.group)
        }
    }
}

/// A listed object of some resource type
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectMetadataRef<'a> {
    pub descriptor: &'a ResourceDescriptor,
    pub name: String,
    /// `None` for cluster-scoped objects
    pub namespace: Option<String>,
}

/// Result of discovering the resource types of one logical cluster.
///
/// Discovery is best-effort: `error` may be set while `resources` still holds
/// everything that could be discovered.
#[derive(Debug, Default)]
pub struct Discovered {
    pub resources: Vec<ResourceDescriptor>,
    pub error: Option<ReaperError>,
}

#[async_trait]
pub trait DiscoveryProvider: Send + Sync {
    async fn discover(&self, cluster: &LogicalCluster) -> Discovered;
}

/// Metadata-level access to objects of a runtime-discovered resource type
#[async_trait]
pub trait ResourceClient: Send + Sync {
    /// List objects, across all namespaces when `namespace` is `None`
    async fn list<'a>(
        &self,
        cluster: &LogicalCluster,
        descriptor: &'a ResourceDescriptor,
        namespace: Option<&str>,
    ) -> Result<Vec<ObjectMetadataRef<'a>>>;

    async fn delete_collection(
        &self,
        cluster: &LogicalCluster,
        descriptor: &ResourceDescriptor,
        namespace: Option<&str>,
    ) -> Result<()>;

    async fn delete(
        &self,
        cluster: &LogicalCluster,
        descriptor: &ResourceDescriptor,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<()>;
}
