// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::fmt;

/// Path of a logical cluster, e.g. `root:org:team`
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LogicalCluster(String);

impl LogicalCluster {
    pub const SEPARATOR: char = ':';

    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// The child cluster named `name` below this one
    pub fn join(&self, name: &str) -> Self {
        Self(format!("{}{}{}", self.0, Self::SEPARATOR, name))
    }

    /// URL path prefix under which the API server serves this cluster
    pub fn url_path(&self) -> String {
        format!("/clusters/{}", self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LogicalCluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
