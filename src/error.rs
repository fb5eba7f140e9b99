// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReaperError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Discovery failed for cluster {cluster}: {message}")]
    Discovery { cluster: String, message: String },

    #[error("Failed to {verb} {resource}: {message}")]
    Operation {
        verb: String,
        resource: String,
        message: String,
    },

    /// Objects are still present after the sweep. Not a fault, the workspace
    /// has to be swept again later.
    #[error("Some content in the workspace remains: {count} objects")]
    ResourcesRemaining { count: usize },

    #[error("Workspace content deletion was cancelled")]
    Cancelled,

    #[error("Failed to create cluster client: {0}")]
    ClientError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

impl ReaperError {
    pub fn operation(verb: &str, resource: impl ToString, err: impl std::fmt::Display) -> Self {
        ReaperError::Operation {
            verb: verb.to_string(),
            resource: resource.to_string(),
            message: err.to_string(),
        }
    }

    pub fn is_resources_remaining(&self) -> bool {
        matches!(self, ReaperError::ResourcesRemaining { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ReaperError::Cancelled)
    }
}

pub type Result<T> = std::result::Result<T, ReaperError>;
