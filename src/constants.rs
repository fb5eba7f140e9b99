// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Finalizer that blocks workspace removal until its content is gone
pub const WORKSPACE_FINALIZER: &str = "tenancy.reaper.io/content-deletion";

/// The operator name used for server-side apply
pub const OPERATOR_NAME: &str = "workspace-reaper";

/// Logical cluster the workspaces live in when not annotated otherwise
pub const ROOT_CLUSTER: &str = "root";

/// Kubernetes annotation keys used by the reaper
pub mod annotations {
    /// Logical cluster that holds the workspace object
    pub const CLUSTER: &str = "tenancy.reaper.io/cluster";
}

/// Workspace status condition types and reasons
pub mod conditions {
    /// Whether the last sweep ran without discovery or API failures
    pub const DELETION_CONTENT_SUCCESS: &str = "DeletionContentSuccess";
    /// Whether the last sweep observed zero remaining objects
    pub const CONTENT_DELETED: &str = "ContentDeleted";

    pub const REASON_DELETION_FAILED: &str = "ContentDeletionFailed";
    pub const REASON_RESOURCES_REMAIN: &str = "SomeResourcesRemain";
}

/// CRD polling configuration
pub mod crd {
    /// Initial polling interval in seconds when waiting for CRD
    pub const POLL_INTERVAL_SECS: u64 = 10;
    /// Maximum polling interval in seconds (exponential backoff cap)
    pub const POLL_MAX_INTERVAL_SECS: u64 = 60;
}
