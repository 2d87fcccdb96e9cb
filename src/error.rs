//! Error types for the trellis reconciliation engine.
//!
//! This module provides the error hierarchy for every stage of a template
//! sync: live-state collection, diff planning, conflict detection, and
//! plan application. Every error is surfaced to the caller; the engine
//! performs no retries of its own.

use thiserror::Error;

use crate::resource::{ResourceKey, ResourceKind, ResourceVersion};

/// The main error type for trellis operations.
#[derive(Debug, Error)]
pub enum TrellisError {
    /// Resource store errors.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Cross-cluster ownership conflicts.
    #[error("Ownership conflict: {0}")]
    Conflict(#[from] ConflictError),

    /// Planning errors.
    #[error("Planning error: {0}")]
    Plan(#[from] PlanError),

    /// Plan application errors.
    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),
}

/// Resource store errors.
///
/// Any of these raised while gathering live state is a collection
/// failure: the caller must not diff against a partial actual set.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The resource does not exist.
    #[error("Resource not found: {key}")]
    NotFound {
        /// Key of the missing resource.
        key: ResourceKey,
    },

    /// A resource with the same key already exists.
    #[error("Resource already exists: {key}")]
    AlreadyExists {
        /// Key of the existing resource.
        key: ResourceKey,
    },

    /// Optimistic concurrency check failed on write.
    #[error("Version conflict on {key}: expected {expected}, found {found}")]
    VersionConflict {
        /// Key of the contended resource.
        key: ResourceKey,
        /// Version the writer based its change on.
        expected: ResourceVersion,
        /// Version currently held by the store.
        found: ResourceVersion,
    },

    /// Backend I/O failure.
    #[error("Store backend error: {message}")]
    Backend {
        /// Description of the backend failure.
        message: String,
    },
}

/// Cross-cluster ownership conflicts.
///
/// Raised when a resource in a plan's scope belongs to a different
/// cluster than the one being synced, whether it came from the template
/// or from the store. Conflicts are fatal to the current planning pass
/// and are never auto-resolved.
#[derive(Debug, Error)]
pub enum ConflictError {
    /// A resource is labeled for a different cluster.
    #[error("Resource {key} is labeled for cluster '{found}', not '{expected}'")]
    ClusterMismatch {
        /// Key of the conflicting resource.
        key: ResourceKey,
        /// Cluster name found in the resource's labels.
        found: String,
        /// Cluster the plan is being computed for.
        expected: String,
    },

    /// A non-root resource carries no cluster label at all.
    #[error("Resource {key} carries no cluster label (planning cluster '{expected}')")]
    MissingClusterLabel {
        /// Key of the conflicting resource.
        key: ResourceKey,
        /// Cluster the plan is being computed for.
        expected: String,
    },

    /// A would-be create collides with a resource owned by another cluster.
    #[error(
        "Cannot create {key}: a resource with this key already belongs to cluster '{found}', not '{expected}'"
    )]
    OwnedByOtherCluster {
        /// Key of the conflicting resource.
        key: ResourceKey,
        /// Cluster name found on the existing resource.
        found: String,
        /// Cluster the plan is being computed for.
        expected: String,
    },

    /// A would-be create collides with a resource owned by no cluster.
    #[error(
        "Cannot create {key}: a resource with this key exists but is not owned by any cluster (planning '{expected}')"
    )]
    OwnedOutsideCluster {
        /// Key of the conflicting resource.
        key: ResourceKey,
        /// Cluster the plan is being computed for.
        expected: String,
    },
}

/// Planning errors.
///
/// These indicate version skew or translator breakage rather than bad
/// cluster state, and abort the planning pass without producing a plan.
#[derive(Debug, Error)]
pub enum PlanError {
    /// The ordering table has no priority for a resource kind.
    #[error("No canonical priority for resource kind '{kind}'; translator and planner are out of sync")]
    UnrankedKind {
        /// The kind missing from the ordering table.
        kind: ResourceKind,
    },

    /// The expected set contains the same key twice.
    #[error("Expected set contains duplicate resource key: {key}")]
    DuplicateExpected {
        /// The duplicated key.
        key: ResourceKey,
    },
}

/// Plan application errors.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A single plan operation failed against the store.
    #[error("Failed to {operation} {key}: {reason}")]
    ApplyFailed {
        /// Operation being applied ("create", "update", or "destroy").
        operation: String,
        /// Key of the resource involved.
        key: ResourceKey,
        /// Reason for the failure.
        reason: String,
    },
}

/// Result type alias for trellis operations.
pub type Result<T> = std::result::Result<T, TrellisError>;

impl TrellisError {
    /// Returns true if this error is a cross-cluster ownership conflict.
    ///
    /// Conflicts require operator attention (a template is claiming
    /// identifiers another cluster holds) and must not be retried blindly.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

impl StoreError {
    /// Creates a backend error with the given message.
    #[must_use]
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}

impl SyncError {
    /// Creates an apply failure for the given operation and resource.
    #[must_use]
    pub fn apply_failed(
        operation: impl Into<String>,
        key: ResourceKey,
        reason: impl Into<String>,
    ) -> Self {
        Self::ApplyFailed {
            operation: operation.into(),
            key,
            reason: reason.into(),
        }
    }
}
