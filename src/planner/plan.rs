//! Sync plan types.
//!
//! A plan is the complete set of store operations that would move a
//! cluster's live state to what its template describes. Plans are inert
//! values: computing one never writes to the store, and applying one is
//! the caller's (or the syncer's) job.

use serde::Serialize;

use crate::resource::Resource;

/// Number of deletion phases in a plan.
///
/// Phase 0 must be applied to completion before phase 1 begins.
pub const DESTROY_PHASES: usize = 2;

/// An update of one resource from its stored form to the desired form.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UpdatePair {
    /// The desired document, already carrying the stored version so the
    /// write passes the store's optimistic concurrency check.
    pub expected: Resource,
    /// The stored document being replaced.
    pub actual: Resource,
}

/// A complete sync plan for one cluster.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SyncPlan {
    /// Cluster the plan was computed for.
    pub cluster: String,
    /// Resources to create, in apply order.
    pub to_create: Vec<Resource>,
    /// Resources to update, in apply order.
    pub to_update: Vec<UpdatePair>,
    /// Resources to destroy, grouped into phases applied in order.
    pub to_destroy: [Vec<Resource>; DESTROY_PHASES],
}

impl SyncPlan {
    /// Creates an empty plan for the given cluster.
    #[must_use]
    pub fn empty(cluster: impl Into<String>) -> Self {
        Self {
            cluster: cluster.into(),
            to_create: Vec::new(),
            to_update: Vec::new(),
            to_destroy: [Vec::new(), Vec::new()],
        }
    }

    /// Returns true if the plan changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty() && self.to_update.is_empty() && self.destroy_count() == 0
    }

    /// Number of resources to create.
    #[must_use]
    pub fn create_count(&self) -> usize {
        self.to_create.len()
    }

    /// Number of resources to update.
    #[must_use]
    pub fn update_count(&self) -> usize {
        self.to_update.len()
    }

    /// Number of resources to destroy, across all phases.
    #[must_use]
    pub fn destroy_count(&self) -> usize {
        self.to_destroy.iter().map(Vec::len).sum()
    }

    /// Total number of store operations the plan implies.
    #[must_use]
    pub fn operation_count(&self) -> usize {
        self.create_count() + self.update_count() + self.destroy_count()
    }
}

impl std::fmt::Display for SyncPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "No changes for cluster '{}'", self.cluster);
        }

        writeln!(
            f,
            "Sync plan for cluster '{}' ({} operations):",
            self.cluster,
            self.operation_count()
        )?;
        for resource in &self.to_create {
            writeln!(f, "  create {}", resource.key())?;
        }
        for pair in &self.to_update {
            writeln!(
                f,
                "  update {} (version {})",
                pair.expected.key(),
                pair.actual.version
            )?;
        }
        for (phase, resources) in self.to_destroy.iter().enumerate() {
            for resource in resources {
                writeln!(f, "  destroy {} (phase {phase})", resource.key())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{ResourceKind, ResourceVersion};

    #[test]
    fn test_empty_plan() {
        let plan = SyncPlan::empty("talos-default");
        assert!(plan.is_empty());
        assert_eq!(plan.operation_count(), 0);
        assert_eq!(plan.to_string(), "No changes for cluster 'talos-default'");
    }

    #[test]
    fn test_counts_span_destroy_phases() {
        let mut plan = SyncPlan::empty("talos-default");
        plan.to_create
            .push(Resource::new("default", ResourceKind::MachineSet, "workers"));
        plan.to_destroy[0].push(Resource::new(
            "default",
            ResourceKind::MachineSetNode,
            "worker-1",
        ));
        plan.to_destroy[1].push(Resource::new("default", ResourceKind::Cluster, "old"));

        assert!(!plan.is_empty());
        assert_eq!(plan.create_count(), 1);
        assert_eq!(plan.update_count(), 0);
        assert_eq!(plan.destroy_count(), 2);
        assert_eq!(plan.operation_count(), 3);
    }

    #[test]
    fn test_display_lists_each_operation() {
        let mut actual = Resource::new("default", ResourceKind::ConfigPatch, "400-cm");
        actual.version = ResourceVersion(4);
        let expected = actual.clone();

        let mut plan = SyncPlan::empty("talos-default");
        plan.to_update.push(UpdatePair { expected, actual });
        plan.to_destroy[1].push(Resource::new("default", ResourceKind::Cluster, "stale"));

        let rendered = plan.to_string();
        assert!(rendered.contains("2 operations"));
        assert!(rendered.contains("update default/config-patch/400-cm (version 4)"));
        assert!(rendered.contains("destroy default/cluster/stale (phase 1)"));
    }
}
