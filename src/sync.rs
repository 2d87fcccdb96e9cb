//! Template sync orchestration.
//!
//! This module ties the engine together: collect live state, plan, and
//! apply. It is the surface a CLI or service embeds; the lower-level
//! pieces stay usable on their own for callers that bring their own
//! apply loop.

use tracing::{debug, info};

use crate::collector::LiveStateCollector;
use crate::error::{Result, SyncError};
use crate::planner::{DiffPlanner, SyncPlan};
use crate::resource::Resource;
use crate::store::ResourceStore;

/// Applies cluster templates to a resource store.
pub struct Syncer<'a, S: ?Sized> {
    /// Store plans are computed against and applied to.
    store: &'a S,
    /// Live-state collector.
    collector: LiveStateCollector<'a, S>,
    /// Diff planner.
    planner: DiffPlanner,
}

/// Result of applying one sync plan.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SyncReport {
    /// Cluster the plan was applied to.
    pub cluster: String,
    /// Number of resources created.
    pub created: usize,
    /// Number of resources updated.
    pub updated: usize,
    /// Number of resources destroyed.
    pub destroyed: usize,
}

impl<'a, S> Syncer<'a, S>
where
    S: ResourceStore + ?Sized,
{
    /// Creates a syncer over the given store with default planning
    /// behavior.
    #[must_use]
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            collector: LiveStateCollector::new(store),
            planner: DiffPlanner::default(),
        }
    }

    /// Replaces the planner, e.g. to change ordering or orphaning policy.
    #[must_use]
    pub fn with_planner(mut self, planner: DiffPlanner) -> Self {
        self.planner = planner;
        self
    }

    /// Replaces the collector, e.g. to collect from another namespace.
    #[must_use]
    pub fn with_collector(mut self, collector: LiveStateCollector<'a, S>) -> Self {
        self.collector = collector;
        self
    }

    /// Computes the plan for syncing `expected` without applying it.
    ///
    /// # Errors
    ///
    /// Returns an error if live-state collection fails or planning hits a
    /// conflict.
    pub async fn plan(&self, cluster: &str, expected: Vec<Resource>) -> Result<SyncPlan> {
        let actual = self.collector.collect(cluster).await?;
        self.planner.plan(self.store, cluster, expected, actual).await
    }

    /// Syncs a cluster to the given expected resource set.
    ///
    /// # Errors
    ///
    /// Returns an error if planning fails or any store operation is
    /// rejected; a failed apply stops at the first rejected operation and
    /// is recovered by re-running the sync, never by rollback.
    pub async fn sync(&self, cluster: &str, expected: Vec<Resource>) -> Result<SyncReport> {
        let plan = self.plan(cluster, expected).await?;
        if plan.is_empty() {
            info!(cluster, "live state already matches the template");
            return Ok(SyncReport::empty(cluster));
        }

        info!(
            cluster,
            operations = plan.operation_count(),
            "applying sync plan"
        );
        self.apply(&plan).await
    }

    /// Tears down everything the cluster's template owns.
    ///
    /// Equivalent to syncing an empty template: every collected resource
    /// becomes a deletion candidate, orphaned kinds are detached instead
    /// of destroyed, and children whose parent is also going away
    /// collapse into the parent's removal. On stores without cascading
    /// deletion, repeat until the report is a no-op.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::sync`].
    pub async fn delete(&self, cluster: &str) -> Result<SyncReport> {
        self.sync(cluster, Vec::new()).await
    }

    /// Applies a previously computed plan: creates, then updates, then
    /// destroy phases in order.
    ///
    /// # Errors
    ///
    /// Stops at the first store operation that fails. Later operations
    /// are not attempted; re-planning after a partial apply yields the
    /// remainder.
    pub async fn apply(&self, plan: &SyncPlan) -> Result<SyncReport> {
        let mut report = SyncReport::empty(&plan.cluster);

        for resource in &plan.to_create {
            self.store
                .create(resource)
                .await
                .map_err(|err| SyncError::apply_failed("create", resource.key(), err.to_string()))?;
            report.created += 1;
        }

        for pair in &plan.to_update {
            self.store.update(&pair.expected).await.map_err(|err| {
                SyncError::apply_failed("update", pair.expected.key(), err.to_string())
            })?;
            report.updated += 1;
        }

        for (phase, resources) in plan.to_destroy.iter().enumerate() {
            for resource in resources {
                let key = resource.key();
                self.store
                    .destroy(&key)
                    .await
                    .map_err(|err| SyncError::apply_failed("destroy", key.clone(), err.to_string()))?;
                report.destroyed += 1;
            }
            if !resources.is_empty() {
                debug!(cluster = %plan.cluster, phase, "destroy phase complete");
            }
        }

        info!(
            cluster = %plan.cluster,
            created = report.created,
            updated = report.updated,
            destroyed = report.destroyed,
            "plan applied"
        );
        Ok(report)
    }
}

impl SyncReport {
    /// A report with no applied operations.
    #[must_use]
    pub fn empty(cluster: impl Into<String>) -> Self {
        Self {
            cluster: cluster.into(),
            created: 0,
            updated: 0,
            destroyed: 0,
        }
    }

    /// Returns true if nothing was applied.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.created == 0 && self.updated == 0 && self.destroyed == 0
    }
}

impl std::fmt::Display for SyncReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_noop() {
            return write!(f, "No changes applied for cluster '{}'", self.cluster);
        }
        writeln!(f, "Sync of cluster '{}' complete:", self.cluster)?;
        writeln!(f, "  Created: {}", self.created)?;
        writeln!(f, "  Updated: {}", self.updated)?;
        write!(f, "  Destroyed: {}", self.destroyed)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::TrellisError;
    use crate::resource::{ParentRef, ResourceKey, ResourceKind, ResourceVersion};
    use crate::store::InMemoryStore;

    /// A small but complete cluster template: root, one machine set with
    /// one node, a config patch, and a kernel-args override.
    fn template(cluster: &str) -> Vec<Resource> {
        let workers = format!("{cluster}-workers");
        vec![
            Resource::new("default", ResourceKind::Cluster, cluster).with_spec(json!({
                "kubernetes": {"version": "1.31.0"},
            })),
            Resource::new("default", ResourceKind::MachineSet, workers.as_str())
                .with_cluster_label(cluster)
                .with_parent(ParentRef::cluster(cluster)),
            Resource::new("default", ResourceKind::MachineSetNode, "m1")
                .with_cluster_label(cluster)
                .with_machine_set_label(workers.as_str())
                .with_parent(ParentRef::machine_set(workers.as_str())),
            Resource::new("default", ResourceKind::ConfigPatch, "400-cm")
                .with_cluster_label(cluster)
                .with_cluster_machine_label("m1")
                .with_parent(ParentRef::cluster(cluster))
                .with_spec(json!({"machine": {"network": {"hostname": "m1"}}})),
            Resource::new("default", ResourceKind::KernelArgsConfiguration, "kargs-m1")
                .with_cluster_label(cluster)
                .with_parent(ParentRef::cluster(cluster))
                .with_template_annotation()
                .with_spec(json!(["console=ttyS0"])),
        ]
    }

    #[tokio::test]
    async fn test_sync_is_idempotent() {
        let store = InMemoryStore::new();
        let syncer = Syncer::new(&store);

        let report = syncer.sync("c1", template("c1")).await.expect("first sync");
        assert_eq!(report.created, 5);
        assert_eq!(store.len().await, 5);

        let report = syncer.sync("c1", template("c1")).await.expect("re-sync");
        assert!(report.is_noop(), "second sync must change nothing");
    }

    #[tokio::test]
    async fn test_sync_updates_changed_resources() {
        let store = InMemoryStore::new();
        let syncer = Syncer::new(&store);
        syncer.sync("c1", template("c1")).await.expect("first sync");

        let mut edited = template("c1");
        edited[0].spec = json!({"kubernetes": {"version": "1.32.0"}});

        let report = syncer.sync("c1", edited).await.expect("second sync");
        assert_eq!(report.updated, 1);
        assert_eq!(report.created, 0);

        let root = store
            .get(&ResourceKey::new("default", ResourceKind::Cluster, "c1"))
            .await
            .expect("get")
            .expect("root exists");
        assert_eq!(root.spec, json!({"kubernetes": {"version": "1.32.0"}}));
        assert_eq!(root.version, ResourceVersion(2));
    }

    #[tokio::test]
    async fn test_sync_destroys_resources_that_left_the_template() {
        let store = InMemoryStore::new();
        let syncer = Syncer::new(&store);
        syncer.sync("c1", template("c1")).await.expect("first sync");

        let mut trimmed = template("c1");
        trimmed.retain(|resource| resource.id != "m1");

        let report = syncer.sync("c1", trimmed).await.expect("second sync");
        assert_eq!(report.destroyed, 1);

        let node = store
            .get(&ResourceKey::new(
                "default",
                ResourceKind::MachineSetNode,
                "m1",
            ))
            .await
            .expect("get");
        assert_eq!(node, None);
    }

    #[tokio::test]
    async fn test_sync_rejects_a_mislabeled_template_before_writing() {
        let store = InMemoryStore::new();
        let syncer = Syncer::new(&store);

        let mislabeled: Vec<Resource> = template("c1")
            .into_iter()
            .map(|resource| {
                if resource.kind == ResourceKind::MachineSet {
                    resource.with_cluster_label("c2")
                } else {
                    resource
                }
            })
            .collect();

        let err = syncer.sync("c1", mislabeled).await.expect_err("conflict");
        assert!(err.is_conflict());
        assert!(
            store.is_empty().await,
            "a conflicting plan must not be applied"
        );
    }

    #[tokio::test]
    async fn test_delete_converges_and_orphans_kernel_args() {
        let store = InMemoryStore::new();
        let syncer = Syncer::new(&store);
        syncer.sync("c1", template("c1")).await.expect("sync");

        // The store does not cascade deletions, so children skipped in
        // favor of their parent's removal surface on later passes.
        let mut passes = 0;
        loop {
            let report = syncer.delete("c1").await.expect("delete");
            if report.is_noop() {
                break;
            }
            passes += 1;
            assert!(passes <= 4, "teardown did not converge");
        }

        assert_eq!(store.len().await, 1, "the orphan must survive teardown");
        let orphan = store
            .get(&ResourceKey::new(
                "default",
                ResourceKind::KernelArgsConfiguration,
                "kargs-m1",
            ))
            .await
            .expect("get")
            .expect("orphan exists");
        assert!(!orphan.is_template_managed());
    }

    #[tokio::test]
    async fn test_plan_does_not_write() {
        let store = InMemoryStore::new();
        let syncer = Syncer::new(&store);

        let plan = syncer.plan("c1", template("c1")).await.expect("plan");
        assert_eq!(plan.create_count(), 5);
        assert!(store.is_empty().await, "planning must not touch the store");
    }

    #[tokio::test]
    async fn test_apply_surfaces_the_failing_operation() {
        let store = InMemoryStore::new();
        let existing = Resource::new("default", ResourceKind::ConfigPatch, "400-cm")
            .with_cluster_label("c1");
        store.create(&existing).await.expect("seed");

        let mut plan = SyncPlan::empty("c1");
        plan.to_create.push(existing);

        let err = Syncer::new(&store).apply(&plan).await.expect_err("apply");
        assert!(matches!(
            err,
            TrellisError::Sync(SyncError::ApplyFailed { operation, .. }) if operation == "create"
        ));
    }

    #[tokio::test]
    async fn test_sync_accepts_deserialized_templates() {
        let raw = r#"
- namespace: default
  kind: cluster
  id: c1
  spec:
    kubernetes:
      version: 1.31.0
- namespace: default
  kind: machine-set
  id: c1-workers
  labels:
    trellis/cluster: c1
  parent:
    kind: cluster
    id: c1
"#;
        let expected: Vec<Resource> = serde_yaml::from_str(raw).expect("parse template");

        let store = InMemoryStore::new();
        let report = Syncer::new(&store).sync("c1", expected).await.expect("sync");
        assert_eq!(report.created, 2);
    }
}
