//! Diff planner for comparing expected vs actual resource sets.
//!
//! This module computes the difference between the resources a cluster
//! template implies and the resources the store currently attributes to
//! the cluster, producing a plan of creates, updates, and phased
//! deletions.

use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use super::ordering::OrderingTable;
use super::phases::DeletionSorter;
use super::plan::{SyncPlan, UpdatePair};
use crate::error::{ConflictError, PlanError, Result};
use crate::resource::{Resource, ResourceKind};
use crate::store::ResourceStore;

/// Planner for computing diffs between expected and actual state.
///
/// Planning reads the store only for point lookups that guard would-be
/// creates against identifier collisions with other clusters; it never
/// writes. The same planner can be reused across clusters and syncs.
#[derive(Debug, Clone)]
pub struct DiffPlanner {
    /// Ordering table for deterministic plan output.
    ordering: OrderingTable,
    /// Kinds that are orphaned instead of destroyed when they leave the
    /// template.
    orphaned_kinds: HashSet<ResourceKind>,
}

impl DiffPlanner {
    /// Creates a planner with the given ordering table.
    ///
    /// Kernel-args configuration starts out as the only orphaned kind:
    /// kernel arguments must survive both a template edit that drops them
    /// and a full template deletion, since wiping them can render a
    /// machine unbootable.
    #[must_use]
    pub fn new(ordering: OrderingTable) -> Self {
        let mut orphaned_kinds = HashSet::new();
        orphaned_kinds.insert(ResourceKind::KernelArgsConfiguration);
        Self {
            ordering,
            orphaned_kinds,
        }
    }

    /// Replaces the set of kinds that are orphaned instead of destroyed.
    #[must_use]
    pub fn with_orphaned_kinds(mut self, kinds: impl IntoIterator<Item = ResourceKind>) -> Self {
        self.orphaned_kinds = kinds.into_iter().collect();
        self
    }

    /// Computes the plan that moves `actual` to `expected`.
    ///
    /// Both sets belong to `cluster`: `expected` is the template's
    /// translation, `actual` the collector's snapshot. Every non-root
    /// resource on either side must be labeled for `cluster`.
    ///
    /// # Errors
    ///
    /// Returns a conflict error if any resource turns out to belong to a
    /// different cluster, a planning error on duplicate expected keys or
    /// unranked kinds, and a store error if a create-guard lookup fails.
    /// A partially valid plan is never returned.
    pub async fn plan<S>(
        &self,
        store: &S,
        cluster: &str,
        expected: Vec<Resource>,
        actual: Vec<Resource>,
    ) -> Result<SyncPlan>
    where
        S: ResourceStore + ?Sized,
    {
        // Index the expected set by key; entries are consumed as actual
        // resources match them, so what remains is exactly the create set.
        let mut pending: BTreeMap<_, _> = BTreeMap::new();
        for resource in expected {
            Self::check_cluster_ownership(cluster, &resource)?;
            let key = resource.key();
            if pending.insert(key.clone(), resource).is_some() {
                return Err(PlanError::DuplicateExpected { key }.into());
            }
        }

        let mut to_update = Vec::new();
        let mut candidates = Vec::new();

        for actual_resource in actual {
            let key = actual_resource.key();
            match pending.remove(&key) {
                Some(mut expected_resource) => {
                    expected_resource.adopt_store_metadata(&actual_resource);
                    if expected_resource == actual_resource {
                        debug!(key = %key, "resource is up to date");
                    } else {
                        debug!(key = %key, "resource content changed");
                        to_update.push(UpdatePair {
                            expected: expected_resource,
                            actual: actual_resource,
                        });
                    }
                }
                None => {
                    Self::check_cluster_ownership(cluster, &actual_resource)?;
                    if self.orphaned_kinds.contains(&actual_resource.kind) {
                        if actual_resource.is_template_managed() {
                            debug!(key = %key, "orphaning instead of destroying");
                            let mut orphaned = actual_resource.clone();
                            orphaned.clear_template_managed();
                            to_update.push(UpdatePair {
                                expected: orphaned,
                                actual: actual_resource,
                            });
                        } else {
                            debug!(key = %key, "already orphaned, leaving in place");
                        }
                    } else {
                        debug!(key = %key, "resource left the template, destroying");
                        candidates.push(actual_resource);
                    }
                }
            }
        }

        let mut to_create = Vec::new();
        for (key, expected_resource) in pending {
            if let Some(existing) = store.get(&key).await? {
                match existing.cluster_label() {
                    Some(found) if found == cluster => {
                        debug!(key = %key, "existing resource already belongs to this cluster");
                    }
                    Some(found) => {
                        return Err(ConflictError::OwnedByOtherCluster {
                            key,
                            found: found.to_owned(),
                            expected: cluster.to_owned(),
                        }
                        .into());
                    }
                    None => {
                        return Err(ConflictError::OwnedOutsideCluster {
                            key,
                            expected: cluster.to_owned(),
                        }
                        .into());
                    }
                }
            }
            debug!(key = %key, "resource needs to be created");
            to_create.push(expected_resource);
        }

        self.ordering.sort_resources(&mut to_create)?;
        self.ordering.sort_updates(&mut to_update)?;
        let to_destroy = DeletionSorter::new(&self.ordering).sort_into_phases(candidates)?;

        debug!(
            cluster,
            creates = to_create.len(),
            updates = to_update.len(),
            destroys = to_destroy.iter().map(Vec::len).sum::<usize>(),
            "plan computed"
        );

        Ok(SyncPlan {
            cluster: cluster.to_owned(),
            to_create,
            to_update,
            to_destroy,
        })
    }

    /// Enforces the ownership invariant on one resource.
    ///
    /// Applies to both sides of the diff: expected resources are checked
    /// while they are indexed, actual resources when they become deletion
    /// candidates. The cluster root is fetched by identifier rather than
    /// by label selection, so it is exempt.
    fn check_cluster_ownership(cluster: &str, resource: &Resource) -> Result<()> {
        if resource.kind.is_root() {
            return Ok(());
        }
        match resource.cluster_label() {
            Some(found) if found == cluster => Ok(()),
            Some(found) => Err(ConflictError::ClusterMismatch {
                key: resource.key(),
                found: found.to_owned(),
                expected: cluster.to_owned(),
            }
            .into()),
            None => Err(ConflictError::MissingClusterLabel {
                key: resource.key(),
                expected: cluster.to_owned(),
            }
            .into()),
        }
    }
}

impl Default for DiffPlanner {
    fn default() -> Self {
        Self::new(OrderingTable::canonical())
    }
}
