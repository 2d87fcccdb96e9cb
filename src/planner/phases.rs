//! Phased ordering of resource deletions.
//!
//! Destroying a cluster's resources is the one place ordering is a
//! correctness concern: machine-backed resources must vanish before the
//! structures they point at, and a child whose parent is itself being
//! destroyed must not be listed at all, since the parent's removal
//! cascades. This module turns a flat set of deletion candidates into
//! exactly two phases the caller applies in order.

use std::collections::HashSet;

use tracing::debug;

use super::ordering::OrderingTable;
use super::plan::DESTROY_PHASES;
use crate::error::Result;
use crate::resource::{Resource, ResourceKey, ResourceKind};

/// Splits deletion candidates into ordered phases.
#[derive(Debug)]
pub struct DeletionSorter<'a> {
    ordering: &'a OrderingTable,
}

impl<'a> DeletionSorter<'a> {
    /// Creates a sorter using the given ordering table for intra-phase
    /// ordering.
    #[must_use]
    pub const fn new(ordering: &'a OrderingTable) -> Self {
        Self { ordering }
    }

    /// Deduplicates cascading deletions and partitions the survivors.
    ///
    /// A candidate whose parent is also a candidate is dropped: the store
    /// removes it together with its parent, and listing it separately
    /// could only get the order wrong. Phase 0 holds machine sets and
    /// machine set nodes so that machines are released first; phase 1
    /// holds everything else, including the cluster root. Within each
    /// phase, resources are sorted for stable output.
    pub fn sort_into_phases(
        &self,
        candidates: Vec<Resource>,
    ) -> Result<[Vec<Resource>; DESTROY_PHASES]> {
        let keys: HashSet<ResourceKey> = candidates.iter().map(Resource::key).collect();

        let mut early = Vec::new();
        let mut late = Vec::new();
        for candidate in candidates {
            if let Some(parent) = candidate.parent_key() {
                if keys.contains(&parent) {
                    debug!(
                        key = %candidate.key(),
                        parent = %parent,
                        "skipping destroy, parent removal cascades"
                    );
                    continue;
                }
            }
            if Self::destroys_early(candidate.kind) {
                early.push(candidate);
            } else {
                late.push(candidate);
            }
        }

        self.ordering.sort_resources(&mut early)?;
        self.ordering.sort_resources(&mut late)?;
        Ok([early, late])
    }

    // Machine-backed kinds go first so no node ever points at a
    // machine set the store no longer holds.
    const fn destroys_early(kind: ResourceKind) -> bool {
        matches!(
            kind,
            ResourceKind::MachineSet | ResourceKind::MachineSetNode
        )
    }
}
