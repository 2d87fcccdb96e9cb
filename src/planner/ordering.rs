//! Canonical resource ordering.
//!
//! Creates and updates are emitted in a fixed kind order so that the
//! cluster root always precedes the resources attaching to it and plan
//! output stays stable across runs. The table is immutable once built
//! and is injected into the planner; a kind without a priority is a
//! version-skew error, not a silent reordering.

use std::collections::HashMap;

use super::plan::UpdatePair;
use crate::error::{PlanError, Result};
use crate::resource::{Resource, ResourceKind};

/// An immutable kind-to-priority table driving apply order.
#[derive(Debug, Clone)]
pub struct OrderingTable {
    priorities: HashMap<ResourceKind, u8>,
}

impl OrderingTable {
    /// The canonical order: cluster root first, then machine sets, their
    /// nodes, and finally the configuration kinds.
    #[must_use]
    pub fn canonical() -> Self {
        Self::from_priorities([
            (ResourceKind::Cluster, 1),
            (ResourceKind::MachineSet, 2),
            (ResourceKind::MachineSetNode, 3),
            (ResourceKind::ConfigPatch, 4),
            (ResourceKind::ExtensionsConfiguration, 5),
            (ResourceKind::KernelArgsConfiguration, 6),
        ])
    }

    /// Builds a table from explicit `(kind, priority)` pairs.
    ///
    /// Lower priorities sort first. Kinds left out of the table make any
    /// sort involving them fail.
    #[must_use]
    pub fn from_priorities(priorities: impl IntoIterator<Item = (ResourceKind, u8)>) -> Self {
        Self {
            priorities: priorities.into_iter().collect(),
        }
    }

    /// The priority of a kind; lower sorts first.
    pub fn priority(&self, kind: ResourceKind) -> Result<u8> {
        self.priorities
            .get(&kind)
            .copied()
            .ok_or_else(|| PlanError::UnrankedKind { kind }.into())
    }

    /// Sorts resources by priority, then namespace, then identifier.
    ///
    /// Every kind is ranked before anything moves, so on error the slice
    /// is returned untouched.
    pub fn sort_resources(&self, resources: &mut [Resource]) -> Result<()> {
        for resource in resources.iter() {
            self.priority(resource.kind)?;
        }
        resources.sort_by(|a, b| {
            self.rank(a.kind)
                .cmp(&self.rank(b.kind))
                .then_with(|| a.namespace.cmp(&b.namespace))
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(())
    }

    /// Sorts update pairs by their new resource, same order as
    /// [`Self::sort_resources`].
    pub fn sort_updates(&self, updates: &mut [UpdatePair]) -> Result<()> {
        for pair in updates.iter() {
            self.priority(pair.expected.kind)?;
        }
        updates.sort_by(|a, b| {
            self.rank(a.expected.kind)
                .cmp(&self.rank(b.expected.kind))
                .then_with(|| a.expected.namespace.cmp(&b.expected.namespace))
                .then_with(|| a.expected.id.cmp(&b.expected.id))
        });
        Ok(())
    }

    // Only reached after every kind in the input has been ranked.
    fn rank(&self, kind: ResourceKind) -> u8 {
        self.priorities.get(&kind).copied().unwrap_or(u8::MAX)
    }
}

impl Default for OrderingTable {
    fn default() -> Self {
        Self::canonical()
    }
}
