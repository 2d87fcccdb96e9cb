//! Resource kind enumeration.
//!
//! The set of resource kinds a cluster template can own is closed: the
//! translator, the planner, and the ordering table all agree on it. New
//! kinds are added here first, then ranked in the canonical ordering
//! table.

use serde::{Deserialize, Serialize};

/// The kind of a resource in the backing store.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    /// The cluster root resource; everything else attaches to it.
    Cluster,
    /// A homogeneous set of machines (control plane or worker pool).
    MachineSet,
    /// Membership of a single machine in a machine set.
    MachineSetNode,
    /// A free-form configuration patch scoped to the cluster or a machine.
    ConfigPatch,
    /// System extensions configuration for a machine or machine set.
    ExtensionsConfiguration,
    /// Kernel argument overrides; outlives template membership.
    KernelArgsConfiguration,
}

impl ResourceKind {
    /// Every known resource kind, in canonical order.
    pub const ALL: [Self; 6] = [
        Self::Cluster,
        Self::MachineSet,
        Self::MachineSetNode,
        Self::ConfigPatch,
        Self::ExtensionsConfiguration,
        Self::KernelArgsConfiguration,
    ];

    /// The kinds a template can own besides the cluster root itself.
    ///
    /// The live-state collector lists exactly these by cluster label; the
    /// root is fetched directly by identifier.
    pub const OWNED: [Self; 5] = [
        Self::MachineSet,
        Self::MachineSetNode,
        Self::ConfigPatch,
        Self::ExtensionsConfiguration,
        Self::KernelArgsConfiguration,
    ];

    /// Returns true for the cluster root kind.
    #[must_use]
    pub const fn is_root(self) -> bool {
        matches!(self, Self::Cluster)
    }

    /// The wire name of this kind, as used in keys and stored documents.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cluster => "cluster",
            Self::MachineSet => "machine-set",
            Self::MachineSetNode => "machine-set-node",
            Self::ConfigPatch => "config-patch",
            Self::ExtensionsConfiguration => "extensions-configuration",
            Self::KernelArgsConfiguration => "kernel-args-configuration",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
