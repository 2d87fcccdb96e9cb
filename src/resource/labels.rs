//! Well-known labels, annotations, and the typed parent reference.

use serde::{Deserialize, Serialize};

use crate::resource::{Resource, ResourceKind};

/// Label carrying the identifier of the cluster a resource belongs to.
pub const LABEL_CLUSTER: &str = "trellis/cluster";

/// Label carrying the identifier of the machine set a node belongs to.
pub const LABEL_MACHINE_SET: &str = "trellis/machine-set";

/// Label carrying the machine identifier on per-machine configuration.
pub const LABEL_CLUSTER_MACHINE: &str = "trellis/cluster-machine";

/// Label marking resources that are produced by controllers rather than
/// written by the template translator.
pub const LABEL_CONTROLLER_MANAGED: &str = "trellis/controller-managed";

/// Annotation marking resources whose lifecycle is bound to the template.
///
/// Stripping this annotation orphans the resource: it stays in the store
/// but is no longer considered for destruction by later plans.
pub const ANNOTATION_TEMPLATE_MANAGED: &str = "trellis/managed-by-template";

/// A typed reference to the resource a child attaches to.
///
/// Parentage always stays within one namespace, so the reference carries
/// only the kind and identifier; it is resolved in the child's namespace.
/// Machine-set nodes point at their machine set; every other non-root
/// kind points at the cluster root.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ParentRef {
    /// Kind of the parent resource.
    pub kind: ResourceKind,
    /// Identifier of the parent resource.
    pub id: String,
}

impl ParentRef {
    /// Creates a parent reference to the given resource.
    #[must_use]
    pub fn to_resource(resource: &Resource) -> Self {
        Self {
            kind: resource.kind,
            id: resource.id.clone(),
        }
    }

    /// Creates a parent reference to a cluster root.
    #[must_use]
    pub fn cluster(id: impl Into<String>) -> Self {
        Self {
            kind: ResourceKind::Cluster,
            id: id.into(),
        }
    }

    /// Creates a parent reference to a machine set.
    #[must_use]
    pub fn machine_set(id: impl Into<String>) -> Self {
        Self {
            kind: ResourceKind::MachineSet,
            id: id.into(),
        }
    }
}

impl std::fmt::Display for ParentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.kind, self.id)
    }
}
