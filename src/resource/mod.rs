//! The resource model: kinds, identity, labels, and ownership.

mod kind;
mod labels;
mod types;

pub use kind::ResourceKind;
pub use labels::{
    ANNOTATION_TEMPLATE_MANAGED, LABEL_CLUSTER, LABEL_CLUSTER_MACHINE, LABEL_CONTROLLER_MANAGED,
    LABEL_MACHINE_SET, ParentRef,
};
pub use types::{DEFAULT_NAMESPACE, Resource, ResourceKey, ResourceVersion};
