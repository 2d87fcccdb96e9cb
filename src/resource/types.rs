//! Core resource types: identity, version, and the resource document.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::resource::kind::ResourceKind;
use crate::resource::labels::{
    ANNOTATION_TEMPLATE_MANAGED, LABEL_CLUSTER, LABEL_CLUSTER_MACHINE, LABEL_CONTROLLER_MANAGED,
    LABEL_MACHINE_SET, ParentRef,
};

/// Namespace used when a template does not specify one.
pub const DEFAULT_NAMESPACE: &str = "default";

/// A store-assigned, monotonically increasing resource version.
///
/// Version `0` means "not yet persisted"; the store assigns `1` on create
/// and bumps by one on every successful update.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(transparent)]
pub struct ResourceVersion(pub u64);

impl ResourceVersion {
    /// The version of a resource that has never been written to the store.
    pub const UNASSIGNED: Self = Self(0);

    /// Returns true once the store has assigned a real version.
    #[must_use]
    pub const fn is_assigned(self) -> bool {
        self.0 > 0
    }

    /// The version after one successful write.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for ResourceVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The full address of a resource in the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceKey {
    /// Namespace the resource lives in.
    pub namespace: String,
    /// Kind of the resource.
    pub kind: ResourceKind,
    /// Identifier, unique per namespace and kind.
    pub id: String,
}

impl ResourceKey {
    /// Creates a key from its parts.
    #[must_use]
    pub fn new(namespace: impl Into<String>, kind: ResourceKind, id: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            kind,
            id: id.into(),
        }
    }
}

impl std::fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.namespace, self.kind, self.id)
    }
}

/// A single resource document as held in the store.
///
/// Expected resources produced by template translation and actual
/// resources read back from the store share this shape; the planner
/// compares them directly after normalizing store-assigned metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Resource {
    /// Namespace the resource lives in.
    pub namespace: String,
    /// Kind of the resource.
    pub kind: ResourceKind,
    /// Identifier, unique per namespace and kind.
    pub id: String,
    /// Store-assigned version; [`ResourceVersion::UNASSIGNED`] until persisted.
    #[serde(default)]
    pub version: ResourceVersion,
    /// Creation timestamp, assigned by the store.
    #[serde(default = "Utc::now")]
    pub created: DateTime<Utc>,
    /// Last-update timestamp, maintained by the store.
    #[serde(default = "Utc::now")]
    pub updated: DateTime<Utc>,
    /// Subsystem that created the resource; empty for template-managed
    /// resources.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub owner: String,
    /// Typed reference to the parent resource, if any.
    ///
    /// The parent always lives in the same namespace as this resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ParentRef>,
    /// Free-form labels; well-known keys live in [`crate::resource::labels`].
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub labels: HashMap<String, String>,
    /// Free-form annotations.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub annotations: HashMap<String, String>,
    /// Finalizers registered by controllers; owned by the store side.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub finalizers: Vec<String>,
    /// The kind-specific payload, carried opaquely.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub spec: Value,
}

impl Resource {
    /// Creates an empty resource with the given address.
    ///
    /// The version starts unassigned and both timestamps are set to now;
    /// the store overwrites all three on create.
    #[must_use]
    pub fn new(namespace: impl Into<String>, kind: ResourceKind, id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            namespace: namespace.into(),
            kind,
            id: id.into(),
            version: ResourceVersion::UNASSIGNED,
            created: now,
            updated: now,
            owner: String::new(),
            parent: None,
            labels: HashMap::new(),
            annotations: HashMap::new(),
            finalizers: Vec::new(),
            spec: Value::Null,
        }
    }

    /// Sets a label.
    #[must_use]
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Labels the resource as belonging to the given cluster.
    #[must_use]
    pub fn with_cluster_label(self, cluster: impl Into<String>) -> Self {
        self.with_label(LABEL_CLUSTER, cluster)
    }

    /// Labels the resource as belonging to the given machine set.
    #[must_use]
    pub fn with_machine_set_label(self, machine_set: impl Into<String>) -> Self {
        self.with_label(LABEL_MACHINE_SET, machine_set)
    }

    /// Labels per-machine configuration with its target machine.
    #[must_use]
    pub fn with_cluster_machine_label(self, machine: impl Into<String>) -> Self {
        self.with_label(LABEL_CLUSTER_MACHINE, machine)
    }

    /// Marks the resource as produced by a controller.
    #[must_use]
    pub fn with_controller_managed(self) -> Self {
        self.with_label(LABEL_CONTROLLER_MANAGED, "")
    }

    /// Marks the resource's lifecycle as bound to the template.
    #[must_use]
    pub fn with_template_annotation(mut self) -> Self {
        self.annotations
            .insert(ANNOTATION_TEMPLATE_MANAGED.to_owned(), String::new());
        self
    }

    /// Sets the subsystem owner.
    #[must_use]
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = owner.into();
        self
    }

    /// Sets the typed parent reference.
    #[must_use]
    pub fn with_parent(mut self, parent: ParentRef) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Sets the kind-specific payload.
    #[must_use]
    pub fn with_spec(mut self, spec: Value) -> Self {
        self.spec = spec;
        self
    }

    /// Adds a finalizer.
    #[must_use]
    pub fn with_finalizer(mut self, finalizer: impl Into<String>) -> Self {
        self.finalizers.push(finalizer.into());
        self
    }

    /// The full store address of this resource.
    #[must_use]
    pub fn key(&self) -> ResourceKey {
        ResourceKey {
            namespace: self.namespace.clone(),
            kind: self.kind,
            id: self.id.clone(),
        }
    }

    /// The cluster this resource is labeled for, if any.
    #[must_use]
    pub fn cluster_label(&self) -> Option<&str> {
        self.labels.get(LABEL_CLUSTER).map(String::as_str)
    }

    /// The machine set this resource is labeled for, if any.
    #[must_use]
    pub fn machine_set_label(&self) -> Option<&str> {
        self.labels.get(LABEL_MACHINE_SET).map(String::as_str)
    }

    /// Returns true if a controller, not the template, manages this resource.
    #[must_use]
    pub fn is_controller_managed(&self) -> bool {
        self.labels.contains_key(LABEL_CONTROLLER_MANAGED)
    }

    /// Returns true while the resource's lifecycle is bound to the template.
    #[must_use]
    pub fn is_template_managed(&self) -> bool {
        self.annotations.contains_key(ANNOTATION_TEMPLATE_MANAGED)
    }

    /// Detaches the resource from template lifecycle management.
    ///
    /// Once persisted, later plans no longer consider it for destruction.
    pub fn clear_template_managed(&mut self) {
        self.annotations.remove(ANNOTATION_TEMPLATE_MANAGED);
    }

    /// Key of the parent resource, resolved in this resource's namespace.
    #[must_use]
    pub fn parent_key(&self) -> Option<ResourceKey> {
        self.parent.as_ref().map(|parent| ResourceKey {
            namespace: self.namespace.clone(),
            kind: parent.kind,
            id: parent.id.clone(),
        })
    }

    /// Copies store-assigned metadata from the stored resource.
    ///
    /// Version, timestamps, and finalizers belong to the store side;
    /// overwriting them on the expected resource before comparison keeps
    /// the diff focused on fields the template actually controls.
    pub fn adopt_store_metadata(&mut self, actual: &Self) {
        self.version = actual.version;
        self.created = actual.created;
        self.updated = actual.updated;
        self.finalizers = actual.finalizers.clone();
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_key_display() {
        let resource = Resource::new("default", ResourceKind::ConfigPatch, "400-cm-worker-1");
        assert_eq!(resource.key().to_string(), "default/config-patch/400-cm-worker-1");
        assert_eq!(resource.to_string(), resource.key().to_string());
    }

    #[test]
    fn test_builders_set_well_known_labels() {
        let resource = Resource::new("default", ResourceKind::MachineSetNode, "worker-1")
            .with_cluster_label("talos-default")
            .with_machine_set_label("talos-default-workers")
            .with_parent(ParentRef::machine_set("talos-default-workers"));

        assert_eq!(resource.cluster_label(), Some("talos-default"));
        assert_eq!(resource.machine_set_label(), Some("talos-default-workers"));
        assert_eq!(
            resource.parent_key(),
            Some(ResourceKey::new(
                "default",
                ResourceKind::MachineSet,
                "talos-default-workers"
            ))
        );

        let patch = Resource::new("default", ResourceKind::ConfigPatch, "400-cm-m1")
            .with_cluster_label("talos-default")
            .with_cluster_machine_label("machine-1");
        assert_eq!(
            patch.labels.get(LABEL_CLUSTER_MACHINE).map(String::as_str),
            Some("machine-1")
        );
    }

    #[test]
    fn test_template_annotation_lifecycle() {
        let mut resource = Resource::new(
            "default",
            ResourceKind::KernelArgsConfiguration,
            "kernel-args-worker-1",
        )
        .with_template_annotation();
        assert!(resource.is_template_managed());

        resource.clear_template_managed();
        assert!(!resource.is_template_managed());
        // Clearing twice is harmless.
        resource.clear_template_managed();
        assert!(!resource.is_template_managed());
    }

    #[test]
    fn test_adopt_store_metadata_overwrites_store_fields_only() {
        let stored = Resource::new("default", ResourceKind::MachineSet, "workers")
            .with_cluster_label("talos-default")
            .with_finalizer("machine-set-controller");
        let mut stored = stored;
        stored.version = ResourceVersion(7);

        let mut expected = Resource::new("default", ResourceKind::MachineSet, "workers")
            .with_cluster_label("talos-default")
            .with_spec(json!({"replicas": 3}));
        expected.adopt_store_metadata(&stored);

        assert_eq!(expected.version, ResourceVersion(7));
        assert_eq!(expected.created, stored.created);
        assert_eq!(expected.updated, stored.updated);
        assert_eq!(expected.finalizers, vec!["machine-set-controller"]);
        // The payload stays the template's own.
        assert_eq!(expected.spec, json!({"replicas": 3}));
    }

    #[test]
    fn test_deserialize_applies_defaults() {
        let resource: Resource = serde_json::from_str(
            r#"{"namespace": "default", "kind": "cluster", "id": "talos-default"}"#,
        )
        .expect("deserialize");

        assert_eq!(resource.version, ResourceVersion::UNASSIGNED);
        assert!(!resource.version.is_assigned());
        assert!(resource.labels.is_empty());
        assert!(resource.finalizers.is_empty());
        assert_eq!(resource.spec, Value::Null);
        assert!(resource.owner.is_empty());
        assert_eq!(resource.parent, None);
    }

    #[test]
    fn test_version_ordering_and_bump() {
        let version = ResourceVersion::UNASSIGNED;
        assert_eq!(version.next(), ResourceVersion(1));
        assert!(version.next().is_assigned());
        assert!(ResourceVersion(2) > ResourceVersion(1));
        assert_eq!(ResourceVersion(3).to_string(), "3");
    }
}
