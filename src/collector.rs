//! Live-state collection.
//!
//! Before a diff can be computed, the engine needs the store's view of a
//! cluster: the cluster root itself plus every resource of an owned kind
//! labeled for it, except resources that controllers or other
//! subsystems created, which the template must never touch. Collection
//! either returns the complete set or fails; the planner must never diff
//! against a partial snapshot.

use tracing::debug;

use crate::error::Result;
use crate::resource::{LABEL_CLUSTER, Resource, ResourceKey, ResourceKind};
use crate::store::{LabelSelector, ResourceStore};

/// Collects the resources the store currently attributes to a cluster.
#[derive(Debug)]
pub struct LiveStateCollector<'a, S: ?Sized> {
    /// Store to read from.
    store: &'a S,
    /// Namespace the cluster's resources live in.
    namespace: String,
}

impl<'a, S> LiveStateCollector<'a, S>
where
    S: ResourceStore + ?Sized,
{
    /// Creates a collector reading from the given store in the default
    /// namespace.
    #[must_use]
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            namespace: crate::resource::DEFAULT_NAMESPACE.to_owned(),
        }
    }

    /// Sets the namespace to collect from.
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Fetches the cluster's actual resource set.
    ///
    /// A missing cluster root is an empty result, not an error: syncing a
    /// template for the first time starts from nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if any store read fails; the caller must not diff
    /// against a partial snapshot.
    pub async fn collect(&self, cluster: &str) -> Result<Vec<Resource>> {
        let mut resources = Vec::new();

        let root_key = ResourceKey::new(self.namespace.as_str(), ResourceKind::Cluster, cluster);
        match self.store.get(&root_key).await? {
            Some(root) => resources.push(root),
            None => debug!(cluster, "no cluster root in the store yet"),
        }

        let selector = LabelSelector::eq(LABEL_CLUSTER, cluster);
        for kind in ResourceKind::OWNED {
            let listed = self.store.list(&self.namespace, kind, &selector).await?;
            resources.extend(listed.into_iter().filter(|resource| {
                if resource.is_controller_managed() {
                    debug!(key = %resource.key(), "skipping controller-managed resource");
                    return false;
                }
                if !resource.owner.is_empty() {
                    debug!(
                        key = %resource.key(),
                        owner = %resource.owner,
                        "skipping resource owned by another subsystem"
                    );
                    return false;
                }
                true
            }));
        }

        debug!(cluster, count = resources.len(), "collected live state");
        Ok(resources)
    }
}
