//! Resource store trait definition.
//!
//! This module defines the common interface for resource storage
//! backends. The planner only reads through it; the syncer also writes.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use super::selector::LabelSelector;
use crate::error::Result;
use crate::resource::{Resource, ResourceKey, ResourceKind};

/// Trait for resource storage backends.
///
/// Implementations assign versions and timestamps on write: `create`
/// stores the resource at version 1, and `update` only succeeds when the
/// caller's version matches the stored one, bumping it by one.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Fetches a single resource by key.
    ///
    /// Returns `None` if no resource exists under the key.
    async fn get(&self, key: &ResourceKey) -> Result<Option<Resource>>;

    /// Lists resources of one kind in a namespace, filtered by labels.
    ///
    /// Results are sorted by identifier.
    async fn list(
        &self,
        namespace: &str,
        kind: ResourceKind,
        selector: &LabelSelector,
    ) -> Result<Vec<Resource>>;

    /// Creates a resource, returning the stored copy.
    ///
    /// Fails with an already-exists error if the key is taken.
    async fn create(&self, resource: &Resource) -> Result<Resource>;

    /// Updates a resource, returning the stored copy.
    ///
    /// The caller's version must match the stored version; a mismatch
    /// fails with a version conflict and leaves the store untouched.
    async fn update(&self, resource: &Resource) -> Result<Resource>;

    /// Destroys a resource by key.
    ///
    /// Fails with a not-found error if no resource exists under the key.
    async fn destroy(&self, key: &ResourceKey) -> Result<()>;
}

#[async_trait]
impl ResourceStore for Box<dyn ResourceStore> {
    async fn get(&self, key: &ResourceKey) -> Result<Option<Resource>> {
        (**self).get(key).await
    }

    async fn list(
        &self,
        namespace: &str,
        kind: ResourceKind,
        selector: &LabelSelector,
    ) -> Result<Vec<Resource>> {
        (**self).list(namespace, kind, selector).await
    }

    async fn create(&self, resource: &Resource) -> Result<Resource> {
        (**self).create(resource).await
    }

    async fn update(&self, resource: &Resource) -> Result<Resource> {
        (**self).update(resource).await
    }

    async fn destroy(&self, key: &ResourceKey) -> Result<()> {
        (**self).destroy(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;

    #[tokio::test]
    async fn test_boxed_store_delegates() {
        let store: Box<dyn ResourceStore> = Box::new(InMemoryStore::new());

        let resource = Resource::new("default", ResourceKind::Cluster, "talos-default");
        let stored = store.create(&resource).await.expect("create");
        assert!(stored.version.is_assigned());

        let fetched = store.get(&resource.key()).await.expect("get");
        assert_eq!(fetched, Some(stored));

        store.destroy(&resource.key()).await.expect("destroy");
        assert_eq!(store.get(&resource.key()).await.expect("get"), None);
    }
}
