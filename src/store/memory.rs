//! In-memory resource store backend.
//!
//! Backs tests and single-process embedding. State lives behind an async
//! read-write lock; every operation copies resources in and out, so
//! callers never observe partially applied writes.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use super::resource_store::ResourceStore;
use super::selector::LabelSelector;
use crate::error::{Result, StoreError};
use crate::resource::{Resource, ResourceKey, ResourceKind, ResourceVersion};

/// An in-memory resource store.
///
/// Keys are ordered, so listings come back sorted without extra work.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    resources: RwLock<BTreeMap<ResourceKey, Resource>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of resources currently held, across all namespaces and kinds.
    pub async fn len(&self) -> usize {
        self.resources.read().await.len()
    }

    /// Returns true if the store holds no resources.
    pub async fn is_empty(&self) -> bool {
        self.resources.read().await.is_empty()
    }
}

#[async_trait]
impl ResourceStore for InMemoryStore {
    async fn get(&self, key: &ResourceKey) -> Result<Option<Resource>> {
        Ok(self.resources.read().await.get(key).cloned())
    }

    async fn list(
        &self,
        namespace: &str,
        kind: ResourceKind,
        selector: &LabelSelector,
    ) -> Result<Vec<Resource>> {
        let resources = self.resources.read().await;
        Ok(resources
            .values()
            .filter(|resource| {
                resource.namespace == namespace
                    && resource.kind == kind
                    && selector.matches(resource)
            })
            .cloned()
            .collect())
    }

    async fn create(&self, resource: &Resource) -> Result<Resource> {
        let mut resources = self.resources.write().await;
        let key = resource.key();
        if resources.contains_key(&key) {
            return Err(StoreError::AlreadyExists { key }.into());
        }

        let now = Utc::now();
        let mut stored = resource.clone();
        stored.version = ResourceVersion::UNASSIGNED.next();
        stored.created = now;
        stored.updated = now;
        debug!(key = %key, "created resource");
        resources.insert(key, stored.clone());
        Ok(stored)
    }

    async fn update(&self, resource: &Resource) -> Result<Resource> {
        let mut resources = self.resources.write().await;
        let key = resource.key();
        let current = match resources.get(&key) {
            Some(current) => current,
            None => return Err(StoreError::NotFound { key }.into()),
        };
        if current.version != resource.version {
            return Err(StoreError::VersionConflict {
                key,
                expected: resource.version,
                found: current.version,
            }
            .into());
        }

        let mut stored = resource.clone();
        stored.version = current.version.next();
        stored.created = current.created;
        stored.updated = Utc::now();
        debug!(key = %key, version = %stored.version, "updated resource");
        resources.insert(key, stored.clone());
        Ok(stored)
    }

    async fn destroy(&self, key: &ResourceKey) -> Result<()> {
        let mut resources = self.resources.write().await;
        if resources.remove(key).is_none() {
            return Err(StoreError::NotFound { key: key.clone() }.into());
        }
        debug!(key = %key, "destroyed resource");
        Ok(())
    }
}
