//! Resource storage: the store trait, label selection, and backends.

mod memory;
mod resource_store;
mod selector;

pub use memory::InMemoryStore;
#[cfg(test)]
pub use resource_store::MockResourceStore;
pub use resource_store::ResourceStore;
pub use selector::LabelSelector;
