//! Planning module for template sync operations.
//!
//! This module handles the comparison between expected and actual
//! resource sets, generating ordered, conflict-checked plans of creates,
//! updates, and phased deletions.

mod diff;
mod ordering;
mod phases;
mod plan;

pub use diff::DiffPlanner;
pub use ordering::OrderingTable;
pub use phases::DeletionSorter;
pub use plan::{DESTROY_PHASES, SyncPlan, UpdatePair};
