// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(warnings)]                    // All warnings are treated as errors
#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(dead_code)]                   // Unused code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_imports)]              // Unused imports are forbidden
#![deny(unused_variables)]            // Unused variables are forbidden
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::module_inception)]    // Module with same name as crate warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # Trellis
//!
//! A reconciliation engine for declarative cluster templates against a
//! versioned resource store.
//!
//! ## Overview
//!
//! A cluster template describes a target topology: machines, machine
//! sets, config patches, kernel-argument overrides. Trellis compares the
//! resources a template implies with the resources the store currently
//! attributes to the cluster and produces a minimal, safely ordered,
//! conflict-checked plan:
//!
//! - **Creates** are guarded against identifier collisions with other
//!   clusters and emitted in canonical kind order.
//! - **Updates** adopt store-assigned metadata first, so store-managed
//!   fields never cause churn.
//! - **Deletions** run in two phases (machine-backed resources first),
//!   with children implied by a parent's removal deduplicated away.
//! - **Orphaned kinds** (kernel arguments by default) are detached from
//!   template management instead of destroyed.
//!
//! ## Modules
//!
//! - [`resource`]: The resource model: kinds, identity, labels, parentage
//! - [`store`]: Store trait, label selection, and the in-memory backend
//! - [`collector`]: Live-state collection for a cluster
//! - [`planner`]: Diff computation and phased deletion ordering
//! - [`sync`]: Plan application and the end-to-end sync flow
//! - [`error`]: Error hierarchy
//!
//! ## Example
//!
//! ```
//! use trellis::{InMemoryStore, Resource, ResourceKind, Syncer};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> trellis::Result<()> {
//! let store = InMemoryStore::new();
//! let syncer = Syncer::new(&store);
//!
//! let expected = vec![
//!     Resource::new("default", ResourceKind::Cluster, "demo"),
//!     Resource::new("default", ResourceKind::MachineSet, "demo-workers")
//!         .with_cluster_label("demo"),
//! ];
//!
//! let report = syncer.sync("demo", expected).await?;
//! assert_eq!(report.created, 2);
//!
//! // Syncing again changes nothing.
//! let report = syncer.sync("demo", vec![
//!     Resource::new("default", ResourceKind::Cluster, "demo"),
//!     Resource::new("default", ResourceKind::MachineSet, "demo-workers")
//!         .with_cluster_label("demo"),
//! ]).await?;
//! assert!(report.is_noop());
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod collector;
pub mod error;
pub mod planner;
pub mod resource;
pub mod store;
pub mod sync;

// ============================================================================
// Re-exports
// ============================================================================

pub use collector::LiveStateCollector;
pub use error::{ConflictError, PlanError, Result, StoreError, SyncError, TrellisError};
pub use planner::{
    DESTROY_PHASES, DeletionSorter, DiffPlanner, OrderingTable, SyncPlan, UpdatePair,
};
pub use resource::{
    ANNOTATION_TEMPLATE_MANAGED, DEFAULT_NAMESPACE, LABEL_CLUSTER, LABEL_CLUSTER_MACHINE,
    LABEL_CONTROLLER_MANAGED, LABEL_MACHINE_SET, ParentRef, Resource, ResourceKey, ResourceKind,
    ResourceVersion,
};
pub use store::{InMemoryStore, LabelSelector, ResourceStore};
pub use sync::{SyncReport, Syncer};
