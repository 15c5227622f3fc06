//! The incremental-analysis cache core of the Lumen service.
//!
//! This crate decides whether previously computed analysis state is still
//! valid, avoids redundant work when many requests arrive concurrently for
//! the same state, lets a client abandon a request without corrupting state
//! shared with other clients, and bounds unbounded reuse so incremental
//! drift never silently diverges from a from-scratch analysis.
//!
//! The pieces: [`DependencyState`] tracks per-file fingerprints with
//! rate-limited staleness checks; [`AnalysisContext`] owns one built
//! analyzer result plus its reuse bookkeeping; [`Consumer`] is the
//! exactly-once delivery channel back to a client; [`BuildCoordinator`] is
//! the single-flight scheduler that ties them together and owns the one
//! mutable cache slot.

#![warn(missing_docs)]

pub mod consumer;
pub mod context;
pub mod coordinator;
pub mod deps;

pub use consumer::{CancellationHandle, Consumer, ContextCallback, SnapshotPredicate};
pub use context::AnalysisContext;
pub use coordinator::{BuildCoordinator, CoordinatorStats};
pub use deps::DependencyState;
