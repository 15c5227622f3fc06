//! The four interactive operations layered on the build coordinator.
//!
//! Each operation module exposes one `run` entry point and is a thin
//! two-phase façade: phase 1 obtains a validated
//! [`AnalysisContext`](lumen_engine::AnalysisContext) through
//! [`BuildCoordinator::request`](lumen_engine::BuildCoordinator::request)
//! (shared, cacheable), and phase 2 runs the operation-specific collaborator
//! against that context under its operation lock. `Failure` and `Cancelled`
//! outcomes from phase 1 are forwarded to the client unchanged.
//!
//! None of the operations mutate invocation-key identity or dependency
//! state. Code completion inserts a single transient marker into a private
//! copy of the input text; the shared context is never touched.

#![warn(missing_docs)]

mod two_phase;

#[cfg(test)]
pub(crate) mod test_util;

pub mod complete;
pub mod conforming;
pub mod cursor;
pub mod type_context;
