//! Expected-type queries: what type does this position call for?

use crate::two_phase;
use lumen_analysis::{InvocationKey, Operations, TypeContextInfo};
use lumen_common::CancellableOutcome;
use lumen_engine::{BuildCoordinator, CancellationHandle, SnapshotPredicate};
use std::sync::Arc;

/// Requests the type implied by the context around `offset` in the file
/// identified by `key`.
pub fn run(
    coordinator: &BuildCoordinator,
    operations: Arc<dyn Operations>,
    key: InvocationKey,
    offset: usize,
    accept_snapshot: Option<SnapshotPredicate>,
    on_result: impl FnOnce(CancellableOutcome<TypeContextInfo>) + Send + 'static,
) -> CancellationHandle {
    two_phase::run(
        coordinator,
        "type_context",
        key,
        offset,
        accept_snapshot,
        move |ctx| operations.run_type_context(ctx.snapshot(), offset).into(),
        on_result,
    )
}
