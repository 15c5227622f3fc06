//! Cursor inspection: what entity is under this offset?

use crate::two_phase;
use lumen_analysis::{CursorInfo, InvocationKey, Operations};
use lumen_common::CancellableOutcome;
use lumen_engine::{BuildCoordinator, CancellationHandle, SnapshotPredicate};
use std::sync::Arc;

/// Requests a description of the entity at `offset` in the file identified
/// by `key`.
pub fn run(
    coordinator: &BuildCoordinator,
    operations: Arc<dyn Operations>,
    key: InvocationKey,
    offset: usize,
    accept_snapshot: Option<SnapshotPredicate>,
    on_result: impl FnOnce(CancellableOutcome<CursorInfo>) + Send + 'static,
) -> CancellationHandle {
    two_phase::run(
        coordinator,
        "cursor_info",
        key,
        offset,
        accept_snapshot,
        move |ctx| operations.run_cursor_info(ctx.snapshot(), offset).into(),
        on_result,
    )
}
