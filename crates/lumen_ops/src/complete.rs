//! Code completion at a cursor position.

use crate::two_phase;
use lumen_analysis::{CompletionOptions, CompletionResult, InvocationKey, Operations};
use lumen_common::CancellableOutcome;
use lumen_engine::{BuildCoordinator, CancellationHandle, SnapshotPredicate};
use std::sync::Arc;

/// Requests completion items at `offset` in the file identified by `key`.
///
/// A transient marker is inserted into a private copy of the primary text
/// to drive the collaborator's completion pass; the shared context is never
/// mutated and the marked copy is never visible to other consumers.
pub fn run(
    coordinator: &BuildCoordinator,
    operations: Arc<dyn Operations>,
    key: InvocationKey,
    offset: usize,
    options: CompletionOptions,
    accept_snapshot: Option<SnapshotPredicate>,
    on_result: impl FnOnce(CancellableOutcome<CompletionResult>) + Send + 'static,
) -> CancellationHandle {
    two_phase::run(
        coordinator,
        "code_complete",
        key,
        offset,
        accept_snapshot,
        move |ctx| match ctx.source_with_marker(offset) {
            Some(marked) => operations.run_completion(&marked, offset, &options).into(),
            None => CancellableOutcome::Failure(format!(
                "offset {offset} is not a valid position in the primary file"
            )),
        },
        on_result,
    )
}
