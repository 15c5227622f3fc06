//! Shared plumbing for the two-phase operation façades.

use lumen_analysis::InvocationKey;
use lumen_common::CancellableOutcome;
use lumen_engine::{AnalysisContext, BuildCoordinator, CancellationHandle, Consumer, SnapshotPredicate};
use std::sync::Arc;
use tracing::trace;

/// Submits a phase-1 context request and chains the operation-specific
/// phase 2 onto its delivery.
///
/// Phase 2 runs under the context's operation lock, on whichever thread
/// delivers the phase-1 outcome (the caller's on a cache hit, the build
/// thread otherwise). `Failure` and `Cancelled` pass through untouched.
/// The returned handle cancels the request; once the client has received
/// any result the handle is inert.
pub(crate) fn run<R, P, C>(
    coordinator: &BuildCoordinator,
    operation: &'static str,
    key: InvocationKey,
    offset: usize,
    accept_snapshot: Option<SnapshotPredicate>,
    phase2: P,
    on_result: C,
) -> CancellationHandle
where
    R: 'static,
    P: FnOnce(&AnalysisContext) -> CancellableOutcome<R> + Send + 'static,
    C: FnOnce(CancellableOutcome<R>) + Send + 'static,
{
    let (consumer, handle) = Consumer::new(Box::new(
        move |outcome: CancellableOutcome<Arc<AnalysisContext>>| {
            trace!(operation, offset, phase1 = %outcome.kind(), "phase 1 delivered");
            let result = outcome.and_then(|ctx| ctx.with_operation_lock(|| phase2(&ctx)));
            trace!(operation, offset, phase2 = %result.kind(), "phase 2 finished");
            on_result(result);
        },
    ));
    let consumer = match accept_snapshot {
        Some(predicate) => consumer.with_snapshot_predicate(predicate),
        None => consumer,
    };
    coordinator.request(key, offset, consumer);
    handle
}
