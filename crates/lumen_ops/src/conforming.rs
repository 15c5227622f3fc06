//! Conforming-method queries: which methods satisfy these protocols here?

use crate::two_phase;
use lumen_analysis::{ConformingMethodList, InvocationKey, Operations};
use lumen_common::CancellableOutcome;
use lumen_engine::{BuildCoordinator, CancellationHandle, SnapshotPredicate};
use std::sync::Arc;

/// Requests the methods that would satisfy `protocols` at `offset` in the
/// file identified by `key`.
pub fn run(
    coordinator: &BuildCoordinator,
    operations: Arc<dyn Operations>,
    key: InvocationKey,
    offset: usize,
    protocols: Vec<String>,
    accept_snapshot: Option<SnapshotPredicate>,
    on_result: impl FnOnce(CancellableOutcome<ConformingMethodList>) + Send + 'static,
) -> CancellationHandle {
    two_phase::run(
        coordinator,
        "conforming_methods",
        key,
        offset,
        accept_snapshot,
        move |ctx| {
            operations
                .run_conforming_methods(ctx.snapshot(), offset, &protocols)
                .into()
        },
        on_result,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{harness, recv, SOURCE};
    use lumen_common::OutcomeKind;

    #[test]
    fn lists_functions_for_a_protocol() {
        let (analyzer, coordinator, key) = harness();
        let (tx, rx) = crossbeam_channel::bounded(1);

        run(
            &coordinator,
            analyzer,
            key,
            SOURCE.find("let x").unwrap(),
            vec!["Renderable".to_string()],
            None,
            move |result| {
                let _ = tx.send(result);
            },
        );
        let list = recv(&rx).success().expect("conforming methods should succeed");
        assert_eq!(list.methods, ["alpha", "beta"]);
    }

    #[test]
    fn empty_protocol_list_is_a_failure() {
        let (analyzer, coordinator, key) = harness();
        let (tx, rx) = crossbeam_channel::bounded(1);

        run(
            &coordinator,
            analyzer,
            key,
            SOURCE.find("let x").unwrap(),
            vec![],
            None,
            move |result| {
                let _ = tx.send(result);
            },
        );
        assert_eq!(recv(&rx).kind(), OutcomeKind::Failure);
    }
}
