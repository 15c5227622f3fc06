//! Shared fixtures for the façade tests.

use crossbeam_channel::Receiver;
use lumen_analysis::fake::FakeAnalyzer;
use lumen_analysis::InvocationKey;
use lumen_common::CancellableOutcome;
use lumen_config::ServiceConfig;
use lumen_engine::BuildCoordinator;
use std::sync::Arc;
use std::time::Duration;

pub(crate) const SOURCE: &str =
    "use \"lib.lum\";\nfn alpha() { let x = 1; }\ntype Point { x }\nfn beta() { alpha() }\n";

/// An analyzer with one primary file and one dependency, wired into a
/// coordinator that never re-checks dependencies on its own.
pub(crate) fn harness() -> (Arc<FakeAnalyzer>, BuildCoordinator, InvocationKey) {
    let analyzer = Arc::new(FakeAnalyzer::new());
    analyzer.set_file("main.lum", SOURCE);
    analyzer.set_file("lib.lum", "fn lib() { }");
    let config = ServiceConfig {
        max_ast_reuse_count: 100,
        dependency_check_interval: Duration::from_secs(3600),
    };
    let coordinator = BuildCoordinator::new(analyzer.clone(), config);
    (analyzer, coordinator, InvocationKey::new(vec![], "main.lum"))
}

pub(crate) fn recv<T>(rx: &Receiver<CancellableOutcome<T>>) -> CancellableOutcome<T> {
    rx.recv_timeout(Duration::from_secs(5)).expect("delivery")
}
