//! One built analysis result and its reuse bookkeeping.

use crate::deps::DependencyState;
use lumen_analysis::{AnalysisSnapshot, Analyzer, InvocationKey, COMPLETION_MARKER};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::{Duration, Instant};

/// The cached output of one successful analyzer build, plus the bookkeeping
/// the coordinator needs for its reuse decisions.
///
/// At most one context is the *current* cache entry at any time. A
/// superseded context survives as long as in-flight second-phase operations
/// still hold a reference to it (contexts are shared via `Arc`).
///
/// The snapshot payload is read-only to all first-phase consumers.
/// Second-phase operations that need scratch state serialize against the
/// per-context operation lock; the coordinator's own metadata lock is never
/// involved in phase 2.
pub struct AnalysisContext {
    key: InvocationKey,
    snapshot: AnalysisSnapshot,
    deps: Mutex<DependencyState>,
    reuse_count: AtomicU32,
    invalidated: AtomicBool,
    built_at: Instant,
    op_lock: Mutex<()>,
}

impl AnalysisContext {
    /// Wraps a freshly built snapshot with zeroed bookkeeping.
    pub fn new(key: InvocationKey, snapshot: AnalysisSnapshot, deps: DependencyState) -> Self {
        Self {
            key,
            snapshot,
            deps: Mutex::new(deps),
            reuse_count: AtomicU32::new(0),
            invalidated: AtomicBool::new(false),
            built_at: Instant::now(),
            op_lock: Mutex::new(()),
        }
    }

    /// The invocation key this context was built for.
    pub fn key(&self) -> &InvocationKey {
        &self.key
    }

    /// The analyzer's output.
    pub fn snapshot(&self) -> &AnalysisSnapshot {
        &self.snapshot
    }

    /// When the build that produced this context completed.
    pub fn built_at(&self) -> Instant {
        self.built_at
    }

    /// How many requests this context has served without a rebuild.
    pub fn reuse_count(&self) -> u32 {
        self.reuse_count.load(Ordering::Acquire)
    }

    /// Records one more reuse and returns the new count.
    pub(crate) fn increment_reuse(&self) -> u32 {
        self.reuse_count.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Marks this context as no longer reusable.
    ///
    /// May be called from any thread at any time; a single atomic store so
    /// that notification producers are never blocked.
    pub fn mark_invalidated(&self) {
        self.invalidated.store(true, Ordering::Release);
    }

    /// Whether this context has been invalidated.
    pub fn is_invalidated(&self) -> bool {
        self.invalidated.load(Ordering::Acquire)
    }

    /// Whether the dependency state is due for a fingerprint re-check.
    pub(crate) fn deps_due(&self, interval: Duration) -> bool {
        self.deps.lock().is_due(interval)
    }

    /// Re-fingerprints the recorded dependencies; `true` if anything changed.
    pub(crate) fn refresh_deps(&self, analyzer: &dyn Analyzer) -> bool {
        self.deps.lock().refresh_and_compare(analyzer)
    }

    /// Decides whether a request at `offset` can be answered by reanalyzing
    /// a single executable body against this context's skeleton.
    ///
    /// Offsets at declaration or file top level never qualify: the skeleton
    /// itself may have changed shape, so those force a full rebuild. Bodies
    /// are reanalyzed cheaply and often; skeletons conservatively and
    /// rarely.
    pub fn is_locally_reanalyzable(&self, offset: usize) -> bool {
        self.snapshot
            .body_regions()
            .any(|region| region.contains_strictly(offset))
    }

    /// Produces a private copy of the primary text with the transient
    /// completion marker inserted at `offset`.
    ///
    /// Returns `None` if `offset` is past the end of the text or not a
    /// character boundary. The shared snapshot is never mutated; the copy
    /// must not be visible to other consumers of this context.
    pub fn source_with_marker(&self, offset: usize) -> Option<String> {
        let text = self.snapshot.primary_text();
        if offset > text.len() || !text.is_char_boundary(offset) {
            return None;
        }
        let mut marked = String::with_capacity(text.len() + COMPLETION_MARKER.len_utf8());
        marked.push_str(&text[..offset]);
        marked.push(COMPLETION_MARKER);
        marked.push_str(&text[offset..]);
        Some(marked)
    }

    /// Runs `f` while holding this context's operation lock.
    ///
    /// Second-phase operations against the same context are serialized
    /// here; first-phase lookups for other contexts proceed concurrently.
    pub fn with_operation_lock<R>(&self, f: impl FnOnce() -> R) -> R {
        let _guard = self.op_lock.lock();
        f()
    }
}

impl std::fmt::Debug for AnalysisContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisContext")
            .field("key", &self.key.digest())
            .field("reuse_count", &self.reuse_count())
            .field("invalidated", &self.is_invalidated())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_analysis::fake::FakeAnalyzer;
    use lumen_common::CancelFlag;

    const SOURCE: &str = "fn alpha() { let x = 1; }\nfn beta() { alpha() }\n";

    fn build() -> AnalysisContext {
        let analyzer = FakeAnalyzer::new();
        analyzer.set_file("main.lum", SOURCE);
        let key = InvocationKey::new(vec![], "main.lum");
        let snapshot = analyzer
            .build_context(&key, CancelFlag::new())
            .success()
            .expect("build should succeed");
        let deps = DependencyState::capture(&analyzer, vec![]);
        AnalysisContext::new(key, snapshot, deps)
    }

    #[test]
    fn body_offsets_are_locally_reanalyzable() {
        let ctx = build();
        let inside_alpha = SOURCE.find("let x").unwrap();
        let inside_beta = SOURCE.rfind("alpha").unwrap();
        assert!(ctx.is_locally_reanalyzable(inside_alpha));
        assert!(ctx.is_locally_reanalyzable(inside_beta));
    }

    #[test]
    fn top_level_offsets_are_not() {
        let ctx = build();
        assert!(!ctx.is_locally_reanalyzable(0), "declaration keyword");
        assert!(
            !ctx.is_locally_reanalyzable(SOURCE.len()),
            "end of file is top level"
        );
    }

    #[test]
    fn reuse_count_increments() {
        let ctx = build();
        assert_eq!(ctx.reuse_count(), 0);
        assert_eq!(ctx.increment_reuse(), 1);
        assert_eq!(ctx.increment_reuse(), 2);
        assert_eq!(ctx.reuse_count(), 2);
    }

    #[test]
    fn invalidation_is_sticky() {
        let ctx = build();
        assert!(!ctx.is_invalidated());
        ctx.mark_invalidated();
        ctx.mark_invalidated();
        assert!(ctx.is_invalidated());
    }

    #[test]
    fn marker_insertion_is_private() {
        let ctx = build();
        let offset = SOURCE.find("let x").unwrap();
        let marked = ctx.source_with_marker(offset).unwrap();
        assert!(marked.contains(COMPLETION_MARKER));
        assert_eq!(marked.chars().filter(|&c| c == COMPLETION_MARKER).count(), 1);
        // The shared snapshot is untouched.
        assert!(!ctx.snapshot().primary_text().contains(COMPLETION_MARKER));
    }

    #[test]
    fn marker_rejects_out_of_range_offset() {
        let ctx = build();
        assert!(ctx.source_with_marker(SOURCE.len()).is_some(), "end is valid");
        assert!(ctx.source_with_marker(SOURCE.len() + 1).is_none());
    }

    #[test]
    fn operation_lock_runs_closure() {
        let ctx = build();
        let value = ctx.with_operation_lock(|| 42);
        assert_eq!(value, 42);
    }
}
