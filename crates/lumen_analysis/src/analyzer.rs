//! Traits implemented by the semantic analyzer collaborator.

use crate::key::InvocationKey;
use crate::results::{
    CompletionOptions, CompletionResult, ConformingMethodList, CursorInfo, OperationError,
    TypeContextInfo,
};
use crate::snapshot::AnalysisSnapshot;
use lumen_common::{CancelFlag, CancellableOutcome, ContentHash};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// A cheap proxy for "has this input file changed".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fingerprint {
    /// XXH3 hash of the file's content.
    Content(ContentHash),
    /// Last-modified timestamp, for backends where hashing is too costly.
    Modified(SystemTime),
}

/// The batch semantic analyzer, consumed as an opaque "build a context"
/// operation that can fail or be cooperatively interrupted.
///
/// Implementations may block for a non-trivial duration in
/// [`build_context`](Analyzer::build_context); the scheduler never calls it
/// while holding its metadata lock. The other two methods must be cheap.
pub trait Analyzer: Send + Sync {
    /// Runs a full parse + typecheck for `key`.
    ///
    /// The analyzer polls `cancel` at safe points; it is legal to finish
    /// anyway after cancellation and have the result discarded.
    fn build_context(
        &self,
        key: &InvocationKey,
        cancel: CancelFlag,
    ) -> CancellableOutcome<AnalysisSnapshot>;

    /// Lists the files the given build actually depended on.
    fn list_dependencies(&self, snapshot: &AnalysisSnapshot) -> Vec<PathBuf>;

    /// Fingerprints one file, or `None` if it cannot be read.
    fn fingerprint(&self, path: &Path) -> Option<Fingerprint>;
}

/// The operation-specific second-phase computations, each pure with respect
/// to the shared snapshot.
///
/// `run_completion` receives a private copy of the primary text with the
/// transient [`COMPLETION_MARKER`](crate::COMPLETION_MARKER) inserted at the
/// requested offset; the shared snapshot is never mutated.
pub trait Operations: Send + Sync {
    /// Computes completion items at `offset` within `marked_text`.
    fn run_completion(
        &self,
        marked_text: &str,
        offset: usize,
        options: &CompletionOptions,
    ) -> Result<CompletionResult, OperationError>;

    /// Describes the entity under the cursor at `offset`.
    fn run_cursor_info(
        &self,
        snapshot: &AnalysisSnapshot,
        offset: usize,
    ) -> Result<CursorInfo, OperationError>;

    /// Computes the expected type at `offset`, if one is implied.
    fn run_type_context(
        &self,
        snapshot: &AnalysisSnapshot,
        offset: usize,
    ) -> Result<TypeContextInfo, OperationError>;

    /// Lists methods that would satisfy the named protocols at `offset`.
    fn run_conforming_methods(
        &self,
        snapshot: &AnalysisSnapshot,
        offset: usize,
        protocols: &[String],
    ) -> Result<ConformingMethodList, OperationError>;
}
