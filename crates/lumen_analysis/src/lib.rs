//! The analyzer collaborator boundary for the Lumen analysis service.
//!
//! This crate defines what the cache core needs to know about the semantic
//! analyzer without depending on its internals: the [`InvocationKey`]
//! identifying "which analysis" a request wants, the opaque
//! [`AnalysisSnapshot`] a build produces, dependency [`Fingerprint`]s, the
//! [`Analyzer`] and [`Operations`] traits the real front end implements,
//! and the serializable result payloads of the four interactive operations.
//!
//! [`fake::FakeAnalyzer`] is a scripted in-memory implementation of both
//! traits used by the engine and operation test suites.

#![warn(missing_docs)]

pub mod analyzer;
pub mod fake;
pub mod key;
pub mod results;
pub mod snapshot;

pub use analyzer::{Analyzer, Fingerprint, Operations};
pub use key::InvocationKey;
pub use results::{
    CompletionItem, CompletionOptions, CompletionResult, ConformingMethodList, CursorInfo,
    OperationError, TypeContextInfo, COMPLETION_MARKER,
};
pub use snapshot::{AnalysisSnapshot, BodyRegion, DeclKind, DeclSummary, SnapshotDiagnostic};
