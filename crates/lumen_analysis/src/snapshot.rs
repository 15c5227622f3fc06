//! The opaque output of one analyzer build.

use serde::{Deserialize, Serialize};

/// Byte offsets of the delimiters of an executable-body region.
///
/// Offsets strictly between `open` and `close` lie inside the body. Bodies
/// are the regions that can be reanalyzed against an otherwise-unchanged
/// declaration skeleton, so they drive the "locally reanalyzable" reuse
/// policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyRegion {
    /// Byte offset of the opening delimiter.
    pub open: usize,
    /// Byte offset of the closing delimiter.
    pub close: usize,
}

impl BodyRegion {
    /// Returns `true` if `offset` falls strictly inside this body.
    ///
    /// Offsets on the delimiters themselves do not qualify: an edit there
    /// can change the skeleton's shape.
    pub fn contains_strictly(&self, offset: usize) -> bool {
        offset > self.open && offset < self.close
    }
}

/// Kind of a summarized declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclKind {
    /// A free function.
    Function,
    /// A named type declaration.
    Type,
}

/// One declaration in the analyzed primary file, as recorded by the build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclSummary {
    /// Declared name.
    pub name: String,
    /// What kind of declaration this is.
    pub kind: DeclKind,
    /// Byte offset where the declaration starts.
    pub start: usize,
    /// Byte offset one past the end of the declaration.
    pub end: usize,
    /// The executable-body region, if the declaration has one.
    pub body: Option<BodyRegion>,
}

/// A diagnostic produced during the build, kept with the snapshot so
/// second-phase operations can surface it without re-running analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotDiagnostic {
    /// Human-readable message.
    pub message: String,
    /// Byte offset the diagnostic points at.
    pub offset: usize,
}

/// The cached output of a full analyzer build for one invocation key.
///
/// Owned exclusively by the context that caches it; read-only to all
/// first-phase consumers.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSnapshot {
    primary_text: String,
    decls: Vec<DeclSummary>,
    diagnostics: Vec<SnapshotDiagnostic>,
    from_memory: bool,
}

impl AnalysisSnapshot {
    /// Assembles a snapshot from the analyzer's outputs.
    ///
    /// `from_memory` marks snapshots built from unsaved in-memory edits
    /// rather than on-disk files; such snapshots are only reusable by
    /// consumers that explicitly accept them.
    pub fn new(
        primary_text: String,
        decls: Vec<DeclSummary>,
        diagnostics: Vec<SnapshotDiagnostic>,
        from_memory: bool,
    ) -> Self {
        Self {
            primary_text,
            decls,
            diagnostics,
            from_memory,
        }
    }

    /// The primary file's text as analyzed.
    pub fn primary_text(&self) -> &str {
        &self.primary_text
    }

    /// The declarations recorded by the build.
    pub fn decls(&self) -> &[DeclSummary] {
        &self.decls
    }

    /// The diagnostics recorded by the build.
    pub fn diagnostics(&self) -> &[SnapshotDiagnostic] {
        &self.diagnostics
    }

    /// Whether this snapshot was built from in-memory edits.
    pub fn is_from_memory(&self) -> bool {
        self.from_memory
    }

    /// Iterates over all executable-body regions.
    pub fn body_regions(&self) -> impl Iterator<Item = BodyRegion> + '_ {
        self.decls.iter().filter_map(|d| d.body)
    }

    /// Finds the declaration whose extent contains `offset`, if any.
    pub fn decl_at(&self, offset: usize) -> Option<&DeclSummary> {
        self.decls
            .iter()
            .find(|d| offset >= d.start && offset < d.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AnalysisSnapshot {
        AnalysisSnapshot::new(
            "fn a() { 1 } type T".to_string(),
            vec![
                DeclSummary {
                    name: "a".to_string(),
                    kind: DeclKind::Function,
                    start: 0,
                    end: 12,
                    body: Some(BodyRegion { open: 7, close: 11 }),
                },
                DeclSummary {
                    name: "T".to_string(),
                    kind: DeclKind::Type,
                    start: 13,
                    end: 19,
                    body: None,
                },
            ],
            vec![],
            false,
        )
    }

    #[test]
    fn strictly_inside_body() {
        let region = BodyRegion { open: 7, close: 11 };
        assert!(region.contains_strictly(8));
        assert!(region.contains_strictly(10));
        assert!(!region.contains_strictly(7), "opening delimiter is outside");
        assert!(!region.contains_strictly(11), "closing delimiter is outside");
        assert!(!region.contains_strictly(0));
    }

    #[test]
    fn decl_lookup() {
        let snapshot = sample();
        assert_eq!(snapshot.decl_at(5).unwrap().name, "a");
        assert_eq!(snapshot.decl_at(14).unwrap().name, "T");
        assert!(snapshot.decl_at(100).is_none());
    }

    #[test]
    fn body_regions_skip_bodiless_decls() {
        let snapshot = sample();
        assert_eq!(snapshot.body_regions().count(), 1);
    }
}
