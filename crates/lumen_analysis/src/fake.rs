//! A scripted in-memory analyzer for exercising the cache core.
//!
//! `FakeAnalyzer` stands in for the real front end in tests: sources live in
//! an in-memory file map, builds are counted, can be held open at a gate (to
//! observe single-flight joining), and can be made to fail on demand. The
//! "language" it understands is a toy subset — `fn name() { ... }` function
//! declarations, `type Name { ... }` type declarations, and `use "path";`
//! dependency lines — just enough structure for body-region and dependency
//! tracking to be meaningful.

use crate::analyzer::{Analyzer, Fingerprint, Operations};
use crate::key::InvocationKey;
use crate::results::{
    CompletionItem, CompletionOptions, CompletionResult, ConformingMethodList, CursorInfo,
    OperationError, TypeContextInfo, COMPLETION_MARKER,
};
use crate::snapshot::{AnalysisSnapshot, BodyRegion, DeclKind, DeclSummary, SnapshotDiagnostic};
use lumen_common::{CancelFlag, CancellableOutcome, ContentHash};
use parking_lot::{Condvar, Mutex};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Scripted analyzer backed by an in-memory file map.
#[derive(Default)]
pub struct FakeAnalyzer {
    files: Mutex<HashMap<PathBuf, String>>,
    builds: AtomicU64,
    fail_next: Mutex<Option<String>>,
    gate_held: Mutex<bool>,
    gate_released: Condvar,
    from_memory: AtomicBool,
}

impl FakeAnalyzer {
    /// Creates an empty analyzer with no files and no scripted behavior.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a file in the in-memory file map.
    pub fn set_file(&self, path: impl Into<PathBuf>, text: impl Into<String>) {
        self.files.lock().insert(path.into(), text.into());
    }

    /// Removes a file, as if it were deleted from disk.
    pub fn remove_file(&self, path: &Path) {
        self.files.lock().remove(path);
    }

    /// Number of times [`Analyzer::build_context`] has been entered.
    pub fn build_count(&self) -> u64 {
        self.builds.load(Ordering::SeqCst)
    }

    /// Makes the next build fail with the given message.
    pub fn fail_next_build(&self, message: impl Into<String>) {
        *self.fail_next.lock() = Some(message.into());
    }

    /// Holds all subsequent builds open at a gate until
    /// [`release_builds`](Self::release_builds) is called.
    pub fn hold_builds(&self) {
        *self.gate_held.lock() = true;
    }

    /// Releases builds held at the gate.
    pub fn release_builds(&self) {
        let mut held = self.gate_held.lock();
        *held = false;
        self.gate_released.notify_all();
    }

    /// Marks subsequently built snapshots as coming from in-memory edits.
    pub fn set_from_memory(&self, from_memory: bool) {
        self.from_memory.store(from_memory, Ordering::SeqCst);
    }

    fn wait_at_gate(&self) {
        let mut held = self.gate_held.lock();
        while *held {
            self.gate_released.wait(&mut held);
        }
    }
}

impl Analyzer for FakeAnalyzer {
    fn build_context(
        &self,
        key: &InvocationKey,
        cancel: CancelFlag,
    ) -> CancellableOutcome<AnalysisSnapshot> {
        self.builds.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = self.fail_next.lock().take() {
            return CancellableOutcome::Failure(message);
        }
        if cancel.is_triggered() {
            return CancellableOutcome::Cancelled;
        }

        self.wait_at_gate();

        // Safe point after the (possibly long) wait.
        if cancel.is_triggered() {
            return CancellableOutcome::Cancelled;
        }

        let text = match self.files.lock().get(key.primary_file()) {
            Some(text) => text.clone(),
            None => {
                return CancellableOutcome::Failure(format!(
                    "unreadable primary file: {}",
                    key.primary_file().display()
                ))
            }
        };

        let decls = scan_decls(&text);
        let diagnostics = scan_diagnostics(&text);
        CancellableOutcome::Success(AnalysisSnapshot::new(
            text,
            decls,
            diagnostics,
            self.from_memory.load(Ordering::SeqCst),
        ))
    }

    fn list_dependencies(&self, snapshot: &AnalysisSnapshot) -> Vec<PathBuf> {
        let mut deps = Vec::new();
        for line in snapshot.primary_text().lines() {
            let line = line.trim();
            if let Some(rest) = line.strip_prefix("use \"") {
                if let Some(end) = rest.find('"') {
                    deps.push(PathBuf::from(&rest[..end]));
                }
            }
        }
        deps
    }

    fn fingerprint(&self, path: &Path) -> Option<Fingerprint> {
        self.files
            .lock()
            .get(path)
            .map(|text| Fingerprint::Content(ContentHash::from_bytes(text.as_bytes())))
    }
}

impl Operations for FakeAnalyzer {
    fn run_completion(
        &self,
        marked_text: &str,
        _offset: usize,
        options: &CompletionOptions,
    ) -> Result<CompletionResult, OperationError> {
        if !marked_text.contains(COMPLETION_MARKER) {
            return Err(OperationError::Internal(
                "completion marker missing from input text".to_string(),
            ));
        }

        let mut items: Vec<CompletionItem> = scan_decls(marked_text)
            .into_iter()
            .map(|d| CompletionItem {
                detail: Some(format!("{:?} {}", d.kind, d.name)),
                label: d.name,
                kind: d.kind,
            })
            .collect();
        if let Some(max) = options.max_results {
            items.truncate(max);
        }
        Ok(CompletionResult { items })
    }

    fn run_cursor_info(
        &self,
        snapshot: &AnalysisSnapshot,
        offset: usize,
    ) -> Result<CursorInfo, OperationError> {
        if offset > snapshot.primary_text().len() {
            return Err(OperationError::OffsetOutOfRange {
                offset,
                len: snapshot.primary_text().len(),
            });
        }
        snapshot
            .decl_at(offset)
            .map(|d| CursorInfo {
                name: d.name.clone(),
                kind: d.kind,
                decl_offset: d.start,
            })
            .ok_or(OperationError::NoEntity { offset })
    }

    fn run_type_context(
        &self,
        snapshot: &AnalysisSnapshot,
        offset: usize,
    ) -> Result<TypeContextInfo, OperationError> {
        if offset > snapshot.primary_text().len() {
            return Err(OperationError::OffsetOutOfRange {
                offset,
                len: snapshot.primary_text().len(),
            });
        }
        let inside_body = snapshot.body_regions().any(|r| r.contains_strictly(offset));
        Ok(TypeContextInfo {
            expected_type: inside_body.then(|| "Unit".to_string()),
        })
    }

    fn run_conforming_methods(
        &self,
        snapshot: &AnalysisSnapshot,
        offset: usize,
        protocols: &[String],
    ) -> Result<ConformingMethodList, OperationError> {
        if protocols.is_empty() {
            return Err(OperationError::Internal(
                "no protocols requested".to_string(),
            ));
        }
        if offset > snapshot.primary_text().len() {
            return Err(OperationError::OffsetOutOfRange {
                offset,
                len: snapshot.primary_text().len(),
            });
        }
        let methods = snapshot
            .decls()
            .iter()
            .filter(|d| d.kind == DeclKind::Function)
            .map(|d| d.name.clone())
            .collect();
        Ok(ConformingMethodList { methods })
    }
}

/// Scans the toy language for `fn` and `type` declarations.
fn scan_decls(text: &str) -> Vec<DeclSummary> {
    let bytes = text.as_bytes();
    let mut decls = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let (kind, kw_len) = if keyword_at(text, i, "fn ") {
            (DeclKind::Function, 3)
        } else if keyword_at(text, i, "type ") {
            (DeclKind::Type, 5)
        } else {
            i += 1;
            continue;
        };

        let start = i;
        let name_start = i + kw_len;
        let name_end = text[name_start..]
            .find(|c: char| !(c.is_alphanumeric() || c == '_'))
            .map_or(text.len(), |rel| name_start + rel);
        let name = &text[name_start..name_end];
        if name.is_empty() {
            i = name_start;
            continue;
        }

        let Some(open) = text[name_end..].find('{').map(|rel| name_end + rel) else {
            i = name_end;
            continue;
        };
        let Some(close) = matching_brace(bytes, open) else {
            i = open + 1;
            continue;
        };

        decls.push(DeclSummary {
            name: name.to_string(),
            kind,
            start,
            end: close + 1,
            // Type bodies are skeleton, not executable code.
            body: (kind == DeclKind::Function).then_some(BodyRegion { open, close }),
        });
        i = close + 1;
    }
    decls
}

/// Returns `true` if `kw` starts at byte `i` on a word boundary.
///
/// Compares raw bytes: `i` may fall mid-codepoint while scanning, and a
/// match there is impossible since keywords start with ASCII.
fn keyword_at(text: &str, i: usize, kw: &str) -> bool {
    let bytes = text.as_bytes();
    if !bytes[i..].starts_with(kw.as_bytes()) {
        return false;
    }
    i == 0 || !(bytes[i - 1].is_ascii_alphanumeric() || bytes[i - 1] == b'_')
}

/// Finds the byte offset of the brace matching the one at `open`.
fn matching_brace(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, &b) in bytes.iter().enumerate().skip(open) {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Unresolved `??` placeholders become diagnostics.
fn scan_diagnostics(text: &str) -> Vec<SnapshotDiagnostic> {
    text.match_indices("??")
        .map(|(offset, _)| SnapshotDiagnostic {
            message: "unresolved placeholder".to_string(),
            offset,
        })
        .collect()
}
