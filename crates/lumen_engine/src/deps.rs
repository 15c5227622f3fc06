//! Per-file dependency fingerprints and rate-limited staleness checks.

use lumen_analysis::{Analyzer, Fingerprint};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// The dependency fingerprints captured when a context was last built,
/// plus the time of the last staleness check.
///
/// Staleness is only re-evaluated when the configured check interval has
/// elapsed; between checks the state is optimistically assumed fresh. Only
/// the dependency set recorded here is ever compared — files a hypothetical
/// rebuild would newly depend on are irrelevant until that rebuild happens.
#[derive(Debug)]
pub struct DependencyState {
    /// Recorded fingerprint per dependency. `None` means the file could not
    /// be read at capture time.
    fingerprints: HashMap<PathBuf, Option<Fingerprint>>,
    last_checked: Instant,
}

impl DependencyState {
    /// Fingerprints the given files through the analyzer and records the
    /// result, stamping the capture as "just checked".
    pub fn capture(analyzer: &dyn Analyzer, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        let fingerprints = paths
            .into_iter()
            .map(|path| {
                let fp = analyzer.fingerprint(&path);
                (path, fp)
            })
            .collect();
        Self {
            fingerprints,
            last_checked: Instant::now(),
        }
    }

    /// Returns `true` once `interval` has elapsed since the last check.
    pub fn is_due(&self, interval: Duration) -> bool {
        self.last_checked.elapsed() >= interval
    }

    /// Re-fingerprints the recorded dependency set and compares.
    ///
    /// Returns `true` if anything changed. A dependency that has
    /// disappeared counts as changed. Recorded fingerprints are updated in
    /// place so a subsequent check compares against the latest observation.
    /// The caller enforces the rate limit via [`is_due`](Self::is_due).
    pub fn refresh_and_compare(&mut self, analyzer: &dyn Analyzer) -> bool {
        self.last_checked = Instant::now();
        let mut changed = false;
        for (path, recorded) in &mut self.fingerprints {
            let current = analyzer.fingerprint(path);
            if current != *recorded {
                changed = true;
                *recorded = current;
            }
        }
        changed
    }

    /// The recorded dependency paths.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.fingerprints.keys().map(PathBuf::as_path)
    }

    /// Number of recorded dependencies.
    pub fn len(&self) -> usize {
        self.fingerprints.len()
    }

    /// Returns `true` if no dependencies were recorded.
    pub fn is_empty(&self) -> bool {
        self.fingerprints.is_empty()
    }
}
