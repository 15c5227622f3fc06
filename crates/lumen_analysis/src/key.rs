//! Normalized identity of "what to build".

use lumen_common::ContentHash;
use std::path::{Path, PathBuf};

/// Identifies which analysis a request wants: the normalized invocation
/// argument list plus the primary file being analyzed.
///
/// Two keys are equal iff their argument lists are equal element-for-element
/// and in order, and their primary-file paths are equal. Equality is the
/// sole criterion for cache reuse eligibility; there is no semantic diffing
/// of arguments ("-I a -I b" and "-I b -I a" are different keys).
///
/// Immutable once constructed. The digest is derived from the other fields
/// at construction time and is a convenience for logging and hashing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InvocationKey {
    args: Vec<String>,
    primary_file: PathBuf,
    digest: ContentHash,
}

impl InvocationKey {
    /// Creates a key from an already-normalized argument list and the
    /// primary file path.
    pub fn new(args: Vec<String>, primary_file: impl Into<PathBuf>) -> Self {
        let primary_file = primary_file.into();
        let digest = ContentHash::from_parts(
            args.iter()
                .map(|a| a.as_bytes())
                .chain(std::iter::once(primary_file.as_os_str().as_encoded_bytes())),
        );
        Self {
            args,
            primary_file,
            digest,
        }
    }

    /// The normalized invocation arguments, in order.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// The primary file this invocation analyzes.
    pub fn primary_file(&self) -> &Path {
        &self.primary_file
    }

    /// The derived digest over arguments and primary file.
    pub fn digest(&self) -> ContentHash {
        self.digest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_keys() {
        let a = InvocationKey::new(vec!["-O1".into(), "-target=x".into()], "main.lum");
        let b = InvocationKey::new(vec!["-O1".into(), "-target=x".into()], "main.lum");
        assert_eq!(a, b);
        assert_eq!(a.digest(), b.digest());
    }

    #[test]
    fn argument_order_matters() {
        let a = InvocationKey::new(vec!["-a".into(), "-b".into()], "main.lum");
        let b = InvocationKey::new(vec!["-b".into(), "-a".into()], "main.lum");
        assert_ne!(a, b);
    }

    #[test]
    fn primary_file_matters() {
        let a = InvocationKey::new(vec!["-a".into()], "main.lum");
        let b = InvocationKey::new(vec!["-a".into()], "other.lum");
        assert_ne!(a, b);
    }

    #[test]
    fn argument_grouping_matters_for_digest() {
        let a = InvocationKey::new(vec!["-ab".into(), "c".into()], "main.lum");
        let b = InvocationKey::new(vec!["-a".into(), "bc".into()], "main.lum");
        assert_ne!(a.digest(), b.digest());
    }

    #[test]
    fn accessors() {
        let key = InvocationKey::new(vec!["-O1".into()], "src/main.lum");
        assert_eq!(key.args(), ["-O1".to_string()]);
        assert_eq!(key.primary_file(), Path::new("src/main.lum"));
    }
}
