//! Result payloads of the four interactive operations.

use crate::snapshot::DeclKind;
use serde::{Deserialize, Serialize};

/// Transient marker inserted into a private copy of the primary text to
/// drive the analyzer's completion pass.
///
/// A private-use codepoint that cannot occur in valid source text. The
/// marked copy must never be visible to other consumers of the same shared
/// snapshot.
pub const COMPLETION_MARKER: char = '\u{F8FF}';

/// Client-supplied options for a completion request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionOptions {
    /// Upper bound on the number of items returned, if any.
    pub max_results: Option<usize>,
}

/// One completion item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionItem {
    /// The text presented (and inserted) for this item.
    pub label: String,
    /// What kind of entity the item refers to.
    pub kind: DeclKind,
    /// Optional extra information shown alongside the label.
    pub detail: Option<String>,
}

/// The outcome of a completion pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionResult {
    /// Items in analyzer order; ranking is a client concern.
    pub items: Vec<CompletionItem>,
}

/// Description of the entity under the cursor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorInfo {
    /// The entity's declared name.
    pub name: String,
    /// The entity's declaration kind.
    pub kind: DeclKind,
    /// Byte offset of the entity's declaration.
    pub decl_offset: usize,
}

/// The expected type at a position, if the surrounding context implies one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeContextInfo {
    /// Name of the expected type, if any.
    pub expected_type: Option<String>,
}

/// Methods that would satisfy the requested protocols at a position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConformingMethodList {
    /// Names of conforming methods.
    pub methods: Vec<String>,
}

/// Errors reported by second-phase operation collaborators.
///
/// These are recoverable: the façade converts them into a `Failure` outcome
/// for the requesting client and the shared cache state is unaffected.
#[derive(Debug, thiserror::Error)]
pub enum OperationError {
    /// The requested offset lies outside the analyzed text.
    #[error("offset {offset} is out of range for a file of {len} bytes")]
    OffsetOutOfRange {
        /// The offending offset.
        offset: usize,
        /// The analyzed text's length.
        len: usize,
    },

    /// No entity exists at the requested offset.
    #[error("no entity at offset {offset}")]
    NoEntity {
        /// The queried offset.
        offset: usize,
    },

    /// The collaborator failed internally.
    #[error("operation failed: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_result_serializes() {
        let result = CompletionResult {
            items: vec![CompletionItem {
                label: "render".to_string(),
                kind: DeclKind::Function,
                detail: Some("fn render()".to_string()),
            }],
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"render\""));
        assert!(json.contains("\"function\""));
        let back: CompletionResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }

    #[test]
    fn error_display() {
        let err = OperationError::OffsetOutOfRange { offset: 99, len: 10 };
        assert_eq!(
            format!("{err}"),
            "offset 99 is out of range for a file of 10 bytes"
        );
        let err = OperationError::NoEntity { offset: 4 };
        assert_eq!(format!("{err}"), "no entity at offset 4");
    }

    #[test]
    fn marker_is_private_use() {
        assert!(('\u{E000}'..='\u{F8FF}').contains(&COMPLETION_MARKER));
    }
}
