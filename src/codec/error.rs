//! Codec error types.

use crate::core::{StateId, TransitionId};
use crate::model::ModelError;
use thiserror::Error;

/// Errors that can occur while writing or reading documents.
#[derive(Debug, Error)]
pub enum CodecError {
    /// A required field is absent from a record
    #[error("missing required field '{field}' on {record} record")]
    MissingField {
        record: &'static str,
        field: &'static str,
    },

    /// An identifier is not a valid UUID
    #[error("malformed identifier in '{field}': '{value}'")]
    MalformedReference { field: &'static str, value: String },

    /// A state kind outside the closed set
    #[error("unknown state kind '{kind}'")]
    UnknownKind { kind: String },

    /// An action kind outside entry/exit/effect
    #[error("unknown action kind '{kind}'")]
    UnknownActionKind { kind: String },

    /// A transition endpoint that names no state in the model
    #[error("transition {transition} refers to unknown state {state}")]
    UnresolvedEndpoint {
        transition: TransitionId,
        state: StateId,
    },

    /// A document node lacks an expected child collection or is otherwise
    /// inconsistent
    #[error("invalid document structure: {reason}")]
    InvalidStructure { reason: String },

    /// Document version is not supported by this version
    #[error("unsupported document version {found}, supported: {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// The graph refused a node or edge
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Text is not valid JSON or does not match the record shapes
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CodecError {
    /// Returns a stable error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            CodecError::MissingField { .. } => "MISSING_FIELD",
            CodecError::MalformedReference { .. } => "MALFORMED_REFERENCE",
            CodecError::UnknownKind { .. } => "UNKNOWN_KIND",
            CodecError::UnknownActionKind { .. } => "UNKNOWN_KIND",
            CodecError::UnresolvedEndpoint { .. } => "UNRESOLVED_ENDPOINT",
            CodecError::InvalidStructure { .. } => "INVALID_STRUCTURE",
            CodecError::UnsupportedVersion { .. } => "UNSUPPORTED_VERSION",
            CodecError::Model(e) => e.error_code(),
            CodecError::Json(_) => "BAD_JSON",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ActionId, ActionKind};

    #[test]
    fn model_errors_keep_their_code() {
        let err = CodecError::from(ModelError::UnresolvedAction {
            action: ActionId::new(),
            expected: ActionKind::Exit,
        });
        assert_eq!(err.error_code(), "UNRESOLVED_ACTION");
    }

    #[test]
    fn codes_are_distinct_per_category() {
        let missing = CodecError::MissingField {
            record: "state",
            field: "kind",
        };
        let unknown = CodecError::UnknownKind {
            kind: "bogus".to_string(),
        };
        assert_eq!(missing.error_code(), "MISSING_FIELD");
        assert_eq!(unknown.error_code(), "UNKNOWN_KIND");
        assert_eq!(
            missing.to_string(),
            "missing required field 'kind' on state record"
        );
    }
}
