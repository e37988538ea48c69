//! Build errors for the model builder.

use crate::core::ActionKind;
use thiserror::Error;

/// Errors that can occur when building a model.
#[derive(Debug, Error, PartialEq)]
pub enum BuildError {
    #[error("Model name not specified. Call .name(name) before .build()")]
    MissingName,

    #[error("Action name must not be empty")]
    EmptyActionName,

    #[error("Duplicate {kind} action '{name}'")]
    DuplicateAction { name: String, kind: ActionKind },
}
