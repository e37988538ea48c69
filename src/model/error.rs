//! Errors from graph mutations.

use crate::core::{ActionId, ActionKind, RegionId, StateId, StateKind, TransitionId};
use std::collections::TryReserveError;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur when mutating a [`Model`](super::Model).
///
/// Every mutation that returns one of these leaves the model exactly as it
/// was before the call.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("state not found: {id}")]
    UnknownState { id: StateId },

    #[error("region not found: {id}")]
    UnknownRegion { id: RegionId },

    #[error("transition not found: {id}")]
    UnknownTransition { id: TransitionId },

    #[error("action not found: {id}")]
    UnknownAction { id: ActionId },

    #[error("no {expected} action with id {action}")]
    UnresolvedAction {
        action: ActionId,
        expected: ActionKind,
    },

    #[error("no {kind} reference to action {action} on {owner}")]
    ActionRefNotFound {
        owner: Uuid,
        action: ActionId,
        kind: ActionKind,
    },

    #[error("action {id} is still referenced {references} time(s)")]
    ActionInUse { id: ActionId, references: usize },

    #[error("a '{kind}' state cannot own regions (state {state})")]
    RegionNotAllowed { state: StateId, kind: StateKind },

    #[error("the root region cannot be deleted")]
    RootRegion,

    #[error("{field} must be a finite number, got {value}")]
    NonFinite { field: &'static str, value: f64 },

    #[error("identifier already in use: {id}")]
    DuplicateId { id: Uuid },

    #[error("allocation failed: {0}")]
    OutOfMemory(#[from] TryReserveError),
}

impl ModelError {
    /// Returns a stable error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            ModelError::UnresolvedAction { .. } => "UNRESOLVED_ACTION",
            ModelError::RegionNotAllowed { .. } => "INVALID_STRUCTURE",
            ModelError::DuplicateId { .. } => "DUPLICATE_ID",
            ModelError::OutOfMemory(_) => "OUT_OF_MEMORY",
            ModelError::UnknownState { .. }
            | ModelError::UnknownRegion { .. }
            | ModelError::UnknownTransition { .. }
            | ModelError::UnknownAction { .. }
            | ModelError::ActionRefNotFound { .. }
            | ModelError::ActionInUse { .. }
            | ModelError::NonFinite { .. }
            | ModelError::RootRegion => "INVALID_OPERATION",
        }
    }
}
