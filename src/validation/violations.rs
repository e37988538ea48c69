//! Well-formedness violations.

use crate::core::{RegionId, StateId, StateKind, TransitionId};
use thiserror::Error;

/// A chart shape the editor accepts but a code generator would reject.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum Violation {
    #[error("region {region} has {count} initial states")]
    MultipleInitialStates { region: RegionId, count: usize },

    #[error("initial state {state} has {count} outgoing transitions, expected exactly one")]
    InitialTransitionCount { state: StateId, count: usize },

    #[error("'{kind}' state {state} has outgoing transition {transition}")]
    TransitionFromFinal {
        state: StateId,
        kind: StateKind,
        transition: TransitionId,
    },

    #[error("transition {transition} targets initial state {state}")]
    TransitionIntoInitial {
        transition: TransitionId,
        state: StateId,
    },

    #[error("state {state} has an empty name")]
    UnnamedState { state: StateId },

    #[error("Custom check failed: {message}")]
    CustomCheckFailed { message: String },
}
