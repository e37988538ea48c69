//! Transitions between states.

use super::action::ActionRef;
use super::id::{StateId, TransitionId};

/// Directed edge from `source` to `destination`.
///
/// A transition is owned by its source state. The destination is held by id
/// and resolved against the model on demand.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    pub(crate) id: TransitionId,
    pub(crate) source: StateId,
    pub(crate) destination: StateId,
    pub(crate) effects: Vec<ActionRef>,
}

impl Transition {
    pub(crate) fn new(id: TransitionId, source: StateId, destination: StateId) -> Self {
        Self {
            id,
            source,
            destination,
            effects: Vec::new(),
        }
    }

    pub fn id(&self) -> TransitionId {
        self.id
    }

    pub fn source(&self) -> StateId {
        self.source
    }

    pub fn destination(&self) -> StateId {
        self.destination
    }

    /// Effect action references in document order.
    pub fn effects(&self) -> &[ActionRef] {
        &self.effects
    }

    pub fn is_self_transition(&self) -> bool {
        self.source == self.destination
    }
}
