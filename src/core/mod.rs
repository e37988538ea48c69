//! Core chart types.
//!
//! This module contains the plain data of the statechart graph:
//! - Identifier newtypes for every entity
//! - States, regions and transitions
//! - Actions, the action table and action references
//!
//! The types here hold no cross-entity logic. Linking them into a graph and
//! keeping that graph consistent is the job of [`Model`](crate::model::Model).

mod action;
mod id;
mod kind;
mod region;
mod state;
mod transition;

pub use action::{Action, ActionKind, ActionRef, ActionTable};
pub use id::{ActionId, ActionRefId, RegionId, StateId, TransitionId};
pub use kind::{StateKind, UnknownKind};
pub use region::Region;
pub use state::{Geometry, State};
pub use transition::Transition;
