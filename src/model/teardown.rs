//! Subtree deletion.
//!
//! Nesting depth is controlled by whoever wrote the document, so teardown
//! never recurses. Two explicit worklists drive it: `to_visit` holds states
//! whose children have not been discovered yet, `to_release` collects every
//! state and region found on the way. Auxiliary memory is bounded by the
//! subtree's node count, not by its depth.

use super::{Model, ModelError};
use crate::core::{RegionId, StateId};
use std::collections::HashSet;

/// What a deletion removed from the model.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Teardown {
    pub states: usize,
    pub regions: usize,
    pub transitions: usize,
    pub action_refs: usize,
}

enum Node {
    State(StateId),
    Region(RegionId),
}

impl Model {
    /// Delete a state together with everything it transitively owns.
    ///
    /// Transitions elsewhere in the model that point into the deleted
    /// subtree are removed as well.
    pub fn delete_state(&mut self, id: StateId) -> Result<Teardown, ModelError> {
        let parent = self.state_ref(id)?.parent;

        // Unlink first so the parent region never lists a released state.
        if let Some(region) = self.regions.get_mut(&parent) {
            region.states.retain(|member| *member != id);
        }

        tracing::debug!(state = %id, region = %parent, "deleting state");
        Ok(self.release(vec![id], Vec::new()))
    }

    /// Delete a non-root region together with all of its states.
    pub fn delete_region(&mut self, id: RegionId) -> Result<Teardown, ModelError> {
        let region = self
            .regions
            .get(&id)
            .ok_or(ModelError::UnknownRegion { id })?;
        let Some(parent) = region.parent else {
            return Err(ModelError::RootRegion);
        };
        let members = region.states.clone();

        if let Some(state) = self.states.get_mut(&parent) {
            state.regions.retain(|member| *member != id);
        }

        tracing::debug!(region = %id, state = %parent, "deleting region");
        Ok(self.release(members, vec![Node::Region(id)]))
    }

    fn release(&mut self, seeds: Vec<StateId>, mut to_release: Vec<Node>) -> Teardown {
        let mut summary = Teardown::default();
        let mut to_visit = seeds;

        while let Some(state_id) = to_visit.pop() {
            let Some(state) = self.states.get_mut(&state_id) else {
                continue;
            };
            to_release.push(Node::State(state_id));

            for action_ref in state.action_refs() {
                self.action_refs.remove(&action_ref.id());
                summary.action_refs += 1;
            }
            state.entries = Vec::new();
            state.exits = Vec::new();
            for transition in state.transitions.drain(..) {
                self.transition_owners.remove(&transition.id);
                summary.transitions += 1;
            }

            for region_id in &state.regions {
                to_release.push(Node::Region(*region_id));
                if let Some(region) = self.regions.get(region_id) {
                    to_visit.extend(region.states.iter().copied());
                }
            }
        }

        let mut released = HashSet::new();
        while let Some(node) = to_release.pop() {
            match node {
                Node::State(id) => {
                    if self.states.remove(&id).is_some() {
                        released.insert(id);
                        summary.states += 1;
                    }
                }
                Node::Region(id) => {
                    if self.regions.remove(&id).is_some() {
                        summary.regions += 1;
                    }
                }
            }
        }

        let incoming = self.drop_transitions_into(&released);
        summary.transitions += incoming.0;
        summary.action_refs += incoming.1;

        tracing::debug!(
            states = summary.states,
            regions = summary.regions,
            transitions = summary.transitions,
            "released subtree"
        );
        summary
    }

    /// Remove transitions whose destination is in `released`. Returns the
    /// number of transitions and effect references dropped.
    fn drop_transitions_into(&mut self, released: &HashSet<StateId>) -> (usize, usize) {
        if released.is_empty() {
            return (0, 0);
        }
        let mut dropped = (0, 0);
        for state in self.states.values_mut() {
            let owners = &mut self.transition_owners;
            let refs = &mut self.action_refs;
            state.transitions.retain(|t| {
                if released.contains(&t.destination) {
                    owners.remove(&t.id);
                    for effect in &t.effects {
                        refs.remove(&effect.id());
                    }
                    dropped.0 += 1;
                    dropped.1 += t.effects.len();
                    false
                } else {
                    true
                }
            });
        }
        dropped
    }
}
