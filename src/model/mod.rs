//! The statechart model graph.
//!
//! [`Model`] owns every node of a chart in flat arenas keyed by identifier.
//! Ownership edges (region → states, state → regions, state → transitions)
//! are ordered id lists inside the owning node; back-links (state → parent
//! region, region → parent state, transition → destination, action ref →
//! action) are plain ids resolved through the model. Nothing holds a pointer
//! into another node, so removing a subtree can never leave one dangling.
//!
//! All mutations run to completion or fail without side effects: they
//! validate their inputs and reserve capacity first, then link.

pub mod error;
mod teardown;

pub use error::ModelError;
pub use teardown::Teardown;

use crate::core::{
    Action, ActionId, ActionKind, ActionRef, ActionRefId, ActionTable, Geometry, Region,
    RegionId, State, StateId, StateKind, Transition, TransitionId,
};
use std::collections::{HashMap, HashSet};

/// A whole statechart document.
#[derive(Clone, Debug)]
pub struct Model {
    name: String,
    actions: ActionTable,
    root: RegionId,
    states: HashMap<StateId, State>,
    regions: HashMap<RegionId, Region>,
    transition_owners: HashMap<TransitionId, StateId>,
    action_refs: HashSet<ActionRefId>,
}

impl Model {
    /// Create an empty model with a root region named `Root`.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_root(name.into(), RegionId::new(), "Root".to_string())
    }

    pub(crate) fn with_root(name: String, root: RegionId, root_name: String) -> Self {
        let mut regions = HashMap::new();
        regions.insert(root, Region::new(root, root_name, None));
        Self {
            name,
            actions: ActionTable::new(),
            root,
            states: HashMap::new(),
            regions,
            transition_owners: HashMap::new(),
            action_refs: HashSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn root_region(&self) -> RegionId {
        self.root
    }

    pub fn actions(&self) -> &ActionTable {
        &self.actions
    }

    pub fn action(&self, id: ActionId) -> Option<&Action> {
        self.actions.get(id)
    }

    pub fn state(&self, id: StateId) -> Option<&State> {
        self.states.get(&id)
    }

    pub fn region(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(&id)
    }

    pub fn transition(&self, id: TransitionId) -> Option<&Transition> {
        let source = self.transition_owners.get(&id)?;
        self.states
            .get(source)?
            .transitions
            .iter()
            .find(|t| t.id == id)
    }

    pub fn contains_state(&self, id: StateId) -> bool {
        self.states.contains_key(&id)
    }

    /// All states, in no particular order.
    pub fn states(&self) -> impl Iterator<Item = &State> {
        self.states.values()
    }

    /// All regions including the root, in no particular order.
    pub fn regions(&self) -> impl Iterator<Item = &Region> {
        self.regions.values()
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Number of regions, including the root region.
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    pub fn transition_count(&self) -> usize {
        self.transition_owners.len()
    }

    pub fn action_ref_count(&self) -> usize {
        self.action_refs.len()
    }

    fn state_ref(&self, id: StateId) -> Result<&State, ModelError> {
        self.states.get(&id).ok_or(ModelError::UnknownState { id })
    }

    fn state_mut(&mut self, id: StateId) -> Result<&mut State, ModelError> {
        self.states
            .get_mut(&id)
            .ok_or(ModelError::UnknownState { id })
    }

    fn region_mut(&mut self, id: RegionId) -> Result<&mut Region, ModelError> {
        self.regions
            .get_mut(&id)
            .ok_or(ModelError::UnknownRegion { id })
    }

    fn transition_mut(&mut self, id: TransitionId) -> Result<&mut Transition, ModelError> {
        let source = *self
            .transition_owners
            .get(&id)
            .ok_or(ModelError::UnknownTransition { id })?;
        self.states
            .get_mut(&source)
            .and_then(|state| state.transitions.iter_mut().find(|t| t.id == id))
            .ok_or(ModelError::UnknownTransition { id })
    }


    /// Register a new action.
    pub fn add_action(
        &mut self,
        name: impl Into<String>,
        kind: ActionKind,
    ) -> Result<ActionId, ModelError> {
        self.insert_action(Action::new(name, kind))
    }

    /// Register an action that already carries its identifier.
    pub fn insert_action(&mut self, action: Action) -> Result<ActionId, ModelError> {
        tracing::debug!(action = %action.id(), kind = %action.kind(), "registering action '{}'", action.name());
        self.actions
            .insert(action)
            .map_err(|action| ModelError::DuplicateId {
                id: action.id().into(),
            })
    }

    /// Remove an action from the table.
    ///
    /// Refused while any state or transition still references the action.
    pub fn remove_action(&mut self, id: ActionId) -> Result<Action, ModelError> {
        if !self.actions.contains(id) {
            return Err(ModelError::UnknownAction { id });
        }
        let references = self.references_to(id);
        if references > 0 {
            tracing::warn!(action = %id, references, "refusing to remove referenced action");
            return Err(ModelError::ActionInUse { id, references });
        }
        self.actions
            .remove(id)
            .ok_or(ModelError::UnknownAction { id })
    }

    /// Count the action references that point at `id`.
    pub fn references_to(&self, id: ActionId) -> usize {
        self.states
            .values()
            .flat_map(State::action_refs)
            .filter(|r| r.action() == id)
            .count()
    }


    /// Append a new state to the end of `region`.
    pub fn add_state(
        &mut self,
        region: RegionId,
        name: impl Into<String>,
        kind: StateKind,
    ) -> Result<StateId, ModelError> {
        self.insert_state(region, StateId::new(), name.into(), kind)
    }

    pub(crate) fn insert_state(
        &mut self,
        region_id: RegionId,
        id: StateId,
        name: String,
        kind: StateKind,
    ) -> Result<StateId, ModelError> {
        if self.states.contains_key(&id) {
            return Err(ModelError::DuplicateId { id: id.into() });
        }
        let region = self
            .regions
            .get_mut(&region_id)
            .ok_or(ModelError::UnknownRegion { id: region_id })?;
        region.states.try_reserve(1)?;
        self.states.try_reserve(1)?;

        tracing::debug!(state = %id, region = %region_id, %kind, "adding state '{}'", name);
        region.states.push(id);
        self.states.insert(id, State::new(id, name, kind, region_id));
        Ok(id)
    }

    pub fn rename_state(&mut self, id: StateId, name: impl Into<String>) -> Result<(), ModelError> {
        self.state_mut(id)?.name = name.into();
        Ok(())
    }

    /// Change a state's kind. Resets `resizeable` to the new kind's default.
    pub fn set_state_kind(&mut self, id: StateId, kind: StateKind) -> Result<(), ModelError> {
        let state = self.state_mut(id)?;
        if state.is_composite() && !kind.can_own_regions() {
            return Err(ModelError::RegionNotAllowed { state: id, kind });
        }
        state.kind = kind;
        state.resizeable = kind.is_resizeable();
        Ok(())
    }

    /// Move a state. Coordinates must be finite.
    pub fn set_state_position(&mut self, id: StateId, x: f64, y: f64) -> Result<(), ModelError> {
        finite("x", x)?;
        finite("y", y)?;
        let geometry = &mut self.state_mut(id)?.geometry;
        geometry.x = x;
        geometry.y = y;
        Ok(())
    }

    pub fn set_state_size(
        &mut self,
        id: StateId,
        width: f64,
        height: f64,
    ) -> Result<(), ModelError> {
        finite("width", width)?;
        finite("height", height)?;
        let geometry = &mut self.state_mut(id)?.geometry;
        geometry.width = width;
        geometry.height = height;
        Ok(())
    }

    pub fn set_state_geometry(&mut self, id: StateId, geometry: Geometry) -> Result<(), ModelError> {
        finite("x", geometry.x)?;
        finite("y", geometry.y)?;
        finite("width", geometry.width)?;
        finite("height", geometry.height)?;
        self.state_mut(id)?.geometry = geometry;
        Ok(())
    }

    pub fn state_position(&self, id: StateId) -> Result<(f64, f64), ModelError> {
        let geometry = self.state_ref(id)?.geometry;
        Ok((geometry.x, geometry.y))
    }

    pub fn state_size(&self, id: StateId) -> Result<(f64, f64), ModelError> {
        let geometry = self.state_ref(id)?.geometry;
        Ok((geometry.width, geometry.height))
    }

    /// `root` followed by all of its descendant states, parents before
    /// children.
    pub fn subtree(&self, root: StateId) -> Result<Vec<StateId>, ModelError> {
        self.state_ref(root)?;
        let mut order = Vec::new();
        let mut pending = vec![root];
        while let Some(id) = pending.pop() {
            let Some(state) = self.states.get(&id) else {
                continue;
            };
            order.push(id);
            for region in state.regions.iter().rev() {
                if let Some(region) = self.regions.get(region) {
                    pending.extend(region.states.iter().rev());
                }
            }
        }
        Ok(order)
    }


    /// Append a new region to the end of `state`'s region list.
    pub fn add_region(
        &mut self,
        state: StateId,
        name: impl Into<String>,
    ) -> Result<RegionId, ModelError> {
        self.insert_region(state, RegionId::new(), name.into())
    }

    pub(crate) fn insert_region(
        &mut self,
        state_id: StateId,
        id: RegionId,
        name: String,
    ) -> Result<RegionId, ModelError> {
        if self.regions.contains_key(&id) {
            return Err(ModelError::DuplicateId { id: id.into() });
        }
        let state = self
            .states
            .get_mut(&state_id)
            .ok_or(ModelError::UnknownState { id: state_id })?;
        if !state.kind.can_own_regions() {
            tracing::warn!(state = %state_id, kind = %state.kind, "region rejected on pseudostate");
            return Err(ModelError::RegionNotAllowed {
                state: state_id,
                kind: state.kind,
            });
        }
        state.regions.try_reserve(1)?;
        self.regions.try_reserve(1)?;

        tracing::debug!(region = %id, state = %state_id, "adding region '{}' to '{}'", name, state.name);
        state.regions.push(id);
        self.regions
            .insert(id, Region::new(id, name, Some(state_id)));
        Ok(id)
    }

    pub fn rename_region(&mut self, id: RegionId, name: impl Into<String>) -> Result<(), ModelError> {
        self.region_mut(id)?.name = name.into();
        Ok(())
    }

    pub fn set_region_off_page(&mut self, id: RegionId, off_page: bool) -> Result<(), ModelError> {
        self.region_mut(id)?.off_page = off_page;
        Ok(())
    }

    pub fn set_region_draw_as_root(
        &mut self,
        id: RegionId,
        draw_as_root: bool,
    ) -> Result<(), ModelError> {
        self.region_mut(id)?.draw_as_root = draw_as_root;
        Ok(())
    }

    /// Override the region's height; `None` makes it fill its parent state.
    pub fn set_region_height(&mut self, id: RegionId, height: Option<f64>) -> Result<(), ModelError> {
        if let Some(value) = height {
            finite("height", value)?;
        }
        self.region_mut(id)?.height = height;
        Ok(())
    }


    /// Bind an entry action to `state`.
    ///
    /// `action` must name an action registered as [`ActionKind::Entry`].
    pub fn add_entry(&mut self, state: StateId, action: ActionId) -> Result<ActionRefId, ModelError> {
        self.attach_state_ref(state, ActionRefId::new(), action, ActionKind::Entry)
    }

    /// Bind an exit action to `state`.
    ///
    /// `action` must name an action registered as [`ActionKind::Exit`].
    pub fn add_exit(&mut self, state: StateId, action: ActionId) -> Result<ActionRefId, ModelError> {
        self.attach_state_ref(state, ActionRefId::new(), action, ActionKind::Exit)
    }

    pub(crate) fn restore_entry(
        &mut self,
        state: StateId,
        id: ActionRefId,
        action: ActionId,
    ) -> Result<ActionRefId, ModelError> {
        self.attach_state_ref(state, id, action, ActionKind::Entry)
    }

    pub(crate) fn restore_exit(
        &mut self,
        state: StateId,
        id: ActionRefId,
        action: ActionId,
    ) -> Result<ActionRefId, ModelError> {
        self.attach_state_ref(state, id, action, ActionKind::Exit)
    }

    fn attach_state_ref(
        &mut self,
        state_id: StateId,
        id: ActionRefId,
        action: ActionId,
        kind: ActionKind,
    ) -> Result<ActionRefId, ModelError> {
        if self.action_refs.contains(&id) {
            return Err(ModelError::DuplicateId { id: id.into() });
        }
        let state = self
            .states
            .get_mut(&state_id)
            .ok_or(ModelError::UnknownState { id: state_id })?;
        let Some(found) = self.actions.lookup(action, kind) else {
            tracing::error!(state = %state_id, action = %action, "unknown {} action", kind);
            return Err(ModelError::UnresolvedAction {
                action,
                expected: kind,
            });
        };
        let list = if kind == ActionKind::Exit {
            &mut state.exits
        } else {
            &mut state.entries
        };
        list.try_reserve(1)?;
        self.action_refs.try_reserve(1)?;

        tracing::debug!(state = %state_id, "adding {} action '{}' to '{}'", kind, found.name(), state.name);
        list.push(ActionRef::new(id, action));
        self.action_refs.insert(id);
        Ok(id)
    }

    /// Remove the first entry reference to `action` from `state`.
    pub fn remove_entry(&mut self, state: StateId, action: ActionId) -> Result<ActionRef, ModelError> {
        self.detach_state_ref(state, action, ActionKind::Entry)
    }

    /// Remove the first exit reference to `action` from `state`.
    pub fn remove_exit(&mut self, state: StateId, action: ActionId) -> Result<ActionRef, ModelError> {
        self.detach_state_ref(state, action, ActionKind::Exit)
    }

    fn detach_state_ref(
        &mut self,
        state_id: StateId,
        action: ActionId,
        kind: ActionKind,
    ) -> Result<ActionRef, ModelError> {
        let state = self.state_mut(state_id)?;
        let list = if kind == ActionKind::Exit {
            &mut state.exits
        } else {
            &mut state.entries
        };
        let index = list
            .iter()
            .position(|r| r.action() == action)
            .ok_or(ModelError::ActionRefNotFound {
                owner: state_id.into(),
                action,
                kind,
            })?;
        let removed = list.remove(index);
        self.action_refs.remove(&removed.id());
        Ok(removed)
    }


    /// Add a transition from `source` to `destination`, appended to the end
    /// of the source's transition list.
    pub fn add_transition(
        &mut self,
        source: StateId,
        destination: StateId,
    ) -> Result<TransitionId, ModelError> {
        self.insert_transition(TransitionId::new(), source, destination)
    }

    pub(crate) fn insert_transition(
        &mut self,
        id: TransitionId,
        source: StateId,
        destination: StateId,
    ) -> Result<TransitionId, ModelError> {
        if self.transition_owners.contains_key(&id) {
            return Err(ModelError::DuplicateId { id: id.into() });
        }
        if !self.states.contains_key(&destination) {
            return Err(ModelError::UnknownState { id: destination });
        }
        let state = self
            .states
            .get_mut(&source)
            .ok_or(ModelError::UnknownState { id: source })?;
        state.transitions.try_reserve(1)?;
        self.transition_owners.try_reserve(1)?;

        tracing::debug!(transition = %id, %source, %destination, "adding transition");
        state
            .transitions
            .push(Transition::new(id, source, destination));
        self.transition_owners.insert(id, source);
        Ok(id)
    }

    /// Outgoing transitions of `state` in insertion order.
    pub fn transitions(&self, state: StateId) -> Result<&[Transition], ModelError> {
        Ok(&self.state_ref(state)?.transitions)
    }

    /// Detach a transition from its source state and return it.
    ///
    /// The remaining transitions of the source keep their order.
    pub fn delete_transition(&mut self, id: TransitionId) -> Result<Transition, ModelError> {
        let source = *self
            .transition_owners
            .get(&id)
            .ok_or(ModelError::UnknownTransition { id })?;
        let state = self
            .states
            .get_mut(&source)
            .ok_or(ModelError::UnknownState { id: source })?;
        let index = state
            .transitions
            .iter()
            .position(|t| t.id == id)
            .ok_or(ModelError::UnknownTransition { id })?;

        tracing::debug!(transition = %id, %source, "deleting transition");
        self.transition_owners.remove(&id);
        let removed = state.transitions.remove(index);
        for effect in &removed.effects {
            self.action_refs.remove(&effect.id());
        }
        Ok(removed)
    }

    /// Bind an effect action to a transition.
    pub fn add_transition_effect(
        &mut self,
        transition: TransitionId,
        action: ActionId,
    ) -> Result<ActionRefId, ModelError> {
        self.restore_effect(transition, ActionRefId::new(), action)
    }

    pub(crate) fn restore_effect(
        &mut self,
        transition: TransitionId,
        id: ActionRefId,
        action: ActionId,
    ) -> Result<ActionRefId, ModelError> {
        if self.actions.lookup(action, ActionKind::Effect).is_none() {
            tracing::error!(%transition, %action, "unknown effect action");
            return Err(ModelError::UnresolvedAction {
                action,
                expected: ActionKind::Effect,
            });
        }
        if self.action_refs.contains(&id) {
            return Err(ModelError::DuplicateId { id: id.into() });
        }
        self.action_refs.try_reserve(1)?;
        let transition = self.transition_mut(transition)?;
        transition.effects.try_reserve(1)?;
        transition.effects.push(ActionRef::new(id, action));
        self.action_refs.insert(id);
        Ok(id)
    }

    /// Remove the first effect reference to `action` from a transition.
    pub fn remove_transition_effect(
        &mut self,
        transition: TransitionId,
        action: ActionId,
    ) -> Result<ActionRef, ModelError> {
        let transition_ref = self.transition_mut(transition)?;
        let index = transition_ref
            .effects
            .iter()
            .position(|r| r.action() == action)
            .ok_or(ModelError::ActionRefNotFound {
                owner: transition.into(),
                action,
                kind: ActionKind::Effect,
            })?;
        let removed = transition_ref.effects.remove(index);
        self.action_refs.remove(&removed.id());
        Ok(removed)
    }
}

fn finite(field: &'static str, value: f64) -> Result<(), ModelError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ModelError::NonFinite { field, value })
    }
}
