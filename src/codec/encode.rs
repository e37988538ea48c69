//! Model → document.
//!
//! Records are assembled bottom-up from an explicit pre-order listing of the
//! subtree: walking that listing backwards guarantees every child record is
//! finished before its parent needs it. Serialization never mutates the
//! model.

use super::json;
use super::{
    ActionRecord, ActionRefRecord, CodecError, Document, RegionRecord, StateRecord,
    TransitionRecord, WriteOptions, DOCUMENT_VERSION,
};
use crate::core::{ActionRef, Region, RegionId, State, StateId, Transition};
use crate::model::{Model, ModelError};
use chrono::Utc;
use serde_json::Value;
use std::collections::HashMap;

/// Serialize a state and everything it owns into a standalone record.
pub fn serialize_state(model: &Model, id: StateId) -> Result<StateRecord, CodecError> {
    let order = model.subtree(id)?;
    let mut finished: HashMap<StateId, StateRecord> = HashMap::with_capacity(order.len());

    for state_id in order.into_iter().rev() {
        let state = model
            .state(state_id)
            .ok_or(ModelError::UnknownState { id: state_id })?;

        let mut regions = Vec::with_capacity(state.regions().len());
        for region_id in state.regions() {
            let region = model
                .region(*region_id)
                .ok_or(ModelError::UnknownRegion { id: *region_id })?;
            let states = region
                .states()
                .iter()
                .map(|member| {
                    finished
                        .remove(member)
                        .ok_or_else(|| CodecError::InvalidStructure {
                            reason: format!("state {member} listed twice or outside its region"),
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;
            regions.push(region_record(region, states));
        }

        finished.insert(state_id, state_record(state, regions));
    }

    finished
        .remove(&id)
        .ok_or_else(|| CodecError::InvalidStructure {
            reason: format!("state {id} was not serialized"),
        })
}

/// Serialize a region and all of its states.
pub fn serialize_region(model: &Model, id: RegionId) -> Result<RegionRecord, CodecError> {
    let region = model.region(id).ok_or(ModelError::UnknownRegion { id })?;
    let states = region
        .states()
        .iter()
        .map(|member| serialize_state(model, *member))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(region_record(region, states))
}

/// Serialize `state` and append it to the end of `parent`'s state list.
pub fn append_state<'p>(
    model: &Model,
    state: StateId,
    parent: &'p mut RegionRecord,
) -> Result<&'p StateRecord, CodecError> {
    let record = serialize_state(model, state)?;
    parent.states.push(record);
    let index = parent.states.len() - 1;
    Ok(&parent.states[index])
}

/// Serialize `state` and append it to the `states` array of an untyped
/// parent region node.
pub fn append_state_value(
    model: &Model,
    state: StateId,
    parent: &mut Value,
) -> Result<(), CodecError> {
    let Some(Value::Array(states)) = parent.get_mut("states") else {
        tracing::error!(%state, "parent node has no 'states' array");
        return Err(CodecError::InvalidStructure {
            reason: "parent node has no 'states' array".to_string(),
        });
    };
    let record = serialize_state(model, state)?;
    states.push(json::to_value(&record)?);
    Ok(())
}

/// Serialize the whole model.
pub fn to_document(model: &Model) -> Result<Document, CodecError> {
    let root = serialize_region(model, model.root_region())?;
    let actions = model
        .actions()
        .iter()
        .map(|action| ActionRecord {
            id: Some(action.id().to_string()),
            name: Some(action.name().to_string()),
            kind: Some(action.kind().to_string()),
        })
        .collect();

    Ok(Document {
        version: DOCUMENT_VERSION,
        name: model.name().to_string(),
        saved_at: Some(Utc::now()),
        actions,
        root: Some(root),
    })
}

pub fn to_json_value(model: &Model) -> Result<Value, CodecError> {
    Ok(json::to_value(&to_document(model)?)?)
}

pub fn to_json_string(model: &Model, options: WriteOptions) -> Result<String, CodecError> {
    let document = to_document(model)?;
    let text = json::to_string(&document, options.pretty)?;
    tracing::debug!(model = model.name(), bytes = text.len(), "serialized model");
    Ok(text)
}

fn state_record(state: &State, regions: Vec<RegionRecord>) -> StateRecord {
    let geometry = state.geometry();
    StateRecord {
        id: Some(state.id().to_string()),
        name: Some(state.name().to_string()),
        kind: Some(state.kind().as_str().to_string()),
        x: geometry.x,
        y: geometry.y,
        width: geometry.width,
        height: geometry.height,
        entries: action_refs(state.entries()),
        exits: action_refs(state.exits()),
        region: regions,
        transitions: state.transitions().iter().map(transition_record).collect(),
    }
}

fn region_record(region: &Region, states: Vec<StateRecord>) -> RegionRecord {
    RegionRecord {
        id: Some(region.id().to_string()),
        name: region.name().to_string(),
        off_page: region.is_off_page(),
        draw_as_root: region.draws_as_root(),
        height: region.height(),
        states,
    }
}

fn transition_record(transition: &Transition) -> TransitionRecord {
    TransitionRecord {
        id: Some(transition.id().to_string()),
        source: Some(transition.source().to_string()),
        destination: Some(transition.destination().to_string()),
        effects: action_refs(transition.effects()),
    }
}

fn action_refs(refs: &[ActionRef]) -> Vec<ActionRefRecord> {
    refs.iter()
        .map(|r| ActionRefRecord {
            id: Some(r.id().to_string()),
            action_id: Some(r.action().to_string()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ActionKind, StateKind};
    use serde_json::json;

    fn sample() -> (Model, StateId) {
        let mut model = Model::new("sample");
        let enter = model.add_action("enter", ActionKind::Entry).unwrap();
        let leave = model.add_action("leave", ActionKind::Exit).unwrap();
        let root = model.root_region();
        let top = model.add_state(root, "Top", StateKind::Normal).unwrap();
        model.set_state_position(top, 5.0, 6.0).unwrap();
        model.set_state_size(top, 200.0, 100.0).unwrap();
        model.add_entry(top, enter).unwrap();
        model.add_exit(top, leave).unwrap();
        let lane = model.add_region(top, "lane").unwrap();
        let init = model.add_state(lane, "", StateKind::Initial).unwrap();
        let idle = model.add_state(lane, "Idle", StateKind::Normal).unwrap();
        model.add_transition(init, idle).unwrap();
        (model, top)
    }

    #[test]
    fn state_record_carries_all_fields() {
        let (model, top) = sample();
        let record = serialize_state(&model, top).unwrap();

        assert_eq!(record.id, Some(top.to_string()));
        assert_eq!(record.name.as_deref(), Some("Top"));
        assert_eq!(record.kind.as_deref(), Some("state"));
        assert_eq!((record.x, record.y, record.width, record.height), (5.0, 6.0, 200.0, 100.0));
        assert_eq!(record.entries.len(), 1);
        assert_eq!(record.exits.len(), 1);
        assert_eq!(record.region.len(), 1);

        let lane = &record.region[0];
        assert_eq!(lane.name, "lane");
        let kinds: Vec<_> = lane.states.iter().map(|s| s.kind.as_deref()).collect();
        assert_eq!(kinds, vec![Some("init"), Some("state")]);
        assert_eq!(lane.states[0].transitions.len(), 1);
    }

    #[test]
    fn append_state_adds_to_parent() {
        let (model, top) = sample();
        let mut parent = RegionRecord::default();

        let appended = append_state(&model, top, &mut parent).unwrap();
        assert_eq!(appended.name.as_deref(), Some("Top"));
        assert_eq!(parent.states.len(), 1);
    }

    #[test]
    fn append_state_value_requires_states_array() {
        let (model, top) = sample();

        let mut missing = json!({"id": "x", "name": "r"});
        let result = append_state_value(&model, top, &mut missing);
        assert!(matches!(result, Err(CodecError::InvalidStructure { .. })));
        assert_eq!(missing, json!({"id": "x", "name": "r"}));

        let mut parent = json!({"name": "r", "states": []});
        append_state_value(&model, top, &mut parent).unwrap();
        assert_eq!(parent["states"][0]["name"], "Top");
        assert!(parent["states"][0]["entries"][0].get("action-id").is_some());
    }

    #[test]
    fn serialization_does_not_mutate_model() {
        let (model, top) = sample();
        let before = (model.state_count(), model.region_count(), model.transition_count());

        serialize_state(&model, top).unwrap();
        to_document(&model).unwrap();

        assert_eq!(
            (model.state_count(), model.region_count(), model.transition_count()),
            before
        );
    }

    #[test]
    fn document_lists_actions_in_order() {
        let (model, _) = sample();
        let document = to_document(&model).unwrap();

        assert_eq!(document.version, DOCUMENT_VERSION);
        let kinds: Vec<_> = document.actions.iter().map(|a| a.kind.as_deref()).collect();
        assert_eq!(kinds, vec![Some("entry"), Some("exit")]);
        assert_eq!(document.root.unwrap().states.len(), 1);
    }

    #[test]
    fn deep_chain_is_serialized_and_dropped_without_recursion() {
        const DEPTH: usize = 100_000;

        let mut model = Model::new("deep");
        let mut region = model.root_region();
        for i in 0..DEPTH {
            let state = model
                .add_state(region, format!("S{i}"), StateKind::Normal)
                .unwrap();
            region = model.add_region(state, "r").unwrap();
        }

        let document = to_document(&model).unwrap();
        let mut depth = 0;
        let mut level = document.root.as_ref().unwrap();
        while let Some(state) = level.states.first() {
            depth += 1;
            match state.region.first() {
                Some(next) => level = next,
                None => break,
            }
        }
        assert_eq!(depth, DEPTH);
        drop(document);
    }

    #[test]
    fn unknown_state_cannot_be_serialized() {
        let (model, _) = sample();
        let result = serialize_state(&model, StateId::new());
        assert!(matches!(
            result,
            Err(CodecError::Model(ModelError::UnknownState { .. }))
        ));
    }
}
