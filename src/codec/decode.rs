//! Document → model.
//!
//! Pass one walks the region/state tree with an explicit worklist and builds
//! every region and state, queueing transition records as it goes. Pass two
//! attaches the queued transitions once every state is resolvable by id.
//!
//! Each state record is fully parsed and its action references checked
//! before the state is linked into its region, so a bad record never leaves
//! a half-built node behind.

use super::json;
use super::{
    ActionRecord, ActionRefRecord, CodecError, Document, RegionRecord, StateRecord,
    TransitionRecord, DOCUMENT_VERSION,
};
use crate::core::{
    Action, ActionId, ActionKind, ActionRefId, Geometry, RegionId, StateId, StateKind,
    TransitionId, UnknownKind,
};
use crate::model::{Model, ModelError};
use serde_json::Value;
use std::str::FromStr;

/// Parse a JSON document into a new model.
pub fn from_json_str(text: &str) -> Result<Model, CodecError> {
    let document: Document = json::from_str(text)?;
    from_document(&document)
}

pub fn from_json_value(value: Value) -> Result<Model, CodecError> {
    let document: Document = json::from_value(value)?;
    from_document(&document)
}

/// Rebuild a model from a document.
///
/// Any failure discards everything built so far.
pub fn from_document(document: &Document) -> Result<Model, CodecError> {
    if document.version != DOCUMENT_VERSION {
        return Err(CodecError::UnsupportedVersion {
            found: document.version,
            supported: DOCUMENT_VERSION,
        });
    }
    let root = document
        .root
        .as_ref()
        .ok_or_else(|| CodecError::InvalidStructure {
            reason: "document has no root region".to_string(),
        })?;

    let root_id = match root.id.as_deref() {
        Some(text) => parse_id::<RegionId>("region.id", text)?,
        None => RegionId::new(),
    };
    let mut model = Model::with_root(document.name.clone(), root_id, root.name.clone());
    apply_region_flags(&mut model, root_id, root)?;

    for record in &document.actions {
        model.insert_action(decode_action(record)?)?;
    }

    let mut loader = Loader::new(&mut model);
    let result = loader
        .load_states(&root.states, root_id)
        .and_then(|_| loader.resolve_transitions());
    if let Err(e) = result {
        tracing::error!(model = %document.name, error = %e, "failed to load model");
        return Err(e);
    }

    tracing::debug!(
        model = %document.name,
        states = model.state_count(),
        transitions = model.transition_count(),
        "loaded model"
    );
    Ok(model)
}

/// Rebuild a single state record, with everything it owns, inside `region`
/// of an existing model.
///
/// Transition destinations are resolved against the whole model after the
/// subtree is built. On failure the region is left exactly as it was.
pub fn deserialize_state(
    model: &mut Model,
    record: &StateRecord,
    region: RegionId,
) -> Result<StateId, CodecError> {
    if model.region(region).is_none() {
        return Err(ModelError::UnknownRegion { id: region }.into());
    }

    let mut loader = Loader::new(model);
    let result = loader
        .load_states(std::slice::from_ref(record), region)
        .and_then(|created| loader.resolve_transitions().map(|()| created));

    match result {
        Ok(created) => created.first().copied().ok_or_else(|| CodecError::InvalidStructure {
            reason: "state record produced no state".to_string(),
        }),
        Err(e) => {
            tracing::warn!(%region, error = %e, "rolling back partially loaded state");
            for id in std::mem::take(&mut loader.top_level) {
                loader.discard(id);
            }
            Err(e)
        }
    }
}

struct Loader<'m, 'r> {
    model: &'m mut Model,
    pending: Vec<(StateId, &'r TransitionRecord)>,
    top_level: Vec<StateId>,
}

impl<'m, 'r> Loader<'m, 'r> {
    fn new(model: &'m mut Model) -> Self {
        Self {
            model,
            pending: Vec::new(),
            top_level: Vec::new(),
        }
    }

    /// Pass one: build `records` and all their descendants into `region`.
    /// Returns the states created directly in `region`, in order.
    fn load_states(
        &mut self,
        records: &'r [StateRecord],
        region: RegionId,
    ) -> Result<Vec<StateId>, CodecError> {
        let mut work: Vec<(&'r StateRecord, RegionId)> =
            records.iter().rev().map(|record| (record, region)).collect();

        while let Some((record, parent)) = work.pop() {
            let state = self.load_state(record, parent)?;
            if parent == region {
                self.top_level.push(state);
            }
            for region_record in &record.region {
                let child = self.load_region(region_record, state)?;
                work.extend(
                    region_record
                        .states
                        .iter()
                        .rev()
                        .map(|record| (record, child)),
                );
            }
        }

        Ok(self.top_level.clone())
    }

    fn load_state(
        &mut self,
        record: &'r StateRecord,
        region: RegionId,
    ) -> Result<StateId, CodecError> {
        let id = record.id.as_deref().ok_or(CodecError::MissingField {
            record: "state",
            field: "id",
        })?;
        let id = parse_id::<StateId>("state.id", id)?;
        let name = record.name.as_ref().ok_or(CodecError::MissingField {
            record: "state",
            field: "name",
        })?;
        let kind = record.kind.as_deref().ok_or(CodecError::MissingField {
            record: "state",
            field: "kind",
        })?;
        let kind = StateKind::from_str(kind).map_err(|UnknownKind(kind)| {
            tracing::error!(state = %id, "unknown state kind '{}'", kind);
            CodecError::UnknownKind { kind }
        })?;

        let entries = parse_refs(&record.entries)?;
        let exits = parse_refs(&record.exits)?;
        self.check_actions(&entries, ActionKind::Entry)?;
        self.check_actions(&exits, ActionKind::Exit)?;

        tracing::debug!(state = %id, "loading state '{}'", name);
        let id = self.model.insert_state(region, id, name.clone(), kind)?;
        let geometry = Geometry {
            x: record.x,
            y: record.y,
            width: record.width,
            height: record.height,
        };
        if let Err(e) = self.attach_refs(id, geometry, entries, exits) {
            // Not yet known to the caller's rollback.
            self.discard(id);
            return Err(e.into());
        }

        self.pending
            .extend(record.transitions.iter().map(|transition| (id, transition)));
        Ok(id)
    }

    fn attach_refs(
        &mut self,
        id: StateId,
        geometry: Geometry,
        entries: Vec<(ActionRefId, ActionId)>,
        exits: Vec<(ActionRefId, ActionId)>,
    ) -> Result<(), ModelError> {
        self.model.set_state_geometry(id, geometry)?;
        for (ref_id, action) in entries {
            self.model.restore_entry(id, ref_id, action)?;
        }
        for (ref_id, action) in exits {
            self.model.restore_exit(id, ref_id, action)?;
        }
        Ok(())
    }

    /// Delete a state this load created.
    fn discard(&mut self, id: StateId) {
        if let Err(e) = self.model.delete_state(id) {
            tracing::error!(state = %id, error = %e, "rollback failed to delete state");
        }
    }

    fn load_region(
        &mut self,
        record: &RegionRecord,
        state: StateId,
    ) -> Result<RegionId, CodecError> {
        let id = match record.id.as_deref() {
            Some(text) => parse_id::<RegionId>("region.id", text)?,
            None => RegionId::new(),
        };
        let id = self.model.insert_region(state, id, record.name.clone())?;
        apply_region_flags(self.model, id, record)?;
        Ok(id)
    }

    /// Pass two: attach every queued transition.
    fn resolve_transitions(&mut self) -> Result<(), CodecError> {
        for (source, record) in std::mem::take(&mut self.pending) {
            let id = record.id.as_deref().ok_or(CodecError::MissingField {
                record: "transition",
                field: "id",
            })?;
            let id = parse_id::<TransitionId>("transition.id", id)?;

            if let Some(text) = record.source.as_deref() {
                let named = parse_id::<StateId>("transition.source", text)?;
                if !self.model.contains_state(named) {
                    return Err(CodecError::UnresolvedEndpoint {
                        transition: id,
                        state: named,
                    });
                }
                if named != source {
                    return Err(CodecError::InvalidStructure {
                        reason: format!(
                            "transition {id} is stored under {source} but names {named} as source"
                        ),
                    });
                }
            }

            let destination = record.destination.as_deref().ok_or(CodecError::MissingField {
                record: "transition",
                field: "destination",
            })?;
            let destination = parse_id::<StateId>("transition.destination", destination)?;
            if !self.model.contains_state(destination) {
                tracing::error!(transition = %id, %destination, "unresolved transition destination");
                return Err(CodecError::UnresolvedEndpoint {
                    transition: id,
                    state: destination,
                });
            }

            let effects = parse_refs(&record.effects)?;
            self.check_actions(&effects, ActionKind::Effect)?;

            self.model.insert_transition(id, source, destination)?;
            for (ref_id, action) in effects {
                self.model.restore_effect(id, ref_id, action)?;
            }
        }
        Ok(())
    }

    fn check_actions(
        &self,
        refs: &[(ActionRefId, ActionId)],
        kind: ActionKind,
    ) -> Result<(), CodecError> {
        for (_, action) in refs {
            if self.model.actions().lookup(*action, kind).is_none() {
                tracing::error!(%action, "unknown {} action", kind);
                return Err(ModelError::UnresolvedAction {
                    action: *action,
                    expected: kind,
                }
                .into());
            }
        }
        Ok(())
    }
}

fn apply_region_flags(
    model: &mut Model,
    id: RegionId,
    record: &RegionRecord,
) -> Result<(), ModelError> {
    model.set_region_off_page(id, record.off_page)?;
    model.set_region_draw_as_root(id, record.draw_as_root)?;
    model.set_region_height(id, record.height)
}

fn decode_action(record: &ActionRecord) -> Result<Action, CodecError> {
    let id = record.id.as_deref().ok_or(CodecError::MissingField {
        record: "action",
        field: "id",
    })?;
    let id = parse_id::<ActionId>("action.id", id)?;
    let name = record.name.as_deref().ok_or(CodecError::MissingField {
        record: "action",
        field: "name",
    })?;
    let kind = match record.kind.as_deref() {
        Some("entry") => ActionKind::Entry,
        Some("exit") => ActionKind::Exit,
        Some("effect") => ActionKind::Effect,
        Some(other) => {
            return Err(CodecError::UnknownActionKind {
                kind: other.to_string(),
            })
        }
        None => {
            return Err(CodecError::MissingField {
                record: "action",
                field: "kind",
            })
        }
    };
    Ok(Action::with_id(id, name, kind))
}

fn parse_refs(records: &[ActionRefRecord]) -> Result<Vec<(ActionRefId, ActionId)>, CodecError> {
    records
        .iter()
        .map(|record| {
            let id = record.id.as_deref().ok_or(CodecError::MissingField {
                record: "action-ref",
                field: "id",
            })?;
            let action = record.action_id.as_deref().ok_or(CodecError::MissingField {
                record: "action-ref",
                field: "action-id",
            })?;
            Ok((
                parse_id::<ActionRefId>("action-ref.id", id)?,
                parse_id::<ActionId>("action-ref.action-id", action)?,
            ))
        })
        .collect()
}

fn parse_id<T>(field: &'static str, text: &str) -> Result<T, CodecError>
where
    T: FromStr<Err = uuid::Error>,
{
    text.parse().map_err(|_| CodecError::MalformedReference {
        field,
        value: text.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn model_with_actions() -> (Model, ActionId, ActionId) {
        let mut model = Model::new("m");
        let enter = model.add_action("enter", ActionKind::Entry).unwrap();
        let leave = model.add_action("leave", ActionKind::Exit).unwrap();
        (model, enter, leave)
    }

    fn record(value: serde_json::Value) -> StateRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn geometry_defaults_to_zero() {
        let (mut model, _, _) = model_with_actions();
        let root = model.root_region();
        let id = StateId::new();

        let state = deserialize_state(
            &mut model,
            &record(json!({"id": id.to_string(), "name": "A", "kind": "state"})),
            root,
        )
        .unwrap();

        assert_eq!(state, id);
        assert_eq!(model.state(id).unwrap().geometry(), Geometry::default());
        assert!(model.state(id).unwrap().is_resizeable());
    }

    #[test]
    fn unknown_kind_leaves_region_unchanged() {
        let (mut model, _, _) = model_with_actions();
        let root = model.root_region();
        model.add_state(root, "Existing", StateKind::Normal).unwrap();
        let before = model.region(root).unwrap().states().to_vec();

        let result = deserialize_state(
            &mut model,
            &record(json!({"id": StateId::new().to_string(), "name": "B", "kind": "bogus"})),
            root,
        );

        assert!(matches!(result, Err(CodecError::UnknownKind { ref kind }) if kind == "bogus"));
        assert_eq!(model.region(root).unwrap().states(), before.as_slice());
        assert_eq!(model.state_count(), 1);
    }

    #[test]
    fn missing_required_fields_are_reported() {
        let (mut model, _, _) = model_with_actions();
        let root = model.root_region();
        let id = StateId::new().to_string();

        for (value, field) in [
            (json!({"name": "A", "kind": "state"}), "id"),
            (json!({"id": id, "kind": "state"}), "name"),
            (json!({"id": id, "name": "A"}), "kind"),
        ] {
            let result = deserialize_state(&mut model, &record(value), root);
            match result {
                Err(CodecError::MissingField { field: missing, .. }) => assert_eq!(missing, field),
                other => panic!("expected missing {field}, got {other:?}"),
            }
        }
        assert_eq!(model.state_count(), 0);
    }

    #[test]
    fn malformed_uuid_is_reported() {
        let (mut model, _, _) = model_with_actions();
        let root = model.root_region();

        let result = deserialize_state(
            &mut model,
            &record(json!({"id": "1234", "name": "A", "kind": "state"})),
            root,
        );

        assert!(matches!(
            result,
            Err(CodecError::MalformedReference { field: "state.id", .. })
        ));
    }

    #[test]
    fn entry_refs_are_resolved_against_action_table() {
        let (mut model, enter, leave) = model_with_actions();
        let root = model.root_region();
        let ref_id = ActionRefId::new();

        let id = deserialize_state(
            &mut model,
            &record(json!({
                "id": StateId::new().to_string(),
                "name": "A",
                "kind": "state",
                "entries": [{"id": ref_id.to_string(), "action-id": enter.to_string()}],
                "exits": [{"id": ActionRefId::new().to_string(), "action-id": leave.to_string()}]
            })),
            root,
        )
        .unwrap();

        let state = model.state(id).unwrap();
        assert_eq!(state.entries()[0].id(), ref_id);
        assert_eq!(state.entries()[0].action(), enter);
        assert_eq!(state.exits()[0].action(), leave);
    }

    #[test]
    fn exit_ref_to_entry_action_fails_and_rolls_back() {
        let (mut model, enter, _) = model_with_actions();
        let root = model.root_region();

        let result = deserialize_state(
            &mut model,
            &record(json!({
                "id": StateId::new().to_string(),
                "name": "A",
                "kind": "state",
                "exits": [{"id": ActionRefId::new().to_string(), "action-id": enter.to_string()}]
            })),
            root,
        );

        assert_eq!(result.unwrap_err().error_code(), "UNRESOLVED_ACTION");
        assert_eq!(model.state_count(), 0);
        assert_eq!(model.action_ref_count(), 0);
    }

    #[test]
    fn failure_after_linking_state_rolls_it_back() {
        let (mut model, enter, _) = model_with_actions();
        let root = model.root_region();
        let shared = ActionRefId::new().to_string();

        // Both refs resolve, so the state is linked before the second one
        // is refused.
        let result = deserialize_state(
            &mut model,
            &record(json!({
                "id": StateId::new().to_string(), "name": "A", "kind": "state",
                "entries": [
                    {"id": shared, "action-id": enter.to_string()},
                    {"id": shared, "action-id": enter.to_string()}
                ]
            })),
            root,
        );

        assert_eq!(result.unwrap_err().error_code(), "DUPLICATE_ID");
        assert!(model.region(root).unwrap().states().is_empty());
        assert_eq!(model.state_count(), 0);
        assert_eq!(model.action_ref_count(), 0);
    }

    #[test]
    fn failure_deep_in_subtree_rolls_back_whole_subtree() {
        let (mut model, _, _) = model_with_actions();
        let root = model.root_region();

        let result = deserialize_state(
            &mut model,
            &record(json!({
                "id": StateId::new().to_string(), "name": "Top", "kind": "state",
                "region": [{
                    "name": "r",
                    "states": [
                        {"id": StateId::new().to_string(), "name": "Ok", "kind": "state"},
                        {"id": StateId::new().to_string(), "name": "Bad", "kind": "nope"}
                    ]
                }]
            })),
            root,
        );

        assert!(matches!(result, Err(CodecError::UnknownKind { .. })));
        assert_eq!(model.state_count(), 0);
        assert_eq!(model.region_count(), 1);
        assert!(model.region(root).unwrap().states().is_empty());
    }

    #[test]
    fn transition_to_existing_state_outside_subtree_resolves() {
        let (mut model, _, _) = model_with_actions();
        let root = model.root_region();
        let target = model.add_state(root, "Target", StateKind::Normal).unwrap();
        let transition = TransitionId::new();

        let id = deserialize_state(
            &mut model,
            &record(json!({
                "id": StateId::new().to_string(), "name": "A", "kind": "state",
                "transitions": [{"id": transition.to_string(), "destination": target.to_string()}]
            })),
            root,
        )
        .unwrap();

        let t = model.transition(transition).unwrap();
        assert_eq!(t.source(), id);
        assert_eq!(t.destination(), target);
    }

    #[test]
    fn unresolved_destination_is_an_error() {
        let (mut model, _, _) = model_with_actions();
        let root = model.root_region();

        let result = deserialize_state(
            &mut model,
            &record(json!({
                "id": StateId::new().to_string(), "name": "A", "kind": "state",
                "transitions": [{
                    "id": TransitionId::new().to_string(),
                    "destination": StateId::new().to_string()
                }]
            })),
            root,
        );

        assert!(matches!(result, Err(CodecError::UnresolvedEndpoint { .. })));
        assert_eq!(model.state_count(), 0);
        assert_eq!(model.transition_count(), 0);
    }

    #[test]
    fn regions_are_refused_under_pseudostates() {
        let (mut model, _, _) = model_with_actions();
        let root = model.root_region();

        let result = deserialize_state(
            &mut model,
            &record(json!({
                "id": StateId::new().to_string(), "name": "", "kind": "init",
                "region": [{"name": "r", "states": []}]
            })),
            root,
        );

        assert_eq!(result.unwrap_err().error_code(), "INVALID_STRUCTURE");
        assert_eq!(model.state_count(), 0);
    }

    #[test]
    fn unknown_action_kind_is_rejected() {
        let result = decode_action(&ActionRecord {
            id: Some(ActionId::new().to_string()),
            name: Some("a".to_string()),
            kind: Some("guard".to_string()),
        });
        assert!(matches!(result, Err(CodecError::UnknownActionKind { .. })));
    }
}
