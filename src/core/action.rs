//! Actions and the references that bind them to states and transitions.

use super::id::{ActionId, ActionRefId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Capability an action is registered under.
///
/// A state's entry list may only reference `Entry` actions, its exit list
/// only `Exit` actions, and a transition's effect list only `Effect` actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionKind {
    Entry,
    Exit,
    Effect,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Entry => "entry",
            Self::Exit => "exit",
            Self::Effect => "effect",
        })
    }
}

/// A named side-effecting function the chart refers to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Action {
    id: ActionId,
    name: String,
    kind: ActionKind,
}

impl Action {
    pub fn new(name: impl Into<String>, kind: ActionKind) -> Self {
        Self::with_id(ActionId::new(), name, kind)
    }

    pub fn with_id(id: ActionId, name: impl Into<String>, kind: ActionKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
        }
    }

    pub fn id(&self) -> ActionId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }
}

/// Edge binding a state or transition to an [`Action`].
///
/// The link to the action is a non-owning lookup key into the model's
/// [`ActionTable`]; a reference is only ever constructed after that key has
/// been resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ActionRef {
    id: ActionRefId,
    action: ActionId,
}

impl ActionRef {
    pub(crate) fn new(id: ActionRefId, action: ActionId) -> Self {
        Self { id, action }
    }

    pub fn id(&self) -> ActionRefId {
        self.id
    }

    pub fn action(&self) -> ActionId {
        self.action
    }
}

/// Registry of every action known to a model, in registration order.
#[derive(Clone, Debug, Default)]
pub struct ActionTable {
    actions: HashMap<ActionId, Action>,
    order: Vec<ActionId>,
}

impl ActionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action. Returns the action back if its id is taken.
    pub(crate) fn insert(&mut self, action: Action) -> Result<ActionId, Action> {
        if self.actions.contains_key(&action.id) {
            return Err(action);
        }
        let id = action.id;
        self.order.push(id);
        self.actions.insert(id, action);
        Ok(id)
    }

    pub(crate) fn remove(&mut self, id: ActionId) -> Option<Action> {
        let action = self.actions.remove(&id)?;
        self.order.retain(|other| *other != id);
        Some(action)
    }

    pub fn get(&self, id: ActionId) -> Option<&Action> {
        self.actions.get(&id)
    }

    /// Find an action by id that is registered under `kind`.
    ///
    /// An action that exists under a different capability is treated as
    /// absent.
    pub fn lookup(&self, id: ActionId, kind: ActionKind) -> Option<&Action> {
        self.actions.get(&id).filter(|action| action.kind == kind)
    }

    pub fn find_by_name(&self, name: &str, kind: ActionKind) -> Option<&Action> {
        self.iter()
            .find(|action| action.kind == kind && action.name == name)
    }

    pub fn contains(&self, id: ActionId) -> bool {
        self.actions.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.order.iter().filter_map(|id| self.actions.get(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_checks_capability() {
        let mut table = ActionTable::new();
        let id = table.insert(Action::new("open_valve", ActionKind::Entry)).unwrap();

        assert!(table.lookup(id, ActionKind::Entry).is_some());
        assert!(table.lookup(id, ActionKind::Exit).is_none());
        assert!(table.lookup(ActionId::new(), ActionKind::Entry).is_none());
    }

    #[test]
    fn iteration_follows_registration_order() {
        let mut table = ActionTable::new();
        table.insert(Action::new("c", ActionKind::Exit)).unwrap();
        table.insert(Action::new("a", ActionKind::Entry)).unwrap();
        table.insert(Action::new("b", ActionKind::Effect)).unwrap();

        let names: Vec<_> = table.iter().map(Action::name).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[test]
    fn duplicate_id_is_refused() {
        let mut table = ActionTable::new();
        let action = Action::new("a", ActionKind::Entry);
        table.insert(action.clone()).unwrap();

        assert_eq!(table.insert(action.clone()), Err(action));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn remove_drops_from_order() {
        let mut table = ActionTable::new();
        let a = table.insert(Action::new("a", ActionKind::Entry)).unwrap();
        let b = table.insert(Action::new("b", ActionKind::Entry)).unwrap();

        assert!(table.remove(a).is_some());
        assert!(table.remove(a).is_none());
        assert_eq!(table.iter().map(Action::id).collect::<Vec<_>>(), vec![b]);
    }

    #[test]
    fn find_by_name_respects_kind() {
        let mut table = ActionTable::new();
        table.insert(Action::new("log", ActionKind::Entry)).unwrap();
        let exit = table.insert(Action::new("log", ActionKind::Exit)).unwrap();

        assert_eq!(table.find_by_name("log", ActionKind::Exit).map(Action::id), Some(exit));
        assert!(table.find_by_name("log", ActionKind::Effect).is_none());
    }
}
