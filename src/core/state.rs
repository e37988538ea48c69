//! State nodes of the chart.

use super::action::ActionRef;
use super::id::{RegionId, StateId};
use super::kind::StateKind;
use super::transition::Transition;

/// Position and size of a state on the canvas.
///
/// The model only stores these values; their unit and origin belong to the
/// editor that draws the chart.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Geometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// A node of the chart.
///
/// A state is owned by exactly one region (its `parent`). It owns its child
/// regions, its outgoing transitions and its entry/exit action references.
/// Child regions are held by id; the regions themselves live in the
/// [`Model`](crate::model::Model) arena.
#[derive(Clone, Debug)]
pub struct State {
    pub(crate) id: StateId,
    pub(crate) name: String,
    pub(crate) kind: StateKind,
    pub(crate) geometry: Geometry,
    pub(crate) resizeable: bool,
    pub(crate) parent: RegionId,
    pub(crate) regions: Vec<RegionId>,
    pub(crate) transitions: Vec<Transition>,
    pub(crate) entries: Vec<ActionRef>,
    pub(crate) exits: Vec<ActionRef>,
}

impl State {
    pub(crate) fn new(id: StateId, name: String, kind: StateKind, parent: RegionId) -> Self {
        Self {
            id,
            name,
            kind,
            geometry: Geometry::default(),
            resizeable: kind.is_resizeable(),
            parent,
            regions: Vec::new(),
            transitions: Vec::new(),
            entries: Vec::new(),
            exits: Vec::new(),
        }
    }

    pub fn id(&self) -> StateId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> StateKind {
        self.kind
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn is_resizeable(&self) -> bool {
        self.resizeable
    }

    /// Region this state belongs to.
    pub fn parent(&self) -> RegionId {
        self.parent
    }

    /// Child regions in document order.
    pub fn regions(&self) -> &[RegionId] {
        &self.regions
    }

    /// Outgoing transitions in document order.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn entries(&self) -> &[ActionRef] {
        &self.entries
    }

    pub fn exits(&self) -> &[ActionRef] {
        &self.exits
    }

    /// A state with at least one child region.
    pub fn is_composite(&self) -> bool {
        !self.regions.is_empty()
    }

    /// Every action reference the state owns: entries, exits, then the
    /// effects of its outgoing transitions.
    pub(crate) fn action_refs(&self) -> impl Iterator<Item = &ActionRef> {
        self.entries
            .iter()
            .chain(self.exits.iter())
            .chain(self.transitions.iter().flat_map(|t| t.effects.iter()))
    }
}
