//! Regions: ordered lanes of sibling states.

use super::id::{RegionId, StateId};

/// An ordered set of sibling states.
///
/// The state sequence is the document order and is preserved exactly as
/// states are appended. `parent` is a non-owning back-link to the containing
/// state; the chart's root region has none.
#[derive(Clone, Debug)]
pub struct Region {
    pub(crate) id: RegionId,
    pub(crate) name: String,
    pub(crate) parent: Option<StateId>,
    pub(crate) states: Vec<StateId>,
    pub(crate) off_page: bool,
    pub(crate) draw_as_root: bool,
    pub(crate) height: Option<f64>,
}

impl Region {
    pub(crate) fn new(id: RegionId, name: String, parent: Option<StateId>) -> Self {
        Self {
            id,
            name,
            parent,
            states: Vec::new(),
            off_page: false,
            draw_as_root: false,
            height: None,
        }
    }

    pub fn id(&self) -> RegionId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<StateId> {
        self.parent
    }

    /// Member states in insertion order.
    pub fn states(&self) -> &[StateId] {
        &self.states
    }

    pub fn is_off_page(&self) -> bool {
        self.off_page
    }

    pub fn draws_as_root(&self) -> bool {
        self.draw_as_root
    }

    /// Explicit height, or `None` when the region fills its parent.
    pub fn height(&self) -> Option<f64> {
        self.height
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Root and off-page regions are drawn in their own coordinate space.
    pub fn is_root_or_off_page(&self) -> bool {
        self.off_page || self.parent.is_none()
    }
}
