//! Well-formedness checks for statechart models.
//!
//! The graph itself accepts any arrangement of states and transitions so an
//! editor can hold a chart mid-edit. These checks report everything that is
//! still wrong in one pass, using Stillwater's `Validation` to accumulate
//! violations instead of stopping at the first.
//!
//! # Example
//!
//! ```rust
//! use statechart_model::core::StateKind;
//! use statechart_model::model::Model;
//! use statechart_model::validation::validate;
//!
//! let mut model = Model::new("door");
//! let root = model.root_region();
//! let init = model.add_state(root, "", StateKind::Initial).unwrap();
//! let closed = model.add_state(root, "Closed", StateKind::Normal).unwrap();
//! model.add_transition(init, closed).unwrap();
//!
//! assert!(validate(&model).is_success());
//! ```

pub mod builder;
pub mod rules;
pub mod violations;

pub use builder::RulesBuilder;
pub use rules::{ModelCheck, ModelRules};
pub use violations::Violation;

use crate::model::Model;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Check `model` against the standard rule set.
pub fn validate(model: &Model) -> Validation<(), NonEmptyVec<Violation>> {
    RulesBuilder::standard().build().check(model)
}
