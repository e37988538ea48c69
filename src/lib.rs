//! Statechart model: the in-memory graph behind a hierarchical state machine
//! editor, with a JSON document codec.
//!
//! A chart is a tree of regions and states. Every region holds an ordered
//! list of states; a normal state may in turn own regions. Transitions are
//! owned by their source state and point at their destination by id, so they
//! may cross the tree freely. Entry, exit and effect actions live in one
//! table per model and are referenced by id.
//!
//! # Core Concepts
//!
//! - **Model**: Arena that owns every node and keeps the graph consistent
//! - **Codec**: Two-pass JSON reader and bottom-up writer
//! - **Validation**: Accumulating well-formedness checks
//!
//! # Example
//!
//! ```rust
//! use statechart_model::{ActionKind, Model, StateKind, WriteOptions};
//! use statechart_model::codec;
//!
//! let mut model = Model::new("Blinky");
//! let led_on = model.add_action("led_on", ActionKind::Entry).unwrap();
//! let root = model.root_region();
//! let off = model.add_state(root, "Off", StateKind::Normal).unwrap();
//! let on = model.add_state(root, "On", StateKind::Normal).unwrap();
//! model.add_entry(on, led_on).unwrap();
//! model.add_transition(off, on).unwrap();
//! model.add_transition(on, off).unwrap();
//!
//! let text = codec::to_json_string(&model, WriteOptions::default()).unwrap();
//! let loaded = codec::from_json_str(&text).unwrap();
//! assert_eq!(loaded.state_count(), 2);
//! assert_eq!(loaded.transitions(on).unwrap()[0].destination(), off);
//! ```

pub mod builder;
pub mod codec;
pub mod core;
pub mod model;
pub mod validation;

// Re-export commonly used types
pub use builder::ModelBuilder;
pub use codec::{CodecError, Document, WriteOptions};
pub use crate::core::{
    Action, ActionId, ActionKind, ActionRef, ActionRefId, Geometry, Region, RegionId, State,
    StateId, StateKind, Transition, TransitionId,
};
pub use model::{Model, ModelError, Teardown};
pub use validation::{validate, Violation};
