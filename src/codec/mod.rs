//! Document codec for statechart models.
//!
//! Models are stored as JSON documents:
//!
//! ```json
//! {
//!   "version": 1,
//!   "name": "Blinky",
//!   "actions": [
//!     {"id": "6f1c…", "name": "led_on", "kind": "entry"}
//!   ],
//!   "root": {
//!     "id": "0b9e…", "name": "Root",
//!     "states": [
//!       {
//!         "id": "a3d0…", "name": "On", "kind": "state",
//!         "x": 10.0, "y": 10.0, "width": 120.0, "height": 60.0,
//!         "entries": [{"id": "51aa…", "action-id": "6f1c…"}],
//!         "exits": [],
//!         "region": [],
//!         "transitions": [{"id": "c2f4…", "source": "a3d0…", "destination": "e77b…", "effects": []}]
//!       }
//!     ]
//!   }
//! }
//! ```
//!
//! Loading runs in two passes. The first builds every region and state so
//! each state id becomes resolvable; the second attaches transitions, whose
//! destinations may appear anywhere in the document. Unknown fields are
//! ignored on read.
//!
//! Nesting depth is unbounded. Reading and writing text grow the stack on
//! demand, and dropping a [`StateRecord`] tree is iterative. The derived
//! `Clone`, `Debug` and `PartialEq` impls on records still recurse.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

mod decode;
mod encode;
pub mod error;
mod json;

pub use decode::{deserialize_state, from_document, from_json_str, from_json_value};
pub use encode::{
    append_state, append_state_value, serialize_region, serialize_state, to_document,
    to_json_string, to_json_value,
};
pub use error::CodecError;

/// Version identifier for the document format.
pub const DOCUMENT_VERSION: u32 = 1;

/// Options for writing documents as text.
#[derive(Clone, Copy, Debug, Default)]
pub struct WriteOptions {
    /// Indent the output.
    pub pretty: bool,
}

/// Top-level document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document format version
    pub version: u32,

    /// Model name
    #[serde(default)]
    pub name: String,

    /// When the document was written
    #[serde(rename = "saved-at", default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,

    /// Action table in registration order
    #[serde(default)]
    pub actions: Vec<ActionRecord>,

    /// Root region of the chart
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<RegionRecord>,
}

/// Entry of the action table.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// A reference from a state or transition to an action.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionRefRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "action-id", default, skip_serializing_if = "Option::is_none")]
    pub action_id: Option<String>,
}

/// A region and its states.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "off-page", default, skip_serializing_if = "is_false")]
    pub off_page: bool,
    #[serde(rename = "draw-as-root", default, skip_serializing_if = "is_false")]
    pub draw_as_root: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default)]
    pub states: Vec<StateRecord>,
}

/// A state with its owned regions and outgoing transitions.
///
/// `id`, `name` and `kind` are required on read; they are optional here so
/// that a missing field is reported as such instead of as a generic JSON
/// error.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StateRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub entries: Vec<ActionRefRecord>,
    #[serde(default)]
    pub exits: Vec<ActionRefRecord>,
    #[serde(default)]
    pub region: Vec<RegionRecord>,
    #[serde(default)]
    pub transitions: Vec<TransitionRecord>,
}

impl Drop for StateRecord {
    fn drop(&mut self) {
        if self.region.is_empty() {
            return;
        }
        // Detach descendants onto a worklist so no drop recurses more than
        // one level.
        let mut pending: Vec<StateRecord> = Vec::new();
        for region in &mut self.region {
            pending.append(&mut region.states);
        }
        while let Some(mut record) = pending.pop() {
            for region in &mut record.region {
                pending.append(&mut region.states);
            }
        }
    }
}

/// An outgoing transition, stored under its source state.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(default)]
    pub effects: Vec<ActionRefRecord>,
}

fn is_false(value: &bool) -> bool {
    !*value
}
