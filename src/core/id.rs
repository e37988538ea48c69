//! Stable identifiers for every node and edge of the chart.
//!
//! Each entity kind gets its own newtype over [`Uuid`] so a transition id can
//! never be handed to an API expecting a state id. Identifiers are generated
//! once at creation (random v4) and never change; documents persist them in
//! the canonical 36-character hyphenated form.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a fresh random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID, e.g. one read back from a document.
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.hyphenated().fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Uuid {
                id.0
            }
        }
    };
}

define_id!(
    /// Identifier of a [`State`](super::State).
    StateId
);
define_id!(
    /// Identifier of a [`Region`](super::Region).
    RegionId
);
define_id!(
    /// Identifier of a [`Transition`](super::Transition).
    TransitionId
);
define_id!(
    /// Identifier of an [`Action`](super::Action) in the action table.
    ActionId
);
define_id!(
    /// Identifier of an [`ActionRef`](super::ActionRef) edge.
    ActionRefId
);
