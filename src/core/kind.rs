//! The closed set of state kinds.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Kind tag of a [`State`](super::State).
///
/// Everything except [`StateKind::Normal`] is a pseudostate: a control
/// construct rather than a place the machine rests in. The document name of
/// each kind is fixed and is what [`StateKind::as_str`] returns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateKind {
    #[serde(rename = "state")]
    Normal,
    #[serde(rename = "init")]
    Initial,
    #[serde(rename = "final")]
    Final,
    #[serde(rename = "shallow-history")]
    ShallowHistory,
    #[serde(rename = "deep-history")]
    DeepHistory,
    #[serde(rename = "entry-point")]
    EntryPoint,
    #[serde(rename = "exit-point")]
    ExitPoint,
    #[serde(rename = "join")]
    Join,
    #[serde(rename = "fork")]
    Fork,
    #[serde(rename = "choice")]
    Choice,
    #[serde(rename = "junction")]
    Junction,
    #[serde(rename = "terminate")]
    Terminate,
}

/// A kind string outside the closed set.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown state kind '{0}'")]
pub struct UnknownKind(pub String);

impl StateKind {
    pub const ALL: [StateKind; 12] = [
        Self::Normal,
        Self::Initial,
        Self::Final,
        Self::ShallowHistory,
        Self::DeepHistory,
        Self::EntryPoint,
        Self::ExitPoint,
        Self::Join,
        Self::Fork,
        Self::Choice,
        Self::Junction,
        Self::Terminate,
    ];

    /// Document name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "state",
            Self::Initial => "init",
            Self::Final => "final",
            Self::ShallowHistory => "shallow-history",
            Self::DeepHistory => "deep-history",
            Self::EntryPoint => "entry-point",
            Self::ExitPoint => "exit-point",
            Self::Join => "join",
            Self::Fork => "fork",
            Self::Choice => "choice",
            Self::Junction => "junction",
            Self::Terminate => "terminate",
        }
    }

    /// Whether a freshly created state of this kind can be resized.
    pub fn is_resizeable(&self) -> bool {
        matches!(self, Self::Normal | Self::Join | Self::Fork | Self::Choice)
    }

    /// Whether a state of this kind may own child regions.
    pub fn can_own_regions(&self) -> bool {
        matches!(self, Self::Normal)
    }

    pub fn is_pseudostate(&self) -> bool {
        !matches!(self, Self::Normal)
    }
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StateKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}
