//! Builder for constructing models.

use crate::builder::error::BuildError;
use crate::core::{Action, ActionKind, RegionId};
use crate::model::Model;

/// Builder for constructing a [`Model`] with a fluent API.
///
/// # Example
///
/// ```
/// use statechart_model::builder::ModelBuilder;
/// use statechart_model::core::ActionKind;
///
/// let model = ModelBuilder::new()
///     .name("Door")
///     .entry_action("lock")
///     .exit_action("unlock")
///     .effect_action("beep")
///     .build()
///     .unwrap();
///
/// assert_eq!(model.actions().len(), 3);
/// assert!(model.actions().find_by_name("lock", ActionKind::Entry).is_some());
/// ```
#[derive(Clone, Debug, Default)]
pub struct ModelBuilder {
    name: Option<String>,
    root_name: Option<String>,
    actions: Vec<(String, ActionKind)>,
}

impl ModelBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the model name (required).
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Name the root region. Defaults to `Root`.
    pub fn root_name(mut self, name: impl Into<String>) -> Self {
        self.root_name = Some(name.into());
        self
    }

    /// Register an action under an explicit capability.
    pub fn action(mut self, name: impl Into<String>, kind: ActionKind) -> Self {
        self.actions.push((name.into(), kind));
        self
    }

    pub fn entry_action(self, name: impl Into<String>) -> Self {
        self.action(name, ActionKind::Entry)
    }

    pub fn exit_action(self, name: impl Into<String>) -> Self {
        self.action(name, ActionKind::Exit)
    }

    pub fn effect_action(self, name: impl Into<String>) -> Self {
        self.action(name, ActionKind::Effect)
    }

    /// Build the model.
    /// Returns an error if the name is missing or the catalogue is invalid.
    pub fn build(self) -> Result<Model, BuildError> {
        let name = self
            .name
            .filter(|name| !name.is_empty())
            .ok_or(BuildError::MissingName)?;

        let root_name = self.root_name.unwrap_or_else(|| "Root".to_string());
        let mut model = Model::with_root(name, RegionId::new(), root_name);

        for (name, kind) in self.actions {
            if name.is_empty() {
                return Err(BuildError::EmptyActionName);
            }
            if model.actions().find_by_name(&name, kind).is_some() {
                return Err(BuildError::DuplicateAction { name, kind });
            }
            model
                .insert_action(Action::new(name.clone(), kind))
                .map_err(|_| BuildError::DuplicateAction { name, kind })?;
        }

        Ok(model)
    }
}
