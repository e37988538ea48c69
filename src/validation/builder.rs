//! Builder API for validation rule sets.

use crate::model::Model;
use crate::validation::rules::{ModelCheck, ModelRules};
use crate::validation::violations::Violation;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Builder for [`ModelRules`].
///
/// [`RulesBuilder::new`] starts with no rules at all;
/// [`RulesBuilder::standard`] starts with the structural and naming rules.
pub struct RulesBuilder {
    structural: bool,
    require_names: bool,
    required_checks: Vec<ModelCheck>,
}

impl RulesBuilder {
    pub fn new() -> Self {
        Self {
            structural: false,
            require_names: false,
            required_checks: Vec::new(),
        }
    }

    pub fn standard() -> Self {
        Self::new().structural(true).require_names(true)
    }

    /// Check initial, final and terminate states are used consistently
    pub fn structural(mut self, enabled: bool) -> Self {
        self.structural = enabled;
        self
    }

    /// Require every normal state to carry a name
    pub fn require_names(mut self, enabled: bool) -> Self {
        self.require_names = enabled;
        self
    }

    /// Add a custom validation check
    pub fn require<F>(mut self, check: F) -> Self
    where
        F: Fn(&Model) -> Validation<(), NonEmptyVec<Violation>> + Send + Sync + 'static,
    {
        self.required_checks.push(Box::new(check));
        self
    }

    /// Add a simple predicate check with error message
    pub fn require_pred<F>(mut self, predicate: F, error_msg: String) -> Self
    where
        F: Fn(&Model) -> bool + Send + Sync + 'static,
    {
        let check = move |model: &Model| {
            if predicate(model) {
                Validation::success(())
            } else {
                Validation::fail(Violation::CustomCheckFailed {
                    message: error_msg.clone(),
                })
            }
        };
        self.required_checks.push(Box::new(check));
        self
    }

    pub fn build(self) -> ModelRules {
        ModelRules {
            structural: self.structural,
            require_names: self.require_names,
            required_checks: self.required_checks,
        }
    }
}

impl Default for RulesBuilder {
    fn default() -> Self {
        Self::new()
    }
}
