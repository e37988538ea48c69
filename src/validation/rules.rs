//! Rule sets for model validation.

use crate::core::{Region, State, StateKind};
use crate::model::Model;
use crate::validation::violations::Violation;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Type alias for validation check functions
pub type ModelCheck =
    Box<dyn Fn(&Model) -> Validation<(), NonEmptyVec<Violation>> + Send + Sync>;

/// Validation rules for a model.
/// Uses Validation to accumulate ALL violations.
pub struct ModelRules {
    pub(crate) structural: bool,
    pub(crate) require_names: bool,
    pub(crate) required_checks: Vec<ModelCheck>,
}

impl ModelRules {
    /// Run every rule, accumulating ALL violations.
    pub fn check(&self, model: &Model) -> Validation<(), NonEmptyVec<Violation>> {
        let states = states_in_order(model);
        let mut checks: Vec<Validation<(), NonEmptyVec<Violation>>> = Vec::new();

        if self.structural {
            for region in regions_in_order(model, &states) {
                checks.push(single_initial(model, region));
            }
            for state in &states {
                checks.push(initial_has_one_transition(state));
                checks.push(no_transitions_from_final(state));
                for transition in state.transitions() {
                    let target = model.state(transition.destination());
                    let check = match target {
                        Some(target) if target.kind() == StateKind::Initial => {
                            Validation::fail(Violation::TransitionIntoInitial {
                                transition: transition.id(),
                                state: target.id(),
                            })
                        }
                        _ => Validation::success(()),
                    };
                    checks.push(check);
                }
            }
        }

        if self.require_names {
            for state in &states {
                let check = if state.kind() == StateKind::Normal && state.name().is_empty() {
                    Validation::fail(Violation::UnnamedState { state: state.id() })
                } else {
                    Validation::success(())
                };
                checks.push(check);
            }
        }

        for check_fn in &self.required_checks {
            checks.push(check_fn(model));
        }

        let result = Validation::all_vec(checks).map(|_| ());
        if let Validation::Failure(violations) = &result {
            tracing::debug!(model = model.name(), violations = violations.len(), "model failed validation");
        }
        result
    }
}

/// States in document order: each region's states in sequence, parents
/// before children.
fn states_in_order(model: &Model) -> Vec<&State> {
    let Some(root) = model.region(model.root_region()) else {
        return Vec::new();
    };
    root.states()
        .iter()
        .flat_map(|top| model.subtree(*top).unwrap_or_default())
        .filter_map(|id| model.state(id))
        .collect()
}

fn regions_in_order<'m>(model: &'m Model, states: &[&'m State]) -> Vec<&'m Region> {
    std::iter::once(model.root_region())
        .chain(states.iter().flat_map(|state| state.regions().iter().copied()))
        .filter_map(|id| model.region(id))
        .collect()
}

fn single_initial(model: &Model, region: &Region) -> Validation<(), NonEmptyVec<Violation>> {
    let count = region
        .states()
        .iter()
        .filter_map(|id| model.state(*id))
        .filter(|state| state.kind() == StateKind::Initial)
        .count();
    if count > 1 {
        Validation::fail(Violation::MultipleInitialStates {
            region: region.id(),
            count,
        })
    } else {
        Validation::success(())
    }
}

fn initial_has_one_transition(state: &State) -> Validation<(), NonEmptyVec<Violation>> {
    let count = state.transitions().len();
    if state.kind() == StateKind::Initial && count != 1 {
        Validation::fail(Violation::InitialTransitionCount {
            state: state.id(),
            count,
        })
    } else {
        Validation::success(())
    }
}

fn no_transitions_from_final(state: &State) -> Validation<(), NonEmptyVec<Violation>> {
    match (state.kind(), state.transitions().first()) {
        (kind @ (StateKind::Final | StateKind::Terminate), Some(transition)) => {
            Validation::fail(Violation::TransitionFromFinal {
                state: state.id(),
                kind,
                transition: transition.id(),
            })
        }
        _ => Validation::success(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::builder::RulesBuilder;

    fn well_formed() -> Model {
        let mut model = Model::new("ok");
        let root = model.root_region();
        let init = model.add_state(root, "", StateKind::Initial).unwrap();
        let idle = model.add_state(root, "Idle", StateKind::Normal).unwrap();
        let done = model.add_state(root, "", StateKind::Final).unwrap();
        model.add_transition(init, idle).unwrap();
        model.add_transition(idle, done).unwrap();
        model
    }

    #[test]
    fn well_formed_model_passes() {
        let rules = RulesBuilder::standard().build();
        assert!(rules.check(&well_formed()).is_success());
    }

    #[test]
    fn validation_accumulates_all_violations() {
        let mut model = Model::new("bad");
        let root = model.root_region();
        let a = model.add_state(root, "", StateKind::Initial).unwrap();
        let b = model.add_state(root, "", StateKind::Initial).unwrap();
        let unnamed = model.add_state(root, "", StateKind::Normal).unwrap();
        let done = model.add_state(root, "", StateKind::Final).unwrap();
        model.add_transition(a, b).unwrap();
        model.add_transition(done, unnamed).unwrap();

        let result = RulesBuilder::standard().build().check(&model);

        match result {
            Validation::Failure(errors) => {
                let errors: Vec<_> = errors.iter().cloned().collect();
                assert!(errors.contains(&Violation::MultipleInitialStates { region: root, count: 2 }));
                assert!(errors.contains(&Violation::InitialTransitionCount { state: b, count: 0 }));
                assert!(errors
                    .iter()
                    .any(|e| matches!(e, Violation::TransitionIntoInitial { state, .. } if *state == b)));
                assert!(errors
                    .iter()
                    .any(|e| matches!(e, Violation::TransitionFromFinal { state, .. } if *state == done)));
                assert!(errors.contains(&Violation::UnnamedState { state: unnamed }));
                assert_eq!(errors.len(), 5);
            }
            Validation::Success(_) => panic!("Expected failures, got success"),
        }
    }

    #[test]
    fn nested_regions_are_checked() {
        let mut model = well_formed();
        let root = model.root_region();
        let outer = model.add_state(root, "Outer", StateKind::Normal).unwrap();
        let lane = model.add_region(outer, "lane").unwrap();
        let init = model.add_state(lane, "", StateKind::Initial).unwrap();

        let result = RulesBuilder::standard().build().check(&model);
        assert!(result.is_failure());
        if let Validation::Failure(errors) = result {
            assert!(errors
                .iter()
                .any(|e| *e == Violation::InitialTransitionCount { state: init, count: 0 }));
        }
    }

    #[test]
    fn name_rule_can_be_switched_off() {
        let mut model = Model::new("m");
        let root = model.root_region();
        model.add_state(root, "", StateKind::Normal).unwrap();

        assert!(RulesBuilder::standard().build().check(&model).is_failure());
        assert!(RulesBuilder::standard()
            .require_names(false)
            .build()
            .check(&model)
            .is_success());
    }

    #[test]
    fn custom_checks_run_after_builtin_rules() {
        let rules = RulesBuilder::new()
            .require_pred(|model| model.state_count() < 2, "too many states".to_string())
            .build();

        assert!(rules.check(&Model::new("empty")).is_success());
        match rules.check(&well_formed()) {
            Validation::Failure(errors) => {
                assert_eq!(errors.len(), 1);
                assert!(errors
                    .iter()
                    .any(|e| matches!(e, Violation::CustomCheckFailed { .. })));
            }
            Validation::Success(_) => panic!("Expected failure"),
        }
    }
}
