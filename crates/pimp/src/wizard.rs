//! Multi-step form wizards.
//!
//! A wizard is driven entirely by the submitted form: the current step number
//! travels in a hidden `step` field and the pressed button in `action`.
//! Advancing validates the current step; going back never validates; the last
//! step submits after re-checking every step.

use serde::Serialize;

use crate::validation::ValidationErrors;

/// Button pressed on a wizard form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WizardAction {
    /// Continue to the next step.
    #[default]
    Next,
    /// Return to the previous step.
    Back,
    /// Finish the wizard.
    Submit,
}

impl WizardAction {
    /// Parse the `action` form field; anything unrecognized means `Next`.
    #[must_use]
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("back") => Self::Back,
            Some("submit") => Self::Submit,
            _ => Self::Next,
        }
    }
}

/// Position within a wizard of `total` steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wizard {
    step: usize,
    total: usize,
}

/// Result of applying an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardOutcome {
    /// Render `wizard`'s current step, with any errors.
    Show {
        /// Where to render.
        wizard: Wizard,
        /// Errors for the step shown.
        errors: ValidationErrors,
    },
    /// Every step validated; process the submission.
    Complete,
}

/// Display state of one step in the progress bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepView {
    /// 1-based step number.
    pub number: usize,
    /// Step title.
    pub title: &'static str,
    /// `done`, `current` or `upcoming`.
    pub state: &'static str,
}

impl Wizard {
    /// A wizard of `total` steps at `step`, clamped into `1..=total`.
    #[must_use]
    pub fn at(step: usize, total: usize) -> Self {
        let total = total.max(1);
        Self {
            step: step.clamp(1, total),
            total,
        }
    }

    /// A wizard at its first step.
    #[must_use]
    pub fn start(total: usize) -> Self {
        Self::at(1, total)
    }

    /// Current 1-based step.
    #[must_use]
    pub fn step(&self) -> usize {
        self.step
    }

    /// Number of steps.
    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Whether the current step is the first.
    #[must_use]
    pub fn is_first(&self) -> bool {
        self.step == 1
    }

    /// Whether the current step is the last.
    #[must_use]
    pub fn is_last(&self) -> bool {
        self.step == self.total
    }

    /// Apply `action`. `validate(step)` returns the errors for one step.
    pub fn apply(
        self,
        action: WizardAction,
        mut validate: impl FnMut(usize) -> ValidationErrors,
    ) -> WizardOutcome {
        match action {
            WizardAction::Back => WizardOutcome::Show {
                wizard: Self::at(self.step.saturating_sub(1), self.total),
                errors: ValidationErrors::new(),
            },
            WizardAction::Next if !self.is_last() => {
                let errors = validate(self.step);
                let wizard = if errors.is_empty() {
                    Self::at(self.step + 1, self.total)
                } else {
                    self
                };
                WizardOutcome::Show { wizard, errors }
            }
            WizardAction::Next | WizardAction::Submit => {
                // Earlier steps arrive as hidden fields and are re-checked.
                for step in 1..=self.step {
                    let errors = validate(step);
                    if !errors.is_empty() {
                        return WizardOutcome::Show {
                            wizard: Self::at(step, self.total),
                            errors,
                        };
                    }
                }
                if self.is_last() {
                    WizardOutcome::Complete
                } else {
                    WizardOutcome::Show {
                        wizard: Self::at(self.step + 1, self.total),
                        errors: ValidationErrors::new(),
                    }
                }
            }
        }
    }

    /// Progress bar entries for the given step titles.
    #[must_use]
    pub fn progress(&self, titles: &[&'static str]) -> Vec<StepView> {
        titles
            .iter()
            .enumerate()
            .map(|(i, title)| {
                let number = i + 1;
                let state = match number.cmp(&self.step) {
                    std::cmp::Ordering::Less => "done",
                    std::cmp::Ordering::Equal => "current",
                    std::cmp::Ordering::Greater => "upcoming",
                };
                StepView {
                    number,
                    title,
                    state,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(_: usize) -> ValidationErrors {
        ValidationErrors::new()
    }

    fn failing_on(bad: usize) -> impl FnMut(usize) -> ValidationErrors {
        move |step| {
            let mut errors = ValidationErrors::new();
            if step == bad {
                errors.add("field", "Field is required");
            }
            errors
        }
    }

    fn shown(outcome: WizardOutcome) -> (usize, ValidationErrors) {
        match outcome {
            WizardOutcome::Show { wizard, errors } => (wizard.step(), errors),
            WizardOutcome::Complete => panic!("expected a step, got completion"),
        }
    }

    #[test]
    fn test_action_parse() {
        assert_eq!(WizardAction::parse(Some("back")), WizardAction::Back);
        assert_eq!(WizardAction::parse(Some("submit")), WizardAction::Submit);
        assert_eq!(WizardAction::parse(Some("next")), WizardAction::Next);
        assert_eq!(WizardAction::parse(None), WizardAction::Next);
    }

    #[test]
    fn test_step_is_clamped() {
        assert_eq!(Wizard::at(0, 3).step(), 1);
        assert_eq!(Wizard::at(9, 3).step(), 3);
        assert_eq!(Wizard::at(1, 0).total(), 1);
    }

    #[test]
    fn test_next_advances_when_valid() {
        let (step, errors) = shown(Wizard::start(3).apply(WizardAction::Next, ok));
        assert_eq!(step, 2);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_next_stays_when_invalid() {
        let (step, errors) = shown(Wizard::at(2, 3).apply(WizardAction::Next, failing_on(2)));
        assert_eq!(step, 2);
        assert_eq!(errors.message("field"), "Field is required");
    }

    #[test]
    fn test_back_never_validates() {
        let (step, errors) = shown(Wizard::at(2, 3).apply(WizardAction::Back, failing_on(2)));
        assert_eq!(step, 1);
        assert!(errors.is_empty());

        let (step, _) = shown(Wizard::start(3).apply(WizardAction::Back, ok));
        assert_eq!(step, 1);
    }

    #[test]
    fn test_submit_on_last_step_completes() {
        assert_eq!(
            Wizard::at(3, 3).apply(WizardAction::Submit, ok),
            WizardOutcome::Complete
        );
        assert_eq!(
            Wizard::at(3, 3).apply(WizardAction::Next, ok),
            WizardOutcome::Complete
        );
    }

    #[test]
    fn test_submit_rechecks_earlier_steps() {
        let (step, errors) = shown(Wizard::at(3, 3).apply(WizardAction::Submit, failing_on(1)));
        assert_eq!(step, 1);
        assert!(errors.has("field"));
    }

    #[test]
    fn test_early_submit_acts_as_next() {
        let (step, _) = shown(Wizard::start(3).apply(WizardAction::Submit, ok));
        assert_eq!(step, 2);
    }

    #[test]
    fn test_progress() {
        let views = Wizard::at(2, 3).progress(&["Role", "Contact", "Confirm"]);
        let states: Vec<&str> = views.iter().map(|v| v.state).collect();
        assert_eq!(states, vec!["done", "current", "upcoming"]);
        assert_eq!(views[2].number, 3);
        assert_eq!(views[0].title, "Role");
    }
}
