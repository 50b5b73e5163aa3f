//! Step validation and scoring.
//!
//! Pure and side-effect-free: the same `(step, inputs)` always produces the
//! same [`Validation`]. The UI runs this on every input change for live
//! feedback and again at submit time.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::path::{ElementKind, InteractiveElement, OnboardingStep, StepKind};

/// User-submitted answers, keyed by element/action id. Values are opaque
/// JSON so the core never dictates widget shapes.
pub type UserInputs = HashMap<String, serde_json::Value>;

/// Hard pass floor for non-tutorial steps. A step's own `minimum_score`
/// never lowers this; scores below a declared `minimum_score` only add a
/// warning.
pub const PASSING_SCORE: u8 = 70;

/// Full credit for one scored element.
const ELEMENT_CREDIT: u32 = 10;
/// Credit for element types the validator has no specific checks for.
const PARTIAL_CREDIT: u32 = ELEMENT_CREDIT / 2;
/// Deduction when a code element's output misses `expected_output`.
const CODE_OUTPUT_PENALTY: u32 = 2;
/// Credit per satisfied required action.
const ACTION_CREDIT: u32 = 10;

/// Outcome of validating one step submission. A failed validation is data,
/// not an error — the caller re-shows the step with `errors`/`warnings`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Validation {
    pub is_valid: bool,
    /// 0–100, rounded.
    pub score: u8,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl Validation {
    /// A passing result with a perfect score and no feedback. Used for
    /// skipped steps, where validation is bypassed entirely.
    pub fn passed() -> Self {
        Self {
            is_valid: true,
            score: 100,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

/// Whether a submitted value counts as an answer at all.
fn is_present(value: Option<&serde_json::Value>) -> bool {
    match value {
        None | Some(serde_json::Value::Null) => false,
        Some(serde_json::Value::String(s)) => !s.trim().is_empty(),
        Some(_) => true,
    }
}

/// Truthiness for required-action entries: present, non-empty, and not
/// literally `false`.
fn is_truthy(value: Option<&serde_json::Value>) -> bool {
    match value {
        Some(serde_json::Value::Bool(b)) => *b,
        other => is_present(other),
    }
}

fn value_as_str(value: &serde_json::Value) -> Option<&str> {
    value.as_str()
}

/// Score one interactive element. Returns `(earned, max)` and appends any
/// feedback to `errors`/`warnings`.
fn score_element(
    element: &InteractiveElement,
    inputs: &UserInputs,
    errors: &mut Vec<String>,
    warnings: &mut Vec<String>,
) -> (u32, u32) {
    let value = inputs.get(&element.id);

    if !is_present(value) {
        if element.required {
            errors.push(format!("Missing required input: {}", element.id));
        }
        // Absent answers contribute nothing but still count toward max.
        return (0, ELEMENT_CREDIT);
    }
    let value = value.expect("presence checked above");

    match &element.kind {
        ElementKind::Input { min_length } => {
            let text = value_as_str(value).unwrap_or_default();
            if let Some(min) = min_length {
                if text.chars().count() < *min {
                    errors.push(format!(
                        "Input {} must be at least {} characters",
                        element.id, min
                    ));
                    return (0, ELEMENT_CREDIT);
                }
            }
            (ELEMENT_CREDIT, ELEMENT_CREDIT)
        }
        ElementKind::Choice { options } => {
            let chosen = value_as_str(value).unwrap_or_default();
            if options.iter().any(|o| o == chosen) {
                (ELEMENT_CREDIT, ELEMENT_CREDIT)
            } else {
                errors.push(format!("Invalid choice for {}", element.id));
                (0, ELEMENT_CREDIT)
            }
        }
        ElementKind::Code { expected_output } => {
            // Any non-empty submission earns credit; a missing expected
            // substring is advisory only.
            let code = value_as_str(value).unwrap_or_default();
            if let Some(expected) = expected_output {
                if !code.contains(expected.as_str()) {
                    warnings.push(format!(
                        "Output of {} does not contain expected result",
                        element.id
                    ));
                    return (ELEMENT_CREDIT - CODE_OUTPUT_PENALTY, ELEMENT_CREDIT);
                }
            }
            (ELEMENT_CREDIT, ELEMENT_CREDIT)
        }
        ElementKind::Unknown => (PARTIAL_CREDIT, ELEMENT_CREDIT),
    }
}

fn percentage(earned: u32, max: u32) -> u8 {
    if max == 0 {
        return 100;
    }
    let pct = (earned as f64 / max as f64 * 100.0).round();
    pct.clamp(0.0, 100.0) as u8
}

/// Validate one step submission against its elements and success criteria.
pub fn validate_step(step: &OnboardingStep, inputs: &UserInputs) -> Validation {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut earned: u32 = 0;
    let mut max: u32 = 0;

    for element in &step.elements {
        let (e, m) = score_element(element, inputs, &mut errors, &mut warnings);
        earned += e;
        max += m;
    }

    // The advisory threshold compares against the element-only score,
    // before the required-action bucket is folded in.
    let element_score = percentage(earned, max);
    if let Some(minimum) = step.criteria.minimum_score {
        if element_score < minimum {
            warnings.push(format!(
                "Score {} is below the step's target of {}",
                element_score, minimum
            ));
        }
    }

    for action in &step.criteria.required_actions {
        max += ACTION_CREDIT;
        if is_truthy(inputs.get(action)) {
            earned += ACTION_CREDIT;
        } else {
            errors.push(format!("Required action not completed: {}", action));
        }
    }

    let score = percentage(earned, max);
    let is_valid =
        errors.is_empty() && (step.kind == StepKind::Tutorial || score >= PASSING_SCORE);

    Validation {
        is_valid,
        score,
        errors,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::SuccessCriteria;
    use serde_json::json;

    fn inputs(pairs: &[(&str, serde_json::Value)]) -> UserInputs {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    // ── Tutorial auto-pass ──────────────────────────────────────────

    #[test]
    fn tutorial_with_no_elements_passes_on_any_input() {
        let step = OnboardingStep::new("intro", 0, StepKind::Tutorial, true);
        let result = validate_step(&step, &UserInputs::new());
        assert!(result.is_valid);
        assert_eq!(result.score, 100);

        let result = validate_step(&step, &inputs(&[("garbage", json!("whatever"))]));
        assert!(result.is_valid);
    }

    #[test]
    fn tutorial_passes_below_floor_but_errors_still_fail_it() {
        let step = OnboardingStep::new("tour", 0, StepKind::Tutorial, true)
            .with_elements(vec![InteractiveElement::input("note", false, None)]);
        // Optional element absent: score 0, no errors — tutorial still passes.
        let result = validate_step(&step, &UserInputs::new());
        assert_eq!(result.score, 0);
        assert!(result.is_valid);

        // A required element missing is an error even for tutorials.
        let step = OnboardingStep::new("tour", 0, StepKind::Tutorial, true)
            .with_elements(vec![InteractiveElement::input("note", true, None)]);
        let result = validate_step(&step, &UserInputs::new());
        assert!(!result.is_valid);
    }

    // ── Element scoring ─────────────────────────────────────────────

    #[test]
    fn missing_required_element_names_it() {
        let step = OnboardingStep::new("profile", 1, StepKind::Exercise, true).with_elements(vec![
            InteractiveElement::input("input-1", true, None),
            InteractiveElement::choice("choice-1", true, vec!["option1".into()]),
        ]);
        let result = validate_step(&step, &inputs(&[("input-1", json!("John Doe"))]));
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("choice-1"));
    }

    #[test]
    fn two_required_elements_both_answered_score_100() {
        let step = OnboardingStep::new("profile", 1, StepKind::Exercise, true).with_elements(vec![
            InteractiveElement::input("input-1", true, None),
            InteractiveElement::choice("choice-1", true, vec!["option1".into()]),
        ]);
        let result = validate_step(
            &step,
            &inputs(&[("input-1", json!("John Doe")), ("choice-1", json!("option1"))]),
        );
        assert!(result.is_valid);
        assert_eq!(result.score, 100);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn input_below_min_length_errors() {
        let step = OnboardingStep::new("s", 0, StepKind::Exercise, true)
            .with_elements(vec![InteractiveElement::input("name", true, Some(3))]);
        let result = validate_step(&step, &inputs(&[("name", json!("ab"))]));
        assert!(!result.is_valid);
        assert!(result.errors[0].contains("at least 3"));
        assert_eq!(result.score, 0);
    }

    #[test]
    fn choice_outside_options_errors() {
        let step = OnboardingStep::new("s", 0, StepKind::Exercise, true).with_elements(vec![
            InteractiveElement::choice("plan", true, vec!["free".into(), "pro".into()]),
        ]);
        let result = validate_step(&step, &inputs(&[("plan", json!("enterprise"))]));
        assert!(!result.is_valid);
        assert!(result.errors[0].contains("plan"));
    }

    #[test]
    fn code_missing_expected_output_warns_with_small_penalty() {
        let step = OnboardingStep::new("s", 0, StepKind::Exercise, true).with_elements(vec![
            InteractiveElement::code("snippet", true, Some("Hello".into())),
        ]);
        let result = validate_step(&step, &inputs(&[("snippet", json!("print('hi')"))]));
        // Warning, not error; penalty leaves the step above the floor.
        assert!(result.errors.is_empty());
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.score, 80);
        assert!(result.is_valid);
    }

    #[test]
    fn code_with_expected_output_full_credit() {
        let step = OnboardingStep::new("s", 0, StepKind::Exercise, true).with_elements(vec![
            InteractiveElement::code("snippet", true, Some("Hello".into())),
        ]);
        let result = validate_step(&step, &inputs(&[("snippet", json!("print('Hello')"))]));
        assert!(result.warnings.is_empty());
        assert_eq!(result.score, 100);
    }

    #[test]
    fn unknown_element_earns_partial_credit() {
        let step = OnboardingStep::new("s", 0, StepKind::Exercise, true).with_elements(vec![
            InteractiveElement {
                id: "widget".into(),
                required: true,
                kind: ElementKind::Unknown,
            },
        ]);
        let result = validate_step(&step, &inputs(&[("widget", json!({"done": 1}))]));
        assert_eq!(result.score, 50);
        // 50 < 70 floor: structurally fine but not a pass for an exercise.
        assert!(!result.is_valid);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn empty_string_counts_as_absent() {
        let step = OnboardingStep::new("s", 0, StepKind::Exercise, true)
            .with_elements(vec![InteractiveElement::input("name", true, None)]);
        let result = validate_step(&step, &inputs(&[("name", json!("   "))]));
        assert!(!result.is_valid);
        assert!(result.errors[0].contains("name"));
    }

    // ── Success criteria ────────────────────────────────────────────

    #[test]
    fn missing_required_action_is_error() {
        let step = OnboardingStep::new("s", 0, StepKind::Setup, true).with_criteria(
            SuccessCriteria {
                required_actions: vec!["connected_repo".into()],
                minimum_score: None,
            },
        );
        let result = validate_step(&step, &UserInputs::new());
        assert!(!result.is_valid);
        assert!(result.errors[0].contains("connected_repo"));
        assert_eq!(result.score, 0);
    }

    #[test]
    fn false_action_entry_is_not_truthy() {
        let step = OnboardingStep::new("s", 0, StepKind::Setup, true).with_criteria(
            SuccessCriteria {
                required_actions: vec!["invited_team".into()],
                minimum_score: None,
            },
        );
        let result = validate_step(&step, &inputs(&[("invited_team", json!(false))]));
        assert!(!result.is_valid);

        let result = validate_step(&step, &inputs(&[("invited_team", json!(true))]));
        assert!(result.is_valid);
        assert_eq!(result.score, 100);
    }

    #[test]
    fn minimum_score_below_floor_still_requires_70() {
        // minimum_score = 40, but the step only reaches 50 → floor applies.
        let step = OnboardingStep::new("s", 0, StepKind::Exercise, true)
            .with_elements(vec![InteractiveElement {
                id: "widget".into(),
                required: true,
                kind: ElementKind::Unknown,
            }])
            .with_criteria(SuccessCriteria {
                required_actions: vec![],
                minimum_score: Some(40),
            });
        let result = validate_step(&step, &inputs(&[("widget", json!("x"))]));
        assert_eq!(result.score, 50);
        assert!(!result.is_valid, "the 70 floor applies regardless of minimum_score");
        // 50 >= 40, so no threshold warning either.
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn minimum_score_shortfall_warns_against_element_score_only() {
        let step = OnboardingStep::new("s", 0, StepKind::Exercise, true)
            .with_elements(vec![InteractiveElement {
                id: "widget".into(),
                required: true,
                kind: ElementKind::Unknown,
            }])
            .with_criteria(SuccessCriteria {
                // Action present and truthy would push the blended score to
                // 75, but the warning compares the pre-bucket score (50).
                required_actions: vec!["clicked_docs".into()],
                minimum_score: Some(60),
            });
        let result = validate_step(
            &step,
            &inputs(&[("widget", json!("x")), ("clicked_docs", json!(true))]),
        );
        assert_eq!(result.score, 75);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("below"));
    }

    #[test]
    fn no_elements_no_criteria_scores_100() {
        let step = OnboardingStep::new("s", 0, StepKind::Exercise, true);
        let result = validate_step(&step, &UserInputs::new());
        assert_eq!(result.score, 100);
        assert!(result.is_valid);
    }

    #[test]
    fn validation_is_idempotent() {
        let step = OnboardingStep::new("s", 0, StepKind::Exercise, true).with_elements(vec![
            InteractiveElement::input("a", true, Some(2)),
            InteractiveElement::choice("b", false, vec!["x".into()]),
        ]);
        let submitted = inputs(&[("a", json!("hello")), ("b", json!("y"))]);
        let first = validate_step(&step, &submitted);
        let second = validate_step(&step, &submitted);
        assert_eq!(first, second);
    }
}
