//! Path data model — step templates, interactive elements, success criteria.

use serde::{Deserialize, Serialize};

/// Audience a path is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Developer,
    Admin,
    Member,
    Viewer,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Developer => write!(f, "developer"),
            Self::Admin => write!(f, "admin"),
            Self::Member => write!(f, "member"),
            Self::Viewer => write!(f, "viewer"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "developer" => Ok(Self::Developer),
            "admin" => Ok(Self::Admin),
            "member" => Ok(Self::Member),
            "viewer" => Ok(Self::Viewer),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

/// What kind of work a step asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// Guided walkthrough — auto-passes once started.
    Tutorial,
    /// Hands-on exercise scored against its elements.
    Exercise,
    /// Environment/account setup.
    Setup,
    /// Checkpoint that verifies earlier work.
    Validation,
    /// Celebration/summary step.
    Milestone,
}

impl std::fmt::Display for StepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Tutorial => "tutorial",
            Self::Exercise => "exercise",
            Self::Setup => "setup",
            Self::Validation => "validation",
            Self::Milestone => "milestone",
        };
        write!(f, "{s}")
    }
}

/// Presentation payload for a step. Opaque to the validation core — the
/// known variants exist so the UI layer can pattern-match, and `Opaque`
/// carries anything the core does not model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepContent {
    /// Markdown/text body.
    Text { body: String },
    /// Embedded video.
    Video { url: String },
    /// Interactive code sandbox seed.
    CodeSample { language: String, snippet: String },
    /// Anything else — passed through untouched.
    Opaque { payload: serde_json::Value },
}

impl Default for StepContent {
    fn default() -> Self {
        Self::Text { body: String::new() }
    }
}

/// Type-specific validation data for an interactive element.
///
/// Closed union: the validator matches exhaustively instead of probing
/// shapes at runtime. `Unknown` covers element types the core does not
/// score specifically (they earn partial credit).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ElementKind {
    /// Free-text input, optionally with a minimum length rule.
    Input {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_length: Option<usize>,
    },
    /// Single choice among fixed option values.
    Choice { options: Vec<String> },
    /// Code entry; optionally expects the output to contain a substring.
    Code {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expected_output: Option<String>,
    },
    /// Unmodeled element type.
    Unknown,
}

/// One input descriptor on a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractiveElement {
    /// Element id — keys the corresponding user input.
    pub id: String,
    /// Whether an answer is mandatory for the step to pass.
    pub required: bool,
    #[serde(flatten)]
    pub kind: ElementKind,
}

impl InteractiveElement {
    pub fn input(id: impl Into<String>, required: bool, min_length: Option<usize>) -> Self {
        Self {
            id: id.into(),
            required,
            kind: ElementKind::Input { min_length },
        }
    }

    pub fn choice(id: impl Into<String>, required: bool, options: Vec<String>) -> Self {
        Self {
            id: id.into(),
            required,
            kind: ElementKind::Choice { options },
        }
    }

    pub fn code(id: impl Into<String>, required: bool, expected_output: Option<String>) -> Self {
        Self {
            id: id.into(),
            required,
            kind: ElementKind::Code { expected_output },
        }
    }
}

/// Declarative pass conditions for a step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuccessCriteria {
    /// Action ids that must appear truthy in the submitted inputs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_actions: Vec<String>,
    /// Advisory score threshold; scores below it add a warning. The hard
    /// pass floor is fixed at [`crate::validator::PASSING_SCORE`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_score: Option<u8>,
}

/// One unit of onboarding work within a path. Immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnboardingStep {
    pub id: String,
    /// Position within the path's ordered step list.
    pub order: usize,
    pub kind: StepKind,
    /// Required steps cannot be skipped.
    pub is_required: bool,
    pub estimated_minutes: u32,
    #[serde(default)]
    pub content: StepContent,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub elements: Vec<InteractiveElement>,
    #[serde(default)]
    pub criteria: SuccessCriteria,
    /// Step ids that should be completed first. Informational only — the
    /// engine enforces sequential order, not this graph.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
}

impl OnboardingStep {
    /// Minimal step with no elements or criteria.
    pub fn new(id: impl Into<String>, order: usize, kind: StepKind, is_required: bool) -> Self {
        Self {
            id: id.into(),
            order,
            kind,
            is_required,
            estimated_minutes: 5,
            content: StepContent::default(),
            elements: Vec::new(),
            criteria: SuccessCriteria::default(),
            dependencies: Vec::new(),
        }
    }

    pub fn with_elements(mut self, elements: Vec<InteractiveElement>) -> Self {
        self.elements = elements;
        self
    }

    pub fn with_criteria(mut self, criteria: SuccessCriteria) -> Self {
        self.criteria = criteria;
        self
    }

    pub fn with_estimated_minutes(mut self, minutes: u32) -> Self {
        self.estimated_minutes = minutes;
        self
    }

    pub fn with_content(mut self, content: StepContent) -> Self {
        self.content = content;
        self
    }
}

/// Immutable template: the ordered sequence of steps a session traverses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnboardingPath {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub target_role: UserRole,
    pub estimated_minutes: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prerequisites: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub learning_objectives: Vec<String>,
    pub steps: Vec<OnboardingStep>,
}

impl OnboardingPath {
    pub fn new(id: impl Into<String>, name: impl Into<String>, target_role: UserRole) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            target_role,
            estimated_minutes: 0,
            prerequisites: Vec::new(),
            learning_objectives: Vec::new(),
            steps: Vec::new(),
        }
    }

    pub fn with_steps(mut self, steps: Vec<OnboardingStep>) -> Self {
        self.estimated_minutes = steps.iter().map(|s| s.estimated_minutes).sum();
        self.steps = steps;
        self
    }

    /// Number of steps in the path.
    pub fn total_steps(&self) -> usize {
        self.steps.len()
    }

    /// Step at a given index, if any.
    pub fn step_at(&self, index: usize) -> Option<&OnboardingStep> {
        self.steps.get(index)
    }
}
