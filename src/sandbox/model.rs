//! Tutorial and sandbox session data model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a tutorial step asks the user to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TutorialAction {
    Click,
    Input,
    Navigate,
    Wait,
    Validate,
}

impl std::fmt::Display for TutorialAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Click => "click",
            Self::Input => "input",
            Self::Navigate => "navigate",
            Self::Wait => "wait",
            Self::Validate => "validate",
        };
        write!(f, "{s}")
    }
}

/// One scripted instruction in a tour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TutorialStep {
    pub id: String,
    pub action: TutorialAction,
    /// Selector/route the action points at (e.g. "#sign-in-button").
    pub target: String,
    /// For `input`/`validate` actions: the literal value the user must
    /// produce, compared case-sensitively.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_value: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<String>,
}

impl TutorialStep {
    pub fn new(id: impl Into<String>, action: TutorialAction, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            action,
            target: target.into(),
            expected_value: None,
            hints: Vec::new(),
        }
    }

    pub fn with_expected_value(mut self, value: impl Into<String>) -> Self {
        self.expected_value = Some(value.into());
        self
    }

    pub fn with_hints(mut self, hints: Vec<String>) -> Self {
        self.hints = hints;
        self
    }
}

/// An ordered scripted tour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tutorial {
    pub id: String,
    pub name: String,
    /// Which sandbox environment the tour runs in (e.g. "dashboard").
    pub environment_id: String,
    pub steps: Vec<TutorialStep>,
}

impl Tutorial {
    pub fn step_index(&self, step_id: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.id == step_id)
    }
}

/// One user's live walkthrough of a tutorial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SandboxSession {
    pub id: Uuid,
    pub user_id: String,
    pub environment_id: String,
    pub tutorial_id: String,
    pub current_step_index: usize,
    /// Step ids completed so far, in order. Append-only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub completed_steps: Vec<String>,
    /// Validation failures seen so far. Append-only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SandboxSession {
    pub fn new(
        user_id: impl Into<String>,
        environment_id: impl Into<String>,
        tutorial_id: impl Into<String>,
        ttl: chrono::Duration,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            environment_id: environment_id.into(),
            tutorial_id: tutorial_id.into(),
            current_step_index: 0,
            completed_steps: Vec::new(),
            errors: Vec::new(),
            is_active: true,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    /// Lazy expiry check — there is no background timer.
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}
