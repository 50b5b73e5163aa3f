//! Session data model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::path::UserRole;
use crate::validator::{UserInputs, Validation};

/// Lifecycle of a session. `Completed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Paused,
    Completed,
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Completed => "completed",
        };
        write!(f, "{s}")
    }
}

/// Who the session is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    Individual,
    TeamAdmin,
    TeamMember,
}

impl Default for SessionType {
    fn default() -> Self {
        Self::Individual
    }
}

/// How one attempt at a step ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepResultStatus {
    Completed,
    Failed,
    Skipped,
}

/// The recorded outcome of one step submission. Append-only: once in the
/// session history it is never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub step_id: String,
    pub status: StepResultStatus,
    pub time_spent_secs: u64,
    /// The raw submitted answers, opaque to the core.
    #[serde(default, skip_serializing_if = "UserInputs::is_empty")]
    pub inputs: UserInputs,
    pub feedback: Validation,
    pub recorded_at: DateTime<Utc>,
}

impl StepResult {
    pub fn completed(
        step_id: impl Into<String>,
        time_spent_secs: u64,
        inputs: UserInputs,
        feedback: Validation,
    ) -> Self {
        Self {
            step_id: step_id.into(),
            status: StepResultStatus::Completed,
            time_spent_secs,
            inputs,
            feedback,
            recorded_at: Utc::now(),
        }
    }

    /// A rejected attempt. Returned to the caller as data; never appended
    /// to the session history by the engine.
    pub fn failed(
        step_id: impl Into<String>,
        time_spent_secs: u64,
        inputs: UserInputs,
        feedback: Validation,
    ) -> Self {
        Self {
            step_id: step_id.into(),
            status: StepResultStatus::Failed,
            time_spent_secs,
            inputs,
            feedback,
            recorded_at: Utc::now(),
        }
    }

    pub fn skipped(step_id: impl Into<String>, time_spent_secs: u64) -> Self {
        Self {
            step_id: step_id.into(),
            status: StepResultStatus::Skipped,
            time_spent_secs,
            inputs: UserInputs::new(),
            feedback: Validation::passed(),
            recorded_at: Utc::now(),
        }
    }
}

/// Context supplied when initializing onboarding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnboardingContext {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
    pub user_role: UserRole,
    #[serde(default)]
    pub session_type: SessionType,
    /// Free-form preferences (preferred pace, topics, …) used for path
    /// selection by the store; opaque here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<serde_json::Value>,
}

impl OnboardingContext {
    pub fn new(user_id: impl Into<String>, user_role: UserRole) -> Self {
        Self {
            user_id: user_id.into(),
            organization_id: None,
            user_role,
            session_type: SessionType::default(),
            preferences: None,
        }
    }

    pub fn with_organization(mut self, organization_id: impl Into<String>) -> Self {
        self.organization_id = Some(organization_id.into());
        self
    }
}

/// One user's traversal of one path.
///
/// `current_step_index` is the navigation pointer the UI shows;
/// `furthest_step_index` is the completion frontier that only
/// `complete_step`/`skip_step` advance. Progress always derives from the
/// frontier, so back-navigation never moves the progress bar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnboardingSession {
    pub id: Uuid,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
    pub session_type: SessionType,
    pub status: SessionStatus,
    pub path_id: String,
    pub current_step_index: usize,
    pub furthest_step_index: usize,
    /// `round(furthest / total * 100)`, clamped to [0, 100].
    pub progress_percent: u8,
    pub time_spent_secs: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<StepResult>,
    pub started_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paused_at: Option<DateTime<Utc>>,
}

impl OnboardingSession {
    /// Fresh session at step 0 of a path.
    pub fn new(context: &OnboardingContext, path_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id: context.user_id.clone(),
            organization_id: context.organization_id.clone(),
            session_type: context.session_type,
            status: SessionStatus::Active,
            path_id: path_id.into(),
            current_step_index: 0,
            furthest_step_index: 0,
            progress_percent: 0,
            time_spent_secs: 0,
            history: Vec::new(),
            started_at: now,
            last_active_at: now,
            completed_at: None,
            paused_at: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == SessionStatus::Completed
    }

    /// Progress percentage for a frontier position. Clamps rather than
    /// panics when a caller forces the index past the step count.
    pub fn percent_for(frontier: usize, total_steps: usize) -> u8 {
        if total_steps == 0 {
            return 0;
        }
        let pct = (frontier as f64 / total_steps as f64 * 100.0).round();
        pct.clamp(0.0, 100.0) as u8
    }

    /// Count of steps completed (not skipped) so far.
    pub fn steps_completed(&self) -> u32 {
        self.history
            .iter()
            .filter(|r| r.status == StepResultStatus::Completed)
            .count() as u32
    }

    /// Running average of completed-step scores, 0 when none.
    pub fn average_score(&self) -> u8 {
        let scores: Vec<u32> = self
            .history
            .iter()
            .filter(|r| r.status == StepResultStatus::Completed)
            .map(|r| r.feedback.score as u32)
            .collect();
        if scores.is_empty() {
            return 0;
        }
        (scores.iter().sum::<u32>() as f64 / scores.len() as f64).round() as u8
    }
}
