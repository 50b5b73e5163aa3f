//! Sandbox session engine — drives scripted tours.
//!
//! One active session per `(user, environment)` pair, enforced at creation
//! time only; the single calling thread is the lone mutator, so there is no
//! locking here. Expiry is checked lazily on lookup and validation.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::config::{SandboxConfig, SupersedePolicy};
use crate::error::SandboxError;
use crate::sandbox::model::{SandboxSession, Tutorial, TutorialAction, TutorialStep};
use crate::store::{SandboxSessionStore, TutorialStore};

const FEEDBACK_INVALID: &str = "Invalid input";
const FEEDBACK_CORRECT: &str = "Correct input!";

/// Result of validating one tutorial step input. Like onboarding
/// validation, a mismatch is data, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepValidation {
    pub is_valid: bool,
    pub feedback: String,
    /// Id of the next step when the input matched, `None` when the matched
    /// step was the last one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_step: Option<String>,
}

impl StepValidation {
    fn invalid() -> Self {
        Self {
            is_valid: false,
            feedback: FEEDBACK_INVALID.to_string(),
            next_step: None,
        }
    }

    fn correct(next_step: Option<String>) -> Self {
        Self {
            is_valid: true,
            feedback: FEEDBACK_CORRECT.to_string(),
            next_step,
        }
    }
}

/// The sandbox tutorial engine.
pub struct SandboxEngine {
    tutorials: Arc<dyn TutorialStore>,
    sessions: Arc<dyn SandboxSessionStore>,
    config: SandboxConfig,
}

impl SandboxEngine {
    pub fn new(
        tutorials: Arc<dyn TutorialStore>,
        sessions: Arc<dyn SandboxSessionStore>,
        config: SandboxConfig,
    ) -> Self {
        Self {
            tutorials,
            sessions,
            config,
        }
    }

    /// Start a tour for a user. If the user already has an active session
    /// in the tutorial's environment, the configured [`SupersedePolicy`]
    /// decides between replacing it and refusing.
    pub async fn create_session(
        &self,
        user_id: &str,
        tutorial_id: &str,
    ) -> Result<SandboxSession, SandboxError> {
        let tutorial = self.get_tutorial(tutorial_id).await?;

        if let Some(mut existing) = self
            .sessions
            .get(user_id, &tutorial.environment_id)
            .await?
        {
            if existing.is_active && !existing.is_expired() {
                match self.config.supersede {
                    SupersedePolicy::Reject => {
                        return Err(SandboxError::SessionAlreadyActive {
                            user_id: user_id.to_string(),
                            environment_id: tutorial.environment_id.clone(),
                        });
                    }
                    SupersedePolicy::Replace => {
                        tracing::warn!(
                            session_id = %existing.id,
                            user = user_id,
                            environment = %tutorial.environment_id,
                            "Superseding active sandbox session"
                        );
                        existing.is_active = false;
                        existing
                            .errors
                            .push("Superseded by a newer session".to_string());
                        self.sessions.put(&existing).await?;
                    }
                }
            }
        }

        let ttl = chrono::Duration::from_std(self.config.session_ttl)
            .unwrap_or_else(|_| chrono::Duration::minutes(30));
        let session = SandboxSession::new(user_id, &tutorial.environment_id, tutorial_id, ttl);
        self.sessions.put(&session).await?;
        tracing::info!(
            session_id = %session.id,
            tutorial = tutorial_id,
            user = user_id,
            "Sandbox session created"
        );
        Ok(session)
    }

    /// Validate a user's input for the session's current step.
    ///
    /// A mismatch returns invalid feedback and leaves the session exactly
    /// as it was; a match appends the step, advances the pointer, and
    /// reports the next step id.
    pub async fn validate_step(
        &self,
        session_id: Uuid,
        step_id: &str,
        user_input: &str,
    ) -> Result<StepValidation, SandboxError> {
        let session = self.require_live(session_id).await?;
        let tutorial = self.get_tutorial(&session.tutorial_id).await?;

        let step_index = tutorial
            .step_index(step_id)
            .ok_or_else(|| SandboxError::StepNotFound {
                step_id: step_id.to_string(),
            })?;

        // Tours are strictly sequential: answering any step other than the
        // current one is a mismatch, not an error.
        if step_index != session.current_step_index {
            return Ok(StepValidation::invalid());
        }
        let step = &tutorial.steps[step_index];

        if !input_matches(step, user_input) {
            return Ok(StepValidation::invalid());
        }

        let mut next = session.clone();
        next.completed_steps.push(step.id.clone());
        next.current_step_index += 1;
        self.sessions.put(&next).await?;

        let next_step = tutorial
            .steps
            .get(next.current_step_index)
            .map(|s| s.id.clone());
        tracing::debug!(
            session_id = %session_id,
            step = step_id,
            remaining = tutorial.steps.len() - next.current_step_index,
            "Tutorial step validated"
        );
        Ok(StepValidation::correct(next_step))
    }

    /// The user's active, unexpired session in an environment, if any.
    /// Expired sessions are deactivated here, lazily.
    pub async fn get_active_session(
        &self,
        user_id: &str,
        environment_id: &str,
    ) -> Result<Option<SandboxSession>, SandboxError> {
        let Some(session) = self.sessions.get(user_id, environment_id).await? else {
            return Ok(None);
        };
        if !session.is_active {
            return Ok(None);
        }
        if session.is_expired() {
            self.expire(session).await?;
            return Ok(None);
        }
        Ok(Some(session))
    }

    /// End a session explicitly.
    pub async fn end_session(&self, session_id: Uuid) -> Result<(), SandboxError> {
        let Some(mut session) = self.sessions.get_by_id(session_id).await? else {
            return Err(SandboxError::SessionNotFound { session_id });
        };
        session.is_active = false;
        self.sessions.put(&session).await?;
        tracing::info!(session_id = %session_id, "Sandbox session ended");
        Ok(())
    }

    async fn get_tutorial(&self, tutorial_id: &str) -> Result<Tutorial, SandboxError> {
        self.tutorials
            .get_tutorial(tutorial_id)
            .await?
            .ok_or_else(|| SandboxError::TutorialNotFound {
                tutorial_id: tutorial_id.to_string(),
            })
    }

    async fn require_live(&self, session_id: Uuid) -> Result<SandboxSession, SandboxError> {
        let Some(session) = self.sessions.get_by_id(session_id).await? else {
            return Err(SandboxError::SessionNotFound { session_id });
        };
        if !session.is_active {
            return Err(SandboxError::SessionEnded { session_id });
        }
        if session.is_expired() {
            self.expire(session).await?;
            return Err(SandboxError::SessionExpired { session_id });
        }
        Ok(session)
    }

    async fn expire(&self, mut session: SandboxSession) -> Result<(), SandboxError> {
        tracing::debug!(session_id = %session.id, "Sandbox session expired");
        session.is_active = false;
        session.errors.push("Session expired".to_string());
        self.sessions.put(&session).await?;
        Ok(())
    }
}

/// Literal per-step input check.
fn input_matches(step: &TutorialStep, user_input: &str) -> bool {
    match step.action {
        // Clicking/navigating the named target is all that is asked.
        TutorialAction::Click | TutorialAction::Navigate => user_input == step.target,
        // Case-sensitive literal match when an expected value is declared.
        TutorialAction::Input | TutorialAction::Validate => match &step.expected_value {
            Some(expected) => user_input == expected,
            None => !user_input.is_empty(),
        },
        TutorialAction::Wait => true,
    }
}
