//! Session state machine.
//!
//! Every operation computes the next session against a cloned snapshot and
//! commits it through the store before returning. A store failure surfaces
//! as a typed error and leaves the caller's session untouched, so the same
//! command can be retried safely.
//!
//! The engine never measures time: callers pass each step's wall-clock
//! `time_spent_secs` in, and the engine only sums it.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use crate::error::{Error, InitializationError, StateError};
use crate::milestone::{self, Milestone, MilestoneOutcome, SessionProgress};
use crate::path::{OnboardingPath, OnboardingStep};
use crate::store::OnboardingStore;
use crate::validator::{self, UserInputs, Validation};

use super::model::{
    OnboardingContext, OnboardingSession, SessionStatus, StepResult,
};

/// Returned when the final step of a path is completed.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionSummary {
    /// Every step id recorded in the session history, in order.
    pub step_ids: Vec<String>,
    pub total_time_secs: u64,
    /// Average of completed-step scores.
    pub final_score: u8,
}

/// Result of a `complete_step`/`skip_step` command.
#[derive(Debug, Clone)]
pub enum StepOutcome {
    /// Validation failed — the session is unchanged and the caller
    /// re-shows the step. The failed attempt is returned as data; attempt
    /// counting is the caller's concern.
    Rejected { result: StepResult },
    /// The step was recorded and the frontier advanced.
    Advanced {
        session: OnboardingSession,
        next_step: OnboardingStep,
        feedback: Validation,
        newly_earned: Vec<Milestone>,
    },
    /// That was the last step — the session is now terminal.
    Completed {
        session: OnboardingSession,
        summary: CompletionSummary,
        newly_earned: Vec<Milestone>,
    },
}

/// The onboarding session state machine.
pub struct SessionEngine {
    store: Arc<dyn OnboardingStore>,
    /// Milestone catalog; earned entries accumulate in place and never
    /// leave the list.
    milestones: Vec<Milestone>,
}

impl SessionEngine {
    pub fn new(store: Arc<dyn OnboardingStore>) -> Self {
        Self {
            store,
            milestones: Vec::new(),
        }
    }

    pub fn with_milestones(mut self, catalog: Vec<Milestone>) -> Self {
        self.milestones = catalog;
        self
    }

    /// Current milestone catalog, earned entries included.
    pub fn milestones(&self) -> &[Milestone] {
        &self.milestones
    }

    /// Create a new session for the context's role.
    ///
    /// No partial session exists on failure; the caller may retry.
    pub async fn initialize(
        &self,
        context: &OnboardingContext,
    ) -> Result<(OnboardingSession, OnboardingPath), InitializationError> {
        let path = self
            .store
            .find_path_for_role(context.user_role)
            .await?
            .ok_or_else(|| InitializationError::NoPathForRole {
                role: context.user_role.to_string(),
            })?;

        let session = OnboardingSession::new(context, path.id.clone());
        self.store.create_session(&session).await?;

        tracing::info!(
            session_id = %session.id,
            path = %path.id,
            user = %session.user_id,
            "Onboarding session initialized"
        );
        Ok((session, path))
    }

    /// Submit the step at the session's frontier.
    pub async fn complete_step(
        &mut self,
        session: &OnboardingSession,
        path: &OnboardingPath,
        step: &OnboardingStep,
        inputs: UserInputs,
        time_spent_secs: u64,
    ) -> Result<StepOutcome, Error> {
        self.ensure_open(session)?;
        self.ensure_at_frontier(session, path, step)?;

        let feedback = validator::validate_step(step, &inputs);
        if !feedback.is_valid {
            tracing::debug!(
                session_id = %session.id,
                step = %step.id,
                score = feedback.score,
                "Step submission rejected"
            );
            return Ok(StepOutcome::Rejected {
                result: StepResult::failed(&step.id, time_spent_secs, inputs, feedback),
            });
        }

        let result =
            StepResult::completed(&step.id, time_spent_secs, inputs, feedback.clone());
        self.advance(session, path, result, Some(feedback)).await
    }

    /// Skip the step at the frontier, bypassing validation.
    ///
    /// Only optional steps can be skipped; skipping a required step is a
    /// state error, never a silent no-op.
    pub async fn skip_step(
        &mut self,
        session: &OnboardingSession,
        path: &OnboardingPath,
        step: &OnboardingStep,
        time_spent_secs: u64,
    ) -> Result<StepOutcome, Error> {
        self.ensure_open(session)?;
        self.ensure_at_frontier(session, path, step)?;

        if step.is_required {
            return Err(StateError::SkipRequired {
                step_id: step.id.clone(),
            }
            .into());
        }

        let result = StepResult::skipped(&step.id, time_spent_secs);
        self.advance(session, path, result, None).await
    }

    /// Move the navigation pointer within already-reached steps.
    ///
    /// Does not touch progress, history, or validation. Forward movement
    /// past the frontier only ever happens through `complete_step`/`skip_step`.
    pub async fn navigate(
        &self,
        session: &OnboardingSession,
        path: &OnboardingPath,
        target_index: usize,
    ) -> Result<OnboardingSession, Error> {
        self.ensure_open(session)?;

        let reachable = session.furthest_step_index.min(
            path.total_steps().saturating_sub(1),
        );
        if target_index > reachable {
            return Err(StateError::NavigationOutOfRange {
                target: target_index,
                furthest: reachable,
            }
            .into());
        }

        let mut next = session.clone();
        next.current_step_index = target_index;
        next.last_active_at = Utc::now();
        self.store.update_session(&next).await?;
        Ok(next)
    }

    /// Pause the session. Pausing an already-paused session is a no-op
    /// success.
    pub async fn pause(&self, session: &OnboardingSession) -> Result<OnboardingSession, Error> {
        self.ensure_open(session)?;
        if session.status == SessionStatus::Paused {
            return Ok(session.clone());
        }

        let mut next = session.clone();
        next.status = SessionStatus::Paused;
        next.paused_at = Some(Utc::now());
        self.store.update_session(&next).await?;
        tracing::info!(session_id = %session.id, "Session paused");
        Ok(next)
    }

    /// Resume a paused session. Resuming an active session is a no-op
    /// success; resuming a completed one is a state error.
    pub async fn resume(&self, session: &OnboardingSession) -> Result<OnboardingSession, Error> {
        if session.is_completed() {
            return Err(StateError::CannotResume {
                session_id: session.id,
                status: session.status.to_string(),
            }
            .into());
        }
        if session.status == SessionStatus::Active {
            return Ok(session.clone());
        }

        let mut next = session.clone();
        next.status = SessionStatus::Active;
        next.paused_at = None;
        next.last_active_at = Utc::now();
        self.store.update_session(&next).await?;
        tracing::info!(session_id = %session.id, "Session resumed");
        Ok(next)
    }

    fn ensure_open(&self, session: &OnboardingSession) -> Result<(), StateError> {
        if session.is_completed() {
            return Err(StateError::SessionCompleted {
                session_id: session.id,
            });
        }
        Ok(())
    }

    fn ensure_at_frontier(
        &self,
        session: &OnboardingSession,
        path: &OnboardingPath,
        step: &OnboardingStep,
    ) -> Result<(), StateError> {
        match path.step_at(session.furthest_step_index) {
            Some(frontier) if frontier.id == step.id => Ok(()),
            _ => Err(StateError::StepMismatch {
                step_id: step.id.clone(),
            }),
        }
    }

    /// Shared success path for complete/skip: append the result, advance
    /// the frontier, recompute progress, re-evaluate milestones, commit.
    async fn advance(
        &mut self,
        session: &OnboardingSession,
        path: &OnboardingPath,
        result: StepResult,
        feedback: Option<Validation>,
    ) -> Result<StepOutcome, Error> {
        let now = Utc::now();
        let mut next = session.clone();
        next.history.push(result.clone());
        next.furthest_step_index += 1;
        next.current_step_index = next.furthest_step_index;
        next.progress_percent =
            OnboardingSession::percent_for(next.furthest_step_index, path.total_steps());
        next.time_spent_secs += result.time_spent_secs;
        next.last_active_at = now;

        let path_complete = next.furthest_step_index >= path.total_steps();
        if path_complete {
            next.status = SessionStatus::Completed;
            next.completed_at = Some(now);
            next.paused_at = None;
        }

        let outcome = self.evaluate_milestones(&next, now);

        // Commit: nothing above touched `self` or the caller's session, so
        // a store failure here leaves everything retryable.
        self.store.update_session(&next).await?;
        self.store.record_step_result(next.id, &result).await?;
        self.milestones
            .iter_mut()
            .for_each(|m| {
                if let Some(earned) = outcome.newly_earned.iter().find(|e| e.id == m.id) {
                    m.earned_at = earned.earned_at;
                }
            });

        tracing::info!(
            session_id = %next.id,
            step = %result.step_id,
            status = ?result.status,
            progress = next.progress_percent,
            "Step recorded"
        );

        if path_complete {
            let summary = CompletionSummary {
                step_ids: next.history.iter().map(|r| r.step_id.clone()).collect(),
                total_time_secs: next.time_spent_secs,
                final_score: next.average_score(),
            };
            tracing::info!(session_id = %next.id, score = summary.final_score, "Path completed");
            return Ok(StepOutcome::Completed {
                session: next,
                summary,
                newly_earned: outcome.newly_earned,
            });
        }

        let next_step = path
            .step_at(next.furthest_step_index)
            .cloned()
            .expect("frontier below total_steps");
        Ok(StepOutcome::Advanced {
            session: next,
            next_step,
            feedback: feedback.unwrap_or_else(Validation::passed),
            newly_earned: outcome.newly_earned,
        })
    }

    fn evaluate_milestones(
        &self,
        session: &OnboardingSession,
        now: chrono::DateTime<Utc>,
    ) -> MilestoneOutcome {
        let progress = SessionProgress {
            steps_completed: session.steps_completed(),
            progress_percent: session.progress_percent,
            time_spent_secs: session.time_spent_secs,
            average_score: session.average_score(),
        };
        milestone::evaluate(&progress, &self.milestones, now)
    }

    /// Progress snapshot plus next-milestone proximity for read models.
    pub fn progress_of(&self, session: &OnboardingSession) -> SessionProgress {
        SessionProgress {
            steps_completed: session.steps_completed(),
            progress_percent: session.progress_percent,
            time_spent_secs: session.time_spent_secs,
            average_score: session.average_score(),
        }
    }
}
