//! Wizard controller — the UI-facing surface of the onboarding engine.
//!
//! Holds one session and its path, dispatches the five session commands,
//! and hands presentation explicit [`WizardEvent`] values instead of
//! threading callbacks through UI layers. Rendering subscribes to the
//! returned events; it never reaches into the state machine.

use serde::Serialize;

use crate::error::{Error, InitializationError, StateError};
use crate::milestone::{self, Milestone, MilestoneSummary, NextMilestone};
use crate::path::{OnboardingPath, OnboardingStep};
use crate::session::engine::{CompletionSummary, SessionEngine, StepOutcome};
use crate::session::model::{OnboardingContext, OnboardingSession, SessionStatus, StepResult};
use crate::validator::{UserInputs, Validation};

/// What a command did. Presentation renders these; attempt counters for
/// rejected steps live with the caller.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WizardEvent {
    StepRejected {
        result: StepResult,
    },
    StepCompleted {
        step_id: String,
        feedback: Validation,
        next_step_id: String,
    },
    StepSkipped {
        step_id: String,
        next_step_id: Option<String>,
    },
    MilestonesEarned {
        milestones: Vec<Milestone>,
    },
    PathCompleted {
        summary: CompletionSummary,
    },
    Navigated {
        index: usize,
    },
    Paused,
    Resumed,
    Exited,
}

/// Read model for the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct WizardView {
    pub session_id: uuid::Uuid,
    pub status: SessionStatus,
    /// Step under the navigation pointer; `None` once the path is done.
    pub current_step: Option<OnboardingStep>,
    pub progress_percent: u8,
    pub time_spent_secs: u64,
    /// Sum of estimates for steps not yet reached.
    pub estimated_minutes_remaining: u32,
    pub milestones: MilestoneSummary,
    pub next_milestone: Option<NextMilestone>,
}

/// Orchestrates one session from initialization to completion.
pub struct WizardController {
    engine: SessionEngine,
    session: OnboardingSession,
    path: OnboardingPath,
}

impl WizardController {
    /// Initialize a session for the context and wrap it in a controller.
    pub async fn start(
        engine: SessionEngine,
        context: &OnboardingContext,
    ) -> Result<Self, InitializationError> {
        let (session, path) = engine.initialize(context).await?;
        Ok(Self {
            engine,
            session,
            path,
        })
    }

    pub fn session(&self) -> &OnboardingSession {
        &self.session
    }

    pub fn path(&self) -> &OnboardingPath {
        &self.path
    }

    /// The step awaiting completion (at the frontier), if any.
    fn frontier_step(&self) -> Result<OnboardingStep, StateError> {
        self.path
            .step_at(self.session.furthest_step_index)
            .cloned()
            .ok_or(StateError::SessionCompleted {
                session_id: self.session.id,
            })
    }

    /// Submit inputs for the current step.
    pub async fn complete_step(
        &mut self,
        inputs: UserInputs,
        time_spent_secs: u64,
    ) -> Result<Vec<WizardEvent>, Error> {
        let step = self.frontier_step()?;
        let outcome = self
            .engine
            .complete_step(&self.session, &self.path, &step, inputs, time_spent_secs)
            .await?;
        Ok(self.apply(outcome))
    }

    /// Skip the current (optional) step.
    pub async fn skip_step(&mut self, time_spent_secs: u64) -> Result<Vec<WizardEvent>, Error> {
        let step = self.frontier_step()?;
        let outcome = self
            .engine
            .skip_step(&self.session, &self.path, &step, time_spent_secs)
            .await?;
        Ok(self.apply(outcome))
    }

    /// Move the pointer to an already-reached step.
    pub async fn navigate(&mut self, target_index: usize) -> Result<Vec<WizardEvent>, Error> {
        self.session = self
            .engine
            .navigate(&self.session, &self.path, target_index)
            .await?;
        Ok(vec![WizardEvent::Navigated {
            index: target_index,
        }])
    }

    pub async fn pause(&mut self) -> Result<Vec<WizardEvent>, Error> {
        self.session = self.engine.pause(&self.session).await?;
        Ok(vec![WizardEvent::Paused])
    }

    pub async fn resume(&mut self) -> Result<Vec<WizardEvent>, Error> {
        self.session = self.engine.resume(&self.session).await?;
        Ok(vec![WizardEvent::Resumed])
    }

    /// Leave the wizard, pausing the session so it can be resumed later.
    /// Exiting an already-completed session just emits `Exited`.
    pub async fn exit(&mut self) -> Result<Vec<WizardEvent>, Error> {
        if !self.session.is_completed() {
            self.session = self.engine.pause(&self.session).await?;
        }
        Ok(vec![WizardEvent::Exited])
    }

    /// Fold a state-machine outcome into the controller and emit events.
    fn apply(&mut self, outcome: StepOutcome) -> Vec<WizardEvent> {
        let mut events = Vec::new();
        match outcome {
            StepOutcome::Rejected { result } => {
                events.push(WizardEvent::StepRejected { result });
            }
            StepOutcome::Advanced {
                session,
                next_step,
                feedback,
                newly_earned,
            } => {
                let step_id = session
                    .history
                    .last()
                    .map(|r| r.step_id.clone())
                    .unwrap_or_default();
                let skipped = session
                    .history
                    .last()
                    .is_some_and(|r| r.status == crate::session::StepResultStatus::Skipped);
                self.session = session;
                if skipped {
                    events.push(WizardEvent::StepSkipped {
                        step_id,
                        next_step_id: Some(next_step.id),
                    });
                } else {
                    events.push(WizardEvent::StepCompleted {
                        step_id,
                        feedback,
                        next_step_id: next_step.id,
                    });
                }
                if !newly_earned.is_empty() {
                    events.push(WizardEvent::MilestonesEarned {
                        milestones: newly_earned,
                    });
                }
            }
            StepOutcome::Completed {
                session,
                summary,
                newly_earned,
            } => {
                let step_id = session
                    .history
                    .last()
                    .map(|r| r.step_id.clone())
                    .unwrap_or_default();
                let skipped = session
                    .history
                    .last()
                    .is_some_and(|r| r.status == crate::session::StepResultStatus::Skipped);
                self.session = session;
                if skipped {
                    events.push(WizardEvent::StepSkipped {
                        step_id,
                        next_step_id: None,
                    });
                }
                if !newly_earned.is_empty() {
                    events.push(WizardEvent::MilestonesEarned {
                        milestones: newly_earned,
                    });
                }
                events.push(WizardEvent::PathCompleted { summary });
            }
        }
        events
    }

    /// Snapshot for rendering. Recomputed on demand, never cached.
    pub fn view(&self) -> WizardView {
        let progress = self.engine.progress_of(&self.session);
        let remaining: u32 = self
            .path
            .steps
            .iter()
            .skip(self.session.furthest_step_index)
            .map(|s| s.estimated_minutes)
            .sum();
        let next_milestone = milestone::evaluate(
            &progress,
            self.engine.milestones(),
            chrono::Utc::now(),
        )
        .next;

        WizardView {
            session_id: self.session.id,
            status: self.session.status,
            current_step: self
                .path
                .step_at(self.session.current_step_index)
                .cloned(),
            progress_percent: self.session.progress_percent,
            time_spent_secs: self.session.time_spent_secs,
            estimated_minutes_remaining: remaining,
            milestones: milestone::summarize(self.engine.milestones()),
            next_milestone,
        }
    }
}
