//! Onboarding sessions — one user's live traversal of a path.
//!
//! `model` holds the session and step-result records; `engine` is the state
//! machine that moves them through `active → paused → active → completed`.

pub mod engine;
pub mod model;

pub use engine::{CompletionSummary, SessionEngine, StepOutcome};
pub use model::{
    OnboardingContext, OnboardingSession, SessionStatus, SessionType, StepResult,
    StepResultStatus,
};
