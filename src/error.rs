//! Error types for the onboarding core.
//!
//! Validation outcomes are *not* errors — they flow back to callers as
//! [`crate::validator::Validation`] values so the UI can render inline
//! feedback. The enums here cover genuine faults: missing paths, illegal
//! state transitions, and collaborator failures.

use uuid::Uuid;

/// Top-level error type for the onboarding core.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Initialization error: {0}")]
    Initialization(#[from] InitializationError),

    #[error("State error: {0}")]
    State(#[from] StateError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Sandbox error: {0}")]
    Sandbox(#[from] SandboxError),
}

/// Failures while creating a new onboarding session.
///
/// No partial session exists after any of these — the caller may retry.
#[derive(Debug, thiserror::Error)]
pub enum InitializationError {
    #[error("No onboarding path found for role {role}")]
    NoPathForRole { role: String },

    #[error("Onboarding path {path_id} not found")]
    PathNotFound { path_id: String },

    #[error("Path lookup failed: {0}")]
    Persistence(#[from] PersistenceError),
}

/// An operation was requested on a session in an incompatible state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("Session {session_id} is already completed")]
    SessionCompleted { session_id: Uuid },

    #[error("Step {step_id} is required and cannot be skipped")]
    SkipRequired { step_id: String },

    #[error("Step {step_id} does not belong to the session's current position")]
    StepMismatch { step_id: String },

    #[error("Cannot navigate to index {target}: highest reached index is {furthest}")]
    NavigationOutOfRange { target: usize, furthest: usize },

    #[error("Cannot resume session {session_id}: status is {status}")]
    CannotResume { session_id: Uuid, status: String },
}

/// The persistence collaborator failed mid-transition.
///
/// The in-memory session is always left at its pre-call snapshot, so the
/// caller can retry the identical command without double-apply risk.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Concurrent write rejected: {0}")]
    Conflict(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Tutorial sandbox failures.
#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    #[error("Sandbox session {session_id} not found")]
    SessionNotFound { session_id: Uuid },

    #[error("Sandbox session {session_id} has expired")]
    SessionExpired { session_id: Uuid },

    #[error("Sandbox session {session_id} is no longer active")]
    SessionEnded { session_id: Uuid },

    #[error("Tutorial {tutorial_id} not found")]
    TutorialNotFound { tutorial_id: String },

    #[error("Tutorial step {step_id} not found")]
    StepNotFound { step_id: String },

    #[error("User {user_id} already has an active session in environment {environment_id}")]
    SessionAlreadyActive {
        user_id: String,
        environment_id: String,
    },

    #[error("Store error: {0}")]
    Persistence(#[from] PersistenceError),
}

/// Result type alias for the onboarding core.
pub type Result<T> = std::result::Result<T, Error>;
