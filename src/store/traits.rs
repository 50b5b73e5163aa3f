//! Collaborator traits for path, session, and sandbox persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::PersistenceError;
use crate::path::{OnboardingPath, UserRole};
use crate::sandbox::model::{SandboxSession, Tutorial};
use crate::session::model::{OnboardingSession, StepResult};

/// Path and session persistence for the onboarding engine.
///
/// Implementations decide conflict policy for concurrent writers; the core
/// only requires that a rejected write changes nothing, so a caller can
/// re-fetch and retry.
#[async_trait]
pub trait OnboardingStore: Send + Sync {
    /// Fetch a path template by id.
    async fn get_path(&self, path_id: &str) -> Result<Option<OnboardingPath>, PersistenceError>;

    /// Fetch the path targeted at a role, if one is configured.
    async fn find_path_for_role(
        &self,
        role: UserRole,
    ) -> Result<Option<OnboardingPath>, PersistenceError>;

    /// Persist a newly initialized session.
    async fn create_session(&self, session: &OnboardingSession) -> Result<(), PersistenceError>;

    /// Persist a session after a transition.
    async fn update_session(&self, session: &OnboardingSession) -> Result<(), PersistenceError>;

    /// Record one step result for a session.
    async fn record_step_result(
        &self,
        session_id: Uuid,
        result: &StepResult,
    ) -> Result<(), PersistenceError>;
}

/// Read access to tutorial scripts for the sandbox engine.
#[async_trait]
pub trait TutorialStore: Send + Sync {
    async fn get_tutorial(&self, tutorial_id: &str) -> Result<Option<Tutorial>, PersistenceError>;
}

/// Sandbox session registry, keyed by `(user_id, environment_id)`.
///
/// An explicit store rather than a module-level registry so tests can
/// substitute their own without touching process-wide state.
#[async_trait]
pub trait SandboxSessionStore: Send + Sync {
    /// Look up the session for a user/environment pair, active or not.
    async fn get(
        &self,
        user_id: &str,
        environment_id: &str,
    ) -> Result<Option<SandboxSession>, PersistenceError>;

    /// Look up a session by id.
    async fn get_by_id(
        &self,
        session_id: Uuid,
    ) -> Result<Option<SandboxSession>, PersistenceError>;

    /// Insert or replace a session.
    async fn put(&self, session: &SandboxSession) -> Result<(), PersistenceError>;

    /// Remove a session.
    async fn remove(&self, session_id: Uuid) -> Result<(), PersistenceError>;
}
