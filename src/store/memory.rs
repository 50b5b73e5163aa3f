//! In-memory store backend for tests and the demo binary.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::PersistenceError;
use crate::path::{OnboardingPath, UserRole};
use crate::sandbox::model::{SandboxSession, Tutorial};
use crate::session::model::{OnboardingSession, StepResult};

use super::traits::{OnboardingStore, SandboxSessionStore, TutorialStore};

/// A single backend implementing all three collaborator traits behind
/// `RwLock`ed maps. Seed it with `with_path`/`with_tutorial` before handing
/// it to an engine.
#[derive(Default)]
pub struct MemoryStore {
    paths: RwLock<Vec<OnboardingPath>>,
    sessions: RwLock<HashMap<Uuid, OnboardingSession>>,
    results: RwLock<HashMap<Uuid, Vec<StepResult>>>,
    tutorials: RwLock<HashMap<String, Tutorial>>,
    sandbox_sessions: RwLock<HashMap<Uuid, SandboxSession>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a path template.
    pub async fn with_path(self, path: OnboardingPath) -> Self {
        self.paths.write().await.push(path);
        self
    }

    /// Seed a tutorial script.
    pub async fn with_tutorial(self, tutorial: Tutorial) -> Self {
        self.tutorials
            .write()
            .await
            .insert(tutorial.id.clone(), tutorial);
        self
    }

    /// Recorded step results for a session (test inspection).
    pub async fn results_for(&self, session_id: Uuid) -> Vec<StepResult> {
        self.results
            .read()
            .await
            .get(&session_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Stored session snapshot (test inspection).
    pub async fn session(&self, session_id: Uuid) -> Option<OnboardingSession> {
        self.sessions.read().await.get(&session_id).cloned()
    }
}

#[async_trait]
impl OnboardingStore for MemoryStore {
    async fn get_path(&self, path_id: &str) -> Result<Option<OnboardingPath>, PersistenceError> {
        Ok(self
            .paths
            .read()
            .await
            .iter()
            .find(|p| p.id == path_id)
            .cloned())
    }

    async fn find_path_for_role(
        &self,
        role: UserRole,
    ) -> Result<Option<OnboardingPath>, PersistenceError> {
        Ok(self
            .paths
            .read()
            .await
            .iter()
            .find(|p| p.target_role == role)
            .cloned())
    }

    async fn create_session(&self, session: &OnboardingSession) -> Result<(), PersistenceError> {
        self.sessions
            .write()
            .await
            .insert(session.id, session.clone());
        Ok(())
    }

    async fn update_session(&self, session: &OnboardingSession) -> Result<(), PersistenceError> {
        let mut sessions = self.sessions.write().await;
        if !sessions.contains_key(&session.id) {
            return Err(PersistenceError::NotFound {
                entity: "session".into(),
                id: session.id.to_string(),
            });
        }
        sessions.insert(session.id, session.clone());
        Ok(())
    }

    async fn record_step_result(
        &self,
        session_id: Uuid,
        result: &StepResult,
    ) -> Result<(), PersistenceError> {
        self.results
            .write()
            .await
            .entry(session_id)
            .or_default()
            .push(result.clone());
        Ok(())
    }
}

#[async_trait]
impl TutorialStore for MemoryStore {
    async fn get_tutorial(&self, tutorial_id: &str) -> Result<Option<Tutorial>, PersistenceError> {
        Ok(self.tutorials.read().await.get(tutorial_id).cloned())
    }
}

#[async_trait]
impl SandboxSessionStore for MemoryStore {
    async fn get(
        &self,
        user_id: &str,
        environment_id: &str,
    ) -> Result<Option<SandboxSession>, PersistenceError> {
        // Superseded sessions linger under the same pair; the newest one is
        // the pair's session of record.
        Ok(self
            .sandbox_sessions
            .read()
            .await
            .values()
            .filter(|s| s.user_id == user_id && s.environment_id == environment_id)
            .max_by_key(|s| s.created_at)
            .cloned())
    }

    async fn get_by_id(
        &self,
        session_id: Uuid,
    ) -> Result<Option<SandboxSession>, PersistenceError> {
        Ok(self.sandbox_sessions.read().await.get(&session_id).cloned())
    }

    async fn put(&self, session: &SandboxSession) -> Result<(), PersistenceError> {
        self.sandbox_sessions
            .write()
            .await
            .insert(session.id, session.clone());
        Ok(())
    }

    async fn remove(&self, session_id: Uuid) -> Result<(), PersistenceError> {
        self.sandbox_sessions.write().await.remove(&session_id);
        Ok(())
    }
}
