//! Sandbox tutorial engine — scripted product tours.
//!
//! A leaner sibling of the onboarding engine: per-step literal validation,
//! no scoring, one active session per user/environment, lazy expiry.

pub mod engine;
pub mod model;

pub use engine::{SandboxEngine, StepValidation};
pub use model::{SandboxSession, Tutorial, TutorialAction, TutorialStep};
