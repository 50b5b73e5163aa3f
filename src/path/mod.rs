//! Onboarding path templates — ordered steps, interactive elements, and
//! success criteria. Paths are seed/configuration data and read-only at
//! runtime; sessions traverse them.

pub mod model;

pub use model::{
    ElementKind, InteractiveElement, OnboardingPath, OnboardingStep, StepContent, StepKind,
    SuccessCriteria, UserRole,
};
