//! Integration tests for the onboarding wizard and sandbox engines.
//!
//! Each test builds a seeded in-memory store and drives the public API the
//! way a dashboard front-end would: initialize, submit, skip, pause,
//! navigate, and read the view model between commands.

use std::sync::Arc;

use serde_json::json;

use pathwise::config::{SandboxConfig, SupersedePolicy};
use pathwise::error::{Error, SandboxError, StateError};
use pathwise::milestone::{Milestone, MilestoneCriteria, MilestoneKind};
use pathwise::path::{
    InteractiveElement, OnboardingPath, OnboardingStep, StepKind, SuccessCriteria, UserRole,
};
use pathwise::sandbox::{SandboxEngine, Tutorial, TutorialAction, TutorialStep};
use pathwise::session::{OnboardingContext, SessionEngine, SessionStatus};
use pathwise::store::MemoryStore;
use pathwise::validator::UserInputs;
use pathwise::wizard::{WizardController, WizardEvent};

fn developer_path() -> OnboardingPath {
    OnboardingPath::new("path-developer", "Developer onboarding", UserRole::Developer).with_steps(
        vec![
            OnboardingStep::new("welcome", 0, StepKind::Tutorial, true).with_estimated_minutes(2),
            OnboardingStep::new("profile", 1, StepKind::Exercise, true)
                .with_estimated_minutes(5)
                .with_elements(vec![
                    InteractiveElement::input("display-name", true, Some(2)),
                    InteractiveElement::choice(
                        "team-size",
                        true,
                        vec!["solo".into(), "2-10".into(), "10+".into()],
                    ),
                ]),
            OnboardingStep::new("first-query", 2, StepKind::Setup, false)
                .with_estimated_minutes(8)
                .with_criteria(SuccessCriteria {
                    required_actions: vec!["ran_query".into()],
                    minimum_score: None,
                }),
        ],
    )
}

fn milestones() -> Vec<Milestone> {
    vec![
        Milestone::new(
            "first-step",
            "Off the ground",
            MilestoneKind::Progress,
            MilestoneCriteria::StepsCompleted { count: 1 },
            10,
        ),
        Milestone::new(
            "finisher",
            "Fully onboarded",
            MilestoneKind::Completion,
            MilestoneCriteria::ProgressPercent { percent: 100 },
            100,
        ),
    ]
}

async fn wizard_with(path: OnboardingPath) -> (WizardController, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new().with_path(path).await);
    let engine = SessionEngine::new(store.clone()).with_milestones(milestones());
    let context = OnboardingContext::new("user-1", UserRole::Developer);
    let wizard = WizardController::start(engine, &context).await.unwrap();
    (wizard, store)
}

#[tokio::test]
async fn full_wizard_run_to_completion() {
    let (mut wizard, store) = wizard_with(developer_path()).await;

    let view = wizard.view();
    assert_eq!(view.progress_percent, 0);
    assert_eq!(view.current_step.as_ref().unwrap().id, "welcome");
    assert_eq!(view.estimated_minutes_remaining, 15);

    // Tutorial passes with empty input.
    let events = wizard.complete_step(UserInputs::new(), 30).await.unwrap();
    assert!(matches!(&events[0], WizardEvent::StepCompleted { step_id, .. } if step_id == "welcome"));
    assert!(
        events
            .iter()
            .any(|e| matches!(e, WizardEvent::MilestonesEarned { .. }))
    );
    assert_eq!(wizard.view().progress_percent, 33);

    // A bad submission bounces without touching state.
    let mut bad = UserInputs::new();
    bad.insert("display-name".into(), json!("Jo"));
    let events = wizard.complete_step(bad, 40).await.unwrap();
    match &events[0] {
        WizardEvent::StepRejected { result } => {
            assert_eq!(result.feedback.errors.len(), 1);
            assert!(result.feedback.errors[0].contains("team-size"));
        }
        other => panic!("expected rejection, got {other:?}"),
    }
    assert_eq!(wizard.view().progress_percent, 33);
    assert_eq!(wizard.session().history.len(), 1);

    // Fixed submission advances.
    let mut good = UserInputs::new();
    good.insert("display-name".into(), json!("Jo"));
    good.insert("team-size".into(), json!("2-10"));
    let events = wizard.complete_step(good, 90).await.unwrap();
    assert!(matches!(&events[0], WizardEvent::StepCompleted { feedback, .. } if feedback.score == 100));
    assert_eq!(wizard.view().progress_percent, 67);

    // Skip the optional setup step; the path completes.
    let events = wizard.skip_step(0).await.unwrap();
    assert!(matches!(
        events.last().unwrap(),
        WizardEvent::PathCompleted { summary }
            if summary.step_ids == vec!["welcome", "profile", "first-query"]
    ));

    let view = wizard.view();
    assert_eq!(view.status, SessionStatus::Completed);
    assert_eq!(view.progress_percent, 100);
    assert_eq!(view.time_spent_secs, 120);
    assert_eq!(view.milestones.earned_count, 2);
    assert_eq!(view.milestones.total_points, 110);
    assert!(view.next_milestone.is_none());

    // The store saw every committed transition.
    let stored = store.session(wizard.session().id).await.unwrap();
    assert!(stored.is_completed());
    assert_eq!(store.results_for(stored.id).await.len(), 3);
}

#[tokio::test]
async fn pause_exit_and_resume_midway() {
    let (mut wizard, store) = wizard_with(developer_path()).await;
    wizard.complete_step(UserInputs::new(), 30).await.unwrap();

    let before = wizard.session().clone();
    wizard.exit().await.unwrap();
    assert_eq!(wizard.session().status, SessionStatus::Paused);
    assert!(wizard.session().paused_at.is_some());
    assert_eq!(
        store.session(before.id).await.unwrap().status,
        SessionStatus::Paused
    );

    wizard.resume().await.unwrap();
    let after = wizard.session();
    assert_eq!(after.status, SessionStatus::Active);
    assert!(after.paused_at.is_none());
    assert_eq!(after.current_step_index, before.current_step_index);
    assert_eq!(after.progress_percent, before.progress_percent);
    assert_eq!(after.history.len(), before.history.len());
}

#[tokio::test]
async fn navigation_stays_within_reached_steps() {
    let (mut wizard, _) = wizard_with(developer_path()).await;
    wizard.complete_step(UserInputs::new(), 10).await.unwrap();

    wizard.navigate(0).await.unwrap();
    assert_eq!(wizard.view().current_step.unwrap().id, "welcome");
    assert_eq!(wizard.view().progress_percent, 33);

    wizard.navigate(1).await.unwrap();
    assert_eq!(wizard.view().current_step.unwrap().id, "profile");

    let err = wizard.navigate(2).await.unwrap_err();
    assert!(matches!(
        err,
        Error::State(StateError::NavigationOutOfRange { .. })
    ));
}

#[tokio::test]
async fn required_steps_cannot_be_skipped() {
    let (mut wizard, _) = wizard_with(developer_path()).await;
    let err = wizard.skip_step(0).await.unwrap_err();
    assert!(matches!(err, Error::State(StateError::SkipRequired { .. })));
    assert_eq!(wizard.view().progress_percent, 0);
}

#[tokio::test]
async fn completed_session_rejects_further_commands() {
    let path = OnboardingPath::new("p-short", "Short", UserRole::Developer)
        .with_steps(vec![OnboardingStep::new("only", 0, StepKind::Tutorial, true)]);
    let (mut wizard, _) = wizard_with(path).await;

    wizard.complete_step(UserInputs::new(), 5).await.unwrap();
    assert_eq!(wizard.view().status, SessionStatus::Completed);

    let err = wizard.complete_step(UserInputs::new(), 5).await.unwrap_err();
    assert!(matches!(
        err,
        Error::State(StateError::SessionCompleted { .. })
    ));
    let err = wizard.resume().await.unwrap_err();
    assert!(matches!(err, Error::State(StateError::CannotResume { .. })));
}

// ── Sandbox engine ──────────────────────────────────────────────────

fn sign_in_tour() -> Tutorial {
    Tutorial {
        id: "tour-signin".into(),
        name: "Sign-in tour".into(),
        environment_id: "dashboard".into(),
        steps: vec![
            TutorialStep::new("click-signin", TutorialAction::Click, "#sign-in"),
            TutorialStep::new("enter-email", TutorialAction::Input, "#email")
                .with_expected_value("demo@example.com"),
        ],
    }
}

#[tokio::test]
async fn sandbox_tour_end_to_end() {
    let store = Arc::new(MemoryStore::new().with_tutorial(sign_in_tour()).await);
    let sandbox = SandboxEngine::new(store.clone(), store.clone(), SandboxConfig::default());

    let session = sandbox.create_session("user-1", "tour-signin").await.unwrap();

    let v = sandbox
        .validate_step(session.id, "enter-email", "wrong-email")
        .await
        .unwrap();
    assert!(!v.is_valid);
    assert_eq!(v.feedback, "Invalid input");

    let v = sandbox
        .validate_step(session.id, "click-signin", "#sign-in")
        .await
        .unwrap();
    assert!(v.is_valid);
    assert_eq!(v.next_step.as_deref(), Some("enter-email"));

    let v = sandbox
        .validate_step(session.id, "enter-email", "demo@example.com")
        .await
        .unwrap();
    assert!(v.is_valid);
    assert_eq!(v.feedback, "Correct input!");
    assert!(v.next_step.is_none());

    sandbox.end_session(session.id).await.unwrap();
    assert!(
        sandbox
            .get_active_session("user-1", "dashboard")
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn sandbox_reject_policy_guards_concurrent_tours() {
    let store = Arc::new(MemoryStore::new().with_tutorial(sign_in_tour()).await);
    let sandbox = SandboxEngine::new(
        store.clone(),
        store.clone(),
        SandboxConfig {
            supersede: SupersedePolicy::Reject,
            ..Default::default()
        },
    );

    sandbox.create_session("user-1", "tour-signin").await.unwrap();
    let err = sandbox
        .create_session("user-1", "tour-signin")
        .await
        .unwrap_err();
    assert!(matches!(err, SandboxError::SessionAlreadyActive { .. }));
}

#[tokio::test]
async fn onboarding_and_sandbox_share_a_store() {
    // One MemoryStore can back both engines at once, the way the demo
    // binary wires them.
    let store = Arc::new(
        MemoryStore::new()
            .with_path(developer_path())
            .await
            .with_tutorial(sign_in_tour())
            .await,
    );
    let engine = SessionEngine::new(store.clone());
    let context = OnboardingContext::new("user-1", UserRole::Developer);
    let mut wizard = WizardController::start(engine, &context).await.unwrap();
    wizard.complete_step(UserInputs::new(), 10).await.unwrap();

    let sandbox = SandboxEngine::new(store.clone(), store.clone(), SandboxConfig::default());
    let session = sandbox.create_session("user-1", "tour-signin").await.unwrap();
    let v = sandbox
        .validate_step(session.id, "click-signin", "#sign-in")
        .await
        .unwrap();
    assert!(v.is_valid);
    assert_eq!(wizard.view().progress_percent, 33);
}
