use std::sync::Arc;

use pathwise::config::SandboxConfig;
use pathwise::milestone::{Milestone, MilestoneCriteria, MilestoneKind};
use pathwise::path::{
    InteractiveElement, OnboardingPath, OnboardingStep, StepContent, StepKind, SuccessCriteria,
    UserRole,
};
use pathwise::sandbox::{SandboxEngine, Tutorial, TutorialAction, TutorialStep};
use pathwise::session::{OnboardingContext, SessionEngine};
use pathwise::store::MemoryStore;
use pathwise::validator::UserInputs;
use pathwise::wizard::{WizardController, WizardEvent};

fn demo_path() -> OnboardingPath {
    OnboardingPath::new("path-developer", "Developer onboarding", UserRole::Developer).with_steps(
        vec![
            OnboardingStep::new("welcome", 0, StepKind::Tutorial, true)
                .with_estimated_minutes(2)
                .with_content(StepContent::Text {
                    body: "Welcome! Let's get your workspace set up.".into(),
                }),
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
                    minimum_score: Some(80),
                }),
        ],
    )
}

fn demo_milestones() -> Vec<Milestone> {
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

fn demo_tutorial() -> Tutorial {
    Tutorial {
        id: "tour-signin".into(),
        name: "Sign-in tour".into(),
        environment_id: "dashboard".into(),
        steps: vec![
            TutorialStep::new("click-signin", TutorialAction::Click, "#sign-in"),
            TutorialStep::new("enter-email", TutorialAction::Input, "#email")
                .with_expected_value("demo@example.com")
                .with_hints(vec!["Use the demo account address".into()]),
        ],
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    eprintln!("Pathwise v{}", env!("CARGO_PKG_VERSION"));

    let store = Arc::new(
        MemoryStore::new()
            .with_path(demo_path())
            .await
            .with_tutorial(demo_tutorial())
            .await,
    );

    // ── Onboarding wizard ───────────────────────────────────────────
    let engine = SessionEngine::new(store.clone()).with_milestones(demo_milestones());
    let context = OnboardingContext::new("demo-user", UserRole::Developer);
    let mut wizard = WizardController::start(engine, &context).await?;

    wizard.complete_step(UserInputs::new(), 45).await?;

    let mut inputs = UserInputs::new();
    inputs.insert("display-name".into(), serde_json::json!("Demo User"));
    inputs.insert("team-size".into(), serde_json::json!("2-10"));
    for event in wizard.complete_step(inputs, 120).await? {
        if let WizardEvent::MilestonesEarned { milestones } = event {
            for m in milestones {
                eprintln!("  milestone earned: {}", m.name);
            }
        }
    }

    let events = wizard.skip_step(0).await?;
    if events
        .iter()
        .any(|e| matches!(e, WizardEvent::PathCompleted { .. }))
    {
        let view = wizard.view();
        eprintln!(
            "  onboarding done: {}% in {}s, {} milestone points",
            view.progress_percent, view.time_spent_secs, view.milestones.total_points
        );
    }

    // ── Sandbox tour ────────────────────────────────────────────────
    let sandbox = SandboxEngine::new(store.clone(), store.clone(), SandboxConfig::default());
    let session = sandbox.create_session("demo-user", "tour-signin").await?;

    let v = sandbox
        .validate_step(session.id, "click-signin", "#sign-in")
        .await?;
    eprintln!("  tour step 1: {}", v.feedback);
    let v = sandbox
        .validate_step(session.id, "enter-email", "demo@example.com")
        .await?;
    eprintln!("  tour step 2: {}", v.feedback);
    sandbox.end_session(session.id).await?;

    Ok(())
}
