//! Milestones — earnable achievements derived from session progress.
//!
//! Evaluation is pure: it reads a progress snapshot and a catalog, and
//! returns newly earned milestones plus the next one in reach. Earned
//! milestones are stamped once and never re-evaluated; the earned set only
//! grows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Milestone category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneKind {
    Progress,
    Achievement,
    Completion,
    TimeBased,
}

/// When a milestone is earned, keyed off one progress metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "metric", rename_all = "snake_case")]
pub enum MilestoneCriteria {
    /// Earned after completing (or skipping past) this many steps.
    StepsCompleted { count: u32 },
    /// Earned at this overall progress percentage.
    ProgressPercent { percent: u8 },
    /// Earned after this much cumulative time in the path.
    TimeSpent { seconds: u64 },
    /// Earned when the running average step score reaches this value.
    AverageScore { score: u8 },
}

impl MilestoneCriteria {
    /// Numeric threshold, used to order the catalog for "next" selection.
    pub fn threshold(&self) -> f64 {
        match self {
            Self::StepsCompleted { count } => *count as f64,
            Self::ProgressPercent { percent } => *percent as f64,
            Self::TimeSpent { seconds } => *seconds as f64,
            Self::AverageScore { score } => *score as f64,
        }
    }

    /// Current value of this criteria's metric.
    fn metric(&self, progress: &SessionProgress) -> f64 {
        match self {
            Self::StepsCompleted { .. } => progress.steps_completed as f64,
            Self::ProgressPercent { .. } => progress.progress_percent as f64,
            Self::TimeSpent { .. } => progress.time_spent_secs as f64,
            Self::AverageScore { .. } => progress.average_score as f64,
        }
    }

    /// Whether the predicate holds against the snapshot.
    pub fn is_met(&self, progress: &SessionProgress) -> bool {
        self.metric(progress) >= self.threshold()
    }

    /// Proximity to earning, 0–100, capped.
    pub fn progress_toward(&self, progress: &SessionProgress) -> f64 {
        let threshold = self.threshold();
        if threshold <= 0.0 {
            return 100.0;
        }
        (self.metric(progress) / threshold * 100.0).min(100.0)
    }
}

/// What earning a milestone grants.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MilestoneReward {
    pub points: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// An earnable achievement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub kind: MilestoneKind,
    pub criteria: MilestoneCriteria,
    #[serde(default)]
    pub reward: MilestoneReward,
    /// Set exactly once, when first earned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub earned_at: Option<DateTime<Utc>>,
}

impl Milestone {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        kind: MilestoneKind,
        criteria: MilestoneCriteria,
        points: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            kind,
            criteria,
            reward: MilestoneReward {
                points,
                ..Default::default()
            },
            earned_at: None,
        }
    }

    pub fn is_earned(&self) -> bool {
        self.earned_at.is_some()
    }
}

/// Snapshot of cumulative session progress fed to the evaluator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionProgress {
    pub steps_completed: u32,
    pub progress_percent: u8,
    pub time_spent_secs: u64,
    /// Running average of recorded step scores, 0–100.
    pub average_score: u8,
}

/// The next unearned milestone and how close it is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextMilestone {
    pub milestone: Milestone,
    /// 0–100, capped.
    pub progress: f64,
}

/// Result of one evaluation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MilestoneOutcome {
    /// Milestones whose criteria became true this pass, stamped `earned_at`.
    pub newly_earned: Vec<Milestone>,
    /// The lowest-threshold unearned milestone after this pass, if any.
    pub next: Option<NextMilestone>,
}

/// Evaluate the catalog against a progress snapshot.
///
/// Entries already carrying `earned_at` are skipped (never re-evaluated).
/// The caller merges `newly_earned` back into its catalog; `now` is passed
/// in so the function stays clock-free.
pub fn evaluate(
    progress: &SessionProgress,
    catalog: &[Milestone],
    now: DateTime<Utc>,
) -> MilestoneOutcome {
    let mut newly_earned = Vec::new();
    let mut remaining: Vec<&Milestone> = Vec::new();

    for milestone in catalog {
        if milestone.is_earned() {
            continue;
        }
        if milestone.criteria.is_met(progress) {
            let mut earned = milestone.clone();
            earned.earned_at = Some(now);
            newly_earned.push(earned);
        } else {
            remaining.push(milestone);
        }
    }

    let next = remaining
        .into_iter()
        .min_by(|a, b| {
            a.criteria
                .threshold()
                .total_cmp(&b.criteria.threshold())
        })
        .map(|m| NextMilestone {
            milestone: m.clone(),
            progress: m.criteria.progress_toward(progress),
        });

    MilestoneOutcome { newly_earned, next }
}

/// Display aggregation over a catalog. Recomputed on demand, never cached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MilestoneSummary {
    pub earned_count: usize,
    pub total_count: usize,
    pub total_points: u32,
    /// Percent of catalog earned, 0–100.
    pub percent_complete: u8,
}

/// Fold the earned entries of a catalog into a summary.
pub fn summarize(catalog: &[Milestone]) -> MilestoneSummary {
    let earned_count = catalog.iter().filter(|m| m.is_earned()).count();
    let total_points = catalog
        .iter()
        .filter(|m| m.is_earned())
        .map(|m| m.reward.points)
        .sum();
    let percent_complete = if catalog.is_empty() {
        0
    } else {
        ((earned_count as f64 / catalog.len() as f64) * 100.0).round() as u8
    };
    MilestoneSummary {
        earned_count,
        total_count: catalog.len(),
        total_points,
        percent_complete,
    }
}
