// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Challenge templates and the user's active challenge instances.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Absolute tolerance when comparing progress against a target.
pub const COMPLETION_EPSILON: f64 = 0.1;

/// What a challenge measures. Climbing targets are meters, distance targets km.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeKind {
    Climbing,
    Distance,
}

/// Reusable goal definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ChallengeTemplate {
    pub id: String,
    pub title: String,
    pub kind: ChallengeKind,
    /// Meters for climbing, kilometers for distance
    pub target: f64,
}

impl ChallengeTemplate {
    fn builtin(id: &str, title: &str, kind: ChallengeKind, target: f64) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            kind,
            target,
        }
    }
}

/// Built-in challenge catalog.
pub fn builtin_templates() -> Vec<ChallengeTemplate> {
    use ChallengeKind::{Climbing, Distance};

    vec![
        ChallengeTemplate::builtin("climb-eiffel", "Eiffel Tower", Climbing, 330.0),
        ChallengeTemplate::builtin("climb-empire-state", "Empire State Building", Climbing, 443.0),
        ChallengeTemplate::builtin("climb-burj-khalifa", "Burj Khalifa", Climbing, 828.0),
        ChallengeTemplate::builtin("climb-ben-nevis", "Ben Nevis", Climbing, 1345.0),
        ChallengeTemplate::builtin("climb-mont-blanc", "Mont Blanc", Climbing, 4807.0),
        ChallengeTemplate::builtin("climb-kilimanjaro", "Kilimanjaro", Climbing, 5895.0),
        ChallengeTemplate::builtin("climb-everest", "Mount Everest", Climbing, 8849.0),
        ChallengeTemplate::builtin("distance-5k", "5K", Distance, 5.0),
        ChallengeTemplate::builtin("distance-10k", "10K", Distance, 10.0),
        ChallengeTemplate::builtin("distance-half-marathon", "Half Marathon", Distance, 21.0975),
        ChallengeTemplate::builtin("distance-marathon", "Marathon", Distance, 42.195),
        ChallengeTemplate::builtin("distance-century", "Century Ride", Distance, 160.934),
    ]
}

/// Amount credited from one workout toward one instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub workout_id: String,
    pub amount: f64,
    /// RFC 3339
    pub applied_at: String,
}

/// A user's attempt at a template.
///
/// `progress` always equals the sum of `contributions`; it is only ever
/// recomputed from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeInstance {
    pub instance_id: String,
    pub template_id: String,
    pub title: String,
    pub kind: ChallengeKind,
    pub target: f64,
    progress: f64,
    #[serde(default)]
    contributions: Vec<Contribution>,
}

impl ChallengeInstance {
    /// Fresh instance of `template` with no progress.
    pub fn from_template(template: &ChallengeTemplate) -> Self {
        Self {
            instance_id: uuid::Uuid::new_v4().to_string(),
            template_id: template.id.clone(),
            title: template.title.clone(),
            kind: template.kind,
            target: template.target,
            progress: 0.0,
            contributions: Vec::new(),
        }
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn contributions(&self) -> &[Contribution] {
        &self.contributions
    }

    pub fn is_complete(&self) -> bool {
        self.progress >= self.target - COMPLETION_EPSILON
    }

    /// Fraction of the target reached, capped at 1.
    pub fn completion_ratio(&self) -> f64 {
        if self.target <= 0.0 {
            return 1.0;
        }
        (self.progress / self.target).clamp(0.0, 1.0)
    }

    pub fn has_contribution_from(&self, workout_id: &str) -> bool {
        self.contributions.iter().any(|c| c.workout_id == workout_id)
    }

    /// Append a contribution and update progress.
    ///
    /// Non-finite or negative amounts are ignored and `false` is returned.
    pub fn add_contribution(&mut self, workout_id: &str, amount: f64, applied_at: &str) -> bool {
        if !amount.is_finite() || amount < 0.0 {
            return false;
        }
        self.contributions.push(Contribution {
            workout_id: workout_id.to_string(),
            amount,
            applied_at: applied_at.to_string(),
        });
        self.recompute_progress();
        true
    }

    /// Remove every contribution from `workout_id`. Returns how many were removed.
    pub fn reverse_contributions(&mut self, workout_id: &str) -> usize {
        let before = self.contributions.len();
        self.contributions.retain(|c| c.workout_id != workout_id);
        let removed = before - self.contributions.len();
        if removed > 0 {
            self.recompute_progress();
        }
        removed
    }

    /// Point contributions recorded under `old_id` at `new_id`.
    pub fn rename_workout(&mut self, old_id: &str, new_id: &str) -> usize {
        let mut renamed = 0;
        for contribution in &mut self.contributions {
            if contribution.workout_id == old_id {
                contribution.workout_id = new_id.to_string();
                renamed += 1;
            }
        }
        renamed
    }

    /// Recompute progress if a stored value drifted from its contributions.
    ///
    /// Returns the stale value when a repair happened.
    pub fn repair_progress(&mut self) -> Option<f64> {
        let stale = self.progress;
        self.recompute_progress();
        if (stale - self.progress).abs() > f64::EPSILON * self.progress.abs().max(1.0) {
            Some(stale)
        } else {
            None
        }
    }

    fn recompute_progress(&mut self) {
        let sum: f64 = self.contributions.iter().map(|c| c.amount).sum();
        self.progress = sum.max(0.0);
    }
}
