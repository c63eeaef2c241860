// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Challenge engine.
//!
//! Handles the lifecycle of challenge instances:
//! 1. Activate a template as a fresh instance
//! 2. Credit selected workouts as contributions
//! 3. Reconcile trophies with each instance's completion state
//! 4. Remove instances (their trophies are kept as history)

use serde::Serialize;

use crate::error::EngineError;
use crate::models::challenge::builtin_templates;
use crate::models::{
    ChallengeInstance, ChallengeKind, ChallengeTemplate, PrimaryMetric, Trophy, UserData, Workout,
};
use crate::services::physics;

/// Prefix for user-defined template ids.
const CUSTOM_TEMPLATE_PREFIX: &str = "custom-";

// ─── Templates ───────────────────────────────────────────────

/// Every template available to the user: built-ins first, then custom ones.
pub fn all_templates(data: &UserData) -> Vec<ChallengeTemplate> {
    let mut templates = builtin_templates();
    templates.extend(data.custom_climbing.iter().cloned());
    templates.extend(data.custom_distance.iter().cloned());
    templates
}

pub fn find_template(data: &UserData, template_id: &str) -> Option<ChallengeTemplate> {
    all_templates(data)
        .into_iter()
        .find(|t| t.id == template_id)
}

/// Define a custom template and store it under its kind's category.
pub fn create_custom_template(
    data: &mut UserData,
    title: &str,
    kind: ChallengeKind,
    target: f64,
) -> Result<ChallengeTemplate, EngineError> {
    if !target.is_finite() || target <= 0.0 {
        return Err(EngineError::InvalidTarget(target));
    }

    let template = ChallengeTemplate {
        id: format!("{}{}", CUSTOM_TEMPLATE_PREFIX, uuid::Uuid::new_v4()),
        title: title.trim().to_string(),
        kind,
        target,
    };

    match kind {
        ChallengeKind::Climbing => data.custom_climbing.push(template.clone()),
        ChallengeKind::Distance => data.custom_distance.push(template.clone()),
    }

    tracing::info!(template_id = %template.id, ?kind, target, "Created custom template");
    Ok(template)
}

// ─── Instances ───────────────────────────────────────────────

/// Start a fresh attempt at `template_id`.
pub fn activate(data: &mut UserData, template_id: &str) -> Result<ChallengeInstance, EngineError> {
    let template = find_template(data, template_id)
        .ok_or_else(|| EngineError::UnknownTemplate(template_id.to_string()))?;

    let instance = ChallengeInstance::from_template(&template);
    data.challenges.push(instance.clone());

    tracing::info!(
        instance_id = %instance.instance_id,
        template_id,
        "Activated challenge"
    );
    Ok(instance)
}

/// Remove an instance. Trophies it earned stay as historical records.
pub fn remove(data: &mut UserData, instance_id: &str) -> Result<ChallengeInstance, EngineError> {
    let index = data
        .challenges
        .iter()
        .position(|c| c.instance_id == instance_id)
        .ok_or_else(|| EngineError::UnknownInstance(instance_id.to_string()))?;

    let removed = data.challenges.remove(index);
    tracing::info!(
        instance_id,
        contributions = removed.contributions().len(),
        completed = removed.is_complete(),
        "Removed challenge"
    );
    Ok(removed)
}

/// Amount a workout would add to a challenge of `kind`.
///
/// Climbing challenges take energy-based workouts (meters climbed); distance
/// challenges take distance-based workouts (km). Anything else is `None`.
pub fn contribution_amount(kind: ChallengeKind, workout: &Workout, rider_weight_kg: f64) -> Option<f64> {
    match (kind, workout.metric) {
        (ChallengeKind::Climbing, PrimaryMetric::Energy { kj }) => {
            Some(physics::elevation(kj, rider_weight_kg).meters).filter(|m| *m > 0.0)
        }
        (ChallengeKind::Distance, PrimaryMetric::Distance { km }) => {
            Some(km).filter(|k| k.is_finite() && *k > 0.0)
        }
        _ => None,
    }
}

/// Why a selected workout was not credited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    UnknownWorkout,
    AlreadyApplied,
    MetricMismatch,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedWorkout {
    pub workout_id: String,
    pub reason: SkipReason,
}

/// Result of crediting workouts to an instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ApplyOutcome {
    pub applied: Vec<String>,
    pub skipped: Vec<SkippedWorkout>,
    pub progress: f64,
    /// The instance crossed into completion with this call
    pub newly_completed: bool,
    pub trophies: SyncReport,
}

/// Credit the selected workouts to an instance, then reconcile trophies.
pub fn apply_workouts(
    data: &mut UserData,
    instance_id: &str,
    workout_ids: &[String],
    rider_weight_kg: f64,
    now: &str,
) -> Result<ApplyOutcome, EngineError> {
    let index = data
        .challenges
        .iter()
        .position(|c| c.instance_id == instance_id)
        .ok_or_else(|| EngineError::UnknownInstance(instance_id.to_string()))?;

    let mut outcome = ApplyOutcome::default();
    let workouts = &data.workouts;
    let instance = &mut data.challenges[index];
    let was_complete = instance.is_complete();

    for workout_id in workout_ids {
        let skip = |reason| SkippedWorkout {
            workout_id: workout_id.clone(),
            reason,
        };

        let Some(workout) = workouts.iter().find(|w| &w.id == workout_id) else {
            outcome.skipped.push(skip(SkipReason::UnknownWorkout));
            continue;
        };
        if instance.has_contribution_from(workout_id) {
            outcome.skipped.push(skip(SkipReason::AlreadyApplied));
            continue;
        }
        let Some(amount) = contribution_amount(instance.kind, workout, rider_weight_kg) else {
            outcome.skipped.push(skip(SkipReason::MetricMismatch));
            continue;
        };

        if instance.add_contribution(workout_id, amount, now) {
            outcome.applied.push(workout_id.clone());
        }
    }

    outcome.progress = instance.progress();
    outcome.newly_completed = !was_complete && instance.is_complete();

    tracing::info!(
        instance_id,
        applied = outcome.applied.len(),
        skipped = outcome.skipped.len(),
        progress = outcome.progress,
        newly_completed = outcome.newly_completed,
        "Applied workouts to challenge"
    );

    outcome.trophies = sync_trophies(&data.challenges, &mut data.trophies, now);
    Ok(outcome)
}

/// Repair any instance whose stored progress diverged from its contributions.
///
/// Returns the number of instances repaired.
pub fn verify_progress(instances: &mut [ChallengeInstance]) -> usize {
    let mut repaired = 0;
    for instance in instances.iter_mut() {
        if let Some(stale) = instance.repair_progress() {
            tracing::warn!(
                instance_id = %instance.instance_id,
                stale,
                progress = instance.progress(),
                "Challenge progress diverged from contributions; recomputed"
            );
            repaired += 1;
        }
    }
    repaired
}

// ─── Trophy Reconciliation ───────────────────────────────────

/// How a trophy was matched to an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TrophyMatch {
    /// Trophy carries this instance's id.
    InstanceId,
    /// Legacy trophy without an instance id, same template.
    TemplateId,
    /// Oldest legacy trophy with neither id, same title. Two instances that
    /// share a title can claim each other's trophy this way.
    Title,
}

/// Find the trophy belonging to `instance`, trying the most specific key first.
pub fn find_trophy(instance: &ChallengeInstance, trophies: &[Trophy]) -> Option<(usize, TrophyMatch)> {
    let by_instance = trophies
        .iter()
        .position(|t| t.instance_id.as_deref() == Some(instance.instance_id.as_str()));
    if let Some(index) = by_instance {
        return Some((index, TrophyMatch::InstanceId));
    }

    let by_template = trophies.iter().position(|t| {
        t.instance_id.is_none() && t.template_id.as_deref() == Some(instance.template_id.as_str())
    });
    if let Some(index) = by_template {
        return Some((index, TrophyMatch::TemplateId));
    }

    trophies
        .iter()
        .position(|t| t.instance_id.is_none() && t.template_id.is_none() && t.title == instance.title)
        .map(|index| (index, TrophyMatch::Title))
}

/// Changes made by one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyncReport {
    pub awarded: Vec<Trophy>,
    pub removed: Vec<Trophy>,
    /// Legacy trophies that were tied to an instance
    pub adopted: Vec<String>,
}

impl SyncReport {
    pub fn is_empty(&self) -> bool {
        self.awarded.is_empty() && self.removed.is_empty() && self.adopted.is_empty()
    }
}

/// Make trophies agree with the completion state of the active instances.
///
/// - every complete instance has exactly one trophy (awarded if missing,
///   legacy records adopted, duplicates dropped)
/// - trophies of active instances that are no longer complete are removed
/// - trophies of instances that no longer exist are left alone
///
/// Running it twice in a row changes nothing the second time.
pub fn sync_trophies(instances: &[ChallengeInstance], trophies: &mut Vec<Trophy>, now: &str) -> SyncReport {
    let mut report = SyncReport::default();

    for instance in instances.iter().filter(|i| i.is_complete()) {
        match find_trophy(instance, trophies) {
            Some((_, TrophyMatch::InstanceId)) => {}
            Some((index, _)) => {
                let trophy = &mut trophies[index];
                trophy.instance_id = Some(instance.instance_id.clone());
                trophy.template_id = Some(instance.template_id.clone());
                report.adopted.push(trophy.id.clone());
            }
            None => {
                let trophy = Trophy::for_instance(instance, now);
                tracing::info!(
                    instance_id = %instance.instance_id,
                    trophy_id = %trophy.id,
                    title = %trophy.title,
                    "Awarded trophy"
                );
                report.awarded.push(trophy.clone());
                trophies.push(trophy);
            }
        }

        // Keep only the first trophy for this instance.
        let mut seen = false;
        let mut duplicates = Vec::new();
        trophies.retain(|t| {
            if t.instance_id.as_deref() != Some(instance.instance_id.as_str()) {
                return true;
            }
            if seen {
                duplicates.push(t.clone());
                return false;
            }
            seen = true;
            true
        });
        report.removed.extend(duplicates);
    }

    let incomplete: Vec<&str> = instances
        .iter()
        .filter(|i| !i.is_complete())
        .map(|i| i.instance_id.as_str())
        .collect();

    trophies.retain(|t| {
        let regressed = t
            .instance_id
            .as_deref()
            .is_some_and(|id| incomplete.contains(&id));
        if regressed {
            tracing::info!(
                trophy_id = %t.id,
                instance_id = ?t.instance_id,
                "Removed trophy for regressed challenge"
            );
            report.removed.push(t.clone());
        }
        !regressed
    });

    if !report.adopted.is_empty() {
        tracing::info!(count = report.adopted.len(), "Adopted legacy trophies");
    }

    report
}
