// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout ledger: create, confirm, edit and delete workouts.
//!
//! New workouts get a provisional id right away so they show up before the
//! store has confirmed the write. Once it has, [`confirm`] swaps in the
//! persisted id everywhere the provisional one was used.
//!
//! Deleting a workout reverses its contributions in every challenge and
//! reconciles trophies. Editing does not touch recorded contributions.

use serde::Serialize;

use crate::error::EngineError;
use crate::models::workout::PROVISIONAL_ID_PREFIX;
use crate::models::{UserData, Workout, WorkoutDraft, WorkoutPatch};
use crate::services::challenge::{self, SyncReport};

/// Add a workout under a provisional id. Returns the stored record.
pub fn create(data: &mut UserData, draft: WorkoutDraft, now: &str) -> Workout {
    let workout = Workout {
        id: format!("{}{}", PROVISIONAL_ID_PREFIX, uuid::Uuid::new_v4()),
        date: draft.date,
        activity_type: draft.activity_type,
        metric: draft.metric,
        duration_minutes: draft.duration_minutes,
        details: draft.details,
        created_at: now.to_string(),
    };

    tracing::debug!(workout_id = %workout.id, "Logged provisional workout");
    data.workouts.insert(0, workout.clone());
    workout
}

/// Replace a provisional id with the id assigned by the store.
///
/// Returns the number of challenge contributions that were re-pointed.
pub fn confirm(
    data: &mut UserData,
    provisional_id: &str,
    persisted_id: &str,
) -> Result<usize, EngineError> {
    if provisional_id != persisted_id && data.workout(persisted_id).is_some() {
        return Err(EngineError::DuplicateWorkoutId(persisted_id.to_string()));
    }

    let workout = data
        .workouts
        .iter_mut()
        .find(|w| w.id == provisional_id)
        .ok_or_else(|| EngineError::UnknownWorkout(provisional_id.to_string()))?;
    workout.id = persisted_id.to_string();

    let renamed: usize = data
        .challenges
        .iter_mut()
        .map(|c| c.rename_workout(provisional_id, persisted_id))
        .sum();

    tracing::debug!(
        provisional_id,
        persisted_id,
        contributions = renamed,
        "Confirmed workout id"
    );
    Ok(renamed)
}

/// Edit a workout in place.
///
/// Contributions already credited from this workout keep their original
/// amounts.
pub fn update(
    data: &mut UserData,
    workout_id: &str,
    patch: WorkoutPatch,
) -> Result<Workout, EngineError> {
    let workout = data
        .workouts
        .iter_mut()
        .find(|w| w.id == workout_id)
        .ok_or_else(|| EngineError::UnknownWorkout(workout_id.to_string()))?;

    patch.apply_to(workout);
    tracing::info!(workout_id, "Updated workout");
    Ok(workout.clone())
}

/// Result of deleting a workout.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeleteOutcome {
    /// Number of challenge instances that lost contributions
    pub affected_challenges: usize,
    pub trophies: SyncReport,
}

/// Delete a workout and reverse everything it contributed.
///
/// Contributions left behind by a workout that is already gone are still
/// reversed; the call only fails when there was nothing to delete at all.
pub fn delete(
    data: &mut UserData,
    workout_id: &str,
    now: &str,
) -> Result<DeleteOutcome, EngineError> {
    let before = data.workouts.len();
    data.workouts.retain(|w| w.id != workout_id);
    let workout_removed = data.workouts.len() < before;

    let affected_challenges = data
        .challenges
        .iter_mut()
        .map(|c| c.reverse_contributions(workout_id))
        .filter(|removed| *removed > 0)
        .count();

    if !workout_removed && affected_challenges == 0 {
        return Err(EngineError::UnknownWorkout(workout_id.to_string()));
    }

    let trophies = if affected_challenges > 0 {
        challenge::sync_trophies(&data.challenges, &mut data.trophies, now)
    } else {
        SyncReport::default()
    };

    tracing::info!(
        workout_id,
        affected_challenges,
        trophies_removed = trophies.removed.len(),
        "Deleted workout"
    );

    Ok(DeleteOutcome {
        affected_challenges,
        trophies,
    })
}
