// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout log routes.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{
    ActivityType, Badge, PrimaryMetric, Workout, WorkoutDetails, WorkoutDraft, WorkoutPatch,
};
use crate::routes::api::{
    bad_request, load_snapshot, persist_challenges, persist_trophies, refresh_badges,
    write_outcome, Snapshot,
};
use crate::services::{ledger, physics, DeleteOutcome, Elevation};
use crate::time_utils::now_rfc3339;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Extension, Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/workouts", get(list_workouts).post(create_workout))
        .route(
            "/api/workouts/{id}",
            put(update_workout).delete(delete_workout),
        )
}

// ─── Request Bodies ──────────────────────────────────────────

/// Primary metric as submitted. Exactly one field may be set.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct MetricFields {
    #[validate(range(min = 0.0))]
    pub kj: Option<f64>,
    #[validate(range(min = 0.0))]
    pub km: Option<f64>,
    #[validate(range(min = 0.0))]
    pub miles: Option<f64>,
}

impl MetricFields {
    /// The submitted metric, or `None` if no metric field was given.
    pub fn metric(&self) -> Result<Option<PrimaryMetric>> {
        match (self.kj, self.km, self.miles) {
            (None, None, None) => Ok(None),
            (Some(kj), None, None) => Ok(Some(PrimaryMetric::Energy { kj })),
            (None, Some(km), None) => Ok(Some(PrimaryMetric::Distance { km })),
            (None, None, Some(miles)) => Ok(Some(PrimaryMetric::from_miles(miles))),
            _ => Err(bad_request(
                "A workout is energy-based or distance-based: give only one of kj, km, miles",
            )),
        }
    }
}

/// Optional descriptive fields. Absent fields leave stored values alone.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct DetailFields {
    #[validate(range(min = 0.0))]
    pub cadence: Option<f64>,
    #[validate(range(min = 0.0))]
    pub speed: Option<f64>,
    #[validate(range(min = 0.0))]
    pub resistance: Option<f64>,
    #[validate(range(min = 0.0))]
    pub elevation_ft: Option<f64>,
    #[validate(length(max = 20))]
    pub pace: Option<String>,
    #[validate(range(min = 1, max = 250))]
    pub heart_rate: Option<u32>,
    #[validate(range(min = 1, max = 10))]
    pub intensity: Option<u8>,
    pub calories: Option<u32>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

impl DetailFields {
    pub fn merge_into(self, details: &mut WorkoutDetails) {
        if self.cadence.is_some() {
            details.cadence = self.cadence;
        }
        if self.speed.is_some() {
            details.speed = self.speed;
        }
        if self.resistance.is_some() {
            details.resistance = self.resistance;
        }
        if self.elevation_ft.is_some() {
            details.elevation_ft = self.elevation_ft;
        }
        if self.pace.is_some() {
            details.pace = self.pace;
        }
        if self.heart_rate.is_some() {
            details.heart_rate = self.heart_rate;
        }
        if self.intensity.is_some() {
            details.intensity = self.intensity;
        }
        if self.calories.is_some() {
            details.calories = self.calories;
        }
        if self.notes.is_some() {
            details.notes = self.notes;
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateWorkoutRequest {
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    #[serde(flatten)]
    #[validate(nested)]
    pub metric: MetricFields,
    pub duration_minutes: Option<u32>,
    #[serde(flatten)]
    #[validate(nested)]
    pub details: DetailFields,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateWorkoutRequest {
    pub date: Option<NaiveDate>,
    #[serde(rename = "type")]
    pub activity_type: Option<ActivityType>,
    #[serde(flatten)]
    #[validate(nested)]
    pub metric: MetricFields,
    pub duration_minutes: Option<u32>,
    #[serde(flatten)]
    #[validate(nested)]
    pub details: DetailFields,
}

// ─── Responses ───────────────────────────────────────────────

#[derive(Serialize)]
pub struct WorkoutView {
    #[serde(flatten)]
    pub workout: Workout,
    /// Meters climbed, for energy-based workouts
    pub elevation: Option<Elevation>,
}

impl WorkoutView {
    fn new(workout: Workout, rider_weight_kg: f64) -> Self {
        let elevation = workout
            .metric
            .energy_kj()
            .map(|kj| physics::elevation(kj, rider_weight_kg));
        Self { workout, elevation }
    }
}

#[derive(Serialize)]
pub struct WorkoutResponse {
    #[serde(flatten)]
    pub view: WorkoutView,
    pub badges_unlocked: Vec<Badge>,
    pub persisted: bool,
}

#[derive(Serialize)]
pub struct DeleteWorkoutResponse {
    #[serde(flatten)]
    pub outcome: DeleteOutcome,
    pub persisted: bool,
}

// ─── Handlers ────────────────────────────────────────────────

/// List the workout history, newest first.
async fn list_workouts(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<WorkoutView>>> {
    let Snapshot { data, lock: _lock, .. } = load_snapshot(&state, &user.user_id).await?;
    let weight = data.rider_weight_kg(state.config.default_rider_weight_kg);

    tracing::debug!(user_id = %user.user_id, count = data.workouts.len(), "Listing workouts");
    Ok(Json(
        data.workouts
            .into_iter()
            .map(|w| WorkoutView::new(w, weight))
            .collect(),
    ))
}

/// Log a workout.
///
/// The record is kept under a provisional id until the store assigns the
/// permanent one. If the write fails the provisional `tmp-` record is
/// returned with `persisted: false`. That record is not stored anywhere, so
/// its id cannot be used for a later update or delete (both return 404);
/// clients should log the workout again.
async fn create_workout(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<CreateWorkoutRequest>,
) -> Result<(StatusCode, Json<WorkoutResponse>)> {
    req.validate()?;
    let metric = req
        .metric
        .metric()?
        .ok_or_else(|| bad_request("One of kj, km or miles is required"))?;

    let Snapshot {
        mut data,
        persisted: repairs_stored,
        lock: _lock,
    } = load_snapshot(&state, &user.user_id).await?;

    let mut details = WorkoutDetails::default();
    req.details.merge_into(&mut details);
    let draft = WorkoutDraft {
        date: req.date,
        activity_type: req.activity_type,
        metric,
        duration_minutes: req.duration_minutes,
        details,
    };

    let provisional = ledger::create(&mut data, draft, &now_rfc3339());
    let (workout_id, stored) = match state.db.add_workout(&user.user_id, &provisional).await {
        Ok(persisted_id) => {
            ledger::confirm(&mut data, &provisional.id, &persisted_id)?;
            (persisted_id, true)
        }
        Err(err) => {
            tracing::warn!(
                user_id = %user.user_id,
                workout_id = %provisional.id,
                error = %err,
                "Workout kept under provisional id"
            );
            (provisional.id.clone(), false)
        }
    };

    let (badges_unlocked, badges_stored) =
        refresh_badges(&state, &user.user_id, &mut data).await;

    let workout = data
        .workout(&workout_id)
        .cloned()
        .unwrap_or(provisional);
    let weight = data.rider_weight_kg(state.config.default_rider_weight_kg);

    tracing::info!(
        user_id = %user.user_id,
        workout_id = %workout.id,
        activity = %workout.activity_type,
        badges_unlocked = badges_unlocked.len(),
        "Logged workout"
    );

    Ok((
        StatusCode::CREATED,
        Json(WorkoutResponse {
            view: WorkoutView::new(workout, weight),
            badges_unlocked,
            persisted: stored && badges_stored && repairs_stored,
        }),
    ))
}

/// Edit a workout. Challenge contributions keep their recorded amounts.
async fn update_workout(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(workout_id): Path<String>,
    Json(req): Json<UpdateWorkoutRequest>,
) -> Result<Json<WorkoutResponse>> {
    req.validate()?;
    let metric = req.metric.metric()?;

    let Snapshot {
        mut data,
        persisted: repairs_stored,
        lock: _lock,
    } = load_snapshot(&state, &user.user_id).await?;

    let mut details = data
        .workout(&workout_id)
        .map(|w| w.details.clone())
        .unwrap_or_default();
    req.details.merge_into(&mut details);

    let patch = WorkoutPatch {
        date: req.date,
        activity_type: req.activity_type,
        metric,
        duration_minutes: req.duration_minutes,
        details: Some(details),
    };
    let workout = ledger::update(&mut data, &workout_id, patch)?;

    let result = state.db.set_workout(&user.user_id, &workout).await;
    let stored = write_outcome("workout", &user.user_id, result);

    let (badges_unlocked, badges_stored) =
        refresh_badges(&state, &user.user_id, &mut data).await;
    let weight = data.rider_weight_kg(state.config.default_rider_weight_kg);

    Ok(Json(WorkoutResponse {
        view: WorkoutView::new(workout, weight),
        badges_unlocked,
        persisted: stored && badges_stored && repairs_stored,
    }))
}

/// Delete a workout and reverse its challenge contributions.
async fn delete_workout(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(workout_id): Path<String>,
) -> Result<Json<DeleteWorkoutResponse>> {
    let Snapshot {
        mut data,
        persisted: repairs_stored,
        lock: _lock,
    } = load_snapshot(&state, &user.user_id).await?;

    let outcome = ledger::delete(&mut data, &workout_id, &now_rfc3339())?;

    let result = state.db.delete_workout(&user.user_id, &workout_id).await;
    let mut persisted = write_outcome("workout", &user.user_id, result) && repairs_stored;
    if outcome.affected_challenges > 0 {
        persisted &= persist_challenges(&state, &user.user_id, &data).await;
    }
    if !outcome.trophies.is_empty() {
        persisted &= persist_trophies(&state, &user.user_id, &data).await;
    }

    Ok(Json(DeleteWorkoutResponse { outcome, persisted }))
}
