// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users.
//!
//! Every mutating handler follows the same shape: load the user's snapshot
//! under the user's lock, apply the change in memory, then write back what
//! changed before the lock is released. Writes are best-effort; a failed
//! write is logged and reported as `persisted: false` while the computed
//! result is still returned.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Badge, DistanceUnit, Gender, Profile, Trophy, UserData, WeightUnit, BADGES};
use crate::routes::{challenges, workouts};
use crate::services::{
    badges, calories, challenge, physics, CalorieEstimate, Elevation, MissingField,
    ProgressTotals, WorkoutDescriptor,
};
use crate::time_utils::now_rfc3339;
use crate::units::round_to;
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::OwnedMutexGuard;
use validator::Validate;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/elevation", get(get_elevation))
        .route("/api/calories/estimate", post(estimate_calories))
        .route("/api/profile", get(get_profile).put(put_profile))
        .route("/api/progress", get(get_progress))
        .route("/api/trophies", get(get_trophies))
        .merge(workouts::routes())
        .merge(challenges::routes())
}

// ─── Snapshot Helpers ────────────────────────────────────────

/// A user's reconciled data, held under that user's lock.
///
/// Bind `lock` for as long as the handler reads or writes `data`; dropping
/// it lets the next request for the same user proceed.
pub(crate) struct Snapshot {
    pub(crate) data: UserData,
    /// Whether load-time repairs were written back (true when none were needed)
    pub(crate) persisted: bool,
    pub(crate) lock: OwnedMutexGuard<()>,
}

/// Lock a user's data, load it and bring it to a consistent state.
///
/// Progress that drifted from its contributions is recomputed and trophies
/// are reconciled; whatever changed is written back.
pub(crate) async fn load_snapshot(state: &AppState, user_id: &str) -> Result<Snapshot> {
    let lock = state.user_locks.lock(user_id).await;
    let mut data = state.db.load_user_data(user_id).await?;

    let repaired = challenge::verify_progress(&mut data.challenges);
    let report = challenge::sync_trophies(&data.challenges, &mut data.trophies, &now_rfc3339());

    let mut persisted = true;
    if repaired > 0 {
        persisted &= persist_challenges(state, user_id, &data).await;
    }
    if !report.is_empty() {
        tracing::info!(
            user_id,
            awarded = report.awarded.len(),
            removed = report.removed.len(),
            adopted = report.adopted.len(),
            "Reconciled trophies on load"
        );
        persisted &= persist_trophies(state, user_id, &data).await;
    }

    Ok(Snapshot {
        data,
        persisted,
        lock,
    })
}

/// Log a failed write. Returns whether the write went through.
pub(crate) fn write_outcome(what: &'static str, user_id: &str, result: Result<()>) -> bool {
    match result {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(user_id, what, error = %err, "Failed to persist user data");
            false
        }
    }
}

pub(crate) async fn persist_challenges(state: &AppState, user_id: &str, data: &UserData) -> bool {
    let result = state
        .db
        .set_active_challenges(user_id, &data.challenges)
        .await;
    write_outcome("challenges", user_id, result)
}

pub(crate) async fn persist_trophies(state: &AppState, user_id: &str, data: &UserData) -> bool {
    let result = state.db.set_trophies(user_id, &data.trophies).await;
    write_outcome("trophies", user_id, result)
}

pub(crate) async fn persist_badges(state: &AppState, user_id: &str, data: &UserData) -> bool {
    let unlocked: Vec<String> = data.unlocked_badges.iter().cloned().collect();
    let result = state.db.set_unlocked_badges(user_id, &unlocked).await;
    write_outcome("badges", user_id, result)
}

/// Re-check lifetime badges after the workout history changed.
///
/// Returns the new unlocks and whether they were stored.
pub(crate) async fn refresh_badges(
    state: &AppState,
    user_id: &str,
    data: &mut UserData,
) -> (Vec<Badge>, bool) {
    let weight = data.rider_weight_kg(state.config.default_rider_weight_kg);
    let unlocked = badges::refresh(data, weight);
    if unlocked.is_empty() {
        return (unlocked, true);
    }
    let persisted = persist_badges(state, user_id, data).await;
    (unlocked, persisted)
}

// ─── Elevation Preview ───────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ElevationQuery {
    kj: f64,
    /// Rider weight; the configured default is used when absent
    weight_kg: Option<f64>,
}

#[derive(Serialize)]
pub struct ElevationResponse {
    #[serde(flatten)]
    pub elevation: Elevation,
    pub rider_weight_kg: f64,
}

/// Convert an energy figure into meters climbed.
async fn get_elevation(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ElevationQuery>,
) -> Json<ElevationResponse> {
    let rider_weight_kg = params
        .weight_kg
        .unwrap_or(state.config.default_rider_weight_kg);

    Json(ElevationResponse {
        elevation: physics::elevation(params.kj, rider_weight_kg),
        rider_weight_kg,
    })
}

// ─── Calorie Estimation ──────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct CalorieRequest {
    /// Free-text description, e.g. "spin class"
    #[validate(length(min = 1, max = 200))]
    pub description: String,
    #[validate(range(min = 1, max = 10))]
    pub intensity: Option<u8>,
    pub duration_minutes: Option<u32>,
    #[validate(range(min = 1, max = 250))]
    pub heart_rate_bpm: Option<u32>,
}

#[derive(Serialize)]
pub struct CalorieResponse {
    /// Absent when prerequisites are missing
    pub estimate: Option<CalorieEstimate>,
    pub missing: Vec<MissingField>,
}

/// Estimate energy for a workout from the user's profile.
///
/// Missing profile or workout fields are reported instead of guessed.
async fn estimate_calories(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<CalorieRequest>,
) -> Result<Json<CalorieResponse>> {
    req.validate()?;

    let profile = state
        .db
        .get_profile(&user.user_id)
        .await?
        .unwrap_or_default();

    let workout = WorkoutDescriptor {
        description: req.description,
        intensity: req.intensity,
        duration_minutes: req.duration_minutes,
        heart_rate_bpm: req.heart_rate_bpm,
    };

    let missing = calories::missing_fields(&profile, &workout);
    if !missing.is_empty() {
        tracing::debug!(user_id = %user.user_id, ?missing, "Calorie estimate needs more data");
        return Ok(Json(CalorieResponse {
            estimate: None,
            missing,
        }));
    }

    Ok(Json(CalorieResponse {
        estimate: Some(calories::estimate(&profile, &workout)),
        missing,
    }))
}

// ─── Profile ─────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct ProfileRequest {
    #[validate(range(exclusive_min = 0.0, max = 1000.0))]
    pub weight: Option<f64>,
    #[serde(default)]
    pub weight_unit: WeightUnit,
    #[serde(default)]
    pub distance_unit: DistanceUnit,
    #[validate(range(min = 1, max = 130))]
    pub age_years: Option<u32>,
    pub gender: Option<Gender>,
    #[validate(range(exclusive_min = 0.0, max = 300.0))]
    pub height_cm: Option<f64>,
    #[validate(range(min = 0.0))]
    pub weekly_goal: Option<f64>,
}

impl From<ProfileRequest> for Profile {
    fn from(req: ProfileRequest) -> Self {
        Self {
            weight: req.weight,
            weight_unit: req.weight_unit,
            distance_unit: req.distance_unit,
            age_years: req.age_years,
            gender: req.gender,
            height_cm: req.height_cm,
            weekly_goal: req.weekly_goal,
        }
    }
}

async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Profile>> {
    let profile = state
        .db
        .get_profile(&user.user_id)
        .await?
        .unwrap_or_default();
    Ok(Json(profile))
}

/// Replace the profile. Unlike workout writes this one must succeed.
async fn put_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<ProfileRequest>,
) -> Result<Json<Profile>> {
    req.validate()?;

    let profile = Profile::from(req);
    state.db.set_profile(&user.user_id, &profile).await?;

    tracing::info!(
        user_id = %user.user_id,
        has_weight = profile.weight_kg().is_some(),
        "Updated profile"
    );
    Ok(Json(profile))
}

// ─── Progress ────────────────────────────────────────────────

#[derive(Serialize)]
pub struct BadgeStatus {
    #[serde(flatten)]
    pub badge: Badge,
    pub unlocked: bool,
}

#[derive(Serialize)]
pub struct ProgressResponse {
    #[serde(flatten)]
    pub totals: ProgressTotals,
    pub climbing_feet: f64,
    pub distance_miles: f64,
    pub rider_weight_kg: f64,
    pub badges: Vec<BadgeStatus>,
    /// Badges unlocked by this request (history changed since last check)
    pub newly_unlocked: Vec<Badge>,
    /// False if a repair or badge unlock could not be stored
    pub persisted: bool,
}

/// Lifetime totals, recomputed from the full history on every request.
async fn get_progress(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ProgressResponse>> {
    let Snapshot {
        mut data,
        persisted: repairs_stored,
        lock: _lock,
    } = load_snapshot(&state, &user.user_id).await?;
    let rider_weight_kg = data.rider_weight_kg(state.config.default_rider_weight_kg);

    let (newly_unlocked, badges_stored) = refresh_badges(&state, &user.user_id, &mut data).await;
    let totals = crate::services::progress::totals(&data.workouts, rider_weight_kg);

    let badges = BADGES
        .iter()
        .map(|badge| BadgeStatus {
            badge: *badge,
            unlocked: data.unlocked_badges.contains(badge.id),
        })
        .collect();

    Ok(Json(ProgressResponse {
        climbing_feet: round_to(totals.climbing_feet(), 2),
        distance_miles: round_to(totals.distance_miles(), 2),
        totals,
        rider_weight_kg,
        badges,
        newly_unlocked,
        persisted: repairs_stored && badges_stored,
    }))
}

// ─── Trophies ────────────────────────────────────────────────

async fn get_trophies(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Trophy>>> {
    let snapshot = load_snapshot(&state, &user.user_id).await?;
    Ok(Json(snapshot.data.trophies))
}

/// Shorthand for request-shape errors raised inside handlers.
pub(crate) fn bad_request(msg: impl Into<String>) -> AppError {
    AppError::BadRequest(msg.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_request_validation() {
        let ok = ProfileRequest {
            weight: Some(165.0),
            weight_unit: WeightUnit::Lb,
            distance_unit: DistanceUnit::Mi,
            age_years: Some(40),
            gender: Some(Gender::Female),
            height_cm: Some(170.0),
            weekly_goal: Some(500.0),
        };
        assert!(ok.validate().is_ok());

        let bad = ProfileRequest {
            weight: Some(0.0),
            age_years: Some(0),
            ..ok
        };
        let errors = bad.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("weight"));
        assert!(fields.contains_key("age_years"));
    }

    #[test]
    fn test_calorie_request_rejects_intensity_out_of_range() {
        let req = CalorieRequest {
            description: "spin".to_string(),
            intensity: Some(11),
            duration_minutes: Some(30),
            heart_rate_bpm: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_write_outcome() {
        assert!(write_outcome("x", "u", Ok(())));
        assert!(!write_outcome(
            "x",
            "u",
            Err(AppError::Database("down".to_string()))
        ));
    }
}
