// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Challenge routes: templates, instances and contributions.

use crate::error::{EngineError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{ChallengeInstance, ChallengeKind, ChallengeTemplate, UserData};
use crate::routes::api::{
    bad_request, load_snapshot, persist_challenges, persist_trophies, write_outcome, Snapshot,
};
use crate::services::{challenge, ApplyOutcome};
use crate::time_utils::now_rfc3339;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/challenges/templates",
            get(list_templates).post(create_template),
        )
        .route(
            "/api/challenges",
            get(list_challenges).post(activate_challenge),
        )
        .route("/api/challenges/{instance_id}", delete(remove_challenge))
        .route(
            "/api/challenges/{instance_id}/contributions",
            post(add_contributions),
        )
}

// ─── Templates ───────────────────────────────────────────────

async fn list_templates(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<ChallengeTemplate>>> {
    let snapshot = load_snapshot(&state, &user.user_id).await?;
    Ok(Json(challenge::all_templates(&snapshot.data)))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTemplateRequest {
    #[validate(length(min = 1, max = 100))]
    pub title: String,
    pub kind: ChallengeKind,
    /// Meters for climbing, km for distance
    #[validate(range(exclusive_min = 0.0))]
    pub target: f64,
}

#[derive(Serialize)]
pub struct TemplateResponse {
    pub template: ChallengeTemplate,
    pub persisted: bool,
}

/// Define a custom challenge template.
async fn create_template(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<CreateTemplateRequest>,
) -> Result<(StatusCode, Json<TemplateResponse>)> {
    req.validate()?;
    if req.title.trim().is_empty() {
        return Err(bad_request("Title must not be blank"));
    }

    let Snapshot {
        mut data,
        persisted: repairs_stored,
        lock: _lock,
    } = load_snapshot(&state, &user.user_id).await?;
    let template = challenge::create_custom_template(&mut data, &req.title, req.kind, req.target)?;

    let stored = match template.kind {
        ChallengeKind::Climbing => &data.custom_climbing,
        ChallengeKind::Distance => &data.custom_distance,
    };
    let result = state
        .db
        .set_custom_templates(&user.user_id, template.kind, stored)
        .await;
    let persisted = write_outcome("custom templates", &user.user_id, result) && repairs_stored;

    Ok((
        StatusCode::CREATED,
        Json(TemplateResponse {
            template,
            persisted,
        }),
    ))
}

// ─── Instances ───────────────────────────────────────────────

/// Challenge instance with its derived completion state.
#[derive(Serialize)]
pub struct ChallengeView {
    #[serde(flatten)]
    pub instance: ChallengeInstance,
    pub complete: bool,
    pub completion_ratio: f64,
}

impl From<ChallengeInstance> for ChallengeView {
    fn from(instance: ChallengeInstance) -> Self {
        Self {
            complete: instance.is_complete(),
            completion_ratio: instance.completion_ratio(),
            instance,
        }
    }
}

async fn list_challenges(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<ChallengeView>>> {
    let snapshot = load_snapshot(&state, &user.user_id).await?;
    Ok(Json(
        snapshot
            .data
            .challenges
            .into_iter()
            .map(ChallengeView::from)
            .collect(),
    ))
}

#[derive(Debug, Deserialize, Validate)]
pub struct ActivateRequest {
    #[validate(length(min = 1, max = 100))]
    pub template_id: String,
}

#[derive(Serialize)]
pub struct ChallengeResponse {
    pub challenge: ChallengeView,
    pub persisted: bool,
}

/// Start a new instance of a template.
async fn activate_challenge(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<ActivateRequest>,
) -> Result<(StatusCode, Json<ChallengeResponse>)> {
    req.validate()?;

    let Snapshot {
        mut data,
        persisted: repairs_stored,
        lock: _lock,
    } = load_snapshot(&state, &user.user_id).await?;
    let instance = challenge::activate(&mut data, &req.template_id)?;
    let persisted = persist_challenges(&state, &user.user_id, &data).await && repairs_stored;

    Ok((
        StatusCode::CREATED,
        Json(ChallengeResponse {
            challenge: instance.into(),
            persisted,
        }),
    ))
}

/// Remove an instance. Any trophy it earned is kept.
async fn remove_challenge(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(instance_id): Path<String>,
) -> Result<Json<ChallengeResponse>> {
    let Snapshot {
        mut data,
        persisted: repairs_stored,
        lock: _lock,
    } = load_snapshot(&state, &user.user_id).await?;
    let removed = challenge::remove(&mut data, &instance_id)?;
    let persisted = persist_challenges(&state, &user.user_id, &data).await && repairs_stored;

    Ok(Json(ChallengeResponse {
        challenge: removed.into(),
        persisted,
    }))
}

// ─── Contributions ───────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct ContributionRequest {
    #[validate(length(min = 1, max = 100))]
    pub workout_ids: Vec<String>,
}

#[derive(Serialize)]
pub struct ContributionResponse {
    #[serde(flatten)]
    pub outcome: ApplyOutcome,
    pub challenge: ChallengeView,
    pub persisted: bool,
}

/// Credit selected workouts to an instance.
async fn add_contributions(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(instance_id): Path<String>,
    Json(req): Json<ContributionRequest>,
) -> Result<Json<ContributionResponse>> {
    req.validate()?;

    let Snapshot {
        mut data,
        persisted: repairs_stored,
        lock: _lock,
    } = load_snapshot(&state, &user.user_id).await?;
    let weight = data.rider_weight_kg(state.config.default_rider_weight_kg);
    let outcome = challenge::apply_workouts(
        &mut data,
        &instance_id,
        &req.workout_ids,
        weight,
        &now_rfc3339(),
    )?;

    let persisted =
        persist_contributions(&state, &user.user_id, &data, &outcome).await && repairs_stored;
    let instance = data
        .challenge(&instance_id)
        .cloned()
        .ok_or(EngineError::UnknownInstance(instance_id))?;

    Ok(Json(ContributionResponse {
        outcome,
        challenge: instance.into(),
        persisted,
    }))
}

async fn persist_contributions(
    state: &AppState,
    user_id: &str,
    data: &UserData,
    outcome: &ApplyOutcome,
) -> bool {
    let mut persisted = true;
    if !outcome.applied.is_empty() {
        persisted &= persist_challenges(state, user_id, data).await;
    }
    if !outcome.trophies.is_empty() {
        persisted &= persist_trophies(state, user_id, data).await;
    }
    persisted
}
