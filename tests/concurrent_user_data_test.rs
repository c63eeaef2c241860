// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Concurrent requests against one user's data.
//!
//! Every mutating request rewrites whole list documents, so two requests
//! that interleave their load and write would lose one update. These tests
//! require the Firestore emulator (`FIRESTORE_EMULATOR_HOST` set).

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

mod common;
use common::{create_test_app_with_db, create_test_jwt, test_db};

const NUM_CONCURRENT_CONTRIBUTIONS: usize = 8;

async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    token: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token));
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

async fn log_ride(app: &Router, token: &str) -> String {
    let (status, json) = call(
        app,
        "POST",
        "/api/workouts",
        token,
        Some(json!({"date": "2024-06-01", "type": "bike", "kj": 400.0})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["persisted"], true);
    json["id"].as_str().unwrap().to_string()
}

async fn activate(app: &Router, token: &str, template_id: &str) -> String {
    let (status, json) = call(
        app,
        "POST",
        "/api/challenges",
        token,
        Some(json!({ "template_id": template_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    json["challenge"]["instance_id"].as_str().unwrap().to_string()
}

fn instance<'a>(challenges: &'a Value, instance_id: &str) -> &'a Value {
    challenges
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["instance_id"] == instance_id)
        .unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_contributions_and_delete_keep_every_update() {
    require_emulator!();

    let (app, state) = create_test_app_with_db(test_db().await);
    let user_id = format!("race-{}", uuid::Uuid::new_v4().simple());
    let token = create_test_jwt(&user_id, &state.config.jwt_signing_key);

    let mut rides = Vec::new();
    for _ in 0..NUM_CONCURRENT_CONTRIBUTIONS {
        rides.push(log_ride(&app, &token).await);
    }
    let doomed = log_ride(&app, &token).await;

    let everest = activate(&app, &token, "climb-everest").await;
    let burj = activate(&app, &token, "climb-burj-khalifa").await;
    let (status, _) = call(
        &app,
        "POST",
        &format!("/api/challenges/{burj}/contributions"),
        &token,
        Some(json!({ "workout_ids": [doomed] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // One request per ride against Everest, racing a delete that regresses
    // the Burj Khalifa instance
    let mut handles = vec![];
    for ride in rides.clone() {
        let app = app.clone();
        let token = token.clone();
        let uri = format!("/api/challenges/{everest}/contributions");
        handles.push(tokio::spawn(async move {
            call(&app, "POST", &uri, &token, Some(json!({ "workout_ids": [ride] }))).await
        }));
    }
    {
        let app = app.clone();
        let token = token.clone();
        let uri = format!("/api/workouts/{doomed}");
        handles.push(tokio::spawn(async move {
            call(&app, "DELETE", &uri, &token, None).await
        }));
    }

    for handle in handles {
        let (status, json) = handle.await.expect("Task join failed");
        assert_eq!(status, StatusCode::OK, "request failed: {json}");
        assert_eq!(json["persisted"], true);
    }

    let (status, challenges) = call(&app, "GET", "/api/challenges", &token, None).await;
    assert_eq!(status, StatusCode::OK);

    let everest = instance(&challenges, &everest);
    assert_eq!(
        everest["contributions"].as_array().unwrap().len(),
        NUM_CONCURRENT_CONTRIBUTIONS,
        "Contribution lost to a concurrent write"
    );
    let sum: f64 = everest["contributions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["amount"].as_f64().unwrap())
        .sum();
    assert!((everest["progress"].as_f64().unwrap() - sum).abs() < 1e-6);

    let burj = instance(&challenges, &burj);
    assert_eq!(burj["progress"].as_f64().unwrap(), 0.0);
    assert!(burj["contributions"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_progress_reports_persisted() {
    require_emulator!();

    let (app, state) = create_test_app_with_db(test_db().await);
    let user_id = format!("progress-{}", uuid::Uuid::new_v4().simple());
    let token = create_test_jwt(&user_id, &state.config.jwt_signing_key);

    log_ride(&app, &token).await;
    let (status, json) = call(&app, "GET", "/api/progress", &token, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["persisted"], true);
}

#[tokio::test]
async fn test_provisional_ids_are_not_addressable() {
    require_emulator!();

    let (app, state) = create_test_app_with_db(test_db().await);
    let user_id = format!("tmp-{}", uuid::Uuid::new_v4().simple());
    let token = create_test_jwt(&user_id, &state.config.jwt_signing_key);

    let (status, _) = call(&app, "DELETE", "/api/workouts/tmp-unsaved", &token, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(
        &app,
        "PUT",
        "/api/workouts/tmp-unsaved",
        &token,
        Some(json!({ "kj": 500.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
