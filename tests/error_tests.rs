// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{http::StatusCode, response::IntoResponse};
use summit_tracker::error::{AppError, EngineError};

#[test]
fn test_unknown_entities_map_to_not_found() {
    for err in [
        EngineError::UnknownWorkout("w".to_string()),
        EngineError::UnknownInstance("i".to_string()),
        EngineError::UnknownTemplate("t".to_string()),
    ] {
        let app_err = AppError::from(err);
        assert!(matches!(app_err, AppError::NotFound(_)));
        assert_eq!(app_err.into_response().status(), StatusCode::NOT_FOUND);
    }
}

#[test]
fn test_rule_violations_map_to_bad_request() {
    let err = AppError::from(EngineError::InvalidTarget(-1.0));
    assert!(matches!(&err, AppError::BadRequest(msg) if msg.contains("-1")));
    assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);

    let err = AppError::from(EngineError::DuplicateWorkoutId("abc".to_string()));
    assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
}

#[test]
fn test_database_errors_hide_details() {
    let response = AppError::Database("connection refused".to_string()).into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn test_auth_errors_are_unauthorized() {
    assert_eq!(
        AppError::Unauthorized.into_response().status(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        AppError::InvalidToken.into_response().status(),
        StatusCode::UNAUTHORIZED
    );
}
