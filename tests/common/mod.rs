// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use chrono::NaiveDate;
use std::sync::Arc;
use summit_tracker::config::Config;
use summit_tracker::db::{FirestoreDb, UserLocks};
use summit_tracker::middleware::auth::create_jwt;
use summit_tracker::models::{ActivityType, PrimaryMetric, UserData, WorkoutDetails, WorkoutDraft};
use summit_tracker::routes::create_router;
use summit_tracker::AppState;

/// Fixed timestamp for deterministic engine tests.
#[allow(dead_code)]
pub const NOW: &str = "2024-06-01T12:00:00Z";

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Create a test app with an offline database.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState {
        config: Config::test_default(),
        db: test_db_offline(),
        user_locks: UserLocks::new(),
    });

    (create_router(state.clone()), state)
}

/// Create a test app backed by `db`.
#[allow(dead_code)]
pub fn create_test_app_with_db(db: FirestoreDb) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState {
        config: Config::test_default(),
        db,
        user_locks: UserLocks::new(),
    });

    (create_router(state.clone()), state)
}

/// Session token for `user_id`, signed with `signing_key`.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: &str, signing_key: &[u8]) -> String {
    create_jwt(user_id, signing_key).expect("Failed to sign test token")
}

/// Energy-based ride draft.
#[allow(dead_code)]
pub fn ride_kj(kj: f64) -> WorkoutDraft {
    WorkoutDraft {
        date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        activity_type: ActivityType::Bike,
        metric: PrimaryMetric::Energy { kj },
        duration_minutes: Some(45),
        details: WorkoutDetails::default(),
    }
}

/// Distance-based draft in miles.
#[allow(dead_code)]
pub fn outing_miles(activity_type: ActivityType, miles: f64) -> WorkoutDraft {
    WorkoutDraft {
        date: NaiveDate::from_ymd_opt(2024, 6, 2).unwrap(),
        activity_type,
        metric: PrimaryMetric::from_miles(miles),
        duration_minutes: None,
        details: WorkoutDetails::default(),
    }
}

/// Empty snapshot for a fresh user.
#[allow(dead_code)]
pub fn fresh_user() -> UserData {
    UserData::default()
}
