// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer (Firestore).

pub mod firestore;
pub mod locks;

pub use firestore::FirestoreDb;
pub use locks::UserLocks;

/// Collection names as constants.
pub mod collections {
    /// Profile documents (keyed by user id)
    pub const USERS: &str = "users";
    /// `users/{uid}/workouts/{workout_id}`
    pub const WORKOUTS: &str = "workouts";
    /// `users/{uid}/app_data/{document}`
    pub const APP_DATA: &str = "app_data";
}

/// Document ids inside a user's `app_data` collection.
pub mod app_data {
    pub const ACTIVE_CHALLENGES: &str = "challenges_my";
    pub const CUSTOM_CLIMBING: &str = "challenges_climbing";
    pub const CUSTOM_DISTANCE: &str = "challenges_distance";
    pub const BADGES: &str = "badges";
    pub const TROPHIES: &str = "trophies";
}
