// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Summit Tracker: turn workout energy into vertical meters climbed.
//!
//! This crate provides the backend API that converts workouts into simulated
//! elevation, aggregates lifetime progress, and tracks climbing and distance
//! challenges with their badges and trophies.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;
pub mod units;

use config::Config;
use db::{FirestoreDb, UserLocks};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    /// Serializes each user's mutating requests
    pub user_locks: UserLocks,
}
