// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.
//!
//! Everything here works on an in-memory [`UserData`](crate::models::UserData)
//! snapshot and never touches the store.

pub mod badges;
pub mod calories;
pub mod challenge;
pub mod ledger;
pub mod physics;
pub mod progress;

pub use calories::{CalorieEstimate, MissingField, WorkoutDescriptor};
pub use challenge::{ApplyOutcome, SyncReport};
pub use ledger::DeleteOutcome;
pub use physics::Elevation;
pub use progress::ProgressTotals;
