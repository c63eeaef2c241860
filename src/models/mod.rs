// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod challenge;
pub mod profile;
pub mod trophy;
pub mod user_data;
pub mod workout;

pub use challenge::{ChallengeInstance, ChallengeKind, ChallengeTemplate, Contribution};
pub use profile::{DistanceUnit, Gender, Profile, WeightUnit};
pub use trophy::{Badge, Trophy, BADGES};
pub use user_data::UserData;
pub use workout::{ActivityType, PrimaryMetric, Workout, WorkoutDetails, WorkoutDraft, WorkoutPatch};
