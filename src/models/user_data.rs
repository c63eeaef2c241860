// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory snapshot of everything one user owns.
//!
//! Loaded from the store, mutated by the services, then written back.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::models::{ChallengeInstance, ChallengeTemplate, Profile, Trophy, Workout};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserData {
    pub profile: Profile,
    /// Workouts, newest first
    pub workouts: Vec<Workout>,
    /// Active challenge instances
    pub challenges: Vec<ChallengeInstance>,
    pub custom_climbing: Vec<ChallengeTemplate>,
    pub custom_distance: Vec<ChallengeTemplate>,
    pub unlocked_badges: BTreeSet<String>,
    pub trophies: Vec<Trophy>,
}

impl UserData {
    pub fn workout(&self, workout_id: &str) -> Option<&Workout> {
        self.workouts.iter().find(|w| w.id == workout_id)
    }

    pub fn challenge(&self, instance_id: &str) -> Option<&ChallengeInstance> {
        self.challenges
            .iter()
            .find(|c| c.instance_id == instance_id)
    }

    /// Rider weight for physics, falling back to `default_kg` when unset.
    pub fn rider_weight_kg(&self, default_kg: f64) -> f64 {
        self.profile.weight_kg().unwrap_or(default_kg)
    }
}
