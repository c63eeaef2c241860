// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Lifetime totals across a user's workout history.
//!
//! Always recomputed from the full list; a personal history is small enough
//! that no incremental cache is kept.

use serde::Serialize;

use crate::models::{ActivityType, PrimaryMetric, Workout};
use crate::services::physics;
use crate::units;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ProgressTotals {
    pub climbing_meters: f64,
    pub distance_km: f64,
    pub cycling_distance_km: f64,
    pub running_distance_km: f64,
}

impl ProgressTotals {
    pub fn climbing_feet(&self) -> f64 {
        units::meters_to_feet(self.climbing_meters)
    }

    pub fn distance_miles(&self) -> f64 {
        units::km_to_miles(self.distance_km)
    }

    fn add(&mut self, workout: &Workout, rider_weight_kg: f64) {
        match workout.metric {
            PrimaryMetric::Energy { kj } => {
                self.climbing_meters += physics::elevation(kj, rider_weight_kg).meters;
            }
            PrimaryMetric::Distance { km } => {
                if !km.is_finite() || km <= 0.0 {
                    return;
                }
                self.distance_km += km;
                match &workout.activity_type {
                    ActivityType::Bike => self.cycling_distance_km += km,
                    t if t.is_on_foot() => self.running_distance_km += km,
                    _ => {}
                }
            }
        }
    }
}

/// Fold every workout into lifetime totals.
pub fn totals(workouts: &[Workout], rider_weight_kg: f64) -> ProgressTotals {
    workouts
        .iter()
        .fold(ProgressTotals::default(), |mut acc, workout| {
            acc.add(workout, rider_weight_kg);
            acc
        })
}
