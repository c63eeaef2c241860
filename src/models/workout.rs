// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout model for storage and API.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::units;

/// Prefix marking a workout id that has not been confirmed by the store yet.
pub const PROVISIONAL_ID_PREFIX: &str = "tmp-";

/// Kind of activity a workout records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActivityType {
    Bike,
    Run,
    Walk,
    Hike,
    Custom(String),
}

impl ActivityType {
    pub fn as_str(&self) -> &str {
        match self {
            ActivityType::Bike => "bike",
            ActivityType::Run => "run",
            ActivityType::Walk => "walk",
            ActivityType::Hike => "hike",
            ActivityType::Custom(name) => name,
        }
    }

    /// Whether distance for this type counts toward the running bucket.
    pub fn is_on_foot(&self) -> bool {
        matches!(
            self,
            ActivityType::Run | ActivityType::Walk | ActivityType::Hike
        )
    }
}

impl From<String> for ActivityType {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "bike" => ActivityType::Bike,
            "run" => ActivityType::Run,
            "walk" => ActivityType::Walk,
            "hike" => ActivityType::Hike,
            _ => ActivityType::Custom(value),
        }
    }
}

impl From<ActivityType> for String {
    fn from(value: ActivityType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The metric a workout is measured by.
///
/// Energy-based workouts feed climbing totals, distance-based workouts feed
/// distance totals. A workout is never both.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "metric_type", rename_all = "snake_case")]
pub enum PrimaryMetric {
    Energy { kj: f64 },
    Distance { km: f64 },
}

impl PrimaryMetric {
    pub fn from_miles(miles: f64) -> Self {
        PrimaryMetric::Distance {
            km: units::miles_to_km(miles),
        }
    }

    pub fn energy_kj(&self) -> Option<f64> {
        match self {
            PrimaryMetric::Energy { kj } => Some(*kj),
            PrimaryMetric::Distance { .. } => None,
        }
    }

    pub fn distance_km(&self) -> Option<f64> {
        match self {
            PrimaryMetric::Distance { km } => Some(*km),
            PrimaryMetric::Energy { .. } => None,
        }
    }
}

/// Stored workout record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    /// Document ID. Provisional ids start with [`PROVISIONAL_ID_PREFIX`].
    pub id: String,
    /// Calendar date of the workout
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    pub metric: PrimaryMetric,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub details: WorkoutDetails,
    /// When the record was created (RFC 3339)
    pub created_at: String,
}

impl Workout {
    pub fn is_provisional(&self) -> bool {
        self.id.starts_with(PROVISIONAL_ID_PREFIX)
    }
}

/// Optional descriptive fields carried along with a workout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkoutDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cadence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resistance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation_ft: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<u32>,
    /// Perceived effort, 1-10
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intensity: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Fields needed to log a new workout.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutDraft {
    pub date: NaiveDate,
    pub activity_type: ActivityType,
    pub metric: PrimaryMetric,
    pub duration_minutes: Option<u32>,
    pub details: WorkoutDetails,
}

/// Partial update to an existing workout. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkoutPatch {
    pub date: Option<NaiveDate>,
    pub activity_type: Option<ActivityType>,
    pub metric: Option<PrimaryMetric>,
    pub duration_minutes: Option<u32>,
    pub details: Option<WorkoutDetails>,
}

impl WorkoutPatch {
    pub fn apply_to(self, workout: &mut Workout) {
        if let Some(date) = self.date {
            workout.date = date;
        }
        if let Some(activity_type) = self.activity_type {
            workout.activity_type = activity_type;
        }
        if let Some(metric) = self.metric {
            workout.metric = metric;
        }
        if let Some(duration) = self.duration_minutes {
            workout.duration_minutes = Some(duration);
        }
        if let Some(details) = self.details {
            workout.details = details;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_type_parsing() {
        assert_eq!(ActivityType::from("Bike".to_string()), ActivityType::Bike);
        assert_eq!(ActivityType::from("hike".to_string()), ActivityType::Hike);
        assert_eq!(
            ActivityType::from("Rowing".to_string()),
            ActivityType::Custom("Rowing".to_string())
        );
        assert!(ActivityType::Walk.is_on_foot());
        assert!(!ActivityType::Bike.is_on_foot());
    }

    #[test]
    fn test_metric_serialization_is_tagged() {
        let json = serde_json::to_value(PrimaryMetric::Energy { kj: 400.0 }).unwrap();
        assert_eq!(json["metric_type"], "energy");
        assert_eq!(json["kj"], 400.0);

        let parsed: PrimaryMetric =
            serde_json::from_str(r#"{"metric_type":"distance","km":16.0}"#).unwrap();
        assert_eq!(parsed.distance_km(), Some(16.0));
        assert_eq!(parsed.energy_kj(), None);
    }

    #[test]
    fn test_workout_json_shape() {
        let workout = Workout {
            id: "abc".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            activity_type: ActivityType::Run,
            metric: PrimaryMetric::Distance { km: 8.0 },
            duration_minutes: Some(45),
            details: WorkoutDetails {
                heart_rate: Some(150),
                ..Default::default()
            },
            created_at: "2024-03-01T10:00:00Z".to_string(),
        };

        let json = serde_json::to_value(&workout).unwrap();
        assert_eq!(json["type"], "run");
        assert_eq!(json["date"], "2024-03-01");
        assert_eq!(json["details"]["heart_rate"], 150);
        assert!(json["details"].get("cadence").is_none());

        let back: Workout = serde_json::from_value(json).unwrap();
        assert_eq!(back, workout);
    }

    #[test]
    fn test_patch_leaves_unset_fields() {
        let mut workout = Workout {
            id: "abc".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            activity_type: ActivityType::Bike,
            metric: PrimaryMetric::Energy { kj: 300.0 },
            duration_minutes: Some(30),
            details: WorkoutDetails::default(),
            created_at: "2024-03-01T10:00:00Z".to_string(),
        };

        WorkoutPatch {
            metric: Some(PrimaryMetric::Energy { kj: 350.0 }),
            ..Default::default()
        }
        .apply_to(&mut workout);

        assert_eq!(workout.metric.energy_kj(), Some(350.0));
        assert_eq!(workout.duration_minutes, Some(30));
        assert_eq!(workout.activity_type, ActivityType::Bike);
    }
}
