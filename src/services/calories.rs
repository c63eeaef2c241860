// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Calorie estimation for workouts logged without a power meter.
//!
//! Uses a MET lookup keyed on the workout description, scaled by perceived
//! intensity. When a heart rate is known, the Keytel et al. regression is
//! averaged in.

use serde::Serialize;

use crate::models::{Gender, Profile};
use crate::units::{self, KJ_PER_KCAL};

const DEFAULT_MET: f64 = 5.0;
const DEFAULT_ACTIVITY: &str = "General Workout";

/// Keyword table, checked in order. First category with a matching keyword wins.
const MET_TABLE: [(&[&str], f64, &str); 10] = [
    (&["run", "jog", "sprint", "marathon"], 8.0, "Running"),
    (&["bike", "cycle", "cycling", "spin"], 7.0, "Cycling"),
    (&["swim", "pool", "laps"], 6.0, "Swimming"),
    (&["walk", "stroll"], 3.5, "Walking"),
    (&["hike", "hiking", "climb"], 7.0, "Hiking"),
    (
        &["lift", "weight", "strength", "gym", "muscle"],
        5.0,
        "Strength Training",
    ),
    (&["hiit", "interval", "crossfit", "bootcamp"], 8.0, "HIIT"),
    (&["yoga", "pilates", "stretch"], 3.0, "Yoga / Flexibility"),
    (&["dance", "zumba"], 6.0, "Dance"),
    (&["row", "erg"], 7.0, "Rowing"),
];

/// Workout inputs used for estimation.
#[derive(Debug, Clone, Default)]
pub struct WorkoutDescriptor {
    pub description: String,
    /// Perceived intensity, 1-10
    pub intensity: Option<u8>,
    pub duration_minutes: Option<u32>,
    pub heart_rate_bpm: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalorieEstimate {
    pub calories: u32,
    pub kj: u32,
    pub met_used: f64,
    pub explanation: String,
}

impl CalorieEstimate {
    fn cannot_compute(reason: &str) -> Self {
        Self {
            calories: 0,
            kj: 0,
            met_used: 0.0,
            explanation: reason.to_string(),
        }
    }
}

/// Prerequisites that must be present before auto-estimating energy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingField {
    Age,
    Weight,
    Gender,
    Height,
    Duration,
    Intensity,
}

/// List every prerequisite missing from the profile or workout.
pub fn missing_fields(profile: &Profile, workout: &WorkoutDescriptor) -> Vec<MissingField> {
    let mut missing = Vec::new();
    if profile.age_years.filter(|a| *a > 0).is_none() {
        missing.push(MissingField::Age);
    }
    if profile.weight_kg().is_none() {
        missing.push(MissingField::Weight);
    }
    if profile.gender.is_none() {
        missing.push(MissingField::Gender);
    }
    if profile.height_cm.filter(|h| *h > 0.0).is_none() {
        missing.push(MissingField::Height);
    }
    if workout.duration_minutes.filter(|d| *d > 0).is_none() {
        missing.push(MissingField::Duration);
    }
    if workout.intensity.filter(|i| (1..=10).contains(i)).is_none() {
        missing.push(MissingField::Intensity);
    }
    missing
}

/// Look up the base MET and activity label for a free-text description.
pub fn base_met(description: &str) -> (f64, &'static str) {
    let lowered = description.to_lowercase();
    MET_TABLE
        .iter()
        .find(|(keywords, _, _)| keywords.iter().any(|k| lowered.contains(k)))
        .map(|(_, met, label)| (*met, *label))
        .unwrap_or((DEFAULT_MET, DEFAULT_ACTIVITY))
}

/// Intensity scaling: 5 is neutral, 10 is 1.4x, 1 is 0.68x.
pub fn intensity_multiplier(intensity: u8) -> f64 {
    0.6 + f64::from(intensity) * 0.08
}

/// Keytel heart-rate based estimate in kcal.
fn heart_rate_calories(gender: Gender, hr: f64, weight_kg: f64, age: f64, minutes: f64) -> f64 {
    let per_minute_kj = match gender {
        Gender::Female => -20.4022 + 0.4472 * hr - 0.1263 * weight_kg + 0.074 * age,
        Gender::Male => -55.0969 + 0.6309 * hr + 0.1988 * weight_kg + 0.2017 * age,
    };
    per_minute_kj * minutes / KJ_PER_KCAL
}

/// Estimate calories and energy for a workout.
///
/// Callers should run [`missing_fields`] first; absent optional values here
/// fall back to neutral defaults (intensity 5, no heart-rate blend).
pub fn estimate(profile: &Profile, workout: &WorkoutDescriptor) -> CalorieEstimate {
    let minutes = f64::from(workout.duration_minutes.unwrap_or(0));
    if minutes <= 0.0 {
        return CalorieEstimate::cannot_compute("Duration is 0");
    }

    let weight_kg = profile.weight_kg().unwrap_or(0.0);
    let intensity = workout.intensity.unwrap_or(5).clamp(1, 10);
    let (base, activity) = base_met(&workout.description);
    let adjusted_met = base * intensity_multiplier(intensity);

    let met_calories = adjusted_met * weight_kg * (minutes / 60.0);

    let hr_calories = match (workout.heart_rate_bpm, profile.gender) {
        (Some(hr), Some(gender)) if hr > 0 => {
            let age = f64::from(profile.age_years.unwrap_or(0));
            Some(heart_rate_calories(gender, f64::from(hr), weight_kg, age, minutes))
        }
        _ => None,
    }
    .filter(|c| *c > 0.0);

    let calories = match hr_calories {
        Some(hr) => (met_calories + hr) / 2.0,
        None => met_calories,
    }
    .max(0.0);

    let met_used = units::round_to(adjusted_met, 1);
    let mut explanation = format!(
        "Based on {} (MET {:.1}) at intensity {}/10",
        activity, met_used, intensity
    );
    if hr_calories.is_some() {
        explanation.push_str(", averaged with a heart-rate estimate");
    }

    tracing::debug!(
        activity,
        met = met_used,
        calories,
        heart_rate = hr_calories.is_some(),
        "Estimated workout calories"
    );

    CalorieEstimate {
        calories: calories.round() as u32,
        kj: (calories * KJ_PER_KCAL).round() as u32,
        met_used,
        explanation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WeightUnit;

    fn profile(gender: Gender) -> Profile {
        Profile {
            weight: Some(70.0),
            weight_unit: WeightUnit::Kg,
            age_years: Some(30),
            gender: Some(gender),
            height_cm: Some(175.0),
            ..Default::default()
        }
    }

    fn workout(description: &str, intensity: u8, minutes: u32) -> WorkoutDescriptor {
        WorkoutDescriptor {
            description: description.to_string(),
            intensity: Some(intensity),
            duration_minutes: Some(minutes),
            heart_rate_bpm: None,
        }
    }

    #[test]
    fn test_zero_duration() {
        let result = estimate(&profile(Gender::Male), &workout("run", 5, 0));
        assert_eq!(result.calories, 0);
        assert_eq!(result.kj, 0);
        assert_eq!(result.explanation, "Duration is 0");
    }

    #[test]
    fn test_keyword_order() {
        assert_eq!(base_met("Morning JOG"), (8.0, "Running"));
        assert_eq!(base_met("spin class"), (7.0, "Cycling"));
        // "run" is checked before "hike"
        assert_eq!(base_met("trail run and hike"), (8.0, "Running"));
        assert_eq!(base_met("rowing erg"), (7.0, "Rowing"));
        assert_eq!(base_met("something else"), (5.0, "General Workout"));
    }

    #[test]
    fn test_intensity_multiplier() {
        assert!((intensity_multiplier(5) - 1.0).abs() < 1e-9);
        assert!((intensity_multiplier(10) - 1.4).abs() < 1e-9);
        assert!((intensity_multiplier(1) - 0.68).abs() < 1e-9);
    }

    #[test]
    fn test_met_only_estimate() {
        // 7 MET * 70 kg * 1 h = 490 kcal
        let result = estimate(&profile(Gender::Male), &workout("cycling", 5, 60));
        assert_eq!(result.calories, 490);
        assert_eq!(result.kj, 2050);
        assert_eq!(result.met_used, 7.0);
        assert_eq!(
            result.explanation,
            "Based on Cycling (MET 7.0) at intensity 5/10"
        );
    }

    #[test]
    fn test_heart_rate_blend() {
        let mut w = workout("run", 5, 30);
        w.heart_rate_bpm = Some(150);

        let result = estimate(&profile(Gender::Male), &w);

        // MET: 8 * 70 * 0.5 = 280
        // HR: (-55.0969 + 94.635 + 13.916 + 6.051) * 30 / 4.184 = 426.67
        let expected = (280.0 + 426.665) / 2.0;
        assert!((f64::from(result.calories) - expected).abs() <= 1.0);
        assert!(result.explanation.contains("heart-rate"));
    }

    #[test]
    fn test_negative_heart_rate_estimate_is_ignored() {
        let mut w = workout("yoga", 5, 30);
        w.heart_rate_bpm = Some(20);

        let result = estimate(&profile(Gender::Female), &w);

        // 3 * 70 * 0.5 = 105
        assert_eq!(result.calories, 105);
        assert!(!result.explanation.contains("heart-rate"));
    }

    #[test]
    fn test_missing_fields() {
        let missing = missing_fields(&Profile::default(), &WorkoutDescriptor::default());
        assert_eq!(
            missing,
            vec![
                MissingField::Age,
                MissingField::Weight,
                MissingField::Gender,
                MissingField::Height,
                MissingField::Duration,
                MissingField::Intensity,
            ]
        );

        let complete = missing_fields(&profile(Gender::Female), &workout("walk", 4, 20));
        assert!(complete.is_empty());
    }
}
