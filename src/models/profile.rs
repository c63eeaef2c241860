// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User profile and unit preferences.

use serde::{Deserialize, Serialize};

use crate::units;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    #[default]
    Kg,
    Lb,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    #[default]
    Km,
    Mi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

/// Profile document stored at `users/{uid}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Body weight in `weight_unit`
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub weight_unit: WeightUnit,
    #[serde(default)]
    pub distance_unit: DistanceUnit,
    #[serde(default)]
    pub age_years: Option<u32>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub height_cm: Option<f64>,
    /// Weekly climbing goal in meters
    #[serde(default)]
    pub weekly_goal: Option<f64>,
}

impl Profile {
    /// Body weight normalized to kilograms, if a positive weight is set.
    pub fn weight_kg(&self) -> Option<f64> {
        let weight = self.weight.filter(|w| w.is_finite() && *w > 0.0)?;
        Some(match self.weight_unit {
            WeightUnit::Kg => weight,
            WeightUnit::Lb => units::lb_to_kg(weight),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_kg_normalizes_pounds() {
        let profile = Profile {
            weight: Some(176.0),
            weight_unit: WeightUnit::Lb,
            ..Default::default()
        };
        let kg = profile.weight_kg().unwrap();
        assert!((kg - 79.832).abs() < 0.001);
    }

    #[test]
    fn test_weight_kg_ignores_non_positive() {
        let profile = Profile {
            weight: Some(0.0),
            ..Default::default()
        };
        assert_eq!(profile.weight_kg(), None);
        assert_eq!(Profile::default().weight_kg(), None);
    }

    #[test]
    fn test_empty_document_defaults() {
        let profile: Profile = serde_json::from_str("{}").unwrap();
        assert_eq!(profile.weight_unit, WeightUnit::Kg);
        assert_eq!(profile.distance_unit, DistanceUnit::Km);
    }
}
