// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Energy to elevation conversion.
//!
//! Treats the workout's energy output as potential energy: `h = E / (m * g)`,
//! with the mass of rider plus bike.

use serde::Serialize;

use crate::units;

/// Mass of the bike added to every rider.
pub const BIKE_MASS_KG: f64 = 61.0;
pub const GRAVITY: f64 = 9.8;
/// Feet per meter used for display values.
pub const DISPLAY_FEET_PER_METER: f64 = 3.281;
pub const READY_TO_CLIMB: &str = "Ready to climb?";

const EVEREST_METERS: f64 = 8849.0;

/// Reference heights, ascending.
const LANDMARKS: [(&str, f64); 4] = [
    ("Eiffel Tower", 330.0),
    ("Empire State Building", 443.0),
    ("Burj Khalifa", 828.0),
    ("Mount Everest", EVEREST_METERS),
];

/// Height climbed for a given energy output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Elevation {
    pub meters: f64,
    pub feet: f64,
    pub landmark: String,
}

impl Elevation {
    fn zero() -> Self {
        Self {
            meters: 0.0,
            feet: 0.0,
            landmark: READY_TO_CLIMB.to_string(),
        }
    }
}

/// Convert an energy output (kJ) and rider mass (kg) into elevation gained.
///
/// Non-positive or non-finite inputs give the zero state.
pub fn elevation(energy_kj: f64, rider_mass_kg: f64) -> Elevation {
    if !(energy_kj.is_finite() && rider_mass_kg.is_finite())
        || energy_kj <= 0.0
        || rider_mass_kg <= 0.0
    {
        return Elevation::zero();
    }

    let meters = height_meters(energy_kj, rider_mass_kg);
    let feet = meters * DISPLAY_FEET_PER_METER;

    Elevation {
        meters: units::round_to(meters, 2),
        feet: units::round_to(feet, 2),
        landmark: landmark_comparison(meters),
    }
}

/// Unrounded height in meters.
fn height_meters(energy_kj: f64, rider_mass_kg: f64) -> f64 {
    let joules = energy_kj * 1000.0;
    let total_mass_kg = rider_mass_kg + BIKE_MASS_KG;
    joules / (total_mass_kg * GRAVITY)
}

/// Describe a height relative to well-known landmarks.
///
/// Numbers are rounded half up before formatting so the text does not
/// depend on the formatter's tie-breaking.
pub fn landmark_comparison(meters: f64) -> String {
    if meters < 100.0 {
        return format!("That's about {:.0} stories high!", (meters / 3.0).round());
    }

    for (name, height) in LANDMARKS {
        let ratio = meters / height;
        if ratio < 1.0 {
            return format!(
                "You are {:.1}% of the way up the {}!",
                units::round_to(ratio * 100.0, 1),
                name
            );
        }
        if ratio < 2.0 {
            return format!("You just climbed the {}!", name);
        }
    }

    format!(
        "You climbed the equivalent of Mount Everest {:.1} times!",
        units::round_to(meters / EVEREST_METERS, 1)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_ride() {
        let result = elevation(400.0, 80.0);
        assert!((result.meters - 289.47).abs() < 0.1);
        assert!((result.feet - 949.75).abs() < 0.5);
        assert_eq!(result.landmark, "You are 87.7% of the way up the Eiffel Tower!");
    }

    #[test]
    fn test_zero_state() {
        for (kj, kg) in [(0.0, 80.0), (400.0, 0.0), (-5.0, 80.0), (400.0, -1.0)] {
            let result = elevation(kj, kg);
            assert_eq!(result.meters, 0.0);
            assert_eq!(result.feet, 0.0);
            assert_eq!(result.landmark, READY_TO_CLIMB);
        }
        assert_eq!(elevation(f64::NAN, 80.0).landmark, READY_TO_CLIMB);
    }

    #[test]
    fn test_stories() {
        assert_eq!(landmark_comparison(30.0), "That's about 10 stories high!");
        assert_eq!(landmark_comparison(0.5), "That's about 0 stories high!");
    }

    #[test]
    fn test_halves_round_up() {
        assert_eq!(landmark_comparison(7.5), "That's about 3 stories high!");
        assert_eq!(landmark_comparison(31.5), "That's about 11 stories high!");
        // 19910.25 / 8849 is exactly 2.25
        assert_eq!(
            landmark_comparison(19910.25),
            "You climbed the equivalent of Mount Everest 2.3 times!"
        );
    }

    #[test]
    fn test_just_climbed() {
        assert_eq!(landmark_comparison(500.0), "You just climbed the Eiffel Tower!");
        // Past 2x Eiffel, under 2x Empire State
        assert_eq!(
            landmark_comparison(700.0),
            "You just climbed the Empire State Building!"
        );
        assert_eq!(landmark_comparison(1000.0), "You just climbed the Burj Khalifa!");
    }

    #[test]
    fn test_partial_everest() {
        assert_eq!(
            landmark_comparison(2000.0),
            "You are 22.6% of the way up the Mount Everest!"
        );
    }

    #[test]
    fn test_multiple_everests() {
        assert_eq!(
            landmark_comparison(20000.0),
            "You climbed the equivalent of Mount Everest 2.3 times!"
        );
    }

    #[test]
    fn test_monotonic_in_energy() {
        let mut previous = 0.0;
        for kj in (1..2000).map(|k| k as f64 * 5.0) {
            let meters = elevation(kj, 72.5).meters;
            assert!(meters >= previous, "{} kJ gave {} < {}", kj, meters, previous);
            previous = meters;
        }
    }

    #[test]
    fn test_feet_round_trip() {
        let result = elevation(750.0, 68.0);
        let back = units::feet_to_meters(units::meters_to_feet(result.meters));
        assert!((back - result.meters).abs() < 0.01);
    }
}
