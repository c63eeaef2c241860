// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Unit conversions used at the API boundary.
//!
//! Internally everything is kilojoules, kilograms, kilometers and meters.

pub const KG_PER_LB: f64 = 0.453592;
pub const KM_PER_MILE: f64 = 1.60934;
pub const METERS_PER_FOOT: f64 = 0.3048;
pub const FEET_PER_METER: f64 = 3.28084;
/// Kilojoules per kilocalorie.
pub const KJ_PER_KCAL: f64 = 4.184;

pub fn lb_to_kg(lb: f64) -> f64 {
    lb * KG_PER_LB
}

pub fn miles_to_km(miles: f64) -> f64 {
    miles * KM_PER_MILE
}

pub fn km_to_miles(km: f64) -> f64 {
    km / KM_PER_MILE
}

pub fn feet_to_meters(feet: f64) -> f64 {
    feet * METERS_PER_FOOT
}

pub fn meters_to_feet(meters: f64) -> f64 {
    meters * FEET_PER_METER
}

/// Round to a fixed number of decimal places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
