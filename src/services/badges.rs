// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Lifetime elevation badges.

use std::collections::BTreeSet;

use crate::models::{Badge, UserData, BADGES};
use crate::services::progress;

/// Badges whose threshold is reached by `cumulative_meters` and that are not
/// in `unlocked` yet.
pub fn check_and_unlock(cumulative_meters: f64, unlocked: &BTreeSet<String>) -> Vec<Badge> {
    BADGES
        .iter()
        .filter(|badge| !unlocked.contains(badge.id))
        .filter(|badge| badge.threshold <= cumulative_meters)
        .copied()
        .collect()
}

/// Recompute lifetime climbing and record any newly earned badges.
///
/// Unlocks are permanent: nothing is ever removed from the unlocked set.
pub fn refresh(data: &mut UserData, rider_weight_kg: f64) -> Vec<Badge> {
    let totals = progress::totals(&data.workouts, rider_weight_kg);
    let newly_unlocked = check_and_unlock(totals.climbing_meters, &data.unlocked_badges);

    for badge in &newly_unlocked {
        data.unlocked_badges.insert(badge.id.to_string());
        tracing::info!(
            badge = badge.id,
            climbing_meters = totals.climbing_meters,
            "Badge unlocked"
        );
    }

    newly_unlocked
}
