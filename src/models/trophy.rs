// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Trophies and badges.

use serde::{Deserialize, Serialize};

use crate::models::challenge::{ChallengeInstance, ChallengeKind};

/// Permanent record of a completed challenge instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trophy {
    pub id: String,
    /// Instance that earned this trophy. Missing on legacy records.
    #[serde(default)]
    pub instance_id: Option<String>,
    /// Template of that instance. Missing on the oldest legacy records.
    #[serde(default)]
    pub template_id: Option<String>,
    pub title: String,
    pub kind: ChallengeKind,
    /// RFC 3339
    pub earned_at: String,
}

impl Trophy {
    pub fn for_instance(instance: &ChallengeInstance, earned_at: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            instance_id: Some(instance.instance_id.clone()),
            template_id: Some(instance.template_id.clone()),
            title: instance.title.clone(),
            kind: instance.kind,
            earned_at: earned_at.to_string(),
        }
    }
}

/// Lifetime elevation milestone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Badge {
    pub id: &'static str,
    /// Meters of cumulative climbing needed
    pub threshold: f64,
    pub name: &'static str,
}

/// Badge catalog, ascending by threshold.
pub const BADGES: [Badge; 6] = [
    Badge {
        id: "first-ride",
        threshold: 10.0,
        name: "First Ride",
    },
    Badge {
        id: "eiffel",
        threshold: 324.0,
        name: "Eiffel Tower",
    },
    Badge {
        id: "mont-blanc",
        threshold: 4807.0,
        name: "Mont Blanc",
    },
    Badge {
        id: "kilimanjaro",
        threshold: 5895.0,
        name: "Kilimanjaro",
    },
    Badge {
        id: "k2",
        threshold: 8611.0,
        name: "K2",
    },
    Badge {
        id: "everest",
        threshold: 8848.0,
        name: "Mt. Everest",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_badges_ascending() {
        assert!(BADGES.windows(2).all(|w| w[0].threshold < w[1].threshold));
    }

    #[test]
    fn test_legacy_trophy_deserializes() {
        let trophy: Trophy = serde_json::from_str(
            r#"{"id":"t1","title":"Eiffel Tower","kind":"climbing","earned_at":"2023-05-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert!(trophy.instance_id.is_none());
        assert!(trophy.template_id.is_none());
    }
}
