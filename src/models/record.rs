// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Notion-side activity record: natural key, derived fields, stored pages.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one logical activity across sync runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NaturalKey {
    /// Date portion of the activity start time
    pub date: NaiveDate,
    /// Formatted activity type (e.g. "Treadmill Running")
    pub activity_type: String,
    /// Formatted activity name
    pub activity_name: String,
}

impl fmt::Display for NaturalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} - {}",
            self.date, self.activity_type, self.activity_name
        )
    }
}

/// Derived display/comparison fields of an activity page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityFields {
    pub distance_km: f64,
    pub duration_min: f64,
    pub calories: i64,
    pub avg_pace: String,
    pub training_effect: String,
    pub aerobic: i64,
    pub aerobic_effect: String,
    pub anaerobic: i64,
    pub anaerobic_effect: String,
    pub pr: bool,
}

impl ActivityFields {
    /// Names of the fields whose stored value differs from `self`.
    ///
    /// A field missing from the stored page always counts as changed.
    pub fn changed_fields(&self, stored: &StoredFields) -> Vec<&'static str> {
        let checks = [
            ("distance_km", stored.distance_km == Some(self.distance_km)),
            ("duration_min", stored.duration_min == Some(self.duration_min)),
            ("calories", stored.calories == Some(self.calories as f64)),
            ("avg_pace", stored.avg_pace.as_deref() == Some(self.avg_pace.as_str())),
            (
                "training_effect",
                stored.training_effect.as_deref() == Some(self.training_effect.as_str()),
            ),
            ("aerobic", stored.aerobic == Some(self.aerobic as f64)),
            (
                "aerobic_effect",
                stored.aerobic_effect.as_deref() == Some(self.aerobic_effect.as_str()),
            ),
            ("anaerobic", stored.anaerobic == Some(self.anaerobic as f64)),
            (
                "anaerobic_effect",
                stored.anaerobic_effect.as_deref() == Some(self.anaerobic_effect.as_str()),
            ),
            ("pr", stored.pr == Some(self.pr)),
        ];

        checks
            .into_iter()
            .filter(|(_, equal)| !equal)
            .map(|(name, _)| name)
            .collect()
    }
}

/// Field values as read back from a stored page.
///
/// Numbers come back from Notion as JSON numbers (or null), so they are
/// kept as `f64` and compared against the derived value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredFields {
    pub distance_km: Option<f64>,
    pub duration_min: Option<f64>,
    pub calories: Option<f64>,
    pub avg_pace: Option<String>,
    pub training_effect: Option<String>,
    pub aerobic: Option<f64>,
    pub aerobic_effect: Option<String>,
    pub anaerobic: Option<f64>,
    pub anaerobic_effect: Option<String>,
    pub pr: Option<bool>,
}

impl From<&ActivityFields> for StoredFields {
    fn from(fields: &ActivityFields) -> Self {
        Self {
            distance_km: Some(fields.distance_km),
            duration_min: Some(fields.duration_min),
            calories: Some(fields.calories as f64),
            avg_pace: Some(fields.avg_pace.clone()),
            training_effect: Some(fields.training_effect.clone()),
            aerobic: Some(fields.aerobic as f64),
            aerobic_effect: Some(fields.aerobic_effect.clone()),
            anaerobic: Some(fields.anaerobic as f64),
            anaerobic_effect: Some(fields.anaerobic_effect.clone()),
            pr: Some(fields.pr),
        }
    }
}

/// A fully normalized activity, ready to be written as a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub key: NaturalKey,
    /// Full start timestamp (RFC3339) stored in the `Date` property
    pub start: String,
    pub fields: ActivityFields,
    /// External icon URL for the activity type, when known
    pub icon: Option<String>,
}

/// A page that already exists in the activity database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredActivity {
    /// Notion page ID
    pub id: String,
    /// `None` when the page is missing its date, type, or name
    pub key: Option<NaturalKey>,
    pub fields: StoredFields,
}
