// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity normalization.
//!
//! Pure transforms from raw Garmin fields to the values stored in Notion.
//! None of these fail: unknown codes pass through and missing fields have
//! already been replaced by their defaults in [`GarminActivity`].

use crate::models::{ActivityFields, ActivityRecord, GarminActivity, NaturalKey};
use crate::time_utils::format_rfc3339;

/// Brand marker Garmin uses in names of streaming-service activities.
const ENTERTAINMENT_MARKER: &str = "ENTERTAINMENT";
const ENTERTAINMENT_BRAND: &str = "Netflix";

/// Training effect message prefixes. Checked in declaration order, first
/// match wins.
const TRAINING_MESSAGES: &[(&str, &str)] = &[
    ("NO_", "No Benefit"),
    ("MINOR_", "Some Benefit"),
    ("RECOVERY_", "Recovery"),
    ("MAINTAINING_", "Maintaining"),
    ("IMPROVING_", "Improving"),
    ("IMPACTING_", "Impacting"),
    ("HIGHLY_", "Highly Impacting"),
    ("OVERREACHING_", "Overreaching"),
];

/// Page icons by formatted activity type.
const ACTIVITY_ICONS: &[(&str, &str)] = &[
    ("Running", "https://img.icons8.com/?size=100&id=k1l1XFkME39t&format=png&color=000000"),
    ("Treadmill Running", "https://img.icons8.com/?size=100&id=9794&format=png&color=000000"),
    ("Cycling", "https://img.icons8.com/?size=100&id=47443&format=png&color=000000"),
    ("Indoor Cycling", "https://img.icons8.com/?size=100&id=47443&format=png&color=000000"),
    ("Swimming", "https://img.icons8.com/?size=100&id=9777&format=png&color=000000"),
    ("Strength Training", "https://img.icons8.com/?size=100&id=62779&format=png&color=000000"),
    ("Walking", "https://img.icons8.com/?size=100&id=9807&format=png&color=000000"),
    ("Yoga", "https://img.icons8.com/?size=100&id=9783&format=png&color=000000"),
    ("Hiking", "https://img.icons8.com/?size=100&id=9844&format=png&color=000000"),
    ("Rowing", "https://img.icons8.com/?size=100&id=24889&format=png&color=000000"),
];

/// `treadmill_running` -> `Treadmill Running`.
pub fn format_activity_type(type_key: &str) -> String {
    title_case(&type_key.replace('_', " "))
}

/// Replace the entertainment marker with the brand name.
pub fn format_activity_name(name: &str) -> String {
    name.replace(ENTERTAINMENT_MARKER, ENTERTAINMENT_BRAND)
}

/// Pace as `M:SS min/km`, or an empty string when not moving.
///
/// Minutes and seconds are truncated, not rounded.
pub fn format_pace(average_speed_mps: f64) -> String {
    if !(average_speed_mps.is_finite() && average_speed_mps > 0.0) {
        return String::new();
    }
    let pace_min_km = 1000.0 / (average_speed_mps * 60.0);
    let minutes = pace_min_km.trunc();
    let seconds = ((pace_min_km - minutes) * 60.0).trunc();
    format!("{}:{:02} min/km", minutes as i64, seconds as i64)
}

/// `AEROBIC_BASE` -> `Aerobic Base`.
pub fn format_training_effect(label: &str) -> String {
    title_case(&label.replace('_', " "))
}

/// Map a training effect message code to a short phrase.
pub fn format_training_message(message: &str) -> String {
    TRAINING_MESSAGES
        .iter()
        .find(|(prefix, _)| message.starts_with(prefix))
        .map(|(_, phrase)| phrase.to_string())
        .unwrap_or_else(|| message.to_string())
}

/// Icon URL for a formatted activity type.
pub fn activity_icon(activity_type: &str) -> Option<&'static str> {
    ACTIVITY_ICONS
        .iter()
        .find(|(name, _)| *name == activity_type)
        .map(|(_, url)| *url)
}

/// Round to two decimal places, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Meters -> kilometers, two decimals.
pub fn distance_km(distance_m: f64) -> f64 {
    round2(distance_m / 1000.0)
}

/// Seconds -> minutes, two decimals.
pub fn duration_min(duration_s: f64) -> f64 {
    round2(duration_s / 60.0)
}

/// Round a training effect score to the nearest integer.
pub fn effect_score(score: f64) -> i64 {
    score.round() as i64
}

/// Natural key for an activity, or `None` without a usable start time.
pub fn natural_key(activity: &GarminActivity) -> Option<NaturalKey> {
    let start = activity.start_time()?;
    Some(NaturalKey {
        date: start.date_naive(),
        activity_type: format_activity_type(activity.type_key()),
        activity_name: format_activity_name(activity.name()),
    })
}

/// Derived fields for an activity.
pub fn activity_fields(activity: &GarminActivity) -> ActivityFields {
    ActivityFields {
        distance_km: distance_km(activity.distance_meters()),
        duration_min: duration_min(activity.duration_seconds()),
        calories: activity.calories().round() as i64,
        avg_pace: format_pace(activity.average_speed()),
        training_effect: format_training_effect(activity.training_effect_label()),
        aerobic: effect_score(activity.aerobic_effect()),
        aerobic_effect: format_training_message(activity.aerobic_message()),
        anaerobic: effect_score(activity.anaerobic_effect()),
        anaerobic_effect: format_training_message(activity.anaerobic_message()),
        pr: activity.is_pr(),
    }
}

/// Normalize a Garmin activity into a page record.
///
/// Returns `None` only when the activity has no parseable start time.
pub fn normalize(activity: &GarminActivity) -> Option<ActivityRecord> {
    let start = activity.start_time()?;
    let key = natural_key(activity)?;
    let icon = activity_icon(&key.activity_type).map(str::to_string);

    Some(ActivityRecord {
        start: format_rfc3339(start),
        fields: activity_fields(activity),
        icon,
        key,
    })
}

/// Uppercase letters that follow a non-letter, lowercase the rest.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_is_letter = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }
    out
}
