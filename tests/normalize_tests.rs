// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Normalization regression tests.
//!
//! Every derived value is compared for exact equality against what is
//! already stored, so any drift here turns into spurious updates on every
//! run.

use chrono::NaiveDate;
use garmin_notion_sync::time_utils::date_portion;
use garmin_notion_sync::services::normalize::{
    activity_fields, distance_km, duration_min, format_pace, format_training_message, normalize,
};

mod common;
use common::{activity, morning_run};

#[test]
fn test_pace_not_moving() {
    assert_eq!(format_pace(0.0), "");
    assert_eq!(format_pace(-1.2), "");
    assert_eq!(format_pace(f64::NAN), "");
}

#[test]
fn test_pace_truncates_components() {
    // 1000 / (2.5 * 60) = 6.666..; the fractional minute evaluates to 40.000000000000014 s
    assert_eq!(format_pace(2.5), "6:40 min/km");
    // 4.448 min/km: 26.88 s truncates to 26, not 27
    assert_eq!(format_pace(3.747), "4:26 min/km");
    // 166.67 min/km: minutes truncate to 166, not 167
    assert_eq!(format_pace(0.1), "166:39 min/km");
}

#[test]
fn test_pace_zero_pads_seconds() {
    assert_eq!(format_pace(5.0), "3:20 min/km");
    assert_eq!(format_pace(2.75), "6:03 min/km");
}

#[test]
fn test_training_message_prefix_precedence() {
    assert_eq!(format_training_message("HIGHLY_IMPACTING"), "Highly Impacting");
    assert_eq!(format_training_message("HIGHLY_IMPROVING_VO2_MAX_15"), "Highly Impacting");
    assert_eq!(format_training_message("IMPACTING_TEMPO_23"), "Impacting");
    assert_eq!(format_training_message("NO_ANAEROBIC_BENEFIT_1"), "No Benefit");
    assert_eq!(format_training_message("MINOR_AEROBIC_BENEFIT_0"), "Some Benefit");
    assert_eq!(format_training_message("OVERREACHING_LACTATE_THRESHOLD_45"), "Overreaching");
}

#[test]
fn test_training_message_passthrough() {
    assert_eq!(format_training_message("FOO_BAR"), "FOO_BAR");
    assert_eq!(format_training_message("Unknown"), "Unknown");
    // Prefix match is case sensitive and anchored at the start
    assert_eq!(format_training_message("no_benefit"), "no_benefit");
    assert_eq!(format_training_message("VERY_HIGHLY_X"), "VERY_HIGHLY_X");
}

#[test]
fn test_numeric_rounding() {
    assert_eq!(distance_km(10234.0), 10.23);
    assert_eq!(duration_min(2731.0), 45.52);
    assert_eq!(distance_km(0.0), 0.0);
    assert_eq!(duration_min(3600.0), 60.0);
}

#[test]
fn test_morning_run_fields() {
    let fields = activity_fields(&morning_run());

    assert_eq!(fields.distance_km, 10.23);
    assert_eq!(fields.duration_min, 45.52);
    assert_eq!(fields.calories, 310);
    assert_eq!(fields.avg_pace, "4:26 min/km");
    assert_eq!(fields.training_effect, "Tempo");
    assert_eq!(fields.aerobic, 3);
    assert_eq!(fields.aerobic_effect, "Improving");
    assert_eq!(fields.anaerobic, 1);
    assert_eq!(fields.anaerobic_effect, "No Benefit");
    assert!(!fields.pr);
}

#[test]
fn test_missing_fields_use_defaults() {
    let fields = activity_fields(&activity("2024-05-01 06:00:00", "yoga", "Stretch"));

    assert_eq!(fields.distance_km, 0.0);
    assert_eq!(fields.duration_min, 0.0);
    assert_eq!(fields.calories, 0);
    assert_eq!(fields.avg_pace, "");
    assert_eq!(fields.training_effect, "Unknown");
    assert_eq!(fields.aerobic, 1);
    assert_eq!(fields.aerobic_effect, "Unknown");
    assert_eq!(fields.anaerobic, 1);
    assert_eq!(fields.anaerobic_effect, "Unknown");
    assert!(!fields.pr);
}

#[test]
fn test_normalize_builds_key_start_and_icon() {
    let record = normalize(&morning_run()).expect("run has a start time");

    assert_eq!(record.key.date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
    assert_eq!(record.key.activity_type, "Running");
    assert_eq!(record.key.activity_name, "Morning Run");
    assert_eq!(record.start, "2024-05-01T10:30:00Z");
    assert!(record.icon.is_some());
}

#[test]
fn test_normalize_unknown_type_has_no_icon() {
    let mut unknown = activity("2024-05-02 18:00:00", "ENTERTAINMENT", "ENTERTAINMENT session");
    unknown.activity_type = None;
    let record = normalize(&unknown).unwrap();

    assert_eq!(record.key.activity_type, "Unknown");
    assert_eq!(record.key.activity_name, "Netflix session");
    assert!(record.icon.is_none());
}

#[test]
fn test_offset_start_keys_on_written_date() {
    let late = activity("2024-05-01T23:30:00-04:00", "running", "Evening Run");
    let record = normalize(&late).unwrap();

    // The stored Date must decode back to the same key date
    assert_eq!(record.key.date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
    assert_eq!(record.start, "2024-05-01T23:30:00-04:00");
    assert_eq!(date_portion(&record.start), Some(record.key.date));
}
