// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Garmin Connect activity model as returned by the activity list endpoint.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::time_utils::parse_garmin_timestamp;

/// Raw activity from Garmin Connect.
///
/// Every field is optional and tolerant of malformed values: a field of the
/// wrong JSON type reads as absent. Use the accessor methods, which apply the
/// documented default for each field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GarminActivity {
    /// Garmin activity ID (informational only, not part of the natural key)
    #[serde(default, deserialize_with = "lenient::u64")]
    pub activity_id: Option<u64>,
    /// Start time in GMT (`2024-05-01 06:30:00`)
    #[serde(default, rename = "startTimeGMT", deserialize_with = "lenient::string")]
    pub start_time_gmt: Option<String>,
    /// Activity type block (only `typeKey` is used)
    #[serde(default, deserialize_with = "lenient::activity_type")]
    pub activity_type: Option<ActivityType>,
    /// User-visible activity name
    #[serde(default, deserialize_with = "lenient::string")]
    pub activity_name: Option<String>,
    /// Distance in meters
    #[serde(default, deserialize_with = "lenient::f64")]
    pub distance: Option<f64>,
    /// Duration in seconds
    #[serde(default, deserialize_with = "lenient::f64")]
    pub duration: Option<f64>,
    /// Energy in kilocalories
    #[serde(default, deserialize_with = "lenient::f64")]
    pub calories: Option<f64>,
    /// Average speed in meters/second
    #[serde(default, deserialize_with = "lenient::f64")]
    pub average_speed: Option<f64>,
    /// Primary benefit label (e.g. `AEROBIC_BASE`)
    #[serde(default, deserialize_with = "lenient::string")]
    pub training_effect_label: Option<String>,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub aerobic_training_effect: Option<f64>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub aerobic_training_effect_message: Option<String>,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub anaerobic_training_effect: Option<f64>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub anaerobic_training_effect_message: Option<String>,
    /// Personal record flag
    #[serde(default, deserialize_with = "lenient::bool")]
    pub pr: Option<bool>,
}

/// Activity type block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityType {
    #[serde(default, deserialize_with = "lenient::string")]
    pub type_key: Option<String>,
}

impl GarminActivity {
    pub const DEFAULT_TYPE_KEY: &'static str = "Unknown";
    pub const DEFAULT_NAME: &'static str = "Unnamed Activity";
    pub const DEFAULT_LABEL: &'static str = "Unknown";
    pub const DEFAULT_EFFECT_SCORE: f64 = 1.0;

    /// Parsed start time; `None` when missing or unparseable.
    pub fn start_time(&self) -> Option<DateTime<FixedOffset>> {
        self.start_time_gmt.as_deref().and_then(parse_garmin_timestamp)
    }

    /// Activity type code, default `Unknown`.
    pub fn type_key(&self) -> &str {
        self.activity_type
            .as_ref()
            .and_then(|t| t.type_key.as_deref())
            .unwrap_or(Self::DEFAULT_TYPE_KEY)
    }

    /// Activity name, default `Unnamed Activity`.
    pub fn name(&self) -> &str {
        self.activity_name.as_deref().unwrap_or(Self::DEFAULT_NAME)
    }

    /// Distance in meters, default 0.
    pub fn distance_meters(&self) -> f64 {
        self.distance.unwrap_or(0.0)
    }

    /// Duration in seconds, default 0.
    pub fn duration_seconds(&self) -> f64 {
        self.duration.unwrap_or(0.0)
    }

    /// Calories, default 0.
    pub fn calories(&self) -> f64 {
        self.calories.unwrap_or(0.0)
    }

    /// Average speed in m/s, default 0.
    pub fn average_speed(&self) -> f64 {
        self.average_speed.unwrap_or(0.0)
    }

    /// Training effect label, default `Unknown`.
    pub fn training_effect_label(&self) -> &str {
        self.training_effect_label
            .as_deref()
            .unwrap_or(Self::DEFAULT_LABEL)
    }

    /// Aerobic training effect score, default 1.0.
    pub fn aerobic_effect(&self) -> f64 {
        self.aerobic_training_effect
            .unwrap_or(Self::DEFAULT_EFFECT_SCORE)
    }

    /// Aerobic training effect message code, default `Unknown`.
    pub fn aerobic_message(&self) -> &str {
        self.aerobic_training_effect_message
            .as_deref()
            .unwrap_or(Self::DEFAULT_LABEL)
    }

    /// Anaerobic training effect score, default 1.0.
    pub fn anaerobic_effect(&self) -> f64 {
        self.anaerobic_training_effect
            .unwrap_or(Self::DEFAULT_EFFECT_SCORE)
    }

    /// Anaerobic training effect message code, default `Unknown`.
    pub fn anaerobic_message(&self) -> &str {
        self.anaerobic_training_effect_message
            .as_deref()
            .unwrap_or(Self::DEFAULT_LABEL)
    }

    /// Personal record flag, default false.
    pub fn is_pr(&self) -> bool {
        self.pr.unwrap_or(false)
    }
}

/// Deserializers that map malformed values to `None` instead of failing the
/// whole activity list.
mod lenient {
    use super::*;

    pub fn f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
            Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            _ => None,
        })
    }

    pub fn u64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
    }

    pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::String(s) => Some(s),
            _ => None,
        })
    }

    pub fn bool<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Bool(b) => Some(b),
            _ => None,
        })
    }

    pub fn activity_type<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<ActivityType>, D::Error> {
        let value = Value::deserialize(d)?;
        Ok(serde_json::from_value(value).ok())
    }
}
