// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Garmin-Notion sync: mirror Garmin Connect activities into a Notion database
//!
//! This crate fetches activities from Garmin Connect, normalizes them into
//! display values, and creates or updates one Notion page per activity,
//! keyed by (date, activity type, activity name).

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod time_utils;
