// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod garmin;
pub mod normalize;
pub mod reconcile;

pub use garmin::{ActivitySource, GarminClient};
pub use reconcile::{Outcome, Reconciler, SyncReport};
