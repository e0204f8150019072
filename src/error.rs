// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types.

use crate::config::ConfigError;

/// Error type for a sync run.
///
/// Collaborator failures are not retried; they abort the run at the point of
/// failure and the whole pass is re-run later.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Garmin Connect authentication failed: {0}")]
    GarminAuth(String),

    #[error("Garmin Connect API error: {0}")]
    Garmin(String),

    #[error("Notion API error: {0}")]
    Notion(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Message used by both API clients when a request is throttled.
    pub const RATE_LIMITED: &'static str = "Rate limit exceeded (HTTP 429)";

    /// True if a collaborator rejected the request because of rate limiting.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            AppError::Garmin(msg) | AppError::Notion(msg) => msg == Self::RATE_LIMITED,
            _ => false,
        }
    }
}

/// Result type alias for sync operations.
pub type Result<T> = std::result::Result<T, AppError>;
