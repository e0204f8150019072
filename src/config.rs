//! Sync configuration loaded from environment variables.
//!
//! Credentials for both collaborators are read once at startup. A `.env` file
//! in the working directory is honored for local runs.

use std::env;
use std::str::FromStr;

/// Default number of activities requested from Garmin Connect in a single fetch.
pub const DEFAULT_FETCH_LIMIT: u32 = 1000;

/// How the reconciler finds the existing record for an activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LookupMode {
    /// Load every record once and index it by natural key.
    #[default]
    Prefetch,
    /// Query the store once per activity.
    PerActivity,
}

impl FromStr for LookupMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prefetch" => Ok(LookupMode::Prefetch),
            "per-activity" | "per_activity" => Ok(LookupMode::PerActivity),
            other => Err(ConfigError::Invalid("SYNC_LOOKUP", other.to_string())),
        }
    }
}

/// Sync configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Garmin Connect ---
    /// Account email used for SSO sign-in
    pub garmin_email: String,
    /// Account password
    pub garmin_password: String,

    // --- Notion ---
    /// Integration token
    pub notion_token: String,
    /// Database that receives one page per activity
    pub notion_database_id: String,

    // --- Sync behavior ---
    /// Number of activities requested from Garmin
    pub fetch_limit: u32,
    /// Existing-record lookup strategy
    pub lookup_mode: LookupMode,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let fetch_limit = match env::var("SYNC_FETCH_LIMIT") {
            Ok(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid("SYNC_FETCH_LIMIT", raw))?,
            Err(_) => DEFAULT_FETCH_LIMIT,
        };

        let lookup_mode = match env::var("SYNC_LOOKUP") {
            Ok(raw) => raw.parse()?,
            Err(_) => LookupMode::default(),
        };

        Ok(Self {
            garmin_email: required("GARMIN_EMAIL")?,
            garmin_password: required("GARMIN_PASSWORD")?,
            notion_token: required("NOTION_TOKEN")?,
            notion_database_id: required("NOTION_DB_ID")?,
            fetch_limit,
            lookup_mode,
        })
    }

    /// Config for tests only.
    pub fn test_default() -> Self {
        Self {
            garmin_email: "runner@example.com".to_string(),
            garmin_password: "test_password".to_string(),
            notion_token: "secret_test_token".to_string(),
            notion_database_id: "test-database".to_string(),
            fetch_limit: DEFAULT_FETCH_LIMIT,
            lookup_mode: LookupMode::default(),
        }
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .map(|v| v.trim().to_string())
        .map_err(|_| ConfigError::Missing(name))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
