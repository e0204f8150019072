// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Garmin-Notion sync job
//!
//! Runs one reconciliation pass from Garmin Connect into the configured
//! Notion database and exits. Scheduling is left to cron or similar.

use garmin_notion_sync::{
    config::Config,
    db::NotionDb,
    services::{GarminClient, Reconciler},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        database = %config.notion_database_id,
        limit = config.fetch_limit,
        lookup = ?config.lookup_mode,
        "Starting Garmin-Notion sync"
    );

    let garmin = GarminClient::new(config.garmin_email.clone(), config.garmin_password.clone())?;
    let notion = NotionDb::new(config.notion_token.clone(), config.notion_database_id.clone());

    let reconciler = Reconciler::new(garmin, notion, config.lookup_mode, config.fetch_limit);

    match reconciler.run().await {
        Ok(report) => {
            tracing::info!(
                fetched = report.fetched,
                created = report.created,
                updated = report.updated,
                unchanged = report.unchanged,
                skipped = report.skipped,
                "Sync complete"
            );
            Ok(())
        }
        Err(e) => {
            if e.is_rate_limited() {
                tracing::warn!("Rate limited; re-run later, completed activities will be skipped");
            }
            tracing::error!(error = %e, "Sync failed");
            Err(e.into())
        }
    }
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("garmin_notion_sync=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
