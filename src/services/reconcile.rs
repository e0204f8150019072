// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity reconciliation.
//!
//! Handles the core workflow, one activity at a time in source order:
//! 1. Normalize the Garmin activity and compute its natural key
//! 2. Find the existing Notion page for that key
//! 3. Create the page if there is none
//! 4. Otherwise compare every derived field and update on any difference
//!
//! Store failures abort the run. Re-running is safe: an unchanged activity
//! produces no operation.

use crate::config::LookupMode;
use crate::db::{ActivityStore, RecordFilter};
use crate::error::Result;
use crate::models::{ActivityRecord, GarminActivity, NaturalKey, StoredActivity};
use crate::services::garmin::ActivitySource;
use crate::services::normalize::normalize;
use std::collections::HashMap;

/// What happened to one activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Created,
    Updated { changed: Vec<&'static str> },
    Unchanged,
    /// No usable start time, so no natural key
    Skipped,
}

/// Tally of a sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub fetched: usize,
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub skipped: usize,
}

impl SyncReport {
    fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Created => self.created += 1,
            Outcome::Updated { .. } => self.updated += 1,
            Outcome::Unchanged => self.unchanged += 1,
            Outcome::Skipped => self.skipped += 1,
        }
    }

    /// Number of create and update calls issued.
    pub fn writes(&self) -> usize {
        self.created + self.updated
    }
}

/// Existing pages, either looked up per activity or loaded once.
enum Lookup {
    PerActivity,
    Index(HashMap<NaturalKey, StoredActivity>),
}

/// Reconciles Garmin activities into the activity store.
pub struct Reconciler<S, D> {
    source: S,
    store: D,
    mode: LookupMode,
    fetch_limit: u32,
}

impl<S: ActivitySource, D: ActivityStore> Reconciler<S, D> {
    pub fn new(source: S, store: D, mode: LookupMode, fetch_limit: u32) -> Self {
        Self {
            source,
            store,
            mode,
            fetch_limit,
        }
    }

    pub fn store(&self) -> &D {
        &self.store
    }

    /// Run one full sync pass.
    pub async fn run(&self) -> Result<SyncReport> {
        let activities = self.source.fetch_activities(0, self.fetch_limit).await?;
        tracing::info!(count = activities.len(), mode = ?self.mode, "Reconciling activities");

        let mut lookup = match self.mode {
            LookupMode::PerActivity => Lookup::PerActivity,
            LookupMode::Prefetch => Lookup::Index(self.load_index().await?),
        };

        let mut report = SyncReport {
            fetched: activities.len(),
            ..SyncReport::default()
        };
        for activity in &activities {
            let outcome = self.reconcile(activity, &mut lookup).await?;
            report.record(&outcome);
        }

        Ok(report)
    }

    /// Load every stored page, keyed by natural key. The first page wins
    /// when several share a key.
    async fn load_index(&self) -> Result<HashMap<NaturalKey, StoredActivity>> {
        let records = self.store.query(&RecordFilter::All).await?;
        let total = records.len();

        let mut index: HashMap<NaturalKey, StoredActivity> = HashMap::with_capacity(total);
        for record in records {
            let Some(key) = record.key.clone() else {
                tracing::debug!(page_id = %record.id, "Ignoring page without a complete key");
                continue;
            };
            if let Some(first) = index.get(&key) {
                tracing::warn!(
                    key = %key,
                    kept = %first.id,
                    ignored = %record.id,
                    "Duplicate pages for natural key"
                );
                continue;
            }
            index.insert(key, record);
        }

        tracing::info!(pages = total, keys = index.len(), "Loaded existing activity pages");
        Ok(index)
    }

    async fn find_existing(
        &self,
        key: &NaturalKey,
        lookup: &Lookup,
    ) -> Result<Option<StoredActivity>> {
        match lookup {
            Lookup::Index(index) => Ok(index.get(key).cloned()),
            Lookup::PerActivity => {
                let matches = self.store.query(&RecordFilter::Key(key.clone())).await?;
                if matches.len() > 1 {
                    tracing::warn!(
                        key = %key,
                        count = matches.len(),
                        "Multiple pages match natural key, using the first"
                    );
                }
                Ok(matches.into_iter().next())
            }
        }
    }

    async fn reconcile(&self, activity: &GarminActivity, lookup: &mut Lookup) -> Result<Outcome> {
        let Some(record) = normalize(activity) else {
            tracing::warn!(
                activity_id = ?activity.activity_id,
                start = ?activity.start_time_gmt,
                "Skipping activity without a usable start time"
            );
            return Ok(Outcome::Skipped);
        };

        let outcome = match self.find_existing(&record.key, lookup).await? {
            None => {
                let created = self.store.create(&record).await?;
                remember(lookup, &record, created);
                Outcome::Created
            }
            Some(existing) => {
                let changed = record.fields.changed_fields(&existing.fields);
                if changed.is_empty() {
                    Outcome::Unchanged
                } else {
                    let updated = self.store.update(&existing.id, &record).await?;
                    remember(lookup, &record, updated);
                    Outcome::Updated { changed }
                }
            }
        };

        log_outcome(&record, &outcome);
        Ok(outcome)
    }
}

/// Keep the prefetch index current so later activities with the same key
/// see this run's writes.
fn remember(lookup: &mut Lookup, record: &ActivityRecord, mut stored: StoredActivity) {
    if let Lookup::Index(index) = lookup {
        stored.key = Some(record.key.clone());
        index.insert(record.key.clone(), stored);
    }
}

fn log_outcome(record: &ActivityRecord, outcome: &Outcome) {
    let activity_type = record.key.activity_type.as_str();
    let activity_name = record.key.activity_name.as_str();
    match outcome {
        Outcome::Created => {
            tracing::info!(activity_type, activity_name, date = %record.key.date, "Created activity");
        }
        Outcome::Updated { changed } => {
            tracing::info!(
                activity_type,
                activity_name,
                date = %record.key.date,
                changed = ?changed,
                "Updated activity"
            );
        }
        Outcome::Unchanged => {
            tracing::debug!(activity_type, activity_name, "Activity unchanged");
        }
        Outcome::Skipped => {}
    }
}
