//! Activity store layer (Notion).

pub mod notion;

pub use notion::NotionDb;

use crate::error::Result;
use crate::models::{ActivityRecord, NaturalKey, StoredActivity};
use async_trait::async_trait;

/// Notion database property names.
pub mod properties {
    pub const DATE: &str = "Date";
    pub const ACTIVITY_TYPE: &str = "Activity Type";
    pub const ACTIVITY_NAME: &str = "Activity Name";
    pub const DISTANCE_KM: &str = "Distance (km)";
    pub const DURATION_MIN: &str = "Duration (min)";
    pub const CALORIES: &str = "Calories";
    pub const AVG_PACE: &str = "Avg Pace";
    pub const TRAINING_EFFECT: &str = "Training Effect";
    pub const AEROBIC: &str = "Aerobic";
    pub const AEROBIC_EFFECT: &str = "Aerobic Effect";
    pub const ANAEROBIC: &str = "Anaerobic";
    pub const ANAEROBIC_EFFECT: &str = "Anaerobic Effect";
    pub const PR: &str = "PR";
}

/// Which records a store query returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordFilter {
    /// Every record in the database.
    All,
    /// Records matching date, type, and name exactly.
    Key(NaturalKey),
}

/// Destination of synchronized activities.
#[async_trait]
pub trait ActivityStore: Send + Sync {
    /// Records matching `filter`, in store order.
    async fn query(&self, filter: &RecordFilter) -> Result<Vec<StoredActivity>>;

    /// Create a record with the key, derived fields, and icon of `record`.
    async fn create(&self, record: &ActivityRecord) -> Result<StoredActivity>;

    /// Overwrite the derived fields (and icon, when known) of record `id`.
    async fn update(&self, id: &str, record: &ActivityRecord) -> Result<StoredActivity>;
}
