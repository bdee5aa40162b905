//! Interaction-cycle facade. The process keeps no long-lived in-memory
//! authority: every operation is one full load -> mutate -> save -> reload
//! cycle against the backing file, and the returned collection is always a
//! fresh read. Single active writer assumed; the last save wins.

use crate::calendar::{self, Week};
use crate::config::TrackerConfig;
use crate::errors::{AppError, AppResult};
use crate::models::{ActivityCollection, ActivityId, NewActivity};
use crate::store::Store;
use chrono::Utc;
use serde::Serialize;

/// Grid plus the collection it was projected from, for one rendered month.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthView {
    pub year: i32,
    pub month: u32,
    pub weeks: Vec<Week>,
    pub activities: ActivityCollection,
}

pub struct TrackerCore {
    store: Store,
    config: TrackerConfig,
}

impl TrackerCore {
    pub fn new(config: TrackerConfig) -> AppResult<Self> {
        let store = Store::new(&config.data_file)?;
        Ok(Self { store, config })
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Fresh read of the full collection for the table view.
    pub fn activities(&self) -> AppResult<ActivityCollection> {
        self.store.load()
    }

    /// Validates the draft against the configured KPI/PIC lists, appends it
    /// and persists. Returns the reloaded collection.
    pub fn add_activity(&self, draft: NewActivity) -> AppResult<ActivityCollection> {
        if !self.config.is_known_kpi(&draft.kpi) {
            return Err(AppError::Invalid(format!("Unknown KPI '{}'", draft.kpi)));
        }
        if !self.config.is_known_pic(&draft.pic) {
            return Err(AppError::Invalid(format!("Unknown PIC '{}'", draft.pic)));
        }

        let collection = self.store.load()?;
        let updated = collection.append(draft);
        self.store.save(&updated)?;
        tracing::info!(total = updated.len(), "activity added");
        self.store.load()
    }

    /// Marks one activity done and persists. A stale id fails with NotFound
    /// before any save is attempted, so the file is never corrupted by a
    /// handle from a previous cycle.
    pub fn complete_activity(&self, id: &ActivityId) -> AppResult<ActivityCollection> {
        let mut collection = self.store.load()?;
        collection.mark_done(id, Utc::now())?;
        self.store.save(&collection)?;
        tracing::info!(activity = %id, "activity marked done");
        self.store.load()
    }

    /// Everything the calendar page needs for one month in a single read.
    pub fn calendar_month(&self, year: i32, month: u32) -> AppResult<MonthView> {
        let activities = self.store.load()?;
        Ok(MonthView {
            year,
            month,
            weeks: calendar::month_grid(year, month),
            activities,
        })
    }
}
