use crate::errors::{AppError, AppResult};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Lifecycle of an activity: `Open` at creation, `Done` is terminal.
/// The only legal transition is Open -> Done; completing an already-Done
/// activity is idempotent on status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Open,
    Done,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::Done => "Done",
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        match text.trim() {
            value if value.eq_ignore_ascii_case("open") => Some(Self::Open),
            value if value.eq_ignore_ascii_case("done") => Some(Self::Done),
            _ => None,
        }
    }

    pub fn is_done(self) -> bool {
        matches!(self, Self::Done)
    }

    pub fn complete(self) -> Self {
        Self::Done
    }
}

/// Stable opaque identifier for an activity, assigned at creation and
/// persisted with the row. Rows from legacy files without an id column
/// receive a fresh one on load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityId(Uuid);

impl ActivityId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(text: &str) -> Option<Self> {
        Uuid::parse_str(text.trim()).ok().map(Self)
    }
}

impl Default for ActivityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ActivityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: ActivityId,
    pub kpi: String,
    pub activity: String,
    /// `None` means the deadline text on disk failed every known format.
    pub deadline: Option<NaiveDate>,
    pub pic: String,
    pub status: Status,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Creation payload from the form layer. Status and last-updated are not
/// accepted here: `append` always starts a row as Open with no timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewActivity {
    pub kpi: String,
    pub activity: String,
    pub deadline: NaiveDate,
    pub pic: String,
}

/// Ordered sequence of activities; insertion order is display order and the
/// sequence is the entire persisted state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityCollection {
    rows: Vec<Activity>,
}

impl ActivityCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<Activity>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Activity] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Activity> {
        self.rows.iter()
    }

    pub fn get(&self, id: &ActivityId) -> Option<&Activity> {
        self.rows.iter().find(|row| row.id == *id)
    }

    /// Pure append: the receiver is left untouched and the returned collection
    /// carries the new row last, forced to Open with no last-updated stamp.
    pub fn append(&self, draft: NewActivity) -> Self {
        let mut rows = self.rows.clone();
        rows.push(Activity {
            id: ActivityId::new(),
            kpi: draft.kpi,
            activity: draft.activity,
            deadline: Some(draft.deadline),
            pic: draft.pic,
            status: Status::Open,
            last_updated: None,
        });
        Self { rows }
    }

    /// Marks the matching row Done and stamps `last_updated`. Unknown ids
    /// (a stale handle from before a reload) leave the collection untouched.
    pub fn mark_done(&mut self, id: &ActivityId, now: DateTime<Utc>) -> AppResult<()> {
        let row = self
            .rows
            .iter_mut()
            .find(|row| row.id == *id)
            .ok_or_else(|| AppError::NotFound(format!("Activity '{}' not found", id)))?;
        row.status = row.status.complete();
        row.last_updated = Some(now);
        Ok(())
    }
}

impl<'a> IntoIterator for &'a ActivityCollection {
    type Item = &'a Activity;
    type IntoIter = std::slice::Iter<'a, Activity>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
