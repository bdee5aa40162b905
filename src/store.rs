//! CSV-backed persistence for the activity table. The file is the single
//! source of truth: every interaction cycle reloads it in full and every
//! mutation rewrites it in full. Loading must stay total over hand-edited
//! and legacy-format content, so date cells are reparsed permissively and
//! unreadable rows are skipped with a warning rather than failing the load.

use crate::dates;
use crate::errors::{AppError, AppResult};
use crate::models::{Activity, ActivityCollection, ActivityId, Status};
use csv::StringRecord;
use std::fs;
use std::path::{Path, PathBuf};

pub const HEADER: [&str; 7] = [
    "Id",
    "KPI",
    "Activity",
    "Deadline",
    "PIC",
    "Status",
    "Last Updated",
];

#[derive(Debug)]
pub struct Store {
    path: PathBuf,
}

/// Resolved column positions; legacy files have no `Id` column.
struct Columns {
    id: Option<usize>,
    kpi: Option<usize>,
    activity: Option<usize>,
    deadline: Option<usize>,
    pic: Option<usize>,
    status: Option<usize>,
    last_updated: Option<usize>,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Self {
        let position = |name: &str| {
            headers
                .iter()
                .position(|header| header.trim().eq_ignore_ascii_case(name))
        };
        Self {
            id: position("Id"),
            kpi: position("KPI"),
            activity: position("Activity"),
            deadline: position("Deadline"),
            pic: position("PIC"),
            status: position("Status"),
            last_updated: position("Last Updated"),
        }
    }

    fn recognized(&self) -> bool {
        self.kpi.is_some() || self.activity.is_some() || self.status.is_some()
    }
}

fn field<'a>(record: &'a StringRecord, index: Option<usize>) -> &'a str {
    index.and_then(|index| record.get(index)).unwrap_or("")
}

impl Store {
    pub fn new(path: &Path) -> AppResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|error| AppError::Io(error.to_string()))?;
            }
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the full table. An absent file is an empty collection, not an
    /// error; the first save creates it. Deadline and Last Updated cells are
    /// independently reparsed and degrade to `None` when unparseable.
    pub fn load(&self) -> AppResult<ActivityCollection> {
        if !self.path.exists() {
            return Ok(ActivityCollection::new());
        }

        let mut reader = csv::Reader::from_path(&self.path)?;
        let headers = reader.headers()?.clone();
        let columns = Columns::resolve(&headers);
        if !columns.recognized() {
            if !headers.is_empty() {
                tracing::warn!(
                    path = %self.path.display(),
                    "backing file header not recognized, treating as empty"
                );
            }
            return Ok(ActivityCollection::new());
        }

        let mut rows = Vec::new();
        let mut repaired = 0usize;
        for (index, record) in reader.records().enumerate() {
            let record = match record {
                Ok(record) => record,
                Err(error) => {
                    tracing::warn!(row = index + 2, error = %error, "skipping unreadable row");
                    continue;
                }
            };
            rows.push(self.parse_row(&columns, &record, &mut repaired));
        }

        let collection = ActivityCollection::from_rows(rows);
        if repaired > 0 {
            // Legacy rows only get stable handles once their ids are on
            // disk, so the repair is persisted as part of the load.
            self.save(&collection)?;
            tracing::info!(rows = repaired, "assigned ids to legacy rows");
        }
        Ok(collection)
    }

    fn parse_row(&self, columns: &Columns, record: &StringRecord, repaired: &mut usize) -> Activity {
        let id = match ActivityId::parse(field(record, columns.id)) {
            Some(id) => id,
            None => {
                *repaired += 1;
                ActivityId::new()
            }
        };
        Activity {
            id,
            kpi: field(record, columns.kpi).to_string(),
            activity: field(record, columns.activity).to_string(),
            deadline: dates::parse_date(field(record, columns.deadline)),
            pic: field(record, columns.pic).to_string(),
            status: Status::parse(field(record, columns.status)).unwrap_or(Status::Open),
            last_updated: dates::parse_timestamp(field(record, columns.last_updated)),
        }
    }

    /// Serializes the full collection, replacing the file. The write goes to
    /// a sibling temp file first and is renamed into place, so a failed write
    /// leaves the previous content intact.
    pub fn save(&self, collection: &ActivityCollection) -> AppResult<()> {
        let tmp = self.path.with_extension("csv.tmp");
        {
            let mut writer = csv::Writer::from_path(&tmp)?;
            writer.write_record(HEADER)?;
            for row in collection {
                let id = row.id.to_string();
                let deadline = row.deadline.map(dates::format_date).unwrap_or_default();
                let last_updated = row
                    .last_updated
                    .map(dates::format_timestamp)
                    .unwrap_or_default();
                writer.write_record([
                    id.as_str(),
                    row.kpi.as_str(),
                    row.activity.as_str(),
                    deadline.as_str(),
                    row.pic.as_str(),
                    row.status.as_str(),
                    last_updated.as_str(),
                ])?;
            }
            writer.flush()?;
        }
        fs::rename(&tmp, &self.path).map_err(|error| AppError::Io(error.to_string()))?;
        tracing::debug!(path = %self.path.display(), rows = collection.len(), "collection saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewActivity;
    use chrono::{NaiveDate, TimeZone, Utc};
    use std::fs;

    fn temp_store() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = Store::new(&dir.path().join("data/data.csv")).expect("store");
        (dir, store)
    }

    fn draft(activity: &str, deadline: NaiveDate) -> NewActivity {
        NewActivity {
            kpi: "Campaign".to_string(),
            activity: activity.to_string(),
            deadline,
            pic: "Windy".to_string(),
        }
    }

    #[test]
    fn absent_file_loads_as_empty_collection() {
        let (_dir, store) = temp_store();
        let collection = store.load().expect("load");
        assert!(collection.is_empty());
    }

    #[test]
    fn save_and_load_round_trip_preserves_rows() {
        let (_dir, store) = temp_store();
        let deadline = NaiveDate::from_ymd_opt(2024, 2, 15).expect("valid date");

        let mut collection = ActivityCollection::new()
            .append(draft("Quarterly review, with commas \"quoted\"", deadline))
            .append(draft("Team onboarding", deadline));
        let id = collection.rows()[1].id;
        let stamp = Utc.with_ymd_and_hms(2024, 2, 10, 8, 15, 0).single().expect("stamp");
        collection.mark_done(&id, stamp).expect("mark done");

        store.save(&collection).expect("save");
        let loaded = store.load().expect("load");

        assert_eq!(loaded, collection);
        assert_eq!(loaded.rows()[1].last_updated, Some(stamp));
    }

    #[test]
    fn unparseable_deadline_degrades_to_none_without_dropping_the_row() {
        let (_dir, store) = temp_store();
        fs::write(
            store.path(),
            "Id,KPI,Activity,Deadline,PIC,Status,Last Updated\n\
             ,Campaign,Fix banner,someday,Andi,Open,\n",
        )
        .expect("write file");

        let collection = store.load().expect("load");
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.rows()[0].deadline, None);
        assert_eq!(collection.rows()[0].activity, "Fix banner");
    }

    #[test]
    fn legacy_file_without_id_column_loads_with_stable_ids() {
        let (_dir, store) = temp_store();
        fs::write(
            store.path(),
            "KPI,Activity,Deadline,PIC,Status,Last Updated\n\
             Culture,Town hall,2024-03-01,Eta,Open,\n\
             Campaign,Print posters,01/03/2024,Andi,Done,2024-02-20 10:00:00\n",
        )
        .expect("write legacy file");

        let collection = store.load().expect("load");
        assert_eq!(collection.len(), 2);
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid date");
        assert_eq!(collection.rows()[0].deadline, Some(expected));
        assert_eq!(collection.rows()[1].deadline, Some(expected));
        assert!(collection.rows()[1].status.is_done());

        // The repair is persisted by load itself, so handles stay stable
        // across interaction cycles.
        let reloaded = store.load().expect("reload");
        assert_eq!(reloaded, collection);
    }

    #[test]
    fn unknown_status_text_loads_as_open() {
        let (_dir, store) = temp_store();
        fs::write(
            store.path(),
            "Id,KPI,Activity,Deadline,PIC,Status,Last Updated\n\
             ,Campaign,Audit,2024-04-01,Andi,in progress,\n",
        )
        .expect("write file");

        let collection = store.load().expect("load");
        assert_eq!(collection.rows()[0].status, Status::Open);
    }

    #[test]
    fn rows_with_wrong_field_count_are_skipped() {
        let (_dir, store) = temp_store();
        fs::write(
            store.path(),
            "Id,KPI,Activity,Deadline,PIC,Status,Last Updated\n\
             ,Campaign,Keep me,2024-04-01,Andi,Open,\n\
             broken row with no commas to speak of\n\
             ,Culture,Also keep me,2024-04-02,Eta,Open,\n",
        )
        .expect("write file");

        let collection = store.load().expect("load");
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.rows()[0].activity, "Keep me");
        assert_eq!(collection.rows()[1].activity, "Also keep me");
    }

    #[test]
    fn unrecognized_header_loads_as_empty() {
        let (_dir, store) = temp_store();
        fs::write(store.path(), "alpha,beta\n1,2\n").expect("write file");
        let collection = store.load().expect("load");
        assert!(collection.is_empty());
    }

    #[test]
    fn save_overwrites_rather_than_appends() {
        let (_dir, store) = temp_store();
        let deadline = NaiveDate::from_ymd_opt(2024, 5, 5).expect("valid date");

        let two = ActivityCollection::new()
            .append(draft("First", deadline))
            .append(draft("Second", deadline));
        store.save(&two).expect("save two");

        let one = ActivityCollection::new().append(draft("Only", deadline));
        store.save(&one).expect("save one");

        let loaded = store.load().expect("load");
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.rows()[0].activity, "Only");
    }
}
