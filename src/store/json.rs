//! JSON file store.
//!
//! The whole data set lives in one JSON document ([`RosterDocument`]).
//! Reads and writes go through an [`InMemoryStore`]; `commit` rewrites the
//! file through a temporary sibling and a rename.

use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{InMemoryStore, RosterDocument, ScheduleStore};
use crate::error::StoreError;
use crate::models::{Employee, NewShift, Shift, WorkSchedule};

/// A store backed by one JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    inner: InMemoryStore,
}

impl JsonFileStore {
    /// Opens the document at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let raw = fs::read_to_string(&path)?;
        let doc: RosterDocument = serde_json::from_str(&raw)?;
        debug!(
            path = %path.display(),
            employees = doc.employees.len(),
            shifts = doc.shifts.len(),
            schedules = doc.schedules.len(),
            "roster document loaded"
        );
        Ok(Self {
            path,
            inner: InMemoryStore::from_document(doc),
        })
    }

    /// Creates a new document at `path`, overwriting any existing file.
    pub fn create(path: impl AsRef<Path>, doc: RosterDocument) -> Result<Self, StoreError> {
        let store = Self {
            path: path.as_ref().to_path_buf(),
            inner: InMemoryStore::from_document(doc),
        };
        store.save()?;
        Ok(store)
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the current state to disk.
    pub fn save(&self) -> Result<(), StoreError> {
        let body = serde_json::to_string_pretty(&self.inner.to_document())?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body)?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), "roster document saved");
        Ok(())
    }

    /// The in-memory view of the document.
    pub fn document(&self) -> RosterDocument {
        self.inner.to_document()
    }
}

impl ScheduleStore for JsonFileStore {
    fn employees(&self) -> Result<Vec<Employee>, StoreError> {
        self.inner.employees()
    }

    fn shifts(&self) -> Result<Vec<Shift>, StoreError> {
        self.inner.shifts()
    }

    fn schedules_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<WorkSchedule>, StoreError> {
        self.inner.schedules_between(from, to)
    }

    fn create_shift(&mut self, shift: NewShift) -> Result<Shift, StoreError> {
        self.inner.create_shift(shift)
    }

    fn upsert_schedule(&mut self, row: WorkSchedule) -> Result<(), StoreError> {
        self.inner.upsert_schedule(row)
    }

    fn begin(&mut self) -> Result<(), StoreError> {
        self.inner.begin()
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        if !self.inner.in_transaction() {
            return Err(StoreError::NoTransaction);
        }
        self.save()?;
        self.inner.commit()
    }

    fn rollback(&mut self) -> Result<(), StoreError> {
        self.inner.rollback()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(tag: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        std::env::temp_dir().join(format!("shift-roster-{tag}-{}-{nanos}.json", std::process::id()))
    }

    fn doc() -> RosterDocument {
        RosterDocument {
            employees: vec![Employee::new(1, "Andi"), Employee::new(2, "Budi")],
            shifts: vec![Shift::hours(1, "Pagi", 8, 16), Shift::hours(2, "Malam", 20, 8)],
            schedules: Vec::new(),
        }
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, day).unwrap()
    }

    #[test]
    fn test_commit_persists_to_disk() {
        let path = temp_path("commit");
        let mut store = JsonFileStore::create(&path, doc()).unwrap();
        store.begin().unwrap();
        store.upsert_schedule(WorkSchedule::scheduled(1, 1, d(7))).unwrap();
        store.commit().unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.schedules_between(d(7), d(7)).unwrap().len(), 1);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_rollback_leaves_file_untouched() {
        let path = temp_path("rollback");
        let mut store = JsonFileStore::create(&path, doc()).unwrap();
        store.begin().unwrap();
        store.upsert_schedule(WorkSchedule::scheduled(1, 1, d(7))).unwrap();
        store.rollback().unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        assert!(reopened.document().schedules.is_empty());
        assert!(store.document().schedules.is_empty());
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_open_missing_file() {
        let err = JsonFileStore::open(temp_path("missing")).unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
    }

    #[test]
    fn test_open_accepts_document_without_schedules() {
        let path = temp_path("minimal");
        fs::write(
            &path,
            r#"{
                "employees": [{"id": 1, "name": "Andi"}],
                "shifts": [{"id": 1, "name": "Pagi", "start_time": "08:00:00", "end_time": "16:00:00"}]
            }"#,
        )
        .unwrap();
        let store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.employees().unwrap().len(), 1);
        assert!(store.employees().unwrap()[0].is_active);
        fs::remove_file(&path).unwrap();
    }
}
