//! In-memory store with snapshot transactions.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use super::{RosterDocument, ScheduleStore};
use crate::error::StoreError;
use crate::models::{Employee, EmployeeId, NewShift, Shift, WorkSchedule};

#[derive(Debug, Clone, Default)]
struct Tables {
    employees: Vec<Employee>,
    shifts: Vec<Shift>,
    schedules: BTreeMap<(EmployeeId, NaiveDate), WorkSchedule>,
}

/// A store kept entirely in memory.
///
/// `begin` snapshots the tables and `rollback` restores the snapshot.
/// Writes outside a transaction apply immediately.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Tables,
    snapshot: Option<Tables>,
}

impl InMemoryStore {
    /// Creates a store holding the given employees and shifts.
    pub fn new(employees: Vec<Employee>, shifts: Vec<Shift>) -> Self {
        Self {
            tables: Tables {
                employees,
                shifts,
                schedules: BTreeMap::new(),
            },
            snapshot: None,
        }
    }

    /// Creates a store from a serialized document.
    pub fn from_document(doc: RosterDocument) -> Self {
        let mut store = Self::new(doc.employees, doc.shifts);
        for row in doc.schedules {
            store.tables.schedules.insert(row.key(), row);
        }
        store
    }

    /// Serializes the committed-or-pending state.
    pub fn to_document(&self) -> RosterDocument {
        RosterDocument {
            employees: self.tables.employees.clone(),
            shifts: self.tables.shifts.clone(),
            schedules: self.tables.schedules.values().cloned().collect(),
        }
    }

    /// Adds an existing schedule row without a transaction.
    pub fn with_schedule(mut self, row: WorkSchedule) -> Self {
        self.tables.schedules.insert(row.key(), row);
        self
    }

    /// Every schedule row, ordered by employee then date.
    pub fn all_schedules(&self) -> Vec<WorkSchedule> {
        self.tables.schedules.values().cloned().collect()
    }

    /// Number of schedule rows.
    pub fn schedule_count(&self) -> usize {
        self.tables.schedules.len()
    }

    /// Whether a transaction is open.
    pub fn in_transaction(&self) -> bool {
        self.snapshot.is_some()
    }
}

impl ScheduleStore for InMemoryStore {
    fn employees(&self) -> Result<Vec<Employee>, StoreError> {
        Ok(self.tables.employees.clone())
    }

    fn shifts(&self) -> Result<Vec<Shift>, StoreError> {
        Ok(self.tables.shifts.clone())
    }

    fn schedules_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<WorkSchedule>, StoreError> {
        Ok(self
            .tables
            .schedules
            .values()
            .filter(|r| r.date >= from && r.date <= to)
            .cloned()
            .collect())
    }

    fn create_shift(&mut self, shift: NewShift) -> Result<Shift, StoreError> {
        let id = self.tables.shifts.iter().map(|s| s.id).max().unwrap_or(0) + 1;
        let shift = shift.with_id(id);
        self.tables.shifts.push(shift.clone());
        Ok(shift)
    }

    fn upsert_schedule(&mut self, row: WorkSchedule) -> Result<(), StoreError> {
        if !self.tables.employees.iter().any(|e| e.id == row.employee_id) {
            return Err(StoreError::UnknownEmployee(row.employee_id));
        }
        if !self.tables.shifts.iter().any(|s| s.id == row.shift_id) {
            return Err(StoreError::UnknownShift(row.shift_id));
        }
        self.tables.schedules.insert(row.key(), row);
        Ok(())
    }

    fn begin(&mut self) -> Result<(), StoreError> {
        if self.snapshot.is_some() {
            return Err(StoreError::TransactionOpen);
        }
        self.snapshot = Some(self.tables.clone());
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        self.snapshot
            .take()
            .map(|_| ())
            .ok_or(StoreError::NoTransaction)
    }

    fn rollback(&mut self) -> Result<(), StoreError> {
        let snapshot = self.snapshot.take().ok_or(StoreError::NoTransaction)?;
        self.tables = snapshot;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, day).unwrap()
    }

    fn store() -> InMemoryStore {
        InMemoryStore::new(
            vec![Employee::new(1, "Andi"), Employee::new(2, "Budi")],
            vec![Shift::hours(1, "Pagi", 8, 16), Shift::hours(2, "Malam", 20, 8)],
        )
    }

    #[test]
    fn test_upsert_and_query() {
        let mut s = store();
        s.upsert_schedule(WorkSchedule::scheduled(1, 1, d(7))).unwrap();
        s.upsert_schedule(WorkSchedule::scheduled(1, 2, d(7))).unwrap();
        s.upsert_schedule(WorkSchedule::scheduled(2, 1, d(9))).unwrap();
        assert_eq!(s.schedule_count(), 2);
        assert_eq!(s.schedules_between(d(7), d(8)).unwrap()[0].shift_id, 2);
    }

    #[test]
    fn test_upsert_rejects_unknown_refs() {
        let mut s = store();
        assert!(matches!(
            s.upsert_schedule(WorkSchedule::scheduled(9, 1, d(7))),
            Err(StoreError::UnknownEmployee(9))
        ));
        assert!(matches!(
            s.upsert_schedule(WorkSchedule::scheduled(1, 9, d(7))),
            Err(StoreError::UnknownShift(9))
        ));
    }

    #[test]
    fn test_rollback_restores_snapshot() {
        let mut s = store();
        s.begin().unwrap();
        s.upsert_schedule(WorkSchedule::scheduled(1, 1, d(7))).unwrap();
        s.create_shift(NewShift::rest("Off Day")).unwrap();
        s.rollback().unwrap();
        assert_eq!(s.schedule_count(), 0);
        assert_eq!(s.shifts().unwrap().len(), 2);
        assert!(!s.in_transaction());
    }

    #[test]
    fn test_commit_keeps_writes() {
        let mut s = store();
        s.begin().unwrap();
        s.upsert_schedule(WorkSchedule::scheduled(1, 1, d(7))).unwrap();
        s.commit().unwrap();
        assert_eq!(s.schedule_count(), 1);
    }

    #[test]
    fn test_transaction_misuse() {
        let mut s = store();
        assert!(matches!(s.commit(), Err(StoreError::NoTransaction)));
        s.begin().unwrap();
        assert!(matches!(s.begin(), Err(StoreError::TransactionOpen)));
    }

    #[test]
    fn test_create_shift_assigns_next_id() {
        let mut s = store();
        let rest = s.create_shift(NewShift::rest("Off Day")).unwrap();
        assert_eq!(rest.id, 3);
        assert!(rest.is_rest());
    }

    #[test]
    fn test_document_round_trip() {
        let s = store().with_schedule(WorkSchedule::scheduled(2, 2, d(8)));
        let again = InMemoryStore::from_document(s.to_document());
        assert_eq!(again.all_schedules(), s.all_schedules());
    }
}
