//! Work schedule (solution) model.
//!
//! A [`WorkSchedule`] row assigns one employee to one shift on one date.
//! A [`Roster`] is the keyed collection of rows a generation run reads and
//! writes: keying by `(employee, date)` makes "at most one row per employee
//! per day" structural, and upserts are tracked so that only changed rows
//! are written back to the store.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::{EmployeeId, ShiftId};

/// A persisted assignment of an employee to a shift on a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkSchedule {
    /// Assigned employee.
    pub employee_id: EmployeeId,
    /// Assigned shift (the rest shift for a day off).
    pub shift_id: ShiftId,
    /// Calendar date the shift starts on.
    pub date: NaiveDate,
    /// Lifecycle status.
    pub status: ScheduleStatus,
}

/// Lifecycle status of a schedule row.
///
/// The generator only writes `Scheduled` and `Absent`; the other states are
/// set by attendance and payroll processing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    #[default]
    Scheduled,
    Absent,
    Completed,
    Processed,
    Paid,
}

impl WorkSchedule {
    /// Creates a scheduled row.
    pub fn scheduled(employee_id: EmployeeId, shift_id: ShiftId, date: NaiveDate) -> Self {
        Self {
            employee_id,
            shift_id,
            date,
            status: ScheduleStatus::Scheduled,
        }
    }

    /// Creates an absent (rest day) row.
    pub fn absent(employee_id: EmployeeId, shift_id: ShiftId, date: NaiveDate) -> Self {
        Self {
            employee_id,
            shift_id,
            date,
            status: ScheduleStatus::Absent,
        }
    }

    /// Upsert key.
    #[inline]
    pub fn key(&self) -> (EmployeeId, NaiveDate) {
        (self.employee_id, self.date)
    }
}

/// Schedule rows keyed by `(employee, date)`.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    rows: BTreeMap<(EmployeeId, NaiveDate), WorkSchedule>,
    changed: BTreeSet<(EmployeeId, NaiveDate)>,
}

impl Roster {
    /// Creates an empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the roster with rows already persisted; they are not marked
    /// as changed.
    pub fn from_existing(rows: impl IntoIterator<Item = WorkSchedule>) -> Self {
        let rows = rows.into_iter().map(|r| (r.key(), r)).collect();
        Self {
            rows,
            changed: BTreeSet::new(),
        }
    }

    /// Inserts or replaces the row for `(employee, date)`.
    ///
    /// Returns the previous row, if any.
    pub fn upsert(&mut self, row: WorkSchedule) -> Option<WorkSchedule> {
        let key = row.key();
        self.changed.insert(key);
        self.rows.insert(key, row)
    }

    /// Row for an employee on a date.
    pub fn get(&self, employee_id: EmployeeId, date: NaiveDate) -> Option<&WorkSchedule> {
        self.rows.get(&(employee_id, date))
    }

    /// All rows on a date, ordered by employee id.
    pub fn on_date(&self, date: NaiveDate) -> Vec<&WorkSchedule> {
        let mut rows: Vec<&WorkSchedule> = self.rows.values().filter(|r| r.date == date).collect();
        rows.sort_by_key(|r| r.employee_id);
        rows
    }

    /// All rows for one employee, ordered by date.
    pub fn for_employee(&self, employee_id: EmployeeId) -> Vec<&WorkSchedule> {
        self.rows
            .range((employee_id, NaiveDate::MIN)..=(employee_id, NaiveDate::MAX))
            .map(|(_, r)| r)
            .collect()
    }

    /// Rows with `from <= date <= to`, ordered by date then employee.
    pub fn between(&self, from: NaiveDate, to: NaiveDate) -> Vec<&WorkSchedule> {
        let mut rows: Vec<&WorkSchedule> = self
            .rows
            .values()
            .filter(|r| r.date >= from && r.date <= to)
            .collect();
        rows.sort_by_key(|r| (r.date, r.employee_id));
        rows
    }

    /// Rows written since the roster was created or seeded.
    pub fn changed_rows(&self) -> Vec<&WorkSchedule> {
        self.changed
            .iter()
            .filter_map(|key| self.rows.get(key))
            .collect()
    }

    /// Iterates every row in key order.
    pub fn iter(&self) -> impl Iterator<Item = &WorkSchedule> {
        self.rows.values()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the roster holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, day).unwrap()
    }

    fn sample_roster() -> Roster {
        let mut r = Roster::new();
        r.upsert(WorkSchedule::scheduled(1, 10, d(7)));
        r.upsert(WorkSchedule::scheduled(2, 10, d(7)));
        r.upsert(WorkSchedule::scheduled(3, 20, d(7)));
        r.upsert(WorkSchedule::absent(1, 99, d(8)));
        r
    }

    #[test]
    fn test_upsert_replaces_same_key() {
        let mut r = sample_roster();
        let prev = r.upsert(WorkSchedule::scheduled(1, 20, d(7)));
        assert_eq!(prev.map(|p| p.shift_id), Some(10));
        assert_eq!(r.len(), 4);
        assert_eq!(r.get(1, d(7)).map(|p| p.shift_id), Some(20));
    }

    #[test]
    fn test_lookups() {
        let r = sample_roster();
        let ids: Vec<EmployeeId> = r.on_date(d(7)).iter().map(|w| w.employee_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(r.on_date(d(9)).is_empty());
        assert_eq!(r.for_employee(1).len(), 2);
    }

    #[test]
    fn test_between_is_ordered() {
        let r = sample_roster();
        let rows = r.between(d(7), d(8));
        let keys: Vec<_> = rows.iter().map(|r| (r.date, r.employee_id)).collect();
        assert_eq!(keys, vec![(d(7), 1), (d(7), 2), (d(7), 3), (d(8), 1)]);
        assert!(r.between(d(9), d(10)).is_empty());
    }

    #[test]
    fn test_seeded_rows_are_not_changed() {
        let mut r = Roster::from_existing(vec![WorkSchedule::scheduled(5, 10, d(1))]);
        assert!(r.changed_rows().is_empty());
        r.upsert(WorkSchedule::scheduled(6, 10, d(1)));
        let changed = r.changed_rows();
        assert_eq!(changed.len(), 1);
        assert_eq!(changed[0].employee_id, 6);
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&ScheduleStatus::Absent).unwrap();
        assert_eq!(json, "\"absent\"");
    }
}
