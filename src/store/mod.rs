//! Persistence seam.
//!
//! The generator reads employees, shifts and existing schedule rows through
//! [`ScheduleStore`] and writes its output back through it. A run opens one
//! transaction, upserts every changed row, and commits; on any failure it
//! rolls back so a run is all-or-nothing.
//!
//! Two implementations ship with the crate: [`InMemoryStore`] (snapshot
//! transactions, used by tests and embedders) and [`JsonFileStore`] (one
//! JSON document on disk, used by the CLI).

mod json;
mod memory;

pub use json::JsonFileStore;
pub use memory::InMemoryStore;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::models::{Employee, NewShift, Shift, WorkSchedule};

/// Storage for employees, shifts and work schedules.
pub trait ScheduleStore {
    /// All employees, active or not.
    fn employees(&self) -> Result<Vec<Employee>, StoreError>;

    /// All shifts, including rest shifts.
    fn shifts(&self) -> Result<Vec<Shift>, StoreError>;

    /// Schedule rows with `from <= date <= to`.
    fn schedules_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<WorkSchedule>, StoreError>;

    /// Creates a shift and returns it with its assigned id.
    fn create_shift(&mut self, shift: NewShift) -> Result<Shift, StoreError>;

    /// Inserts or replaces the row for `(employee_id, date)`.
    fn upsert_schedule(&mut self, row: WorkSchedule) -> Result<(), StoreError>;

    /// Opens a transaction.
    fn begin(&mut self) -> Result<(), StoreError>;

    /// Makes every write since [`begin`](Self::begin) durable.
    fn commit(&mut self) -> Result<(), StoreError>;

    /// Discards every write since [`begin`](Self::begin).
    fn rollback(&mut self) -> Result<(), StoreError>;
}

/// Serialized form of a whole roster data set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RosterDocument {
    pub employees: Vec<Employee>,
    pub shifts: Vec<Shift>,
    #[serde(default)]
    pub schedules: Vec<WorkSchedule>,
}
