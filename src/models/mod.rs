//! Roster domain models.
//!
//! Provides the data types the generator reads (employees, shifts), the rows
//! it writes (work schedules), and the derived groupings it computes along
//! the way.
//!
//! | Type | Persisted | Role |
//! |------|-----------|------|
//! | `Employee` | yes (read-only here) | who can work |
//! | `Shift` | yes | when they work, or the rest sentinel |
//! | `WorkSchedule` | yes (upserted) | the output |
//! | `ShiftGroups` / `EmployeeGroups` | no | per-run rotation units |

mod employee;
mod groups;
mod schedule;
mod shift;

pub use employee::{Employee, EmployeeId};
pub use groups::{EmployeeGroups, GroupId, ShiftGroups};
pub use schedule::{Roster, ScheduleStatus, WorkSchedule};
pub use shift::{
    rest_gap, NewShift, Shift, ShiftCategory, ShiftId, ShiftRestriction, TimeBucket,
};
