//! Shift and employee grouping.
//!
//! Groups are the unit of rotation: shifts that start at a similar time of
//! day form a shift group, and each week every employee belongs to exactly
//! one group.

mod employees;
mod shifts;

pub(crate) use employees::fill_empty_groups;
pub use employees::{EmployeeGrouper, GroupTargets};
pub use shifts::ShiftGrouper;
