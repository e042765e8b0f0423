//! Rotating work-schedule generator.
//!
//! Assigns employees to shifts week by week: shifts are grouped by time of
//! day, employees are split across the groups, one rest day per employee is
//! distributed each week, coverage gaps are repaired, and groups rotate
//! before the next week.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Employee`, `Shift`, `WorkSchedule`,
//!   `Roster`, `ShiftGroups`, `EmployeeGroups`
//! - **`grouping`**: `ShiftGrouper` and `EmployeeGrouper`
//! - **`generator`**: `ScheduleGenerator` and the weekly pipeline
//!   (`WeeklyAssigner`, `RestDayDistributor`, `CoverageRepairer`,
//!   `RotationDriver`)
//! - **`store`**: `ScheduleStore` trait with in-memory and JSON file backends
//! - **`notify`**: `NotificationSender` trait
//! - **`report`**: weekly summary, daily recap, `RosterKpi`
//! - **`validation`**: Input integrity checks (duplicate IDs, bad pins)
//! - **`config`**: `GeneratorConfig` from JSON or `ROSTER_*` variables
//!
//! # Architecture
//!
//! The generator is synchronous and runs a whole generation in memory on a
//! `GenerationContext`; the store sees one transaction per run. Randomness
//! comes from an injected `rand::Rng`, so seeded runs are reproducible.

pub mod config;
pub mod error;
pub mod generator;
pub mod grouping;
pub mod models;
pub mod notify;
pub mod report;
pub mod store;
pub mod validation;
