//! Reporting: chat summaries and roster KPIs.
//!
//! # Summaries
//!
//! `SummaryFormatter` renders the weekly notification sent after a run and
//! the daily recap of a single date.
//!
//! # KPI
//!
//! `RosterKpi` measures coverage, rest days, pinned compliance and admin
//! violations over a date range.

mod kpi;
mod summary;

pub use kpi::RosterKpi;
pub use summary::SummaryFormatter;
