//! Roster quality metrics (KPIs).
//!
//! Computes staffing indicators for a date range from its schedule rows.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Coverage rate | Covered (date, active shift) slots / all slots |
//! | Uncovered slots | (date, active shift) pairs with no active, known employee working |
//! | Rest days | Absent rows per employee |
//! | Pinned compliance | Pinned employees' working rows on their fixed shift / all their working rows |
//! | Admin violations | Working rows of non-admins on admin-only shifts |
//! | Duplicate rows | Extra rows for an (employee, date) already seen |

use chrono::{NaiveDate, TimeDelta};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::models::{Employee, EmployeeId, ScheduleStatus, Shift, ShiftId, WorkSchedule};

/// Roster performance indicators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RosterKpi {
    /// Days in the measured range.
    pub days: usize,
    /// Active shift slots in the range (days × active shifts).
    pub total_slots: usize,
    /// Slots with at least one employee working.
    pub covered_slots: usize,
    /// Fraction of covered slots (0.0..1.0).
    pub coverage_rate: f64,
    /// Slots with nobody working, by date.
    pub uncovered: Vec<(NaiveDate, ShiftId)>,
    /// Rest days per employee.
    pub rest_days: BTreeMap<EmployeeId, usize>,
    /// Fraction of pinned employees' working rows on their fixed shift.
    pub pinned_compliance: f64,
    /// Non-admins working an admin-only shift.
    pub admin_violations: usize,
    /// Rows sharing an (employee, date) with another row.
    pub duplicate_rows: usize,
}

impl RosterKpi {
    /// Computes KPIs over `from..=to`.
    ///
    /// Rows outside the range are ignored.
    pub fn calculate(
        rows: &[WorkSchedule],
        employees: &[Employee],
        shifts: &[Shift],
        from: NaiveDate,
        to: NaiveDate,
    ) -> Self {
        let employees: HashMap<EmployeeId, &Employee> = employees.iter().map(|e| (e.id, e)).collect();
        let shifts: HashMap<ShiftId, &Shift> = shifts.iter().map(|s| (s.id, s)).collect();
        let mut active: Vec<ShiftId> = shifts
            .values()
            .filter(|s| s.is_work() && !s.is_admin_only())
            .map(|s| s.id)
            .collect();
        active.sort_unstable();

        let in_range: Vec<&WorkSchedule> = rows
            .iter()
            .filter(|r| r.date >= from && r.date <= to)
            .collect();

        let mut seen = BTreeSet::new();
        let mut duplicate_rows = 0;
        let mut covered: BTreeSet<(NaiveDate, ShiftId)> = BTreeSet::new();
        let mut rest_days: BTreeMap<EmployeeId, usize> = BTreeMap::new();
        let mut pinned_rows = 0usize;
        let mut pinned_on_fixed = 0usize;
        let mut admin_violations = 0;

        for row in &in_range {
            if !seen.insert(row.key()) {
                duplicate_rows += 1;
            }
            let shift = shifts.get(&row.shift_id);
            let working = row.status != ScheduleStatus::Absent && shift.is_some_and(|s| s.is_work());
            if !working {
                if row.status == ScheduleStatus::Absent {
                    *rest_days.entry(row.employee_id).or_default() += 1;
                }
                continue;
            }
            let Some(employee) = employees.get(&row.employee_id) else {
                continue;
            };
            if employee.is_active {
                covered.insert((row.date, row.shift_id));
            }
            if shift.is_some_and(|s| !s.admits(employee.is_admin)) {
                admin_violations += 1;
            }
            if let Some(fixed) = employee.fixed_shift() {
                pinned_rows += 1;
                if fixed == row.shift_id {
                    pinned_on_fixed += 1;
                }
            }
        }

        let days = if to < from {
            0
        } else {
            (to - from).num_days() as usize + 1
        };
        let mut uncovered = Vec::new();
        for offset in 0..days {
            let date = from + TimeDelta::days(offset as i64);
            for &shift_id in &active {
                if !covered.contains(&(date, shift_id)) {
                    uncovered.push((date, shift_id));
                }
            }
        }

        let total_slots = days * active.len();
        let covered_slots = total_slots - uncovered.len();
        let coverage_rate = if total_slots == 0 {
            1.0
        } else {
            covered_slots as f64 / total_slots as f64
        };
        let pinned_compliance = if pinned_rows == 0 {
            1.0
        } else {
            pinned_on_fixed as f64 / pinned_rows as f64
        };

        Self {
            days,
            total_slots,
            covered_slots,
            coverage_rate,
            uncovered,
            rest_days,
            pinned_compliance,
            admin_violations,
            duplicate_rows,
        }
    }

    /// Whether every slot is covered and no admin-only shift is misassigned.
    pub fn is_clean(&self) -> bool {
        self.uncovered.is_empty() && self.admin_violations == 0 && self.duplicate_rows == 0
    }

    /// Whether the roster meets the given quality thresholds.
    pub fn meets_thresholds(&self, min_coverage: f64, min_pinned_compliance: f64) -> bool {
        self.coverage_rate >= min_coverage && self.pinned_compliance >= min_pinned_compliance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, day).unwrap()
    }

    fn shifts() -> Vec<Shift> {
        vec![
            Shift::hours(1, "Pagi", 8, 16),
            Shift::hours(2, "Malam", 20, 8),
            Shift::hours(3, "Admin", 9, 17).admin_only(),
            Shift::rest(4, "Off Day"),
        ]
    }

    #[test]
    fn test_kpi_full_coverage() {
        let employees = vec![Employee::new(1, "Andi"), Employee::new(2, "Budi")];
        let rows = vec![
            WorkSchedule::scheduled(1, 1, d(6)),
            WorkSchedule::scheduled(2, 2, d(6)),
            WorkSchedule::scheduled(1, 2, d(7)),
            WorkSchedule::scheduled(2, 1, d(7)),
        ];
        let kpi = RosterKpi::calculate(&rows, &employees, &shifts(), d(6), d(7));
        assert_eq!(kpi.days, 2);
        assert_eq!(kpi.total_slots, 4);
        assert_eq!(kpi.covered_slots, 4);
        assert!((kpi.coverage_rate - 1.0).abs() < 1e-10);
        assert!(kpi.is_clean());
    }

    #[test]
    fn test_kpi_uncovered_and_rest() {
        let employees = vec![Employee::new(1, "Andi"), Employee::new(2, "Budi")];
        let rows = vec![
            WorkSchedule::scheduled(1, 1, d(6)),
            WorkSchedule::absent(2, 4, d(6)),
        ];
        let kpi = RosterKpi::calculate(&rows, &employees, &shifts(), d(6), d(6));
        assert_eq!(kpi.uncovered, vec![(d(6), 2)]);
        assert!((kpi.coverage_rate - 0.5).abs() < 1e-10);
        assert_eq!(kpi.rest_days.get(&2), Some(&1));
        assert!(!kpi.is_clean());
    }

    #[test]
    fn test_kpi_ignores_inactive_and_unknown_employees() {
        let employees = vec![Employee::new(1, "Andi"), Employee::new(2, "Budi").inactive()];
        let rows = vec![
            WorkSchedule::scheduled(1, 1, d(6)),
            WorkSchedule::scheduled(2, 2, d(6)),
            WorkSchedule::scheduled(7, 2, d(6)),
        ];
        let kpi = RosterKpi::calculate(&rows, &employees, &shifts(), d(6), d(6));
        assert_eq!(kpi.uncovered, vec![(d(6), 2)]);
        assert_eq!(kpi.covered_slots, 1);
    }

    #[test]
    fn test_kpi_admin_violation() {
        let employees = vec![Employee::new(1, "Andi"), Employee::new(2, "Budi").with_admin()];
        let rows = vec![
            WorkSchedule::scheduled(1, 3, d(6)),
            WorkSchedule::scheduled(2, 3, d(6)),
        ];
        let kpi = RosterKpi::calculate(&rows, &employees, &shifts(), d(6), d(6));
        assert_eq!(kpi.admin_violations, 1);
    }

    #[test]
    fn test_kpi_pinned_compliance() {
        let employees = vec![Employee::pinned(1, "Andi", 1)];
        let rows = vec![
            WorkSchedule::scheduled(1, 1, d(6)),
            WorkSchedule::scheduled(1, 1, d(7)),
            WorkSchedule::scheduled(1, 2, d(8)),
            WorkSchedule::absent(1, 4, d(9)),
        ];
        let kpi = RosterKpi::calculate(&rows, &employees, &shifts(), d(6), d(9));
        assert!((kpi.pinned_compliance - 2.0 / 3.0).abs() < 1e-10);
        assert!(kpi.meets_thresholds(0.0, 0.5));
        assert!(!kpi.meets_thresholds(0.0, 0.9));
    }

    #[test]
    fn test_kpi_empty_range() {
        let kpi = RosterKpi::calculate(&[], &[], &shifts(), d(6), d(5));
        assert_eq!(kpi.days, 0);
        assert!((kpi.coverage_rate - 1.0).abs() < 1e-10);
    }
}
