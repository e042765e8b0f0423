//! Weekly assignment.
//!
//! # Algorithm
//! For each of the seven days and each employee group, the group's shift
//! for the day is `shifts[day_of_week mod len]` (Sunday = 0). Pinned
//! employees take their fixed shift instead. Non-admins landing on an
//! admin-only shift are rerouted to an alternative. An assignment that
//! would start less than the minimum rest after the previous day's shift
//! is skipped.

use chrono::{NaiveDate, TimeDelta};
use tracing::{debug, warn};

use super::context::{GenerationContext, DAYS_PER_WEEK};
use crate::models::{EmployeeId, GroupId, ScheduleStatus, ShiftId, WorkSchedule};

/// Assigns every grouped employee one shift per day for a week.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeeklyAssigner;

impl WeeklyAssigner {
    pub fn new() -> Self {
        Self
    }

    /// Fills `[week_start, week_start + 6]`. Returns the number of rows written.
    pub fn assign_week(&self, ctx: &mut GenerationContext, week_start: NaiveDate) -> usize {
        let mut written = 0;
        for offset in 0..DAYS_PER_WEEK {
            let date = week_start + TimeDelta::days(offset);
            let groups: Vec<(GroupId, Vec<EmployeeId>)> = ctx
                .groups
                .iter()
                .map(|(g, members)| (g, members.to_vec()))
                .collect();

            for (group, members) in groups {
                let Some(group_shift) = ctx.shift_groups.shift_for(group, date) else {
                    warn!(group, %date, "group has no shifts, skipping");
                    continue;
                };
                for employee_id in members {
                    if self.assign_one(ctx, employee_id, group_shift, date) {
                        written += 1;
                    }
                }
            }
        }
        written
    }

    fn assign_one(
        &self,
        ctx: &mut GenerationContext,
        employee_id: EmployeeId,
        group_shift: ShiftId,
        date: NaiveDate,
    ) -> bool {
        let Some(employee) = ctx.employees.get(&employee_id) else {
            warn!(employee_id, "employee not found, skipping");
            return false;
        };
        let is_admin = employee.is_admin;
        let mut shift_id = employee.fixed_shift().unwrap_or(group_shift);
        let mut status = ScheduleStatus::Scheduled;

        let admitted = ctx.shifts.get(&shift_id).is_some_and(|s| s.admits(is_admin));
        if !admitted {
            (shift_id, status) = ctx.alternative_shift(employee_id, date, &[shift_id]);
            debug!(employee_id, %date, shift_id, "rerouted off admin-only shift");
        }

        if !ctx.respects_rest_gap(employee_id, shift_id, date) {
            debug!(employee_id, %date, shift_id, "assignment skipped: minimum rest not met");
            return false;
        }

        ctx.roster.upsert(WorkSchedule {
            employee_id,
            shift_id,
            date,
            status,
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GroupingStrategy;
    use crate::grouping::ShiftGrouper;
    use crate::models::{Employee, EmployeeGroups, Shift};

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, day).unwrap()
    }

    fn context(shifts: Vec<Shift>, employees: Vec<Employee>, groups: &[(GroupId, EmployeeId)]) -> GenerationContext {
        let shift_groups = ShiftGrouper::new(GroupingStrategy::TimeOfDay).group(&shifts);
        let mut eg = EmployeeGroups::with_ids(shift_groups.ids());
        for &(g, e) in groups {
            eg.push(g, e);
        }
        // 2025-07-06 is a Sunday.
        GenerationContext::new(employees, shifts, shift_groups, 99, d(6), 1)
            .with_groups(eg)
    }

    #[test]
    fn test_cycles_group_shifts_by_weekday() {
        let shifts = vec![Shift::hours(1, "Pagi", 6, 14), Shift::hours(2, "Pagi Siang", 9, 17)];
        let mut ctx = context(shifts, vec![Employee::new(1, "Andi")], &[(1, 1)]);
        let written = WeeklyAssigner::new().assign_week(&mut ctx, d(6));
        assert_eq!(written, 7);
        // Sunday = 0 -> shift 1, Monday = 1 -> shift 2.
        assert_eq!(ctx.roster.get(1, d(6)).unwrap().shift_id, 1);
        assert_eq!(ctx.roster.get(1, d(7)).unwrap().shift_id, 2);
        assert_eq!(ctx.roster.get(1, d(8)).unwrap().shift_id, 1);
    }

    #[test]
    fn test_pinned_employee_keeps_fixed_shift() {
        let shifts = vec![Shift::hours(1, "Pagi", 6, 14), Shift::hours(2, "Pagi Siang", 9, 17)];
        let mut ctx = context(shifts, vec![Employee::pinned(1, "Andi", 2)], &[(1, 1)]);
        WeeklyAssigner::new().assign_week(&mut ctx, d(6));
        assert!(ctx.roster.for_employee(1).iter().all(|r| r.shift_id == 2));
    }

    #[test]
    fn test_non_admin_rerouted_from_admin_shift() {
        let shifts = vec![
            Shift::hours(1, "Pagi", 8, 16),
            Shift::hours(2, "Admin Office", 9, 17).admin_only(),
        ];
        let employees = vec![Employee::new(1, "Andi"), Employee::new(2, "Budi").with_admin()];
        let mut ctx = context(shifts, employees, &[(1, 1), (1, 2)]);
        WeeklyAssigner::new().assign_week(&mut ctx, d(6));
        assert!(ctx.roster.for_employee(1).iter().all(|r| r.shift_id == 1));
        // Monday maps to the admin shift, which the admin keeps.
        assert_eq!(ctx.roster.get(2, d(7)).unwrap().shift_id, 2);
    }

    #[test]
    fn test_skips_assignment_without_minimum_rest() {
        let shifts = vec![Shift::hours(1, "Pagi", 8, 16), Shift::hours(2, "Malam", 20, 8)];
        let mut ctx = context(shifts, vec![Employee::new(1, "Andi")], &[(1, 1)])
            .with_existing([WorkSchedule::scheduled(1, 2, d(5))]);
        WeeklyAssigner::new().assign_week(&mut ctx, d(6));
        // Night on the 5th ends 08:00 on the 6th; morning at 08:00 is too soon.
        assert!(ctx.roster.get(1, d(6)).is_none());
        assert_eq!(ctx.roster.get(1, d(7)).unwrap().shift_id, 1);
    }
}
