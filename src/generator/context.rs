//! Generation state threaded through every pipeline step.

use chrono::{NaiveDate, TimeDelta};
use std::collections::BTreeMap;

use crate::models::{
    rest_gap, Employee, EmployeeGroups, EmployeeId, GroupId, Roster, ScheduleStatus, Shift,
    ShiftGroups, ShiftId, WorkSchedule,
};

/// Days in one rotation cycle.
pub const DAYS_PER_WEEK: i64 = 7;

/// A rest day granted in the current week.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestDay {
    /// Date of the rest day.
    pub date: NaiveDate,
    /// Group the employee belonged to when the rest day was granted.
    pub prev_group: GroupId,
}

/// Mutable state of one generation run.
///
/// Built once per run, then passed by `&mut` through assignment, rest-day
/// distribution, repair and rotation. Nothing here touches the store.
#[derive(Debug, Clone)]
pub struct GenerationContext {
    /// First day of the first week.
    pub start: NaiveDate,
    /// Number of weeks to generate.
    pub weeks: u32,
    /// Shift used for rest days.
    pub rest_shift_id: ShiftId,
    /// Minimum rest between the end of one shift and the start of the next.
    pub min_rest: TimeDelta,
    /// Every known shift, rest shift included.
    pub shifts: BTreeMap<ShiftId, Shift>,
    /// Employees taking part in the run.
    pub employees: BTreeMap<EmployeeId, Employee>,
    /// Working shifts partitioned into rotation groups.
    pub shift_groups: ShiftGroups,
    /// Current week's employee groups.
    pub groups: EmployeeGroups,
    /// Schedule rows read and written by the run.
    pub roster: Roster,
    /// Rest days granted in the current week.
    pub rest_days: BTreeMap<EmployeeId, RestDay>,
}

impl GenerationContext {
    /// Creates a context with an empty roster and no groups yet.
    pub fn new(
        employees: impl IntoIterator<Item = Employee>,
        shifts: impl IntoIterator<Item = Shift>,
        shift_groups: ShiftGroups,
        rest_shift_id: ShiftId,
        start: NaiveDate,
        weeks: u32,
    ) -> Self {
        Self {
            start,
            weeks,
            rest_shift_id,
            min_rest: TimeDelta::hours(crate::config::DEFAULT_MIN_REST_HOURS),
            shifts: shifts.into_iter().map(|s| (s.id, s)).collect(),
            employees: employees.into_iter().map(|e| (e.id, e)).collect(),
            groups: EmployeeGroups::with_ids(shift_groups.ids()),
            shift_groups,
            roster: Roster::new(),
            rest_days: BTreeMap::new(),
        }
    }

    /// Sets the minimum rest.
    pub fn with_min_rest(mut self, min_rest: TimeDelta) -> Self {
        self.min_rest = min_rest;
        self
    }

    /// Seeds the roster with rows already persisted.
    pub fn with_existing(mut self, rows: impl IntoIterator<Item = WorkSchedule>) -> Self {
        self.roster = Roster::from_existing(rows);
        self
    }

    /// Sets the employee groups.
    pub fn with_groups(mut self, groups: EmployeeGroups) -> Self {
        self.groups = groups;
        self
    }

    /// First day of week `week` (0-based).
    pub fn week_start(&self, week: u32) -> NaiveDate {
        self.start + TimeDelta::days(DAYS_PER_WEEK * i64::from(week))
    }

    /// Last day covered by the run.
    pub fn end(&self) -> NaiveDate {
        self.week_start(self.weeks) - TimeDelta::days(1)
    }

    /// Employees as a list ordered by id.
    pub fn employee_list(&self) -> Vec<Employee> {
        self.employees.values().cloned().collect()
    }

    /// Shifts as a list ordered by id.
    pub fn shift_list(&self) -> Vec<Shift> {
        self.shifts.values().cloned().collect()
    }

    /// Participants' rows inside the generated range, ordered by date then
    /// employee.
    pub fn generated_rows(&self) -> Vec<WorkSchedule> {
        self.roster
            .between(self.start, self.end())
            .into_iter()
            .filter(|r| self.is_participant(r.employee_id))
            .cloned()
            .collect()
    }

    /// Whether the employee takes part in this run.
    ///
    /// Rows of other employees (inactive, or excluded admins) may still be
    /// in the roster when they were loaded with the existing schedule; they
    /// never count towards coverage.
    pub fn is_participant(&self, employee_id: EmployeeId) -> bool {
        self.employees.contains_key(&employee_id)
    }

    /// Participants' rows on `date`, ordered by employee id.
    pub fn rows_on(&self, date: NaiveDate) -> Vec<&WorkSchedule> {
        self.roster
            .on_date(date)
            .into_iter()
            .filter(|r| self.is_participant(r.employee_id))
            .collect()
    }

    /// Whether `employee_id` may work `shift_id`.
    ///
    /// The rest shift is never "eligible"; it is a fallback, not a choice.
    pub fn is_eligible(&self, employee_id: EmployeeId, shift_id: ShiftId) -> bool {
        match (self.employees.get(&employee_id), self.shifts.get(&shift_id)) {
            (Some(e), Some(s)) => s.is_work() && s.admits(e.is_admin),
            _ => false,
        }
    }

    /// Working shifts that are open to everyone, by id.
    pub fn active_shift_ids(&self) -> Vec<ShiftId> {
        self.shifts
            .values()
            .filter(|s| s.is_work() && !s.is_admin_only())
            .map(|s| s.id)
            .collect()
    }

    /// Headcount of every active shift on `date`.
    pub fn coverage(&self, date: NaiveDate) -> BTreeMap<ShiftId, usize> {
        let mut coverage: BTreeMap<ShiftId, usize> =
            self.active_shift_ids().into_iter().map(|id| (id, 0)).collect();
        for row in self.rows_on(date) {
            if row.status == ScheduleStatus::Absent {
                continue;
            }
            if let Some(count) = coverage.get_mut(&row.shift_id) {
                *count += 1;
            }
        }
        coverage
    }

    /// Whether the employee has a working (non-rest) row on `date`.
    pub fn is_working(&self, employee_id: EmployeeId, date: NaiveDate) -> bool {
        self.working_shift(employee_id, date).is_some()
    }

    /// The working shift held on `date`, if any.
    pub fn working_shift(&self, employee_id: EmployeeId, date: NaiveDate) -> Option<&Shift> {
        let row = self.roster.get(employee_id, date)?;
        if row.status == ScheduleStatus::Absent {
            return None;
        }
        self.shifts.get(&row.shift_id).filter(|s| s.is_work())
    }

    /// Whether the employee holds a rest row on `date`.
    pub fn is_resting(&self, employee_id: EmployeeId, date: NaiveDate) -> bool {
        self.roster
            .get(employee_id, date)
            .is_some_and(|r| r.shift_id == self.rest_shift_id)
    }

    /// Employees working `shift_id` on `date`, by id.
    pub fn workers_on(&self, date: NaiveDate, shift_id: ShiftId) -> Vec<EmployeeId> {
        self.rows_on(date)
            .into_iter()
            .filter(|r| r.shift_id == shift_id && r.status != ScheduleStatus::Absent)
            .map(|r| r.employee_id)
            .collect()
    }

    /// Number of employees working any shift of `group` on `date`.
    pub fn group_headcount(&self, date: NaiveDate, group: GroupId) -> usize {
        let shifts = self.shift_groups.shifts(group);
        self.rows_on(date)
            .into_iter()
            .filter(|r| r.status != ScheduleStatus::Absent && shifts.contains(&r.shift_id))
            .count()
    }

    /// Schedules the employee on `shift_id`.
    pub fn assign(&mut self, employee_id: EmployeeId, shift_id: ShiftId, date: NaiveDate) {
        self.roster
            .upsert(WorkSchedule::scheduled(employee_id, shift_id, date));
    }

    /// Gives the employee the rest shift on `date`.
    pub fn mark_rest(&mut self, employee_id: EmployeeId, date: NaiveDate) {
        self.roster
            .upsert(WorkSchedule::absent(employee_id, self.rest_shift_id, date));
    }

    /// Whether starting `shift_id` on `date` leaves at least `min_rest`
    /// after the employee's working shift on the previous day.
    pub fn respects_rest_gap(&self, employee_id: EmployeeId, shift_id: ShiftId, date: NaiveDate) -> bool {
        let Some(next) = self.shifts.get(&shift_id).filter(|s| s.is_work()) else {
            return true;
        };
        let prev_date = date - TimeDelta::days(1);
        match self.working_shift(employee_id, prev_date) {
            Some(prev) => rest_gap(prev, prev_date, next, date) >= self.min_rest,
            None => true,
        }
    }

    /// Like [`respects_rest_gap`](Self::respects_rest_gap), and also checks
    /// the gap before the employee's working shift on the following day.
    pub fn fits_rest_window(&self, employee_id: EmployeeId, shift_id: ShiftId, date: NaiveDate) -> bool {
        if !self.respects_rest_gap(employee_id, shift_id, date) {
            return false;
        }
        let Some(this) = self.shifts.get(&shift_id).filter(|s| s.is_work()) else {
            return true;
        };
        let next_date = date + TimeDelta::days(1);
        match self.working_shift(employee_id, next_date) {
            Some(next) => rest_gap(this, date, next, next_date) >= self.min_rest,
            None => true,
        }
    }

    /// Picks a replacement when `employee_id` cannot work the shifts in
    /// `exclude` on `date`.
    ///
    /// Tries the employee's own group first, then the least-covered active
    /// shift, and finally the rest shift (as an absence). A shift only
    /// qualifies when it keeps the minimum rest on both sides of `date`.
    pub fn alternative_shift(
        &self,
        employee_id: EmployeeId,
        date: NaiveDate,
        exclude: &[ShiftId],
    ) -> (ShiftId, ScheduleStatus) {
        let usable = |id: &ShiftId| {
            !exclude.contains(id)
                && self.is_eligible(employee_id, *id)
                && self.fits_rest_window(employee_id, *id, date)
        };

        if let Some(group) = self.groups.group_of(employee_id) {
            if let Some(&id) = self.shift_groups.shifts(group).iter().find(|id| usable(id)) {
                return (id, ScheduleStatus::Scheduled);
            }
        }

        let coverage = self.coverage(date);
        let least_covered = coverage
            .iter()
            .filter(|(id, _)| usable(id))
            .min_by_key(|(id, count)| (**count, **id))
            .map(|(id, _)| *id);
        match least_covered {
            Some(id) => (id, ScheduleStatus::Scheduled),
            None => (self.rest_shift_id, ScheduleStatus::Absent),
        }
    }

    /// Writes the result of [`alternative_shift`](Self::alternative_shift).
    pub fn reroute(&mut self, employee_id: EmployeeId, date: NaiveDate, exclude: &[ShiftId]) -> ShiftId {
        let (shift_id, status) = self.alternative_shift(employee_id, date, exclude);
        self.roster.upsert(WorkSchedule {
            employee_id,
            shift_id,
            date,
            status,
        });
        shift_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GroupingStrategy;
    use crate::grouping::ShiftGrouper;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, day).unwrap()
    }

    fn context() -> GenerationContext {
        let shifts = vec![
            Shift::hours(1, "Pagi", 8, 16),
            Shift::hours(2, "Malam", 20, 8),
            Shift::hours(3, "Admin", 9, 17).admin_only(),
            Shift::rest(4, "Off Day"),
        ];
        let groups = ShiftGrouper::new(GroupingStrategy::TimeOfDay).group(&shifts);
        let employees = vec![
            Employee::new(1, "Andi"),
            Employee::new(2, "Budi"),
            Employee::new(3, "Citra").with_admin(),
        ];
        GenerationContext::new(employees, shifts, groups, 4, d(6), 2)
    }

    #[test]
    fn test_week_bounds() {
        let ctx = context();
        assert_eq!(ctx.week_start(1), d(13));
        assert_eq!(ctx.end(), d(19));
    }

    #[test]
    fn test_eligibility() {
        let ctx = context();
        assert!(ctx.is_eligible(1, 1));
        assert!(!ctx.is_eligible(1, 3));
        assert!(ctx.is_eligible(3, 3));
        assert!(!ctx.is_eligible(1, 4)); // rest shift
        assert_eq!(ctx.active_shift_ids(), vec![1, 2]);
    }

    #[test]
    fn test_coverage_ignores_rest_rows() {
        let mut ctx = context();
        ctx.assign(1, 1, d(7));
        ctx.assign(2, 1, d(7));
        ctx.mark_rest(3, d(7));
        let cov = ctx.coverage(d(7));
        assert_eq!(cov[&1], 2);
        assert_eq!(cov[&2], 0);
        assert!(ctx.is_resting(3, d(7)));
        assert!(!ctx.is_working(3, d(7)));
    }

    #[test]
    fn test_rest_gap_after_night_shift() {
        let mut ctx = context();
        ctx.assign(1, 2, d(7)); // night, ends 08:00 on the 8th
        assert!(!ctx.respects_rest_gap(1, 1, d(8)));
        assert!(ctx.respects_rest_gap(1, 2, d(8)));
        // Rest rows never conflict.
        assert!(ctx.respects_rest_gap(1, 4, d(8)));
    }

    #[test]
    fn test_fits_rest_window_checks_next_day() {
        let mut ctx = context();
        ctx.assign(1, 1, d(9)); // morning on the 9th
        assert!(ctx.respects_rest_gap(1, 2, d(8)));
        assert!(!ctx.fits_rest_window(1, 2, d(8)));
    }

    #[test]
    fn test_alternative_prefers_own_group() {
        let mut ctx = context();
        ctx.groups.push(1, 1);
        // Group 1 holds Pagi and Admin; Pagi is the only eligible one.
        assert_eq!(ctx.alternative_shift(1, d(7), &[3]), (1, ScheduleStatus::Scheduled));
    }

    #[test]
    fn test_alternative_falls_back_to_least_covered() {
        let mut ctx = context();
        ctx.assign(2, 1, d(7));
        // Employee 1 is in no group: least covered active shift wins.
        assert_eq!(ctx.alternative_shift(1, d(7), &[]), (2, ScheduleStatus::Scheduled));
    }

    #[test]
    fn test_rows_of_non_participants_do_not_cover() {
        let mut ctx = context().with_existing(vec![
            WorkSchedule::scheduled(9, 2, d(7)),
            WorkSchedule::scheduled(1, 1, d(7)),
        ]);
        ctx.assign(2, 1, d(7));
        assert_eq!(ctx.coverage(d(7))[&2], 0);
        assert!(ctx.workers_on(d(7), 2).is_empty());
        assert_eq!(ctx.group_headcount(d(7), 2), 0);
        assert_eq!(ctx.rows_on(d(7)).len(), 2);
        assert!(ctx.generated_rows().iter().all(|r| r.employee_id != 9));
    }

    #[test]
    fn test_alternative_skips_shift_breaking_rest() {
        let mut ctx = context();
        ctx.groups.push(1, 1);
        ctx.assign(1, 2, d(6)); // night, ends 08:00 on the 7th
        // Pagi at 08:00 leaves no rest; Malam is the only usable shift.
        assert_eq!(ctx.alternative_shift(1, d(7), &[3]), (2, ScheduleStatus::Scheduled));
    }

    #[test]
    fn test_alternative_falls_back_to_rest() {
        let ctx = context();
        assert_eq!(
            ctx.alternative_shift(1, d(7), &[1, 2]),
            (4, ScheduleStatus::Absent)
        );
    }
}
