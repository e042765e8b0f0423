//! Coverage repair.
//!
//! Runs after assignment and rest-day distribution, once per week:
//!
//! 1. **Admin audit**: any non-admin on an admin-only shift is rerouted.
//! 2. **Day/night balance**: with two or more groups, when group 1 is not
//!    staffed above group 2 on a day, rotatable group-2 workers move to a
//!    random eligible group-1 shift.
//! 3. **Gap fill**: every active shift left with nobody on a day takes one
//!    employee, from the first tier that has a candidate:
//!    - a worker on another active shift staffed by more than one;
//!    - an employee resting that day (the rest day is given up);
//!    - a worker on any other active shift.
//!
//! No pass ever writes a shift that leaves less than the minimum rest
//! against the employee's shift on the day before or after. Within a tier,
//! rotatable employees are preferred over pinned ones; employee id breaks
//! ties. Only participants of the run are counted or moved.

use chrono::{NaiveDate, TimeDelta};
use rand::prelude::IndexedRandom;
use rand::Rng;
use std::collections::BTreeMap;
use tracing::debug;

use super::context::{GenerationContext, DAYS_PER_WEEK};
use crate::models::{EmployeeId, ScheduleStatus, ShiftId};

/// Repairs admin violations, group imbalance and coverage gaps.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoverageRepairer;

impl CoverageRepairer {
    pub fn new() -> Self {
        Self
    }

    /// Runs all three passes over the week starting at `week_start`.
    pub fn repair_week<R: Rng + ?Sized>(
        &self,
        ctx: &mut GenerationContext,
        week_start: NaiveDate,
        rng: &mut R,
    ) {
        self.audit_admin_shifts(ctx, week_start);
        for date in week_dates(week_start) {
            self.balance_day(ctx, date, rng);
        }
        self.fill_gaps(ctx, week_start);
    }

    /// Reroutes non-admins off admin-only shifts. Returns the number of rows
    /// changed.
    pub fn audit_admin_shifts(&self, ctx: &mut GenerationContext, week_start: NaiveDate) -> usize {
        let end = week_start + TimeDelta::days(DAYS_PER_WEEK - 1);
        let violations: Vec<(EmployeeId, NaiveDate, ShiftId)> = ctx
            .roster
            .between(week_start, end)
            .into_iter()
            .filter(|r| {
                let admin_only = ctx.shifts.get(&r.shift_id).is_some_and(|s| s.is_admin_only());
                let non_admin = ctx.employees.get(&r.employee_id).is_some_and(|e| !e.is_admin);
                admin_only && non_admin
            })
            .map(|r| (r.employee_id, r.date, r.shift_id))
            .collect();

        for &(employee_id, date, shift_id) in &violations {
            let to = ctx.reroute(employee_id, date, &[shift_id]);
            debug!(employee_id, %date, from = shift_id, to, "admin-only shift rerouted");
        }
        violations.len()
    }

    /// Moves rotatable group-2 workers to group 1 when group 1 is not the
    /// larger group on `date`. Returns the number of moves.
    pub fn balance_day<R: Rng + ?Sized>(
        &self,
        ctx: &mut GenerationContext,
        date: NaiveDate,
        rng: &mut R,
    ) -> usize {
        if ctx.shift_groups.len() < 2 {
            return 0;
        }
        let g1 = ctx.group_headcount(date, 1);
        let g2 = ctx.group_headcount(date, 2);
        if g1 > g2 {
            return 0;
        }
        let wanted = (g2 - g1 + 1).min(g2.saturating_sub(1));
        if wanted == 0 {
            return 0;
        }

        let group1 = ctx.shift_groups.shifts(1).to_vec();
        let group2 = ctx.shift_groups.shifts(2).to_vec();
        let mut candidates: Vec<(EmployeeId, ShiftId)> = group2
            .iter()
            .flat_map(|&s| ctx.workers_on(date, s).into_iter().map(move |e| (e, s)))
            .filter(|(e, _)| ctx.employees.get(e).is_some_and(|e| e.is_rotatable()))
            .collect();
        candidates.sort_unstable();

        let mut moved = 0;
        for (employee_id, from) in candidates {
            if moved == wanted {
                break;
            }
            let targets: Vec<ShiftId> = group1
                .iter()
                .copied()
                .filter(|&s| ctx.is_eligible(employee_id, s) && ctx.fits_rest_window(employee_id, s, date))
                .collect();
            let Some(&to) = targets.choose(rng) else {
                continue;
            };
            ctx.assign(employee_id, to, date);
            moved += 1;
            debug!(employee_id, %date, from, to, "moved to day group");
        }
        moved
    }

    /// Gives every uncovered active shift one employee on each day of the
    /// week. Returns the number of moves.
    pub fn fill_gaps(&self, ctx: &mut GenerationContext, week_start: NaiveDate) -> usize {
        let mut moves = 0;
        for date in week_dates(week_start) {
            for shift_id in ctx.active_shift_ids() {
                if ctx.coverage(date).get(&shift_id).copied().unwrap_or(0) > 0 {
                    continue;
                }
                match self.find_cover(ctx, date, shift_id) {
                    Some(employee_id) => {
                        if ctx.is_resting(employee_id, date) {
                            ctx.rest_days.remove(&employee_id);
                        }
                        ctx.assign(employee_id, shift_id, date);
                        moves += 1;
                        debug!(employee_id, %date, shift_id, "coverage gap filled");
                    }
                    None => debug!(%date, shift_id, "coverage gap left open: no candidate"),
                }
            }
        }
        moves
    }

    /// Whether `employee_id` can rest on `date` without leaving their shift
    /// uncovered: either someone else stays on it, or a rotatable worker from
    /// an over-staffed shift can move over within the rest rules.
    pub fn rest_is_coverable(&self, ctx: &GenerationContext, employee_id: EmployeeId, date: NaiveDate) -> bool {
        let Some(shift_id) = ctx.working_shift(employee_id, date).map(|s| s.id) else {
            return true;
        };
        let coverage = ctx.coverage(date);
        match coverage.get(&shift_id) {
            Some(&count) if count <= 1 => {
                let donors = donors(ctx, &coverage, date, shift_id, 2);
                best_candidate(ctx, date, shift_id, donors)
                    .is_some_and(|e| ctx.employees.get(&e).is_some_and(|emp| emp.is_rotatable()))
            }
            _ => true,
        }
    }

    /// Best candidate to cover `shift_id` on `date`.
    fn find_cover(&self, ctx: &GenerationContext, date: NaiveDate, shift_id: ShiftId) -> Option<EmployeeId> {
        let coverage = ctx.coverage(date);
        let resting: Vec<EmployeeId> = ctx
            .rows_on(date)
            .into_iter()
            .filter(|r| r.status == ScheduleStatus::Absent && r.shift_id == ctx.rest_shift_id)
            .map(|r| r.employee_id)
            .collect();

        [
            donors(ctx, &coverage, date, shift_id, 2),
            resting,
            donors(ctx, &coverage, date, shift_id, 1),
        ]
        .into_iter()
        .find_map(|tier| best_candidate(ctx, date, shift_id, tier))
    }
}

/// Workers of active shifts other than `shift_id` staffed by at least `min`.
fn donors(
    ctx: &GenerationContext,
    coverage: &BTreeMap<ShiftId, usize>,
    date: NaiveDate,
    shift_id: ShiftId,
    min: usize,
) -> Vec<EmployeeId> {
    coverage
        .iter()
        .filter(|&(&s, &count)| s != shift_id && count >= min)
        .flat_map(|(&s, _)| ctx.workers_on(date, s))
        .collect()
}

fn best_candidate(
    ctx: &GenerationContext,
    date: NaiveDate,
    shift_id: ShiftId,
    candidates: Vec<EmployeeId>,
) -> Option<EmployeeId> {
    candidates
        .into_iter()
        .filter(|&e| ctx.is_eligible(e, shift_id) && ctx.fits_rest_window(e, shift_id, date))
        .min_by_key(|&e| {
            let pinned = ctx.employees.get(&e).is_some_and(|emp| emp.is_pinned());
            (pinned, e)
        })
}

fn week_dates(week_start: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    (0..DAYS_PER_WEEK).map(move |offset| week_start + TimeDelta::days(offset))
}
