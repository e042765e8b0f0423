//! Rest-day distribution.
//!
//! # Algorithm
//! 1. Collect the week's grouped employees and shuffle them.
//! 2. Keep at most seven (one per weekday).
//! 3. Each takes the first unclaimed day of the week on which they have a
//!    working row and whose shift stays covered without breaking anyone's
//!    minimum rest; when no day qualifies, the first unclaimed working day.
//!    That row becomes an absence on the rest shift.
//! 4. Record `(date, group)` for rotation, then fill any coverage gap the
//!    rest days opened.

use chrono::{NaiveDate, TimeDelta};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeSet;
use tracing::debug;

use super::context::{GenerationContext, RestDay, DAYS_PER_WEEK};
use super::repair::CoverageRepairer;
use crate::models::EmployeeId;

/// Grants at most one rest day per calendar day in a week.
#[derive(Debug, Clone, Copy, Default)]
pub struct RestDayDistributor {
    repairer: CoverageRepairer,
}

impl RestDayDistributor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Distributes rest days for the week starting at `week_start`.
    ///
    /// Returns the number of rest days granted.
    pub fn distribute<R: Rng + ?Sized>(
        &self,
        ctx: &mut GenerationContext,
        week_start: NaiveDate,
        rng: &mut R,
    ) -> usize {
        let mut employees: Vec<EmployeeId> = ctx.groups.all_employees();
        employees.shuffle(rng);
        employees.truncate(DAYS_PER_WEEK as usize);

        let days: Vec<NaiveDate> = (0..DAYS_PER_WEEK)
            .map(|offset| week_start + TimeDelta::days(offset))
            .collect();
        let mut claimed: BTreeSet<NaiveDate> = BTreeSet::new();

        for employee_id in employees {
            let free_days: Vec<NaiveDate> = days
                .iter()
                .copied()
                .filter(|d| !claimed.contains(d) && ctx.is_working(employee_id, *d))
                .collect();
            let Some(&first) = free_days.first() else {
                debug!(employee_id, %week_start, "no free working day for a rest day");
                continue;
            };
            let date = free_days
                .iter()
                .copied()
                .find(|&d| self.repairer.rest_is_coverable(ctx, employee_id, d))
                .unwrap_or(first);
            claimed.insert(date);
            let prev_group = ctx
                .groups
                .group_of(employee_id)
                .or_else(|| ctx.shift_groups.first_id())
                .unwrap_or(1);
            ctx.mark_rest(employee_id, date);
            ctx.rest_days.insert(employee_id, RestDay { date, prev_group });
            debug!(employee_id, %date, "rest day granted");
        }

        self.repairer.fill_gaps(ctx, week_start);
        claimed.len()
    }
}
