//! Week-over-week rotation.
//!
//! # Algorithm
//! The employee groups are formed once; then, for every week:
//! assign → distribute rest days → repair coverage → rotate (except after
//! the last week).
//!
//! Rotation moves each employee for the next week:
//! - pinned employees return to the group of their fixed shift;
//! - rotatable employees who rested move from group `g` to `(g % N) + 1`;
//! - everyone else stays.
//!
//! The new groups are then rebalanced. In two-group priority mode group 1
//! must end up strictly larger than group 2 while group 2 keeps at least
//! one member; otherwise groups above `ceil(n / N)` hand members to groups
//! below it. Only rotatable employees are ever moved by rebalancing, and no
//! group is left empty while another can spare someone.

use rand::Rng;
use serde::Serialize;
use tracing::{debug, info};

use super::context::GenerationContext;
use super::rest_days::RestDayDistributor;
use super::repair::CoverageRepairer;
use super::weekly::WeeklyAssigner;
use crate::grouping::{fill_empty_groups, EmployeeGrouper};
use crate::models::{EmployeeGroups, EmployeeId, GroupId};

/// Per-week statistics of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WeekStats {
    /// Week index (0-based).
    pub week: u32,
    /// Rows written by the weekly assignment.
    pub assigned: usize,
    /// Rest days granted.
    pub rest_days: usize,
}

/// Drives the weekly pipeline and group rotation.
#[derive(Debug, Clone, Copy, Default)]
pub struct RotationDriver {
    grouper: EmployeeGrouper,
    assigner: WeeklyAssigner,
    distributor: RestDayDistributor,
    repairer: CoverageRepairer,
}

impl RotationDriver {
    /// Creates a driver that groups employees with `grouper`.
    pub fn new(grouper: EmployeeGrouper) -> Self {
        Self {
            grouper,
            ..Self::default()
        }
    }

    /// Forms the initial groups and runs every week of `ctx`.
    pub fn run<R: Rng + ?Sized>(&self, ctx: &mut GenerationContext, rng: &mut R) -> Vec<WeekStats> {
        ctx.groups = self
            .grouper
            .divide(&ctx.employee_list(), &ctx.shift_groups, rng);
        log_groups(&ctx.groups, "initial groups");

        let mut stats = Vec::with_capacity(ctx.weeks as usize);
        for week in 0..ctx.weeks {
            let week_start = ctx.week_start(week);
            ctx.rest_days.clear();

            let assigned = self.assigner.assign_week(ctx, week_start);
            let rest_days = self.distributor.distribute(ctx, week_start, rng);
            self.repairer.repair_week(ctx, week_start, rng);
            info!(week, %week_start, assigned, rest_days, "week generated");
            stats.push(WeekStats {
                week,
                assigned,
                rest_days,
            });

            if week + 1 < ctx.weeks {
                self.rotate_groups(ctx);
            }
        }
        stats
    }

    /// Computes next week's groups from this week's groups and rest days.
    pub fn rotate_groups(&self, ctx: &mut GenerationContext) {
        let total = ctx.groups.len() as GroupId;
        if total == 0 {
            return;
        }
        let first = ctx.groups.ids().first().copied().unwrap_or(1);
        let mut next = EmployeeGroups::with_ids(ctx.groups.ids());

        for employee_id in ctx.groups.all_employees() {
            let Some(employee) = ctx.employees.get(&employee_id) else {
                continue;
            };
            let current = ctx.groups.group_of(employee_id).unwrap_or(first);
            let target = if let Some(fixed) = employee.fixed_shift() {
                ctx.shift_groups.group_of(fixed).unwrap_or(first)
            } else if let Some(rest) = ctx.rest_days.get(&employee_id) {
                (rest.prev_group % total) + 1
            } else {
                current
            };
            next.push(target, employee_id);
        }

        let priority = self.grouper.is_priority_mode(&ctx.shift_groups);
        let rotatable = |id: EmployeeId| ctx.employees.get(&id).is_some_and(|e| e.is_rotatable());
        balance_groups(&mut next, priority, rotatable);
        log_groups(&next, "rotated groups");
        ctx.groups = next;
    }
}

/// Rebalances rotated groups, moving only employees accepted by `movable`.
pub fn balance_groups(
    groups: &mut EmployeeGroups,
    priority: bool,
    movable: impl Fn(EmployeeId) -> bool,
) {
    if priority {
        while groups.count(1) <= groups.count(2) && groups.count(2) > 1 {
            let Some(id) = newest_movable(groups, 2, &movable) else {
                break;
            };
            groups.remove(2, id);
            groups.push(1, id);
        }
        fill_empty_groups(groups, &movable);
        return;
    }

    fill_empty_groups(groups, &movable);
    let ids = groups.ids();
    if ids.is_empty() {
        return;
    }
    let target = groups.total().div_ceil(ids.len());
    loop {
        let Some(&under) = ids
            .iter()
            .filter(|&&g| groups.count(g) < target)
            .min_by_key(|&&g| (groups.count(g), g))
        else {
            break;
        };
        let donor = ids
            .iter()
            .copied()
            .filter(|&g| groups.count(g) > target)
            .find_map(|g| newest_movable(groups, g, &movable).map(|id| (g, id)));
        let Some((from, id)) = donor else {
            break;
        };
        groups.remove(from, id);
        groups.push(under, id);
    }
}

fn newest_movable(
    groups: &EmployeeGroups,
    group: GroupId,
    movable: &impl Fn(EmployeeId) -> bool,
) -> Option<EmployeeId> {
    groups
        .members(group)
        .iter()
        .rev()
        .copied()
        .find(|&id| movable(id))
}

fn log_groups(groups: &EmployeeGroups, what: &str) {
    for (group, members) in groups.iter() {
        debug!(group, size = members.len(), ?members, "{what}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GroupingStrategy;
    use crate::generator::context::RestDay;
    use crate::grouping::ShiftGrouper;
    use crate::models::{Employee, ScheduleStatus, Shift};
    use chrono::NaiveDate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, day).unwrap()
    }

    fn shifts() -> Vec<Shift> {
        vec![
            Shift::hours(1, "Pagi", 8, 16),
            Shift::hours(2, "Malam", 20, 8),
            Shift::rest(3, "Off Day"),
        ]
    }

    fn context(employees: Vec<Employee>, weeks: u32) -> GenerationContext {
        let shifts = shifts();
        let groups = ShiftGrouper::new(GroupingStrategy::TimeOfDay).group(&shifts);
        GenerationContext::new(employees, shifts, groups, 3, d(6), weeks)
    }

    #[test]
    fn test_rested_employee_moves_to_next_group() {
        let employees = (1..=5).map(|i| Employee::new(i, format!("E{i}"))).collect();
        let mut ctx = context(employees, 2);
        let mut groups = EmployeeGroups::with_ids([1, 2]);
        for e in [1, 2, 3] {
            groups.push(1, e);
        }
        for e in [4, 5] {
            groups.push(2, e);
        }
        ctx.groups = groups;
        ctx.rest_days.insert(4, RestDay { date: d(7), prev_group: 2 });
        ctx.rest_days.insert(1, RestDay { date: d(8), prev_group: 1 });

        RotationDriver::default().rotate_groups(&mut ctx);
        // 4 wraps to group 1; 1 moves to group 2. Group 1 still leads 3 to 2.
        assert_eq!(ctx.groups.group_of(4), Some(1));
        assert_eq!(ctx.groups.group_of(1), Some(2));
        assert_eq!(ctx.groups.count(1), 3);
        assert_eq!(ctx.groups.count(2), 2);
    }

    #[test]
    fn test_pinned_employee_returns_to_fixed_group() {
        let employees = vec![
            Employee::pinned(1, "Malam", 2),
            Employee::new(2, "R1"),
            Employee::new(3, "R2"),
        ];
        let mut ctx = context(employees, 2);
        let mut groups = EmployeeGroups::with_ids([1, 2]);
        groups.push(1, 1);
        groups.push(1, 2);
        groups.push(2, 3);
        ctx.groups = groups;
        ctx.rest_days.insert(1, RestDay { date: d(7), prev_group: 1 });

        RotationDriver::default().rotate_groups(&mut ctx);
        assert_eq!(ctx.groups.group_of(1), Some(2));
    }

    #[test]
    fn test_priority_balance_keeps_one_in_group2() {
        let mut groups = EmployeeGroups::with_ids([1, 2]);
        groups.push(1, 1);
        for e in [2, 3, 4] {
            groups.push(2, e);
        }
        balance_groups(&mut groups, true, |_| true);
        assert_eq!(groups.count(1), 3);
        assert_eq!(groups.count(2), 1);
    }

    #[test]
    fn test_priority_balance_skips_pinned() {
        let mut groups = EmployeeGroups::with_ids([1, 2]);
        groups.push(1, 1);
        groups.push(2, 2);
        groups.push(2, 3);
        balance_groups(&mut groups, true, |id| id != 3);
        assert_eq!(groups.members(1), &[1, 2]);
        assert_eq!(groups.members(2), &[3]);
    }

    #[test]
    fn test_even_balance_levels_groups() {
        let mut groups = EmployeeGroups::with_ids([1, 2, 3]);
        for e in 1..=6 {
            groups.push(1, e);
        }
        balance_groups(&mut groups, false, |_| true);
        assert_eq!(groups.count(1), 2);
        assert_eq!(groups.count(2), 2);
        assert_eq!(groups.count(3), 2);
    }

    #[test]
    fn test_run_generates_every_week() {
        let employees = (1..=6).map(|i| Employee::new(i, format!("E{i}"))).collect();
        let mut ctx = context(employees, 3);
        let mut rng = StdRng::seed_from_u64(42);
        let stats = RotationDriver::default().run(&mut ctx, &mut rng);
        assert_eq!(stats.len(), 3);
        assert!(stats.iter().all(|s| s.rest_days > 0));

        for offset in 0..21 {
            let date = d(6) + chrono::TimeDelta::days(offset);
            let cov = ctx.coverage(date);
            assert!(cov.values().all(|&c| c >= 1), "uncovered shift on {date}");
        }
        let rests = ctx
            .roster
            .iter()
            .filter(|r| r.status == ScheduleStatus::Absent)
            .count();
        assert!(rests > 0);
    }
}
