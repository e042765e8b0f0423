//! Employee grouping.
//!
//! Splits employees across shift groups for one rotation cycle.
//!
//! # Algorithm
//! 1. One empty bucket per shift group.
//! 2. Priority mode when there are exactly two groups and the policy says the
//!    first (day) group needs more staff.
//! 3. Targets: priority mode gives group 1 at least
//!    `max(min_group1, ceil(n * share))` and caps group 2 at the remainder;
//!    otherwise an even split with the remainder on the lowest groups.
//! 4. Pinned employees join the group holding their fixed shift.
//! 5. Priority mode: if group 2 is over its cap, its oldest members move to
//!    group 1.
//! 6. Rotatable employees are shuffled and placed one by one (priority mode:
//!    group 2 until capped, then group 1; otherwise the smallest group).
//! 7. No group is left empty while another has more than one member.

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;

use crate::config::StaffingPolicy;
use crate::models::{Employee, EmployeeGroups, EmployeeId, GroupId, ShiftGroups};

/// Per-group headcount targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupTargets {
    /// Whether two-group priority mode applies.
    pub priority: bool,
    /// Floor on group 1 in priority mode.
    pub min_group1: usize,
    /// Ceiling on group 2 in priority mode.
    pub cap_group2: usize,
    /// Even-split target per group (outside priority mode).
    pub even: BTreeMap<GroupId, usize>,
}

/// Partitions employees across shift groups.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmployeeGrouper {
    policy: StaffingPolicy,
}

impl EmployeeGrouper {
    /// Creates a grouper with the given staffing policy.
    pub fn new(policy: StaffingPolicy) -> Self {
        Self { policy }
    }

    /// Whether group 1 must be staffed at least as heavily as group 2.
    pub fn is_priority_mode(&self, shift_groups: &ShiftGroups) -> bool {
        shift_groups.len() == 2 && self.policy.prioritize_first_group
    }

    /// Headcount targets for `total` employees.
    pub fn targets(&self, total: usize, shift_groups: &ShiftGroups) -> GroupTargets {
        let ids = shift_groups.ids();
        let priority = self.is_priority_mode(shift_groups);

        let mut even = BTreeMap::new();
        if !ids.is_empty() {
            let base = total / ids.len();
            let remainder = total % ids.len();
            for (i, &id) in ids.iter().enumerate() {
                even.insert(id, base + usize::from(i < remainder));
            }
        }

        let (min_group1, cap_group2) = if priority {
            let share = (total as f64 * self.policy.priority_share).ceil() as usize;
            let min_group1 = share.max(self.policy.priority_min_group1);
            (min_group1, total.saturating_sub(min_group1))
        } else {
            (
                even.get(&1).copied().unwrap_or(0),
                even.get(&2).copied().unwrap_or(0),
            )
        };

        GroupTargets {
            priority,
            min_group1,
            cap_group2,
            even,
        }
    }

    /// Divides `employees` across `shift_groups`.
    ///
    /// With no shift groups every employee lands in group 1.
    pub fn divide<R: Rng + ?Sized>(
        &self,
        employees: &[Employee],
        shift_groups: &ShiftGroups,
        rng: &mut R,
    ) -> EmployeeGroups {
        if shift_groups.is_empty() {
            let mut groups = EmployeeGroups::with_ids([1]);
            for e in employees {
                groups.push(1, e.id);
            }
            return groups;
        }

        let mut groups = EmployeeGroups::with_ids(shift_groups.ids());
        let targets = self.targets(employees.len(), shift_groups);
        let fallback = shift_groups.first_id().unwrap_or(1);

        for e in employees {
            if let Some(fixed) = e.fixed_shift() {
                let group = shift_groups.group_of(fixed).unwrap_or(fallback);
                groups.push(group, e.id);
            }
        }

        if targets.priority {
            let excess = groups.count(2).saturating_sub(targets.cap_group2);
            for _ in 0..excess {
                let Some(&oldest) = groups.members(2).first() else {
                    break;
                };
                groups.remove(2, oldest);
                groups.push(1, oldest);
            }
        }

        let mut rotatable: Vec<EmployeeId> = employees
            .iter()
            .filter(|e| e.is_rotatable())
            .map(|e| e.id)
            .collect();
        rotatable.shuffle(rng);

        for id in rotatable {
            let target = if targets.priority {
                if groups.count(2) < targets.cap_group2 {
                    2
                } else {
                    1
                }
            } else {
                groups.smallest().unwrap_or(fallback)
            };
            groups.push(target, id);
        }

        fill_empty_groups(&mut groups, |_| true);
        groups
    }
}

/// Gives every empty group one member taken from the largest group, as long
/// as that group keeps at least one member. Only employees accepted by
/// `movable` are taken, newest first.
pub(crate) fn fill_empty_groups(groups: &mut EmployeeGroups, movable: impl Fn(EmployeeId) -> bool) {
    for group in groups.ids() {
        if groups.count(group) > 0 {
            continue;
        }
        let Some(largest) = groups.largest() else {
            return;
        };
        if groups.count(largest) <= 1 {
            continue;
        }
        let candidate = groups
            .members(largest)
            .iter()
            .rev()
            .copied()
            .find(|&id| movable(id));
        if let Some(id) = candidate {
            groups.remove(largest, id);
            groups.push(group, id);
        }
    }
}
