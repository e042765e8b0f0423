//! Shift groups and employee groups.
//!
//! Both are derived, in-memory mappings recomputed on every generation run.
//! Group ids are contiguous and start at 1; group 1 is the earliest
//! time-of-day bucket.

use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;

use super::{EmployeeId, ShiftId};

/// Group identifier (1-based).
pub type GroupId = u32;

/// Mapping from group id to the ordered shifts of that group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShiftGroups {
    groups: BTreeMap<GroupId, Vec<ShiftId>>,
}

impl ShiftGroups {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a group with the next free id. Empty groups are ignored.
    pub fn push(&mut self, shifts: Vec<ShiftId>) -> Option<GroupId> {
        if shifts.is_empty() {
            return None;
        }
        let id = self.groups.len() as GroupId + 1;
        self.groups.insert(id, shifts);
        Some(id)
    }

    /// Shifts of a group.
    pub fn shifts(&self, group: GroupId) -> &[ShiftId] {
        self.groups.get(&group).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Group containing `shift_id`.
    pub fn group_of(&self, shift_id: ShiftId) -> Option<GroupId> {
        self.groups
            .iter()
            .find(|(_, shifts)| shifts.contains(&shift_id))
            .map(|(&id, _)| id)
    }

    /// Shift a group works on `date`.
    ///
    /// Multi-shift groups cycle through their shifts by day of week
    /// (Sunday = 0).
    pub fn shift_for(&self, group: GroupId, date: NaiveDate) -> Option<ShiftId> {
        let shifts = self.shifts(group);
        if shifts.is_empty() {
            return None;
        }
        let day = date.weekday().num_days_from_sunday() as usize;
        Some(shifts[day % shifts.len()])
    }

    /// Group ids in ascending order.
    pub fn ids(&self) -> Vec<GroupId> {
        self.groups.keys().copied().collect()
    }

    /// Lowest group id.
    pub fn first_id(&self) -> Option<GroupId> {
        self.groups.keys().next().copied()
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether there are no groups.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Iterates `(group, shifts)` in id order.
    pub fn iter(&self) -> impl Iterator<Item = (GroupId, &[ShiftId])> {
        self.groups.iter().map(|(&id, s)| (id, s.as_slice()))
    }
}

/// Mapping from group id to employees for one rotation cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeeGroups {
    groups: BTreeMap<GroupId, Vec<EmployeeId>>,
}

impl EmployeeGroups {
    /// One empty bucket per id.
    pub fn with_ids(ids: impl IntoIterator<Item = GroupId>) -> Self {
        Self {
            groups: ids.into_iter().map(|id| (id, Vec::new())).collect(),
        }
    }

    /// Appends an employee to a group, creating the group if needed.
    pub fn push(&mut self, group: GroupId, employee_id: EmployeeId) {
        self.groups.entry(group).or_default().push(employee_id);
    }

    /// Removes a specific employee from a group.
    pub fn remove(&mut self, group: GroupId, employee_id: EmployeeId) -> bool {
        match self.groups.get_mut(&group) {
            Some(members) => match members.iter().position(|&e| e == employee_id) {
                Some(pos) => {
                    members.remove(pos);
                    true
                }
                None => false,
            },
            None => false,
        }
    }

    /// Members of a group.
    pub fn members(&self, group: GroupId) -> &[EmployeeId] {
        self.groups.get(&group).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of members of a group.
    pub fn count(&self, group: GroupId) -> usize {
        self.members(group).len()
    }

    /// Group an employee belongs to.
    pub fn group_of(&self, employee_id: EmployeeId) -> Option<GroupId> {
        self.groups
            .iter()
            .find(|(_, members)| members.contains(&employee_id))
            .map(|(&id, _)| id)
    }

    /// Group with the most members (lowest id on ties).
    pub fn largest(&self) -> Option<GroupId> {
        self.groups
            .iter()
            .max_by(|a, b| a.1.len().cmp(&b.1.len()).then(b.0.cmp(a.0)))
            .map(|(&id, _)| id)
    }

    /// Group with the fewest members (lowest id on ties).
    pub fn smallest(&self) -> Option<GroupId> {
        self.groups
            .iter()
            .min_by(|a, b| a.1.len().cmp(&b.1.len()).then(a.0.cmp(b.0)))
            .map(|(&id, _)| id)
    }

    /// Group ids in ascending order.
    pub fn ids(&self) -> Vec<GroupId> {
        self.groups.keys().copied().collect()
    }

    /// Every employee across all groups, in group order.
    pub fn all_employees(&self) -> Vec<EmployeeId> {
        self.groups.values().flatten().copied().collect()
    }

    /// Total number of members.
    pub fn total(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether there are no groups.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Iterates `(group, members)` in id order.
    pub fn iter(&self) -> impl Iterator<Item = (GroupId, &[EmployeeId])> {
        self.groups.iter().map(|(&id, m)| (id, m.as_slice()))
    }
}
