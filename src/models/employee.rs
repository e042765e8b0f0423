//! Employee model.
//!
//! Employees are the staff the generator places on shifts. The generator
//! only reads them; lifecycle (hiring, edits, deactivation) happens outside.
//!
//! # Pinned vs rotatable
//! An employee with `rotated == false` and a `shift_id` is *pinned*: every
//! working day they get that shift. Everyone else is *rotatable* and moves
//! between shift groups from week to week.

use serde::{Deserialize, Serialize};

use super::ShiftId;

/// Employee identifier.
pub type EmployeeId = u64;

/// A member of staff that can be scheduled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique employee identifier.
    pub id: EmployeeId,
    /// Display name (used in notifications).
    pub name: String,
    /// Inactive employees are never scheduled.
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Eligible for admin-only shifts.
    #[serde(default)]
    pub is_admin: bool,
    /// `false` pins the employee to `shift_id`.
    #[serde(default = "default_true")]
    pub rotated: bool,
    /// Fixed shift when pinned, otherwise last known or preferred shift.
    #[serde(default)]
    pub shift_id: Option<ShiftId>,
    /// Payroll data, carried but not used for scheduling.
    #[serde(default)]
    pub salary: Option<f64>,
}

fn default_true() -> bool {
    true
}

impl Employee {
    /// Creates an active, rotatable, non-admin employee.
    pub fn new(id: EmployeeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            is_active: true,
            is_admin: false,
            rotated: true,
            shift_id: None,
            salary: None,
        }
    }

    /// Creates an employee pinned to a fixed shift.
    pub fn pinned(id: EmployeeId, name: impl Into<String>, shift_id: ShiftId) -> Self {
        Self::new(id, name).with_fixed_shift(shift_id)
    }

    /// Pins the employee to `shift_id`.
    pub fn with_fixed_shift(mut self, shift_id: ShiftId) -> Self {
        self.rotated = false;
        self.shift_id = Some(shift_id);
        self
    }

    /// Records a preferred shift without pinning.
    pub fn with_preferred_shift(mut self, shift_id: ShiftId) -> Self {
        self.shift_id = Some(shift_id);
        self
    }

    /// Marks the employee as admin staff.
    pub fn with_admin(mut self) -> Self {
        self.is_admin = true;
        self
    }

    /// Marks the employee as inactive.
    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Sets the salary.
    pub fn with_salary(mut self, salary: f64) -> Self {
        self.salary = Some(salary);
        self
    }

    /// The fixed shift of a pinned employee.
    ///
    /// Returns `None` for rotatable employees, including non-rotated ones
    /// without a shift (those are treated as rotatable).
    pub fn fixed_shift(&self) -> Option<ShiftId> {
        if self.rotated {
            None
        } else {
            self.shift_id
        }
    }

    /// Whether the employee is pinned to a fixed shift.
    #[inline]
    pub fn is_pinned(&self) -> bool {
        self.fixed_shift().is_some()
    }

    /// Whether the employee may move between shift groups.
    #[inline]
    pub fn is_rotatable(&self) -> bool {
        !self.is_pinned()
    }
}
