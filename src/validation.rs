//! Input validation for roster generation.
//!
//! Checks structural integrity of employees and shifts before a run.
//! Detects:
//! - Duplicate IDs
//! - Pinned employees referencing missing shifts
//! - Pinned employees fixed to the rest shift
//! - Non-admins pinned to admin-only shifts
//! - Zero-length working shifts
//!
//! Headcount preconditions (at least two employees and two working shifts)
//! are not validation errors; the generator reports them separately.

use crate::models::{Employee, Shift};
use std::collections::{HashMap, HashSet};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// A pinned employee references a shift that doesn't exist.
    InvalidShiftReference,
    /// A pinned employee is fixed to the rest shift.
    PinnedToRestShift,
    /// A non-admin is pinned to an admin-only shift.
    IneligibleFixedShift,
    /// A working shift starts and ends at the same time.
    EmptyShift,
}

impl ValidationError {
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the roster input.
///
/// Checks:
/// 1. No duplicate shift IDs
/// 2. No duplicate employee IDs
/// 3. Working shifts have a non-zero window
/// 4. Pinned employees reference an existing working shift they may work
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(employees: &[Employee], shifts: &[Shift]) -> ValidationResult {
    let mut errors = Vec::new();

    let mut shift_index: HashMap<u64, &Shift> = HashMap::new();
    for s in shifts {
        if shift_index.insert(s.id, s).is_some() {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate shift ID: {}", s.id),
            ));
        }
        if s.is_work() && s.start_time == s.end_time {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyShift,
                format!("Shift '{}' starts and ends at {}", s.name, s.start_time),
            ));
        }
    }

    let mut employee_ids = HashSet::new();
    for e in employees {
        if !employee_ids.insert(e.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate employee ID: {}", e.id),
            ));
        }

        let Some(fixed) = e.fixed_shift() else {
            continue;
        };
        match shift_index.get(&fixed) {
            None => errors.push(ValidationError::new(
                ValidationErrorKind::InvalidShiftReference,
                format!("Employee '{}' is pinned to unknown shift #{}", e.name, fixed),
            )),
            Some(s) if s.is_rest() => errors.push(ValidationError::new(
                ValidationErrorKind::PinnedToRestShift,
                format!("Employee '{}' is pinned to rest shift '{}'", e.name, s.name),
            )),
            Some(s) if !s.admits(e.is_admin) => errors.push(ValidationError::new(
                ValidationErrorKind::IneligibleFixedShift,
                format!(
                    "Employee '{}' is not an admin but is pinned to admin-only shift '{}'",
                    e.name, s.name
                ),
            )),
            Some(_) => {}
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
