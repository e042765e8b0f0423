//! Shift model.
//!
//! A shift is a named daily time window (`start_time`..`end_time`). Shifts
//! whose end is at or before their start cross midnight and finish on the
//! following calendar day.
//!
//! # Typed attributes
//! Whether a shift means "not working" and whether it is reserved for admin
//! staff are explicit fields (`category`, `restricted_to`). Legacy records
//! that only carry a name go through [`Shift::infer`] once, at import time.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};
use serde::{Deserialize, Serialize};

/// Shift identifier.
pub type ShiftId = u64;

const REST_MARKERS: [&str; 4] = ["off", "libur", "rest", "free"];
const ADMIN_MARKERS: [&str; 3] = ["admin", "kantor", "office"];

/// A daily working (or resting) time window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shift {
    /// Unique shift identifier.
    pub id: ShiftId,
    /// Display name.
    pub name: String,
    /// Start of the shift.
    pub start_time: NaiveTime,
    /// End of the shift (next day when `<= start_time`).
    pub end_time: NaiveTime,
    /// Work or rest.
    #[serde(default)]
    pub category: ShiftCategory,
    /// Who may be assigned.
    #[serde(default)]
    pub restricted_to: ShiftRestriction,
}

/// Whether a shift is working time or the rest sentinel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftCategory {
    /// Regular working shift.
    #[default]
    Work,
    /// "Off" sentinel: the employee is not working that day.
    Rest,
}

/// Eligibility restriction on a shift.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftRestriction {
    /// Anyone may work it.
    #[default]
    None,
    /// Only admin employees may work it.
    AdminOnly,
}

/// Time-of-day bucket of a shift start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimeBucket {
    /// Start hour in [4, 12).
    Morning,
    /// Start hour in [12, 18).
    Afternoon,
    /// Start hour in [18, 24) or [0, 4).
    Night,
}

impl TimeBucket {
    /// Buckets an hour of day (0..24).
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            4..=11 => TimeBucket::Morning,
            12..=17 => TimeBucket::Afternoon,
            _ => TimeBucket::Night,
        }
    }
}

/// Fields needed to create a shift; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewShift {
    pub name: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub category: ShiftCategory,
    pub restricted_to: ShiftRestriction,
}

impl NewShift {
    /// A whole-day rest shift.
    pub fn rest(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start_time: NaiveTime::MIN,
            end_time: NaiveTime::from_hms_opt(23, 59, 0).unwrap_or(NaiveTime::MIN),
            category: ShiftCategory::Rest,
            restricted_to: ShiftRestriction::None,
        }
    }

    /// Materializes the shift under `id`.
    pub fn with_id(self, id: ShiftId) -> Shift {
        Shift {
            id,
            name: self.name,
            start_time: self.start_time,
            end_time: self.end_time,
            category: self.category,
            restricted_to: self.restricted_to,
        }
    }
}

impl Shift {
    /// Creates an unrestricted working shift.
    pub fn new(
        id: ShiftId,
        name: impl Into<String>,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            start_time,
            end_time,
            category: ShiftCategory::Work,
            restricted_to: ShiftRestriction::None,
        }
    }

    /// Creates a working shift from whole hours.
    ///
    /// Hours outside 0..24 are clamped to midnight.
    pub fn hours(id: ShiftId, name: impl Into<String>, start_hour: u32, end_hour: u32) -> Self {
        Self::new(id, name, hour(start_hour), hour(end_hour))
    }

    /// Creates a rest shift spanning the whole day.
    pub fn rest(id: ShiftId, name: impl Into<String>) -> Self {
        NewShift::rest(name).with_id(id)
    }

    /// Builds a shift from a legacy record, deriving the typed attributes
    /// from the name.
    ///
    /// Names containing off/libur/rest/free become rest shifts; names
    /// containing admin/kantor/office become admin-only.
    pub fn infer(
        id: ShiftId,
        name: impl Into<String>,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> Self {
        let name = name.into();
        let lower = name.to_lowercase();
        let category = if REST_MARKERS.iter().any(|m| lower.contains(m)) {
            ShiftCategory::Rest
        } else {
            ShiftCategory::Work
        };
        let restricted_to = if ADMIN_MARKERS.iter().any(|m| lower.contains(m)) {
            ShiftRestriction::AdminOnly
        } else {
            ShiftRestriction::None
        };
        Self {
            id,
            name,
            start_time,
            end_time,
            category,
            restricted_to,
        }
    }

    /// Restricts the shift to admin employees.
    pub fn admin_only(mut self) -> Self {
        self.restricted_to = ShiftRestriction::AdminOnly;
        self
    }

    /// Whether this is the rest sentinel.
    #[inline]
    pub fn is_rest(&self) -> bool {
        self.category == ShiftCategory::Rest
    }

    /// Whether this is a working shift.
    #[inline]
    pub fn is_work(&self) -> bool {
        self.category == ShiftCategory::Work
    }

    /// Whether only admins may work this shift.
    #[inline]
    pub fn is_admin_only(&self) -> bool {
        self.restricted_to == ShiftRestriction::AdminOnly
    }

    /// Hour component of the start time.
    #[inline]
    pub fn start_hour(&self) -> u32 {
        self.start_time.hour()
    }

    /// Time-of-day bucket of the start time.
    pub fn bucket(&self) -> TimeBucket {
        TimeBucket::from_hour(self.start_hour())
    }

    /// Whether the shift ends on the calendar day after it starts.
    #[inline]
    pub fn crosses_midnight(&self) -> bool {
        self.end_time <= self.start_time
    }

    /// Length of the shift.
    pub fn duration(&self) -> TimeDelta {
        let span = self.end_time - self.start_time;
        if self.crosses_midnight() {
            span + TimeDelta::days(1)
        } else {
            span
        }
    }

    /// Start instant when worked on `date`.
    pub fn start_on(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(self.start_time)
    }

    /// End instant when started on `date`.
    pub fn end_on(&self, date: NaiveDate) -> NaiveDateTime {
        self.start_on(date) + self.duration()
    }

    /// Whether `employee_is_admin` satisfies the shift's restriction.
    #[inline]
    pub fn admits(&self, employee_is_admin: bool) -> bool {
        !self.is_admin_only() || employee_is_admin
    }

    /// `HH:MM-HH:MM` label used in summaries.
    pub fn time_label(&self) -> String {
        format!(
            "{}-{}",
            self.start_time.format("%H:%M"),
            self.end_time.format("%H:%M")
        )
    }
}

/// Rest between finishing `prev` started on `prev_date` and starting `next`
/// on `next_date`. Negative when the two overlap.
pub fn rest_gap(prev: &Shift, prev_date: NaiveDate, next: &Shift, next_date: NaiveDate) -> TimeDelta {
    next.start_on(next_date) - prev.end_on(prev_date)
}

fn hour(h: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, 0, 0).unwrap_or(NaiveTime::MIN)
}
