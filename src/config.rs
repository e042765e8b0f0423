//! Generator configuration.
//!
//! Every tunable the generator uses lives here with its default. Values can
//! come from a JSON file (missing keys fall back to defaults) or from
//! `ROSTER_*` environment variables.

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::models::ShiftId;

/// Share of headcount group 1 gets in two-group priority mode.
pub const DEFAULT_PRIORITY_SHARE: f64 = 0.6;
/// Minimum size of group 1 in two-group priority mode.
pub const DEFAULT_PRIORITY_MIN_GROUP1: usize = 2;
/// Minimum hours between the end of one shift and the start of the next.
pub const DEFAULT_MIN_REST_HOURS: i64 = 11;
/// Upper bound on weeks generated in one run.
pub const DEFAULT_MAX_WEEKS: u32 = 12;

/// How working shifts are partitioned into rotation groups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupingStrategy {
    /// Morning / afternoon / night buckets by start hour.
    #[default]
    TimeOfDay,
    /// Every working shift is its own group.
    PerShift,
}

impl FromStr for GroupingStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "time_of_day" | "time-of-day" => Ok(GroupingStrategy::TimeOfDay),
            "per_shift" | "per-shift" => Ok(GroupingStrategy::PerShift),
            other => Err(other.to_string()),
        }
    }
}

/// Staffing split between rotation groups.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaffingPolicy {
    /// With exactly two groups, staff group 1 more heavily than group 2.
    pub prioritize_first_group: bool,
    /// Share of headcount group 1 targets in priority mode (0.5..=1.0).
    pub priority_share: f64,
    /// Floor on group 1 size in priority mode.
    pub priority_min_group1: usize,
}

impl Default for StaffingPolicy {
    fn default() -> Self {
        Self {
            prioritize_first_group: true,
            priority_share: DEFAULT_PRIORITY_SHARE,
            priority_min_group1: DEFAULT_PRIORITY_MIN_GROUP1,
        }
    }
}

/// Generator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Group split rules.
    pub staffing: StaffingPolicy,
    /// Shift grouping strategy.
    pub grouping: GroupingStrategy,
    /// Minimum rest between consecutive shifts, in hours.
    pub min_rest_hours: i64,
    /// Largest accepted `weeks` argument.
    pub max_weeks: u32,
    /// Explicit rest shift; otherwise the first rest-category shift is used.
    pub rest_shift_id: Option<ShiftId>,
    /// Name given to a rest shift created on demand.
    pub rest_shift_name: String,
    /// Schedule admin employees together with everyone else.
    pub include_admins: bool,
    /// Where the summary notification goes; `None` disables it.
    pub notify_destination: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            staffing: StaffingPolicy::default(),
            grouping: GroupingStrategy::default(),
            min_rest_hours: DEFAULT_MIN_REST_HOURS,
            max_weeks: DEFAULT_MAX_WEEKS,
            rest_shift_id: None,
            rest_shift_name: "Off Day".to_string(),
            include_admins: true,
            notify_destination: None,
        }
    }
}

impl GeneratorConfig {
    /// Minimum rest as a duration.
    pub fn min_rest(&self) -> TimeDelta {
        TimeDelta::try_hours(self.min_rest_hours).unwrap_or(TimeDelta::zero())
    }

    /// Sets the minimum rest in hours.
    pub fn with_min_rest_hours(mut self, hours: i64) -> Self {
        self.min_rest_hours = hours;
        self
    }

    /// Sets the notification destination.
    pub fn with_notify_destination(mut self, destination: impl Into<String>) -> Self {
        self.notify_destination = Some(destination.into());
        self
    }

    /// Uses an explicit rest shift.
    pub fn with_rest_shift(mut self, shift_id: ShiftId) -> Self {
        self.rest_shift_id = Some(shift_id);
        self
    }

    /// Loads a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.checked()
    }

    /// Builds a config from defaults overridden by `ROSTER_*` variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(v) = env_parse::<f64>("ROSTER_PRIORITY_SHARE")? {
            config.staffing.priority_share = v;
        }
        if let Some(v) = env_parse::<bool>("ROSTER_PRIORITIZE_FIRST_GROUP")? {
            config.staffing.prioritize_first_group = v;
        }
        if let Some(v) = env_parse::<i64>("ROSTER_MIN_REST_HOURS")? {
            config.min_rest_hours = v;
        }
        if let Some(v) = env_parse::<u32>("ROSTER_MAX_WEEKS")? {
            config.max_weeks = v;
        }
        if let Some(v) = env_parse::<ShiftId>("ROSTER_REST_SHIFT_ID")? {
            config.rest_shift_id = Some(v);
        }
        if let Some(v) = env_parse::<GroupingStrategy>("ROSTER_GROUPING")? {
            config.grouping = v;
        }
        if let Some(v) = env_parse::<bool>("ROSTER_INCLUDE_ADMINS")? {
            config.include_admins = v;
        }
        if let Ok(v) = env::var("ROSTER_REST_SHIFT_NAME") {
            config.rest_shift_name = v;
        }
        if let Ok(v) = env::var("ROSTER_NOTIFY_DESTINATION") {
            if !v.trim().is_empty() {
                config.notify_destination = Some(v);
            }
        }
        config.checked()
    }

    /// Rejects values the generator cannot work with.
    pub fn checked(self) -> Result<Self, ConfigError> {
        let share = self.staffing.priority_share;
        if !(0.5..=1.0).contains(&share) {
            return Err(ConfigError::InvalidValue {
                key: "priority_share",
                value: share.to_string(),
            });
        }
        if self.min_rest_hours < 0 || self.min_rest_hours > 24 {
            return Err(ConfigError::InvalidValue {
                key: "min_rest_hours",
                value: self.min_rest_hours.to_string(),
            });
        }
        if self.max_weeks == 0 {
            return Err(ConfigError::InvalidValue {
                key: "max_weeks",
                value: "0".to_string(),
            });
        }
        Ok(self)
    }
}

fn env_parse<T: FromStr>(key: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
        Err(_) => Ok(None),
    }
}
