//! Error types.
//!
//! Each layer has its own enum; generator errors wrap store errors so `?`
//! works across the seam.

use thiserror::Error;

use crate::models::{EmployeeId, ShiftId};
use crate::validation::ValidationError;

/// Failure of the persistence collaborator.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("store document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no transaction is open")]
    NoTransaction,
    #[error("a transaction is already open")]
    TransactionOpen,
    #[error("unknown employee #{0}")]
    UnknownEmployee(EmployeeId),
    #[error("unknown shift #{0}")]
    UnknownShift(ShiftId),
}

/// Failure of a generation run.
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("not enough active employees to generate a schedule (found {found}, need 2)")]
    NotEnoughEmployees { found: usize },
    #[error("not enough working shifts to generate a schedule (found {found}, need 2)")]
    NotEnoughShifts { found: usize },
    #[error("weeks must be between 1 and {max} (got {weeks})")]
    InvalidWeeks { weeks: u32, max: u32 },
    #[error("configured rest shift #{0} does not exist or is not a rest shift")]
    InvalidRestShift(ShiftId),
    #[error("invalid roster input: {}", summarize(.0))]
    InvalidInput(Vec<ValidationError>),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failure to deliver a notification.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("notification transport failed: {0}")]
    Transport(String),
    #[error("no notification destination configured")]
    MissingDestination,
}

/// Failure to load configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("config file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
