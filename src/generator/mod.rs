//! Schedule generation.
//!
//! [`ScheduleGenerator`] is the entry point: it checks preconditions, loads
//! employees, shifts and existing rows from a [`ScheduleStore`], runs the
//! weekly pipeline in memory, writes the changed rows in one transaction and
//! sends a summary through a [`NotificationSender`].
//!
//! # Algorithm
//!
//! 1. Shifts are grouped by time of day ([`ShiftGrouper`]).
//! 2. Employees are split across the groups ([`EmployeeGrouper`]).
//! 3. Each week: [`WeeklyAssigner`] → [`RestDayDistributor`] →
//!    [`CoverageRepairer`] → rotation ([`RotationDriver`]).
//!
//! The result is a heuristic roster, not an optimal one: every step is a
//! greedy pass that repairs what earlier passes left behind.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//! use shift_roster::generator::ScheduleGenerator;
//! use shift_roster::models::{Employee, Shift};
//! use shift_roster::notify::RecordingSender;
//! use shift_roster::store::InMemoryStore;
//!
//! let mut store = InMemoryStore::new(
//!     vec![Employee::new(1, "Andi"), Employee::new(2, "Budi"), Employee::new(3, "Citra")],
//!     vec![Shift::hours(1, "Pagi", 8, 16), Shift::hours(2, "Malam", 20, 8)],
//! );
//! let notifier = RecordingSender::new();
//! let mut rng = StdRng::seed_from_u64(42);
//! let start = NaiveDate::from_ymd_opt(2025, 7, 6).unwrap();
//!
//! let ok = ScheduleGenerator::default().generate_schedule(&mut store, &notifier, &mut rng, start, 2);
//! assert!(ok);
//! assert!(store.schedule_count() > 0);
//! ```

mod context;
mod repair;
mod rest_days;
mod rotation;
mod weekly;

pub use context::{GenerationContext, RestDay, DAYS_PER_WEEK};
pub use repair::CoverageRepairer;
pub use rest_days::RestDayDistributor;
pub use rotation::{balance_groups, RotationDriver, WeekStats};
pub use weekly::WeeklyAssigner;

use chrono::{NaiveDate, TimeDelta};
use rand::Rng;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::GeneratorConfig;
use crate::error::GenerateError;
use crate::grouping::{EmployeeGrouper, ShiftGrouper};
use crate::models::{Employee, NewShift, Shift, ShiftId, WorkSchedule};
use crate::notify::NotificationSender;
use crate::report::{RosterKpi, SummaryFormatter};
use crate::store::ScheduleStore;
use crate::validation::validate_input;

/// Minimum number of active employees for a run.
pub const MIN_EMPLOYEES: usize = 2;
/// Minimum number of working shifts for a run.
pub const MIN_WORK_SHIFTS: usize = 2;

/// Input for an in-memory planning run.
#[derive(Debug, Clone)]
pub struct PlanRequest {
    /// Employees to schedule (already filtered).
    pub employees: Vec<Employee>,
    /// All shifts, including the rest shift.
    pub shifts: Vec<Shift>,
    /// Rows already persisted around the planned range.
    pub existing: Vec<WorkSchedule>,
    /// Shift used for rest days.
    pub rest_shift_id: ShiftId,
    /// First day of the first week.
    pub start: NaiveDate,
    /// Number of weeks.
    pub weeks: u32,
}

impl PlanRequest {
    /// Creates a request with no existing rows.
    pub fn new(
        employees: Vec<Employee>,
        shifts: Vec<Shift>,
        rest_shift_id: ShiftId,
        start: NaiveDate,
        weeks: u32,
    ) -> Self {
        Self {
            employees,
            shifts,
            existing: Vec::new(),
            rest_shift_id,
            start,
            weeks,
        }
    }

    /// Sets the rows already persisted.
    pub fn with_existing(mut self, rows: Vec<WorkSchedule>) -> Self {
        self.existing = rows;
        self
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    /// First generated day.
    pub start: NaiveDate,
    /// Last generated day.
    pub end: NaiveDate,
    /// Number of weeks generated.
    pub weeks: u32,
    /// Shift used for rest days.
    pub rest_shift_id: ShiftId,
    /// Rows written to the store.
    pub rows_written: usize,
    /// Per-week statistics.
    pub week_stats: Vec<WeekStats>,
    /// Quality metrics of the generated range.
    pub kpi: RosterKpi,
    /// Whether the summary notification was delivered.
    pub notified: bool,
}

/// Generates rotating work schedules.
#[derive(Debug, Clone, Default)]
pub struct ScheduleGenerator {
    config: GeneratorConfig,
}

impl ScheduleGenerator {
    /// Creates a generator with the given configuration.
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generates `weeks` weeks starting at `start`.
    ///
    /// Returns `true` when the schedule was written. Failures are logged and
    /// leave the store untouched.
    pub fn generate_schedule<S, N, R>(
        &self,
        store: &mut S,
        notifier: &N,
        rng: &mut R,
        start: NaiveDate,
        weeks: u32,
    ) -> bool
    where
        S: ScheduleStore + ?Sized,
        N: NotificationSender + ?Sized,
        R: Rng + ?Sized,
    {
        match self.try_generate(store, notifier, rng, start, weeks) {
            Ok(report) => {
                info!(
                    %start,
                    end = %report.end,
                    rows = report.rows_written,
                    coverage = report.kpi.coverage_rate,
                    "schedule generated"
                );
                true
            }
            Err(e) => {
                error!(error = %e, %start, weeks, "schedule generation failed");
                false
            }
        }
    }

    /// Like [`generate_schedule`](Self::generate_schedule), returning the
    /// report or the reason for failure.
    pub fn try_generate<S, N, R>(
        &self,
        store: &mut S,
        notifier: &N,
        rng: &mut R,
        start: NaiveDate,
        weeks: u32,
    ) -> Result<GenerationReport, GenerateError>
    where
        S: ScheduleStore + ?Sized,
        N: NotificationSender + ?Sized,
        R: Rng + ?Sized,
    {
        let employees = self.participants(store.employees()?);
        let shifts = store.shifts()?;
        self.check_preconditions(&employees, &shifts, weeks)?;

        store.begin()?;
        let outcome = self.generate_in_transaction(store, rng, employees, shifts, start, weeks);
        let (mut report, ctx) = match outcome {
            Ok(done) => done,
            Err(e) => {
                if let Err(rollback) = store.rollback() {
                    warn!(error = %rollback, "rollback failed");
                }
                return Err(e);
            }
        };

        report.notified = self.notify(notifier, &ctx);
        Ok(report)
    }

    fn generate_in_transaction<S, R>(
        &self,
        store: &mut S,
        rng: &mut R,
        employees: Vec<Employee>,
        mut shifts: Vec<Shift>,
        start: NaiveDate,
        weeks: u32,
    ) -> Result<(GenerationReport, GenerationContext), GenerateError>
    where
        S: ScheduleStore + ?Sized,
        R: Rng + ?Sized,
    {
        let rest_shift_id = self.resolve_rest_shift(store, &mut shifts)?;
        let end = start + TimeDelta::days(DAYS_PER_WEEK * i64::from(weeks) - 1);
        let existing = store.schedules_between(start - TimeDelta::days(1), end)?;

        let request = PlanRequest::new(employees, shifts, rest_shift_id, start, weeks)
            .with_existing(existing);
        let (ctx, week_stats) = self.plan_with_stats(request, rng)?;

        let changed: Vec<WorkSchedule> = ctx.roster.changed_rows().into_iter().cloned().collect();
        for row in &changed {
            store.upsert_schedule(row.clone())?;
        }
        store.commit()?;

        let kpi = kpi_for(&ctx);
        let report = GenerationReport {
            start,
            end: ctx.end(),
            weeks,
            rest_shift_id,
            rows_written: changed.len(),
            week_stats,
            kpi,
            notified: false,
        };
        Ok((report, ctx))
    }

    /// Runs the whole pipeline in memory and returns the final state.
    ///
    /// Nothing is persisted; `ctx.roster.changed_rows()` lists the rows a
    /// store-backed run would write.
    pub fn plan<R: Rng + ?Sized>(
        &self,
        request: PlanRequest,
        rng: &mut R,
    ) -> Result<GenerationContext, GenerateError> {
        self.plan_with_stats(request, rng).map(|(ctx, _)| ctx)
    }

    fn plan_with_stats<R: Rng + ?Sized>(
        &self,
        request: PlanRequest,
        rng: &mut R,
    ) -> Result<(GenerationContext, Vec<WeekStats>), GenerateError> {
        self.check_preconditions(&request.employees, &request.shifts, request.weeks)?;
        let rest_ok = request
            .shifts
            .iter()
            .any(|s| s.id == request.rest_shift_id && s.is_rest());
        if !rest_ok {
            return Err(GenerateError::InvalidRestShift(request.rest_shift_id));
        }

        let shift_groups = ShiftGrouper::new(self.config.grouping).group(&request.shifts);
        info!(
            groups = shift_groups.len(),
            employees = request.employees.len(),
            weeks = request.weeks,
            "planning schedule"
        );

        let mut ctx = GenerationContext::new(
            request.employees,
            request.shifts,
            shift_groups,
            request.rest_shift_id,
            request.start,
            request.weeks,
        )
        .with_min_rest(self.config.min_rest())
        .with_existing(request.existing);

        let driver = RotationDriver::new(EmployeeGrouper::new(self.config.staffing));
        let stats = driver.run(&mut ctx, rng);
        Ok((ctx, stats))
    }

    /// Active employees taking part in a run.
    fn participants(&self, employees: Vec<Employee>) -> Vec<Employee> {
        employees
            .into_iter()
            .filter(|e| e.is_active && (self.config.include_admins || !e.is_admin))
            .collect()
    }

    fn check_preconditions(
        &self,
        employees: &[Employee],
        shifts: &[Shift],
        weeks: u32,
    ) -> Result<(), GenerateError> {
        if weeks == 0 || weeks > self.config.max_weeks {
            return Err(GenerateError::InvalidWeeks {
                weeks,
                max: self.config.max_weeks,
            });
        }
        if employees.len() < MIN_EMPLOYEES {
            return Err(GenerateError::NotEnoughEmployees {
                found: employees.len(),
            });
        }
        let work_shifts = shifts.iter().filter(|s| s.is_work()).count();
        if work_shifts < MIN_WORK_SHIFTS {
            return Err(GenerateError::NotEnoughShifts { found: work_shifts });
        }
        validate_input(employees, shifts).map_err(GenerateError::InvalidInput)
    }

    /// Configured rest shift, else the first rest shift, else a new one.
    fn resolve_rest_shift<S: ScheduleStore + ?Sized>(
        &self,
        store: &mut S,
        shifts: &mut Vec<Shift>,
    ) -> Result<ShiftId, GenerateError> {
        if let Some(id) = self.config.rest_shift_id {
            return match shifts.iter().find(|s| s.id == id) {
                Some(s) if s.is_rest() => Ok(id),
                _ => Err(GenerateError::InvalidRestShift(id)),
            };
        }
        if let Some(s) = shifts.iter().filter(|s| s.is_rest()).min_by_key(|s| s.id) {
            return Ok(s.id);
        }
        let created = store.create_shift(NewShift::rest(self.config.rest_shift_name.clone()))?;
        info!(shift_id = created.id, name = %created.name, "rest shift created");
        let id = created.id;
        shifts.push(created);
        Ok(id)
    }

    fn notify<N: NotificationSender + ?Sized>(&self, notifier: &N, ctx: &GenerationContext) -> bool {
        let Some(destination) = self.config.notify_destination.as_deref() else {
            debug!("no notification destination configured");
            return false;
        };
        let employees = ctx.employee_list();
        let shifts = ctx.shift_list();
        let text = SummaryFormatter::new(&employees, &shifts).weekly(
            &ctx.generated_rows(),
            ctx.start,
            ctx.weeks,
        );
        match notifier.send_message(destination, &text) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, destination, "schedule notification failed");
                false
            }
        }
    }
}

fn kpi_for(ctx: &GenerationContext) -> RosterKpi {
    RosterKpi::calculate(
        &ctx.generated_rows(),
        &ctx.employee_list(),
        &ctx.shift_list(),
        ctx.start,
        ctx.end(),
    )
}
