//! Plain-text schedule summaries for chat delivery.
//!
//! Dates are written as `06 Jul 2025`; bold markers use single asterisks.

use chrono::{NaiveDate, NaiveTime, TimeDelta};
use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::models::{Employee, EmployeeId, Shift, ShiftId, WorkSchedule};

const DATE_FORMAT: &str = "%d %b %Y";
const DAY_HEADER_FORMAT: &str = "%d %b %Y (%a)";

const WEEKLY_CLOSING: &str = "Please check your schedule and confirm your attendance.\n\
For any issues, please contact the HR department.\n";
const DAILY_CLOSING: &str = "Please arrive on time for your shift. Thank you.";

/// Renders schedule rows as text, resolving names through the given
/// employees and shifts. Rows referring to unknown employees are skipped.
#[derive(Debug, Clone)]
pub struct SummaryFormatter<'a> {
    employees: BTreeMap<EmployeeId, &'a Employee>,
    shifts: BTreeMap<ShiftId, &'a Shift>,
}

impl<'a> SummaryFormatter<'a> {
    pub fn new(employees: &'a [Employee], shifts: &'a [Shift]) -> Self {
        Self {
            employees: employees.iter().map(|e| (e.id, e)).collect(),
            shifts: shifts.iter().map(|s| (s.id, s)).collect(),
        }
    }

    /// Weekly summary covering `weeks` weeks from `start`, one section per
    /// week and one block per date that has rows.
    pub fn weekly(&self, rows: &[WorkSchedule], start: NaiveDate, weeks: u32) -> String {
        let mut by_date: BTreeMap<NaiveDate, Vec<&WorkSchedule>> = BTreeMap::new();
        for row in rows {
            by_date.entry(row.date).or_default().push(row);
        }

        let mut out = String::new();
        for week in 0..i64::from(weeks) {
            let week_start = start + TimeDelta::days(7 * week);
            let week_end = week_start + TimeDelta::days(6);
            let _ = writeln!(
                out,
                "Work schedule: {} - {}\n",
                week_start.format(DATE_FORMAT),
                week_end.format(DATE_FORMAT)
            );
            for (date, day_rows) in by_date.range(week_start..=week_end) {
                let _ = writeln!(out, "*{}*", date.format(DAY_HEADER_FORMAT));
                let mut day_rows = day_rows.clone();
                day_rows.sort_by_key(|r| r.employee_id);
                for row in day_rows {
                    if let Some(line) = self.line(row) {
                        out.push_str(&line);
                        out.push('\n');
                    }
                }
                out.push('\n');
            }
        }
        out.push_str(WEEKLY_CLOSING);
        out
    }

    /// Recap of one day grouped by shift. `None` when the day has no rows.
    pub fn daily_recap(&self, rows: &[WorkSchedule], date: NaiveDate) -> Option<String> {
        let mut by_shift: BTreeMap<(Option<NaiveTime>, ShiftId), Vec<&WorkSchedule>> =
            BTreeMap::new();
        for row in rows.iter().filter(|r| r.date == date) {
            let start = self.shifts.get(&row.shift_id).map(|s| s.start_time);
            by_shift.entry((start, row.shift_id)).or_default().push(row);
        }
        if by_shift.is_empty() {
            return None;
        }

        let mut out = String::from("*DAILY WORK SCHEDULE*\n");
        let _ = writeln!(out, "Date: {}\n", date.format(DATE_FORMAT));
        for ((_, shift_id), shift_rows) in by_shift {
            match self.shifts.get(&shift_id) {
                Some(shift) => {
                    let _ = writeln!(out, "*Shift: {}*", shift.name);
                    let _ = writeln!(out, "Time: {}", shift.time_label());
                }
                None => out.push_str("*Shift: No shift*\n"),
            }
            out.push_str("Employees:\n");
            let mut shift_rows = shift_rows;
            shift_rows.sort_by_key(|r| r.employee_id);
            for row in shift_rows {
                if let Some(employee) = self.employees.get(&row.employee_id) {
                    let _ = writeln!(out, "- {}", employee.name);
                }
            }
            out.push('\n');
        }
        out.push_str(DAILY_CLOSING);
        Some(out)
    }

    fn line(&self, row: &WorkSchedule) -> Option<String> {
        let employee = self.employees.get(&row.employee_id)?;
        let shift = self.shifts.get(&row.shift_id)?;
        Some(format!(
            "- {}: {} ({})",
            employee.name,
            shift.name,
            shift.time_label()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, day).unwrap()
    }

    fn data() -> (Vec<Employee>, Vec<Shift>) {
        (
            vec![Employee::new(1, "Andi"), Employee::new(2, "Budi")],
            vec![
                Shift::hours(1, "Pagi", 8, 16),
                Shift::hours(2, "Malam", 20, 8),
                Shift::rest(3, "Off Day"),
            ],
        )
    }

    #[test]
    fn test_weekly_layout() {
        let (employees, shifts) = data();
        let rows = vec![
            WorkSchedule::scheduled(2, 2, d(6)),
            WorkSchedule::scheduled(1, 1, d(6)),
            WorkSchedule::absent(1, 3, d(7)),
        ];
        let text = SummaryFormatter::new(&employees, &shifts).weekly(&rows, d(6), 1);
        let expected = "Work schedule: 06 Jul 2025 - 12 Jul 2025\n\n\
*06 Jul 2025 (Sun)*\n\
- Andi: Pagi (08:00-16:00)\n\
- Budi: Malam (20:00-08:00)\n\n\
*07 Jul 2025 (Mon)*\n\
- Andi: Off Day (00:00-23:59)\n\n\
Please check your schedule and confirm your attendance.\n\
For any issues, please contact the HR department.\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_weekly_sections_per_week() {
        let (employees, shifts) = data();
        let rows = vec![
            WorkSchedule::scheduled(1, 1, d(6)),
            WorkSchedule::scheduled(1, 1, d(13)),
        ];
        let text = SummaryFormatter::new(&employees, &shifts).weekly(&rows, d(6), 2);
        let first = text.find("Work schedule: 06 Jul 2025").unwrap();
        let second = text.find("Work schedule: 13 Jul 2025 - 19 Jul 2025").unwrap();
        let day = text.find("*13 Jul 2025 (Sun)*").unwrap();
        assert!(first < second && second < day);
        assert_eq!(text.matches("Please check your schedule").count(), 1);
    }

    #[test]
    fn test_daily_recap_groups_by_shift() {
        let (employees, shifts) = data();
        let rows = vec![
            WorkSchedule::scheduled(2, 1, d(6)),
            WorkSchedule::scheduled(1, 1, d(6)),
            WorkSchedule::scheduled(1, 2, d(7)),
        ];
        let text = SummaryFormatter::new(&employees, &shifts)
            .daily_recap(&rows, d(6))
            .unwrap();
        assert!(text.starts_with("*DAILY WORK SCHEDULE*\nDate: 06 Jul 2025\n\n"));
        assert!(text.contains("*Shift: Pagi*\nTime: 08:00-16:00\nEmployees:\n- Andi\n- Budi\n"));
        assert!(!text.contains("Malam"));
        assert!(text.ends_with("Thank you."));
    }

    #[test]
    fn test_daily_recap_empty_day() {
        let (employees, shifts) = data();
        assert!(SummaryFormatter::new(&employees, &shifts)
            .daily_recap(&[], d(6))
            .is_none());
    }
}
