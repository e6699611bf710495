//! Per-employee summary aggregation for the summary export.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};

use crate::models::{AttendanceRecord, RecordKind};

/// Weekly rest day. Days falling on it never count as working days.
pub const REST_WEEKDAY: Weekday = Weekday::Fri;

/// Marker substrings of the upstream time-difference labels. The endpoint
/// emits these labels in Arabic; they are a wire format, not UI text.
const LATE_MARKER: &str = "متأخر";
const EARLY_MARKER: &str = "مبكر";
const HOURS_MARKER: &str = "ساعة";
const MINUTES_MARKER: &str = "دقيقة";

/// Aggregated attendance figures for one employee over the report range.
#[derive(Debug, Clone)]
pub struct EmployeeSummary {
    pub name: String,
    pub branch: Option<String>,
    pub job: Option<String>,
    pub attendance_days: u32,
    pub departure_days: u32,
    pub absence_days: u32,
    pub late_days: u32,
    pub early_days: u32,
    late_minutes: u32,
    early_minutes: u32,
    overtime_minutes: u32,
}

impl EmployeeSummary {
    fn new(sample: &AttendanceRecord) -> Self {
        Self {
            name: sample.name.clone(),
            branch: sample.branch.clone(),
            job: sample.job.clone(),
            attendance_days: 0,
            departure_days: 0,
            absence_days: 0,
            late_days: 0,
            early_days: 0,
            late_minutes: 0,
            early_minutes: 0,
            overtime_minutes: 0,
        }
    }

    /// Accumulated late-arrival time as `H:MM`.
    pub fn late_hours(&self) -> String {
        format_hours(self.late_minutes)
    }

    /// Accumulated early-departure time as `H:MM`.
    pub fn early_hours(&self) -> String {
        format_hours(self.early_minutes)
    }

    /// Accumulated overtime (late departure) as `H:MM`.
    pub fn overtime_hours(&self) -> String {
        format_hours(self.overtime_minutes)
    }
}

/// Result of a summary pass: the working-day denominator and one row per
/// employee seen in the filtered records.
#[derive(Debug, Clone)]
pub struct SummaryReport {
    pub working_days: u32,
    pub rows: Vec<EmployeeSummary>,
}

/// Earliest check-in and latest check-out of one employee-day.
#[derive(Default)]
struct DayEvents {
    first_in: Option<AttendanceRecord>,
    last_out: Option<AttendanceRecord>,
}

impl DayEvents {
    fn note_check_in(&mut self, record: &AttendanceRecord) {
        if replaces(record.instant(), self.first_in.as_ref(), |new, old| new < old) {
            self.first_in = Some(record.clone());
        }
    }

    fn note_check_out(&mut self, record: &AttendanceRecord) {
        if replaces(record.instant(), self.last_out.as_ref(), |new, old| new > old) {
            self.last_out = Some(record.clone());
        }
    }
}

/// Whether a candidate should replace the current slot holder. Records
/// without a parseable instant only fill an empty slot.
fn replaces(
    candidate: Option<DateTime<Utc>>,
    current: Option<&AttendanceRecord>,
    wins: impl Fn(DateTime<Utc>, DateTime<Utc>) -> bool,
) -> bool {
    match current {
        None => true,
        Some(cur) => match (candidate, cur.instant()) {
            (Some(new), Some(old)) => wins(new, old),
            (Some(_), None) => true,
            _ => false,
        },
    }
}

/// Compute the per-employee summary over `records` for the inclusive range
/// `from..=to`. The counted range is capped at `today`; days on the rest
/// weekday are excluded from the working-day denominator and from every
/// counted figure.
pub fn summarize(
    records: &[AttendanceRecord],
    from: NaiveDate,
    to: NaiveDate,
    today: NaiveDate,
) -> SummaryReport {
    let actual_end = to.min(today);

    let mut working_days = BTreeSet::new();
    let mut day = from;
    while day <= actual_end {
        if day.weekday() != REST_WEEKDAY {
            working_days.insert(day);
        }
        let Some(next) = day.succ_opt() else { break };
        day = next;
    }

    // Earliest check-in and latest check-out per employee per day
    let mut daily: BTreeMap<String, BTreeMap<NaiveDate, DayEvents>> = BTreeMap::new();
    for record in records {
        let Some(day) = record.day() else { continue };
        let events = daily
            .entry(record.employee_key().to_string())
            .or_default()
            .entry(day)
            .or_default();

        match record.kind {
            RecordKind::CheckIn => events.note_check_in(record),
            RecordKind::CheckOut => events.note_check_out(record),
            RecordKind::Unknown => {}
        }
    }

    let mut rows = Vec::new();
    for days in daily.values() {
        let mut summary: Option<EmployeeSummary> = None;

        for (day, events) in days {
            let Some(sample) = events.first_in.as_ref().or(events.last_out.as_ref()) else {
                continue;
            };
            let row = summary.get_or_insert_with(|| EmployeeSummary::new(sample));

            if !working_days.contains(day) {
                continue;
            }

            if let Some(first_in) = &events.first_in {
                row.attendance_days += 1;
                let label = first_in.time_diff.as_deref().unwrap_or("");
                if label.contains(LATE_MARKER) {
                    row.late_days += 1;
                    row.late_minutes += parse_time_label(label);
                }
            }

            if let Some(last_out) = &events.last_out {
                row.departure_days += 1;
                let label = last_out.time_diff.as_deref().unwrap_or("");
                if label.contains(EARLY_MARKER) {
                    row.early_days += 1;
                    row.early_minutes += parse_time_label(label);
                } else if label.contains(LATE_MARKER) {
                    row.overtime_minutes += parse_time_label(label);
                }
            }
        }

        if let Some(mut row) = summary {
            let counted = row.attendance_days.max(row.departure_days);
            row.absence_days = (working_days.len() as u32).saturating_sub(counted);
            rows.push(row);
        }
    }

    SummaryReport {
        working_days: working_days.len() as u32,
        rows,
    }
}

/// Total minutes encoded in a time-difference label, reading the number
/// directly before the hours marker and before the minutes marker.
fn parse_time_label(label: &str) -> u32 {
    let hours = number_before(label, HOURS_MARKER).unwrap_or(0);
    let minutes = number_before(label, MINUTES_MARKER).unwrap_or(0);
    hours * 60 + minutes
}

fn number_before(label: &str, marker: &str) -> Option<u32> {
    let idx = label.find(marker)?;
    let head = label[..idx].trim_end();
    let digits: Vec<char> = head
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        return None;
    }
    digits.iter().rev().collect::<String>().parse().ok()
}

fn format_hours(total_minutes: u32) -> String {
    format!("{}:{:02}", total_minutes / 60, total_minutes % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, kind: &str, time: &str, time_diff: &str) -> AttendanceRecord {
        serde_json::from_str(&format!(
            r#"{{"name": "{name}", "job": "Cashier", "branch": "Main",
                 "type": "{kind}", "date": "{date}", "time": "{time}",
                 "timeDiff": "{time_diff}"}}"#,
            date = &time[..10],
        ))
        .unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_single_working_day_scenario() {
        // 2026-03-02 is a Monday
        let records = vec![
            record("Ahmed", "check-in", "2026-03-02 09:00:00", "متأخر 1 ساعة"),
            record("Ahmed", "check-out", "2026-03-02 16:30:00", "مبكر 30 دقيقة"),
        ];

        let report = summarize(&records, date(2026, 3, 2), date(2026, 3, 2), date(2026, 3, 10));
        assert_eq!(report.working_days, 1);
        assert_eq!(report.rows.len(), 1);

        let row = &report.rows[0];
        assert_eq!(row.attendance_days, 1);
        assert_eq!(row.departure_days, 1);
        assert_eq!(row.absence_days, 0);
        assert_eq!(row.late_days, 1);
        assert_eq!(row.early_days, 1);
        assert_eq!(row.late_hours(), "1:00");
        assert_eq!(row.early_hours(), "0:30");
        assert_eq!(row.overtime_hours(), "0:00");
    }

    #[test]
    fn test_rest_day_range_yields_zero_not_negative() {
        // 2026-03-06 is a Friday
        let records = vec![
            record("Ahmed", "check-in", "2026-03-06 09:00:00", "متأخر 1 ساعة"),
            record("Ahmed", "check-out", "2026-03-06 17:00:00", ""),
        ];

        let report = summarize(&records, date(2026, 3, 6), date(2026, 3, 6), date(2026, 3, 10));
        assert_eq!(report.working_days, 0);

        let row = &report.rows[0];
        assert_eq!(row.attendance_days, 0);
        assert_eq!(row.departure_days, 0);
        assert_eq!(row.absence_days, 0);
        assert_eq!(row.late_days, 0);
    }

    #[test]
    fn test_earliest_check_in_wins() {
        // The later, late-labeled check-in must not count
        let records = vec![
            record("Ahmed", "check-in", "2026-03-02 08:00:00", ""),
            record("Ahmed", "check-in", "2026-03-02 11:00:00", "متأخر 3 ساعة"),
        ];

        let report = summarize(&records, date(2026, 3, 2), date(2026, 3, 2), date(2026, 3, 10));
        let row = &report.rows[0];
        assert_eq!(row.attendance_days, 1);
        assert_eq!(row.late_days, 0);
        assert_eq!(row.late_hours(), "0:00");
    }

    #[test]
    fn test_latest_check_out_wins() {
        // The earlier, early-labeled check-out must not count
        let records = vec![
            record("Ahmed", "check-out", "2026-03-02 14:00:00", "مبكر 2 ساعة"),
            record("Ahmed", "check-out", "2026-03-02 17:00:00", ""),
        ];

        let report = summarize(&records, date(2026, 3, 2), date(2026, 3, 2), date(2026, 3, 10));
        let row = &report.rows[0];
        assert_eq!(row.departure_days, 1);
        assert_eq!(row.early_days, 0);
        assert_eq!(row.early_hours(), "0:00");
    }

    #[test]
    fn test_late_check_out_counts_as_overtime() {
        let records = vec![
            record("Ahmed", "check-in", "2026-03-02 08:00:00", ""),
            record("Ahmed", "check-out", "2026-03-02 19:00:00", "متأخر 2 ساعة"),
        ];

        let report = summarize(&records, date(2026, 3, 2), date(2026, 3, 2), date(2026, 3, 10));
        let row = &report.rows[0];
        assert_eq!(row.early_days, 0);
        assert_eq!(row.overtime_hours(), "2:00");
    }

    #[test]
    fn test_range_capped_at_today() {
        // Mon 2026-03-02 through Thu 2026-03-05 requested, but today is
        // Tue 2026-03-03: only Mon and Tue count
        let records = vec![record("Ahmed", "check-in", "2026-03-02 08:00:00", "")];

        let report = summarize(&records, date(2026, 3, 2), date(2026, 3, 5), date(2026, 3, 3));
        assert_eq!(report.working_days, 2);
        assert_eq!(report.rows[0].absence_days, 1);
    }

    #[test]
    fn test_working_week_excludes_friday() {
        // Mon 2026-03-02 .. Sun 2026-03-08 contains one Friday
        let records = vec![record("Ahmed", "check-in", "2026-03-02 08:00:00", "")];

        let report = summarize(&records, date(2026, 3, 2), date(2026, 3, 8), date(2026, 4, 1));
        assert_eq!(report.working_days, 6);
        assert_eq!(report.rows[0].attendance_days, 1);
        assert_eq!(report.rows[0].absence_days, 5);
    }

    #[test]
    fn test_absence_floor_with_absent_employee() {
        // Employee only appears on the rest day; no counted days at all
        let records = vec![record("Ahmed", "check-in", "2026-03-06 08:00:00", "")];

        let report = summarize(&records, date(2026, 3, 5), date(2026, 3, 6), date(2026, 4, 1));
        assert_eq!(report.working_days, 1);
        assert_eq!(report.rows[0].absence_days, 1);
    }

    #[test]
    fn test_minutes_overflow_carries_into_hours() {
        let records = vec![
            record("Ahmed", "check-in", "2026-03-02 09:00:00", "متأخر 50 دقيقة"),
            record("Ahmed", "check-in", "2026-03-03 09:00:00", "متأخر 40 دقيقة"),
        ];

        let report = summarize(&records, date(2026, 3, 2), date(2026, 3, 3), date(2026, 3, 10));
        let row = &report.rows[0];
        assert_eq!(row.late_days, 2);
        assert_eq!(row.late_hours(), "1:30");
    }

    #[test]
    fn test_parse_time_label_forms() {
        assert_eq!(parse_time_label("متأخر 1 ساعة"), 60);
        assert_eq!(parse_time_label("متأخر 30 دقيقة"), 30);
        assert_eq!(parse_time_label("متأخر 1 ساعة و 30 دقيقة"), 90);
        assert_eq!(parse_time_label("متأخر 10دقيقة"), 10);
        assert_eq!(parse_time_label("في الموعد"), 0);
        assert_eq!(parse_time_label(""), 0);
    }

    #[test]
    fn test_employees_grouped_by_serial_number() {
        // Same serial number, name typo on one record: one row
        let mut a = record("Ahmed", "check-in", "2026-03-02 08:00:00", "");
        let mut b = record("Ahmad", "check-out", "2026-03-02 17:00:00", "");
        a.serial_number = Some("2024-017".to_string());
        b.serial_number = Some("2024-017".to_string());

        let report = summarize(&[a, b], date(2026, 3, 2), date(2026, 3, 2), date(2026, 3, 10));
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].attendance_days, 1);
        assert_eq!(report.rows[0].departure_days, 1);
    }
}
