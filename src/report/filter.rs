//! Record filtering over date range and selection lists.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::models::AttendanceRecord;

/// Filter state for the reports view.
///
/// Date bounds are inclusive and compare calendar days only. An empty
/// selection list imposes no restriction on that dimension.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub jobs: Vec<String>,
    pub employees: Vec<String>,
    pub branches: Vec<String>,
}

impl RecordFilter {
    /// Whether both date bounds are set. Exports require a full range.
    pub fn has_date_range(&self) -> bool {
        self.from.is_some() && self.to.is_some()
    }

    /// Whether the record passes every active filter dimension.
    pub fn matches(&self, record: &AttendanceRecord) -> bool {
        if self.from.is_some() || self.to.is_some() {
            // Records without a parseable day cannot be placed in the range
            let Some(day) = record.day() else {
                return false;
            };
            if let Some(from) = self.from
                && day < from
            {
                return false;
            }
            if let Some(to) = self.to
                && day > to
            {
                return false;
            }
        }

        if !self.jobs.is_empty() && !self.jobs.iter().any(|j| Some(j.as_str()) == record.job.as_deref()) {
            return false;
        }
        if !self.employees.is_empty() && !self.employees.iter().any(|e| e == &record.name) {
            return false;
        }
        if !self.branches.is_empty()
            && !self.branches.iter().any(|b| Some(b.as_str()) == record.branch.as_deref())
        {
            return false;
        }

        true
    }

    /// Apply the filter, returning the matching records in input order.
    pub fn apply(&self, records: &[AttendanceRecord]) -> Vec<AttendanceRecord> {
        records.iter().filter(|r| self.matches(r)).cloned().collect()
    }

    /// Toggle a job in or out of the selection.
    pub fn toggle_job(&mut self, value: &str) {
        toggle(&mut self.jobs, value);
    }

    /// Toggle an employee in or out of the selection.
    pub fn toggle_employee(&mut self, value: &str) {
        toggle(&mut self.employees, value);
    }

    /// Toggle a branch in or out of the selection.
    pub fn toggle_branch(&mut self, value: &str) {
        toggle(&mut self.branches, value);
    }

    /// Reset every filter dimension.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

fn toggle(list: &mut Vec<String>, value: &str) {
    if let Some(pos) = list.iter().position(|v| v == value) {
        list.remove(pos);
    } else {
        list.push(value.to_string());
    }
}

/// Distinct non-empty job titles present in the records, sorted.
pub fn job_options(records: &[AttendanceRecord]) -> Vec<String> {
    distinct(records.iter().filter_map(|r| r.job.as_deref()))
}

/// Distinct non-empty employee names present in the records, sorted.
pub fn employee_options(records: &[AttendanceRecord]) -> Vec<String> {
    distinct(records.iter().map(|r| r.name.as_str()))
}

/// Distinct non-empty branch names present in the records, sorted.
pub fn branch_options(records: &[AttendanceRecord]) -> Vec<String> {
    distinct(records.iter().filter_map(|r| r.branch.as_deref()))
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
