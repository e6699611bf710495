//! Attendance record DTOs as returned by the report endpoint.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Event kind of an attendance record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RecordKind {
    #[serde(rename = "check-in")]
    CheckIn,
    #[serde(rename = "check-out")]
    CheckOut,
    /// Anything the endpoint sends that we do not recognize.
    #[default]
    #[serde(other, rename = "unknown")]
    Unknown,
}

impl RecordKind {
    /// Display label used in tables and exports.
    pub fn label(&self) -> &'static str {
        match self {
            RecordKind::CheckIn => "Check-In",
            RecordKind::CheckOut => "Check-Out",
            RecordKind::Unknown => "-",
        }
    }
}

/// One check-in or check-out event. Immutable once fetched; fields the
/// endpoint omitted stay `None` and render as placeholders.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub job: Option<String>,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: RecordKind,
    /// Calendar day of the event, as sent by the endpoint.
    #[serde(default)]
    pub date: String,
    /// Full event timestamp, as sent by the endpoint.
    #[serde(default)]
    pub time: String,
    /// Precomputed late/early/on-time label, e.g. "متأخر 1 ساعة".
    #[serde(default)]
    pub time_diff: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub gps: Option<String>,
}

impl AttendanceRecord {
    /// Calendar day of the event in local time, or `None` when the date
    /// field cannot be parsed. Records without a day are excluded from
    /// date-filtered and summary computations.
    pub fn day(&self) -> Option<NaiveDate> {
        parse_day(&self.date).or_else(|| parse_day(&self.time))
    }

    /// Event instant, used only to order same-day records.
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        parse_instant(&self.time)
    }

    /// Grouping key for summary aggregation: serial number when present,
    /// employee name otherwise.
    pub fn employee_key(&self) -> &str {
        match self.serial_number.as_deref() {
            Some(sn) if !sn.is_empty() => sn,
            _ => &self.name,
        }
    }

    /// Date formatted for display, falling back to the raw field.
    pub fn display_date(&self) -> String {
        match self.day() {
            Some(day) => day.format("%Y-%m-%d").to_string(),
            None => self.date.clone(),
        }
    }

    /// Time of day formatted for display, falling back to the raw field.
    pub fn display_time(&self) -> String {
        match self.instant() {
            Some(ts) => ts.with_timezone(&Local).format("%H:%M:%S").to_string(),
            None => self.time.clone(),
        }
    }
}

/// Parse a date field into a local calendar day.
///
/// The endpoint emits RFC 3339 timestamps, but hand-entered sheets have
/// produced bare dates and space-separated datetimes as well.
fn parse_day(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Local).date_naive());
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }

    None
}

/// Parse a timestamp field into a UTC instant. Naive timestamps are taken
/// as local time.
fn parse_instant(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Local.from_local_datetime(&naive).single().map(|dt| dt.with_timezone(&Utc));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_record() {
        let json = r#"{
            "id": "rec-1",
            "name": "Ahmed",
            "serialNumber": "2024-017",
            "job": "Cashier",
            "branch": "Main",
            "type": "check-in",
            "date": "2026-03-02T06:58:12.000Z",
            "time": "2026-03-02T06:58:12.000Z",
            "timeDiff": "متأخر 10 دقيقة",
            "reason": "traffic",
            "gps": "24.7136,46.6753"
        }"#;

        let record: AttendanceRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.name, "Ahmed");
        assert_eq!(record.kind, RecordKind::CheckIn);
        assert_eq!(record.employee_key(), "2024-017");
        assert!(record.day().is_some());
        assert!(record.instant().is_some());
    }

    #[test]
    fn test_deserialize_partial_record() {
        // Missing fields must not reject the record
        let json = r#"{"name": "Sara", "type": "check-out", "date": "2026-03-02"}"#;

        let record: AttendanceRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.kind, RecordKind::CheckOut);
        assert_eq!(record.employee_key(), "Sara");
        assert!(record.serial_number.is_none());
        assert!(record.time_diff.is_none());
        assert_eq!(record.day(), NaiveDate::from_ymd_opt(2026, 3, 2));
        assert!(record.instant().is_none());
    }

    #[test]
    fn test_unknown_kind_tolerated() {
        let json = r#"{"name": "Sara", "type": "break", "date": "2026-03-02"}"#;

        let record: AttendanceRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.kind, RecordKind::Unknown);
        assert_eq!(record.kind.label(), "-");
    }

    #[test]
    fn test_employee_key_empty_serial_falls_back_to_name() {
        let json = r#"{"name": "Sara", "serialNumber": "", "type": "check-in"}"#;

        let record: AttendanceRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.employee_key(), "Sara");
    }

    #[test]
    fn test_day_parses_space_separated_datetime() {
        assert_eq!(
            parse_day("2026-03-02 07:15:00"),
            NaiveDate::from_ymd_opt(2026, 3, 2)
        );
    }

    #[test]
    fn test_day_invalid_is_none() {
        assert_eq!(parse_day("not a date"), None);
        assert_eq!(parse_day(""), None);
    }

    #[test]
    fn test_display_falls_back_to_raw_field() {
        let json = r#"{"name": "Sara", "type": "check-in", "date": "03/02/2026", "time": "morning"}"#;

        let record: AttendanceRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.display_date(), "03/02/2026");
        assert_eq!(record.display_time(), "morning");
    }
}
