//! Excel export functionality.

use chrono::{Local, NaiveDate};
use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::models::AttendanceRecord;
use crate::report::SummaryReport;

/// Export filtered records to Excel, one row per record.
pub fn export_all_data_to_excel(records: &[AttendanceRecord], path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    worksheet.set_name("Attendance Report")?;

    // Header format
    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0x4472C4))
        .set_font_color(Color::White)
        .set_border(FormatBorder::Thin);

    // Headers
    let headers = [
        "Date",
        "Time",
        "Employee Name",
        "Serial Number",
        "Job",
        "Branch",
        "Type",
        "Time Diff",
        "Reason/Notes",
        "GPS Location",
    ];

    for (col, header) in headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, &header_format)?;
    }

    // Column widths
    worksheet.set_column_width(0, 12)?; // Date
    worksheet.set_column_width(1, 10)?; // Time
    worksheet.set_column_width(2, 30)?; // Employee Name
    worksheet.set_column_width(3, 15)?; // Serial Number
    worksheet.set_column_width(4, 20)?; // Job
    worksheet.set_column_width(5, 20)?; // Branch
    worksheet.set_column_width(6, 10)?; // Type
    worksheet.set_column_width(7, 18)?; // Time Diff
    worksheet.set_column_width(8, 25)?; // Reason/Notes
    worksheet.set_column_width(9, 22)?; // GPS Location

    // Data rows
    for (idx, record) in records.iter().enumerate() {
        let row = (idx + 1) as u32;

        worksheet.write_string(row, 0, record.display_date())?;
        worksheet.write_string(row, 1, record.display_time())?;
        worksheet.write_string(row, 2, &record.name)?;
        worksheet.write_string(row, 3, record.serial_number.as_deref().unwrap_or("N/A"))?;
        worksheet.write_string(row, 4, record.job.as_deref().unwrap_or(""))?;
        worksheet.write_string(row, 5, record.branch.as_deref().unwrap_or(""))?;
        worksheet.write_string(row, 6, record.kind.label())?;
        worksheet.write_string(row, 7, record.time_diff.as_deref().unwrap_or(""))?;
        worksheet.write_string(row, 8, record.reason.as_deref().unwrap_or(""))?;
        worksheet.write_string(row, 9, record.gps.as_deref().unwrap_or(""))?;
    }

    // Autofilter
    if !records.is_empty() {
        let last_row = records.len() as u32;
        worksheet.autofilter(0, 0, last_row, 9)?;
    }

    // Freeze top row
    worksheet.set_freeze_panes(1, 0)?;

    workbook.save(path)?;
    Ok(())
}

/// Export the per-employee summary to Excel, one row per employee.
pub fn export_summary_to_excel(report: &SummaryReport, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    worksheet.set_name("Summary Report")?;

    // Header format
    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0x4472C4))
        .set_font_color(Color::White)
        .set_border(FormatBorder::Thin);

    // Headers
    let headers = [
        "Employee Name",
        "Branch",
        "Job",
        "Working Days",
        "Attendance Days",
        "Departure Days",
        "Absence Days",
        "Late Arrival Days",
        "Early Departure Days",
        "Late Hours",
        "Early Hours",
        "Overtime Hours",
    ];

    for (col, header) in headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, &header_format)?;
    }

    // Column widths
    worksheet.set_column_width(0, 30)?; // Employee Name
    worksheet.set_column_width(1, 20)?; // Branch
    worksheet.set_column_width(2, 20)?; // Job
    for col in 3..=8 {
        worksheet.set_column_width(col, 14)?;
    }
    for col in 9..=11 {
        worksheet.set_column_width(col, 12)?;
    }

    // Data rows
    for (idx, row_data) in report.rows.iter().enumerate() {
        let row = (idx + 1) as u32;

        worksheet.write_string(row, 0, &row_data.name)?;
        worksheet.write_string(row, 1, row_data.branch.as_deref().unwrap_or("-"))?;
        worksheet.write_string(row, 2, row_data.job.as_deref().unwrap_or("-"))?;
        worksheet.write_number(row, 3, report.working_days as f64)?;
        worksheet.write_number(row, 4, row_data.attendance_days as f64)?;
        worksheet.write_number(row, 5, row_data.departure_days as f64)?;
        worksheet.write_number(row, 6, row_data.absence_days as f64)?;
        worksheet.write_number(row, 7, row_data.late_days as f64)?;
        worksheet.write_number(row, 8, row_data.early_days as f64)?;
        worksheet.write_string(row, 9, row_data.late_hours())?;
        worksheet.write_string(row, 10, row_data.early_hours())?;
        worksheet.write_string(row, 11, row_data.overtime_hours())?;
    }

    // Autofilter
    if !report.rows.is_empty() {
        let last_row = report.rows.len() as u32;
        worksheet.autofilter(0, 0, last_row, 11)?;
    }

    // Freeze top row
    worksheet.set_freeze_panes(1, 0)?;

    workbook.save(path)?;
    Ok(())
}

/// Open save file dialog and return selected path.
pub fn show_save_dialog(default_name: &str) -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_file_name(default_name)
        .add_filter("Excel Files", &["xlsx"])
        .save_file()
}

/// Default filename for the flat all-data export.
pub fn all_data_filename(username: &str) -> String {
    let today = Local::now().date_naive();
    format!("AllData_{username}_{today}.xlsx")
}

/// Default filename for the summary export.
pub fn summary_filename(username: &str, from: NaiveDate, to: NaiveDate) -> String {
    format!("Summary_{username}_{from}_to_{to}.xlsx")
}
