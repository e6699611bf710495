//! Attendance reports panel with filters and Excel export.

use chrono::{Datelike, Local};
use eframe::egui::{self, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;
use egui_phosphor::regular::{
    ARROWS_CLOCKWISE, BRIEFCASE, DOWNLOAD, FILE_XLS, LINK_BREAK, MAP_PIN, SHIELD_CHECK, SIGN_OUT, USER, X,
};

use super::app::App;
use super::components::{self, MultiSelectAction, colors, panel_header};

/// Show the reports panel.
pub fn show(app: &mut App, ui: &mut Ui) {
    panel_header(ui, "Attendance Reports");

    // Session row: who is logged in, refresh/logout/export actions
    ui.horizontal(|ui| {
        if app.is_admin {
            ui.colored_label(colors::ADMIN, format!("{SHIELD_CHECK} Admin"));
        }
        ui.label(format!("Account: {}", app.username.trim()));

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button(format!("{FILE_XLS} Summary Data")).clicked() {
                app.export_summary();
            }
            if ui.button(format!("{DOWNLOAD} All Data")).clicked() {
                app.export_all_data();
            }

            ui.separator();

            if ui.button(format!("{SIGN_OUT} Logout")).clicked() {
                app.logout();
                return;
            }

            let refresh = egui::Button::new(format!("{ARROWS_CLOCKWISE} Refresh"));
            if ui.add_enabled(!app.is_refreshing, refresh).clicked() {
                app.fetch_data(false);
            }
            if app.is_refreshing {
                ui.spinner();
            }
        });
    });

    ui.add_space(10.0);
    ui.separator();
    ui.add_space(10.0);

    let mut changed = false;

    // Date range filters
    ui.horizontal(|ui| {
        ui.label("From:");
        if let Some(mut from) = app.filter.from {
            if ui.add(DatePickerButton::new(&mut from).id_salt("from_date")).changed() {
                app.filter.from = Some(from);
                changed = true;
            }
            if ui.small_button(X).on_hover_text("Clear start date").clicked() {
                app.filter.from = None;
                changed = true;
            }
        } else if ui.button("Choose start").clicked() {
            app.filter.from = Some(Local::now().date_naive() - chrono::Duration::days(30));
            changed = true;
        }

        ui.add_space(10.0);

        ui.label("To:");
        if let Some(mut to) = app.filter.to {
            if ui.add(DatePickerButton::new(&mut to).id_salt("to_date")).changed() {
                app.filter.to = Some(to);
                changed = true;
            }
            if ui.small_button(X).on_hover_text("Clear end date").clicked() {
                app.filter.to = None;
                changed = true;
            }
        } else if ui.button("Choose end").clicked() {
            app.filter.to = Some(Local::now().date_naive());
            changed = true;
        }

        ui.add_space(20.0);

        // Quick date buttons
        if ui.button("Today").clicked() {
            let today = Local::now().date_naive();
            app.filter.from = Some(today);
            app.filter.to = Some(today);
            changed = true;
        }

        if ui.button("This Week").clicked() {
            let today = Local::now().date_naive();
            let weekday = today.weekday().num_days_from_monday();
            app.filter.from = Some(today - chrono::Duration::days(weekday as i64));
            app.filter.to = Some(today);
            changed = true;
        }

        if ui.button("This Month").clicked() {
            let today = Local::now().date_naive();
            app.filter.from = Some(today.with_day(1).unwrap_or(today));
            app.filter.to = Some(today);
            changed = true;
        }

        if ui.button("Last 30 Days").clicked() {
            let today = Local::now().date_naive();
            app.filter.from = Some(today - chrono::Duration::days(30));
            app.filter.to = Some(today);
            changed = true;
        }
    });

    ui.add_space(8.0);

    // Selection filters
    ui.horizontal(|ui| {
        ui.label(format!("{BRIEFCASE} Jobs:"));
        let action = components::multi_select(
            ui,
            "jobs_filter",
            &app.job_options,
            &app.filter.jobs,
            &mut app.job_search,
            "All",
        );
        match action {
            MultiSelectAction::Toggle(value) => {
                app.filter.toggle_job(&value);
                changed = true;
            }
            MultiSelectAction::Clear => {
                app.filter.jobs.clear();
                changed = true;
            }
            MultiSelectAction::None => {}
        }

        ui.add_space(10.0);

        ui.label(format!("{USER} Employees:"));
        let action = components::multi_select(
            ui,
            "employees_filter",
            &app.employee_options,
            &app.filter.employees,
            &mut app.employee_search,
            "All",
        );
        match action {
            MultiSelectAction::Toggle(value) => {
                app.filter.toggle_employee(&value);
                changed = true;
            }
            MultiSelectAction::Clear => {
                app.filter.employees.clear();
                changed = true;
            }
            MultiSelectAction::None => {}
        }

        ui.add_space(10.0);

        ui.label(format!("{MAP_PIN} Branches:"));
        let action = components::multi_select(
            ui,
            "branches_filter",
            &app.branch_options,
            &app.filter.branches,
            &mut app.branch_search,
            "All",
        );
        match action {
            MultiSelectAction::Toggle(value) => {
                app.filter.toggle_branch(&value);
                changed = true;
            }
            MultiSelectAction::Clear => {
                app.filter.branches.clear();
                changed = true;
            }
            MultiSelectAction::None => {}
        }

        ui.add_space(20.0);

        if ui.button(format!("{X} Clear all filters")).clicked() {
            app.filter.clear();
            changed = true;
        }
    });

    if changed {
        app.refresh_filtered();
    }

    ui.add_space(10.0);

    ui.horizontal(|ui| {
        ui.label(format!(
            "{shown} of {total} records",
            shown = app.filtered.len(),
            total = app.records.len()
        ));

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui
                .button(RichText::new(format!("{LINK_BREAK} Unlink")).small())
                .clicked()
            {
                app.show_unlink_confirm = true;
            }

            if let Some(count) = app.cache_entries {
                ui.label(RichText::new(format!("Offline shell: {count} files")).small().weak());
            }
        });
    });

    ui.add_space(10.0);
    ui.separator();
    ui.add_space(10.0);

    show_records_table(app, ui);
}

fn show_records_table(app: &App, ui: &mut Ui) {
    let show_reason = app.config.ui.show_reason_column;
    let show_gps = app.config.ui.show_gps_column;
    let num_columns = 8 + usize::from(show_reason) + usize::from(show_gps);

    ScrollArea::both().show(ui, |ui| {
        egui::Grid::new("attendance_records_grid")
            .num_columns(num_columns)
            .striped(true)
            .min_col_width(80.0)
            .spacing([12.0, 8.0])
            .show(ui, |ui| {
                // Header
                ui.strong("Date");
                ui.strong("Time");
                ui.strong("Name");
                ui.strong("Serial");
                ui.strong("Job");
                ui.strong("Branch");
                ui.strong("Type");
                ui.strong("Time Diff");
                if show_reason {
                    ui.strong("Reason");
                }
                if show_gps {
                    ui.strong("GPS");
                }
                ui.end_row();

                for record in &app.filtered {
                    ui.label(record.display_date());
                    ui.label(record.display_time());
                    ui.label(&record.name);
                    ui.label(record.serial_number.as_deref().unwrap_or("-"));
                    ui.label(record.job.as_deref().unwrap_or("-"));
                    ui.label(record.branch.as_deref().unwrap_or("-"));
                    ui.label(record.kind.label());
                    ui.label(record.time_diff.as_deref().unwrap_or("-"));
                    if show_reason {
                        ui.label(record.reason.as_deref().unwrap_or("-"));
                    }
                    if show_gps {
                        ui.label(record.gps.as_deref().unwrap_or("-"));
                    }
                    ui.end_row();
                }

                if app.filtered.is_empty() {
                    ui.label("No records match the current filters.");
                    ui.end_row();
                }
            });
    });
}
