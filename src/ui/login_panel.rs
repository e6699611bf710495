//! Credential gate for the reports view.

use eframe::egui::{self, RichText, Ui};
use egui_phosphor::regular::{FILE_XLS, LINK_BREAK, SIGN_IN};

use super::app::App;

/// Show the login form.
pub fn show(app: &mut App, ui: &mut Ui) {
    ui.vertical_centered(|ui| {
        ui.add_space(60.0);
        ui.label(RichText::new(FILE_XLS).size(48.0));
        ui.add_space(8.0);
        ui.heading("Reports Access");
        ui.label(RichText::new("UniTeam attendance reports").weak());
        ui.add_space(20.0);

        ui.group(|ui| {
            ui.set_width(360.0);
            ui.add_space(10.0);

            if app.show_url_field {
                ui.label("Sync URL");
                ui.add(
                    egui::TextEdit::singleline(&mut app.sync_url_input)
                        .hint_text("https://script.google.com/...")
                        .desired_width(f32::INFINITY),
                );
                ui.add_space(4.0);
                ui.horizontal(|ui| {
                    if ui.add_enabled(!app.is_testing, egui::Button::new("Test Connection")).clicked() {
                        app.test_connection();
                    }
                    if app.is_testing {
                        ui.spinner();
                    } else if let Some(result) = &app.connection_test {
                        match result {
                            Ok(()) => {
                                ui.colored_label(super::components::colors::SUCCESS, "Reachable");
                            }
                            Err(e) => {
                                ui.colored_label(super::components::colors::ERROR, e);
                            }
                        }
                    }
                });
                ui.add_space(8.0);
            }

            ui.label("Username");
            ui.add(egui::TextEdit::singleline(&mut app.username).desired_width(f32::INFINITY));
            ui.add_space(8.0);

            ui.label("Password");
            ui.add(
                egui::TextEdit::singleline(&mut app.password)
                    .password(true)
                    .desired_width(f32::INFINITY),
            );
            ui.add_space(14.0);

            let button = egui::Button::new(format!("{SIGN_IN} Sign in and view reports"))
                .min_size(egui::vec2(ui.available_width(), 32.0));
            if ui.add_enabled(!app.is_loading, button).clicked() {
                app.fetch_data(true);
            }

            if app.is_loading {
                ui.add_space(6.0);
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Loading report data...");
                });
            }

            ui.add_space(10.0);
        });

        if app.config.is_linked() {
            ui.add_space(12.0);
            if ui
                .button(RichText::new(format!("{LINK_BREAK} Change company link / unlink")).small())
                .clicked()
            {
                app.show_unlink_confirm = true;
            }
        }
    });
}
