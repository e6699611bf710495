//! Shared UI components.

use eframe::egui::{self, Color32, Ui};

/// Status indicator colors.
pub mod colors {
    use super::Color32;

    pub const SUCCESS: Color32 = Color32::from_rgb(100, 200, 100);
    pub const ERROR: Color32 = Color32::from_rgb(255, 100, 100);
    pub const WARNING: Color32 = Color32::from_rgb(255, 200, 100);
    pub const NEUTRAL: Color32 = Color32::from_rgb(150, 150, 150);
    pub const ADMIN: Color32 = Color32::from_rgb(255, 165, 80);
}

/// Render a panel header with title.
pub fn panel_header(ui: &mut Ui, title: &str) {
    ui.heading(egui::RichText::new(title).size(24.0));
    ui.add_space(10.0);
    ui.separator();
    ui.add_space(20.0);
}

/// What the user did inside a multi-select dropdown this frame.
pub enum MultiSelectAction {
    None,
    Toggle(String),
    Clear,
}

/// Searchable multi-select dropdown.
///
/// Shows the placeholder when nothing is selected, the value itself for a
/// single selection, and a count otherwise. The popup stays open across
/// toggles so several values can be picked in one go.
pub fn multi_select(
    ui: &mut Ui,
    id_salt: &str,
    options: &[String],
    selected: &[String],
    search: &mut String,
    placeholder: &str,
) -> MultiSelectAction {
    let mut action = MultiSelectAction::None;

    let summary = match selected.len() {
        0 => placeholder.to_string(),
        1 => selected[0].clone(),
        n => format!("{n} selected"),
    };

    egui::ComboBox::from_id_salt(id_salt)
        .width(180.0)
        .selected_text(summary)
        .show_ui(ui, |ui| {
            ui.add(
                egui::TextEdit::singleline(search)
                    .hint_text("Search...")
                    .desired_width(f32::INFINITY),
            );
            ui.separator();

            let needle = search.to_lowercase();
            let mut any_shown = false;

            egui::ScrollArea::vertical().max_height(200.0).show(ui, |ui| {
                for option in options {
                    if !needle.is_empty() && !option.to_lowercase().contains(&needle) {
                        continue;
                    }
                    any_shown = true;

                    let is_selected = selected.iter().any(|s| s == option);
                    if ui.selectable_label(is_selected, option).clicked() {
                        action = MultiSelectAction::Toggle(option.clone());
                    }
                }

                if !any_shown {
                    ui.weak("No matches");
                }
            });

            if !selected.is_empty() {
                ui.separator();
                if ui.button("Clear selected").clicked() {
                    action = MultiSelectAction::Clear;
                }
            }
        });

    action
}
