use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::color::ColorMap;
use crate::data::selection::MultiChoice;
use crate::state::{AppState, Control};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// A change requested by a multi-select widget, applied after rendering.
enum ChoiceAction {
    Toggle(String),
    All,
    None,
}

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("🎯 Target your view!");
    ui.label("Choose the SKU(s) and vendor(s) you want to analyze.");
    ui.separator();

    ui.heading("Filters");

    let Some(selection) = &state.selection else {
        ui.label("No data loaded.");
        return;
    };

    // Clone what we need so we can mutate state after the widgets.
    let skus = selection.skus.clone();
    let vendors = selection.vendors.clone();
    let mut actions: Vec<(Control, ChoiceAction)> = Vec::new();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (control, label, choice, colors) in [
                (Control::Skus, "SKU(s)", &skus, &state.sku_colors),
                (Control::Vendors, "Vendor(s)", &vendors, &state.vendor_colors),
            ] {
                if let Some(action) = multi_select(ui, label, choice, colors) {
                    actions.push((control, action));
                }
            }
        });

    for (control, action) in actions {
        match action {
            ChoiceAction::Toggle(value) => state.toggle(control, &value),
            ChoiceAction::All => state.select_all(control),
            ChoiceAction::None => state.select_none(control),
        }
    }
}

fn multi_select(
    ui: &mut Ui,
    label: &str,
    choice: &MultiChoice,
    colors: &ColorMap,
) -> Option<ChoiceAction> {
    let mut action = None;

    // Show count of selected / total in the header
    let n_selected = choice.selected().len();
    let n_total = choice.options().len();
    let header_text = format!("{label}  ({n_selected}/{n_total})");

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(label)
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    action = Some(ChoiceAction::All);
                }
                if ui.small_button("None").clicked() {
                    action = Some(ChoiceAction::None);
                }
            });

            for value in choice.options() {
                let mut checked = choice.contains(value);
                let text = RichText::new(value).color(colors.color_for(value));
                if ui.checkbox(&mut checked, text).changed() {
                    action = Some(ChoiceAction::Toggle(value.clone()));
                }
            }
        });

    action
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open data folder…").clicked() {
                open_folder_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                state.reload();
                ui.close_menu();
            }
        });

        ui.separator();
        ui.strong(crate::TITLE);
        ui.separator();

        if let Some(ds) = &state.datasets {
            ui.label(format!(
                "{} forecast rows, {} allocations, {} fabric rows",
                ds.forecast.len(),
                ds.allocation.len(),
                ds.fabric.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Folder dialog
// ---------------------------------------------------------------------------

pub fn open_folder_dialog(state: &mut AppState) {
    let folder = rfd::FileDialog::new()
        .set_title("Open prediction data folder")
        .set_directory(&state.config.data_dir)
        .pick_folder();

    if let Some(dir) = folder {
        log::info!("Switching data folder to {}", dir.display());
        state.set_data_dir(dir);
    }
}
