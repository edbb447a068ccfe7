use eframe::egui::{self, Color32, RichText, Ui};

use crate::data::export::write_csv;
use crate::data::model::{Table, ALLOCATED_QTY, FABRIC_TYPE, SKU, TOTAL_FABRIC_REQUIRED, VENDOR};
use crate::data::selection::DateRange;
use crate::state::{AppState, Tab};

use super::{plot, table};

const TIPS: &[&str] = &[
    "Track how much fabric you order vs. how much you actually cut to spot waste early.",
    "Group jobs using the same fabric together to cut fewer rolls and minimize scraps.",
    "Keep leftover strips and use them for small orders or samples first.",
    "Lay out your patterns efficiently on the fabric to use up edges and corners.",
    "If a supplier consistently wastes fabric, reduce small orders for them until their yield improves.",
    "Share your upcoming orders with vendors so they can buy just the right amount of fabric.",
];

/// Render the tab strip and the active tab.
pub fn central_panel(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        ui.selectable_value(&mut state.active_tab, Tab::Forecast, "📈 Forecast");
        ui.selectable_value(&mut state.active_tab, Tab::Allocations, "📊 Allocations");
        ui.selectable_value(&mut state.active_tab, Tab::FabricUsage, "🧵 Fabric Usage");
        ui.selectable_value(&mut state.active_tab, Tab::Recommendations, "💡 Recommendations");
    });
    ui.separator();

    if state.active_tab == Tab::Recommendations {
        recommendations_tab(ui);
        return;
    }

    if state.views.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No data loaded  (File → Open data folder…)");
        });
        return;
    }

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| match state.active_tab {
            Tab::Forecast => forecast_tab(ui, state),
            Tab::Allocations => allocation_tab(ui, state),
            Tab::FabricUsage => fabric_tab(ui, state),
            Tab::Recommendations => {}
        });
}

fn forecast_tab(ui: &mut Ui, state: &mut AppState) {
    ui.heading("30-Day SKU Forecast");

    if let Some(selection) = &state.selection {
        let mut range = selection.range;
        ui.horizontal(|ui: &mut Ui| {
            ui.label("Select Forecast Date Range");
            ui.add(egui_extras::DatePickerButton::new(&mut range.start).id_salt("range_start"));
            ui.label("–");
            ui.add(egui_extras::DatePickerButton::new(&mut range.end).id_salt("range_end"));
        });
        state.set_range(DateRange::new(range.start, range.end));
    }

    let Some(views) = &state.views else {
        return;
    };
    let view = match &views.forecast {
        Ok(view) => view,
        Err(e) => {
            ui.label(RichText::new(e.to_string()).color(Color32::RED));
            return;
        }
    };

    plot::forecast_plot(ui, view, &state.sku_colors);

    let mut status = None;
    egui::CollapsingHeader::new("Show forecast data")
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            table::data_table(ui, "forecast_table", view.table());
            status = download_button(ui, "📥 Download Forecast Data", view.table(), "filtered_forecast.csv");
        });
    if status.is_some() {
        state.status_message = status;
    }
}

fn allocation_tab(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Vendor Allocation Suggestions");

    let Some(views) = &state.views else {
        return;
    };
    let view = views.allocation.table();

    plot::grouped_bar_plot(
        ui,
        "allocation_plot",
        "Allocated Units by Vendor",
        &plot::grouped_bars(view, VENDOR, SKU, ALLOCATED_QTY),
        &state.sku_colors,
    );

    let mut status = None;
    egui::CollapsingHeader::new("Show allocation data")
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            table::data_table(ui, "allocation_table", view);
            status = download_button(ui, "📥 Download Allocation Data", view, "filtered_allocations.csv");
        });
    if status.is_some() {
        state.status_message = status;
    }
}

fn fabric_tab(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Fabric Usage Summary");

    let Some(views) = &state.views else {
        return;
    };
    let view = views.fabric.table();

    plot::grouped_bar_plot(
        ui,
        "fabric_plot",
        "Total Fabric Required by Vendor & Type",
        &plot::grouped_bars(view, FABRIC_TYPE, VENDOR, TOTAL_FABRIC_REQUIRED),
        &state.vendor_colors,
    );

    let mut status = None;
    egui::CollapsingHeader::new("Show fabric usage data")
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            table::data_table(ui, "fabric_table", view);
            status = download_button(ui, "📥 Download Fabric Data", view, "filtered_fabric_summary.csv");
        });
    if status.is_some() {
        state.status_message = status;
    }
}

fn recommendations_tab(ui: &mut Ui) {
    ui.heading("Easy Tips to Save Fabric and Cut Waste");
    ui.add_space(6.0);
    for tip in TIPS {
        ui.label(format!("• {tip}"));
    }
}

/// Show a download button; on click ask for a file name and export the view.
/// Returns an error message for the status line when the export fails.
fn download_button(ui: &mut Ui, label: &str, view: &Table, file_name: &str) -> Option<String> {
    if !ui.button(label).clicked() {
        return None;
    }
    let path = rfd::FileDialog::new()
        .set_title(label)
        .set_file_name(file_name)
        .add_filter("CSV", &["csv"])
        .save_file()?;

    match write_csv(view, &path) {
        Ok(()) => None,
        Err(e) => {
            log::error!("Export failed: {e:#}");
            Some(format!("Error: {e:#}"))
        }
    }
}
