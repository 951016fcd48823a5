use std::path::PathBuf;

use eframe::egui::{self, Color32, RichText, ScrollArea, Slider, Ui};

use crate::data::export;
use crate::data::filter::{HabitatFilter, YearControl};
use crate::data::pipeline::EnvironmentalSection;
use crate::state::AppState;
use crate::ui::{plot, table};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    if state.dataset.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    // Edit a copy; the state re-runs the pipeline only if it changed.
    let mut selection = state.selection;

    egui::ComboBox::from_label("Select Habitat Type")
        .selected_text(selection.habitat.label())
        .show_ui(ui, |ui: &mut Ui| {
            for habitat in HabitatFilter::ALL {
                ui.selectable_value(&mut selection.habitat, habitat, habitat.label());
            }
        });
    ui.add_space(8.0);

    match state.year_control {
        YearControl::Unavailable => {
            ui.label("Year Range: no years in the data");
        }
        YearControl::Fixed(year) => {
            ui.label(format!("Year Range: {year} (Only one year available)"));
        }
        YearControl::Range { min, max } => {
            ui.strong("Select Year Range");
            if let Some(years) = selection.years.as_mut() {
                let lo_changed = ui
                    .add(Slider::new(&mut years.lo, min..=max).text("From"))
                    .changed();
                let hi_changed = ui
                    .add(Slider::new(&mut years.hi, min..=max).text("To"))
                    .changed();
                // Dragging one end past the other pushes it along.
                if lo_changed && years.lo > years.hi {
                    years.hi = years.lo;
                }
                if hi_changed && years.hi < years.lo {
                    years.lo = years.hi;
                }
            }
        }
    }

    state.set_selection(selection);

    ui.separator();
    if let (Some(ds), Some(views)) = (&state.dataset, &state.views) {
        ui.label(format!(
            "{} of {} observations selected",
            views.filtered.len(),
            ds.len()
        ));
    }
}

// ---------------------------------------------------------------------------
// Central panel – the dashboard sections
// ---------------------------------------------------------------------------

pub fn dashboard(ui: &mut Ui, state: &AppState) {
    ui.heading("Bird Species Observation Dashboard");

    if let Some(err) = &state.load_error {
        ui.separator();
        ui.label(RichText::new("Could not load the observation data").strong());
        ui.label(RichText::new(err).color(Color32::RED));
        ui.label("Open other files from the File menu or press Reload.");
        return;
    }

    let (Some(dataset), Some(views)) = (&state.dataset, &state.views) else {
        ui.label("Loading…");
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.add_space(8.0);
            ui.heading("Dataset Overview");
            table::observation_table(ui, dataset, &views.filtered);

            ui.add_space(16.0);
            ui.heading("Species Observation Count");
            plot::species_chart(ui, &views.top_species);

            ui.add_space(16.0);
            ui.heading("Environmental Factors Analysis");
            match &views.environmental {
                EnvironmentalSection::Ready(points) => {
                    plot::environment_chart(ui, points, &state.colors);
                }
                EnvironmentalSection::Failed(e) => {
                    ui.label(RichText::new(e.to_string()).color(Color32::RED));
                }
                EnvironmentalSection::Unavailable => {}
            }

            ui.add_space(16.0);
            ui.heading("Observation Trend Over Time");
            plot::trend_chart(ui, &views.time_series, &state.colors);
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open forest data…").clicked() {
                if let Some(path) = open_source_dialog("Open forest observations") {
                    state.set_forest_path(path);
                }
                ui.close_menu();
            }
            if ui.button("Open grassland data…").clicked() {
                if let Some(path) = open_source_dialog("Open grassland observations") {
                    state.set_grassland_path(path);
                }
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                state.reload();
                ui.close_menu();
            }
            ui.separator();
            let can_export = state.views.is_some();
            if ui
                .add_enabled(can_export, egui::Button::new("Export filtered rows…"))
                .clicked()
            {
                export_rows_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(can_export, egui::Button::new("Export summary…"))
                .clicked()
            {
                export_summary_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} observations loaded, {} visible",
                ds.len(),
                state.views.as_ref().map_or(0, |v| v.filtered.len())
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

fn open_source_dialog(title: &str) -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title(title)
        .add_filter(
            "Supported files",
            &["xlsx", "xlsm", "xlsb", "xls", "ods", "csv", "parquet", "pq"],
        )
        .add_filter("Spreadsheet", &["xlsx", "xlsm", "xlsb", "xls", "ods"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file()
}

fn export_rows_dialog(state: &mut AppState) {
    let (Some(ds), Some(views)) = (&state.dataset, &state.views) else {
        return;
    };
    let Some(path) = rfd::FileDialog::new()
        .set_title("Export filtered observations")
        .set_file_name("filtered_observations.csv")
        .add_filter("CSV", &["csv"])
        .save_file()
    else {
        return;
    };

    state.status_message = match export::export_filtered_csv(&path, ds, &views.filtered) {
        Ok(()) => None,
        Err(e) => {
            log::error!("Export failed: {e:#}");
            Some(format!("Error: {e:#}"))
        }
    };
}

fn export_summary_dialog(state: &mut AppState) {
    let Some(views) = &state.views else {
        return;
    };
    let Some(path) = rfd::FileDialog::new()
        .set_title("Export summary")
        .set_file_name("observation_summary.json")
        .add_filter("JSON", &["json"])
        .save_file()
    else {
        return;
    };

    state.status_message = match export::export_summary(&path, &state.selection, views) {
        Ok(()) => None,
        Err(e) => {
            log::error!("Export failed: {e:#}");
            Some(format!("Error: {e:#}"))
        }
    };
}
