use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::Dataset;

const TABLE_HEIGHT: f32 = 320.0;

/// Render the filtered observations, one row per record, dataset column order.
pub fn observation_table(ui: &mut Ui, dataset: &Dataset, indices: &[usize]) {
    if indices.is_empty() {
        ui.label("No observations match the current filters.");
    }

    let row_height = egui::TextStyle::Body.resolve(ui.style()).size + 6.0;

    ui.push_id("observation_table", |ui: &mut Ui| {
        egui::ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .vscroll(true)
                .max_scroll_height(TABLE_HEIGHT)
                .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
                .column(Column::auto().at_least(40.0))
                .columns(
                    Column::auto().at_least(60.0).clip(true),
                    dataset.columns.len(),
                )
                .header(row_height, |mut header| {
                    header.col(|ui| {
                        ui.strong("#");
                    });
                    for column in &dataset.columns {
                        header.col(|ui| {
                            ui.strong(column);
                        });
                    }
                })
                .body(|body| {
                    body.rows(row_height, indices.len(), |mut row| {
                        let i = indices[row.index()];
                        let obs = &dataset.observations[i];
                        row.col(|ui| {
                            ui.label(i.to_string());
                        });
                        for column in &dataset.columns {
                            row.col(|ui| {
                                ui.label(obs.cell(column).to_string());
                            });
                        }
                    });
                });
        });
    });
}
