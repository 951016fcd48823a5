use std::collections::BTreeMap;

use eframe::egui::{RichText, Ui};
use egui_plot::{Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoint, Points};

use crate::color::{BAR_COLOR, HabitatColors};
use crate::data::aggregate::{EnvironmentalPoint, SpeciesCount, YearHabitatCount};
use crate::data::model::Habitat;

const CHART_HEIGHT: f32 = 320.0;

/// Hover distance in screen points for scatter tooltips.
const HOVER_RADIUS: f32 = 12.0;

const MIN_MARKER_RADIUS: f32 = 2.0;
const MAX_MARKER_RADIUS: f32 = 12.0;

// ---------------------------------------------------------------------------
// Top species bar chart
// ---------------------------------------------------------------------------

pub fn species_chart(ui: &mut Ui, counts: &[SpeciesCount]) {
    ui.label(RichText::new("Top 10 Observed Bird Species").strong());

    let names: Vec<String> = counts.iter().map(|c| c.species.clone()).collect();
    let bars: Vec<Bar> = counts
        .iter()
        .enumerate()
        .map(|(i, c)| {
            Bar::new(i as f64, c.count as f64)
                .name(&c.species)
                .width(0.7)
        })
        .collect();

    Plot::new("species_chart")
        .height(CHART_HEIGHT)
        .x_axis_label("Bird Species")
        .y_axis_label("Observation Count")
        .x_axis_formatter(move |mark, _range| category_label(&names, mark))
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(BAR_COLOR).name("Count"));
        });
}

/// Species name under an integral tick, nothing between bars.
fn category_label(names: &[String], mark: GridMark) -> String {
    let pos = mark.value.round();
    if (mark.value - pos).abs() > 1e-6 || pos < 0.0 {
        return String::new();
    }
    names.get(pos as usize).cloned().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Temperature vs humidity scatter
// ---------------------------------------------------------------------------

/// Marker radius grows with the square root of the count so that marker
/// area tracks the number of birds.
pub fn marker_radius(count: i64, max_count: i64) -> f32 {
    if count <= 0 || max_count <= 0 {
        return MIN_MARKER_RADIUS;
    }
    let share = (count as f32 / max_count as f32).min(1.0);
    MIN_MARKER_RADIUS + (MAX_MARKER_RADIUS - MIN_MARKER_RADIUS) * share.sqrt()
}

pub fn environment_chart(ui: &mut Ui, points: &[EnvironmentalPoint], colors: &HabitatColors) {
    ui.label(RichText::new("Temperature vs Humidity and Bird Count").strong());

    let plotted: Vec<(&EnvironmentalPoint, [f64; 2])> = points
        .iter()
        .filter_map(|p| Some((p, [p.temperature?, p.humidity?])))
        .collect();
    let max_count = plotted.iter().map(|(p, _)| p.count).max().unwrap_or(0);

    // One plot item per (habitat, marker size); legend merges equal names.
    let mut groups: BTreeMap<(Habitat, u32), Vec<[f64; 2]>> = BTreeMap::new();
    for (p, xy) in &plotted {
        let size_key = (marker_radius(p.count, max_count) * 10.0).round() as u32;
        groups.entry((p.habitat, size_key)).or_default().push(*xy);
    }

    let response = Plot::new("environment_chart")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_label("Temperature (°C)")
        .y_axis_label("Humidity (%)")
        .show(ui, |plot_ui| {
            for ((habitat, size_key), xy) in groups {
                plot_ui.points(
                    Points::new(xy)
                        .name(habitat.label())
                        .color(colors.color_for(habitat).gamma_multiply(0.8))
                        .radius(size_key as f32 / 10.0)
                        .filled(true),
                );
            }

            let pointer = plot_ui.pointer_coordinate()?;
            let pointer_pos = plot_ui.screen_from_plot(pointer);
            plotted
                .iter()
                .map(|(p, [x, y])| {
                    let pos = plot_ui.screen_from_plot(PlotPoint::new(*x, *y));
                    (pos.distance(pointer_pos), *p)
                })
                .filter(|(d, _)| *d <= HOVER_RADIUS)
                .min_by(|a, b| a.0.total_cmp(&b.0))
                .map(|(_, p)| p)
        });

    if let Some(p) = response.inner {
        response.response.on_hover_text(format!(
            "{}\n{}\nBird Count: {}",
            p.species.as_deref().unwrap_or("(unnamed)"),
            p.habitat,
            p.count
        ));
    }
}

// ---------------------------------------------------------------------------
// Observations per year
// ---------------------------------------------------------------------------

pub fn trend_chart(ui: &mut Ui, series: &[YearHabitatCount], colors: &HabitatColors) {
    ui.label(RichText::new("Bird Observations Over Time").strong());

    Plot::new("trend_chart")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_label("Year")
        .y_axis_label("Observation Count")
        .x_axis_formatter(|mark, _range| {
            if mark.value.fract() == 0.0 {
                format!("{}", mark.value as i64)
            } else {
                String::new()
            }
        })
        .show(ui, |plot_ui| {
            for habitat in Habitat::ALL {
                let line: Vec<[f64; 2]> = series
                    .iter()
                    .filter(|s| s.habitat == habitat)
                    .map(|s| [s.year as f64, s.count as f64])
                    .collect();
                if line.is_empty() {
                    continue;
                }
                let color = colors.color_for(habitat);
                plot_ui.line(
                    Line::new(line.clone())
                        .name(habitat.label())
                        .color(color)
                        .width(2.0),
                );
                plot_ui.points(
                    Points::new(line)
                        .name(habitat.label())
                        .color(color)
                        .radius(3.0),
                );
            }
        });
}
