use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use super::aggregate::{SpeciesCount, YearHabitatCount};
use super::filter::FilterSelection;
use super::model::Dataset;
use super::pipeline::DashboardViews;

/// Write the filtered rows as CSV with the dataset's column order.
pub fn write_filtered_csv<W: Write>(writer: W, dataset: &Dataset, indices: &[usize]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer
        .write_record(&dataset.columns)
        .context("writing CSV header")?;
    for &i in indices {
        let obs = &dataset.observations[i];
        csv_writer
            .write_record(dataset.columns.iter().map(|c| obs.cell(c).to_string()))
            .with_context(|| format!("writing CSV row {i}"))?;
    }
    csv_writer.flush().context("flushing CSV")?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct Summary<'a> {
    selection: &'a FilterSelection,
    filtered_rows: usize,
    top_species: &'a [SpeciesCount],
    time_series: &'a [YearHabitatCount],
}

/// Selection plus aggregates as pretty JSON.
pub fn summary_json(selection: &FilterSelection, views: &DashboardViews) -> Result<String> {
    let summary = Summary {
        selection,
        filtered_rows: views.filtered.len(),
        top_species: &views.top_species,
        time_series: &views.time_series,
    };
    serde_json::to_string_pretty(&summary).context("serializing summary")
}

pub fn export_filtered_csv(path: &Path, dataset: &Dataset, indices: &[usize]) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    write_filtered_csv(file, dataset, indices)?;
    log::info!("Exported {} rows to {}", indices.len(), path.display());
    Ok(())
}

pub fn export_summary(path: &Path, selection: &FilterSelection, views: &DashboardViews) -> Result<()> {
    let json = summary_json(selection, views)?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    log::info!("Exported summary to {}", path.display());
    Ok(())
}
