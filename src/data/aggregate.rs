use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

use super::model::{CellValue, Dataset, Habitat};

/// Bars shown in the species chart.
pub const TOP_SPECIES_LIMIT: usize = 10;

// ---------------------------------------------------------------------------
// Top species
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpeciesCount {
    pub species: String,
    pub count: usize,
}

/// Count filtered rows per `Common_Name`, most observed first, at most `limit`.
///
/// Records without a species name are not counted. Equal counts keep the
/// grouping order, which is not part of the contract.
pub fn top_species(dataset: &Dataset, indices: &[usize], limit: usize) -> Vec<SpeciesCount> {
    let mut groups: BTreeMap<&str, usize> = BTreeMap::new();
    for &i in indices {
        if let Some(name) = dataset.observations[i].common_name.as_deref() {
            *groups.entry(name).or_default() += 1;
        }
    }

    let mut counts: Vec<SpeciesCount> = groups
        .into_iter()
        .map(|(species, count)| SpeciesCount {
            species: species.to_string(),
            count,
        })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(limit);
    counts
}

// ---------------------------------------------------------------------------
// Observations per year and habitat
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearHabitatCount {
    pub year: i32,
    pub habitat: Habitat,
    pub count: usize,
}

/// Count filtered rows per `(Year, Location_Type)`, ordered by year then habitat.
pub fn time_series(dataset: &Dataset, indices: &[usize]) -> Vec<YearHabitatCount> {
    let mut groups: BTreeMap<(i32, Habitat), usize> = BTreeMap::new();
    for &i in indices {
        let obs = &dataset.observations[i];
        if let Some(year) = obs.year {
            *groups.entry((year, obs.habitat)).or_default() += 1;
        }
    }
    groups
        .into_iter()
        .map(|((year, habitat), count)| YearHabitatCount {
            year,
            habitat,
            count,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Environmental correlation
// ---------------------------------------------------------------------------

/// The bird count cell of a filtered record is not an integer.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("row {row}: cannot convert Initial_Three_Min_Cnt value {value:?} to an integer")]
pub struct CoercionError {
    /// Position of the record in the merged dataset.
    pub row: usize,
    pub value: CellValue,
}

/// One scatter point: environmental readings plus encodings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvironmentalPoint {
    pub row: usize,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    /// Marker size.
    pub count: i64,
    /// Marker color.
    pub habitat: Habitat,
    /// Hover label.
    pub species: Option<String>,
}

/// Integer value of a count cell. Floats truncate toward zero; blanks,
/// NaN and non-numeric text fail.
pub fn coerce_count(value: &CellValue) -> Option<i64> {
    match value {
        CellValue::Integer(i) => Some(*i),
        CellValue::Float(f) if f.is_finite() => Some(f.trunc() as i64),
        CellValue::Bool(b) => Some(i64::from(*b)),
        CellValue::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Annotate every filtered record with its integer bird count.
///
/// The first record whose count cannot be coerced aborts the whole
/// computation.
pub fn environmental_points(
    dataset: &Dataset,
    indices: &[usize],
) -> Result<Vec<EnvironmentalPoint>, CoercionError> {
    indices
        .iter()
        .map(|&i| {
            let obs = &dataset.observations[i];
            let count = coerce_count(&obs.count).ok_or_else(|| CoercionError {
                row: i,
                value: obs.count.clone(),
            })?;
            Ok(EnvironmentalPoint {
                row: i,
                temperature: obs.temperature,
                humidity: obs.humidity,
                count,
                habitat: obs.habitat,
                species: obs.common_name.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Observation;

    fn dataset(rows: &[(&str, i32, Habitat, CellValue)]) -> Dataset {
        let columns: Vec<String> = ["Common_Name", "Year", "Temperature", "Humidity", "Initial_Three_Min_Cnt"]
            .iter()
            .map(|c| c.to_string())
            .collect();
        Dataset {
            columns: columns.clone(),
            observations: rows
                .iter()
                .map(|(name, year, habitat, count)| {
                    let row = vec![
                        CellValue::String(name.to_string()),
                        CellValue::Integer((*year).into()),
                        CellValue::Float(20.0),
                        CellValue::Float(65.0),
                        count.clone(),
                    ];
                    Observation::from_row(&columns, &row, *habitat)
                })
                .collect(),
        }
    }

    fn all(ds: &Dataset) -> Vec<usize> {
        (0..ds.len()).collect()
    }

    #[test]
    fn test_top_species_sorted_and_limited() {
        let mut rows = Vec::new();
        for (i, name) in ["A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L"]
            .iter()
            .enumerate()
        {
            for _ in 0..=i {
                rows.push((*name, 2018, Habitat::Forest, CellValue::Integer(1)));
            }
        }
        let ds = dataset(&rows);

        let top = top_species(&ds, &all(&ds), TOP_SPECIES_LIMIT);
        assert_eq!(top.len(), 10);
        assert!(top.windows(2).all(|w| w[0].count >= w[1].count));
        assert_eq!(top[0], SpeciesCount { species: "L".into(), count: 12 });
        assert_eq!(top[9].species, "C");
    }

    #[test]
    fn test_top_species_of_empty_view_is_empty() {
        let ds = dataset(&[("Ovenbird", 2018, Habitat::Forest, CellValue::Integer(1))]);
        assert!(top_species(&ds, &[], TOP_SPECIES_LIMIT).is_empty());
        assert!(time_series(&ds, &[]).is_empty());
        assert_eq!(environmental_points(&ds, &[]), Ok(Vec::new()));
    }

    #[test]
    fn test_time_series_counts_sum_to_rows() {
        let ds = dataset(&[
            ("Ovenbird", 2020, Habitat::Forest, CellValue::Integer(1)),
            ("Ovenbird", 2021, Habitat::Forest, CellValue::Integer(1)),
            ("Bobolink", 2020, Habitat::Grassland, CellValue::Integer(1)),
            ("Ovenbird", 2020, Habitat::Forest, CellValue::Integer(1)),
        ]);
        let series = time_series(&ds, &all(&ds));
        assert_eq!(
            series,
            vec![
                YearHabitatCount { year: 2020, habitat: Habitat::Forest, count: 2 },
                YearHabitatCount { year: 2020, habitat: Habitat::Grassland, count: 1 },
                YearHabitatCount { year: 2021, habitat: Habitat::Forest, count: 1 },
            ]
        );
        assert_eq!(series.iter().map(|s| s.count).sum::<usize>(), ds.len());
    }

    #[test]
    fn test_coerce_count() {
        assert_eq!(coerce_count(&CellValue::Integer(3)), Some(3));
        assert_eq!(coerce_count(&CellValue::Float(2.9)), Some(2));
        assert_eq!(coerce_count(&CellValue::String(" 4 ".into())), Some(4));
        assert_eq!(coerce_count(&CellValue::Bool(true)), Some(1));
        assert_eq!(coerce_count(&CellValue::Float(f64::NAN)), None);
        assert_eq!(coerce_count(&CellValue::String("many".into())), None);
        assert_eq!(coerce_count(&CellValue::Null), None);
    }

    #[test]
    fn test_environmental_points_fail_on_bad_count() {
        let ds = dataset(&[
            ("Ovenbird", 2020, Habitat::Forest, CellValue::Float(3.0)),
            ("Bobolink", 2020, Habitat::Grassland, CellValue::String("n/a".into())),
        ]);

        let err = environmental_points(&ds, &all(&ds)).unwrap_err();
        assert_eq!(err.row, 1);
        assert_eq!(err.value, CellValue::String("n/a".into()));

        let points = environmental_points(&ds, &[0]).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].count, 3);
        assert_eq!(points[0].temperature, Some(20.0));
        assert_eq!(points[0].species.as_deref(), Some("Ovenbird"));
    }
}
