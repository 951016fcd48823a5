use super::aggregate::{
    self, CoercionError, EnvironmentalPoint, SpeciesCount, TOP_SPECIES_LIMIT, YearHabitatCount,
};
use super::filter::{FilterSelection, filtered_indices};
use super::model::Dataset;
use super::schema::DatasetSchema;

/// State of the temperature/humidity section.
#[derive(Debug, Clone, PartialEq)]
pub enum EnvironmentalSection {
    /// The data lacks `Temperature` or `Humidity`.
    Unavailable,
    Ready(Vec<EnvironmentalPoint>),
    /// Count coercion failed; only this section is affected.
    Failed(CoercionError),
}

/// Everything the dashboard renders for one selection.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardViews {
    /// Indices into the dataset, in dataset order.
    pub filtered: Vec<usize>,
    pub top_species: Vec<SpeciesCount>,
    pub environmental: EnvironmentalSection,
    pub time_series: Vec<YearHabitatCount>,
}

/// Filter then aggregate. Pure: the same inputs always give equal views.
pub fn run(dataset: &Dataset, schema: &DatasetSchema, selection: &FilterSelection) -> DashboardViews {
    let filtered = filtered_indices(dataset, selection);

    let environmental = if schema.environmental_analysis_available() {
        match aggregate::environmental_points(dataset, &filtered) {
            Ok(points) => EnvironmentalSection::Ready(points),
            Err(e) => {
                log::error!("Environmental analysis failed: {e}");
                EnvironmentalSection::Failed(e)
            }
        }
    } else {
        EnvironmentalSection::Unavailable
    };

    DashboardViews {
        top_species: aggregate::top_species(dataset, &filtered, TOP_SPECIES_LIMIT),
        time_series: aggregate::time_series(dataset, &filtered),
        environmental,
        filtered,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{HabitatFilter, YearControl, YearRange};
    use crate::data::merge::merge;
    use crate::data::model::{CellValue, Habitat, RawTable};

    fn source(rows: &[(&str, i64, CellValue)], with_env: bool) -> RawTable {
        let mut columns = vec!["Common_Name", "Year", "Initial_Three_Min_Cnt"];
        if with_env {
            columns.extend(["Temperature", "Humidity"]);
        }
        RawTable {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: rows
                .iter()
                .map(|(name, year, count)| {
                    let mut row = vec![
                        CellValue::String(name.to_string()),
                        CellValue::Integer(*year),
                        count.clone(),
                    ];
                    if with_env {
                        row.extend([CellValue::Float(18.5), CellValue::Float(70.0)]);
                    }
                    row
                })
                .collect(),
        }
    }

    fn two_year_dataset() -> Dataset {
        let forest = source(
            &[
                ("Ovenbird", 2020, CellValue::Integer(2)),
                ("Wood Thrush", 2021, CellValue::Integer(1)),
                ("Ovenbird", 2020, CellValue::Integer(3)),
            ],
            true,
        );
        let grassland = source(
            &[
                ("Field Sparrow", 2020, CellValue::Integer(4)),
                ("Bobolink", 2021, CellValue::Integer(1)),
            ],
            true,
        );
        merge(&forest, &grassland)
    }

    #[test]
    fn test_forest_single_year_scenario() {
        let ds = two_year_dataset();
        let schema = DatasetSchema::inspect(&ds);
        let selection = FilterSelection {
            habitat: HabitatFilter::Forest,
            years: Some(YearRange::new(2020, 2020)),
        };

        let views = run(&ds, &schema, &selection);

        assert_eq!(views.filtered, vec![0, 2]);
        assert!(views.filtered.iter().all(|&i| {
            let o = &ds.observations[i];
            o.year == Some(2020) && o.habitat == Habitat::Forest
        }));
        assert_eq!(
            views.time_series,
            vec![YearHabitatCount { year: 2020, habitat: Habitat::Forest, count: 2 }]
        );
        assert_eq!(
            views.top_species,
            vec![SpeciesCount { species: "Ovenbird".into(), count: 2 }]
        );
        match &views.environmental {
            EnvironmentalSection::Ready(points) => {
                assert_eq!(points.iter().map(|p| p.count).collect::<Vec<_>>(), vec![2, 3]);
            }
            other => panic!("expected ready section, got {other:?}"),
        }
    }

    #[test]
    fn test_single_year_dataset_returns_everything() {
        let forest = source(&[("Ovenbird", 2022, CellValue::Integer(1))], false);
        let grassland = source(&[("Bobolink", 2022, CellValue::Integer(1))], false);
        let ds = merge(&forest, &grassland);
        let control = YearControl::from_dataset(&ds);
        assert_eq!(control, YearControl::Fixed(2022));

        let selection = FilterSelection::initial(&control);
        let views = run(&ds, &DatasetSchema::inspect(&ds), &selection);
        assert_eq!(views.filtered, vec![0, 1]);
        assert_eq!(views.environmental, EnvironmentalSection::Unavailable);
    }

    #[test]
    fn test_empty_selection_degrades_to_empty_views() {
        let ds = two_year_dataset();
        let selection = FilterSelection {
            habitat: HabitatFilter::Both,
            years: Some(YearRange::new(1990, 1991)),
        };
        let views = run(&ds, &DatasetSchema::inspect(&ds), &selection);

        assert!(views.filtered.is_empty());
        assert!(views.top_species.is_empty());
        assert!(views.time_series.is_empty());
        assert_eq!(views.environmental, EnvironmentalSection::Ready(Vec::new()));
    }

    #[test]
    fn test_bad_count_only_fails_environmental_section() {
        let forest = source(&[("Ovenbird", 2020, CellValue::String("lots".into()))], true);
        let grassland = source(&[("Bobolink", 2020, CellValue::Integer(1))], true);
        let ds = merge(&forest, &grassland);
        let control = YearControl::from_dataset(&ds);
        let views = run(&ds, &DatasetSchema::inspect(&ds), &FilterSelection::initial(&control));

        assert!(matches!(views.environmental, EnvironmentalSection::Failed(ref e) if e.row == 0));
        assert_eq!(views.top_species.len(), 2);
        assert_eq!(views.time_series.iter().map(|t| t.count).sum::<usize>(), 2);
    }

    #[test]
    fn test_run_is_idempotent() {
        let ds = two_year_dataset();
        let schema = DatasetSchema::inspect(&ds);
        for habitat in HabitatFilter::ALL {
            let selection = FilterSelection {
                habitat,
                years: Some(YearRange::new(2020, 2021)),
            };
            let first = run(&ds, &schema, &selection);
            let second = run(&ds, &schema, &selection);
            assert_eq!(first, second);
            assert_eq!(
                first.time_series.iter().map(|t| t.count).sum::<usize>(),
                first.filtered.len()
            );
        }
    }
}
