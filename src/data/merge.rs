use super::model::{Dataset, Habitat, Observation, RawTable};
use super::schema;

/// Tag each source with its habitat and concatenate, forest rows first.
///
/// The merged column list is the ordered union of both sources with
/// `Location_Type` appended unless a source already carried it.
pub fn merge(forest: &RawTable, grassland: &RawTable) -> Dataset {
    let mut columns: Vec<String> = Vec::new();
    for column in forest.columns.iter().chain(&grassland.columns) {
        if !columns.contains(column) {
            columns.push(column.clone());
        }
    }
    if !columns.iter().any(|c| c == schema::LOCATION_TYPE) {
        columns.push(schema::LOCATION_TYPE.to_string());
    }

    let observations = [(forest, Habitat::Forest), (grassland, Habitat::Grassland)]
        .into_iter()
        .flat_map(|(table, habitat)| {
            table
                .rows
                .iter()
                .map(move |row| Observation::from_row(&table.columns, row, habitat))
        })
        .collect();

    Dataset {
        columns,
        observations,
    }
}
