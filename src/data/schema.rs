use thiserror::Error;

use super::model::{Dataset, RawTable};

pub const COMMON_NAME: &str = "Common_Name";
pub const YEAR: &str = "Year";
pub const TEMPERATURE: &str = "Temperature";
pub const HUMIDITY: &str = "Humidity";
pub const INITIAL_THREE_MIN_CNT: &str = "Initial_Three_Min_Cnt";
pub const LOCATION_TYPE: &str = "Location_Type";

/// Columns every observation source must carry.
pub const REQUIRED_COLUMNS: [&str; 2] = [COMMON_NAME, YEAR];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("{source_name}: missing required column '{column}'")]
    MissingColumn { source_name: String, column: String },
}

/// Reject a source table that lacks one of [`REQUIRED_COLUMNS`].
pub fn require_columns(table: &RawTable, source_name: &str) -> Result<(), SchemaError> {
    for column in REQUIRED_COLUMNS {
        if table.column_index(column).is_none() {
            return Err(SchemaError::MissingColumn {
                source_name: source_name.to_string(),
                column: column.to_string(),
            });
        }
    }
    Ok(())
}

/// Optional features the merged dataset supports, decided once per load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DatasetSchema {
    pub has_temperature: bool,
    pub has_humidity: bool,
}

impl DatasetSchema {
    pub fn inspect(dataset: &Dataset) -> Self {
        Self {
            has_temperature: dataset.has_column(TEMPERATURE),
            has_humidity: dataset.has_column(HUMIDITY),
        }
    }

    /// The temperature/humidity scatter needs both readings.
    pub fn environmental_analysis_available(&self) -> bool {
        self.has_temperature && self.has_humidity
    }
}
