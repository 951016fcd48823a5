use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::schema;

// ---------------------------------------------------------------------------
// CellValue – a single spreadsheet cell
// ---------------------------------------------------------------------------

/// A dynamically-typed cell as read from a spreadsheet, CSV or Parquet file.
/// Grouping downstream uses `BTreeMap`, so `CellValue` must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// Date or time kept as text for display.
    Date(String),
    Null,
}

// -- Manual Eq/Ord so we can use CellValue as a map key --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
                Date(_) => 5,
            }
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) | (Date(a), Date(b)) => a.cmp(b),
            _ => discriminant(self).cmp(&discriminant(other)),
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::String(s) | CellValue::Date(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Date(d) => write!(f, "{d}"),
            CellValue::Null => Ok(()),
        }
    }
}

impl CellValue {
    /// Numeric view of the cell. Text is parsed leniently so CSV sources
    /// behave like typed spreadsheet cells.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) if !v.is_nan() => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::String(s) => s.trim().parse::<f64>().ok().filter(|v| !v.is_nan()),
            _ => None,
        }
    }

    /// Integer view of the cell; floats must be integral.
    pub fn as_year(&self) -> Option<i32> {
        match self {
            CellValue::Integer(i) => i32::try_from(*i).ok(),
            CellValue::Float(v) if v.is_finite() && v.fract() == 0.0 => Some(*v as i32),
            CellValue::String(s) => {
                let s = s.trim();
                s.parse::<i32>()
                    .ok()
                    .or_else(|| CellValue::Float(s.parse().ok()?).as_year())
            }
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::String(s) if !s.is_empty() => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

// ---------------------------------------------------------------------------
// Habitat – the discriminator assigned at merge time
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Habitat {
    Forest,
    Grassland,
}

impl Habitat {
    pub const ALL: [Habitat; 2] = [Habitat::Forest, Habitat::Grassland];

    pub fn label(self) -> &'static str {
        match self {
            Habitat::Forest => "Forest",
            Habitat::Grassland => "Grassland",
        }
    }
}

impl fmt::Display for Habitat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// RawTable – one source file as read
// ---------------------------------------------------------------------------

/// A source table: header row plus cell rows, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Observation – one row of the unified dataset
// ---------------------------------------------------------------------------

/// A single bird sighting with its typed key attributes extracted.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub habitat: Habitat,
    pub common_name: Option<String>,
    pub year: Option<i32>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    /// Raw `Initial_Three_Min_Cnt` cell; coerced only when charted.
    pub count: CellValue,
    /// Every source cell (plus `Location_Type`) keyed by column name.
    pub cells: BTreeMap<String, CellValue>,
}

impl Observation {
    /// Build a record from a source row, tagging it with `habitat`.
    pub fn from_row(columns: &[String], row: &[CellValue], habitat: Habitat) -> Self {
        let mut cells: BTreeMap<String, CellValue> = columns
            .iter()
            .zip(row.iter().chain(std::iter::repeat(&CellValue::Null)))
            .map(|(c, v)| (c.clone(), v.clone()))
            .collect();
        cells.insert(
            schema::LOCATION_TYPE.to_string(),
            CellValue::String(habitat.label().to_string()),
        );

        let get = |name: &str| cells.get(name).cloned().unwrap_or(CellValue::Null);

        Observation {
            habitat,
            common_name: get(schema::COMMON_NAME).as_text().map(str::to_string),
            year: get(schema::YEAR).as_year(),
            temperature: get(schema::TEMPERATURE).as_f64(),
            humidity: get(schema::HUMIDITY).as_f64(),
            count: get(schema::INITIAL_THREE_MIN_CNT),
            cells,
        }
    }

    /// Cell for display; absent columns read as null.
    pub fn cell(&self, column: &str) -> &CellValue {
        const NULL: &CellValue = &CellValue::Null;
        self.cells.get(column).unwrap_or(NULL)
    }
}

// ---------------------------------------------------------------------------
// Dataset – the merged forest + grassland table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    /// Ordered union of the source columns, `Location_Type` included.
    pub columns: Vec<String>,
    pub observations: Vec<Observation>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }
}
