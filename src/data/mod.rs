/// Data layer: loading, merging, filtering and aggregation.
///
/// Architecture:
/// ```text
///  FOREST.xlsx      GRASSLAND.xlsx      (.xlsx / .csv / .parquet)
///        │                 │
///        ▼                 ▼
///   ┌──────────────────────────┐
///   │ loader (+ cache)          │  parse files → RawTable × 2, memoized
///   └──────────────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  merge    │  tag Location_Type, concatenate → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  year range + habitat → filtered indices
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  top species, environment points, yearly counts
///   └───────────┘
/// ```
///
/// `pipeline::run` chains filter and aggregate for one selection.

pub mod aggregate;
pub mod cache;
pub mod export;
pub mod filter;
pub mod loader;
pub mod merge;
pub mod model;
pub mod pipeline;
pub mod schema;
