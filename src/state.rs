use std::path::PathBuf;

use crate::color::HabitatColors;
use crate::config::DashboardConfig;
use crate::data::cache::{LoadCache, SourceFingerprint};
use crate::data::filter::{FilterSelection, YearControl};
use crate::data::loader::load_sources;
use crate::data::merge::merge;
use crate::data::model::{Dataset, RawTable};
use crate::data::pipeline::{self, DashboardViews};
use crate::data::schema::DatasetSchema;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Raw source tables, read once per source fingerprint.
    cache: LoadCache<(RawTable, RawTable)>,

    /// Sources of the last failed load; not retried until they change.
    failed_sources: Option<Vec<SourceFingerprint>>,

    /// Merged dataset (None until both sources load).
    pub dataset: Option<Dataset>,

    /// Optional features the loaded columns allow.
    pub schema: DatasetSchema,

    /// Year widget bounds derived from the dataset.
    pub year_control: YearControl,

    /// Current habitat and year selection.
    pub selection: FilterSelection,

    /// Filtered rows and aggregates for `selection`.
    pub views: Option<DashboardViews>,

    pub colors: HabitatColors,

    /// Fatal load error, shown instead of the dashboard.
    pub load_error: Option<String>,

    /// Status / error message shown in the top bar.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            cache: LoadCache::default(),
            failed_sources: None,
            dataset: None,
            schema: DatasetSchema::default(),
            year_control: YearControl::Unavailable,
            selection: FilterSelection::initial(&YearControl::Unavailable),
            views: None,
            colors: HabitatColors::default(),
            load_error: None,
            status_message: None,
        }
    }

    fn fingerprints(&self) -> Vec<SourceFingerprint> {
        vec![
            SourceFingerprint::of(&self.config.forest_path),
            SourceFingerprint::of(&self.config.grassland_path),
        ]
    }

    /// Make sure the dataset reflects the configured sources.
    ///
    /// Cheap when nothing changed: the cache hands back the previous tables
    /// and the merged dataset is kept.
    pub fn ensure_loaded(&mut self) {
        let key = self.fingerprints();
        if self.failed_sources.as_ref() == Some(&key) {
            return;
        }
        let failed_key = key.clone();
        let forest = self.config.forest_path.clone();
        let grassland = self.config.grassland_path.clone();
        let sheet = self.config.sheet.clone();

        let mut reloaded = false;
        let result = self.cache.get_or_load(key, || {
            reloaded = true;
            load_sources(&forest, &grassland, sheet.as_deref())
        });

        match result {
            Ok((forest_table, grassland_table)) => {
                if reloaded || self.dataset.is_none() {
                    let dataset = merge(forest_table, grassland_table);
                    self.set_dataset(dataset);
                }
                self.failed_sources = None;
            }
            Err(e) => {
                log::error!("Failed to load observations: {e:#}");
                self.failed_sources = Some(failed_key);
                self.load_error = Some(format!("{e:#}"));
                self.dataset = None;
                self.views = None;
            }
        }
        if reloaded {
            log::debug!("source load #{} finished", self.cache.loads());
        }
    }

    /// Ingest a newly merged dataset and reset the selection to everything.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        log::info!(
            "Merged dataset: {} observations, {} columns",
            dataset.len(),
            dataset.columns.len()
        );
        if dataset.is_empty() {
            log::warn!("Both observation sources are empty");
        }
        self.schema = DatasetSchema::inspect(&dataset);
        self.year_control = YearControl::from_dataset(&dataset);
        self.selection = FilterSelection::initial(&self.year_control);
        self.views = Some(pipeline::run(&dataset, &self.schema, &self.selection));
        self.dataset = Some(dataset);
        self.load_error = None;
    }

    /// Apply a selection from the controls; re-runs the pipeline when it changed.
    pub fn set_selection(&mut self, selection: FilterSelection) {
        let selection = selection.normalized(&self.year_control);
        if selection == self.selection && self.views.is_some() {
            return;
        }
        self.selection = selection;
        self.refresh();
    }

    /// Recompute all views for the current selection.
    pub fn refresh(&mut self) {
        if let Some(ds) = &self.dataset {
            self.views = Some(pipeline::run(ds, &self.schema, &self.selection));
        }
    }

    /// Drop the cached tables and read the sources again.
    pub fn reload(&mut self) {
        self.cache.invalidate();
        self.failed_sources = None;
        self.dataset = None;
        self.load_error = None;
        self.ensure_loaded();
    }

    pub fn set_forest_path(&mut self, path: PathBuf) {
        self.config.forest_path = path;
        self.failed_sources = None;
        self.ensure_loaded();
    }

    pub fn set_grassland_path(&mut self, path: PathBuf) {
        self.config.grassland_path = path;
        self.failed_sources = None;
        self.ensure_loaded();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{HabitatFilter, YearRange};

    fn write_sources(tag: &str) -> DashboardConfig {
        let dir = std::env::temp_dir();
        let forest = dir.join(format!("bird_watch_state_{}_{tag}_forest.csv", std::process::id()));
        let grassland =
            dir.join(format!("bird_watch_state_{}_{tag}_grassland.csv", std::process::id()));
        std::fs::write(
            &forest,
            "Common_Name,Year,Temperature,Humidity,Initial_Three_Min_Cnt\n\
             Ovenbird,2018,19.0,70,1\n\
             Wood Thrush,2019,21.5,65,2\n",
        )
        .unwrap();
        std::fs::write(
            &grassland,
            "Common_Name,Year,Temperature,Humidity,Initial_Three_Min_Cnt\n\
             Field Sparrow,2019,25.0,55,3\n",
        )
        .unwrap();
        DashboardConfig {
            forest_path: forest,
            grassland_path: grassland,
            sheet: None,
        }
    }

    #[test]
    fn test_ensure_loaded_reads_sources_once() {
        let mut state = AppState::new(write_sources("once"));
        state.ensure_loaded();
        state.ensure_loaded();

        assert_eq!(state.cache.loads(), 1);
        assert_eq!(state.dataset.as_ref().map(Dataset::len), Some(3));
        assert_eq!(state.year_control, YearControl::Range { min: 2018, max: 2019 });
        assert!(state.schema.environmental_analysis_available());
        assert_eq!(state.views.as_ref().map(|v| v.filtered.len()), Some(3));
    }

    #[test]
    fn test_set_selection_refilters() {
        let mut state = AppState::new(write_sources("select"));
        state.ensure_loaded();
        state.set_selection(FilterSelection {
            habitat: HabitatFilter::Grassland,
            years: Some(YearRange::new(2000, 2030)),
        });

        assert_eq!(state.selection.years, Some(YearRange::new(2018, 2019)));
        assert_eq!(state.views.as_ref().map(|v| v.filtered.clone()), Some(vec![2]));
    }

    #[test]
    fn test_missing_source_sets_load_error() {
        let mut config = write_sources("missing");
        config.grassland_path = PathBuf::from("no/such/grassland.xlsx");
        let mut state = AppState::new(config);
        state.ensure_loaded();

        assert!(state.dataset.is_none());
        assert!(state
            .load_error
            .as_deref()
            .is_some_and(|e| e.contains("File not found")));
    }

    #[test]
    fn test_failed_sources_wait_for_change() {
        let mut config = write_sources("retry");
        let missing = std::env::temp_dir().join(format!(
            "bird_watch_state_{}_retry_late.csv",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&missing);
        config.grassland_path = missing.clone();
        let mut state = AppState::new(config);
        state.ensure_loaded();
        assert!(state.failed_sources.is_some());

        std::fs::write(&missing, "Common_Name,Year\nBobolink,2019\n").unwrap();
        state.ensure_loaded();
        assert!(state.load_error.is_none());
        assert_eq!(state.dataset.as_ref().map(Dataset::len), Some(3));
    }

    #[test]
    fn test_switching_back_to_failed_source_shows_error() {
        let good = write_sources("switch");
        let bad = std::env::temp_dir().join(format!(
            "bird_watch_state_{}_switch_no_year.csv",
            std::process::id()
        ));
        std::fs::write(&bad, "Common_Name,Month\nOvenbird,5\n").unwrap();

        let mut state = AppState::new(DashboardConfig {
            forest_path: bad.clone(),
            ..good.clone()
        });
        state.ensure_loaded();
        assert!(state.load_error.is_some());

        state.set_forest_path(good.forest_path.clone());
        assert!(state.load_error.is_none());
        assert!(state.failed_sources.is_none());
        assert_eq!(state.dataset.as_ref().map(Dataset::len), Some(3));

        state.set_forest_path(bad.clone());
        assert_eq!(state.config.forest_path, bad);
        assert!(state
            .load_error
            .as_deref()
            .is_some_and(|e| e.contains("missing required column 'Year'")));
        assert!(state.dataset.is_none());

        // A later frame with unchanged sources keeps the error.
        state.ensure_loaded();
        assert!(state.dataset.is_none());
        assert!(state.load_error.is_some());
    }

    #[test]
    fn test_reload_reads_again() {
        let mut state = AppState::new(write_sources("reload"));
        state.ensure_loaded();
        state.reload();
        assert_eq!(state.cache.loads(), 2);
        assert!(state.dataset.is_some());
    }
}
