use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Config file looked up in the working directory.
pub const CONFIG_FILE: &str = "bird_watch.json";

pub const FOREST_ENV: &str = "BIRD_WATCH_FOREST";
pub const GRASSLAND_ENV: &str = "BIRD_WATCH_GRASSLAND";
pub const SHEET_ENV: &str = "BIRD_WATCH_SHEET";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub forest_path: PathBuf,
    pub grassland_path: PathBuf,
    /// Worksheet to read from spreadsheet sources; the first one when unset.
    pub sheet: Option<String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            forest_path: PathBuf::from("Bird_Monitoring_Data_FOREST.xlsx"),
            grassland_path: PathBuf::from("Bird_Monitoring_Data_GRASSLAND.xlsx"),
            sheet: None,
        }
    }
}

impl DashboardConfig {
    /// Defaults, then `bird_watch.json` if present, then environment overrides.
    pub fn load() -> Self {
        let path = Path::new(CONFIG_FILE);
        let mut config = if path.exists() {
            match Self::from_file(path) {
                Ok(config) => {
                    log::info!("Using configuration from {}", path.display());
                    config
                }
                Err(e) => {
                    log::warn!("Ignoring {}: {e:#}", path.display());
                    Self::default()
                }
            }
        } else {
            Self::default()
        };
        config.apply_overrides(|key| env::var(key).ok());
        config
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).context("reading config file")?;
        serde_json::from_str(&contents).context("parsing config file")
    }

    /// Apply `BIRD_WATCH_*` values looked up through `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup(FOREST_ENV).filter(|v| !v.is_empty()) {
            self.forest_path = PathBuf::from(v);
        }
        if let Some(v) = lookup(GRASSLAND_ENV).filter(|v| !v.is_empty()) {
            self.grassland_path = PathBuf::from(v);
        }
        if let Some(v) = lookup(SHEET_ENV) {
            self.sheet = Some(v).filter(|s| !s.is_empty());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let path = env::temp_dir().join(format!("bird_watch_config_{}.json", std::process::id()));
        fs::write(&path, r#"{ "forest_path": "data/forest.csv" }"#).unwrap();

        let config = DashboardConfig::from_file(&path).unwrap();
        assert_eq!(config.forest_path, PathBuf::from("data/forest.csv"));
        assert_eq!(
            config.grassland_path,
            DashboardConfig::default().grassland_path
        );
        assert_eq!(config.sheet, None);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let path = env::temp_dir().join(format!("bird_watch_bad_{}.json", std::process::id()));
        fs::write(&path, "{ forest_path: ").unwrap();
        assert!(DashboardConfig::from_file(&path).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = DashboardConfig::default();
        config.apply_overrides(|key| match key {
            GRASSLAND_ENV => Some("g.parquet".to_string()),
            SHEET_ENV => Some("Sheet2".to_string()),
            FOREST_ENV => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.forest_path, DashboardConfig::default().forest_path);
        assert_eq!(config.grassland_path, PathBuf::from("g.parquet"));
        assert_eq!(config.sheet.as_deref(), Some("Sheet2"));
    }
}
