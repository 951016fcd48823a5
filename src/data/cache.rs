use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::Result;

// ---------------------------------------------------------------------------
// Source identity
// ---------------------------------------------------------------------------

/// Identity of one source file: its path plus last modification time.
/// A file that cannot be stat'ed has no modification marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFingerprint {
    pub path: PathBuf,
    pub modified: Option<SystemTime>,
}

impl SourceFingerprint {
    pub fn of(path: &Path) -> Self {
        let modified = std::fs::metadata(path).and_then(|m| m.modified()).ok();
        Self {
            path: path.to_path_buf(),
            modified,
        }
    }
}

// ---------------------------------------------------------------------------
// Load-once cache
// ---------------------------------------------------------------------------

/// Memoizes an expensive load keyed by the fingerprints of its sources.
///
/// The value is computed on first access and handed back unchanged until the
/// key changes or [`LoadCache::invalidate`] is called. Failed loads are not
/// stored, so the next access retries.
#[derive(Debug)]
pub struct LoadCache<T> {
    entry: Option<(Vec<SourceFingerprint>, T)>,
    loads: usize,
}

impl<T> Default for LoadCache<T> {
    fn default() -> Self {
        Self {
            entry: None,
            loads: 0,
        }
    }
}

impl<T> LoadCache<T> {
    /// Return the cached value for `key`, running `load` only on a miss.
    pub fn get_or_load<F>(&mut self, key: Vec<SourceFingerprint>, load: F) -> Result<&T>
    where
        F: FnOnce() -> Result<T>,
    {
        let entry = match self.entry.take() {
            Some((cached, value)) if cached == key => {
                log::debug!("load cache hit for {} sources", key.len());
                (cached, value)
            }
            _ => {
                let value = load()?;
                self.loads += 1;
                (key, value)
            }
        };
        Ok(&self.entry.insert(entry).1)
    }

    /// Forget the cached value; the next access reloads.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    /// Number of loads actually performed.
    pub fn loads(&self) -> usize {
        self.loads
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(name: &str, secs: u64) -> Vec<SourceFingerprint> {
        vec![SourceFingerprint {
            path: PathBuf::from(name),
            modified: Some(SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(secs)),
        }]
    }

    #[test]
    fn test_second_access_skips_loader() {
        let mut cache = LoadCache::default();
        let mut calls = 0;

        let first = *cache
            .get_or_load(key("forest.xlsx", 1), || {
                calls += 1;
                Ok(42)
            })
            .unwrap();
        let second = *cache
            .get_or_load(key("forest.xlsx", 1), || {
                calls += 1;
                Ok(7)
            })
            .unwrap();

        assert_eq!((first, second), (42, 42));
        assert_eq!(calls, 1);
        assert_eq!(cache.loads(), 1);
    }

    #[test]
    fn test_modified_source_reloads() {
        let mut cache = LoadCache::default();
        cache.get_or_load(key("forest.xlsx", 1), || Ok(1)).unwrap();
        let value = *cache.get_or_load(key("forest.xlsx", 2), || Ok(2)).unwrap();
        assert_eq!(value, 2);
        assert_eq!(cache.loads(), 2);
    }

    #[test]
    fn test_failed_load_is_not_cached() {
        let mut cache: LoadCache<u32> = LoadCache::default();
        assert!(cache
            .get_or_load(key("missing.xlsx", 1), || anyhow::bail!("File not found"))
            .is_err());
        let value = *cache.get_or_load(key("missing.xlsx", 1), || Ok(3)).unwrap();
        assert_eq!(value, 3);
        assert_eq!(cache.loads(), 1);
    }

    #[test]
    fn test_invalidate_forces_reload() {
        let mut cache = LoadCache::default();
        cache.get_or_load(key("a.csv", 1), || Ok("first")).unwrap();
        cache.invalidate();
        let value = *cache.get_or_load(key("a.csv", 1), || Ok("second")).unwrap();
        assert_eq!(value, "second");
    }

    #[test]
    fn test_fingerprint_of_missing_file_has_no_marker() {
        let fp = SourceFingerprint::of(Path::new("no/such/file.xlsx"));
        assert_eq!(fp.modified, None);
    }
}
