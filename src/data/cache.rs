use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use anyhow::{Context, Result};

use super::loader::load_table;
use super::model::{AllocationKey, FabricKey, ForecastKey, KeyedTable, RowKey};
use super::Datasets;
use crate::config::DashboardConfig;

// ---------------------------------------------------------------------------
// Memoized table loading
// ---------------------------------------------------------------------------

/// Identity of a file's contents as far as the cache is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fingerprint {
    modified: Option<SystemTime>,
    len: u64,
}

impl Fingerprint {
    fn of(path: &Path) -> Result<Self> {
        let meta = std::fs::metadata(path)
            .with_context(|| format!("reading metadata of {}", path.display()))?;
        Ok(Fingerprint {
            modified: meta.modified().ok(),
            len: meta.len(),
        })
    }
}

struct Entry<K> {
    fingerprint: Fingerprint,
    table: Arc<KeyedTable<K>>,
}

/// Parsed tables of one kind, keyed by canonical source path.
/// An entry is reloaded when the file's size or modification time changes.
pub struct TableCache<K> {
    entries: HashMap<PathBuf, Entry<K>>,
}

impl<K> Default for TableCache<K> {
    fn default() -> Self {
        TableCache {
            entries: HashMap::new(),
        }
    }
}

impl<K: RowKey> TableCache<K> {
    pub fn get_or_load(&mut self, path: &Path) -> Result<Arc<KeyedTable<K>>> {
        let key = path
            .canonicalize()
            .with_context(|| format!("resolving {}", path.display()))?;
        let fingerprint = Fingerprint::of(&key)?;

        if let Some(entry) = self.entries.get(&key) {
            if entry.fingerprint == fingerprint {
                log::debug!("cache hit for {}", key.display());
                return Ok(Arc::clone(&entry.table));
            }
            log::debug!("{} changed on disk, reloading", key.display());
        }

        let table = Arc::new(load_table::<K>(&key)?);
        self.entries.insert(
            key,
            Entry {
                fingerprint,
                table: Arc::clone(&table),
            },
        );
        Ok(table)
    }
}

/// One cache per source table.
#[derive(Default)]
pub struct DatasetCache {
    forecast: TableCache<ForecastKey>,
    allocation: TableCache<AllocationKey>,
    fabric: TableCache<FabricKey>,
}

impl DatasetCache {
    /// Load (or reuse) the three datasets named by `config`.
    pub fn load(&mut self, config: &DashboardConfig) -> Result<Datasets> {
        Ok(Datasets {
            forecast: self.forecast.get_or_load(&config.forecast_path())?,
            allocation: self.allocation.get_or_load(&config.allocation_path())?,
            fabric: self.fabric.get_or_load(&config.fabric_path())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unchanged_file_is_served_from_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forecast.csv");
        std::fs::write(&path, "SKU,Date,Forecast_Units\nS1,2024-01-01,10\n").unwrap();

        let mut cache = TableCache::<ForecastKey>::default();
        let first = cache.get_or_load(&path).unwrap();
        let second = cache.get_or_load(&path).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn changed_file_is_reloaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forecast.csv");
        std::fs::write(&path, "SKU,Date,Forecast_Units\nS1,2024-01-01,10\n").unwrap();

        let mut cache = TableCache::<ForecastKey>::default();
        let first = cache.get_or_load(&path).unwrap();
        std::fs::write(
            &path,
            "SKU,Date,Forecast_Units\nS1,2024-01-01,10\nS2,2024-01-02,4\n",
        )
        .unwrap();
        let second = cache.get_or_load(&path).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.len(), 2);
    }

    #[test]
    fn loads_all_three_datasets_from_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = DashboardConfig {
            data_dir: dir.path().to_path_buf(),
            ..DashboardConfig::default()
        };
        std::fs::write(
            config.forecast_path(),
            "SKU,Date,Forecast_Units\nS1,2024-01-01,10\n",
        )
        .unwrap();
        std::fs::write(
            config.allocation_path(),
            "SKU,Vendor,Allocated_Qty,MOQ\nS1,V1,10,5\n",
        )
        .unwrap();
        std::fs::write(
            config.fabric_path(),
            "Vendor,SKUs,Fabric_Type,Total_Fabric_Required,Total_Units\nV1,S1,Cotton,2.5,10\n",
        )
        .unwrap();

        let mut cache = DatasetCache::default();
        let datasets = cache.load(&config).unwrap();
        assert_eq!(datasets.forecast.len(), 1);
        assert_eq!(datasets.allocation.len(), 1);
        assert_eq!(datasets.fabric.len(), 1);
    }
}
