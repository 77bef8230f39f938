use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use super::error::LoadError;
use super::loader::{self, DataSource};
use super::model::Dataset;

// ---------------------------------------------------------------------------
// Process-wide dataset cache
// ---------------------------------------------------------------------------

/// Memoizes parsed datasets per source for the lifetime of the process.
///
/// The first successful load of a source wins; later calls hand out the
/// same `Arc` without touching the source again. Failed loads are not
/// remembered, so a retry goes back to the source.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: Mutex<HashMap<DataSource, Arc<Dataset>>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The handle shared by the whole process, created on first use.
    pub fn shared() -> &'static DatasetCache {
        static SHARED: OnceLock<DatasetCache> = OnceLock::new();
        SHARED.get_or_init(DatasetCache::new)
    }

    /// Return the cached dataset for `source`, loading it on first use.
    pub fn get_or_load(&self, source: &DataSource) -> Result<Arc<Dataset>, LoadError> {
        self.get_or_load_with(source, loader::load)
    }

    /// Like [`get_or_load`](Self::get_or_load) with a custom loader.
    pub fn get_or_load_with<F>(
        &self,
        source: &DataSource,
        load: F,
    ) -> Result<Arc<Dataset>, LoadError>
    where
        F: FnOnce(&DataSource) -> Result<Dataset, LoadError>,
    {
        // Holding the lock across the load keeps a source from being fetched twice.
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(dataset) = entries.get(source) {
            log::debug!("Dataset cache hit for {source}");
            return Ok(Arc::clone(dataset));
        }

        let dataset = Arc::new(load(source)?);
        entries.insert(source.clone(), Arc::clone(&dataset));
        Ok(dataset)
    }

    /// Read `source` again even if cached, replacing the entry on success.
    /// A failed reload leaves the previous entry in place.
    pub fn reload(&self, source: &DataSource) -> Result<Arc<Dataset>, LoadError> {
        self.reload_with(source, loader::load)
    }

    pub fn reload_with<F>(&self, source: &DataSource, load: F) -> Result<Arc<Dataset>, LoadError>
    where
        F: FnOnce(&DataSource) -> Result<Dataset, LoadError>,
    {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        log::debug!("Reloading {source}, bypassing the cache");
        let dataset = Arc::new(load(source)?);
        entries.insert(source.clone(), Arc::clone(&dataset));
        Ok(dataset)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::io::Write;
    use std::path::PathBuf;

    use super::*;
    use crate::data::model::fixtures;

    #[test]
    fn second_call_returns_identical_dataset_without_reloading() {
        let cache = DatasetCache::new();
        let source = DataSource::Url("https://example.invalid/data.csv".into());
        let calls = Cell::new(0);
        let loader = |_: &DataSource| {
            calls.set(calls.get() + 1);
            Ok(fixtures::dataset(vec![fixtures::record("North", "Male")]))
        };

        let first = cache.get_or_load_with(&source, loader).unwrap();
        let second = cache.get_or_load_with(&source, loader).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn failures_are_not_cached() {
        let cache = DatasetCache::new();
        let source = DataSource::File(PathBuf::from("missing.csv"));

        let err = cache
            .get_or_load_with(&source, |_| Err(LoadError::NoHeader("missing.csv".into())))
            .unwrap_err();
        assert!(matches!(err, LoadError::NoHeader(_)));

        let reloaded = Cell::new(false);
        let ok = cache.get_or_load_with(&source, |_| {
            reloaded.set(true);
            Ok(fixtures::dataset(Vec::new()))
        });
        assert!(ok.is_ok());
        assert!(reloaded.get());
    }

    #[test]
    fn cached_file_survives_removal_of_the_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policies.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(
            f,
            "Region,Gender,Age,Monthly_Income,Wallet_Balance,Dropout_Flag,Renewed,\
Total_Claims,Denied_Claims,Policy_Start_Date,Policy_End_Date,Last_Claim_Date"
        )
        .unwrap();
        writeln!(f, "North,Male,30,100,10,0,1,1,0,2022-01-01,2023-01-01,").unwrap();
        drop(f);

        let cache = DatasetCache::new();
        let source = DataSource::File(path.clone());
        let first = cache.get_or_load(&source).unwrap();
        std::fs::remove_file(&path).unwrap();
        let second = cache.get_or_load(&source).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.len(), 1);
    }

    #[test]
    fn reload_replaces_entry_and_keeps_it_on_failure() {
        let cache = DatasetCache::new();
        let source = DataSource::Url("https://example.invalid/data.csv".into());
        let one = |_: &DataSource| Ok(fixtures::dataset(vec![fixtures::record("North", "Male")]));
        let first = cache.get_or_load_with(&source, one).unwrap();

        let two = |_: &DataSource| {
            Ok(fixtures::dataset(vec![
                fixtures::record("North", "Male"),
                fixtures::record("South", "Female"),
            ]))
        };
        let fresh = cache.reload_with(&source, two).unwrap();
        assert!(!Arc::ptr_eq(&first, &fresh));
        assert_eq!(fresh.len(), 2);

        let err = cache.reload_with(&source, |_| Err(LoadError::NoHeader("down".into())));
        assert!(err.is_err());
        let cached = cache
            .get_or_load_with(&source, |_| Err(LoadError::NoHeader("not called".into())))
            .unwrap();
        assert!(Arc::ptr_eq(&fresh, &cached));
    }

    #[test]
    fn shared_handle_is_a_single_instance() {
        assert!(std::ptr::eq(DatasetCache::shared(), DatasetCache::shared()));
    }
}
