use std::collections::BTreeSet;
use std::sync::Arc;

use crate::color::ColorMap;
use crate::config::DashboardConfig;
use crate::data::cache::DatasetCache;
use crate::data::error::LoadError;
use crate::data::filter::FilterSelection;
use crate::data::loader::DataSource;
use crate::data::model::{Dataset, Dimension};
use crate::data::pipeline::{dashboard_charts, ChartDef, DashboardSnapshot};
use crate::data::series::CategoricalColumn;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Source of the dataset currently shown (or last attempted).
    pub source: DataSource,

    /// Loaded dataset (None until a load succeeds).
    pub dataset: Option<Arc<Dataset>>,

    /// Region / gender selections.
    pub selection: FilterSelection,

    /// Result of the last recomputation pass.
    pub snapshot: Option<DashboardSnapshot>,

    /// Charts drawn on every pass.
    pub charts: Vec<ChartDef>,

    /// Bar colours per categorical column.
    pub region_colors: Option<ColorMap>,
    pub gender_colors: Option<ColorMap>,
    pub flag_colors: ColorMap,

    /// Blocking load failure shown instead of the dashboard.
    pub load_error: Option<String>,

    /// Status / error message shown in the top bar.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        let flags: BTreeSet<String> = ["0", "1"].iter().map(|s| s.to_string()).collect();
        Self {
            source: config.source.clone(),
            charts: dashboard_charts(&config),
            config,
            dataset: None,
            selection: FilterSelection::default(),
            snapshot: None,
            region_colors: None,
            gender_colors: None,
            flag_colors: ColorMap::pastel(&flags),
            load_error: None,
            status_message: None,
        }
    }

    /// Load `source` through the shared cache and show it.
    pub fn load_source(&mut self, source: DataSource) {
        let result = DatasetCache::shared().get_or_load(&source);
        self.apply_load(source, result);
    }

    /// Fetch the configured default source again, bypassing the cache.
    pub fn reload_default_source(&mut self) {
        let source = self.config.source.clone();
        let result = DatasetCache::shared().reload(&source);
        self.apply_load(source, result);
    }

    fn apply_load(&mut self, source: DataSource, result: Result<Arc<Dataset>, LoadError>) {
        match result {
            Ok(dataset) => {
                self.source = source;
                self.set_dataset(dataset);
            }
            Err(e) => {
                let message = format!("{:#}", anyhow::Error::new(e));
                if self.dataset.is_some() {
                    // Keep the current dashboard and its source.
                    self.status_message = Some(format!("Error: {message}"));
                } else {
                    self.source = source;
                    self.load_error = Some(message);
                }
            }
        }
    }

    /// Retry the last source after a blocking failure.
    pub fn retry(&mut self) {
        self.load_error = None;
        self.load_source(self.source.clone());
    }

    /// Ingest a newly loaded dataset, initialise filters and colours.
    pub fn set_dataset(&mut self, dataset: Arc<Dataset>) {
        self.selection = FilterSelection::all(&dataset);
        self.region_colors = Some(ColorMap::vivid(dataset.values_of(Dimension::Region)));
        self.gender_colors = Some(ColorMap::pastel(dataset.values_of(Dimension::Gender)));
        self.dataset = Some(dataset);
        self.load_error = None;
        self.status_message = None;
        self.refilter();
    }

    /// Recompute the snapshot after a filter change.
    pub fn refilter(&mut self) {
        self.snapshot = self.dataset.as_ref().map(|ds| {
            DashboardSnapshot::compute(ds, &self.selection, &self.charts, self.config.preview_rows)
        });
    }

    /// Colour map used for bars of `column`.
    pub fn colors_for(&self, column: CategoricalColumn) -> Option<&ColorMap> {
        match column {
            CategoricalColumn::Region => self.region_colors.as_ref(),
            CategoricalColumn::Gender => self.gender_colors.as_ref(),
            CategoricalColumn::DropoutFlag | CategoricalColumn::Renewed => Some(&self.flag_colors),
        }
    }

    /// Toggle a single value in a dimension's selection.
    pub fn toggle_filter_value(&mut self, dim: Dimension, value: &str) {
        self.selection.toggle(dim, value);
        self.refilter();
    }

    /// Select all values in a dimension.
    pub fn select_all(&mut self, dim: Dimension) {
        if let Some(ds) = &self.dataset {
            self.selection.select_all(dim, ds);
            self.refilter();
        }
    }

    /// Deselect all values in a dimension.
    pub fn select_none(&mut self, dim: Dimension) {
        self.selection.select_none(dim);
        self.refilter();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::fixtures::{dataset, record};

    fn state_with_data() -> AppState {
        let mut state = AppState::new(DashboardConfig::default());
        state.set_dataset(Arc::new(dataset(vec![
            record("North", "Male"),
            record("South", "Female"),
            record("North", "Female"),
        ])));
        state
    }

    #[test]
    fn new_dataset_selects_everything() {
        let state = state_with_data();
        let snap = state.snapshot.as_ref().unwrap();
        assert_eq!(snap.matching, 3);
        assert_eq!(snap.charts.len(), 8);
        assert!(state.colors_for(CategoricalColumn::Region).is_some());
    }

    #[test]
    fn filter_changes_recompute_snapshot() {
        let mut state = state_with_data();
        state.toggle_filter_value(Dimension::Gender, "Male");
        assert_eq!(state.snapshot.as_ref().unwrap().preview, vec![1, 2]);

        state.select_none(Dimension::Region);
        assert_eq!(state.snapshot.as_ref().unwrap().matching, 0);

        state.select_all(Dimension::Region);
        assert_eq!(state.snapshot.as_ref().unwrap().matching, 2);
    }

    #[test]
    fn failed_first_load_is_blocking() {
        let mut state = AppState::new(DashboardConfig::default());
        state.load_source(DataSource::File("/no/such/policies.csv".into()));
        assert!(state.dataset.is_none());
        assert!(state.load_error.as_deref().unwrap().contains("could not read"));
    }

    #[test]
    fn failed_reload_keeps_current_dashboard() {
        let mut state = state_with_data();
        state.load_source(DataSource::File("/no/such/other.csv".into()));
        assert!(state.dataset.is_some());
        assert!(state.load_error.is_none());
        assert!(state.status_message.is_some());
        assert!(matches!(state.source, DataSource::Url(_)));
    }

    #[test]
    fn reload_default_source_reads_the_file_again() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policies.csv");
        let header = "Region,Gender,Age,Monthly_Income,Wallet_Balance,Dropout_Flag,Renewed,\
Total_Claims,Denied_Claims,Policy_Start_Date,Policy_End_Date,Last_Claim_Date";
        let row = "North,Male,30,100,10,0,1,1,0,2022-01-01,2023-01-01,";
        std::fs::write(&path, format!("{header}\n{row}\n")).unwrap();

        let config = DashboardConfig {
            source: DataSource::File(path.clone()),
            ..DashboardConfig::default()
        };
        let mut state = AppState::new(config);
        state.load_source(state.source.clone());
        assert_eq!(state.dataset.as_ref().unwrap().len(), 1);

        std::fs::write(&path, format!("{header}\n{row}\n{row}\n")).unwrap();
        state.load_source(state.source.clone());
        assert_eq!(state.dataset.as_ref().unwrap().len(), 1);

        state.reload_default_source();
        assert_eq!(state.dataset.as_ref().unwrap().len(), 2);
        assert!(state.status_message.is_none());
    }
}
