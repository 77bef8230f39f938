use crate::data::loader::DataSource;

/// Published microinsurance dataset.
pub const DEFAULT_SOURCE_URL: &str = "https://raw.githubusercontent.com/IEssien1/microinsurance_dropout_risk/refs/heads/main/Insurance_dataset.csv";

// ---------------------------------------------------------------------------
// Dashboard configuration
// ---------------------------------------------------------------------------

/// Startup settings. Built from defaults plus an optional first
/// command-line argument naming a file or URL.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub source: DataSource,
    pub window_title: String,
    /// Rows shown in the raw data preview.
    pub preview_rows: usize,
    pub age_bins: usize,
    pub income_bins: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            source: DataSource::Url(DEFAULT_SOURCE_URL.to_string()),
            window_title: "Insurance Data Dashboard".to_string(),
            preview_rows: 20,
            age_bins: 20,
            income_bins: 30,
        }
    }
}

impl DashboardConfig {
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut config = Self::default();
        if let Some(location) = args.into_iter().next() {
            config.source = DataSource::parse(&location);
        }
        config
    }
}
