/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  URL / .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse → Dataset   (memoized by cache)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  region × gender selection → FilteredView
///   └──────────┘
///        │
///        ├──────────────┐
///        ▼              ▼
///   ┌──────────┐   ┌──────────┐
///   │ metrics   │   │ series    │  KPIs / chart series
///   └──────────┘   └──────────┘
///        └──────┬───────┘
///               ▼
///          pipeline → DashboardSnapshot
/// ```

pub mod cache;
pub mod error;
pub mod filter;
pub mod loader;
pub mod metrics;
pub mod model;
pub mod pipeline;
pub mod series;
