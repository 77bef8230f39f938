use super::filter::{filter, FilterSelection};
use super::metrics::{compute_metrics, Metrics};
use super::model::Dataset;
use super::series::{build_series, CategoricalColumn, ChartSpec, NumericColumn, Series};
use crate::config::DashboardConfig;

/// A titled chart on the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartDef {
    pub title: &'static str,
    pub spec: ChartSpec,
}

/// The eight dashboard charts, in display order.
pub fn dashboard_charts(config: &DashboardConfig) -> Vec<ChartDef> {
    use CategoricalColumn as Cat;
    use NumericColumn as Num;

    let chart = |title, spec| ChartDef { title, spec };
    vec![
        chart(
            "Age Distribution",
            ChartSpec::Histogram {
                column: Num::Age,
                bins: config.age_bins,
            },
        ),
        chart(
            "Monthly Income Distribution",
            ChartSpec::Histogram {
                column: Num::MonthlyIncome,
                bins: config.income_bins,
            },
        ),
        chart(
            "Gender Distribution",
            ChartSpec::CategoryCounts { column: Cat::Gender },
        ),
        chart(
            "Dropout vs Renewed",
            ChartSpec::CategoryCounts {
                column: Cat::DropoutFlag,
            },
        ),
        chart(
            "Renewal Status",
            ChartSpec::CategoryCounts {
                column: Cat::Renewed,
            },
        ),
        chart(
            "Policyholders by Region",
            ChartSpec::RankedCategoryCounts { column: Cat::Region },
        ),
        chart(
            "Avg. Monthly Income by Region",
            ChartSpec::GroupedMean {
                group: Cat::Region,
                value: Num::MonthlyIncome,
            },
        ),
        chart(
            "Avg. Wallet Balance by Region",
            ChartSpec::GroupedMean {
                group: Cat::Region,
                value: Num::WalletBalance,
            },
        ),
    ]
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub def: ChartDef,
    pub series: Series,
}

// ---------------------------------------------------------------------------
// One full recomputation pass
// ---------------------------------------------------------------------------

/// Everything the dashboard shows for one selection.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSnapshot {
    /// Rows matching the selection.
    pub matching: usize,
    pub metrics: Metrics,
    pub charts: Vec<ChartSeries>,
    /// Dataset indices of the preview rows, in original order.
    pub preview: Vec<usize>,
}

impl DashboardSnapshot {
    /// Filter, aggregate and derive every chart series.
    pub fn compute(
        dataset: &Dataset,
        selection: &FilterSelection,
        charts: &[ChartDef],
        preview_rows: usize,
    ) -> Self {
        let view = filter(dataset, selection);
        log::debug!("Selection matches {} of {} rows", view.len(), dataset.len());

        DashboardSnapshot {
            matching: view.len(),
            metrics: compute_metrics(&view),
            charts: charts
                .iter()
                .map(|def| ChartSeries {
                    def: def.clone(),
                    series: build_series(&view, &def.spec),
                })
                .collect(),
            preview: view.head(preview_rows).to_vec(),
        }
    }
}
