use std::collections::BTreeMap;

use super::filter::FilteredView;
use super::metrics::mean;
use super::model::{self, Record};

// ---------------------------------------------------------------------------
// Column selectors
// ---------------------------------------------------------------------------

/// Columns whose values are treated as category labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CategoricalColumn {
    Region,
    Gender,
    DropoutFlag,
    Renewed,
}

impl CategoricalColumn {
    pub fn name(self) -> &'static str {
        match self {
            CategoricalColumn::Region => model::REGION,
            CategoricalColumn::Gender => model::GENDER,
            CategoricalColumn::DropoutFlag => model::DROPOUT_FLAG,
            CategoricalColumn::Renewed => model::RENEWED,
        }
    }

    /// Flags are labelled `"0"` / `"1"`; a missing flag has no label.
    pub fn label_of(self, record: &Record) -> Option<String> {
        let flag = |b: Option<bool>| b.map(|b| (if b { "1" } else { "0" }).to_string());
        match self {
            CategoricalColumn::Region => Some(record.region.clone()),
            CategoricalColumn::Gender => Some(record.gender.clone()),
            CategoricalColumn::DropoutFlag => flag(record.dropout_flag),
            CategoricalColumn::Renewed => flag(record.renewed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericColumn {
    Age,
    MonthlyIncome,
    WalletBalance,
    TotalClaims,
    DeniedClaims,
}

impl NumericColumn {
    pub fn name(self) -> &'static str {
        match self {
            NumericColumn::Age => model::AGE,
            NumericColumn::MonthlyIncome => model::MONTHLY_INCOME,
            NumericColumn::WalletBalance => model::WALLET_BALANCE,
            NumericColumn::TotalClaims => model::TOTAL_CLAIMS,
            NumericColumn::DeniedClaims => model::DENIED_CLAIMS,
        }
    }

    /// `NaN` for a missing value.
    pub fn value_of(self, record: &Record) -> f64 {
        let claims = |c: Option<u32>| c.map(f64::from).unwrap_or(f64::NAN);
        match self {
            NumericColumn::Age => record.age,
            NumericColumn::MonthlyIncome => record.monthly_income,
            NumericColumn::WalletBalance => record.wallet_balance,
            NumericColumn::TotalClaims => claims(record.total_claims),
            NumericColumn::DeniedClaims => claims(record.denied_claims),
        }
    }
}

// ---------------------------------------------------------------------------
// Chart specs and their series
// ---------------------------------------------------------------------------

/// What to derive from a view for one chart.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartSpec {
    Histogram {
        column: NumericColumn,
        bins: usize,
    },
    CategoryCounts {
        column: CategoricalColumn,
    },
    /// Category counts, largest first.
    RankedCategoryCounts {
        column: CategoricalColumn,
    },
    GroupedMean {
        group: CategoricalColumn,
        value: NumericColumn,
    },
}

/// One equal-width histogram bin. `[start, end)`, except the last bin which
/// also holds `end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

impl HistogramBin {
    pub fn center(&self) -> f64 {
        (self.start + self.end) / 2.0
    }

    pub fn width(&self) -> f64 {
        self.end - self.start
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Series {
    /// Bins plus a smoothed density curve `[x, count]` over the same range.
    Histogram {
        bins: Vec<HistogramBin>,
        density: Vec<[f64; 2]>,
    },
    /// `(category, occurrences)`.
    Counts(Vec<(String, usize)>),
    /// `(group, mean)`.
    GroupedMeans(Vec<(String, f64)>),
}

impl Series {
    pub fn is_empty(&self) -> bool {
        match self {
            Series::Histogram { bins, .. } => bins.is_empty(),
            Series::Counts(counts) => counts.is_empty(),
            Series::GroupedMeans(means) => means.is_empty(),
        }
    }
}

/// Derive the series for one chart from the current view.
pub fn build_series(view: &FilteredView, spec: &ChartSpec) -> Series {
    match spec {
        ChartSpec::Histogram { column, bins } => {
            let values: Vec<f64> = view.iter().map(|r| column.value_of(r)).collect();
            let bins = histogram(&values, *bins);
            let density = density_curve(&values, &bins);
            Series::Histogram { bins, density }
        }
        ChartSpec::CategoryCounts { column } => {
            Series::Counts(category_counts(view, *column).into_iter().collect())
        }
        ChartSpec::RankedCategoryCounts { column } => {
            let mut counts: Vec<(String, usize)> =
                category_counts(view, *column).into_iter().collect();
            // Stable sort keeps label order among ties.
            counts.sort_by(|a, b| b.1.cmp(&a.1));
            Series::Counts(counts)
        }
        ChartSpec::GroupedMean { group, value } => {
            let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
            for rec in view.iter() {
                if let Some(label) = group.label_of(rec) {
                    groups.entry(label).or_default().push(value.value_of(rec));
                }
            }
            Series::GroupedMeans(
                groups
                    .into_iter()
                    .map(|(label, values)| (label, mean(values)))
                    .collect(),
            )
        }
    }
}

fn category_counts(view: &FilteredView, column: CategoricalColumn) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for label in view.iter().filter_map(|rec| column.label_of(rec)) {
        *counts.entry(label).or_insert(0) += 1;
    }
    counts
}

/// Partition the observed range of `values` into `bins` equal-width bins.
/// `NaN` values are ignored.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || bins == 0 {
        return Vec::new();
    }

    let mut lo = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;

    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            start: lo + i as f64 * width,
            end: if i + 1 == bins { hi } else { lo + (i + 1) as f64 * width },
            count: 0,
        })
        .collect();

    for v in finite {
        let idx = (((v - lo) / width).floor() as usize).min(bins - 1);
        out[idx].count += 1;
    }
    out
}

/// Points sampled along a density curve.
pub const DENSITY_POINTS: usize = 200;

/// Gaussian kernel density estimate of the finite `values`, bandwidth by
/// Scott's rule, sampled across the histogram range and scaled so it reads
/// on the same axis as the bin counts.
///
/// Empty for fewer than two values or zero spread.
pub fn density_curve(values: &[f64], bins: &[HistogramBin]) -> Vec<[f64; 2]> {
    let (Some(first), Some(last)) = (bins.first(), bins.last()) else {
        return Vec::new();
    };
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let n = finite.len();
    if n < 2 {
        return Vec::new();
    }

    let mean = finite.iter().sum::<f64>() / n as f64;
    let variance = finite.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    let bandwidth = variance.sqrt() * (n as f64).powf(-0.2);
    if bandwidth.is_nan() || bandwidth <= 0.0 {
        return Vec::new();
    }

    // density * n * bin width, with the 1 / n folded away
    let scale = first.width() / (bandwidth * (2.0 * std::f64::consts::PI).sqrt());
    let (lo, hi) = (first.start, last.end);
    let step = (hi - lo) / (DENSITY_POINTS - 1) as f64;

    (0..DENSITY_POINTS)
        .map(|i| {
            let x = lo + i as f64 * step;
            let sum: f64 = finite
                .iter()
                .map(|v| (-0.5 * ((x - v) / bandwidth).powi(2)).exp())
                .sum();
            [x, scale * sum]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{filter, FilterSelection, FilteredView};
    use crate::data::model::fixtures::{dataset, record};
    use crate::data::model::Dataset;

    fn regions(names: &[&str]) -> Dataset {
        dataset(names.iter().map(|r| record(r, "Female")).collect())
    }

    #[test]
    fn category_counts_by_label() {
        let ds = regions(&["North", "North", "South"]);
        let series = build_series(
            &FilteredView::all(&ds),
            &ChartSpec::CategoryCounts {
                column: CategoricalColumn::Region,
            },
        );
        assert_eq!(
            series,
            Series::Counts(vec![("North".into(), 2), ("South".into(), 1)])
        );
    }

    #[test]
    fn ranked_counts_put_largest_first() {
        let ds = regions(&["East", "South", "North", "South", "North", "South", "West"]);
        let series = build_series(
            &FilteredView::all(&ds),
            &ChartSpec::RankedCategoryCounts {
                column: CategoricalColumn::Region,
            },
        );
        assert_eq!(
            series,
            Series::Counts(vec![
                ("South".into(), 3),
                ("North".into(), 2),
                ("East".into(), 1),
                ("West".into(), 1),
            ])
        );
    }

    #[test]
    fn flags_count_as_zero_and_one_skipping_missing() {
        let mut a = record("North", "Male");
        a.dropout_flag = Some(true);
        let mut missing = record("East", "Male");
        missing.dropout_flag = None;
        let ds = dataset(vec![
            a,
            record("North", "Male"),
            missing,
            record("South", "Male"),
        ]);
        let series = build_series(
            &FilteredView::all(&ds),
            &ChartSpec::CategoryCounts {
                column: CategoricalColumn::DropoutFlag,
            },
        );
        assert_eq!(series, Series::Counts(vec![("0".into(), 2), ("1".into(), 1)]));
    }

    #[test]
    fn grouped_mean_per_region() {
        let mut e1 = record("East", "Male");
        e1.monthly_income = 100.0;
        let mut e2 = record("East", "Female");
        e2.monthly_income = 300.0;
        let mut w = record("West", "Female");
        w.monthly_income = f64::NAN;
        let ds = dataset(vec![e1, w, e2]);

        let series = build_series(
            &FilteredView::all(&ds),
            &ChartSpec::GroupedMean {
                group: CategoricalColumn::Region,
                value: NumericColumn::MonthlyIncome,
            },
        );
        let Series::GroupedMeans(means) = series else {
            panic!("expected grouped means");
        };
        assert_eq!(means[0], ("East".to_string(), 200.0));
        assert_eq!(means[1].0, "West");
        assert!(means[1].1.is_nan());
    }

    #[test]
    fn empty_view_gives_empty_series() {
        let ds = regions(&["North"]);
        let view = filter(&ds, &FilterSelection::default());
        let specs = [
            ChartSpec::Histogram {
                column: NumericColumn::Age,
                bins: 20,
            },
            ChartSpec::CategoryCounts {
                column: CategoricalColumn::Gender,
            },
            ChartSpec::RankedCategoryCounts {
                column: CategoricalColumn::Region,
            },
            ChartSpec::GroupedMean {
                group: CategoricalColumn::Region,
                value: NumericColumn::WalletBalance,
            },
        ];
        for spec in &specs {
            assert!(build_series(&view, spec).is_empty(), "{spec:?}");
        }
    }

    #[test]
    fn histogram_bins_cover_range_with_closed_last_bin() {
        let bins = histogram(&[0.0, 1.0, 2.0, 3.0, 4.0, 10.0], 5);
        assert_eq!(bins.len(), 5);
        assert_eq!(bins[0].start, 0.0);
        assert_eq!(bins[0].end, 2.0);
        assert_eq!(bins[4].end, 10.0);
        let counts: Vec<usize> = bins.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![2, 2, 1, 0, 1]);
        assert_eq!(bins[1].center(), 3.0);
        assert_eq!(bins[1].width(), 2.0);
    }

    #[test]
    fn histogram_of_single_value_spans_unit_width() {
        let bins = histogram(&[7.0, 7.0, f64::NAN], 2);
        assert_eq!(bins[0].start, 6.5);
        assert_eq!(bins[1].end, 7.5);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 2);
        assert_eq!(bins[1].count, 2);
    }

    #[test]
    fn density_curve_uses_scott_bandwidth_over_bin_range() {
        let values = [1.0, 3.0];
        let bins = histogram(&values, 2);
        let curve = density_curve(&values, &bins);
        assert_eq!(curve.len(), DENSITY_POINTS);
        assert_eq!(curve[0][0], 1.0);
        assert!((curve[DENSITY_POINTS - 1][0] - 3.0).abs() < 1e-12);

        // std = sqrt(2), h = sqrt(2) * 2^(-1/5), bin width 1
        let h = 2f64.sqrt() * 2f64.powf(-0.2);
        let expected_end = (1.0 + (-0.5 * (2.0 / h).powi(2)).exp())
            / (h * (2.0 * std::f64::consts::PI).sqrt());
        assert!((curve[0][1] - expected_end).abs() < 1e-9);
        assert!((curve[0][1] - curve[DENSITY_POINTS - 1][1]).abs() < 1e-9);
        let peak = curve.iter().map(|p| p[1]).fold(0.0, f64::max);
        assert!(peak > curve[0][1]);
    }

    #[test]
    fn density_curve_scales_to_counts() {
        // Wide sample so little mass falls outside the range.
        let values: Vec<f64> = (0..1000).map(|i| ((i * 37) % 1000) as f64 / 10.0).collect();
        let bins = histogram(&values, 20);
        let curve = density_curve(&values, &bins);
        let step = curve[1][0] - curve[0][0];
        let area: f64 = curve.windows(2).map(|w| (w[0][1] + w[1][1]) / 2.0 * step).sum();
        // Area under a count-scaled density is n * bin width.
        let expected = values.len() as f64 * bins[0].width();
        assert!(area < expected);
        assert!(area > 0.9 * expected, "{area} vs {expected}");
    }

    #[test]
    fn density_curve_needs_spread() {
        let bins = histogram(&[5.0, 5.0], 2);
        assert!(density_curve(&[5.0, 5.0], &bins).is_empty());
        assert!(density_curve(&[5.0], &histogram(&[5.0], 2)).is_empty());
        assert!(density_curve(&[1.0, 2.0], &[]).is_empty());
    }

    #[test]
    fn histogram_without_bins_or_values_is_empty() {
        assert!(histogram(&[1.0, 2.0], 0).is_empty());
        assert!(histogram(&[f64::NAN], 4).is_empty());
    }
}
