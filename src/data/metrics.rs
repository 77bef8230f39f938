use super::filter::FilteredView;
use super::model::Record;

/// Headline statistics of a filtered view.
///
/// The four means are `NaN` on an empty view so the UI can tell "no data"
/// apart from a real zero. `denied_claims_rate` is 0 whenever no claims
/// were filed. Missing flags and claim counts are skipped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    pub dropout_rate: f64,
    pub renewal_rate: f64,
    pub avg_income: f64,
    pub avg_wallet: f64,
    pub denied_claims_rate: f64,
}

pub fn compute_metrics(view: &FilteredView) -> Metrics {
    let sum = |claims: fn(&Record) -> Option<u32>| -> u64 {
        view.iter().filter_map(claims).map(u64::from).sum()
    };
    let total_claims = sum(|r| r.total_claims);
    let denied_claims = sum(|r| r.denied_claims);

    let denied_claims_rate = if total_claims > 0 {
        denied_claims as f64 / total_claims as f64
    } else {
        0.0
    };

    Metrics {
        dropout_rate: mean(view.iter().map(|r| flag_value(r.dropout_flag))),
        renewal_rate: mean(view.iter().map(|r| flag_value(r.renewed))),
        avg_income: mean(view.iter().map(|r| r.monthly_income)),
        avg_wallet: mean(view.iter().map(|r| r.wallet_balance)),
        denied_claims_rate,
    }
}

/// 1.0 / 0.0 for a present flag, `NaN` for a missing one.
pub fn flag_value(flag: Option<bool>) -> f64 {
    match flag {
        Some(true) => 1.0,
        Some(false) => 0.0,
        None => f64::NAN,
    }
}

/// Mean of the non-NaN values; `NaN` when there are none.
pub fn mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, n) = values
        .into_iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 {
        f64::NAN
    } else {
        sum / n as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{filter, FilterSelection, FilteredView};
    use crate::data::model::fixtures::{dataset, record};

    fn claims(total: u32, denied: u32) -> Record {
        let mut r = record("North", "Male");
        r.total_claims = Some(total);
        r.denied_claims = Some(denied);
        r
    }

    #[test]
    fn empty_view_surfaces_nan_but_zero_denied_rate() {
        let ds = dataset(vec![record("North", "Male")]);
        let view = filter(&ds, &FilterSelection::default());
        assert!(view.is_empty());

        let m = compute_metrics(&view);
        assert!(m.dropout_rate.is_nan());
        assert!(m.renewal_rate.is_nan());
        assert!(m.avg_income.is_nan());
        assert!(m.avg_wallet.is_nan());
        assert_eq!(m.denied_claims_rate, 0.0);
    }

    #[test]
    fn denied_rate_is_ratio_of_sums() {
        let ds = dataset(vec![claims(10, 2), claims(0, 0)]);
        let m = compute_metrics(&FilteredView::all(&ds));
        assert_eq!(m.denied_claims_rate, 0.2);
    }

    #[test]
    fn denied_rate_is_zero_without_claims() {
        let ds = dataset(vec![claims(0, 0), claims(0, 0)]);
        assert_eq!(compute_metrics(&FilteredView::all(&ds)).denied_claims_rate, 0.0);
    }

    #[test]
    fn rates_and_means_over_view() {
        let mut a = record("North", "Male");
        a.dropout_flag = Some(true);
        a.monthly_income = 100.0;
        a.wallet_balance = 10.0;
        let mut b = record("North", "Female");
        b.renewed = Some(true);
        b.monthly_income = 300.0;
        b.wallet_balance = f64::NAN;
        let mut c = record("South", "Female");
        c.renewed = Some(true);
        c.monthly_income = 200.0;
        c.wallet_balance = 30.0;
        c.dropout_flag = Some(true);
        let ds = dataset(vec![a, b, c]);

        let m = compute_metrics(&FilteredView::all(&ds));
        assert!((m.dropout_rate - 2.0 / 3.0).abs() < 1e-12);
        assert!((m.renewal_rate - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(m.avg_income, 200.0);
        assert_eq!(m.avg_wallet, 20.0);
    }

    #[test]
    fn missing_flags_and_claims_are_skipped() {
        let mut a = record("North", "Male");
        a.dropout_flag = Some(true);
        a.renewed = None;
        a.total_claims = None;
        a.denied_claims = Some(3);
        let mut b = record("North", "Female");
        b.dropout_flag = None;
        b.renewed = Some(true);
        b.total_claims = Some(4);
        b.denied_claims = None;
        let c = claims(4, 1);
        let ds = dataset(vec![a, b, c]);

        let m = compute_metrics(&FilteredView::all(&ds));
        assert_eq!(m.dropout_rate, 0.5);
        assert_eq!(m.renewal_rate, 0.5);
        // (3 + 1) / (4 + 4)
        assert_eq!(m.denied_claims_rate, 0.5);
    }

    #[test]
    fn mean_skips_nan() {
        assert_eq!(mean([1.0, f64::NAN, 3.0]), 2.0);
        assert!(mean([f64::NAN]).is_nan());
        assert!(mean(std::iter::empty()).is_nan());
    }
}
