use crate::data::model::CellValue;

/// Shown wherever a metric is undefined (e.g. empty selection).
pub const NOT_AVAILABLE: &str = "N/A";

/// `0.1234` → `"12.34%"`.
pub fn percent(ratio: f64) -> String {
    if ratio.is_finite() {
        format!("{:.2}%", ratio * 100.0)
    } else {
        NOT_AVAILABLE.to_string()
    }
}

/// Whole naira with thousands separators: `52340.6` → `"₦52,341"`.
pub fn naira(amount: f64) -> String {
    if !amount.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    let rounded = amount.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{sign}₦{}", group_thousands(rounded.abs() as u64))
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Text for a preview table cell.
pub fn cell(value: &CellValue) -> String {
    match value {
        CellValue::Null => String::new(),
        CellValue::Float(f) if f.is_nan() => String::new(),
        CellValue::Float(f) if f.fract() == 0.0 => format!("{f:.0}"),
        CellValue::Float(f) => format!("{f:.2}"),
        other => other.to_string(),
    }
}

/// Axis tick text for counts and amounts.
pub fn axis_value(v: f64) -> String {
    if v.abs() >= 1_000_000.0 {
        format!("{:.1}M", v / 1_000_000.0)
    } else if v.abs() >= 10_000.0 {
        format!("{:.0}k", v / 1_000.0)
    } else {
        format!("{v:.0}")
    }
}
