use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDate;

use super::error::DateParseWarning;

// ---------------------------------------------------------------------------
// Column names – fixed string contracts with the source file
// ---------------------------------------------------------------------------

pub const REGION: &str = "Region";
pub const GENDER: &str = "Gender";
pub const AGE: &str = "Age";
pub const MONTHLY_INCOME: &str = "Monthly_Income";
pub const WALLET_BALANCE: &str = "Wallet_Balance";
pub const DROPOUT_FLAG: &str = "Dropout_Flag";
pub const RENEWED: &str = "Renewed";
pub const TOTAL_CLAIMS: &str = "Total_Claims";
pub const DENIED_CLAIMS: &str = "Denied_Claims";
pub const POLICY_START_DATE: &str = "Policy_Start_Date";
pub const POLICY_END_DATE: &str = "Policy_End_Date";
pub const LAST_CLAIM_DATE: &str = "Last_Claim_Date";

/// Columns every source must provide.
pub const REQUIRED_COLUMNS: [&str; 12] = [
    REGION,
    GENDER,
    AGE,
    MONTHLY_INCOME,
    WALLET_BALANCE,
    DROPOUT_FLAG,
    RENEWED,
    TOTAL_CLAIMS,
    DENIED_CLAIMS,
    POLICY_START_DATE,
    POLICY_END_DATE,
    LAST_CLAIM_DATE,
];

// ---------------------------------------------------------------------------
// CellValue – a single cell of a pass-through column
// ---------------------------------------------------------------------------

/// A dynamically-typed cell, as read from CSV, JSON or Parquet.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) if v.is_nan() => write!(f, "NaN"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Try to interpret the value as an `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Text used when the cell acts as a category label.
    pub fn label(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            other => other.to_string(),
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Record – one policyholder (one row of the source table)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub region: String,
    pub gender: String,
    /// `NaN` when the source cell is blank or non-numeric.
    pub age: f64,
    pub monthly_income: f64,
    pub wallet_balance: f64,
    /// `None` when the cell is blank or not a 0/1 flag.
    pub dropout_flag: Option<bool>,
    pub renewed: Option<bool>,
    /// `None` when the cell is blank or not a non-negative whole number.
    pub total_claims: Option<u32>,
    /// Not checked against `total_claims`.
    pub denied_claims: Option<u32>,
    pub policy_start_date: Option<NaiveDate>,
    pub policy_end_date: Option<NaiveDate>,
    pub last_claim_date: Option<NaiveDate>,
    /// Every other column, untouched.
    pub extra: BTreeMap<String, CellValue>,
}

impl Record {
    /// Value of `column` as a displayable cell (typed fields included).
    pub fn cell(&self, column: &str) -> CellValue {
        let date = |d: Option<NaiveDate>| d.map(CellValue::Date).unwrap_or(CellValue::Null);
        let int = |v: Option<i64>| v.map(CellValue::Integer).unwrap_or(CellValue::Null);
        match column {
            REGION => CellValue::String(self.region.clone()),
            GENDER => CellValue::String(self.gender.clone()),
            AGE => CellValue::Float(self.age),
            MONTHLY_INCOME => CellValue::Float(self.monthly_income),
            WALLET_BALANCE => CellValue::Float(self.wallet_balance),
            DROPOUT_FLAG => int(self.dropout_flag.map(i64::from)),
            RENEWED => int(self.renewed.map(i64::from)),
            TOTAL_CLAIMS => int(self.total_claims.map(i64::from)),
            DENIED_CLAIMS => int(self.denied_claims.map(i64::from)),
            POLICY_START_DATE => date(self.policy_start_date),
            POLICY_END_DATE => date(self.policy_end_date),
            LAST_CLAIM_DATE => date(self.last_claim_date),
            other => self.extra.get(other).cloned().unwrap_or(CellValue::Null),
        }
    }
}

// ---------------------------------------------------------------------------
// Filterable dimensions
// ---------------------------------------------------------------------------

/// A categorical column the user can filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Dimension {
    Region,
    Gender,
}

impl Dimension {
    pub const ALL: [Dimension; 2] = [Dimension::Region, Dimension::Gender];

    pub fn column(self) -> &'static str {
        match self {
            Dimension::Region => REGION,
            Dimension::Gender => GENDER,
        }
    }

    pub fn value_of(self, record: &Record) -> &str {
        match self {
            Dimension::Region => &record.region,
            Dimension::Gender => &record.gender,
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The parsed dataset. Immutable once built.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub records: Vec<Record>,
    /// Header order of the source.
    pub column_names: Vec<String>,
    /// Sorted distinct values of each filterable dimension.
    pub unique_values: BTreeMap<Dimension, BTreeSet<String>>,
    /// Date cells that were coerced to missing while loading.
    pub date_warnings: Vec<DateParseWarning>,
}

impl Dataset {
    /// Build the dimension indices from the loaded records.
    pub fn from_records(
        records: Vec<Record>,
        column_names: Vec<String>,
        date_warnings: Vec<DateParseWarning>,
    ) -> Self {
        let mut unique_values: BTreeMap<Dimension, BTreeSet<String>> = Dimension::ALL
            .iter()
            .map(|d| (*d, BTreeSet::new()))
            .collect();

        for rec in &records {
            for dim in Dimension::ALL {
                unique_values
                    .entry(dim)
                    .or_default()
                    .insert(dim.value_of(rec).to_string());
            }
        }

        Dataset {
            records,
            column_names,
            unique_values,
            date_warnings,
        }
    }

    /// Number of policyholders.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct observed values of a dimension.
    pub fn values_of(&self, dim: Dimension) -> &BTreeSet<String> {
        static EMPTY: BTreeSet<String> = BTreeSet::new();
        self.unique_values.get(&dim).unwrap_or(&EMPTY)
    }
}
