use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{
    DataType, Date32Type, Date64Type, Float32Type, Float64Type, Int32Type, Int64Type,
};
use arrow::util::display::array_value_to_string;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::error::{DateParseWarning, LoadError};
use super::model::{self, CellValue, Dataset, Record, REQUIRED_COLUMNS};

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Number of individual date warnings echoed to the log.
const LOGGED_WARNINGS: usize = 5;

// ---------------------------------------------------------------------------
// DataSource
// ---------------------------------------------------------------------------

/// Where the policyholder table comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataSource {
    /// Remote CSV fetched over HTTP(S).
    Url(String),
    /// Local `.csv`, `.json` or `.parquet` file.
    File(PathBuf),
}

impl DataSource {
    /// Interpret a user-supplied location: `http(s)://` is a URL, anything
    /// else a file path.
    pub fn parse(location: &str) -> Self {
        let lower = location.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            DataSource::Url(location.to_string())
        } else {
            DataSource::File(PathBuf::from(location))
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Url(url) => write!(f, "{url}"),
            DataSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Fetch and parse a dataset. Uncached; see [`DatasetCache`](super::cache::DatasetCache).
pub fn load(source: &DataSource) -> Result<Dataset, LoadError> {
    let result = match source {
        DataSource::Url(url) => fetch_url(url).and_then(|body| parse_csv(body.as_slice(), url)),
        DataSource::File(path) => load_file(path),
    };

    match &result {
        Ok(dataset) => {
            log::info!(
                "Loaded {} policyholders from {source} with columns {:?}",
                dataset.len(),
                dataset.column_names
            );
            if dataset.is_empty() {
                log::warn!("{source} has a header but no data rows");
            }
            if !dataset.date_warnings.is_empty() {
                log::warn!(
                    "{} date cells could not be parsed and were set to missing",
                    dataset.date_warnings.len()
                );
                for warning in dataset.date_warnings.iter().take(LOGGED_WARNINGS) {
                    log::warn!("  {warning}");
                }
            }
        }
        Err(e) => log::error!("Failed to load {source}: {e:#}"),
    }
    result
}

/// Load a dataset from a local file. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row naming the policyholder columns
/// * `.json`    – `[{ "Region": "North", "Age": 34, ... }, ...]`
/// * `.parquet` – one column per field, dates as `Date32` or text
pub fn load_file(path: &Path) -> Result<Dataset, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let origin = path.display().to_string();
    let io_err = |source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    };

    match ext.as_str() {
        "csv" => {
            let file = std::fs::File::open(path).map_err(io_err)?;
            parse_csv(file, &origin)
        }
        "json" => {
            let text = std::fs::read_to_string(path).map_err(io_err)?;
            parse_json(&text, &origin)
        }
        "parquet" | "pq" => {
            let file = std::fs::File::open(path).map_err(io_err)?;
            parse_parquet(file, &origin)
        }
        other => Err(LoadError::UnsupportedFormat(other.to_string())),
    }
}

fn fetch_url(url: &str) -> Result<Vec<u8>, LoadError> {
    let unreachable = |e: reqwest::Error| LoadError::Unreachable {
        location: url.to_string(),
        reason: e.to_string(),
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()
        .map_err(unreachable)?;

    let response = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .map_err(unreachable)?;

    let bytes = response.bytes().map_err(unreachable)?;
    Ok(bytes.to_vec())
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

fn parse_csv<R: Read>(input: R, origin: &str) -> Result<Dataset, LoadError> {
    // Short rows are padded with nulls instead of failing the load.
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(input);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut builder = RecordBuilder::new(headers, origin)?;

    for (row_no, result) in reader.records().enumerate() {
        let row = result.with_context(|| format!("CSV row {row_no}"))?;
        let cells = row
            .iter()
            .enumerate()
            .map(|(i, raw)| {
                if builder.is_label_column(i) {
                    text_cell(raw)
                } else {
                    guess_cell_type(raw)
                }
            })
            .collect();
        builder.push_row(row_no, cells);
    }

    Ok(builder.finish())
}

/// Category labels keep their text as written ("007" stays "007").
fn text_cell(s: &str) -> CellValue {
    if s.is_empty() {
        CellValue::Null
    } else {
        CellValue::String(s.to_string())
    }
}

fn guess_cell_type(s: &str) -> CellValue {
    if s.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    if s == "true" || s == "false" || s == "True" || s == "False" {
        return CellValue::Bool(s.eq_ignore_ascii_case("true"));
    }
    CellValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')`.
fn parse_json(text: &str, origin: &str) -> Result<Dataset, LoadError> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;
    let rows = root.as_array().context("Expected top-level JSON array")?;

    // Header: union of keys in first-seen order.
    let mut headers: Vec<String> = Vec::new();
    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let mut builder = RecordBuilder::new(headers.clone(), origin)?;

    for (row_no, row) in rows.iter().enumerate() {
        let Some(obj) = row.as_object() else {
            continue;
        };
        let cells = headers
            .iter()
            .map(|h| obj.get(h).map(json_to_cell).unwrap_or(CellValue::Null))
            .collect();
        builder.push_row(row_no, cells);
    }

    Ok(builder.finish())
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet
// ---------------------------------------------------------------------------

/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn parse_parquet(file: std::fs::File, origin: &str) -> Result<Dataset, LoadError> {
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut records = RecordBuilder::new(headers, origin)?;
    let mut row_no = 0;

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            let cells = batch
                .columns()
                .iter()
                .map(|col| extract_cell(col, row))
                .collect();
            records.push_row(row_no, cells);
            row_no += 1;
        }
    }

    Ok(records.finish())
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &ArrayRef, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 => CellValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => CellValue::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        DataType::Date32 => date_or_null(col.as_primitive::<Date32Type>().value_as_date(row)),
        DataType::Date64 => date_or_null(col.as_primitive::<Date64Type>().value_as_date(row)),
        _ => match array_value_to_string(col, row) {
            Ok(text) => CellValue::String(text),
            Err(_) => CellValue::Null,
        },
    }
}

fn date_or_null(date: Option<NaiveDate>) -> CellValue {
    date.map(CellValue::Date).unwrap_or(CellValue::Null)
}

// ---------------------------------------------------------------------------
// Row → Record conversion shared by every format
// ---------------------------------------------------------------------------

struct RecordBuilder {
    headers: Vec<String>,
    /// Required column name → position in `headers`.
    positions: BTreeMap<&'static str, usize>,
    records: Vec<Record>,
    warnings: Vec<DateParseWarning>,
}

impl RecordBuilder {
    fn new(headers: Vec<String>, origin: &str) -> Result<Self, LoadError> {
        if headers.iter().all(|h| h.is_empty()) {
            return Err(LoadError::NoHeader(origin.to_string()));
        }

        let mut positions = BTreeMap::new();
        for name in REQUIRED_COLUMNS {
            let idx = headers
                .iter()
                .position(|h| h == name)
                .ok_or(LoadError::MissingColumn(name))?;
            positions.insert(name, idx);
        }

        Ok(RecordBuilder {
            headers,
            positions,
            records: Vec::new(),
            warnings: Vec::new(),
        })
    }

    /// Whether header position `idx` holds a filterable category.
    fn is_label_column(&self, idx: usize) -> bool {
        [model::REGION, model::GENDER]
            .iter()
            .any(|name| self.positions[name] == idx)
    }

    fn push_row(&mut self, row_no: usize, mut cells: Vec<CellValue>) {
        cells.resize(self.headers.len(), CellValue::Null);

        let cell = |name: &'static str| &cells[self.positions[name]];

        let mut warnings = Vec::new();
        let mut date = |name: &'static str| parse_date_cell(cell(name), row_no, name, &mut warnings);
        let policy_start_date = date(model::POLICY_START_DATE);
        let policy_end_date = date(model::POLICY_END_DATE);
        let last_claim_date = date(model::LAST_CLAIM_DATE);

        let record = Record {
            region: cell(model::REGION).label(),
            gender: cell(model::GENDER).label(),
            age: number(cell(model::AGE)),
            monthly_income: number(cell(model::MONTHLY_INCOME)),
            wallet_balance: number(cell(model::WALLET_BALANCE)),
            dropout_flag: flag(cell(model::DROPOUT_FLAG)),
            renewed: flag(cell(model::RENEWED)),
            total_claims: count(cell(model::TOTAL_CLAIMS)),
            denied_claims: count(cell(model::DENIED_CLAIMS)),
            policy_start_date,
            policy_end_date,
            last_claim_date,
            extra: self
                .headers
                .iter()
                .zip(cells.iter())
                .filter(|(h, _)| !REQUIRED_COLUMNS.contains(&h.as_str()))
                .map(|(h, c)| (h.clone(), c.clone()))
                .collect(),
        };

        self.warnings.append(&mut warnings);
        self.records.push(record);
    }

    fn finish(self) -> Dataset {
        Dataset::from_records(self.records, self.headers, self.warnings)
    }
}

fn number(cell: &CellValue) -> f64 {
    cell.as_f64().unwrap_or(f64::NAN)
}

/// A 0/1 flag; anything else reads as missing.
fn flag(cell: &CellValue) -> Option<bool> {
    match cell {
        CellValue::Bool(b) => Some(*b),
        CellValue::Integer(0) => Some(false),
        CellValue::Integer(1) => Some(true),
        CellValue::Float(f) if *f == 0.0 => Some(false),
        CellValue::Float(f) if *f == 1.0 => Some(true),
        CellValue::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "0" | "0.0" | "false" => Some(false),
            "1" | "1.0" | "true" => Some(true),
            _ => None,
        },
        _ => None,
    }
}

/// A non-negative whole number; anything else reads as missing.
fn count(cell: &CellValue) -> Option<u32> {
    let value = cell.as_f64()?;
    if value < 0.0 || value.fract() != 0.0 || value > u32::MAX as f64 {
        return None;
    }
    Some(value as u32)
}

fn parse_date_cell(
    cell: &CellValue,
    row: usize,
    column: &'static str,
    warnings: &mut Vec<DateParseWarning>,
) -> Option<NaiveDate> {
    if cell.is_blank() {
        return None;
    }
    let parsed = match cell {
        CellValue::Date(d) => Some(*d),
        CellValue::String(s) => parse_date(s),
        _ => None,
    };
    if parsed.is_none() {
        warnings.push(DateParseWarning {
            row,
            column,
            raw: cell.to_string(),
        });
    }
    parsed
}

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y"];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%m/%d/%Y %H:%M"];

/// Parse the date formats found in exported policy tables.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let s = text.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
}
