use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// LoadError – fatal, no partial dataset is produced
// ---------------------------------------------------------------------------

/// Failure to produce a [`Dataset`](super::model::Dataset) from a source.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not reach {location}: {reason}")]
    Unreachable { location: String, reason: String },

    #[error("could not read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no header row found in {0}")]
    NoHeader(String),

    #[error("required column '{0}' is missing")]
    MissingColumn(&'static str),

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("malformed data: {0:#}")]
    Malformed(anyhow::Error),
}

impl From<anyhow::Error> for LoadError {
    fn from(err: anyhow::Error) -> Self {
        LoadError::Malformed(err)
    }
}

// ---------------------------------------------------------------------------
// DateParseWarning – non-fatal, the cell becomes "missing"
// ---------------------------------------------------------------------------

/// A date cell that could not be parsed. The row is kept and the field
/// reads as `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateParseWarning {
    /// Zero-based data row (header excluded).
    pub row: usize,
    pub column: &'static str,
    pub raw: String,
}

impl fmt::Display for DateParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "row {}: {} = '{}' is not a date",
            self.row, self.column, self.raw
        )
    }
}
