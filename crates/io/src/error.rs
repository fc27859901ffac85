use std::fmt;

use tapfare_recon::ReconError;

#[derive(Debug)]
pub enum IoError {
    /// File read/write error.
    Io(String),
    /// Malformed CSV (unbalanced quotes, ragged rows, ...).
    Csv(String),
    /// Required column missing from the header row.
    MissingColumn { file: &'static str, column: &'static str },
    /// A tap row failed validation. `record` is the row's ID as written.
    InvalidTap { record: String, field: &'static str, value: String },
    /// A fare table cost is not a non-negative amount with at most 2 decimals.
    InvalidCost { line: usize, value: String },
    /// A fare table row was rejected by the fare graph.
    Route { line: usize, source: ReconError },
    /// Output date format contains an unsupported specifier.
    InvalidDateFormat(String),
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "IO error: {msg}"),
            Self::Csv(msg) => write!(f, "CSV error: {msg}"),
            Self::MissingColumn { file, column } => {
                write!(f, "{file}: missing column '{column}'")
            }
            Self::InvalidTap { record, field, value } => {
                write!(f, "tap record '{record}': invalid {field} '{value}'")
            }
            Self::InvalidCost { line, value } => {
                write!(f, "fare table line {line}: cannot parse cost '{value}'")
            }
            Self::Route { line, source } => write!(f, "fare table line {line}: {source}"),
            Self::InvalidDateFormat(fmt) => write!(f, "unsupported date format '{fmt}'"),
        }
    }
}

impl std::error::Error for IoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Route { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<csv::Error> for IoError {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e.to_string())
    }
}

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
