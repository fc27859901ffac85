// Money and timestamp formatting shared by the readers and the writer

use std::io::Read;
use std::path::Path;

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

use crate::error::IoError;

/// Gate export timestamp layout, always UTC.
pub const DATE_FORMAT: &str = "%d-%m-%Y %H:%M:%S";

pub const DEFAULT_CURRENCY_SYMBOL: &str = "$";

/// How trip records are rendered on output.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputFormat {
    pub date_format: String,
    pub currency_symbol: String,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self {
            date_format: DATE_FORMAT.to_string(),
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
        }
    }
}

impl OutputFormat {
    pub fn validate(&self) -> Result<(), IoError> {
        validate_date_format(&self.date_format)
    }
}

/// Reject strftime strings chrono cannot render (rendering them would panic).
pub fn validate_date_format(fmt: &str) -> Result<(), IoError> {
    if fmt.is_empty() || StrftimeItems::new(fmt).any(|item| matches!(item, Item::Error)) {
        return Err(IoError::InvalidDateFormat(fmt.to_string()));
    }
    Ok(())
}

/// Parse a non-negative decimal amount with at most two fractional digits
/// into minor units: `"3.25"` -> 325, `"7.3"` -> 730, `"2"` -> 200.
pub fn parse_cost_cents(value: &str) -> Option<i64> {
    let value = value.trim();
    let (whole, frac) = value.split_once('.').unwrap_or((value, ""));
    if whole.is_empty() && frac.is_empty() {
        return None;
    }
    if frac.len() > 2
        || !whole.bytes().all(|b| b.is_ascii_digit())
        || !frac.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }

    let whole: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let frac_cents: i64 = match frac.len() {
        0 => 0,
        1 => frac.parse::<i64>().ok()? * 10,
        _ => frac.parse().ok()?,
    };
    whole.checked_mul(100)?.checked_add(frac_cents)
}

/// `325` -> `"$3.25"`, `-50` -> `"-$0.50"`.
pub fn format_cents(cents: i64, symbol: &str) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{symbol}{}.{:02}", abs / 100, abs % 100)
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252 exports)
pub fn read_file_as_utf8(path: &Path) -> Result<String, IoError> {
    let mut file = std::fs::File::open(path)
        .map_err(|e| IoError::Io(format!("cannot open {}: {e}", path.display())))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| IoError::Io(format!("cannot read {}: {e}", path.display())))?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            log::debug!("{} is not UTF-8, decoding as Windows-1252", path.display());
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}
