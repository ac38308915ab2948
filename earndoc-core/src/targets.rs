//! Targets file parsing: (symbol, quarter) rows from a CSV.
//!
//! The first row is a header. `symbol` and `quarter` columns are matched
//! case-insensitively in any order; extra columns are ignored. Symbols are
//! trimmed and uppercased, quarters must look like `2024Q4`. Rows whose
//! symbol is empty after normalization are skipped, but their quarter is
//! still validated first, so one malformed quarter anywhere aborts the load.

use std::path::Path;

use crate::error::{ConfigError, LoadError, ValidationError};

/// One (symbol, quarter) unit of work, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub symbol: String,
    pub quarter: String,
}

impl Target {
    pub fn new(symbol: impl Into<String>, quarter: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            quarter: quarter.into(),
        }
    }
}

/// Trim and uppercase a raw symbol cell.
pub fn normalize_symbol(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Trim, uppercase, and validate a raw quarter cell against `YYYYQn`.
pub fn normalize_quarter(raw: &str) -> Result<String, ValidationError> {
    let quarter = raw.trim().to_uppercase();
    if is_valid_quarter(&quarter) {
        Ok(quarter)
    } else {
        Err(ValidationError::BadQuarter(quarter))
    }
}

/// Four digits, a literal `Q`, then a quarter digit 1 through 4.
fn is_valid_quarter(quarter: &str) -> bool {
    let bytes = quarter.as_bytes();
    bytes.len() == 6
        && bytes[..4].iter().all(|b| b.is_ascii_digit())
        && bytes[4] == b'Q'
        && (b'1'..=b'4').contains(&bytes[5])
}

/// Read and validate every target from a CSV file, preserving row order.
///
/// Duplicates are kept; later rows simply overwrite the same document.
pub fn read_targets(path: &Path) -> Result<Vec<Target>, LoadError> {
    if !path.exists() {
        return Err(ConfigError::TargetsFileMissing(path.display().to_string()).into());
    }

    let unreadable = |e: &dyn std::fmt::Display| ConfigError::TargetsFileUnreadable {
        path: path.display().to_string(),
        reason: e.to_string(),
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| unreadable(&e))?;

    let headers = reader.headers().map_err(|e| unreadable(&e))?.clone();
    if headers.is_empty() {
        return Err(ConfigError::MissingHeader.into());
    }

    let mut symbol_idx = None;
    let mut quarter_idx = None;
    for (i, name) in headers.iter().enumerate() {
        // The first header cell may carry a UTF-8 BOM.
        match name.trim_start_matches('\u{feff}').trim().to_lowercase().as_str() {
            "symbol" if symbol_idx.is_none() => symbol_idx = Some(i),
            "quarter" if quarter_idx.is_none() => quarter_idx = Some(i),
            _ => {}
        }
    }
    let (Some(symbol_idx), Some(quarter_idx)) = (symbol_idx, quarter_idx) else {
        return Err(ConfigError::MissingColumns(
            headers.iter().map(str::to_string).collect(),
        )
        .into());
    };

    let mut targets = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| unreadable(&e))?;

        // Quarter is checked even when the symbol turns out to be blank.
        let quarter = normalize_quarter(record.get(quarter_idx).unwrap_or(""))?;
        let symbol = normalize_symbol(record.get(symbol_idx).unwrap_or(""));
        if !symbol.is_empty() {
            targets.push(Target { symbol, quarter });
        }
    }

    if targets.is_empty() {
        return Err(ConfigError::NoTargets.into());
    }
    Ok(targets)
}
