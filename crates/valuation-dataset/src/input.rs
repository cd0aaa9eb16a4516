//! Ticker list input.

use polars::prelude::*;
use std::path::Path;
use valuation_core::{DataError, Result, Symbol};

/// Column holding tickers in the default input file.
pub const DEFAULT_TICKER_COLUMN: &str = "Symbol";

/// Reads tickers from `column` of a CSV file with a header row.
///
/// Blank cells are ignored. Order is preserved and duplicates are kept.
pub fn read_tickers(path: impl AsRef<Path>, column: &str) -> Result<Vec<Symbol>> {
    let path = path.as_ref();
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .and_then(|reader| reader.finish())
        .map_err(|e| DataError::Parse(format!("{}: {e}", path.display())))?;

    tickers_from_frame(&df, column)
}

/// Extracts tickers from a DataFrame column.
pub fn tickers_from_frame(df: &DataFrame, column: &str) -> Result<Vec<Symbol>> {
    let values = df
        .column(column)
        .and_then(|c| c.cast(&DataType::String))
        .map_err(|_| DataError::InvalidParameter(format!("missing ticker column '{column}'")))?;
    let values = values
        .str()
        .map_err(|e| DataError::Parse(e.to_string()))?;

    Ok(values
        .into_iter()
        .flatten()
        .filter(|s| !s.trim().is_empty())
        .map(Symbol::new)
        .collect())
}
