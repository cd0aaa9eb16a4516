//! CSV and DataFrame loaders for balance and movement exports.
//!
//! Exports are read with every column as text. Exact duplicate rows (across
//! all columns, not just the ones used here) are dropped before projection.
//! Non-numeric amounts become `None`; rows without a contract or a parseable
//! date are skipped with a warning.

use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use std::collections::HashSet;
use std::path::Path;
use tracing::warn;

use crate::{
    error::{MwrrError, Result},
    records::{BalanceRow, MovementRow},
};

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];
const DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
];

fn frame_err(e: PolarsError) -> MwrrError {
    MwrrError::Frame(e.to_string())
}

fn read_csv(path: &Path) -> Result<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .and_then(|reader| reader.finish())
        .map_err(|e| MwrrError::Load {
            path: path.display().to_string(),
            message: e.to_string(),
        })
}

/// Casts every column to text.
fn as_text(df: &DataFrame) -> Result<DataFrame> {
    let columns = df
        .get_columns()
        .iter()
        .map(|c| c.cast(&DataType::String))
        .collect::<PolarsResult<Vec<_>>>()
        .map_err(frame_err)?;
    DataFrame::new(columns).map_err(frame_err)
}

fn text_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a StringChunked> {
    df.column(name)
        .map_err(|_| MwrrError::MissingColumn(name.to_string()))?
        .str()
        .map_err(frame_err)
}

/// Row indices of the first occurrence of each distinct row.
fn distinct_rows(df: &DataFrame) -> Result<Vec<usize>> {
    let columns = df
        .get_columns()
        .iter()
        .map(Column::str)
        .collect::<PolarsResult<Vec<_>>>()
        .map_err(frame_err)?;

    let mut seen = HashSet::new();
    Ok((0..df.height())
        .filter(|&idx| seen.insert(columns.iter().map(|c| c.get(idx)).collect::<Vec<_>>()))
        .collect())
}

/// Parses a date, accepting a trailing time of day.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(value, f).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(value, f).ok())
                .map(|dt| dt.date())
        })
}

fn parse_amount(value: Option<&str>) -> Option<f64> {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

fn contract_id(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

/// Reads balance rows from a frame with `contract`, `balance_date` and
/// `value_pos_mdo` columns.
pub fn balances_from_frame(df: &DataFrame) -> Result<Vec<BalanceRow>> {
    let df = as_text(df)?;
    let contracts = text_column(&df, "contract")?;
    let dates = text_column(&df, "balance_date")?;
    let values = text_column(&df, "value_pos_mdo")?;

    let mut skipped = 0usize;
    let rows: Vec<BalanceRow> = distinct_rows(&df)?
        .into_iter()
        .filter_map(|idx| {
            let row = contract_id(contracts.get(idx)).zip(dates.get(idx).and_then(parse_date));
            if row.is_none() {
                skipped += 1;
            }
            let (contract, balance_date) = row?;
            Some(BalanceRow {
                contract,
                balance_date,
                value_pos_mdo: parse_amount(values.get(idx)),
            })
        })
        .collect();

    if skipped > 0 {
        warn!(skipped, "Balance rows without contract or date were skipped");
    }
    Ok(rows)
}

/// Reads movement rows from a frame with `contract`, `description`,
/// `movement_import` and `operation_date` columns.
pub fn movements_from_frame(df: &DataFrame) -> Result<Vec<MovementRow>> {
    let df = as_text(df)?;
    let contracts = text_column(&df, "contract")?;
    let descriptions = text_column(&df, "description")?;
    let amounts = text_column(&df, "movement_import")?;
    let dates = text_column(&df, "operation_date")?;

    let mut skipped = 0usize;
    let rows: Vec<MovementRow> = distinct_rows(&df)?
        .into_iter()
        .filter_map(|idx| {
            let row = contract_id(contracts.get(idx)).zip(dates.get(idx).and_then(parse_date));
            if row.is_none() {
                skipped += 1;
            }
            let (contract, operation_date) = row?;
            Some(MovementRow {
                contract,
                description: descriptions.get(idx).unwrap_or_default().to_string(),
                movement_import: parse_amount(amounts.get(idx)),
                operation_date,
            })
        })
        .collect();

    if skipped > 0 {
        warn!(skipped, "Movement rows without contract or date were skipped");
    }
    Ok(rows)
}

/// Reads a balances CSV export.
pub fn read_balances(path: impl AsRef<Path>) -> Result<Vec<BalanceRow>> {
    balances_from_frame(&read_csv(path.as_ref())?)
}

/// Reads a movements CSV export.
pub fn read_movements(path: impl AsRef<Path>) -> Result<Vec<MovementRow>> {
    movements_from_frame(&read_csv(path.as_ref())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024-01-31"), Some(date(2024, 1, 31)));
        assert_eq!(parse_date(" 2024-01-31 00:00:00 "), Some(date(2024, 1, 31)));
        assert_eq!(parse_date("31/01/2024"), Some(date(2024, 1, 31)));
        assert_eq!(parse_date("yesterday"), None);
    }

    #[test]
    fn test_read_balances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("balances.csv");
        fs::write(
            &path,
            "contract,position,balance_date,value_pos_mdo\n\
             20486403,A,2024-01-02,100.5\n\
             20486403,A,2024-01-02,100.5\n\
             20486403,B,2024-01-02,100.5\n\
             20486403,C,2024-01-03,n/a\n\
             ,D,2024-01-03,1\n\
             AHA84901,E,not a date,1\n",
        )
        .unwrap();

        let rows = read_balances(&path).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].contract, "20486403");
        assert_eq!(rows[0].balance_date, date(2024, 1, 2));
        assert_eq!(rows[0].value_pos_mdo, Some(100.5));
        assert_eq!(rows[1].value_pos_mdo, Some(100.5));
        assert_eq!(rows[2].value_pos_mdo, None);
    }

    #[test]
    fn test_read_movements() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("movements.csv");
        fs::write(
            &path,
            "contract,description,movement_import,operation_date\n\
             AHA84901,Depósito SPEI,1000,2024-01-02\n\
             AHA84901,Depósito SPEI,1000,2024-01-02\n\
             AHA84901,,5,2024-01-03\n",
        )
        .unwrap();

        let rows = read_movements(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].description, "Depósito SPEI");
        assert_eq!(rows[0].movement_import, Some(1_000.0));
        assert_eq!(rows[1].description, "");
    }

    #[test]
    fn test_missing_column() {
        let df = DataFrame::new(vec![Column::new("contract".into(), ["AHA84901"])]).unwrap();
        assert_eq!(
            balances_from_frame(&df),
            Err(MwrrError::MissingColumn("balance_date".to_string()))
        );
    }

    #[test]
    fn test_numeric_frame_columns() {
        let df = DataFrame::new(vec![
            Column::new("contract".into(), [20_486_403_i64]),
            Column::new("balance_date".into(), ["2024-01-02"]),
            Column::new("value_pos_mdo".into(), [250.0_f64]),
        ])
        .unwrap();

        let rows = balances_from_frame(&df).unwrap();
        assert_eq!(rows[0].contract, "20486403");
        assert_eq!(rows[0].value_pos_mdo, Some(250.0));
    }
}
