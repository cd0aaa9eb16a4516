//! Money-weighted return command implementation.

use anyhow::{Context, Result};
use polars::prelude::*;
use std::fs::{self, File};
use std::path::Path;
use tracing::info;
use valuation::mwrr::{
    CashMovement, DEFAULT_CONTRACTS, PortfolioValue, clean_balances, clean_movements, evaluate,
    read_balances, read_movements,
};

/// Cleaned movements file name.
const MOVEMENTS_EXPORT: &str = "deposits_withdrawals.csv";
/// Daily portfolio value file name.
const BALANCES_EXPORT: &str = "daily_portfolio_value.csv";

/// Loads, cleans and prints the MWRR of each contract.
pub(crate) fn show_returns(
    balances: &Path,
    movements: &Path,
    contracts: &[String],
    export: Option<&Path>,
) -> Result<()> {
    let contracts: Vec<&str> = if contracts.is_empty() {
        DEFAULT_CONTRACTS.to_vec()
    } else {
        contracts.iter().map(String::as_str).collect()
    };

    let balance_rows = read_balances(balances)
        .with_context(|| format!("reading balances from {}", balances.display()))?;
    let movement_rows = read_movements(movements)
        .with_context(|| format!("reading movements from {}", movements.display()))?;

    let portfolio = clean_balances(&balance_rows, &contracts);
    let cash = clean_movements(&movement_rows, &contracts);
    info!(
        balances = portfolio.len(),
        movements = cash.len(),
        "Records cleaned"
    );

    if let Some(dir) = export {
        export_cleaned(dir, &portfolio, &cash)?;
    }

    for result in evaluate(&portfolio, &cash, &contracts) {
        match (result.mwrr, result.error) {
            (Some(rate), _) => println!("Contract {}: {rate:.2}%", result.contract),
            (None, Some(reason)) => {
                println!("Contract {}: could not calculate MWRR ({reason})", result.contract);
            }
            (None, None) => println!("Contract {}: could not calculate MWRR", result.contract),
        }
    }

    Ok(())
}

fn write_csv(path: &Path, df: &mut DataFrame) -> Result<()> {
    let mut file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    CsvWriter::new(&mut file).finish(df)?;
    Ok(())
}

/// Writes the cleaned portfolio values and cash movements as CSV.
fn export_cleaned(dir: &Path, portfolio: &[PortfolioValue], cash: &[CashMovement]) -> Result<()> {
    fs::create_dir_all(dir)?;

    let mut values = DataFrame::new(vec![
        Column::new(
            "contract".into(),
            portfolio.iter().map(|p| p.contract.as_str()).collect::<Vec<_>>(),
        ),
        Column::new(
            "date".into(),
            portfolio
                .iter()
                .map(|p| p.date.format("%Y-%m-%d").to_string())
                .collect::<Vec<_>>(),
        ),
        Column::new(
            "portfolio_value".into(),
            portfolio.iter().map(|p| p.value).collect::<Vec<_>>(),
        ),
    ])?;
    write_csv(&dir.join(BALANCES_EXPORT), &mut values)?;

    let mut movements = DataFrame::new(vec![
        Column::new(
            "contract".into(),
            cash.iter().map(|m| m.contract.as_str()).collect::<Vec<_>>(),
        ),
        Column::new(
            "description".into(),
            cash.iter().map(|m| m.description.as_str()).collect::<Vec<_>>(),
        ),
        Column::new(
            "kind".into(),
            cash.iter().map(|m| m.kind.to_string()).collect::<Vec<_>>(),
        ),
        Column::new(
            "amount".into(),
            cash.iter().map(|m| m.amount).collect::<Vec<_>>(),
        ),
        Column::new(
            "operation_date".into(),
            cash.iter()
                .map(|m| m.date.format("%Y-%m-%d").to_string())
                .collect::<Vec<_>>(),
        ),
    ])?;
    write_csv(&dir.join(MOVEMENTS_EXPORT), &mut movements)?;

    info!(dir = %dir.display(), "Cleaned records exported");
    Ok(())
}
