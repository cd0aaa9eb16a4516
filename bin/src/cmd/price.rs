//! Price lookup command implementation.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use valuation::{PRICE_WINDOW_DAYS, PriceProvider, Symbol, YahooProvider};

/// Prints the close of the first trading day on or after `date`.
pub(crate) async fn show_price(symbol: &str, date: NaiveDate) -> Result<()> {
    let provider = YahooProvider::new()?;
    let symbol = Symbol::new(symbol);

    let close = provider
        .resolve_close(&symbol, date)
        .await
        .with_context(|| {
            format!("no close for {symbol} within {PRICE_WINDOW_DAYS} days of {date}")
        })?;

    println!("{symbol} {date}: {close:.4}");
    Ok(())
}
