//! Shared test fixtures.

use chrono::NaiveDate;
use valuation_core::{Cadence, FinancialStatementSet, InMemoryProvider, LineItem, Symbol};

pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

const ITEMS: [(LineItem, f64); 8] = [
    (LineItem::NetIncomeCommonStockholders, 1_000.0),
    (LineItem::OrdinarySharesNumber, 100.0),
    (LineItem::Ebitda, 1_500.0),
    (LineItem::CommonStockEquity, 5_000.0),
    (LineItem::TotalAssets, 12_000.0),
    (LineItem::CurrentLiabilities, 3_000.0),
    (LineItem::OperatingCashFlow, 1_200.0),
    (LineItem::DepreciationAndAmortization, 300.0),
];

/// Every line item for each fiscal year end, inserted in the order given.
///
/// Net income grows by 1000 per year after 2020.
pub(crate) fn complete_statements(ticker: &str, years: &[i32]) -> FinancialStatementSet {
    let mut set = FinancialStatementSet::new(Symbol::new(ticker), Cadence::Annual);
    for year in years {
        for (item, value) in ITEMS {
            let value = if item == LineItem::NetIncomeCommonStockholders {
                value * f64::from(year - 2020)
            } else {
                value
            };
            set.insert(date(*year, 12, 31), item, value);
        }
    }
    set
}

/// Closes that resolve the 2021 to 2023 year ends to 100, 120 and 150.
pub(crate) const CLOSES: [(i32, u32, u32, f64); 3] = [
    (2022, 1, 3, 100.0),
    (2023, 1, 3, 120.0),
    (2024, 1, 2, 150.0),
];

/// Provider holding complete 2021 to 2023 data for each ticker.
pub(crate) fn provider_for(tickers: &[&str]) -> InMemoryProvider {
    tickers.iter().fold(InMemoryProvider::new(), |provider, ticker| {
        provider
            .with_statements(complete_statements(ticker, &[2021, 2022, 2023]))
            .with_closes(
                *ticker,
                CLOSES.iter().map(|(y, m, d, c)| (date(*y, *m, *d), *c)),
            )
    })
}
