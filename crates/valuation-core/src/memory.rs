//! In-memory statement and price provider.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::{
    cadence::Cadence,
    error::{DataError, Result},
    price::{DailyClose, first_close_on_or_after, window_end},
    provider::{DataProvider, PriceProvider, StatementProvider},
    types::{FinancialStatementSet, Symbol},
};

/// Provider backed by fixed statement sets and daily closes.
///
/// Useful for tests and for replaying previously downloaded data. Symbols
/// registered with [`InMemoryProvider::with_failure`] fail every request with
/// a network error.
#[derive(Debug, Default)]
pub struct InMemoryProvider {
    statements: HashMap<(Symbol, Cadence), FinancialStatementSet>,
    closes: HashMap<Symbol, Vec<DailyClose>>,
    failures: HashMap<Symbol, String>,
    statement_requests: AtomicUsize,
    price_requests: AtomicUsize,
}

impl InMemoryProvider {
    /// Create a new empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a statement set under its own symbol and cadence.
    #[must_use]
    pub fn with_statements(mut self, set: FinancialStatementSet) -> Self {
        self.statements
            .insert((set.symbol.clone(), set.cadence), set);
        self
    }

    /// Adds daily closes for a symbol.
    #[must_use]
    pub fn with_closes(
        mut self,
        symbol: impl Into<Symbol>,
        closes: impl IntoIterator<Item = (NaiveDate, f64)>,
    ) -> Self {
        self.closes
            .entry(symbol.into())
            .or_default()
            .extend(closes.into_iter().map(|(d, c)| DailyClose::new(d, c)));
        self
    }

    /// Makes every request for `symbol` fail with [`DataError::Network`].
    #[must_use]
    pub fn with_failure(mut self, symbol: impl Into<Symbol>, message: impl Into<String>) -> Self {
        self.failures.insert(symbol.into(), message.into());
        self
    }

    /// Number of statement requests served so far.
    #[must_use]
    pub fn statement_requests(&self) -> usize {
        self.statement_requests.load(Ordering::Relaxed)
    }

    /// Number of price requests served so far.
    #[must_use]
    pub fn price_requests(&self) -> usize {
        self.price_requests.load(Ordering::Relaxed)
    }

    fn check_failure(&self, symbol: &Symbol) -> Result<()> {
        match self.failures.get(symbol) {
            Some(message) => Err(DataError::Network(message.clone())),
            None => Ok(()),
        }
    }
}

impl DataProvider for InMemoryProvider {
    fn name(&self) -> &str {
        "In-Memory"
    }

    fn description(&self) -> &str {
        "Fixed statements and prices held in memory"
    }

    fn supported_cadences(&self) -> &[Cadence] {
        &[Cadence::Annual, Cadence::Quarterly]
    }
}

#[async_trait]
impl StatementProvider for InMemoryProvider {
    async fn fetch_statements(
        &self,
        symbol: &Symbol,
        cadence: Cadence,
    ) -> Result<FinancialStatementSet> {
        self.statement_requests.fetch_add(1, Ordering::Relaxed);
        self.check_failure(symbol)?;

        self.statements
            .get(&(symbol.clone(), cadence))
            .cloned()
            .ok_or_else(|| DataError::SymbolNotFound(symbol.to_string()))
    }
}

#[async_trait]
impl PriceProvider for InMemoryProvider {
    async fn resolve_close(&self, symbol: &Symbol, date: NaiveDate) -> Result<f64> {
        self.price_requests.fetch_add(1, Ordering::Relaxed);
        self.check_failure(symbol)?;

        let bars = self
            .closes
            .get(symbol)
            .ok_or_else(|| DataError::SymbolNotFound(symbol.to_string()))?;

        first_close_on_or_after(bars, date).ok_or_else(|| DataError::DataNotAvailable {
            symbol: symbol.to_string(),
            start: date.to_string(),
            end: window_end(date).to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LineItem;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_statements_by_cadence() {
        let set = FinancialStatementSet::new(Symbol::new("AAPL"), Cadence::Annual).with_value(
            date(2023, 9, 30),
            LineItem::TotalAssets,
            352_583_000_000.0,
        );
        let provider = InMemoryProvider::new().with_statements(set);
        let symbol = Symbol::new("AAPL");

        let fetched = provider
            .fetch_statements(&symbol, Cadence::Annual)
            .await
            .unwrap();
        assert_eq!(
            fetched.value(LineItem::TotalAssets, date(2023, 9, 30)),
            Some(352_583_000_000.0)
        );

        let err = provider
            .fetch_statements(&symbol, Cadence::Quarterly)
            .await
            .unwrap_err();
        assert!(matches!(err, DataError::SymbolNotFound(_)));
        assert_eq!(provider.statement_requests(), 2);
    }

    #[tokio::test]
    async fn test_resolve_close_window() {
        let provider = InMemoryProvider::new().with_closes(
            "MSFT",
            [(date(2023, 7, 3), 337.99), (date(2023, 6, 30), 340.54)],
        );
        let symbol = Symbol::new("MSFT");

        let close = provider
            .resolve_close(&symbol, date(2023, 6, 30))
            .await
            .unwrap();
        assert_eq!(close, 340.54);

        let err = provider
            .resolve_close(&symbol, date(2023, 9, 30))
            .await
            .unwrap_err();
        assert!(matches!(err, DataError::DataNotAvailable { .. }));
    }

    #[tokio::test]
    async fn test_configured_failure() {
        let provider = InMemoryProvider::new().with_failure("BAD", "connection reset");
        let err = provider
            .fetch_statements(&Symbol::new("BAD"), Cadence::Annual)
            .await
            .unwrap_err();
        assert!(matches!(err, DataError::Network(_)));
        assert!(!err.is_missing_data());
    }
}
