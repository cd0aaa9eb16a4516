//! Provider traits for fetching statements and prices.
//!
//! This module defines the core provider traits:
//!
//! - [`DataProvider`] - Base trait for all data providers
//! - [`StatementProvider`] - Balance sheet, income statement and cash flow per ticker
//! - [`PriceProvider`] - Closing price on or shortly after a date

use async_trait::async_trait;
use chrono::NaiveDate;
use std::fmt::Debug;

use crate::{
    cadence::Cadence,
    error::Result,
    types::{FinancialStatementSet, Symbol},
};

/// Base trait for all data providers.
///
/// All data providers must implement this trait to provide basic metadata
/// about the provider and its capabilities.
pub trait DataProvider: Send + Sync + Debug {
    /// Returns the name of this provider (e.g., "Yahoo Finance").
    fn name(&self) -> &str;

    /// Returns a description of this provider.
    fn description(&self) -> &str;

    /// Returns the statement cadences supported by this provider.
    fn supported_cadences(&self) -> &[Cadence];
}

/// Provider for financial statements.
#[async_trait]
pub trait StatementProvider: DataProvider {
    /// Fetches the three statements for a symbol.
    ///
    /// Unknown or delisted symbols may yield [`DataError::SymbolNotFound`] or a
    /// set with empty statements; callers must handle both.
    ///
    /// [`DataError::SymbolNotFound`]: crate::DataError::SymbolNotFound
    async fn fetch_statements(
        &self,
        symbol: &Symbol,
        cadence: Cadence,
    ) -> Result<FinancialStatementSet>;
}

/// Provider for historical closing prices.
#[async_trait]
pub trait PriceProvider: DataProvider {
    /// Resolves the close of the first trading day at or after `date`,
    /// within [`PRICE_WINDOW_DAYS`](crate::PRICE_WINDOW_DAYS) calendar days.
    ///
    /// Returns [`DataError::DataNotAvailable`](crate::DataError::DataNotAvailable)
    /// when the window holds no trading data.
    async fn resolve_close(&self, symbol: &Symbol, date: NaiveDate) -> Result<f64>;
}
