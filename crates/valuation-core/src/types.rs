//! Core data types for fundamental analysis.
//!
//! This module defines the fundamental data structures:
//!
//! - [`Symbol`] - Trading symbol/ticker
//! - [`LineItem`] - The statement rows the ratio engine reads
//! - [`Statement`] - One financial statement across fiscal periods
//! - [`FinancialStatementSet`] - Balance sheet, income statement and cash flow for a ticker
//! - [`RatioRecord`] - One output row per ticker and fiscal period

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::cadence::Cadence;

/// A trading symbol/ticker.
///
/// Symbols are automatically uppercased on creation.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Symbol(String);

impl Symbol {
    /// Creates a new symbol from a string, converting to uppercase.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into().trim().to_uppercase())
    }

    /// Returns the symbol as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Symbol {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// The three statements reported for a ticker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatementKind {
    /// Balance sheet.
    BalanceSheet,
    /// Income statement.
    IncomeStatement,
    /// Cash-flow statement.
    CashFlow,
}

impl StatementKind {
    /// All statement kinds, in the order they are checked for emptiness.
    pub const ALL: [Self; 3] = [Self::BalanceSheet, Self::IncomeStatement, Self::CashFlow];

    /// Human readable statement name.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::BalanceSheet => "balance sheet",
            Self::IncomeStatement => "income statement",
            Self::CashFlow => "cash-flow statement",
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A statement line item used by the ratio engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LineItem {
    /// Net income attributable to common stockholders.
    NetIncomeCommonStockholders,
    /// EBITDA as reported on the income statement.
    Ebitda,
    /// Ordinary shares outstanding.
    OrdinarySharesNumber,
    /// Common stock equity.
    CommonStockEquity,
    /// Total assets.
    TotalAssets,
    /// Current liabilities.
    CurrentLiabilities,
    /// Cash flow from operations.
    OperatingCashFlow,
    /// Depreciation and amortization.
    DepreciationAndAmortization,
}

impl LineItem {
    /// Every line item the engine reads.
    pub const ALL: [Self; 8] = [
        Self::NetIncomeCommonStockholders,
        Self::Ebitda,
        Self::OrdinarySharesNumber,
        Self::CommonStockEquity,
        Self::TotalAssets,
        Self::CurrentLiabilities,
        Self::OperatingCashFlow,
        Self::DepreciationAndAmortization,
    ];

    /// The statement this line item is reported on.
    #[must_use]
    pub const fn statement(&self) -> StatementKind {
        match self {
            Self::NetIncomeCommonStockholders | Self::Ebitda => StatementKind::IncomeStatement,
            Self::OrdinarySharesNumber
            | Self::CommonStockEquity
            | Self::TotalAssets
            | Self::CurrentLiabilities => StatementKind::BalanceSheet,
            Self::OperatingCashFlow | Self::DepreciationAndAmortization => StatementKind::CashFlow,
        }
    }

    /// The row label as it appears in published statements.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::NetIncomeCommonStockholders => "Net Income Common Stockholders",
            Self::Ebitda => "EBITDA",
            Self::OrdinarySharesNumber => "Ordinary Shares Number",
            Self::CommonStockEquity => "Common Stock Equity",
            Self::TotalAssets => "Total Assets",
            Self::CurrentLiabilities => "Current Liabilities",
            Self::OperatingCashFlow => "Operating Cash Flow",
            Self::DepreciationAndAmortization => "Depreciation And Amortization",
        }
    }
}

impl fmt::Display for LineItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Line-item values for one fiscal period of one statement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatementPeriod {
    /// End date of the reporting period.
    pub period_end: NaiveDate,
    /// Reported values; absent items are simply missing.
    pub items: HashMap<LineItem, f64>,
}

impl StatementPeriod {
    /// Creates an empty period.
    #[must_use]
    pub fn new(period_end: NaiveDate) -> Self {
        Self {
            period_end,
            items: HashMap::new(),
        }
    }
}

/// One financial statement across fiscal periods.
///
/// Periods are kept in the order the provider delivered them. Use
/// [`FinancialStatementSet::period_ends`] for the canonical ordering.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    /// Which statement this is.
    pub kind: StatementKind,
    /// Reported periods, in provider order.
    pub periods: Vec<StatementPeriod>,
}

impl Statement {
    /// Creates an empty statement.
    #[must_use]
    pub const fn new(kind: StatementKind) -> Self {
        Self {
            kind,
            periods: Vec::new(),
        }
    }

    /// Records a value, creating the period if it does not exist yet.
    ///
    /// Non-finite values are dropped.
    pub fn insert(&mut self, period_end: NaiveDate, item: LineItem, value: f64) {
        if !value.is_finite() {
            return;
        }
        let period = match self.periods.iter().position(|p| p.period_end == period_end) {
            Some(idx) => &mut self.periods[idx],
            None => {
                self.periods.push(StatementPeriod::new(period_end));
                let last = self.periods.len() - 1;
                &mut self.periods[last]
            }
        };
        period.items.insert(item, value);
    }

    /// Builder variant of [`Statement::insert`].
    #[must_use]
    pub fn with_value(mut self, period_end: NaiveDate, item: LineItem, value: f64) -> Self {
        self.insert(period_end, item, value);
        self
    }

    /// Looks up a line item for a period.
    #[must_use]
    pub fn value(&self, item: LineItem, period_end: NaiveDate) -> Option<f64> {
        self.periods
            .iter()
            .find(|p| p.period_end == period_end)
            .and_then(|p| p.items.get(&item).copied())
    }

    /// Returns true if the statement has no reported value at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.periods.iter().all(|p| p.items.is_empty())
    }

    /// Period-end dates in provider order.
    pub fn period_ends(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.periods.iter().map(|p| p.period_end)
    }
}

/// Balance sheet, income statement and cash-flow statement for one ticker.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FinancialStatementSet {
    /// Stock symbol.
    pub symbol: Symbol,
    /// Reporting cadence shared by all three statements.
    pub cadence: Cadence,
    /// Balance sheet.
    pub balance_sheet: Statement,
    /// Income statement.
    pub income_statement: Statement,
    /// Cash-flow statement.
    pub cash_flow: Statement,
}

impl FinancialStatementSet {
    /// Creates a set with three empty statements.
    #[must_use]
    pub const fn new(symbol: Symbol, cadence: Cadence) -> Self {
        Self {
            symbol,
            cadence,
            balance_sheet: Statement::new(StatementKind::BalanceSheet),
            income_statement: Statement::new(StatementKind::IncomeStatement),
            cash_flow: Statement::new(StatementKind::CashFlow),
        }
    }

    /// Returns the statement of the given kind.
    #[must_use]
    pub const fn statement(&self, kind: StatementKind) -> &Statement {
        match kind {
            StatementKind::BalanceSheet => &self.balance_sheet,
            StatementKind::IncomeStatement => &self.income_statement,
            StatementKind::CashFlow => &self.cash_flow,
        }
    }

    /// Returns the statement of the given kind, mutably.
    pub const fn statement_mut(&mut self, kind: StatementKind) -> &mut Statement {
        match kind {
            StatementKind::BalanceSheet => &mut self.balance_sheet,
            StatementKind::IncomeStatement => &mut self.income_statement,
            StatementKind::CashFlow => &mut self.cash_flow,
        }
    }

    /// Records a value on the statement the line item belongs to.
    pub fn insert(&mut self, period_end: NaiveDate, item: LineItem, value: f64) {
        self.statement_mut(item.statement())
            .insert(period_end, item, value);
    }

    /// Builder variant of [`FinancialStatementSet::insert`].
    #[must_use]
    pub fn with_value(mut self, period_end: NaiveDate, item: LineItem, value: f64) -> Self {
        self.insert(period_end, item, value);
        self
    }

    /// Looks up a line item on its statement for a period.
    #[must_use]
    pub fn value(&self, item: LineItem, period_end: NaiveDate) -> Option<f64> {
        self.statement(item.statement()).value(item, period_end)
    }

    /// Returns the first statement with no data at all, if any.
    #[must_use]
    pub fn empty_statement(&self) -> Option<StatementKind> {
        StatementKind::ALL
            .into_iter()
            .find(|kind| self.statement(*kind).is_empty())
    }

    /// Canonical period index: every period end reported on any statement,
    /// most recent first, without duplicates.
    #[must_use]
    pub fn period_ends(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = StatementKind::ALL
            .iter()
            .flat_map(|kind| self.statement(*kind).period_ends())
            .collect();
        dates.sort_unstable_by(|a, b| b.cmp(a));
        dates.dedup();
        dates
    }
}

/// One row of the generated dataset.
///
/// Unavailable values are `None`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RatioRecord {
    /// Ticker identifier.
    pub ticker: Symbol,
    /// Fiscal period end.
    pub date: NaiveDate,
    /// Earnings per share.
    pub eps: Option<f64>,
    /// Price to earnings.
    pub per: Option<f64>,
    /// EBITDA.
    pub ebitda: Option<f64>,
    /// Price to book value.
    pub pbv: Option<f64>,
    /// Total assets over current liabilities.
    pub solvency: Option<f64>,
    /// Return on equity, in percent.
    pub roe: Option<f64>,
    /// Free cash flow.
    pub fcf: Option<f64>,
    /// Resolved closing price.
    pub prices: Option<f64>,
    /// Ordinary shares outstanding.
    pub shares: Option<f64>,
    /// Price change versus the previous (older) period.
    pub returns: Option<f64>,
    /// True if any ratio for this ticker could not be computed.
    pub incomplete: bool,
}

impl RatioRecord {
    /// Column names in output order.
    pub const COLUMNS: [&'static str; 13] = [
        "ticker",
        "date",
        "eps",
        "per",
        "ebitda",
        "pbv",
        "solvency",
        "roe",
        "fcf",
        "prices",
        "shares",
        "returns",
        "incomplete",
    ];

    /// Creates a record with every value unavailable.
    #[must_use]
    pub const fn new(ticker: Symbol, date: NaiveDate) -> Self {
        Self {
            ticker,
            date,
            eps: None,
            per: None,
            ebitda: None,
            pbv: None,
            solvency: None,
            roe: None,
            fcf: None,
            prices: None,
            shares: None,
            returns: None,
            incomplete: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_symbol_normalization() {
        assert_eq!(Symbol::new(" brk-b ").as_str(), "BRK-B");
        assert_eq!(Symbol::from("aapl"), Symbol::new("AAPL"));
    }

    #[test]
    fn test_line_item_statement() {
        assert_eq!(
            LineItem::OrdinarySharesNumber.statement(),
            StatementKind::BalanceSheet
        );
        assert_eq!(LineItem::Ebitda.statement(), StatementKind::IncomeStatement);
        assert_eq!(
            LineItem::DepreciationAndAmortization.statement(),
            StatementKind::CashFlow
        );
        assert_eq!(
            LineItem::OrdinarySharesNumber.to_string(),
            "Ordinary Shares Number"
        );
    }

    #[test]
    fn test_statement_lookup_tolerates_gaps() {
        let stmt = Statement::new(StatementKind::BalanceSheet)
            .with_value(date(2023, 12, 31), LineItem::TotalAssets, 100.0)
            .with_value(date(2022, 12, 31), LineItem::CurrentLiabilities, 40.0)
            .with_value(date(2023, 12, 31), LineItem::CurrentLiabilities, f64::NAN);

        assert_eq!(stmt.value(LineItem::TotalAssets, date(2023, 12, 31)), Some(100.0));
        assert_eq!(stmt.value(LineItem::TotalAssets, date(2022, 12, 31)), None);
        assert_eq!(stmt.value(LineItem::CurrentLiabilities, date(2023, 12, 31)), None);
        assert_eq!(stmt.value(LineItem::TotalAssets, date(2021, 12, 31)), None);
        assert_eq!(stmt.periods.len(), 2);
    }

    #[test]
    fn test_period_ends_are_most_recent_first() {
        let set = FinancialStatementSet::new(Symbol::new("AAA"), Cadence::Annual)
            .with_value(date(2021, 12, 31), LineItem::TotalAssets, 1.0)
            .with_value(date(2023, 12, 31), LineItem::TotalAssets, 1.0)
            .with_value(date(2022, 12, 31), LineItem::Ebitda, 1.0)
            .with_value(date(2023, 12, 31), LineItem::OperatingCashFlow, 1.0);

        assert_eq!(
            set.period_ends(),
            vec![date(2023, 12, 31), date(2022, 12, 31), date(2021, 12, 31)]
        );
    }

    #[test]
    fn test_empty_statement_detection() {
        let set = FinancialStatementSet::new(Symbol::new("CCC"), Cadence::Annual)
            .with_value(date(2023, 12, 31), LineItem::Ebitda, 1.0)
            .with_value(date(2023, 12, 31), LineItem::OperatingCashFlow, 1.0);
        assert_eq!(set.empty_statement(), Some(StatementKind::BalanceSheet));

        let set = set.with_value(date(2023, 12, 31), LineItem::TotalAssets, 1.0);
        assert_eq!(set.empty_statement(), None);
    }
}
