//! Per-period ratio functions.
//!
//! Every function is pure and returns an [`Outcome`]. Dependencies between
//! ratios are passed in as outcomes, so a failure upstream turns into
//! [`RatioError::Dependency`] downstream and nothing else.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use valuation_core::{FinancialStatementSet, LineItem};

use crate::error::{Outcome, RatioError};

/// The ratios computed for every period.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Ratio {
    /// Earnings per share.
    Eps,
    /// Price to earnings.
    Per,
    /// EBITDA.
    Ebitda,
    /// Book value per share.
    BookValuePerShare,
    /// Price to book value.
    Pbv,
    /// Total assets over current liabilities.
    Solvency,
    /// Return on equity, in percent.
    Roe,
    /// Free cash flow.
    FreeCashFlow,
}

impl Ratio {
    /// All ratios in output order.
    pub const ALL: [Self; 8] = [
        Self::Eps,
        Self::Per,
        Self::Ebitda,
        Self::BookValuePerShare,
        Self::Pbv,
        Self::Solvency,
        Self::Roe,
        Self::FreeCashFlow,
    ];

    /// Short lowercase name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Eps => "eps",
            Self::Per => "per",
            Self::Ebitda => "ebitda",
            Self::BookValuePerShare => "bvps",
            Self::Pbv => "pbv",
            Self::Solvency => "solvency",
            Self::Roe => "roe",
            Self::FreeCashFlow => "fcf",
        }
    }

    /// Returns true if the ratio needs a resolved price.
    #[must_use]
    pub const fn needs_price(&self) -> bool {
        matches!(self, Self::Per | Self::Pbv)
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn item(set: &FinancialStatementSet, item: LineItem, period: NaiveDate) -> Outcome {
    set.value(item, period)
        .ok_or(RatioError::MissingLineItem(item))
}

fn finite(value: f64) -> Outcome {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(RatioError::NonFinite)
    }
}

/// Divides by a line item, failing on a zero divisor.
fn per_item(numerator: f64, divisor: f64, divisor_item: LineItem) -> Outcome {
    if divisor == 0.0 {
        return Err(RatioError::ZeroLineItem(divisor_item));
    }
    finite(numerator / divisor)
}

/// Divides a price by an upstream ratio.
fn price_over(price: Option<f64>, divisor: &Outcome, divisor_ratio: Ratio) -> Outcome {
    let divisor = divisor
        .as_ref()
        .map_err(|_| RatioError::Dependency(divisor_ratio))?;
    let price = price.ok_or(RatioError::MissingPrice)?;
    if *divisor == 0.0 {
        return Err(RatioError::ZeroRatio(divisor_ratio));
    }
    finite(price / divisor)
}

/// Net income attributable to common stockholders over ordinary shares.
pub fn eps(set: &FinancialStatementSet, period: NaiveDate) -> Outcome {
    let income = item(set, LineItem::NetIncomeCommonStockholders, period)?;
    let shares = item(set, LineItem::OrdinarySharesNumber, period)?;
    per_item(income, shares, LineItem::OrdinarySharesNumber)
}

/// Resolved price over EPS.
pub fn per(price: Option<f64>, eps: &Outcome) -> Outcome {
    price_over(price, eps, Ratio::Eps)
}

/// EBITDA as reported.
pub fn ebitda(set: &FinancialStatementSet, period: NaiveDate) -> Outcome {
    item(set, LineItem::Ebitda, period)
}

/// Common stock equity over ordinary shares.
pub fn book_value_per_share(set: &FinancialStatementSet, period: NaiveDate) -> Outcome {
    let equity = item(set, LineItem::CommonStockEquity, period)?;
    let shares = item(set, LineItem::OrdinarySharesNumber, period)?;
    per_item(equity, shares, LineItem::OrdinarySharesNumber)
}

/// Resolved price over book value per share.
pub fn pbv(price: Option<f64>, bvps: &Outcome) -> Outcome {
    price_over(price, bvps, Ratio::BookValuePerShare)
}

/// Total assets over current liabilities.
pub fn solvency(set: &FinancialStatementSet, period: NaiveDate) -> Outcome {
    let assets = item(set, LineItem::TotalAssets, period)?;
    let liabilities = item(set, LineItem::CurrentLiabilities, period)?;
    per_item(assets, liabilities, LineItem::CurrentLiabilities)
}

/// Net income over common stock equity, in percent.
pub fn roe(set: &FinancialStatementSet, period: NaiveDate) -> Outcome {
    let income = item(set, LineItem::NetIncomeCommonStockholders, period)?;
    let equity = item(set, LineItem::CommonStockEquity, period)?;
    per_item(income, equity, LineItem::CommonStockEquity).map(|r| r * 100.0)
}

/// Operating cash flow plus D&A minus (total assets minus current liabilities).
pub fn free_cash_flow(set: &FinancialStatementSet, period: NaiveDate) -> Outcome {
    let cfo = item(set, LineItem::OperatingCashFlow, period)?;
    let non_cash = item(set, LineItem::DepreciationAndAmortization, period)?;
    let assets = item(set, LineItem::TotalAssets, period)?;
    let liabilities = item(set, LineItem::CurrentLiabilities, period)?;
    finite(cfo + non_cash - (assets - liabilities))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use valuation_core::{Cadence, Symbol};

    fn period() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 12, 31).unwrap()
    }

    fn set() -> FinancialStatementSet {
        let p = period();
        FinancialStatementSet::new(Symbol::new("AAA"), Cadence::Annual)
            .with_value(p, LineItem::NetIncomeCommonStockholders, 1_000.0)
            .with_value(p, LineItem::OrdinarySharesNumber, 100.0)
            .with_value(p, LineItem::Ebitda, 1_500.0)
            .with_value(p, LineItem::CommonStockEquity, 5_000.0)
            .with_value(p, LineItem::TotalAssets, 12_000.0)
            .with_value(p, LineItem::CurrentLiabilities, 3_000.0)
            .with_value(p, LineItem::OperatingCashFlow, 1_200.0)
            .with_value(p, LineItem::DepreciationAndAmortization, 300.0)
    }

    #[test]
    fn test_formulas() {
        let s = set();
        let p = period();

        let eps_value = eps(&s, p);
        assert_relative_eq!(eps_value.unwrap(), 10.0);
        assert_relative_eq!(per(Some(150.0), &eps_value).unwrap(), 15.0);
        assert_relative_eq!(ebitda(&s, p).unwrap(), 1_500.0);

        let bvps = book_value_per_share(&s, p);
        assert_relative_eq!(bvps.unwrap(), 50.0);
        assert_relative_eq!(pbv(Some(150.0), &bvps).unwrap(), 3.0);

        assert_relative_eq!(solvency(&s, p).unwrap(), 4.0);
        assert_relative_eq!(roe(&s, p).unwrap(), 20.0);
        // 1200 + 300 - (12000 - 3000)
        assert_relative_eq!(free_cash_flow(&s, p).unwrap(), -7_500.0);
    }

    #[test]
    fn test_missing_line_item() {
        let s = FinancialStatementSet::new(Symbol::new("BBB"), Cadence::Annual)
            .with_value(period(), LineItem::NetIncomeCommonStockholders, 1_000.0);

        assert_eq!(
            eps(&s, period()),
            Err(RatioError::MissingLineItem(LineItem::OrdinarySharesNumber))
        );
        assert_eq!(
            per(Some(10.0), &eps(&s, period())),
            Err(RatioError::Dependency(Ratio::Eps))
        );
    }

    #[test]
    fn test_zero_divisors() {
        let p = period();
        let s = set()
            .with_value(p, LineItem::CurrentLiabilities, 0.0)
            .with_value(p, LineItem::CommonStockEquity, 0.0);

        assert_eq!(
            solvency(&s, p),
            Err(RatioError::ZeroLineItem(LineItem::CurrentLiabilities))
        );
        assert_eq!(
            roe(&s, p),
            Err(RatioError::ZeroLineItem(LineItem::CommonStockEquity))
        );
        // zero book value per share
        assert_eq!(
            pbv(Some(10.0), &book_value_per_share(&s, p)),
            Err(RatioError::ZeroRatio(Ratio::BookValuePerShare))
        );
        // FCF has no divisor and still computes
        assert_relative_eq!(free_cash_flow(&s, p).unwrap(), -10_500.0);
    }

    #[test]
    fn test_missing_price() {
        let s = set();
        assert_eq!(
            per(None, &eps(&s, period())),
            Err(RatioError::MissingPrice)
        );
        assert_eq!(
            pbv(None, &book_value_per_share(&s, period())),
            Err(RatioError::MissingPrice)
        );
    }
}
