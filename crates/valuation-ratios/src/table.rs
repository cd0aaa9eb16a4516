//! Per-period ratio table.

use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use valuation_core::{FinancialStatementSet, LineItem};

use crate::{
    error::{Outcome, RatioError},
    ratio::{self, Ratio},
};

/// Every ratio for one fiscal period.
#[derive(Clone, Debug, PartialEq)]
pub struct PeriodRatios {
    /// Fiscal period end.
    pub period_end: NaiveDate,
    /// Resolved closing price, if any.
    pub price: Option<f64>,
    /// Ordinary shares outstanding, if reported.
    pub shares: Option<f64>,
    /// Earnings per share.
    pub eps: Outcome,
    /// Price to earnings.
    pub per: Outcome,
    /// EBITDA.
    pub ebitda: Outcome,
    /// Book value per share.
    pub bvps: Outcome,
    /// Price to book value.
    pub pbv: Outcome,
    /// Solvency.
    pub solvency: Outcome,
    /// Return on equity.
    pub roe: Outcome,
    /// Free cash flow.
    pub fcf: Outcome,
}

impl PeriodRatios {
    /// Computes every ratio for `period_end`, each independently.
    #[must_use]
    pub fn compute(set: &FinancialStatementSet, period_end: NaiveDate, price: Option<f64>) -> Self {
        let eps = ratio::eps(set, period_end);
        let bvps = ratio::book_value_per_share(set, period_end);

        Self {
            period_end,
            price,
            shares: set.value(LineItem::OrdinarySharesNumber, period_end),
            per: ratio::per(price, &eps),
            pbv: ratio::pbv(price, &bvps),
            ebitda: ratio::ebitda(set, period_end),
            solvency: ratio::solvency(set, period_end),
            roe: ratio::roe(set, period_end),
            fcf: ratio::free_cash_flow(set, period_end),
            eps,
            bvps,
        }
    }

    /// Returns the outcome for a ratio.
    #[must_use]
    pub const fn get(&self, ratio: Ratio) -> &Outcome {
        match ratio {
            Ratio::Eps => &self.eps,
            Ratio::Per => &self.per,
            Ratio::Ebitda => &self.ebitda,
            Ratio::BookValuePerShare => &self.bvps,
            Ratio::Pbv => &self.pbv,
            Ratio::Solvency => &self.solvency,
            Ratio::Roe => &self.roe,
            Ratio::FreeCashFlow => &self.fcf,
        }
    }

    /// Returns the value of a ratio, or `None` if unavailable.
    #[must_use]
    pub fn value(&self, ratio: Ratio) -> Option<f64> {
        self.get(ratio).as_ref().ok().copied()
    }

    /// Ratios that could not be computed, with the reason.
    pub fn failures(&self) -> impl Iterator<Item = (Ratio, RatioError)> + '_ {
        Ratio::ALL
            .into_iter()
            .filter_map(|r| self.get(r).as_ref().err().map(|e| (r, *e)))
    }

    /// True if no value derived purely from the statements is available.
    ///
    /// Price-dependent ratios are ignored, so a period that only has a price
    /// counts as empty.
    #[must_use]
    pub fn is_statement_empty(&self) -> bool {
        self.shares.is_none()
            && Ratio::ALL
                .iter()
                .filter(|r| !r.needs_price())
                .all(|r| self.get(*r).is_err())
    }
}

/// Ratios for every period of a ticker, most recent first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RatioTable {
    /// Rows in canonical order.
    pub periods: Vec<PeriodRatios>,
}

impl RatioTable {
    /// Number of periods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.periods.len()
    }

    /// True if the table has no periods.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// Ratios that failed in at least one period.
    #[must_use]
    pub fn failed_ratios(&self) -> BTreeSet<Ratio> {
        self.periods
            .iter()
            .flat_map(|p| p.failures().map(|(r, _)| r))
            .collect()
    }

    /// Ratios that failed in every period, i.e. could not be built at all.
    ///
    /// Empty for an empty table.
    #[must_use]
    pub fn unavailable_ratios(&self) -> BTreeSet<Ratio> {
        if self.periods.is_empty() {
            return BTreeSet::new();
        }
        Ratio::ALL
            .into_iter()
            .filter(|r| self.periods.iter().all(|p| p.get(*r).is_err()))
            .collect()
    }

    /// True if the table has rows and every ratio is available in at least
    /// one of them.
    ///
    /// A gap in a single period, such as a sparse oldest fiscal year, does
    /// not make the table incomplete.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.periods.is_empty() && self.unavailable_ratios().is_empty()
    }
}

/// Computes ratio tables from statement sets.
#[derive(Clone, Copy, Debug, Default)]
pub struct RatioEngine;

impl RatioEngine {
    /// Create a new engine.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Computes the table over the canonical period index of `set`.
    ///
    /// `prices` is keyed by period end; missing entries leave PER and PBV
    /// unavailable for that period.
    #[must_use]
    pub fn compute(
        &self,
        set: &FinancialStatementSet,
        prices: &BTreeMap<NaiveDate, f64>,
    ) -> RatioTable {
        self.compute_for(set, &set.period_ends(), prices)
    }

    /// Computes the table for the given periods, in the order given.
    #[must_use]
    pub fn compute_for(
        &self,
        set: &FinancialStatementSet,
        periods: &[NaiveDate],
        prices: &BTreeMap<NaiveDate, f64>,
    ) -> RatioTable {
        RatioTable {
            periods: periods
                .iter()
                .map(|date| PeriodRatios::compute(set, *date, prices.get(date).copied()))
                .collect(),
        }
    }

    /// Canonical periods that carry at least one statement-derived value.
    #[must_use]
    pub fn populated_periods(&self, set: &FinancialStatementSet) -> Vec<NaiveDate> {
        set.period_ends()
            .into_iter()
            .filter(|date| !PeriodRatios::compute(set, *date, None).is_statement_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use valuation_core::{Cadence, Symbol};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
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

    /// Builds a set whose net income is scaled by year so periods differ.
    fn statements(years: &[i32]) -> FinancialStatementSet {
        let mut set = FinancialStatementSet::new(Symbol::new("AAA"), Cadence::Annual);
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

    fn prices() -> BTreeMap<NaiveDate, f64> {
        BTreeMap::from([
            (date(2021, 12, 31), 100.0),
            (date(2022, 12, 31), 120.0),
            (date(2023, 12, 31), 150.0),
        ])
    }

    #[test]
    fn test_complete_table() {
        let table = RatioEngine::new().compute(&statements(&[2021, 2022, 2023]), &prices());

        assert_eq!(table.len(), 3);
        assert!(table.is_complete());
        assert!(table.failed_ratios().is_empty());

        let latest = &table.periods[0];
        assert_eq!(latest.period_end, date(2023, 12, 31));
        assert_relative_eq!(latest.value(Ratio::Eps).unwrap(), 30.0);
        assert_relative_eq!(latest.value(Ratio::Per).unwrap(), 5.0);
        assert_relative_eq!(latest.value(Ratio::Roe).unwrap(), 60.0);
    }

    #[test]
    fn test_ordering_does_not_change_alignment() {
        let ascending = statements(&[2021, 2022, 2023]);
        let descending = statements(&[2023, 2022, 2021]);
        assert_ne!(
            ascending.income_statement.periods[0].period_end,
            descending.income_statement.periods[0].period_end
        );

        let engine = RatioEngine::new();
        assert_eq!(
            engine.compute(&ascending, &prices()),
            engine.compute(&descending, &prices())
        );

        // EPS of 2021 is 10 and its price is 100
        let table = engine.compute(&ascending, &prices());
        assert_relative_eq!(table.periods[2].value(Ratio::Per).unwrap(), 10.0);
    }

    #[test]
    fn test_missing_shares_only_hits_dependents() {
        let mut set = statements(&[2023]);
        set.balance_sheet.periods[0]
            .items
            .remove(&LineItem::OrdinarySharesNumber);

        let table = RatioEngine::new().compute(&set, &prices());
        let expected = BTreeSet::from([
            Ratio::Eps,
            Ratio::Per,
            Ratio::BookValuePerShare,
            Ratio::Pbv,
        ]);
        assert_eq!(table.failed_ratios(), expected);
        assert!(!table.is_complete());

        let row = &table.periods[0];
        assert!(row.value(Ratio::Ebitda).is_some());
        assert!(row.value(Ratio::Solvency).is_some());
        assert!(row.value(Ratio::Roe).is_some());
        assert!(row.value(Ratio::FreeCashFlow).is_some());
        assert_eq!(row.shares, None);
    }

    fn dependents(item: LineItem) -> BTreeSet<Ratio> {
        let ratios: &[Ratio] = match item {
            LineItem::NetIncomeCommonStockholders => &[Ratio::Eps, Ratio::Per, Ratio::Roe],
            LineItem::OrdinarySharesNumber => &[
                Ratio::Eps,
                Ratio::Per,
                Ratio::BookValuePerShare,
                Ratio::Pbv,
            ],
            LineItem::Ebitda => &[Ratio::Ebitda],
            LineItem::CommonStockEquity => &[Ratio::BookValuePerShare, Ratio::Pbv, Ratio::Roe],
            LineItem::TotalAssets | LineItem::CurrentLiabilities => {
                &[Ratio::Solvency, Ratio::FreeCashFlow]
            }
            LineItem::OperatingCashFlow | LineItem::DepreciationAndAmortization => {
                &[Ratio::FreeCashFlow]
            }
        };
        ratios.iter().copied().collect()
    }

    #[test]
    fn test_each_missing_item_hits_exactly_its_dependents() {
        let engine = RatioEngine::new();
        for item in LineItem::ALL {
            let mut set = statements(&[2022, 2023]);
            for period in &mut set.statement_mut(item.statement()).periods {
                period.items.remove(&item);
            }

            let table = engine.compute(&set, &prices());
            assert_eq!(table.failed_ratios(), dependents(item), "{item:?}");
            assert_eq!(table.unavailable_ratios(), dependents(item), "{item:?}");
            assert!(!table.is_complete(), "{item:?}");
            for row in &table.periods {
                for ratio in Ratio::ALL {
                    assert_eq!(
                        row.value(ratio).is_some(),
                        !dependents(item).contains(&ratio),
                        "{item:?} {ratio:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_sparse_oldest_period_keeps_table_complete() {
        let set = statements(&[2021, 2022, 2023])
            .with_value(date(2020, 12, 31), LineItem::TotalAssets, 11_000.0)
            .with_value(date(2020, 12, 31), LineItem::CurrentLiabilities, 2_750.0);
        let engine = RatioEngine::new();

        let periods = engine.populated_periods(&set);
        assert_eq!(periods.len(), 4);

        let table = engine.compute_for(&set, &periods, &prices());
        assert!(table.failed_ratios().contains(&Ratio::Eps));
        assert!(table.unavailable_ratios().is_empty());
        assert!(table.is_complete());
        assert_relative_eq!(table.periods[3].value(Ratio::Solvency).unwrap(), 4.0);
    }

    #[test]
    fn test_ratio_missing_in_every_period_is_unavailable() {
        let mut set = statements(&[2022, 2023]);
        for period in &mut set.cash_flow.periods {
            period.items.remove(&LineItem::OperatingCashFlow);
        }
        // Restore it for one period only
        set.insert(date(2023, 12, 31), LineItem::OperatingCashFlow, 1_200.0);

        let table = RatioEngine::new().compute(&set, &prices());
        assert_eq!(table.failed_ratios(), BTreeSet::from([Ratio::FreeCashFlow]));
        assert!(table.unavailable_ratios().is_empty());
        assert!(table.is_complete());

        let table = RatioEngine::new().compute(&statements(&[2022, 2023]), &BTreeMap::new());
        assert_eq!(
            table.unavailable_ratios(),
            BTreeSet::from([Ratio::Per, Ratio::Pbv])
        );
        assert!(!table.is_complete());
    }

    #[test]
    fn test_populated_periods_skip_price_only_rows() {
        let set = statements(&[2022, 2023]).with_value(
            date(2021, 12, 31),
            LineItem::OperatingCashFlow,
            900.0,
        );
        let engine = RatioEngine::new();

        assert_eq!(set.period_ends().len(), 3);
        // 2021 has an operating cash flow but nothing computable from it
        assert_eq!(
            engine.populated_periods(&set),
            vec![date(2023, 12, 31), date(2022, 12, 31)]
        );
    }

    #[test]
    fn test_empty_table_is_not_complete() {
        assert!(!RatioTable::default().is_complete());
    }
}
