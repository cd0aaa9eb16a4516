//! Per-ticker analysis.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use tracing::{debug, instrument, warn};
use valuation_core::{
    Cadence, PriceProvider, RatioRecord, Result, StatementKind, StatementProvider, Symbol,
};
use valuation_ratios::{Ratio, RatioEngine, RatioTable};

/// Result of analyzing one ticker.
#[derive(Clone, Debug, PartialEq)]
pub struct TickerAnalysis {
    /// The ticker analyzed.
    pub symbol: Symbol,
    /// One record per retained period, most recent first.
    pub records: Vec<RatioRecord>,
    /// True if some ratio could not be computed for any period, or there was
    /// no data.
    pub incomplete: bool,
    /// Ratios that failed in at least one period.
    pub failed_ratios: BTreeSet<Ratio>,
    /// Ratios that failed in every retained period.
    pub unavailable_ratios: BTreeSet<Ratio>,
    /// The statement that was empty, if the ticker was rejected for it.
    pub empty_statement: Option<StatementKind>,
}

impl TickerAnalysis {
    /// An incomplete analysis without records.
    #[must_use]
    pub const fn without_data(symbol: Symbol, empty_statement: Option<StatementKind>) -> Self {
        Self {
            symbol,
            records: Vec::new(),
            incomplete: true,
            failed_ratios: BTreeSet::new(),
            unavailable_ratios: BTreeSet::new(),
            empty_statement,
        }
    }
}

/// Fetches statements and prices for a ticker and turns them into records.
#[derive(Clone)]
pub struct TickerAnalyzer {
    statements: Arc<dyn StatementProvider>,
    prices: Arc<dyn PriceProvider>,
    engine: RatioEngine,
}

impl fmt::Debug for TickerAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TickerAnalyzer")
            .field("statements", &self.statements.name())
            .field("prices", &self.prices.name())
            .finish()
    }
}

impl TickerAnalyzer {
    /// Create an analyzer from a statement provider and a price provider.
    #[must_use]
    pub fn new(statements: Arc<dyn StatementProvider>, prices: Arc<dyn PriceProvider>) -> Self {
        Self {
            statements,
            prices,
            engine: RatioEngine::new(),
        }
    }

    /// Analyzes one ticker.
    ///
    /// Unknown tickers and tickers with an empty statement produce an
    /// incomplete analysis with no records. Other provider errors are returned.
    ///
    /// The ticker is incomplete when some ratio is unavailable in every
    /// retained period. Gaps limited to some periods only leave the affected
    /// cells empty.
    #[instrument(skip(self), fields(symbol = %symbol, cadence = %cadence))]
    pub async fn analyze(&self, symbol: &Symbol, cadence: Cadence) -> Result<TickerAnalysis> {
        let set = match self.statements.fetch_statements(symbol, cadence).await {
            Ok(set) => set,
            Err(e) if e.is_missing_data() => {
                warn!(error = %e, "Incomplete data, ticker won't be analyzed");
                return Ok(TickerAnalysis::without_data(symbol.clone(), None));
            }
            Err(e) => return Err(e),
        };

        if let Some(kind) = set.empty_statement() {
            warn!(statement = %kind, "Incomplete data, ticker won't be analyzed");
            return Ok(TickerAnalysis::without_data(symbol.clone(), Some(kind)));
        }

        let periods = self.engine.populated_periods(&set);
        let mut prices = BTreeMap::new();
        for date in &periods {
            match self.prices.resolve_close(symbol, *date).await {
                Ok(close) => {
                    prices.insert(*date, close);
                }
                Err(e) => warn!(date = %date, error = %e, "Price unavailable"),
            }
        }

        let table = self.engine.compute_for(&set, &periods, &prices);
        for period in &table.periods {
            for (ratio, reason) in period.failures() {
                debug!(date = %period.period_end, ratio = %ratio, reason = %reason, "Ratio unavailable");
            }
        }
        let unavailable_ratios = table.unavailable_ratios();
        if !unavailable_ratios.is_empty() {
            warn!(ratios = ?unavailable_ratios, "Some ratios could not be computed");
        }

        let incomplete = !table.is_complete();
        Ok(TickerAnalysis {
            symbol: symbol.clone(),
            records: to_records(symbol, &table, incomplete),
            incomplete,
            failed_ratios: table.failed_ratios(),
            unavailable_ratios,
            empty_statement: None,
        })
    }
}

/// Turns a table into records, adding the period-over-period price return.
fn to_records(symbol: &Symbol, table: &RatioTable, incomplete: bool) -> Vec<RatioRecord> {
    table
        .periods
        .iter()
        .enumerate()
        .map(|(idx, period)| {
            // Rows are most recent first, so the previous period is the next row
            let previous = table.periods.get(idx + 1).and_then(|p| p.price);
            let mut record = RatioRecord::new(symbol.clone(), period.period_end);
            record.eps = period.value(Ratio::Eps);
            record.per = period.value(Ratio::Per);
            record.ebitda = period.value(Ratio::Ebitda);
            record.pbv = period.value(Ratio::Pbv);
            record.solvency = period.value(Ratio::Solvency);
            record.roe = period.value(Ratio::Roe);
            record.fcf = period.value(Ratio::FreeCashFlow);
            record.prices = period.price;
            record.shares = period.shares;
            record.returns = pct_change(period.price, previous);
            record.incomplete = incomplete;
            record
        })
        .collect()
}

fn pct_change(current: Option<f64>, previous: Option<f64>) -> Option<f64> {
    match (current, previous) {
        (Some(c), Some(p)) if p != 0.0 => Some(c / p - 1.0),
        _ => None,
    }
}
