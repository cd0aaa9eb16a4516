//! Batch dataset generation over a ticker list.

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};
use valuation_core::{Cadence, DataError, RatioRecord, Result, Symbol};

use crate::{analyzer::TickerAnalyzer, sink::DatasetSink};

/// Tickers processed between two flushes unless configured otherwise.
pub const DEFAULT_FLUSH_EVERY: usize = 20;

/// Generator configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Statement cadence to analyze.
    pub cadence: Cadence,
    /// Flush after this many processed tickers. Must be positive.
    pub flush_every: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            cadence: Cadence::Annual,
            flush_every: DEFAULT_FLUSH_EVERY,
        }
    }
}

impl GeneratorConfig {
    /// Sets the cadence.
    #[must_use]
    pub const fn with_cadence(mut self, cadence: Cadence) -> Self {
        self.cadence = cadence;
        self
    }

    /// Sets the flush interval.
    #[must_use]
    pub const fn with_flush_every(mut self, flush_every: usize) -> Self {
        self.flush_every = flush_every;
        self
    }

    /// Checks the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.flush_every == 0 {
            return Err(DataError::InvalidParameter(
                "flush_every must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Summary of a generator run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DatasetRun {
    /// Every record produced, in output order.
    pub records: Vec<RatioRecord>,
    /// Tickers logged as incomplete, in processing order.
    pub incomplete: Vec<Symbol>,
    /// Tickers dropped because of provider errors.
    pub skipped: Vec<Symbol>,
    /// Number of flushes performed.
    pub flushes: usize,
}

/// Runs the analyzer over a ticker list and flushes to a sink in batches.
#[derive(Debug)]
pub struct DatasetGenerator<K> {
    analyzer: TickerAnalyzer,
    sink: K,
    config: GeneratorConfig,
}

impl<K: DatasetSink> DatasetGenerator<K> {
    /// Create a generator.
    pub fn new(analyzer: TickerAnalyzer, sink: K, config: GeneratorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            analyzer,
            sink,
            config,
        })
    }

    /// The sink.
    #[must_use]
    pub const fn sink(&self) -> &K {
        &self.sink
    }

    /// Processes `tickers` in order.
    ///
    /// The sink is reset first. After every `flush_every` processed tickers,
    /// and after the last one, the pending records and incomplete tickers are
    /// flushed and cleared. A ticker whose provider fails is logged and
    /// skipped; the run continues. Only sink errors abort the run.
    #[instrument(skip(self, tickers), fields(tickers = tickers.len(), cadence = %self.config.cadence))]
    pub async fn run(&mut self, tickers: &[Symbol]) -> Result<DatasetRun> {
        let flush_every = self.config.flush_every;
        let total = tickers.len();

        self.sink.reset()?;

        let mut run = DatasetRun::default();
        let mut batch: Vec<RatioRecord> = Vec::new();
        let mut pending: Vec<Symbol> = Vec::new();

        for (idx, symbol) in tickers.iter().enumerate() {
            info!(symbol = %symbol, "Processing ticker {}/{}", idx + 1, total);

            match self.analyzer.analyze(symbol, self.config.cadence).await {
                Ok(analysis) => {
                    if analysis.incomplete {
                        pending.push(symbol.clone());
                        run.incomplete.push(symbol.clone());
                    }
                    run.records.extend_from_slice(&analysis.records);
                    batch.extend(analysis.records);
                }
                Err(e) => {
                    error!(symbol = %symbol, error = %e, "Skipping ticker");
                    run.skipped.push(symbol.clone());
                }
            }

            let processed = idx + 1;
            if processed % flush_every == 0 || processed == total {
                self.sink.flush(&batch, &pending)?;
                debug!(
                    processed,
                    records = batch.len(),
                    incomplete = pending.len(),
                    "Flushed batch"
                );
                batch.clear();
                pending.clear();
                run.flushes += 1;
            }
        }

        info!(
            records = run.records.len(),
            incomplete = run.incomplete.len(),
            skipped = run.skipped.len(),
            "Dataset generated"
        );
        Ok(run)
    }
}
