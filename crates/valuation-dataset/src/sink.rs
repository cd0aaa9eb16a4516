//! Output sinks for generated records.

use polars::prelude::*;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;
use valuation_core::{DataError, RatioRecord, Result, Symbol};

/// Destination for batches of records and incomplete tickers.
///
/// [`DatasetSink::reset`] is called once before the first batch. Each
/// [`DatasetSink::flush`] appends; it never rewrites earlier batches.
pub trait DatasetSink: Send + std::fmt::Debug {
    /// Clears previous output and prepares for a fresh run.
    fn reset(&mut self) -> Result<()>;

    /// Appends a batch of records and the incomplete tickers of that batch.
    fn flush(&mut self, records: &[RatioRecord], incomplete: &[Symbol]) -> Result<()>;
}

/// One flushed batch as seen by [`MemorySink`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Flush {
    /// Records of the batch.
    pub records: Vec<RatioRecord>,
    /// Incomplete tickers of the batch.
    pub incomplete: Vec<Symbol>,
}

/// Sink keeping every batch in memory.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    /// Batches flushed since the last reset.
    pub flushes: Vec<Flush>,
    /// Number of resets.
    pub resets: usize,
}

impl MemorySink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All records flushed since the last reset.
    pub fn records(&self) -> impl Iterator<Item = &RatioRecord> {
        self.flushes.iter().flat_map(|f| f.records.iter())
    }

    /// All incomplete tickers flushed since the last reset.
    pub fn incomplete(&self) -> impl Iterator<Item = &Symbol> {
        self.flushes.iter().flat_map(|f| f.incomplete.iter())
    }
}

impl DatasetSink for MemorySink {
    fn reset(&mut self) -> Result<()> {
        self.flushes.clear();
        self.resets += 1;
        Ok(())
    }

    fn flush(&mut self, records: &[RatioRecord], incomplete: &[Symbol]) -> Result<()> {
        self.flushes.push(Flush {
            records: records.to_vec(),
            incomplete: incomplete.to_vec(),
        });
        Ok(())
    }
}

/// Paths of the two output files.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputPaths {
    /// Records table.
    pub results: PathBuf,
    /// Incomplete ticker log.
    pub incomplete: PathBuf,
}

impl OutputPaths {
    /// Default results file name.
    pub const RESULTS_FILE: &'static str = "results.csv";
    /// Default incomplete log file name.
    pub const INCOMPLETE_FILE: &'static str = "incomplete.csv";

    /// Both files under `dir` with their default names.
    #[must_use]
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            results: dir.join(Self::RESULTS_FILE),
            incomplete: dir.join(Self::INCOMPLETE_FILE),
        }
    }
}

/// CSV sink writing through polars.
///
/// Headers are written once on reset; flushes append headerless rows.
#[derive(Clone, Debug)]
pub struct CsvSink {
    paths: OutputPaths,
}

impl CsvSink {
    /// Create a sink writing to `paths`.
    #[must_use]
    pub const fn new(paths: OutputPaths) -> Self {
        Self { paths }
    }

    /// Output paths.
    #[must_use]
    pub const fn paths(&self) -> &OutputPaths {
        &self.paths
    }

    fn truncate_with_header(path: &Path, header: &str) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut file = File::create(path)?;
        writeln!(file, "{header}")?;
        Ok(())
    }

    fn append(path: &Path, df: &mut DataFrame) -> Result<()> {
        let mut file = OpenOptions::new().append(true).create(true).open(path)?;
        CsvWriter::new(&mut file)
            .include_header(false)
            .finish(df)
            .map_err(|e| DataError::Storage(e.to_string()))
    }
}

impl DatasetSink for CsvSink {
    fn reset(&mut self) -> Result<()> {
        Self::truncate_with_header(&self.paths.results, &RatioRecord::COLUMNS.join(","))?;
        Self::truncate_with_header(&self.paths.incomplete, "ticker")?;
        debug!(results = %self.paths.results.display(), "Output files reset");
        Ok(())
    }

    fn flush(&mut self, records: &[RatioRecord], incomplete: &[Symbol]) -> Result<()> {
        if !records.is_empty() {
            let mut df = records_frame(records)?;
            Self::append(&self.paths.results, &mut df)?;
        }
        if !incomplete.is_empty() {
            let tickers: Vec<&str> = incomplete.iter().map(Symbol::as_str).collect();
            let mut df = DataFrame::new(vec![Column::new("ticker".into(), tickers)])
                .map_err(|e| DataError::Storage(e.to_string()))?;
            Self::append(&self.paths.incomplete, &mut df)?;
        }
        debug!(
            records = records.len(),
            incomplete = incomplete.len(),
            "Batch flushed"
        );
        Ok(())
    }
}

/// Builds a DataFrame with one row per record, columns in
/// [`RatioRecord::COLUMNS`] order.
pub fn records_frame(records: &[RatioRecord]) -> Result<DataFrame> {
    let column = |name: &str, f: fn(&RatioRecord) -> Option<f64>| {
        Column::new(name.into(), records.iter().map(f).collect::<Vec<_>>())
    };

    let tickers: Vec<&str> = records.iter().map(|r| r.ticker.as_str()).collect();
    let dates: Vec<String> = records
        .iter()
        .map(|r| r.date.format("%Y-%m-%d").to_string())
        .collect();
    let incomplete: Vec<bool> = records.iter().map(|r| r.incomplete).collect();

    DataFrame::new(vec![
        Column::new("ticker".into(), tickers),
        Column::new("date".into(), dates),
        column("eps", |r| r.eps),
        column("per", |r| r.per),
        column("ebitda", |r| r.ebitda),
        column("pbv", |r| r.pbv),
        column("solvency", |r| r.solvency),
        column("roe", |r| r.roe),
        column("fcf", |r| r.fcf),
        column("prices", |r| r.prices),
        column("shares", |r| r.shares),
        column("returns", |r| r.returns),
        Column::new("incomplete".into(), incomplete),
    ])
    .map_err(|e| DataError::Storage(e.to_string()))
}
