#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/valuation/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Dataset generation.
//!
//! - [`TickerAnalyzer`] - Statements and prices to records for one ticker
//! - [`DatasetGenerator`] - Ticker list to batched output
//! - [`CsvSink`] / [`MemorySink`] - Output destinations
//! - [`read_tickers`] - Ticker list from CSV

/// Per-ticker analysis.
pub mod analyzer;
/// Batch generation over a ticker list.
pub mod generator;
/// Ticker list input.
pub mod input;
/// Output sinks.
pub mod sink;

#[cfg(test)]
mod fixtures;

pub use analyzer::{TickerAnalysis, TickerAnalyzer};
pub use generator::{DEFAULT_FLUSH_EVERY, DatasetGenerator, DatasetRun, GeneratorConfig};
pub use input::{DEFAULT_TICKER_COLUMN, read_tickers, tickers_from_frame};
pub use sink::{CsvSink, DatasetSink, Flush, MemorySink, OutputPaths, records_frame};
