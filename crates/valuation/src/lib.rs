#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/valuation/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Fundamental valuation toolkit.
//!
//! This crate re-exports the core types, the ratio engine, the dataset
//! generator and the MWRR calculator, and provides a [`ProviderRegistry`]
//! for combining providers with fallback.
//!
//! # Features
//!
//! - `yahoo` - Yahoo Finance statement and price provider (default)
//!
//! # Example
//!
//! ```rust,ignore
//! use valuation::{CsvSink, DatasetGenerator, GeneratorConfig, OutputPaths, ProviderRegistry, Symbol};
//!
//! #[tokio::main]
//! async fn main() -> valuation::Result<()> {
//!     let analyzer = ProviderRegistry::new().with_yahoo()?.into_analyzer();
//!     let sink = CsvSink::new(OutputPaths::in_dir("output"));
//!     let mut generator = DatasetGenerator::new(analyzer, sink, GeneratorConfig::default())?;
//!
//!     let run = generator.run(&[Symbol::new("AAPL"), Symbol::new("MSFT")]).await?;
//!     println!("{} records, {} incomplete", run.records.len(), run.incomplete.len());
//!     Ok(())
//! }
//! ```

// Core types and traits
pub use valuation_core::*;

// Engines
pub use valuation_dataset::{
    CsvSink, DEFAULT_FLUSH_EVERY, DEFAULT_TICKER_COLUMN, DatasetGenerator, DatasetRun,
    DatasetSink, Flush, GeneratorConfig, MemorySink, OutputPaths, TickerAnalysis, TickerAnalyzer,
    read_tickers,
};
pub use valuation_ratios::{Outcome, PeriodRatios, Ratio, RatioEngine, RatioError, RatioTable};

/// Money-weighted return calculation.
pub use valuation_mwrr as mwrr;

// Providers
#[cfg(feature = "yahoo")]
pub use valuation_yahoo::YahooProvider;

mod registry;
pub use registry::ProviderRegistry;
