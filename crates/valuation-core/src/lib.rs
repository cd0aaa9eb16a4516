#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/valuation/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core traits and types for fundamental valuation pipelines.
//!
//! This crate provides the foundational abstractions shared by the engine,
//! the providers and the dataset generator:
//!
//! - [`StatementProvider`](provider::StatementProvider) - Financial statements per ticker
//! - [`PriceProvider`](provider::PriceProvider) - Closing price on or near a date
//! - [`FinancialStatementSet`](types::FinancialStatementSet) - Typed statements with optional lookups
//! - [`RatioRecord`](types::RatioRecord) - One output row per ticker and period
//! - [`InMemoryProvider`](memory::InMemoryProvider) - Fixture provider for tests and offline runs

/// Reporting cadence definitions.
pub mod cadence;
/// Error types for data operations.
pub mod error;
/// In-memory statement and price provider.
pub mod memory;
/// Trading-day price lookup helpers.
pub mod price;
/// Provider traits for fetching statements and prices.
pub mod provider;
/// Core data types (Symbol, statements, line items, records).
pub mod types;

// Re-export commonly used items at crate root
pub use cadence::Cadence;
pub use error::{DataError, Result};
pub use memory::InMemoryProvider;
pub use price::{DailyClose, PRICE_WINDOW_DAYS, first_close_on_or_after};
pub use provider::{DataProvider, PriceProvider, StatementProvider};
pub use types::{
    FinancialStatementSet, LineItem, RatioRecord, Statement, StatementKind, StatementPeriod,
    Symbol,
};
