#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/valuation/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Ratio engine for fundamental analysis.
//!
//! | Ratio | Formula |
//! |---|---|
//! | EPS | net income common stockholders / ordinary shares |
//! | PER | price / EPS |
//! | EBITDA | reported line item |
//! | BVPS | common stock equity / ordinary shares |
//! | PBV | price / BVPS |
//! | Solvency | total assets / current liabilities |
//! | ROE | net income / common stock equity x 100 |
//! | FCF | operating cash flow + D&A - (total assets - current liabilities) |
//!
//! # Example
//!
//! ```
//! use std::collections::BTreeMap;
//! use chrono::NaiveDate;
//! use valuation_core::{Cadence, FinancialStatementSet, LineItem, Symbol};
//! use valuation_ratios::{Ratio, RatioEngine};
//!
//! let period = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
//! let set = FinancialStatementSet::new(Symbol::new("AAA"), Cadence::Annual)
//!     .with_value(period, LineItem::NetIncomeCommonStockholders, 500.0)
//!     .with_value(period, LineItem::OrdinarySharesNumber, 100.0);
//! let prices = BTreeMap::from([(period, 40.0)]);
//!
//! let table = RatioEngine::new().compute(&set, &prices);
//! assert_eq!(table.periods[0].value(Ratio::Eps), Some(5.0));
//! assert_eq!(table.periods[0].value(Ratio::Per), Some(8.0));
//! assert!(table.failed_ratios().contains(&Ratio::Ebitda));
//! ```

/// Reasons a ratio is unavailable.
pub mod error;
/// Per-period ratio functions.
pub mod ratio;
/// Ratio tables over the canonical period index.
pub mod table;

pub use error::{Outcome, RatioError};
pub use ratio::Ratio;
pub use table::{PeriodRatios, RatioEngine, RatioTable};
