#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/valuation/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use valuation_mwrr::{
//!     BalanceRow, DEFAULT_CONTRACTS, MovementRow, clean_balances, clean_movements, mwrr,
//! };
//!
//! let start = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
//! let end = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
//!
//! let balances = clean_balances(
//!     &[BalanceRow {
//!         contract: "AHA84901".to_string(),
//!         balance_date: end,
//!         value_pos_mdo: Some(1_100.0),
//!     }],
//!     &DEFAULT_CONTRACTS,
//! );
//! let movements = clean_movements(
//!     &[MovementRow {
//!         contract: "AHA84901".to_string(),
//!         description: "Depósito inicial".to_string(),
//!         movement_import: Some(1_000.0),
//!         operation_date: start,
//!     }],
//!     &DEFAULT_CONTRACTS,
//! );
//!
//! let rate = mwrr(&balances, &movements, "AHA84901").unwrap();
//! assert!((rate - 10.0).abs() < 1e-6);
//! ```

/// Error types.
pub mod error;
/// CSV and DataFrame loaders.
pub mod load;
/// Money-weighted return per contract.
pub mod mwrr;
/// Balance and movement records.
pub mod records;
/// Internal rate of return for irregular cash flows.
pub mod xirr;

pub use error::{MwrrError, Result};
pub use load::{
    balances_from_frame, movements_from_frame, parse_date, read_balances, read_movements,
};
pub use mwrr::{ContractReturn, cash_flows, evaluate, mwrr};
pub use records::{
    BalanceRow, CashMovement, DEFAULT_CONTRACTS, MovementKind, MovementRow, PortfolioValue,
    clean_balances, clean_movements,
};
pub use xirr::{CashFlow, xirr};
