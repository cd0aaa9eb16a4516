//! Balance and movement records, and their cleaning.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Contracts analyzed when none are given.
pub const DEFAULT_CONTRACTS: [&str; 3] = ["20486403", "12861603", "AHA84901"];

/// One position value on one day, as exported.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BalanceRow {
    /// Contract identifier.
    pub contract: String,
    /// Snapshot date.
    pub balance_date: NaiveDate,
    /// Market value of the position; `None` if not numeric.
    pub value_pos_mdo: Option<f64>,
}

/// One account movement, as exported.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MovementRow {
    /// Contract identifier.
    pub contract: String,
    /// Free-text description.
    pub description: String,
    /// Amount; `None` if not numeric.
    pub movement_import: Option<f64>,
    /// Operation date.
    pub operation_date: NaiveDate,
}

/// Total portfolio value of a contract on a day.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PortfolioValue {
    /// Contract identifier.
    pub contract: String,
    /// Snapshot date.
    pub date: NaiveDate,
    /// Sum of position values.
    pub value: f64,
}

/// External cash movement direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementKind {
    /// Money paid into the contract.
    Deposit,
    /// Money taken out of the contract.
    Withdrawal,
}

const DEPOSIT_MARKERS: [&str; 4] = ["depósito", "deposito", "aportación", "aportacion"];
const WITHDRAWAL_MARKERS: [&str; 2] = ["retiro", "salida"];

impl MovementKind {
    /// Classifies a movement description, ignoring case.
    ///
    /// Returns `None` for movements that are neither deposits nor withdrawals
    /// (fees, dividends, trades).
    #[must_use]
    pub fn classify(description: &str) -> Option<Self> {
        let description = description.to_lowercase();
        if DEPOSIT_MARKERS.iter().any(|m| description.contains(m)) {
            Some(Self::Deposit)
        } else if WITHDRAWAL_MARKERS.iter().any(|m| description.contains(m)) {
            Some(Self::Withdrawal)
        } else {
            None
        }
    }

    /// Sign of the cash flow from the investor's side.
    #[must_use]
    pub const fn sign(&self) -> f64 {
        match self {
            Self::Deposit => -1.0,
            Self::Withdrawal => 1.0,
        }
    }
}

impl fmt::Display for MovementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deposit => write!(f, "deposit"),
            Self::Withdrawal => write!(f, "withdrawal"),
        }
    }
}

/// A deposit or withdrawal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CashMovement {
    /// Contract identifier.
    pub contract: String,
    /// Original description.
    pub description: String,
    /// Direction.
    pub kind: MovementKind,
    /// Amount as exported; `None` if not numeric.
    pub amount: Option<f64>,
    /// Operation date.
    pub date: NaiveDate,
}

impl CashMovement {
    /// Signed investor cash flow, or `None` without an amount.
    #[must_use]
    pub fn cash_flow(&self) -> Option<f64> {
        self.amount.map(|a| a * self.kind.sign())
    }
}

fn wanted(contracts: &[&str], contract: &str) -> bool {
    contracts.iter().any(|c| *c == contract)
}

/// Sums position values per contract and day.
///
/// Rows are expected to be free of exact duplicates already; see
/// [`read_balances`](crate::load::read_balances). Only `contracts` are kept.
/// Non-numeric values count as zero. The result is sorted by contract, then
/// date.
#[must_use]
pub fn clean_balances(rows: &[BalanceRow], contracts: &[&str]) -> Vec<PortfolioValue> {
    let mut totals: BTreeMap<(&str, NaiveDate), f64> = BTreeMap::new();
    for row in rows.iter().filter(|r| wanted(contracts, &r.contract)) {
        *totals
            .entry((row.contract.as_str(), row.balance_date))
            .or_insert(0.0) += row.value_pos_mdo.unwrap_or(0.0);
    }

    totals
        .into_iter()
        .map(|((contract, date), value)| PortfolioValue {
            contract: contract.to_string(),
            date,
            value,
        })
        .collect()
}

/// Keeps the deposits and withdrawals of `contracts`, in input order.
#[must_use]
pub fn clean_movements(rows: &[MovementRow], contracts: &[&str]) -> Vec<CashMovement> {
    rows.iter()
        .filter(|r| wanted(contracts, &r.contract))
        .filter_map(|r| {
            MovementKind::classify(&r.description).map(|kind| CashMovement {
                contract: r.contract.clone(),
                description: r.description.clone(),
                kind,
                amount: r.movement_import,
                date: r.operation_date,
            })
        })
        .collect()
}
