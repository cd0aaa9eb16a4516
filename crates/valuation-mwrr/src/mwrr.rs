//! Money-weighted return per contract.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::{
    error::{MwrrError, Result},
    records::{CashMovement, PortfolioValue},
    xirr::{CashFlow, xirr},
};

/// Builds the investor cash-flow schedule of a contract.
///
/// Deposits are negative and withdrawals positive, sorted by date; movements
/// without an amount are ignored. The latest portfolio value is appended as
/// a final positive flow.
pub fn cash_flows(
    balances: &[PortfolioValue],
    movements: &[CashMovement],
    contract: &str,
) -> Result<Vec<CashFlow>> {
    let last = balances
        .iter()
        .filter(|b| b.contract == contract)
        .max_by_key(|b| b.date)
        .ok_or_else(|| MwrrError::NoBalance(contract.to_string()))?;

    let mut flows: Vec<CashFlow> = movements
        .iter()
        .filter(|m| m.contract == contract)
        .filter_map(|m| m.cash_flow().map(|amount| CashFlow::new(m.date, amount)))
        .collect();
    flows.sort_by_key(|f| f.date);
    flows.push(CashFlow::new(last.date, last.value));

    Ok(flows)
}

/// Money-weighted rate of return of a contract, in percent.
#[instrument(skip(balances, movements))]
pub fn mwrr(balances: &[PortfolioValue], movements: &[CashMovement], contract: &str) -> Result<f64> {
    let flows = cash_flows(balances, movements, contract)?;
    debug!(flows = flows.len(), "Cash-flow schedule built");
    Ok(xirr(&flows)? * 100.0)
}

/// Return of one contract, or why it could not be computed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContractReturn {
    /// Contract identifier.
    pub contract: String,
    /// MWRR in percent, if computable.
    pub mwrr: Option<f64>,
    /// Failure reason, if not.
    pub error: Option<String>,
}

/// Computes the MWRR of every contract, in order.
///
/// A failing contract is logged and reported; it does not stop the others.
pub fn evaluate(
    balances: &[PortfolioValue],
    movements: &[CashMovement],
    contracts: &[&str],
) -> Vec<ContractReturn> {
    contracts
        .iter()
        .map(|contract| match mwrr(balances, movements, contract) {
            Ok(rate) => ContractReturn {
                contract: (*contract).to_string(),
                mwrr: Some(rate),
                error: None,
            },
            Err(e) => {
                warn!(contract = %contract, error = %e, "Could not calculate MWRR");
                ContractReturn {
                    contract: (*contract).to_string(),
                    mwrr: None,
                    error: Some(e.to_string()),
                }
            }
        })
        .collect()
}
