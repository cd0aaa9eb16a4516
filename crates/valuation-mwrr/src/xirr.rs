//! Internal rate of return for irregular cash flows.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{MwrrError, Result};

const DAYS_PER_YEAR: f64 = 365.0;
const TOLERANCE: f64 = 1e-10;
const MAX_ITERATIONS: usize = 100;
const INITIAL_GUESS: f64 = 0.1;
/// Rates at or below -100% make the discount factor undefined.
const MIN_RATE: f64 = -0.999_999_999;

/// A dated cash flow. Negative amounts are paid in, positive paid out.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CashFlow {
    /// Flow date.
    pub date: NaiveDate,
    /// Signed amount.
    pub amount: f64,
}

impl CashFlow {
    /// Create a cash flow.
    #[must_use]
    pub const fn new(date: NaiveDate, amount: f64) -> Self {
        Self { date, amount }
    }
}

fn years_since(start: NaiveDate, date: NaiveDate) -> f64 {
    (date - start).num_days() as f64 / DAYS_PER_YEAR
}

/// Net present value and its derivative at `rate`.
fn npv_and_derivative(flows: &[(f64, f64)], rate: f64) -> (f64, f64) {
    flows.iter().fold((0.0, 0.0), |(npv, d), (t, amount)| {
        let discount = (1.0 + rate).powf(-t);
        (npv + amount * discount, d - t * amount * discount / (1.0 + rate))
    })
}

fn npv(flows: &[(f64, f64)], rate: f64) -> f64 {
    npv_and_derivative(flows, rate).0
}

/// Annualized rate at which the flows' net present value is zero.
///
/// Uses an actual/365 day count from the earliest date. Newton's method is
/// tried first; if it leaves the valid range or stalls, the root is bracketed
/// and bisected.
pub fn xirr(flows: &[CashFlow]) -> Result<f64> {
    if flows.len() < 2 {
        return Err(MwrrError::InsufficientCashFlows(flows.len()));
    }
    if !flows.iter().any(|f| f.amount > 0.0) || !flows.iter().any(|f| f.amount < 0.0) {
        return Err(MwrrError::NoSignChange);
    }

    let Some(start) = flows.iter().map(|f| f.date).min() else {
        return Err(MwrrError::InsufficientCashFlows(0));
    };
    let points: Vec<(f64, f64)> = flows
        .iter()
        .map(|f| (years_since(start, f.date), f.amount))
        .collect();

    newton(&points).map_or_else(|| bisect(&points), Ok)
}

fn newton(points: &[(f64, f64)]) -> Option<f64> {
    let mut rate = INITIAL_GUESS;
    for _ in 0..MAX_ITERATIONS {
        let (value, derivative) = npv_and_derivative(points, rate);
        if value.abs() < TOLERANCE {
            return Some(rate);
        }
        if derivative == 0.0 || !derivative.is_finite() {
            return None;
        }
        let next = rate - value / derivative;
        if !next.is_finite() || next <= MIN_RATE {
            return None;
        }
        if (next - rate).abs() < TOLERANCE {
            return Some(next);
        }
        rate = next;
    }
    None
}

fn bisect(points: &[(f64, f64)]) -> Result<f64> {
    let mut low = MIN_RATE;
    let mut high = 1.0;
    let low_value = npv(points, low);

    // Widen until the bracket holds a sign change
    while npv(points, high).signum() == low_value.signum() {
        high *= 2.0;
        if high > 1e6 {
            return Err(MwrrError::NoConvergence);
        }
    }

    for _ in 0..(MAX_ITERATIONS * 10) {
        let mid = (low + high) / 2.0;
        let value = npv(points, mid);
        if value.abs() < TOLERANCE || (high - low) / 2.0 < TOLERANCE {
            return Ok(mid);
        }
        if value.signum() == npv(points, low).signum() {
            low = mid;
        } else {
            high = mid;
        }
    }
    Err(MwrrError::NoConvergence)
}
