//! Reasons a ratio is unavailable.

use thiserror::Error;
use valuation_core::LineItem;

use crate::ratio::Ratio;

/// Why a ratio could not be computed for a period.
#[derive(Error, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RatioError {
    /// A required line item is not reported for the period.
    #[error("missing line item: {0}")]
    MissingLineItem(LineItem),

    /// A line item used as a divisor is zero.
    #[error("zero divisor: {0}")]
    ZeroLineItem(LineItem),

    /// A ratio used as a divisor is zero.
    #[error("zero divisor: {0}")]
    ZeroRatio(Ratio),

    /// No closing price could be resolved for the period.
    #[error("price unavailable")]
    MissingPrice,

    /// A ratio this one depends on is unavailable.
    #[error("depends on unavailable {0}")]
    Dependency(Ratio),

    /// The arithmetic produced a non-finite value.
    #[error("non-finite result")]
    NonFinite,
}

/// Outcome of a single ratio computation.
pub type Outcome = std::result::Result<f64, RatioError>;
