//! Error types for return calculations.

use thiserror::Error;

/// Errors from loading records or computing returns.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MwrrError {
    /// Fewer than two cash flows.
    #[error("at least two cash flows are required, got {0}")]
    InsufficientCashFlows(usize),

    /// Cash flows without both an inflow and an outflow.
    #[error("cash flows must contain both positive and negative amounts")]
    NoSignChange,

    /// The contract has no balance snapshot.
    #[error("no balance for contract {0}")]
    NoBalance(String),

    /// The solver did not find a root.
    #[error("XIRR did not converge")]
    NoConvergence,

    /// Input could not be read.
    #[error("failed to load {path}: {message}")]
    Load {
        /// Source path or name
        path: String,
        /// Underlying error
        message: String,
    },

    /// A DataFrame operation failed.
    #[error("frame error: {0}")]
    Frame(String),

    /// Required column missing from the input.
    #[error("missing column '{0}'")]
    MissingColumn(String),
}

/// Result type alias for return calculations.
pub type Result<T> = std::result::Result<T, MwrrError>;
