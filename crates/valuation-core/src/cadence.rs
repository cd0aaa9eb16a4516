//! Reporting cadence definitions.
//!
//! This module defines [`Cadence`], the statement period length requested
//! from a statement provider.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether statements are reported annually or quarterly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cadence {
    /// Annual reporting period.
    #[default]
    Annual,
    /// Quarterly reporting period.
    Quarterly,
}

impl Cadence {
    /// Returns the lowercase name of this cadence.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Annual => "annual",
            Self::Quarterly => "quarterly",
        }
    }
}

impl fmt::Display for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
