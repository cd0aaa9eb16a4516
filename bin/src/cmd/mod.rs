//! CLI subcommand modules.

pub(crate) mod generate;
pub(crate) mod mwrr;
pub(crate) mod price;
