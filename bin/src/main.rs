//! Valuation CLI binary.
//!
//! Generates fundamental-analysis datasets, resolves closing prices and
//! computes money-weighted returns.

mod cmd;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;
use valuation::{Cadence, DEFAULT_FLUSH_EVERY, DEFAULT_TICKER_COLUMN};

#[derive(Parser)]
#[command(name = "valuation")]
#[command(about = "Fundamental valuation datasets and portfolio returns", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Statement cadence flag.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub(crate) enum CadenceArg {
    Annual,
    Quarterly,
}

impl From<CadenceArg> for Cadence {
    fn from(arg: CadenceArg) -> Self {
        match arg {
            CadenceArg::Annual => Self::Annual,
            CadenceArg::Quarterly => Self::Quarterly,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the ratio dataset for a ticker list
    Generate {
        /// CSV file with one ticker per row
        #[arg(short, long, required_unless_present = "symbols")]
        tickers: Option<PathBuf>,

        /// Column holding the tickers
        #[arg(long, default_value = DEFAULT_TICKER_COLUMN)]
        column: String,

        /// Ticker symbols, instead of a file
        #[arg(short, long, value_delimiter = ',', conflicts_with = "tickers")]
        symbols: Vec<String>,

        /// Output directory for results.csv and incomplete.csv
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Statement cadence
        #[arg(long, value_enum, default_value = "annual")]
        cadence: CadenceArg,

        /// Tickers processed between flushes
        #[arg(long, default_value_t = DEFAULT_FLUSH_EVERY)]
        flush_every: usize,

        /// Minimum delay between Yahoo requests, in milliseconds
        #[arg(long, default_value = "1000")]
        rate_limit_ms: u64,
    },

    /// Resolve the close of the first trading day on or after a date
    Price {
        /// Ticker symbol
        symbol: String,

        /// Date (YYYY-MM-DD)
        date: NaiveDate,
    },

    /// Compute money-weighted returns per contract
    Mwrr {
        /// Balances CSV (contract, balance_date, value_pos_mdo)
        #[arg(long)]
        balances: PathBuf,

        /// Movements CSV (contract, description, movement_import, operation_date)
        #[arg(long)]
        movements: PathBuf,

        /// Contracts to evaluate
        #[arg(short, long, value_delimiter = ',')]
        contracts: Vec<String>,

        /// Directory to export the cleaned records to
        #[arg(long)]
        export: Option<PathBuf>,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            tickers,
            column,
            symbols,
            output,
            cadence,
            flush_every,
            rate_limit_ms,
        } => {
            let args = cmd::generate::GenerateArgs {
                tickers,
                column,
                symbols,
                output,
                cadence: cadence.into(),
                flush_every,
                rate_limit_ms,
            };
            cmd::generate::generate(args).await?;
        }
        Commands::Price { symbol, date } => {
            cmd::price::show_price(&symbol, date).await?;
        }
        Commands::Mwrr {
            balances,
            movements,
            contracts,
            export,
        } => {
            cmd::mwrr::show_returns(&balances, &movements, &contracts, export.as_deref())?;
        }
    }

    Ok(())
}
