//! Dataset generation command implementation.

use anyhow::{Context, Result, bail};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use valuation::{
    Cadence, CsvSink, DatasetGenerator, GeneratorConfig, OutputPaths, ProviderRegistry, Symbol,
    YahooProvider, read_tickers,
};

/// Arguments of the `generate` command.
#[derive(Debug)]
pub(crate) struct GenerateArgs {
    pub(crate) tickers: Option<PathBuf>,
    pub(crate) column: String,
    pub(crate) symbols: Vec<String>,
    pub(crate) output: PathBuf,
    pub(crate) cadence: Cadence,
    pub(crate) flush_every: usize,
    pub(crate) rate_limit_ms: u64,
}

/// Resolves the ticker list from a file or the command line.
pub(crate) fn load_tickers(args: &GenerateArgs) -> Result<Vec<Symbol>> {
    let tickers = match &args.tickers {
        Some(path) => read_tickers(path, &args.column)
            .with_context(|| format!("reading tickers from {}", path.display()))?,
        None => args.symbols.iter().map(Symbol::new).collect(),
    };
    if tickers.is_empty() {
        bail!("no tickers to process");
    }
    Ok(tickers)
}

/// Runs the generator over the ticker list and writes the CSV outputs.
pub(crate) async fn generate(args: GenerateArgs) -> Result<()> {
    let tickers = load_tickers(&args)?;

    let yahoo = YahooProvider::with_rate_limit(Duration::from_millis(args.rate_limit_ms))?;
    let analyzer = ProviderRegistry::new()
        .with_provider(Arc::new(yahoo))
        .into_analyzer();

    let config = GeneratorConfig::default()
        .with_cadence(args.cadence)
        .with_flush_every(args.flush_every);
    let sink = CsvSink::new(OutputPaths::in_dir(&args.output));
    let mut generator = DatasetGenerator::new(analyzer, sink, config)?;

    info!(tickers = tickers.len(), cadence = %args.cadence, "Starting dataset generation");
    let run = generator.run(&tickers).await?;

    println!("Processed {} tickers", tickers.len());
    println!("  Records:    {}", run.records.len());
    println!("  Incomplete: {}", run.incomplete.len());
    println!("  Skipped:    {}", run.skipped.len());
    println!("  Flushes:    {}", run.flushes);
    let paths = generator.sink().paths();
    println!("Results written to {}", paths.results.display());
    println!("Incomplete tickers written to {}", paths.incomplete.display());

    if !run.skipped.is_empty() {
        let skipped: Vec<&str> = run.skipped.iter().map(Symbol::as_str).collect();
        println!("Skipped: {}", skipped.join(", "));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn args() -> GenerateArgs {
        GenerateArgs {
            tickers: None,
            column: "Symbol".to_string(),
            symbols: Vec::new(),
            output: PathBuf::from("."),
            cadence: Cadence::Annual,
            flush_every: 20,
            rate_limit_ms: 0,
        }
    }

    #[test]
    fn test_symbols_from_command_line() {
        let args = GenerateArgs {
            symbols: vec!["aapl".to_string(), "MSFT".to_string()],
            ..args()
        };
        assert_eq!(
            load_tickers(&args).unwrap(),
            vec![Symbol::new("AAPL"), Symbol::new("MSFT")]
        );
    }

    #[test]
    fn test_symbols_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tickers.csv");
        fs::write(&path, "Symbol\nKO\nPEP\n").unwrap();

        let args = GenerateArgs {
            tickers: Some(path),
            ..args()
        };
        assert_eq!(
            load_tickers(&args).unwrap(),
            vec![Symbol::new("KO"), Symbol::new("PEP")]
        );
    }

    #[test]
    fn test_no_tickers() {
        assert!(load_tickers(&args()).is_err());
    }
}
