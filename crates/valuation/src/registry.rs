//! Provider registry with ordered fallback.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{debug, warn};

use valuation_core::{
    Cadence, DataError, DataProvider, FinancialStatementSet, PriceProvider, Result,
    StatementProvider, Symbol,
};
use valuation_dataset::TickerAnalyzer;

/// Registry of statement and price providers.
///
/// Providers are tried in registration order until one succeeds. The registry
/// is itself a [`StatementProvider`] and [`PriceProvider`], so it can be
/// handed to a [`TickerAnalyzer`] directly.
///
/// # Example
///
/// ```rust,ignore
/// use valuation::{Cadence, ProviderRegistry, Symbol};
///
/// let analyzer = ProviderRegistry::new().with_yahoo()?.into_analyzer();
/// let analysis = analyzer.analyze(&Symbol::new("AAPL"), Cadence::Annual).await?;
/// ```
#[derive(Default)]
pub struct ProviderRegistry {
    statement_providers: Vec<Arc<dyn StatementProvider>>,
    price_providers: Vec<Arc<dyn PriceProvider>>,
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field(
                "statement_providers",
                &self
                    .statement_providers
                    .iter()
                    .map(|p| p.name())
                    .collect::<Vec<_>>(),
            )
            .field(
                "price_providers",
                &self
                    .price_providers
                    .iter()
                    .map(|p| p.name())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl ProviderRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a statement provider.
    pub fn register_statements(&mut self, provider: Arc<dyn StatementProvider>) {
        debug!(provider = provider.name(), "Registering statement provider");
        self.statement_providers.push(provider);
    }

    /// Register a price provider.
    pub fn register_prices(&mut self, provider: Arc<dyn PriceProvider>) {
        debug!(provider = provider.name(), "Registering price provider");
        self.price_providers.push(provider);
    }

    /// Register a provider serving both statements and prices.
    #[must_use]
    pub fn with_provider<P>(mut self, provider: Arc<P>) -> Self
    where
        P: StatementProvider + PriceProvider + 'static,
    {
        self.register_statements(provider.clone());
        self.register_prices(provider);
        self
    }

    /// Add the Yahoo Finance provider.
    #[cfg(feature = "yahoo")]
    pub fn with_yahoo(self) -> Result<Self> {
        Ok(self.with_provider(Arc::new(valuation_yahoo::YahooProvider::new()?)))
    }

    /// Number of statement and price providers.
    #[must_use]
    pub fn provider_counts(&self) -> (usize, usize) {
        (self.statement_providers.len(), self.price_providers.len())
    }

    /// True if no provider of either kind is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statement_providers.is_empty() && self.price_providers.is_empty()
    }

    /// Wraps the registry in an analyzer using it for statements and prices.
    #[must_use]
    pub fn into_analyzer(self) -> TickerAnalyzer {
        let shared = Arc::new(self);
        TickerAnalyzer::new(shared.clone(), shared)
    }
}

fn all_failed() -> DataError {
    DataError::Other("All providers failed with no error".to_string())
}

impl DataProvider for ProviderRegistry {
    fn name(&self) -> &str {
        "Registry"
    }

    fn description(&self) -> &str {
        "Registered providers tried in order"
    }

    fn supported_cadences(&self) -> &[Cadence] {
        &[Cadence::Annual, Cadence::Quarterly]
    }
}

#[async_trait]
impl StatementProvider for ProviderRegistry {
    async fn fetch_statements(
        &self,
        symbol: &Symbol,
        cadence: Cadence,
    ) -> Result<FinancialStatementSet> {
        if self.statement_providers.is_empty() {
            return Err(DataError::NotSupported(
                "No statement providers registered".to_string(),
            ));
        }

        let mut last_error = None;
        for provider in &self.statement_providers {
            if !provider.supported_cadences().contains(&cadence) {
                continue;
            }
            debug!(
                provider = provider.name(),
                symbol = %symbol,
                "Fetching statements"
            );

            match provider.fetch_statements(symbol, cadence).await {
                Ok(set) => return Ok(set),
                Err(e) => {
                    warn!(
                        provider = provider.name(),
                        error = %e,
                        "Provider failed, trying next"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            DataError::NotSupported(format!("No provider supports {cadence} statements"))
        }))
    }
}

#[async_trait]
impl PriceProvider for ProviderRegistry {
    async fn resolve_close(&self, symbol: &Symbol, date: NaiveDate) -> Result<f64> {
        if self.price_providers.is_empty() {
            return Err(DataError::NotSupported(
                "No price providers registered".to_string(),
            ));
        }

        let mut last_error = None;
        for provider in &self.price_providers {
            debug!(
                provider = provider.name(),
                symbol = %symbol,
                date = %date,
                "Resolving close"
            );

            match provider.resolve_close(symbol, date).await {
                Ok(close) => return Ok(close),
                Err(e) => {
                    warn!(
                        provider = provider.name(),
                        error = %e,
                        "Provider failed, trying next"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(all_failed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use valuation_core::{InMemoryProvider, LineItem};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn provider_with_aaa() -> InMemoryProvider {
        let period = date(2023, 12, 31);
        let set = FinancialStatementSet::new(Symbol::new("AAA"), Cadence::Annual)
            .with_value(period, LineItem::Ebitda, 1_500.0)
            .with_value(period, LineItem::TotalAssets, 12_000.0)
            .with_value(period, LineItem::OperatingCashFlow, 1_200.0);
        InMemoryProvider::new()
            .with_statements(set)
            .with_closes("AAA", [(date(2024, 1, 2), 150.0)])
    }

    #[tokio::test]
    async fn test_empty_registry() {
        let registry = ProviderRegistry::new();
        assert!(registry.is_empty());

        let symbol = Symbol::new("AAA");
        assert!(matches!(
            registry.fetch_statements(&symbol, Cadence::Annual).await,
            Err(DataError::NotSupported(_))
        ));
        assert!(matches!(
            registry.resolve_close(&symbol, date(2023, 12, 31)).await,
            Err(DataError::NotSupported(_))
        ));
    }

    #[tokio::test]
    async fn test_falls_back_to_next_provider() {
        let failing = Arc::new(InMemoryProvider::new().with_failure("AAA", "timeout"));
        let working = Arc::new(provider_with_aaa());
        let registry = ProviderRegistry::new()
            .with_provider(failing.clone())
            .with_provider(working.clone());
        assert_eq!(registry.provider_counts(), (2, 2));

        let symbol = Symbol::new("AAA");
        let set = registry
            .fetch_statements(&symbol, Cadence::Annual)
            .await
            .unwrap();
        assert_eq!(set.value(LineItem::Ebitda, date(2023, 12, 31)), Some(1_500.0));

        let close = registry
            .resolve_close(&symbol, date(2023, 12, 31))
            .await
            .unwrap();
        assert_eq!(close, 150.0);

        assert_eq!(failing.statement_requests(), 1);
        assert_eq!(working.statement_requests(), 1);
    }

    #[tokio::test]
    async fn test_returns_last_error() {
        let registry = ProviderRegistry::new()
            .with_provider(Arc::new(InMemoryProvider::new().with_failure("AAA", "timeout")))
            .with_provider(Arc::new(InMemoryProvider::new()));

        let err = registry
            .fetch_statements(&Symbol::new("AAA"), Cadence::Annual)
            .await
            .unwrap_err();
        assert!(matches!(err, DataError::SymbolNotFound(_)));
    }

    #[tokio::test]
    async fn test_into_analyzer() {
        let analyzer = ProviderRegistry::new()
            .with_provider(Arc::new(provider_with_aaa()))
            .into_analyzer();

        let analysis = analyzer
            .analyze(&Symbol::new("AAA"), Cadence::Annual)
            .await
            .unwrap();
        // Shares and liabilities are not reported
        assert!(analysis.incomplete);
        assert_eq!(analysis.records.len(), 1);
        assert_eq!(analysis.records[0].ebitda, Some(1_500.0));
        assert_eq!(analysis.records[0].prices, Some(150.0));
    }
}
