#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/valuation/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Yahoo Finance statement and price provider.
//!
//! This crate provides a Yahoo Finance provider that implements the
//! [`DataProvider`], [`StatementProvider`] and [`PriceProvider`] traits from
//! `valuation-core`.
//!
//! # Features
//!
//! - Balance sheet, income statement and cash flow from the fundamentals
//!   timeseries API, annual or quarterly
//! - Closing price on the first trading day at or after a date, from the chart API
//! - Built-in rate limiting (1 request per second by default)
//!
//! # Example
//!
//! ```no_run
//! use valuation_yahoo::YahooProvider;
//! use valuation_core::{Cadence, PriceProvider, StatementProvider, Symbol};
//! use chrono::NaiveDate;
//!
//! # async fn example() -> valuation_core::Result<()> {
//! let provider = YahooProvider::new()?;
//! let symbol = Symbol::new("AAPL");
//!
//! let statements = provider.fetch_statements(&symbol, Cadence::Annual).await?;
//! for date in statements.period_ends() {
//!     let close = provider.resolve_close(&symbol, date).await?;
//!     println!("{date}: {close}");
//! }
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use serde::Deserialize;
use tokio::time::sleep;
use tracing::{debug, instrument, warn};
use valuation_core::{
    Cadence, DailyClose, DataError, DataProvider, FinancialStatementSet, LineItem, PriceProvider,
    Result, StatementProvider, Symbol, first_close_on_or_after, price::window_end,
};

/// Yahoo Finance chart API base URL.
const CHART_API_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Yahoo Finance fundamentals timeseries API base URL.
const TIMESERIES_API_URL: &str =
    "https://query2.finance.yahoo.com/ws/fundamentals-timeseries/v1/finance/timeseries";

/// Earliest statement date requested (2016-12-31 UTC).
const TIMESERIES_START: i64 = 1_483_142_400;

/// Default rate limit delay in milliseconds.
const DEFAULT_RATE_LIMIT_MS: u64 = 1000;

/// HTTP request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// User agent for HTTP requests.
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";

const PROVIDER_NAME: &str = "Yahoo Finance";

/// Yahoo Finance data provider.
///
/// Implements [`DataProvider`], [`StatementProvider`] and [`PriceProvider`].
#[derive(Debug)]
pub struct YahooProvider {
    client: reqwest::Client,
    rate_limit_ms: u64,
    last_request_time: AtomicU64,
}

impl YahooProvider {
    /// Create a new Yahoo Finance provider with default settings.
    ///
    /// Uses built-in rate limiting of 1 request per second.
    pub fn new() -> Result<Self> {
        Self::with_rate_limit(Duration::from_millis(DEFAULT_RATE_LIMIT_MS))
    }

    /// Create a new Yahoo Finance provider with a custom HTTP client.
    ///
    /// Uses the provided client for all HTTP requests. Rate limiting
    /// is still applied.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            rate_limit_ms: DEFAULT_RATE_LIMIT_MS,
            last_request_time: AtomicU64::new(0),
        }
    }

    /// Create a new Yahoo Finance provider with custom rate limiting.
    pub fn with_rate_limit(rate_limit: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| DataError::Network(e.to_string()))?;

        Ok(Self {
            client,
            rate_limit_ms: rate_limit.as_millis() as u64,
            last_request_time: AtomicU64::new(0),
        })
    }

    /// Apply rate limiting before making a request.
    async fn apply_rate_limit(&self) {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;

        let last = self.last_request_time.load(Ordering::Relaxed);
        let elapsed = now.saturating_sub(last);

        if elapsed < self.rate_limit_ms {
            let wait_time = self.rate_limit_ms - elapsed;
            debug!("Rate limiting: waiting {}ms", wait_time);
            sleep(Duration::from_millis(wait_time)).await;
        }

        self.last_request_time.store(
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_millis() as u64,
            Ordering::Relaxed,
        );
    }

    /// Build the fundamentals timeseries URL for a symbol.
    fn build_timeseries_url(&self, symbol: &Symbol, cadence: Cadence, period2: i64) -> String {
        let types = LineItem::ALL
            .iter()
            .map(|item| format!("{}{}", cadence.as_str(), timeseries_key(*item)))
            .collect::<Vec<_>>()
            .join(",");

        format!(
            "{}/{}?symbol={}&type={}&period1={}&period2={}",
            TIMESERIES_API_URL,
            symbol.as_str(),
            symbol.as_str(),
            types,
            TIMESERIES_START,
            period2
        )
    }

    /// Build the daily chart URL covering the price window starting at `date`.
    fn build_chart_url(&self, symbol: &Symbol, date: NaiveDate) -> String {
        let start_ts = midnight_timestamp(date);
        let end_ts = midnight_timestamp(window_end(date));

        format!(
            "{}/{}?period1={}&period2={}&interval=1d&includeAdjustedClose=true",
            CHART_API_URL,
            symbol.as_str(),
            start_ts,
            end_ts
        )
    }

    /// Issue a GET request and map HTTP-level failures.
    async fn get(&self, symbol: &Symbol, url: &str) -> Result<reqwest::Response> {
        self.apply_rate_limit().await;
        debug!("Fetching: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DataError::Network(e.to_string()))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(DataError::RateLimited {
                provider: PROVIDER_NAME.to_string(),
                retry_after: Some(Duration::from_secs(60)),
            });
        }

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(DataError::SymbolNotFound(symbol.to_string()));
        }

        if !response.status().is_success() {
            return Err(DataError::Network(format!(
                "HTTP {} for {}",
                response.status(),
                symbol
            )));
        }

        Ok(response)
    }

    /// Parse a fundamentals timeseries response into a statement set.
    fn parse_timeseries_response(
        &self,
        symbol: &Symbol,
        cadence: Cadence,
        response: TimeseriesResponse,
    ) -> Result<FinancialStatementSet> {
        if let Some(error) = response.timeseries.error {
            return Err(DataError::Other(format!(
                "{}: {}",
                error.code, error.description
            )));
        }

        let mut set = FinancialStatementSet::new(symbol.clone(), cadence);
        let prefix = cadence.as_str();

        for data in response.timeseries.result.unwrap_or_default() {
            for series_type in &data.meta.series_type {
                let Some(item) = series_type
                    .strip_prefix(prefix)
                    .and_then(line_item_for_key)
                else {
                    debug!(series = %series_type, "Ignoring unrequested series");
                    continue;
                };

                let Some(raw) = data.series.get(series_type) else {
                    continue;
                };

                let points: Vec<Option<TimeseriesPoint>> = serde_json::from_value(raw.clone())
                    .map_err(|e| DataError::Parse(format!("{series_type}: {e}")))?;

                for point in points.into_iter().flatten() {
                    let Some(value) = point.reported_value.map(|v| v.raw) else {
                        continue;
                    };
                    match NaiveDate::parse_from_str(&point.as_of_date, "%Y-%m-%d") {
                        Ok(date) => set.insert(date, item, value),
                        Err(e) => warn!(
                            symbol = %symbol,
                            date = %point.as_of_date,
                            error = %e,
                            "Skipping point with unparseable date"
                        ),
                    }
                }
            }
        }

        Ok(set)
    }

    /// Parse a chart response into daily closes, preferring adjusted closes.
    fn parse_chart_response(
        &self,
        symbol: &Symbol,
        response: ChartResponse,
    ) -> Result<Vec<DailyClose>> {
        if let Some(error) = response.chart.error {
            if error.code == "Not Found" {
                return Err(DataError::SymbolNotFound(symbol.to_string()));
            }
            return Err(DataError::Other(format!(
                "{}: {}",
                error.code, error.description
            )));
        }

        let result = response
            .chart
            .result
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| DataError::SymbolNotFound(symbol.to_string()))?;

        let timestamps = result.timestamp.unwrap_or_default();

        let closes = result
            .indicators
            .quote
            .into_iter()
            .next()
            .map(|q| q.close)
            .unwrap_or_default();

        let adj_closes = result
            .indicators
            .adjclose
            .and_then(|ac| ac.into_iter().next())
            .map(|ac| ac.adjclose)
            .unwrap_or_default();

        // Adjusted close per bar, raw close where it is null or the series
        // doesn't line up with the timestamps
        let adj_aligned = adj_closes.len() == timestamps.len();

        Ok(timestamps
            .iter()
            .enumerate()
            .filter_map(|(idx, &ts)| {
                let date = Utc.timestamp_opt(ts, 0).single()?.date_naive();
                let adjusted = if adj_aligned { adj_closes[idx] } else { None };
                let close = adjusted.or_else(|| closes.get(idx).copied().flatten())?;
                Some(DailyClose::new(date, close))
            })
            .collect())
    }
}

/// Seconds since the epoch at 00:00 UTC on `date`.
fn midnight_timestamp(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| Utc.from_utc_datetime(&dt).timestamp())
        .unwrap_or(0)
}

/// Timeseries type name for a line item, without the cadence prefix.
const fn timeseries_key(item: LineItem) -> &'static str {
    match item {
        LineItem::NetIncomeCommonStockholders => "NetIncomeCommonStockholders",
        LineItem::Ebitda => "EBITDA",
        LineItem::OrdinarySharesNumber => "OrdinarySharesNumber",
        LineItem::CommonStockEquity => "CommonStockEquity",
        LineItem::TotalAssets => "TotalAssets",
        LineItem::CurrentLiabilities => "CurrentLiabilities",
        LineItem::OperatingCashFlow => "OperatingCashFlow",
        LineItem::DepreciationAndAmortization => "DepreciationAndAmortization",
    }
}

fn line_item_for_key(key: &str) -> Option<LineItem> {
    LineItem::ALL
        .into_iter()
        .find(|item| timeseries_key(*item) == key)
}

impl DataProvider for YahooProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn description(&self) -> &str {
        "Yahoo Finance provider for financial statements and closing prices"
    }

    fn supported_cadences(&self) -> &[Cadence] {
        &[Cadence::Annual, Cadence::Quarterly]
    }
}

#[async_trait]
impl StatementProvider for YahooProvider {
    #[instrument(skip(self), fields(symbol = %symbol, cadence = %cadence))]
    async fn fetch_statements(
        &self,
        symbol: &Symbol,
        cadence: Cadence,
    ) -> Result<FinancialStatementSet> {
        let url = self.build_timeseries_url(symbol, cadence, Utc::now().timestamp());

        let response: TimeseriesResponse = self
            .get(symbol, &url)
            .await?
            .json()
            .await
            .map_err(|e| DataError::Parse(e.to_string()))?;

        self.parse_timeseries_response(symbol, cadence, response)
    }
}

#[async_trait]
impl PriceProvider for YahooProvider {
    #[instrument(skip(self), fields(symbol = %symbol, date = %date))]
    async fn resolve_close(&self, symbol: &Symbol, date: NaiveDate) -> Result<f64> {
        let url = self.build_chart_url(symbol, date);

        let response: ChartResponse = self
            .get(symbol, &url)
            .await?
            .json()
            .await
            .map_err(|e| DataError::Parse(e.to_string()))?;

        let bars = self.parse_chart_response(symbol, response)?;

        first_close_on_or_after(&bars, date).ok_or_else(|| DataError::DataNotAvailable {
            symbol: symbol.to_string(),
            start: date.to_string(),
            end: window_end(date).to_string(),
        })
    }
}

// ============================================================================
// Yahoo Finance API Response Types
// ============================================================================

/// Fundamentals timeseries API response.
#[derive(Debug, Deserialize)]
struct TimeseriesResponse {
    timeseries: TimeseriesResult,
}

#[derive(Debug, Deserialize)]
struct TimeseriesResult {
    result: Option<Vec<TimeseriesData>>,
    error: Option<ApiError>,
}

/// One requested series; the values live under a key equal to the series type.
#[derive(Debug, Deserialize)]
struct TimeseriesData {
    meta: TimeseriesMeta,
    #[serde(flatten)]
    series: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct TimeseriesMeta {
    #[serde(rename = "type", default)]
    series_type: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimeseriesPoint {
    as_of_date: String,
    reported_value: Option<ReportedValue>,
}

#[derive(Debug, Deserialize)]
struct ReportedValue {
    raw: f64,
}

/// Chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjClose>>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjClose {
    adjclose: Vec<Option<f64>>,
}
