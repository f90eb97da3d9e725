//! Daily price history client for the Yahoo Finance chart API.
//!
//! One GET per fetch: no retry, no caching, no rate-limit handling. The
//! response is decoded into typed structs and assembled into a
//! [`PriceSeries`]; null cells in the provider's arrays become missing
//! cells, and a wholly absent array becomes an absent column.

use std::time::Duration as StdDuration;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::models::{PriceSeries, SeriesColumns};

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Client for fetching daily OHLCV history
pub struct YahooClient {
    client: reqwest::Client,
    base_url: String,
}

impl YahooClient {
    /// Create a new client against the public endpoint
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a client against a specific base URL
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(Error::Config(format!(
                "Invalid base_url: must start with http:// or https://, got: '{}'",
                base_url
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(StdDuration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    /// Fetch daily history for `symbol` between `start` (inclusive) and
    /// `end` (exclusive, the provider's convention). An empty result set
    /// yields an empty series, not an error.
    pub async fn fetch_daily(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries> {
        if start >= end {
            return Err(Error::InvalidInput(format!(
                "start date {} is not before end date {}",
                start, end
            )));
        }

        let url = format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval=1d&events=history",
            self.base_url,
            symbol,
            unix_midnight(start),
            unix_midnight(end),
        );

        debug!(symbol, %url, "Requesting daily history");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Network(format!("Request failed: {} (url: {})", e, url)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            return Err(Error::Network(format!(
                "Provider returned error status {}: {}",
                status, body
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(format!("Failed to read response body: {}", e)))?;

        let parsed: ChartResponse = serde_json::from_str(&body)
            .map_err(|e| Error::Parse(format!("Failed to parse chart response: {}", e)))?;

        let series = parse_chart_response(symbol, parsed)?;
        info!(symbol, rows = series.len(), "Fetched daily history");
        Ok(series)
    }
}

fn unix_midnight(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ProviderError>,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    code: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<QuoteBlock>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteBlock {
    #[serde(default)]
    open: Option<Vec<Option<f64>>>,
    #[serde(default)]
    high: Option<Vec<Option<f64>>>,
    #[serde(default)]
    low: Option<Vec<Option<f64>>>,
    #[serde(default)]
    close: Option<Vec<Option<f64>>>,
    #[serde(default)]
    volume: Option<Vec<Option<u64>>>,
}

/// Assemble a [`PriceSeries`] from a decoded chart payload. Pure so the
/// mapping is testable against canned responses.
fn parse_chart_response(symbol: &str, response: ChartResponse) -> Result<PriceSeries> {
    if let Some(error) = response.chart.error {
        return Err(Error::Network(format!(
            "Provider error {}: {}",
            error.code,
            error.description.unwrap_or_default()
        )));
    }

    let result = match response
        .chart
        .result
        .and_then(|mut results| (!results.is_empty()).then(|| results.remove(0)))
    {
        Some(result) => result,
        None => return Ok(PriceSeries::empty(symbol)),
    };

    let timestamps = match result.timestamp {
        Some(timestamps) if !timestamps.is_empty() => timestamps,
        _ => return Ok(PriceSeries::empty(symbol)),
    };

    let mut dates = Vec::with_capacity(timestamps.len());
    for ts in &timestamps {
        let date = DateTime::<Utc>::from_timestamp(*ts, 0)
            .ok_or_else(|| Error::Parse(format!("Invalid timestamp in response: {}", ts)))?
            .date_naive();
        dates.push(date);
    }

    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let rows = dates.len();

    let columns = SeriesColumns {
        open: check_array("open", quote.open, rows)?,
        high: check_array("high", quote.high, rows)?,
        low: check_array("low", quote.low, rows)?,
        close: check_array("close", quote.close, rows)?,
        volume: check_array("volume", quote.volume, rows)?,
        symbols: Some(vec![Some(symbol.to_string()); rows]),
    };

    PriceSeries::new(symbol, dates, columns)
}

fn check_array<T>(name: &str, array: Option<Vec<T>>, rows: usize) -> Result<Option<Vec<T>>> {
    match array {
        Some(values) if values.len() != rows => Err(Error::Parse(format!(
            "Response array '{}' has {} entries for {} timestamps",
            name,
            values.len(),
            rows
        ))),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> Result<PriceSeries> {
        let response: ChartResponse = serde_json::from_str(body).unwrap();
        parse_chart_response("GOOG", response)
    }

    #[test]
    fn test_parse_response_with_null_cells() {
        // 2024-01-02, 2024-01-03, 2024-01-04 UTC midnights
        let body = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1704153600, 1704240000, 1704326400],
                    "indicators": {
                        "quote": [{
                            "open": [139.6, null, 138.4],
                            "high": [141.2, 140.0, 139.9],
                            "low": [138.8, 138.9, 137.5],
                            "close": [140.4, 139.7, null],
                            "volume": [21300000, null, 19800000]
                        }]
                    }
                }],
                "error": null
            }
        }"#;

        let series = parse(body).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.open().unwrap()[1], None);
        assert_eq!(series.close().unwrap()[0], Some(140.4));
        assert_eq!(series.close().unwrap()[2], None);
        assert_eq!(series.volume().unwrap()[1], None);
        assert_eq!(series.symbols().unwrap()[0].as_deref(), Some("GOOG"));
    }

    #[test]
    fn test_parse_response_with_absent_column() {
        let body = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1704153600, 1704240000],
                    "indicators": {
                        "quote": [{
                            "open": [139.6, 140.1],
                            "high": [141.2, 140.9],
                            "low": [138.8, 139.0],
                            "volume": [21300000, 18400000]
                        }]
                    }
                }],
                "error": null
            }
        }"#;

        let series = parse(body).unwrap();
        assert_eq!(series.len(), 2);
        assert!(series.close().is_none());
        assert!(matches!(
            series.clone().calculate_rsi(14),
            Err(Error::MissingColumn("Close"))
        ));
    }

    #[test]
    fn test_parse_empty_result_yields_empty_series() {
        let body = r#"{"chart": {"result": [], "error": null}}"#;
        let series = parse(body).unwrap();
        assert!(series.is_empty());
        assert!(series.close().is_some());
    }

    #[test]
    fn test_parse_provider_error() {
        let body = r#"{
            "chart": {
                "result": null,
                "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}
            }
        }"#;
        assert!(matches!(parse(body), Err(Error::Network(_))));
    }

    #[test]
    fn test_parse_sorts_out_of_order_rows() {
        let body = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1704240000, 1704153600],
                    "indicators": {
                        "quote": [{
                            "open": [140.1, 139.6],
                            "high": [140.9, 141.2],
                            "low": [139.0, 138.8],
                            "close": [139.7, 140.4],
                            "volume": [18400000, 21300000]
                        }]
                    }
                }],
                "error": null
            }
        }"#;

        let series = parse(body).unwrap();
        assert!(series.dates()[0] < series.dates()[1]);
        assert_eq!(series.close().unwrap()[0], Some(140.4));
    }

    #[test]
    fn test_parse_misaligned_array_rejected() {
        let body = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1704153600, 1704240000],
                    "indicators": {
                        "quote": [{
                            "close": [140.4]
                        }]
                    }
                }],
                "error": null
            }
        }"#;
        assert!(matches!(parse(body), Err(Error::Parse(_))));
    }
}
