pub mod analyze;
pub mod chart;
pub mod check;
pub mod inspect;

use chrono::NaiveDate;

use crate::error::{Error, Result};
use crate::models::PriceSeries;
use crate::services::yahoo::YahooClient;

/// Fetch a daily series, blocking on a fresh runtime. Commands stay
/// synchronous; the network call is the only async step.
pub(crate) fn fetch_series(symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries> {
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| Error::Network(format!("Failed to create runtime: {}", e)))?;

    runtime.block_on(async {
        let client = YahooClient::new()?;
        client.fetch_daily(symbol, start, end).await
    })
}

/// Fetch with console progress, exiting the process on failure.
pub(crate) fn load_or_exit(symbol: &str, start: NaiveDate, end: NaiveDate) -> PriceSeries {
    println!("📥 Loading {} history ({} to {})...", symbol, start, end);
    match fetch_series(symbol, start, end) {
        Ok(series) => {
            if series.is_empty() {
                println!("⚠️  Provider returned no rows for {}", symbol);
            } else {
                println!("✅ Loaded {} rows", series.len());
            }
            series
        }
        Err(e) => {
            eprintln!("❌ Failed to load data: {}", e);
            std::process::exit(1);
        }
    }
}
