use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One trading day of a price series.
///
/// Cells are optional: a provider can return a row with individual values
/// missing, and those gaps are what the quality checker reports on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    /// Trading date of the row
    pub date: NaiveDate,

    /// Opening price
    pub open: Option<f64>,

    /// Highest price
    pub high: Option<f64>,

    /// Lowest price
    pub low: Option<f64>,

    /// Closing price
    pub close: Option<f64>,

    /// Trading volume (number of shares)
    pub volume: Option<u64>,

    /// Optional ticker symbol tag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
}

impl PriceBar {
    /// Create a fully populated bar without a symbol tag
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Self {
        Self {
            date,
            open: Some(open),
            high: Some(high),
            low: Some(low),
            close: Some(close),
            volume: Some(volume),
            symbol: None,
        }
    }

    /// Create a fully populated bar tagged with its ticker symbol
    pub fn with_symbol(
        date: NaiveDate,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
        symbol: String,
    ) -> Self {
        Self {
            date,
            open: Some(open),
            high: Some(high),
            low: Some(low),
            close: Some(close),
            volume: Some(volume),
            symbol: Some(symbol),
        }
    }
}
