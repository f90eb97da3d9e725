use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::constants::{MACD_FAST_PERIOD, MACD_SIGNAL_PERIOD, MACD_SLOW_PERIOD};
use crate::error::{Error, Result};
use crate::models::{indicators, PriceBar};

/// Name of the categorical per-row symbol column.
pub const SYMBOL_COLUMN: &str = "Symbol";

/// One of the provider-supplied columns of a price series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseColumn {
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl BaseColumn {
    pub fn name(&self) -> &'static str {
        match self {
            BaseColumn::Open => "Open",
            BaseColumn::High => "High",
            BaseColumn::Low => "Low",
            BaseColumn::Close => "Close",
            BaseColumn::Volume => "Volume",
        }
    }

    pub fn all() -> &'static [BaseColumn] {
        &[
            BaseColumn::Open,
            BaseColumn::High,
            BaseColumn::Low,
            BaseColumn::Close,
            BaseColumn::Volume,
        ]
    }
}

impl fmt::Display for BaseColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for BaseColumn {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "open" => Ok(BaseColumn::Open),
            "high" => Ok(BaseColumn::High),
            "low" => Ok(BaseColumn::Low),
            "close" => Ok(BaseColumn::Close),
            "volume" => Ok(BaseColumn::Volume),
            _ => Err(format!(
                "unknown column '{}' (expected one of Open, High, Low, Close, Volume)",
                s
            )),
        }
    }
}

/// Key of a derived column. Renders the deterministic column name used in
/// reports and chart legends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Indicator {
    /// Simple moving average over a trailing window
    Sma(u32),
    /// MACD line (fast EMA minus slow EMA)
    Macd,
    /// Signal line (EMA of the MACD line)
    MacdSignal,
    /// MACD histogram (line minus signal)
    MacdHist,
    /// Relative strength index over a trailing window
    Rsi(u32),
}

impl Indicator {
    pub fn column_name(&self) -> String {
        match self {
            Indicator::Sma(period) => format!("SMA_{}", period),
            Indicator::Macd => "MACD".to_string(),
            Indicator::MacdSignal => "MACD_signal".to_string(),
            Indicator::MacdHist => "MACD_hist".to_string(),
            Indicator::Rsi(period) => format!("RSI_{}", period),
        }
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.column_name())
    }
}

/// Borrowed view of one column's cells, typed by what the column holds.
#[derive(Debug, Clone, Copy)]
pub enum ColumnData<'a> {
    Float(&'a [Option<f64>]),
    Int(&'a [Option<u64>]),
    Text(&'a [Option<String>]),
}

impl<'a> ColumnData<'a> {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Float(cells) => cells.len(),
            ColumnData::Int(cells) => cells.len(),
            ColumnData::Text(cells) => cells.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Count of missing cells in the column
    pub fn missing(&self) -> usize {
        match self {
            ColumnData::Float(cells) => cells.iter().filter(|cell| cell.is_none()).count(),
            ColumnData::Int(cells) => cells.iter().filter(|cell| cell.is_none()).count(),
            ColumnData::Text(cells) => cells.iter().filter(|cell| cell.is_none()).count(),
        }
    }

    pub fn is_missing_at(&self, index: usize) -> bool {
        match self {
            ColumnData::Float(cells) => cells[index].is_none(),
            ColumnData::Int(cells) => cells[index].is_none(),
            ColumnData::Text(cells) => cells[index].is_none(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ColumnData::Float(_) => "f64",
            ColumnData::Int(_) => "u64",
            ColumnData::Text(_) => "str",
        }
    }
}

/// A named column view, as iterated by the quality checker.
#[derive(Debug, Clone)]
pub struct ColumnView<'a> {
    pub name: String,
    pub data: ColumnData<'a>,
}

/// Raw column payload handed to [`PriceSeries::new`].
///
/// An absent member models a column the provider did not return at all,
/// as opposed to a present column with missing cells.
#[derive(Debug, Default, Clone)]
pub struct SeriesColumns {
    pub open: Option<Vec<Option<f64>>>,
    pub high: Option<Vec<Option<f64>>>,
    pub low: Option<Vec<Option<f64>>>,
    pub close: Option<Vec<Option<f64>>>,
    pub volume: Option<Vec<Option<u64>>>,
    pub symbols: Option<Vec<Option<String>>>,
}

/// A date-indexed table of prices for one symbol.
///
/// Rows are ordered by date ascending (enforced at construction). Derived
/// indicator columns are appended in place by the `calculate_*` methods
/// and always align index-for-index with the date index.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    symbol: String,
    dates: Vec<NaiveDate>,
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<u64>>>,
    symbols: Option<Vec<Option<String>>>,
    derived: BTreeMap<Indicator, Vec<Option<f64>>>,
}

impl PriceSeries {
    /// Build a series from raw columns, validating alignment and sorting
    /// rows by date ascending.
    pub fn new(
        symbol: impl Into<String>,
        dates: Vec<NaiveDate>,
        columns: SeriesColumns,
    ) -> Result<Self> {
        let rows = dates.len();
        let SeriesColumns {
            open,
            high,
            low,
            close,
            volume,
            symbols,
        } = columns;

        check_len("Open", open.as_ref().map(Vec::len), rows)?;
        check_len("High", high.as_ref().map(Vec::len), rows)?;
        check_len("Low", low.as_ref().map(Vec::len), rows)?;
        check_len("Close", close.as_ref().map(Vec::len), rows)?;
        check_len("Volume", volume.as_ref().map(Vec::len), rows)?;
        check_len(SYMBOL_COLUMN, symbols.as_ref().map(Vec::len), rows)?;

        let mut series = Self {
            symbol: symbol.into(),
            dates,
            open,
            high,
            low,
            close,
            volume,
            symbols,
            derived: BTreeMap::new(),
        };
        series.sort_by_date();
        Ok(series)
    }

    /// An empty series: zero rows, all base columns present.
    pub fn empty(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            dates: Vec::new(),
            open: Some(Vec::new()),
            high: Some(Vec::new()),
            low: Some(Vec::new()),
            close: Some(Vec::new()),
            volume: Some(Vec::new()),
            symbols: None,
            derived: BTreeMap::new(),
        }
    }

    /// Build a series from assembled rows. All base columns come out
    /// present; the symbol column only if at least one bar carries a tag.
    pub fn from_bars(symbol: impl Into<String>, bars: Vec<PriceBar>) -> Self {
        let tagged = bars.iter().any(|bar| bar.symbol.is_some());
        let mut series = Self {
            symbol: symbol.into(),
            dates: bars.iter().map(|bar| bar.date).collect(),
            open: Some(bars.iter().map(|bar| bar.open).collect()),
            high: Some(bars.iter().map(|bar| bar.high).collect()),
            low: Some(bars.iter().map(|bar| bar.low).collect()),
            close: Some(bars.iter().map(|bar| bar.close).collect()),
            volume: Some(bars.iter().map(|bar| bar.volume).collect()),
            symbols: if tagged {
                Some(bars.iter().map(|bar| bar.symbol.clone()).collect())
            } else {
                None
            },
            derived: BTreeMap::new(),
        };
        series.sort_by_date();
        series
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn open(&self) -> Option<&[Option<f64>]> {
        self.open.as_deref()
    }

    pub fn high(&self) -> Option<&[Option<f64>]> {
        self.high.as_deref()
    }

    pub fn low(&self) -> Option<&[Option<f64>]> {
        self.low.as_deref()
    }

    pub fn close(&self) -> Option<&[Option<f64>]> {
        self.close.as_deref()
    }

    pub fn volume(&self) -> Option<&[Option<u64>]> {
        self.volume.as_deref()
    }

    pub fn symbols(&self) -> Option<&[Option<String>]> {
        self.symbols.as_deref()
    }

    /// Cells of a derived column, if it has been calculated
    pub fn indicator(&self, indicator: Indicator) -> Option<&[Option<f64>]> {
        self.derived.get(&indicator).map(Vec::as_slice)
    }

    pub fn has_indicator(&self, indicator: Indicator) -> bool {
        self.derived.contains_key(&indicator)
    }

    /// All calculated SMA columns, ordered by period
    pub fn sma_columns(&self) -> Vec<(u32, &[Option<f64>])> {
        self.derived
            .iter()
            .filter_map(|(indicator, cells)| match indicator {
                Indicator::Sma(period) => Some((*period, cells.as_slice())),
                _ => None,
            })
            .collect()
    }

    /// Typed access to one base column, absent when the provider never
    /// returned it.
    pub fn base_column(&self, column: BaseColumn) -> Option<ColumnData<'_>> {
        match column {
            BaseColumn::Open => self.open.as_deref().map(ColumnData::Float),
            BaseColumn::High => self.high.as_deref().map(ColumnData::Float),
            BaseColumn::Low => self.low.as_deref().map(ColumnData::Float),
            BaseColumn::Close => self.close.as_deref().map(ColumnData::Float),
            BaseColumn::Volume => self.volume.as_deref().map(ColumnData::Int),
        }
    }

    /// All present columns in stable order: base, symbol tag, derived.
    pub fn columns(&self) -> Vec<ColumnView<'_>> {
        let mut views = Vec::new();
        for column in BaseColumn::all() {
            if let Some(data) = self.base_column(*column) {
                views.push(ColumnView {
                    name: column.name().to_string(),
                    data,
                });
            }
        }
        if let Some(cells) = &self.symbols {
            views.push(ColumnView {
                name: SYMBOL_COLUMN.to_string(),
                data: ColumnData::Text(cells),
            });
        }
        for (indicator, cells) in &self.derived {
            views.push(ColumnView {
                name: indicator.column_name(),
                data: ColumnData::Float(cells),
            });
        }
        views
    }

    pub fn column_count(&self) -> usize {
        self.columns().len()
    }

    /// Assemble one row for display. Derived columns are not included.
    pub fn bar(&self, index: usize) -> Option<PriceBar> {
        let date = *self.dates.get(index)?;
        Some(PriceBar {
            date,
            open: self.open.as_ref().and_then(|cells| cells[index]),
            high: self.high.as_ref().and_then(|cells| cells[index]),
            low: self.low.as_ref().and_then(|cells| cells[index]),
            close: self.close.as_ref().and_then(|cells| cells[index]),
            volume: self.volume.as_ref().and_then(|cells| cells[index]),
            symbol: self.symbols.as_ref().and_then(|cells| cells[index].clone()),
        })
    }

    /// Calculate and append `SMA_{period}` from the Close column
    pub fn calculate_sma(&mut self, period: u32) -> Result<()> {
        ensure_period(period)?;
        let cells = indicators::sma(self.require_close()?, period as usize);
        self.derived.insert(Indicator::Sma(period), cells);
        Ok(())
    }

    /// Calculate and append `MACD`, `MACD_signal` and `MACD_hist` from the
    /// Close column using the standard 12/26/9 parameters
    pub fn calculate_macd(&mut self) -> Result<()> {
        let (line, signal, histogram) = indicators::macd(
            self.require_close()?,
            MACD_FAST_PERIOD as usize,
            MACD_SLOW_PERIOD as usize,
            MACD_SIGNAL_PERIOD as usize,
        );
        self.derived.insert(Indicator::Macd, line);
        self.derived.insert(Indicator::MacdSignal, signal);
        self.derived.insert(Indicator::MacdHist, histogram);
        Ok(())
    }

    /// Calculate and append `RSI_{period}` from the Close column
    pub fn calculate_rsi(&mut self, period: u32) -> Result<()> {
        ensure_period(period)?;
        let cells = indicators::rsi(self.require_close()?, period as usize);
        self.derived.insert(Indicator::Rsi(period), cells);
        Ok(())
    }

    fn require_close(&self) -> Result<&[Option<f64>]> {
        self.close.as_deref().ok_or(Error::MissingColumn("Close"))
    }

    fn sort_by_date(&mut self) {
        if self.dates.windows(2).all(|pair| pair[0] <= pair[1]) {
            return;
        }

        let mut order: Vec<usize> = (0..self.dates.len()).collect();
        order.sort_by_key(|&i| self.dates[i]);

        self.dates = order.iter().map(|&i| self.dates[i]).collect();
        reorder(&mut self.open, &order);
        reorder(&mut self.high, &order);
        reorder(&mut self.low, &order);
        reorder(&mut self.close, &order);
        reorder(&mut self.volume, &order);
        reorder(&mut self.symbols, &order);
    }
}

fn reorder<T: Clone>(column: &mut Option<Vec<T>>, order: &[usize]) {
    if let Some(cells) = column {
        *cells = order.iter().map(|&i| cells[i].clone()).collect();
    }
}

fn check_len(name: &str, len: Option<usize>, rows: usize) -> Result<()> {
    match len {
        Some(len) if len != rows => Err(Error::InvalidInput(format!(
            "column {} has {} entries for {} rows",
            name, len, rows
        ))),
        _ => Ok(()),
    }
}

fn ensure_period(period: u32) -> Result<()> {
    if period == 0 {
        Err(Error::InvalidInput(
            "indicator period must be positive".to_string(),
        ))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn bars(closes: &[f64]) -> Vec<PriceBar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| {
                PriceBar::new(
                    date("2024-01-01") + chrono::Duration::days(i as i64),
                    close,
                    close + 1.0,
                    close - 1.0,
                    close,
                    1_000,
                )
            })
            .collect()
    }

    #[test]
    fn test_sma_column_matches_example() {
        let mut series = PriceSeries::from_bars("TEST", bars(&[10.0, 11.0, 12.0, 13.0, 14.0]));
        series.calculate_sma(3).unwrap();

        let cells = series.indicator(Indicator::Sma(3)).unwrap();
        assert_eq!(cells.len(), series.len());
        assert_eq!(
            cells,
            &[None, None, Some(11.0), Some(12.0), Some(13.0)][..]
        );
    }

    #[test]
    fn test_missing_close_rejected_by_all_indicators() {
        let dates = vec![date("2024-01-02"), date("2024-01-03")];
        let columns = SeriesColumns {
            open: Some(vec![Some(1.0), Some(2.0)]),
            high: Some(vec![Some(2.0), Some(3.0)]),
            ..SeriesColumns::default()
        };
        let mut series = PriceSeries::new("TEST", dates, columns).unwrap();

        assert!(matches!(
            series.calculate_sma(3),
            Err(Error::MissingColumn("Close"))
        ));
        assert!(matches!(
            series.calculate_macd(),
            Err(Error::MissingColumn("Close"))
        ));
        assert!(matches!(
            series.calculate_rsi(14),
            Err(Error::MissingColumn("Close"))
        ));
    }

    #[test]
    fn test_zero_period_rejected() {
        let mut series = PriceSeries::from_bars("TEST", bars(&[10.0, 11.0]));
        assert!(matches!(
            series.calculate_sma(0),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            series.calculate_rsi(0),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_rows_sorted_ascending_on_construction() {
        let dates = vec![date("2024-01-05"), date("2024-01-03"), date("2024-01-04")];
        let columns = SeriesColumns {
            close: Some(vec![Some(5.0), Some(3.0), Some(4.0)]),
            ..SeriesColumns::default()
        };
        let series = PriceSeries::new("TEST", dates, columns).unwrap();

        assert_eq!(
            series.dates(),
            &[date("2024-01-03"), date("2024-01-04"), date("2024-01-05")][..]
        );
        assert_eq!(
            series.close().unwrap(),
            &[Some(3.0), Some(4.0), Some(5.0)][..]
        );
    }

    #[test]
    fn test_misaligned_column_rejected() {
        let dates = vec![date("2024-01-02")];
        let columns = SeriesColumns {
            close: Some(vec![Some(1.0), Some(2.0)]),
            ..SeriesColumns::default()
        };
        assert!(matches!(
            PriceSeries::new("TEST", dates, columns),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_column_names_are_deterministic() {
        assert_eq!(Indicator::Sma(20).column_name(), "SMA_20");
        assert_eq!(Indicator::Macd.column_name(), "MACD");
        assert_eq!(Indicator::MacdSignal.column_name(), "MACD_signal");
        assert_eq!(Indicator::MacdHist.column_name(), "MACD_hist");
        assert_eq!(Indicator::Rsi(14).column_name(), "RSI_14");
    }

    #[test]
    fn test_macd_appends_three_aligned_columns() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let mut series = PriceSeries::from_bars("TEST", bars(&closes));
        series.calculate_macd().unwrap();

        for indicator in [Indicator::Macd, Indicator::MacdSignal, Indicator::MacdHist] {
            let cells = series.indicator(indicator).unwrap();
            assert_eq!(cells.len(), series.len());
        }
        assert_eq!(series.column_count(), 5 + 3);
    }

    #[test]
    fn test_recalculating_replaces_column() {
        let mut series = PriceSeries::from_bars("TEST", bars(&[10.0, 11.0, 12.0, 13.0]));
        series.calculate_sma(2).unwrap();
        series.calculate_sma(2).unwrap();

        assert_eq!(series.sma_columns().len(), 1);
    }

    #[test]
    fn test_empty_series() {
        let mut series = PriceSeries::empty("TEST");
        assert!(series.is_empty());
        series.calculate_sma(3).unwrap();
        assert_eq!(series.indicator(Indicator::Sma(3)).unwrap().len(), 0);
    }
}
