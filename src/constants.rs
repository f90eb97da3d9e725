//! Defaults and thresholds shared across commands.

/// Default start of the analysis window when none is given on the CLI.
pub const DEFAULT_START_DATE: &str = "2009-01-01";

/// Default end of the analysis window when none is given on the CLI.
pub const DEFAULT_END_DATE: &str = "2023-12-29";

/// SMA periods computed and overlaid on the price chart by default.
pub const DEFAULT_SMA_PERIODS: &[u32] = &[20, 50];

/// Default RSI lookback period.
pub const DEFAULT_RSI_PERIOD: u32 = 14;

/// Standard MACD parameters (fast EMA, slow EMA, signal EMA).
pub const MACD_FAST_PERIOD: u32 = 12;
pub const MACD_SLOW_PERIOD: u32 = 26;
pub const MACD_SIGNAL_PERIOD: u32 = 9;

/// Columns whose missing fraction above this percentage is flagged
/// by the quality checker.
pub const HIGH_NULL_THRESHOLD_PCT: f64 = 5.0;

/// RSI reference levels drawn on the RSI chart.
pub const RSI_OVERBOUGHT: f64 = 70.0;
pub const RSI_OVERSOLD: f64 = 30.0;

/// Number of rows shown by each of inspect's head/tail/sample sections.
pub const INSPECT_ROWS: usize = 5;
