use clap::{Parser, Subcommand};
use chrono::NaiveDate;
use std::path::PathBuf;

use crate::commands;
use crate::commands::chart::ChartKind;
use crate::constants::{
    DEFAULT_END_DATE, DEFAULT_RSI_PERIOD, DEFAULT_SMA_PERIODS, DEFAULT_START_DATE,
};
use crate::models::BaseColumn;

#[derive(Parser)]
#[command(name = "nova-insights")]
#[command(about = "Equity price history insights CLI", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show dataset shape, head/tail and sample rows
    Inspect {
        /// Ticker symbol (e.g. GOOG)
        symbol: String,
        /// Start date, inclusive (YYYY-MM-DD)
        #[arg(long, default_value = DEFAULT_START_DATE)]
        start: NaiveDate,
        /// End date, exclusive (YYYY-MM-DD)
        #[arg(long, default_value = DEFAULT_END_DATE)]
        end: NaiveDate,
    },
    /// Run data-quality checks and print the findings
    Check {
        /// Ticker symbol (e.g. GOOG)
        symbol: String,
        /// Start date, inclusive (YYYY-MM-DD)
        #[arg(long, default_value = DEFAULT_START_DATE)]
        start: NaiveDate,
        /// End date, exclusive (YYYY-MM-DD)
        #[arg(long, default_value = DEFAULT_END_DATE)]
        end: NaiveDate,
        /// Key columns that every row must have values for
        /// (default: Close, Open, High, Volume)
        #[arg(long, value_delimiter = ',')]
        key_cols: Option<Vec<BaseColumn>>,
    },
    /// Render charts (price, SMA overlay, MACD, RSI)
    Chart {
        /// Ticker symbol (e.g. GOOG)
        symbol: String,
        /// Start date, inclusive (YYYY-MM-DD)
        #[arg(long, default_value = DEFAULT_START_DATE)]
        start: NaiveDate,
        /// End date, exclusive (YYYY-MM-DD)
        #[arg(long, default_value = DEFAULT_END_DATE)]
        end: NaiveDate,
        /// Output directory (default: CHARTS_DIR env or ./charts)
        #[arg(long)]
        out: Option<PathBuf>,
        /// SMA periods overlaid on the price chart
        #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_SMA_PERIODS.iter().copied())]
        sma: Vec<u32>,
        /// RSI lookback period
        #[arg(long, default_value_t = DEFAULT_RSI_PERIOD)]
        rsi_period: u32,
        /// Which chart set to render
        #[arg(long, value_enum, default_value_t = ChartKind::All)]
        kind: ChartKind,
    },
    /// Full pipeline: inspect, quality checks, indicators, charts
    Analyze {
        /// Ticker symbol (e.g. GOOG)
        symbol: String,
        /// Start date, inclusive (YYYY-MM-DD)
        #[arg(long, default_value = DEFAULT_START_DATE)]
        start: NaiveDate,
        /// End date, exclusive (YYYY-MM-DD)
        #[arg(long, default_value = DEFAULT_END_DATE)]
        end: NaiveDate,
        /// Output directory (default: CHARTS_DIR env or ./charts)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

pub fn run() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect { symbol, start, end } => {
            commands::inspect::run(&symbol, start, end);
        }
        Commands::Check {
            symbol,
            start,
            end,
            key_cols,
        } => {
            commands::check::run(&symbol, start, end, key_cols);
        }
        Commands::Chart {
            symbol,
            start,
            end,
            out,
            sma,
            rsi_period,
            kind,
        } => {
            commands::chart::run(&symbol, start, end, out, sma, rsi_period, kind);
        }
        Commands::Analyze {
            symbol,
            start,
            end,
            out,
        } => {
            commands::analyze::run(&symbol, start, end, out);
        }
    }
}
