use std::fmt;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::ValueEnum;

use crate::charts;
use crate::error::Result;
use crate::models::PriceSeries;
use crate::utils::charts_dir;

/// Which chart set to render
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ChartKind {
    All,
    Price,
    Sma,
    Macd,
    Rsi,
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChartKind::All => "all",
            ChartKind::Price => "price",
            ChartKind::Sma => "sma",
            ChartKind::Macd => "macd",
            ChartKind::Rsi => "rsi",
        };
        write!(f, "{}", name)
    }
}

pub fn run(
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
    out: Option<PathBuf>,
    sma_periods: Vec<u32>,
    rsi_period: u32,
    kind: ChartKind,
) {
    let mut series = super::load_or_exit(symbol, start, end);
    if series.is_empty() {
        println!("⚠️  Nothing to chart");
        return;
    }

    let out_dir = out.unwrap_or_else(charts_dir);
    if let Err(e) = std::fs::create_dir_all(&out_dir) {
        eprintln!("❌ Failed to create {}: {}", out_dir.display(), e);
        std::process::exit(1);
    }

    match render(&mut series, &out_dir, &sma_periods, rsi_period, kind) {
        Ok(()) => println!("✅ Charts written to {}", out_dir.display()),
        Err(e) => {
            eprintln!("❌ Chart rendering failed: {}", e);
            std::process::exit(1);
        }
    }
}

fn render(
    series: &mut PriceSeries,
    out_dir: &Path,
    sma_periods: &[u32],
    rsi_period: u32,
    kind: ChartKind,
) -> Result<()> {
    if matches!(kind, ChartKind::All | ChartKind::Price) {
        charts::render_price_charts(series, out_dir)?;
    }
    if matches!(kind, ChartKind::All | ChartKind::Sma) {
        for period in sma_periods {
            series.calculate_sma(*period)?;
        }
        charts::render_price_with_smas(series, out_dir)?;
    }
    if matches!(kind, ChartKind::All | ChartKind::Macd) {
        charts::render_macd(series, out_dir)?;
    }
    if matches!(kind, ChartKind::All | ChartKind::Rsi) {
        charts::render_rsi(series, rsi_period, out_dir)?;
    }
    Ok(())
}
