use std::path::PathBuf;

use chrono::NaiveDate;

use crate::charts;
use crate::constants::{DEFAULT_RSI_PERIOD, DEFAULT_SMA_PERIODS};
use crate::error::Result;
use crate::models::Indicator;
use crate::services::quality;
use crate::utils::charts_dir;

/// The full pipeline: load, inspect, quality checks, indicators, charts.
pub fn run(symbol: &str, start: NaiveDate, end: NaiveDate, out: Option<PathBuf>) {
    let mut series = super::load_or_exit(symbol, start, end);

    super::inspect::print_overview(&series);

    println!("\n🔍 Data quality:");
    quality::check(&series, None).print();

    if series.is_empty() {
        println!("\n⚠️  No rows, skipping indicators and charts");
        return;
    }

    println!("\n🧮 Calculating indicators...");
    let computed: Result<()> = (|| {
        for period in DEFAULT_SMA_PERIODS {
            series.calculate_sma(*period)?;
        }
        series.calculate_macd()?;
        series.calculate_rsi(DEFAULT_RSI_PERIOD)?;
        Ok(())
    })();
    if let Err(e) = computed {
        eprintln!("❌ Indicator calculation failed: {}", e);
        std::process::exit(1);
    }

    let added: Vec<String> = DEFAULT_SMA_PERIODS
        .iter()
        .map(|period| Indicator::Sma(*period))
        .chain([
            Indicator::Macd,
            Indicator::MacdSignal,
            Indicator::MacdHist,
            Indicator::Rsi(DEFAULT_RSI_PERIOD),
        ])
        .map(|indicator| indicator.column_name())
        .collect();
    println!("✅ Added columns: {}", added.join(", "));

    let out_dir = out.unwrap_or_else(charts_dir);
    if let Err(e) = std::fs::create_dir_all(&out_dir) {
        eprintln!("❌ Failed to create {}: {}", out_dir.display(), e);
        std::process::exit(1);
    }

    println!("\n📈 Rendering charts...");
    let rendered: Result<()> = (|| {
        charts::render_price_charts(&series, &out_dir)?;
        charts::render_price_with_smas(&series, &out_dir)?;
        charts::render_macd(&mut series, &out_dir)?;
        charts::render_rsi(&mut series, DEFAULT_RSI_PERIOD, &out_dir)?;
        Ok(())
    })();
    match rendered {
        Ok(()) => println!("✅ Charts written to {}", out_dir.display()),
        Err(e) => {
            eprintln!("❌ Chart rendering failed: {}", e);
            std::process::exit(1);
        }
    }
}
