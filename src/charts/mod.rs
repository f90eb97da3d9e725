//! Chart rendering.
//!
//! Every function writes a 1280x720 PNG under the given output directory
//! and returns nothing but errors: the file on disk is the output. Charts
//! follow the analysis set: one line chart per base column, a Close plus
//! moving-average overlay, MACD with histogram, and RSI with the 30/70
//! reference levels.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use tracing::{info, warn};

use crate::constants::{RSI_OVERBOUGHT, RSI_OVERSOLD};
use crate::error::{Error, Result};
use crate::models::{Indicator, PriceSeries};

const CHART_SIZE: (u32, u32) = (1280, 720);

const SMA_COLORS: &[RGBColor] = &[
    RGBColor(214, 39, 40),
    RGBColor(44, 160, 44),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
];

const SIGNAL_ORANGE: RGBColor = RGBColor(255, 140, 0);
const HISTOGRAM_GRAY: RGBColor = RGBColor(128, 128, 128);

fn chart_err(e: impl std::fmt::Display) -> Error {
    Error::Chart(e.to_string())
}

fn chart_path(out_dir: &Path, symbol: &str, name: &str) -> PathBuf {
    out_dir.join(format!("{}_{}.png", symbol.to_lowercase(), name))
}

/// Pair each date with its defined value, dropping missing cells
fn defined_points(dates: &[NaiveDate], cells: &[Option<f64>]) -> Vec<(NaiveDate, f64)> {
    dates
        .iter()
        .zip(cells.iter())
        .filter_map(|(date, cell)| cell.map(|value| (*date, value)))
        .collect()
}

/// Min/max over the values with a 5% margin on both sides
fn padded_bounds(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), v| {
        (min.min(v), max.max(v))
    });
    if min > max {
        return None;
    }
    let pad = if max > min {
        (max - min) * 0.05
    } else {
        max.abs() * 0.05 + 1.0
    };
    Some((min - pad, max + pad))
}

/// One line chart of a single column
fn draw_line_chart(
    path: &Path,
    title: &str,
    y_desc: &str,
    points: &[(NaiveDate, f64)],
    color: &RGBColor,
) -> Result<()> {
    if points.len() < 2 {
        warn!(path = %path.display(), "Not enough defined values to chart, skipping");
        return Ok(());
    }
    let (y_min, y_max) = padded_bounds(points.iter().map(|(_, v)| *v))
        .ok_or_else(|| Error::Chart("no values to chart".to_string()))?;

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 28))
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(points[0].0..points[points.len() - 1].0, y_min..y_max)
        .map_err(chart_err)?;

    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc(y_desc)
        .x_labels(8)
        .draw()
        .map_err(chart_err)?;

    chart
        .draw_series(LineSeries::new(points.iter().copied(), color))
        .map_err(chart_err)?;

    root.present().map_err(chart_err)?;
    info!(path = %path.display(), "Rendered chart");
    Ok(())
}

/// Line charts for Close, Volume, High, Low and Open. Close is required;
/// the other columns are skipped when absent.
pub fn render_price_charts(series: &PriceSeries, out_dir: &Path) -> Result<()> {
    let symbol = series.symbol();
    let dates = series.dates();

    let close = series.close().ok_or(Error::MissingColumn("Close"))?;
    draw_line_chart(
        &chart_path(out_dir, symbol, "close"),
        &format!("{} Close Price", symbol),
        "Price ($)",
        &defined_points(dates, close),
        &BLUE,
    )?;

    if let Some(volume) = series.volume() {
        let points: Vec<(NaiveDate, f64)> = dates
            .iter()
            .zip(volume.iter())
            .filter_map(|(date, cell)| cell.map(|v| (*date, v as f64)))
            .collect();
        draw_line_chart(
            &chart_path(out_dir, symbol, "volume"),
            &format!("{} Daily Volume", symbol),
            "Shares Traded",
            &points,
            &BLUE,
        )?;
    }

    if let Some(high) = series.high() {
        draw_line_chart(
            &chart_path(out_dir, symbol, "high"),
            &format!("{} High Price", symbol),
            "Price ($)",
            &defined_points(dates, high),
            &BLUE,
        )?;
    }

    if let Some(low) = series.low() {
        draw_line_chart(
            &chart_path(out_dir, symbol, "low"),
            &format!("{} Low Price", symbol),
            "Price ($)",
            &defined_points(dates, low),
            &BLUE,
        )?;
    }

    if let Some(open) = series.open() {
        draw_line_chart(
            &chart_path(out_dir, symbol, "open"),
            &format!("{} Open Price", symbol),
            "Price ($)",
            &defined_points(dates, open),
            &BLUE,
        )?;
    }

    Ok(())
}

/// Close price with a dashed overlay per calculated SMA column. SMAs are
/// plotted only if already present on the series.
pub fn render_price_with_smas(series: &PriceSeries, out_dir: &Path) -> Result<()> {
    let symbol = series.symbol();
    let dates = series.dates();
    let close = series.close().ok_or(Error::MissingColumn("Close"))?;

    let price_points = defined_points(dates, close);
    if price_points.len() < 2 {
        warn!(symbol, "Not enough defined values to chart, skipping");
        return Ok(());
    }

    let smas = series.sma_columns();
    let all_values = price_points
        .iter()
        .map(|(_, v)| *v)
        .chain(smas.iter().flat_map(|(_, cells)| cells.iter().flatten().copied()));
    let (y_min, y_max) =
        padded_bounds(all_values).ok_or_else(|| Error::Chart("no values to chart".to_string()))?;

    let path = chart_path(out_dir, symbol, "price_sma");
    let root = BitMapBackend::new(&path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("{} Price & Moving Averages", symbol),
            ("sans-serif", 28),
        )
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(
            price_points[0].0..price_points[price_points.len() - 1].0,
            y_min..y_max,
        )
        .map_err(chart_err)?;

    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc("Price ($)")
        .x_labels(8)
        .draw()
        .map_err(chart_err)?;

    chart
        .draw_series(LineSeries::new(price_points.iter().copied(), &BLACK))
        .map_err(chart_err)?
        .label("Price")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLACK));

    for (slot, (period, cells)) in smas.iter().enumerate() {
        let color = SMA_COLORS[slot % SMA_COLORS.len()];
        chart
            .draw_series(DashedLineSeries::new(
                defined_points(dates, cells),
                6,
                4,
                color.stroke_width(2),
            ))
            .map_err(chart_err)?
            .label(format!("SMA {}", period))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(chart_err)?;

    root.present().map_err(chart_err)?;
    info!(path = %path.display(), "Rendered chart");
    Ok(())
}

/// MACD line, signal line and histogram. Calculates the MACD columns
/// first if the series does not have them yet.
pub fn render_macd(series: &mut PriceSeries, out_dir: &Path) -> Result<()> {
    if !series.has_indicator(Indicator::Macd) {
        series.calculate_macd()?;
    }

    let symbol = series.symbol().to_string();
    let dates = series.dates();
    let line = series.indicator(Indicator::Macd).unwrap_or_default();
    let signal = series.indicator(Indicator::MacdSignal).unwrap_or_default();
    let histogram = series.indicator(Indicator::MacdHist).unwrap_or_default();

    let line_points = defined_points(dates, line);
    if line_points.len() < 2 {
        warn!(symbol, "Not enough defined values to chart, skipping");
        return Ok(());
    }
    let signal_points = defined_points(dates, signal);
    let histogram_points = defined_points(dates, histogram);

    let all_values = line_points
        .iter()
        .chain(signal_points.iter())
        .chain(histogram_points.iter())
        .map(|(_, v)| *v)
        .chain(std::iter::once(0.0));
    let (y_min, y_max) =
        padded_bounds(all_values).ok_or_else(|| Error::Chart("no values to chart".to_string()))?;

    let path = chart_path(out_dir, &symbol, "macd");
    let root = BitMapBackend::new(&path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("{} MACD", symbol), ("sans-serif", 28))
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(
            line_points[0].0..line_points[line_points.len() - 1].0,
            y_min..y_max,
        )
        .map_err(chart_err)?;

    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc("MACD value")
        .x_labels(8)
        .draw()
        .map_err(chart_err)?;

    chart
        .draw_series(histogram_points.iter().map(|(date, value)| {
            let next = date.succ_opt().unwrap_or(*date);
            Rectangle::new([(*date, 0.0), (next, *value)], HISTOGRAM_GRAY.filled())
        }))
        .map_err(chart_err)?
        .label("Histogram")
        .legend(|(x, y)| Rectangle::new([(x, y - 4), (x + 12, y + 4)], HISTOGRAM_GRAY.filled()));

    chart
        .draw_series(LineSeries::new(line_points.iter().copied(), &BLUE))
        .map_err(chart_err)?
        .label("MACD")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));

    chart
        .draw_series(LineSeries::new(signal_points.iter().copied(), &SIGNAL_ORANGE))
        .map_err(chart_err)?
        .label("Signal")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], SIGNAL_ORANGE));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(chart_err)?;

    root.present().map_err(chart_err)?;
    info!(path = %path.display(), "Rendered chart");
    Ok(())
}

/// RSI line with overbought/oversold reference levels. Calculates the
/// RSI column first if the series does not have it yet.
pub fn render_rsi(series: &mut PriceSeries, period: u32, out_dir: &Path) -> Result<()> {
    let indicator = Indicator::Rsi(period);
    if !series.has_indicator(indicator) {
        series.calculate_rsi(period)?;
    }

    let symbol = series.symbol().to_string();
    let dates = series.dates();
    let cells = series.indicator(indicator).unwrap_or_default();

    let points = defined_points(dates, cells);
    if points.len() < 2 {
        warn!(symbol, "Not enough defined values to chart, skipping");
        return Ok(());
    }

    let path = chart_path(out_dir, &symbol, &format!("rsi_{}", period));
    let root = BitMapBackend::new(&path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    let x_range = points[0].0..points[points.len() - 1].0;
    let mut chart = ChartBuilder::on(&root)
        .caption(format!("{} RSI({})", symbol, period), ("sans-serif", 28))
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range.clone(), 0.0..100.0)
        .map_err(chart_err)?;

    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc("RSI value")
        .x_labels(8)
        .draw()
        .map_err(chart_err)?;

    chart
        .draw_series(LineSeries::new(points.iter().copied(), &BLUE))
        .map_err(chart_err)?
        .label(format!("RSI {}", period))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));

    chart
        .draw_series(DashedLineSeries::new(
            vec![(x_range.start, RSI_OVERBOUGHT), (x_range.end, RSI_OVERBOUGHT)],
            6,
            4,
            RED.stroke_width(1),
        ))
        .map_err(chart_err)?
        .label(format!("Overbought ({})", RSI_OVERBOUGHT as u32))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));

    chart
        .draw_series(DashedLineSeries::new(
            vec![(x_range.start, RSI_OVERSOLD), (x_range.end, RSI_OVERSOLD)],
            6,
            4,
            GREEN.stroke_width(1),
        ))
        .map_err(chart_err)?
        .label(format!("Oversold ({})", RSI_OVERSOLD as u32))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], GREEN));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(chart_err)?;

    root.present().map_err(chart_err)?;
    info!(path = %path.display(), "Rendered chart");
    Ok(())
}
