use chrono::NaiveDate;
use rand::seq::SliceRandom;

use crate::constants::INSPECT_ROWS;
use crate::models::PriceSeries;

pub fn run(symbol: &str, start: NaiveDate, end: NaiveDate) {
    let series = super::load_or_exit(symbol, start, end);
    print_overview(&series);
}

/// Dataset shape, head/tail/sample rows and per-column summary
pub(crate) fn print_overview(series: &PriceSeries) {
    println!(
        "\n📌 Dataset shape: {} rows x {} columns",
        series.len(),
        series.column_count()
    );
    if series.is_empty() {
        return;
    }

    let rows = series.len();

    let head: Vec<usize> = (0..rows.min(INSPECT_ROWS)).collect();
    println!("\n📌 First {} rows:", head.len());
    print_rows(series, &head);

    let tail: Vec<usize> = (rows.saturating_sub(INSPECT_ROWS)..rows).collect();
    println!("\n📌 Last {} rows:", tail.len());
    print_rows(series, &tail);

    let indices: Vec<usize> = (0..rows).collect();
    let sample: Vec<usize> = indices
        .choose_multiple(&mut rand::thread_rng(), INSPECT_ROWS)
        .copied()
        .collect();
    println!("\n📌 Random {} rows:", sample.len());
    print_rows(series, &sample);

    println!("\n📌 Columns:");
    for view in series.columns() {
        println!(
            "   {:<14} {:>6} non-null  {}",
            view.name,
            rows - view.data.missing(),
            view.data.type_name()
        );
    }
}

fn print_rows(series: &PriceSeries, indices: &[usize]) {
    println!(
        "   {:<12} {:>10} {:>10} {:>10} {:>10} {:>12}",
        "Date", "Open", "High", "Low", "Close", "Volume"
    );
    for &index in indices {
        if let Some(bar) = series.bar(index) {
            println!(
                "   {:<12} {:>10} {:>10} {:>10} {:>10} {:>12}",
                bar.date.to_string(),
                float_cell(bar.open),
                float_cell(bar.high),
                float_cell(bar.low),
                float_cell(bar.close),
                int_cell(bar.volume),
            );
        }
    }
}

fn float_cell(cell: Option<f64>) -> String {
    cell.map(|value| format!("{:.2}", value))
        .unwrap_or_else(|| "-".to_string())
}

fn int_cell(cell: Option<u64>) -> String {
    cell.map(|value| value.to_string())
        .unwrap_or_else(|| "-".to_string())
}
