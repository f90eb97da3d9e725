use chrono::NaiveDate;

use crate::models::BaseColumn;
use crate::services::quality;

pub fn run(symbol: &str, start: NaiveDate, end: NaiveDate, key_cols: Option<Vec<BaseColumn>>) {
    let series = super::load_or_exit(symbol, start, end);

    println!("\n🔍 Checking data quality for {}...", symbol);
    let report = quality::check(&series, key_cols.as_deref());
    report.print();
}
