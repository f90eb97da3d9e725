//! Data-quality checks over a price series.
//!
//! Read-only: produces a structured [`QualityReport`]; printing is a
//! separate concern so commands decide what reaches the console.

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::constants::HIGH_NULL_THRESHOLD_PCT;
use crate::models::{BaseColumn, ColumnData, ColumnView, PriceSeries};

/// Key columns checked for row-level completeness when none are given.
pub const DEFAULT_KEY_COLUMNS: &[BaseColumn] = &[
    BaseColumn::Close,
    BaseColumn::Open,
    BaseColumn::High,
    BaseColumn::Volume,
];

/// Missing-value tally for one column
#[derive(Debug, Clone)]
pub struct ColumnMissing {
    pub column: String,
    pub missing: usize,
    pub pct: f64,
}

/// Findings of one quality check run
#[derive(Debug, Clone)]
pub struct QualityReport {
    pub rows: usize,
    /// Missing-value tally for every present column
    pub missing_per_column: Vec<ColumnMissing>,
    /// Columns whose missing fraction exceeds the threshold
    pub high_null_columns: Vec<ColumnMissing>,
    /// The requested key columns that actually exist in the table
    pub checked_key_columns: Vec<BaseColumn>,
    /// Rows where at least one key column is missing a value
    pub incomplete_key_rows: Vec<(usize, NaiveDate)>,
    /// Rows that exactly duplicate an earlier row (date index excluded)
    pub duplicate_rows: usize,
    /// Distinct non-null value count per categorical column
    pub cardinality: Vec<(String, usize)>,
}

impl QualityReport {
    pub fn total_issues(&self) -> usize {
        self.high_null_columns.len() + self.incomplete_key_rows.len() + self.duplicate_rows
    }

    pub fn is_clean(&self) -> bool {
        self.total_issues() == 0
    }

    /// Render the findings to the console
    pub fn print(&self) {
        println!("\n📌 Missing values per column:");
        for entry in &self.missing_per_column {
            println!("   {:<14} {:>6}", entry.column, entry.missing);
        }

        println!(
            "\n📌 Columns with >{}% missing values:",
            HIGH_NULL_THRESHOLD_PCT
        );
        if self.high_null_columns.is_empty() {
            println!("✔️  None");
        } else {
            for entry in &self.high_null_columns {
                println!("   {:<14} {:>6} ({:.1}%)", entry.column, entry.missing, entry.pct);
            }
        }

        let key_names: Vec<&str> = self
            .checked_key_columns
            .iter()
            .map(BaseColumn::name)
            .collect();
        println!(
            "\n📌 Total rows with missing values in key columns {:?}: {}",
            key_names,
            self.incomplete_key_rows.len()
        );
        if self.incomplete_key_rows.is_empty() {
            println!("✔️  No missing rows in key columns");
        } else {
            for (index, date) in self.incomplete_key_rows.iter().take(10) {
                println!("   row {:>5}  {}", index, date);
            }
            if self.incomplete_key_rows.len() > 10 {
                println!("   ... ({} more)", self.incomplete_key_rows.len() - 10);
            }
        }

        println!("\n📌 Duplicate rows: {}", self.duplicate_rows);

        print!("\n📌 Cardinality (categoricals): ");
        if self.cardinality.is_empty() {
            println!("none");
        } else {
            let rendered: Vec<String> = self
                .cardinality
                .iter()
                .map(|(name, count)| format!("{}: {}", name, count))
                .collect();
            println!("{}", rendered.join(", "));
        }

        println!("\n📊 Quality Summary");
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        println!("Rows checked:       {}", self.rows);
        println!("Issues found:       {}", self.total_issues());
        if self.is_clean() {
            println!("\n✅ No quality issues found.");
        }
    }
}

/// Run all checks over the series. `key_cols` defaults to
/// [`DEFAULT_KEY_COLUMNS`]; requested keys the table does not have are
/// skipped, matching the set actually reported.
pub fn check(series: &PriceSeries, key_cols: Option<&[BaseColumn]>) -> QualityReport {
    let rows = series.len();
    let columns = series.columns();

    let missing_per_column: Vec<ColumnMissing> = columns
        .iter()
        .map(|view| {
            let missing = view.data.missing();
            ColumnMissing {
                column: view.name.clone(),
                missing,
                pct: if rows == 0 {
                    0.0
                } else {
                    missing as f64 / rows as f64 * 100.0
                },
            }
        })
        .collect();

    let high_null_columns = missing_per_column
        .iter()
        .filter(|entry| entry.pct > HIGH_NULL_THRESHOLD_PCT)
        .cloned()
        .collect();

    let requested = key_cols.unwrap_or(DEFAULT_KEY_COLUMNS);
    let checked_key_columns: Vec<BaseColumn> = requested
        .iter()
        .copied()
        .filter(|column| series.base_column(*column).is_some())
        .collect();

    let key_data: Vec<ColumnData<'_>> = checked_key_columns
        .iter()
        .filter_map(|column| series.base_column(*column))
        .collect();

    let incomplete_key_rows: Vec<(usize, NaiveDate)> = (0..rows)
        .filter(|&index| key_data.iter().any(|data| data.is_missing_at(index)))
        .map(|index| (index, series.dates()[index]))
        .collect();

    let cardinality = columns
        .iter()
        .filter_map(|view| match view.data {
            ColumnData::Text(cells) => {
                let distinct: HashSet<&str> =
                    cells.iter().flatten().map(String::as_str).collect();
                Some((view.name.clone(), distinct.len()))
            }
            _ => None,
        })
        .collect();

    QualityReport {
        rows,
        missing_per_column,
        high_null_columns,
        checked_key_columns,
        incomplete_key_rows,
        duplicate_rows: count_duplicate_rows(&columns, rows),
        cardinality,
    }
}

/// Cell key preserving exact values for duplicate comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum CellKey {
    Float(u64),
    Int(u64),
    Text(String),
}

fn cell_key(data: &ColumnData<'_>, index: usize) -> Option<CellKey> {
    match data {
        ColumnData::Float(cells) => cells[index].map(|value| CellKey::Float(value.to_bits())),
        ColumnData::Int(cells) => cells[index].map(CellKey::Int),
        ColumnData::Text(cells) => cells[index].clone().map(CellKey::Text),
    }
}

/// Count rows whose cells across all present columns exactly equal an
/// earlier row's. The date index is not part of the comparison.
fn count_duplicate_rows(columns: &[ColumnView<'_>], rows: usize) -> usize {
    let mut seen: HashSet<Vec<Option<CellKey>>> = HashSet::with_capacity(rows);
    let mut duplicates = 0;

    for index in 0..rows {
        let key: Vec<Option<CellKey>> = columns
            .iter()
            .map(|view| cell_key(&view.data, index))
            .collect();
        if !seen.insert(key) {
            duplicates += 1;
        }
    }

    duplicates
}
