mod bar;
mod series;
pub mod indicators;

pub use bar::PriceBar;
pub use series::{
    BaseColumn, ColumnData, ColumnView, Indicator, PriceSeries, SeriesColumns, SYMBOL_COLUMN,
};
