pub mod market_chart;

pub use market_chart::{MarketChartParser, Parser};
