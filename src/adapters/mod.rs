//! Adapters Layer - External System Implementations
//!
//! This module contains implementations of the port traits:
//! - Market Data: CSV directory and HTTP quote sources
//! - Chart: chart data file writer
//! - CLI: Command-line interface handlers

pub mod chart;
pub mod cli;
pub mod market_data;

pub use chart::{ChartFormat, FileChartWriter};
pub use cli::CliApp;
pub use market_data::{CsvDirectorySource, HttpQuoteSource};
