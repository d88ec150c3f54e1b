//! Ports Layer - Trait definitions for external dependencies
//!
//! This module defines the interfaces (ports) that adapters must implement.
//! Following hexagonal architecture, these traits abstract:
//! - Historical quote retrieval
//! - Export of annotated series for charting

pub mod chart;
pub mod market_data;
pub mod mocks;

pub use chart::{ChartError, ChartFormat, ChartSink};
pub use market_data::{HistoricalQuery, MarketDataError, MarketDataPort};
pub use mocks::MockMarketData;
