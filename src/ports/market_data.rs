use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::{Observation, TradingRange};

/// Market data error type
#[derive(Error, Debug)]
pub enum MarketDataError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Data parsing error: {0}")]
    Parse(String),

    #[error("No quotes for {symbol} between {start} and {end}")]
    NoData {
        symbol: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

/// Historical daily quote query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoricalQuery {
    pub symbol: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl HistoricalQuery {
    pub fn new(symbol: impl Into<String>, range: TradingRange) -> Self {
        Self {
            symbol: symbol.into(),
            start: range.start,
            end: range.end,
        }
    }

    pub fn range(&self) -> TradingRange {
        TradingRange {
            start: self.start,
            end: self.end,
        }
    }

    pub fn no_data(&self) -> MarketDataError {
        MarketDataError::NoData {
            symbol: self.symbol.clone(),
            start: self.start,
            end: self.end,
        }
    }
}

/// Market data port trait
#[async_trait]
pub trait MarketDataPort: Send + Sync {
    /// Fetch daily closes for the query range, oldest first
    async fn fetch_history(&self, query: &HistoricalQuery) -> Result<Vec<Observation>, MarketDataError>;

    /// Short name of the source, for logging
    fn source_name(&self) -> &str;
}
