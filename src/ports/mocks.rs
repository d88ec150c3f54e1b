use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use async_trait::async_trait;

use crate::domain::Observation;
use crate::ports::market_data::{HistoricalQuery, MarketDataError, MarketDataPort};

/// In-memory market data port that records calls and serves canned histories
#[derive(Debug, Default, Clone)]
pub struct MockMarketData {
    calls: Arc<Mutex<Vec<String>>>,
    histories: Arc<Mutex<HashMap<String, Vec<Observation>>>>,
}

impl MockMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the history served for a symbol
    pub fn with_history(self, symbol: &str, history: Vec<Observation>) -> Self {
        if let Ok(mut map) = self.histories.lock() {
            map.insert(symbol.to_string(), history);
        }
        self
    }

    /// Get all recorded calls
    pub fn get_calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl MarketDataPort for MockMarketData {
    async fn fetch_history(&self, query: &HistoricalQuery) -> Result<Vec<Observation>, MarketDataError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(query.symbol.clone());
        }

        let history = self
            .histories
            .lock()
            .map_err(|_| MarketDataError::Unsupported("mock state poisoned".into()))?
            .get(&query.symbol)
            .cloned()
            .ok_or_else(|| query.no_data())?;

        let in_range: Vec<Observation> = history
            .into_iter()
            .filter(|o| query.range().contains(o.date))
            .collect();
        if in_range.is_empty() {
            return Err(query.no_data());
        }
        Ok(in_range)
    }

    fn source_name(&self) -> &str {
        "mock"
    }
}
