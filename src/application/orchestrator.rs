//! Analysis Orchestrator
//!
//! Coordinates one decision run: fetch quote histories for every configured
//! symbol, compute bands, export chart data, then select a candidate.

use chrono::NaiveDate;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinSet;

use crate::config::{Config, SymbolErrorPolicy};
use crate::domain::{
    trading_range, AnalysisError, Observation, Series, TradingRange, DEFAULT_LOOKBACK_MULTIPLIER,
};
use crate::ports::{ChartError, ChartSink, HistoricalQuery, MarketDataError, MarketDataPort};
use crate::strategy::{AnalysisConfig, BandComputer, ParamsError, Selection, Selector, TrendClassifier};

/// Why a single symbol could not be analyzed
#[derive(Debug, Error)]
pub enum SymbolError {
    #[error(transparent)]
    Fetch(#[from] MarketDataError),
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("Invalid parameters: {0}")]
    Params(#[from] ParamsError),
    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),
    #[error("{symbol}: {source}")]
    Symbol {
        symbol: String,
        #[source]
        source: SymbolError,
    },
    #[error("Chart export failed for {symbol}: {source}")]
    Chart {
        symbol: String,
        #[source]
        source: ChartError,
    },
    #[error("Fetch task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// A symbol left out of a run under the skip policy
#[derive(Debug, Clone, Serialize)]
pub struct SkippedSymbol {
    pub symbol: String,
    pub reason: String,
}

/// Outcome of one decision run
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub as_of: NaiveDate,
    pub range: TradingRange,
    #[serde(skip_serializing)]
    pub series: Vec<Series>,
    pub skipped: Vec<SkippedSymbol>,
    pub charts: Vec<PathBuf>,
    pub selection: Selection,
}

impl AnalysisReport {
    pub fn recommended_symbol(&self) -> Option<&str> {
        self.selection.recommended_symbol()
    }
}

/// Drives fetch, band computation, export and selection
pub struct AnalysisOrchestrator {
    config: AnalysisConfig,
    symbols: Vec<String>,
    market_data: Arc<dyn MarketDataPort>,
    chart_sink: Option<Box<dyn ChartSink>>,
    on_symbol_error: SymbolErrorPolicy,
    lookback_multiplier: usize,
}

impl AnalysisOrchestrator {
    /// Create new orchestrator
    pub fn new(
        config: AnalysisConfig,
        symbols: Vec<String>,
        market_data: Arc<dyn MarketDataPort>,
    ) -> Result<Self, OrchestratorError> {
        config.validate()?;

        Ok(Self {
            config,
            symbols,
            market_data,
            chart_sink: None,
            on_symbol_error: SymbolErrorPolicy::default(),
            lookback_multiplier: DEFAULT_LOOKBACK_MULTIPLIER,
        })
    }

    /// Create from a loaded config file, with the given quote source
    pub fn from_config(config: &Config, market_data: Arc<dyn MarketDataPort>) -> Result<Self, OrchestratorError> {
        Ok(Self::new(AnalysisConfig::from(config), config.analysis.symbols.clone(), market_data)?
            .with_error_policy(config.analysis.on_symbol_error)
            .with_lookback_multiplier(config.market_data.lookback_multiplier))
    }

    pub fn with_chart_sink(mut self, sink: Box<dyn ChartSink>) -> Self {
        self.chart_sink = Some(sink);
        self
    }

    pub fn with_error_policy(mut self, policy: SymbolErrorPolicy) -> Self {
        self.on_symbol_error = policy;
        self
    }

    pub fn with_lookback_multiplier(mut self, multiplier: usize) -> Self {
        self.lookback_multiplier = multiplier;
        self
    }

    /// Quote range requested for a run as of `as_of`
    pub fn range_for(&self, as_of: NaiveDate) -> Result<TradingRange, OrchestratorError> {
        Ok(trading_range(self.config.periods, as_of, self.lookback_multiplier)?)
    }

    /// Run one decision cycle
    pub async fn run(&self, as_of: NaiveDate) -> Result<AnalysisReport, OrchestratorError> {
        let range = self.range_for(as_of)?;
        let computer = BandComputer::from_config(&self.config)?;

        tracing::info!(
            "Analyzing {} symbols from {} ({} to {}), window {}, factor {}",
            self.symbols.len(),
            self.market_data.source_name(),
            range.start,
            range.end,
            computer.window(),
            computer.factor()
        );

        let histories = self.fetch_all(range).await?;

        let mut series = Vec::with_capacity(histories.len());
        let mut skipped = Vec::new();
        let mut charts = Vec::new();

        for (symbol, fetched) in histories {
            let prepared = fetched
                .map_err(SymbolError::from)
                .and_then(|quotes| Self::prepare(&computer, &symbol, &quotes).map_err(SymbolError::from));

            match prepared {
                Ok(s) => {
                    if let Some(sink) = &self.chart_sink {
                        let path = sink
                            .export(s.symbol(), s.points())
                            .map_err(|source| OrchestratorError::Chart {
                                symbol: symbol.clone(),
                                source,
                            })?;
                        charts.push(path);
                    }
                    series.push(s);
                }
                Err(source) => match self.on_symbol_error {
                    SymbolErrorPolicy::Abort => {
                        return Err(OrchestratorError::Symbol { symbol, source });
                    }
                    SymbolErrorPolicy::Skip => {
                        tracing::warn!("Skipping {}: {}", symbol, source);
                        skipped.push(SkippedSymbol {
                            symbol,
                            reason: source.to_string(),
                        });
                    }
                },
            }
        }

        let selection = Selector::from_config(&self.config).select(&series)?;

        Ok(AnalysisReport {
            as_of,
            range,
            series,
            skipped,
            charts,
            selection,
        })
    }

    /// Fetch and annotate a single symbol, ignoring the configured list
    pub async fn fetch_series(&self, symbol: &str, as_of: NaiveDate) -> Result<Series, OrchestratorError> {
        let range = self.range_for(as_of)?;
        let computer = BandComputer::from_config(&self.config)?;

        let quotes = self
            .market_data
            .fetch_history(&HistoricalQuery::new(symbol, range))
            .await
            .map_err(|e| OrchestratorError::Symbol {
                symbol: symbol.to_string(),
                source: e.into(),
            })?;

        computer
            .annotate(symbol, &quotes)
            .map_err(|e| OrchestratorError::Symbol {
                symbol: symbol.to_string(),
                source: e.into(),
            })
    }

    /// Fetch every symbol concurrently, returned in configured order
    async fn fetch_all(
        &self,
        range: TradingRange,
    ) -> Result<Vec<(String, Result<Vec<Observation>, MarketDataError>)>, OrchestratorError> {
        let mut tasks = JoinSet::new();
        for (index, symbol) in self.symbols.iter().enumerate() {
            let source = Arc::clone(&self.market_data);
            let query = HistoricalQuery::new(symbol.clone(), range);
            tasks.spawn(async move { (index, source.fetch_history(&query).await) });
        }

        let mut slots: Vec<Option<Result<Vec<Observation>, MarketDataError>>> =
            (0..self.symbols.len()).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            let (index, result) = joined?;
            slots[index] = Some(result);
        }

        Ok(self
            .symbols
            .iter()
            .cloned()
            .zip(slots)
            .filter_map(|(symbol, slot)| slot.map(|result| (symbol, result)))
            .collect())
    }

    /// Compute bands and check the series has enough computed points to classify
    fn prepare(computer: &BandComputer, symbol: &str, quotes: &[Observation]) -> Result<Series, AnalysisError> {
        let series = computer.annotate(symbol, quotes)?;
        TrendClassifier::new(&series)?;
        tracing::debug!(
            "{}: {} quotes, {} with bands",
            symbol,
            series.len(),
            series.computed_len()
        );
        Ok(series)
    }
}
