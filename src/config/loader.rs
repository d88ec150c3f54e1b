//! Configuration Loader
//!
//! Loads and validates configuration from TOML files matching config.toml structure.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::DEFAULT_LOOKBACK_MULTIPLIER;
use crate::ports::ChartFormat;
use crate::strategy::params::{AnalysisConfig, ScanMode, DEFAULT_NEAR_BAND_RATIO};

/// Overrides `market_data.data_dir`
pub const DATA_DIR_ENV: &str = "BOLLINGER_SCOUT_DATA_DIR";
/// Overrides `market_data.url_template`
pub const QUOTES_URL_ENV: &str = "BOLLINGER_SCOUT_QUOTES_URL";

/// Main configuration structure matching config.toml
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub analysis: AnalysisSection,
    pub market_data: MarketDataSection,
    #[serde(default)]
    pub output: OutputSection,
}

/// What to do when one symbol cannot be fetched or analyzed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolErrorPolicy {
    /// Fail the whole run
    #[default]
    Abort,
    /// Log, record the symbol as skipped, and carry on
    Skip,
}

/// Analysis configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisSection {
    /// Symbols in evaluation order
    pub symbols: Vec<String>,
    /// Rolling window length in trading days
    pub periods: usize,
    /// Band half-width in standard deviations
    pub factor: f64,
    #[serde(default)]
    pub scan_mode: ScanMode,
    /// Tolerance for the "near band" checks, as a fraction of the band
    #[serde(default = "default_near_band_ratio")]
    pub near_band_ratio: f64,
    #[serde(default)]
    pub on_symbol_error: SymbolErrorPolicy,
}

fn default_near_band_ratio() -> f64 {
    DEFAULT_NEAR_BAND_RATIO
}

/// Where quotes come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteSourceKind {
    CsvDir,
    Http,
}

/// Market data configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct MarketDataSection {
    pub source: QuoteSourceKind,
    /// Directory holding `<SYMBOL>.csv` files
    #[serde(default)]
    pub data_dir: Option<String>,
    /// URL with `{symbol}`, `{start}`, `{end}`, `{start_ts}`, `{end_ts}` placeholders
    #[serde(default)]
    pub url_template: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Window lengths of history to request, leaving slack for holidays
    #[serde(default = "default_lookback_multiplier")]
    pub lookback_multiplier: usize,
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_lookback_multiplier() -> usize {
    DEFAULT_LOOKBACK_MULTIPLIER
}

impl MarketDataSection {
    /// Get data directory with environment variable override
    /// Checks BOLLINGER_SCOUT_DATA_DIR first, then expands `~`
    pub fn get_data_dir(&self) -> Option<PathBuf> {
        self.resolve_data_dir(std::env::var(DATA_DIR_ENV).ok())
    }

    fn resolve_data_dir(&self, env_override: Option<String>) -> Option<PathBuf> {
        env_override
            .or_else(|| self.data_dir.clone())
            .filter(|d| !d.trim().is_empty())
            .map(|d| PathBuf::from(shellexpand::tilde(&d).into_owned()))
    }

    /// Get URL template with environment variable override
    pub fn get_url_template(&self) -> Option<String> {
        std::env::var(QUOTES_URL_ENV)
            .ok()
            .or_else(|| self.url_template.clone())
            .filter(|u| !u.trim().is_empty())
    }
}

/// Output configuration section (optional)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputSection {
    /// Write one chart file per symbol here when set
    #[serde(default)]
    pub chart_dir: Option<String>,
    #[serde(default)]
    pub chart_format: ChartFormat,
}

impl OutputSection {
    pub fn get_chart_dir(&self) -> Option<PathBuf> {
        self.chart_dir
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .map(|d| PathBuf::from(shellexpand::tilde(d).into_owned()))
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.analysis.symbols.is_empty() {
            return Err(ConfigError::ValidationError(
                "symbols cannot be empty".to_string(),
            ));
        }

        if self.analysis.symbols.iter().any(|s| s.trim().is_empty()) {
            return Err(ConfigError::ValidationError(
                "symbols cannot contain blank entries".to_string(),
            ));
        }

        AnalysisConfig::from(self)
            .validate()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;

        match self.market_data.source {
            QuoteSourceKind::CsvDir if self.market_data.get_data_dir().is_none() => {
                return Err(ConfigError::ValidationError(
                    "data_dir is required for the csv_dir source".to_string(),
                ));
            }
            QuoteSourceKind::Http if self.market_data.get_url_template().is_none() => {
                return Err(ConfigError::ValidationError(
                    "url_template is required for the http source".to_string(),
                ));
            }
            _ => {}
        }

        if self.market_data.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "timeout_secs must be > 0".to_string(),
            ));
        }

        if self.market_data.lookback_multiplier == 0 {
            return Err(ConfigError::ValidationError(
                "lookback_multiplier must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

// Conversion from Config to AnalysisConfig
impl From<&Config> for AnalysisConfig {
    fn from(config: &Config) -> Self {
        AnalysisConfig {
            periods: config.analysis.periods,
            factor: config.analysis.factor,
            scan_mode: config.analysis.scan_mode,
            near_band_ratio: config.analysis.near_band_ratio,
        }
    }
}
