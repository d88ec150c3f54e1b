//! Configuration Module
//!
//! Loads and validates configuration from TOML files.

pub mod loader;

pub use loader::{
    Config, ConfigError, load_config, AnalysisSection, MarketDataSection, OutputSection,
    QuoteSourceKind, SymbolErrorPolicy, DATA_DIR_ENV, QUOTES_URL_ENV,
};
