//! Bollinger Scout - Bollinger Band trend screening library
//!
//! Computes Bollinger Bands over daily closes, classifies each symbol by
//! trend and band position, and picks the best candidate across symbols.
//!
//! # Modules
//!
//! - `domain`: Core types (Observation, Series, Rule, Verdict, trading calendar)
//! - `ports`: Trait abstractions (MarketDataPort, ChartSink)
//! - `strategy`: Band computation, trend classification, selection
//! - `adapters`: External implementations (CSV/HTTP quotes, chart files, CLI)
//! - `config`: Configuration loading and validation
//! - `application`: Orchestrator for a full decision run

pub mod domain;
pub mod ports;
pub mod strategy;
pub mod adapters;
pub mod config;
pub mod application;
