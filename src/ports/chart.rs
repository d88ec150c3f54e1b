use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::domain::AnnotatedObservation;

/// On-disk chart file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartFormat {
    #[default]
    Csv,
    Json,
}

impl ChartFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ChartFormat::Csv => "csv",
            ChartFormat::Json => "json",
        }
    }
}

/// Chart export error type
#[derive(Error, Debug)]
pub enum ChartError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Destination for annotated series, consumed by charting tools
#[cfg_attr(test, mockall::automock)]
pub trait ChartSink: Send + Sync {
    /// Export one symbol's annotated series and return where it landed
    fn export(&self, symbol: &str, points: &[AnnotatedObservation]) -> Result<PathBuf, ChartError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_extension() {
        assert_eq!(ChartFormat::default(), ChartFormat::Csv);
        assert_eq!(ChartFormat::Csv.extension(), "csv");
        assert_eq!(ChartFormat::Json.extension(), "json");
    }
}
