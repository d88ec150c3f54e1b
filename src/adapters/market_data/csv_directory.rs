use async_trait::async_trait;
use std::path::PathBuf;

use super::csv_quotes::parse_quotes_csv;
use crate::domain::Observation;
use crate::ports::{HistoricalQuery, MarketDataError, MarketDataPort};

/// Reads `<data_dir>/<SYMBOL>.csv` files
#[derive(Debug, Clone)]
pub struct CsvDirectorySource {
    data_dir: PathBuf,
}

impl CsvDirectorySource {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// File holding quotes for `symbol`
    pub fn path_for(&self, symbol: &str) -> Result<PathBuf, MarketDataError> {
        if symbol.is_empty() || symbol.contains(['/', '\\']) || symbol.starts_with('.') {
            return Err(MarketDataError::Unsupported(format!(
                "symbol '{}' cannot be used as a file name",
                symbol
            )));
        }
        Ok(self.data_dir.join(format!("{}.csv", symbol)))
    }
}

#[async_trait]
impl MarketDataPort for CsvDirectorySource {
    async fn fetch_history(&self, query: &HistoricalQuery) -> Result<Vec<Observation>, MarketDataError> {
        let path = self.path_for(&query.symbol)?;
        tracing::debug!("Reading {} quotes from {}", query.symbol, path.display());

        let bytes = tokio::fs::read(&path).await.map_err(|source| MarketDataError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let quotes = parse_quotes_csv(bytes.as_slice(), query)?;
        tracing::info!(
            "Loaded {} quotes for {} ({} to {})",
            quotes.len(),
            query.symbol,
            query.start,
            query.end
        );
        Ok(quotes)
    }

    fn source_name(&self) -> &str {
        "csv_dir"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TradingRange;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn query(symbol: &str) -> HistoricalQuery {
        HistoricalQuery::new(
            symbol,
            TradingRange {
                start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                end: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            },
        )
    }

    #[tokio::test]
    async fn test_reads_symbol_file() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("QQQ.csv"), "Date,Close\n2024-06-03,450.5\n2024-06-04,452.0\n").unwrap();

        let source = CsvDirectorySource::new(dir.path());
        let quotes = source.fetch_history(&query("QQQ")).await.unwrap();

        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[1].close, 452.0);
        assert_eq!(source.source_name(), "csv_dir");
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let source = CsvDirectorySource::new(dir.path());

        let result = source.fetch_history(&query("NOPE")).await;
        assert!(matches!(result, Err(MarketDataError::Io { .. })));
    }

    #[test]
    fn test_rejects_path_like_symbols() {
        let source = CsvDirectorySource::new("/data");
        assert!(source.path_for("../etc/passwd").is_err());
        assert!(source.path_for("").is_err());
        assert_eq!(source.path_for("BRK-B").unwrap(), PathBuf::from("/data/BRK-B.csv"));
    }
}
