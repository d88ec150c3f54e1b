use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, NaiveDate};
use reqwest::Client;
use std::time::Duration;

use super::csv_quotes::parse_quotes_csv;
use crate::domain::Observation;
use crate::ports::{HistoricalQuery, MarketDataError, MarketDataPort};

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Downloads daily quotes as CSV from a templated URL.
///
/// Placeholders: `{symbol}`, `{start}`, `{end}` (YYYY-MM-DD) and
/// `{start_ts}`, `{end_ts}` (unix seconds, end is exclusive midnight).
#[derive(Debug, Clone)]
pub struct HttpQuoteSource {
    http: Client,
    url_template: String,
}

impl HttpQuoteSource {
    pub fn new(url_template: impl Into<String>, timeout: Duration) -> Result<Self, MarketDataError> {
        let url_template = url_template.into();
        if !url_template.contains("{symbol}") {
            return Err(MarketDataError::Unsupported(format!(
                "url template has no {{symbol}} placeholder: {}",
                url_template
            )));
        }

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("bollinger-scout/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, url_template })
    }

    pub fn with_default_timeout(url_template: impl Into<String>) -> Result<Self, MarketDataError> {
        Self::new(url_template, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Expand the template for one query
    pub fn build_url(&self, query: &HistoricalQuery) -> String {
        let midnight_ts = |d: NaiveDate| d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc().timestamp()).unwrap_or(0);
        let end_exclusive = query.end + ChronoDuration::days(1);

        self.url_template
            .replace("{symbol}", &query.symbol)
            .replace("{start}", &query.start.format("%Y-%m-%d").to_string())
            .replace("{end}", &query.end.format("%Y-%m-%d").to_string())
            .replace("{start_ts}", &midnight_ts(query.start).to_string())
            .replace("{end_ts}", &midnight_ts(end_exclusive).to_string())
    }
}

#[async_trait]
impl MarketDataPort for HttpQuoteSource {
    async fn fetch_history(&self, query: &HistoricalQuery) -> Result<Vec<Observation>, MarketDataError> {
        let url = self.build_url(query);
        tracing::debug!("Requesting {} quotes: {}", query.symbol, url);

        let body = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let quotes = parse_quotes_csv(body.as_bytes(), query)?;
        tracing::info!("Fetched {} quotes for {}", quotes.len(), query.symbol);
        Ok(quotes)
    }

    fn source_name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TradingRange;

    fn query() -> HistoricalQuery {
        HistoricalQuery::new(
            "AAPL",
            TradingRange {
                start: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                end: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            },
        )
    }

    #[test]
    fn test_build_url_dates() {
        let source = HttpQuoteSource::with_default_timeout(
            "https://quotes.example.com/{symbol}.csv?from={start}&to={end}",
        )
        .unwrap();
        assert_eq!(
            source.build_url(&query()),
            "https://quotes.example.com/AAPL.csv?from=2024-01-02&to=2024-01-31"
        );
    }

    #[test]
    fn test_build_url_timestamps() {
        let source = HttpQuoteSource::with_default_timeout(
            "https://quotes.example.com/d/{symbol}?period1={start_ts}&period2={end_ts}",
        )
        .unwrap();
        // 2024-01-02T00:00:00Z and 2024-02-01T00:00:00Z
        assert_eq!(
            source.build_url(&query()),
            "https://quotes.example.com/d/AAPL?period1=1704153600&period2=1706745600"
        );
    }

    #[test]
    fn test_template_requires_symbol() {
        let result = HttpQuoteSource::with_default_timeout("https://quotes.example.com/all.csv");
        assert!(matches!(result, Err(MarketDataError::Unsupported(_))));
    }
}
