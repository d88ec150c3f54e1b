//! CSV quote parsing shared by the file and HTTP sources.
//!
//! Expects a header row with `Date` and `Close` columns (any case, any
//! position). Other columns such as Open, High, Low, Adj Close and Volume
//! are ignored. Rows whose close is `null` or empty are skipped, since
//! some providers emit them for non-trading days.

use chrono::NaiveDate;
use std::io::Read;

use crate::domain::Observation;
use crate::ports::{HistoricalQuery, MarketDataError};

const DATE_FORMAT: &str = "%Y-%m-%d";

fn column(headers: &csv::StringRecord, name: &str) -> Result<usize, MarketDataError> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
        .ok_or_else(|| MarketDataError::Parse(format!("missing '{}' column", name)))
}

fn parse_date(raw: &str) -> Result<NaiveDate, MarketDataError> {
    // Accept "2024-03-01" as well as "2024-03-01 00:00:00"
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, DATE_FORMAT)
        .map_err(|e| MarketDataError::Parse(format!("bad date '{}': {}", raw, e)))
}

/// Parse quotes, keep those inside the query range, and sort oldest first
pub fn parse_quotes_csv<R: Read>(
    reader: R,
    query: &HistoricalQuery,
) -> Result<Vec<Observation>, MarketDataError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| MarketDataError::Parse(e.to_string()))?
        .clone();
    let date_idx = column(&headers, "date")?;
    let close_idx = column(&headers, "close")?;
    let range = query.range();

    let mut quotes = Vec::new();
    for (row, record) in rdr.records().enumerate() {
        let record = record.map_err(|e| MarketDataError::Parse(e.to_string()))?;
        let line = row + 2;

        let raw_close = record.get(close_idx).unwrap_or("");
        if raw_close.is_empty() || raw_close.eq_ignore_ascii_case("null") {
            tracing::debug!("{}: skipping line {} without a close", query.symbol, line);
            continue;
        }

        let date = parse_date(record.get(date_idx).unwrap_or(""))?;
        if !range.contains(date) {
            continue;
        }

        let close: f64 = raw_close.parse().map_err(|e| {
            MarketDataError::Parse(format!("line {}: bad close '{}': {}", line, raw_close, e))
        })?;
        if !close.is_finite() || close < 0.0 {
            return Err(MarketDataError::Parse(format!(
                "line {}: close must be a non-negative number, got {}",
                line, close
            )));
        }

        quotes.push(Observation::new(date, close));
    }

    quotes.sort_by_key(|q| q.date);
    quotes.dedup_by_key(|q| q.date);

    if quotes.is_empty() {
        return Err(query.no_data());
    }
    Ok(quotes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TradingRange;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn query() -> HistoricalQuery {
        HistoricalQuery::new("SPY", TradingRange { start: date(3, 1), end: date(3, 31) })
    }

    #[test]
    fn test_parse_provider_layout_newest_first() {
        let body = "\
Date,Open,High,Low,Close,Adj Close,Volume
2024-03-05,11,12,10,11.5,11.4,1000
2024-03-04,10,11,9,10.5,10.4,1200
2024-03-01,9,10,8,9.5,9.4,900
";
        let quotes = parse_quotes_csv(body.as_bytes(), &query()).unwrap();
        assert_eq!(
            quotes,
            vec![
                Observation::new(date(3, 1), 9.5),
                Observation::new(date(3, 4), 10.5),
                Observation::new(date(3, 5), 11.5),
            ]
        );
    }

    #[test]
    fn test_columns_found_by_name() {
        let body = "close,DATE\n5.0,2024-03-02\n";
        let quotes = parse_quotes_csv(body.as_bytes(), &query()).unwrap();
        assert_eq!(quotes, vec![Observation::new(date(3, 2), 5.0)]);
    }

    #[test]
    fn test_out_of_range_rows_dropped() {
        let body = "Date,Close\n2024-02-28,1.0\n2024-03-15,2.0\n2024-04-01,3.0\n";
        let quotes = parse_quotes_csv(body.as_bytes(), &query()).unwrap();
        assert_eq!(quotes, vec![Observation::new(date(3, 15), 2.0)]);
    }

    #[test]
    fn test_null_rows_skipped() {
        let body = "Date,Close\n2024-03-01,null\n2024-03-04,\n2024-03-05,7.25\n";
        let quotes = parse_quotes_csv(body.as_bytes(), &query()).unwrap();
        assert_eq!(quotes, vec![Observation::new(date(3, 5), 7.25)]);
    }

    #[test]
    fn test_timestamp_dates_accepted() {
        let body = "Date,Close\n2024-03-05 00:00:00,7.0\n";
        let quotes = parse_quotes_csv(body.as_bytes(), &query()).unwrap();
        assert_eq!(quotes[0].date, date(3, 5));
    }

    #[test]
    fn test_missing_column() {
        let body = "Date,Open\n2024-03-05,7.0\n";
        let result = parse_quotes_csv(body.as_bytes(), &query());
        assert!(matches!(result, Err(MarketDataError::Parse(_))));
    }

    #[test]
    fn test_bad_values() {
        let body = "Date,Close\n2024-03-05,abc\n";
        assert!(matches!(
            parse_quotes_csv(body.as_bytes(), &query()),
            Err(MarketDataError::Parse(_))
        ));

        let body = "Date,Close\n2024-03-05,-1.0\n";
        assert!(matches!(
            parse_quotes_csv(body.as_bytes(), &query()),
            Err(MarketDataError::Parse(_))
        ));

        let body = "Date,Close\n05/03/2024,1.0\n";
        assert!(matches!(
            parse_quotes_csv(body.as_bytes(), &query()),
            Err(MarketDataError::Parse(_))
        ));
    }

    #[test]
    fn test_empty_result_is_no_data() {
        let body = "Date,Close\n";
        let result = parse_quotes_csv(body.as_bytes(), &query());
        assert!(matches!(result, Err(MarketDataError::NoData { .. })));
    }

    #[test]
    fn test_duplicate_dates_collapsed() {
        let body = "Date,Close\n2024-03-05,1.0\n2024-03-05,1.0\n";
        let quotes = parse_quotes_csv(body.as_bytes(), &query()).unwrap();
        assert_eq!(quotes.len(), 1);
    }
}
