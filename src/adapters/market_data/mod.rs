//! Market Data Adapters
//!
//! Sources of daily closing prices:
//! - `CsvDirectorySource`: one `<SYMBOL>.csv` file per symbol in a local directory
//! - `HttpQuoteSource`: CSV download from a templated URL
//!
//! Both share the same CSV parser, which locates the `Date` and `Close`
//! columns by header name and returns quotes oldest first.

mod csv_directory;
mod csv_quotes;
mod http_quotes;

pub use csv_directory::CsvDirectorySource;
pub use csv_quotes::parse_quotes_csv;
pub use http_quotes::HttpQuoteSource;
