//! Chart Adapters
//!
//! Writes annotated series to disk for external plotting tools.

mod file_writer;

pub use crate::ports::ChartFormat;
pub use file_writer::FileChartWriter;
