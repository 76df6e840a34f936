//! Output adapters for aggregated results.
//!
//! - [`projector`] turns an aggregation into rows, metric samples and JSON
//! - [`csv`] persists the rows as one CSV file per kind

pub mod csv;
pub mod projector;

pub use self::csv::{CsvReportWriter, ReportError};
pub use projector::{
    ProjectedRows, ValidItem, to_json, to_metric_observations, to_rows, validate,
};
