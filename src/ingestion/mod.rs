//! Tabular ingestion: delimited files into store tables.
//!
//! Most callers should use [`load_raw_data`] (from [`loader`]) which:
//!
//! - discovers `*.csv` files in a directory ([`scan`])
//! - parses each into a typed [`crate::types::DataSet`], skipping malformed records ([`csv`])
//! - replaces the table named after the file with the parsed rows ([`ingest`])
//! - reports progress, failures and elapsed time to an optional
//!   [`crate::observability::PipelineObserver`]
//!
//! ```no_run
//! use sales_summary::ingestion::{load_raw_data, IngestionOptions};
//! use sales_summary::store::Store;
//!
//! # fn main() -> Result<(), sales_summary::PipelineError> {
//! let mut store = Store::open("sales.db")?;
//! let report = load_raw_data(&mut store, "data", &IngestionOptions::default())?;
//! for table in report.ingested_tables() {
//!     println!("loaded {table}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod csv;
pub mod loader;
pub mod scan;

pub use self::csv::{parse, parse_reader, CsvFormat, ParsedCsv, SkippedRecord};
pub use loader::{ingest, load_raw_data, FileReport, FileStatus, IngestionOptions, IngestionReport};
pub use scan::{scan, table_name_for};
