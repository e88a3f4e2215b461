//! `sales-summary` loads `;`-delimited CSV sales exports into a SQLite database and builds a
//! `sales_summary` table with one row per customer/product pair.
//!
//! The pipeline is two batch jobs, run one after the other:
//!
//! 1. **Ingest raw data** ([`ingestion::load_raw_data`]): every `*.csv` file in a directory is
//!    parsed (Latin-1 by default, malformed records skipped) and written to a table named after
//!    the file, replacing any previous table of that name.
//! 2. **Build summary** ([`summary::run`]): `orders` is aggregated per (Customer ID,
//!    Product ID), joined with `customers` and `products`, enriched with derived metrics and a
//!    category roll-up, and written to `sales_summary`.
//!
//! Both jobs take an explicit [`store::Store`] handle and report progress to an optional
//! [`observability::PipelineObserver`].
//!
//! ## Summary columns
//!
//! | column | meaning |
//! | --- | --- |
//! | `total_sales`, `total_profit`, `total_orders` | sums and order count per pair |
//! | `high_value_customer` | `total_sales` above the 90th percentile of all pairs |
//! | `profit_margin` | `total_profit / total_sales` (divisor 1 when sales are 0) |
//! | `avg_order_value` | `total_sales / total_orders` (divisor 1 when there are no orders) |
//! | `product_rank_per_customer` | dense rank of `total_sales` within the customer, 1 = largest |
//! | `sales_to_profit_ratio` | `total_sales / total_profit` (divisor 1 when profit is 0) |
//! | `category_sales_pct` | the (Category, Sub-Category) share of all sales |
//! | `category_profit_ratio` | profit / sales of the (Category, Sub-Category); null if no sales |
//!
//! ## Example: both jobs in one process
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use sales_summary::config::PipelineConfig;
//! use sales_summary::ingestion::load_raw_data;
//! use sales_summary::observability::{PipelineObserver, StdErrObserver};
//! use sales_summary::store::Store;
//! use sales_summary::summary;
//!
//! # fn main() -> Result<(), sales_summary::PipelineError> {
//! let config = PipelineConfig::default();
//! let observer: Arc<dyn PipelineObserver> = Arc::new(StdErrObserver);
//!
//! let mut store = Store::open(&config.database_path)?;
//! load_raw_data(
//!     &mut store,
//!     &config.data_dir,
//!     &config.ingestion_options(Some(observer.clone())),
//! )?;
//! let report = summary::run(&mut store, &config.summary_options(Some(observer)))?;
//! println!("sales_summary rows={}", report.rows);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: directory scan, CSV parsing and table loading
//! - [`summary`]: aggregation query, derived metrics and category roll-up
//! - [`store`]: SQLite store handle
//! - [`processing`]: generic row set operations (sum, quantile, rank, group, join)
//! - [`types`]: in-memory row set model
//! - [`observability`]: observers for logging and alerts
//! - [`config`]: JSON configuration
//! - [`preview`]: tabular previews for logs
//! - [`error`]: error type shared by all of the above

pub mod config;
pub mod error;
pub mod ingestion;
pub mod observability;
pub mod preview;
pub mod processing;
pub mod store;
pub mod summary;
pub mod types;

pub use error::{PipelineError, PipelineResult};
