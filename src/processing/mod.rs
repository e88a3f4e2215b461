//! In-memory row set operations.
//!
//! The processing layer operates on [`crate::types::DataSet`] values read from the store. Every
//! operation is pure: inputs are borrowed (or consumed) and a new dataset or column is returned.
//!
//! - [`sum()`]: typed column sums
//! - [`quantile()`]: linearly interpolated quantiles
//! - [`dense_rank()`]: gap-free ranking (largest first) within partitions
//! - [`group_sums()`] and [`left_join()`]: roll-ups and merging them back
//! - [`fill_numeric_nulls()`]: zero-fill of numeric nulls
//!
//! ## Example: roll up and merge back
//!
//! ```rust
//! use sales_summary::processing::{group_sums, sum};
//! use sales_summary::types::{DataSet, DataType, Field, Schema, Value};
//!
//! let ds = DataSet::new(
//!     Schema::new(vec![
//!         Field::new("Category", DataType::Utf8),
//!         Field::new("total_sales", DataType::Float64),
//!     ]),
//!     vec![
//!         vec![Value::Utf8("Tools".into()), Value::Float64(10.0)],
//!         vec![Value::Utf8("Tools".into()), Value::Float64(30.0)],
//!         vec![Value::Utf8("Garden".into()), Value::Float64(60.0)],
//!     ],
//! );
//!
//! let per_category = group_sums(&ds, &["Category"], &["total_sales"]).unwrap();
//! assert_eq!(per_category.row_count(), 2);
//! assert_eq!(
//!     sum(&per_category, "total_sales"),
//!     Some(Value::Float64(100.0))
//! );
//! ```

pub mod fill;
pub mod group;
pub mod quantile;
pub mod rank;
pub mod reduce;

pub use fill::fill_numeric_nulls;
pub use group::{group_sums, left_join};
pub use quantile::quantile;
pub use rank::dense_rank;
pub use reduce::sum;
