//! The sales summary job.
//!
//! [`run`] reads the `orders`, `customers` and `products` tables, builds one row per
//! customer/product pair ([`build_aggregate`]), adds the derived metrics and category roll-up
//! ([`derive_metrics`]) and replaces the `sales_summary` table with the result.
//!
//! ```no_run
//! use sales_summary::store::Store;
//! use sales_summary::summary::{run, SummaryOptions};
//!
//! # fn main() -> Result<(), sales_summary::PipelineError> {
//! let mut store = Store::open("sales.db")?;
//! let report = run(&mut store, &SummaryOptions::default())?;
//! println!("summary rows={}", report.rows);
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod columns;
pub mod metrics;
pub mod rollup;

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::PipelineResult;
use crate::ingestion::ingest;
use crate::observability::{report_failure, FailureScope, PipelineObserver, Severity, SummaryPhase};
use crate::preview;
use crate::store::Store;
use crate::types::DataSet;

pub use aggregate::{build_aggregate, AggregateResult};
pub use metrics::derive_metrics;
pub use rollup::{category_rollup, merge_category_rollup};

/// Table the summary is written to.
pub const SUMMARY_TABLE: &str = "sales_summary";

/// Options controlling [`run`].
#[derive(Clone)]
pub struct SummaryOptions {
    /// Rows shown in each phase preview; `0` disables previews.
    pub preview_rows: usize,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn PipelineObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: Severity,
}

impl fmt::Debug for SummaryOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SummaryOptions")
            .field("preview_rows", &self.preview_rows)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            preview_rows: 5,
            observer: None,
            alert_at_or_above: Severity::Critical,
        }
    }
}

impl SummaryOptions {
    fn step<T>(
        &self,
        phase: SummaryPhase,
        f: impl FnOnce() -> PipelineResult<T>,
    ) -> PipelineResult<T> {
        if let Some(obs) = &self.observer {
            obs.on_phase(phase);
        }
        f().inspect_err(|err| {
            report_failure(
                self.observer.as_ref(),
                self.alert_at_or_above,
                &FailureScope::Summary(phase),
                err,
            )
        })
    }

    fn preview(&self, phase: SummaryPhase, dataset: &DataSet) {
        if let Some(obs) = &self.observer {
            if self.preview_rows > 0 {
                obs.on_preview(phase, &preview::render(dataset, self.preview_rows));
            }
        }
    }
}

/// Result of a summary [`run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryReport {
    /// Rows written to `sales_summary`.
    pub rows: usize,
    /// Distinct customer/product pairs in `orders`.
    pub order_pairs: usize,
    /// Pairs left out because their customer or product is unknown.
    pub dropped_pairs: usize,
    /// Wall-clock time of the run.
    pub elapsed: Duration,
}

/// Build the summary row set without writing it.
pub fn build_summary(store: &Store) -> PipelineResult<DataSet> {
    derive_metrics(&build_aggregate(store)?.dataset)
}

/// Build the summary and replace the `sales_summary` table with it.
pub fn run(store: &mut Store, options: &SummaryOptions) -> PipelineResult<SummaryReport> {
    let start = Instant::now();

    let aggregate = options.step(SummaryPhase::CreatingSummary, || build_aggregate(store))?;
    options.preview(SummaryPhase::CreatingSummary, &aggregate.dataset);
    if aggregate.dropped_pairs > 0 {
        if let Some(obs) = &options.observer {
            obs.on_join_drops(aggregate.dropped_pairs, aggregate.order_pairs);
        }
    }

    let summary = options.step(SummaryPhase::CleaningData, || derive_metrics(&aggregate.dataset))?;
    options.preview(SummaryPhase::CleaningData, &summary);

    options.step(SummaryPhase::IngestingData, || ingest(store, &summary, SUMMARY_TABLE))?;
    if let Some(obs) = &options.observer {
        obs.on_phase(SummaryPhase::Completed);
    }

    Ok(SummaryReport {
        rows: summary.row_count(),
        order_pairs: aggregate.order_pairs,
        dropped_pairs: aggregate.dropped_pairs,
        elapsed: start.elapsed(),
    })
}
