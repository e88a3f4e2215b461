//! Run logging and alerting.
//!
//! Both jobs report what they do to an optional [`PipelineObserver`]. The crate ships three
//! implementations:
//!
//! - [`StdErrObserver`]: one line per event on stderr
//! - [`FileObserver`]: appends timestamped lines to a log file (never truncates)
//! - [`CompositeObserver`]: fans events out to several observers

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::Deserialize;

use crate::error::PipelineError;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal).
    Warning,
    /// Error-level event (operation failed).
    Error,
    /// Critical error (typically I/O or store failures).
    Critical,
}

impl Severity {
    /// Classify an error.
    ///
    /// Infrastructure failures (file system, store) are `Critical`; data and shape problems are
    /// `Error`.
    pub fn of(error: &PipelineError) -> Self {
        match error {
            PipelineError::Io(_) | PipelineError::Storage(_) => Self::Critical,
            PipelineError::Csv(err) => match err.kind() {
                ::csv::ErrorKind::Io(_) => Self::Critical,
                _ => Self::Error,
            },
            PipelineError::Query { .. }
            | PipelineError::SchemaMismatch { .. }
            | PipelineError::Preview(_)
            | PipelineError::Config(_) => Self::Error,
        }
    }
}

/// One source file being loaded into a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestionContext {
    /// Source file.
    pub path: PathBuf,
    /// Destination table name.
    pub table: String,
}

/// Outcome of ingesting one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestionStats {
    /// Rows written to the table.
    pub rows: usize,
    /// Malformed records skipped while parsing.
    pub skipped_rows: usize,
}

/// Outcome of a whole `load_raw_data` batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchStats {
    /// Files loaded into a table.
    pub files_ingested: usize,
    /// Files that failed to parse and were left out.
    pub files_failed: usize,
    /// Wall-clock time of the batch.
    pub elapsed: Duration,
}

/// Steps of the summary job, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryPhase {
    /// Running the aggregation/join query.
    CreatingSummary,
    /// Computing derived metrics and the category roll-up.
    CleaningData,
    /// Writing the `sales_summary` table.
    IngestingData,
    /// Finished.
    Completed,
}

impl fmt::Display for SummaryPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::CreatingSummary => "creating summary table",
            Self::CleaningData => "cleaning data",
            Self::IngestingData => "ingesting data",
            Self::Completed => "completed",
        })
    }
}

/// Where a failure happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureScope {
    /// While loading a source file.
    File(IngestionContext),
    /// During a summary phase.
    Summary(SummaryPhase),
}

impl fmt::Display for FailureScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(ctx) => write!(f, "file={} table={}", ctx.path.display(), ctx.table),
            Self::Summary(phase) => write!(f, "summary phase={phase}"),
        }
    }
}

/// Observer interface for pipeline events.
///
/// Every callback has a no-op default; implementors override what they care about.
pub trait PipelineObserver: Send + Sync {
    /// Called before a source file is parsed.
    fn on_file_started(&self, _ctx: &IngestionContext) {}

    /// Called when a file has been written to its table.
    fn on_success(&self, _ctx: &IngestionContext, _stats: IngestionStats) {}

    /// Called when an operation fails.
    fn on_failure(&self, _scope: &FailureScope, _severity: Severity, _error: &PipelineError) {}

    /// Called when a failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, scope: &FailureScope, severity: Severity, error: &PipelineError) {
        self.on_failure(scope, severity, error)
    }

    /// Called once after every discovered file has been handled.
    fn on_batch_finished(&self, _stats: BatchStats) {}

    /// Called when the summary job enters `phase`.
    fn on_phase(&self, _phase: SummaryPhase) {}

    /// Called with a rendered preview of the row set produced by `phase`.
    fn on_preview(&self, _phase: SummaryPhase, _preview: &str) {}

    /// Called when the inner join dropped order pairs with an unknown customer or product.
    fn on_join_drops(&self, _dropped_pairs: usize, _order_pairs: usize) {}
}

/// Report `error` to `observer`, alerting at or above `threshold`.
pub(crate) fn report_failure(
    observer: Option<&Arc<dyn PipelineObserver>>,
    threshold: Severity,
    scope: &FailureScope,
    error: &PipelineError,
) {
    if let Some(obs) = observer {
        let severity = Severity::of(error);
        obs.on_failure(scope, severity, error);
        if severity >= threshold {
            obs.on_alert(scope, severity, error);
        }
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn PipelineObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn PipelineObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl PipelineObserver for CompositeObserver {
    fn on_file_started(&self, ctx: &IngestionContext) {
        for o in &self.observers {
            o.on_file_started(ctx);
        }
    }

    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_failure(&self, scope: &FailureScope, severity: Severity, error: &PipelineError) {
        for o in &self.observers {
            o.on_failure(scope, severity, error);
        }
    }

    fn on_alert(&self, scope: &FailureScope, severity: Severity, error: &PipelineError) {
        for o in &self.observers {
            o.on_alert(scope, severity, error);
        }
    }

    fn on_batch_finished(&self, stats: BatchStats) {
        for o in &self.observers {
            o.on_batch_finished(stats);
        }
    }

    fn on_phase(&self, phase: SummaryPhase) {
        for o in &self.observers {
            o.on_phase(phase);
        }
    }

    fn on_preview(&self, phase: SummaryPhase, preview: &str) {
        for o in &self.observers {
            o.on_preview(phase, preview);
        }
    }

    fn on_join_drops(&self, dropped_pairs: usize, order_pairs: usize) {
        for o in &self.observers {
            o.on_join_drops(dropped_pairs, order_pairs);
        }
    }
}

/// Logs pipeline events to stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl PipelineObserver for StdErrObserver {
    fn on_file_started(&self, ctx: &IngestionContext) {
        eprintln!("[ingest][start] path={} table={}", ctx.path.display(), ctx.table);
    }

    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        eprintln!(
            "[ingest][ok] path={} table={} rows={} skipped={}",
            ctx.path.display(),
            ctx.table,
            stats.rows,
            stats.skipped_rows
        );
    }

    fn on_failure(&self, scope: &FailureScope, severity: Severity, error: &PipelineError) {
        eprintln!("[{severity:?}] {scope} err={error}");
    }

    fn on_alert(&self, scope: &FailureScope, severity: Severity, error: &PipelineError) {
        eprintln!("[ALERT][{severity:?}] {scope} err={error}");
    }

    fn on_batch_finished(&self, stats: BatchStats) {
        eprintln!(
            "[ingest][done] files={} failed={} elapsed={:.2}min",
            stats.files_ingested,
            stats.files_failed,
            stats.elapsed.as_secs_f64() / 60.0
        );
    }

    fn on_phase(&self, phase: SummaryPhase) {
        eprintln!("[summary] {phase}");
    }

    fn on_preview(&self, phase: SummaryPhase, preview: &str) {
        eprintln!("[summary] {phase} result:\n{preview}");
    }

    fn on_join_drops(&self, dropped_pairs: usize, order_pairs: usize) {
        eprintln!("[summary] inner join dropped {dropped_pairs} of {order_pairs} order pairs");
    }
}

/// Appends pipeline events to a local log file.
///
/// Lines look like `<unix-seconds> <LEVEL>:<message>`; previews are multi-line messages.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append(&self, level: &str, message: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{} {level}:{message}", unix_ts());
        }
    }
}

impl PipelineObserver for FileObserver {
    fn on_file_started(&self, ctx: &IngestionContext) {
        self.append(
            "INFO",
            &format!("ingesting {} into table {}", ctx.path.display(), ctx.table),
        );
    }

    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        self.append(
            "INFO",
            &format!(
                "ingested table {} rows={} skipped={}",
                ctx.table, stats.rows, stats.skipped_rows
            ),
        );
    }

    fn on_failure(&self, scope: &FailureScope, severity: Severity, error: &PipelineError) {
        self.append("ERROR", &format!("severity={severity:?} {scope} err={error}"));
    }

    fn on_alert(&self, scope: &FailureScope, severity: Severity, error: &PipelineError) {
        self.append("CRITICAL", &format!("ALERT severity={severity:?} {scope} err={error}"));
    }

    fn on_batch_finished(&self, stats: BatchStats) {
        self.append("INFO", "--------------- Ingestion Complete ----------------");
        self.append(
            "INFO",
            &format!(
                "files={} failed={} time taken: {:.2} minutes",
                stats.files_ingested,
                stats.files_failed,
                stats.elapsed.as_secs_f64() / 60.0
            ),
        );
    }

    fn on_phase(&self, phase: SummaryPhase) {
        self.append("INFO", &format!("{phase}...."));
    }

    fn on_preview(&self, _phase: SummaryPhase, preview: &str) {
        self.append("INFO", &format!("\n{preview}"));
    }

    fn on_join_drops(&self, dropped_pairs: usize, order_pairs: usize) {
        self.append(
            "WARNING",
            &format!("inner join dropped {dropped_pairs} of {order_pairs} order pairs"),
        );
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
