//! Loading parsed files into the store.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::TextEncoding;
use crate::error::{PipelineError, PipelineResult};
use crate::observability::{
    report_failure, BatchStats, FailureScope, IngestionContext, IngestionStats, PipelineObserver,
    Severity,
};
use crate::store::Store;
use crate::types::DataSet;

use super::csv::{self, CsvFormat};
use super::scan::{scan, table_name_for};

/// Options controlling [`load_raw_data`].
///
/// Use [`Default`] for `;`-delimited Latin-1 files without an observer.
#[derive(Clone)]
pub struct IngestionOptions {
    /// Single-byte field delimiter.
    pub delimiter: u8,
    /// Text encoding of the source files.
    pub encoding: TextEncoding,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn PipelineObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: Severity,
}

impl fmt::Debug for IngestionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestionOptions")
            .field("delimiter", &char::from(self.delimiter))
            .field("encoding", &self.encoding)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for IngestionOptions {
    fn default() -> Self {
        let format = CsvFormat::default();
        Self {
            delimiter: format.delimiter,
            encoding: format.encoding,
            observer: None,
            alert_at_or_above: Severity::Critical,
        }
    }
}

impl IngestionOptions {
    /// The parse format described by these options.
    pub fn csv_format(&self) -> CsvFormat {
        CsvFormat {
            delimiter: self.delimiter,
            encoding: self.encoding,
        }
    }
}

/// What happened to one discovered file.
#[derive(Debug)]
pub enum FileStatus {
    /// Written to its table.
    Ingested(IngestionStats),
    /// Could not be read or parsed; its table was left untouched.
    Failed(PipelineError),
}

/// Per-file entry of an [`IngestionReport`].
#[derive(Debug)]
pub struct FileReport {
    /// Source file.
    pub path: PathBuf,
    /// Destination table.
    pub table: String,
    /// Outcome.
    pub status: FileStatus,
}

/// Result of [`load_raw_data`].
#[derive(Debug)]
pub struct IngestionReport {
    /// One entry per discovered file, in scan order.
    pub files: Vec<FileReport>,
    /// Wall-clock time of the batch.
    pub elapsed: Duration,
}

impl IngestionReport {
    /// Tables written during the batch.
    pub fn ingested_tables(&self) -> impl Iterator<Item = &str> {
        self.files
            .iter()
            .filter(|f| matches!(f.status, FileStatus::Ingested(_)))
            .map(|f| f.table.as_str())
    }

    /// Number of files that failed.
    pub fn failed_count(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f.status, FileStatus::Failed(_)))
            .count()
    }
}

/// Write `dataset` to the store as `table`, replacing any existing table of that name.
pub fn ingest(store: &mut Store, dataset: &DataSet, table: &str) -> PipelineResult<()> {
    store.replace_table(table, dataset)
}

/// Load every `*.csv` file in `directory` into a table named after the file.
///
/// A file that cannot be read or parsed is reported to the observer, recorded as
/// [`FileStatus::Failed`] and skipped; the rest of the batch still runs. Store failures abort
/// the batch with an error.
pub fn load_raw_data(
    store: &mut Store,
    directory: impl AsRef<Path>,
    options: &IngestionOptions,
) -> PipelineResult<IngestionReport> {
    let start = Instant::now();
    let observer = options.observer.as_ref();
    let format = options.csv_format();

    let mut files = Vec::new();
    for path in scan(directory)? {
        // `scan` only yields paths that have a table name.
        let Some(table) = table_name_for(&path) else {
            continue;
        };
        let ctx = IngestionContext {
            path: path.clone(),
            table: table.clone(),
        };
        if let Some(obs) = observer {
            obs.on_file_started(&ctx);
        }

        let status = match load_file(store, &ctx, &format) {
            Ok(stats) => {
                if let Some(obs) = observer {
                    obs.on_success(&ctx, stats);
                }
                FileStatus::Ingested(stats)
            }
            Err(err) => {
                let scope = FailureScope::File(ctx);
                report_failure(observer, options.alert_at_or_above, &scope, &err);
                if matches!(err, PipelineError::Storage(_)) {
                    return Err(err);
                }
                FileStatus::Failed(err)
            }
        };
        files.push(FileReport { path, table, status });
    }

    let report = IngestionReport {
        files,
        elapsed: start.elapsed(),
    };
    if let Some(obs) = observer {
        obs.on_batch_finished(BatchStats {
            files_ingested: report.ingested_tables().count(),
            files_failed: report.failed_count(),
            elapsed: report.elapsed,
        });
    }
    Ok(report)
}

fn load_file(
    store: &mut Store,
    ctx: &IngestionContext,
    format: &CsvFormat,
) -> PipelineResult<IngestionStats> {
    let parsed = csv::parse(&ctx.path, format)?;
    ingest(store, &parsed.dataset, &ctx.table)?;
    Ok(IngestionStats {
        rows: parsed.dataset.row_count(),
        skipped_rows: parsed.skipped.len(),
    })
}
