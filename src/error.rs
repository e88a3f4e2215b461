use thiserror::Error;

/// Convenience result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Error type returned by ingestion, store and summary functions.
///
/// This is a single error enum shared by both batch jobs. Malformed CSV records never surface
/// here; they are skipped and reported through [`crate::ingestion::csv::ParsedCsv::skipped`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV error that prevents reading a file at all (e.g. an unreadable header row).
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// The relational store is unreachable, unwritable or rejected a statement.
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// A source table or column expected by the summary query is missing, or the query produced
    /// no rows.
    #[error("query error: {message}")]
    Query { message: String },

    /// A row set does not have the shape an operation requires (missing or duplicated columns).
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// A row set could not be converted into a polars frame for display.
    #[error("preview error: {0}")]
    Preview(#[from] polars::error::PolarsError),

    /// The pipeline configuration file could not be parsed.
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
}

impl PipelineError {
    pub(crate) fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    pub(crate) fn schema(message: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            message: message.into(),
        }
    }
}
