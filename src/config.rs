//! Pipeline configuration.
//!
//! Both binaries read an optional JSON file into [`PipelineConfig`]; every key is optional and
//! falls back to [`PipelineConfig::default`]:
//!
//! ```json
//! {
//!   "data_dir": "data",
//!   "database_path": "sales.db",
//!   "log_dir": "logs",
//!   "delimiter": ";",
//!   "encoding": "latin1",
//!   "preview_rows": 5,
//!   "alert_at_or_above": "critical"
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;

use crate::error::{PipelineError, PipelineResult};
use crate::ingestion::IngestionOptions;
use crate::observability::{
    CompositeObserver, FileObserver, PipelineObserver, Severity, StdErrObserver,
};
use crate::summary::SummaryOptions;

/// Single-byte (or UTF-8) text encoding of the source CSV files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextEncoding {
    /// ISO-8859-1: every byte maps to the code point of the same value.
    #[default]
    #[serde(alias = "iso-8859-1")]
    Latin1,
    /// UTF-8; records with invalid sequences are skipped.
    #[serde(alias = "utf-8")]
    Utf8,
}

/// Settings shared by the `ingest_raw_data` and `build_sales_summary` jobs.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Directory scanned for `*.csv` source files.
    pub data_dir: PathBuf,
    /// SQLite database file.
    pub database_path: PathBuf,
    /// Directory that receives the append-mode run logs.
    pub log_dir: PathBuf,
    /// Field delimiter of the source files.
    pub delimiter: char,
    /// Text encoding of the source files.
    pub encoding: TextEncoding,
    /// Number of rows shown in row-set previews.
    pub preview_rows: usize,
    /// Severity threshold at which observers receive `on_alert`.
    pub alert_at_or_above: Severity,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            database_path: PathBuf::from("sales.db"),
            log_dir: PathBuf::from("logs"),
            delimiter: ';',
            encoding: TextEncoding::Latin1,
            preview_rows: 5,
            alert_at_or_above: Severity::Critical,
        }
    }
}

impl PipelineConfig {
    /// Parse a config from JSON text.
    pub fn from_json_str(json: &str) -> PipelineResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON config file.
    pub fn from_json_path(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Load from `path` when given, otherwise use the defaults.
    pub fn load(path: Option<&Path>) -> PipelineResult<Self> {
        match path {
            Some(p) => Self::from_json_path(p),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> PipelineResult<()> {
        if !self.delimiter.is_ascii() {
            return Err(PipelineError::Config(serde::de::Error::custom(format!(
                "delimiter must be a single ASCII character, got {:?}",
                self.delimiter
            ))));
        }
        Ok(())
    }

    /// Observer that logs to stderr and appends to `<log_dir>/<log_name>`.
    ///
    /// Creates `log_dir` if needed.
    pub fn observer(&self, log_name: &str) -> PipelineResult<Arc<dyn PipelineObserver>> {
        std::fs::create_dir_all(&self.log_dir)?;
        let observers: Vec<Arc<dyn PipelineObserver>> = vec![
            Arc::new(StdErrObserver),
            Arc::new(FileObserver::new(self.log_dir.join(log_name))),
        ];
        let composite: Arc<dyn PipelineObserver> = Arc::new(CompositeObserver::new(observers));
        Ok(composite)
    }

    /// Options for [`crate::ingestion::load_raw_data`].
    pub fn ingestion_options(
        &self,
        observer: Option<Arc<dyn PipelineObserver>>,
    ) -> IngestionOptions {
        IngestionOptions {
            // `validate` guarantees ASCII.
            delimiter: self.delimiter as u8,
            encoding: self.encoding,
            observer,
            alert_at_or_above: self.alert_at_or_above,
        }
    }

    /// Options for [`crate::summary::run`].
    pub fn summary_options(&self, observer: Option<Arc<dyn PipelineObserver>>) -> SummaryOptions {
        SummaryOptions {
            preview_rows: self.preview_rows,
            observer,
            alert_at_or_above: self.alert_at_or_above,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{PipelineConfig, TextEncoding};
    use crate::observability::Severity;

    #[test]
    fn empty_object_yields_defaults() {
        let config = PipelineConfig::from_json_str("{}").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.delimiter, ';');
        assert_eq!(config.encoding, TextEncoding::Latin1);
    }

    #[test]
    fn overrides_are_applied() {
        let config = PipelineConfig::from_json_str(
            r#"{"data_dir": "/srv/in", "delimiter": ",", "encoding": "utf-8", "alert_at_or_above": "error"}"#,
        )
        .unwrap();
        assert_eq!(config.data_dir.to_str(), Some("/srv/in"));
        assert_eq!(config.ingestion_options(None).delimiter, b',');
        assert_eq!(config.encoding, TextEncoding::Utf8);
        assert_eq!(config.alert_at_or_above, Severity::Error);
    }

    #[test]
    fn unknown_keys_and_bad_delimiters_are_rejected() {
        let err = PipelineConfig::from_json_str(r#"{"datadir": "x"}"#).unwrap_err();
        assert!(err.to_string().starts_with("config error"));

        let err = PipelineConfig::from_json_str(r#"{"delimiter": "§"}"#).unwrap_err();
        assert!(err.to_string().contains("single ASCII character"));
    }
}
