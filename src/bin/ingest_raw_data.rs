//! Load every `*.csv` file of the configured data directory into the SQLite store.
//!
//! Usage: `ingest_raw_data [config.json]`

use std::path::PathBuf;
use std::process::ExitCode;

use sales_summary::config::PipelineConfig;
use sales_summary::ingestion::{load_raw_data, FileStatus};
use sales_summary::store::Store;
use sales_summary::PipelineResult;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("ingest_raw_data failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> PipelineResult<()> {
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = PipelineConfig::load(config_path.as_deref())?;
    let observer = config.observer("ingestion_db.log")?;

    let mut store = Store::open(&config.database_path)?;
    let options = config.ingestion_options(Some(observer));
    let report = load_raw_data(&mut store, &config.data_dir, &options)?;

    for file in &report.files {
        match &file.status {
            FileStatus::Ingested(stats) => println!(
                "{}: {} rows ({} skipped)",
                file.table, stats.rows, stats.skipped_rows
            ),
            FileStatus::Failed(err) => println!("{}: failed: {err}", file.table),
        }
    }
    Ok(())
}
