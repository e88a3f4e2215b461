//! Rebuild the `sales_summary` table from the ingested `orders`, `customers` and `products`.
//!
//! Usage: `build_sales_summary [config.json]`

use std::path::PathBuf;
use std::process::ExitCode;

use sales_summary::config::PipelineConfig;
use sales_summary::store::Store;
use sales_summary::summary::{self, SUMMARY_TABLE};
use sales_summary::PipelineResult;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("build_sales_summary failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> PipelineResult<()> {
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = PipelineConfig::load(config_path.as_deref())?;
    let observer = config.observer("get_sales_summary.log")?;

    let mut store = Store::open(&config.database_path)?;
    let report = summary::run(&mut store, &config.summary_options(Some(observer)))?;

    println!(
        "{SUMMARY_TABLE}: {} rows ({} of {} order pairs dropped by the join) in {:.2?}",
        report.rows, report.dropped_pairs, report.order_pairs, report.elapsed
    );
    Ok(())
}
