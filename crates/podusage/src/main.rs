//! pod-usage - cluster CPU/memory usage snapshot
//!
//! Queries every pod in every namespace through `kubectl` and writes the
//! per-pod and per-container usage to a CSV or text report.

use anyhow::{Context, Result};
use podusage_lib::{init_tracing, KubectlRunner};
use std::sync::Arc;
use tracing::info;

mod config;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::AppConfig::load()?;
    init_tracing(config.log_format);

    info!(version = VERSION, "Starting pod-usage");
    info!(
        kubectl = %config.kubectl_path.display(),
        format = ?config.output_format,
        output_dir = %config.output_dir.display(),
        "Collector configured"
    );

    let runner = Arc::new(KubectlRunner::with_path(&config.kubectl_path));
    let summary = podusage_lib::run(runner, &config.run_settings())
        .await
        .context("Usage collection failed")?;

    info!(
        report = %summary.report_path.display(),
        pods = summary.outcome.pod_count(),
        skipped = summary.outcome.skipped.len(),
        "Finished"
    );

    Ok(())
}
