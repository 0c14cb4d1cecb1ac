//! Logging setup and structured run events
//!
//! Logs are written to stderr so that stdout stays free for the
//! aggregate dump.

use crate::models::{CollectionOutcome, SkippedUnit};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Log line format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Text,
}

/// Install the global subscriber; `RUST_LOG` overrides the `info` default
pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

/// Structured logger for collection events
///
/// Every event carries an `event` field so log pipelines can filter
/// on it without parsing messages.
#[derive(Clone, Default)]
pub struct CollectionLogger;

impl CollectionLogger {
    pub fn new() -> Self {
        Self
    }

    pub fn log_run_started(&self, max_concurrent_commands: usize) {
        info!(
            event = "run_started",
            max_concurrent_commands = max_concurrent_commands,
            "Started CPU/memory collection"
        );
    }

    pub fn log_namespaces_listed(&self, count: usize) {
        info!(event = "namespaces_listed", namespaces = count, "Listed namespaces");
    }

    pub fn log_pod_collected(&self, namespace: &str, pod: &str, containers: usize) {
        debug!(
            event = "pod_collected",
            namespace = %namespace,
            pod = %pod,
            containers = containers,
            "Collected pod metrics"
        );
    }

    pub fn log_unit_skipped(&self, unit: &SkippedUnit) {
        warn!(
            event = "unit_skipped",
            namespace = %unit.namespace,
            pod = unit.pod.as_deref().unwrap_or(""),
            stage = %unit.stage,
            reason = %unit.reason,
            "Dropped unit of work"
        );
    }

    pub fn log_run_finished(&self, outcome: &CollectionOutcome, elapsed: Duration) {
        info!(
            event = "run_finished",
            namespaces = outcome.namespace_count(),
            pods = outcome.pod_count(),
            skipped = outcome.skipped.len(),
            started_at = %outcome.started_at.to_rfc3339(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Collection complete"
        );
    }

    pub fn log_report_written(&self, path: &Path, pods: usize) {
        info!(
            event = "report_written",
            path = %path.display(),
            pods = pods,
            "Wrote usage report"
        );
    }
}
