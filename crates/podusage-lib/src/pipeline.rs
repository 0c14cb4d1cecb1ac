//! End-to-end run: collect, dump, write the report

use crate::collector::{CollectionConfig, Collector};
use crate::command::CommandRunner;
use crate::error::RunError;
use crate::models::CollectionOutcome;
use crate::observability::CollectionLogger;
use crate::report::{write_report, ReportFormat};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

/// Settings for one run
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub collection: CollectionConfig,
    pub format: ReportFormat,
    /// Directory the report file is written into
    pub output_dir: PathBuf,
    /// Dump the aggregate to stdout as JSON before writing the report
    pub print_summary: bool,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            collection: CollectionConfig::default(),
            format: ReportFormat::default(),
            output_dir: PathBuf::from("."),
            print_summary: true,
        }
    }
}

/// What a successful run produced
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub outcome: CollectionOutcome,
    pub report_path: PathBuf,
}

/// Collect usage from the cluster and write the report
///
/// Nothing is written when namespace listing fails.
pub async fn run(
    runner: Arc<dyn CommandRunner>,
    settings: &RunSettings,
) -> Result<RunSummary, RunError> {
    let collector = Collector::new(runner, settings.collection.clone());
    let outcome = collector.collect().await?;

    if settings.print_summary {
        print_summary(&outcome);
    }

    let report_path = write_report(&outcome, settings.format, &settings.output_dir)?;
    CollectionLogger::new().log_report_written(&report_path, outcome.pod_count());

    Ok(RunSummary {
        outcome,
        report_path,
    })
}

fn print_summary(outcome: &CollectionOutcome) {
    let mut stdout = std::io::stdout().lock();
    let written = serde_json::to_writer_pretty(&mut stdout, &outcome.snapshot)
        .map_err(std::io::Error::from)
        .and_then(|_| writeln!(stdout));
    if let Err(e) = written {
        warn!(error = %e, "Failed to print usage summary");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::KubectlCommand;
    use crate::error::{CollectError, CommandError};
    use async_trait::async_trait;
    use tempfile::TempDir;

    /// Serves one namespace with one pod, or fails every call
    struct FixedRunner {
        healthy: bool,
    }

    #[async_trait]
    impl CommandRunner for FixedRunner {
        async fn run(&self, args: &[String]) -> Result<String, CommandError> {
            if !self.healthy {
                return Err(CommandError::Failed {
                    command: args.join(" "),
                    exit_code: 1,
                    stderr: "Unable to connect to the server".to_string(),
                });
            }

            let out = if args == KubectlCommand::list_namespaces().as_slice() {
                "build-service\n"
            } else if args == KubectlCommand::list_pods("build-service").as_slice() {
                "pod-a\n"
            } else if args == KubectlCommand::pod_metrics_yaml("pod-a", "build-service").as_slice()
            {
                "containers:\n- name: main\n  usage:\n    cpu: 5m\n    memory: 10Mi\n"
            } else {
                "pod-a   5m   10Mi   15s\n"
            };
            Ok(out.to_string())
        }
    }

    fn settings(dir: &TempDir) -> RunSettings {
        RunSettings {
            output_dir: dir.path().to_path_buf(),
            print_summary: false,
            ..RunSettings::default()
        }
    }

    #[tokio::test]
    async fn test_run_writes_report() {
        let dir = TempDir::new().unwrap();
        let summary = run(Arc::new(FixedRunner { healthy: true }), &settings(&dir))
            .await
            .unwrap();

        assert_eq!(summary.report_path, dir.path().join("cpu_mem_usage.csv"));
        assert_eq!(summary.outcome.pod_count(), 1);

        let content = std::fs::read_to_string(&summary.report_path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines[0], "Namespace,PodName,ContainerName,CPU Usage,Memory Usage");
        assert_eq!(lines[1], "build-service");
        assert_eq!(lines.len(), 4);
    }

    #[tokio::test]
    async fn test_namespace_failure_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let err = run(Arc::new(FixedRunner { healthy: false }), &settings(&dir))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            RunError::Collect(CollectError::NamespaceListing(_))
        ));
        assert!(!dir.path().join("cpu_mem_usage.csv").exists());
    }

    #[test]
    fn test_default_settings() {
        let settings = RunSettings::default();
        assert_eq!(settings.format, ReportFormat::Csv);
        assert_eq!(settings.output_dir, PathBuf::from("."));
        assert!(settings.print_summary);
    }
}
