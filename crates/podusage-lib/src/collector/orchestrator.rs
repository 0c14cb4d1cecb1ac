//! Two-level fan-out over namespaces and pods
//!
//! One task per namespace lists its pods and spawns one task per pod.
//! Every namespace task joins its pod tasks before returning, and
//! [`Collector::collect`] joins every namespace task before reading the
//! aggregate, so the snapshot is complete when it is taken.

use crate::aggregate::NamespaceAggregate;
use crate::command::{CommandRunner, KubectlCommand};
use crate::error::{CollectError, CommandError};
use crate::models::{CollectionOutcome, PodMetric, SkipStage, SkippedUnit};
use crate::observability::CollectionLogger;
use crate::parser::{parse_name_list, parse_pod_metrics, parse_summary_line};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::debug;

/// Configuration for a collection run
#[derive(Debug, Clone)]
pub struct CollectionConfig {
    /// Upper bound on cluster CLI processes running at once (default: 16)
    pub max_concurrent_commands: usize,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            max_concurrent_commands: 16,
        }
    }
}

impl CollectionConfig {
    /// Set the concurrency bound; values below 1 are raised to 1
    pub fn with_max_concurrent_commands(mut self, limit: usize) -> Self {
        self.max_concurrent_commands = limit.max(1);
        self
    }
}

/// State shared by every task of one run
struct RunContext {
    runner: Arc<dyn CommandRunner>,
    permits: Semaphore,
    aggregate: NamespaceAggregate,
    logger: CollectionLogger,
}

impl RunContext {
    /// Run one CLI command while holding a concurrency permit
    async fn run(&self, args: Vec<String>) -> Result<String, CommandError> {
        // The semaphore is owned by the context and never closed
        let _permit = self.permits.acquire().await.ok();
        self.runner.run(&args).await
    }
}

/// Collects pod usage across every namespace of the cluster
pub struct Collector {
    runner: Arc<dyn CommandRunner>,
    config: CollectionConfig,
    logger: CollectionLogger,
}

impl Collector {
    pub fn new(runner: Arc<dyn CommandRunner>, config: CollectionConfig) -> Self {
        Self {
            runner,
            config,
            logger: CollectionLogger::new(),
        }
    }

    pub fn config(&self) -> &CollectionConfig {
        &self.config
    }

    /// Run a full collection
    ///
    /// Only a failure to list namespaces is an error. Failures below that
    /// level drop the affected namespace or pod and are reported in
    /// [`CollectionOutcome::skipped`].
    pub async fn collect(&self) -> Result<CollectionOutcome, CollectError> {
        let started_at = Utc::now();
        let start = Instant::now();
        let limit = self.config.max_concurrent_commands.max(1);
        self.logger.log_run_started(limit);

        let ctx = Arc::new(RunContext {
            runner: Arc::clone(&self.runner),
            permits: Semaphore::new(limit),
            aggregate: NamespaceAggregate::new(),
            logger: self.logger.clone(),
        });

        let listing = ctx
            .run(KubectlCommand::list_namespaces())
            .await
            .map_err(CollectError::NamespaceListing)?;
        let namespaces = parse_name_list(&listing);
        self.logger.log_namespaces_listed(namespaces.len());

        let mut set = JoinSet::new();
        for namespace in namespaces {
            set.spawn(collect_namespace(Arc::clone(&ctx), namespace));
        }

        let mut skipped = Vec::new();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(mut units) => skipped.append(&mut units),
                Err(e) => {
                    let unit = SkippedUnit {
                        namespace: String::new(),
                        pod: None,
                        stage: SkipStage::Task,
                        reason: e.to_string(),
                    };
                    ctx.logger.log_unit_skipped(&unit);
                    skipped.push(unit);
                }
            }
        }

        let outcome = CollectionOutcome {
            snapshot: ctx.aggregate.snapshot(),
            skipped,
            started_at,
            finished_at: Utc::now(),
        };
        self.logger.log_run_finished(&outcome, start.elapsed());

        Ok(outcome)
    }
}

/// List the pods of `namespace` and collect each of them
///
/// Returns the units that were dropped along the way.
async fn collect_namespace(ctx: Arc<RunContext>, namespace: String) -> Vec<SkippedUnit> {
    let listing = match ctx.run(KubectlCommand::list_pods(&namespace)).await {
        Ok(listing) => listing,
        Err(e) => {
            let unit = SkippedUnit::namespace(&namespace, SkipStage::PodListing, e);
            ctx.logger.log_unit_skipped(&unit);
            return vec![unit];
        }
    };

    let pods = parse_name_list(&listing);
    debug!(namespace = %namespace, pods = pods.len(), "Listed pods");

    let mut set = JoinSet::new();
    for pod in pods {
        set.spawn(collect_pod(Arc::clone(&ctx), namespace.clone(), pod));
    }

    let mut skipped = Vec::new();
    while let Some(joined) = set.join_next().await {
        let unit = match joined {
            Ok(Ok(())) => continue,
            Ok(Err(unit)) => unit,
            Err(e) => SkippedUnit::namespace(&namespace, SkipStage::Task, e),
        };
        ctx.logger.log_unit_skipped(&unit);
        skipped.push(unit);
    }

    skipped
}

/// Fetch both PodMetrics views of one pod and append the result
async fn collect_pod(
    ctx: Arc<RunContext>,
    namespace: String,
    pod: String,
) -> Result<(), SkippedUnit> {
    let skip = |stage: SkipStage, reason: &dyn std::fmt::Display| {
        SkippedUnit::pod(&namespace, &pod, stage, reason)
    };

    let (document, summary) = tokio::join!(
        ctx.run(KubectlCommand::pod_metrics_yaml(&pod, &namespace)),
        ctx.run(KubectlCommand::pod_metrics_summary(&pod, &namespace)),
    );

    let document = document.map_err(|e| skip(SkipStage::ContainerFetch, &e))?;
    let containers =
        parse_pod_metrics(&document).map_err(|e| skip(SkipStage::ContainerParse, &e))?;
    let summary = summary.map_err(|e| skip(SkipStage::SummaryFetch, &e))?;
    let (total_cpu, total_memory) =
        parse_summary_line(&summary).map_err(|e| skip(SkipStage::SummaryParse, &e))?;

    ctx.logger.log_pod_collected(&namespace, &pod, containers.len());
    let metric = PodMetric {
        pod_name: pod,
        namespace: namespace.clone(),
        containers,
        total_cpu,
        total_memory,
    };
    ctx.aggregate.append(&namespace, metric);

    Ok(())
}
