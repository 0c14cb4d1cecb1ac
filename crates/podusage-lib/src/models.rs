//! Core data models for the usage collector

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Usage of a single container, as reported by the metrics API
///
/// Values keep their unit suffix ("12m", "34Mi"); no numeric conversion is done.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerMetric {
    pub name: String,
    pub cpu: String,
    pub memory: String,
}

/// Usage snapshot of one pod and its containers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodMetric {
    pub pod_name: String,
    pub namespace: String,
    pub containers: Vec<ContainerMetric>,
    pub total_cpu: String,
    pub total_memory: String,
}

/// Pipeline step at which a unit of work was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipStage {
    PodListing,
    ContainerFetch,
    ContainerParse,
    SummaryFetch,
    SummaryParse,
    Task,
}

impl SkipStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipStage::PodListing => "pod_listing",
            SkipStage::ContainerFetch => "container_fetch",
            SkipStage::ContainerParse => "container_parse",
            SkipStage::SummaryFetch => "summary_fetch",
            SkipStage::SummaryParse => "summary_parse",
            SkipStage::Task => "task",
        }
    }
}

impl fmt::Display for SkipStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A namespace or pod that was dropped from the aggregate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedUnit {
    pub namespace: String,
    /// `None` when the failure is not tied to a single pod
    pub pod: Option<String>,
    pub stage: SkipStage,
    pub reason: String,
}

impl SkippedUnit {
    pub fn namespace(
        namespace: impl Into<String>,
        stage: SkipStage,
        reason: impl fmt::Display,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            pod: None,
            stage,
            reason: reason.to_string(),
        }
    }

    pub fn pod(
        namespace: impl Into<String>,
        pod: impl Into<String>,
        stage: SkipStage,
        reason: impl fmt::Display,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            pod: Some(pod.into()),
            stage,
            reason: reason.to_string(),
        }
    }
}

/// Result of a completed collection run
#[derive(Debug, Clone, Serialize)]
pub struct CollectionOutcome {
    /// Pods per namespace, namespaces in sorted order
    pub snapshot: BTreeMap<String, Vec<PodMetric>>,
    pub skipped: Vec<SkippedUnit>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CollectionOutcome {
    /// Total number of pods collected across all namespaces
    pub fn pod_count(&self) -> usize {
        self.snapshot.values().map(Vec::len).sum()
    }

    pub fn namespace_count(&self) -> usize {
        self.snapshot.len()
    }
}
